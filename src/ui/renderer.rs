/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The maze lives in viewport points; `MapLayout` scales it onto terminal
/// cells. A terminal cell is roughly twice as tall as it is wide, so one
/// row covers twice the points of one column.

use std::io::{self, BufWriter, Write};
use std::ops::Range;
use std::time::Duration;

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::geometry::{Point, Rect, Viewport};
use crate::sim::session::{Session, SessionState};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const FLOOR_BG: Color = Color::Rgb { r: 255, g: 255, b: 240 };
const WALL_BG: Color = Color::Rgb { r: 20, g: 20, b: 20 };
const WALL_FG: Color = Color::Rgb { r: 60, g: 60, b: 60 };
const START_BG: Color = Color::Rgb { r: 40, g: 180, b: 60 };
const GOAL_BG: Color = Color::Rgb { r: 210, g: 40, b: 40 };
const TOKEN_BG: Color = Color::Rgb { r: 128, g: 128, b: 128 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_centered(&mut self, x0: usize, w: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        self.put_str(x0 + w.saturating_sub(len) / 2, y, s, fg, bg);
    }
}

// ── Layout ──

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap above the map, gap + help below it.
const RESERVED_ROWS: usize = MAP_ROW + 2;

/// Placement of the viewport on the terminal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapLayout {
    pub col0: usize,
    pub row0: usize,
    pub cols: usize,
    pub rows: usize,
    /// Terminal columns per point.
    pub sx: f64,
    /// Terminal rows per point.
    pub sy: f64,
}

impl MapLayout {
    /// Largest aspect-correct fit of `viewport` into `avail_w × avail_h`
    /// terminal cells, centered horizontally, starting at `row0`.
    pub fn fit(viewport: Viewport, avail_w: usize, avail_h: usize, row0: usize) -> Self {
        let k = (avail_h as f64 / viewport.height).min(avail_w as f64 / (2.0 * viewport.width));
        let rows = ((viewport.height * k).floor() as usize).max(1);
        let cols = ((viewport.width * k * 2.0).floor() as usize).max(1);
        MapLayout {
            col0: avail_w.saturating_sub(cols) / 2,
            row0,
            cols,
            rows,
            sx: cols as f64 / viewport.width,
            sy: rows as f64 / viewport.height,
        }
    }

    /// Terminal columns covered by `[min, max)` in points. Rounds both edges
    /// so adjacent maze cells tile without gaps.
    pub fn tile_cols(&self, r: &Rect) -> Range<usize> {
        round_span(r.min_x * self.sx, r.max_x * self.sx, self.cols, self.col0)
    }

    pub fn tile_rows(&self, r: &Rect) -> Range<usize> {
        round_span(r.min_y * self.sy, r.max_y * self.sy, self.rows, self.row0)
    }

    /// Terminal columns for a small object; never empty.
    pub fn object_cols(&self, r: &Rect) -> Range<usize> {
        object_span(r.min_x * self.sx, r.max_x * self.sx, self.cols, self.col0)
    }

    pub fn object_rows(&self, r: &Rect) -> Range<usize> {
        object_span(r.min_y * self.sy, r.max_y * self.sy, self.rows, self.row0)
    }
}

fn round_span(lo: f64, hi: f64, limit: usize, offset: usize) -> Range<usize> {
    let a = (lo.round().max(0.0) as usize).min(limit);
    let b = (hi.round().max(0.0) as usize).min(limit);
    offset + a..offset + b
}

fn object_span(lo: f64, hi: f64, limit: usize, offset: usize) -> Range<usize> {
    let last = limit.saturating_sub(1);
    let a = (lo.floor().max(0.0) as usize).min(last);
    let b = (hi.ceil().max(0.0) as usize).clamp(a + 1, limit.max(a + 1));
    offset + a..offset + b
}

/// Queue terminal commands for every cell of `front` that differs from
/// `back`. Returns how many cells were written.
fn write_diff<W: Write>(front: &FrameBuffer, back: &FrameBuffer, out: &mut W) -> io::Result<usize> {
    let mut last_fg = Color::White;
    let mut last_bg = BASE_BG;
    let mut need_move = true;
    let mut last_x: usize = 0;
    let mut last_y: usize = 0;
    let mut changed = 0;

    // Explicit base colors at start of frame (never ResetColor here:
    // the terminal's native default may differ from BASE_BG).
    queue!(out,
        SetForegroundColor(Color::White),
        SetBackgroundColor(BASE_BG),
    )?;

    for y in 0..front.height {
        for x in 0..front.width {
            let cell = front.get(x, y);
            if cell == back.get(x, y) {
                need_move = true;
                continue;
            }

            if need_move || x != last_x + 1 || y != last_y {
                queue!(out, MoveTo(x as u16, y as u16))?;
                need_move = false;
            }
            if cell.fg != last_fg {
                queue!(out, SetForegroundColor(cell.fg))?;
                last_fg = cell.fg;
            }
            if cell.bg != last_bg {
                queue!(out, SetBackgroundColor(cell.bg))?;
                last_bg = cell.bg;
            }
            queue!(out, Print(cell.ch))?;
            last_x = x;
            last_y = y;
            changed += 1;
        }
    }

    Ok(changed)
}

// ── Renderer ──

/// Result dialog content, set from a session-ended event.
#[derive(Clone, Debug)]
pub struct Alert {
    pub title: &'static str,
    pub message: &'static str,
}

/// Everything besides the session that the screen shows.
pub struct Overlay<'a> {
    pub alert: Option<&'a Alert>,
    pub elapsed: Duration,
    pub pad_connected: bool,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_state: Option<SessionState>,
    frame: u64,
    /// Terminal reports key release events.
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_state: None,
            frame: 0,
            enhanced_keys: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
        log::debug!("terminal {}x{}", self.term_w, self.term_h);

        // Release events make held-key tilt stop immediately.
        if matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            self.enhanced_keys = execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            ).is_ok();
        }
        log::info!("key release events: {}", if self.enhanced_keys { "on" } else { "off (timeout)" });

        Ok(())
    }

    pub fn key_release_supported(&self) -> bool {
        self.enhanced_keys
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.enhanced_keys = false;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session, overlay: &Overlay) -> io::Result<()> {
        self.frame = self.frame.wrapping_add(1);

        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
            log::debug!("terminal resized to {}x{}", self.term_w, self.term_h);
        }

        // State change → clear for a clean transition
        if self.last_state != Some(session.state()) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
            self.last_state = Some(session.state());
        }

        self.front.clear();
        let layout = MapLayout::fit(
            session.viewport(),
            self.term_w,
            self.term_h.saturating_sub(RESERVED_ROWS),
            MAP_ROW,
        );
        self.compose_hud(session, overlay);
        self.compose_maze(session, &layout);
        self.compose_token(session, &layout);
        self.compose_help(&layout);
        if let Some(alert) = overlay.alert {
            self.compose_alert(alert, &layout);
        }

        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let changed = write_diff(&self.front, &self.back, &mut self.writer)?;
        if changed > 0 {
            log::trace!("frame {}: {} cells changed", self.frame, changed);
        }
        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, session: &Session, overlay: &Overlay) {
        let status = match session.state() {
            SessionState::Running => "TILT!",
            SessionState::Lost => "CRASHED",
            SessionState::Won => "CLEARED",
        };
        let pad = if overlay.pad_connected { "  [PAD]" } else { "" };
        let hud = format!(
            " {}  Try #{:<3} {:>5.1}s  {}{} ",
            session.maze().name, session.attempt(), overlay.elapsed.as_secs_f64(), status, pad,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    /// Floor first, then the same rectangles the collision rules use.
    fn compose_maze(&mut self, session: &Session, layout: &MapLayout) {
        let v = session.viewport();
        let floor = Rect { min_x: 0.0, min_y: 0.0, max_x: v.width, max_y: v.height };
        self.paint(layout, &floor, Cell::new(' ', Color::Black, FLOOR_BG));

        let (sx, sy) = session.maze().start;
        let start = session.geometry().cell_rect(sx, sy);
        self.paint(layout, &start, Cell::new(' ', Color::Black, START_BG));

        for wall in session.walls() {
            self.paint(layout, wall, Cell::new('▒', WALL_FG, WALL_BG));
        }
        self.paint(layout, &session.goal_rect(), Cell::new(' ', Color::Black, GOAL_BG));
    }

    fn paint(&mut self, layout: &MapLayout, rect: &Rect, cell: Cell) {
        for row in layout.tile_rows(rect) {
            for col in layout.tile_cols(rect) {
                self.front.set(col, row, cell);
            }
        }
    }

    fn compose_token(&mut self, session: &Session, layout: &MapLayout) {
        let rect = session.player.rect();
        if rect.width() * layout.sx < 1.0 && rect.height() * layout.sy < 1.0 {
            // Smaller than a terminal cell: a dot over whatever is underneath.
            let c = rect.center();
            let dot = Rect::from_center(c, Point::ZERO);
            let (col, row) = (layout.object_cols(&dot).start, layout.object_rows(&dot).start);
            let under = self.front.get(col, row);
            self.front.set(col, row, Cell::new('●', TOKEN_BG, under.bg));
            return;
        }
        let cols = layout.object_cols(&rect);
        for row in layout.object_rows(&rect) {
            for col in cols.clone() {
                self.front.set(col, row, Cell::new(' ', Color::White, TOKEN_BG));
            }
        }
    }

    fn compose_help(&mut self, layout: &MapLayout) {
        let help_row = layout.row0 + layout.rows + 1;
        if help_row < self.front.height {
            let help = " ←↑↓→/WASD: Tilt  R/Enter: Retry  Q/Esc: Quit  │  Pad: Stick tilts, Start/A retry";
            self.front.put_str(0, help_row, help, Color::DarkGrey, BASE_BG);
        }
    }

    /// Result dialog, centered on the maze.
    fn compose_alert(&mut self, alert: &Alert, layout: &MapLayout) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let text = Color::Rgb { r: 220, g: 220, b: 220 };
        let key_c = Color::Rgb { r: 100, g: 200, b: 255 };
        let blink = (self.frame / 20) % 2 == 0;

        let box_w = 30_usize.min(self.front.width);
        let box_h = 7_usize;
        let box_x = layout.col0 + layout.cols.saturating_sub(box_w) / 2;
        let box_y = layout.row0 + layout.rows.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', text, dim));
            }
        }

        let title = if blink { format!("▶  {}  ◀", alert.title) } else { alert.title.to_string() };
        self.front.put_centered(box_x, box_w, box_y + 1, &title, hdr, dim);
        self.front.put_centered(box_x, box_w, box_y + 3, alert.message, text, dim);
        self.front.put_centered(box_x, box_w, box_y + 5, "[R] Retry   [Q] Quit", key_c, dim);
    }
}
