/// Maze grid model and loader.
///
/// ## Sources (priority order):
///   1. `general.maze_file` from config.toml, if set and valid
///   2. The built-in 6 × 10 maze
///
/// ## Text format:
///   ```
///   ; Tilt Maze - Sample
///   #...#.
///   #.#.#.
///   G.#.#.
///   ...
///   ```
///
/// One row per line. Lines starting with `;` are comments; the first comment
/// names the maze. Trailing blank lines are ignored.
///
/// ## Cell legend:
///   '#' or '1' = Wall        '.', ' ' or '0' = Empty
///   'S' or '2' = Start       'G' or '3' = Goal
///
/// A maze needs exactly one Start, exactly one Goal, and rows of equal length.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::GameConfig;
use crate::domain::cell::CellKind;

#[derive(Debug)]
pub enum MazeError {
    Empty,
    Ragged { row: usize, expected: usize, found: usize },
    UnknownCell { row: usize, col: usize, ch: char },
    MissingStart,
    MissingGoal,
    DuplicateStart { first: (usize, usize), second: (usize, usize) },
    DuplicateGoal { first: (usize, usize), second: (usize, usize) },
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MazeError::Empty => write!(f, "maze has no rows"),
            MazeError::Ragged { row, expected, found } => write!(
                f, "row {} has {} cells, expected {}", row + 1, found, expected,
            ),
            MazeError::UnknownCell { row, col, ch } => write!(
                f, "unknown cell {:?} at row {}, column {}", ch, row + 1, col + 1,
            ),
            MazeError::MissingStart => write!(f, "maze has no start cell"),
            MazeError::MissingGoal => write!(f, "maze has no goal cell"),
            MazeError::DuplicateStart { first, second } => write!(
                f, "two start cells: {:?} and {:?}", first, second,
            ),
            MazeError::DuplicateGoal { first, second } => write!(
                f, "two goal cells: {:?} and {:?}", first, second,
            ),
            MazeError::Io { path, source } => write!(
                f, "could not read {}: {}", path.display(), source,
            ),
        }
    }
}

impl std::error::Error for MazeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MazeError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Immutable maze layout. `cells[y][x]`, `(x, y)` = (column, row).
#[derive(Clone, Debug)]
pub struct MazeGrid {
    pub name: String,
    cells: Vec<Vec<CellKind>>,
    pub width: usize,
    pub height: usize,
    pub start: (usize, usize),
    pub goal: (usize, usize),
}

impl MazeGrid {
    /// Validate a grid of cell kinds.
    pub fn from_cells(name: &str, cells: Vec<Vec<CellKind>>) -> Result<MazeGrid, MazeError> {
        let height = cells.len();
        let width = cells.first().map_or(0, |r| r.len());
        if height == 0 || width == 0 {
            return Err(MazeError::Empty);
        }

        let mut start = None;
        let mut goal = None;
        for (y, row) in cells.iter().enumerate() {
            if row.len() != width {
                return Err(MazeError::Ragged { row: y, expected: width, found: row.len() });
            }
            for (x, &kind) in row.iter().enumerate() {
                if kind.is_start() {
                    if let Some(first) = start {
                        return Err(MazeError::DuplicateStart { first, second: (x, y) });
                    }
                    start = Some((x, y));
                } else if kind.is_goal() {
                    if let Some(first) = goal {
                        return Err(MazeError::DuplicateGoal { first, second: (x, y) });
                    }
                    goal = Some((x, y));
                }
            }
        }

        Ok(MazeGrid {
            name: name.to_string(),
            width,
            height,
            start: start.ok_or(MazeError::MissingStart)?,
            goal: goal.ok_or(MazeError::MissingGoal)?,
            cells,
        })
    }

    /// Build from numeric layout codes (0 empty, 1 wall, 2 start, 3 goal).
    pub fn from_codes(name: &str, rows: &[&[u8]]) -> Result<MazeGrid, MazeError> {
        let mut cells = Vec::with_capacity(rows.len());
        for (y, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(row.len());
            for (x, &code) in row.iter().enumerate() {
                let kind = CellKind::from_code(code).ok_or(MazeError::UnknownCell {
                    row: y,
                    col: x,
                    ch: char::from(b'0'.wrapping_add(code)),
                })?;
                out.push(kind);
            }
            cells.push(out);
        }
        MazeGrid::from_cells(name, cells)
    }

    /// Parse the text format described in the module docs.
    pub fn parse(content: &str) -> Result<MazeGrid, MazeError> {
        let mut name = String::new();
        let mut rows: Vec<&str> = vec![];

        for line in content.lines() {
            if let Some(comment) = line.strip_prefix(';') {
                if name.is_empty() {
                    name = comment.trim().to_string();
                }
            } else {
                rows.push(line.trim_end_matches('\r'));
            }
        }

        while rows.last().map_or(false, |r| r.trim().is_empty()) {
            rows.pop();
        }
        while rows.first().map_or(false, |r| r.trim().is_empty()) {
            rows.remove(0);
        }

        let mut cells = Vec::with_capacity(rows.len());
        for (y, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(row.len());
            for (x, ch) in row.chars().enumerate() {
                let kind = CellKind::from_char(ch)
                    .ok_or(MazeError::UnknownCell { row: y, col: x, ch })?;
                out.push(kind);
            }
            cells.push(out);
        }

        if name.is_empty() {
            name = "Unnamed Maze".to_string();
        }
        MazeGrid::from_cells(&name, cells)
    }

    pub fn load_file(path: &Path) -> Result<MazeGrid, MazeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| MazeError::Io { path: path.to_path_buf(), source })?;
        MazeGrid::parse(&content)
    }

    /// The stock 6 × 10 layout.
    pub fn builtin() -> MazeGrid {
        const LAYOUT: [&[u8]; 10] = [
            &[1, 0, 0, 0, 1, 0],
            &[1, 0, 1, 0, 1, 0],
            &[3, 0, 1, 0, 1, 0],
            &[1, 1, 1, 0, 0, 0],
            &[1, 0, 0, 1, 1, 0],
            &[0, 0, 1, 0, 0, 0],
            &[0, 1, 1, 0, 1, 0],
            &[0, 0, 0, 0, 1, 1],
            &[0, 1, 1, 0, 0, 0],
            &[0, 0, 1, 1, 1, 2],
        ];
        match MazeGrid::from_codes("Tilt Maze", &LAYOUT) {
            Ok(grid) => grid,
            Err(e) => unreachable!("built-in maze is invalid: {e}"),
        }
    }

    pub fn at(&self, x: usize, y: usize) -> CellKind {
        self.cells
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(CellKind::Wall)
    }

    /// All cells in row-major order as `(x, y, kind)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellKind)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, &kind)| (x, y, kind))
        })
    }
}

/// Writes the maze in the file format `parse()` reads.
impl fmt::Display for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; {}", self.name)?;
        for y in 0..self.height {
            let line: String = (0..self.width).map(|x| self.at(x, y).to_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Pick the maze for this run: the configured file if it loads, else built-in.
pub fn resolve(config: &GameConfig) -> MazeGrid {
    let path = match &config.maze_file {
        Some(p) => p,
        None => return MazeGrid::builtin(),
    };
    match MazeGrid::load_file(path) {
        Ok(grid) => {
            log::info!("loaded maze {:?} ({}x{}) from {}",
                grid.name, grid.width, grid.height, path.display());
            log::debug!("layout:\n{grid}");
            grid
        }
        Err(e) => {
            log::warn!("maze file rejected: {e}; using built-in maze");
            MazeGrid::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_layout() {
        let m = MazeGrid::builtin();
        assert_eq!((m.width, m.height), (6, 10));
        assert_eq!(m.start, (5, 9));
        assert_eq!(m.goal, (0, 2));
        assert_eq!(m.at(0, 0), CellKind::Wall);
        assert_eq!(m.at(1, 0), CellKind::Empty);
        assert_eq!(m.iter().filter(|c| c.2.is_wall()).count(), 24);
    }

    #[test]
    fn display_writes_loadable_text() {
        let m = MazeGrid::builtin();
        let text = m.to_string();
        assert!(text.starts_with("; Tilt Maze\n#...#.\n"));
        let back = MazeGrid::parse(&text).unwrap();
        assert_eq!(back.name, m.name);
        assert_eq!((back.start, back.goal), (m.start, m.goal));
        assert!(back.iter().eq(m.iter()));
    }

    #[test]
    fn shipped_sample_maze_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("mazes/switchback.txt");
        let m = MazeGrid::load_file(&path).unwrap();
        assert_eq!(m.name, "Switchback");
        assert_eq!((m.width, m.height), (8, 8));
        assert_eq!((m.start, m.goal), ((0, 0), (0, 6)));
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let m = MazeGrid::builtin();
        assert_eq!(m.at(6, 0), CellKind::Wall);
        assert_eq!(m.at(0, 10), CellKind::Wall);
    }

    #[test]
    fn parse_text_maze() {
        let m = MazeGrid::parse(
            "; Two by two\n\
             S#\n\
             .G\n\
             \n",
        ).unwrap();
        assert_eq!(m.name, "Two by two");
        assert_eq!((m.width, m.height), (2, 2));
        assert_eq!(m.start, (0, 0));
        assert_eq!(m.goal, (1, 1));
        assert_eq!(m.at(1, 0), CellKind::Wall);
    }

    #[test]
    fn parse_accepts_digit_legend() {
        let m = MazeGrid::parse("21\n03\n").unwrap();
        assert_eq!(m.name, "Unnamed Maze");
        assert_eq!(m.start, (0, 0));
        assert_eq!(m.goal, (1, 1));
    }

    #[test]
    fn parse_rejects_missing_start_and_goal() {
        assert!(matches!(MazeGrid::parse("..G\n"), Err(MazeError::MissingStart)));
        assert!(matches!(MazeGrid::parse("S..\n"), Err(MazeError::MissingGoal)));
    }

    #[test]
    fn parse_rejects_duplicates() {
        assert!(matches!(
            MazeGrid::parse("S.S\n..G\n"),
            Err(MazeError::DuplicateStart { first: (0, 0), second: (2, 0) })
        ));
        assert!(matches!(
            MazeGrid::parse("SGG\n"),
            Err(MazeError::DuplicateGoal { .. })
        ));
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        let err = MazeGrid::parse("S..\n.G\n").unwrap_err();
        assert!(matches!(err, MazeError::Ragged { row: 1, expected: 3, found: 2 }));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn parse_rejects_unknown_cells_and_empty_input() {
        assert!(matches!(
            MazeGrid::parse("S?G\n"),
            Err(MazeError::UnknownCell { row: 0, col: 1, ch: '?' })
        ));
        assert!(matches!(MazeGrid::parse("; only a name\n\n"), Err(MazeError::Empty)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = MazeGrid::load_file(Path::new("/nonexistent/tiltmaze/maze.txt")).unwrap_err();
        assert!(matches!(err, MazeError::Io { .. }));
    }
}
