/// Maze cell kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellKind {
    Empty,
    Wall,   // Crashing into it ends the run
    Start,  // Player spawn
    Goal,   // Touching it clears the maze
}

impl CellKind {
    /// Numeric layout code: 0 = Empty, 1 = Wall, 2 = Start, 3 = Goal.
    pub fn from_code(code: u8) -> Option<CellKind> {
        match code {
            0 => Some(CellKind::Empty),
            1 => Some(CellKind::Wall),
            2 => Some(CellKind::Start),
            3 => Some(CellKind::Goal),
            _ => None,
        }
    }

    /// Text maze legend. Digits are accepted as well as symbols.
    pub fn from_char(ch: char) -> Option<CellKind> {
        match ch {
            '#' | '1' => Some(CellKind::Wall),
            '.' | ' ' | '0' => Some(CellKind::Empty),
            'S' | 's' | '2' => Some(CellKind::Start),
            'G' | 'g' | '3' => Some(CellKind::Goal),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Wall => '#',
            CellKind::Start => 'S',
            CellKind::Goal => 'G',
        }
    }

    /// Does touching this cell end the run in a loss?
    pub fn is_wall(self) -> bool {
        matches!(self, CellKind::Wall)
    }

    pub fn is_goal(self) -> bool {
        matches!(self, CellKind::Goal)
    }

    pub fn is_start(self) -> bool {
        matches!(self, CellKind::Start)
    }
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Empty
    }
}
