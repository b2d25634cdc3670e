//! Launchpad grid addressing.
//!
//! The 8x8 pad matrix is addressed by MIDI note numbers in "programmer"
//! layout: `11` is the bottom-left pad, `88` the top-right. Game code works
//! in [`GridPos`] coordinates with `y = 0` as the **top** row, so the
//! mapping between the two is a fixed bijection built once by [`GridMap`].
//!
//! The dedicated round buttons around the matrix are addressed separately:
//! the top row sends Control-Change `104..=111`, the right column sends
//! notes `89, 79, ..., 19`.

use serde::{Deserialize, Serialize};

use crate::error::{LumenError, Result};

/// Side length of the pad matrix.
pub const GRID_SIZE: u8 = 8;

/// Control-Change numbers of the top-row buttons, left to right.
pub const TOP_BUTTONS: [u8; 8] = [104, 105, 106, 107, 108, 109, 110, 111];

/// Note numbers of the right-column buttons, top to bottom.
pub const RIGHT_BUTTONS: [u8; 8] = [89, 79, 69, 59, 49, 39, 29, 19];

/// A cell of the 8x8 pad matrix. `y = 0` is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    /// Column, `0..8` left to right.
    pub x: u8,
    /// Row, `0..8` top to bottom.
    pub y: u8,
}

impl GridPos {
    /// Create a position without bounds checking.
    ///
    /// Out-of-range positions are harmless: [`GridMap::note_for`] returns
    /// `None` for them.
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Create a position, rejecting coordinates outside the matrix.
    ///
    /// # Errors
    /// Returns `LumenError::InvalidCell` if either coordinate is outside `0..8`.
    pub fn try_new(x: i32, y: i32) -> Result<Self> {
        match (u8::try_from(x), u8::try_from(y)) {
            (Ok(cx), Ok(cy)) if cx < GRID_SIZE && cy < GRID_SIZE => Ok(Self::new(cx, cy)),
            _ => Err(LumenError::InvalidCell { x, y }),
        }
    }

    /// Whether the position lies on the matrix.
    #[must_use]
    pub const fn in_bounds(self) -> bool {
        self.x < GRID_SIZE && self.y < GRID_SIZE
    }

    /// Every position of the matrix, row by row from the top.
    pub fn all() -> impl Iterator<Item = GridPos> {
        (0..GRID_SIZE).flat_map(|y| (0..GRID_SIZE).map(move |x| GridPos::new(x, y)))
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// How grid rows map onto note rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridLayout {
    /// `y = 0` is the top row: `note = 11 + x + 10 * (7 - y)`.
    #[default]
    TopDown,
    /// `y = 0` is the bottom row: `note = 11 + x + 10 * y`.
    BottomUp,
}

impl GridLayout {
    /// Compute the note for a position, or `None` if it is off the matrix.
    #[must_use]
    pub fn note(self, pos: GridPos) -> Option<u8> {
        if !pos.in_bounds() {
            return None;
        }
        let row = match self {
            Self::TopDown => GRID_SIZE - 1 - pos.y,
            Self::BottomUp => pos.y,
        };
        Some(11 + pos.x + 10 * row)
    }
}

/// Precomputed note <-> position bijection for one layout.
///
/// Built once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct GridMap {
    layout: GridLayout,
    notes: [[u8; GRID_SIZE as usize]; GRID_SIZE as usize],
    // Indexed by note number; 128 covers the whole 7-bit range.
    positions: [Option<GridPos>; 128],
}

impl GridMap {
    /// Build the mapping for `layout`.
    #[must_use]
    pub fn new(layout: GridLayout) -> Self {
        let mut notes = [[0u8; GRID_SIZE as usize]; GRID_SIZE as usize];
        let mut positions = [None; 128];
        for pos in GridPos::all() {
            if let Some(note) = layout.note(pos) {
                notes[pos.y as usize][pos.x as usize] = note;
                positions[note as usize] = Some(pos);
            }
        }
        Self {
            layout,
            notes,
            positions,
        }
    }

    /// The layout this map was built for.
    #[must_use]
    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    /// Note number for a position, `None` when off the matrix.
    #[must_use]
    pub fn note_for(&self, pos: GridPos) -> Option<u8> {
        pos.in_bounds()
            .then(|| self.notes[pos.y as usize][pos.x as usize])
    }

    /// Position for a note number, `None` when the note is not a pad.
    #[must_use]
    pub fn pos_for(&self, note: u8) -> Option<GridPos> {
        self.positions.get(note as usize).copied().flatten()
    }

    /// Like [`pos_for`](Self::pos_for) but as an error.
    ///
    /// # Errors
    /// Returns `LumenError::NotAPad` when the note is outside the matrix.
    pub fn require_pos(&self, note: u8) -> Result<GridPos> {
        self.pos_for(note).ok_or(LumenError::NotAPad(note))
    }

    /// All 64 pad notes, row by row from the top.
    pub fn notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.notes.iter().flat_map(|row| row.iter().copied())
    }
}

impl Default for GridMap {
    fn default() -> Self {
        Self::new(GridLayout::default())
    }
}

/// Named round buttons surrounding the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideButton {
    /// Top row, sends Control-Change.
    Top(TopButton),
    /// Right column, sends notes.
    Right(RightButton),
}

/// Top-row buttons in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TopButton {
    Up,
    Down,
    Left,
    Right,
    Session,
    User1,
    User2,
    Mixer,
}

/// Right-column buttons in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum RightButton {
    Volume,
    Pan,
    SendA,
    SendB,
    Stop,
    Mute,
    Solo,
    RecordArm,
}

impl SideButton {
    /// Decode a Control-Change number into a top-row button.
    #[must_use]
    pub fn from_control(cc: u8) -> Option<Self> {
        use TopButton::{Down, Left, Mixer, Right, Session, Up, User1, User2};
        let button = match cc {
            104 => Up,
            105 => Down,
            106 => Left,
            107 => Right,
            108 => Session,
            109 => User1,
            110 => User2,
            111 => Mixer,
            _ => return None,
        };
        Some(Self::Top(button))
    }

    /// Decode a note number into a right-column button.
    #[must_use]
    pub fn from_note(note: u8) -> Option<Self> {
        use RightButton::{Mute, Pan, RecordArm, SendA, SendB, Solo, Stop, Volume};
        let button = match note {
            89 => Volume,
            79 => Pan,
            69 => SendA,
            59 => SendB,
            49 => Stop,
            39 => Mute,
            29 => Solo,
            19 => RecordArm,
            _ => return None,
        };
        Some(Self::Right(button))
    }
}
