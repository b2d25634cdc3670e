//! Preset pixel-art images for the pad matrix.
//!
//! Each image is an 8x8 table of palette colors, indexed `[y][x]` with
//! `y = 0` at the top, plus the swatches it uses, shown on the right-column
//! buttons.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid::{GridMap, GridPos, RIGHT_BUTTONS};
use crate::led::{self, palette, LedCommand, LedSurface};

/// An 8x8 image of palette colors, `[y][x]`.
pub type Image = [[u8; 8]; 8];

const ALIEN: Image = [
    [0, 0, 0, 17, 17, 0, 0, 0],
    [0, 0, 25, 25, 25, 25, 0, 0],
    [0, 17, 16, 16, 16, 16, 17, 0],
    [0, 0, 3, 29, 29, 3, 0, 0],
    [0, 0, 37, 29, 29, 37, 0, 0],
    [0, 29, 0, 17, 17, 0, 29, 0],
    [16, 0, 29, 0, 0, 29, 0, 16],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

const GHOST: Image = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 41, 41, 41, 0, 0, 0],
    [0, 41, 36, 36, 36, 41, 0, 0],
    [0, 45, 3, 36, 3, 45, 0, 0],
    [0, 45, 45, 45, 45, 45, 0, 0],
    [0, 45, 41, 45, 41, 45, 0, 0],
    [0, 45, 45, 45, 45, 45, 0, 0],
    [0, 45, 0, 45, 0, 45, 0, 0],
];

const HEART: Image = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 5, 5, 0, 0, 5, 5, 0],
    [5, 4, 5, 5, 5, 5, 5, 5],
    [5, 4, 5, 5, 5, 5, 5, 5],
    [0, 5, 5, 5, 5, 5, 5, 0],
    [0, 0, 5, 5, 5, 5, 0, 0],
    [0, 0, 0, 5, 5, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

/// The preset images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelArtImage {
    /// Green alien with antennas.
    #[default]
    Alien,
    /// Blue ghost.
    Ghost,
    /// Red heart.
    Heart,
}

impl PixelArtImage {
    /// Map a scene "display mode" number (1 = alien, 2 = ghost, 3 = heart).
    #[must_use]
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode {
            1 => Some(Self::Alien),
            2 => Some(Self::Ghost),
            3 => Some(Self::Heart),
            _ => None,
        }
    }

    /// The image data.
    #[must_use]
    pub fn pixels(self) -> &'static Image {
        match self {
            Self::Alien => &ALIEN,
            Self::Ghost => &GHOST,
            Self::Heart => &HEART,
        }
    }

    /// Swatches shown on the right column, off first.
    #[must_use]
    pub fn palette(self) -> &'static [u8] {
        match self {
            Self::Alien => &[0, 3, 16, 17, 25, 29, 37],
            Self::Ghost => &[0, 3, 36, 41, 45],
            Self::Heart => &[0, 4, 5],
        }
    }
}

impl std::str::FromStr for PixelArtImage {
    type Err = crate::LumenError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "alien" => Ok(Self::Alien),
            "ghost" => Ok(Self::Ghost),
            "heart" => Ok(Self::Heart),
            other => Err(crate::LumenError::Config(format!(
                "unknown image '{other}' (expected alien, ghost or heart)"
            ))),
        }
    }
}

/// Draws images on a surface and remembers which one is up.
#[derive(Debug, Clone)]
pub struct PixelArtDisplay {
    grid: GridMap,
    current: Option<PixelArtImage>,
}

impl PixelArtDisplay {
    /// Create a display with nothing shown.
    #[must_use]
    pub fn new(grid: GridMap) -> Self {
        Self {
            grid,
            current: None,
        }
    }

    /// Image currently displayed.
    #[must_use]
    pub fn current(&self) -> Option<PixelArtImage> {
        self.current
    }

    /// Clear the matrix and right column, then draw `image` and its palette.
    pub fn show(&mut self, image: PixelArtImage, surface: &mut dyn LedSurface) {
        debug!(?image, "showing pixel art");
        self.clear(surface);
        for (y, row) in image.pixels().iter().enumerate() {
            for (x, &color) in row.iter().enumerate() {
                // x, y < 8.
                let pos = GridPos::new(
                    u8::try_from(x).unwrap_or(u8::MAX),
                    u8::try_from(y).unwrap_or(u8::MAX),
                );
                led::set_pixel(surface, &self.grid, pos, color);
            }
        }
        for (&note, &color) in RIGHT_BUTTONS.iter().zip(image.palette()) {
            led::send_logged(surface, LedCommand::Note { note, color });
        }
        self.current = Some(image);
    }

    /// Draw the current image again, e.g. after the device reconnected.
    pub fn redraw(&mut self, surface: &mut dyn LedSurface) {
        match self.current {
            Some(image) => self.show(image, surface),
            None => warn!("redraw requested with no image selected"),
        }
    }

    /// Turn off the matrix and the right column.
    pub fn clear(&mut self, surface: &mut dyn LedSurface) {
        led::clear_grid(surface, &self.grid);
        for note in RIGHT_BUTTONS {
            led::send_logged(
                surface,
                LedCommand::Note {
                    note,
                    color: palette::OFF,
                },
            );
        }
        self.current = None;
    }
}
