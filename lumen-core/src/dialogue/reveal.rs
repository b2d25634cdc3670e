//! Glyph placement for the letter-by-letter reveal.

use std::collections::HashSet;

use tracing::warn;
use vek::Vec3;

use super::markup::ProcessedText;
use crate::config::DialogueConfig;

/// Which glyph models exist.
pub trait GlyphSet {
    /// Whether a glyph named `name` can be spawned.
    fn contains(&self, name: &str) -> bool;
}

/// A set of glyph names.
#[derive(Debug, Clone, Default)]
pub struct GlyphLibrary {
    names: HashSet<String>,
}

impl GlyphLibrary {
    /// Library with exactly these names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Lowercase and uppercase letters, digits and the named punctuation.
    #[must_use]
    pub fn standard() -> Self {
        let lower = ('a'..='z').map(String::from);
        let upper = ('A'..='Z').map(|c| format!("M_{c}"));
        let digits = ('0'..='9').map(String::from);
        let punct = ["Slash", "QuestionMark", "Colon", "QuotationMarks", "Period"]
            .into_iter()
            .map(String::from);
        Self {
            names: lower.chain(upper).chain(digits).chain(punct).collect(),
        }
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl GlyphSet for GlyphLibrary {
    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Model name for a character.
#[must_use]
pub fn glyph_name(ch: char) -> String {
    match ch {
        '/' => "Slash".to_string(),
        '?' => "QuestionMark".to_string(),
        ':' => "Colon".to_string(),
        '"' => "QuotationMarks".to_string(),
        '.' => "Period".to_string(),
        c if c.is_uppercase() => format!("M_{c}"),
        c => c.to_string(),
    }
}

/// One glyph to spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPlacement {
    /// Source character.
    pub ch: char,
    /// Model name.
    pub glyph: String,
    /// Offset from the dialogue anchor; lines grow towards -y.
    pub offset: Vec3<f32>,
    /// Seconds to wait after spawning this glyph.
    pub delay: f32,
    /// Bob amplitude, when animated.
    pub bob: Option<f32>,
}

/// Seconds to wait after a glyph revealed at `speed`.
///
/// Non-positive speeds fall back to the base delay.
#[must_use]
pub fn reveal_delay(base: f32, speed: f32) -> f32 {
    if speed > 0.0 { base / speed } else { base }
}

/// Lay out a processed text.
///
/// Characters without a glyph are skipped: they neither advance the pen nor
/// add a delay, but they still consume their attribute slot.
pub fn layout_reveal(
    processed: &ProcessedText,
    settings: &DialogueConfig,
    glyphs: &dyn GlyphSet,
) -> Vec<GlyphPlacement> {
    let mut placements = Vec::new();
    let mut slot = 0usize;
    let mut y = 0.0f32;

    for line in processed.lines() {
        let mut x = 0.0f32;
        let mut words = line.split(' ').peekable();
        while let Some(word) = words.next() {
            for ch in word.chars() {
                let attr = processed.attrs.get(slot).copied().unwrap_or_default();
                slot += 1;

                let glyph = glyph_name(ch);
                if !glyphs.contains(&glyph) {
                    warn!(%glyph, "no glyph for character, skipping");
                    continue;
                }
                placements.push(GlyphPlacement {
                    ch,
                    glyph,
                    offset: Vec3::new(x, -y, 0.0),
                    delay: reveal_delay(settings.reveal_speed, attr.speed),
                    bob: (attr.anim > 0.0).then_some(attr.anim),
                });
                x += settings.character_spacing;
            }
            if words.peek().is_some() {
                x += settings.word_spacing;
                // The space has its own slot.
                slot += 1;
            }
        }
        y += settings.line_spacing;
    }
    placements
}

/// Total reveal time of a layout.
#[must_use]
pub fn reveal_time(placements: &[GlyphPlacement]) -> f32 {
    placements.iter().map(|p| p.delay).sum()
}
