//! 3D dialogue text.
//!
//! A dialogue string goes through three stages:
//!
//! 1. [`markup`] strips the inline `/speed[..](..)`, `/anim[..](..)` and
//!    `/n` directives into a display string plus per-character attributes.
//! 2. [`reveal`] lays the characters out as glyph placements with a delay
//!    after each one.
//! 3. [`stage`] plays placements frame by frame, holds the finished text,
//!    then drops it and moves on to the next.

pub mod markup;
pub mod reveal;
pub mod stage;

pub use markup::{process_modifiers, CharAttr, ProcessedText};
pub use reveal::{glyph_name, layout_reveal, GlyphLibrary, GlyphPlacement, GlyphSet};
pub use stage::DialogueStage;
