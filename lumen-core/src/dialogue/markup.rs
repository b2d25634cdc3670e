//! Inline markup for dialogue text.
//!
//! Two directives, freely nested:
//!
//! - `/speed[v](text)`: reveal `text` `v` times faster
//! - `/anim[v](text)`: bob `text` with amplitude `v`
//!
//! and `/n` for a line break. Anything that does not parse as a directive
//! is kept as literal text.
//!
//! Processing strips directives innermost-first until none remain. Each
//! removal splices the attribute vector in lockstep with the text, so every
//! remaining character keeps the attributes already assigned to it. When
//! two directives of the same kind cover a character, the outer one is
//! applied last and wins.

use std::sync::LazyLock;

use regex::Regex;

// `[^()]*` keeps a match from spanning a nested directive, so the leftmost
// match is always an innermost one.
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(speed|anim)\[(\d+(?:\.\d+)?)\]\(([^()]*)\)")
        .expect("directive pattern is a valid literal")
});

/// Per-character reveal attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharAttr {
    /// Reveal speed multiplier; 1 is the base speed.
    pub speed: f32,
    /// Bob amplitude; 0 means no animation.
    pub anim: f32,
}

impl Default for CharAttr {
    fn default() -> Self {
        Self {
            speed: 1.0,
            anim: 0.0,
        }
    }
}

/// Display text with its attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessedText {
    /// Display string; line breaks are `'\n'`.
    pub text: String,
    /// One entry per non-newline character of `text`, in order. Spaces
    /// have an entry; line breaks do not.
    pub attrs: Vec<CharAttr>,
}

impl ProcessedText {
    /// Non-newline characters paired with their attributes.
    pub fn glyphs(&self) -> impl Iterator<Item = (char, CharAttr)> + '_ {
        self.text
            .chars()
            .filter(|&c| c != '\n')
            .zip(self.attrs.iter().copied())
    }

    /// Display lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

#[derive(Debug, Clone, Copy)]
enum Directive {
    Speed,
    Anim,
}

/// Strip all directives from `input`.
#[must_use]
pub fn process_modifiers(input: &str) -> ProcessedText {
    let mut text = input.replace("/n", "\n");
    // Parallel to `text.chars()`, newlines included until the end.
    let mut attrs = vec![CharAttr::default(); text.chars().count()];

    while let Some((start, end, directive, value, content)) = next_directive(&text) {
        let start_c = text[..start].chars().count();
        let tag_c = text[start..end].chars().count();
        let content_c = content.chars().count();
        // Content sits right before the closing ')'.
        let content_from = start_c + tag_c - 1 - content_c;

        let mut inner: Vec<CharAttr> = attrs[content_from..content_from + content_c].to_vec();
        for attr in &mut inner {
            match directive {
                Directive::Speed => attr.speed = value,
                Directive::Anim => attr.anim = value,
            }
        }
        attrs.splice(start_c..start_c + tag_c, inner);
        text.replace_range(start..end, &content);
    }

    let attrs = text
        .chars()
        .zip(attrs)
        .filter(|&(c, _)| c != '\n')
        .map(|(_, a)| a)
        .collect();
    ProcessedText { text, attrs }
}

fn next_directive(text: &str) -> Option<(usize, usize, Directive, f32, String)> {
    let caps = DIRECTIVE.captures(text)?;
    let whole = caps.get(0)?;
    let directive = match caps.get(1)?.as_str() {
        "speed" => Directive::Speed,
        _ => Directive::Anim,
    };
    // The pattern only admits plain decimals, which always parse.
    let value = caps.get(2)?.as_str().parse::<f32>().ok()?;
    let content = caps.get(3)?.as_str().to_string();
    Some((whole.start(), whole.end(), directive, value, content))
}
