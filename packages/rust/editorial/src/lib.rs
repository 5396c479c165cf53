//! Editorial logic: weekly theme rotation and prompt composition.
//!
//! Both halves are pure. Nothing here performs I/O or keeps state between
//! calls; the same week and the same stories always produce the same prompt.

pub mod prompt;
pub mod theme;

pub use prompt::{
    ComposedPrompt, ItemSummary, MAX_FEATURED_ITEMS, MAX_SYNOPSIS_CHARS, compose, strip_html,
    summarize,
};
pub use theme::{
    CHARACTER_TYPES, MOODS, RotationPick, TROPES, TemplateKind, Theme, date_range, iso_week,
    rotation_for_week, select_theme, validate_week,
};
