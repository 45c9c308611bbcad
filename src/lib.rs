//! Inline terminal toolkit.
//!
//! Frames are drawn below the prompt by [`InlineRenderer`], which rewrites
//! only the lines that changed. Widgets implement [`Component`] and receive
//! parsed [`InputEvent`]s. Terminal access goes through the [`Terminal`]
//! trait so callers can swap in a fake for tests.

#![allow(clippy::new_without_default, clippy::type_complexity)]

pub mod config;
pub mod logging;

pub mod core;
pub mod highlight;
pub mod platform;
pub mod render;
pub mod widgets;

pub use crate::config::EnvConfig;
pub use crate::core::component::Component;
pub use crate::core::input::{parse_input_events, parse_key, InputEvent};
pub use crate::core::terminal::Terminal;
pub use crate::highlight::{highlight_code, prewarm_highlighting};
pub use crate::render::InlineRenderer;
pub use crate::widgets::{
    BorderBox, BorderStyle, SelectItem, SelectList, SelectListTheme, SelectOutcome, Spinner,
    SPINNER_FRAMES, SPINNER_INTERVAL,
};

#[cfg(unix)]
pub use crate::platform::process_terminal::ProcessTerminal;

/// ANSI-aware wrapping helper.
pub use crate::core::text::wrap::{truncate_to_width, wrap_text_with_ansi};
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
/// Removes escape sequences, leaving only printable text.
pub use crate::core::text::ansi::strip_ansi;
