//! Text helpers (ANSI parsing, width calculations, wrapping, truncation).
//!
//! These helpers are pure (string in/string out) so widgets and document
//! rendering can share them without touching the terminal.

pub mod ansi;
pub mod width;
pub mod wrap;
