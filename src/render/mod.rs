//! Rendering of component output to terminal bytes.

pub mod renderer;

pub use renderer::InlineRenderer;
