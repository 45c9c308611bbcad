//! Component trait.

use crate::core::input::InputEvent;

/// Something that draws itself as lines and may react to keys.
pub trait Component {
    /// Lines for a frame `width` columns wide. Lines may carry ANSI styling.
    fn render(&mut self, width: usize) -> Vec<String>;

    fn handle_event(&mut self, _event: &InputEvent) {}
}
