//! Keyboard-driven single choice list.

use crate::core::component::Component;
use crate::core::input::InputEvent;
use crate::core::text::wrap::truncate_to_width;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectItem {
    pub value: String,
    pub label: String,
}

impl SelectItem {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    fn display(&self) -> &str {
        if self.label.is_empty() {
            &self.value
        } else {
            &self.label
        }
    }
}

pub struct SelectListTheme {
    /// Styles the `>>` marker of the highlighted row.
    pub selected_indicator: Box<dyn Fn(&str) -> String>,
    pub unselected_indicator: Box<dyn Fn(&str) -> String>,
    pub label: Box<dyn Fn(&str) -> String>,
    pub scroll_info: Box<dyn Fn(&str) -> String>,
}

impl SelectListTheme {
    pub fn plain() -> Self {
        Self {
            selected_indicator: Box::new(str::to_string),
            unselected_indicator: Box::new(str::to_string),
            label: Box::new(str::to_string),
            scroll_info: Box::new(str::to_string),
        }
    }
}

/// Result of feeding one key to the list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Moved,
    Selected(SelectItem),
    Cancelled,
    Ignored,
}

pub struct SelectList {
    items: Vec<SelectItem>,
    selected_index: usize,
    max_visible: usize,
    theme: SelectListTheme,
    last_outcome: Option<SelectOutcome>,
}

impl SelectList {
    pub fn new(items: Vec<SelectItem>, max_visible: usize, theme: SelectListTheme) -> Self {
        Self {
            items,
            selected_index: 0,
            max_visible,
            theme,
            last_outcome: None,
        }
    }

    pub fn items(&self) -> &[SelectItem] {
        &self.items
    }

    pub fn selected_item(&self) -> Option<&SelectItem> {
        self.items.get(self.selected_index)
    }

    pub fn set_selected_index(&mut self, index: usize) {
        self.selected_index = index.min(self.items.len().saturating_sub(1));
    }

    /// Up/down move with wrap-around, enter selects, escape cancels.
    pub fn handle_key(&mut self, key_id: &str) -> SelectOutcome {
        if self.items.is_empty() {
            return SelectOutcome::Ignored;
        }
        let last = self.items.len() - 1;
        match key_id {
            "up" | "ctrl+p" => {
                self.selected_index = if self.selected_index == 0 {
                    last
                } else {
                    self.selected_index - 1
                };
                SelectOutcome::Moved
            }
            "down" | "ctrl+n" => {
                self.selected_index = if self.selected_index == last {
                    0
                } else {
                    self.selected_index + 1
                };
                SelectOutcome::Moved
            }
            "enter" => self
                .selected_item()
                .cloned()
                .map_or(SelectOutcome::Ignored, SelectOutcome::Selected),
            "escape" => SelectOutcome::Cancelled,
            _ => SelectOutcome::Ignored,
        }
    }

    /// Outcome of the last event delivered through [`Component::handle_event`].
    pub fn take_outcome(&mut self) -> Option<SelectOutcome> {
        self.last_outcome.take()
    }

    fn visible_range(&self) -> (usize, usize) {
        let max_visible = self.max_visible.max(1).min(self.items.len());
        let start = if self.items.len() <= max_visible {
            0
        } else {
            self.selected_index
                .saturating_sub(max_visible / 2)
                .min(self.items.len() - max_visible)
        };
        (start, start + max_visible)
    }
}

impl Component for SelectList {
    fn render(&mut self, width: usize) -> Vec<String> {
        let (start, end) = self.visible_range();
        let mut lines: Vec<String> = self.items[start..end]
            .iter()
            .enumerate()
            .map(|(offset, item)| {
                let indicator = if start + offset == self.selected_index {
                    (self.theme.selected_indicator)(">>")
                } else {
                    (self.theme.unselected_indicator)("  ")
                };
                let label = truncate_to_width(item.display(), width.saturating_sub(3), "…");
                format!("{indicator} {}", (self.theme.label)(&label))
            })
            .collect();

        if start > 0 || end < self.items.len() {
            let info = format!("  ({}/{})", self.selected_index + 1, self.items.len());
            lines.push((self.theme.scroll_info)(&info));
        }
        lines
    }

    fn handle_event(&mut self, event: &InputEvent) {
        if let Some(key_id) = event.key_id() {
            let outcome = self.handle_key(key_id);
            self.last_outcome = Some(outcome);
        }
    }
}
