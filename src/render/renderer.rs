//! Inline frame renderer.
//!
//! Frames are drawn below the shell prompt rather than on an alternate
//! screen. Each render rewrites the frame from its first changed line
//! downwards; lines that scrolled above the viewport can no longer be
//! reached, so changes there are redrawn from the top visible row.

use crate::core::text::width::visible_width;
use crate::core::text::wrap::truncate_to_width;

const SEGMENT_RESET: &str = "\x1b[0m\x1b]8;;\x07";
const SYNC_START: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";
const CLEAR_TO_END: &str = "\x1b[J";

#[derive(Debug, Default)]
pub struct InlineRenderer {
    previous: Vec<String>,
    previous_width: usize,
}

impl InlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_lines(&self) -> &[String] {
        &self.previous
    }

    /// Returns the bytes that turn the previous frame into `lines`.
    /// Empty when nothing changed.
    pub fn render(&mut self, lines: &[String], width: usize, height: usize) -> String {
        let lines = clamp_lines(lines, width);
        let width_changed = self.previous_width != 0 && self.previous_width != width;
        self.previous_width = width;

        if self.previous.is_empty() {
            let mut buffer = String::from(SYNC_START);
            buffer.push_str(&lines.join("\r\n"));
            buffer.push_str(SYNC_END);
            self.previous = lines;
            return buffer;
        }

        let first_changed = if width_changed {
            Some(0)
        } else {
            first_difference(&self.previous, &lines)
        };
        let Some(first_changed) = first_changed else {
            return String::new();
        };

        let cursor_row = self.previous.len() - 1;
        let top_reachable = self.previous.len().saturating_sub(height.max(1));
        let start = first_changed.max(top_reachable);

        let mut buffer = String::from(SYNC_START);
        if start > cursor_row {
            buffer.push_str("\r\n");
        } else {
            let up = cursor_row - start;
            if up > 0 {
                buffer.push_str(&format!("\x1b[{up}A"));
            }
            buffer.push('\r');
        }
        buffer.push_str(CLEAR_TO_END);

        if start < lines.len() {
            buffer.push_str(&lines[start..].join("\r\n"));
        } else if !lines.is_empty() {
            let back = start - (lines.len() - 1);
            buffer.push_str(&format!("\x1b[{back}A"));
        }
        buffer.push_str(SYNC_END);

        self.previous = lines;
        buffer
    }

    /// Moves the cursor below the last frame so later output starts on a
    /// fresh line.
    pub fn finish(&mut self) -> String {
        let out = if self.previous.is_empty() {
            String::new()
        } else {
            "\r\n".to_string()
        };
        self.previous.clear();
        self.previous_width = 0;
        out
    }
}

fn clamp_lines(lines: &[String], width: usize) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let mut line = if width > 0 && visible_width(line) > width {
                truncate_to_width(line, width, "")
            } else {
                line.clone()
            };
            line.push_str(SEGMENT_RESET);
            line
        })
        .collect()
}

fn first_difference(previous: &[String], next: &[String]) -> Option<usize> {
    let shared = previous.len().min(next.len());
    (0..shared)
        .find(|&idx| previous[idx] != next[idx])
        .or((previous.len() != next.len()).then_some(shared))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    fn reset(line: &str) -> String {
        format!("{line}{SEGMENT_RESET}")
    }

    #[test]
    fn first_render_writes_every_line() {
        let mut renderer = InlineRenderer::new();
        let out = renderer.render(&frame(&["a", "b"]), 10, 5);
        assert_eq!(
            out,
            format!("{SYNC_START}{}\r\n{}{SYNC_END}", reset("a"), reset("b"))
        );
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&frame(&["a", "b"]), 10, 5);
        assert_eq!(renderer.render(&frame(&["a", "b"]), 10, 5), "");
    }

    #[test]
    fn changed_tail_is_redrawn_in_place() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&frame(&["a", "b", "c"]), 10, 5);
        let out = renderer.render(&frame(&["a", "B", "c"]), 10, 5);
        assert_eq!(
            out,
            format!(
                "{SYNC_START}\x1b[1A\r{CLEAR_TO_END}{}\r\n{}{SYNC_END}",
                reset("B"),
                reset("c")
            )
        );
    }

    #[test]
    fn appended_lines_start_after_previous_frame() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&frame(&["a"]), 10, 5);
        let out = renderer.render(&frame(&["a", "b"]), 10, 5);
        assert_eq!(
            out,
            format!("{SYNC_START}\r\n{CLEAR_TO_END}{}{SYNC_END}", reset("b"))
        );
    }

    #[test]
    fn shrinking_frame_clears_and_returns_to_last_line() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&frame(&["a", "b", "c"]), 10, 5);
        let out = renderer.render(&frame(&["a"]), 10, 5);
        assert_eq!(
            out,
            format!("{SYNC_START}\x1b[1A\r{CLEAR_TO_END}\x1b[1A{SYNC_END}")
        );
        assert_eq!(renderer.previous_lines(), &[reset("a")]);
    }

    #[test]
    fn changes_above_viewport_redraw_from_top_visible_row() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&frame(&["1", "2", "3", "4"]), 10, 2);
        let out = renderer.render(&frame(&["x", "2", "3", "4"]), 10, 2);
        assert!(out.starts_with(&format!("{SYNC_START}\x1b[1A\r")));
        assert!(out.contains(&reset("3")));
        assert!(!out.contains(&reset("x")));
    }

    #[test]
    fn long_lines_are_clamped_to_width() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&frame(&["abcdef"]), 3, 5);
        assert_eq!(
            renderer.previous_lines(),
            &[format!("abc\x1b[0m{SEGMENT_RESET}")]
        );
    }

    #[test]
    fn finish_moves_below_frame_once() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&frame(&["a"]), 10, 5);
        assert_eq!(renderer.finish(), "\r\n");
        assert_eq!(renderer.finish(), "");
    }
}
