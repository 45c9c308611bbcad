//! Word wrapping and truncation that keep ANSI styling intact.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{segments, Segment, StyleState};
use super::width::{grapheme_width, visible_width};

const ANSI_RESET: &str = "\x1b[0m";

/// Wraps `text` to `width` columns, splitting on spaces and breaking words
/// longer than a line. Active styles are re-opened on every continuation line
/// and explicit `\n` breaks are kept.
pub fn wrap_text_with_ansi(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() || width == 0 {
        return vec![String::new()];
    }

    let mut style = StyleState::default();
    let mut lines = Vec::new();
    for source_line in text.split('\n') {
        let mut wrapper = LineWrapper::new(width, style);
        for token in tokenize(source_line) {
            wrapper.push(&token);
        }
        let (wrapped, carried) = wrapper.finish();
        lines.extend(wrapped);
        style = carried;
    }
    lines
}

#[derive(Debug)]
struct Token {
    text: String,
    width: usize,
    blank: bool,
}

/// Splits on space boundaries; escapes stick to the token that follows them.
fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut current_blank = false;
    let mut pending_codes = String::new();

    for segment in segments(line) {
        let text = match segment {
            Segment::Escape(escape) => {
                pending_codes.push_str(escape.code);
                continue;
            }
            Segment::Text(text) => text,
        };

        for grapheme in text.graphemes(true) {
            let blank = grapheme == " ";
            if blank != current_blank && current_width > 0 {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    width: current_width,
                    blank: current_blank,
                });
                current_width = 0;
            }
            current.push_str(&pending_codes);
            pending_codes.clear();
            current.push_str(grapheme);
            current_width += grapheme_width(grapheme);
            current_blank = blank;
        }
    }

    current.push_str(&pending_codes);
    if !current.is_empty() {
        tokens.push(Token {
            text: current,
            width: current_width,
            blank: current_blank,
        });
    }
    tokens
}

struct LineWrapper {
    width: usize,
    style: StyleState,
    lines: Vec<String>,
    current: String,
    current_width: usize,
    prefix_len: usize,
}

impl LineWrapper {
    fn new(width: usize, style: StyleState) -> Self {
        let current = style.prefix();
        Self {
            width,
            prefix_len: current.len(),
            style,
            lines: Vec::new(),
            current,
            current_width: 0,
        }
    }

    fn push(&mut self, token: &Token) {
        if token.blank {
            if self.current_width + token.width > self.width {
                self.break_line();
            }
            // continuation lines never start with spaces
            if self.current_width == 0 && !self.lines.is_empty() {
                self.append_codes_only(&token.text);
            } else {
                self.append(&token.text, token.width);
            }
            return;
        }

        if token.width > self.width {
            self.append_broken(&token.text);
            return;
        }

        if self.current_width > 0 && self.current_width + token.width > self.width {
            self.break_line();
        }
        self.append(&token.text, token.width);
    }

    fn append(&mut self, text: &str, width: usize) {
        self.current.push_str(text);
        self.current_width += width;
        self.track(text);
    }

    fn append_codes_only(&mut self, text: &str) {
        for segment in segments(text) {
            if let Segment::Escape(escape) = segment {
                self.current.push_str(escape.code);
                self.style.apply(escape.code);
            }
        }
    }

    fn append_broken(&mut self, text: &str) {
        for segment in segments(text) {
            match segment {
                Segment::Escape(escape) => {
                    self.current.push_str(escape.code);
                    self.style.apply(escape.code);
                }
                Segment::Text(run) => {
                    for grapheme in run.graphemes(true) {
                        let width = grapheme_width(grapheme);
                        if self.current_width > 0 && self.current_width + width > self.width {
                            self.break_line();
                        }
                        self.current.push_str(grapheme);
                        self.current_width += width;
                    }
                }
            }
        }
    }

    fn track(&mut self, text: &str) {
        for segment in segments(text) {
            if let Segment::Escape(escape) = segment {
                self.style.apply(escape.code);
            }
        }
    }

    fn break_line(&mut self) {
        let mut line = self.current.trim_end_matches(' ').to_string();
        line.push_str(self.style.line_end_reset());
        self.lines.push(line);
        self.current = self.style.prefix();
        self.prefix_len = self.current.len();
        self.current_width = 0;
    }

    fn finish(mut self) -> (Vec<String>, StyleState) {
        if self.current_width > 0 || self.lines.is_empty() {
            self.lines.push(self.current.trim_end_matches(' ').to_string());
        } else if let Some(tail) = self.current.get(self.prefix_len..) {
            if let Some(last) = self.lines.last_mut() {
                last.push_str(tail);
            }
        }
        (self.lines, self.style)
    }
}

/// Cuts `text` to at most `max_width` columns, ending in a reset plus
/// `ellipsis` when anything was removed.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    if ellipsis_width >= max_width {
        return take_columns(ellipsis, max_width);
    }

    let mut truncated = take_columns(text, max_width - ellipsis_width);
    truncated.push_str(ANSI_RESET);
    truncated.push_str(ellipsis);
    truncated
}

fn take_columns(text: &str, columns: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut used = 0;
    for segment in segments(text) {
        match segment {
            Segment::Escape(escape) => out.push_str(escape.code),
            Segment::Text(run) => {
                for grapheme in run.graphemes(true) {
                    let width = grapheme_width(grapheme);
                    if used + width > columns {
                        return out;
                    }
                    out.push_str(grapheme);
                    used += width;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{truncate_to_width, wrap_text_with_ansi};

    #[test]
    fn word_wrap_splits_on_spaces() {
        assert_eq!(wrap_text_with_ansi("word word", 4), vec!["word", "word"]);
    }

    #[test]
    fn no_leading_whitespace_on_wrap() {
        let wrapped = wrap_text_with_ansi("word  word", 4);
        assert_eq!(wrapped, vec!["word", "word"]);
    }

    #[test]
    fn explicit_newlines_are_kept() {
        assert_eq!(wrap_text_with_ansi("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn long_words_are_broken() {
        assert_eq!(wrap_text_with_ansi("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn styles_are_reopened_on_continuation_lines() {
        let wrapped = wrap_text_with_ansi("\x1b[31mword word\x1b[39m", 4);
        assert_eq!(wrapped.len(), 2);
        assert!(wrapped[0].starts_with("\x1b[31m"));
        assert!(wrapped[1].starts_with("\x1b[31m"));
        assert!(wrapped[1].ends_with("\x1b[39m"));
    }

    #[test]
    fn underline_is_closed_before_a_wrap() {
        let wrapped = wrap_text_with_ansi("\x1b[4mword word\x1b[24m", 4);
        assert_eq!(wrapped[0], "\x1b[4mword\x1b[24m");
        assert_eq!(wrapped[1], "\x1b[4mword\x1b[24m");
    }

    #[test]
    fn truncation_appends_reset_and_ellipsis() {
        assert_eq!(truncate_to_width("hello", 10, "…"), "hello");
        assert_eq!(truncate_to_width("hello world", 6, "…"), "hello\x1b[0m…");
        assert_eq!(
            truncate_to_width("\x1b[1mbold text\x1b[22m", 4, ""),
            "\x1b[1mbold\x1b[0m"
        );
    }
}
