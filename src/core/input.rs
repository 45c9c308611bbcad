//! Legacy terminal key parsing.
//!
//! Raw mode without keyboard protocol extensions delivers keys as single
//! control bytes or short escape sequences. Chunks read from stdin may hold
//! several keys at once, so [`parse_input_events`] splits them first.

use crate::core::text::ansi::extract_escape;

/// Input event delivered to components.
///
/// `raw` is the exact sequence received from the terminal; `key_id` is a
/// normalized identifier such as `enter`, `up` or `ctrl+c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key { raw: String, key_id: String },
    Text { raw: String, text: String },
}

impl InputEvent {
    pub fn key_id(&self) -> Option<&str> {
        match self {
            Self::Key { key_id, .. } => Some(key_id),
            Self::Text { .. } => None,
        }
    }
}

fn legacy_sequence_key_id(data: &str) -> Option<&'static str> {
    match data {
        "\x1b[A" | "\x1bOA" => Some("up"),
        "\x1b[B" | "\x1bOB" => Some("down"),
        "\x1b[C" | "\x1bOC" => Some("right"),
        "\x1b[D" | "\x1bOD" => Some("left"),
        "\x1b[H" | "\x1bOH" | "\x1b[1~" | "\x1b[7~" => Some("home"),
        "\x1b[F" | "\x1bOF" | "\x1b[4~" | "\x1b[8~" => Some("end"),
        "\x1b[2~" => Some("insert"),
        "\x1b[3~" => Some("delete"),
        "\x1b[5~" => Some("pageUp"),
        "\x1b[6~" => Some("pageDown"),
        "\x1b[Z" => Some("shift+tab"),
        "\x1bOM" => Some("enter"),
        _ => None,
    }
}

/// Maps one key sequence to its key id. Printable text returns `None`.
pub fn parse_key(data: &str) -> Option<String> {
    if let Some(key_id) = legacy_sequence_key_id(data) {
        return Some(key_id.to_string());
    }

    match data {
        "\x1b" => return Some("escape".to_string()),
        "\r" | "\n" => return Some("enter".to_string()),
        "\t" => return Some("tab".to_string()),
        "\x7f" | "\x08" => return Some("backspace".to_string()),
        "\x00" => return Some("ctrl+space".to_string()),
        _ => {}
    }

    let mut chars = data.chars();
    let first = chars.next()?;
    let second = chars.next();

    match (first, second, chars.next()) {
        (ch @ '\x01'..='\x1a', None, None) => {
            let letter = char::from(b'a' + (ch as u8 - 1));
            Some(format!("ctrl+{letter}"))
        }
        ('\x1b', Some(ch), None) if ch.is_ascii_graphic() => {
            Some(format!("alt+{}", ch.to_ascii_lowercase()))
        }
        ('\x1b', Some('\r'), None) => Some("alt+enter".to_string()),
        _ => None,
    }
}

/// Splits a raw chunk into individual key sequences. Consecutive printable
/// characters stay together as one run.
pub fn split_sequences(data: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut idx = 0;
    let mut text_start: Option<usize> = None;

    while idx < data.len() {
        let rest = &data[idx..];
        let Some(ch) = rest.chars().next() else {
            break;
        };

        let sequence_len = if ch == '\x1b' {
            Some(
                extract_escape(data, idx)
                    .map(|escape| escape.len())
                    .or_else(|| rest[1..].chars().next().map(|next| 1 + next.len_utf8()))
                    .unwrap_or(1),
            )
        } else if ch.is_control() {
            Some(ch.len_utf8())
        } else {
            None
        };

        match sequence_len {
            Some(len) => {
                if let Some(start) = text_start.take() {
                    parts.push(&data[start..idx]);
                }
                parts.push(&data[idx..idx + len]);
                idx += len;
            }
            None => {
                text_start.get_or_insert(idx);
                idx += ch.len_utf8();
            }
        }
    }

    if let Some(start) = text_start {
        parts.push(&data[start..]);
    }
    parts
}

pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    split_sequences(data)
        .into_iter()
        .map(|part| match parse_key(part) {
            Some(key_id) => InputEvent::Key {
                raw: part.to_string(),
                key_id,
            },
            None => InputEvent::Text {
                raw: part.to_string(),
                text: part.to_string(),
            },
        })
        .collect()
}
