//! ANSI escape extraction and SGR style tracking.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    Csi,
    Osc,
    Apc,
    Dcs,
    Ss3,
}

/// One complete escape sequence borrowed from its source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escape<'a> {
    pub code: &'a str,
    pub kind: EscapeKind,
}

impl Escape<'_> {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn is_sgr(&self) -> bool {
        self.kind == EscapeKind::Csi && self.code.ends_with('m')
    }
}

/// Returns the escape sequence starting at byte `pos`, if it is complete.
pub fn extract_escape(input: &str, pos: usize) -> Option<Escape<'_>> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }

    let (kind, end) = match *bytes.get(pos + 1)? {
        b'[' => (EscapeKind::Csi, csi_end(bytes, pos + 2)?),
        b']' => (EscapeKind::Osc, string_terminator_end(bytes, pos + 2)?),
        b'_' => (EscapeKind::Apc, string_terminator_end(bytes, pos + 2)?),
        b'P' => (EscapeKind::Dcs, string_terminator_end(bytes, pos + 2)?),
        b'O' if pos + 2 < bytes.len() => (EscapeKind::Ss3, pos + 3),
        _ => return None,
    };

    input.get(pos..end).map(|code| Escape { code, kind })
}

fn csi_end(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|byte| (0x40..=0x7e).contains(byte))
        .map(|offset| from + offset + 1)
}

/// End of a BEL or ST (`ESC \`) terminated string sequence.
fn string_terminator_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut idx = from;
    while idx < bytes.len() {
        match bytes[idx] {
            0x07 => return Some(idx + 1),
            0x1b if bytes.get(idx + 1) == Some(&b'\\') => return Some(idx + 2),
            _ => idx += 1,
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Escape(Escape<'a>),
    Text(&'a str),
}

/// Splits a string into alternating escape sequences and plain text runs.
///
/// An `ESC` that does not start a complete sequence is kept as text.
pub fn segments(input: &str) -> Segments<'_> {
    Segments { input, pos: 0 }
}

#[derive(Debug, Clone)]
pub struct Segments<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.input.get(self.pos..).filter(|rest| !rest.is_empty())?;

        if let Some(escape) = extract_escape(self.input, self.pos) {
            self.pos += escape.len();
            return Some(Segment::Escape(escape));
        }

        let first = rest.chars().next().map_or(1, char::len_utf8);
        let mut end = rest.len();
        let mut search = first;
        while let Some(offset) = rest[search..].find('\x1b') {
            let candidate = search + offset;
            if extract_escape(self.input, self.pos + candidate).is_some() {
                end = candidate;
                break;
            }
            search = candidate + 1;
        }

        self.pos += end;
        Some(Segment::Text(&rest[..end]))
    }
}

pub fn strip_ansi(input: &str) -> String {
    segments(input)
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(text),
            Segment::Escape(_) => None,
        })
        .collect()
}

/// (set, reset) SGR parameters for the boolean attributes.
const ATTRIBUTES: [(u16, u16); 8] = [
    (1, 22),
    (2, 22),
    (3, 23),
    (4, 24),
    (5, 25),
    (7, 27),
    (8, 28),
    (9, 29),
];
const UNDERLINE: usize = 3;

/// Active SGR state, replayed at the start of wrapped continuation lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleState {
    attributes: [bool; ATTRIBUTES.len()],
    foreground: Option<String>,
    background: Option<String>,
}

impl StyleState {
    /// Folds one escape into the state; non-SGR escapes are ignored.
    pub fn apply(&mut self, code: &str) {
        let Some(params) = code
            .strip_prefix("\x1b[")
            .and_then(|rest| rest.strip_suffix('m'))
        else {
            return;
        };

        if params.is_empty() {
            self.reset();
            return;
        }

        let parts: Vec<&str> = params.split(';').collect();
        let mut idx = 0;
        while idx < parts.len() {
            let value = parts[idx].parse::<u16>().unwrap_or(0);
            if value == 38 || value == 48 {
                let span = match parts.get(idx + 1).copied() {
                    Some("5") => 3,
                    Some("2") => 5,
                    _ => 1,
                };
                if span > 1 && idx + span <= parts.len() {
                    let color = parts[idx..idx + span].join(";");
                    if value == 38 {
                        self.foreground = Some(color);
                    } else {
                        self.background = Some(color);
                    }
                    idx += span;
                    continue;
                }
            }
            self.apply_param(value);
            idx += 1;
        }
    }

    fn apply_param(&mut self, value: u16) {
        match value {
            0 => self.reset(),
            21 => self.attributes[0] = false,
            39 => self.foreground = None,
            49 => self.background = None,
            30..=37 | 90..=97 => self.foreground = Some(value.to_string()),
            40..=47 | 100..=107 => self.background = Some(value.to_string()),
            _ => {
                for (slot, (on, off)) in ATTRIBUTES.iter().enumerate() {
                    if value == *on {
                        self.attributes[slot] = true;
                    } else if value == *off {
                        self.attributes[slot] = false;
                    }
                }
            }
        }
    }

    pub fn is_plain(&self) -> bool {
        self == &Self::default()
    }

    /// One SGR sequence restoring the current state, or empty when plain.
    pub fn prefix(&self) -> String {
        let mut params: Vec<String> = ATTRIBUTES
            .iter()
            .zip(self.attributes)
            .filter(|(_, active)| *active)
            .map(|((on, _), _)| on.to_string())
            .collect();
        params.extend(self.foreground.iter().cloned());
        params.extend(self.background.iter().cloned());

        if params.is_empty() {
            String::new()
        } else {
            format!("\x1b[{}m", params.join(";"))
        }
    }

    /// Underline would bleed into the padding of a wrapped line.
    pub fn line_end_reset(&self) -> &'static str {
        if self.attributes[UNDERLINE] {
            "\x1b[24m"
        } else {
            ""
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
