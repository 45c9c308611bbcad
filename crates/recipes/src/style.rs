//! SGR helpers. Each closes only what it opened so styles nest.

pub fn bold(text: &str) -> String {
    format!("\x1b[1m{text}\x1b[22m")
}

pub fn italic(text: &str) -> String {
    format!("\x1b[3m{text}\x1b[23m")
}

pub fn underline(text: &str) -> String {
    format!("\x1b[4m{text}\x1b[24m")
}

pub fn red(text: &str) -> String {
    format!("\x1b[31m{text}\x1b[39m")
}

pub fn green(text: &str) -> String {
    format!("\x1b[32m{text}\x1b[39m")
}

pub fn yellow(text: &str) -> String {
    format!("\x1b[33m{text}\x1b[39m")
}

pub fn magenta_bright(text: &str) -> String {
    format!("\x1b[95m{text}\x1b[39m")
}

pub fn on_black(text: &str) -> String {
    format!("\x1b[40m{text}\x1b[49m")
}

pub fn dim(text: &str) -> String {
    format!("\x1b[2m{text}\x1b[22m")
}

/// OSC 8 hyperlink around `text`.
pub fn hyperlink(url: &str, text: &str) -> String {
    format!("\x1b]8;;{url}\x07{text}\x1b]8;;\x07")
}
