//! Syntax highlighting for fenced code blocks.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const THEME_NAME: &str = "base16-ocean.dark";
const RESET: &str = "\x1b[0m";

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Loads syntax and theme sets ahead of the first code block.
pub fn prewarm_highlighting() {
    Lazy::force(&SYNTAXES);
    Lazy::force(&THEMES);
}

fn normalize_lang(lang: &str) -> &str {
    match lang.trim().to_ascii_lowercase().as_str() {
        "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "javascript" | "typescript" => "js",
        "shell" | "bash" | "zsh" | "console" => "sh",
        "yml" => "yaml",
        _ => lang.trim(),
    }
}

fn find_syntax(lang: Option<&str>) -> &'static SyntaxReference {
    lang.filter(|lang| !lang.trim().is_empty())
        .and_then(|lang| SYNTAXES.find_syntax_by_token(normalize_lang(lang)))
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text())
}

fn theme() -> Option<&'static Theme> {
    THEMES.themes.get(THEME_NAME)
}

/// Returns one terminal-escaped line per source line. Unknown languages and
/// highlighter failures fall back to the plain code.
pub fn highlight_code(code: &str, lang: Option<&str>) -> Vec<String> {
    let plain = || code.split('\n').map(str::to_string).collect::<Vec<_>>();
    let Some(theme) = theme() else {
        return plain();
    };

    let mut highlighter = HighlightLines::new(find_syntax(lang), theme);
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let Ok(ranges) = highlighter.highlight_line(line, &SYNTAXES) else {
            return plain();
        };
        let mut escaped = as_24_bit_terminal_escaped(&ranges, false);
        while escaped.ends_with('\n') || escaped.ends_with('\r') {
            escaped.pop();
        }
        escaped.push_str(RESET);
        lines.push(escaped);
    }
    if code.ends_with('\n') || lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
