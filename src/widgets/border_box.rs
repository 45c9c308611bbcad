//! Framed box around pre-rendered lines.

use crate::core::text::width::visible_width;
use crate::core::text::wrap::wrap_text_with_ansi;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderStyle {
    Single,
    Double,
}

impl BorderStyle {
    // top-left, top-right, bottom-left, bottom-right, horizontal, vertical
    fn glyphs(self) -> [&'static str; 6] {
        match self {
            BorderStyle::Single => ["┌", "┐", "└", "┘", "─", "│"],
            BorderStyle::Double => ["╔", "╗", "╚", "╝", "═", "║"],
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BorderBox {
    pub style: BorderStyle,
    pub padding_x: usize,
    pub padding_y: usize,
}

impl BorderBox {
    pub fn new(style: BorderStyle, padding_x: usize, padding_y: usize) -> Self {
        Self {
            style,
            padding_x,
            padding_y,
        }
    }

    /// Wraps `lines` to fit inside the box and frames them to exactly
    /// `width` columns. `paint` styles the border glyphs.
    pub fn frame(&self, lines: &[String], width: usize, paint: &dyn Fn(&str) -> String) -> Vec<String> {
        let [tl, tr, bl, br, h, v] = self.style.glyphs();
        let inner = width.saturating_sub(2);
        let content_width = inner.saturating_sub(self.padding_x * 2).max(1);

        let mut out = Vec::new();
        out.push(paint(&format!("{tl}{}{tr}", h.repeat(inner))));
        let blank = format!("{}{}{}", paint(v), " ".repeat(inner), paint(v));
        out.extend(std::iter::repeat(blank.clone()).take(self.padding_y));

        let pad = " ".repeat(self.padding_x);
        for line in lines {
            for wrapped in wrap_text_with_ansi(line, content_width) {
                let fill = content_width.saturating_sub(visible_width(&wrapped));
                out.push(format!(
                    "{}{pad}{wrapped}{}{pad}{}",
                    paint(v),
                    " ".repeat(fill),
                    paint(v)
                ));
            }
        }

        out.extend(std::iter::repeat(blank).take(self.padding_y));
        out.push(paint(&format!("{bl}{}{br}", h.repeat(inner))));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> String {
        text.to_string()
    }

    #[test]
    fn frames_lines_with_padding() {
        let framed = BorderBox::new(BorderStyle::Double, 1, 1).frame(&["hi".to_string()], 8, &plain);
        assert_eq!(
            framed,
            vec!["╔══════╗", "║      ║", "║ hi   ║", "║      ║", "╚══════╝"]
        );
    }

    #[test]
    fn long_content_wraps_inside_border() {
        let framed =
            BorderBox::new(BorderStyle::Single, 0, 0).frame(&["aaa bbb".to_string()], 5, &plain);
        assert_eq!(framed, vec!["┌───┐", "│aaa│", "│bbb│", "└───┘"]);
    }

    #[test]
    fn every_line_has_requested_width() {
        let framed = BorderBox::new(BorderStyle::Double, 1, 1)
            .frame(&["\x1b[1mbold\x1b[22m text".to_string()], 12, &plain);
        assert!(framed.iter().all(|line| visible_width(line) == 12));
    }
}
