//! Inline emphasis and color runs inside report paragraphs and bullets.
//!
//! Text may contain `**bold**`, `*italic*` and `[color=#RRGGBB]{...}`. Markers
//! nest, and every marker has to be closed inside the same paragraph.

use genpdf::style::{Style, StyledString};
use thiserror::Error;

use crate::theme::Rgb;

/// Text that shares one set of inline attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgb>,
}

impl Run {
    /// The run as a `genpdf` string, inheriting everything it does not set from `base`.
    pub fn styled(&self, base: Style) -> StyledString {
        let mut style = base;
        if let Some(color) = self.color {
            style.set_color(color.into());
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        StyledString::new(self.text.clone(), style)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("`{marker}` opened at byte {at} is never closed")]
    Unclosed { marker: &'static str, at: usize },

    #[error("unexpected `{token}` at byte {at}")]
    Stray { token: char, at: usize },

    #[error("malformed color directive at byte {at}, expected `[color=#RRGGBB]{{`")]
    BadColor { at: usize },
}

#[derive(Clone, Copy, Debug)]
enum Marker {
    Bold,
    Italic,
    Color(Rgb),
}

impl Marker {
    fn opening(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Italic => "*",
            Marker::Color(_) => "[color=",
        }
    }

    fn closing(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Italic => "*",
            Marker::Color(_) => "}",
        }
    }
}

#[derive(Default)]
struct Scanner {
    open: Vec<(Marker, usize)>,
    pending: String,
    runs: Vec<Run>,
}

impl Scanner {
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let markers = || self.open.iter().map(|(marker, _)| *marker);
        let run = Run {
            bold: markers().any(|marker| matches!(marker, Marker::Bold)),
            italic: markers().any(|marker| matches!(marker, Marker::Italic)),
            color: markers().rev().find_map(|marker| match marker {
                Marker::Color(color) => Some(color),
                _ => None,
            }),
            text: String::new(),
        };
        self.runs.push(Run {
            text: std::mem::take(&mut self.pending),
            ..run
        });
    }
}

/// `[color=#RRGGBB]{` at the start of `tail`: the color and the directive length.
fn color_directive(tail: &str) -> Option<(Rgb, usize)> {
    const PREFIX: &str = "[color=#";
    let hex = tail.strip_prefix(PREFIX)?.get(..6)?;
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    let end = PREFIX.len() + 6;
    tail.get(end..end + 2).filter(|close| *close == "]{")?;
    Some((Rgb::from_u32(value), end + 2))
}

/// Splits `text` into runs. A closing marker of the innermost open run wins
/// over an opening marker, so `***` ends an italic run nested in a bold one.
pub fn parse_runs(text: &str) -> Result<Vec<Run>, MarkupError> {
    let mut scanner = Scanner::default();
    let mut at = 0;

    while let Some(ch) = text[at..].chars().next() {
        let tail = &text[at..];
        if let Some((marker, _)) = scanner.open.last() {
            let closing = marker.closing();
            if tail.starts_with(closing) {
                scanner.flush();
                scanner.open.pop();
                at += closing.len();
                continue;
            }
        }

        let (marker, width) = match ch {
            '*' if tail.starts_with("**") => (Marker::Bold, 2),
            '*' => (Marker::Italic, 1),
            '[' => {
                let (color, width) = color_directive(tail).ok_or(MarkupError::BadColor { at })?;
                (Marker::Color(color), width)
            }
            ']' | '}' => return Err(MarkupError::Stray { token: ch, at }),
            _ => {
                scanner.pending.push(ch);
                at += ch.len_utf8();
                continue;
            }
        };
        scanner.flush();
        scanner.open.push((marker, at));
        at += width;
    }

    if let Some((marker, at)) = scanner.open.last() {
        return Err(MarkupError::Unclosed {
            marker: marker.opening(),
            at: *at,
        });
    }
    scanner.flush();
    Ok(scanner.runs)
}

/// Parses `text` and styles every run on top of `base`.
pub fn styled_runs(text: &str, base: Style) -> Result<Vec<StyledString>, MarkupError> {
    Ok(parse_runs(text)?.iter().map(|run| run.styled(base)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use genpdf::style::Color;

    fn texts(runs: &[Run]) -> Vec<&str> {
        runs.iter().map(|run| run.text.as_str()).collect()
    }

    #[test]
    fn plain_text_is_one_run() {
        let runs = parse_runs("P2P rooms, no servers").unwrap();
        assert_eq!(runs.len(), 1);
        assert!(!runs[0].bold && !runs[0].italic && runs[0].color.is_none());
    }

    #[test]
    fn nested_markers_combine() {
        let runs = parse_runs("Target: **25k *active*** users").unwrap();
        assert_eq!(texts(&runs), ["Target: ", "25k ", "active", " users"]);
        assert!(runs[1].bold && !runs[1].italic);
        assert!(runs[2].bold && runs[2].italic);
        assert!(!runs[3].bold);
    }

    #[test]
    fn color_directive_sets_the_run_color() {
        let runs = parse_runs("[color=#E94560]{**Premium**} tier").unwrap();
        assert_eq!(texts(&runs), ["Premium", " tier"]);
        assert_eq!(runs[0].color, Some(Rgb::from_u32(0xE94560)));
        assert!(runs[0].bold);
        assert_eq!(runs[1].color, None);
    }

    #[test]
    fn unclosed_marker_reports_where_it_opened() {
        assert_eq!(
            parse_runs("ok **bold").unwrap_err(),
            MarkupError::Unclosed { marker: "**", at: 3 }
        );
    }

    #[test]
    fn malformed_colors_are_rejected() {
        for text in ["[color=#12FG34]{x}", "[colour=#123456]{x}", "[color=#123456]x"] {
            assert_eq!(parse_runs(text).unwrap_err(), MarkupError::BadColor { at: 0 });
        }
    }

    #[test]
    fn stray_closing_brace_is_rejected() {
        assert_eq!(
            parse_runs("a } b").unwrap_err(),
            MarkupError::Stray { token: '}', at: 2 }
        );
    }

    #[test]
    fn multibyte_text_is_kept_intact() {
        let runs = parse_runs("Yes \u{2013} **Watch & Date**").unwrap();
        assert_eq!(texts(&runs), ["Yes \u{2013} ", "Watch & Date"]);
    }

    #[test]
    fn styled_runs_inherit_the_base_style() {
        let base = Style::new().with_font_size(9).with_color(Color::Rgb(1, 2, 3));
        let styled = styled_runs("plain **bold**", base).unwrap();

        assert_eq!(styled.len(), 2);
        assert_eq!(styled[0].style.font_size(), 9);
        assert_eq!(styled[0].style.color(), Some(Color::Rgb(1, 2, 3)));
        assert!(!styled[0].style.is_bold());
        assert!(styled[1].style.is_bold());
        assert_eq!(styled[1].s, "bold");
    }
}
