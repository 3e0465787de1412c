//! Style: colors, text modifiers and the escape sequences shared by the renderers.
//!
//! The footer escapes are fixed byte sequences that other tools in the same
//! terminal session match visually, so they are spelled out as constants
//! rather than derived from [`Style`].

use bitflags::bitflags;
use std::fmt::Write;

/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";
/// Footer background (dark blue-grey).
pub const FOOTER_BG: &str = "\x1b[48;2;50;54;62m";
/// Explicit foreground/background reset.
pub const FG_BG_RESET: &str = "\x1b[39;49m";
/// Light footer background.
pub const LIGHT_BG: &str = "\x1b[47m";
/// Black text for the light background.
pub const BLACK_FG: &str = "\x1b[30m";
/// Dark stats background.
pub const DARK_BG: &str = "\x1b[40m";
/// Dim white text for the stats section.
pub const DIM_WHITE: &str = "\x1b[2m\x1b[37m";
/// Plain white text.
pub const WHITE_FG: &str = "\x1b[37m";
/// Git remote color.
pub const GIT_REMOTE_FG: &str = "\x1b[38;5;243m";
/// Git branch color.
pub const GIT_BRANCH_FG: &str = "\x1b[38;5;250m";
/// Clear the current line and return to column 1.
pub const CLEAR_CURRENT_LINE: &str = "\r\x1b[K";

/// True-color RGB representation.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A terminal color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum Color {
    /// Leave the terminal default in place.
    #[default]
    Default,
    /// One of the eight basic colors (0 = black .. 7 = white).
    Basic(u8),
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit color.
    Rgb(Rgb),
}

impl Color {
    /// Basic blue.
    pub const BLUE: Self = Self::Basic(4);
    /// Basic cyan.
    pub const CYAN: Self = Self::Basic(6);
    /// Basic green.
    pub const GREEN: Self = Self::Basic(2);
    /// Basic yellow.
    pub const YELLOW: Self = Self::Basic(3);
    /// Basic magenta.
    pub const MAGENTA: Self = Self::Basic(5);

    fn write_fg(self, out: &mut String) {
        match self {
            Self::Default => {}
            Self::Basic(n) => {
                let _ = write!(out, "\x1b[{}m", 30 + u16::from(n & 7));
            }
            Self::Indexed(i) => {
                let _ = write!(out, "\x1b[38;5;{i}m");
            }
            Self::Rgb(c) => {
                let _ = write!(out, "\x1b[38;2;{};{};{}m", c.r, c.g, c.b);
            }
        }
    }

    fn write_bg(self, out: &mut String) {
        match self {
            Self::Default => {}
            Self::Basic(n) => {
                let _ = write!(out, "\x1b[{}m", 40 + u16::from(n & 7));
            }
            Self::Indexed(i) => {
                let _ = write!(out, "\x1b[48;5;{i}m");
            }
            Self::Rgb(c) => {
                let _ = write!(out, "\x1b[48;2;{};{};{}m", c.r, c.g, c.b);
            }
        }
    }
}

bitflags! {
    /// Text style modifiers.
    ///
    /// These can be combined using bitwise OR.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text
        const DIM = 0b0000_0010;
        /// Italic text
        const ITALIC = 0b0000_0100;
        /// Underlined text
        const UNDERLINE = 0b0000_1000;
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// Foreground, background and modifiers applied to a run of text.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Style {
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Text modifiers.
    pub modifiers: Modifiers,
}

impl Style {
    /// No styling at all.
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        modifiers: Modifiers::empty(),
    };

    /// A style with only a foreground color.
    pub const fn fg(color: Color) -> Self {
        Self {
            fg: color,
            bg: Color::Default,
            modifiers: Modifiers::empty(),
        }
    }

    /// A style with only modifiers.
    pub const fn modifiers(modifiers: Modifiers) -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            modifiers,
        }
    }

    /// Add a background color.
    #[must_use]
    pub const fn on(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Add modifiers.
    #[must_use]
    pub const fn with(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = self.modifiers.union(modifiers);
        self
    }

    /// Whether this style emits no escape sequences.
    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }

    /// Append the SGR sequences that switch to this style.
    pub fn write_sgr(&self, out: &mut String) {
        if self.modifiers.contains(Modifiers::BOLD) {
            out.push_str("\x1b[1m");
        }
        if self.modifiers.contains(Modifiers::DIM) {
            out.push_str("\x1b[2m");
        }
        if self.modifiers.contains(Modifiers::ITALIC) {
            out.push_str("\x1b[3m");
        }
        if self.modifiers.contains(Modifiers::UNDERLINE) {
            out.push_str("\x1b[4m");
        }
        self.fg.write_fg(out);
        self.bg.write_bg(out);
    }

    /// Append `text` wrapped in this style and a trailing reset.
    pub fn paint_into(&self, text: &str, out: &mut String) {
        if self.is_plain() {
            out.push_str(text);
            return;
        }
        self.write_sgr(out);
        out.push_str(text);
        out.push_str(RESET);
    }

    /// Return `text` wrapped in this style.
    pub fn paint(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        self.paint_into(text, &mut out);
        out
    }
}

/// Number of visible characters in `s`, skipping CSI escape sequences.
pub fn visible_len(s: &str) -> usize {
    let mut count = 0;
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.next() == Some('[') {
                // Parameters and intermediates run until the final byte (0x40..=0x7e).
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            continue;
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_plain_is_identity() {
        assert_eq!(Style::PLAIN.paint("abc"), "abc");
    }

    #[test]
    fn test_paint_bold_blue() {
        let style = Style::fg(Color::BLUE).with(Modifiers::BOLD);
        assert_eq!(style.paint("hi"), "\x1b[1m\x1b[34mhi\x1b[0m");
    }

    #[test]
    fn test_indexed_and_rgb_backgrounds() {
        let style = Style::fg(Color::Indexed(213)).on(Color::Rgb(Rgb::new(1, 2, 3)));
        assert_eq!(style.paint("x"), "\x1b[38;5;213m\x1b[48;2;1;2;3mx\x1b[0m");
    }

    #[test]
    fn test_visible_len_skips_escapes() {
        let s = format!("{GIT_REMOTE_FG}origin{RESET}{FOOTER_BG}:{GIT_BRANCH_FG}main{RESET}");
        assert_eq!(visible_len(&s), "origin:main".len());
        assert_eq!(visible_len(""), 0);
        assert_eq!(visible_len("plain"), 5);
    }
}
