//! Line-level markdown styling.
//!
//! Lines are classified one at a time. Fenced code blocks and list context
//! carry across lines (and therefore across chunks), so the [`LineStyler`]
//! owns that state and is only driven from inside a flush.

use super::json::JsonHighlighter;
use crate::style::{Color, Modifiers, Style};

const H1: Style = Style::fg(Color::BLUE).with(Modifiers::BOLD);
const H2: Style = Style::fg(Color::BLUE);
const H3: Style = Style::fg(Color::CYAN);
const H4: Style = Style::modifiers(Modifiers::BOLD);
const MARKER: Style = Style::fg(Color::GREEN);
const QUOTE: Style = Style::modifiers(Modifiers::DIM.union(Modifiers::ITALIC));
const FAINT: Style = Style::modifiers(Modifiers::DIM);
const FENCE_WITH_LANGUAGE: Style = Style::fg(Color::GREEN).with(Modifiers::DIM);
const CODE: Style = Style::fg(Color::YELLOW);
const INLINE_CODE: Style = Style::fg(Color::MAGENTA).on(Color::Indexed(236));
const BOLD: Style = Style::modifiers(Modifiers::BOLD);
const ITALIC: Style = Style::modifiers(Modifiers::ITALIC);

/// Whether the styler is inside a fenced code block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlockMode {
    /// Regular markdown.
    #[default]
    Prose,
    /// Between an opening and a closing fence.
    Code,
}

/// Whether recent lines were list items.
///
/// Blank lines inside a list are suppressed so items stay compact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ListContext {
    /// Not inside a list.
    #[default]
    Inactive,
    /// The last non-blank line was a list item or its continuation.
    Active,
}

/// Heading depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadingLevel {
    /// `# `
    H1,
    /// `## `
    H2,
    /// `### `
    H3,
    /// `#### `
    H4,
    /// Any other line starting with `#`.
    Other,
}

/// Classification of a single line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// A ```` ``` ```` fence, opening or closing.
    Fence {
        /// Whether a language tag follows the backticks.
        has_language: bool,
    },
    /// A line inside a fenced code block.
    Code,
    /// A heading.
    Heading(HeadingLevel),
    /// `• `, `- `, `* ` or `+ ` item.
    Bullet,
    /// `N.` item.
    Numbered,
    /// `>` quote.
    Blockquote,
    /// `---`, `***` or `___`.
    Rule,
    /// Empty or whitespace-only.
    Blank,
    /// Anything else.
    Text,
}

/// Classify `line` given the current block mode.
///
/// First match wins, in this order: heading, fence, code content, bullet,
/// numbered item, blockquote, rule, blank, text. Headings come before the
/// code-block check, so a `#` line inside a fence is still a heading.
pub fn classify(line: &str, mode: BlockMode) -> LineKind {
    let trimmed = line.trim();

    if trimmed.starts_with('#') {
        return LineKind::Heading(heading_level(trimmed));
    }
    if let Some(language) = trimmed.strip_prefix("```") {
        return LineKind::Fence {
            has_language: !language.trim().is_empty(),
        };
    }
    if mode == BlockMode::Code {
        return LineKind::Code;
    }
    if bullet_text(trimmed).is_some() {
        return LineKind::Bullet;
    }
    if numbered_parts(trimmed).is_some() {
        return LineKind::Numbered;
    }
    if trimmed.starts_with('>') {
        return LineKind::Blockquote;
    }
    if is_rule(trimmed) {
        return LineKind::Rule;
    }
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    LineKind::Text
}

fn heading_level(trimmed: &str) -> HeadingLevel {
    if trimmed.starts_with("#### ") {
        HeadingLevel::H4
    } else if trimmed.starts_with("### ") {
        HeadingLevel::H3
    } else if trimmed.starts_with("## ") {
        HeadingLevel::H2
    } else if trimmed.starts_with("# ") {
        HeadingLevel::H1
    } else {
        HeadingLevel::Other
    }
}

fn bullet_text(trimmed: &str) -> Option<&str> {
    if let Some(rest) = trimmed.strip_prefix('•') {
        return Some(rest.trim_start());
    }
    ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
        .map(str::trim_start)
}

/// Split `12. text` into `("12", "text")`. Anything after the dot counts,
/// so `1.5 million` splits into `("1", "5 million")`.
fn numbered_parts(trimmed: &str) -> Option<(&str, &str)> {
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = trimmed[digits..].strip_prefix('.')?;
    Some((&trimmed[..digits], rest.trim_start()))
}

fn is_rule(trimmed: &str) -> bool {
    ["---", "***", "___"].iter().any(|mark| trimmed.starts_with(mark))
}

/// Apply inline formatting: `code`, **bold**/__bold__ and *italic*/_italic_.
///
/// Code spans are handled first and their contents are never reformatted.
/// Underscores inside words (`my_file.txt`) are left alone.
pub fn format_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;

    while let Some(start) = rest.find('`') {
        let after = &rest[start + 1..];
        match after.find('`') {
            Some(0) => {
                format_emphasis(&rest[..start], &mut out);
                out.push_str("``");
                rest = &after[1..];
            }
            Some(end) => {
                format_emphasis(&rest[..start], &mut out);
                INLINE_CODE.paint_into(&after[..end], &mut out);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    format_emphasis(rest, &mut out);
    out
}

fn format_emphasis(text: &str, out: &mut String) {
    let bytes = text.as_bytes();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if matches!(bytes[i], b'*' | b'_') {
            if let Some(end) = strong_end(text, i) {
                out.push_str(&text[plain_start..i]);
                BOLD.paint_into(&text[i + 2..end], out);
                i = end + 2;
                plain_start = i;
                continue;
            }
            if let Some(end) = emphasis_end(text, i) {
                out.push_str(&text[plain_start..i]);
                ITALIC.paint_into(&text[i + 1..end], out);
                i = end + 1;
                plain_start = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&text[plain_start..]);
}

/// Start of the closing `**`/`__` for a strong span opening at `i`.
fn strong_end(text: &str, i: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let delim = bytes[i];
    if bytes.get(i + 1) != Some(&delim) {
        return None;
    }
    let pair = if delim == b'*' { "**" } else { "__" };
    let inner = text[i + 2..].find(pair)?;
    (inner > 0).then_some(i + 2 + inner)
}

/// Position of the closing delimiter for an emphasis span opening at `i`.
fn emphasis_end(text: &str, i: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let delim = char::from(bytes[i]);

    if !text[..i].chars().next_back().map_or(true, |c| is_flank(c, delim)) {
        return None;
    }
    let first = text[i + 1..].chars().next()?;
    if first.is_whitespace() || first == delim {
        return None;
    }

    let end = i + 1 + text[i + 1..].find(delim)?;
    let before = text[..end].chars().next_back()?;
    if before.is_whitespace() {
        return None;
    }
    text[end + 1..]
        .chars()
        .next()
        .map_or(true, |c| is_flank(c, delim))
        .then_some(end)
}

fn is_flank(c: char, delim: char) -> bool {
    c != delim && (c.is_whitespace() || c.is_ascii_punctuation())
}

/// Stateful line renderer.
#[derive(Debug)]
pub struct LineStyler {
    mode: BlockMode,
    list: ListContext,
    prev_blank: bool,
    emitted_any: bool,
    rule_width: usize,
    json: Option<JsonHighlighter>,
}

impl LineStyler {
    /// Create a styler. `highlight_json` routes lines with `{`/`[` through
    /// the JSON highlighter.
    pub fn new(rule_width: usize, highlight_json: bool) -> Self {
        Self {
            mode: BlockMode::Prose,
            list: ListContext::Inactive,
            prev_blank: false,
            emitted_any: false,
            rule_width,
            json: highlight_json.then(JsonHighlighter::new),
        }
    }

    /// Current block mode.
    pub const fn mode(&self) -> BlockMode {
        self.mode
    }

    /// Current list context.
    pub const fn list_context(&self) -> ListContext {
        self.list
    }

    /// Whether the most recently emitted line was blank.
    pub const fn prev_blank(&self) -> bool {
        self.prev_blank
    }

    /// Forget all cross-line state.
    pub fn reset(&mut self) {
        self.mode = BlockMode::Prose;
        self.list = ListContext::Inactive;
        self.prev_blank = false;
        self.emitted_any = false;
    }

    /// Style one complete line and append it, newline-terminated, to `out`.
    ///
    /// Returns the number of terminal lines appended: 0 for a suppressed
    /// blank line, 2 for a heading that needed a separating blank line.
    pub fn render_line(&mut self, line: &str, out: &mut String) -> usize {
        let kind = classify(line, self.mode);
        let mut emitted = 1;

        match kind {
            LineKind::Fence { has_language } => {
                let style = if has_language { FENCE_WITH_LANGUAGE } else { FAINT };
                style.paint_into(line, out);
                self.mode = match self.mode {
                    BlockMode::Prose => BlockMode::Code,
                    BlockMode::Code => BlockMode::Prose,
                };
            }
            LineKind::Code => CODE.paint_into(line, out),
            LineKind::Heading(level) => {
                if self.emitted_any && !self.prev_blank {
                    out.push('\n');
                    emitted += 1;
                }
                let style = match level {
                    HeadingLevel::H1 => H1,
                    HeadingLevel::H2 => H2,
                    HeadingLevel::H3 => H3,
                    HeadingLevel::H4 | HeadingLevel::Other => H4,
                };
                style.paint_into(line, out);
            }
            LineKind::Bullet => {
                let text = bullet_text(line.trim()).unwrap_or_default();
                out.push_str("  ");
                MARKER.paint_into("• ", out);
                out.push_str(&format_inline(text));
                self.list = ListContext::Active;
            }
            LineKind::Numbered => {
                let (number, text) = numbered_parts(line.trim()).unwrap_or_default();
                out.push_str("  ");
                MARKER.paint_into(&format!("{number}. "), out);
                out.push_str(&format_inline(text));
                self.list = ListContext::Active;
            }
            LineKind::Blockquote => {
                let text = line.trim().trim_start_matches('>').trim_start();
                out.push_str("  ");
                QUOTE.paint_into(&format!("│ {text}"), out);
            }
            LineKind::Rule => FAINT.paint_into(&"─".repeat(self.rule_width), out),
            LineKind::Blank => {
                if !self.emitted_any || self.prev_blank || self.list == ListContext::Active {
                    return 0;
                }
            }
            LineKind::Text => {
                if self.list == ListContext::Active && !line.starts_with(char::is_whitespace) {
                    self.list = ListContext::Inactive;
                }
                let highlighted = self
                    .json
                    .filter(|_| line.contains(|c| c == '{' || c == '['))
                    .and_then(|json| json.highlight(line));
                match highlighted {
                    Some(styled) => out.push_str(&styled),
                    None => out.push_str(&format_inline(line)),
                }
            }
        }

        out.push('\n');
        self.prev_blank = kind == LineKind::Blank;
        self.emitted_any = true;
        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(styler: &mut LineStyler, lines: &[&str]) -> String {
        let mut out = String::new();
        for line in lines {
            styler.render_line(line, &mut out);
        }
        out
    }

    #[test]
    fn test_classify() {
        let prose = BlockMode::Prose;
        assert_eq!(classify("```rust", prose), LineKind::Fence { has_language: true });
        assert_eq!(classify("```", prose), LineKind::Fence { has_language: false });
        assert_eq!(classify("# Title", prose), LineKind::Heading(HeadingLevel::H1));
        assert_eq!(classify("## Sub", prose), LineKind::Heading(HeadingLevel::H2));
        assert_eq!(classify("### Sub", prose), LineKind::Heading(HeadingLevel::H3));
        assert_eq!(classify("#### Sub", prose), LineKind::Heading(HeadingLevel::H4));
        assert_eq!(classify("#tag", prose), LineKind::Heading(HeadingLevel::Other));
        assert_eq!(classify("- item", prose), LineKind::Bullet);
        assert_eq!(classify("  * item", prose), LineKind::Bullet);
        assert_eq!(classify("+ item", prose), LineKind::Bullet);
        assert_eq!(classify("• item", prose), LineKind::Bullet);
        assert_eq!(classify("12. item", prose), LineKind::Numbered);
        assert_eq!(classify("1.5 million", prose), LineKind::Numbered);
        assert_eq!(classify("3.", prose), LineKind::Numbered);
        assert_eq!(classify("v1. release", prose), LineKind::Text);
        assert_eq!(classify("> quoted", prose), LineKind::Blockquote);
        assert_eq!(classify("---", prose), LineKind::Rule);
        assert_eq!(classify("* * *", prose), LineKind::Bullet);
        assert_eq!(classify("___", prose), LineKind::Rule);
        assert_eq!(classify("***bold italic***", prose), LineKind::Rule);
        assert_eq!(classify("--- end", prose), LineKind::Rule);
        assert_eq!(classify("-- not a rule", prose), LineKind::Text);
        assert_eq!(classify("**bold** text", prose), LineKind::Text);
        assert_eq!(classify("   ", prose), LineKind::Blank);
        assert_eq!(classify("hello", prose), LineKind::Text);
    }

    #[test]
    fn test_heading_wins_over_code_content() {
        assert_eq!(
            classify("# comment", BlockMode::Code),
            LineKind::Heading(HeadingLevel::H1)
        );
        assert_eq!(classify("- not a bullet", BlockMode::Code), LineKind::Code);
        assert_eq!(classify("```", BlockMode::Code), LineKind::Fence { has_language: false });
    }

    #[test]
    fn test_inline_code_is_protected() {
        assert_eq!(
            format_inline("run `a_b*c*` now"),
            "run \x1b[35m\x1b[48;5;236ma_b*c*\x1b[0m now"
        );
    }

    #[test]
    fn test_inline_bold_and_italic() {
        assert_eq!(format_inline("**bold**"), "\x1b[1mbold\x1b[0m");
        assert_eq!(format_inline("a __b__ c"), "a \x1b[1mb\x1b[0m c");
        assert_eq!(format_inline("an *it* word"), "an \x1b[3mit\x1b[0m word");
        assert_eq!(format_inline("(_x_)"), "(\x1b[3mx\x1b[0m)");
    }

    #[test]
    fn test_intraword_underscores_untouched() {
        assert_eq!(format_inline("open my_file_name.txt"), "open my_file_name.txt");
        assert_eq!(format_inline("2 * 3 * 4"), "2 * 3 * 4");
        assert_eq!(format_inline("unclosed `tick"), "unclosed `tick");
        assert_eq!(format_inline("empty `` ticks"), "empty `` ticks");
    }

    #[test]
    fn test_fenced_block_toggles_mode() {
        let mut styler = LineStyler::new(60, false);
        let out = render(&mut styler, &["```rust", "let x = 1;", "```"]);
        assert_eq!(styler.mode(), BlockMode::Prose);
        assert_eq!(
            out,
            "\x1b[2m\x1b[32m```rust\x1b[0m\n\x1b[33mlet x = 1;\x1b[0m\n\x1b[2m```\x1b[0m\n"
        );
    }

    #[test]
    fn test_mode_spans_calls() {
        let mut styler = LineStyler::new(60, false);
        render(&mut styler, &["```"]);
        assert_eq!(styler.mode(), BlockMode::Code);
        let out = render(&mut styler, &["**x**"]);
        assert_eq!(out, "\x1b[33m**x**\x1b[0m\n");
    }

    #[test]
    fn test_blank_lines_collapse() {
        let mut styler = LineStyler::new(60, false);
        assert_eq!(styler.render_line("", &mut String::new()), 0);
        let out = render(&mut styler, &["a", "", "", "b"]);
        assert_eq!(out, "a\n\nb\n");
    }

    #[test]
    fn test_heading_gets_separator() {
        let mut styler = LineStyler::new(60, false);
        let mut out = String::new();
        assert_eq!(styler.render_line("# Top", &mut out), 1);
        assert_eq!(styler.render_line("text", &mut out), 1);
        assert_eq!(styler.render_line("## Next", &mut out), 2);
        assert_eq!(
            out,
            "\x1b[1m\x1b[34m# Top\x1b[0m\ntext\n\n\x1b[34m## Next\x1b[0m\n"
        );
    }

    #[test]
    fn test_list_context_suppresses_blanks() {
        let mut styler = LineStyler::new(60, false);
        let out = render(&mut styler, &["- one", "", "2. two", "   continued", "", "after", "", "x"]);
        assert_eq!(
            out,
            concat!(
                "  \x1b[32m• \x1b[0mone\n",
                "  \x1b[32m2. \x1b[0mtwo\n",
                "   continued\n",
                "after\n",
                "\n",
                "x\n",
            )
        );
        assert_eq!(styler.list_context(), ListContext::Inactive);
    }

    #[test]
    fn test_heading_inside_fence_keeps_code_mode() {
        let mut styler = LineStyler::new(60, false);
        let out = render(&mut styler, &["```", "# comment", "x = 1"]);
        assert_eq!(styler.mode(), BlockMode::Code);
        assert_eq!(
            out,
            "\x1b[2m```\x1b[0m\n\n\x1b[1m\x1b[34m# comment\x1b[0m\n\x1b[33mx = 1\x1b[0m\n"
        );
    }

    #[test]
    fn test_numbered_without_space_after_dot() {
        let mut styler = LineStyler::new(60, false);
        let out = render(&mut styler, &["1.5 million"]);
        assert_eq!(out, "  \x1b[32m1. \x1b[0m5 million\n");
    }

    #[test]
    fn test_quote_and_rule() {
        let mut styler = LineStyler::new(3, false);
        let out = render(&mut styler, &["> wise", "---"]);
        assert_eq!(out, "  \x1b[2m\x1b[3m│ wise\x1b[0m\n\x1b[2m───\x1b[0m\n");
    }

    #[test]
    fn test_json_lines_are_highlighted() {
        let mut styler = LineStyler::new(60, true);
        let out = render(&mut styler, &[r#"{"a": 1}"#]);
        assert!(out.contains("\x1b[38;2;198;120;221m\"a\""));

        let mut plain = LineStyler::new(60, false);
        assert_eq!(render(&mut plain, &[r#"{"a": 1}"#]), "{\"a\": 1}\n");
    }

    #[test]
    fn test_reset() {
        let mut styler = LineStyler::new(60, false);
        render(&mut styler, &["```", "- x"]);
        styler.reset();
        assert_eq!(styler.mode(), BlockMode::Prose);
        assert_eq!(styler.list_context(), ListContext::Inactive);
        assert_eq!(styler.render_line("", &mut String::new()), 0);
    }
}
