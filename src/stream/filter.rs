//! Input filtering applied to every chunk before it is buffered.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// `<function=NAME> ... </function>` (or `</tool_call>`) tool-call markup.
fn tool_markup() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<function=[^>]*>.*?(?:</function>|</tool_call>)").expect("valid tool markup pattern")
    })
}

/// `[[TASK_COMPLETE]]`, `[[task complete]]`, `[[TaskComplete]]`, ...
fn completion_sentinel() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\[\[task[ _]?complete\]\]").expect("valid sentinel pattern"))
}

/// Remove tool-call markup and completion sentinels from a chunk.
///
/// When something was removed and only whitespace is left, the result is
/// empty so a bare sentinel never turns into a stray blank line. Chunks that
/// contained nothing to filter pass through untouched, whitespace included.
pub fn filter_chunk(chunk: &str) -> Cow<'_, str> {
    let mut filtered = Cow::Borrowed(chunk);
    if tool_markup().is_match(&filtered) {
        let stripped = tool_markup().replace_all(&filtered, "").into_owned();
        filtered = Cow::Owned(stripped);
    }
    if completion_sentinel().is_match(&filtered) {
        let stripped = completion_sentinel().replace_all(&filtered, "").into_owned();
        filtered = Cow::Owned(stripped);
    }

    match filtered {
        Cow::Owned(s) if s.trim().is_empty() => Cow::Owned(String::new()),
        other => other,
    }
}
