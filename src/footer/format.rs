//! Pure formatting helpers for footer values.

use std::time::Duration;

/// `999`, `1.5K`, `2.0M`.
pub fn format_tokens(tokens: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let value = tokens as f64;
    if tokens >= 1_000_000 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        tokens.to_string()
    }
}

/// `45s`, `12m`, `1.5h`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{:.1}h", d.as_secs_f64() / 3600.0)
    }
}

/// Cost with precision that grows as the amount shrinks.
pub fn format_cost(cost: f64) -> String {
    if cost >= 1.0 {
        format!("${cost:.2}")
    } else if cost >= 0.01 {
        format!("${cost:.3}")
    } else if cost > 0.0 {
        format!("${cost:.6}")
    } else {
        "$0.000".to_string()
    }
}

/// ` | 12.0K/128.0K (9%)`, or nothing without a budget.
pub fn format_context(used: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let percent = used as f64 / max as f64 * 100.0;
    format!(" | {}/{} ({percent:.0}%)", format_tokens(used), format_tokens(max))
}

/// Shorten `s` to at most `max_len` characters, ending in `...` when cut.
///
/// A `max_len` of 3 or less yields `"..."`.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return "...".to_string();
    }
    let mut out: String = s.chars().take(max_len - 3).collect();
    out.push_str("...");
    out
}

fn prefix_with_ellipsis(s: &str, keep: usize) -> String {
    if s.chars().count() <= keep {
        return s.to_string();
    }
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn is_coder_family(name: &str) -> bool {
    name.contains("Qwen") && name.contains("Coder")
}

/// `Qwen3-Coder-480B-A35B-Instruct` → `Qwen3-Coder-480B`.
fn leading_segments(name: &str) -> Option<String> {
    let parts: Vec<&str> = name.split('-').collect();
    (parts.len() >= 3).then(|| parts[..3].join("-"))
}

/// Short display name for a `provider/model` identifier.
///
/// Names of 20 characters or fewer are kept whole. Longer ones are shortened
/// by family, keeping a `:free` suffix intact.
pub fn extract_model_name(full: &str) -> String {
    let Some((_, name)) = full.rsplit_once('/') else {
        return truncate_string(full, 20);
    };
    if name.chars().count() <= 20 {
        return name.to_string();
    }

    if let Some(base) = name.strip_suffix(":free") {
        let short = if is_coder_family(base) {
            leading_segments(base).unwrap_or_else(|| base.to_string())
        } else {
            prefix_with_ellipsis(base, 12)
        };
        return format!("{short}:free");
    }

    if is_coder_family(name) {
        if let Some(short) = leading_segments(name) {
            return short;
        }
    } else if name.contains("deepseek") {
        if let Some((base, _)) = name.split_once(':') {
            return prefix_with_ellipsis(base, 15);
        }
    }

    prefix_with_ellipsis(name, 17)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tokens() {
        let cases = [
            (0, "0"),
            (999, "999"),
            (1000, "1.0K"),
            (1500, "1.5K"),
            (999_999, "1000.0K"),
            (1_000_000, "1.0M"),
            (2_500_000, "2.5M"),
        ];
        for (tokens, expected) in cases {
            assert_eq!(format_tokens(tokens), expected, "tokens = {tokens}");
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
        assert_eq!(format_duration(Duration::from_secs(59)), "59s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m");
        assert_eq!(format_duration(Duration::from_secs(3599)), "59m");
        assert_eq!(format_duration(Duration::from_secs(3700)), "1.0h");
        assert_eq!(format_duration(Duration::from_secs(5400)), "1.5h");
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(0.0), "$0.000");
        assert_eq!(format_cost(-1.0), "$0.000");
        assert_eq!(format_cost(0.000_416), "$0.000416");
        assert_eq!(format_cost(0.05), "$0.050");
        assert_eq!(format_cost(5.50), "$5.50");
        assert_eq!(format_cost(1.0), "$1.00");
    }

    #[test]
    fn test_format_context() {
        assert_eq!(format_context(100, 0), "");
        assert_eq!(format_context(12_000, 128_000), " | 12.0K/128.0K (9%)");
        assert_eq!(format_context(500, 1000), " | 500/1.0K (50%)");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("this is a very long string", 10), "this is...");
        assert_eq!(truncate_string("exactly10c", 10), "exactly10c");
        assert_eq!(truncate_string("", 5), "");
        assert_eq!(truncate_string("toolong", 3), "...");
        assert_eq!(truncate_string("toolong", 0), "...");
        assert_eq!(truncate_string("this is a very long string", 10).chars().count(), 10);
    }

    #[test]
    fn test_extract_model_name() {
        let cases = [
            ("openai/gpt-4", "gpt-4"),
            ("anthropic/claude-3-opus", "claude-3-opus"),
            ("qwen/qwen3-coder-30b-a3b-instruct:free", "qwen3-coder-...:free"),
            ("deepseek/deepseek-chat-v3.1:free", "deepseek-cha...:free"),
            (
                "very-long-model-name-that-exceeds-twenty-characters",
                "very-long-model-n...",
            ),
            ("simple-model", "simple-model"),
            ("", ""),
            ("provider/short", "short"),
            ("qwen/qwen3-coder-30b-a3b-instruct", "qwen3-coder-30b-a..."),
            ("qwen/qwen3-coder:free", "qwen3-coder:free"),
            ("qwen/qwen2.5-coder-32b-instruct", "qwen2.5-coder-32b..."),
            ("deepseek/deepseek-coder", "deepseek-coder"),
            ("deepseek/very-long-deepseek-model-name:free", "very-long-de...:free"),
            ("together/Qwen/Qwen3-Coder-480B-A35B-Instruct-Turbo", "Qwen3-Coder-480B"),
            ("deepseek/deepseek-r1-distill-llama-70b:nitro", "deepseek-r1-dis..."),
        ];
        for (input, expected) in cases {
            assert_eq!(extract_model_name(input), expected, "input = {input}");
        }
    }
}
