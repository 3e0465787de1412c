//! Footer row composition.
//!
//! Every function here returns one fully styled row whose visible length is
//! exactly the requested width, so a row never wraps into its neighbour.

use super::format::{extract_model_name, format_context, format_cost, format_tokens, truncate_string};
use super::state::{FooterState, GitInfo};
use crate::style::{
    visible_len, BLACK_FG, DARK_BG, DIM_WHITE, FOOTER_BG, GIT_BRANCH_FG, GIT_REMOTE_FG, LIGHT_BG, RESET,
    WHITE_FG,
};
use std::path::Path;

/// Padding on both edges of a text section.
const EDGE: &str = "  ";
/// Minimum gap between the model and stats sections.
const MIN_GAP: usize = 2;

/// Footer height for a terminal `width` columns wide.
pub const fn footer_height(width: u16, narrow_threshold: u16) -> u16 {
    if width < narrow_threshold {
        5
    } else {
        4
    }
}

/// Build every footer row for `state` at `width`.
///
/// Wide terminals get four rows (separator, path, git, model+stats); below
/// `narrow_threshold` model and stats get a row each.
pub fn compose_rows(state: &FooterState, width: u16, narrow_threshold: u16, home: Option<&Path>) -> Vec<String> {
    let narrow = width < narrow_threshold;
    let width = usize::from(width);
    let mut rows = vec![
        separator_row(width),
        path_row(&display_path(&state.path, home), width),
        git_row(&state.git, width, !narrow),
    ];
    if narrow {
        rows.push(model_row(state, width));
        rows.push(stats_row(state, width));
    } else {
        rows.push(combined_row(state, width));
    }
    rows
}

fn spaces(n: usize) -> String {
    " ".repeat(n)
}

fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Full-width fill in the footer background.
pub fn separator_row(width: usize) -> String {
    format!("{FOOTER_BG}{}{RESET}", spaces(width))
}

/// `path` with the home directory collapsed to `~`.
pub fn display_path(path: &Path, home: Option<&Path>) -> String {
    if let Some(rest) = home.and_then(|home| path.strip_prefix(home).ok()) {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Working-directory row; long paths keep their tail behind `...`.
pub fn path_row(display: &str, width: usize) -> String {
    let mut line = format!("{EDGE}{display}");
    let len = line.chars().count();
    if len > width.saturating_sub(2) {
        let keep = width.saturating_sub(7);
        let tail: String = line.chars().skip(len - keep).collect();
        line = format!("{EDGE}...{tail}");
    }
    let line = clip(&line, width);
    let pad = width - line.chars().count();
    format!("{FOOTER_BG}{WHITE_FG}{line}{}{RESET}", spaces(pad))
}

/// `[remote:]branch[ (+N)]`, or a plain fill outside a repository.
pub fn git_row(git: &GitInfo, width: usize, show_remote: bool) -> String {
    if !git.is_repo || git.branch.is_empty() {
        return separator_row(width);
    }

    let changes = if git.changes > 0 {
        format!(" (+{})", git.changes)
    } else {
        String::new()
    };
    let fixed = EDGE.len() + changes.len();
    let branch_len = git.branch.chars().count();
    if fixed + branch_len.min(3) > width {
        let plain = clip(&format!("{EDGE}{}", git.branch), width);
        let pad = width - plain.chars().count();
        return format!("{FOOTER_BG}{GIT_BRANCH_FG}{plain}{}{RESET}", spaces(pad));
    }
    let remote_len = git.remote.chars().count() + 1;
    let show_remote = show_remote && !git.remote.is_empty() && fixed + remote_len + branch_len <= width;
    let budget = width.saturating_sub(fixed + if show_remote { remote_len } else { 0 });
    let branch = truncate_string(&git.branch, budget);

    let mut line = String::from(EDGE);
    if show_remote {
        line.push_str(&format!("{GIT_REMOTE_FG}{}{RESET}{FOOTER_BG}:", git.remote));
    }
    line.push_str(&format!("{GIT_BRANCH_FG}{branch}{RESET}{FOOTER_BG}"));
    if !changes.is_empty() {
        line.push_str(&format!("{WHITE_FG}{changes}{RESET}{FOOTER_BG}"));
    }
    let pad = width.saturating_sub(visible_len(&line));
    format!("{FOOTER_BG}{line}{}{RESET}", spaces(pad))
}

/// `provider (model)`, degrading gracefully when either is missing.
fn model_text(provider: &str, model: &str) -> String {
    match (provider.is_empty(), model.is_empty()) {
        (false, false) => format!("{provider} ({model})"),
        (true, _) => model.to_string(),
        (false, true) => provider.to_string(),
    }
}

/// Fit `provider (model)` into `budget` characters.
///
/// The model name is shortened first, then dropped in favour of the provider
/// alone, and finally the provider itself is cut.
pub fn fit_model(provider: &str, model: &str, budget: usize) -> String {
    if budget == 0 {
        return String::new();
    }
    let full = model_text(provider, model);
    if full.chars().count() <= budget {
        return full;
    }
    if provider.is_empty() {
        return clip(&truncate_string(model, budget), budget);
    }

    let provider_len = provider.chars().count();
    let available = budget.saturating_sub(provider_len + 3);
    if available > 3 && !model.is_empty() {
        return format!("{provider} ({})", truncate_string(model, available));
    }
    if provider_len <= budget {
        return provider.to_string();
    }
    clip(&truncate_string(provider, budget), budget)
}

/// Stats strings from most to least detailed.
pub fn stats_candidates(state: &FooterState) -> [String; 3] {
    let cost = format_cost(state.cost);
    let minimal = format!("{} | {cost}", format_tokens(state.tokens));
    let mut full = minimal.clone();
    full.push_str(&format_context(state.context_tokens, state.max_context_tokens));
    if state.iteration > 0 {
        full.push_str(&format!(" | Iter: {}", state.iteration));
    }
    [full, minimal, cost]
}

fn light_section(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.chars().count());
    format!("{LIGHT_BG}{BLACK_FG}{text}{}{RESET}", spaces(pad))
}

/// Right-aligned stats on the dark background.
fn dark_section(stats: &str, width: usize) -> String {
    let section = clip(&format!("{stats}{EDGE}"), width);
    let pad = width - section.chars().count();
    format!("{DIM_WHITE}{DARK_BG}{}{section}{RESET}", spaces(pad))
}

/// Model on the left, stats on the right, on a single row.
pub fn combined_row(state: &FooterState, width: usize) -> String {
    let candidates = stats_candidates(state);
    let edges = EDGE.len() * 2;
    let model_budget = |stats: &str| width.saturating_sub(edges + stats.chars().count() + EDGE.len() + MIN_GAP);

    let stats = candidates
        .iter()
        .find(|stats| model_budget(stats.as_str()) > 0)
        .unwrap_or(&candidates[2]);
    let model = fit_model(&state.provider, &extract_model_name(&state.model), model_budget(stats.as_str()));

    if model.is_empty() {
        return dark_section(stats, width);
    }
    let model_section = format!("{EDGE}{model}{EDGE}");
    let model_len = model_section.chars().count();
    let mut row = light_section(&model_section, model_len);
    row.push_str(&dark_section(stats, width - model_len));
    row
}

/// Narrow mode: the model on its own full-width row.
pub fn model_row(state: &FooterState, width: usize) -> String {
    let budget = width.saturating_sub(EDGE.len() * 2);
    let model = fit_model(&state.provider, &extract_model_name(&state.model), budget);
    light_section(&clip(&format!("{EDGE}{model}"), width), width)
}

/// Narrow mode: the stats on their own full-width row.
pub fn stats_row(state: &FooterState, width: usize) -> String {
    let candidates = stats_candidates(state);
    let stats = candidates
        .iter()
        .find(|stats| stats.chars().count() + EDGE.len() * 2 <= width)
        .unwrap_or(&candidates[2]);
    dark_section(stats, width)
}
