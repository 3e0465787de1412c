//! Footer state: the values shown in the footer and change notification.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Minimum time between tokens-per-second samples.
const TPS_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Repository information shown on the git row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    /// Current branch; empty when unknown.
    pub branch: String,
    /// Number of uncommitted changes.
    pub changes: u32,
    /// Remote in `git@host:user/repo` form; empty when there is none.
    pub remote: String,
    /// Whether the working directory is inside a repository.
    pub is_repo: bool,
}

impl GitInfo {
    /// Info for a directory that is not a repository.
    pub fn not_a_repo() -> Self {
        Self::default()
    }

    /// Info for a repository on `branch`.
    pub fn repo(branch: impl Into<String>, changes: u32) -> Self {
        Self {
            branch: branch.into(),
            changes,
            remote: String::new(),
            is_repo: true,
        }
    }

    /// Attach a remote.
    #[must_use]
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }
}

/// Everything the footer displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FooterState {
    /// Full model identifier, `provider/model` style.
    pub model: String,
    /// Provider display name.
    pub provider: String,
    /// Total tokens used in the session.
    pub tokens: u64,
    /// Session cost in currency units.
    pub cost: f64,
    /// Agent iteration counter; 0 hides it.
    pub iteration: u64,
    /// Context tokens in use.
    pub context_tokens: u64,
    /// Context token budget; 0 hides context usage.
    pub max_context_tokens: u64,
    /// Repository information.
    pub git: GitInfo,
    /// Current working directory.
    pub path: PathBuf,
}

/// A field observers can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FooterField {
    /// Model or provider.
    Model,
    /// Token count.
    Tokens,
    /// Cost.
    Cost,
    /// Iteration counter.
    Iteration,
    /// Context usage or budget.
    Context,
    /// Any git field.
    Git,
    /// Working directory.
    Path,
}

impl FooterField {
    fn changed(self, old: &FooterState, new: &FooterState) -> bool {
        match self {
            Self::Model => old.model != new.model || old.provider != new.provider,
            Self::Tokens => old.tokens != new.tokens,
            Self::Cost => old.cost.to_bits() != new.cost.to_bits(),
            Self::Iteration => old.iteration != new.iteration,
            Self::Context => {
                old.context_tokens != new.context_tokens
                    || old.max_context_tokens != new.max_context_tokens
            }
            Self::Git => old.git != new.git,
            Self::Path => old.path != new.path,
        }
    }
}

/// A batch of usage numbers as reported by the generation loop.
///
/// Counts are signed so a caller bug (a negative delta gone wrong) is
/// caught here instead of wrapping around.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsUpdate {
    /// Full model identifier.
    pub model: String,
    /// Provider display name.
    pub provider: String,
    /// Total tokens.
    pub tokens: i64,
    /// Total cost.
    pub cost: f64,
    /// Iteration counter.
    pub iteration: i64,
    /// Context tokens in use.
    pub context_tokens: i64,
    /// Context token budget.
    pub max_context_tokens: i64,
}

/// Callback invoked with the new state after a subscribed field changed.
pub type FooterListener = Arc<dyn Fn(&FooterState) + Send + Sync>;

fn non_negative(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

fn valid_cost(cost: f64) -> bool {
    cost.is_finite() && cost >= 0.0
}

struct Sample {
    tokens: u64,
    at: Instant,
}

struct StoreInner {
    state: FooterState,
    version: u64,
    rendered_version: u64,
    listeners: Vec<(FooterField, FooterListener)>,
    sample: Sample,
    tokens_per_second: f64,
    started: Instant,
}

/// Shared footer state with dirty tracking and field observers.
///
/// Setters never render. They bump a version so the renderer knows a redraw
/// is due, and call subscribed listeners after the internal lock is released.
pub struct FooterStore {
    inner: Mutex<StoreInner>,
}

impl FooterStore {
    /// Empty state; the session clock starts now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            inner: Mutex::new(StoreInner {
                state: FooterState::default(),
                version: 0,
                rendered_version: 0,
                listeners: Vec::new(),
                sample: Sample { tokens: 0, at: now },
                tokens_per_second: 0.0,
                started: now,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> FooterState {
        self.inner().state.clone()
    }

    /// Copy of the current state and its version.
    pub(crate) fn versioned_snapshot(&self) -> (FooterState, u64) {
        let inner = self.inner();
        (inner.state.clone(), inner.version)
    }

    /// Whether the state changed since the last completed render.
    pub fn needs_redraw(&self) -> bool {
        let inner = self.inner();
        inner.version != inner.rendered_version
    }

    /// Force the next redraw check to report true.
    pub fn mark_dirty(&self) {
        self.inner().version += 1;
    }

    /// Record that the state at `version` reached the terminal.
    pub(crate) fn mark_rendered(&self, version: u64) {
        let mut inner = self.inner();
        inner.rendered_version = inner.rendered_version.max(version);
    }

    /// Most recent tokens-per-second sample.
    pub fn tokens_per_second(&self) -> f64 {
        self.inner().tokens_per_second
    }

    /// Time since the store was created.
    pub fn session_elapsed(&self) -> Duration {
        self.inner().started.elapsed()
    }

    /// Call `listener` whenever `field` changes.
    pub fn subscribe(&self, field: FooterField, listener: FooterListener) {
        self.inner().listeners.push((field, listener));
    }

    /// Apply a full stats update. Rejected as a whole when any count or the
    /// cost is negative.
    pub fn update_stats(&self, update: &StatsUpdate) -> bool {
        self.update_stats_at(update, Instant::now())
    }

    pub(crate) fn update_stats_at(&self, update: &StatsUpdate, now: Instant) -> bool {
        let (Some(tokens), Some(iteration), Some(context), Some(max_context)) = (
            non_negative(update.tokens),
            non_negative(update.iteration),
            non_negative(update.context_tokens),
            non_negative(update.max_context_tokens),
        ) else {
            warn!(?update, "rejected stats update with negative count");
            return false;
        };
        if !valid_cost(update.cost) {
            warn!(cost = update.cost, "rejected stats update with invalid cost");
            return false;
        }

        self.apply(now, |state| {
            state.model.clone_from(&update.model);
            state.provider.clone_from(&update.provider);
            state.tokens = tokens;
            state.cost = update.cost;
            state.iteration = iteration;
            state.context_tokens = context;
            state.max_context_tokens = max_context;
        });
        true
    }

    /// Set the model identifier and provider name.
    pub fn set_model(&self, provider: &str, model: &str) {
        self.apply(Instant::now(), |state| {
            state.provider = provider.to_string();
            state.model = model.to_string();
        });
    }

    /// Set the token count. Negative values are ignored.
    pub fn set_tokens(&self, tokens: i64) -> bool {
        self.set_tokens_at(tokens, Instant::now())
    }

    pub(crate) fn set_tokens_at(&self, tokens: i64, now: Instant) -> bool {
        let Some(tokens) = non_negative(tokens) else {
            trace!(tokens, "ignored negative token count");
            return false;
        };
        self.apply(now, |state| state.tokens = tokens);
        true
    }

    /// Set the cost. Negative or non-finite values are ignored.
    pub fn set_cost(&self, cost: f64) -> bool {
        if !valid_cost(cost) {
            trace!(cost, "ignored invalid cost");
            return false;
        }
        self.apply(Instant::now(), |state| state.cost = cost);
        true
    }

    /// Set the iteration counter. Negative values are ignored.
    pub fn set_iteration(&self, iteration: i64) -> bool {
        let Some(iteration) = non_negative(iteration) else {
            return false;
        };
        self.apply(Instant::now(), |state| state.iteration = iteration);
        true
    }

    /// Set context usage and budget. Ignored if either is negative.
    pub fn set_context(&self, used: i64, max: i64) -> bool {
        let (Some(used), Some(max)) = (non_negative(used), non_negative(max)) else {
            return false;
        };
        self.apply(Instant::now(), |state| {
            state.context_tokens = used;
            state.max_context_tokens = max;
        });
        true
    }

    /// Replace the git information, keeping a known remote when the new
    /// info carries none.
    pub fn set_git(&self, git: GitInfo) {
        self.apply(Instant::now(), |state| {
            let remote = if git.remote.is_empty() && git.is_repo {
                std::mem::take(&mut state.git.remote)
            } else {
                git.remote.clone()
            };
            state.git = GitInfo { remote, ..git };
        });
    }

    /// Set only the git remote.
    pub fn set_git_remote(&self, remote: &str) {
        self.apply(Instant::now(), |state| state.git.remote = remote.to_string());
    }

    /// Set the working directory.
    pub fn set_path(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.apply(Instant::now(), |state| state.path = path);
    }

    /// Mutate the state, then notify listeners of changed fields outside the lock.
    fn apply(&self, now: Instant, mutate: impl FnOnce(&mut FooterState)) {
        let (state, notify) = {
            let mut inner = self.inner();
            let old = inner.state.clone();
            mutate(&mut inner.state);

            let changed: Vec<FooterField> = [
                FooterField::Model,
                FooterField::Tokens,
                FooterField::Cost,
                FooterField::Iteration,
                FooterField::Context,
                FooterField::Git,
                FooterField::Path,
            ]
            .into_iter()
            .filter(|field| field.changed(&old, &inner.state))
            .collect();
            if changed.is_empty() {
                return;
            }

            inner.version += 1;
            if changed.contains(&FooterField::Tokens) {
                inner.sample_tokens(now);
            }

            let notify: Vec<FooterListener> = inner
                .listeners
                .iter()
                .filter(|(field, _)| changed.contains(field))
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (inner.state.clone(), notify)
        };

        for listener in notify {
            listener(&state);
        }
    }
}

impl StoreInner {
    /// Rate only moves forward on a strict increase after the sample interval.
    fn sample_tokens(&mut self, now: Instant) {
        let tokens = self.state.tokens;
        if tokens <= self.sample.tokens {
            if tokens < self.sample.tokens {
                // Counter went backwards (new session); restart sampling.
                self.sample = Sample { tokens, at: now };
            }
            return;
        }
        let elapsed = now.saturating_duration_since(self.sample.at);
        if elapsed < TPS_SAMPLE_INTERVAL {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let delta = (tokens - self.sample.tokens) as f64;
        self.tokens_per_second = delta / elapsed.as_secs_f64();
        self.sample = Sample { tokens, at: now };
    }
}

impl Default for FooterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FooterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner();
        f.debug_struct("FooterStore")
            .field("state", &inner.state)
            .field("version", &inner.version)
            .field("listeners", &inner.listeners.len())
            .finish_non_exhaustive()
    }
}
