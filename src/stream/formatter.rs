//! The streaming formatter.

use super::content_log::ContentLog;
use super::filter::filter_chunk;
use super::markdown::LineStyler;
use crate::config::StreamConfig;
use crate::error::Result;
use crate::layout::LayoutProvider;
use crate::style::{Color, Style, CLEAR_CURRENT_LINE};
use crate::sync::{ContentCursor, OutputLock};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const BANNER: Style = Style::fg(Color::CYAN);

/// Decide whether buffered text should be flushed now.
///
/// Every trigger is evaluated; any one of them is enough:
/// a newline, a word boundary past 20 bytes, the size cap, a sentence break
/// past 10 bytes, or the minimum delay having elapsed.
pub fn should_flush(buffer: &str, since_last_flush: Duration, config: &StreamConfig) -> bool {
    if buffer.is_empty() {
        return false;
    }
    let len = buffer.len();
    let has_newline = buffer.contains('\n');
    let word_boundary = len > 20 && buffer.ends_with(' ');
    let at_capacity = len >= config.max_buffer_size;
    let sentence_break = len > 10 && [". ", "! ", "? ", ": "].iter().any(|end| buffer.ends_with(end));
    let timed_out = since_last_flush >= config.min_flush_delay();

    has_newline || word_boundary || at_capacity || sentence_break || timed_out
}

/// Per-turn streaming state.
#[derive(Debug)]
struct Session {
    pending: String,
    carry: String,
    first_chunk: bool,
    last_was_newline: bool,
    finalized: bool,
    last_flush: Instant,
    styler: LineStyler,
}

impl Session {
    fn new(config: &StreamConfig) -> Self {
        Self {
            pending: String::new(),
            carry: String::new(),
            first_chunk: true,
            last_was_newline: false,
            finalized: false,
            last_flush: Instant::now(),
            styler: LineStyler::new(config.rule_width, config.highlight_json),
        }
    }
}

/// Turns streamed chunks into styled terminal lines.
///
/// All methods take `&self` and serialize on an internal session lock, so
/// `finalize` and `reset` may run on a different thread than `write`. The
/// session lock is always taken before the output lock.
pub struct StreamingFormatter {
    session: Mutex<Session>,
    output: OutputLock,
    layout: Arc<dyn LayoutProvider>,
    cursor: Arc<ContentCursor>,
    log: Arc<dyn ContentLog>,
    config: StreamConfig,
}

impl StreamingFormatter {
    /// Create a formatter writing through `output`.
    pub fn new(
        config: StreamConfig,
        output: OutputLock,
        layout: Arc<dyn LayoutProvider>,
        cursor: Arc<ContentCursor>,
        log: Arc<dyn ContentLog>,
    ) -> Self {
        Self {
            session: Mutex::new(Session::new(&config)),
            output,
            layout,
            cursor,
            log,
            config,
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active configuration.
    pub const fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Append a chunk and flush if any trigger fires.
    ///
    /// Ignored once the session is finalized.
    pub fn write(&self, chunk: &str) -> Result<()> {
        let mut session = self.session();
        if session.finalized {
            trace!("write after finalize ignored");
            return Ok(());
        }

        let filtered = filter_chunk(chunk);
        if filtered.is_empty() {
            return Ok(());
        }

        let mut out = String::new();
        if session.first_chunk {
            session.first_chunk = false;
            out.push_str(CLEAR_CURRENT_LINE);
            if let Some(banner) = &self.config.banner {
                BANNER.paint_into(banner, &mut out);
                out.push_str("\n\n");
            }
        }

        session.pending.push_str(&filtered);
        if should_flush(&session.pending, session.last_flush.elapsed(), &self.config) {
            self.flush_pending(&mut session, &mut out);
        }
        self.emit(&out)
    }

    /// Flush buffered text now, keeping an incomplete trailing line carried.
    pub fn force_flush(&self) -> Result<()> {
        let mut session = self.session();
        if session.finalized {
            return Ok(());
        }
        let mut out = String::new();
        self.flush_pending(&mut session, &mut out);
        self.emit(&out)
    }

    /// Flush everything, including the carried line, and end the output with
    /// a newline. Later calls are no-ops.
    pub fn finalize(&self) -> Result<()> {
        let mut session = self.session();
        if session.finalized {
            return Ok(());
        }

        let mut out = String::new();
        self.flush_pending(&mut session, &mut out);
        if !session.carry.is_empty() {
            let line = std::mem::take(&mut session.carry);
            self.style_line(&mut session, &line, &mut out);
            session.last_was_newline = true;
        }
        if !session.last_was_newline {
            out.push('\n');
            session.last_was_newline = true;
        }
        session.finalized = true;
        debug!(bytes = out.len(), "stream finalized");
        self.emit(&out)
    }

    /// Clear all session state so the next write starts a new turn.
    pub fn reset(&self) {
        let mut session = self.session();
        *session = Session::new(&self.config);
        trace!("stream session reset");
    }

    /// Whether the current session has received any content.
    pub fn has_processed_content(&self) -> bool {
        !self.session().first_chunk
    }

    /// Whether [`finalize`](Self::finalize) has run for this session.
    pub fn is_finalized(&self) -> bool {
        self.session().finalized
    }

    /// The incomplete line currently held back.
    pub fn carry(&self) -> String {
        self.session().carry.clone()
    }

    fn flush_pending(&self, session: &mut Session, out: &mut String) {
        session.last_flush = Instant::now();
        if session.pending.is_empty() {
            return;
        }

        let text = std::mem::take(&mut session.pending);
        let (complete, tail) = match text.strip_suffix('\n') {
            Some(body) => (Some(body), None),
            None => match text.rfind('\n') {
                Some(idx) => (Some(&text[..idx]), Some(&text[idx + 1..])),
                None => (None, Some(text.as_str())),
            },
        };

        let mut lines = 0;
        if let Some(body) = complete {
            for (i, segment) in body.split('\n').enumerate() {
                let carried = !session.carry.is_empty();
                let mut line = std::mem::take(&mut session.carry);
                line.push_str(segment);

                // A flush that opens with an empty line right after a newline
                // would double the gap at the flush boundary.
                let redundant_blank =
                    i == 0 && !carried && session.last_was_newline && line.trim().is_empty();
                if !redundant_blank {
                    lines += self.style_line(session, &line, out);
                }
                session.last_was_newline = true;
            }
        }

        if let Some(tail) = tail {
            if !tail.is_empty() {
                session.carry.push_str(tail);
                session.last_was_newline = false;
            }
        }
        trace!(lines, carry = session.carry.len(), "flushed");
    }

    fn style_line(&self, session: &mut Session, line: &str, out: &mut String) -> usize {
        self.log.append_line(line);
        session.styler.render_line(line, out)
    }

    fn emit(&self, out: &str) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        let newlines = out.bytes().filter(|&b| b == b'\n').count();
        let (top, bottom) = self.layout.scroll_region();
        let content_height = bottom.saturating_sub(top) + 1;

        self.output.batch(|sink| {
            sink.write_raw(out.as_bytes())?;
            self.cursor.advance(newlines, content_height);
            Ok(())
        })
    }
}

impl std::fmt::Debug for StreamingFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingFormatter")
            .field("config", &self.config)
            .field("cursor", &self.cursor.line())
            .finish_non_exhaustive()
    }
}
