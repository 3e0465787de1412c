//! Coordinator: wires the formatter and the footer to one terminal.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐                ┌──────────────┐
//! │ StreamingFormatter│──┐          ┌─▶│  scroll rows │ 1..=bottom
//! └───────────────────┘  │ Output   │  ├──────────────┤
//!                        ├─ Lock ───┤  │    footer    │ bottom+1..=height
//! ┌───────────────────┐  │          └─▶│              │
//! │  FooterRenderer   │──┘             └──────────────┘
//! └───────────────────┘
//! ```
//!
//! Both renderers share the [`OutputLock`], the layout and the content
//! cursor. The coordinator owns the transitions that touch both of them:
//! setup, resize, handing the terminal to a subshell and back, teardown.

use crate::actor::{FooterActor, FooterHandle, ResizeWatcher};
use crate::config::CoordinatorConfig;
use crate::error::Result;
use crate::footer::FooterRenderer;
use crate::layout::{LayoutProvider, ScreenLayout, FOOTER_REGION};
use crate::stream::{ConsoleBuffer, StreamingFormatter};
use crate::sync::{ContentCursor, OutputLock};
use crate::terminal::TerminalSink;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Shared handle to one terminal session. Clones share everything.
#[derive(Clone)]
pub struct Coordinator {
    output: OutputLock,
    layout: Arc<dyn LayoutProvider>,
    formatter: Arc<StreamingFormatter>,
    footer: Arc<FooterRenderer>,
    cursor: Arc<ContentCursor>,
    log: Arc<ConsoleBuffer>,
    config: Arc<CoordinatorConfig>,
}

impl Coordinator {
    /// Build a coordinator over `sink` with a [`ScreenLayout`] sized from it.
    pub fn new<S: TerminalSink + 'static>(sink: S, config: CoordinatorConfig) -> Result<Self> {
        let (width, height) = sink.size()?;
        let layout: Arc<dyn LayoutProvider> = Arc::new(ScreenLayout::new(width, height));
        Ok(Self::with_layout(sink, layout, config))
    }

    /// Build a coordinator over `sink` using a caller-supplied layout.
    pub fn with_layout<S: TerminalSink + 'static>(
        sink: S,
        layout: Arc<dyn LayoutProvider>,
        config: CoordinatorConfig,
    ) -> Self {
        let output = OutputLock::new(sink);
        let cursor = Arc::new(ContentCursor::new());
        let log = Arc::new(ConsoleBuffer::new(config.log_capacity));
        let formatter = StreamingFormatter::new(
            config.stream.clone(),
            output.clone(),
            layout.clone(),
            cursor.clone(),
            log.clone(),
        );
        let footer = FooterRenderer::new(config.footer.clone(), output.clone(), layout.clone());

        Self {
            output,
            layout,
            formatter: Arc::new(formatter),
            footer: Arc::new(footer),
            cursor,
            log,
            config: Arc::new(config),
        }
    }

    /// Replace the footer's home directory (used to show paths as `~/...`).
    ///
    /// Only meaningful before the coordinator is cloned or shared.
    #[must_use]
    pub fn with_home(mut self, home: Option<std::path::PathBuf>) -> Self {
        let footer = FooterRenderer::new(
            self.config.footer.clone(),
            self.output.clone(),
            self.layout.clone(),
        )
        .with_home(home);
        self.footer = Arc::new(footer);
        self
    }

    /// Reserve the footer rows, confine scrolling above them, home the
    /// cursor and draw the first footer frame.
    pub fn setup(&self) -> Result<()> {
        self.footer.init()?;
        let (top, bottom) = self.layout.scroll_region();
        self.output.batch(|sink| {
            sink.set_scroll_region(top, bottom)?;
            sink.move_cursor(1, top)?;
            Ok(())
        })?;
        self.cursor.reset();
        self.footer.render()?;
        info!(top, bottom, "terminal session set up");
        Ok(())
    }

    /// Apply a new terminal size to the layout, the footer and the
    /// scroll region, then put the cursor back on its content line.
    pub fn handle_resize(&self, width: u16, height: u16) -> Result<()> {
        self.footer.on_resize(width, height)?;
        let (top, bottom) = self.layout.scroll_region();
        self.output.batch(|sink| {
            // DECSTBM homes the cursor, so restore after it.
            sink.set_scroll_region(top, bottom)?;
            self.cursor.restore(sink, self.layout.as_ref())?;
            Ok(())
        })?;
        debug!(width, height, bottom, line = self.cursor.line(), "resize applied");
        Ok(())
    }

    /// Move the cursor to the top-left content cell and forget the tracked
    /// content line.
    pub fn reposition_cursor(&self) -> Result<()> {
        self.output
            .batch(|sink| Ok(self.cursor.reposition(sink, self.layout.as_ref())?))
    }

    /// Take the terminal back after something else had all of it.
    ///
    /// The size is queried again, the footer region and scroll region are
    /// rebuilt and redrawn, and the cursor goes to the top of the content
    /// area.
    pub fn restore_after_passthrough(&self) -> Result<()> {
        let (width, height) = self.output.size()?;
        self.footer.on_resize(width, height)?;
        let (top, bottom) = self.layout.scroll_region();
        self.output.batch(|sink| {
            sink.set_scroll_region(top, bottom)?;
            self.cursor.reposition(sink, self.layout.as_ref())?;
            Ok(())
        })?;
        debug!(width, height, "terminal restored after passthrough");
        Ok(())
    }

    /// Give the whole screen back: finish any open stream, clear the
    /// footer, reset the scroll region and leave the cursor below the
    /// content.
    pub fn teardown(&self) -> Result<()> {
        self.formatter.finalize()?;
        let footer = self.layout.region(FOOTER_REGION).ok();
        let (_, bottom) = self.layout.scroll_region();
        self.output.batch(|sink| {
            sink.reset_scroll_region()?;
            let resume = match footer {
                Some(region) => {
                    for row in region.y() + 1..=region.y() + region.height() {
                        sink.move_cursor(1, row)?;
                        sink.clear_line()?;
                    }
                    region.y() + 1
                }
                None => bottom,
            };
            sink.move_cursor(1, resume)?;
            Ok(())
        })?;
        info!("terminal session torn down");
        Ok(())
    }

    /// Start the footer actor for this session.
    pub fn spawn_footer_actor(&self) -> FooterActor {
        FooterActor::spawn(self.clone())
    }

    /// Start a watcher that polls the real terminal size every `interval`
    /// and reports changes to `footer`.
    pub fn spawn_resize_watcher(&self, footer: FooterHandle, interval: Duration) -> ResizeWatcher {
        ResizeWatcher::terminal(footer, interval, self.layout.terminal_size())
    }

    /// The streaming formatter.
    pub fn formatter(&self) -> &StreamingFormatter {
        &self.formatter
    }

    /// The footer renderer.
    pub fn footer(&self) -> &FooterRenderer {
        &self.footer
    }

    /// Plain-text log of every streamed line.
    pub fn log(&self) -> &ConsoleBuffer {
        &self.log
    }

    /// The shared output lock.
    pub const fn output(&self) -> &OutputLock {
        &self.output
    }

    /// The content cursor.
    pub fn cursor(&self) -> &ContentCursor {
        &self.cursor
    }

    /// The shared layout.
    pub fn layout(&self) -> &dyn LayoutProvider {
        self.layout.as_ref()
    }

    /// The configuration this coordinator was built with.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("terminal_size", &self.layout.terminal_size())
            .field("scroll_region", &self.layout.scroll_region())
            .field("content_line", &self.cursor.line())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamConfig;
    use crate::footer::GitInfo;
    use crate::terminal::{MemorySink, SharedBuffer};

    fn coordinator(width: u16, height: u16) -> (Coordinator, SharedBuffer) {
        let (sink, out) = MemorySink::memory(width, height);
        let config = CoordinatorConfig::default().with_stream(
            StreamConfig::default()
                .with_min_flush_delay_ms(60_000)
                .with_highlight_json(false),
        );
        let coordinator = Coordinator::new(sink, config).unwrap().with_home(None);
        (coordinator, out)
    }

    fn screen(out: &SharedBuffer, width: u16, height: u16) -> vt100::Parser {
        let mut parser = vt100::Parser::new(height, width, 0);
        parser.process(&out.contents());
        parser
    }

    #[test]
    fn test_setup_reserves_footer_rows() {
        let (c, out) = coordinator(120, 30);
        c.setup().unwrap();
        assert_eq!(c.layout().scroll_region(), (1, 26));
        assert_eq!(c.layout().region(FOOTER_REGION).unwrap().y(), 26);
        assert!(out.contents_string().contains("\x1b[1;26r"));

        let parser = screen(&out, 120, 30);
        assert_eq!(parser.screen().cursor_position(), (0, 0));
        assert!(!c.footer().needs_redraw());
    }

    #[test]
    fn test_streamed_text_stays_above_footer() {
        let (c, out) = coordinator(120, 12);
        c.setup().unwrap();
        c.footer().update_git(GitInfo::repo("main", 0));
        c.footer().render().unwrap();
        for i in 0..20 {
            c.formatter().write(&format!("line {i}\n")).unwrap();
        }
        c.formatter().finalize().unwrap();

        assert!(out.contents_string().contains("line 19\n"));
        // Content scrolls inside rows 1..=8; the git row (row 11) survives.
        let parser = screen(&out, 120, 12);
        let git_row = parser.screen().rows(0, 120).nth(10).unwrap_or_default();
        assert!(git_row.contains("main"), "git row was {git_row:?}");
        assert_eq!(c.cursor().line(), 8);
        assert_eq!(c.log().len(), 20);
    }

    #[test]
    fn test_resize_rebuilds_scroll_region() {
        let (c, out) = coordinator(120, 30);
        c.setup().unwrap();
        c.formatter().write("a\nb\nc\n").unwrap();
        out.clear();

        c.handle_resize(80, 20).unwrap();
        assert_eq!(c.layout().terminal_size(), (80, 20));
        assert_eq!(c.layout().scroll_region(), (1, 15));
        let bytes = out.contents_string();
        assert!(bytes.contains("\x1b[1;15r"));
        assert!(bytes.ends_with("\x1b[4;1H"));
    }

    #[test]
    fn test_reposition_resets_content_line() {
        let (c, out) = coordinator(120, 30);
        c.setup().unwrap();
        c.formatter().write("one\ntwo\n").unwrap();
        assert_eq!(c.cursor().line(), 3);
        out.clear();

        c.reposition_cursor().unwrap();
        assert_eq!(c.cursor().line(), 0);
        assert_eq!(out.contents(), b"\x1b[1;1H");
    }

    #[test]
    fn test_restore_after_passthrough_redraws_footer() {
        let (c, out) = coordinator(120, 30);
        c.setup().unwrap();
        c.formatter().write("before\n").unwrap();
        out.clear();

        c.restore_after_passthrough().unwrap();
        assert_eq!(c.cursor().line(), 0);
        let bytes = out.contents_string();
        assert!(bytes.contains("\x1b[1;26r"));
        assert!(bytes.contains(crate::style::FOOTER_BG));
        assert!(bytes.ends_with("\x1b[1;1H"));
    }

    #[test]
    fn test_teardown_releases_screen() {
        let (c, out) = coordinator(120, 30);
        c.setup().unwrap();
        c.formatter().write("unterminated").unwrap();
        out.clear();

        c.teardown().unwrap();
        assert!(c.formatter().is_finalized());
        let bytes = out.contents_string();
        assert!(bytes.contains("\x1b[r"));
        assert!(bytes.ends_with("\x1b[27;1H"));

        let parser = screen(&out, 120, 30);
        assert_eq!(parser.screen().cursor_position(), (26, 0));
    }
}
