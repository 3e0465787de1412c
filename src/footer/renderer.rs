//! The footer renderer: draws [`FooterState`] into the footer region.

use super::rows::{compose_rows, footer_height};
use super::state::{FooterField, FooterListener, FooterState, FooterStore, GitInfo, StatsUpdate};
use crate::config::FooterConfig;
use crate::error::Result;
use crate::layout::{ComponentSpec, LayoutProvider, Rect, Region, FOOTER_REGION};
use crate::style::{FG_BG_RESET, RESET};
use crate::sync::OutputLock;
use crate::terminal::TerminalSink;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

/// Renders the status footer at the bottom of the terminal.
///
/// Setters only update state; [`render`](Self::render) draws. Rendering
/// takes the output lock for the whole frame and saves and restores the
/// cursor around it, so the content area never sees the footer move its
/// cursor.
pub struct FooterRenderer {
    store: FooterStore,
    output: OutputLock,
    layout: Arc<dyn LayoutProvider>,
    config: FooterConfig,
    home: Option<PathBuf>,
    last_region: Mutex<Option<Region>>,
}

impl FooterRenderer {
    /// Create a renderer. Call [`init`](Self::init) before the first render.
    pub fn new(config: FooterConfig, output: OutputLock, layout: Arc<dyn LayoutProvider>) -> Self {
        Self {
            store: FooterStore::new(),
            output,
            layout,
            config,
            home: dirs::home_dir(),
            last_region: Mutex::new(None),
        }
    }

    /// Override the home directory used to collapse the path row to `~`.
    #[must_use]
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// The footer's state store.
    pub const fn store(&self) -> &FooterStore {
        &self.store
    }

    /// The active configuration.
    pub const fn config(&self) -> &FooterConfig {
        &self.config
    }

    /// Rows the footer occupies at the current terminal width.
    pub fn footer_height(&self) -> u16 {
        let (width, _) = self.layout.terminal_size();
        footer_height(width, self.config.narrow_threshold)
    }

    /// Define the footer region for the current terminal size and reserve
    /// its rows in the layout.
    pub fn init(&self) -> Result<()> {
        let (width, height) = self.layout.terminal_size();
        let region = self.place(width, height)?;
        self.store.mark_dirty();
        debug!(width, height, rows = region.height(), "footer initialized");
        Ok(())
    }

    fn place(&self, width: u16, height: u16) -> Result<Region> {
        let rows = footer_height(width, self.config.narrow_threshold);
        let region = Region::new(Rect::bottom_rows(width, height, rows)).with_z_order(self.config.z_order);
        self.layout.define_region(FOOTER_REGION, region)?;
        self.layout.register_component(ComponentSpec::new(
            FOOTER_REGION,
            region.height(),
            self.config.z_order,
        ));
        Ok(region)
    }

    /// Whether state changed since the last completed render.
    pub fn needs_redraw(&self) -> bool {
        self.store.needs_redraw()
    }

    /// Draw every footer row.
    ///
    /// Fails with [`Error::RegionNotFound`](crate::Error::RegionNotFound)
    /// before [`init`](Self::init); the cursor is still saved and restored.
    pub fn render(&self) -> Result<()> {
        let (state, version) = self.store.versioned_snapshot();
        self.output.batch(|sink| {
            sink.save_cursor()?;
            let drawn = self.draw(sink, &state);
            end_frame(sink)?;
            drawn
        })?;
        self.store.mark_rendered(version);
        Ok(())
    }

    /// Render only if something changed. Returns whether a frame was drawn.
    pub fn render_if_dirty(&self) -> Result<bool> {
        if !self.needs_redraw() {
            return Ok(false);
        }
        self.render()?;
        Ok(true)
    }

    fn draw(&self, sink: &mut dyn TerminalSink, state: &FooterState) -> Result<()> {
        let region = self.layout.region(FOOTER_REGION)?;
        let rows = compose_rows(
            state,
            region.width(),
            self.config.narrow_threshold,
            self.home.as_deref(),
        );
        for (offset, row) in (0..region.height()).zip(&rows) {
            sink.move_cursor(region.x() + 1, region.y() + offset + 1)?;
            sink.clear_line()?;
            sink.write_raw(row.as_bytes())?;
        }
        *self.last_region.lock().unwrap_or_else(PoisonError::into_inner) = Some(region);
        trace!(width = region.width(), rows = region.height(), "footer drawn");
        Ok(())
    }

    /// React to a terminal resize.
    ///
    /// Clears the rows of the previous footer and of the new footer
    /// position, redefines the region for the new height and redraws, all
    /// in one output batch. A concurrent [`render`](Self::render) lands
    /// either before the move or after it, never in between.
    pub fn on_resize(&self, width: u16, height: u16) -> Result<()> {
        self.store.mark_dirty();
        let (state, version) = self.store.versioned_snapshot();
        self.output.batch(|sink| {
            sink.save_cursor()?;
            let moved = self.relayout(sink, width, height, &state);
            end_frame(sink)?;
            moved
        })?;
        self.store.mark_rendered(version);
        debug!(width, height, rows = self.footer_height(), "footer resized");
        Ok(())
    }

    /// Resize the layout, clear old and new footer rows, place the region
    /// and draw. Runs under the output lock.
    fn relayout(&self, sink: &mut dyn TerminalSink, width: u16, height: u16, state: &FooterState) -> Result<()> {
        if self.layout.terminal_size() != (width, height) {
            self.layout.resize(width, height);
        }
        let previous = *self.last_region.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = previous {
            clear_rows(sink, previous.y(), previous.height(), height)?;
        }
        let next = self.place(width, height)?;
        clear_rows(sink, next.y(), next.height(), height)?;
        self.draw(sink, state)
    }

    /// Apply a stats update; negative values reject the whole update.
    pub fn update_stats(&self, update: &StatsUpdate) -> bool {
        self.store.update_stats(update)
    }

    /// Set the model identifier and provider.
    pub fn update_model(&self, provider: &str, model: &str) {
        self.store.set_model(provider, model);
    }

    /// Replace git information.
    pub fn update_git(&self, git: GitInfo) {
        self.store.set_git(git);
    }

    /// Set the git remote.
    pub fn update_git_remote(&self, remote: &str) {
        self.store.set_git_remote(remote);
    }

    /// Set the working directory.
    pub fn update_path(&self, path: impl Into<PathBuf>) {
        self.store.set_path(path);
    }

    /// Observe changes to `field`.
    pub fn subscribe(&self, field: FooterField, listener: FooterListener) {
        self.store.subscribe(field, listener);
    }
}

/// Reset colors and restore the cursor saved at the start of a frame.
fn end_frame(sink: &mut dyn TerminalSink) -> io::Result<()> {
    sink.write_raw(RESET.as_bytes())?;
    sink.write_raw(FG_BG_RESET.as_bytes())?;
    sink.restore_cursor()
}

/// Clear `count` rows starting at 0-based row `top`, skipping rows past `screen_height`.
fn clear_rows(sink: &mut dyn TerminalSink, top: u16, count: u16, screen_height: u16) -> io::Result<()> {
    for offset in 0..count {
        let row = top + offset + 1;
        if row > screen_height {
            break;
        }
        sink.move_cursor(1, row)?;
        sink.clear_line()?;
    }
    Ok(())
}

impl std::fmt::Debug for FooterRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FooterRenderer")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::layout::ScreenLayout;
    use crate::terminal::{MemorySink, SharedBuffer};

    struct Harness {
        footer: FooterRenderer,
        out: SharedBuffer,
        layout: Arc<ScreenLayout>,
    }

    fn harness(width: u16, height: u16) -> Harness {
        let (sink, out) = MemorySink::memory(width, height);
        let layout = Arc::new(ScreenLayout::new(width, height));
        let footer = FooterRenderer::new(FooterConfig::default(), OutputLock::new(sink), layout.clone())
            .with_home(None);
        footer.update_stats(&StatsUpdate {
            model: "openai/gpt-4".into(),
            provider: "OpenAI".into(),
            tokens: 1500,
            cost: 0.05,
            ..StatsUpdate::default()
        });
        footer.update_path("/work/project");
        footer.update_git(GitInfo::repo("main", 1).with_remote("git@github.com:me/app"));
        Harness { footer, out, layout }
    }

    fn screen(bytes: &[u8], width: u16, height: u16) -> vt100::Parser {
        let mut parser = vt100::Parser::new(height, width, 0);
        parser.process(b"\x1b[3;5H");
        parser.process(bytes);
        parser
    }

    fn row(parser: &vt100::Parser, width: u16, index: usize) -> String {
        parser
            .screen()
            .rows(0, width)
            .nth(index)
            .unwrap_or_default()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_render_before_init_fails_cleanly() {
        let h = harness(120, 30);
        let result = h.footer.render();
        assert!(matches!(result, Err(Error::RegionNotFound(_))));
        assert_eq!(h.out.contents(), b"\x1b7\x1b[0m\x1b[39;49m\x1b8");
        assert!(h.footer.needs_redraw());
    }

    #[test]
    fn test_wide_footer_rows() {
        let h = harness(120, 30);
        h.footer.init().unwrap();
        assert_eq!(h.footer.footer_height(), 4);
        assert_eq!(h.layout.scroll_region(), (1, 26));

        h.footer.render().unwrap();
        assert!(!h.footer.needs_redraw());

        let parser = screen(&h.out.contents(), 120, 30);
        assert_eq!(row(&parser, 120, 26), "");
        assert_eq!(row(&parser, 120, 27), "  /work/project");
        assert_eq!(row(&parser, 120, 28), "  git@github.com:me/app:main (+1)");
        let stats = row(&parser, 120, 29);
        assert!(stats.starts_with("  OpenAI (gpt-4)  "));
        assert!(stats.ends_with("1.5K | $0.050"));

        let separator = parser.screen().cell(26, 0).unwrap();
        assert_eq!(separator.bgcolor(), vt100::Color::Rgb(50, 54, 62));
        assert_eq!(parser.screen().cursor_position(), (2, 4), "cursor restored");
    }

    #[test]
    fn test_narrow_footer_rows() {
        let h = harness(80, 24);
        h.footer.init().unwrap();
        assert_eq!(h.footer.footer_height(), 5);
        assert_eq!(h.layout.scroll_region(), (1, 19));
        h.footer.render().unwrap();

        let parser = screen(&h.out.contents(), 80, 24);
        assert_eq!(row(&parser, 80, 21), "  main (+1)");
        assert_eq!(row(&parser, 80, 22), "  OpenAI (gpt-4)");
        assert!(row(&parser, 80, 23).ends_with("1.5K | $0.050"));
    }

    #[test]
    fn test_resize_moves_footer() {
        let h = harness(120, 30);
        h.footer.init().unwrap();
        h.footer.render().unwrap();
        h.out.clear();

        h.footer.on_resize(80, 24).unwrap();
        assert_eq!(h.layout.terminal_size(), (80, 24));
        assert_eq!(h.layout.region(FOOTER_REGION).unwrap().height(), 5);
        assert_eq!(h.layout.scroll_region(), (1, 19));

        let parser = screen(&h.out.contents(), 80, 24);
        assert_eq!(row(&parser, 80, 20), "  /work/project");
        assert_eq!(row(&parser, 80, 22), "  OpenAI (gpt-4)");
        assert_eq!(parser.screen().cursor_position(), (2, 4));
    }

    #[test]
    fn test_resize_is_one_frame() {
        let h = harness(120, 30);
        h.footer.init().unwrap();
        h.footer.render().unwrap();
        h.out.clear();

        h.footer.on_resize(80, 24).unwrap();
        let bytes = h.out.contents_string();
        assert!(bytes.starts_with("\x1b7"));
        assert!(bytes.ends_with("\x1b[0m\x1b[39;49m\x1b8"));
        assert_eq!(bytes.matches("\x1b7").count(), 1);
        assert!(!h.footer.needs_redraw());
    }

    #[test]
    fn test_render_during_resizes_always_finds_region() {
        let h = Arc::new(harness(120, 30));
        h.footer.init().unwrap();

        let renderer = {
            let h = Arc::clone(&h);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    h.footer.render().unwrap();
                }
            })
        };
        for i in 0..50 {
            let (width, height) = if i % 2 == 0 { (80, 24) } else { (120, 30) };
            h.footer.on_resize(width, height).unwrap();
        }
        renderer.join().unwrap();

        assert_eq!(h.layout.terminal_size(), (120, 30));
        assert_eq!(h.layout.region(FOOTER_REGION).unwrap().y(), 26);
    }

    #[test]
    fn test_render_if_dirty() {
        let h = harness(120, 30);
        h.footer.init().unwrap();
        assert!(h.footer.render_if_dirty().unwrap());
        assert!(!h.footer.render_if_dirty().unwrap());

        h.footer.store().set_tokens(2_000_000);
        assert!(h.footer.render_if_dirty().unwrap());
        let parser = screen(&h.out.contents(), 120, 30);
        assert!(row(&parser, 120, 29).ends_with("2.0M | $0.050"));
    }
}
