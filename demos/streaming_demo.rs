//! Streaming Demo: a simulated agent response above a live footer.
//!
//! Tokens are streamed at roughly 100 tokens/s while a second thread
//! reports usage to the footer actor. Resize the window while it runs to
//! watch the footer switch between its four and five row layouts.
//!
//! Logs go to `tidemark-demo.log` (`RUST_LOG=tidemark=trace` for more).

use std::env;
use std::thread;
use std::time::{Duration, Instant};
use tidemark::footer::git;
use tidemark::{Coordinator, CoordinatorConfig, StatsUpdate, StdoutSink, StreamConfig};

/// Sample text to stream (simulating an LLM response).
const SAMPLE_TEXT: &str = r#"I'll walk through how the renderer keeps output and status apart.
## The Key Architecture
Output and footer share **one lock**, and neither holds it for longer than a single write batch:
1. The formatter buffers tokens and flushes whole lines at natural breaks
2. The footer only draws when its state changed
3. A resize rebuilds the scroll region and redraws the footer
- headings, lists and `inline code` are styled per line
- fenced code stays *verbatim*
> Tool calls in the stream are stripped before anything is printed.<function=read_file>{"path": "src/lib.rs"}</function>
```rust
fn main() {
    println!("hello from a code block");
}
```
The final config looks like {"throttle_ms": 100, "narrow": false, "rows": [4, 5]} once applied.
---
That's the whole pipeline. [[TASK_COMPLETE]]
"#;

fn main() -> tidemark::Result<()> {
    tidemark::logging::init_file_logging("tidemark-demo.log", "debug")?;

    let config = CoordinatorConfig::default()
        .with_stream(StreamConfig::default().with_banner("Streaming response"));
    let coordinator = Coordinator::new(StdoutSink::stdout(), config)?;
    coordinator.setup()?;

    let cwd = env::current_dir()?;
    coordinator.footer().update_path(cwd.clone());
    coordinator.footer().update_git(git::probe(&cwd));

    let actor = coordinator.spawn_footer_actor();
    let handle = actor.handle();
    let watcher = coordinator.spawn_resize_watcher(handle.clone(), Duration::from_millis(250));

    handle.set_streaming(true)?;
    let started = Instant::now();
    let reporter = {
        let handle = handle.clone();
        thread::spawn(move || {
            for tick in 1..=40i32 {
                let update = StatsUpdate {
                    model: "anthropic/claude-sonnet-4".into(),
                    provider: "Anthropic".into(),
                    tokens: i64::from(tick) * 37,
                    cost: 0.000_3 * f64::from(tick),
                    iteration: 1,
                    context_tokens: 8_000 + i64::from(tick) * 37,
                    max_context_tokens: 200_000,
                };
                if handle.update_stats(update).is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(100));
            }
        })
    };

    // Roughly one token every 10ms.
    let chars: Vec<char> = SAMPLE_TEXT.chars().collect();
    for token in chars.chunks(4) {
        let token: String = token.iter().collect();
        coordinator.formatter().write(&token)?;
        thread::sleep(Duration::from_millis(10));
    }
    coordinator.formatter().finalize()?;
    handle.set_streaming(false)?;
    let _ = reporter.join();

    thread::sleep(Duration::from_millis(500));
    watcher.join();
    actor.join();
    coordinator.teardown()?;

    println!(
        "streamed {} lines in {:.1}s",
        coordinator.log().len(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
