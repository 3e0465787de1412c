//! Terminal module: the primitive write/cursor layer both renderers target.

mod output;
mod sink;

pub use output::OutputBuffer;
pub use sink::{AnsiSink, MemorySink, SharedBuffer, StdoutSink, TerminalSink};
