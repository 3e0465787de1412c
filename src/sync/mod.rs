//! Output synchronization: the one lock every terminal writer goes through,
//! and the content cursor that tracks where streamed text continues.

mod cursor;
mod lock;

pub use cursor::ContentCursor;
pub use lock::{OutputGuard, OutputLock};
