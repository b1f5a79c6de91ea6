//! Filesystem Adapters
//!
//! - `FsWatcher` - `notify`-backed change notifications

mod watcher;

pub use watcher::{change_kind, FsWatcher, DEFAULT_CHANNEL_CAPACITY};
