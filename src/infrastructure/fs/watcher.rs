//! Filesystem Watcher
//!
//! Adapts `notify` to the watch loop: every relevant notification becomes a
//! `ChangeEvent` on a bounded channel. When the channel is full the notify
//! thread blocks, so bursts are never dropped. Dropping the watcher closes
//! the channel, which stops the loop.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

use notify::event::{EventKind, ModifyKind};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::domain::entities::{ChangeEvent, ChangeKind};
use crate::error::{ToolboxError, ToolboxResult};

/// Change events buffered between the notify thread and the watch loop
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
pub struct FsWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl FsWatcher {
    /// Watch `root` recursively
    pub fn start(root: &Path, capacity: usize) -> ToolboxResult<(Self, Receiver<ChangeEvent>)> {
        let (tx, rx) = sync_channel(capacity.max(1));

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => forward(event, &tx),
                Err(err) => tracing::warn!(error = %err, "file watcher error"),
            },
            Config::default(),
        )
        .map_err(|e| ToolboxError::Watch(e.to_string()))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| ToolboxError::Watch(format!("{}: {}", root.display(), e)))?;
        tracing::debug!(root = %root.display(), "watching");

        Ok((
            Self {
                root: root.to_path_buf(),
                _watcher: watcher,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn forward(event: Event, tx: &SyncSender<ChangeEvent>) {
    let Some(kind) = change_kind(&event.kind) else {
        return;
    };
    for path in event.paths {
        // Receiver gone: the loop has stopped
        if tx.send(ChangeEvent::new(path, kind)).is_err() {
            return;
        }
    }
}

/// Map notify's event kinds; reads and metadata-only access are dropped
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) | EventKind::Any => Some(ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};
    use std::time::{Duration, Instant};

    #[test]
    fn maps_event_kinds() {
        assert_eq!(
            change_kind(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            change_kind(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(ChangeKind::Modified)
        );
        assert_eq!(
            change_kind(&EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Removed)
        );
        assert_eq!(change_kind(&EventKind::Access(AccessKind::Any)), None);
        assert_eq!(
            change_kind(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))),
            None
        );
    }

    #[test]
    fn reports_file_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let (_watcher, rx) = FsWatcher::start(&root, 64).unwrap();

        std::fs::write(root.join("main.c"), "int main(void) { return 0; }\n").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = false;
        while Instant::now() < deadline && !seen {
            if let Ok(event) = rx.recv_timeout(Duration::from_millis(100)) {
                seen = event.path().ends_with("main.c");
            }
        }
        assert!(seen, "expected a change event for main.c");
    }

    #[test]
    fn dropping_watcher_closes_channel() {
        let dir = tempfile::tempdir().unwrap();
        let (watcher, rx) = FsWatcher::start(dir.path(), 8).unwrap();
        drop(watcher);

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                _ if Instant::now() > deadline => panic!("channel never closed"),
                _ => {}
            }
        }
    }

    #[test]
    fn missing_root_is_watch_error() {
        let err = FsWatcher::start(Path::new("/definitely/not/here"), 8).unwrap_err();
        assert!(matches!(err, ToolboxError::Watch(_)));
    }
}
