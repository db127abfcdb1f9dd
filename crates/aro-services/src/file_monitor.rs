// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File monitor (§4.8): wraps the `notify` crate, translating its platform
//! events into the four file events of §3 (`FileCreated`/`FileModified`/
//! `FileDeleted`/`FileRenamed`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use aro_core::{Event, EventPublisher};

/// One active watch. Dropping this (or calling `stop`) tears down the
/// platform watcher.
pub struct FileMonitor {
    watcher: RecommendedWatcher,
    path: PathBuf,
}

impl FileMonitor {
    /// Start watching `path` recursively, publishing translated events
    /// through `publisher` (§4.8).
    pub fn start(path: impl AsRef<Path>, publisher: Arc<dyn EventPublisher>) -> notify::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let pending_rename_from: Arc<Mutex<Option<PathBuf>>> = Arc::new(Mutex::new(None));

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) => translate(event, &publisher, &pending_rename_from),
            Err(err) => tracing::debug!(error = %err, "file watcher reported an error"),
        })?;
        watcher.watch(&path, RecursiveMode::Recursive)?;
        Ok(Self { watcher, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stop(mut self) {
        let _ = self.watcher.unwatch(&self.path);
    }
}

fn translate(event: notify::Event, publisher: &Arc<dyn EventPublisher>, pending_rename_from: &Arc<Mutex<Option<PathBuf>>>) {
    match event.kind {
        EventKind::Create(CreateKind::File) | EventKind::Create(CreateKind::Any) => {
            for path in event.paths {
                publisher.publish(Event::FileCreated { path });
            }
        }
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            for path in event.paths {
                publisher.publish(Event::FileModified { path });
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            if event.paths.len() == 2 {
                publisher.publish(Event::FileRenamed {
                    old_path: Some(event.paths[0].clone()),
                    new_path: event.paths[1].clone(),
                });
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            if let Some(path) = event.paths.into_iter().next() {
                *pending_rename_from.lock() = Some(path);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            let old_path = pending_rename_from.lock().take();
            if let Some(new_path) = event.paths.into_iter().next() {
                publisher.publish(Event::FileRenamed { old_path, new_path });
            }
        }
        EventKind::Remove(RemoveKind::File) | EventKind::Remove(RemoveKind::Any) => {
            for path in event.paths {
                publisher.publish(Event::FileDeleted { path });
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "file_monitor_tests.rs"]
mod tests;
