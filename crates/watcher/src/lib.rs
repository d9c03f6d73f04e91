//! Recursive directory-tree watching.
//!
//! Maintains one OS watch per directory under a root and exposes the raw
//! notifications as an ordered stream of [`RawEvent`]s. Coverage is dynamic:
//! directories created while the watcher runs are registered before their
//! contents can slip past unobserved. Anything already inside a brand-new
//! directory at registration time is reported through synthesized Create
//! events, recursively.

mod error;
mod event;

pub use error::WatchError;
pub use event::{FsOp, RawEvent};

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Handle to a running recursive watcher.
///
/// Dropping the handle stops the producer thread; [`RecursiveWatcher::stop`]
/// additionally joins it so all watch registrations are released before the
/// call returns. Once stopped, the event receiver yields end-of-stream.
pub struct RecursiveWatcher {
    stop_tx: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
    root: PathBuf,
}

impl RecursiveWatcher {
    /// Establish full watch coverage of `root` and start producing events.
    ///
    /// Scans the tree depth-first and registers a watch for every directory,
    /// the root included. Any failure here is fatal; partial coverage is
    /// not acceptable at startup.
    pub fn spawn(
        root: impl AsRef<Path>,
    ) -> Result<(Self, UnboundedReceiver<RawEvent>), WatchError> {
        let root = root.as_ref().to_path_buf();
        let meta = match fs::metadata(&root) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(WatchError::RootMissing(root));
            }
            Err(err) => return Err(WatchError::Io(err)),
        };
        if !meta.is_dir() {
            return Err(WatchError::NotADirectory(root));
        }

        let (notify_tx, notify_rx) = mpsc::channel::<Result<notify::Event, notify::Error>>();
        let mut watcher = notify::recommended_watcher(move |res| {
            // best-effort send; the producer thread may already be gone.
            let _ = notify_tx.send(res);
        })?;

        let mut watched = HashSet::new();
        for entry in WalkDir::new(&root) {
            let entry = entry?;
            if entry.file_type().is_dir() {
                watcher.watch(entry.path(), RecursiveMode::NonRecursive)?;
                watched.insert(entry.path().to_path_buf());
            }
        }

        let (event_tx, event_rx) = unbounded_channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let mut producer = Producer {
            watcher,
            watched,
            out: event_tx,
        };
        let join = thread::Builder::new()
            .name("fsaudit-watcher".to_string())
            .spawn(move || producer.run(notify_rx, stop_rx))?;

        Ok((
            Self {
                stop_tx,
                join: Some(join),
                root,
            },
            event_rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Release all watches and wait for the producer thread to finish.
    pub fn stop(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Producer-side state. The watch set is owned here exclusively; nothing
/// outside this thread ever reads or mutates it.
struct Producer {
    watcher: RecommendedWatcher,
    watched: HashSet<PathBuf>,
    out: UnboundedSender<RawEvent>,
}

impl Producer {
    fn run(
        &mut self,
        notify_rx: mpsc::Receiver<Result<notify::Event, notify::Error>>,
        stop_rx: mpsc::Receiver<()>,
    ) {
        loop {
            match stop_rx.try_recv() {
                Ok(()) | Err(mpsc::TryRecvError::Disconnected) => break,
                Err(mpsc::TryRecvError::Empty) => {}
            }

            match notify_rx.recv_timeout(Duration::from_millis(200)) {
                Ok(Ok(event)) => {
                    if !self.handle(&event) {
                        break;
                    }
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "notification backend error");
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("watcher thread finished");
    }

    /// Forward one backend event. Returns `false` once the receiver is gone.
    fn handle(&mut self, event: &notify::Event) -> bool {
        for raw in event::map_event(event) {
            let path = raw.path.clone();
            let new_dir = raw.op == FsOp::Create && path.is_dir();

            // A directory renamed or removed away is no longer observed at
            // its old path; release its handle (and its descendants') now.
            if matches!(raw.op, FsOp::Remove | FsOp::Rename) {
                self.release_subtree(&path);
            }

            if self.out.send(raw).is_err() {
                return false;
            }

            // Close the create-vs-register race: watch the new directory and
            // report whatever was written into it before the watch existed.
            if new_dir {
                if let Err(err) = self.add_subtree(&path) {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "new subtree left unwatched"
                    );
                }
            }
        }
        true
    }

    /// Watch `dir` and synthesize Create events for its current contents,
    /// recursing into nested subdirectories that existed before the watch
    /// was attached.
    fn add_subtree(&mut self, dir: &Path) -> Result<(), WatchError> {
        if self.watched.contains(dir) {
            return Ok(());
        }
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        self.watched.insert(dir.to_path_buf());

        for entry in fs::read_dir(dir)?.flatten() {
            let path = entry.path();
            let _ = self.out.send(RawEvent {
                path: path.clone(),
                op: FsOp::Create,
            });
            if path.is_dir() {
                if let Err(err) = self.add_subtree(&path) {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "nested directory left unwatched"
                    );
                }
            }
        }
        Ok(())
    }

    fn release_subtree(&mut self, path: &Path) {
        if !self.watched.contains(path) {
            return;
        }
        let stale: Vec<PathBuf> = self
            .watched
            .iter()
            .filter(|dir| dir.starts_with(path))
            .cloned()
            .collect();
        for dir in stale {
            // The backend usually dropped the handle with the directory;
            // unwatch is only needed for rename-away.
            let _ = self.watcher.unwatch(&dir);
            self.watched.remove(&dir);
        }
        debug!(path = %path.display(), "released directory watch");
    }
}
