//! Background jobs. Each job runs on its own thread, sends exactly one
//! value back and wakes the UI.

use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// The worker thread went away without sending its value.
#[derive(Debug)]
pub(super) struct WorkerLost;

pub(super) fn spawn<T, F>(ctx: &egui::Context, name: &str, job: F) -> Receiver<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let ctx = ctx.clone();
    let spawned = std::thread::Builder::new()
        .name(format!("leaf-{name}"))
        .spawn(move || {
            let value = job();
            let _ = tx.send(value);
            ctx.request_repaint();
        });
    if let Err(e) = spawned {
        tracing::error!("cannot start {name} worker: {e}");
    }
    rx
}

/// Take the job's value if it is ready, clearing `slot` once it settled.
pub(super) fn poll<T>(slot: &mut Option<Receiver<T>>) -> Option<Result<T, WorkerLost>> {
    let rx = slot.as_ref()?;
    let settled = match rx.try_recv() {
        Ok(value) => Ok(value),
        Err(TryRecvError::Empty) => return None,
        Err(TryRecvError::Disconnected) => Err(WorkerLost),
    };
    *slot = None;
    Some(settled)
}

/// Bytes of a file picked in the dialog or dropped by path.
pub(super) struct FileLoad {
    pub name: String,
    pub bytes: std::io::Result<Vec<u8>>,
}

impl FileLoad {
    /// Stands in for a reader thread that went away before replying.
    pub(super) fn stopped(name: String) -> Self {
        Self {
            name,
            bytes: Err(std::io::Error::other("file reader stopped")),
        }
    }
}

pub(super) fn read_file(path: PathBuf) -> FileLoad {
    FileLoad {
        name: display_name(&path),
        bytes: std::fs::read(&path),
    }
}

pub(super) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
