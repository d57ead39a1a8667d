//! Write-behind persistence for the cart session
//!
//! Mutations publish a snapshot on a `watch` channel and return immediately.
//! A background task waits for a quiet period, then writes the newest
//! snapshot as JSON through a temp file and rename. Snapshots carry a
//! version so a slow background write can never overwrite a newer flush.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use super::session::CartSession;
use crate::error::PersistError;

#[derive(Debug, Clone, Default)]
struct Snapshot {
    version: u64,
    session: CartSession,
}

struct Writer {
    path: PathBuf,
    /// Highest version on disk
    written: Mutex<u64>,
}

impl Writer {
    async fn write(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let mut written = self.written.lock().await;
        if snapshot.version <= *written {
            return Ok(());
        }
        write_atomic(&self.path, &snapshot.session).await?;
        *written = snapshot.version;
        tracing::trace!(version = snapshot.version, path = %self.path.display(), "Cart persisted");
        Ok(())
    }
}

async fn write_atomic(path: &Path, session: &CartSession) -> Result<(), PersistError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(session)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Read a persisted session.
///
/// A missing file is an empty session. A corrupt file is logged and also
/// yields an empty session; the next write replaces it.
pub async fn load(path: &Path) -> Result<CartSession, PersistError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CartSession::default()),
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_slice::<CartSession>(&bytes) {
        Ok(session) => Ok(session.normalized()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable cart file");
            Ok(CartSession::default())
        }
    }
}

pub struct CartPersister {
    tx: watch::Sender<Snapshot>,
    writer: Arc<Writer>,
    task: JoinHandle<()>,
}

impl CartPersister {
    /// Start the background writer. Must be called inside a tokio runtime.
    pub fn spawn(path: PathBuf, debounce: Duration, initial: CartSession) -> Self {
        let (tx, mut rx) = watch::channel(Snapshot {
            version: 0,
            session: initial,
        });
        let writer = Arc::new(Writer {
            path,
            written: Mutex::new(0),
        });

        let task_writer = writer.clone();
        let task = tokio::spawn(async move {
            loop {
                let closed = rx.changed().await.is_err();
                if !closed {
                    tokio::time::sleep(debounce).await;
                }
                let snapshot = rx.borrow_and_update().clone();
                if let Err(e) = task_writer.write(&snapshot).await {
                    tracing::error!(error = %e, "Cart write-behind failed");
                }
                if closed {
                    break;
                }
            }
        });

        Self { tx, writer, task }
    }

    /// Queue a snapshot for writing
    pub fn publish(&self, version: u64, session: &CartSession) {
        self.tx.send_replace(Snapshot {
            version,
            session: session.clone(),
        });
    }

    /// Write the newest snapshot now
    pub async fn flush(&self) -> Result<(), PersistError> {
        let snapshot = self.tx.borrow().clone();
        self.writer.write(&snapshot).await
    }

    /// Write the newest snapshot and stop the background task
    pub async fn shutdown(self) -> Result<(), PersistError> {
        let result = self.flush().await;
        self.task.abort();
        result
    }
}
