//! Background metadata/artwork resolution.
//!
//! Tag reading and artwork decoding are too slow for the UI loop, so they run
//! on a worker thread. Every request carries an explicit cancellation token:
//! when the owner moves on to a different item it cancels the old token, the
//! worker skips delivery for cancelled jobs, and the consumer re-checks the
//! token on receipt. No result for a stale request is ever applied.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::library::artwork::{self, Artwork};
use crate::library::scan;

/// Cancellation handle for one in-flight metadata request.
#[derive(Debug, Clone)]
pub struct RequestToken {
    cancelled: Arc<AtomicBool>,
}

impl RequestToken {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// What the worker resolved for one file. Fields are `None` when the file
/// was unreadable; consumers keep their placeholders in that case.
#[derive(Debug, Clone)]
pub struct LoadedMetadata {
    pub path: PathBuf,
    pub duration: Option<Duration>,
    pub artwork: Option<Artwork>,
}

pub struct MetadataResult {
    pub token: RequestToken,
    pub loaded: LoadedMetadata,
}

struct Job {
    token: RequestToken,
    path: PathBuf,
}

pub struct MetadataLoader {
    tx: Sender<Job>,
}

impl MetadataLoader {
    /// Spawn the worker. The returned receiver delivers completed requests.
    pub fn new() -> (Self, Receiver<MetadataResult>) {
        let (tx, rx) = mpsc::channel::<Job>();
        let (result_tx, result_rx) = mpsc::channel::<MetadataResult>();

        thread::spawn(move || {
            while let Ok(job) = rx.recv() {
                if let Some(result) = process(job) {
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            }
        });

        (Self { tx }, result_rx)
    }

    /// Enqueue extraction for `path` and return its cancellation token.
    pub fn request(&self, path: PathBuf) -> RequestToken {
        let token = RequestToken::new();
        let _ = self.tx.send(Job {
            token: token.clone(),
            path,
        });
        token
    }
}

fn process(job: Job) -> Option<MetadataResult> {
    if job.token.is_cancelled() {
        debug!(path = %job.path.display(), "skipping cancelled metadata request");
        return None;
    }

    let tags = scan::read_tags(&job.path);
    let artwork = artwork::extract(&job.path);

    // The owner may have moved on while we were decoding.
    if job.token.is_cancelled() {
        return None;
    }

    Some(MetadataResult {
        token: job.token,
        loaded: LoadedMetadata {
            duration: tags.duration,
            artwork,
            path: job.path,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn process_skips_cancelled_jobs() {
        let token = RequestToken::new();
        token.cancel();
        let job = Job {
            token,
            path: PathBuf::from("/tmp/anything.mp3"),
        };
        assert!(process(job).is_none());
    }

    #[test]
    fn request_delivers_result_with_matching_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tune.mp3");
        fs::write(&path, b"not a real mp3").unwrap();

        let (loader, results) = MetadataLoader::new();
        let token = loader.request(path.clone());

        let result = results.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(result.loaded.path, path);
        assert!(!result.token.is_cancelled());

        // Unreadable file: all fields fall back to None.
        assert!(result.loaded.duration.is_none());
        assert!(result.loaded.artwork.is_none());

        // Cancelling the shared token afterwards is visible to the consumer
        // guard as well.
        token.cancel();
        assert!(result.token.is_cancelled());
    }

    #[test]
    fn cancelled_request_is_never_delivered() {
        let dir = tempdir().unwrap();
        let stale = dir.path().join("stale.mp3");
        fs::write(&stale, b"x").unwrap();
        let fresh = dir.path().join("fresh.mp3");
        fs::write(&fresh, b"x").unwrap();

        let (loader, results) = MetadataLoader::new();

        // Cancel the first request before (or while) the worker handles it,
        // then issue a second. Only the second may be applied: either the
        // worker drops the first, or the consumer guard does.
        let stale_token = loader.request(stale.clone());
        stale_token.cancel();
        loader.request(fresh.clone());

        let mut applied = Vec::new();
        while let Ok(result) = results.recv_timeout(Duration::from_secs(2)) {
            if result.token.is_cancelled() {
                continue;
            }
            applied.push(result.loaded.path.clone());
            if result.loaded.path == fresh {
                break;
            }
        }
        assert_eq!(applied, vec![fresh]);
    }
}
