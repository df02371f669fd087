//! Image source resolution and background decoding.
//!
//! Decoding runs on a worker thread. Results come back through a channel and
//! are applied to the scene only when the owner polls, so the scene is never
//! touched off the control thread.

use crate::shapes::{DecodedImage, ObjectId};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

/// Image loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Image decode failed: {0}")]
    Image(String),
    #[error("Decoder is not running")]
    Disconnected,
}

/// Read the raw bytes behind an image source.
///
/// Accepts `data:` URIs, `file://` URLs and plain paths. Relative paths are
/// resolved against `base_dir` when one is given.
pub fn resolve_source(source: &str, base_dir: Option<&Path>) -> Result<Vec<u8>, DecodeError> {
    let source = source.trim();

    if let Some(rest) = source.strip_prefix("data:") {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| DecodeError::InvalidDataUri("missing ','".to_string()))?;
        return if meta.ends_with(";base64") {
            STANDARD
                .decode(payload.trim())
                .map_err(|e| DecodeError::InvalidDataUri(e.to_string()))
        } else {
            Ok(payload.as_bytes().to_vec())
        };
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        return Err(DecodeError::UnsupportedSource(source.to_string()));
    }

    let path = Path::new(source.strip_prefix("file://").unwrap_or(source));
    let path = match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    };
    std::fs::read(&path).map_err(|e| DecodeError::Io(format!("{}: {}", path.display(), e)))
}

/// Decode PNG, JPEG or WebP bytes to straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| DecodeError::Image(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage::new(width, height, rgba.into_raw()))
}

/// Resolve and decode in one step.
pub fn load_image(source: &str, base_dir: Option<&Path>) -> Result<DecodedImage, DecodeError> {
    let bytes = resolve_source(source, base_dir)?;
    decode_image(&bytes)
}

/// Identifier of an add-image request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// What a finished decode should be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeTarget {
    /// A new image object, inserted once decoding succeeds.
    NewImage(RequestId),
    /// An image object already in the scene (loaded from a document or snapshot).
    Object(ObjectId),
}

struct DecodeJob {
    target: DecodeTarget,
    generation: u64,
    source: String,
}

/// A finished decode, tagged with the generation it was requested in.
#[derive(Debug, Clone)]
pub struct DecodeResult {
    pub target: DecodeTarget,
    pub generation: u64,
    pub source: String,
    pub outcome: Result<Arc<DecodedImage>, DecodeError>,
}

/// Background image decoder with a single worker thread.
pub struct DecodeQueue {
    jobs: Option<Sender<DecodeJob>>,
    results: Receiver<DecodeResult>,
    worker: Option<JoinHandle<()>>,
    /// Results produced without the worker (submit after disconnect).
    local: VecDeque<DecodeResult>,
    in_flight: usize,
}

impl DecodeQueue {
    /// Start the worker. Relative paths resolve against `base_dir`.
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<DecodeJob>();
        let (result_tx, result_rx) = mpsc::channel::<DecodeResult>();

        let worker = std::thread::spawn(move || {
            for job in job_rx {
                let outcome = load_image(&job.source, base_dir.as_deref()).map(Arc::new);
                if let Err(e) = &outcome {
                    log::warn!("Failed to decode image {}: {}", abbreviate(&job.source), e);
                }
                let result = DecodeResult {
                    target: job.target,
                    generation: job.generation,
                    source: job.source,
                    outcome,
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
            log::debug!("Image decode worker stopped");
        });

        Self {
            jobs: Some(job_tx),
            results: result_rx,
            worker: Some(worker),
            local: VecDeque::new(),
            in_flight: 0,
        }
    }

    /// Queue a decode. Never blocks.
    pub fn submit(&mut self, target: DecodeTarget, generation: u64, source: impl Into<String>) {
        let source = source.into();
        log::debug!("Queueing image decode {:?} ({})", target, abbreviate(&source));
        let job = DecodeJob {
            target,
            generation,
            source,
        };
        match self.jobs.as_ref().map(|tx| tx.send(job)) {
            Some(Ok(())) => self.in_flight += 1,
            Some(Err(mpsc::SendError(job))) => self.local.push_back(Self::disconnected(job)),
            None => {}
        }
    }

    fn disconnected(job: DecodeJob) -> DecodeResult {
        DecodeResult {
            target: job.target,
            generation: job.generation,
            source: job.source,
            outcome: Err(DecodeError::Disconnected),
        }
    }

    /// Collect all results that are ready, without blocking.
    pub fn try_recv_all(&mut self) -> Vec<DecodeResult> {
        let mut ready: Vec<DecodeResult> = self.local.drain(..).collect();
        while let Ok(result) = self.results.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            ready.push(result);
        }
        ready
    }

    /// Wait up to `timeout` for the next result.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<DecodeResult> {
        if let Some(result) = self.local.pop_front() {
            return Some(result);
        }
        if self.in_flight == 0 {
            return None;
        }
        match self.results.recv_timeout(timeout) {
            Ok(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::error!("Image decode worker exited with {} jobs pending", self.in_flight);
                self.in_flight = 0;
                None
            }
        }
    }

    /// Number of decodes submitted but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight + self.local.len()
    }
}

impl Default for DecodeQueue {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Drop for DecodeQueue {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Image decode worker panicked");
            }
        }
    }
}

/// Shorten data URIs for log output.
fn abbreviate(source: &str) -> &str {
    if source.starts_with("data:") {
        source.split(',').next().unwrap_or(source)
    } else {
        source
    }
}
