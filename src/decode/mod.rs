//! # Binary payload → displayable `data:` URL.
//!
//! [`Decode`] turns an optional [`Blob`] into an [`AsyncTask`] resolving with a
//! self-contained [`DataUrl`], so decoding composes with the same combinators as
//! network fetches.
//!
//! ## Rules
//! - Absent or empty payload → resolves immediately with [`DataUrl::empty`] (not an error).
//! - MIME type: the declared content type (parameters stripped), otherwise
//!   detected with [`image::guess_format`] (plus SVG markup).
//! - Malformed declared type, or nothing declared and nothing sniffable →
//!   [`TaskError::Decode`].
//! - Base64 encoding runs on the blocking pool.

mod blob;
mod sniff;

pub use blob::{Blob, DataUrl};
pub use sniff::sniff;

use base64::Engine;
use base64::engine::general_purpose;

use crate::error::TaskError;
use crate::tasks::{AsyncTask, TaskContext};

/// Asynchronous payload decoder.
pub trait Decode: Send + Sync + 'static {
    /// Starts decoding `payload`.
    fn decode(&self, payload: Option<Blob>) -> AsyncTask<DataUrl>;
}

/// Stock decoder producing `data:<mime>;base64,<body>` URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataUrlDecoder;

impl DataUrlDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Decode for DataUrlDecoder {
    fn decode(&self, payload: Option<Blob>) -> AsyncTask<DataUrl> {
        match payload.filter(|b| !b.is_empty()) {
            None => AsyncTask::resolved("decode", DataUrl::empty()),
            Some(blob) => AsyncTask::start("decode", move |_ctx: TaskContext| async move {
                tokio::task::spawn_blocking(move || encode(&blob))
                    .await
                    .map_err(|e| TaskError::decode(format!("decoder worker failed: {e}")))?
            }),
        }
    }
}

/// Encodes `blob` synchronously.
pub fn encode(blob: &Blob) -> Result<DataUrl, TaskError> {
    let mime = match blob.content_type() {
        Some(declared) => normalize_mime(declared)?,
        None => sniff(blob.data())?.to_string(),
    };
    let body = general_purpose::STANDARD.encode(blob.data());
    Ok(DataUrl::from_parts(&mime, &body))
}

/// Strips parameters and validates `type/subtype`.
fn normalize_mime(declared: &str) -> Result<String, TaskError> {
    let essence = declared.split(';').next().unwrap_or_default().trim();
    let valid = match essence.split_once('/') {
        Some((ty, sub)) => {
            !ty.is_empty()
                && !sub.is_empty()
                && !sub.contains('/')
                && !essence.chars().any(|c| c.is_whitespace() || c == ',')
        }
        None => false,
    };
    if !valid {
        return Err(TaskError::decode(format!("malformed content type {declared:?}")));
    }
    Ok(essence.to_ascii_lowercase())
}
