//! # Data-source collaborator.
//!
//! [`CatSource`] is the seam between the engine and whatever actually fetches
//! cats (an HTTP client, a cache, a fixture). Every call is a plain async fn;
//! the engine wraps each one in an [`AsyncTask`](crate::AsyncTask), so dropping
//! the call future is how in-flight requests are abandoned on cancellation.
//!
//! Binary endpoints return a [`Blob`]; structured endpoints return
//! [`CatMeta`] documents, which deserialize from the cataas JSON shape.
//! Failures are reported as [`TaskError::Transport`](crate::TaskError::Transport).
//!
//! [`MemorySource`] is an in-memory implementation with call counters,
//! recorded arguments, per-endpoint latency and injected failures.

mod memory;
mod request;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::decode::Blob;
use crate::error::TaskError;

pub use memory::MemorySource;
pub use request::{Endpoint, Page, Request};

/// Metadata document describing one cat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatMeta {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "mimetype", skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Asynchronous cat data source.
#[async_trait]
pub trait CatSource: Send + Sync + 'static {
    /// Random cat image.
    async fn fetch_cat(&self) -> Result<Blob, TaskError>;

    /// Random animated cat.
    async fn fetch_cat_gif(&self) -> Result<Blob, TaskError>;

    /// Random cat carrying `tag`.
    async fn fetch_cat_by_tag(&self, tag: &str) -> Result<Blob, TaskError>;

    /// Random cat with `text` written on it.
    async fn fetch_cat_says(&self, text: &str) -> Result<Blob, TaskError>;

    /// Random cat carrying `tag` with `text` written on it.
    async fn fetch_cat_by_tag_says(&self, tag: &str, text: &str) -> Result<Blob, TaskError>;

    /// Random cat with `text` rendered in the given font `size` and `color`.
    async fn fetch_cat_says_styled(
        &self,
        text: &str,
        size: u32,
        color: &str,
    ) -> Result<Blob, TaskError>;

    /// Metadata of a random cat.
    async fn fetch_cat_meta(&self) -> Result<CatMeta, TaskError>;

    /// Every known tag.
    async fn fetch_tags(&self) -> Result<Vec<String>, TaskError>;

    /// Cats carrying all of `tags`, optionally windowed by `page`.
    async fn fetch_cats_by_tags(
        &self,
        tags: &[String],
        page: Option<Page>,
    ) -> Result<Vec<CatMeta>, TaskError>;
}
