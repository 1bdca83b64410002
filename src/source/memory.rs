use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CatMeta, CatSource, Endpoint, Page, Request};
use crate::decode::Blob;
use crate::error::TaskError;

const PNG_PIXEL: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
const GIF_PIXEL: &[u8] = b"GIF89a\x01\x00\x01\x00";

/// In-memory [`CatSource`].
///
/// Every call is recorded before it runs (so counters include calls that are
/// later cancelled), then sleeps for the endpoint's configured latency, then
/// returns either the injected failure or the canned answer.
///
/// ```
/// use chainvisor::source::{CatSource, Endpoint, MemorySource};
///
/// # tokio_test_block_on(async {
/// let source = MemorySource::new(["funny", "cute"]);
/// assert_eq!(source.fetch_tags().await.unwrap(), vec!["funny", "cute"]);
/// assert_eq!(source.calls(Endpoint::Tags), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
/// # }
/// ```
pub struct MemorySource {
    tags: Vec<String>,
    image: Blob,
    gif: Blob,
    tag_images: HashMap<String, Blob>,
    catalog: Vec<CatMeta>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    log: Vec<Request>,
    latency: HashMap<Endpoint, Duration>,
    failures: HashMap<Endpoint, TaskError>,
}

impl MemorySource {
    /// Creates a source knowing `tags`, with one catalog entry per tag.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        let catalog = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| CatMeta {
                id: format!("mem-{i}"),
                tags: vec![tag.clone()],
                mime: Some("image/png".to_string()),
                created_at: None,
            })
            .collect();

        Self {
            tags,
            image: Blob::new(PNG_PIXEL).with_content_type("image/png"),
            gif: Blob::new(GIF_PIXEL).with_content_type("image/gif"),
            tag_images: HashMap::new(),
            catalog,
            state: Mutex::new(State::default()),
        }
    }

    /// Payload returned by every still-image endpoint without a tag-specific image.
    pub fn with_image(mut self, blob: Blob) -> Self {
        self.image = blob;
        self
    }

    /// Payload returned by the gif endpoint.
    pub fn with_gif(mut self, blob: Blob) -> Self {
        self.gif = blob;
        self
    }

    /// Payload returned for cats fetched by `tag`.
    pub fn with_tag_image(mut self, tag: impl Into<String>, blob: Blob) -> Self {
        self.tag_images.insert(tag.into(), blob);
        self
    }

    /// Replaces the metadata catalog.
    pub fn with_catalog(mut self, catalog: Vec<CatMeta>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_latency(self, endpoint: Endpoint, latency: Duration) -> Self {
        self.set_latency(endpoint, latency);
        self
    }

    pub fn with_failure(self, endpoint: Endpoint, error: TaskError) -> Self {
        self.fail(endpoint, error);
        self
    }

    /// Changes the latency of `endpoint` for subsequent calls.
    pub fn set_latency(&self, endpoint: Endpoint, latency: Duration) {
        self.state.lock().latency.insert(endpoint, latency);
    }

    /// Makes subsequent calls to `endpoint` fail with `error`.
    pub fn fail(&self, endpoint: Endpoint, error: TaskError) {
        self.state.lock().failures.insert(endpoint, error);
    }

    /// Clears an injected failure.
    pub fn heal(&self, endpoint: Endpoint) {
        self.state.lock().failures.remove(&endpoint);
    }

    /// Number of calls made to `endpoint` so far.
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.state
            .lock()
            .log
            .iter()
            .filter(|r| r.endpoint() == endpoint)
            .count()
    }

    /// Every call made so far, in call order.
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().log.clone()
    }

    /// Arguments of every `fetch_cat_by_tag_says` call, in call order.
    pub fn tag_says_calls(&self) -> Vec<(String, String)> {
        self.state
            .lock()
            .log
            .iter()
            .filter_map(|r| match r {
                Request::CatByTagSays { tag, text } => Some((tag.clone(), text.clone())),
                _ => None,
            })
            .collect()
    }

    /// Arguments of every `fetch_cat_by_tag` call, in call order.
    pub fn tag_calls(&self) -> Vec<String> {
        self.state
            .lock()
            .log
            .iter()
            .filter_map(|r| match r {
                Request::CatByTag { tag } => Some(tag.clone()),
                _ => None,
            })
            .collect()
    }

    async fn enter(&self, request: Request) -> Result<(), TaskError> {
        let endpoint = request.endpoint();
        let (latency, failure) = {
            let mut st = self.state.lock();
            st.log.push(request);
            (
                st.latency.get(&endpoint).copied(),
                st.failures.get(&endpoint).cloned(),
            )
        };

        if let Some(d) = latency.filter(|d| !d.is_zero()) {
            tokio::time::sleep(d).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn image_for(&self, tag: &str) -> Blob {
        self.tag_images
            .get(tag)
            .cloned()
            .unwrap_or_else(|| self.image.clone())
    }
}

#[async_trait]
impl CatSource for MemorySource {
    async fn fetch_cat(&self) -> Result<Blob, TaskError> {
        self.enter(Request::Cat).await?;
        Ok(self.image.clone())
    }

    async fn fetch_cat_gif(&self) -> Result<Blob, TaskError> {
        self.enter(Request::CatGif).await?;
        Ok(self.gif.clone())
    }

    async fn fetch_cat_by_tag(&self, tag: &str) -> Result<Blob, TaskError> {
        self.enter(Request::CatByTag { tag: tag.into() }).await?;
        Ok(self.image_for(tag))
    }

    async fn fetch_cat_says(&self, text: &str) -> Result<Blob, TaskError> {
        self.enter(Request::CatSays { text: text.into() }).await?;
        Ok(self.image.clone())
    }

    async fn fetch_cat_by_tag_says(&self, tag: &str, text: &str) -> Result<Blob, TaskError> {
        self.enter(Request::CatByTagSays {
            tag: tag.into(),
            text: text.into(),
        })
        .await?;
        Ok(self.image_for(tag))
    }

    async fn fetch_cat_says_styled(
        &self,
        text: &str,
        size: u32,
        color: &str,
    ) -> Result<Blob, TaskError> {
        self.enter(Request::CatSaysStyled {
            text: text.into(),
            size,
            color: color.into(),
        })
        .await?;
        Ok(self.image.clone())
    }

    async fn fetch_cat_meta(&self) -> Result<CatMeta, TaskError> {
        self.enter(Request::CatMeta).await?;
        self.catalog
            .first()
            .cloned()
            .ok_or_else(|| TaskError::transport("404: no cats in catalog"))
    }

    async fn fetch_tags(&self) -> Result<Vec<String>, TaskError> {
        self.enter(Request::Tags).await?;
        Ok(self.tags.clone())
    }

    async fn fetch_cats_by_tags(
        &self,
        tags: &[String],
        page: Option<Page>,
    ) -> Result<Vec<CatMeta>, TaskError> {
        self.enter(Request::CatsByTags {
            tags: tags.to_vec(),
            page,
        })
        .await?;

        let matching = self
            .catalog
            .iter()
            .filter(|meta| tags.iter().all(|t| meta.tags.contains(t)));
        let out = match page {
            Some(p) => matching.skip(p.skip).take(p.limit).cloned().collect(),
            None => matching.cloned().collect(),
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_and_arguments() {
        let src = MemorySource::new(["funny", "cute"]);
        src.fetch_cat_by_tag_says("cute", "Yolo").await.unwrap();
        src.fetch_cat_by_tag("funny").await.unwrap();
        src.fetch_cat_says_styled("OMG", 30, "blue").await.unwrap();

        assert_eq!(src.calls(Endpoint::CatByTagSays), 1);
        assert_eq!(src.calls(Endpoint::Tags), 0);
        assert_eq!(src.tag_says_calls(), vec![("cute".into(), "Yolo".into())]);
        assert_eq!(src.tag_calls(), vec!["funny".to_string()]);
        assert_eq!(src.requests().len(), 3);
    }

    #[tokio::test]
    async fn injected_failure_is_returned_until_healed() {
        let src = MemorySource::new(["a"]).with_failure(Endpoint::Tags, TaskError::transport("503"));
        assert_eq!(src.fetch_tags().await, Err(TaskError::transport("503")));

        src.heal(Endpoint::Tags);
        assert_eq!(src.fetch_tags().await.unwrap(), vec!["a"]);
        assert_eq!(src.calls(Endpoint::Tags), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_the_answer() {
        let src = MemorySource::new(["a"]).with_latency(Endpoint::Cat, Duration::from_millis(200));
        let started = tokio::time::Instant::now();
        src.fetch_cat().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn tag_images_and_defaults() {
        let special = Blob::new(&b"abc"[..]).with_content_type("image/jpeg");
        let src = MemorySource::new(["cute"]).with_tag_image("cute", special.clone());

        assert_eq!(src.fetch_cat_by_tag("cute").await.unwrap(), special);
        assert_eq!(
            src.fetch_cat_by_tag("other").await.unwrap().content_type(),
            Some("image/png")
        );
        assert_eq!(
            src.fetch_cat_gif().await.unwrap().content_type(),
            Some("image/gif")
        );
    }

    #[tokio::test]
    async fn cats_by_tags_filters_and_pages() {
        let meta = |id: &str, tags: &[&str]| CatMeta {
            id: id.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            mime: None,
            created_at: None,
        };
        let src = MemorySource::new(["cute"]).with_catalog(vec![
            meta("1", &["cute", "orange"]),
            meta("2", &["cute"]),
            meta("3", &["cute", "orange", "fat"]),
            meta("4", &["grumpy"]),
        ]);

        let tags = vec!["cute".to_string(), "orange".to_string()];
        let all = src.fetch_cats_by_tags(&tags, None).await.unwrap();
        assert_eq!(all.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), ["1", "3"]);

        let page = src
            .fetch_cats_by_tags(&tags, Some(Page::new(1, 5)))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "3");

        assert_eq!(src.fetch_cat_meta().await.unwrap().id, "1");
    }
}
