use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::decode::Blob;
use crate::error::TaskError;
use crate::source::{CatMeta, CatSource, Page};
use crate::tasks::AsyncTask;

/// Starts data-source calls as [`AsyncTask`]s.
///
/// Each call runs under the configured timeout; cancelling the task drops the
/// call future, abandoning the request.
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn CatSource>,
    timeout: Option<Duration>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn CatSource>, timeout: Option<Duration>) -> Self {
        Self { source, timeout }
    }

    fn call<T, F, Fut>(&self, name: &'static str, f: F) -> AsyncTask<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(Arc<dyn CatSource>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        AsyncTask::start_with_timeout(name, self.timeout, move |_ctx| f(source))
    }

    pub fn cat(&self) -> AsyncTask<Blob> {
        self.call("fetch_cat", |src| async move { src.fetch_cat().await })
    }

    pub fn cat_gif(&self) -> AsyncTask<Blob> {
        self.call("fetch_cat_gif", |src| async move { src.fetch_cat_gif().await })
    }

    pub fn cat_by_tag(&self, tag: String) -> AsyncTask<Blob> {
        self.call("fetch_cat_by_tag", move |src| async move {
            src.fetch_cat_by_tag(&tag).await
        })
    }

    pub fn cat_says(&self, text: String) -> AsyncTask<Blob> {
        self.call("fetch_cat_says", move |src| async move {
            src.fetch_cat_says(&text).await
        })
    }

    pub fn cat_by_tag_says(&self, tag: String, text: String) -> AsyncTask<Blob> {
        self.call("fetch_cat_by_tag_says", move |src| async move {
            src.fetch_cat_by_tag_says(&tag, &text).await
        })
    }

    pub fn cat_says_styled(&self, text: String, size: u32, color: String) -> AsyncTask<Blob> {
        self.call("fetch_cat_says_styled", move |src| async move {
            src.fetch_cat_says_styled(&text, size, &color).await
        })
    }

    pub fn cat_meta(&self) -> AsyncTask<CatMeta> {
        self.call("fetch_cat_meta", |src| async move { src.fetch_cat_meta().await })
    }

    pub fn tags(&self) -> AsyncTask<Vec<String>> {
        self.call("fetch_tags", |src| async move { src.fetch_tags().await })
    }

    pub fn cats_by_tags(&self, tags: Vec<String>, page: Option<Page>) -> AsyncTask<Vec<CatMeta>> {
        self.call("fetch_cats_by_tags", move |src| async move {
            src.fetch_cats_by_tags(&tags, page).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Endpoint, MemorySource};

    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out() {
        let src = Arc::new(
            MemorySource::new(["a"]).with_latency(Endpoint::Tags, Duration::from_secs(10)),
        );
        let fetch = Fetcher::new(src, Some(Duration::from_secs(1)));

        let err = fetch.tags().outcome().await.into_result().unwrap_err();
        assert_eq!(err.as_label(), "task_timeout");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_abandons_the_call() {
        let src = Arc::new(
            MemorySource::new(["a"]).with_latency(Endpoint::CatByTag, Duration::from_secs(10)),
        );
        let fetch = Fetcher::new(src.clone(), None);

        let task = fetch.cat_by_tag("a".into());
        tokio::time::sleep(Duration::from_millis(5)).await;
        task.cancel();

        assert!(task.outcome().await.is_cancelled());
        assert_eq!(src.tag_calls(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn structured_calls_pass_arguments_through() {
        let src = Arc::new(MemorySource::new(["cute", "funny"]));
        let fetch = Fetcher::new(src.clone(), None);

        let cats = fetch
            .cats_by_tags(vec!["cute".into()], Some(Page::new(0, 10)))
            .outcome()
            .await
            .into_result()
            .unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].tags, vec!["cute"]);

        fetch
            .cat_says_styled("OMG".into(), 20, "red".into())
            .outcome()
            .await
            .into_result()
            .unwrap();
        assert_eq!(src.calls(Endpoint::CatSaysStyled), 1);
    }
}
