//! Layer 1: direct fetch plus largest-text-block extraction.

use super::Strategy;
use crate::content::{ExtractedArticle, main_block};
use crate::error::StrategyError;
use crate::fetch::HttpFetcher;
use crate::models::StrategyKind;
use async_trait::async_trait;
use tracing::debug;

pub struct StaticFast {
    fetcher: HttpFetcher,
}

impl StaticFast {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Strategy for StaticFast {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StaticFast
    }

    async fn attempt(&self, url: &str) -> Result<ExtractedArticle, StrategyError> {
        let html = self.fetcher.fetch_html(url).await?;
        let article = main_block::extract(&html).ok_or(StrategyError::NoContent)?;
        debug!(layer = "static_fast", %url, chars = article.chars(), "main block extracted");
        Ok(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::ContentExtractor;
    use crate::strategies::fixtures::{app_shell, article_page};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy() -> StaticFast {
        StaticFast::new(HttpFetcher::new(Duration::from_secs(5), 1 << 20).unwrap())
    }

    async fn serve(server: &MockServer, route: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_raw(body, "text/html"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_extracts_plain_article() {
        let server = MockServer::start().await;
        serve(&server, "/story", 200, article_page(6)).await;

        let article = strategy()
            .attempt(&format!("{}/story", server.uri()))
            .await
            .unwrap();

        assert_eq!(article.extractor, ContentExtractor::MainBlock);
        assert!(article.chars() >= 1000, "got {} chars", article.chars());
        assert!(article.text.starts_with("1. Regulators"));
        assert!(!article.text.contains("Copyright"));
        assert_eq!(article.title.as_deref(), Some("Green funds face tougher rules"));
    }

    #[tokio::test]
    async fn test_not_found_is_fetch_error() {
        let server = MockServer::start().await;
        serve(&server, "/gone", 404, "<html>missing</html>".into()).await;

        let err = strategy()
            .attempt(&format!("{}/gone", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyError::Fetch(FetchError::Status(404))));
    }

    #[tokio::test]
    async fn test_script_shell_has_no_content() {
        let server = MockServer::start().await;
        serve(&server, "/app", 200, app_shell()).await;

        let err = strategy()
            .attempt(&format!("{}/app", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyError::NoContent));
    }
}
