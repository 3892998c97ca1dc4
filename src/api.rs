use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue};
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;
use crate::models::{Category, SearchResult};
use crate::request::SearchRequest;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("job service returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode job service response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("job service rejected the request: {0}")]
    Rejected(String),
}

// --- Job service trait ---

/// The remote service that classifies postings. This client only reads it.
#[async_trait::async_trait]
pub trait JobBoard: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>, ApiError>;
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, ApiError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JobsResponse {
    Found(SearchResult),
    Failed { error: String },
}

// --- HTTP implementation ---

#[derive(Debug, Clone)]
pub struct HttpJobBoard {
    base: String,
    client: reqwest::Client,
}

impl HttpJobBoard {
    pub fn new(config: &Config) -> Result<Self> {
        // Search traffic must always be network-fresh.
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base, path);
        tracing::debug!(%url, params = query.len(), "GET");

        let transport = |source: reqwest::Error| ApiError::Transport {
            url: url.clone(),
            source,
        };
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl JobBoard for HttpJobBoard {
    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let body = self.get_text("/api/categories", &[]).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, ApiError> {
        let body = self.get_text("/api/jobs", &request.query_pairs()).await?;
        match serde_json::from_str(&body)? {
            JobsResponse::Found(result) => Ok(result),
            JobsResponse::Failed { error } => Err(ApiError::Rejected(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn board(server: &MockServer) -> HttpJobBoard {
        let config = Config {
            api_base: format!("{}/", server.uri()),
            ..Config::default()
        };
        HttpJobBoard::new(&config).unwrap()
    }

    fn job_json(title: &str) -> serde_json::Value {
        json!({
            "source": "saramin",
            "company": "Acme",
            "title": title,
            "link": "https://example.com/job",
            "conditions": ["정규직"],
            "keywords": ["java", "spring"],
            "matched_keywords": ["java"],
            "excluded_keywords": []
        })
    }

    fn request(location: Option<&str>, keywords: Option<&[&str]>) -> SearchRequest {
        SearchRequest {
            category: "backend".to_string(),
            page_size: 200,
            crawl_pages: 2,
            location: location.map(str::to_string),
            allowed_keywords: keywords.map(|k| k.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[tokio::test]
    async fn test_categories_decoded_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "backend", "name": "Backend", "core_keywords": ["java"], "auxiliary_keywords": ["aws"]},
                {"id": "publisher", "name": "Publisher", "core_keywords": ["html"], "auxiliary_keywords": []}
            ])))
            .mount(&server)
            .await;

        let categories = board(&server).categories().await.unwrap();
        let ids: Vec<_> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["backend", "publisher"]);
        assert_eq!(categories[0].auxiliary_keywords, vec!["aws".to_string()]);
    }

    #[tokio::test]
    async fn test_search_without_filters_omits_optional_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .and(query_param("category", "backend"))
            .and(query_param("page_size", "200"))
            .and(query_param("crawl_pages", "2"))
            .and(query_param_is_missing("location"))
            .and(query_param_is_missing("allowed_keywords"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matched": [job_json("Backend Engineer")],
                "excluded": [],
                "matched_count": 1,
                "excluded_count": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = board(&server).search(&request(None, None)).await.unwrap();
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].title, "Backend Engineer");
        assert_eq!(result.matched_count, Some(1));
    }

    #[tokio::test]
    async fn test_search_repeats_allowed_keywords_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .and(query_param("location", "서울"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matched": [],
                "excluded": [job_json("PHP Developer")]
            })))
            .mount(&server)
            .await;

        let result = board(&server)
            .search(&request(Some("서울"), Some(&["kotlin", "java", "aws"])))
            .await
            .unwrap();
        assert_eq!(result.excluded.len(), 1);

        let received = server.received_requests().await.unwrap();
        let keywords: Vec<String> = received[0]
            .url
            .query_pairs()
            .filter(|(k, _)| k == "allowed_keywords")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(keywords, vec!["kotlin", "java", "aws"]);
    }

    #[tokio::test]
    async fn test_error_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "존재하지 않는 직군: nope"})),
            )
            .mount(&server)
            .await;

        let err = board(&server).search(&request(None, None)).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref msg) if msg.contains("nope")));
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = board(&server).search(&request(None, None)).await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = board(&server).categories().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Bind then release a port so nothing is listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = Config {
            api_base: format!("http://{addr}"),
            ..Config::default()
        };
        let err = HttpJobBoard::new(&config).unwrap().categories().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
