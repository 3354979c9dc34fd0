use crate::domain::model::Record;
use crate::utils::error::{PipelineError, Result};
use reqwest::Client;

/// 第一階段：從 API 抓取一批 JSON 記錄
pub struct ApiFetcher {
    client: Client,
}

impl ApiFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Issues one GET against the endpoint and decodes the body as a JSON
    /// array of records. A fetch failure is terminal for the run; there is
    /// no retry at this stage.
    pub async fn fetch(&self, api_url: &str) -> Result<Vec<Record>> {
        tracing::debug!("Making API request to: {}", api_url);

        let response = match self.client.get(api_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    "❌ Failed to connect to the API. Check your network connection or API URL/Endpoint."
                );
                return Err(PipelineError::ConnectionError(e));
            }
        };

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            tracing::error!("❌ HTTP error occurred: {}", status);
            return Err(PipelineError::HttpError { status });
        }

        let records: Vec<Record> = match response.json().await {
            Ok(records) => records,
            Err(e) if e.is_decode() => {
                tracing::error!("❌ Failed to parse API response as a JSON array: {}", e);
                return Err(PipelineError::ParseError {
                    message: e.to_string(),
                });
            }
            Err(e) => {
                tracing::error!("❌ Failed to read the API response body: {}", e);
                return Err(PipelineError::ConnectionError(e));
            }
        };

        tracing::info!(
            "✅ Data fetched successfully from API! ({} records)",
            records.len()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_successful_api_response() {
        let server = MockServer::start();
        let mock_data = serde_json::json!([
            {"id": 1, "price": 30},
            {"id": 2, "price": 75}
        ]);

        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/products");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_data);
        });

        let fetcher = ApiFetcher::new();
        let records = fetcher.fetch(&server.url("/products")).await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].numeric_field("id"), Some(1.0));
        assert_eq!(records[1].numeric_field("price"), Some(75.0));
    }

    #[tokio::test]
    async fn test_fetch_http_error_carries_status() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500);
        });

        let fetcher = ApiFetcher::new();
        let err = fetcher.fetch(&server.url("/broken")).await.unwrap_err();

        api_mock.assert();
        match err {
            PipelineError::HttpError { status } => assert_eq!(status.as_u16(), 500),
            other => panic!("expected HttpError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_parse_error() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/garbage");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("this is not json");
        });

        let fetcher = ApiFetcher::new();
        let err = fetcher.fetch(&server.url("/garbage")).await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, PipelineError::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_fetch_non_array_body_is_parse_error() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/object");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": 1, "price": 75}));
        });

        let fetcher = ApiFetcher::new();
        let err = fetcher.fetch(&server.url("/object")).await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, PipelineError::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_endpoint_is_connection_error() {
        // Grab a local port that is guaranteed to refuse connections.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = ApiFetcher::new();
        let err = fetcher
            .fetch(&format!("http://{}/products", addr))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ConnectionError(_)));
    }
}
