/// HTTP client for reading from the backend API.
/// One instance is shared by all requests so connections are pooled.
use std::time::Duration;

use reqwest::header::{HeaderValue, CACHE_CONTROL};

use crate::errors::AppError;
use crate::models::rate::UpstreamReply;

pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(connect_timeout: Duration, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(8)
            .connect_timeout(connect_timeout);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client })
    }

    /// GET `url` past any intermediary cache and read the body as JSON.
    ///
    /// A `t=<unix millis>` query parameter plus `Cache-Control: no-cache`
    /// keep proxies from serving a stale copy. Transport failures are errors;
    /// an unreadable or non-JSON body is not, it comes back as `{}`.
    pub async fn fetch_fresh(&self, url: &str) -> Result<UpstreamReply, AppError> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let resp = self
            .client
            .get(url)
            .query(&[("t", stamp)])
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("upstream request to {} failed: {}", url, e);
                AppError::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!("upstream {} answered {}", url, status);
        }

        let reply = match resp.text().await {
            Ok(raw) => UpstreamReply::parse(status.is_success(), &raw),
            Err(e) => {
                tracing::debug!("could not read upstream body from {}: {}", url, e);
                UpstreamReply::empty(status.is_success())
            }
        };

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> UpstreamClient {
        UpstreamClient::new(Duration::from_secs(2), Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_cache_busting_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/rate"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":true}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reply = client()
            .fetch_fresh(&format!("{}/api/rate", mock_server.uri()))
            .await
            .unwrap();

        assert!(reply.ok);
        assert!(reply.succeeded());

        let requests = mock_server.received_requests().await.unwrap();
        let stamp = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "t")
            .map(|(_, v)| v.into_owned())
            .expect("t query parameter");
        assert!(stamp.parse::<i64>().is_ok(), "t should be a timestamp: {}", stamp);
    }

    #[tokio::test]
    async fn test_fetch_tolerates_error_status_and_html_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/token-prices"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>502</html>"))
            .mount(&mock_server)
            .await;

        let reply = client()
            .fetch_fresh(&format!("{}/api/token-prices", mock_server.uri()))
            .await
            .expect("an error status is not a transport failure");

        assert!(!reply.ok);
        assert_eq!(reply.body, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_fetch_reports_connection_failure() {
        // Nothing listens on port 1.
        let err = client()
            .fetch_fresh("http://127.0.0.1:1/api/rate")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_total_timeout_is_a_transport_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/rate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"success":true}"#)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let client =
            UpstreamClient::new(Duration::from_secs(1), Some(Duration::from_secs(1))).unwrap();
        let err = client
            .fetch_fresh(&format!("{}/api/rate", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_fetch_treats_plain_text_as_empty_object() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/rate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let reply = client()
            .fetch_fresh(&format!("{}/api/rate", mock_server.uri()))
            .await
            .unwrap();
        assert!(reply.ok);
        assert!(!reply.succeeded());
    }
}
