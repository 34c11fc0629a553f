//! numbersapi-style trivia lookup over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use brainplay_core::config::MAX_FACT_TIMEOUT_MS;
use brainplay_core::traits::FactLookup;

use crate::error::LookupError;

const DEFAULT_BASE_URL: &str = "http://numbersapi.com";
const DEFAULT_MAX_LEN: usize = 100;

/// Fetches `GET {base_url}/{n}/trivia` and returns the plain-text body.
pub struct NumbersApiLookup {
    base_url: String,
    timeout: Duration,
    max_len: usize,
    client: reqwest::Client,
}

impl NumbersApiLookup {
    /// Build a lookup. `timeout` is capped at two seconds.
    pub fn new(base_url: &str, timeout: Duration, max_len: usize) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim_end_matches('/')
        };
        let timeout = timeout.min(Duration::from_millis(MAX_FACT_TIMEOUT_MS));

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base.to_string(),
            timeout,
            max_len: if max_len == 0 { DEFAULT_MAX_LEN } else { max_len },
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the fact for `number`, reporting why it failed.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch(&self, number: i64) -> Result<String, LookupError> {
        let response = self
            .client
            .get(format!("{}/{number}/trivia", self.base_url))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout(self.timeout.as_millis() as u64)
                } else if e.is_connect() {
                    LookupError::NetworkError(format!(
                        "fact service not reachable at {}",
                        self.base_url
                    ))
                } else {
                    LookupError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(LookupError::ApiError { status });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout(self.timeout.as_millis() as u64)
            } else {
                LookupError::InvalidBody(e.to_string())
            }
        })?;

        Ok(truncate(body.trim(), self.max_len))
    }
}

/// Cut `text` to `max_len` characters, marking the cut with "...".
fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_len).collect();
    cut.push_str("...");
    cut
}

#[async_trait]
impl FactLookup for NumbersApiLookup {
    fn name(&self) -> &str {
        "numbersapi"
    }

    async fn fact_for(&self, number: i64) -> Option<String> {
        match self.fetch(number).await {
            Ok(fact) if !fact.is_empty() => Some(fact),
            Ok(_) => None,
            Err(e) => {
                debug!("no fact for {number}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup(server: &MockServer, timeout_ms: u64) -> NumbersApiLookup {
        NumbersApiLookup::new(&server.uri(), Duration::from_millis(timeout_ms), 100).unwrap()
    }

    #[tokio::test]
    async fn successful_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/7/trivia"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("7 is the number of days in a week."),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fact = lookup(&server, 2000).fact_for(7).await;
        assert_eq!(fact.as_deref(), Some("7 is the number of days in a week."));
    }

    #[tokio::test]
    async fn non_200_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/13/trivia"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let lookup = lookup(&server, 2000);
        let err = lookup.fetch(13).await.unwrap_err();
        assert!(matches!(err, LookupError::ApiError { status: 404 }));
        assert!(lookup.fact_for(13).await.is_none());
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/4/trivia"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("4 is late.")
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let lookup = lookup(&server, 100);
        let err = lookup.fetch(4).await.unwrap_err();
        assert!(matches!(err, LookupError::Timeout(100)), "got {err:?}");
        assert!(lookup.fact_for(4).await.is_none());
    }

    #[tokio::test]
    async fn long_fact_is_truncated() {
        let server = MockServer::start().await;
        let long = "a".repeat(150);

        Mock::given(method("GET"))
            .and(path("/9/trivia"))
            .respond_with(ResponseTemplate::new(200).set_body_string(long))
            .mount(&server)
            .await;

        let fact = lookup(&server, 2000).fact_for(9).await.unwrap();
        assert_eq!(fact.chars().count(), 103);
        assert!(fact.ends_with("..."));
    }

    #[tokio::test]
    async fn unreachable_service_is_absent() {
        let lookup =
            NumbersApiLookup::new("http://127.0.0.1:1", Duration::from_millis(200), 100).unwrap();
        assert!(lookup.fact_for(3).await.is_none());
    }

    #[test]
    fn timeout_is_capped() {
        let lookup = NumbersApiLookup::new("", Duration::from_secs(30), 0).unwrap();
        assert_eq!(lookup.timeout(), Duration::from_secs(2));
        assert_eq!(lookup.base_url(), "http://numbersapi.com");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("√√√√", 2), "√√...");
    }
}
