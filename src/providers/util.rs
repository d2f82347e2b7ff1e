use crate::core::config::HttpConfig;
use anyhow::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Builds the HTTP client shared by a provider's requests.
///
/// Every request carries the configured timeout so a stalled upstream fails
/// the fetch instead of hanging the run.
pub fn build_client(http: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("premtrack/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(http.timeout_secs))
        .build()?;
    Ok(client)
}

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_with_retry_recovers_after_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .with_priority(2)
            .mount(&mock_server)
            .await;

        let client = build_client(&HttpConfig::default()).unwrap();
        let url = format!("{}/flaky", mock_server.uri());
        let response = with_retry(
            || async { client.get(&url).send().await?.error_for_status() },
            2,
            1,
        )
        .await
        .unwrap();

        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_after_retries() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = build_client(&HttpConfig::default()).unwrap();
        let url = format!("{}/down", mock_server.uri());
        let result = with_retry(
            || async { client.get(&url).send().await?.error_for_status() },
            2,
            1,
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_client_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let http = HttpConfig {
            timeout_secs: 1,
            ..HttpConfig::default()
        };
        let client = build_client(&http).unwrap();
        let result = client
            .get(format!("{}/slow", mock_server.uri()))
            .send()
            .await;

        assert!(result.unwrap_err().is_timeout());
    }
}
