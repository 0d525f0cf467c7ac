//! 429 限流重试测试（注入假时钟，不真实等待）

use async_trait::async_trait;
use selection_translate::domain::traits::Sleeper;
use selection_translate::infrastructure::network::http::ReqwestTransport;
use selection_translate::{
    ProviderCredentials, RetryPolicy, TranslateError, TranslationAdapter, TranslationRequest,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

impl RecordingSleeper {
    fn delays_ms(&self) -> Vec<u128> {
        self.slept.lock().unwrap().iter().map(|d| d.as_millis()).collect()
    }
}

fn adapter() -> TranslationAdapter {
    TranslationAdapter::new(Arc::new(ReqwestTransport::new(reqwest::Client::new())))
}

fn request(server: &MockServer, provider: &str) -> TranslationRequest {
    let creds = ProviderCredentials::new("sk-test", server.uri(), "ep-model");
    TranslationRequest::translate("rate me", "en", "zh", provider, creds)
}

#[tokio::test]
async fn persistent_429_retries_three_times_then_propagates() {
    for provider in ["kimi", "deepseek", "qwen", "doubao"] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
            .expect(4)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let err = adapter()
            .translate_with_retry(&request(&server, provider), &RetryPolicy::default(), &sleeper)
            .await
            .unwrap_err();

        assert!(err.is_rate_limited(), "{provider}: {err}");
        assert!(err.to_string().contains("429"));
        assert_eq!(sleeper.delays_ms(), vec![1000, 2000, 4000], "{provider}");
    }
}

#[tokio::test]
async fn succeeds_once_rate_limit_clears() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "done"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = RecordingSleeper::default();
    let result = adapter()
        .translate_with_retry(&request(&server, "deepseek"), &RetryPolicy::default(), &sleeper)
        .await
        .unwrap();

    assert_eq!(result.translated_text, "done");
    assert_eq!(sleeper.delays_ms(), vec![1000, 2000]);
}

#[tokio::test]
async fn server_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom 429"))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = RecordingSleeper::default();
    let err = adapter()
        .translate_with_retry(&request(&server, "kimi"), &RetryPolicy::default(), &sleeper)
        .await
        .unwrap_err();

    assert!(matches!(err, TranslateError::Api { status: 500, .. }));
    assert!(sleeper.delays_ms().is_empty());
}

#[tokio::test]
async fn config_errors_are_not_retried() {
    let sleeper = RecordingSleeper::default();
    let creds = ProviderCredentials::new("sk-test", "", "");
    let req = TranslationRequest::translate("text", "en", "zh", "kimi", creds);
    let err = adapter()
        .translate_with_retry(&req, &RetryPolicy::default(), &sleeper)
        .await
        .unwrap_err();

    assert!(matches!(err, TranslateError::Config(_)));
    assert!(sleeper.delays_ms().is_empty());
}

#[tokio::test]
async fn custom_policy_controls_attempts_and_delays() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let sleeper = RecordingSleeper::default();
    let policy = RetryPolicy::new(1, Duration::from_millis(250));
    let err = adapter()
        .translate_with_retry(&request(&server, "qwen"), &policy, &sleeper)
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(sleeper.delays_ms(), vec![250]);
}

#[tokio::test(start_paused = true)]
async fn tokio_sleeper_waits_on_the_timer() {
    use selection_translate::infrastructure::network::retry::TokioSleeper;

    let start = tokio::time::Instant::now();
    TokioSleeper.sleep(Duration::from_millis(4000)).await;
    assert!(start.elapsed() >= Duration::from_millis(4000));
}
