use super::*;
use catalog_watcher::plugins::reporters::HomeAssistantReporter;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_cycle_posts_checking_then_idle() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/states/sensor.hofweb_checker"))
        .and(header("Authorization", "Bearer long-lived-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let reporter = HomeAssistantReporter::new(
        &server.uri(),
        "long-lived-token",
        "sensor.hofweb_checker",
        Duration::from_secs(5),
    )?;
    let done = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![Ok(listing(&[("Bloemkool", "/p/bloemkool"), ("Prei", "/p/prei")]))],
        done.clone(),
    );

    poll_loop(fetcher, RecordingNotifier::default(), reporter).run(done).await;

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);

    let checking: serde_json::Value = requests[0].body_json()?;
    assert_eq!(checking["state"], "checking");
    assert_eq!(checking["attributes"]["friendly_name"], "Test checker");
    assert_eq!(checking["attributes"]["icon"], "mdi:web");
    assert!(checking["attributes"]["last_check_start"].is_string());

    let idle: serde_json::Value = requests[1].body_json()?;
    assert_eq!(idle["state"], "idle");
    assert_eq!(idle["attributes"]["count"], 2);
    assert_eq!(idle["attributes"]["icon"], "mdi:power");

    Ok(())
}

#[tokio::test]
async fn test_unreachable_status_sink_does_not_stop_polling() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let reporter = HomeAssistantReporter::new(&server.uri(), "t", "sensor.x", Duration::from_secs(5))?;
    let done = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![
            Ok(listing(&[("Bloemkool", "/p/bloemkool")])),
            Ok(listing(&[("Bloemkool", "/p/bloemkool"), ("Ui", "/p/ui")])),
        ],
        done.clone(),
    );
    let notifier = RecordingNotifier::default();

    let stats = poll_loop(fetcher, notifier.clone(), reporter).run(done).await;

    assert_eq!(stats.succeeded, 2);
    assert_eq!(notifier.batches().len(), 1);

    Ok(())
}
