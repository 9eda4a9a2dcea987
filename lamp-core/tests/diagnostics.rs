//! Diagnostic output of `HttpLampController`, captured from a `tracing` subscriber.

use lamp_core::{Config, HttpLampController, LampController, WeatherObservation};
use serde_json::json;
use std::{
    io,
    sync::{Arc, Mutex},
};
use tracing_subscriber::fmt::MakeWriter;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

/// In-memory sink for the fmt subscriber, so tests can read what was logged.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Install a subscriber writing into this buffer for the current thread.
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn controller_for(server: &MockServer) -> HttpLampController {
    HttpLampController::from_config(&Config::with_base_url(server.uri()))
        .expect("mock server uri is a valid base url")
}

fn clear_night() -> WeatherObservation {
    WeatherObservation {
        humidity: 60.0,
        cloudcover: 10.0,
        visibility: 10.0,
        uvindex: 0.0,
        day_of_year: 45,
        temp: 24.0,
        precip: 0.0,
    }
}

#[tokio::test]
async fn failure_status_text_is_logged_as_error() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let decision = controller_for(&server)
        .get_lamp_action(true, false, &clear_night())
        .await
        .unwrap();
    assert!(decision.is_error());

    let out = logs.contents();
    let line = out
        .lines()
        .find(|l| l.contains("Lamp service request failed"))
        .unwrap_or_else(|| panic!("no failure line in logs:\n{out}"));
    assert!(line.contains("ERROR"), "not logged at error level: {line}");
    assert!(line.contains("Service Unavailable"), "status text missing: {line}");
    assert!(line.contains("status=503"), "status code missing: {line}");
}

#[tokio::test]
async fn decision_is_logged_on_success() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"lamp_action": "DIMMER OUTPUT (Motion Detected)"})),
        )
        .mount(&server)
        .await;

    controller_for(&server).get_lamp_action(true, true, &clear_night()).await.unwrap();

    let out = logs.contents();
    let line = out
        .lines()
        .find(|l| l.contains("Lamp action: DIMMER OUTPUT (Motion Detected)"))
        .unwrap_or_else(|| panic!("decision not logged:\n{out}"));
    assert!(line.contains("INFO"), "not logged at info level: {line}");
    assert!(!out.contains("Lamp service request failed"));
}
