use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt::Debug;
use tracing::{debug, error, info};

use crate::{
    Config,
    error::{LampError, Result},
    model::{LampControlReply, LampDecision, LampDecisionRequest, WeatherObservation},
};

/// Result of a completed HTTP exchange with the lamp service.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlOutcome {
    /// 2xx with a readable reply.
    Decided(LampControlReply),
    /// Any other status. The body is not inspected.
    Rejected { status: u16, reason: String },
}

impl ControlOutcome {
    pub fn into_decision(self) -> LampDecision {
        match self {
            ControlOutcome::Decided(reply) => LampDecision::Action(reply.lamp_action),
            ControlOutcome::Rejected { .. } => LampDecision::Error,
        }
    }
}

#[async_trait]
pub trait LampController: Send + Sync + Debug {
    /// Send one decision request and report how the service answered.
    async fn control_lamp(&self, request: &LampDecisionRequest) -> Result<ControlOutcome>;

    /// Ask the service what the lamp should do.
    ///
    /// Returns the service's `lamp_action` label, or [`LampDecision::Error`]
    /// (`"ERROR"`) if it answered with a non-success status. Transport
    /// failures and unreadable success bodies are returned as `Err`.
    async fn get_lamp_action(
        &self,
        is_night: bool,
        is_motion: bool,
        weather: &WeatherObservation,
    ) -> Result<LampDecision> {
        let request = LampDecisionRequest::new(is_night, is_motion, *weather);
        let outcome = self.control_lamp(&request).await?;
        Ok(outcome.into_decision())
    }
}

/// [`LampController`] backed by a plain `reqwest` client: no retries, no timeout.
#[derive(Debug, Clone)]
pub struct HttpLampController {
    endpoint: Url,
    http: Client,
}

impl HttpLampController {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint, http: Client::new() }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.endpoint()?))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn transport_error(&self, source: reqwest::Error) -> LampError {
        LampError::Transport { endpoint: self.endpoint.to_string(), source }
    }
}

#[async_trait]
impl LampController for HttpLampController {
    async fn control_lamp(&self, request: &LampDecisionRequest) -> Result<ControlOutcome> {
        debug!(endpoint = %self.endpoint, ?request, "Sending lamp decision request");

        let res = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = res.status();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status").to_string();
            error!(status = status.as_u16(), "Lamp service request failed: {reason}");
            return Ok(ControlOutcome::Rejected { status: status.as_u16(), reason });
        }

        let body = res.text().await.map_err(|e| self.transport_error(e))?;

        let reply: LampControlReply = serde_json::from_str(&body).map_err(|source| {
            LampError::MalformedResponse { body: truncate_body(&body), source }
        })?;

        info!("Lamp action: {}", reply.lamp_action);

        Ok(ControlOutcome::Decided(reply))
    }
}

/// Construct the HTTP controller for the endpoint in `config`.
pub fn controller_from_config(config: &Config) -> Result<Box<dyn LampController>> {
    Ok(Box::new(HttpLampController::from_config(config)?))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
