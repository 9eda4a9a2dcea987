//! Core library for the `lamp` CLI.
//!
//! This crate defines:
//! - The request/reply models of the street lamp control service
//! - An async controller that asks the service for a lamp decision
//! - Configuration of the service endpoint
//!
//! It is used by `lamp-cli`, but can also be embedded in sensor gateways or other services.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;

pub use config::{CONTROL_LAMP_PATH, Config, DEFAULT_BASE_URL};
pub use controller::{ControlOutcome, HttpLampController, LampController, controller_from_config};
pub use error::{LampError, Result};
pub use model::{
    ERROR_SENTINEL, LampControlReply, LampDecision, LampDecisionRequest, LampLevel, SystemHealth,
    WeatherObservation, day_of_year,
};
