//! # Farm Bus Simulator
//!
//! A deterministic farm-monitoring simulation core: ambient sensor
//! telemetry, per-field soil moisture, a hysteresis irrigation
//! controller, forecast generation, and an alert engine, all driven by
//! one virtual-time scheduler.
//!
//! ## Features
//!
//! - **Sensor simulation**: bounded random walks for temperature,
//!   humidity, soil moisture, and wind
//! - **Irrigation control**: per-field two-state controller with
//!   low/high moisture thresholds and manual override
//! - **Alert engine**: bounded newest-first log with resolve/delete
//!   transitions and critical fan-out through a notification seam
//! - **Weather**: hourly/daily forecast series with derived concerns
//! - **Determinism**: every random delta flows through an injectable
//!   source, so a seeded run replays exactly
//!
//! ## Quick Start
//!
//! ```rust
//! use farmbus::agent::{FarmAgent, FarmConfig};
//! use farmbus::notify::NullSink;
//! use farmbus::rng::FastrandSource;
//!
//! let mut agent = FarmAgent::new(
//!     FarmConfig::default(),
//!     Box::new(FastrandSource::seeded(7)),
//!     Box::new(NullSink),
//! )
//! .unwrap();
//!
//! agent.start().unwrap();
//! agent.advance(3_000);
//!
//! for event in agent.drain_events() {
//!     println!("{event:?}");
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`agent`] - Main orchestrator and public API
//! - [`sim`] - Environment, field, and weather simulators
//! - [`irrigation`] - Threshold controller and manual override
//! - [`alerts`] - Alert log and its transitions
//! - [`notify`] - Notification settings and the sink seam
//! - [`scheduler`] - Virtual-time periodic task scheduler
//! - [`rng`] - Injectable randomness

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod agent;
pub mod alerts;
pub mod error;
pub mod irrigation;
pub mod notify;
pub mod rng;
pub mod scheduler;
pub mod sim;

// Re-export main public types for convenience
pub use agent::{FarmAgent, FarmConfig, FarmEvent};
pub use alerts::{Alert, AlertEngine, Severity};
pub use error::ConfigError;
pub use irrigation::IrrigationController;
pub use sim::{EnvironmentSimulator, FieldSimulator, WeatherSimulator};
