//! Energenie Bridge Framework
//!
//! Lifecycle abstractions for bridging MQTT topics to the Energenie radio link.
//!
//! # Overview
//!
//! This framework provides:
//! - [`BridgeConfig`] trait for configuration loading and validation
//! - [`BridgeRunner`] for managing bridge lifecycle (startup, workers, shutdown)
//! - [`MessageHandler`] for receiving command messages from the transport worker
//! - [`Publisher`] for fire-and-forget publication of telemetry
//! - [`BridgeArgs`] for common CLI argument parsing
//!
//! # Example
//!
//! ```ignore
//! use energenie_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = BridgeArgs::parse_with_default("mybridge.json5");
//!     let config = MyBridgeConfig::load(&args.config)?;
//!
//!     let mut runner = BridgeRunner::new_with_args("mybridge", config, Some(&args)).await?;
//!     runner.spawn_transport(handler)?;
//!     runner.spawn_worker("radio", move || radio_loop())?;
//!
//!     // Run until Ctrl+C
//!     runner.run().await
//! }
//! ```

mod args;
mod config;
mod error;
mod publisher;
mod runner;
mod transport;

pub use args::BridgeArgs;
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use publisher::{Publisher, TelemetrySink};
pub use runner::BridgeRunner;
pub use transport::{MessageHandler, Subscriber, drive_transport, handle_event};

// Re-export commonly used types from energenie-common
pub use energenie_common::{LogFormat, LoggingConfig, MqttConfig, TopicBuilder};
