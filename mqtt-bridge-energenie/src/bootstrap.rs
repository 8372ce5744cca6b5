//! Process bring-up and fatal startup errors.

use std::sync::Arc;

use energenie_bridge_framework::{BridgeArgs, BridgeConfig, BridgeError, BridgeRunner};
use thiserror::Error;
use tracing::info;

use crate::bridge_loop::BridgeLoop;
use crate::config::{EnergenieBridgeConfig, RadioConfig, RadioDriverKind};
use crate::openthings::DeviceIdentity;
use crate::radio::{RadioDriver, RadioError, SimulatedRadio};
use crate::receiver::RadioReceiver;
use crate::registry::SensorRegistry;
use crate::router::TopicRouter;
use crate::state::ProtocolStateTracker;

/// Name the bridge logs and registers its worker under.
pub const BRIDGE_NAME: &str = "mqtt-bridge-energenie";

/// A failure that stops the process before the bridge is running.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Logging could not be initialized")]
    LoggingInit(#[source] BridgeError),

    #[error("MQTT client could not be created")]
    ClientCreate(#[source] BridgeError),

    #[error("MQTT broker could not be reached")]
    Connect(#[source] BridgeError),

    #[error("Bridge workers could not be started: {0}")]
    LoopStart(String),

    #[error("Radio could not be initialized")]
    RadioInit(#[source] RadioError),

    #[error("Configuration could not be loaded")]
    ConfigLoad(#[source] BridgeError),
}

impl BootstrapError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            BootstrapError::LoggingInit(_) => 1,
            BootstrapError::ClientCreate(_) => 2,
            BootstrapError::Connect(_) => 3,
            BootstrapError::LoopStart(_) => 4,
            BootstrapError::RadioInit(_) => 5,
            BootstrapError::ConfigLoad(_) => 6,
        }
    }
}

impl From<BridgeError> for BootstrapError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Logging(_) => Self::LoggingInit(err),
            BridgeError::Client(_) => Self::ClientCreate(err),
            BridgeError::Connection(_) => Self::Connect(err),
            BridgeError::Worker(msg) => Self::LoopStart(msg),
            BridgeError::Publish { .. } => Self::LoopStart(err.to_string()),
            BridgeError::Config(_)
            | BridgeError::ConfigNotFound { .. }
            | BridgeError::ConfigParse(_)
            | BridgeError::ConfigValidation(_)
            | BridgeError::Io(_) => Self::ConfigLoad(err),
        }
    }
}

impl From<RadioError> for BootstrapError {
    fn from(err: RadioError) -> Self {
        Self::RadioInit(err)
    }
}

/// Load and validate the configuration named on the command line.
pub fn load_config(args: &BridgeArgs) -> Result<EnergenieBridgeConfig, BootstrapError> {
    EnergenieBridgeConfig::load(&args.config).map_err(BootstrapError::ConfigLoad)
}

/// Open the configured radio driver.
pub fn open_radio(config: &RadioConfig) -> Result<Arc<dyn RadioDriver>, BootstrapError> {
    match config.driver {
        RadioDriverKind::Simulated => {
            let radio = SimulatedRadio::open(config)?;
            info!("Using simulated radio");
            Ok(Arc::new(radio))
        }
    }
}

/// Connect to the broker, open the radio and start both workers.
///
/// Returns the runner ready for [`BridgeRunner::run`].
pub async fn start(
    config: EnergenieBridgeConfig,
    args: &BridgeArgs,
) -> Result<BridgeRunner<EnergenieBridgeConfig>, BootstrapError> {
    let mut runner = BridgeRunner::new_with_args(BRIDGE_NAME, config, Some(args)).await?;

    let radio = open_radio(&runner.config().radio)?;
    let topics = runner.topics().clone();
    let settings = runner.config().energenie.clone();

    let state = Arc::new(ProtocolStateTracker::new(
        DeviceIdentity::ETRV,
        settings.join_timeout(),
    ));
    let registry = Arc::new(SensorRegistry::new());
    let receiver = RadioReceiver::new(
        radio.clone(),
        state.clone(),
        registry,
        settings.receive_timeout(),
    );
    let sink = Arc::new(runner.publisher());
    let bridge_loop = BridgeLoop::new(
        receiver,
        radio.clone(),
        state,
        sink,
        topics.clone(),
        settings.poll_interval(),
    );

    let router = Arc::new(TopicRouter::new(radio, &topics));
    runner.spawn_transport(router)?;

    runner.spawn_worker("radio-loop", move || {
        bridge_loop.run();
    })?;

    Ok(runner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            BootstrapError::from(BridgeError::Logging("x".into())),
            BootstrapError::from(BridgeError::Client("x".into())),
            BootstrapError::from(BridgeError::Connection("x".into())),
            BootstrapError::from(BridgeError::worker("x")),
            BootstrapError::from(RadioError::Init("x".into())),
            BootstrapError::from(BridgeError::ConfigNotFound { path: "x".into() }),
        ];

        let codes: Vec<u8> = errors.iter().map(BootstrapError::exit_code).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_config_errors_map_to_config_load() {
        for err in [
            BridgeError::ConfigParse("x".into()),
            BridgeError::validation("x"),
            BridgeError::config("x"),
        ] {
            assert_eq!(BootstrapError::from(err).exit_code(), 6);
        }
    }

    #[test]
    fn test_missing_config_file() {
        let args = BridgeArgs {
            config: "/nonexistent/energenie.json5".into(),
            log_level: None,
        };
        assert!(matches!(
            load_config(&args),
            Err(BootstrapError::ConfigLoad(BridgeError::ConfigNotFound { .. }))
        ));
    }

    #[test]
    fn test_open_simulated_radio() {
        assert!(open_radio(&RadioConfig::default()).is_ok());

        let bad = RadioConfig {
            capture_path: Some("/nonexistent/dir/frames.jsonl".into()),
            ..Default::default()
        };
        assert!(matches!(open_radio(&bad), Err(BootstrapError::RadioInit(_))));
    }
}
