//! MQTT bridge for Energenie radio devices.
//!
//! Commands published under `/{root}/ENER002/...` switch OOK relay sockets
//! and commands under `/{root}/eTRV/Command/...` are sent to eTRV radiator
//! valves as OpenThings frames. Temperature reports heard from valves are
//! published on `/{root}/eTRV/Report/Temperature/{sensor_id}`.
//!
//! - [`router`] - Topic validation and per-device-kind command decoding
//! - [`state`] - Join handshake and temperature hand-off state
//! - [`receiver`] - Applies inbound radio frames to that state
//! - [`bridge_loop`] - The polling loop that answers joins and publishes reports
//! - [`radio`] - Radio driver interface and the simulated driver
//! - [`hex`] - Address hex codec

pub mod bootstrap;
pub mod bridge_loop;
pub mod command;
pub mod config;
pub mod hex;
pub mod openthings;
pub mod radio;
pub mod receiver;
pub mod registry;
pub mod router;
pub mod state;

pub use bootstrap::BootstrapError;
pub use bridge_loop::{BridgeLoop, IterationOutcome};
pub use command::{Action, Command, DeviceAddress, DeviceKind, RouteError};
pub use config::EnergenieBridgeConfig;
pub use openthings::{DeviceIdentity, SensorId};
pub use radio::{FskFrame, InboundFrame, RadioDriver, RadioError};
pub use receiver::RadioReceiver;
pub use registry::SensorRegistry;
pub use router::TopicRouter;
pub use state::{JoinResolution, ProtocolStateTracker};
