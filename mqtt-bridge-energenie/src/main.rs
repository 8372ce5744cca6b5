//! MQTT bridge for Energenie radio devices.
//!
//! Subscribes to socket and valve command topics, transmits the matching
//! radio frames, and publishes valve temperature reports.

use std::process::ExitCode;

use anyhow::{Context, Result};
use energenie_bridge_framework::BridgeArgs;
use mqtt_bridge_energenie::BootstrapError;
use mqtt_bridge_energenie::bootstrap::{load_config, start};

fn main() -> ExitCode {
    let args = BridgeArgs::parse_with_default("energenie.json5");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<BootstrapError>()
                .map_or(1, BootstrapError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(args: &BridgeArgs) -> Result<()> {
    let config = load_config(args)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| BootstrapError::LoopStart(e.to_string()))
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        let runner = start(config, args)
            .await
            .context("Failed to start bridge")?;

        runner.run().await.map_err(BootstrapError::from)?;
        Ok::<_, anyhow::Error>(())
    })
}
