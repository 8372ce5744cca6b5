//! Bridge runner for lifecycle management.

use std::future::Future;
use std::sync::Arc;

use rumqttc::{AsyncClient, EventLoop};
use tokio::signal;
use tokio::task::JoinHandle;

use energenie_common::{
    LoggingConfig, TopicBuilder, create_client, init_tracing, qos, resolve_broker,
};

use crate::BridgeArgs;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::publisher::Publisher;
use crate::transport::{MessageHandler, drive_transport};

/// Bridge runner that manages the lifecycle of a protocol bridge.
///
/// Handles:
/// - Logging initialization
/// - MQTT client creation and broker resolution
/// - The transport worker (subscriptions and message delivery)
/// - Long-running worker threads
/// - Shutdown on Ctrl+C
///
/// # Example
///
/// ```ignore
/// use energenie_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let args = BridgeArgs::parse_with_default("mybridge.json5");
///     let config = MyBridgeConfig::load(&args.config)?;
///
///     let mut runner = BridgeRunner::new_with_args("mybridge", config, Some(&args)).await?;
///     runner.spawn_transport(Arc::new(MyHandler))?;
///
///     runner.run().await
/// }
/// ```
pub struct BridgeRunner<C: BridgeConfig> {
    /// Bridge name for logging.
    name: String,
    /// The loaded configuration.
    config: C,
    /// MQTT client handle.
    client: AsyncClient,
    /// Event loop, until the transport worker takes it.
    eventloop: Option<EventLoop>,
    /// Topic namespace under the configured root.
    topics: TopicBuilder,
    /// Spawned async tasks.
    tasks: Vec<JoinHandle<()>>,
    /// Names of spawned worker threads.
    workers: Vec<String>,
}

impl<C: BridgeConfig> BridgeRunner<C> {
    /// Create a new bridge runner, with CLI args for log level override.
    ///
    /// This will:
    /// 1. Initialize logging based on config
    /// 2. Create the MQTT client
    /// 3. Resolve the broker address
    pub async fn new_with_args(
        name: impl Into<String>,
        config: C,
        args: Option<&BridgeArgs>,
    ) -> Result<Self> {
        let name = name.into();
        let version = env!("CARGO_PKG_VERSION");

        // Initialize logging with optional CLI override
        let log_config = match args.and_then(|a| a.log_level.clone()) {
            Some(level) => LoggingConfig {
                level,
                ..config.logging().clone()
            },
            None => config.logging().clone(),
        };

        init_tracing(&log_config).map_err(|e| BridgeError::Logging(e.to_string()))?;

        tracing::info!(bridge = %name, version = %version, "Starting bridge");

        let (client, eventloop) =
            create_client(config.mqtt()).map_err(|e| BridgeError::Client(e.to_string()))?;

        let addr = resolve_broker(config.mqtt())
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        tracing::info!(broker = %addr, "Broker address resolved");

        let topics = TopicBuilder::new(config.topic_root());

        Ok(Self {
            name,
            config,
            client,
            eventloop: Some(eventloop),
            topics,
            tasks: Vec::new(),
            workers: Vec::new(),
        })
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Get the topic namespace.
    pub fn topics(&self) -> &TopicBuilder {
        &self.topics
    }

    /// Get a publisher sharing the runner's client.
    pub fn publisher(&self) -> Publisher {
        Publisher::new(self.client.clone())
    }

    /// Start the transport worker.
    ///
    /// Subscribes to the command filters on every successful connect and
    /// delivers inbound messages to `handler`. The event loop is handed over
    /// on the first call; later calls fail.
    pub fn spawn_transport<H>(&mut self, handler: Arc<H>) -> Result<()>
    where
        H: MessageHandler + ?Sized,
    {
        let Some(eventloop) = self.eventloop.take() else {
            return Err(BridgeError::worker("transport worker already started"));
        };

        let qos = qos(self.config.mqtt().subscribe_qos)?;
        let subscriptions = self.topics.subscriptions();

        tracing::info!(filters = ?subscriptions, ?qos, "Starting transport worker");

        self.spawn(drive_transport(
            eventloop,
            self.client.clone(),
            handler,
            subscriptions,
            qos,
        ));
        Ok(())
    }

    /// Spawn a worker task.
    ///
    /// The task will be tracked and aborted on shutdown.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        self.tasks.push(handle);
    }

    /// Spawn a long-running worker on a dedicated OS thread.
    ///
    /// Used for loops that block on hardware I/O. The thread is detached and
    /// ends with the process.
    pub fn spawn_worker<F>(&mut self, name: impl Into<String>, worker: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let name = name.into();
        std::thread::Builder::new()
            .name(name.clone())
            .spawn(worker)
            .map_err(|e| BridgeError::worker(format!("failed to start '{}': {}", name, e)))?;

        tracing::debug!(worker = %name, "Worker thread started");
        self.workers.push(name);
        Ok(())
    }

    /// Run the bridge until Ctrl+C is received.
    ///
    /// This will:
    /// 1. Wait for Ctrl+C signal
    /// 2. Request a broker disconnect
    /// 3. Abort all spawned tasks
    ///
    /// Worker threads are not joined; pending state is not flushed.
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            bridge = %self.name,
            tasks = self.tasks.len(),
            workers = ?self.workers,
            "Bridge running. Press Ctrl+C to stop."
        );

        // Wait for shutdown signal
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }

        tracing::info!(bridge = %self.name, "Received shutdown signal");

        if let Err(e) = self.client.try_disconnect() {
            tracing::warn!(error = %e, "Error requesting disconnect");
        }

        // Wait briefly for the disconnect to be written
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        for task in &self.tasks {
            task.abort();
        }

        tracing::info!(bridge = %self.name, "Goodbye!");

        Ok(())
    }
}
