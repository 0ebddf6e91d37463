use std::sync::Arc;

use stockbot_core::config::{AppConfig, ConfigError, LoadOptions, TransportMode};
use stockbot_core::Inventory;
use stockbot_slack::{
    events::inventory_dispatcher,
    service::{InventoryService, SharedInventory},
    socket::{NoopSocketTransport, ReconnectPolicy, SocketModeRunner, SocketTransport},
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::console::ConsoleTransport;

pub struct Application {
    pub config: AppConfig,
    pub inventory: SharedInventory,
    pub slack_runner: SocketModeRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    config.validate()?;

    let transport: Arc<dyn SocketTransport> = match config.slack.transport {
        TransportMode::Socket => Arc::new(NoopSocketTransport),
        TransportMode::Console => Arc::new(ConsoleTransport::stdio()),
    };
    Ok(assemble(config, transport))
}

fn assemble(config: AppConfig, transport: Arc<dyn SocketTransport>) -> Application {
    let inventory: SharedInventory =
        Arc::new(RwLock::new(Inventory::new(config.inventory.policy())));
    info!(
        event_name = "system.bootstrap.inventory_ready",
        correlation_id = "bootstrap",
        enforce_unique_serials = config.inventory.enforce_unique_serials,
        "inventory initialized empty"
    );

    let dispatcher = inventory_dispatcher(InventoryService::new(Arc::clone(&inventory)));
    let slack_runner = SocketModeRunner::new(transport, dispatcher, ReconnectPolicy::default());

    Application { config, inventory, slack_runner }
}
