use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use stockbot_slack::service::SharedInventory;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    inventory: SharedInventory,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub inventory: HealthCheck,
    pub checked_at: String,
}

pub fn router(inventory: SharedInventory) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { inventory })
}

pub async fn spawn(bind_address: &str, port: u16, inventory: SharedInventory) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(inventory)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let inventory = inventory_check(&state.inventory).await;

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "stockbot-server runtime initialized".to_string(),
        },
        inventory,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

async fn inventory_check(inventory: &SharedInventory) -> HealthCheck {
    let inventory = inventory.read().await;
    HealthCheck {
        status: "ready",
        detail: format!(
            "{} item(s), {} unit(s) on hand",
            inventory.item_count(),
            inventory.unit_count()
        ),
    }
}
