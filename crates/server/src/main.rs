mod bootstrap;
mod console;
mod health;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use stockbot_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use stockbot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // Replies go to stdout in console mode, so logs stay on stderr.
    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_max_level(log_level)
                .compact()
                .init();
        }
        Pretty => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_max_level(log_level)
                .pretty()
                .init();
        }
        Json => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_max_level(log_level)
                .json()
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.inventory.clone(),
    )
    .await?;

    tracing::info!(
        event_name = "system.server.slack_transport_mode",
        transport_mode = app.slack_runner.transport_mode(),
        correlation_id = "bootstrap",
        "slack runner transport mode initialized"
    );

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        "stockbot-server started"
    );

    let stop_at_end_of_input = app.slack_runner.transport_mode() == "console";
    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    run_until_shutdown(app.slack_runner.start(), wait_for_shutdown(), grace, stop_at_end_of_input)
        .await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "stockbot-server stopping"
    );

    Ok(())
}

/// Drives the runner until it finishes or shutdown is requested. After a
/// shutdown request the runner gets at most `grace` to finish the envelope
/// it is working on.
async fn run_until_shutdown<R, S>(
    runner: R,
    shutdown: S,
    grace: Duration,
    stop_at_end_of_input: bool,
) -> Result<()>
where
    R: Future<Output = Result<()>>,
    S: Future<Output = Result<()>>,
{
    tokio::pin!(runner);
    tokio::pin!(shutdown);

    let shutdown_requested = tokio::select! {
        result = &mut runner => {
            result?;
            false
        }
        result = &mut shutdown => {
            result?;
            true
        }
    };
    if !shutdown_requested {
        if !stop_at_end_of_input {
            shutdown.await?;
        }
        return Ok(());
    }

    tracing::info!(
        event_name = "system.server.draining",
        correlation_id = "shutdown",
        grace_secs = grace.as_secs(),
        "shutdown requested; draining slack runner"
    );
    match tokio::time::timeout(grace, runner).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                event_name = "system.server.drain_timeout",
                correlation_id = "shutdown",
                grace_secs = grace.as_secs(),
                "slack runner did not finish within the grace period"
            );
            Ok(())
        }
    }
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::run_until_shutdown;

    #[tokio::test]
    async fn runner_finishes_within_grace_after_shutdown() {
        let finished = Arc::new(AtomicBool::new(false));
        let runner_finished = Arc::clone(&finished);
        let runner = async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            runner_finished.store(true, Ordering::SeqCst);
            Ok::<(), anyhow::Error>(())
        };

        let shutdown = async { Ok::<(), anyhow::Error>(()) };
        run_until_shutdown(runner, shutdown, Duration::from_secs(5), false)
            .await
            .expect("clean shutdown");

        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn stuck_runner_is_abandoned_after_grace() {
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_until_shutdown(
                std::future::pending::<anyhow::Result<()>>(),
                async { Ok::<(), anyhow::Error>(()) },
                Duration::from_millis(10),
                false,
            ),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn console_mode_stops_at_end_of_input() {
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_until_shutdown(
                async { Ok::<(), anyhow::Error>(()) },
                std::future::pending::<anyhow::Result<()>>(),
                Duration::ZERO,
                true,
            ),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }
}
