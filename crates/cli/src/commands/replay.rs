use std::fs;
use std::path::Path;
use std::sync::Arc;

use stockbot_core::{Inventory, InventoryPolicy};
use stockbot_slack::{
    blocks::{self, MessageTemplate},
    commands::{
        normalize_inventory_command, parse_console_line, CommandParseError, CommandRouter,
        SlashCommandPayload,
    },
    service::InventoryService,
};
use tokio::sync::RwLock;

use super::{CommandResult, EXIT_INPUT_UNREADABLE};

pub fn run(path: &Path, enforce_unique_serials: bool) -> CommandResult {
    let script = match fs::read_to_string(path) {
        Ok(script) => script,
        Err(error) => {
            return CommandResult::failure(
                "replay",
                "input_unreadable",
                format!("could not read `{}`: {error}", path.display()),
                EXIT_INPUT_UNREADABLE,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "replay",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_INPUT_UNREADABLE,
            );
        }
    };

    let policy = InventoryPolicy { enforce_unique_serials };
    runtime.block_on(replay(&script, policy))
}

async fn replay(script: &str, policy: InventoryPolicy) -> CommandResult {
    let inventory = Arc::new(RwLock::new(Inventory::new(policy)));
    let router = CommandRouter::new(InventoryService::new(Arc::clone(&inventory)));

    let mut transcript = Vec::new();
    let mut executed = 0_usize;
    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let request_id = format!("replay-{}", index + 1);
        let reply = execute(&router, line, &request_id).await;
        transcript.push(format!("> {line}"));
        transcript.push(reply.fallback_text);
        executed += 1;
    }

    let inventory = inventory.read().await;
    CommandResult::success(
        "replay",
        format!(
            "replayed {executed} command(s); {} item(s), {} unit(s) on hand",
            inventory.item_count(),
            inventory.unit_count()
        ),
    )
    .after(&transcript.join("\n"))
}

async fn execute(
    router: &CommandRouter<InventoryService>,
    line: &str,
    request_id: &str,
) -> MessageTemplate {
    let payload = match parse_console_line(line, request_id) {
        Ok(payload) => payload,
        Err(CommandParseError::UnsupportedCommand(command)) => {
            SlashCommandPayload::new(command, request_id)
        }
        Err(error) => return blocks::invalid_request_message(&error, request_id),
    };

    let envelope = match normalize_inventory_command(payload) {
        Ok(envelope) => envelope,
        Err(error) => return blocks::invalid_request_message(&error, request_id),
    };

    match router.route(envelope).await {
        Ok(message) => message,
        Err(error) => blocks::error_message(&error.to_string(), request_id),
    }
}
