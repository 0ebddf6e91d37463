use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use stockbot_core::ItemName;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    blocks::{self, MessageTemplate},
    commands::{
        normalize_inventory_command, CommandRouteError, CommandRouter, InventoryCommandService,
        SlashCommandPayload,
    },
    service::InventoryService,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    SlashCommand(SlashCommandPayload),
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::SlashCommand(_) => SlackEventType::SlashCommand,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    SlashCommand,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Responded(MessageTemplate),
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Route(#[from] CommandRouteError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> SlackEventType;
    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Dispatcher wired to a fresh, empty inventory.
pub fn default_dispatcher() -> EventDispatcher {
    inventory_dispatcher(InventoryService::default())
}

pub fn inventory_dispatcher<S>(service: S) -> EventDispatcher
where
    S: InventoryCommandService + 'static,
{
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(SlashCommandHandler::new(service));
    dispatcher
}

pub struct SlashCommandHandler<S> {
    router: CommandRouter<S>,
}

impl<S> SlashCommandHandler<S>
where
    S: InventoryCommandService,
{
    pub fn new(service: S) -> Self {
        Self { router: CommandRouter::new(service) }
    }
}

#[async_trait]
impl<S> EventHandler for SlashCommandHandler<S>
where
    S: InventoryCommandService + 'static,
{
    fn event_type(&self) -> SlackEventType {
        SlackEventType::SlashCommand
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::SlashCommand(payload) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let request_id = payload.request_id.clone();
        let normalized = match normalize_inventory_command(payload.clone()) {
            Ok(normalized) => normalized,
            Err(error) => {
                warn!(
                    event_name = "ingress.slack.command_invalid",
                    correlation_id = %ctx.correlation_id,
                    command = %payload.command,
                    error = %error,
                    "slash command rejected at the boundary"
                );
                return Ok(HandlerResult::Responded(blocks::invalid_request_message(
                    &error,
                    &request_id,
                )));
            }
        };

        debug!(
            event_name = "ingress.slack.command_routed",
            correlation_id = %ctx.correlation_id,
            command = normalized.command.name(),
            item_name = normalized.command.item_name().map(ItemName::as_str).unwrap_or("none"),
            "routing slash command"
        );
        let message = self.router.route(normalized).await?;
        Ok(HandlerResult::Responded(message))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        default_dispatcher, EventContext, EventDispatcher, HandlerResult, SlackEnvelope,
        SlackEvent,
    };
    use crate::commands::SlashCommandPayload;

    fn slash(envelope_id: &str, payload: SlashCommandPayload) -> SlackEnvelope {
        SlackEnvelope { envelope_id: envelope_id.to_owned(), event: SlackEvent::SlashCommand(payload) }
    }

    #[tokio::test]
    async fn dispatcher_routes_slash_commands() {
        let dispatcher = default_dispatcher();
        let envelope = slash("env-1", SlashCommandPayload::new("/check_inventory", "req-1"));

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        let HandlerResult::Responded(message) = result else {
            panic!("expected a reply");
        };
        assert_eq!(message.fallback_text, "No inventory on hand.");
    }

    #[tokio::test]
    async fn dispatcher_keeps_state_across_envelopes() {
        let dispatcher = default_dispatcher();
        let add = slash(
            "env-1",
            SlashCommandPayload::new("/add_product", "req-1")
                .string_option("item_name", "Widget")
                .integer_option("quantity", 1)
                .string_option("serial_numbers", "A1"),
        );
        dispatcher.dispatch(&add, &EventContext::default()).await.expect("dispatch add");

        let check = slash("env-2", SlashCommandPayload::new("/check_inventory", "req-2"));
        let result = dispatcher.dispatch(&check, &EventContext::default()).await.expect("dispatch");

        assert!(matches!(
            result,
            HandlerResult::Responded(ref message) if message.fallback_text.contains("Widget: quantity 1")
        ));
    }

    #[tokio::test]
    async fn invalid_payload_is_answered_not_failed() {
        let dispatcher = default_dispatcher();
        let envelope = slash(
            "env-3",
            SlashCommandPayload::new("/ship_product", "req-3").string_option("item_name", "Widget"),
        );

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        let HandlerResult::Responded(message) = result else {
            panic!("expected a reply");
        };
        assert_eq!(
            message.fallback_text,
            "Invalid /ship_product request: missing required option `quantity`"
        );
    }

    #[tokio::test]
    async fn unknown_command_gets_guidance() {
        let dispatcher = default_dispatcher();
        let envelope = slash("env-4", SlashCommandPayload::new("/restock", "req-4"));

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        assert!(matches!(
            result,
            HandlerResult::Responded(ref message) if message.fallback_text.contains("Try /help")
        ));
    }

    #[tokio::test]
    async fn dispatcher_returns_ignored_when_no_handler_registered() {
        let dispatcher = EventDispatcher::new();
        let envelope = SlackEnvelope {
            envelope_id: "env-5".to_owned(),
            event: SlackEvent::Unsupported { event_type: "reaction_added".to_owned() },
        };

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        assert_eq!(result, HandlerResult::Ignored);
    }

    #[test]
    fn default_dispatcher_registers_slash_handler() {
        assert_eq!(default_dispatcher().handler_count(), 1);
    }
}
