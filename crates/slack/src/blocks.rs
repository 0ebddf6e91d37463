use serde::Serialize;
use stockbot_core::{
    domain::item::join_serials, InventoryError, StockMovement, StockOperation, StockReport,
};

use crate::commands::CommandParseError;

pub const EMPTY_INVENTORY_TEXT: &str = "No inventory on hand.";
pub const SERIAL_COUNT_MISMATCH_TEXT: &str =
    "Quantity does not match the number of serial numbers, please check and try again.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { block_id: String, text: TextObject },
    Context { block_id: String, elements: Vec<TextObject> },
}

/// A reply: the plain `fallback_text` is what every client can show, the
/// blocks are the rich rendering of the same content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Section { block_id: block_id.into(), text: builder.build() });
        self
    }

    pub fn context<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ContextBuilder),
    {
        let mut builder = ContextBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Context { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> TextObject {
        self.text.unwrap_or_else(|| TextObject::plain(""))
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    elements: Vec<TextObject>,
}

impl ContextBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> Vec<TextObject> {
        self.elements
    }
}

pub fn inventory_report_message(report: &StockReport) -> MessageTemplate {
    let items = match report {
        StockReport::Empty => {
            return MessageBuilder::new(EMPTY_INVENTORY_TEXT)
                .section("inventory.report.empty.v1", |section| {
                    section.plain(EMPTY_INVENTORY_TEXT);
                })
                .build();
        }
        StockReport::Items(items) => items,
    };

    let lines = items.iter().map(ToString::to_string).collect::<Vec<_>>();
    let units: u64 = items.iter().map(|item| u64::from(item.quantity())).sum();
    let bullet_lines = items
        .iter()
        .map(|item| {
            format!(
                "• *{}* · {} in stock · `{}`",
                item.name,
                item.quantity(),
                join_serials(&item.serial_numbers)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    MessageBuilder::new(format!("Current inventory:\n{}", lines.join("\n")))
        .section("inventory.report.header.v1", |section| {
            section.mrkdwn("*Current inventory*");
        })
        .section("inventory.report.items.v1", |section| {
            section.mrkdwn(bullet_lines);
        })
        .context("inventory.report.totals.v1", |context| {
            context.plain(format!("{} item(s), {units} unit(s)", items.len()));
        })
        .build()
}

pub fn stock_added_message(movement: &StockMovement) -> MessageTemplate {
    movement_message("Added", "inventory.added", movement)
}

pub fn stock_removed_message(movement: &StockMovement) -> MessageTemplate {
    movement_message("Removed", "inventory.removed", movement)
}

pub fn stock_shipped_message(movement: &StockMovement) -> MessageTemplate {
    movement_message("Shipped", "inventory.shipped", movement)
}

fn movement_message(verb: &str, block_prefix: &str, movement: &StockMovement) -> MessageTemplate {
    let serials = join_serials(&movement.serials);
    MessageBuilder::new(format!(
        "{verb} {}, quantity: {}, serials: {serials}",
        movement.item, movement.quantity
    ))
    .section(format!("{block_prefix}.summary.v1"), |section| {
        section.mrkdwn(format!("*{verb}* `{}` × {}", movement.item, movement.quantity));
    })
    .context(format!("{block_prefix}.serials.v1"), |context| {
        context.plain(format!("Serials: {serials}"));
    })
    .build()
}

pub fn inventory_error_text(error: &InventoryError) -> String {
    match error {
        InventoryError::SerialCountMismatch { .. } => SERIAL_COUNT_MISMATCH_TEXT.to_owned(),
        InventoryError::DuplicateSerial { item, serial } => {
            format!("Serial {serial} is already recorded for item {item}.")
        }
        InventoryError::InvalidQuantity => "Quantity must be at least 1.".to_owned(),
        InventoryError::EmptyItemName => "Item name must not be empty.".to_owned(),
        InventoryError::ItemNotFound(item) => format!("Item {item} does not exist."),
        InventoryError::SerialNotFound { item, serial } => {
            format!("Serial {serial} does not exist for item {item}.")
        }
        InventoryError::InsufficientStock { item, operation, .. } => match operation {
            StockOperation::Remove => format!("Not enough stock of {item} to remove."),
            StockOperation::Ship => format!("Not enough stock of {item} to ship."),
        },
    }
}

pub fn inventory_error_message(error: &InventoryError, correlation_id: &str) -> MessageTemplate {
    error_message(&inventory_error_text(error), correlation_id)
}

pub fn invalid_request_message(error: &CommandParseError, correlation_id: &str) -> MessageTemplate {
    let summary = match error {
        CommandParseError::UnsupportedCommand(command) => {
            format!("Unsupported command /{command}. Try /help.")
        }
        other => format!("Invalid /{} request: {other}", other.command()),
    };
    error_message(&summary, correlation_id)
}

pub fn error_message(summary: &str, correlation_id: &str) -> MessageTemplate {
    MessageBuilder::new(summary.to_owned())
        .section("inventory.error.summary.v1", |section| {
            section.mrkdwn(format!(":warning: {summary}"));
        })
        .context("inventory.error.context.v1", |context| {
            context.plain(format!("Correlation ID: {correlation_id}"));
        })
        .build()
}

pub fn help_message() -> MessageTemplate {
    MessageBuilder::new(
        "Available commands: /check_inventory, /add_product, /delete_product, /ship_product",
    )
    .section("inventory.help.summary.v1", |section| {
        section.mrkdwn(
            "*Available commands*\n• `/check_inventory`\n• `/add_product <item_name> <quantity> <serial_numbers>`\n• `/delete_product <item_name> <quantity> <serial_numbers>`\n• `/ship_product <item_name> <quantity>`",
        );
    })
    .context("inventory.help.context.v1", |context| {
        context.plain("Serial numbers are separated by single spaces.");
    })
    .build()
}
