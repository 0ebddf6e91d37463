use async_trait::async_trait;
use stockbot_core::{
    domain::item::{parse_serial_list, ItemName, SerialNumber},
    InventoryError,
};
use thiserror::Error;

use crate::blocks::{self, MessageTemplate};

pub const CHECK_INVENTORY: &str = "check_inventory";
pub const ADD_PRODUCT: &str = "add_product";
pub const DELETE_PRODUCT: &str = "delete_product";
pub const SHIP_PRODUCT: &str = "ship_product";
pub const HELP: &str = "help";

const ITEM_NAME: &str = "item_name";
const QUANTITY: &str = "quantity";
const SERIAL_NUMBERS: &str = "serial_numbers";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    pub value: OptionValue,
}

/// A slash-command invocation as the platform delivers it: a command name and
/// its typed options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub options: Vec<CommandOption>,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_ts: String,
    pub request_id: String,
}

impl SlashCommandPayload {
    pub fn new(command: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            options: Vec::new(),
            channel_id: String::new(),
            user_id: String::new(),
            trigger_ts: String::new(),
            request_id: request_id.into(),
        }
    }

    pub fn string_option(mut self, name: &str, value: impl Into<String>) -> Self {
        self.options
            .push(CommandOption { name: name.to_owned(), value: OptionValue::String(value.into()) });
        self
    }

    pub fn integer_option(mut self, name: &str, value: i64) -> Self {
        self.options.push(CommandOption { name: name.to_owned(), value: OptionValue::Integer(value) });
        self
    }

    fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.iter().find(|option| option.name == name).map(|option| &option.value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddProductRequest {
    pub item_name: ItemName,
    pub quantity: u32,
    pub serial_numbers: Vec<SerialNumber>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteProductRequest {
    pub item_name: ItemName,
    pub quantity: u32,
    pub serial_numbers: Vec<SerialNumber>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShipProductRequest {
    pub item_name: ItemName,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventoryCommand {
    CheckInventory,
    AddProduct(AddProductRequest),
    DeleteProduct(DeleteProductRequest),
    ShipProduct(ShipProductRequest),
    Help,
}

impl InventoryCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckInventory => CHECK_INVENTORY,
            Self::AddProduct(_) => ADD_PRODUCT,
            Self::DeleteProduct(_) => DELETE_PRODUCT,
            Self::ShipProduct(_) => SHIP_PRODUCT,
            Self::Help => HELP,
        }
    }

    pub fn item_name(&self) -> Option<&ItemName> {
        match self {
            Self::AddProduct(request) => Some(&request.item_name),
            Self::DeleteProduct(request) => Some(&request.item_name),
            Self::ShipProduct(request) => Some(&request.item_name),
            Self::CheckInventory | Self::Help => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub command: InventoryCommand,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_ts: String,
    pub request_id: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unsupported slash command: {0}")]
    UnsupportedCommand(String),
    #[error("missing required option `{option}`")]
    MissingOption { command: &'static str, option: &'static str },
    #[error("option `{option}` must be {expected}")]
    InvalidOptionType { command: &'static str, option: &'static str, expected: &'static str },
    #[error("option `{option}` is invalid: {reason}")]
    InvalidOption { command: &'static str, option: &'static str, reason: String },
}

impl CommandParseError {
    pub fn command(&self) -> &str {
        match self {
            Self::UnsupportedCommand(command) => command.as_str(),
            Self::MissingOption { command, .. }
            | Self::InvalidOptionType { command, .. }
            | Self::InvalidOption { command, .. } => *command,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("command service failed: {0}")]
    Service(String),
}

pub fn normalize_command_name(raw: &str) -> String {
    raw.trim().trim_start_matches('/').to_ascii_lowercase()
}

pub fn normalize_inventory_command(
    payload: SlashCommandPayload,
) -> Result<CommandEnvelope, CommandParseError> {
    let command = match normalize_command_name(&payload.command).as_str() {
        CHECK_INVENTORY => InventoryCommand::CheckInventory,
        ADD_PRODUCT => InventoryCommand::AddProduct(AddProductRequest {
            item_name: item_name_option(&payload, ADD_PRODUCT)?,
            quantity: quantity_option(&payload, ADD_PRODUCT)?,
            serial_numbers: serial_numbers_option(&payload, ADD_PRODUCT)?,
        }),
        DELETE_PRODUCT => InventoryCommand::DeleteProduct(DeleteProductRequest {
            item_name: item_name_option(&payload, DELETE_PRODUCT)?,
            quantity: quantity_option(&payload, DELETE_PRODUCT)?,
            serial_numbers: serial_numbers_option(&payload, DELETE_PRODUCT)?,
        }),
        SHIP_PRODUCT => InventoryCommand::ShipProduct(ShipProductRequest {
            item_name: item_name_option(&payload, SHIP_PRODUCT)?,
            quantity: quantity_option(&payload, SHIP_PRODUCT)?,
        }),
        HELP => InventoryCommand::Help,
        other => return Err(CommandParseError::UnsupportedCommand(other.to_owned())),
    };

    Ok(CommandEnvelope {
        command,
        channel_id: payload.channel_id,
        user_id: payload.user_id,
        trigger_ts: payload.trigger_ts,
        request_id: payload.request_id,
    })
}

fn string_option<'a>(
    payload: &'a SlashCommandPayload,
    command: &'static str,
    option: &'static str,
) -> Result<&'a str, CommandParseError> {
    match payload.option(option) {
        Some(OptionValue::String(value)) => Ok(value.as_str()),
        Some(OptionValue::Integer(_)) => {
            Err(CommandParseError::InvalidOptionType { command, option, expected: "a string" })
        }
        None => Err(CommandParseError::MissingOption { command, option }),
    }
}

fn item_name_option(
    payload: &SlashCommandPayload,
    command: &'static str,
) -> Result<ItemName, CommandParseError> {
    let raw = string_option(payload, command, ITEM_NAME)?;
    ItemName::parse(raw).map_err(|error| CommandParseError::InvalidOption {
        command,
        option: ITEM_NAME,
        reason: error.to_string(),
    })
}

fn quantity_option(
    payload: &SlashCommandPayload,
    command: &'static str,
) -> Result<u32, CommandParseError> {
    let value = match payload.option(QUANTITY) {
        Some(OptionValue::Integer(value)) => *value,
        Some(OptionValue::String(_)) => {
            return Err(CommandParseError::InvalidOptionType {
                command,
                option: QUANTITY,
                expected: "an integer",
            })
        }
        None => return Err(CommandParseError::MissingOption { command, option: QUANTITY }),
    };

    if value < 1 {
        return Err(CommandParseError::InvalidOption {
            command,
            option: QUANTITY,
            reason: InventoryError::InvalidQuantity.to_string(),
        });
    }

    u32::try_from(value).map_err(|_| CommandParseError::InvalidOption {
        command,
        option: QUANTITY,
        reason: format!("{value} is too large"),
    })
}

fn serial_numbers_option(
    payload: &SlashCommandPayload,
    command: &'static str,
) -> Result<Vec<SerialNumber>, CommandParseError> {
    string_option(payload, command, SERIAL_NUMBERS).map(parse_serial_list)
}

/// Turns a console line such as `/add_product Widget 2 A1 A2` into a payload.
///
/// Positional arguments map onto the command's options in declaration order
/// and may be separated by any run of whitespace. The last option takes the
/// rest of the line verbatim, so spacing inside a serial list is preserved for
/// the count check. A quantity that is not an integer is passed through as a
/// string and rejected by the typed parser.
pub fn parse_console_line(
    line: &str,
    request_id: impl Into<String>,
) -> Result<SlashCommandPayload, CommandParseError> {
    let line = line.trim();
    let (raw_command, mut rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let command = normalize_command_name(raw_command);
    let mut payload = SlashCommandPayload::new(command.clone(), request_id);

    let option_names: &[&str] = match command.as_str() {
        CHECK_INVENTORY | HELP => &[],
        ADD_PRODUCT | DELETE_PRODUCT => &[ITEM_NAME, QUANTITY, SERIAL_NUMBERS],
        SHIP_PRODUCT => &[ITEM_NAME, QUANTITY],
        _ => return Err(CommandParseError::UnsupportedCommand(command)),
    };

    for (position, name) in option_names.iter().enumerate() {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let raw = if position + 1 == option_names.len() {
            std::mem::take(&mut rest).trim_end()
        } else {
            let (token, remainder) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            rest = remainder;
            token
        };

        payload = match (*name, raw.parse::<i64>()) {
            (QUANTITY, Ok(quantity)) => payload.integer_option(name, quantity),
            _ => payload.string_option(name, raw),
        };
    }

    Ok(payload)
}

pub struct CommandRouter<S> {
    service: S,
}

impl<S> CommandRouter<S>
where
    S: InventoryCommandService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn route(
        &self,
        envelope: CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError> {
        match &envelope.command {
            InventoryCommand::CheckInventory => self.service.check_inventory(&envelope).await,
            InventoryCommand::AddProduct(request) => {
                self.service.add_product(request.clone(), &envelope).await
            }
            InventoryCommand::DeleteProduct(request) => {
                self.service.delete_product(request.clone(), &envelope).await
            }
            InventoryCommand::ShipProduct(request) => {
                self.service.ship_product(request.clone(), &envelope).await
            }
            InventoryCommand::Help => Ok(blocks::help_message()),
        }
    }
}

#[async_trait]
pub trait InventoryCommandService: Send + Sync {
    async fn check_inventory(
        &self,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError>;

    async fn add_product(
        &self,
        request: AddProductRequest,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError>;

    async fn delete_product(
        &self,
        request: DeleteProductRequest,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError>;

    async fn ship_product(
        &self,
        request: ShipProductRequest,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use stockbot_core::domain::item::parse_serial_list;

    use super::{
        normalize_inventory_command, parse_console_line, AddProductRequest, CommandEnvelope,
        CommandParseError, CommandRouteError, CommandRouter, DeleteProductRequest,
        InventoryCommand, InventoryCommandService, OptionValue, ShipProductRequest,
        SlashCommandPayload,
    };
    use crate::blocks::MessageTemplate;

    fn add_payload(quantity: i64, serials: &str) -> SlashCommandPayload {
        SlashCommandPayload::new("/add_product", "req-1")
            .string_option("item_name", "Widget")
            .integer_option("quantity", quantity)
            .string_option("serial_numbers", serials)
    }

    #[test]
    fn add_payload_becomes_typed_request() {
        let envelope = normalize_inventory_command(add_payload(2, "A1 A2")).expect("normalized");

        assert_eq!(envelope.request_id, "req-1");
        let InventoryCommand::AddProduct(request) = envelope.command else {
            panic!("expected add_product");
        };
        assert_eq!(request.item_name.as_str(), "Widget");
        assert_eq!(request.quantity, 2);
        assert_eq!(request.serial_numbers, parse_serial_list("A1 A2"));
    }

    #[test]
    fn command_names_accept_missing_slash_and_any_case() {
        let envelope = normalize_inventory_command(SlashCommandPayload::new("CHECK_INVENTORY", "r"))
            .expect("normalized");
        assert_eq!(envelope.command, InventoryCommand::CheckInventory);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let error = normalize_inventory_command(SlashCommandPayload::new("/restock", "r"))
            .expect_err("unsupported");
        assert_eq!(error, CommandParseError::UnsupportedCommand("restock".to_owned()));
    }

    #[test]
    fn missing_and_mistyped_options_are_rejected() {
        let missing = normalize_inventory_command(
            SlashCommandPayload::new("/ship_product", "r").string_option("item_name", "Widget"),
        )
        .expect_err("missing quantity");
        assert_eq!(
            missing,
            CommandParseError::MissingOption { command: "ship_product", option: "quantity" }
        );

        let mistyped = normalize_inventory_command(
            SlashCommandPayload::new("/ship_product", "r")
                .string_option("item_name", "Widget")
                .string_option("quantity", "two"),
        )
        .expect_err("string quantity");
        assert!(matches!(mistyped, CommandParseError::InvalidOptionType { option: "quantity", .. }));
    }

    #[test]
    fn non_positive_quantity_and_blank_name_are_rejected() {
        let zero = normalize_inventory_command(add_payload(0, "")).expect_err("zero quantity");
        assert!(matches!(zero, CommandParseError::InvalidOption { option: "quantity", .. }));

        let blank = normalize_inventory_command(
            SlashCommandPayload::new("/ship_product", "r")
                .string_option("item_name", "  ")
                .integer_option("quantity", 1),
        )
        .expect_err("blank name");
        assert!(matches!(blank, CommandParseError::InvalidOption { option: "item_name", .. }));
        assert_eq!(blank.command(), "ship_product");
    }

    #[test]
    fn console_line_maps_positional_arguments() {
        let payload = parse_console_line("/add_product Widget 2 A1 A2", "req-7").expect("parsed");

        assert_eq!(payload.command, "add_product");
        assert_eq!(payload.options.len(), 3);
        assert_eq!(payload.options[1].value, OptionValue::Integer(2));
        assert_eq!(payload.options[2].value, OptionValue::String("A1 A2".to_owned()));
    }

    #[test]
    fn console_line_keeps_serial_spacing_and_string_quantity() {
        let payload = parse_console_line("delete_product Widget many A1  A2", "r").expect("parsed");
        assert_eq!(payload.options[1].value, OptionValue::String("many".to_owned()));
        assert_eq!(payload.options[2].value, OptionValue::String("A1  A2".to_owned()));

        let ship = parse_console_line("/ship_product Widget", "r").expect("parsed");
        assert_eq!(ship.options.len(), 1);
        assert!(normalize_inventory_command(ship).is_err());
    }

    #[test]
    fn console_line_tolerates_extra_spaces_between_arguments() {
        let payload = parse_console_line("/add_product  Widget   2  A1 A2", "r").expect("parsed");
        assert_eq!(payload.options.len(), 3);
        assert_eq!(payload.options[1].value, OptionValue::Integer(2));
        assert_eq!(payload.options[2].value, OptionValue::String("A1 A2".to_owned()));

        let envelope = normalize_inventory_command(
            parse_console_line("/add_product Widget  1 A1", "r").expect("parsed"),
        )
        .expect("quantity is found after a double space");
        assert_eq!(envelope.command.name(), "add_product");
        assert_eq!(envelope.command.item_name().map(|item| item.as_str()), Some("Widget"));

        let ship = parse_console_line("ship_product Widget  1 extra", "r").expect("parsed");
        assert_eq!(ship.options[1].value, OptionValue::String("1 extra".to_owned()));
    }

    #[tokio::test]
    async fn router_calls_service_entrypoints() {
        #[derive(Default)]
        struct RecordingService {
            calls: Mutex<Vec<&'static str>>,
        }

        #[async_trait::async_trait]
        impl InventoryCommandService for RecordingService {
            async fn check_inventory(
                &self,
                _envelope: &CommandEnvelope,
            ) -> Result<MessageTemplate, CommandRouteError> {
                self.calls.lock().expect("lock").push("check");
                Ok(crate::blocks::help_message())
            }

            async fn add_product(
                &self,
                _request: AddProductRequest,
                _envelope: &CommandEnvelope,
            ) -> Result<MessageTemplate, CommandRouteError> {
                self.calls.lock().expect("lock").push("add");
                Ok(crate::blocks::help_message())
            }

            async fn delete_product(
                &self,
                _request: DeleteProductRequest,
                _envelope: &CommandEnvelope,
            ) -> Result<MessageTemplate, CommandRouteError> {
                self.calls.lock().expect("lock").push("delete");
                Ok(crate::blocks::help_message())
            }

            async fn ship_product(
                &self,
                _request: ShipProductRequest,
                _envelope: &CommandEnvelope,
            ) -> Result<MessageTemplate, CommandRouteError> {
                self.calls.lock().expect("lock").push("ship");
                Ok(crate::blocks::help_message())
            }
        }

        let router = CommandRouter::new(RecordingService::default());
        for line in [
            "/check_inventory",
            "/add_product Widget 1 A1",
            "/delete_product Widget 1 A1",
            "/ship_product Widget 1",
            "/help",
        ] {
            let payload = parse_console_line(line, "req").expect("console line");
            let envelope = normalize_inventory_command(payload).expect("normalized");
            router.route(envelope).await.expect("route");
        }

        let calls = router.service().calls.lock().expect("lock");
        assert_eq!(&*calls, &["check", "add", "delete", "ship"]);
    }
}
