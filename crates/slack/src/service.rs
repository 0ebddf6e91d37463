use std::sync::Arc;

use async_trait::async_trait;
use stockbot_core::{Inventory, InventoryError};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    blocks::{self, MessageTemplate},
    commands::{
        AddProductRequest, CommandEnvelope, CommandRouteError, DeleteProductRequest,
        InventoryCommandService, ShipProductRequest,
    },
};

pub type SharedInventory = Arc<RwLock<Inventory>>;

/// Runs inventory commands against one shared inventory.
///
/// Each mutating command holds the write lock for its whole
/// validate-then-mutate body, so commands never interleave.
#[derive(Clone, Default)]
pub struct InventoryService {
    inventory: SharedInventory,
}

impl InventoryService {
    pub fn new(inventory: SharedInventory) -> Self {
        Self { inventory }
    }

    pub fn inventory(&self) -> SharedInventory {
        Arc::clone(&self.inventory)
    }

    fn rejected(
        &self,
        command: &'static str,
        error: &InventoryError,
        envelope: &CommandEnvelope,
    ) -> MessageTemplate {
        warn!(
            event_name = "inventory.command.rejected",
            correlation_id = %envelope.request_id,
            command,
            error_kind = %error.kind(),
            error = %error,
            "inventory command rejected"
        );
        blocks::inventory_error_message(error, &envelope.request_id)
    }
}

#[async_trait]
impl InventoryCommandService for InventoryService {
    async fn check_inventory(
        &self,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError> {
        let report = self.inventory.read().await.check();
        info!(
            event_name = "inventory.stock.checked",
            correlation_id = %envelope.request_id,
            "inventory listing requested"
        );
        Ok(blocks::inventory_report_message(&report))
    }

    async fn add_product(
        &self,
        request: AddProductRequest,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError> {
        let mut inventory = self.inventory.write().await;
        match inventory.add(request.item_name, request.quantity, request.serial_numbers) {
            Ok(movement) => {
                info!(
                    event_name = "inventory.stock.added",
                    correlation_id = %envelope.request_id,
                    item_name = %movement.item,
                    quantity = movement.quantity,
                    "stock added"
                );
                Ok(blocks::stock_added_message(&movement))
            }
            Err(error) => Ok(self.rejected("add_product", &error, envelope)),
        }
    }

    async fn delete_product(
        &self,
        request: DeleteProductRequest,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError> {
        let mut inventory = self.inventory.write().await;
        match inventory.remove(&request.item_name, request.quantity, request.serial_numbers) {
            Ok(movement) => {
                info!(
                    event_name = "inventory.stock.removed",
                    correlation_id = %envelope.request_id,
                    item_name = %movement.item,
                    quantity = movement.quantity,
                    "stock removed"
                );
                Ok(blocks::stock_removed_message(&movement))
            }
            Err(error) => Ok(self.rejected("delete_product", &error, envelope)),
        }
    }

    async fn ship_product(
        &self,
        request: ShipProductRequest,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError> {
        let mut inventory = self.inventory.write().await;
        match inventory.ship(&request.item_name, request.quantity) {
            Ok(movement) => {
                info!(
                    event_name = "inventory.stock.shipped",
                    correlation_id = %envelope.request_id,
                    item_name = %movement.item,
                    quantity = movement.quantity,
                    "stock shipped"
                );
                Ok(blocks::stock_shipped_message(&movement))
            }
            Err(error) => Ok(self.rejected("ship_product", &error, envelope)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockbot_core::{Inventory, InventoryPolicy, StockReport};
    use tokio::sync::RwLock;

    use super::InventoryService;
    use crate::blocks::{MessageTemplate, EMPTY_INVENTORY_TEXT, SERIAL_COUNT_MISMATCH_TEXT};
    use crate::commands::{normalize_inventory_command, parse_console_line, CommandRouter};

    async fn run(router: &CommandRouter<InventoryService>, line: &str) -> MessageTemplate {
        let payload = parse_console_line(line, "req-test").expect("console line");
        let envelope = normalize_inventory_command(payload).expect("normalized");
        router.route(envelope).await.expect("route")
    }

    #[tokio::test]
    async fn add_check_remove_ship_scenario() {
        let router = CommandRouter::new(InventoryService::default());

        assert_eq!(run(&router, "/check_inventory").await.fallback_text, EMPTY_INVENTORY_TEXT);

        let added = run(&router, "/add_product Widget 2 A1 A2").await;
        assert_eq!(added.fallback_text, "Added Widget, quantity: 2, serials: A1, A2");
        assert_eq!(
            run(&router, "/check_inventory").await.fallback_text,
            "Current inventory:\nWidget: quantity 2, serials A1, A2"
        );

        let mismatch = run(&router, "/add_product Widget 3 A1 A2").await;
        assert_eq!(mismatch.fallback_text, SERIAL_COUNT_MISMATCH_TEXT);

        let removed = run(&router, "/delete_product Widget 1 A1").await;
        assert_eq!(removed.fallback_text, "Removed Widget, quantity: 1, serials: A1");

        run(&router, "/add_product Widget 1 A3").await;
        let shipped = run(&router, "/ship_product Widget 1").await;
        assert_eq!(shipped.fallback_text, "Shipped Widget, quantity: 1, serials: A2");
        assert_eq!(
            run(&router, "/check_inventory").await.fallback_text,
            "Current inventory:\nWidget: quantity 1, serials A3"
        );
    }

    #[tokio::test]
    async fn failures_become_replies_and_leave_state_unchanged() {
        let service = InventoryService::default();
        let inventory = service.inventory();
        let router = CommandRouter::new(service);

        assert_eq!(
            run(&router, "/delete_product Gadget 1 X1").await.fallback_text,
            "Item Gadget does not exist."
        );

        run(&router, "/add_product Widget 1 A1").await;
        assert_eq!(
            run(&router, "/ship_product Widget 100").await.fallback_text,
            "Not enough stock of Widget to ship."
        );
        assert_eq!(
            run(&router, "/delete_product Widget 2 A1 A2").await.fallback_text,
            "Not enough stock of Widget to remove."
        );
        assert_eq!(
            run(&router, "/delete_product Widget 1 Z9").await.fallback_text,
            "Serial Z9 does not exist for item Widget."
        );

        let report = inventory.read().await.check();
        let StockReport::Items(items) = report else {
            panic!("widget should still be stocked");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].to_string(), "Widget: quantity 1, serials A1");
    }

    #[tokio::test]
    async fn removing_last_unit_empties_listing() {
        let router = CommandRouter::new(InventoryService::default());
        run(&router, "/add_product Widget 1 A1").await;
        run(&router, "/ship_product Widget 1").await;

        assert_eq!(run(&router, "/check_inventory").await.fallback_text, EMPTY_INVENTORY_TEXT);
    }

    #[tokio::test]
    async fn injected_policy_rejects_duplicate_serials() {
        let inventory =
            Arc::new(RwLock::new(Inventory::new(InventoryPolicy { enforce_unique_serials: true })));
        let router = CommandRouter::new(InventoryService::new(inventory));

        run(&router, "/add_product Widget 1 A1").await;
        assert_eq!(
            run(&router, "/add_product Widget 1 A1").await.fallback_text,
            "Serial A1 is already recorded for item Widget."
        );
    }
}
