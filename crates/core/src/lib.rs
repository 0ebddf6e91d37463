pub mod config;
pub mod domain;
pub mod errors;
pub mod inventory;

pub use domain::item::{InventoryItem, ItemName, SerialNumber};
pub use errors::{ErrorKind, InventoryError, StockOperation};
pub use inventory::{Inventory, InventoryPolicy, StockMovement, StockReport};
