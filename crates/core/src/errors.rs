use std::fmt;

use thiserror::Error;

use crate::domain::item::{ItemName, SerialNumber};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InsufficientStock,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::InsufficientStock => "insufficient_stock",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stock operation that could not be covered by the current quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockOperation {
    Remove,
    Ship,
}

impl StockOperation {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Ship => "ship",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("quantity {quantity} does not match {serials} serial number(s)")]
    SerialCountMismatch { quantity: u32, serials: usize },
    #[error("serial `{serial}` is already recorded for item `{item}`")]
    DuplicateSerial { item: ItemName, serial: SerialNumber },
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("item name must not be empty")]
    EmptyItemName,
    #[error("item `{0}` does not exist")]
    ItemNotFound(ItemName),
    #[error("serial `{serial}` does not exist for item `{item}`")]
    SerialNotFound { item: ItemName, serial: SerialNumber },
    #[error("cannot {} {requested} of `{item}`: only {available} in stock", operation.verb())]
    InsufficientStock {
        item: ItemName,
        operation: StockOperation,
        requested: u32,
        available: u32,
    },
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SerialCountMismatch { .. }
            | Self::DuplicateSerial { .. }
            | Self::InvalidQuantity
            | Self::EmptyItemName => ErrorKind::Validation,
            Self::ItemNotFound(_) | Self::SerialNotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
        }
    }
}
