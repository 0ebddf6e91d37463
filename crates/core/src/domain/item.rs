use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::InventoryError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemName(pub String);

impl ItemName {
    /// Trims surrounding whitespace and rejects names that end up empty.
    pub fn parse(raw: &str) -> Result<Self, InventoryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InventoryError::EmptyItemName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerialNumber(pub String);

impl SerialNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits a platform-supplied serial list on the literal space character.
///
/// Runs of spaces produce empty tokens on purpose: the count check downstream
/// rejects them instead of silently collapsing the list.
pub fn parse_serial_list(raw: &str) -> Vec<SerialNumber> {
    raw.split(' ').map(|token| SerialNumber(token.to_owned())).collect()
}

pub fn join_serials(serials: &[SerialNumber]) -> String {
    serials.iter().map(SerialNumber::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: ItemName,
    pub serial_numbers: Vec<SerialNumber>,
}

impl InventoryItem {
    pub fn quantity(&self) -> u32 {
        u32::try_from(self.serial_numbers.len()).unwrap_or(u32::MAX)
    }

    pub fn contains_serial(&self, serial: &SerialNumber) -> bool {
        self.serial_numbers.contains(serial)
    }
}

impl fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: quantity {}, serials {}",
            self.name,
            self.quantity(),
            join_serials(&self.serial_numbers)
        )
    }
}
