//! In-memory stock ledger keyed by item name.
//!
//! Items are kept in insertion order and disappear as soon as their last unit
//! leaves. Every mutating operation validates completely before it touches
//! any state, so a rejected command leaves the inventory exactly as it was.

use serde::{Deserialize, Serialize};

use crate::domain::item::{InventoryItem, ItemName, SerialNumber};
use crate::errors::{InventoryError, StockOperation};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InventoryPolicy {
    pub enforce_unique_serials: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub item: ItemName,
    pub quantity: u32,
    pub serials: Vec<SerialNumber>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockReport {
    Empty,
    Items(Vec<InventoryItem>),
}

#[derive(Clone, Debug, Default)]
pub struct Inventory {
    items: Vec<InventoryItem>,
    policy: InventoryPolicy,
}

impl Inventory {
    pub fn new(policy: InventoryPolicy) -> Self {
        Self { items: Vec::new(), policy }
    }

    pub fn policy(&self) -> InventoryPolicy {
        self.policy
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn unit_count(&self) -> usize {
        self.items.iter().map(|item| item.serial_numbers.len()).sum()
    }

    pub fn get(&self, name: &ItemName) -> Option<&InventoryItem> {
        self.items.iter().find(|item| &item.name == name)
    }

    pub fn check(&self) -> StockReport {
        if self.items.is_empty() {
            StockReport::Empty
        } else {
            StockReport::Items(self.items.clone())
        }
    }

    pub fn add(
        &mut self,
        name: ItemName,
        quantity: u32,
        serials: Vec<SerialNumber>,
    ) -> Result<StockMovement, InventoryError> {
        ensure_positive(quantity)?;
        ensure_count_matches(quantity, &serials)?;

        let position = self.position(&name);
        if self.policy.enforce_unique_serials {
            ensure_unique(&name, position.map(|index| &self.items[index]), &serials)?;
        }

        match position {
            Some(index) => self.items[index].serial_numbers.extend(serials.iter().cloned()),
            None => self.items.push(InventoryItem {
                name: name.clone(),
                serial_numbers: serials.clone(),
            }),
        }

        Ok(StockMovement { item: name, quantity, serials })
    }

    pub fn remove(
        &mut self,
        name: &ItemName,
        quantity: u32,
        serials: Vec<SerialNumber>,
    ) -> Result<StockMovement, InventoryError> {
        ensure_positive(quantity)?;
        let index = self.position(name).ok_or_else(|| InventoryError::ItemNotFound(name.clone()))?;
        ensure_count_matches(quantity, &serials)?;
        ensure_available(&self.items[index], StockOperation::Remove, quantity)?;

        // Work on a copy so a missing serial late in the list cannot leave a
        // partial removal behind. A serial listed twice must be stocked twice.
        let mut remaining = self.items[index].serial_numbers.clone();
        for serial in &serials {
            let Some(found) = remaining.iter().position(|candidate| candidate == serial) else {
                return Err(InventoryError::SerialNotFound {
                    item: name.clone(),
                    serial: serial.clone(),
                });
            };
            remaining.remove(found);
        }

        self.commit(index, remaining);
        Ok(StockMovement { item: name.clone(), quantity, serials })
    }

    /// Ships the oldest `quantity` serials of an item.
    pub fn ship(&mut self, name: &ItemName, quantity: u32) -> Result<StockMovement, InventoryError> {
        ensure_positive(quantity)?;
        let index = self.position(name).ok_or_else(|| InventoryError::ItemNotFound(name.clone()))?;
        ensure_available(&self.items[index], StockOperation::Ship, quantity)?;

        let mut remaining = self.items[index].serial_numbers.clone();
        let shipped = remaining.drain(..quantity as usize).collect::<Vec<_>>();

        self.commit(index, remaining);
        Ok(StockMovement { item: name.clone(), quantity, serials: shipped })
    }

    fn position(&self, name: &ItemName) -> Option<usize> {
        self.items.iter().position(|item| &item.name == name)
    }

    fn commit(&mut self, index: usize, remaining: Vec<SerialNumber>) {
        if remaining.is_empty() {
            self.items.remove(index);
        } else {
            self.items[index].serial_numbers = remaining;
        }
    }
}

fn ensure_positive(quantity: u32) -> Result<(), InventoryError> {
    if quantity == 0 {
        return Err(InventoryError::InvalidQuantity);
    }
    Ok(())
}

fn ensure_count_matches(quantity: u32, serials: &[SerialNumber]) -> Result<(), InventoryError> {
    if serials.len() != quantity as usize {
        return Err(InventoryError::SerialCountMismatch { quantity, serials: serials.len() });
    }
    Ok(())
}

fn ensure_available(
    item: &InventoryItem,
    operation: StockOperation,
    requested: u32,
) -> Result<(), InventoryError> {
    let available = item.quantity();
    if requested > available {
        return Err(InventoryError::InsufficientStock {
            item: item.name.clone(),
            operation,
            requested,
            available,
        });
    }
    Ok(())
}

fn ensure_unique(
    name: &ItemName,
    existing: Option<&InventoryItem>,
    incoming: &[SerialNumber],
) -> Result<(), InventoryError> {
    for (offset, serial) in incoming.iter().enumerate() {
        let repeated_in_request = incoming[..offset].contains(serial);
        let already_stocked = existing.is_some_and(|item| item.contains_serial(serial));
        if repeated_in_request || already_stocked {
            return Err(InventoryError::DuplicateSerial {
                item: name.clone(),
                serial: serial.clone(),
            });
        }
    }
    Ok(())
}
