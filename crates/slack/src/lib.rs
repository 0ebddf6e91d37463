//! Slack integration for the stock bot.
//!
//! - **Slash Commands** (`commands`) - `/check_inventory`, `/add_product`,
//!   `/delete_product`, `/ship_product`, parsed into typed requests
//! - **Service** (`service`) - runs those requests against the shared inventory
//! - **Events** (`events`) - routes inbound envelopes to handlers
//! - **Block Kit** (`blocks`) - reply builders (plain fallback text plus blocks)
//! - **Socket Mode** (`socket`) - transport-agnostic event loop with reconnection
//!
//! # Architecture
//!
//! ```text
//! Transport → SocketModeRunner → EventDispatcher → CommandRouter → InventoryService
//!                   ↑                                                    ↓
//!              send_reply  ←──────────────  MessageTemplate  ←───────────┘
//! ```

pub mod blocks;
pub mod commands;
pub mod events;
pub mod service;
pub mod socket;
