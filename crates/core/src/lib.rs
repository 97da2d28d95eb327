//! Bookstore domain core: catalog data, the purchase journey state machine,
//! glossary facts, audit events, error taxonomy and configuration.
//!
//! Everything here is deterministic. The agent crate drives these types from
//! customer messages; nothing in this crate talks to the network.

pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod glossary;
pub mod inventory;
pub mod journey;
pub mod text;

pub use domain::book::{Book, StockStatus};
pub use domain::order::OrderConfirmation;
pub use domain::session::SessionId;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use glossary::{Glossary, GlossaryTerm};
pub use inventory::{Inventory, StaticInventory};
pub use journey::{JourneyEngine, JourneyState, PurchaseJourney};
