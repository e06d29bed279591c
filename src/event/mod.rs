//! Event module
//!
//! Owns events and their sections: creation, section registration, the sale
//! lifecycle and section capacity accounting.

pub mod contract;
pub mod list;
pub mod model;
pub mod notifier;

pub use contract::EventContract;
pub use list::EventList;
pub use model::{Event, EventStatus, Section};
pub use notifier::{Notifier, StubNotifier};
