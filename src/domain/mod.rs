//! Domain module
//!
//! Domain primitives shared by the contract modules.

pub mod error;
pub mod identity;
pub mod price;

pub use error::{ContractError, ErrorKind};
pub use identity::ClientIdentity;
pub use price::{PriceError, TicketPrice};
