//! Ticket module
//!
//! Owns tickets: issuance against event capacity, signing by the owner and
//! scanning at the door.

pub mod contract;
pub mod invoker;
pub mod list;
pub mod model;

pub use contract::TicketContract;
pub use invoker::EventInvoker;
pub use list::TicketList;
pub use model::{IssuePayload, Ticket, TicketStatus};
