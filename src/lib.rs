//! ticken_ledger Library
//!
//! Event and ticket contract modules on a versioned transactional key-value
//! ledger, plus the in-process ledger host and its HTTP gateway.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
mod error;
pub mod event;
pub mod ledger;
pub mod store;
pub mod ticket;

pub use config::{Config, LogFormat};
pub use domain::{ClientIdentity, ContractError, ErrorKind, TicketPrice};
pub use error::{AppError, AppResult};
pub use event::EventContract;
pub use ledger::{Ledger, NotificationSink, Response, SubmitError, TxReceipt};
pub use ticket::TicketContract;

/// Deploy the event and ticket modules on a new ledger, named as in `config`
pub fn build_ledger(config: &Config, sink: Arc<dyn NotificationSink>) -> Ledger {
    Ledger::builder(config.channel_id.clone())
        .deploy(
            config.event_module_name.clone(),
            Arc::new(EventContract::new(
                config.event_module_name.clone(),
                config.ticket_module_name.clone(),
            )),
        )
        .deploy(
            config.ticket_module_name.clone(),
            Arc::new(TicketContract::new(
                config.ticket_module_name.clone(),
                config.event_module_name.clone(),
            )),
        )
        .with_sink(sink)
        .build()
}
