//! Event module invoker
//!
//! Typed calls from the ticket module into the event module.

use crate::contract::Invoker;
use crate::domain::ContractError;
use crate::event::contract::SELL_TICKET;
use crate::ledger::LedgerStub;

#[derive(Debug, Clone)]
pub struct EventInvoker {
    invoker: Invoker,
}

impl EventInvoker {
    /// `caller` is the ticket module's deployed name, `event_module` the event module's
    pub fn new(caller: impl Into<String>, event_module: impl Into<String>) -> Self {
        Self {
            invoker: Invoker::new(caller, event_module),
        }
    }

    /// Take one seat of `section` in the event's capacity
    pub fn sell_ticket(
        &self,
        stub: &mut dyn LedgerStub,
        event_id: &str,
        section: &str,
    ) -> Result<(), ContractError> {
        self.invoker
            .invoke(stub, SELL_TICKET, &[event_id, section])
            .map(|_| ())
    }
}
