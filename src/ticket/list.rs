//! Ticket List
//!
//! Each ticket is stored twice, in the same transaction: under its primary
//! composite key `ticket(event_id, ticket_id)` and under the section index
//! `event~section~ticket(event_id, section, ticket_id)`. Every write goes
//! through [`TicketList`] so the two entries never diverge.

use uuid::Uuid;

use crate::domain::ContractError;
use crate::ledger::LedgerStub;
use crate::store::EntityStore;

use super::model::Ticket;

/// Object type of primary ticket keys
pub const TICKET_OBJECT_TYPE: &str = "ticket";

/// Object type of the section index
pub const SECTION_INDEX: &str = "event~section~ticket";

const TICKETS: EntityStore<Ticket> =
    EntityStore::composite("ticken.ticket.ticketList", TICKET_OBJECT_TYPE);

/// Typed access to stored tickets
#[derive(Debug, Default, Clone, Copy)]
pub struct TicketList;

impl TicketList {
    /// Fail with Conflict if `(event_id, ticket_id)` is already issued
    pub fn ensure_absent(
        &self,
        stub: &mut dyn LedgerStub,
        event_id: Uuid,
        ticket_id: Uuid,
    ) -> Result<(), ContractError> {
        if TICKETS.exists(stub, &[&event_id.to_string(), &ticket_id.to_string()])? {
            return Err(already_issued(event_id, ticket_id));
        }
        Ok(())
    }

    /// Write a ticket, primary and index entries together
    pub fn save(&self, stub: &mut dyn LedgerStub, ticket: &Ticket) -> Result<(), ContractError> {
        let event_id = ticket.event_id().to_string();
        let ticket_id = ticket.ticket_id().to_string();
        TICKETS.put_with_index(
            stub,
            ticket,
            SECTION_INDEX,
            &[&event_id, ticket.section(), &ticket_id],
        )?;
        Ok(())
    }

    /// Load a ticket by its primary key
    pub fn get(
        &self,
        stub: &mut dyn LedgerStub,
        event_id: Uuid,
        ticket_id: Uuid,
    ) -> Result<Ticket, ContractError> {
        TICKETS
            .get(stub, &[&event_id.to_string(), &ticket_id.to_string()])?
            .ok_or_else(|| {
                ContractError::NotFound(format!(
                    "ticket {} not found for event {}",
                    ticket_id, event_id
                ))
            })
    }

    /// Find a ticket by id alone, across all events
    pub fn find_by_ticket_id(
        &self,
        stub: &mut dyn LedgerStub,
        ticket_id: Uuid,
    ) -> Result<Ticket, ContractError> {
        let mut matches: Vec<Ticket> = TICKETS
            .scan(stub, TICKET_OBJECT_TYPE, &[])?
            .into_iter()
            .filter(|ticket| ticket.ticket_id() == ticket_id)
            .collect();

        match matches.len() {
            0 => Err(ContractError::NotFound(format!(
                "ticket {} not found",
                ticket_id
            ))),
            1 => Ok(matches.remove(0)),
            n => Err(ContractError::Conflict(format!(
                "ticket id {} is ambiguous ({} events); pass the event id",
                ticket_id, n
            ))),
        }
    }

    /// All tickets of one section of one event, via the section index
    pub fn section_tickets(
        &self,
        stub: &mut dyn LedgerStub,
        event_id: Uuid,
        section: &str,
    ) -> Result<Vec<Ticket>, ContractError> {
        Ok(TICKETS.scan(stub, SECTION_INDEX, &[&event_id.to_string(), section])?)
    }
}

fn already_issued(event_id: Uuid, ticket_id: Uuid) -> ContractError {
    ContractError::Conflict(format!(
        "ticket {} already exists for event {}",
        ticket_id, event_id
    ))
}
