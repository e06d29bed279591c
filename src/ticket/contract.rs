//! Ticket Contract
//!
//! Operations of the ticket module. Issuance takes a seat from the event
//! module first and only then writes the ticket; both happen in the caller's
//! transaction, so a failed sale leaves no ticket behind and a ticket never
//! exists without its seat.

use uuid::Uuid;

use crate::contract::{expect_args, parse_uuid, to_payload, Contract, TxContext};
use crate::domain::ContractError;

use super::invoker::EventInvoker;
use super::list::TicketList;
use super::model::{IssuePayload, Ticket};

pub const ISSUE: &str = "Issue";
pub const SIGN: &str = "Sign";
pub const SCAN: &str = "Scan";
pub const GET_TICKET: &str = "GetTicket";
pub const GET_SECTION_TICKETS: &str = "GetSectionTickets";

/// The ticket module
pub struct TicketContract {
    name: String,
    tickets: TicketList,
    events: EventInvoker,
}

impl TicketContract {
    /// `event_module` is the name the event module is deployed under
    pub fn new(name: impl Into<String>, event_module: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            events: EventInvoker::new(name.clone(), event_module),
            name,
            tickets: TicketList,
        }
    }

    /// Issue a ticket for a seat of `section`
    pub fn issue(
        &self,
        ctx: &mut TxContext<'_>,
        payload: IssuePayload,
    ) -> Result<Ticket, ContractError> {
        let ticket = payload.into_ticket()?;

        // before the sale: a duplicate must not take a seat
        self.tickets
            .ensure_absent(ctx.stub, ticket.event_id(), ticket.ticket_id())?;

        self.events
            .sell_ticket(ctx.stub, &ticket.event_id().to_string(), ticket.section())?;

        self.tickets.save(ctx.stub, &ticket)?;

        tracing::info!(
            ticket_id = %ticket.ticket_id(),
            event_id = %ticket.event_id(),
            section = %ticket.section(),
            "Ticket issued"
        );

        Ok(ticket)
    }

    /// Sign a ticket; only its owner may
    pub fn sign(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        ticket_id: &str,
        signature: &str,
    ) -> Result<Ticket, ContractError> {
        let mut ticket = self.load(ctx, event_id, ticket_id)?;
        ticket.sign(ctx.caller, signature)?;
        self.tickets.save(ctx.stub, &ticket)?;

        tracing::info!(ticket_id = %ticket.ticket_id(), signer = %ctx.caller, "Ticket signed");
        Ok(ticket)
    }

    /// Validate a signed ticket at the door
    pub fn scan(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        ticket_id: &str,
    ) -> Result<Ticket, ContractError> {
        let mut ticket = self.load(ctx, event_id, ticket_id)?;
        ticket.scan()?;
        self.tickets.save(ctx.stub, &ticket)?;

        tracing::info!(ticket_id = %ticket.ticket_id(), "Ticket scanned");
        Ok(ticket)
    }

    /// Load a ticket by `(event_id, ticket_id)`
    pub fn get_ticket(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        ticket_id: &str,
    ) -> Result<Ticket, ContractError> {
        self.load(ctx, event_id, ticket_id)
    }

    /// Load a ticket by its id alone
    pub fn find_ticket(
        &self,
        ctx: &mut TxContext<'_>,
        ticket_id: &str,
    ) -> Result<Ticket, ContractError> {
        let ticket_id = parse_uuid("ticket_id", ticket_id)?;
        self.tickets.find_by_ticket_id(ctx.stub, ticket_id)
    }

    /// Every ticket issued for one section of an event
    pub fn get_section_tickets(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        section: &str,
    ) -> Result<Vec<Ticket>, ContractError> {
        let event_id = parse_uuid("event_id", event_id)?;
        let section = section.trim();
        if section.is_empty() {
            return Err(ContractError::InvalidArgument(
                "section is mandatory".to_string(),
            ));
        }
        self.tickets.section_tickets(ctx.stub, event_id, section)
    }

    fn load(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        ticket_id: &str,
    ) -> Result<Ticket, ContractError> {
        let event_id: Uuid = parse_uuid("event_id", event_id)?;
        let ticket_id: Uuid = parse_uuid("ticket_id", ticket_id)?;
        self.tickets.get(ctx.stub, event_id, ticket_id)
    }
}

impl Contract for TicketContract {
    fn name(&self) -> &str {
        &self.name
    }

    fn route(
        &self,
        ctx: &mut TxContext<'_>,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        match function {
            ISSUE => {
                let [ticket_id, event_id, section, owner_id] = expect_args::<4>(function, args)?;
                let payload = IssuePayload::new(ticket_id, event_id, section, owner_id);
                to_payload(&self.issue(ctx, payload)?)
            }
            SIGN => {
                let [event_id, ticket_id, signature] = expect_args::<3>(function, args)?;
                to_payload(&self.sign(ctx, event_id, ticket_id, signature)?)
            }
            SCAN => {
                let [event_id, ticket_id] = expect_args::<2>(function, args)?;
                to_payload(&self.scan(ctx, event_id, ticket_id)?)
            }
            GET_TICKET if args.len() == 1 => {
                let [ticket_id] = expect_args::<1>(function, args)?;
                to_payload(&self.find_ticket(ctx, ticket_id)?)
            }
            GET_TICKET => {
                let [event_id, ticket_id] = expect_args::<2>(function, args)?;
                to_payload(&self.get_ticket(ctx, event_id, ticket_id)?)
            }
            GET_SECTION_TICKETS => {
                let [event_id, section] = expect_args::<2>(function, args)?;
                to_payload(&self.get_section_tickets(ctx, event_id, section)?)
            }
            other => Err(ContractError::InvalidArgument(format!(
                "unknown function {}",
                other
            ))),
        }
    }
}
