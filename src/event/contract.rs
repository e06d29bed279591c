//! Event Contract
//!
//! Operations of the event module. Each one loads the event, applies the
//! change through the model and writes it back; the host guarantees that a
//! concurrent transaction touching the same event is rejected at commit.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::contract::{expect_args, parse_uuid, to_payload, Contract, TxContext};
use crate::domain::{ContractError, TicketPrice};

use super::list::EventList;
use super::model::{Event, EventStatus, Section};
use super::notifier::{Notifier, StubNotifier};

pub const CREATE: &str = "Create";
pub const ADD_SECTION: &str = "AddSection";
pub const SELL: &str = "Sell";
pub const SET_ON_SALE: &str = "SetOnSale";
pub const START: &str = "Start";
pub const FINISH: &str = "Finish";
pub const SELL_TICKET: &str = "SellTicket";
pub const GET_EVENT: &str = "GetEvent";
pub const EVENT_EXISTS: &str = "EventExists";
pub const IS_AVAILABLE: &str = "IsAvailable";

/// The event module
pub struct EventContract {
    name: String,
    ticket_module: String,
    events: EventList,
    notifier: Arc<dyn Notifier>,
}

impl EventContract {
    /// `ticket_module` is the only module allowed to count sold tickets
    pub fn new(name: impl Into<String>, ticket_module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticket_module: ticket_module.into(),
            events: EventList,
            notifier: Arc::new(StubNotifier),
        }
    }

    /// Replace the notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Create a draft event owned by the caller
    pub fn create(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        name: &str,
        date: &str,
    ) -> Result<Event, ContractError> {
        let event_id = parse_uuid("event_id", event_id)?;
        let date = parse_date(date)?;

        let event = Event::new(event_id, name, date, ctx.caller)?;
        self.events.add(ctx.stub, &event)?;

        if let Err(err) = self.notifier.notify_event_creation(ctx.stub, &event) {
            tracing::warn!(
                event_id = %event_id,
                error = %err,
                "Event creation notification failed"
            );
        }

        tracing::info!(
            event_id = %event_id,
            organizer = %ctx.caller,
            "Event created"
        );

        Ok(event)
    }

    /// Add a section to a draft event
    pub fn add_section(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        name: &str,
        total_tickets: &str,
        ticket_price: &str,
    ) -> Result<Section, ContractError> {
        let event_id = parse_uuid("event_id", event_id)?;
        let total_tickets = parse_total_tickets(total_tickets)?;
        let ticket_price: TicketPrice = ticket_price
            .parse()
            .map_err(|e| ContractError::InvalidArgument(format!("{}", e)))?;

        let mut event = self.events.get(ctx.stub, event_id)?;
        let section = event.add_section(name, total_tickets, ticket_price)?.clone();
        self.events.update(ctx.stub, &event)?;

        if let Err(err) =
            self.notifier
                .notify_section_addition(ctx.stub, &section, &event_id.to_string())
        {
            tracing::warn!(event_id = %event_id, error = %err, "Section notification failed");
        }

        tracing::info!(
            event_id = %event_id,
            section = %section.name(),
            total_tickets = section.total_tickets(),
            ticket_price = %section.ticket_price(),
            "Section added"
        );

        Ok(section)
    }

    /// Open ticket sales
    pub fn set_on_sale(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
    ) -> Result<(), ContractError> {
        self.transition(ctx, event_id, EventStatus::OnSale)
    }

    pub fn start(&self, ctx: &mut TxContext<'_>, event_id: &str) -> Result<(), ContractError> {
        self.transition(ctx, event_id, EventStatus::Running)
    }

    pub fn finish(&self, ctx: &mut TxContext<'_>, event_id: &str) -> Result<(), ContractError> {
        self.transition(ctx, event_id, EventStatus::Finished)
    }

    /// Count one sold ticket against a section. Only the ticket module may call
    /// this, from inside the transaction that creates the ticket.
    pub fn sell_ticket(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        section: &str,
    ) -> Result<(), ContractError> {
        if ctx.stub.calling_module() != Some(self.ticket_module.as_str()) {
            return Err(ContractError::PermissionDenied(format!(
                "{} can only be invoked by module {}",
                SELL_TICKET, self.ticket_module
            )));
        }

        let event_id = parse_uuid("event_id", event_id)?;

        let mut event = self.events.get(ctx.stub, event_id)?;
        let sold = event.sell_ticket_in_section(section)?;
        let (sold_tickets, total_tickets) = (sold.sold_tickets(), sold.total_tickets());
        self.events.update(ctx.stub, &event)?;

        tracing::debug!(
            event_id = %event_id,
            section = %section.trim(),
            sold_tickets,
            total_tickets,
            "Ticket sold"
        );

        Ok(())
    }

    pub fn get_event(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
    ) -> Result<Event, ContractError> {
        let event_id = parse_uuid("event_id", event_id)?;
        self.events.get(ctx.stub, event_id)
    }

    pub fn event_exists(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
    ) -> Result<bool, ContractError> {
        let event_id = parse_uuid("event_id", event_id)?;
        self.events.exists(ctx.stub, event_id)
    }

    /// Check if a ticket of `section` can be sold now. A missing section is not an error.
    pub fn is_available(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        section: &str,
    ) -> Result<bool, ContractError> {
        let event_id = parse_uuid("event_id", event_id)?;
        let event = self.events.get(ctx.stub, event_id)?;
        Ok(event.is_available(section))
    }

    fn transition(
        &self,
        ctx: &mut TxContext<'_>,
        event_id: &str,
        target: EventStatus,
    ) -> Result<(), ContractError> {
        let event_id = parse_uuid("event_id", event_id)?;

        let mut event = self.events.get(ctx.stub, event_id)?;
        let from = event.status();
        event.advance_to(target)?;
        self.events.update(ctx.stub, &event)?;

        tracing::info!(
            event_id = %event_id,
            from = %from,
            to = %target,
            "Event status changed"
        );

        Ok(())
    }
}

impl Contract for EventContract {
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
            CREATE => {
                let [event_id, name, date] = expect_args::<3>(function, args)?;
                to_payload(&self.create(ctx, event_id, name, date)?)
            }
            ADD_SECTION => {
                let [event_id, name, total_tickets, ticket_price] =
                    expect_args::<4>(function, args)?;
                to_payload(&self.add_section(ctx, event_id, name, total_tickets, ticket_price)?)
            }
            SELL | SET_ON_SALE => {
                let [event_id] = expect_args::<1>(function, args)?;
                self.set_on_sale(ctx, event_id)?;
                Ok(Vec::new())
            }
            START => {
                let [event_id] = expect_args::<1>(function, args)?;
                self.start(ctx, event_id)?;
                Ok(Vec::new())
            }
            FINISH => {
                let [event_id] = expect_args::<1>(function, args)?;
                self.finish(ctx, event_id)?;
                Ok(Vec::new())
            }
            SELL_TICKET => {
                let [event_id, section] = expect_args::<2>(function, args)?;
                self.sell_ticket(ctx, event_id, section)?;
                Ok(Vec::new())
            }
            GET_EVENT => {
                let [event_id] = expect_args::<1>(function, args)?;
                to_payload(&self.get_event(ctx, event_id)?)
            }
            EVENT_EXISTS => {
                let [event_id] = expect_args::<1>(function, args)?;
                to_payload(&self.event_exists(ctx, event_id)?)
            }
            IS_AVAILABLE => {
                let [event_id, section] = expect_args::<2>(function, args)?;
                to_payload(&self.is_available(ctx, event_id, section)?)
            }
            other => Err(ContractError::InvalidArgument(format!(
                "unknown function {}",
                other
            ))),
        }
    }
}

fn parse_date(date: &str) -> Result<DateTime<Utc>, ContractError> {
    DateTime::parse_from_rfc3339(date.trim())
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| ContractError::InvalidArgument(format!("invalid date {:?}: {}", date, e)))
}

fn parse_total_tickets(value: &str) -> Result<u32, ContractError> {
    let total: i64 = value.trim().parse().map_err(|_| {
        ContractError::InvalidArgument(format!("total tickets {:?} is not an integer", value))
    })?;

    if total <= 0 {
        return Err(ContractError::InvalidArgument(
            "total tickets must be greater than 0".to_string(),
        ));
    }

    u32::try_from(total).map_err(|_| {
        ContractError::InvalidArgument(format!("total tickets {} is too large", total))
    })
}
