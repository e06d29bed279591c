//! Event notifications
//!
//! Domain notifications of the event module, staged on the ledger stub and
//! delivered by the host once the transaction commits.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::ContractError;
use crate::ledger::LedgerStub;

use super::model::{Event, Section};

pub const EVENT_CREATED: &str = "event-created";
pub const SECTION_ADDED: &str = "section-added";

/// Payload of [`EVENT_CREATED`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCreatedDto {
    pub event_id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub msp_id: String,
    pub organizer_username: String,
}

impl From<&Event> for EventCreatedDto {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.event_id().to_string(),
            name: event.name().to_string(),
            date: event.date(),
            msp_id: event.organizer_msp_id().to_string(),
            organizer_username: event.organizer_username().to_string(),
        }
    }
}

/// Payload of [`SECTION_ADDED`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionAddedDto {
    pub event_id: String,
    pub name: String,
    pub ticket_price: String,
    pub total_tickets: u32,
    pub sold_tickets: u32,
}

impl SectionAddedDto {
    pub fn new(section: &Section, event_id: &str) -> Self {
        Self {
            event_id: event_id.to_string(),
            name: section.name().to_string(),
            ticket_price: section.ticket_price().to_string(),
            total_tickets: section.total_tickets(),
            sold_tickets: section.sold_tickets(),
        }
    }
}

/// Publishes event module notifications
pub trait Notifier: Send + Sync {
    fn notify_event_creation(
        &self,
        stub: &mut dyn LedgerStub,
        event: &Event,
    ) -> Result<(), ContractError>;

    fn notify_section_addition(
        &self,
        stub: &mut dyn LedgerStub,
        section: &Section,
        event_id: &str,
    ) -> Result<(), ContractError>;
}

/// Notifier that stages notifications as ledger events
#[derive(Debug, Default, Clone, Copy)]
pub struct StubNotifier;

impl Notifier for StubNotifier {
    fn notify_event_creation(
        &self,
        stub: &mut dyn LedgerStub,
        event: &Event,
    ) -> Result<(), ContractError> {
        let payload = serde_json::to_vec(&EventCreatedDto::from(event))?;
        stub.set_event(EVENT_CREATED, payload)?;
        Ok(())
    }

    fn notify_section_addition(
        &self,
        stub: &mut dyn LedgerStub,
        section: &Section,
        event_id: &str,
    ) -> Result<(), ContractError> {
        let payload = serde_json::to_vec(&SectionAddedDto::new(section, event_id))?;
        stub.set_event(SECTION_ADDED, payload)?;
        Ok(())
    }
}
