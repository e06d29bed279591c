//! Event Model
//!
//! Event is the root entity of the event module. Sections live inside their
//! event and are only reachable through it. All rules about section capacity
//! and the sale lifecycle are enforced here; the contract only loads, calls and
//! saves.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ClientIdentity, ContractError, TicketPrice};
use crate::store::State;

/// Event lifecycle status. Moves forward one step at a time, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventStatus {
    #[default]
    Draft,
    OnSale,
    Running,
    Finished,
}

impl EventStatus {
    /// The only status this one may advance to
    pub fn next(self) -> Option<Self> {
        match self {
            EventStatus::Draft => Some(EventStatus::OnSale),
            EventStatus::OnSale => Some(EventStatus::Running),
            EventStatus::Running => Some(EventStatus::Finished),
            EventStatus::Finished => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventStatus::Draft => "Draft",
            EventStatus::OnSale => "OnSale",
            EventStatus::Running => "Running",
            EventStatus::Finished => "Finished",
        };
        f.write_str(name)
    }
}

/// A priced, capacity-limited part of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    name: String,
    ticket_price: TicketPrice,
    total_tickets: u32,
    sold_tickets: u32,
}

impl Section {
    fn new(name: String, total_tickets: u32, ticket_price: TicketPrice) -> Self {
        Self {
            name,
            ticket_price,
            total_tickets,
            sold_tickets: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ticket_price(&self) -> TicketPrice {
        self.ticket_price
    }

    pub fn total_tickets(&self) -> u32 {
        self.total_tickets
    }

    pub fn sold_tickets(&self) -> u32 {
        self.sold_tickets
    }

    pub fn remaining_tickets(&self) -> u32 {
        self.total_tickets.saturating_sub(self.sold_tickets)
    }

    pub fn is_available(&self) -> bool {
        self.remaining_tickets() > 0
    }

    fn sell_ticket(&mut self) -> Result<(), ContractError> {
        if !self.is_available() {
            return Err(ContractError::Conflict(format!(
                "section {} is full",
                self.name
            )));
        }
        self.sold_tickets += 1;
        Ok(())
    }
}

/// Event entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    event_id: Uuid,
    name: String,
    date: DateTime<Utc>,
    #[serde(default)]
    status: EventStatus,
    sections: Vec<Section>,

    /// Identity that created the event
    organizer_msp_id: String,
    organizer_username: String,
}

impl Event {
    /// Create a draft event with no sections, owned by `organizer`
    pub fn new(
        event_id: Uuid,
        name: &str,
        date: DateTime<Utc>,
        organizer: &ClientIdentity,
    ) -> Result<Self, ContractError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContractError::InvalidArgument(
                "event name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            event_id,
            name: name.to_string(),
            date,
            status: EventStatus::Draft,
            sections: Vec::new(),
            organizer_msp_id: organizer.msp_id.clone(),
            organizer_username: organizer.username.clone(),
        })
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn organizer_msp_id(&self) -> &str {
        &self.organizer_msp_id
    }

    pub fn organizer_username(&self) -> &str {
        &self.organizer_username
    }

    /// Look up a section by name
    pub fn section(&self, name: &str) -> Option<&Section> {
        let name = name.trim();
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Check if a ticket of `section` could be sold right now
    pub fn is_available(&self, section: &str) -> bool {
        self.status == EventStatus::OnSale
            && self.section(section).is_some_and(Section::is_available)
    }

    /// Register a new section. Only allowed while the event is a draft.
    pub fn add_section(
        &mut self,
        name: &str,
        total_tickets: u32,
        ticket_price: TicketPrice,
    ) -> Result<&Section, ContractError> {
        if self.status != EventStatus::Draft {
            return Err(ContractError::InvalidState(format!(
                "sections can only be added to a Draft event (event {} is {})",
                self.event_id, self.status
            )));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(ContractError::InvalidArgument(
                "section name must not be empty".to_string(),
            ));
        }
        if total_tickets == 0 {
            return Err(ContractError::InvalidArgument(
                "total tickets must be greater than 0".to_string(),
            ));
        }
        if self.has_section(name) {
            return Err(ContractError::Conflict(format!(
                "section {} already exists in event {}",
                name, self.event_id
            )));
        }

        self.sections
            .push(Section::new(name.to_string(), total_tickets, ticket_price));

        let added = self.sections.len() - 1;
        Ok(&self.sections[added])
    }

    /// Advance the lifecycle to `target`, which must be exactly the next status
    pub fn advance_to(&mut self, target: EventStatus) -> Result<(), ContractError> {
        if self.status.next() != Some(target) {
            return Err(ContractError::InvalidState(format!(
                "event {} cannot move from {} to {}",
                self.event_id, self.status, target
            )));
        }
        self.status = target;
        Ok(())
    }

    /// Sell one ticket of `section`, enforcing the section's capacity
    pub fn sell_ticket_in_section(&mut self, section: &str) -> Result<&Section, ContractError> {
        if self.status != EventStatus::OnSale {
            return Err(ContractError::InvalidState(format!(
                "event {} is not on sale (status {})",
                self.event_id, self.status
            )));
        }

        let event_id = self.event_id;
        let name = section.trim();
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| {
                ContractError::NotFound(format!(
                    "section {} does not exist in event {}",
                    name, event_id
                ))
            })?;

        section.sell_ticket()?;
        Ok(&*section)
    }
}

impl State for Event {
    fn key_parts(&self) -> Vec<String> {
        vec![self.event_id.to_string()]
    }
}
