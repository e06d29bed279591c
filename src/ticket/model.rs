//! Ticket Model

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::parse_uuid;
use crate::domain::{ClientIdentity, ContractError};
use crate::store::State;

/// Ticket status: Issued -> Signed -> Scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TicketStatus {
    #[default]
    Issued,
    Signed,
    Scanned,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TicketStatus::Issued => "Issued",
            TicketStatus::Signed => "Signed",
            TicketStatus::Scanned => "Scanned",
        };
        f.write_str(name)
    }
}

/// Ticket entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    ticket_id: Uuid,
    event_id: Uuid,
    section: String,
    owner_id: Uuid,
    #[serde(default)]
    status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
}

impl Ticket {
    pub fn ticket_id(&self) -> Uuid {
        self.ticket_id
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn status(&self) -> TicketStatus {
        self.status
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Check if `caller` is the ticket owner
    pub fn is_owned_by(&self, caller: &ClientIdentity) -> bool {
        Uuid::parse_str(caller.username.trim()).is_ok_and(|id| id == self.owner_id)
    }

    /// Sign the ticket on behalf of its owner
    pub fn sign(&mut self, signer: &ClientIdentity, signature: &str) -> Result<(), ContractError> {
        if self.status != TicketStatus::Issued {
            return Err(ContractError::InvalidState(
                "ticket is not allowed to be signed".to_string(),
            ));
        }

        if !self.is_owned_by(signer) {
            return Err(ContractError::PermissionDenied(format!(
                "ticket {} does not belong to {}",
                self.ticket_id, signer.username
            )));
        }

        let signature = signature.trim();
        if signature.is_empty() {
            return Err(ContractError::InvalidArgument(
                "ticket signature must not be empty".to_string(),
            ));
        }

        self.signature = Some(signature.to_string());
        self.status = TicketStatus::Signed;
        Ok(())
    }

    /// Mark a signed ticket as used
    pub fn scan(&mut self) -> Result<(), ContractError> {
        match self.status {
            TicketStatus::Scanned => Err(ContractError::InvalidState(
                "ticket is already scanned".to_string(),
            )),
            TicketStatus::Issued => Err(ContractError::InvalidState(
                "ticket is not signed".to_string(),
            )),
            TicketStatus::Signed => {
                self.status = TicketStatus::Scanned;
                Ok(())
            }
        }
    }
}

impl State for Ticket {
    fn key_parts(&self) -> Vec<String> {
        vec![self.event_id.to_string(), self.ticket_id.to_string()]
    }
}

/// Raw input of a ticket issuance
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssuePayload {
    pub ticket_id: String,
    pub event_id: String,
    pub section: String,
    pub owner_id: String,
}

impl IssuePayload {
    pub fn new(ticket_id: &str, event_id: &str, section: &str, owner_id: &str) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            event_id: event_id.to_string(),
            section: section.to_string(),
            owner_id: owner_id.to_string(),
        }
    }

    /// Trim every field
    pub fn sanitize(&mut self) {
        for field in [
            &mut self.ticket_id,
            &mut self.event_id,
            &mut self.section,
            &mut self.owner_id,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
    }

    /// Validate the payload and build the ticket it describes, in `Issued` status
    pub fn into_ticket(mut self) -> Result<Ticket, ContractError> {
        self.sanitize();

        let ticket_id = parse_uuid("ticket_id", &self.ticket_id)?;
        let event_id = parse_uuid("event_id", &self.event_id)?;
        let owner_id = parse_uuid("owner_id", &self.owner_id)?;
        if self.section.is_empty() {
            return Err(ContractError::InvalidArgument(
                "section is mandatory".to_string(),
            ));
        }

        Ok(Ticket {
            ticket_id,
            event_id,
            section: self.section,
            owner_id,
            status: TicketStatus::Issued,
            signature: None,
        })
    }
}
