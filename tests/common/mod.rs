//! Common test utilities
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use ticken_ledger::event::Event;
use ticken_ledger::ledger::{ChaincodeEvent, NotificationSink};
use ticken_ledger::ticket::Ticket;
use ticken_ledger::{build_ledger, ClientIdentity, Config, Ledger, Response, SubmitError, TxReceipt};

pub const EVENT_MODULE: &str = "ticken-event";
pub const TICKET_MODULE: &str = "ticken-ticket";
pub const EVENT_DATE: &str = "2026-12-31T21:00:00Z";

/// Sink that keeps every delivered notification
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<ChaincodeEvent>>,
}

impl RecordingSink {
    pub fn names(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.name.clone())
            .collect()
    }

    pub fn delivered(&self) -> Vec<ChaincodeEvent> {
        self.delivered.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&self, _tx_id: &str, event: &ChaincodeEvent) {
        self.delivered.lock().unwrap().push(event.clone());
    }
}

/// Ledger with both modules deployed under their default names
pub struct Harness {
    pub ledger: Arc<Ledger>,
    pub sink: Arc<RecordingSink>,
    pub organizer: ClientIdentity,
    pub box_office: ClientIdentity,
}

pub fn setup_ledger() -> Harness {
    let sink = Arc::new(RecordingSink::default());
    let ledger = build_ledger(&Config::default(), sink.clone());

    Harness {
        ledger: Arc::new(ledger),
        sink,
        organizer: ClientIdentity::new("Org1MSP", "organizer"),
        box_office: ClientIdentity::new("Org1MSP", "box-office"),
    }
}

pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Harness {
    pub fn submit_event(&self, function: &str, items: &[&str]) -> Result<TxReceipt, SubmitError> {
        self.ledger
            .submit(&self.organizer, EVENT_MODULE, function, &args(items))
    }

    pub fn submit_ticket(
        &self,
        caller: &ClientIdentity,
        function: &str,
        items: &[&str],
    ) -> Result<TxReceipt, SubmitError> {
        self.ledger.submit(caller, TICKET_MODULE, function, &args(items))
    }

    pub fn query(&self, module: &str, function: &str, items: &[&str]) -> Response {
        self.ledger
            .evaluate(&self.organizer, module, function, &args(items))
    }

    /// Create a draft event and return its id
    pub fn create_event(&self, name: &str) -> String {
        let event_id = new_id();
        self.submit_event("Create", &[&event_id, name, EVENT_DATE])
            .expect("create event");
        event_id
    }

    /// Create an event with one section and open its sales
    pub fn event_on_sale(&self, section: &str, total_tickets: u32) -> String {
        let event_id = self.create_event("Sold Out Show");
        self.submit_event(
            "AddSection",
            &[&event_id, section, &total_tickets.to_string(), "40.00"],
        )
        .expect("add section");
        self.submit_event("SetOnSale", &[&event_id]).expect("set on sale");
        event_id
    }

    /// Issue a ticket for a fresh owner; returns the ticket id on success
    pub fn issue(&self, event_id: &str, section: &str) -> Result<String, SubmitError> {
        let ticket_id = new_id();
        self.issue_with_id(&ticket_id, event_id, section, &new_id())?;
        Ok(ticket_id)
    }

    pub fn issue_with_id(
        &self,
        ticket_id: &str,
        event_id: &str,
        section: &str,
        owner_id: &str,
    ) -> Result<TxReceipt, SubmitError> {
        self.submit_ticket(
            &self.box_office,
            "Issue",
            &[ticket_id, event_id, section, owner_id],
        )
    }

    pub fn get_event(&self, event_id: &str) -> Event {
        let response = self.query(EVENT_MODULE, "GetEvent", &[event_id]);
        assert!(response.is_success(), "GetEvent failed: {}", response.message);
        serde_json::from_slice(&response.payload).unwrap()
    }

    pub fn sold_tickets(&self, event_id: &str, section: &str) -> u32 {
        self.get_event(event_id)
            .section(section)
            .expect("section exists")
            .sold_tickets()
    }

    pub fn section_tickets(&self, event_id: &str, section: &str) -> Vec<Ticket> {
        let response = self.query(TICKET_MODULE, "GetSectionTickets", &[event_id, section]);
        assert!(response.is_success(), "GetSectionTickets failed: {}", response.message);
        serde_json::from_slice(&response.payload).unwrap()
    }
}
