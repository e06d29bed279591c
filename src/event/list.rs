//! Event List
//!
//! Events stored under their bare id in the event module's namespace.

use uuid::Uuid;

use crate::domain::ContractError;
use crate::ledger::LedgerStub;
use crate::store::EntityStore;

use super::model::Event;

const EVENTS: EntityStore<Event> = EntityStore::simple("ticken.event.eventList");

/// Typed access to stored events
#[derive(Debug, Default, Clone, Copy)]
pub struct EventList;

impl EventList {
    /// Store a new event; fails if the id is already taken
    pub fn add(&self, stub: &mut dyn LedgerStub, event: &Event) -> Result<(), ContractError> {
        let event_id = event.event_id().to_string();
        if EVENTS.exists(stub, &[&event_id])? {
            return Err(ContractError::AlreadyExists(format!(
                "event {} already exists",
                event_id
            )));
        }
        EVENTS.put(stub, event)?;
        Ok(())
    }

    /// Overwrite a stored event
    pub fn update(&self, stub: &mut dyn LedgerStub, event: &Event) -> Result<(), ContractError> {
        EVENTS.put(stub, event)?;
        Ok(())
    }

    /// Load an event; fails with NotFound if absent
    pub fn get(&self, stub: &mut dyn LedgerStub, event_id: Uuid) -> Result<Event, ContractError> {
        EVENTS
            .get(stub, &[&event_id.to_string()])?
            .ok_or_else(|| ContractError::NotFound(format!("event {} not found", event_id)))
    }

    pub fn exists(&self, stub: &mut dyn LedgerStub, event_id: Uuid) -> Result<bool, ContractError> {
        Ok(EVENTS.exists(stub, &[&event_id.to_string()])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientIdentity, ErrorKind};
    use crate::ledger::mock::MockStub;
    use chrono::Utc;

    fn event() -> Event {
        Event::new(
            Uuid::new_v4(),
            "Show",
            Utc::now(),
            &ClientIdentity::new("Org1MSP", "organizer"),
        )
        .unwrap()
    }

    #[test]
    fn test_event_stored_under_bare_id() {
        let mut stub = MockStub::new("ticken-event");
        let event = event();

        EventList.add(&mut stub, &event).unwrap();

        assert!(stub.state.contains_key(&event.event_id().to_string()));
        assert_eq!(EventList.get(&mut stub, event.event_id()).unwrap(), event);
        assert!(EventList.exists(&mut stub, event.event_id()).unwrap());
    }

    #[test]
    fn test_add_twice_already_exists() {
        let mut stub = MockStub::new("ticken-event");
        let event = event();

        EventList.add(&mut stub, &event).unwrap();
        let err = EventList.add(&mut stub, &event).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_get_missing_not_found() {
        let mut stub = MockStub::new("ticken-event");
        let err = EventList.get(&mut stub, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!EventList.exists(&mut stub, Uuid::new_v4()).unwrap());
    }
}
