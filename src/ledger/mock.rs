//! In-memory stub for unit tests. Writes are applied immediately, so a test
//! reads back what it wrote without going through commit.

use std::collections::BTreeMap;

use super::simulator::ChaincodeEvent;
use super::stub::{KeyValue, LedgerStub};
use super::{LedgerError, Response};

pub struct MockStub {
    namespace: String,
    pub calling_module: Option<String>,
    pub state: BTreeMap<String, Vec<u8>>,
    pub events: Vec<ChaincodeEvent>,
    pub invocations: Vec<(String, Vec<String>)>,
    pub invoke_response: Response,
}

impl MockStub {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            calling_module: None,
            state: BTreeMap::new(),
            events: Vec::new(),
            invocations: Vec::new(),
            invoke_response: Response::success(Vec::new()),
        }
    }
}

impl LedgerStub for MockStub {
    fn calling_module(&self) -> Option<&str> {
        self.calling_module.as_deref()
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.state.insert(key.to_string(), value);
        Ok(())
    }

    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<Vec<KeyValue>, LedgerError> {
        Ok(self
            .state
            .iter()
            .filter(|(key, _)| key.as_str() >= start && (end.is_empty() || key.as_str() < end))
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidEventName);
        }
        self.events.push(ChaincodeEvent {
            namespace: self.namespace.clone(),
            name: name.to_string(),
            payload,
        });
        Ok(())
    }

    fn invoke_module(&mut self, module: &str, args: &[String]) -> Response {
        self.invocations.push((module.to_string(), args.to_vec()));
        self.invoke_response.clone()
    }
}
