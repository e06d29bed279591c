//! Transaction simulator
//!
//! Executes one transaction against committed state without changing it:
//! reads are recorded with their versions, writes and notifications are
//! buffered. Nested module invocations share the same simulator, so everything
//! a transaction does, across all modules it touches, commits or aborts as one
//! unit.

use std::sync::RwLock;

use crate::domain::ClientIdentity;

use super::host::ModuleRegistry;
use super::key::{validate_simple_key, COMPOSITE_KEY_DELIMITER};
use super::response::Response;
use super::stub::{KeyValue, LedgerStub};
use super::world_state::{RangeRead, ReadWriteSet, WorldState};
use super::LedgerError;

/// Status of a failed invocation routed by the host itself
pub const DEPENDENCY_FAILURE: i32 = 502;

/// Status for a malformed invocation
const BAD_INVOCATION: i32 = 400;

/// Notification staged by a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeEvent {
    pub namespace: String,
    pub name: String,
    pub payload: Vec<u8>,
}

/// Per-transaction simulation state
pub struct TxSimulator<'a> {
    state: &'a RwLock<WorldState>,
    channel_id: &'a str,
    tx_id: String,
    rw_set: ReadWriteSet,
    events: Vec<ChaincodeEvent>,
    call_path: Vec<String>,
}

impl<'a> TxSimulator<'a> {
    pub fn new(state: &'a RwLock<WorldState>, channel_id: &'a str, tx_id: String) -> Self {
        Self {
            state,
            channel_id,
            tx_id,
            rw_set: ReadWriteSet::default(),
            events: Vec::new(),
            call_path: Vec::new(),
        }
    }

    /// Consume the simulator, yielding what must be validated and committed
    pub fn into_results(self) -> (ReadWriteSet, Vec<ChaincodeEvent>) {
        (self.rw_set, self.events)
    }

    fn read(&mut self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let state = self.state.read().map_err(|_| LedgerError::StatePoisoned)?;
        let current = state.get(namespace, key);

        self.rw_set
            .record_read(namespace, key, current.map(|(_, version)| version));

        Ok(current.map(|(value, _)| value.to_vec()))
    }

    fn read_range(
        &mut self,
        namespace: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<KeyValue>, LedgerError> {
        let entries = {
            let state = self.state.read().map_err(|_| LedgerError::StatePoisoned)?;
            state.range(namespace, start, end)
        };

        self.rw_set.record_range_read(RangeRead {
            namespace: namespace.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            observed: entries
                .iter()
                .map(|entry| (entry.key.clone(), entry.version))
                .collect(),
        });

        Ok(entries
            .into_iter()
            .map(|entry| KeyValue {
                key: entry.key,
                value: entry.value,
            })
            .collect())
    }
}

/// Route an invocation to a deployed module, inside the simulator's transaction.
///
/// `args[0]` is the operation name. A module already on the call path cannot be
/// entered again.
pub fn dispatch(
    simulator: &mut TxSimulator<'_>,
    registry: &ModuleRegistry,
    creator: &ClientIdentity,
    module: &str,
    args: &[String],
) -> Response {
    let Some((namespace, chaincode)) = registry.get(module) else {
        return Response::error(
            DEPENDENCY_FAILURE,
            format!(
                "module {} is not deployed on channel {}",
                module, simulator.channel_id
            ),
        );
    };

    if simulator.call_path.iter().any(|m| m == module) {
        return Response::error(
            DEPENDENCY_FAILURE,
            format!(
                "reentrant invocation of module {} (call path: {})",
                module,
                simulator.call_path.join(" -> ")
            ),
        );
    }

    let Some((function, rest)) = args.split_first() else {
        return Response::error(BAD_INVOCATION, "missing function name");
    };

    tracing::debug!(
        tx_id = %simulator.tx_id,
        module = %module,
        function = %function,
        depth = simulator.call_path.len(),
        "Invoking module"
    );

    simulator.call_path.push(module.to_string());
    let response = {
        let mut stub = ModuleStub {
            simulator: &mut *simulator,
            registry,
            namespace,
            creator,
        };
        chaincode.invoke(&mut stub, creator, function, rest)
    };
    simulator.call_path.pop();

    response
}

/// Stub handed to a module, bound to that module's namespace
pub struct ModuleStub<'s, 'a> {
    simulator: &'s mut TxSimulator<'a>,
    registry: &'s ModuleRegistry,
    namespace: &'s str,
    creator: &'s ClientIdentity,
}

impl LedgerStub for ModuleStub<'_, '_> {
    fn calling_module(&self) -> Option<&str> {
        // the last entry is the module this stub belongs to
        let path = &self.simulator.call_path;
        path.len()
            .checked_sub(2)
            .map(|caller| path[caller].as_str())
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.simulator.read(self.namespace, key)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        // composite keys start with the delimiter; anything else must be a valid simple key
        if !key.starts_with(COMPOSITE_KEY_DELIMITER) {
            validate_simple_key(key)?;
        }
        self.simulator.rw_set.record_write(self.namespace, key, value);
        Ok(())
    }

    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<Vec<KeyValue>, LedgerError> {
        self.simulator.read_range(self.namespace, start, end)
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidEventName);
        }
        self.simulator.events.push(ChaincodeEvent {
            namespace: self.namespace.to_string(),
            name: name.to_string(),
            payload,
        });
        Ok(())
    }

    fn invoke_module(&mut self, module: &str, args: &[String]) -> Response {
        dispatch(self.simulator, self.registry, self.creator, module, args)
    }
}
