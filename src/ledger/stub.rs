//! Ledger stub
//!
//! The interface a module sees of the ledger during one transaction. A stub is
//! bound to the namespace of the module it was handed to; writes never cross
//! namespaces, and the only way to touch another module's state is
//! [`LedgerStub::invoke_module`].

use crate::domain::ClientIdentity;

use super::key::{create_composite_key, prefix_end};
use super::{LedgerError, Response};

/// A key and its raw value as returned by range scans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// Transaction-scoped access to the ledger
pub trait LedgerStub {
    /// Module that invoked the current one inside this transaction, or `None`
    /// when the current module was called directly by the client
    fn calling_module(&self) -> Option<&str>;

    /// Read the committed value of `key`
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Stage a write of `key`; visible to others only if the transaction commits
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    /// Committed entries with `start <= key < end`, in key order.
    /// An empty `end` means unbounded.
    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<Vec<KeyValue>, LedgerError>;

    /// Stage a notification, delivered only after commit
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError>;

    /// Call another module inside this transaction. `args[0]` is the operation name.
    fn invoke_module(&mut self, module: &str, args: &[String]) -> Response;

    /// Committed entries whose composite key starts with `object_type` and `attributes`
    fn get_state_by_partial_composite_key(
        &mut self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<KeyValue>, LedgerError> {
        let start = create_composite_key(object_type, attributes)?;
        let end = prefix_end(&start);
        self.get_state_by_range(&start, &end)
    }
}

/// A deployable module. The host routes invocations to it by name.
pub trait Chaincode: Send + Sync {
    fn invoke(
        &self,
        stub: &mut dyn LedgerStub,
        caller: &ClientIdentity,
        function: &str,
        args: &[String],
    ) -> Response;
}
