//! Contract module
//!
//! What every contract module shares: the transaction context handed to
//! operations, the [`Contract`] routing trait, argument parsing helpers and
//! the cross-module [`Invoker`].

mod invoker;

pub use invoker::Invoker;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{ClientIdentity, ContractError};
use crate::ledger::{Chaincode, LedgerStub, Response};

/// Context of one operation: ledger access plus the identity that submitted it
pub struct TxContext<'a> {
    pub stub: &'a mut dyn LedgerStub,
    pub caller: &'a ClientIdentity,
}

impl<'a> TxContext<'a> {
    pub fn new(stub: &'a mut dyn LedgerStub, caller: &'a ClientIdentity) -> Self {
        Self { stub, caller }
    }
}

/// A contract module: routes an operation name to its implementation.
///
/// Every `Contract` is deployable on the ledger host; failures are encoded in
/// the response envelope under the module's name.
pub trait Contract: Send + Sync {
    /// Name the module is deployed under
    fn name(&self) -> &str;

    /// Run `function` and return its JSON payload
    fn route(
        &self,
        ctx: &mut TxContext<'_>,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError>;
}

impl<C: Contract> Chaincode for C {
    fn invoke(
        &self,
        stub: &mut dyn LedgerStub,
        caller: &ClientIdentity,
        function: &str,
        args: &[String],
    ) -> Response {
        let mut ctx = TxContext::new(stub, caller);
        match self.route(&mut ctx, function, args) {
            Ok(payload) => Response::success(payload),
            Err(err) => {
                tracing::debug!(
                    module = %self.name(),
                    function = %function,
                    kind = err.kind().as_str(),
                    error = %err,
                    "Operation failed"
                );
                err.into_response(self.name())
            }
        }
    }
}

/// Check the argument count of `function` and borrow the arguments
pub fn expect_args<'a, const N: usize>(
    function: &str,
    args: &'a [String],
) -> Result<[&'a str; N], ContractError> {
    if args.len() != N {
        return Err(ContractError::InvalidArgument(format!(
            "{} expects {} argument(s), got {}",
            function,
            N,
            args.len()
        )));
    }
    Ok(std::array::from_fn(|i| args[i].as_str()))
}

/// Parse a UUID argument, trimming surrounding whitespace
pub fn parse_uuid(field: &str, value: &str) -> Result<Uuid, ContractError> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        ContractError::InvalidArgument(format!("{} {:?} is not a valid UUID", field, value))
    })
}

/// Serialize an operation result as its response payload
pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ContractError> {
    Ok(serde_json::to_vec(value)?)
}
