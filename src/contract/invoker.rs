//! Cross-module invocation
//!
//! Adapter from the envelope returned by [`LedgerStub::invoke_module`] to a
//! `Result`. The call runs inside the caller's transaction; a failure here
//! fails the whole transaction, nested writes included.

use crate::domain::ContractError;
use crate::ledger::LedgerStub;

/// Calls operations of one target module on behalf of a calling module
#[derive(Debug, Clone)]
pub struct Invoker {
    caller: String,
    target: String,
}

impl Invoker {
    pub fn new(caller: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            target: target.into(),
        }
    }

    /// Invoke `operation` on the target module and return its payload.
    ///
    /// A failed response becomes [`ContractError::Dependency`] carrying the
    /// remote message verbatim.
    pub fn invoke(
        &self,
        stub: &mut dyn LedgerStub,
        operation: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, ContractError> {
        let mut invocation = Vec::with_capacity(args.len() + 1);
        invocation.push(operation.to_string());
        invocation.extend(args.iter().map(|arg| arg.to_string()));

        let response = stub.invoke_module(&self.target, &invocation);
        if !response.is_success() {
            tracing::debug!(
                caller = %self.caller,
                target = %self.target,
                operation = %operation,
                status = response.status,
                "Nested invocation failed"
            );
            return Err(ContractError::dependency(&self.caller, &self.target, &response));
        }

        Ok(response.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::ledger::mock::MockStub;
    use crate::ledger::Response;

    #[test]
    fn test_invoke_builds_argument_vector() {
        let mut stub = MockStub::new("ticket");
        stub.invoke_response = Response::success(b"true".to_vec());

        let invoker = Invoker::new("ticket", "event");
        let payload = invoker.invoke(&mut stub, "SellTicket", &["e1", "GA"]).unwrap();

        assert_eq!(payload, b"true");
        assert_eq!(
            stub.invocations,
            vec![(
                "event".to_string(),
                vec!["SellTicket".to_string(), "e1".to_string(), "GA".to_string()]
            )]
        );
    }

    #[test]
    fn test_invoke_failure_is_dependency_error() {
        let mut stub = MockStub::new("ticket");
        stub.invoke_response = Response::error(412, "[event] | event is not on sale");

        let err = Invoker::new("ticket", "event")
            .invoke(&mut stub, "SellTicket", &["e1", "GA"])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(err.to_string().ends_with("[event] | event is not on sale"));
        assert!(err.to_string().starts_with("[ticket]"));
    }
}
