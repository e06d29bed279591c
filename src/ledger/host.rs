//! Ledger host
//!
//! In-process host for the contract modules: keeps the module registry and the
//! committed world state of one channel, and runs the transaction flow
//! simulate -> validate -> commit -> notify.
//!
//! Concurrent transactions are never serialized here. Each one simulates
//! against committed state; at commit time the write lock is taken and the
//! read set is validated, so of two transactions racing on the same key only
//! the first to commit survives.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::ClientIdentity;

use super::simulator::{dispatch, ChaincodeEvent, TxSimulator};
use super::stub::Chaincode;
use super::world_state::WorldState;
use super::{LedgerError, Response};

/// Receives notifications of committed transactions
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, tx_id: &str, event: &ChaincodeEvent);
}

/// Sink that only logs notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn deliver(&self, tx_id: &str, event: &ChaincodeEvent) {
        tracing::info!(
            tx_id = %tx_id,
            namespace = %event.namespace,
            name = %event.name,
            payload = %String::from_utf8_lossy(&event.payload),
            "Notification delivered"
        );
    }
}

/// Modules deployed on the channel, by name
#[derive(Default, Clone)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn Chaincode>>,
}

impl ModuleRegistry {
    /// Registered name and module
    pub fn get(&self, name: &str) -> Option<(&str, &dyn Chaincode)> {
        self.modules
            .get_key_value(name)
            .map(|(name, module)| (name.as_str(), &**module))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Outcome of a committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_id: String,
    pub block_number: u64,
    pub payload: Vec<u8>,
}

/// Why a submitted transaction did not commit
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The invoked operation returned an error; nothing was written
    #[error("endorsement failed with status {}: {}", .0.status, .0.message)]
    Endorsement(Response),

    /// Simulation succeeded but commit validation failed; nothing was written
    #[error("transaction {tx_id} rejected: {source}")]
    Rejected {
        tx_id: String,
        #[source]
        source: LedgerError,
    },
}

impl SubmitError {
    /// Check if the transaction lost an MVCC race and may be resubmitted
    pub fn is_conflict(&self) -> bool {
        matches!(self, SubmitError::Rejected { source, .. } if source.is_conflict())
    }

    /// Response of a failed endorsement
    pub fn response(&self) -> Option<&Response> {
        match self {
            SubmitError::Endorsement(response) => Some(response),
            SubmitError::Rejected { .. } => None,
        }
    }
}

/// Builder for [`Ledger`]
pub struct LedgerBuilder {
    channel_id: String,
    registry: ModuleRegistry,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl LedgerBuilder {
    /// Deploy a module under `name`, replacing any module with the same name
    pub fn deploy(mut self, name: impl Into<String>, module: Arc<dyn Chaincode>) -> Self {
        self.registry.modules.insert(name.into(), module);
        self
    }

    /// Add a notification sink
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn build(self) -> Ledger {
        Ledger {
            channel_id: self.channel_id,
            state: RwLock::new(WorldState::new()),
            registry: self.registry,
            sinks: self.sinks,
        }
    }
}

/// One channel: deployed modules plus committed world state
pub struct Ledger {
    channel_id: String,
    state: RwLock<WorldState>,
    registry: ModuleRegistry,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl Ledger {
    pub fn builder(channel_id: impl Into<String>) -> LedgerBuilder {
        LedgerBuilder {
            channel_id: channel_id.into(),
            registry: ModuleRegistry::default(),
            sinks: Vec::new(),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Number of committed blocks
    pub fn height(&self) -> Result<u64, LedgerError> {
        let state = self.state.read().map_err(|_| LedgerError::StatePoisoned)?;
        Ok(state.height())
    }

    /// Submit a transaction: simulate, validate, commit atomically, then notify
    pub fn submit(
        &self,
        caller: &ClientIdentity,
        module: &str,
        function: &str,
        args: &[String],
    ) -> Result<TxReceipt, SubmitError> {
        let tx_id = new_tx_id(caller);
        let mut simulator = TxSimulator::new(&self.state, &self.channel_id, tx_id.clone());

        let response = dispatch(
            &mut simulator,
            &self.registry,
            caller,
            module,
            &invocation_args(function, args),
        );

        if !response.is_success() {
            tracing::debug!(
                tx_id = %tx_id,
                module = %module,
                function = %function,
                status = response.status,
                message = %response.message,
                "Endorsement failed"
            );
            return Err(SubmitError::Endorsement(response));
        }

        let (rw_set, events) = simulator.into_results();
        let (reads, writes) = (rw_set.read_count(), rw_set.write_count());

        let block_number = {
            let mut state = self.state.write().map_err(|_| SubmitError::Rejected {
                tx_id: tx_id.clone(),
                source: LedgerError::StatePoisoned,
            })?;

            if let Err(source) = state.validate(&rw_set) {
                tracing::warn!(
                    tx_id = %tx_id,
                    module = %module,
                    function = %function,
                    error = %source,
                    "Transaction rejected at commit"
                );
                return Err(SubmitError::Rejected { tx_id, source });
            }

            state.commit(rw_set)
        };

        tracing::info!(
            tx_id = %tx_id,
            module = %module,
            function = %function,
            block_number,
            reads,
            writes,
            "Transaction committed"
        );

        for event in &events {
            for sink in &self.sinks {
                sink.deliver(&tx_id, event);
            }
        }

        Ok(TxReceipt {
            tx_id,
            block_number,
            payload: response.payload,
        })
    }

    /// Run a query: simulate and return the response; nothing is committed or notified
    pub fn evaluate(
        &self,
        caller: &ClientIdentity,
        module: &str,
        function: &str,
        args: &[String],
    ) -> Response {
        let tx_id = new_tx_id(caller);
        let mut simulator = TxSimulator::new(&self.state, &self.channel_id, tx_id);

        dispatch(
            &mut simulator,
            &self.registry,
            caller,
            module,
            &invocation_args(function, args),
        )
    }
}

fn invocation_args(function: &str, args: &[String]) -> Vec<String> {
    let mut invocation = Vec::with_capacity(args.len() + 1);
    invocation.push(function.to_string());
    invocation.extend_from_slice(args);
    invocation
}

/// Transaction id: hex SHA-256 over a random nonce and the creator identity
fn new_tx_id(creator: &ClientIdentity) -> String {
    let mut nonce = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator.msp_id.as_bytes());
    hasher.update(creator.username.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerStub;
    use std::sync::Mutex;

    /// Writes `args[0]` -> `args[1]`, optionally calls another module first
    struct Scratch {
        forward_to: Option<String>,
        fail: bool,
    }

    impl Chaincode for Scratch {
        fn invoke(
            &self,
            stub: &mut dyn LedgerStub,
            _caller: &ClientIdentity,
            function: &str,
            args: &[String],
        ) -> Response {
            if let Some(target) = &self.forward_to {
                let response = stub.invoke_module(target, &invocation_args(function, args));
                if !response.is_success() {
                    return response;
                }
            }
            if stub.put_state(&args[0], args[1].as_bytes().to_vec()).is_err() {
                return Response::error(500, "write failed");
            }
            if stub.set_event("written", args[0].as_bytes().to_vec()).is_err() {
                return Response::error(500, "event failed");
            }
            if self.fail {
                return Response::error(409, "refused");
            }
            Response::success(Vec::new())
        }
    }

    /// Answers with the module that invoked it, or forwards to `forward_to`
    struct WhoCalls {
        forward_to: Option<String>,
    }

    impl Chaincode for WhoCalls {
        fn invoke(
            &self,
            stub: &mut dyn LedgerStub,
            _caller: &ClientIdentity,
            _function: &str,
            _args: &[String],
        ) -> Response {
            match &self.forward_to {
                Some(target) => stub.invoke_module(target, &["who".to_string()]),
                None => {
                    let calling = stub.calling_module().unwrap_or("client");
                    Response::success(calling.as_bytes().to_vec())
                }
            }
        }
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl NotificationSink for Collect {
        fn deliver(&self, _tx_id: &str, event: &ChaincodeEvent) {
            self.0
                .lock()
                .unwrap()
                .push(format!("{}:{}", event.namespace, event.name));
        }
    }

    fn caller() -> ClientIdentity {
        ClientIdentity::new("Org1MSP", "alice")
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_nested_writes_commit_together() {
        let sink = Arc::new(Collect::default());
        let ledger = Ledger::builder("ch")
            .deploy("inner", Arc::new(Scratch { forward_to: None, fail: false }))
            .deploy(
                "outer",
                Arc::new(Scratch {
                    forward_to: Some("inner".to_string()),
                    fail: false,
                }),
            )
            .with_sink(sink.clone())
            .build();

        let receipt = ledger.submit(&caller(), "outer", "put", &args(&["k", "v"])).unwrap();
        assert_eq!(receipt.block_number, 1);
        assert_eq!(receipt.tx_id.len(), 64);

        let state = ledger.state.read().unwrap();
        assert_eq!(state.get("outer", "k").unwrap().0, b"v");
        assert_eq!(state.get("inner", "k").unwrap().0, b"v");
        assert_eq!(*sink.0.lock().unwrap(), vec!["inner:written", "outer:written"]);
    }

    #[test]
    fn test_failure_discards_nested_writes_and_events() {
        let sink = Arc::new(Collect::default());
        let ledger = Ledger::builder("ch")
            .deploy("inner", Arc::new(Scratch { forward_to: None, fail: false }))
            .deploy(
                "outer",
                Arc::new(Scratch {
                    forward_to: Some("inner".to_string()),
                    fail: true,
                }),
            )
            .with_sink(sink.clone())
            .build();

        let err = ledger
            .submit(&caller(), "outer", "put", &args(&["k", "v"]))
            .unwrap_err();
        assert_eq!(err.response().unwrap().status, 409);

        assert_eq!(ledger.height().unwrap(), 0);
        assert!(ledger.state.read().unwrap().get("inner", "k").is_none());
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_module_is_dependency_failure() {
        let ledger = Ledger::builder("ch").build();
        let response = ledger.evaluate(&caller(), "ghost", "Get", &[]);

        assert_eq!(response.status, 502);
        assert!(response.message.contains("not deployed on channel ch"));
    }

    #[test]
    fn test_reentrant_invocation_is_refused() {
        let ledger = Ledger::builder("ch")
            .deploy(
                "loop",
                Arc::new(Scratch {
                    forward_to: Some("loop".to_string()),
                    fail: false,
                }),
            )
            .build();

        let err = ledger
            .submit(&caller(), "loop", "put", &args(&["k", "v"]))
            .unwrap_err();
        assert!(err.response().unwrap().message.contains("reentrant"));
    }

    #[test]
    fn test_calling_module_follows_call_path() {
        let ledger = Ledger::builder("ch")
            .deploy("inner", Arc::new(WhoCalls { forward_to: None }))
            .deploy(
                "outer",
                Arc::new(WhoCalls {
                    forward_to: Some("inner".to_string()),
                }),
            )
            .build();

        let direct = ledger.evaluate(&caller(), "inner", "who", &[]);
        assert_eq!(direct.payload, b"client");

        let nested = ledger.evaluate(&caller(), "outer", "who", &[]);
        assert!(nested.is_success(), "{}", nested.message);
        assert_eq!(nested.payload, b"outer");
    }

    #[test]
    fn test_evaluate_never_commits() {
        let ledger = Ledger::builder("ch")
            .deploy("m", Arc::new(Scratch { forward_to: None, fail: false }))
            .build();

        let response = ledger.evaluate(&caller(), "m", "put", &args(&["k", "v"]));
        assert!(response.is_success());
        assert_eq!(ledger.height().unwrap(), 0);
    }

    #[test]
    fn test_registry_names_sorted() {
        let ledger = Ledger::builder("ch")
            .deploy("b", Arc::new(Scratch { forward_to: None, fail: false }))
            .deploy("a", Arc::new(Scratch { forward_to: None, fail: false }))
            .build();

        assert_eq!(ledger.modules().names(), vec!["a", "b"]);
        assert!(ledger.modules().contains("a"));
    }
}
