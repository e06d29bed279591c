//! Ledger module
//!
//! The transactional key-value ledger the contract modules run on: key codec,
//! the stub interface modules program against, and an in-process host with
//! namespaced, versioned world state.

mod error;
pub mod host;
pub mod key;
#[cfg(test)]
pub(crate) mod mock;
pub mod response;
pub mod simulator;
pub mod stub;
pub mod world_state;

pub use error::LedgerError;
pub use host::{Ledger, LedgerBuilder, NotificationSink, SubmitError, TracingSink, TxReceipt};
pub use key::KeyError;
pub use response::Response;
pub use simulator::ChaincodeEvent;
pub use stub::{Chaincode, KeyValue, LedgerStub};
