//! Client core of the finance tracker: request transport, identity session, resource
//! accessors and the view units that render them.

pub mod error;
pub mod orchestrator;
pub mod resources;
pub mod session;
pub mod storage;
pub mod transport;
pub mod ui;

pub use error::{RequestError, StorageError, ViewError};
pub use orchestrator::{AppState, Modal, Orchestrator, Page, TransactionsOptions};
pub use resources::{AccountApi, RemoteAccounts, RemoteTransactions, TransactionApi};
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, SlotStorage};
pub use transport::{Method, Request, RequestClient};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
