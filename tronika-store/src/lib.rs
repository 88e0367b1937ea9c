//! tronika-store: persistence for the task board, activity journal and reminder ledger.
//!
//! The core never touches disk. Callers `load` a snapshot, mutate a
//! `TaskBoard`, and `save` after every change.

pub mod journal;
pub mod snapshot;
pub mod store;

pub use journal::{ActivityJournal, SentLedger};
pub use snapshot::{BoardSnapshot, SNAPSHOT_VERSION};
pub use store::{JsonFileStore, MemoryStore, TaskStore};
