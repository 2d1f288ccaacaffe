//! Session persistence over a local libsql database.

pub mod store;

pub use store::{SessionRecord, SessionStore};
