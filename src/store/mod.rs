//! Persistence layer — payment lookups and enrollment inserts.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{EnrollmentStore, NewPerson, PaymentRecord, PaymentState, PaymentStore};
