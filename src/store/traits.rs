//! Store traits — the narrow data-store interfaces the dispatcher consumes.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;

/// Payment state string for a student whose payments are current.
pub const STATE_UP_TO_DATE: &str = "Al día";

/// Payment state string for an expired, unpaid period.
pub const STATE_OVERDUE: &str = "En deuda (pago vencido)";

/// Parsed payment state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentState {
    UpToDate,
    Overdue,
    /// Any state the dispatcher has no rule for, kept verbatim.
    Other(String),
}

impl PaymentState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            STATE_UP_TO_DATE => Self::UpToDate,
            STATE_OVERDUE => Self::Overdue,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The most relevant payment row for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub document: String,
    /// Raw `payment_state` column.
    pub state: String,
    pub due_date: Option<NaiveDate>,
}

impl PaymentRecord {
    pub fn payment_state(&self) -> PaymentState {
        PaymentState::parse(&self.state)
    }
}

/// A person submitted through the enrollment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub first_names: String,
    pub last_names: String,
    pub whatsapp_number: String,
    pub email: Option<String>,
    pub status: Option<String>,
    pub document: String,
}

/// Read-only payment lookups.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Latest payment record for a document, if any.
    async fn lookup_payment_status(
        &self,
        document: &str,
    ) -> Result<Option<PaymentRecord>, DatabaseError>;
}

/// Enrollment-form inserts.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Insert a person. Returns the generated id.
    async fn insert_person(&self, person: &NewPerson) -> Result<String, DatabaseError>;
}
