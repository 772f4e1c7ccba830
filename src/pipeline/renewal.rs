//! Renewal status resolver — maps a document's latest payment to a reply.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::config::ReplyConfig;
use crate::error::LookupError;
use crate::pipeline::replies;
use crate::pipeline::types::RenewalStatus;
use crate::store::traits::{PaymentState, PaymentStore};

/// Resolves renewal status with a fresh store query per call.
pub struct RenewalResolver {
    store: Arc<dyn PaymentStore>,
    replies: ReplyConfig,
    timeout: Duration,
}

impl RenewalResolver {
    pub fn new(store: Arc<dyn PaymentStore>, replies: ReplyConfig, timeout: Duration) -> Self {
        Self {
            store,
            replies,
            timeout,
        }
    }

    /// Resolve a document to a status. Store failures become `LookupFailed`.
    pub async fn resolve(&self, document: &str) -> RenewalStatus {
        match self.try_resolve(document).await {
            Ok(status) => {
                info!(document, status = status.label(), "Renewal status resolved");
                status
            }
            Err(e) => {
                error!(document, error = %e, "Payment lookup failed");
                RenewalStatus::LookupFailed
            }
        }
    }

    async fn try_resolve(&self, document: &str) -> Result<RenewalStatus, LookupError> {
        let record = tokio::time::timeout(self.timeout, self.store.lookup_payment_status(document))
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))??;

        let Some(record) = record else {
            return Ok(RenewalStatus::NotFound);
        };

        Ok(match record.payment_state() {
            PaymentState::UpToDate => RenewalStatus::Current,
            PaymentState::Overdue => RenewalStatus::Overdue {
                link: replies::renewal_url(&self.replies, document),
            },
            PaymentState::Other(state) => RenewalStatus::Unclassified { state },
        })
    }
}

/// User-facing reply for a renewal status.
pub fn reply_for(status: &RenewalStatus) -> String {
    match status {
        RenewalStatus::Current => replies::PAYMENTS_UP_TO_DATE.to_string(),
        RenewalStatus::Overdue { link } => replies::overdue(link),
        RenewalStatus::NotFound => replies::REQUEST_DOCUMENT.to_string(),
        RenewalStatus::Unclassified { .. } => replies::UNCLASSIFIED_PAYMENT.to_string(),
        RenewalStatus::LookupFailed => replies::TRY_AGAIN_LATER.to_string(),
    }
}
