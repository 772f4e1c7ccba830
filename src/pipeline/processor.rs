//! Message pipeline — classifies an inbound message and dispatches it.
//!
//! Flow:
//! 1. `IntentClassifier::classify()` → `ClassifiedIntent` (never fails)
//! 2. `IntentDispatcher::dispatch()` → handler plan, then ordered sends
//!
//! Webhook deliveries are acknowledged before this runs; `spawn()` detaches
//! each message onto its own task and logs the outcome.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span};

use crate::error::PipelineError;
use crate::pipeline::classifier::IntentClassifier;
use crate::pipeline::dispatcher::IntentDispatcher;
use crate::pipeline::types::{DispatchReport, InboundMessage};

pub struct MessagePipeline {
    classifier: IntentClassifier,
    dispatcher: IntentDispatcher,
}

impl MessagePipeline {
    pub fn new(classifier: IntentClassifier, dispatcher: IntentDispatcher) -> Self {
        Self {
            classifier,
            dispatcher,
        }
    }

    /// Run one message through classification and dispatch.
    pub async fn process(&self, message: InboundMessage) -> Result<DispatchReport, PipelineError> {
        info!(
            id = %message.id,
            sender = %message.sender,
            kind = ?message.kind,
            "Processing inbound message"
        );

        let classified = self.classifier.classify(&message.text).await;
        self.dispatcher.dispatch(&classified, &message.sender).await
    }

    /// Process a message on a detached task.
    ///
    /// Nothing awaits the handle in production; errors are logged here.
    pub fn spawn(self: Arc<Self>, message: InboundMessage) -> JoinHandle<()> {
        let span = info_span!("dispatch", message_id = %message.id, sender = %message.sender);
        tokio::spawn(
            async move {
                match self.process(message).await {
                    Ok(report) => info!(
                        intent = %report.intent,
                        delivered = report.delivered,
                        "Message handled"
                    ),
                    Err(e) => error!(error = %e, "Message dispatch failed"),
                }
            }
            .instrument(span),
        )
    }

    /// Spawn one task per message. Messages are independent of each other.
    pub fn spawn_all(self: &Arc<Self>, messages: Vec<InboundMessage>) -> Vec<JoinHandle<()>> {
        messages
            .into_iter()
            .map(|message| Arc::clone(self).spawn(message))
            .collect()
    }
}
