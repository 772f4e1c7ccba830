//! Inbound message pipeline.
//!
//! Every message received on the webhook flows through:
//! 1. `IntentClassifier::classify()`: LLM call over a closed intent vocabulary
//! 2. `IntentDispatcher::plan()`: routing table; the renewal handler queries
//!    the payment store through `RenewalResolver`
//! 3. `Notifier::send_all()`: ordered sends, stopping at the first failure
//!
//! Nothing here is persisted between messages.

pub mod classifier;
pub mod dispatcher;
pub mod notifier;
pub mod processor;
pub mod renewal;
pub mod replies;
pub mod types;

pub use classifier::IntentClassifier;
pub use dispatcher::IntentDispatcher;
pub use notifier::Notifier;
pub use processor::MessagePipeline;
pub use renewal::RenewalResolver;
