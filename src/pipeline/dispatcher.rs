//! Intent dispatcher — a closed routing table from intent to handler.
//!
//! `plan()` decides what to send (the renewal handler queries the store);
//! `dispatch()` plans and then delivers in order, fail-fast.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ReplyConfig;
use crate::error::PipelineError;
use crate::pipeline::notifier::Notifier;
use crate::pipeline::renewal::{self, RenewalResolver};
use crate::pipeline::replies;
use crate::pipeline::types::{ClassifiedIntent, DispatchReport, Intent, Notification, RenewalStatus};

/// Planned handler output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerPlan {
    pub notifications: Vec<Notification>,
    pub renewal: Option<RenewalStatus>,
}

impl HandlerPlan {
    fn text(body: impl Into<String>) -> Self {
        Self {
            notifications: vec![Notification::Text(body.into())],
            renewal: None,
        }
    }
}

/// Routes classified intents to their handlers.
pub struct IntentDispatcher {
    resolver: Arc<RenewalResolver>,
    notifier: Notifier,
    replies: ReplyConfig,
}

impl IntentDispatcher {
    pub fn new(resolver: Arc<RenewalResolver>, notifier: Notifier, replies: ReplyConfig) -> Self {
        Self {
            resolver,
            notifier,
            replies,
        }
    }

    /// Decide the sends for an intent.
    pub async fn plan(&self, classified: &ClassifiedIntent) -> HandlerPlan {
        match classified.intent {
            Intent::InfoOrGreeting => HandlerPlan::text(replies::GREETING_MENU),
            Intent::Enrollment => HandlerPlan {
                notifications: vec![
                    Notification::TextWithPreview(replies::enrollment_link(&self.replies)),
                    Notification::Image(self.replies.payment_images[0].clone()),
                    Notification::Image(self.replies.payment_images[1].clone()),
                ],
                renewal: None,
            },
            Intent::Benefits => HandlerPlan::text(replies::BENEFITS),
            Intent::RenewalWithoutDocument => HandlerPlan::text(replies::REQUEST_DOCUMENT),
            Intent::RenewalWithDocument => match classified.document.as_deref() {
                Some(document) => {
                    let status = self.resolver.resolve(document).await;
                    HandlerPlan {
                        notifications: vec![Notification::Text(renewal::reply_for(&status))],
                        renewal: Some(status),
                    }
                }
                None => {
                    debug!("Renewal intent without a document, asking for it");
                    HandlerPlan::text(replies::REQUEST_DOCUMENT)
                }
            },
            Intent::OpenCycles
            | Intent::PaymentHistoryWithDocument
            | Intent::PaymentHistoryWithoutDocument => {
                debug!(intent = %classified.intent, "Intent recognized but not yet supported");
                HandlerPlan::text(replies::NOT_YET_SUPPORTED)
            }
            Intent::Unrecognized => HandlerPlan::text(replies::FALLBACK),
        }
    }

    /// Run the handler for `classified` and deliver its replies to `to`.
    pub async fn dispatch(
        &self,
        classified: &ClassifiedIntent,
        to: &str,
    ) -> Result<DispatchReport, PipelineError> {
        let plan = self.plan(classified).await;
        let delivered = self.notifier.send_all(to, &plan.notifications).await?;

        info!(
            to,
            intent = %classified.intent,
            renewal = plan.renewal.as_ref().map(|s| s.label()).unwrap_or("-"),
            delivered,
            "Dispatch complete"
        );

        Ok(DispatchReport {
            intent: classified.intent,
            renewal: plan.renewal,
            delivered,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::channels::platform::MessagingPlatform;
    use crate::pipeline::notifier::tests::RecordingPlatform;
    use crate::pipeline::renewal::tests::FakePaymentStore;
    use crate::store::traits::PaymentStore;

    struct Harness {
        dispatcher: IntentDispatcher,
        platform: Arc<RecordingPlatform>,
        store: Arc<FakePaymentStore>,
    }

    fn harness(store: FakePaymentStore, platform: RecordingPlatform) -> Harness {
        let store = Arc::new(store);
        let platform = Arc::new(platform);
        let resolver = Arc::new(RenewalResolver::new(
            Arc::clone(&store) as Arc<dyn PaymentStore>,
            ReplyConfig::default(),
            Duration::from_secs(5),
        ));
        let notifier = Notifier::new(Arc::clone(&platform) as Arc<dyn MessagingPlatform>);
        Harness {
            dispatcher: IntentDispatcher::new(resolver, notifier, ReplyConfig::default()),
            platform,
            store,
        }
    }

    fn default_harness() -> Harness {
        harness(
            FakePaymentStore::with("12345678", "Al día"),
            RecordingPlatform::default(),
        )
    }

    fn texts(h: &Harness) -> Vec<Notification> {
        h.platform.sent().into_iter().map(|(_, n)| n).collect()
    }

    #[tokio::test]
    async fn greeting_sends_menu() {
        let h = default_harness();
        let report = h
            .dispatcher
            .dispatch(&ClassifiedIntent::new(Intent::InfoOrGreeting, None), "519")
            .await
            .unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(texts(&h), vec![Notification::Text(replies::GREETING_MENU.into())]);
    }

    #[tokio::test]
    async fn enrollment_sends_link_then_two_images_in_order() {
        let h = default_harness();
        let config = ReplyConfig::default();
        h.dispatcher
            .dispatch(&ClassifiedIntent::new(Intent::Enrollment, None), "519")
            .await
            .unwrap();
        assert_eq!(
            texts(&h),
            vec![
                Notification::TextWithPreview(replies::enrollment_link(&config)),
                Notification::Image(config.payment_images[0].clone()),
                Notification::Image(config.payment_images[1].clone()),
            ]
        );
    }

    #[tokio::test]
    async fn enrollment_first_image_failure_skips_second() {
        let h = harness(FakePaymentStore::default(), RecordingPlatform::failing_at(1));
        let err = h
            .dispatcher
            .dispatch(&ClassifiedIntent::new(Intent::Enrollment, None), "519")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Delivery { delivered: 1, planned: 3, .. }));
        let sent = texts(&h);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0], Notification::TextWithPreview(_)));
    }

    #[tokio::test]
    async fn benefits_sends_static_text() {
        let h = default_harness();
        h.dispatcher
            .dispatch(&ClassifiedIntent::new(Intent::Benefits, None), "519")
            .await
            .unwrap();
        assert_eq!(texts(&h), vec![Notification::Text(replies::BENEFITS.into())]);
    }

    #[tokio::test]
    async fn renewal_without_document_asks_for_it() {
        let h = default_harness();
        h.dispatcher
            .dispatch(
                &ClassifiedIntent::new(Intent::RenewalWithoutDocument, None),
                "519",
            )
            .await
            .unwrap();
        assert_eq!(
            texts(&h),
            vec![Notification::Text(replies::REQUEST_DOCUMENT.into())]
        );
        assert_eq!(h.store.lookup_count(), 0);
    }

    #[tokio::test]
    async fn renewal_with_document_but_none_extracted_matches_no_document_path() {
        let h = default_harness();
        let report = h
            .dispatcher
            .dispatch(&ClassifiedIntent::new(Intent::RenewalWithDocument, None), "519")
            .await
            .unwrap();
        assert_eq!(
            texts(&h),
            vec![Notification::Text(replies::REQUEST_DOCUMENT.into())]
        );
        assert!(report.renewal.is_none());
        assert_eq!(h.store.lookup_count(), 0);
    }

    #[tokio::test]
    async fn renewal_with_current_document_confirms() {
        let h = default_harness();
        let report = h
            .dispatcher
            .dispatch(
                &ClassifiedIntent::new(Intent::RenewalWithDocument, Some("12345678".into())),
                "519",
            )
            .await
            .unwrap();
        assert_eq!(report.renewal, Some(RenewalStatus::Current));
        assert_eq!(
            texts(&h),
            vec![Notification::Text("✅ Tus pagos están al día.".into())]
        );
        assert_eq!(h.store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn renewal_with_overdue_document_sends_link() {
        let h = harness(
            FakePaymentStore::with("12345678", "En deuda (pago vencido)"),
            RecordingPlatform::default(),
        );
        h.dispatcher
            .dispatch(
                &ClassifiedIntent::new(Intent::RenewalWithDocument, Some("12345678".into())),
                "519",
            )
            .await
            .unwrap();
        match &texts(&h)[..] {
            [Notification::Text(body)] => assert!(body.contains("documento=12345678")),
            other => panic!("unexpected sends: {:?}", other),
        }
    }

    #[tokio::test]
    async fn only_renewal_with_document_touches_the_store() {
        let h = default_harness();
        for intent in Intent::VOCABULARY
            .into_iter()
            .chain([Intent::Unrecognized])
            .filter(|i| *i != Intent::RenewalWithDocument)
        {
            h.dispatcher
                .plan(&ClassifiedIntent::new(intent, Some("12345678".into())))
                .await;
        }
        assert_eq!(h.store.lookup_count(), 0);
    }

    #[tokio::test]
    async fn unsupported_intents_are_named_not_fallback() {
        let h = default_harness();
        for intent in [
            Intent::OpenCycles,
            Intent::PaymentHistoryWithDocument,
            Intent::PaymentHistoryWithoutDocument,
        ] {
            let plan = h.dispatcher.plan(&ClassifiedIntent::new(intent, None)).await;
            assert_eq!(
                plan.notifications,
                vec![Notification::Text(replies::NOT_YET_SUPPORTED.into())]
            );
        }
    }

    #[tokio::test]
    async fn unrecognized_sends_fallback() {
        let h = default_harness();
        h.dispatcher
            .dispatch(&ClassifiedIntent::unrecognized(), "519")
            .await
            .unwrap();
        assert_eq!(
            texts(&h),
            vec![Notification::Text("No logré entender tu solicitud 🤖".into())]
        );
    }
}
