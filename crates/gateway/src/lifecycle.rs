//! Order lifecycle controller.
//!
//! Owns order status: payment confirmation triggers the pipeline as a
//! deferred background task, terminal outcomes are recorded here, and
//! the admin re-trigger/refund operations live here. All status
//! movement goes through `Order::transition`, so an illegal operation
//! fails with `InvalidTransition` and changes nothing.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use ad_capabilities::report::render_report;
use ad_capabilities::{DeliveryChannel, PaymentGateway};
use ad_domain::birth::BirthFacts;
use ad_domain::config::{PaymentsConfig, PipelineConfig};
use ad_domain::conversation::{ConversationState, RequestKind, Role};
use ad_domain::error::{Error, Result};
use ad_domain::order::{AnalysisData, Order, OrderStatus};
use ad_pipeline::controller::PipelineController;
use ad_pipeline::router::{route, RouteDecision};
use ad_pipeline::Capabilities;

use crate::dedupe::DedupeStore;
use crate::locks::OrderLockMap;
use crate::store::OrderStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Requests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub birth_facts: BirthFacts,
    pub request_kind: RequestKind,
    /// The initiating question. Required for `query` orders, ignored
    /// for `full_report`.
    #[serde(default)]
    pub query_text: Option<String>,
    pub email: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Controller
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Thin handle around the shared internals so background pipeline
/// tasks can outlive the calling request.
pub struct OrderLifecycle {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<OrderStore>,
    locks: Arc<OrderLockMap>,
    dedupe: Arc<DedupeStore>,
    controller: PipelineController,
    payments: Arc<dyn PaymentGateway>,
    delivery: Arc<dyn DeliveryChannel>,
    pricing: PaymentsConfig,
    pipeline_cfg: PipelineConfig,
}

impl OrderLifecycle {
    pub fn new(
        store: Arc<OrderStore>,
        locks: Arc<OrderLockMap>,
        dedupe: Arc<DedupeStore>,
        caps: Capabilities,
        payments: Arc<dyn PaymentGateway>,
        delivery: Arc<dyn DeliveryChannel>,
        pricing: PaymentsConfig,
        pipeline_cfg: PipelineConfig,
    ) -> Self {
        let controller = PipelineController::new(
            caps,
            std::time::Duration::from_secs(pipeline_cfg.stage_timeout_sec),
        );
        Self {
            inner: Arc::new(Inner {
                store,
                locks,
                dedupe,
                controller,
                payments,
                delivery,
                pricing,
                pipeline_cfg,
            }),
        }
    }

    /// Create an order in `payment_pending`. Validation errors go back
    /// to the caller; nothing is persisted on failure.
    pub fn create_order(&self, req: CreateOrderRequest) -> Result<Order> {
        self.inner.create_order(req)
    }

    /// Idempotent entry point for `payment.captured` webhooks. The
    /// first confirmation of a reference moves the order to
    /// `processing` and schedules the pipeline; every repeat is a
    /// `DuplicateEvent` with no side effects.
    pub fn on_payment_confirmed(
        &self,
        order_id: Uuid,
        payment_reference: String,
    ) -> Result<OrderStatus> {
        let status = self.inner.confirm_payment(order_id, payment_reference)?;
        self.spawn_pipeline(order_id);
        Ok(status)
    }

    /// Re-run a `full_report` order's pipeline from its first
    /// unsatisfied stage. Not permitted for `query` orders.
    pub fn admin_retrigger(&self, order_id: Uuid) -> Result<OrderStatus> {
        let status = self.inner.mark_retriggered(order_id)?;
        self.spawn_pipeline(order_id);
        Ok(status)
    }

    /// Refund a completed order. Requires a captured payment and no
    /// existing refund record; irreversible.
    pub async fn admin_refund(&self, order_id: Uuid) -> Result<Order> {
        self.inner.refund(order_id).await
    }

    /// Orders stuck in `processing` past the configured ceiling.
    pub fn stale_processing(&self) -> Vec<Order> {
        self.inner.store.stale_processing(chrono::Duration::minutes(
            self.inner.pipeline_cfg.stale_processing_ceiling_min as i64,
        ))
    }

    /// Run the pipeline off the caller's critical path.
    fn spawn_pipeline(&self, order_id: Uuid) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.run_pipeline(order_id).await;
        });
    }
}

impl Inner {
    // ── Order creation ───────────────────────────────────────────────

    fn create_order(&self, req: CreateOrderRequest) -> Result<Order> {
        req.birth_facts.validate()?;
        if req.email.trim().is_empty() || !req.email.contains('@') {
            return Err(Error::Validation("a valid email address is required".into()));
        }

        let amount = match req.request_kind {
            RequestKind::FullReport => self.pricing.full_report_amount_minor,
            RequestKind::Query => self.pricing.query_amount_minor,
        };

        let mut order = Order::new(
            req.birth_facts,
            req.request_kind,
            req.email.trim().to_string(),
            amount,
            self.pricing.currency.clone(),
        );

        if req.request_kind == RequestKind::Query {
            let query = req
                .query_text
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .ok_or_else(|| Error::Validation("query orders require a query_text".into()))?;
            order.conversation.push_message(Role::User, query);
        }

        self.store.insert(order.clone())?;
        tracing::info!(order_id = %order.id, kind = %order.kind, "order created");
        Ok(order)
    }

    // ── Payment confirmation ─────────────────────────────────────────

    fn confirm_payment(&self, order_id: Uuid, payment_reference: String) -> Result<OrderStatus> {
        if self.dedupe.seen(&payment_reference) {
            tracing::info!(
                order_id = %order_id,
                reference = %payment_reference,
                "duplicate payment event"
            );
            return Err(Error::DuplicateEvent);
        }

        let status = self.store.update(&order_id, |order| {
            if order.payment.payment_reference.as_deref() == Some(payment_reference.as_str()) {
                return Err(Error::DuplicateEvent);
            }
            order.transition(OrderStatus::Processing, "confirm payment for")?;
            order.payment.payment_reference = Some(payment_reference.clone());
            order.payment.captured = true;
            Ok(order.status)
        })?;

        self.dedupe.record(payment_reference);
        Ok(status)
    }

    // ── Pipeline execution ───────────────────────────────────────────

    async fn run_pipeline(&self, order_id: Uuid) {
        // At-most-one-concurrent-pipeline-per-order: a racing duplicate
        // trigger observes the held lock and backs off.
        let _permit = match self.locks.try_acquire(&order_id) {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!(order_id = %order_id, "pipeline already in flight, skipping");
                return;
            }
        };

        let Some(order) = self.store.get(&order_id) else {
            tracing::error!(order_id = %order_id, "pipeline triggered for unknown order");
            return;
        };

        let mut convo = order.conversation.clone();

        // Route the entry. Facts that fail validation abort before any
        // capability is touched; everything else proceeds into the
        // controller, which skips whatever is already satisfied.
        let entry_message = convo
            .pending_user_message()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        match route(&convo, &entry_message) {
            RouteDecision::ContinueAnalysis { missing } if !missing.is_empty() => {
                tracing::warn!(order_id = %order_id, missing = ?missing, "birth facts incomplete");
                self.record_failure(order_id, convo, "location: invalid_input".into());
                return;
            }
            decision => tracing::debug!(order_id = %order_id, ?decision, "pipeline entry routed"),
        }

        match self.controller.run(&mut convo).await {
            Ok(()) => {
                if order.kind == RequestKind::FullReport {
                    let analysis = AnalysisData::from_conversation(&convo);
                    let (subject, html) = render_report(&convo.birth_facts.name, &analysis);
                    if let Err(err) = self.delivery.send(&order.email, &subject, &html).await {
                        tracing::warn!(order_id = %order_id, error = %err, "report delivery failed");
                        // The analysis itself is kept: a retrigger skips
                        // every satisfied stage and only retries delivery.
                        self.record_failure(order_id, convo, "delivery_failed".into());
                        return;
                    }
                }

                let result = self.store.update(&order_id, |o| {
                    o.conversation = convo.clone();
                    o.analysis_data = Some(AnalysisData::from_conversation(&convo));
                    o.transition(OrderStatus::Completed, "complete")
                });
                match result {
                    Ok(()) => tracing::info!(order_id = %order_id, "order completed"),
                    Err(err) => tracing::error!(
                        order_id = %order_id,
                        error = %err,
                        "failed to record completion"
                    ),
                }
            }
            Err(failure) => {
                tracing::warn!(
                    order_id = %order_id,
                    stage = %failure.stage,
                    reason = %failure.reason(),
                    "pipeline failed"
                );
                self.record_failure(order_id, convo, failure.reason());
            }
        }
    }

    /// Persist partial progress and move the order to `failed`.
    fn record_failure(&self, order_id: Uuid, convo: ConversationState, reason: String) {
        let result = self.store.update(&order_id, |o| {
            o.conversation = convo.clone();
            o.transition(OrderStatus::Failed, "fail")?;
            o.error_reason = Some(reason.clone());
            Ok(())
        });
        if let Err(err) = result {
            tracing::error!(order_id = %order_id, error = %err, "failed to record failure");
        }
    }

    // ── Admin operations ─────────────────────────────────────────────

    fn mark_retriggered(&self, order_id: Uuid) -> Result<OrderStatus> {
        let stale_threshold = Utc::now()
            - chrono::Duration::minutes(self.pipeline_cfg.stale_processing_ceiling_min as i64);

        let status = self.store.update(&order_id, |order| {
            if order.kind != RequestKind::FullReport {
                return Err(Error::InvalidTransition {
                    from: order.status,
                    op: "retrigger",
                });
            }
            match order.status {
                OrderStatus::Failed | OrderStatus::Completed => {
                    order.transition(OrderStatus::Processing, "retrigger")?;
                }
                // A run that stalled past the ceiling (crash, lost task)
                // may be rescheduled in place; a live one may not.
                OrderStatus::Processing if order.updated_at < stale_threshold => {}
                _ => {
                    return Err(Error::InvalidTransition {
                        from: order.status,
                        op: "retrigger",
                    });
                }
            }
            Ok(order.status)
        })?;
        tracing::info!(order_id = %order_id, "order retriggered");
        Ok(status)
    }

    async fn refund(&self, order_id: Uuid) -> Result<Order> {
        // Hold the order lock so a refund cannot interleave with chat
        // turns or a racing pipeline run.
        let _permit = self
            .locks
            .acquire(&order_id)
            .await
            .map_err(|_| Error::NotFound(format!("order {order_id}")))?;

        let order = self
            .store
            .get(&order_id)
            .ok_or_else(|| Error::NotFound(format!("order {order_id}")))?;

        if order.status != OrderStatus::Completed {
            return Err(Error::InvalidTransition {
                from: order.status,
                op: "refund",
            });
        }
        if order.payment.refund_ref.is_some() {
            return Err(Error::InvalidTransition {
                from: order.status,
                op: "refund again",
            });
        }
        let payment_reference = order
            .payment
            .payment_reference
            .clone()
            .filter(|_| order.payment.captured)
            .ok_or_else(|| Error::Validation("order has no captured payment".into()))?;

        let refund_ref = self
            .payments
            .refund(&payment_reference, order.amount_minor)
            .await?;

        self.store.update(&order_id, |o| {
            o.payment.refund_ref = Some(refund_ref.clone());
            o.payment.refunded_at = Some(Utc::now());
            o.transition(OrderStatus::Refunded, "refund")?;
            Ok(())
        })?;

        tracing::info!(order_id = %order_id, refund_ref = %refund_ref, "order refunded");
        self.store
            .get(&order_id)
            .ok_or_else(|| Error::NotFound(format!("order {order_id}")))
    }
}
