//! Side effects of a terminal approval: record rendering and notification
use super::context::RequestContext;
use super::document::DocumentRenderer;
use super::notify::{EmailTemplate, Notifier, NotifyContext};
use super::request::RequestDetails;
use super::utils;
use sled::Db;
use std::sync::Arc;
use std::thread;

/// Emitted once per request reaching APPROVED.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestApproved {
    pub request_id: String,
}

/// Schedules the approved-request side effects as a background task.
///
/// The idempotency marker in sled makes the dispatch exactly-once per
/// request id even when the triggering call is retried; the job itself is
/// at-least-once from the collaborators' point of view. A failed job never
/// rolls back the APPROVED status.
pub struct Dispatcher {
    instance: Arc<Db>,
    renderer: Arc<dyn DocumentRenderer>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(
        instance: Arc<Db>,
        renderer: Arc<dyn DocumentRenderer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            instance,
            renderer,
            notifier,
        }
    }

    /// Claims the dispatch marker and, on winning the claim, spawns the
    /// side-effect job. Returns whether this call scheduled the job. The
    /// caller's transition result is never affected.
    pub fn on_approved(&self, event: RequestApproved, ctx: RequestContext, details: RequestDetails) -> bool {
        let marker = utils::dispatched_key(&event.request_id);

        let claimed = match self.instance.compare_and_swap(
            marker.as_bytes(),
            None as Option<&[u8]>,
            Some(&b"1"[..]),
        ) {
            Ok(Ok(())) => true,
            // marker already present, a previous call scheduled the job
            Ok(Err(_)) => false,
            Err(e) => {
                tracing::warn!(error = %e, request_id = %event.request_id, "failed to claim dispatch marker");
                false
            }
        };
        if !claimed {
            return false;
        }

        let db = Arc::clone(&self.instance);
        let renderer = Arc::clone(&self.renderer);
        let notifier = Arc::clone(&self.notifier);

        thread::spawn(move || {
            if let Err(e) = run_job(&db, renderer.as_ref(), notifier.as_ref(), &ctx, &details) {
                tracing::warn!(error = %e, request_id = %ctx.request_id, "approved-request side effects failed");
            }
        });

        true
    }
}

fn run_job(
    db: &Db,
    renderer: &dyn DocumentRenderer,
    notifier: &dyn Notifier,
    ctx: &RequestContext,
    details: &RequestDetails,
) -> anyhow::Result<()> {
    let record = renderer.render(ctx, details)?;
    let key = utils::document_key(&ctx.request_id);
    db.insert(key.as_bytes(), record)?;

    notifier.send(
        &ctx.owner.email,
        EmailTemplate::RequestApproved,
        &NotifyContext {
            request_id: ctx.request_id.clone(),
            label: details.label(),
            document_key: Some(key),
        },
    )?;

    Ok(())
}
