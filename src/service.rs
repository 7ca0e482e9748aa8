//! Service layer API for request workflow operations
use super::actor::Actor;
use super::authority;
use super::context::{RequestContext, Status, Transition};
use super::dispatch::{Dispatcher, RequestApproved};
use super::document::{DocumentRenderer, RecordRenderer};
use super::error::{ApprovalError, ValidationError};
use super::ledger::{ApprovalAction, Decision};
use super::notify::{Notifier, TracingNotifier};
use super::request::{RequestDetails, TimeStamp};
use super::utils;
use sled::Batch;
use std::sync::Arc;

pub struct ApprovalService {
    instance: Arc<sled::Db>,
    dispatcher: Dispatcher,
    // in future we could add a config for approval constraints
}

impl ApprovalService {
    /// Service with the default collaborators: plain-text records and a
    /// logging notifier.
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self::with_collaborators(instance, Arc::new(RecordRenderer), Arc::new(TracingNotifier))
    }

    pub fn with_collaborators(
        instance: Arc<sled::Db>,
        renderer: Arc<dyn DocumentRenderer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let dispatcher = Dispatcher::new(Arc::clone(&instance), renderer, notifier);
        Self {
            instance,
            dispatcher,
        }
    }

    /// Load a request context together with the raw bytes it was decoded
    /// from, for the compare-and-swap paths.
    fn load_raw(&self, request_id: &str) -> anyhow::Result<(RequestContext, sled::IVec)> {
        let key = utils::request_key(request_id);
        let bytes = self
            .instance
            .get(key.as_bytes())?
            .ok_or_else(|| ApprovalError::NotFound(request_id.to_string()))?;
        let ctx: RequestContext = minicbor::decode(&bytes)?;

        Ok((ctx, bytes))
    }

    /// Load the content-addressed descriptive payload of a request.
    pub fn load_details(&self, details_hash: &str) -> anyhow::Result<RequestDetails> {
        let bytes = self
            .instance
            .get(utils::details_key(details_hash).as_bytes())?
            .ok_or_else(|| ApprovalError::NotFound(details_hash.to_string()))?;

        Ok(minicbor::decode(&bytes)?)
    }

    /// Submit a new request for approval
    pub fn submit_request(
        &self,
        details: RequestDetails,
        owner: Actor,
    ) -> anyhow::Result<RequestContext> {
        // Validate and serialize request details
        let (details_hash, details_cbor) = details.validate_and_finalise()?;

        let Some(domain) = details.domain() else {
            return Err(ValidationError::MissingField("mission_type").into());
        };

        // Create new request context, Pending with an empty ledger
        let ctx = RequestContext::new(owner, domain, details_hash.clone())?;

        // Batch insert: request details and request context
        let mut batch = Batch::default();
        batch.insert(utils::details_key(&details_hash).into_bytes(), details_cbor);
        batch.insert(
            utils::request_key(&ctx.request_id).into_bytes(),
            minicbor::to_vec(&ctx)?,
        );
        self.instance.apply_batch(batch)?;

        Ok(ctx)
    }

    /// Record an approval or rejection on an open request.
    ///
    /// Ledger append and status transition commit as one compare-and-swap
    /// on the context record. A loser that re-observes a closed request
    /// fails with InvalidState; a loser that re-observes an open one (a
    /// concurrent non-decisive opinion) retries.
    pub fn decide(
        &self,
        request_id: &str,
        actor: &Actor,
        decision: Decision,
        comment: &str,
    ) -> anyhow::Result<RequestContext> {
        let key = utils::request_key(request_id);

        loop {
            let (mut ctx, old_bytes) = self.load_raw(request_id)?;

            // requests outside the actor's visibility slice read as absent
            if !authority::can_view(actor, &ctx.owner, ctx.domain) {
                return Err(ApprovalError::NotFound(request_id.to_string()).into());
            }

            let action = ApprovalAction::new(
                ctx.request_id.clone(),
                actor,
                decision,
                comment,
                TimeStamp::new(),
            );
            let transition = ctx.apply(action)?;

            let new_bytes = minicbor::to_vec(&ctx)?;
            match self
                .instance
                .compare_and_swap(key.as_bytes(), Some(&old_bytes), Some(new_bytes))?
            {
                Ok(()) => {
                    if transition == Transition::Approved {
                        // the approval is committed; a failed dispatch is
                        // logged and left to external retry
                        match self.load_details(&ctx.details_hash) {
                            Ok(details) => {
                                self.dispatcher.on_approved(
                                    RequestApproved {
                                        request_id: ctx.request_id.clone(),
                                    },
                                    ctx.clone(),
                                    details,
                                );
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, request_id = %ctx.request_id, "details missing for approved-request dispatch");
                            }
                        }
                    }
                    return Ok(ctx);
                }
                // lost the race for this record, re-observe and try again
                Err(_) => continue,
            }
        }
    }

    /// Withdraw an open request. Owner only.
    pub fn cancel_request(&self, request_id: &str, actor: &Actor) -> anyhow::Result<RequestContext> {
        let key = utils::request_key(request_id);

        loop {
            let (mut ctx, old_bytes) = self.load_raw(request_id)?;

            if !authority::can_view(actor, &ctx.owner, ctx.domain) {
                return Err(ApprovalError::NotFound(request_id.to_string()).into());
            }

            ctx.cancel_by(actor)?;

            let new_bytes = minicbor::to_vec(&ctx)?;
            match self
                .instance
                .compare_and_swap(key.as_bytes(), Some(&old_bytes), Some(new_bytes))?
            {
                Ok(()) => return Ok(ctx),
                Err(_) => continue,
            }
        }
    }

    /// Mark an approved mission as carried out. Owner only.
    pub fn complete_mission(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> anyhow::Result<RequestContext> {
        let key = utils::request_key(request_id);

        loop {
            let (mut ctx, old_bytes) = self.load_raw(request_id)?;

            if !authority::can_view(actor, &ctx.owner, ctx.domain) {
                return Err(ApprovalError::NotFound(request_id.to_string()).into());
            }

            ctx.complete_by(actor)?;

            let new_bytes = minicbor::to_vec(&ctx)?;
            match self
                .instance
                .compare_and_swap(key.as_bytes(), Some(&old_bytes), Some(new_bytes))?
            {
                Ok(()) => return Ok(ctx),
                Err(_) => continue,
            }
        }
    }

    /// Visibility-filtered fetch of a single request.
    pub fn get_request(&self, request_id: &str, actor: &Actor) -> anyhow::Result<RequestContext> {
        let (ctx, _) = self.load_raw(request_id)?;

        if !authority::can_view(actor, &ctx.owner, ctx.domain) {
            return Err(ApprovalError::NotFound(request_id.to_string()).into());
        }

        Ok(ctx)
    }

    /// Open requests the actor is entitled to decide on, newest first.
    pub fn pending_approvals(&self, actor: &Actor) -> anyhow::Result<Vec<RequestContext>> {
        let mut pending: Vec<RequestContext> = self
            .scan_requests()?
            .into_iter()
            .filter(|ctx| ctx.status == Status::Pending)
            .filter(|ctx| authority::can_view(actor, &ctx.owner, ctx.domain))
            .filter(|ctx| authority::can_decide(actor.role, ctx.domain))
            .collect();
        pending.sort_by(|a, b| {
            b.created_at
                .to_datetime_utc()
                .cmp(&a.created_at.to_datetime_utc())
        });

        Ok(pending)
    }

    /// Every request inside the actor's visibility slice, newest first.
    pub fn requests_for(&self, actor: &Actor) -> anyhow::Result<Vec<RequestContext>> {
        let mut visible: Vec<RequestContext> = self
            .scan_requests()?
            .into_iter()
            .filter(|ctx| authority::can_view(actor, &ctx.owner, ctx.domain))
            .collect();
        visible.sort_by(|a, b| {
            b.created_at
                .to_datetime_utc()
                .cmp(&a.created_at.to_datetime_utc())
        });

        Ok(visible)
    }

    /// The persisted record artifact for a request, when the dispatcher has
    /// produced one.
    pub fn document(&self, request_id: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let bytes = self
            .instance
            .get(utils::document_key(request_id).as_bytes())?;

        Ok(bytes.map(|b| b.to_vec()))
    }

    fn scan_requests(&self) -> anyhow::Result<Vec<RequestContext>> {
        let mut contexts = Vec::new();

        for entry in self.instance.scan_prefix(utils::REQUEST_PREFIX.as_bytes()) {
            let (key, bytes) = entry?;
            match minicbor::decode(&bytes) {
                Ok(ctx) => contexts.push(ctx),
                Err(e) => {
                    tracing::warn!(error = %e, key = %String::from_utf8_lossy(&key), "skipping undecodable request record");
                }
            }
        }

        Ok(contexts)
    }
}
