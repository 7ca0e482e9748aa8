//! Request lifecycle: the per-request status record and its transition rule
use super::actor::Actor;
use super::authority;
use super::error::ApprovalError;
use super::ledger::{ApprovalAction, Decision, Ledger};
use super::request::{Domain, TimeStamp};
use super::utils;
use chrono::Utc;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[n(0)]
    Pending,
    #[n(1)]
    Approved,
    #[n(2)]
    Rejected,
    #[n(3)]
    Cancelled,
    #[n(4)]
    Completed,
}

impl Status {
    /// Approval actions are only accepted while the request is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Status::Pending)
    }
}

/// Outcome of applying a single approval action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Recorded in the ledger; the request stays open pending the
    /// designated final approver.
    Recorded,
    Approved,
    Rejected,
}

/// The persisted workflow record of one request: its owner, routing key,
/// content-addressed details, current status and the approval ledger.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    #[n(0)]
    pub request_id: String, // uuid7, bech32 encoded
    #[n(1)]
    pub owner: Actor,
    #[n(2)]
    pub domain: Domain,
    #[n(3)]
    pub details_hash: String, // hash of a request-details object
    #[n(4)]
    pub status: Status,
    #[n(5)]
    pub created_at: TimeStamp<Utc>,
    #[n(6)]
    pub ledger: Ledger,
}

impl RequestContext {
    pub fn new(owner: Actor, domain: Domain, details_hash: String) -> anyhow::Result<Self> {
        Ok(Self::new_with(
            utils::new_request_id()?,
            owner,
            domain,
            details_hash,
        ))
    }

    pub fn new_with(request_id: String, owner: Actor, domain: Domain, details_hash: String) -> Self {
        Self {
            request_id,
            owner,
            domain,
            details_hash,
            status: Status::Pending,
            created_at: TimeStamp::new(),
            ledger: Ledger::new(),
        }
    }

    /// Applies one approval action: permission gate, open-state gate,
    /// unconditional ledger append, then the decisive designation.
    ///
    /// Only the domain's decisive role finalizes an approval; any permitted
    /// role finalizes a rejection. Everything else is recorded and leaves
    /// the request open.
    pub fn apply(&mut self, action: ApprovalAction) -> Result<Transition, ApprovalError> {
        if !authority::can_decide(action.role, self.domain) {
            return Err(ApprovalError::PermissionDenied(action.role));
        }
        if !self.status.is_open() {
            return Err(ApprovalError::InvalidState(self.status));
        }

        let role = action.role;
        let decision = action.decision;
        self.ledger.append(action);

        match decision {
            Decision::Rejected => {
                self.status = Status::Rejected;
                Ok(Transition::Rejected)
            }
            Decision::Approved if authority::is_decisive(role, self.domain) => {
                self.status = Status::Approved;
                Ok(Transition::Approved)
            }
            Decision::Approved => Ok(Transition::Recorded),
        }
    }

    /// Withdraws an open request. Owner only; no ledger entry is written.
    pub fn cancel_by(&mut self, actor: &Actor) -> Result<(), ApprovalError> {
        if actor.id != self.owner.id {
            return Err(ApprovalError::PermissionDenied(actor.role));
        }
        if !self.status.is_open() {
            return Err(ApprovalError::InvalidState(self.status));
        }

        self.status = Status::Cancelled;
        Ok(())
    }

    /// Marks an approved mission as carried out. Owner only; leaves never
    /// reach this status.
    pub fn complete_by(&mut self, actor: &Actor) -> Result<(), ApprovalError> {
        if actor.id != self.owner.id {
            return Err(ApprovalError::PermissionDenied(actor.role));
        }
        let Domain::Mission(_) = self.domain else {
            return Err(ApprovalError::InvalidState(self.status));
        };
        if self.status != Status::Approved {
            return Err(ApprovalError::InvalidState(self.status));
        }

        self.status = Status::Completed;
        Ok(())
    }

    /// Ledger in display order, most recent first.
    pub fn history(&self) -> Vec<&ApprovalAction> {
        self.ledger.history()
    }

    pub fn serialize_with_hash(&self) -> anyhow::Result<(String, Vec<u8>)> {
        let cbor = minicbor::to_vec(self)?;
        let hash = sha256::digest(&cbor);

        Ok((hash, cbor))
    }
}
