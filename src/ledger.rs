//! Append-only record of approval actions taken on a request
use super::actor::{Actor, Role};
use super::request::TimeStamp;
use chrono::Utc;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    #[n(0)]
    Approved,
    #[n(1)]
    Rejected,
}

/// One approval or rejection recorded against a request. Never mutated
/// after creation.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct ApprovalAction {
    #[n(0)]
    pub request_id: String,
    #[n(1)]
    pub actor_id: String,
    #[n(2)]
    pub actor_name: String,
    #[n(3)]
    pub role: Role,
    #[n(4)]
    pub decision: Decision,
    #[n(5)]
    pub comment: String,
    #[n(6)]
    pub timestamp: TimeStamp<Utc>,
}

impl ApprovalAction {
    pub fn new(
        request_id: String,
        actor: &Actor,
        decision: Decision,
        comment: impl Into<String>,
        timestamp: TimeStamp<Utc>,
    ) -> Self {
        Self {
            request_id,
            actor_id: actor.id.clone(),
            actor_name: actor.full_name.clone(),
            role: actor.role,
            decision,
            comment: comment.into(),
            timestamp,
        }
    }
}

/// Ordered action history owned by its request. Insertion order is
/// chronological; there is no removal or mutation API.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, PartialEq, Eq)]
#[cbor(array)]
pub struct Ledger(#[n(0)] Vec<ApprovalAction>);

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action and returns its position in the chronological
    /// sequence.
    pub fn append(&mut self, action: ApprovalAction) -> usize {
        self.0.push(action);
        self.0.len() - 1
    }

    /// Chronological order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ApprovalAction> {
        self.0.iter()
    }

    /// Display order, most recent first.
    pub fn history(&self) -> Vec<&ApprovalAction> {
        self.0.iter().rev().collect()
    }

    pub fn last(&self) -> Option<&ApprovalAction> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor::new(
            "user_1test".to_string(),
            "Test Actor",
            "actor@example.edu",
            "Physics",
            role,
        )
    }

    #[test]
    fn history_is_most_recent_first() {
        let mut ledger = Ledger::new();
        let hod = actor(Role::Hod);
        let hr = actor(Role::Hr);

        ledger.append(ApprovalAction::new(
            "req_1".to_string(),
            &hod,
            Decision::Approved,
            "fine by me",
            TimeStamp::new_with(2026, 1, 5, 9, 0, 0),
        ));
        ledger.append(ApprovalAction::new(
            "req_1".to_string(),
            &hr,
            Decision::Approved,
            "",
            TimeStamp::new_with(2026, 1, 6, 9, 0, 0),
        ));

        let history = ledger.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::Hr);
        assert_eq!(history[1].role, Role::Hod);
    }

    #[test]
    fn append_returns_sequence_position() {
        let mut ledger = Ledger::new();
        let hod = actor(Role::Hod);

        let first = ledger.append(ApprovalAction::new(
            "req_1".to_string(),
            &hod,
            Decision::Approved,
            "",
            TimeStamp::new(),
        ));
        let second = ledger.append(ApprovalAction::new(
            "req_1".to_string(),
            &hod,
            Decision::Approved,
            "",
            TimeStamp::new(),
        ));

        assert_eq!(first, 0);
        assert_eq!(second, 1);
    }
}
