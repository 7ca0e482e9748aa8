//! Property-based tests for the approval transition rule
//!
//! This module uses proptest to verify that the transition logic in
//! RequestContext behaves correctly across a wide variety of action
//! sequences. The transition rule is critical - bugs here corrupt the entire
//! approval workflow.
//!
//! These tests focus on invariants that should hold regardless of the
//! specific action sequence, helping catch edge cases in the state machine
//! that would be difficult to find with manual test case selection.

use proptest::prelude::*;
use request_approval::{
    actor::{Actor, Role},
    authority,
    context::{RequestContext, Status},
    ledger::{ApprovalAction, Decision},
    request::{Domain, MissionType, TimeStamp},
};

// These property tests cover:
//
// 1. Terminal status stability - workflow endpoints are truly final
// 2. Decisive designation - only the designated role finalizes an approval
// 3. Rejection designation - any permitted role finalizes a rejection
// 4. Ledger integrity - only permitted actions are ever recorded
// 5. Serialization correctness - critical for persistence
//
// What these tests DON'T cover (deliberately):
//
// - Database persistence and the compare-and-swap race (integration tests)
// - Document and notification side effects (handled by the dispatcher)
//

/// Strategy to generate any role from the closed set
fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

/// Strategy to generate a decision
fn decision_strategy() -> impl Strategy<Value = Decision> {
    prop::bool::ANY.prop_map(|b| if b { Decision::Approved } else { Decision::Rejected })
}

/// Strategy to generate a routing domain
fn domain_strategy() -> impl Strategy<Value = Domain> {
    prop_oneof![
        Just(Domain::Leave),
        Just(Domain::Mission(MissionType::Local)),
        Just(Domain::Mission(MissionType::International)),
    ]
}

/// Strategy to generate a sequence of attempted actions (1 to 10)
fn attempt_sequence_strategy() -> impl Strategy<Value = Vec<(Role, Decision)>> {
    prop::collection::vec((role_strategy(), decision_strategy()), 1..=10)
}

fn fresh_context(domain: Domain) -> RequestContext {
    let owner = Actor::new(
        "user_1owner".to_string(),
        "Test Owner",
        "owner@example.edu",
        "Physics",
        Role::Employee,
    );
    RequestContext::new_with("req_1prop".to_string(), owner, domain, "hash_prop".to_string())
}

fn attempt(ctx: &RequestContext, role: Role, decision: Decision) -> ApprovalAction {
    let approver = Actor::new(
        format!("user_1{:?}", role),
        "Test Approver",
        "approver@example.edu",
        "Somewhere",
        role,
    );
    ApprovalAction::new(
        ctx.request_id.clone(),
        &approver,
        decision,
        "",
        TimeStamp::new(),
    )
}

// PROPERTY TESTS
proptest! {
    /// Property: a closed request never changes again
    ///
    /// Once any action closes the request, every further attempt must fail
    /// with an error and leave both status and ledger untouched.
    #[test]
    fn prop_terminal_status_is_stable(
        domain in domain_strategy(),
        attempts in attempt_sequence_strategy(),
        extra_attempts in attempt_sequence_strategy(),
    ) {
        let mut ctx = fresh_context(domain);

        for (role, decision) in attempts {
            let _ = ctx.apply(attempt(&ctx, role, decision));
        }

        if ctx.status == Status::Pending {
            // nothing closed the request, nothing to assert here
            return Ok(());
        }

        let closed_status = ctx.status;
        let closed_ledger_len = ctx.ledger.len();

        for (role, decision) in extra_attempts {
            let result = ctx.apply(attempt(&ctx, role, decision));
            prop_assert!(result.is_err(), "closed request accepted an action");
        }

        prop_assert_eq!(ctx.status, closed_status, "closed status drifted");
        prop_assert_eq!(ctx.ledger.len(), closed_ledger_len, "closed ledger grew");
    }

    /// Property: an approved request was closed by its decisive role
    ///
    /// Whatever the action sequence, reaching Approved means the last ledger
    /// entry is an APPROVED decision from the domain's designated final
    /// approver.
    #[test]
    fn prop_approved_implies_decisive_last_entry(
        domain in domain_strategy(),
        attempts in attempt_sequence_strategy(),
    ) {
        let mut ctx = fresh_context(domain);

        for (role, decision) in attempts {
            let _ = ctx.apply(attempt(&ctx, role, decision));
        }

        if ctx.status == Status::Approved {
            let last = ctx.ledger.last().expect("approved request with empty ledger");
            prop_assert_eq!(last.decision, Decision::Approved);
            prop_assert_eq!(last.role, authority::decisive_role(domain));
        }
    }

    /// Property: a rejected request was closed by a permitted rejection
    #[test]
    fn prop_rejected_implies_permitted_last_entry(
        domain in domain_strategy(),
        attempts in attempt_sequence_strategy(),
    ) {
        let mut ctx = fresh_context(domain);

        for (role, decision) in attempts {
            let _ = ctx.apply(attempt(&ctx, role, decision));
        }

        if ctx.status == Status::Rejected {
            let last = ctx.ledger.last().expect("rejected request with empty ledger");
            prop_assert_eq!(last.decision, Decision::Rejected);
            prop_assert!(authority::can_decide(last.role, domain));
        }
    }

    /// Property: a request still open holds no decisive entry
    ///
    /// While status is Pending the ledger may hold non-decisive opinions,
    /// but never a rejection and never an approval from the decisive role.
    #[test]
    fn prop_pending_holds_no_decisive_entry(
        domain in domain_strategy(),
        attempts in attempt_sequence_strategy(),
    ) {
        let mut ctx = fresh_context(domain);

        for (role, decision) in attempts {
            let _ = ctx.apply(attempt(&ctx, role, decision));
        }

        if ctx.status == Status::Pending {
            for entry in ctx.ledger.iter() {
                prop_assert_eq!(entry.decision, Decision::Approved);
                prop_assert!(!authority::is_decisive(entry.role, domain));
            }
        }
    }

    /// Property: every recorded entry passed the permission gate
    #[test]
    fn prop_ledger_holds_only_permitted_entries(
        domain in domain_strategy(),
        attempts in attempt_sequence_strategy(),
    ) {
        let mut ctx = fresh_context(domain);

        for (role, decision) in attempts {
            let _ = ctx.apply(attempt(&ctx, role, decision));
        }

        for entry in ctx.ledger.iter() {
            prop_assert!(
                authority::can_decide(entry.role, domain),
                "ledger holds an entry from unpermitted role {:?}",
                entry.role
            );
        }
    }

    /// Property: display history is the exact reverse of chronological order
    #[test]
    fn prop_history_reverses_chronology(
        domain in domain_strategy(),
        attempts in attempt_sequence_strategy(),
    ) {
        let mut ctx = fresh_context(domain);

        for (role, decision) in attempts {
            let _ = ctx.apply(attempt(&ctx, role, decision));
        }

        let chronological: Vec<_> = ctx.ledger.iter().collect();
        let mut displayed = ctx.history();
        displayed.reverse();

        prop_assert_eq!(chronological, displayed);
    }

    /// Property: CBOR serialization round-trip preserves the whole record
    ///
    /// Critical for persistence: encoding then decoding a RequestContext
    /// must produce an identical status and ledger.
    #[test]
    fn prop_cbor_roundtrip_preserves_record(
        domain in domain_strategy(),
        attempts in attempt_sequence_strategy(),
    ) {
        let mut ctx = fresh_context(domain);

        for (role, decision) in attempts {
            let _ = ctx.apply(attempt(&ctx, role, decision));
        }

        let (_hash, cbor) = ctx.serialize_with_hash()
            .expect("Serialization should succeed");

        let decoded: RequestContext = minicbor::decode(&cbor)
            .expect("Deserialization should succeed");

        prop_assert_eq!(ctx, decoded);
    }
}

// TARGETED PROPERTY TESTS FOR SPECIFIC INVARIANTS

proptest! {
    /// Property: the decisive role alone closes an approval in one step
    ///
    /// For any domain, an APPROVED decision from the decisive role on a
    /// fresh request closes it, and the same decision from any other
    /// permitted role leaves it open.
    #[test]
    fn prop_only_decisive_role_finalises(
        domain in domain_strategy(),
        role in role_strategy(),
    ) {
        prop_assume!(authority::can_decide(role, domain));

        let mut ctx = fresh_context(domain);
        ctx.apply(attempt(&ctx, role, Decision::Approved)).unwrap();

        if authority::is_decisive(role, domain) {
            prop_assert_eq!(ctx.status, Status::Approved);
        } else {
            prop_assert_eq!(ctx.status, Status::Pending);
        }
    }

    /// Property: any permitted rejection closes a fresh request
    #[test]
    fn prop_any_permitted_rejection_finalises(
        domain in domain_strategy(),
        role in role_strategy(),
    ) {
        prop_assume!(authority::can_decide(role, domain));

        let mut ctx = fresh_context(domain);
        ctx.apply(attempt(&ctx, role, Decision::Rejected)).unwrap();

        prop_assert_eq!(ctx.status, Status::Rejected);
    }
}
