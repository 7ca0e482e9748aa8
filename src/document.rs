//! Record rendering for approved requests
use super::authority;
use super::context::{RequestContext, Status};
use super::ledger::Decision;
use super::request::RequestDetails;
use std::fmt::Write;

/// Renders the archival record of a request from the request and its full
/// ledger snapshot. Pure function of its inputs; no side effects beyond
/// producing bytes.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, ctx: &RequestContext, details: &RequestDetails) -> anyhow::Result<Vec<u8>>;
}

/// Plain-text record layout: request header, descriptive fields, the
/// approval chain (most recent first) and a signature line once approved.
pub struct RecordRenderer;

impl DocumentRenderer for RecordRenderer {
    fn render(&self, ctx: &RequestContext, details: &RequestDetails) -> anyhow::Result<Vec<u8>> {
        let mut out = String::new();

        match details {
            RequestDetails::Mission(m) => {
                writeln!(out, "Mission Request: {}", m.title().unwrap_or("(untitled)"))?;
                writeln!(out)?;
                writeln!(out, "Employee: {}", ctx.owner.full_name)?;
                writeln!(out, "Department: {}", ctx.owner.department)?;
                if let Some(mission_type) = m.mission_type() {
                    writeln!(out, "Mission Type: {:?}", mission_type)?;
                }
                writeln!(out, "Destination: {}", m.destination().unwrap_or(""))?;
                if let Some(start) = m.start_date() {
                    writeln!(out, "Start Date: {}", start.to_naive_date())?;
                }
                if let Some(end) = m.end_date() {
                    writeln!(out, "End Date: {}", end.to_naive_date())?;
                }
                writeln!(out, "Purpose: {}", m.purpose().unwrap_or(""))?;
                let cost = m.estimated_cost();
                writeln!(out, "Estimated Cost: {}.{:02}", cost / 100, cost % 100)?;
            }
            RequestDetails::Leave(l) => {
                writeln!(out, "Leave Request: {}", details.label())?;
                writeln!(out)?;
                writeln!(out, "Employee: {}", ctx.owner.full_name)?;
                writeln!(out, "Department: {}", ctx.owner.department)?;
                if let Some(start) = l.start_date() {
                    writeln!(out, "Start Date: {}", start.to_naive_date())?;
                }
                if let Some(end) = l.end_date() {
                    writeln!(out, "End Date: {}", end.to_naive_date())?;
                }
                if let Some(days) = l.duration_days() {
                    writeln!(out, "Duration: {} days", days)?;
                }
                writeln!(out, "Reason: {}", l.reason().unwrap_or(""))?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Approval Chain:")?;
        for action in ctx.history() {
            let decision = match action.decision {
                Decision::Approved => "Approved",
                Decision::Rejected => "Rejected",
            };
            writeln!(
                out,
                "{} ({}) - {}",
                action.actor_name,
                action.role.title(),
                decision
            )?;
            if !action.comment.is_empty() {
                writeln!(out, "Comments: {}", action.comment)?;
            }
        }

        // the most recent approval from the signing role carries the signature
        if ctx.status == Status::Approved {
            let signer = ctx
                .history()
                .into_iter()
                .find(|a| a.decision == Decision::Approved && authority::can_sign(a.role, ctx.domain));
            if let Some(signer) = signer {
                writeln!(out)?;
                writeln!(out, "Signed by: {}", signer.actor_name)?;
            }
        }

        Ok(out.into_bytes())
    }
}
