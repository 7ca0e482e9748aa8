//! Notification contract for workflow events
//!
//! Transport lives outside the crate; implementations here either log the
//! delivery or record it for tests. Sends are fire-and-forget and retried
//! externally on failure.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    RequestApproved,
    ApprovalRequired,
}

impl EmailTemplate {
    pub fn subject(&self, label: &str) -> String {
        match self {
            EmailTemplate::RequestApproved => format!("Request Approved: {label}"),
            EmailTemplate::ApprovalRequired => format!("Approval Required: {label}"),
        }
    }
}

/// Template context for a single delivery attempt.
#[derive(Debug, Clone)]
pub struct NotifyContext {
    pub request_id: String,
    pub label: String,
    /// Storage key of the rendered record, when one exists.
    pub document_key: Option<String>,
}

pub trait Notifier: Send + Sync {
    fn send(
        &self,
        recipient: &str,
        template: EmailTemplate,
        context: &NotifyContext,
    ) -> anyhow::Result<()>;
}

/// Default notifier: emits the delivery as a structured log line and leaves
/// transport to the surrounding deployment.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send(
        &self,
        recipient: &str,
        template: EmailTemplate,
        context: &NotifyContext,
    ) -> anyhow::Result<()> {
        tracing::info!(
            recipient,
            request_id = %context.request_id,
            subject = %template.subject(&context.label),
            document_key = context.document_key.as_deref(),
            "notification queued"
        );
        Ok(())
    }
}
