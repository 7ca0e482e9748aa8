use crate::actor::Role;
use crate::context::Status;

#[derive(thiserror::Error, Debug)]
pub enum ApprovalError {
    #[error("Role {0:?} is not permitted to decide on this request")]
    PermissionDenied(Role),
    #[error("Request is not open for this action. Current status: {0:?}")]
    InvalidState(Status),
    #[error("Request not found: {0}")]
    NotFound(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Required field '{0}' is not set")]
    MissingField(&'static str),
    #[error("Start Date <= End Date failed")]
    InvalidDates,
    #[error("Estimated cost is set to zero")]
    ZeroCost,
}
