pub mod actor;
pub mod authority;
pub mod context;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod ledger;
pub mod notify;
pub mod request;
pub mod service;
pub mod utils;
