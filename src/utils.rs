//! Utility functions for id minting and keyspace layout

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

pub fn new_request_id() -> anyhow::Result<String> {
    new_uuid_to_bech32("req_")
}

pub fn new_user_id() -> anyhow::Result<String> {
    new_uuid_to_bech32("user_")
}

// All records share one sled tree; the prefix is the namespace.
pub const REQUEST_PREFIX: &str = "request/";

pub fn request_key(request_id: &str) -> String {
    format!("{REQUEST_PREFIX}{request_id}")
}

pub fn details_key(details_hash: &str) -> String {
    format!("details/{details_hash}")
}

pub fn document_key(request_id: &str) -> String {
    format!("document/{request_id}")
}

// idempotency marker for the approved-request dispatch
pub fn dispatched_key(request_id: &str) -> String {
    format!("dispatched/{request_id}/approved")
}
