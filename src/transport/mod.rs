//! Client-side HTTP request plumbing
//!
//! Builds requests, retries transient failures, and reads response bodies as
//! text or as strictly decoded records. No HTTP client is bundled: callers
//! plug one in through the `Transport` trait.

mod errors;
mod request;
mod retry;

pub use errors::{TransportError, TransportResult};
pub use request::{
    Method, PreparedRequest, RawResponse, Request, ResponseShape, Transport, NO_CONTENT,
};
pub use retry::{RetryPolicy, TRANSIENT_STATUS_CODES};
