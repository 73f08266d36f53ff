pub mod client;

pub use client::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model service is not reachable at {0}")]
    Connection(String),

    #[error("model request timed out after {0}s")]
    Timeout(u64),

    #[error("model service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("response decoding error: {0}")]
    ResponseDecode(String),
}
