pub mod http_client;
pub mod http_envelope;

pub use http_client::{HttpClient, QueryPairs, SessionEndHook};
pub use http_envelope::{ApiEnvelope, ErrorBody};
