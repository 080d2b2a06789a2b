pub mod certificate_request;
pub mod cors;

pub use certificate_request::VerifyPayload;
pub use cors::{CorsPolicy, cors_guard};
