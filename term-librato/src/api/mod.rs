//! One-shot access to the Librato HTTP API.

mod client;
pub mod response;
pub mod transport;

pub use client::{AnnotationStream, LibratoClient};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
