//! # Ingress Clients
//!
//! An ingress is a named entry point through which requests reach the backend
//! echo endpoint: the API gateway itself, or a reverse proxy chained in front
//! of it. Each [`IngressClient`] is bound to one [`Endpoint`] and issues plain
//! GET requests whose query parameters keep their declared order.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod registry;
pub mod request;
pub mod response;

pub use client::{ClientConfig, IngressClient};
pub use endpoint::Endpoint;
pub use error::{IngressError, Result};
pub use registry::IngressRegistry;
pub use request::{is_sensitive_param, RequestSpec, SUBSCRIPTION_KEY_PARAM};
pub use response::ResponseOutcome;
