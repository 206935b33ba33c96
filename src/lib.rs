pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod hydration;
pub mod resources;
pub mod session;

#[cfg(test)]
pub mod testing;

pub use auth::{AuthApi, AuthOutcome, Identity};
pub use client::{ApiClient, QueryParams, RequestDescriptor};
pub use config::{config, ClientConfig};
pub use error::{ApiError, ApiResult};
pub use hydration::{HydrationController, HydrationState, RouteAccess, RouteDecision};
pub use resources::Console;
pub use session::{Credential, Session, SessionEvent, SessionMode, SessionStore};
