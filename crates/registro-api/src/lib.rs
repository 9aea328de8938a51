#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Modules
//!
//! - [`router`]: Route table and middleware stack
//! - [`handlers`]: One handler per route
//! - [`session`]: Session cookie, request context and flash plumbing
//! - [`error`]: Mapping of workflow errors to HTTP responses

pub mod error;
pub mod handlers;
pub mod router;
pub mod session;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::router;
pub use session::{Ctx, Page, SESSION_COOKIE, SeeOther};
pub use state::AppState;
