//! Request handlers, one module per route family.

use axum::Json;

use crate::error::ApiResult;
use crate::session::Page;

pub mod accessibility;
pub mod health;
pub mod inventory;

/// What a GET handler returns.
pub type PageResult<T> = ApiResult<Json<Page<T>>>;
