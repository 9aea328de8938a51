//! Actor lookups on request parts.

use registro_core::Actor;

/// The `Actor` the middleware stored for this request, if any.
pub fn actor_from_parts(parts: &http::request::Parts) -> Option<&Actor> {
    parts.extensions.get::<Actor>()
}
