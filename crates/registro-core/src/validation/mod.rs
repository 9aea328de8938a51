//! Form validation.
//!
//! Each record type declares a static [`Schema`]: a list of [`FieldSpec`]s,
//! each with the [`Constraint`]s its submitted value must satisfy. One
//! generic [`validate`] function checks any submission against any schema
//! and either returns a typed [`CleanedForm`] or every field error at once.
//! Nothing reaches the record store without passing through it.

mod form;
mod proptests;
mod schema;

pub use form::{FieldErrors, FormData};
pub use schema::{
    CleanedForm, Constraint, DATE_FORMAT, FieldSpec, FormField, INVALID_DATE, INVALID_EMAIL,
    INVALID_INTEGER, INVALID_NUMBER, INVALID_REFERENCE, REQUIRED, Schema, Value, validate,
};
