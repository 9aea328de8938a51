//! Shared pieces of the context mappings handed to the presentation layer.

use serde::Serialize;

use registro_core::FormData;
use registro_core::validation::{FormField, Schema};

/// A form to render: its title, its fields and any values to prefill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormPage {
    /// Page title
    pub titulo: String,
    /// Field descriptions, in display order
    pub campos: Vec<FormField>,
    /// Prefilled values, keyed by field name
    pub valores: FormData,
}

impl FormPage {
    /// An empty form for `schema`.
    pub fn new(titulo: impl Into<String>, schema: &Schema) -> Self {
        Self {
            titulo: titulo.into(),
            campos: schema.form_fields(),
            valores: FormData::new(),
        }
    }

    /// Prefills the form.
    pub fn with_values(mut self, valores: FormData) -> Self {
        self.valores = valores;
        self
    }
}
