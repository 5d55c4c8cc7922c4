//! Localized message templates.
//!
//! A flat per-(type, language) string table with `{{variable}}` substitution.
//! The template set is small, fixed and editorial (translator-owned), so a
//! direct lookup table stays auditable where a generic i18n engine would not.

mod catalog;
mod engine;

pub use engine::{MessageTemplate, RenderedMessage, TemplateEngine};
