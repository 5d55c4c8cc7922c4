//! Template engine.
//!
//! Selects the (type, language) template with English fallback and replaces
//! `{{variable}}` placeholders from the supplied variable set.

use std::collections::HashMap;

use regex::Regex;
use tracing::warn;

use mandilink_shared::events::{Language, NotificationType};

/// A title/body template pair for one (type, language) combination
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub title: String,
    pub body: String,
}

/// Fully rendered notification text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub title: String,
    pub body: String,
}

/// Template engine
///
/// Holds the registered catalog and performs variable substitution.
pub struct TemplateEngine {
    templates: HashMap<NotificationType, HashMap<Language, MessageTemplate>>,
    /// Matches {{variable_name}}; names are word characters
    variable_regex: Regex,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TemplateEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            variable_regex: Regex::new(r"\{\{(\w+)\}\}").unwrap(),
        }
    }

    /// Create an engine preloaded with the shipped catalog
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        super::catalog::install(&mut engine);
        engine
    }

    /// Register a template for one (type, language) combination
    pub fn register_template(
        &mut self,
        notification_type: NotificationType,
        language: Language,
        title: impl Into<String>,
        body: impl Into<String>,
    ) {
        self.templates
            .entry(notification_type)
            .or_default()
            .insert(
                language,
                MessageTemplate {
                    title: title.into(),
                    body: body.into(),
                },
            );
    }

    /// Look up a template: exact language first, then the English variant
    pub fn resolve(
        &self,
        notification_type: NotificationType,
        language: Language,
    ) -> Option<&MessageTemplate> {
        let family = self.templates.get(&notification_type)?;
        family
            .get(&language)
            .or_else(|| family.get(&Language::English))
    }

    /// Render the notification text for a (type, language) pair.
    ///
    /// An unknown type (no family registered at all) produces a generic
    /// message embedding the type name rather than an error: a missing
    /// translation must never stop a delivery.
    pub fn render(
        &self,
        notification_type: NotificationType,
        language: Language,
        variables: &HashMap<String, String>,
    ) -> RenderedMessage {
        match self.resolve(notification_type, language) {
            Some(template) => RenderedMessage {
                title: self.substitute(&template.title, variables),
                body: self.substitute(&template.body, variables),
            },
            None => {
                warn!(
                    notification_type = %notification_type,
                    "no template registered, using generic fallback"
                );
                RenderedMessage {
                    title: notification_type.to_string(),
                    body: format!("You have a new {notification_type} notification."),
                }
            }
        }
    }

    /// Replace every `{{name}}` with the variable's value.
    ///
    /// Missing variables render as the empty string: a forgotten variable in
    /// an upstream payload must not leak raw placeholder syntax to farmers.
    fn substitute(&self, template: &str, variables: &HashMap<String, String>) -> String {
        self.variable_regex
            .replace_all(template, |caps: &regex::Captures| {
                let var_name = &caps[1];
                match variables.get(var_name) {
                    Some(value) => value.clone(),
                    None => {
                        warn!(variable = var_name, "template variable missing, eliding");
                        String::new()
                    }
                }
            })
            .into_owned()
    }

    /// All variable names referenced by a template string
    pub fn extract_variables(&self, template: &str) -> Vec<String> {
        self.variable_regex
            .captures_iter(template)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Every (type, language) pair in the catalog, for completeness checks
    pub fn registered_pairs(&self) -> Vec<(NotificationType, Language)> {
        self.templates
            .iter()
            .flat_map(|(t, family)| family.keys().map(|l| (*t, *l)))
            .collect()
    }
}
