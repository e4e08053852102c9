//! Immutable registry of provider templates.
//!
//! The catalog is assembled once (built-ins plus any custom templates) through
//! [`CatalogBuilder`] and then shared by reference; nothing mutates it after
//! `build()`.

use jobtrack_model::Template;
use tracing::debug;

use crate::builtin::builtin_templates;
use crate::error::{Result, TemplateError};

#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Catalog holding only the built-in provider templates.
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Looks up a template by id (trimmed, case-insensitive).
    pub fn get(&self, id: &str) -> Option<&Template> {
        let id = id.trim();
        self.templates
            .iter()
            .find(|template| template.id.eq_ignore_ascii_case(id))
    }

    /// Looks up a template, failing with `TemplateNotFound`.
    pub fn require(&self, id: &str) -> Result<&Template> {
        self.get(id).ok_or_else(|| TemplateError::not_found(id))
    }

    /// Templates in declaration order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|template| template.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Assembles a [`TemplateCatalog`], validating every template on entry.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    templates: Vec<Template>,
}

impl CatalogBuilder {
    /// Adds the built-in provider templates through the same checks as
    /// [`register`](Self::register).
    pub fn with_builtin(self) -> Result<Self> {
        self.register_all(builtin_templates())
    }

    /// Adds one template after checking its invariants and id uniqueness.
    pub fn register(mut self, template: Template) -> Result<Self> {
        template.validate()?;
        if self
            .templates
            .iter()
            .any(|existing| existing.id.eq_ignore_ascii_case(template.id.trim()))
        {
            return Err(TemplateError::DuplicateTemplateId { id: template.id });
        }
        debug!(template_id = %template.id, source = %template.source, "registered template");
        self.templates.push(template);
        Ok(self)
    }

    pub fn register_all(self, templates: impl IntoIterator<Item = Template>) -> Result<Self> {
        templates
            .into_iter()
            .try_fold(self, |builder, template| builder.register(template))
    }

    pub fn build(self) -> TemplateCatalog {
        TemplateCatalog {
            templates: self.templates,
        }
    }
}
