//! Manifest document rendering
//!
//! Turns a resolved manifest back into a YAML document using the built-in
//! handlebars templates. Templates only emit fields that are present, so a
//! present-empty value survives the round trip and an unset one stays unset.

use handlebars::{handlebars_helper, Handlebars};
use std::io;
use std::path::Path;

use wkld_manifest::{ResolvedManifest, WorkloadKind};

/// Template id for load balanced web services.
pub const LB_WEB_TEMPLATE: &str = "workloads/services/lb-web/manifest.yml";

/// Template id for backend services.
pub const BACKEND_TEMPLATE: &str = "workloads/services/backend/manifest.yml";

const PARTIALS: &[(&str, &str)] = &[
    (
        "image_build",
        include_str!("../../templates/workloads/partials/image_build.yml"),
    ),
    (
        "task",
        include_str!("../../templates/workloads/partials/task.yml"),
    ),
];

const TEMPLATES: &[(&str, &str)] = &[
    (
        LB_WEB_TEMPLATE,
        include_str!("../../templates/workloads/services/lb-web/manifest.yml"),
    ),
    (
        BACKEND_TEMPLATE,
        include_str!("../../templates/workloads/services/backend/manifest.yml"),
    ),
];

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
}

/// Renders a resolved manifest with a named template.
pub trait Renderer {
    fn render(&self, template: &str, manifest: &ResolvedManifest) -> Result<Vec<u8>, RenderError>;
}

/// Template id of the manifest document for `kind`.
pub fn template_for(kind: WorkloadKind) -> &'static str {
    match kind {
        WorkloadKind::LoadBalancedWebService => LB_WEB_TEMPLATE,
        WorkloadKind::BackendService => BACKEND_TEMPLATE,
    }
}

// True for any value that made it into the serialized manifest, including
// empty strings, zero and false. Unset fields are skipped on serialization
// and therefore look up as null.
handlebars_helper!(present: |v: Json| !v.is_null());

handlebars_helper!(dir_name: |path: str| {
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    }
});

// JSON scalars are valid YAML flow scalars.
handlebars_helper!(quote: |v: Json| v.to_string());

/// Handlebars-backed [`Renderer`] with the built-in manifest templates.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("present", Box::new(present));
        registry.register_helper("dirName", Box::new(dir_name));
        registry.register_helper("quote", Box::new(quote));

        for (name, source) in PARTIALS {
            registry.register_partial(name, *source)?;
        }
        for (name, source) in TEMPLATES {
            registry.register_template_string(name, *source)?;
        }

        Ok(Self { registry })
    }

    /// Register an additional template under `name`, replacing any existing one.
    pub fn with_template(mut self, name: &str, source: &str) -> Result<Self, RenderError> {
        self.registry.register_template_string(name, source)?;
        Ok(self)
    }

    /// Render the kind's manifest document.
    pub fn render_manifest(&self, manifest: &ResolvedManifest) -> Result<Vec<u8>, RenderError> {
        self.render(template_for(manifest.kind()), manifest)
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, template: &str, manifest: &ResolvedManifest) -> Result<Vec<u8>, RenderError> {
        if !self.registry.has_template(template) {
            return Err(RenderError::UnknownTemplate(template.to_string()));
        }

        tracing::debug!(template, workload = %manifest.name, "rendering manifest");
        let rendered = self.registry.render(template, manifest)?;
        Ok(rendered.into_bytes())
    }
}
