//! # Vitae
//!
//! A résumé rendering core: one template, one document, two outputs.
//!
//! A résumé document (a JSON Resume superset with per-entry visibility
//! flags) binds against a compiled template to produce a single bound tree.
//! That tree serializes to HTML for live preview and flows through a
//! page-aware layout engine to PDF for export. Because both outputs share
//! the bound tree and the template's style table, they stay visually
//! consistent by construction.
//!
//! ## Architecture
//!
//! ```text
//! resume JSON + template markup
//!        |
//!   [template]  parse + cache, bind data into the tree
//!        |
//!        +----------------------------+
//!        |                            |
//!    [compose]                     [html]
//!   render tree                 markup + CSS
//!        |
//!    [layout]   page-aware pagination
//!        |
//!     [pdf]     serialize to bytes
//! ```
//!
//! The page is the fundamental layout unit: every placement decision is
//! made against the remaining space on the current page, so nothing is
//! sliced after the fact.

pub mod artifact;
pub mod compose;
pub mod error;
pub mod font;
pub mod html;
pub mod image_loader;
pub mod layout;
pub mod pdf;
pub mod resume;
pub mod scheduler;
pub mod style;
pub mod template;

pub use artifact::{HtmlArtifact, PdfArtifact, RenderedArtifact};
pub use error::VitaeError;
pub use layout::{PageSize, WrapMode};
pub use resume::ResumeDocument;
pub use template::{TemplateDescriptor, TemplateRegistry};

use font::FontContext;
use layout::LayoutEngine;
use pdf::{PdfMetadata, PdfWriter};
use template::binder::{bind, BindContext};
use template::cache::RenderCache;

/// Knobs for a PDF render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub page_size: PageSize,
    pub wrap_mode: WrapMode,
}

/// Render a document with a template to a finished PDF.
pub fn render_pdf(
    document: &ResumeDocument,
    descriptor: &TemplateDescriptor,
    cache: &mut RenderCache,
    fonts: &FontContext,
    options: &RenderOptions,
) -> Result<PdfArtifact, VitaeError> {
    let ast = cache.get_or_compile(&descriptor.id, || descriptor.compile())?;

    let context = document.render_context();
    let bind_ctx = BindContext::new(&context, &descriptor.style_sheet);
    let bound = bind(&ast, &bind_ctx);

    let tree = compose::compose(&bound, options.page_size);
    let engine = LayoutEngine::new(options.wrap_mode);
    let pages = engine.layout(&tree, fonts);

    let metadata = PdfMetadata {
        title: document.title().map(str::to_string),
        author: document.basics.name.clone(),
    };
    let bytes = PdfWriter::new().write(&pages, &metadata, fonts);

    tracing::debug!(
        template = %descriptor.id,
        pages = pages.len(),
        bytes = bytes.len(),
        "rendered pdf"
    );
    Ok(PdfArtifact::new(bytes, pages.len(), &document.derive_file_stem()))
}

/// Render a document with a template to HTML markup plus its stylesheet.
pub fn render_html(
    document: &ResumeDocument,
    descriptor: &TemplateDescriptor,
    cache: &mut RenderCache,
) -> Result<HtmlArtifact, VitaeError> {
    let ast = cache.get_or_compile(&descriptor.id, || descriptor.compile())?;

    let context = document.render_context();
    let bind_ctx = BindContext::new(&context, &descriptor.style_sheet);
    let bound = bind(&ast, &bind_ctx);

    Ok(HtmlArtifact {
        markup: html::write_markup(&bound),
        styles: html::write_stylesheet(&descriptor.style_sheet),
    })
}

/// Bundles the long-lived pieces of the pipeline: the font registry, the
/// compiled-template cache, and the template registry. Interactive callers
/// keep one of these alive across renders so template compilation happens
/// once per template edit, not once per keystroke.
pub struct Renderer {
    fonts: FontContext,
    cache: RenderCache,
    registry: TemplateRegistry,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            fonts: FontContext::new(),
            cache: RenderCache::new(),
            registry: TemplateRegistry::new(),
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Register (or replace) a template and drop its cached compile.
    pub fn register_template(&mut self, descriptor: TemplateDescriptor) {
        self.cache.invalidate(&descriptor.id);
        self.registry.register(descriptor);
    }

    /// Make a custom font available for measurement, from raw TTF bytes.
    pub fn register_font(&mut self, family: &str, weight: u32, italic: bool, data: Vec<u8>) -> bool {
        self.fonts.register_custom(family, weight, italic, data)
    }

    pub fn render_pdf(
        &mut self,
        document: &ResumeDocument,
        template_id: &str,
        options: &RenderOptions,
    ) -> Result<PdfArtifact, VitaeError> {
        let descriptor = self.lookup(template_id)?;
        render_pdf(document, &descriptor, &mut self.cache, &self.fonts, options)
    }

    pub fn render_html(
        &mut self,
        document: &ResumeDocument,
        template_id: &str,
    ) -> Result<HtmlArtifact, VitaeError> {
        let descriptor = self.lookup(template_id)?;
        render_html(document, &descriptor, &mut self.cache)
    }

    fn lookup(&self, template_id: &str) -> Result<TemplateDescriptor, VitaeError> {
        self.registry
            .get(template_id)
            .cloned()
            .ok_or_else(|| VitaeError::Render(format!("unknown template '{template_id}'")))
    }
}

/// Parse a résumé from JSON and render it to PDF with a built-in template.
pub fn render_json(
    json: &str,
    template_id: &str,
    options: &RenderOptions,
) -> Result<PdfArtifact, VitaeError> {
    let document = ResumeDocument::from_json(json)?;
    Renderer::new().render_pdf(&document, template_id, options)
}
