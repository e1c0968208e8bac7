//! Render outputs handed back to callers. Each artifact is self-contained:
//! the PDF carries its suggested download name, the HTML carries the CSS it
//! needs, so a caller can persist or serve either without consulting the
//! renderer again.

/// A finished PDF render.
#[derive(Debug, Clone)]
pub struct PdfArtifact {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Suggested download name, e.g. `jane-doe-resume.pdf`.
    pub file_name: String,
}

impl PdfArtifact {
    pub fn new(bytes: Vec<u8>, page_count: usize, file_stem: &str) -> Self {
        Self {
            bytes,
            page_count,
            file_name: format!("{file_stem}.pdf"),
        }
    }
}

/// A finished HTML render: markup plus the stylesheet it references.
#[derive(Debug, Clone)]
pub struct HtmlArtifact {
    pub markup: String,
    pub styles: String,
}

impl HtmlArtifact {
    /// The markup and stylesheet as one standalone document.
    pub fn to_document(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_title(title),
            self.styles,
            self.markup
        )
    }
}

/// Either output, for callers that hold heterogeneous render results.
#[derive(Debug, Clone)]
pub enum RenderedArtifact {
    Html(HtmlArtifact),
    Pdf(PdfArtifact),
}

fn escape_title(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_file_name() {
        let artifact = PdfArtifact::new(vec![1, 2, 3], 2, "jane-doe-resume");
        assert_eq!(artifact.file_name, "jane-doe-resume.pdf");
        assert_eq!(artifact.page_count, 2);
    }

    #[test]
    fn test_standalone_document_embeds_styles() {
        let artifact = HtmlArtifact {
            markup: "<main></main>\n".to_string(),
            styles: ".name { font-size: 10pt; }\n".to_string(),
        };
        let doc = artifact.to_document("A <B> & C");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>A &lt;B&gt; &amp; C</title>"));
        assert!(doc.contains(".name { font-size: 10pt; }"));
        assert!(doc.contains("<main></main>"));
    }
}
