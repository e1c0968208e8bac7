//! # Resume Document Model
//!
//! The normalized input schema: a superset of JSON-Resume. Field names match
//! the public schema, with two additions:
//!
//! - every collection entry carries a `visible` flag (default `true`) that
//!   gates rendering without deleting data, and
//! - an optional `meta` block with editor bookkeeping.
//!
//! A plain JSON-Resume file (no flags, no meta) deserializes with every
//! entry visible. That is the compatibility contract between the public
//! interchange format and the enriched internal one.
//!
//! The model is pure data. The single piece of behavior that matters to the
//! renderer is [`ResumeDocument::render_context`], which produces the
//! point-in-time JSON snapshot that templates bind against, with invisible
//! entries already filtered out. Both output paths consume that snapshot,
//! so visibility gating happens in exactly one place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VitaeError;

fn default_true() -> bool {
    true
}

/// A complete resume ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(default)]
    pub basics: Basics,
    #[serde(default)]
    pub work: Vec<WorkItem>,
    #[serde(default)]
    pub volunteer: Vec<VolunteerItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub awards: Vec<AwardItem>,
    #[serde(default)]
    pub certificates: Vec<CertificateItem>,
    #[serde(default)]
    pub publications: Vec<PublicationItem>,
    #[serde(default)]
    pub skills: Vec<SkillItem>,
    #[serde(default)]
    pub languages: Vec<LanguageItem>,
    #[serde(default)]
    pub interests: Vec<InterestItem>,
    #[serde(default)]
    pub references: Vec<ReferenceItem>,
    #[serde(default)]
    pub projects: Vec<ProjectItem>,
    /// Editor bookkeeping. Absent in plain JSON-Resume files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// The identity section. Not toggleable: only collection entries carry
/// visibility flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basics {
    pub name: Option<String>,
    /// Professional title, e.g. "Senior Engineer".
    pub label: Option<String>,
    /// Profile photo reference: URL, file path, or data URI.
    pub image: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub network: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    /// Company or organization name.
    pub name: Option<String>,
    pub position: Option<String>,
    pub url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerItem {
    pub organization: Option<String>,
    pub position: Option<String>,
    pub url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    pub institution: Option<String>,
    pub url: Option<String>,
    /// Field of study, e.g. "Computer Science".
    pub area: Option<String>,
    /// Degree type, e.g. "Bachelor".
    pub study_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub score: Option<String>,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardItem {
    pub title: Option<String>,
    pub date: Option<String>,
    pub awarder: Option<String>,
    pub summary: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateItem {
    pub name: Option<String>,
    pub date: Option<String>,
    pub issuer: Option<String>,
    pub url: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationItem {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub release_date: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillItem {
    pub name: Option<String>,
    pub level: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageItem {
    pub language: Option<String>,
    pub fluency: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestItem {
    pub name: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceItem {
    pub name: Option<String>,
    pub reference: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub entity: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// Editor metadata attached by the builder application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub id: Option<String>,
    /// Document title, e.g. "Senior Engineer CV". Drives the export filename.
    pub name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub version: Option<String>,
}

/// The canonical section order. The renderer walks sections in exactly this
/// order; templates that want a different arrangement say so in their markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Basics,
    Summary,
    Work,
    Education,
    Skills,
    Projects,
    Volunteer,
    Awards,
    Languages,
    Certificates,
    Interests,
    Publications,
    References,
}

impl Section {
    pub const ALL: [Section; 13] = [
        Section::Basics,
        Section::Summary,
        Section::Work,
        Section::Education,
        Section::Skills,
        Section::Projects,
        Section::Volunteer,
        Section::Awards,
        Section::Languages,
        Section::Certificates,
        Section::Interests,
        Section::Publications,
        Section::References,
    ];

    /// The context key holding this section's collection, for sections
    /// backed by one.
    pub fn context_key(&self) -> Option<&'static str> {
        match self {
            Section::Basics | Section::Summary => None,
            Section::Work => Some("work"),
            Section::Education => Some("education"),
            Section::Skills => Some("skills"),
            Section::Projects => Some("projects"),
            Section::Volunteer => Some("volunteer"),
            Section::Awards => Some("awards"),
            Section::Languages => Some("languages"),
            Section::Certificates => Some("certificates"),
            Section::Interests => Some("interests"),
            Section::Publications => Some("publications"),
            Section::References => Some("references"),
        }
    }
}

impl ResumeDocument {
    /// Deserialize a resume from JSON. Accepts plain JSON-Resume documents
    /// as well as the enriched format with `visible` flags and `meta`.
    pub fn from_json(json: &str) -> Result<Self, VitaeError> {
        let doc: ResumeDocument = serde_json::from_str(json)?;
        Ok(doc)
    }

    /// The point-in-time snapshot templates bind against.
    ///
    /// Invisible collection entries are removed here, so neither output path
    /// needs to know about visibility. The `visible` flags themselves are
    /// stripped: a document with no flags and one with all-true flags
    /// produce byte-identical contexts.
    pub fn render_context(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(ref mut map) = value {
            for (_, v) in map.iter_mut() {
                if let Value::Array(items) = v {
                    items.retain(is_visible);
                    for item in items.iter_mut() {
                        if let Value::Object(obj) = item {
                            obj.remove("visible");
                        }
                    }
                }
            }
            if let Some(Value::Object(basics)) = map.get_mut("basics") {
                if let Some(Value::Array(profiles)) = basics.get_mut("profiles") {
                    profiles.retain(is_visible);
                    for p in profiles.iter_mut() {
                        if let Value::Object(obj) = p {
                            obj.remove("visible");
                        }
                    }
                }
            }
        }
        value
    }

    /// The document's declared title: `meta.name`, falling back to the
    /// person's name, falling back to nothing.
    pub fn title(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .or(self.basics.name.as_deref())
    }

    /// Derive the filesystem-safe export file stem: lowercase, hyphenated.
    /// Untitled documents export as `resume`.
    pub fn derive_file_stem(&self) -> String {
        match self.title() {
            Some(title) if !title.trim().is_empty() => slug::slugify(title),
            _ => "resume".to_string(),
        }
    }
}

fn is_visible(item: &Value) -> bool {
    match item {
        Value::Object(obj) => obj
            .get("visible")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_resume_is_accepted() {
        let json = r#"{
            "basics": { "name": "Ada Lovelace", "label": "Engineer" },
            "work": [{ "name": "Analytical Engines Ltd", "position": "Programmer" }]
        }"#;
        let doc = ResumeDocument::from_json(json).unwrap();
        assert!(doc.work[0].visible, "entries without a flag default to visible");
        assert!(doc.meta.is_none());
    }

    #[test]
    fn test_render_context_filters_invisible_entries() {
        let json = r#"{
            "work": [
                { "position": "Shown", "visible": true },
                { "position": "Hidden", "visible": false }
            ]
        }"#;
        let doc = ResumeDocument::from_json(json).unwrap();
        let ctx = doc.render_context();
        let work = ctx["work"].as_array().unwrap();
        assert_eq!(work.len(), 1);
        assert_eq!(work[0]["position"], json!("Shown"));
    }

    #[test]
    fn test_render_context_identical_with_and_without_flags() {
        let plain = ResumeDocument::from_json(
            r#"{ "basics": { "name": "A" }, "skills": [{ "name": "Rust" }] }"#,
        )
        .unwrap();
        let flagged = ResumeDocument::from_json(
            r#"{ "basics": { "name": "A" }, "skills": [{ "name": "Rust", "visible": true }] }"#,
        )
        .unwrap();
        assert_eq!(plain.render_context(), flagged.render_context());
    }

    #[test]
    fn test_invisible_profiles_are_filtered() {
        let json = r#"{
            "basics": { "profiles": [
                { "network": "GitHub", "visible": false },
                { "network": "Mastodon" }
            ]}
        }"#;
        let doc = ResumeDocument::from_json(json).unwrap();
        let ctx = doc.render_context();
        let profiles = ctx["basics"]["profiles"].as_array().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["network"], json!("Mastodon"));
    }

    #[test]
    fn test_file_stem_from_title() {
        let doc = ResumeDocument::from_json(
            r#"{ "meta": { "name": "Senior Engineer CV" } }"#,
        )
        .unwrap();
        assert_eq!(doc.derive_file_stem(), "senior-engineer-cv");
    }

    #[test]
    fn test_file_stem_untitled_default() {
        let doc = ResumeDocument::default();
        assert_eq!(doc.derive_file_stem(), "resume");
    }

    #[test]
    fn test_file_stem_falls_back_to_name() {
        let doc = ResumeDocument::from_json(r#"{ "basics": { "name": "Grace Hopper" } }"#).unwrap();
        assert_eq!(doc.derive_file_stem(), "grace-hopper");
    }

    #[test]
    fn test_section_order_starts_with_identity() {
        assert_eq!(Section::ALL[0], Section::Basics);
        assert_eq!(Section::ALL[1], Section::Summary);
        assert_eq!(Section::ALL[2], Section::Work);
    }
}
