//! Built-in resume templates.
//!
//! Each template is markup plus a style table. The tables are data, not
//! logic: tuning a template means editing numbers here, never touching the
//! renderer. Sections follow the canonical order; a section whose filtered
//! collection is empty is gated off by its `if` attribute, heading
//! included.

use crate::style::{Color, Dimension, Direction, Edges, FontStyle, Style, StyleMap, TextAlign, TextTransform};

use super::TemplateDescriptor;

/// "Onyx": a restrained single-column layout, dark text on white.
pub(super) fn onyx() -> TemplateDescriptor {
    TemplateDescriptor {
        id: "onyx".to_string(),
        name: "Onyx".to_string(),
        markup: ONYX_MARKUP.to_string(),
        style_sheet: onyx_styles(),
    }
}

const ONYX_MARKUP: &str = r#"<page style={styles.page}>
  <view style={styles.header}>
    <image if={basics.image} src={basics.image} style={styles.photo} />
    <view style={styles.headerText}>
      <text style={styles.name}>{{basics.name}}</text>
      <text if={basics.label} style={styles.label}>{{basics.label}}</text>
      <text style={styles.contact}>{{basics.email}}{{#if basics.phone}}  |  {{basics.phone}}{{/if}}{{#if basics.location.city}}  |  {{basics.location.city}}{{/if}}{{#if basics.url}}  |  {{basics.url}}{{/if}}</text>
      <text if={basics.profiles} style={styles.contact}>{{#each basics.profiles}}{{network}}: {{url}}  {{/each}}</text>
    </view>
  </view>
  <view if={basics.summary} style={styles.section}>
    <text style={styles.sectionTitle}>Summary</text>
    <text style={styles.body}>{{basics.summary}}</text>
  </view>
  <view if={work} style={styles.section}>
    <text style={styles.sectionTitle}>Experience</text>
    <view each={work} style={styles.entry}>
      <view style={styles.entryHead}>
        <text style={styles.entryTitle}>{{position}}</text>
        <text style={styles.entryDates}>{{startDate}}{{#if endDate}} - {{endDate}}{{/if}}</text>
      </view>
      <text style={styles.entrySub}>{{name}}</text>
      <text if={summary} style={styles.body}>{{summary}}</text>
      <text each={highlights} style={styles.bullet}>-  {{this}}</text>
    </view>
  </view>
  <view if={education} style={styles.section}>
    <text style={styles.sectionTitle}>Education</text>
    <view each={education} style={styles.entry}>
      <view style={styles.entryHead}>
        <text style={styles.entryTitle}>{{institution}}</text>
        <text style={styles.entryDates}>{{startDate}}{{#if endDate}} - {{endDate}}{{/if}}</text>
      </view>
      <text style={styles.entrySub}>{{#if studyType}}{{studyType}}{{#if area}}, {{/if}}{{/if}}{{area}}</text>
      <text if={score} style={styles.body}>Score: {{score}}</text>
    </view>
  </view>
  <view if={skills} style={styles.section}>
    <text style={styles.sectionTitle}>Skills</text>
    <view each={skills} style={styles.entry}>
      <text style={styles.entryTitle}>{{name}}{{#if level}}  ({{level}}){{/if}}</text>
      <text if={keywords} style={styles.body}>{{#each keywords}}{{this}}  {{/each}}</text>
    </view>
  </view>
  <view if={projects} style={styles.section}>
    <text style={styles.sectionTitle}>Projects</text>
    <view each={projects} style={styles.entry}>
      <view style={styles.entryHead}>
        <text style={styles.entryTitle}>{{name}}</text>
        <text style={styles.entryDates}>{{startDate}}{{#if endDate}} - {{endDate}}{{/if}}</text>
      </view>
      <text if={description} style={styles.body}>{{description}}</text>
      <text each={highlights} style={styles.bullet}>-  {{this}}</text>
    </view>
  </view>
  <view if={volunteer} style={styles.section}>
    <text style={styles.sectionTitle}>Volunteer</text>
    <view each={volunteer} style={styles.entry}>
      <view style={styles.entryHead}>
        <text style={styles.entryTitle}>{{position}}</text>
        <text style={styles.entryDates}>{{startDate}}{{#if endDate}} - {{endDate}}{{/if}}</text>
      </view>
      <text style={styles.entrySub}>{{organization}}</text>
      <text if={summary} style={styles.body}>{{summary}}</text>
    </view>
  </view>
  <view if={awards} style={styles.section}>
    <text style={styles.sectionTitle}>Awards</text>
    <view each={awards} style={styles.entry}>
      <view style={styles.entryHead}>
        <text style={styles.entryTitle}>{{title}}</text>
        <text style={styles.entryDates}>{{date}}</text>
      </view>
      <text if={awarder} style={styles.entrySub}>{{awarder}}</text>
      <text if={summary} style={styles.body}>{{summary}}</text>
    </view>
  </view>
  <view if={languages} style={styles.section}>
    <text style={styles.sectionTitle}>Languages</text>
    <text each={languages} style={styles.body}>{{language}}{{#if fluency}} - {{fluency}}{{/if}}</text>
  </view>
  <view if={certificates} style={styles.section}>
    <text style={styles.sectionTitle}>Certificates</text>
    <view each={certificates} style={styles.entry}>
      <view style={styles.entryHead}>
        <text style={styles.entryTitle}>{{name}}</text>
        <text style={styles.entryDates}>{{date}}</text>
      </view>
      <text if={issuer} style={styles.entrySub}>{{issuer}}</text>
    </view>
  </view>
  <view if={interests} style={styles.section}>
    <text style={styles.sectionTitle}>Interests</text>
    <text each={interests} style={styles.body}>{{name}}{{#if keywords}}: {{#each keywords}}{{this}}  {{/each}}{{/if}}</text>
  </view>
  <view if={publications} style={styles.section}>
    <text style={styles.sectionTitle}>Publications</text>
    <view each={publications} style={styles.entry}>
      <view style={styles.entryHead}>
        <text style={styles.entryTitle}>{{name}}</text>
        <text style={styles.entryDates}>{{releaseDate}}</text>
      </view>
      <text if={publisher} style={styles.entrySub}>{{publisher}}</text>
      <text if={summary} style={styles.body}>{{summary}}</text>
    </view>
  </view>
  <view if={references} style={styles.section}>
    <text style={styles.sectionTitle}>References</text>
    <view each={references} style={styles.entry}>
      <text style={styles.entryTitle}>{{name}}</text>
      <text if={reference} style={styles.quote}>{{reference}}</text>
    </view>
  </view>
</page>"#;

fn onyx_styles() -> StyleMap {
    let ink = Color::hex("#1a1a24");
    let muted = Color::hex("#5a5a66");
    let rule = Color::hex("#d8d8de");

    let mut s = StyleMap::new();
    s.insert(
        "page".into(),
        Style {
            font_family: Some("Helvetica".into()),
            font_size: Some(9.5),
            line_height: Some(1.45),
            color: Some(ink),
            ..Default::default()
        },
    );
    s.insert(
        "header".into(),
        Style {
            direction: Some(Direction::Row),
            gap: Some(14.0),
            margin: Some(Edges { bottom: 14.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "photo".into(),
        Style {
            width: Some(Dimension::Pt(56.0)),
            height: Some(56.0),
            ..Default::default()
        },
    );
    s.insert("headerText".into(), Style::default());
    s.insert(
        "name".into(),
        Style {
            font_size: Some(22.0),
            font_weight: Some(700),
            line_height: Some(1.2),
            ..Default::default()
        },
    );
    s.insert(
        "label".into(),
        Style {
            font_size: Some(11.0),
            color: Some(muted),
            margin: Some(Edges { top: 2.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "contact".into(),
        Style {
            font_size: Some(8.5),
            color: Some(muted),
            margin: Some(Edges { top: 3.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "section".into(),
        Style {
            margin: Some(Edges { bottom: 10.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "sectionTitle".into(),
        Style {
            font_size: Some(10.5),
            font_weight: Some(700),
            letter_spacing: Some(0.8),
            text_transform: Some(TextTransform::Uppercase),
            border_width: Some(Edges { bottom: 0.75, ..Default::default() }),
            border_color: Some(rule),
            padding: Some(Edges { bottom: 2.0, ..Default::default() }),
            margin: Some(Edges { bottom: 5.0, ..Default::default() }),
            wrap: Some(false),
            ..Default::default()
        },
    );
    s.insert(
        "entry".into(),
        Style {
            margin: Some(Edges { bottom: 7.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "entryHead".into(),
        Style {
            direction: Some(Direction::Row),
            ..Default::default()
        },
    );
    s.insert(
        "entryTitle".into(),
        Style {
            font_weight: Some(700),
            width: Some(Dimension::Percent(72.0)),
            ..Default::default()
        },
    );
    s.insert(
        "entryDates".into(),
        Style {
            font_size: Some(8.5),
            color: Some(muted),
            text_align: Some(TextAlign::Right),
            width: Some(Dimension::Percent(28.0)),
            ..Default::default()
        },
    );
    s.insert(
        "entrySub".into(),
        Style {
            font_style: Some(FontStyle::Italic),
            color: Some(muted),
            ..Default::default()
        },
    );
    s.insert(
        "body".into(),
        Style {
            margin: Some(Edges { top: 2.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "bullet".into(),
        Style {
            margin: Some(Edges { top: 1.5, left: 8.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "quote".into(),
        Style {
            font_style: Some(FontStyle::Italic),
            color: Some(muted),
            margin: Some(Edges { top: 2.0, left: 8.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s
}

/// "Carbon": a banded layout with an accent header block.
pub(super) fn carbon() -> TemplateDescriptor {
    TemplateDescriptor {
        id: "carbon".to_string(),
        name: "Carbon".to_string(),
        markup: CARBON_MARKUP.to_string(),
        style_sheet: carbon_styles(),
    }
}

const CARBON_MARKUP: &str = r#"<page style={styles.page}>
  <view style={styles.band}>
    <view style={styles.bandInner}>
      <text style={styles.name}>{{basics.name}}</text>
      <text if={basics.label} style={styles.label}>{{basics.label}}</text>
      <text style={styles.contact}>{{basics.email}}{{#if basics.phone}}   {{basics.phone}}{{/if}}{{#if basics.location.city}}   {{basics.location.city}}{{/if}}</text>
    </view>
    <image if={basics.image} src={basics.image} style={styles.photo} />
  </view>
  <view if={basics.summary} style={styles.section}>
    <text style={styles.sectionTitle}>Profile</text>
    <text style={styles.body}>{{basics.summary}}</text>
  </view>
  <view if={work} style={styles.section}>
    <text style={styles.sectionTitle}>Experience</text>
    <view each={work} style={styles.entry}>
      <text style={styles.entryTitle}>{{position}}{{#if name}} at {{name}}{{/if}}</text>
      <text style={styles.entryDates}>{{startDate}}{{#if endDate}} - {{endDate}}{{/if}}</text>
      <text if={summary} style={styles.body}>{{summary}}</text>
      <text each={highlights} style={styles.bullet}>-  {{this}}</text>
    </view>
  </view>
  <view if={education} style={styles.section}>
    <text style={styles.sectionTitle}>Education</text>
    <view each={education} style={styles.entry}>
      <text style={styles.entryTitle}>{{institution}}</text>
      <text style={styles.entryDates}>{{#if studyType}}{{studyType}}, {{/if}}{{startDate}}{{#if endDate}} - {{endDate}}{{/if}}</text>
    </view>
  </view>
  <view if={skills} style={styles.section}>
    <text style={styles.sectionTitle}>Skills</text>
    <text each={skills} style={styles.body}>{{name}}{{#if keywords}}: {{#each keywords}}{{this}}  {{/each}}{{/if}}</text>
  </view>
  <view if={projects} style={styles.section}>
    <text style={styles.sectionTitle}>Projects</text>
    <view each={projects} style={styles.entry}>
      <text style={styles.entryTitle}>{{name}}</text>
      <text if={description} style={styles.body}>{{description}}</text>
    </view>
  </view>
  <view if={volunteer} style={styles.section}>
    <text style={styles.sectionTitle}>Volunteer</text>
    <view each={volunteer} style={styles.entry}>
      <text style={styles.entryTitle}>{{position}}{{#if organization}} at {{organization}}{{/if}}</text>
      <text if={summary} style={styles.body}>{{summary}}</text>
    </view>
  </view>
  <view if={awards} style={styles.section}>
    <text style={styles.sectionTitle}>Awards</text>
    <text each={awards} style={styles.body}>{{title}}{{#if awarder}} ({{awarder}}){{/if}}{{#if date}}, {{date}}{{/if}}</text>
  </view>
  <view if={languages} style={styles.section}>
    <text style={styles.sectionTitle}>Languages</text>
    <text each={languages} style={styles.body}>{{language}}{{#if fluency}} - {{fluency}}{{/if}}</text>
  </view>
  <view if={certificates} style={styles.section}>
    <text style={styles.sectionTitle}>Certificates</text>
    <text each={certificates} style={styles.body}>{{name}}{{#if issuer}} ({{issuer}}){{/if}}</text>
  </view>
  <view if={interests} style={styles.section}>
    <text style={styles.sectionTitle}>Interests</text>
    <text each={interests} style={styles.body}>{{name}}</text>
  </view>
  <view if={publications} style={styles.section}>
    <text style={styles.sectionTitle}>Publications</text>
    <text each={publications} style={styles.body}>{{name}}{{#if publisher}}, {{publisher}}{{/if}}</text>
  </view>
  <view if={references} style={styles.section}>
    <text style={styles.sectionTitle}>References</text>
    <view each={references} style={styles.entry}>
      <text style={styles.entryTitle}>{{name}}</text>
      <text if={reference} style={styles.body}>{{reference}}</text>
    </view>
  </view>
</page>"#;

fn carbon_styles() -> StyleMap {
    let accent = Color::hex("#16324f");
    let ink = Color::hex("#23232b");
    let muted = Color::hex("#6b6b76");

    let mut s = StyleMap::new();
    s.insert(
        "page".into(),
        Style {
            font_family: Some("Helvetica".into()),
            font_size: Some(9.5),
            line_height: Some(1.5),
            color: Some(ink),
            ..Default::default()
        },
    );
    s.insert(
        "band".into(),
        Style {
            direction: Some(Direction::Row),
            background_color: Some(accent),
            color: Some(Color::WHITE),
            padding: Some(Edges::uniform(16.0)),
            margin: Some(Edges { bottom: 14.0, ..Default::default() }),
            wrap: Some(false),
            ..Default::default()
        },
    );
    s.insert(
        "bandInner".into(),
        Style {
            width: Some(Dimension::Percent(80.0)),
            ..Default::default()
        },
    );
    s.insert(
        "photo".into(),
        Style {
            width: Some(Dimension::Pt(52.0)),
            height: Some(52.0),
            ..Default::default()
        },
    );
    s.insert(
        "name".into(),
        Style {
            font_size: Some(24.0),
            font_weight: Some(700),
            line_height: Some(1.15),
            ..Default::default()
        },
    );
    s.insert(
        "label".into(),
        Style {
            font_size: Some(11.5),
            margin: Some(Edges { top: 2.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "contact".into(),
        Style {
            font_size: Some(8.5),
            margin: Some(Edges { top: 4.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "section".into(),
        Style {
            margin: Some(Edges { bottom: 11.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "sectionTitle".into(),
        Style {
            font_size: Some(11.0),
            font_weight: Some(700),
            color: Some(accent),
            letter_spacing: Some(1.0),
            text_transform: Some(TextTransform::Uppercase),
            margin: Some(Edges { bottom: 4.0, ..Default::default() }),
            wrap: Some(false),
            ..Default::default()
        },
    );
    s.insert(
        "entry".into(),
        Style {
            margin: Some(Edges { bottom: 7.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "entryTitle".into(),
        Style {
            font_weight: Some(700),
            ..Default::default()
        },
    );
    s.insert(
        "entryDates".into(),
        Style {
            font_size: Some(8.5),
            color: Some(muted),
            ..Default::default()
        },
    );
    s.insert(
        "body".into(),
        Style {
            margin: Some(Edges { top: 2.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s.insert(
        "bullet".into(),
        Style {
            margin: Some(Edges { top: 1.5, left: 8.0, ..Default::default() }),
            ..Default::default()
        },
    );
    s
}
