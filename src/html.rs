//! # HTML Serializer
//!
//! The second output path. The same bound tree that feeds the PDF layout
//! engine serializes here as markup, with each `style={styles.key}`
//! reference becoming a `class` attribute and the template's style table
//! becoming a CSS sheet. Because both paths read one style table, the HTML
//! preview and the PDF stay visually consistent without a separate theme.

use std::fmt::Write;

use crate::style::{Color, Dimension, Direction, Edges, FontStyle, Style, StyleMap, TextAlign, TextTransform};
use crate::template::binder::{BoundChild, BoundNode};

/// Serialize a bound tree to HTML markup.
pub fn write_markup(root: &BoundNode) -> String {
    let mut out = String::new();
    write_node(&mut out, root, 0);
    out
}

fn write_node(out: &mut String, node: &BoundNode, depth: usize) {
    let tag = html_tag(&node.tag);
    let indent = "  ".repeat(depth);

    let _ = write!(out, "{indent}<{tag}");
    if let Some(class) = node.style_name() {
        let _ = write!(out, " class=\"{}\"", escape_attr(class));
    }

    if tag == "img" {
        let src = node.attr_str("src").unwrap_or_default();
        let _ = writeln!(out, " src=\"{}\" alt=\"\">", escape_attr(src));
        return;
    }

    out.push('>');

    let only_text = node
        .children
        .iter()
        .all(|c| matches!(c, BoundChild::Text(_)));

    if only_text {
        out.push_str(&escape_text(node.text_content().trim()));
        let _ = writeln!(out, "</{tag}>");
        return;
    }

    out.push('\n');
    for child in &node.children {
        match child {
            BoundChild::Node(n) => write_node(out, n, depth + 1),
            BoundChild::Text(t) => {
                let trimmed = t.trim();
                if !trimmed.is_empty() {
                    let _ = writeln!(out, "{indent}  {}", escape_text(trimmed));
                }
            }
        }
    }
    let _ = writeln!(out, "{indent}</{tag}>");
}

fn html_tag(tag: &str) -> &str {
    match tag {
        "page" => "main",
        "image" => "img",
        "text" => "p",
        "header" => "header",
        "section" => "section",
        // view, row, anything unknown
        _ => "div",
    }
}

/// Generate the CSS sheet for a template's style table. Class names are the
/// style table keys, so they line up with the `class` attributes emitted by
/// [`write_markup`]. Keys are sorted for deterministic output.
pub fn write_stylesheet(styles: &StyleMap) -> String {
    let mut keys: Vec<&String> = styles.keys().collect();
    keys.sort();

    let mut out = String::new();
    for key in keys {
        let _ = writeln!(out, ".{key} {{");
        write_style_props(&mut out, &styles[key]);
        let _ = writeln!(out, "}}");
    }
    out
}

fn write_style_props(out: &mut String, style: &Style) {
    if let Some(width) = style.width {
        let _ = writeln!(out, "  width: {};", dimension_css(width));
    }
    if let Some(height) = style.height {
        let _ = writeln!(out, "  height: {height}pt;");
    }
    if let Some(padding) = style.padding {
        let _ = writeln!(out, "  padding: {};", edges_css(padding));
    }
    if let Some(margin) = style.margin {
        let _ = writeln!(out, "  margin: {};", edges_css(margin));
    }

    if style.direction.is_some() || style.gap.is_some() {
        let _ = writeln!(out, "  display: flex;");
        let dir = match style.direction.unwrap_or_default() {
            Direction::Column => "column",
            Direction::Row => "row",
        };
        let _ = writeln!(out, "  flex-direction: {dir};");
    }
    if let Some(gap) = style.gap {
        let _ = writeln!(out, "  gap: {gap}pt;");
    }

    if let Some(ref family) = style.font_family {
        let _ = writeln!(out, "  font-family: \"{family}\", sans-serif;");
    }
    if let Some(size) = style.font_size {
        let _ = writeln!(out, "  font-size: {size}pt;");
    }
    if let Some(weight) = style.font_weight {
        let _ = writeln!(out, "  font-weight: {weight};");
    }
    if let Some(FontStyle::Italic) = style.font_style {
        let _ = writeln!(out, "  font-style: italic;");
    }
    if let Some(lh) = style.line_height {
        let _ = writeln!(out, "  line-height: {lh};");
    }
    if let Some(align) = style.text_align {
        let value = match align {
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Center => "center",
        };
        let _ = writeln!(out, "  text-align: {value};");
    }
    if let Some(ls) = style.letter_spacing {
        let _ = writeln!(out, "  letter-spacing: {ls}pt;");
    }
    if let Some(transform) = style.text_transform {
        let value = match transform {
            TextTransform::None => "none",
            TextTransform::Uppercase => "uppercase",
            TextTransform::Lowercase => "lowercase",
        };
        let _ = writeln!(out, "  text-transform: {value};");
    }

    if let Some(color) = style.color {
        let _ = writeln!(out, "  color: {};", color.to_css());
    }
    if let Some(bg) = style.background_color {
        let _ = writeln!(out, "  background-color: {};", bg.to_css());
    }
    if let Some(src) = &style.background_image {
        let _ = writeln!(out, "  background-image: url({});", escape_attr(src));
        let _ = writeln!(out, "  background-size: cover;");
    }
    if let Some(bw) = style.border_width {
        let color = style.border_color.unwrap_or(Color::BLACK).to_css();
        if (bw.top - bw.right).abs() < 0.001
            && (bw.right - bw.bottom).abs() < 0.001
            && (bw.bottom - bw.left).abs() < 0.001
        {
            let _ = writeln!(out, "  border: {}pt solid {color};", bw.top);
        } else {
            let _ = writeln!(out, "  border-style: solid;");
            let _ = writeln!(out, "  border-color: {color};");
            let _ = writeln!(
                out,
                "  border-width: {}pt {}pt {}pt {}pt;",
                bw.top, bw.right, bw.bottom, bw.left
            );
        }
    }
}

fn dimension_css(d: Dimension) -> String {
    match d {
        Dimension::Pt(v) => format!("{v}pt"),
        Dimension::Percent(p) => format!("{p}%"),
        Dimension::Auto => "auto".to_string(),
    }
}

fn edges_css(e: Edges) -> String {
    if e == Edges::uniform(e.top) {
        format!("{}pt", e.top)
    } else {
        format!("{}pt {}pt {}pt {}pt", e.top, e.right, e.bottom, e.left)
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
