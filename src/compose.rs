//! # Render Tree Composition
//!
//! Bridges the template world and the layout world: a bound template tree
//! (tags, attributes, text) becomes a [`RenderTree`] of layout nodes with
//! concrete styles. Both outputs start from the same bound tree; only the
//! PDF path goes through here, the HTML path serializes the bound tree
//! directly.
//!
//! Tag vocabulary: `page` (root), `view` / `section` / `header` (block
//! containers), `row` (horizontal container), `text`, `image`. Unknown tags
//! compose as plain containers so a template typo degrades instead of
//! failing the render.

use crate::layout::{PageConfig, PageSize};
use crate::style::{Color, Direction, Edges, Style};
use crate::template::binder::{BoundChild, BoundNode};

/// A node in the layout tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub style: Style,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    View,
    Text { content: String },
    Image { src: String },
}

impl Node {
    pub fn view(style: Style, children: Vec<Node>) -> Self {
        Node { kind: NodeKind::View, style, children }
    }

    pub fn text(content: impl Into<String>, style: Style) -> Self {
        Node {
            kind: NodeKind::Text { content: content.into() },
            style,
            children: Vec::new(),
        }
    }
}

/// A composed document ready for layout.
#[derive(Debug, Clone)]
pub struct RenderTree {
    pub page: PageConfig,
    pub background: Option<Color>,
    /// Decorative backdrop painted behind the content of every page.
    pub background_image: Option<String>,
    pub nodes: Vec<Node>,
}

/// Compose a bound template tree into a render tree.
///
/// The root element's style supplies the page chrome: its padding becomes
/// the page margins and its background color and image paint the full page.
pub fn compose(bound: &BoundNode, page_size: PageSize) -> RenderTree {
    let root_style = bound.style().cloned().unwrap_or_default();
    let margin = root_style.padding.unwrap_or_else(|| Edges::uniform(36.0));

    // The page's typography becomes the inherited base for everything on it.
    let mut base_style = root_style.clone();
    base_style.padding = None;
    base_style.background_color = None;
    base_style.background_image = None;

    let nodes = vec![Node {
        kind: NodeKind::View,
        style: base_style,
        children: bound.children.iter().filter_map(compose_child).collect(),
    }];

    RenderTree {
        page: PageConfig { size: page_size, margin },
        background: root_style.background_color,
        background_image: root_style.background_image,
        nodes,
    }
}

fn compose_child(child: &BoundChild) -> Option<Node> {
    match child {
        BoundChild::Node(node) => Some(compose_node(node)),
        // Bare text between elements at container level carries no style;
        // the parser already drops whitespace-only runs.
        BoundChild::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Node::text(trimmed, Style::default()))
            }
        }
    }
}

fn compose_node(bound: &BoundNode) -> Node {
    let mut style = bound.style().cloned().unwrap_or_default();

    match bound.tag.as_str() {
        "text" => Node::text(bound.text_content(), style),
        "image" => {
            let src = bound.attr_str("src").unwrap_or_default().to_string();
            Node {
                kind: NodeKind::Image { src },
                style,
                children: Vec::new(),
            }
        }
        "row" => {
            if style.direction.is_none() {
                style.direction = Some(Direction::Row);
            }
            Node::view(style, bound.children.iter().filter_map(compose_child).collect())
        }
        _ => Node::view(style, bound.children.iter().filter_map(compose_child).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleMap;
    use crate::template::binder::{bind, BindContext};
    use crate::template::parser::parse;
    use serde_json::json;

    fn compose_markup(markup: &str, styles: StyleMap) -> RenderTree {
        let ast = parse(markup).unwrap();
        let data = json!({});
        let ctx = BindContext::new(&data, &styles);
        compose(&bind(&ast, &ctx), PageSize::A4)
    }

    #[test]
    fn test_page_padding_becomes_margin() {
        let mut styles = StyleMap::new();
        styles.insert(
            "page".to_string(),
            Style { padding: Some(Edges::uniform(48.0)), ..Default::default() },
        );
        let tree = compose_markup(r#"<page style={styles.page}><text>hi</text></page>"#, styles);
        assert_eq!(tree.page.margin, Edges::uniform(48.0));
        // The wrapper node must not re-apply the padding as an inset.
        assert!(tree.nodes[0].style.padding.is_none());
    }

    #[test]
    fn test_page_background_image_lifts_to_tree() {
        let mut styles = StyleMap::new();
        styles.insert(
            "page".to_string(),
            Style { background_image: Some("./backdrop.png".into()), ..Default::default() },
        );
        let tree = compose_markup(r#"<page style={styles.page}><text>hi</text></page>"#, styles);
        assert_eq!(tree.background_image.as_deref(), Some("./backdrop.png"));
        // The wrapper node must not carry it as a block background.
        assert!(tree.nodes[0].style.background_image.is_none());
    }

    #[test]
    fn test_row_tag_forces_direction() {
        let tree = compose_markup(
            r#"<page><row><text>a</text><text>b</text></row></page>"#,
            StyleMap::new(),
        );
        let row = &tree.nodes[0].children[0];
        assert_eq!(row.style.direction, Some(Direction::Row));
        assert_eq!(row.children.len(), 2);
    }

    #[test]
    fn test_unknown_tag_composes_as_view() {
        let tree = compose_markup(r#"<page><widget><text>x</text></widget></page>"#, StyleMap::new());
        let widget = &tree.nodes[0].children[0];
        assert!(matches!(widget.kind, NodeKind::View));
        assert_eq!(widget.children.len(), 1);
    }

    #[test]
    fn test_image_src_carried() {
        let tree = compose_markup(
            r#"<page><image src="./photo.jpg" /></page>"#,
            StyleMap::new(),
        );
        match &tree.nodes[0].children[0].kind {
            NodeKind::Image { src } => assert_eq!(src, "./photo.jpg"),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_default_margin_when_page_unstyled() {
        let tree = compose_markup(r#"<page><text>hi</text></page>"#, StyleMap::new());
        assert_eq!(tree.page.margin, Edges::uniform(36.0));
    }
}
