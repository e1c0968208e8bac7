//! Template markup parser.
//!
//! Parses a markup string into an element tree with a single-pass recursive
//! descent over a character-index cursor. The grammar is deliberately tiny:
//!
//! ```text
//! element   = '<' name attr* ('/>' | '>' node* '</' name '>')
//! attr      = name | name '=' '"' literal '"' | name '=' '{' expr '}'
//! node      = element | text
//! ```
//!
//! Expressions inside `{...}` are captured verbatim with balanced-brace
//! counting; their grammar belongs to the binder. Malformed markup is a hard
//! error carrying the byte position. There is no error recovery: a template
//! that fails to parse must not silently render garbage.

use std::fmt;

/// A parsed, unbound template node.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    Element(ElementNode),
    Text(String),
}

/// An element: tag name, attributes, children.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    pub attributes: Vec<(String, AttrValue)>,
    pub children: Vec<TemplateNode>,
}

/// An unresolved attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// `name="text"`: taken verbatim, no escape handling.
    Literal(String),
    /// `name={expr}`: expression source, evaluated at bind time.
    Expr(String),
    /// Bare `name` with no value.
    Flag,
}

impl ElementNode {
    /// Fetch an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Serialize back to markup. Structure-preserving, not byte-identical:
    /// re-parsing the output yields an equal tree.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            match value {
                AttrValue::Literal(s) => {
                    out.push_str("=\"");
                    out.push_str(s);
                    out.push('"');
                }
                AttrValue::Expr(e) => {
                    out.push_str("={");
                    out.push_str(e);
                    out.push('}');
                }
                AttrValue::Flag => {}
            }
        }
        if self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                TemplateNode::Element(el) => el.write_markup(out),
                TemplateNode::Text(t) => out.push_str(t),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// A template compilation failure, with the byte offset of the offense.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Parse a markup string into its root element.
///
/// Exactly one root element is required; leading and trailing whitespace is
/// allowed, anything else is an error.
pub fn parse(markup: &str) -> Result<ElementNode, ParseError> {
    let mut cursor = Cursor::new(markup);
    cursor.skip_whitespace();
    if cursor.peek() != Some('<') {
        return Err(cursor.error("expected '<' at start of template"));
    }
    let root = cursor.parse_element()?;
    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err(cursor.error("unexpected content after root element"));
    }
    Ok(root)
}

struct Cursor<'a> {
    input: &'a [u8],
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { input: src.as_bytes(), src, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError { message: message.to_string(), position: self.pos }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.src[self.pos..].starts_with(s)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Maximal run of tag/attribute name characters.
    fn parse_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse_element(&mut self) -> Result<ElementNode, ParseError> {
        debug_assert_eq!(self.peek(), Some('<'));
        self.bump(); // '<'
        let tag = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        self.skip_whitespace();
        if self.eat("/>") {
            return Ok(ElementNode { tag, attributes, children: Vec::new() });
        }
        if !self.eat(">") {
            return Err(self.error("expected '>' or '/>' after attributes"));
        }

        let children = self.parse_children(&tag)?;
        Ok(ElementNode { tag, attributes, children })
    }

    fn parse_attributes(&mut self) -> Result<Vec<(String, AttrValue)>, ParseError> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('>') | Some('/') | None => break,
                Some(ch) if ch.is_alphanumeric() || ch == '-' || ch == '_' => {
                    let name = self.parse_name()?;
                    let value = if self.eat("=") {
                        self.parse_attr_value()?
                    } else {
                        AttrValue::Flag
                    };
                    attributes.push((name, value));
                }
                Some(_) => return Err(self.error("unexpected character in tag")),
            }
        }
        Ok(attributes)
    }

    fn parse_attr_value(&mut self) -> Result<AttrValue, ParseError> {
        match self.peek() {
            Some('"') => {
                self.bump();
                let start = self.pos;
                // No escape handling: a literal '"' terminates the value.
                while let Some(ch) = self.peek() {
                    if ch == '"' {
                        let value = self.src[start..self.pos].to_string();
                        self.bump();
                        return Ok(AttrValue::Literal(value));
                    }
                    self.bump();
                }
                Err(self.error("unterminated attribute value"))
            }
            Some('{') => {
                self.bump();
                let start = self.pos;
                // Balanced-brace capture; nested braces are tolerated by
                // depth counting, not by parsing the expression.
                let mut depth = 1usize;
                while let Some(ch) = self.peek() {
                    match ch {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                let expr = self.src[start..self.pos].trim().to_string();
                                self.bump();
                                return Ok(AttrValue::Expr(expr));
                            }
                        }
                        _ => {}
                    }
                    self.bump();
                }
                Err(self.error("unterminated expression"))
            }
            _ => Err(self.error("expected '\"' or '{' after '='")),
        }
    }

    fn parse_children(&mut self, tag: &str) -> Result<Vec<TemplateNode>, ParseError> {
        let mut children = Vec::new();
        loop {
            if self.at_end() {
                return Err(self.error("unterminated element: missing closing tag"));
            }
            if self.starts_with("</") {
                let close_pos = self.pos;
                self.pos += 2;
                let name = self.parse_name()?;
                self.skip_whitespace();
                if !self.eat(">") {
                    return Err(self.error("expected '>' in closing tag"));
                }
                if name != tag {
                    return Err(ParseError {
                        message: format!(
                            "mismatched closing tag: expected </{tag}>, found </{name}>"
                        ),
                        position: close_pos,
                    });
                }
                return Ok(children);
            }
            if self.peek() == Some('<') {
                children.push(TemplateNode::Element(self.parse_element()?));
            } else {
                let start = self.pos;
                while let Some(ch) = self.peek() {
                    if ch == '<' {
                        break;
                    }
                    self.bump();
                }
                let text = &self.src[start..self.pos];
                // Whitespace-only runs between elements carry no content.
                if !text.trim().is_empty() {
                    children.push(TemplateNode::Text(text.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_self_closing() {
        let el = parse("<image src=\"photo.png\" />").unwrap();
        assert_eq!(el.tag, "image");
        assert_eq!(el.attr("src"), Some(&AttrValue::Literal("photo.png".into())));
        assert!(el.children.is_empty());
    }

    #[test]
    fn test_parse_nested_elements() {
        let el = parse("<view><text>Hi</text><text>There</text></view>").unwrap();
        assert_eq!(el.tag, "view");
        assert_eq!(el.children.len(), 2);
        match &el.children[0] {
            TemplateNode::Element(t) => {
                assert_eq!(t.tag, "text");
                assert_eq!(t.children, vec![TemplateNode::Text("Hi".into())]);
            }
            _ => panic!("expected element child"),
        }
    }

    #[test]
    fn test_parse_expression_attribute() {
        let el = parse("<text style={styles.name}>X</text>").unwrap();
        assert_eq!(el.attr("style"), Some(&AttrValue::Expr("styles.name".into())));
    }

    #[test]
    fn test_nested_braces_in_expression() {
        let el = parse("<text title={eq(a, {b})} />").unwrap();
        assert_eq!(el.attr("title"), Some(&AttrValue::Expr("eq(a, {b})".into())));
    }

    #[test]
    fn test_bare_flag_attribute() {
        let el = parse("<view primary />").unwrap();
        assert_eq!(el.attr("primary"), Some(&AttrValue::Flag));
    }

    #[test]
    fn test_mismatched_closing_tag_is_rejected() {
        let err = parse("<a><b></a></b>").unwrap_err();
        assert!(err.message.contains("mismatched closing tag"), "{}", err.message);
    }

    #[test]
    fn test_properly_nested_tags_parse() {
        assert!(parse("<a><b></b></a>").is_ok());
    }

    #[test]
    fn test_unterminated_attribute_value() {
        let err = parse("<a name=\"oops />").unwrap_err();
        assert!(err.message.contains("unterminated attribute value"));
    }

    #[test]
    fn test_unterminated_expression() {
        let err = parse("<a style={styles.x />").unwrap_err();
        assert!(err.message.contains("unterminated expression"));
    }

    #[test]
    fn test_unterminated_element() {
        let err = parse("<a><b></b>").unwrap_err();
        assert!(err.message.contains("unterminated element"));
    }

    #[test]
    fn test_trailing_content_rejected() {
        let err = parse("<a></a><b></b>").unwrap_err();
        assert!(err.message.contains("after root element"));
    }

    #[test]
    fn test_whitespace_only_text_dropped() {
        let el = parse("<view>\n  <text>Hi</text>\n</view>").unwrap();
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_text_with_placeholders_kept_verbatim() {
        let el = parse("<text>{{basics.name}} - {{basics.label}}</text>").unwrap();
        assert_eq!(
            el.children,
            vec![TemplateNode::Text("{{basics.name}} - {{basics.label}}".into())]
        );
    }

    #[test]
    fn test_roundtrip_parse_is_idempotent() {
        let markup = r#"<page style={styles.page}>
            <view style={styles.header}>
                <text style={styles.name}>{{basics.name}}</text>
                <image src={basics.image} />
            </view>
            <view if={work} each={work}>
                <text>{{position}}</text>
            </view>
        </page>"#;
        let first = parse(markup).unwrap();
        let second = parse(&first.to_markup()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_error_positions_advance() {
        let err = parse("<view><text></tex></view>").unwrap_err();
        assert!(err.position > 0);
    }
}
