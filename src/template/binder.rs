//! Template binder.
//!
//! Walks a parsed element tree and resolves it against a document context,
//! producing a bound tree with every expression replaced by a final value.
//!
//! Binding is total: it never fails and never panics. A missing path yields
//! the empty string (never the literal `undefined`), because one absent
//! optional field must not blank the whole document. Only the parser can
//! reject a template; the binder only degrades.
//!
//! One binder serves both template flavors. Structural control lives in
//! element attributes (`if={expr}` gates an element, `each={path}` repeats
//! it with the item in scope), while text children additionally understand
//! inline mustache blocks (`{{#if expr}}...{{/if}}`, `{{#each path}}...
//! {{/each}}`) and `{{expr}}` placeholders.

use serde_json::Value;

use crate::style::{Style, StyleMap};

use super::parser::{AttrValue, ElementNode, TemplateNode};

/// Binding context: the document snapshot plus scoped bindings introduced
/// by `each` frames. Resolution checks the innermost frames first, then the
/// root document.
pub struct BindContext<'a> {
    data: &'a Value,
    styles: &'a StyleMap,
    scope: Vec<Value>,
}

impl<'a> BindContext<'a> {
    pub fn new(data: &'a Value, styles: &'a StyleMap) -> Self {
        Self { data, styles, scope: Vec::new() }
    }

    fn with_item(&self, item: Value) -> BindContext<'a> {
        let mut scope = self.scope.clone();
        scope.push(item);
        BindContext { data: self.data, styles: self.styles, scope }
    }

    /// Resolve a dotted path, innermost scope frame first, root data last.
    /// Short-circuits to `None` the moment an intermediate is missing.
    fn resolve_path(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        for frame in self.scope.iter().rev() {
            if path == "this" {
                return Some(frame);
            }
            if let Some(v) = traverse(frame, &parts) {
                return Some(v);
            }
        }
        traverse(self.data, &parts)
    }
}

/// Walk a JSON value by dot-path segments. Array segments may be indices.
fn traverse<'v>(value: &'v Value, parts: &[&str]) -> Option<&'v Value> {
    let mut current = value;
    for part in parts {
        match current {
            Value::Object(map) => current = map.get(*part)?,
            Value::Array(arr) => {
                let idx: usize = part.parse().ok()?;
                current = arr.get(idx)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// A bound element: every attribute resolved to a final value, every text
/// placeholder substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundNode {
    pub tag: String,
    pub attributes: Vec<(String, BoundValue)>,
    pub children: Vec<BoundChild>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundChild {
    Node(BoundNode),
    Text(String),
}

/// A resolved attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Str(String),
    Num(f64),
    Bool(bool),
    /// A reference into the template's style table, keeping the key for the
    /// HTML path (class name) and the data for the PDF path.
    StyleRef { name: String, style: Style },
}

impl BoundNode {
    pub fn attr(&self, name: &str) -> Option<&BoundValue> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        match self.attr(name) {
            Some(BoundValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match self.attr("style") {
            Some(BoundValue::StyleRef { style, .. }) => Some(style),
            _ => None,
        }
    }

    pub fn style_name(&self) -> Option<&str> {
        match self.attr("style") {
            Some(BoundValue::StyleRef { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Concatenated text content of direct text children.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let BoundChild::Text(t) = child {
                out.push_str(t);
            }
        }
        out
    }
}

/// Bind a parsed template root against a context. Infallible.
pub fn bind(root: &ElementNode, ctx: &BindContext) -> BoundNode {
    bind_element(root, ctx).into_iter().next().unwrap_or(BoundNode {
        tag: root.tag.clone(),
        attributes: Vec::new(),
        children: Vec::new(),
    })
}

/// Bind one element, expanding its structural directives. Yields zero nodes
/// (suppressed by `if`), one, or many (repeated by `each`).
fn bind_element(el: &ElementNode, ctx: &BindContext) -> Vec<BoundNode> {
    if let Some(AttrValue::Expr(cond)) = el.attr("if") {
        if !is_truthy(eval_expr(cond, ctx).as_ref()) {
            return Vec::new();
        }
    }

    if let Some(AttrValue::Expr(path)) = el.attr("each") {
        let items = match eval_expr(path, ctx) {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        };
        return items
            .into_iter()
            .map(|item| bind_single(el, &ctx.with_item(item)))
            .collect();
    }

    vec![bind_single(el, ctx)]
}

/// Bind one element instance: attributes and children, directives already
/// handled by the caller.
fn bind_single(el: &ElementNode, ctx: &BindContext) -> BoundNode {
    let mut attributes = Vec::new();
    for (name, value) in &el.attributes {
        if name == "if" || name == "each" {
            continue;
        }
        attributes.push((name.clone(), bind_attr(value, ctx)));
    }

    let mut children = Vec::new();
    for child in &el.children {
        match child {
            TemplateNode::Element(inner) => {
                children.extend(bind_element(inner, ctx).into_iter().map(BoundChild::Node));
            }
            TemplateNode::Text(text) => {
                let expanded = expand_text(text, ctx);
                if !expanded.is_empty() {
                    children.push(BoundChild::Text(expanded));
                }
            }
        }
    }

    BoundNode { tag: el.tag.clone(), attributes, children }
}

fn bind_attr(value: &AttrValue, ctx: &BindContext) -> BoundValue {
    match value {
        AttrValue::Literal(s) => BoundValue::Str(s.clone()),
        AttrValue::Flag => BoundValue::Bool(true),
        AttrValue::Expr(expr) => {
            // `styles.<key>` resolves against the style table, not the data.
            if let Some(key) = expr.strip_prefix("styles.") {
                if let Some(style) = ctx.styles.get(key) {
                    return BoundValue::StyleRef {
                        name: key.to_string(),
                        style: style.clone(),
                    };
                }
                tracing::warn!(style = key, "template references an unknown style key");
                return BoundValue::Str(String::new());
            }
            match eval_expr(expr, ctx) {
                Some(Value::String(s)) => BoundValue::Str(s),
                Some(Value::Number(n)) => BoundValue::Num(n.as_f64().unwrap_or(0.0)),
                Some(Value::Bool(b)) => BoundValue::Bool(b),
                Some(other) => BoundValue::Str(stringify(&other)),
                // Unresolved paths fall back to the literal expression text,
                // so authors can pass through non-path values.
                None => BoundValue::Str(expr.clone()),
            }
        }
    }
}

// ─── Expression evaluation ──────────────────────────────────────────

/// Evaluate an expression: a dotted path, a quoted string, a number, or one
/// of the helpers `eq(a,b)`, `or(...)`, `and(...)`. Returns `None` for an
/// unresolvable path; never errors.
pub fn eval_expr(src: &str, ctx: &BindContext) -> Option<Value> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    if let Some(args) = helper_args(src, "eq") {
        let args = split_args(args);
        if args.len() != 2 {
            return Some(Value::Bool(false));
        }
        let a = eval_expr(args[0], ctx);
        let b = eval_expr(args[1], ctx);
        return Some(Value::Bool(values_equal(a.as_ref(), b.as_ref())));
    }
    if let Some(args) = helper_args(src, "or") {
        let any = split_args(args)
            .iter()
            .any(|a| is_truthy(eval_expr(a, ctx).as_ref()));
        return Some(Value::Bool(any));
    }
    if let Some(args) = helper_args(src, "and") {
        let parts = split_args(args);
        let all = !parts.is_empty()
            && parts.iter().all(|a| is_truthy(eval_expr(a, ctx).as_ref()));
        return Some(Value::Bool(all));
    }

    if (src.starts_with('\'') && src.ends_with('\'') && src.len() >= 2)
        || (src.starts_with('"') && src.ends_with('"') && src.len() >= 2)
    {
        return Some(Value::String(src[1..src.len() - 1].to_string()));
    }

    if let Ok(n) = src.parse::<f64>() {
        return serde_json::Number::from_f64(n).map(Value::Number);
    }

    ctx.resolve_path(src).cloned()
}

/// If `src` is `name(...)`, return the inside of the parens.
fn helper_args<'s>(src: &'s str, name: &str) -> Option<&'s str> {
    let rest = src.strip_prefix(name)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('(')?;
    let rest = rest.strip_suffix(')')?;
    Some(rest)
}

/// Split helper arguments on top-level commas, respecting parens and quotes.
fn split_args(src: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut in_quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in src.char_indices() {
        match in_quote {
            Some(q) => {
                if ch == q {
                    in_quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => in_quote = Some(ch),
                '(' | '{' => depth += 1,
                ')' | '}' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    args.push(src[start..i].trim());
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    let last = src[start..].trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last);
    }
    args.retain(|a| !a.is_empty());
    args
}

/// Strict equality on resolved values. Numbers compare as f64.
fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        (Some(x), Some(y)) => x == y,
        (None, None) => true,
        _ => false,
    }
}

/// Truthiness of a resolved value. Empty strings and arrays are falsy, so
/// `if={work}` on a fully hidden section suppresses the whole block.
pub fn is_truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

/// Stringify a resolved value for text substitution. Missing and null both
/// render as empty, never as `undefined` or `null`.
fn stringify(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

// ─── Text expansion ─────────────────────────────────────────────────

/// Replace every `{{...}}` occurrence in a text run, including inline
/// `{{#if}}` / `{{#each}}` blocks. Unmatched block openers degrade to
/// nothing rather than erroring: binding never aborts.
pub fn expand_text(text: &str, ctx: &BindContext) -> String {
    let mut out = String::new();
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            // Unterminated placeholder: emit nothing for it.
            return out;
        };
        let token = after[..close].trim();
        let following = &after[close + 2..];

        if let Some(cond) = token.strip_prefix("#if ") {
            match find_block_end(following, "#if", "/if") {
                Some((body, tail)) => {
                    if is_truthy(eval_expr(cond, ctx).as_ref()) {
                        out.push_str(&expand_text(body, ctx));
                    }
                    rest = tail;
                }
                None => rest = following,
            }
        } else if let Some(path) = token.strip_prefix("#each ") {
            match find_block_end(following, "#each", "/each") {
                Some((body, tail)) => {
                    if let Some(Value::Array(items)) = eval_expr(path, ctx) {
                        for item in items {
                            out.push_str(&expand_text(body, &ctx.with_item(item)));
                        }
                    }
                    rest = tail;
                }
                None => rest = following,
            }
        } else if token.starts_with('/') {
            // Stray closer: drop it.
            rest = following;
        } else {
            match eval_expr(token, ctx) {
                Some(v) => out.push_str(&stringify(&v)),
                None => {}
            }
            rest = following;
        }
    }
    out.push_str(rest);
    out
}

/// Find the matching `{{/name}}` for a block opened just before `src`,
/// counting nested `{{#name ...}}` openers. Returns (body, tail).
fn find_block_end<'s>(src: &'s str, open: &str, close: &str) -> Option<(&'s str, &'s str)> {
    let mut depth = 1usize;
    let mut pos = 0;
    while let Some(found) = src[pos..].find("{{") {
        let at = pos + found;
        let after = &src[at + 2..];
        let end = after.find("}}")?;
        let token = after[..end].trim();
        if token.starts_with(open) {
            depth += 1;
        } else if token == close {
            depth -= 1;
            if depth == 0 {
                return Some((&src[..at], &after[end + 2..]));
            }
        }
        pos = at + 2 + end + 2;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parser::parse;
    use serde_json::json;

    fn empty_styles() -> StyleMap {
        StyleMap::new()
    }

    #[test]
    fn test_text_placeholder_substitution() {
        let data = json!({ "basics": { "name": "Ada" } });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        assert_eq!(expand_text("Hello {{basics.name}}!", &ctx), "Hello Ada!");
    }

    #[test]
    fn test_missing_path_yields_empty_never_undefined() {
        let data = json!({});
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        let out = expand_text("[{{basics.name}}]", &ctx);
        assert_eq!(out, "[]");
        assert!(!out.contains("undefined"));
    }

    #[test]
    fn test_lookup_never_throws_on_non_object_intermediate() {
        let data = json!({ "basics": "just a string" });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        assert_eq!(expand_text("{{basics.name.deep}}", &ctx), "");
    }

    #[test]
    fn test_inline_if_block() {
        let data = json!({ "basics": { "phone": "555" } });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        assert_eq!(
            expand_text("{{#if basics.phone}}tel: {{basics.phone}}{{/if}}", &ctx),
            "tel: 555"
        );
        assert_eq!(expand_text("{{#if basics.email}}mail{{/if}}", &ctx), "");
    }

    #[test]
    fn test_inline_each_block() {
        let data = json!({ "skills": [{ "name": "Rust" }, { "name": "TypeScript" }] });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        assert_eq!(
            expand_text("{{#each skills}}{{name}}; {{/each}}", &ctx),
            "Rust; TypeScript; "
        );
    }

    #[test]
    fn test_nested_if_inside_each() {
        let data = json!({ "work": [
            { "position": "Dev", "endDate": "2024" },
            { "position": "Lead" }
        ]});
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        let out = expand_text(
            "{{#each work}}{{position}}{{#if endDate}} ({{endDate}}){{/if}}|{{/each}}",
            &ctx,
        );
        assert_eq!(out, "Dev (2024)|Lead|");
    }

    #[test]
    fn test_unterminated_block_degrades_silently() {
        let data = json!({ "x": "y" });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        // No {{/if}}; binding must not abort.
        let out = expand_text("a {{#if x}} b", &ctx);
        assert_eq!(out, "a  b");
    }

    #[test]
    fn test_helpers() {
        let data = json!({ "a": 1, "b": 1, "c": "", "d": "x" });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        assert_eq!(eval_expr("eq(a, b)", &ctx), Some(json!(true)));
        assert_eq!(eval_expr("eq(a, 'nope')", &ctx), Some(json!(false)));
        assert_eq!(eval_expr("or(c, d)", &ctx), Some(json!(true)));
        assert_eq!(eval_expr("and(a, c)", &ctx), Some(json!(false)));
        assert_eq!(eval_expr("and(a, d)", &ctx), Some(json!(true)));
    }

    #[test]
    fn test_if_attribute_gates_element() {
        let data = json!({ "work": [] });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        let el = parse("<view if={work}><text>Experience</text></view>").unwrap();
        let bound = bind(&el, &ctx);
        assert!(bound.children.is_empty(), "empty collection must suppress the block");
    }

    #[test]
    fn test_each_attribute_repeats_element() {
        let data = json!({ "work": [{ "position": "A" }, { "position": "B" }] });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        let el = parse("<view><text each={work}>{{position}}</text></view>").unwrap();
        let bound = bind(&el, &ctx);
        assert_eq!(bound.children.len(), 2);
        match (&bound.children[0], &bound.children[1]) {
            (BoundChild::Node(a), BoundChild::Node(b)) => {
                assert_eq!(a.text_content(), "A");
                assert_eq!(b.text_content(), "B");
            }
            _ => panic!("expected two bound nodes"),
        }
    }

    #[test]
    fn test_scope_resolves_innermost_first_then_root() {
        let data = json!({ "label": "root", "items": [{ "label": "scoped" }, {}] });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        let out = expand_text("{{#each items}}{{label}},{{/each}}", &ctx);
        assert_eq!(out, "scoped,root,");
    }

    #[test]
    fn test_style_attribute_resolves_table_entry() {
        let data = json!({});
        let mut styles = empty_styles();
        styles.insert(
            "name".into(),
            Style { font_size: Some(24.0), ..Default::default() },
        );
        let ctx = BindContext::new(&data, &styles);
        let el = parse("<text style={styles.name}>X</text>").unwrap();
        let bound = bind(&el, &ctx);
        assert_eq!(bound.style_name(), Some("name"));
        assert_eq!(bound.style().unwrap().font_size, Some(24.0));
    }

    #[test]
    fn test_attr_path_fallback_to_literal_text() {
        let data = json!({});
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        let el = parse("<image src={photo.png} />").unwrap();
        let bound = bind(&el, &ctx);
        // Unresolvable path falls back to the raw expression text.
        assert_eq!(bound.attr_str("src"), Some("photo.png"));
    }

    #[test]
    fn test_this_binds_whole_item() {
        let data = json!({ "tags": ["a", "b"] });
        let styles = empty_styles();
        let ctx = BindContext::new(&data, &styles);
        let out = expand_text("{{#each tags}}{{this}}.{{/each}}", &ctx);
        assert_eq!(out, "a.b.");
    }
}
