//! # Page-Aware Layout Engine
//!
//! Content is never laid out on an infinite canvas and sliced afterwards.
//! The algorithm works page-first:
//!
//! 1. Open a page with known dimensions and remaining space
//! 2. Before placing each node, ask: "does this fit?"
//! 3. If it fits: place it, reduce remaining space
//! 4. If it doesn't fit and is unbreakable: start a new page, place it there
//! 5. If it doesn't fit and is breakable: place what fits, continue the rest
//!    on a new page
//!
//! Text breaks at line granularity, rows never break internally, and a
//! container marked `wrap: false` moves to the next page whole. In
//! [`WrapMode::SinglePage`] the fit question is never asked: everything
//! lands on one page and overflow runs past the bottom margin.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::compose::{Node, NodeKind, RenderTree};
use crate::font::FontContext;
use crate::image_loader::{self, LoadedImage};
use crate::style::{apply_text_transform, Color, Direction, Edges, FontStyle, ResolvedStyle, TextAlign};

/// Physical page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub size: PageSize,
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig { size: PageSize::A4, margin: Edges::uniform(36.0) }
    }
}

/// Pagination policy for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Break content across as many pages as it needs.
    #[default]
    Wrap,
    /// Force everything onto one page; overflow runs off the bottom.
    SinglePage,
}

/// A fully laid-out page ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub background: Option<Color>,
    pub elements: Vec<LayoutElement>,
}

/// A positioned element on a page.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    /// Absolute position on the page (top-left corner).
    pub x: f64,
    pub y: f64,
    /// Dimensions including padding and border, excluding margin.
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
    /// Child elements (positioned relative to the page, not the parent).
    pub children: Vec<LayoutElement>,
}

/// What to actually draw for this element.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Nothing to draw, just a layout container.
    None,
    Rect {
        background: Option<Color>,
        border_width: Edges,
        border_color: Color,
    },
    Text {
        lines: Vec<TextLine>,
        font_family: String,
        font_size: f64,
        font_weight: u32,
        font_style: FontStyle,
        letter_spacing: f64,
        color: Color,
    },
    Image {
        image: LoadedImage,
    },
    /// Grey placeholder rectangle when image loading fails.
    ImagePlaceholder,
}

/// One wrapped line of text, positioned absolutely on the page.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub text: String,
}

/// Tracks where we are on the current page during layout.
#[derive(Debug, Clone)]
struct PageCursor {
    config: PageConfig,
    content_width: f64,
    content_height: f64,
    /// Offset from the top of the content box.
    y: f64,
    elements: Vec<LayoutElement>,
    content_x: f64,
    content_y: f64,
    background: Option<Color>,
}

impl PageCursor {
    fn new(config: &PageConfig, background: Option<Color>) -> Self {
        let (page_w, page_h) = config.size.dimensions();
        Self {
            config: config.clone(),
            content_width: page_w - config.margin.horizontal(),
            content_height: page_h - config.margin.vertical(),
            y: 0.0,
            elements: Vec::new(),
            content_x: config.margin.left,
            content_y: config.margin.top,
            background,
        }
    }

    fn remaining_height(&self) -> f64 {
        (self.content_height - self.y).max(0.0)
    }

    fn finalize(&self) -> LayoutPage {
        let (page_w, page_h) = self.config.size.dimensions();
        LayoutPage {
            width: page_w,
            height: page_h,
            background: self.background,
            elements: self.elements.clone(),
        }
    }

    fn new_page(&self) -> Self {
        PageCursor::new(&self.config, self.background)
    }
}

/// The main layout engine.
pub struct LayoutEngine {
    wrap_mode: WrapMode,
    image_dim_cache: RefCell<HashMap<String, (u32, u32)>>,
}

impl LayoutEngine {
    pub fn new(wrap_mode: WrapMode) -> Self {
        Self {
            wrap_mode,
            image_dim_cache: RefCell::new(HashMap::new()),
        }
    }

    fn paginating(&self) -> bool {
        self.wrap_mode == WrapMode::Wrap
    }

    /// Main entry point: lay out a composed document into pages.
    pub fn layout(&self, tree: &RenderTree, font_context: &FontContext) -> Vec<LayoutPage> {
        let mut pages: Vec<LayoutPage> = Vec::new();
        let mut cursor = PageCursor::new(&tree.page, tree.background);

        for node in &tree.nodes {
            let cx = cursor.content_x;
            let cw = cursor.content_width;
            self.layout_node(node, &mut cursor, &mut pages, cx, cw, None, font_context);
        }

        // The final (possibly only) page is always emitted, even when empty,
        // so a blank document still produces a one-page PDF.
        pages.push(cursor.finalize());

        if let Some(src) = &tree.background_image {
            self.paint_page_backdrop(src, &mut pages);
        }
        pages
    }

    /// Insert the decorative backdrop image under every page's content.
    /// A backdrop that fails to load is skipped, not placeholdered: content
    /// stays readable either way.
    fn paint_page_backdrop(&self, src: &str, pages: &mut [LayoutPage]) {
        let image = match image_loader::load_image(src) {
            Ok(image) => image,
            Err(error) => {
                tracing::warn!(src, error, "page backdrop failed to load, skipping");
                return;
            }
        };
        for page in pages {
            page.elements.insert(
                0,
                LayoutElement {
                    x: 0.0,
                    y: 0.0,
                    width: page.width,
                    height: page.height,
                    draw: DrawCommand::Image { image: image.clone() },
                    children: Vec::new(),
                },
            );
        }
    }

    /// Look up cached image dimensions, or load and cache them.
    fn image_dimensions(&self, src: &str) -> Option<(u32, u32)> {
        if let Some(dims) = self.image_dim_cache.borrow().get(src) {
            return Some(*dims);
        }
        let dims = image_loader::load_image_dimensions(src).ok()?;
        self.image_dim_cache.borrow_mut().insert(src.to_string(), dims);
        Some(dims)
    }

    #[allow(clippy::too_many_arguments)]
    fn layout_node(
        &self,
        node: &Node,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        x: f64,
        available_width: f64,
        parent_style: Option<&ResolvedStyle>,
        font_context: &FontContext,
    ) {
        let style = node.style.resolve(parent_style, available_width);

        match &node.kind {
            NodeKind::Text { content } => {
                self.layout_text(content, &style, cursor, pages, x, available_width, font_context);
            }
            NodeKind::Image { src } => {
                self.layout_image(src, &style, cursor, pages, x, available_width);
            }
            NodeKind::View => match style.direction {
                Direction::Column => {
                    self.layout_view(node, &style, cursor, pages, x, available_width, font_context);
                }
                Direction::Row => {
                    self.layout_row(node, &style, cursor, pages, x, available_width, font_context);
                }
            },
        }
    }

    // ── Block containers ────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn layout_view(
        &self,
        node: &Node,
        style: &ResolvedStyle,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        x: f64,
        available_width: f64,
        font_context: &FontContext,
    ) {
        let padding = &style.padding;
        let margin = &style.margin;
        let border = &style.border_width;

        let outer_width = style
            .width
            .unwrap_or(available_width - margin.horizontal());
        let inner_width = outer_width - padding.horizontal() - border.horizontal();

        let children_height = self.measure_children(&node.children, inner_width, style, font_context);
        let total_height = style
            .height
            .unwrap_or(children_height + padding.vertical() + border.vertical());

        let node_x = x + margin.left;
        let fits = !self.paginating()
            || total_height <= cursor.remaining_height() - margin.vertical();

        if fits || !style.breakable {
            if !fits {
                pages.push(cursor.finalize());
                *cursor = cursor.new_page();
            }

            // Children first, then wrap them in the parent's rect.
            let rect_y = cursor.content_y + cursor.y + margin.top;
            let snapshot = cursor.elements.len();
            let saved_y = cursor.y;
            cursor.y += margin.top + padding.top + border.top;

            let children_x = node_x + padding.left + border.left;
            self.layout_children(
                &node.children,
                cursor,
                pages,
                children_x,
                inner_width,
                style,
                font_context,
            );

            let child_elements: Vec<LayoutElement> = cursor.elements.drain(snapshot..).collect();
            cursor.elements.push(LayoutElement {
                x: node_x,
                y: rect_y,
                width: outer_width,
                height: total_height,
                draw: rect_draw(style),
                children: child_elements,
            });

            cursor.y = saved_y + total_height + margin.vertical();
        } else {
            self.layout_breakable_view(
                node,
                style,
                cursor,
                pages,
                node_x,
                outer_width,
                inner_width,
                font_context,
            );
        }
    }

    /// A breakable container that does not fit: let the children paginate
    /// freely, then wrap each page's slice in its own rect so backgrounds
    /// and borders continue across the break.
    #[allow(clippy::too_many_arguments)]
    fn layout_breakable_view(
        &self,
        node: &Node,
        style: &ResolvedStyle,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        node_x: f64,
        outer_width: f64,
        inner_width: f64,
        font_context: &FontContext,
    ) {
        let padding = &style.padding;
        let border = &style.border_width;
        let margin = &style.margin;

        let initial_page_count = pages.len();
        let snapshot = cursor.elements.len();
        let rect_start_y = cursor.content_y + cursor.y + margin.top;

        cursor.y += margin.top + padding.top + border.top;
        let children_start_y = cursor.y;

        let children_x = node_x + padding.left + border.left;
        self.layout_children(
            &node.children,
            cursor,
            pages,
            children_x,
            inner_width,
            style,
            font_context,
        );

        // A declared height taller than the children extends the block,
        // consuming pages until the leftover fits.
        if let Some(declared) = style.height {
            if pages.len() == initial_page_count {
                let consumed = cursor.y - children_start_y;
                let mut leftover =
                    declared - padding.vertical() - border.vertical() - consumed;
                while leftover > 0.0 {
                    let room = cursor.remaining_height();
                    if leftover <= room {
                        cursor.y += leftover;
                        break;
                    }
                    leftover -= room;
                    pages.push(cursor.finalize());
                    *cursor = cursor.new_page();
                }
            }
        }

        let has_visual = style.background_color.is_some()
            || border.top > 0.0
            || border.right > 0.0
            || border.bottom > 0.0
            || border.left > 0.0;

        if !has_visual {
            cursor.y += padding.bottom + border.bottom + margin.bottom;
            return;
        }

        let draw = rect_draw(style);

        if pages.len() == initial_page_count {
            // No break happened after all (measurement was conservative).
            let child_elements: Vec<LayoutElement> = cursor.elements.drain(snapshot..).collect();
            let rect_height =
                cursor.content_y + cursor.y + padding.bottom + border.bottom - rect_start_y;
            cursor.elements.push(LayoutElement {
                x: node_x,
                y: rect_start_y,
                width: outer_width,
                height: rect_height,
                draw,
                children: child_elements,
            });
        } else {
            // First page: our slice runs from where we started to the bottom
            // of the content box. A slice can be empty yet still span height
            // (declared height past the children), so the rect is emitted
            // whenever the span is real.
            let page = &mut pages[initial_page_count];
            let content_bottom = page.height - cursor.config.margin.bottom;
            let slice: Vec<LayoutElement> = page.elements.drain(snapshot..).collect();
            let slice_height = content_bottom - rect_start_y;
            if !slice.is_empty() || slice_height > 0.0 {
                page.elements.push(LayoutElement {
                    x: node_x,
                    y: rect_start_y,
                    width: outer_width,
                    height: slice_height,
                    draw: draw.clone(),
                    children: slice,
                });
            }

            // Intermediate pages are entirely ours.
            for page in &mut pages[initial_page_count + 1..] {
                let content_top = cursor.config.margin.top;
                let content_bottom = page.height - cursor.config.margin.bottom;
                let slice: Vec<LayoutElement> = page.elements.drain(..).collect();
                page.elements.push(LayoutElement {
                    x: node_x,
                    y: content_top,
                    width: outer_width,
                    height: content_bottom - content_top,
                    draw: draw.clone(),
                    children: slice,
                });
            }

            // Current page: from the top of the content box to the cursor.
            let slice: Vec<LayoutElement> = cursor.elements.drain(..).collect();
            let content_top = cursor.content_y;
            let rect_height =
                cursor.content_y + cursor.y + padding.bottom + border.bottom - content_top;
            if !slice.is_empty() || rect_height > 0.0 {
                cursor.elements.push(LayoutElement {
                    x: node_x,
                    y: content_top,
                    width: outer_width,
                    height: rect_height,
                    draw,
                    children: slice,
                });
            }
        }

        cursor.y += padding.bottom + border.bottom + margin.bottom;
    }

    #[allow(clippy::too_many_arguments)]
    fn layout_children(
        &self,
        children: &[Node],
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        content_x: f64,
        available_width: f64,
        parent_style: &ResolvedStyle,
        font_context: &FontContext,
    ) {
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                cursor.y += parent_style.gap;
            }
            self.layout_node(
                child,
                cursor,
                pages,
                content_x,
                available_width,
                Some(parent_style),
                font_context,
            );
        }
    }

    // ── Rows ────────────────────────────────────────────────────────

    /// Horizontal container. Fixed and percentage widths are honored;
    /// auto-width children split the leftover evenly. A row never breaks
    /// internally: if it doesn't fit, the whole row moves to the next page.
    #[allow(clippy::too_many_arguments)]
    fn layout_row(
        &self,
        node: &Node,
        style: &ResolvedStyle,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        x: f64,
        available_width: f64,
        font_context: &FontContext,
    ) {
        let padding = &style.padding;
        let margin = &style.margin;
        let border = &style.border_width;

        let outer_width = style
            .width
            .unwrap_or(available_width - margin.horizontal());
        let inner_width = outer_width - padding.horizontal() - border.horizontal();

        let widths = self.resolve_row_widths(&node.children, inner_width, style);

        // Row height is the tallest cell.
        let children_height = node
            .children
            .iter()
            .zip(&widths)
            .map(|(child, w)| {
                let cs = child.style.resolve(Some(style), *w);
                self.measure_node(child, *w, &cs, font_context) + cs.margin.vertical()
            })
            .fold(0.0f64, f64::max);
        let total_height = style
            .height
            .unwrap_or(children_height + padding.vertical() + border.vertical());

        if self.paginating() && total_height > cursor.remaining_height() - margin.vertical() {
            pages.push(cursor.finalize());
            *cursor = cursor.new_page();
        }

        let node_x = x + margin.left;
        let rect_y = cursor.content_y + cursor.y + margin.top;
        let snapshot = cursor.elements.len();
        let saved_y = cursor.y;

        let mut child_x = node_x + padding.left + border.left;
        for (child, w) in node.children.iter().zip(&widths) {
            cursor.y = saved_y + margin.top + padding.top + border.top;
            self.layout_node(child, cursor, pages, child_x, *w, Some(style), font_context);
            child_x += w + style.gap;
        }

        let child_elements: Vec<LayoutElement> = cursor.elements.drain(snapshot..).collect();
        cursor.elements.push(LayoutElement {
            x: node_x,
            y: rect_y,
            width: outer_width,
            height: total_height,
            draw: rect_draw(style),
            children: child_elements,
        });

        cursor.y = saved_y + total_height + margin.vertical();
    }

    fn resolve_row_widths(
        &self,
        children: &[Node],
        inner_width: f64,
        parent_style: &ResolvedStyle,
    ) -> Vec<f64> {
        let gaps = parent_style.gap * (children.len().saturating_sub(1)) as f64;
        let distributable = (inner_width - gaps).max(0.0);

        let fixed: Vec<Option<f64>> = children
            .iter()
            .map(|c| c.style.width.and_then(|d| d.resolve(distributable)))
            .collect();

        let fixed_total: f64 = fixed.iter().flatten().sum();
        let auto_count = fixed.iter().filter(|w| w.is_none()).count();
        let auto_width = if auto_count > 0 {
            ((distributable - fixed_total) / auto_count as f64).max(0.0)
        } else {
            0.0
        };

        fixed.into_iter().map(|w| w.unwrap_or(auto_width)).collect()
    }

    // ── Text ────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn layout_text(
        &self,
        content: &str,
        style: &ResolvedStyle,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        x: f64,
        available_width: f64,
        font_context: &FontContext,
    ) {
        let padding = &style.padding;
        let margin = &style.margin;
        let border = &style.border_width;

        let outer_width = style
            .width
            .unwrap_or(available_width - margin.horizontal());
        let inner_width = outer_width - padding.horizontal() - border.horizontal();

        let text = apply_text_transform(content, style.text_transform);
        let lines = wrap_text(&text, inner_width, style, font_context);
        if lines.is_empty() && style.background_color.is_none() {
            cursor.y += margin.vertical();
            return;
        }

        let line_height = style.font_size * style.line_height;
        let node_x = x + margin.left;
        let text_x = node_x + padding.left + border.left;

        cursor.y += margin.top;

        // Unbreakable text that doesn't fit whole moves to a fresh page.
        let block_height = lines.len() as f64 * line_height + padding.vertical() + border.vertical();
        if self.paginating()
            && !style.breakable
            && block_height > cursor.remaining_height()
            && cursor.y > 0.0
        {
            pages.push(cursor.finalize());
            *cursor = cursor.new_page();
        }

        let mut remaining: &[String] = &lines;
        loop {
            let room = if self.paginating() {
                let fit = ((cursor.remaining_height() - padding.vertical() - border.vertical())
                    / line_height)
                    .floor() as usize;
                fit.max(if cursor.y == 0.0 { 1 } else { 0 })
            } else {
                remaining.len()
            };

            if room == 0 {
                pages.push(cursor.finalize());
                *cursor = cursor.new_page();
                continue;
            }

            let take = room.min(remaining.len());
            let (slice, rest) = remaining.split_at(take);

            let rect_y = cursor.content_y + cursor.y;
            let slice_height = take as f64 * line_height + padding.vertical() + border.vertical();

            let mut placed = Vec::with_capacity(take);
            for (i, line) in slice.iter().enumerate() {
                let line_width = font_context.measure_string(
                    line,
                    &style.font_family,
                    style.font_weight,
                    style.font_style,
                    style.font_size,
                    style.letter_spacing,
                );
                let lx = match style.text_align {
                    TextAlign::Left => text_x,
                    TextAlign::Center => text_x + (inner_width - line_width) / 2.0,
                    TextAlign::Right => text_x + inner_width - line_width,
                };
                placed.push(TextLine {
                    x: lx,
                    // Baseline sits roughly 80% down the line box.
                    y: rect_y + padding.top + border.top
                        + i as f64 * line_height
                        + style.font_size * 0.8,
                    width: line_width,
                    text: line.clone(),
                });
            }

            cursor.elements.push(LayoutElement {
                x: node_x,
                y: rect_y,
                width: outer_width,
                height: slice_height,
                draw: DrawCommand::Text {
                    lines: placed,
                    font_family: style.font_family.clone(),
                    font_size: style.font_size,
                    font_weight: style.font_weight,
                    font_style: style.font_style,
                    letter_spacing: style.letter_spacing,
                    color: style.color,
                },
                children: Vec::new(),
            });
            cursor.y += slice_height;

            if rest.is_empty() {
                break;
            }
            remaining = rest;
            pages.push(cursor.finalize());
            *cursor = cursor.new_page();
        }

        cursor.y += margin.bottom;
    }

    // ── Images ──────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn layout_image(
        &self,
        src: &str,
        style: &ResolvedStyle,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        x: f64,
        available_width: f64,
    ) {
        let margin = &style.margin;
        let (width, height) = self.image_box(src, style, available_width);

        if self.paginating()
            && height + margin.vertical() > cursor.remaining_height()
            && cursor.y > 0.0
        {
            pages.push(cursor.finalize());
            *cursor = cursor.new_page();
        }

        let draw = match image_loader::load_image(src) {
            Ok(image) => DrawCommand::Image { image },
            Err(error) => {
                tracing::warn!(src, error, "image failed to load, drawing placeholder");
                DrawCommand::ImagePlaceholder
            }
        };

        cursor.elements.push(LayoutElement {
            x: x + margin.left,
            y: cursor.content_y + cursor.y + margin.top,
            width,
            height,
            draw,
            children: Vec::new(),
        });
        cursor.y += height + margin.vertical();
    }

    /// Final on-page size of an image: explicit dimensions win, a missing one
    /// is derived from the intrinsic aspect ratio, and with neither the image
    /// renders at its pixel size (1px = 1pt) clamped to the available width.
    fn image_box(&self, src: &str, style: &ResolvedStyle, available_width: f64) -> (f64, f64) {
        let intrinsic = self.image_dimensions(src);
        let aspect = intrinsic
            .map(|(w, h)| h as f64 / w as f64)
            .unwrap_or(1.0);

        match (style.width, style.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w * aspect),
            (None, Some(h)) => (h / aspect, h),
            (None, None) => {
                let w = intrinsic
                    .map(|(w, _)| w as f64)
                    .unwrap_or(available_width)
                    .min(available_width - style.margin.horizontal());
                (w, w * aspect)
            }
        }
    }

    // ── Measurement ─────────────────────────────────────────────────

    /// Height of a node at the given width, excluding its own margins.
    fn measure_node(
        &self,
        node: &Node,
        available_width: f64,
        style: &ResolvedStyle,
        font_context: &FontContext,
    ) -> f64 {
        if let Some(h) = style.height {
            return h;
        }
        let chrome = style.padding.vertical() + style.border_width.vertical();
        let inner_width = style.width.unwrap_or(available_width)
            - style.padding.horizontal()
            - style.border_width.horizontal();

        match &node.kind {
            NodeKind::Text { content } => {
                let text = apply_text_transform(content, style.text_transform);
                let lines = wrap_text(&text, inner_width, style, font_context);
                lines.len() as f64 * style.font_size * style.line_height + chrome
            }
            NodeKind::Image { src } => self.image_box(src, style, available_width).1,
            NodeKind::View => match style.direction {
                Direction::Column => {
                    self.measure_children(&node.children, inner_width, style, font_context) + chrome
                }
                Direction::Row => {
                    let widths = self.resolve_row_widths(&node.children, inner_width, style);
                    node.children
                        .iter()
                        .zip(&widths)
                        .map(|(child, w)| {
                            let cs = child.style.resolve(Some(style), *w);
                            self.measure_node(child, *w, &cs, font_context) + cs.margin.vertical()
                        })
                        .fold(0.0f64, f64::max)
                        + chrome
                }
            },
        }
    }

    /// Combined height of column children including gaps and margins.
    fn measure_children(
        &self,
        children: &[Node],
        available_width: f64,
        parent_style: &ResolvedStyle,
        font_context: &FontContext,
    ) -> f64 {
        let mut total = 0.0;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                total += parent_style.gap;
            }
            let cs = child.style.resolve(Some(parent_style), available_width);
            total += self.measure_node(child, available_width, &cs, font_context)
                + cs.margin.vertical();
        }
        total
    }
}

fn rect_draw(style: &ResolvedStyle) -> DrawCommand {
    let b = &style.border_width;
    let has_border = b.top > 0.0 || b.right > 0.0 || b.bottom > 0.0 || b.left > 0.0;
    if style.background_color.is_none() && !has_border {
        DrawCommand::None
    } else {
        DrawCommand::Rect {
            background: style.background_color,
            border_width: *b,
            border_color: style.border_color,
        }
    }
}

/// Greedy word wrap. Words that exceed the full width alone are broken by
/// character so a long URL cannot push past the margin.
fn wrap_text(
    text: &str,
    max_width: f64,
    style: &ResolvedStyle,
    font_context: &FontContext,
) -> Vec<String> {
    let measure = |s: &str| {
        font_context.measure_string(
            s,
            &style.font_family,
            style.font_weight,
            style.font_style,
            style.font_size,
            style.letter_spacing,
        )
    };

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate) <= max_width || current.is_empty() && measure(word) <= max_width
            {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure(word) <= max_width {
                current = word.to_string();
            } else {
                // Character-level break for oversized words.
                let mut chunk = String::new();
                for ch in word.chars() {
                    chunk.push(ch);
                    if measure(&chunk) > max_width && chunk.chars().count() > 1 {
                        chunk.pop();
                        lines.push(std::mem::take(&mut chunk));
                        chunk.push(ch);
                    }
                }
                current = chunk;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Node;
    use crate::style::Style;

    fn engine(mode: WrapMode) -> LayoutEngine {
        LayoutEngine::new(mode)
    }

    fn tree(nodes: Vec<Node>) -> RenderTree {
        RenderTree {
            page: PageConfig::default(),
            background: None,
            background_image: None,
            nodes,
        }
    }

    fn text_node(content: &str) -> Node {
        Node::text(content, Style::default())
    }

    fn sized_view(height: f64) -> Node {
        Node::view(
            Style { height: Some(height), ..Default::default() },
            Vec::new(),
        )
    }

    fn count_text_lines(elements: &[LayoutElement]) -> usize {
        elements
            .iter()
            .map(|e| {
                let own = match &e.draw {
                    DrawCommand::Text { lines, .. } => lines.len(),
                    _ => 0,
                };
                own + count_text_lines(&e.children)
            })
            .sum()
    }

    #[test]
    fn test_empty_document_is_one_page() {
        let fc = FontContext::new();
        let pages = engine(WrapMode::Wrap).layout(&tree(vec![]), &fc);
        assert_eq!(pages.len(), 1);
        let (w, h) = PageSize::A4.dimensions();
        assert_eq!((pages[0].width, pages[0].height), (w, h));
    }

    #[test]
    fn test_overflow_breaks_to_new_page() {
        // A4 content height is ~770pt; three 400pt blocks need two pages.
        let fc = FontContext::new();
        let nodes = vec![sized_view(400.0), sized_view(400.0), sized_view(400.0)];
        let pages = engine(WrapMode::Wrap).layout(&tree(nodes), &fc);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_fixed_height_block_spans_pages_with_background() {
        // A 500pt banded block starting 400pt down an A4 page must paint a
        // slice of its background on both sides of the break, and the two
        // slices must add up to the declared height.
        let fc = FontContext::new();
        let banded = Node::view(
            Style {
                height: Some(500.0),
                background_color: Some(Color::hex("#eeeeee")),
                ..Default::default()
            },
            Vec::new(),
        );
        let pages =
            engine(WrapMode::Wrap).layout(&tree(vec![sized_view(400.0), banded]), &fc);
        assert_eq!(pages.len(), 2);

        let band_height = |page: &LayoutPage| {
            page.elements
                .iter()
                .filter(|e| matches!(e.draw, DrawCommand::Rect { .. }))
                .map(|e| e.height)
                .sum::<f64>()
        };
        let first = band_height(&pages[0]);
        let second = band_height(&pages[1]);
        assert!(first > 0.0);
        assert!(second > 0.0);
        assert!((first + second - 500.0).abs() < 0.01);
    }

    #[test]
    fn test_single_page_mode_never_breaks() {
        let fc = FontContext::new();
        let nodes = vec![sized_view(400.0), sized_view(400.0), sized_view(400.0)];
        let pages = engine(WrapMode::SinglePage).layout(&tree(nodes), &fc);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_unbreakable_block_moves_whole() {
        let fc = FontContext::new();
        let unbreakable = Node::view(
            Style { height: Some(500.0), wrap: Some(false), ..Default::default() },
            Vec::new(),
        );
        let pages = engine(WrapMode::Wrap).layout(&tree(vec![sized_view(400.0), unbreakable]), &fc);
        assert_eq!(pages.len(), 2);
        // The unbreakable block starts at the top of page two.
        let el = &pages[1].elements[0];
        assert_eq!(el.y, 36.0);
        assert_eq!(el.height, 500.0);
    }

    #[test]
    fn test_text_wraps_to_multiple_lines() {
        let fc = FontContext::new();
        let long = "alpha beta gamma delta ".repeat(20);
        let pages = engine(WrapMode::Wrap).layout(&tree(vec![text_node(&long)]), &fc);
        assert!(count_text_lines(&pages[0].elements) > 1);
    }

    #[test]
    fn test_text_splits_across_pages_without_losing_lines() {
        let fc = FontContext::new();
        let long = "lorem ipsum dolor sit amet consectetur ".repeat(300);
        let wrapped = engine(WrapMode::Wrap).layout(&tree(vec![text_node(&long)]), &fc);
        assert!(wrapped.len() > 1);

        let single = engine(WrapMode::SinglePage).layout(&tree(vec![text_node(&long)]), &fc);
        assert_eq!(single.len(), 1);

        let total_wrapped: usize = wrapped.iter().map(|p| count_text_lines(&p.elements)).sum();
        let total_single = count_text_lines(&single[0].elements);
        assert_eq!(total_wrapped, total_single);
    }

    #[test]
    fn test_row_splits_auto_widths_evenly() {
        let fc = FontContext::new();
        let row = Node {
            kind: NodeKind::View,
            style: Style { direction: Some(Direction::Row), ..Default::default() },
            children: vec![text_node("left"), text_node("right")],
        };
        let pages = engine(WrapMode::Wrap).layout(&tree(vec![row]), &fc);
        let row_el = &pages[0].elements[0];
        assert_eq!(row_el.children.len(), 2);
        let (a4_w, _) = PageSize::A4.dimensions();
        let content_w = a4_w - 72.0;
        assert!((row_el.children[0].width - content_w / 2.0).abs() < 0.01);
        // Second cell starts where the first ends.
        assert!((row_el.children[1].x - (36.0 + content_w / 2.0)).abs() < 0.01);
    }

    #[test]
    fn test_row_honors_fixed_width() {
        let fc = FontContext::new();
        let row = Node {
            kind: NodeKind::View,
            style: Style { direction: Some(Direction::Row), ..Default::default() },
            children: vec![
                Node::text("a", Style {
                    width: Some(crate::style::Dimension::Pt(100.0)),
                    ..Default::default()
                }),
                text_node("b"),
            ],
        };
        let pages = engine(WrapMode::Wrap).layout(&tree(vec![row]), &fc);
        let row_el = &pages[0].elements[0];
        assert!((row_el.children[0].width - 100.0).abs() < 0.01);
    }

    fn png_data_uri() -> String {
        use base64::Engine;
        let mut img = image::RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba([200, 200, 210, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 1, 1, image::ColorType::Rgba8)
            .unwrap();
        let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
        format!("data:image/png;base64,{b64}")
    }

    #[test]
    fn test_page_backdrop_painted_under_every_page() {
        let fc = FontContext::new();
        let mut doc = tree(vec![sized_view(400.0), sized_view(400.0), sized_view(400.0)]);
        doc.background_image = Some(png_data_uri());

        let pages = engine(WrapMode::Wrap).layout(&doc, &fc);
        assert!(pages.len() > 1);
        for page in &pages {
            let first = &page.elements[0];
            assert!(matches!(first.draw, DrawCommand::Image { .. }));
            assert_eq!((first.x, first.y), (0.0, 0.0));
            assert_eq!((first.width, first.height), (page.width, page.height));
        }
    }

    #[test]
    fn test_unloadable_backdrop_is_skipped() {
        let fc = FontContext::new();
        let mut doc = tree(vec![text_node("hello")]);
        doc.background_image = Some("./no-such-backdrop.png".to_string());

        let pages = engine(WrapMode::Wrap).layout(&doc, &fc);
        assert_eq!(pages.len(), 1);
        // Content renders, no placeholder is injected for the backdrop.
        assert!(pages[0]
            .elements
            .iter()
            .all(|e| !matches!(e.draw, DrawCommand::ImagePlaceholder)));
        assert!(count_text_lines(&pages[0].elements) > 0);
    }

    #[test]
    fn test_bad_image_becomes_placeholder() {
        let fc = FontContext::new();
        let img = Node {
            kind: NodeKind::Image { src: "./does-not-exist.png".to_string() },
            style: Style {
                width: Some(crate::style::Dimension::Pt(64.0)),
                height: Some(64.0),
                ..Default::default()
            },
            children: Vec::new(),
        };
        let pages = engine(WrapMode::Wrap).layout(&tree(vec![img]), &fc);
        let el = &pages[0].elements[0];
        assert!(matches!(el.draw, DrawCommand::ImagePlaceholder));
        assert_eq!((el.width, el.height), (64.0, 64.0));
    }

    #[test]
    fn test_text_align_right() {
        let fc = FontContext::new();
        let node = Node::text(
            "hi",
            Style { text_align: Some(TextAlign::Right), ..Default::default() },
        );
        let pages = engine(WrapMode::Wrap).layout(&tree(vec![node]), &fc);
        match &pages[0].elements[0].draw {
            DrawCommand::Text { lines, .. } => {
                let (a4_w, _) = PageSize::A4.dimensions();
                let right_edge = lines[0].x + lines[0].width;
                assert!((right_edge - (a4_w - 36.0)).abs() < 0.01);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_wrap_text_breaks_oversized_word() {
        let fc = FontContext::new();
        let style = Style::default().resolve(None, 50.0);
        let lines = wrap_text(&"w".repeat(60), 50.0, &style, &fc);
        assert!(lines.len() > 1);
        let rejoined: String = lines.concat();
        assert_eq!(rejoined.len(), 60);
    }
}
