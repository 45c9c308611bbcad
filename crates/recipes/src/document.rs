//! Recipe documents (MDX) rendered to terminal lines.
//!
//! The document is parsed as MDX. If that fails it is parsed again as GFM,
//! where JSX shows up as raw HTML, and if that fails too it is shown
//! verbatim. JSX elements are dispatched through [`ELEMENT_TABLE`]; resource
//! placeholders are resolved against a [`ResourceRegistry`].
//!
//! Rendering is a pure function of document, registry, theme and width.

use markdown::mdast::{AttributeContent, AttributeValue, Node};
use markdown::{to_mdast, ParseOptions};
use recipes_tui::{highlight_code, wrap_text_with_ansi, BorderBox, BorderStyle};
use tracing::debug;

use crate::registry::{ResourceDescriptor, ResourceRegistry};
use crate::style;

/// Fence tag used when a code block has no language annotation.
pub const DEFAULT_FENCE_TAG: &str = "```";

pub type CodeHighlighterFn = Box<dyn Fn(&str, Option<&str>) -> Vec<String>>;
type StyleFn = Box<dyn Fn(&str) -> String>;

pub struct DocumentTheme {
    pub bold: StyleFn,
    pub italic: StyleFn,
    pub underline: StyleFn,
    /// Called with `(url, text)`.
    pub link: Box<dyn Fn(&str, &str) -> String>,
    pub resource_name: StyleFn,
    pub resource_describe: StyleFn,
    pub step_border: StyleFn,
    pub quote_border: StyleFn,
    pub rule: StyleFn,
    pub highlight_code: Option<CodeHighlighterFn>,
}

impl DocumentTheme {
    pub fn plain() -> Self {
        Self {
            bold: Box::new(str::to_string),
            italic: Box::new(str::to_string),
            underline: Box::new(str::to_string),
            link: Box::new(|_, text| text.to_string()),
            resource_name: Box::new(str::to_string),
            resource_describe: Box::new(str::to_string),
            step_border: Box::new(str::to_string),
            quote_border: Box::new(str::to_string),
            rule: Box::new(str::to_string),
            highlight_code: None,
        }
    }

    pub fn terminal(highlight: bool) -> Self {
        Self {
            bold: Box::new(style::bold),
            italic: Box::new(style::italic),
            underline: Box::new(style::underline),
            link: Box::new(style::hyperlink),
            resource_name: Box::new(|text| {
                style::bold(&style::underline(&style::on_black(&style::yellow(text))))
            }),
            resource_describe: Box::new(style::green),
            step_border: Box::new(style::magenta_bright),
            quote_border: Box::new(style::dim),
            rule: Box::new(style::dim),
            highlight_code: highlight.then(|| Box::new(highlight_code) as CodeHighlighterFn),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Placeholder resolved through the registry by `_key` or `_uuid`.
    Resource,
    Hidden,
    Container,
    RecipeStep,
}

pub const ELEMENT_TABLE: &[(&str, ElementKind)] = &[
    ("GatsbyPlugin", ElementKind::Resource),
    ("NPMPackageJson", ElementKind::Resource),
    ("NPMPackage", ElementKind::Resource),
    ("File", ElementKind::Resource),
    ("Directory", ElementKind::Resource),
    ("NPMScript", ElementKind::Resource),
    ("Config", ElementKind::Hidden),
    ("GatsbyShadowFile", ElementKind::Hidden),
    ("RecipeIntroduction", ElementKind::Container),
    ("div", ElementKind::Container),
    ("RecipeStep", ElementKind::RecipeStep),
];

pub fn element_kind(name: &str) -> Option<ElementKind> {
    ELEMENT_TABLE
        .iter()
        .find(|(element, _)| *element == name)
        .map(|(_, kind)| *kind)
}

/// Joins exported definitions and recipe steps into one document.
pub fn compose_document(exports: &[String], steps: &[String]) -> String {
    format!("{}\n\n{}", exports.join("\n"), steps.join("\n"))
}

/// Replaces every line break with a single space.
pub fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Drops top-level `import`/`export` blocks. A block only starts at the top
/// of the document or after a blank line and runs until the next blank line.
/// Paragraph continuations and fenced code are left alone.
pub fn strip_module_syntax(document: &str) -> String {
    let mut kept = Vec::new();
    let mut in_fence = false;
    let mut in_module = false;
    let mut block_start = true;
    for line in document.split('\n') {
        let blank = line.trim().is_empty();
        if in_module {
            if blank {
                in_module = false;
                block_start = true;
                kept.push(line);
            }
            continue;
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        } else if !in_fence
            && block_start
            && (line.starts_with("import ") || line.starts_with("export "))
        {
            in_module = true;
            continue;
        }
        block_start = blank && !in_fence;
        kept.push(line);
    }
    kept.join("\n")
}

fn parse(document: &str) -> Option<Node> {
    match to_mdast(document, &ParseOptions::mdx()) {
        Ok(tree) => Some(tree),
        Err(mdx_error) => {
            debug!(error = %mdx_error, "document is not valid MDX, parsing as markdown");
            match to_mdast(document, &ParseOptions::gfm()) {
                Ok(tree) => Some(tree),
                Err(error) => {
                    debug!(%error, "document is not valid markdown, rendering verbatim");
                    None
                }
            }
        }
    }
}

fn attribute(attributes: &[AttributeContent], name: &str) -> Option<String> {
    attributes.iter().find_map(|attribute| match attribute {
        AttributeContent::Property(property) if property.name == name => {
            match property.value.as_ref()? {
                AttributeValue::Literal(value) => Some(value.clone()),
                AttributeValue::Expression(expression) => Some(expression.value.trim().to_string()),
            }
        }
        _ => None,
    })
}

pub struct DocumentRenderer<'a> {
    theme: &'a DocumentTheme,
    registry: &'a ResourceRegistry,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(theme: &'a DocumentTheme, registry: &'a ResourceRegistry) -> Self {
        Self { theme, registry }
    }

    pub fn render(&self, document: &str, width: usize) -> Vec<String> {
        let width = width.max(1);
        let document = strip_module_syntax(document);
        let Some(tree) = parse(&document) else {
            return document
                .split('\n')
                .flat_map(|line| wrap_text_with_ansi(line, width))
                .collect();
        };

        let mut out = Vec::new();
        self.block(&tree, width, &mut out);
        out
    }

    fn blocks(&self, nodes: &[Node], width: usize, out: &mut Vec<String>) {
        for node in nodes {
            self.block(node, width, out);
        }
    }

    fn block(&self, node: &Node, width: usize, out: &mut Vec<String>) {
        match node {
            Node::Root(root) => self.blocks(&root.children, width, out),
            Node::MdxjsEsm(_)
            | Node::MdxFlowExpression(_)
            | Node::Definition(_)
            | Node::FootnoteDefinition(_)
            | Node::Toml(_)
            | Node::Yaml(_) => {}
            Node::Paragraph(paragraph) => self.prose(&paragraph.children, width, out),
            Node::Heading(heading) => {
                let text = collapse_newlines(&self.inline_text(&heading.children));
                let styled = match heading.depth {
                    1 => (self.theme.bold)(&(self.theme.underline)(&text)),
                    3 => (self.theme.bold)(&(self.theme.italic)(&text)),
                    _ => (self.theme.bold)(&text),
                };
                out.extend(wrap_text_with_ansi(&styled, width));
                if heading.depth == 1 {
                    out.push(String::new());
                }
            }
            Node::Code(code) => self.code_block(&code.value, code.lang.as_deref(), out),
            Node::List(list) => {
                for item in &list.children {
                    self.list_item(item, width, out);
                }
                out.push(String::new());
            }
            Node::ListItem(_) => self.list_item(node, width, out),
            Node::Blockquote(quote) => {
                let mut inner = Vec::new();
                self.blocks(&quote.children, width.saturating_sub(2).max(1), &mut inner);
                let border = (self.theme.quote_border)("│ ");
                out.extend(inner.into_iter().map(|line| format!("{border}{line}")));
            }
            Node::ThematicBreak(_) => out.push((self.theme.rule)(&"─".repeat(width.min(40)))),
            Node::Table(table) => {
                for row in &table.children {
                    let cells: Vec<String> = row
                        .children()
                        .map(|cells| {
                            cells
                                .iter()
                                .map(|cell| {
                                    collapse_newlines(
                                        &self.inline_text(
                                            cell.children().map(Vec::as_slice).unwrap_or_default(),
                                        ),
                                    )
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    out.extend(wrap_text_with_ansi(&cells.join(" | "), width));
                }
                out.push(String::new());
            }
            Node::Html(html) => out.extend(html.value.lines().map(str::to_string)),
            Node::MdxJsxFlowElement(element) => self.element(
                element.name.as_deref(),
                &element.attributes,
                &element.children,
                width,
                out,
            ),
            other => self.prose(std::slice::from_ref(other), width, out),
        }
    }

    /// Paragraph text with line breaks collapsed. Block-level elements used
    /// inline split the paragraph around themselves.
    fn prose(&self, children: &[Node], width: usize, out: &mut Vec<String>) {
        let mut pending = String::new();
        for child in children {
            if let Node::MdxJsxTextElement(element) = child {
                let is_block = element.name.as_deref().and_then(element_kind).is_some_and(|kind| {
                    matches!(kind, ElementKind::Resource | ElementKind::RecipeStep)
                });
                if is_block {
                    flush_prose(&mut pending, width, out);
                    self.element(
                        element.name.as_deref(),
                        &element.attributes,
                        &element.children,
                        width,
                        out,
                    );
                    continue;
                }
            }
            self.inline(child, &mut pending);
        }
        flush_prose(&mut pending, width, out);
    }

    fn inline_text(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.inline(node, &mut out);
        }
        out
    }

    fn inline(&self, node: &Node, out: &mut String) {
        match node {
            Node::Text(text) => out.push_str(&text.value),
            Node::InlineCode(code) => out.push_str(&code.value),
            Node::Strong(strong) => out.push_str(&(self.theme.bold)(&self.inline_text(&strong.children))),
            Node::Emphasis(emphasis) => {
                out.push_str(&(self.theme.italic)(&self.inline_text(&emphasis.children)))
            }
            Node::Link(link) => {
                out.push_str(&(self.theme.link)(&link.url, &self.inline_text(&link.children)))
            }
            Node::Image(image) => out.push_str(&image.alt),
            Node::Break(_) => out.push('\n'),
            Node::Html(html) => out.push_str(&html.value),
            Node::MdxJsxTextElement(element) => {
                let name = element.name.as_deref();
                match name.map(element_kind) {
                    Some(Some(ElementKind::Container)) | None => {
                        out.push_str(&self.inline_text(&element.children))
                    }
                    Some(Some(_)) => {}
                    Some(None) => debug!(element = name.unwrap_or_default(), "skipping unknown element"),
                }
            }
            other => {
                if let Some(children) = other.children() {
                    for child in children {
                        self.inline(child, out);
                    }
                }
            }
        }
    }

    fn code_block(&self, value: &str, lang: Option<&str>, out: &mut Vec<String>) {
        let tag = lang.filter(|lang| !lang.is_empty()).unwrap_or(DEFAULT_FENCE_TAG);
        let code = value.trim();
        let lines = match self.theme.highlight_code.as_ref() {
            Some(highlighter) => highlighter(code, (tag != DEFAULT_FENCE_TAG).then_some(tag)),
            None => code.lines().map(str::to_string).collect(),
        };

        out.push(format!("```{tag}"));
        out.extend(lines);
        out.push("```".to_string());
        out.push(String::new());
    }

    fn list_item(&self, item: &Node, width: usize, out: &mut Vec<String>) {
        let mut inner = Vec::new();
        if let Some(children) = item.children() {
            self.blocks(children, width.saturating_sub(2).max(1), &mut inner);
        }
        if inner.is_empty() {
            out.push("* ".to_string());
            return;
        }
        for (index, line) in inner.into_iter().enumerate() {
            out.push(match index {
                0 => format!("* {line}"),
                _ if line.is_empty() => line,
                _ => format!("  {line}"),
            });
        }
    }

    fn element(
        &self,
        name: Option<&str>,
        attributes: &[AttributeContent],
        children: &[Node],
        width: usize,
        out: &mut Vec<String>,
    ) {
        // fragments render their children
        let Some(name) = name else {
            self.blocks(children, width, out);
            return;
        };

        match element_kind(name) {
            Some(ElementKind::Resource) => self.resource(attributes, width, out),
            Some(ElementKind::Hidden) => {}
            Some(ElementKind::Container) => self.blocks(children, width, out),
            Some(ElementKind::RecipeStep) => self.recipe_step(attributes, children, width, out),
            None => debug!(element = name, "skipping unknown element"),
        }
    }

    fn lookup(&self, attributes: &[AttributeContent]) -> Option<&'a ResourceDescriptor> {
        let registry = self.registry;
        match attribute(attributes, "_key") {
            Some(key) => registry.lookup_by_key(&key),
            None => attribute(attributes, "_uuid").and_then(|uuid| registry.lookup_by_uuid(&uuid)),
        }
    }

    fn resource(&self, attributes: &[AttributeContent], width: usize, out: &mut Vec<String>) {
        let Some(resource) = self.lookup(attributes) else {
            debug!("resource placeholder did not resolve");
            return;
        };

        out.push((self.theme.resource_name)(&format!("{}:", resource.resource_name)));
        if !resource.describe.is_empty() {
            let describe = (self.theme.resource_describe)(&resource.describe);
            out.extend(wrap_text_with_ansi(&describe, width));
        }
        if let Some(diff) = resource.diff.as_deref() {
            out.push(String::new());
            out.extend(diff.lines().map(str::to_string));
        }
        out.push(String::new());
    }

    fn recipe_step(
        &self,
        attributes: &[AttributeContent],
        children: &[Node],
        width: usize,
        out: &mut Vec<String>,
    ) {
        let frame = BorderBox::new(BorderStyle::Single, 1, 1);
        let mut inner = Vec::new();
        self.blocks(children, width.saturating_sub(4).max(1), &mut inner);
        while inner.last().is_some_and(String::is_empty) {
            inner.pop();
        }

        if let Some(step) = attribute(attributes, "step") {
            let header = format!("{step}) ");
            match inner.first_mut() {
                Some(first) => first.insert_str(0, &header),
                None => inner.push(header),
            }
        }
        out.extend(frame.frame(&inner, width, &*self.theme.step_border));
    }
}

fn flush_prose(pending: &mut String, width: usize, out: &mut Vec<String>) {
    let text = collapse_newlines(pending);
    pending.clear();
    let text = text.trim();
    if !text.is_empty() {
        out.extend(wrap_text_with_ansi(text, width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_table_covers_known_elements() {
        assert_eq!(element_kind("File"), Some(ElementKind::Resource));
        assert_eq!(element_kind("Config"), Some(ElementKind::Hidden));
        assert_eq!(element_kind("div"), Some(ElementKind::Container));
        assert_eq!(element_kind("RecipeStep"), Some(ElementKind::RecipeStep));
        assert_eq!(element_kind("Marquee"), None);
    }

    #[test]
    fn compose_joins_exports_then_steps() {
        let exports = vec!["export const a = 1".to_string()];
        let steps = vec!["# One".to_string(), "# Two".to_string()];
        assert_eq!(
            compose_document(&exports, &steps),
            "export const a = 1\n\n# One\n# Two"
        );
    }

    #[test]
    fn module_blocks_are_stripped_outside_fences() {
        let document = "export const a = {\n  b: 1\n}\n\n# Title\n```js\nexport default x\n```";
        assert_eq!(
            strip_module_syntax(document),
            "\n# Title\n```js\nexport default x\n```"
        );
    }

    #[test]
    fn module_keywords_inside_paragraphs_are_kept() {
        let document = "Install it first\nexport later\n\nexport const b = 2\n\n```js\n\nimport x\n```";
        assert_eq!(
            strip_module_syntax(document),
            "Install it first\nexport later\n\n\n```js\n\nimport x\n```"
        );
    }

    #[test]
    fn newlines_collapse_to_spaces() {
        assert_eq!(collapse_newlines("a\r\nb\nc\rd"), "a b c d");
    }

    #[test]
    fn step_attribute_reads_literals() {
        let tree = to_mdast("<RecipeStep step=\"2\">\n\nhi\n\n</RecipeStep>", &ParseOptions::mdx())
            .unwrap();
        let Some(Node::MdxJsxFlowElement(element)) = tree.children().and_then(|c| c.first()) else {
            panic!("expected a flow element");
        };
        assert_eq!(attribute(&element.attributes, "step").as_deref(), Some("2"));
        assert_eq!(attribute(&element.attributes, "missing"), None);
    }
}
