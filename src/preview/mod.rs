//! Read-only preview of the document being written.
//!
//! The markdown body is parsed (GitHub flavoured) into a small visual tree of
//! [`Block`]s and [`Inline`]s. The same tree feeds the inline preview panel
//! and the full-document page, so both apply the same rendering rules.

use std::collections::HashMap;

use markdown::mdast::{AlignKind, Node};
use markdown::ParseOptions;
use spdlog::warn;

pub mod html;
pub mod page;

/// Shown instead of an empty tree when there is nothing to preview.
pub const EMPTY_PLACEHOLDER: &str = "Start writing your blog content...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    SameContext,
    /// Opened in a new browsing context, without opener or referrer.
    NewContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub title: Option<String>,
    pub target: LinkTarget,
    pub content: Vec<Inline>,
}

impl Link {
    fn new(url: &str, title: Option<String>, content: Vec<Inline>) -> Self {
        Self {
            url: url.to_string(),
            title,
            target: link_target(url),
            content,
        }
    }
}

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Returns the URL when it is relative or uses an allowed scheme. Browsers
/// ignore tabs, newlines and controls inside a scheme, so those are dropped
/// before looking at it.
pub fn safe_url(url: &str) -> Option<&str> {
    let url = url.trim();
    let cleaned: String = url.chars().filter(|c| !c.is_ascii_whitespace() && !c.is_control()).collect();
    let Some(colon) = cleaned.find(':') else {
        return Some(url);
    };
    if cleaned[..colon].contains(['/', '?', '#']) {
        return Some(url);
    }

    let scheme = cleaned[..colon].to_ascii_lowercase();
    SAFE_SCHEMES.contains(&scheme.as_str()).then_some(url)
}

pub fn link_target(url: &str) -> LinkTarget {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//") {
        LinkTarget::NewContext
    } else {
        LinkTarget::SameContext
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link(Link),
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    Break,
    /// Raw HTML from the source, shown as text.
    Html(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

impl From<&AlignKind> for Align {
    fn from(value: &AlignKind) -> Self {
        match value {
            AlignKind::None => Align::None,
            AlignKind::Left => Align::Left,
            AlignKind::Center => Align::Center,
            AlignKind::Right => Align::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// `Some` for task list items.
    pub checked: Option<bool>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub start: Option<u32>,
    pub tight: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub align: Vec<Align>,
    pub header: Vec<Vec<Inline>>,
    pub rows: Vec<Vec<Vec<Inline>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    CodeBlock { lang: Option<String>, code: String },
    Quote(Vec<Block>),
    List(List),
    Table(Table),
    Rule,
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBody {
    Placeholder,
    Blocks(Vec<Block>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTree {
    pub title: String,
    pub tags: Vec<String>,
    pub body: PreviewBody,
}

/// Builds the preview of `(title, body, tags)`.
pub fn render<'a>(title: &str, body: &str, tags: impl IntoIterator<Item = &'a str>) -> PreviewTree {
    PreviewTree {
        title: title.trim().to_string(),
        tags: tags.into_iter().map(str::to_string).collect(),
        body: render_body(body),
    }
}

pub fn render_body(body: &str) -> PreviewBody {
    if body.trim().is_empty() {
        return PreviewBody::Placeholder;
    }

    let root = match markdown::to_mdast(body, &ParseOptions::gfm()) {
        Ok(root) => root,
        Err(e) => {
            // Only MDX constructs can fail to parse, show the source as is
            warn!("Could not parse preview body: {}", e);
            return PreviewBody::Blocks(vec![Block::Paragraph(vec![Inline::Text(body.to_string())])]);
        }
    };

    let mut definitions = HashMap::new();
    collect_definitions(&root, &mut definitions);
    let builder = TreeBuilder { definitions };

    let blocks = builder.blocks(root.children().map(Vec::as_slice).unwrap_or_default());
    if blocks.is_empty() {
        PreviewBody::Placeholder
    } else {
        PreviewBody::Blocks(blocks)
    }
}

fn collect_definitions(node: &Node, out: &mut HashMap<String, (String, Option<String>)>) {
    if let Node::Definition(def) = node {
        out.entry(def.identifier.clone())
            .or_insert_with(|| (def.url.clone(), def.title.clone()));
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, out);
        }
    }
}

struct TreeBuilder {
    definitions: HashMap<String, (String, Option<String>)>,
}

impl TreeBuilder {
    fn blocks(&self, nodes: &[Node]) -> Vec<Block> {
        let mut out = vec![];
        for node in nodes {
            self.block(node, &mut out);
        }
        out
    }

    fn block(&self, node: &Node, out: &mut Vec<Block>) {
        match node {
            Node::Heading(h) => out.push(Block::Heading {
                level: h.depth,
                content: self.inlines(&h.children),
            }),
            Node::Paragraph(p) => out.push(Block::Paragraph(self.inlines(&p.children))),
            Node::Code(c) => out.push(Block::CodeBlock {
                lang: c.lang.clone(),
                code: c.value.clone(),
            }),
            Node::Blockquote(q) => out.push(Block::Quote(self.blocks(&q.children))),
            Node::List(l) => out.push(Block::List(List {
                ordered: l.ordered,
                start: l.start,
                tight: !l.spread,
                items: l.children.iter().map(|item| self.list_item(item)).collect(),
            })),
            Node::Table(t) => out.push(Block::Table(self.table(&t.align, &t.children))),
            Node::ThematicBreak(_) => out.push(Block::Rule),
            Node::Html(h) => out.push(Block::Html(h.value.clone())),
            Node::Definition(_) => {}
            other => match other.children() {
                Some(children) => {
                    for child in children {
                        self.block(child, out);
                    }
                }
                None => {
                    let text = other.to_string();
                    if !text.trim().is_empty() {
                        out.push(Block::Paragraph(vec![Inline::Text(text)]));
                    }
                }
            },
        }
    }

    fn list_item(&self, node: &Node) -> ListItem {
        match node {
            Node::ListItem(item) => ListItem {
                checked: item.checked,
                blocks: self.blocks(&item.children),
            },
            other => ListItem {
                checked: None,
                blocks: self.blocks(std::slice::from_ref(other)),
            },
        }
    }

    fn table(&self, align: &[AlignKind], rows: &[Node]) -> Table {
        let mut rows = rows.iter().filter_map(|row| match row {
            Node::TableRow(r) => Some(
                r.children
                    .iter()
                    .map(|cell| self.inlines(cell.children().map(Vec::as_slice).unwrap_or_default()))
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        });

        let header = rows.next().unwrap_or_default();
        Table {
            align: align.iter().map(Align::from).collect(),
            header,
            rows: rows.collect(),
        }
    }

    fn inlines(&self, nodes: &[Node]) -> Vec<Inline> {
        let mut out = vec![];
        for node in nodes {
            self.inline(node, &mut out);
        }
        out
    }

    fn inline(&self, node: &Node, out: &mut Vec<Inline>) {
        match node {
            Node::Text(t) => out.push(Inline::Text(t.value.clone())),
            Node::InlineCode(c) => out.push(Inline::Code(c.value.clone())),
            Node::Emphasis(e) => out.push(Inline::Emphasis(self.inlines(&e.children))),
            Node::Strong(s) => out.push(Inline::Strong(self.inlines(&s.children))),
            Node::Delete(d) => out.push(Inline::Strikethrough(self.inlines(&d.children))),
            Node::Link(l) => self.link(out, &l.url, l.title.as_ref(), &l.children),
            Node::LinkReference(r) => match self.definitions.get(&r.identifier) {
                Some((url, title)) => self.link(out, url, title.as_ref(), &r.children),
                None => out.extend(self.inlines(&r.children)),
            },
            Node::Image(i) => out.push(image(&i.url, &i.alt, i.title.as_ref())),
            Node::ImageReference(r) => match self.definitions.get(&r.identifier) {
                Some((url, title)) => out.push(image(url, &r.alt, title.as_ref())),
                None => out.push(Inline::Text(r.alt.clone())),
            },
            Node::Break(_) => out.push(Inline::Break),
            Node::Html(h) => out.push(Inline::Html(h.value.clone())),
            Node::FootnoteReference(f) => {
                let label = f.label.clone().unwrap_or_else(|| f.identifier.clone());
                out.push(Inline::Text(format!("[^{}]", label)))
            }
            other => match other.children() {
                Some(children) => {
                    for child in children {
                        self.inline(child, out);
                    }
                }
                None => out.push(Inline::Text(other.to_string())),
            },
        }
    }

    /// A link with a disallowed scheme keeps its text but loses the anchor.
    fn link(&self, out: &mut Vec<Inline>, url: &str, title: Option<&String>, children: &[Node]) {
        let content = self.inlines(children);
        match safe_url(url) {
            Some(url) => out.push(Inline::Link(Link::new(url, title.cloned(), content))),
            None => out.extend(content),
        }
    }
}

fn image(url: &str, alt: &str, title: Option<&String>) -> Inline {
    match safe_url(url) {
        Some(url) => Inline::Image {
            url: url.to_string(),
            alt: alt.to_string(),
            title: title.cloned(),
        },
        None => Inline::Text(alt.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_data::POST_DATA_MD;

    use super::*;

    fn blocks(body: &str) -> Vec<Block> {
        match render_body(body) {
            PreviewBody::Blocks(blocks) => blocks,
            PreviewBody::Placeholder => panic!("unexpected placeholder"),
        }
    }

    #[test]
    fn test_empty_body_is_placeholder() {
        assert_eq!(render_body(""), PreviewBody::Placeholder);
        assert_eq!(render_body("  \n\t\n"), PreviewBody::Placeholder);
    }

    #[test]
    fn test_post_structure() {
        let blocks = blocks(POST_DATA_MD);
        assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(blocks[1], Block::Paragraph(_)));
        assert!(matches!(blocks[2], Block::Quote(_)));
        assert!(matches!(blocks[3], Block::Heading { level: 2, .. }));

        let Block::List(ref list) = blocks[4] else { panic!("expected a list") };
        assert!(!list.ordered);
        assert!(list.tight);
        assert_eq!(list.items[0].checked, None);
        assert_eq!(list.items[1].checked, Some(false));

        assert_eq!(
            blocks[5],
            Block::CodeBlock {
                lang: Some("rust".to_string()),
                code: "fn main() {}".to_string()
            }
        );
        let Block::Paragraph(ref inlines) = blocks[6] else { panic!("expected a paragraph") };
        assert!(inlines.contains(&Inline::Code("cargo".to_string())));
    }

    #[test]
    fn test_link_targets() {
        assert_eq!(link_target("https://example.com"), LinkTarget::NewContext);
        assert_eq!(link_target("HTTP://example.com"), LinkTarget::NewContext);
        assert_eq!(link_target("/blog/hello"), LinkTarget::SameContext);
        assert_eq!(link_target("#top"), LinkTarget::SameContext);
    }

    #[test]
    fn test_safe_urls() {
        assert_eq!(safe_url("https://example.com"), Some("https://example.com"));
        assert_eq!(safe_url("MAILTO:me@example.com"), Some("MAILTO:me@example.com"));
        assert_eq!(safe_url("/blogs/hello"), Some("/blogs/hello"));
        assert_eq!(safe_url("#top"), Some("#top"));
        assert_eq!(safe_url("images/a:b.png"), Some("images/a:b.png"));
        assert_eq!(safe_url("?page=2:3"), Some("?page=2:3"));
        assert_eq!(safe_url("javascript:alert(document.cookie)"), None);
        assert_eq!(safe_url("JavaScript:alert(1)"), None);
        assert_eq!(safe_url("java\tscript:alert(1)"), None);
        assert_eq!(safe_url(" data:text/html;base64,PHNjcmlwdD4="), None);
        assert_eq!(safe_url("vbscript:msgbox(1)"), None);
    }

    #[test]
    fn test_unsafe_link_keeps_text() {
        let blocks = blocks("[click](javascript:alert(document.cookie)) and ![pic](data:image/png;base64,AAAA)");
        let Block::Paragraph(ref inlines) = blocks[0] else { panic!("expected a paragraph") };
        assert!(!inlines.iter().any(|i| matches!(i, Inline::Link(_) | Inline::Image { .. })));
        assert_eq!(inlines[0], Inline::Text("click".to_string()));
        assert!(inlines.contains(&Inline::Text("pic".to_string())));
    }

    #[test]
    fn test_reference_links_resolve() {
        let blocks = blocks("See [docs][d].\n\n[d]: https://docs.rs \"Docs\"\n");
        assert_eq!(blocks.len(), 1);
        let Block::Paragraph(ref inlines) = blocks[0] else { panic!("expected a paragraph") };
        let Inline::Link(ref link) = inlines[1] else { panic!("expected a link") };
        assert_eq!(link.url, "https://docs.rs");
        assert_eq!(link.title.as_deref(), Some("Docs"));
        assert_eq!(link.target, LinkTarget::NewContext);
    }

    #[test]
    fn test_gfm_extensions() {
        let blocks = blocks("| a | b |\n|:--|--:|\n| 1 | ~~2~~ |\n\nvisit www.example.com");
        let Block::Table(ref table) = blocks[0] else { panic!("expected a table") };
        assert_eq!(table.align, vec![Align::Left, Align::Right]);
        assert_eq!(table.header.len(), 2);
        assert_eq!(table.rows[0][1], vec![Inline::Strikethrough(vec![Inline::Text("2".to_string())])]);

        let Block::Paragraph(ref inlines) = blocks[1] else { panic!("expected a paragraph") };
        assert!(matches!(inlines[1], Inline::Link(Link { target: LinkTarget::NewContext, .. })));
    }

    #[test]
    fn test_render_keeps_title_and_tags() {
        let tree = render(" Title ", "", ["rust", "web"]);
        assert_eq!(tree.title, "Title");
        assert_eq!(tree.tags, vec!["rust", "web"]);
        assert_eq!(tree.body, PreviewBody::Placeholder);
    }
}
