use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::preview::html::to_html;
use crate::preview::PreviewTree;

/// Spacing and block treatments shared by the panel and the full page.
pub const PREVIEW_CSS: &str = r#"
.vw-preview { line-height: 1.7; }
.vw-heading { margin: 1.6em 0 0.6em; line-height: 1.25; font-weight: 700; }
.vw-h1 { font-size: 2em; }
.vw-h2 { font-size: 1.5em; }
.vw-h3 { font-size: 1.25em; }
.vw-paragraph { margin: 0 0 1em; }
.vw-list { margin: 0 0 1em; padding-left: 1.5em; }
.vw-list li { margin: 0.25em 0; }
.vw-task { list-style: none; }
.vw-code-block { margin: 0 0 1em; padding: 1em; border-radius: 8px; background: #f4f4f5; overflow-x: auto; font-family: ui-monospace, monospace; font-size: 0.875em; }
.vw-inline-code { padding: 0.1em 0.35em; border-radius: 4px; background: #f4f4f5; font-family: ui-monospace, monospace; font-size: 0.9em; }
.vw-quote { margin: 1em 0; padding: 0.25em 1em; border-left: 4px solid #6366f1; background: rgba(244, 244, 245, 0.3); font-style: italic; }
.vw-table { margin: 0 0 1em; border-collapse: collapse; }
.vw-table th, .vw-table td { padding: 0.4em 0.8em; border: 1px solid #e4e4e7; }
.vw-image { max-width: 100%; }
.vw-placeholder { color: #71717a; }
.vw-tags { display: flex; gap: 0.5em; padding: 0; list-style: none; }
.vw-tag { padding: 0.1em 0.6em; border-radius: 9999px; background: #f4f4f5; font-size: 0.85em; }
"#;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{#has_title}}{{title}}{{/has_title}}{{^has_title}}Preview{{/has_title}}</title>
<style>{{{css}}}</style>
</head>
<body>
<article class="vw-document">
{{#has_title}}<h1 class="vw-title">{{title}}</h1>{{/has_title}}
{{#has_tags}}<ul class="vw-tags">{{#tags}}<li class="vw-tag">{{tag}}</li>{{/tags}}</ul>{{/has_tags}}
{{{content}}}
</article>
</body>
</html>
"#;

#[derive(ramhorns::Content)]
struct PageTag<'a> {
    tag: &'a str,
}

#[derive(ramhorns::Content)]
struct PageView<'a> {
    has_title: bool,
    title: &'a str,
    has_tags: bool,
    tags: Vec<PageTag<'a>>,
    css: &'a str,
    content: &'a str,
}

/// Full-document preview: the whole post as a standalone HTML page.
pub struct PagePreview<'a> {
    template: Template<'a>,
}

impl PagePreview<'_> {
    pub fn new() -> io::Result<PagePreview<'static>> {
        Self::with_template(PAGE_TEMPLATE)
    }

    pub fn with_template(template_src: &str) -> io::Result<PagePreview> {
        let template = match Template::new(template_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing preview template: {}", e)));
            }
        };

        Ok(PagePreview { template })
    }

    pub fn render(&self, tree: &PreviewTree) -> String {
        let content = to_html(&tree.body);
        let tags: Vec<PageTag> = tree.tags.iter().map(|t| PageTag { tag: t.as_str() }).collect();

        self.template.render(&PageView {
            has_title: !tree.title.is_empty(),
            title: tree.title.as_str(),
            has_tags: !tags.is_empty(),
            tags,
            css: PREVIEW_CSS,
            content: content.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::preview::render;

    use super::*;

    #[test]
    fn test_render_page() {
        let page = PagePreview::new().unwrap();
        let tree = render("<Rust> tips", "Some **bold** text", ["rust", "<web>"]);
        let html = page.render(&tree);

        assert!(html.contains("<title>&lt;Rust&gt; tips</title>"));
        assert!(html.contains("<h1 class=\"vw-title\">&lt;Rust&gt; tips</h1>"));
        assert!(html.contains("<li class=\"vw-tag\">rust</li><li class=\"vw-tag\">&lt;web&gt;</li>"));
        assert!(html.contains("<p class=\"vw-paragraph\">Some <strong>bold</strong> text</p>"));
        assert!(html.contains(".vw-quote"));
    }

    #[test]
    fn test_render_page_without_title_or_tags() {
        let page = PagePreview::new().unwrap();
        let html = page.render(&render("", "", std::iter::empty()));
        assert!(html.contains("<title>Preview</title>"));
        assert!(!html.contains("vw-title"));
        assert!(!html.contains("<ul class=\"vw-tags\">"));
        assert!(html.contains("Start writing your blog content..."));
    }

    #[test]
    fn test_custom_template() {
        let page = PagePreview::with_template("TITLE=[{{title}}] BODY=[{{{content}}}]").unwrap();
        let html = page.render(&render("T", "x", ["a"]));
        assert_eq!(html, "TITLE=[T] BODY=[<div class=\"vw-preview\"><p class=\"vw-paragraph\">x</p>\n</div>]");
    }
}
