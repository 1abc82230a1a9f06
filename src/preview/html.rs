use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::preview::{Align, Block, Inline, LinkTarget, List, PreviewBody, Table, EMPTY_PLACEHOLDER};

/// Renders the preview body as the HTML of the inline preview panel.
pub fn to_html(body: &PreviewBody) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"vw-preview\">");
    match body {
        PreviewBody::Placeholder => {
            out.push_str("<p class=\"vw-placeholder\">");
            out.push_str(&encode_text(EMPTY_PLACEHOLDER));
            out.push_str("</p>");
        }
        PreviewBody::Blocks(blocks) => write_blocks(&mut out, blocks),
    }
    out.push_str("</div>");
    out
}

fn write_blocks(out: &mut String, blocks: &[Block]) {
    for block in blocks {
        write_block(out, block);
        out.push('\n');
    }
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{} class=\"vw-heading vw-h{}\">", level, level));
            write_inlines(out, content);
            out.push_str(&format!("</h{}>", level));
        }
        Block::Paragraph(content) => {
            out.push_str("<p class=\"vw-paragraph\">");
            write_inlines(out, content);
            out.push_str("</p>");
        }
        Block::CodeBlock { lang, code } => {
            out.push_str("<pre class=\"vw-code-block\"><code");
            if let Some(lang) = lang {
                out.push_str(" class=\"language-");
                out.push_str(&encode_double_quoted_attribute(lang));
                out.push('"');
            }
            out.push('>');
            out.push_str(&encode_text(code));
            out.push_str("</code></pre>");
        }
        Block::Quote(blocks) => {
            out.push_str("<blockquote class=\"vw-quote\">\n");
            write_blocks(out, blocks);
            out.push_str("</blockquote>");
        }
        Block::List(list) => write_list(out, list),
        Block::Table(table) => write_table(out, table),
        Block::Rule => out.push_str("<hr class=\"vw-rule\" />"),
        Block::Html(raw) => {
            out.push_str("<p class=\"vw-paragraph\">");
            out.push_str(&encode_text(raw));
            out.push_str("</p>");
        }
    }
}

fn write_list(out: &mut String, list: &List) {
    let tag = if list.ordered { "ol" } else { "ul" };
    out.push_str(&format!("<{} class=\"vw-list\"", tag));
    if let Some(start) = list.start.filter(|s| list.ordered && *s != 1) {
        out.push_str(&format!(" start=\"{}\"", start));
    }
    out.push_str(">\n");

    for item in &list.items {
        match item.checked {
            Some(checked) => {
                out.push_str("<li class=\"vw-task\"><input type=\"checkbox\" disabled");
                if checked {
                    out.push_str(" checked");
                }
                out.push_str(" /> ");
            }
            None => out.push_str("<li>"),
        }

        for (idx, block) in item.blocks.iter().enumerate() {
            match block {
                // Tight lists keep their paragraphs inline
                Block::Paragraph(content) if list.tight => {
                    if idx > 0 {
                        out.push('\n');
                    }
                    write_inlines(out, content);
                }
                other => {
                    out.push('\n');
                    write_block(out, other);
                }
            }
        }
        out.push_str("</li>\n");
    }

    out.push_str(&format!("</{}>", tag));
}

fn align_attr(align: Option<&Align>) -> &'static str {
    match align {
        Some(Align::Left) => " style=\"text-align: left\"",
        Some(Align::Center) => " style=\"text-align: center\"",
        Some(Align::Right) => " style=\"text-align: right\"",
        Some(Align::None) | None => "",
    }
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<table class=\"vw-table\">\n<thead>\n<tr>");
    for (idx, cell) in table.header.iter().enumerate() {
        out.push_str(&format!("<th{}>", align_attr(table.align.get(idx))));
        write_inlines(out, cell);
        out.push_str("</th>");
    }
    out.push_str("</tr>\n</thead>\n");

    if !table.rows.is_empty() {
        out.push_str("<tbody>\n");
        for row in &table.rows {
            out.push_str("<tr>");
            for (idx, cell) in row.iter().enumerate() {
                out.push_str(&format!("<td{}>", align_attr(table.align.get(idx))));
                write_inlines(out, cell);
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n");
    }
    out.push_str("</table>");
}

fn write_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        write_inline(out, inline);
    }
}

fn write_inline(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(text) | Inline::Html(text) => out.push_str(&encode_text(text)),
        Inline::Code(code) => {
            out.push_str("<code class=\"vw-inline-code\">");
            out.push_str(&encode_text(code));
            out.push_str("</code>");
        }
        Inline::Emphasis(content) => {
            out.push_str("<em>");
            write_inlines(out, content);
            out.push_str("</em>");
        }
        Inline::Strong(content) => {
            out.push_str("<strong>");
            write_inlines(out, content);
            out.push_str("</strong>");
        }
        Inline::Strikethrough(content) => {
            out.push_str("<del>");
            write_inlines(out, content);
            out.push_str("</del>");
        }
        Inline::Link(link) => {
            out.push_str("<a href=\"");
            out.push_str(&encode_double_quoted_attribute(&link.url));
            out.push('"');
            if let Some(ref title) = link.title {
                out.push_str(" title=\"");
                out.push_str(&encode_double_quoted_attribute(title));
                out.push('"');
            }
            if link.target == LinkTarget::NewContext {
                out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
            }
            out.push('>');
            write_inlines(out, &link.content);
            out.push_str("</a>");
        }
        Inline::Image { url, alt, title } => {
            out.push_str("<img class=\"vw-image\" src=\"");
            out.push_str(&encode_double_quoted_attribute(url));
            out.push_str("\" alt=\"");
            out.push_str(&encode_double_quoted_attribute(alt));
            out.push('"');
            if let Some(title) = title {
                out.push_str(" title=\"");
                out.push_str(&encode_double_quoted_attribute(title));
                out.push('"');
            }
            out.push_str(" />");
        }
        Inline::Break => out.push_str("<br />"),
    }
}
