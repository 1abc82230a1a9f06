/// A `[start, end]` range into the body, measured in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn caret(offset: usize) -> Self {
        Self { start: offset, end: offset }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps both ends inside a body of `char_count` characters.
    pub fn clamp(self, char_count: usize) -> Self {
        Self::new(self.start.min(char_count), self.end.min(char_count))
    }
}

/// Result of a text operation: the new body and where the selection lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub body: String,
    pub selection: Selection,
}

fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Surrounds the selection with `before`/`after`.
///
/// With a selection, the cursor ends up right after `after`. Without one, the
/// placeholder is inserted and selected so it can be typed over; with no
/// placeholder either, the cursor sits between the two markers.
pub fn wrap(body: &str, selection: Selection, before: &str, after: &str, placeholder: &str) -> Edit {
    let selection = selection.clamp(char_len(body));
    let start_byte = byte_offset(body, selection.start);
    let end_byte = byte_offset(body, selection.end);
    let selected = &body[start_byte..end_byte];

    let wrapped = if selected.is_empty() { placeholder } else { selected };

    let mut new_body = String::with_capacity(body.len() + before.len() + wrapped.len() + after.len());
    new_body.push_str(&body[..start_byte]);
    new_body.push_str(before);
    new_body.push_str(wrapped);
    new_body.push_str(after);
    new_body.push_str(&body[end_byte..]);

    let inner_start = selection.start + char_len(before);
    let new_selection = if !selected.is_empty() {
        Selection::caret(inner_start + char_len(selected) + char_len(after))
    } else if !placeholder.is_empty() {
        Selection::new(inner_start, inner_start + char_len(placeholder))
    } else {
        Selection::caret(inner_start)
    };

    Edit {
        body: new_body,
        selection: new_selection,
    }
}

/// Prepends `prefix` to every non-blank line touched by the selection.
pub fn prefix_lines(body: &str, selection: Selection, prefix: &str) -> Edit {
    let selection = selection.clamp(char_len(body));
    let start_byte = byte_offset(body, selection.start);
    let end_byte = byte_offset(body, selection.end);

    let line_start = body[..start_byte].rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let line_end = body[end_byte..]
        .find('\n')
        .map(|idx| end_byte + idx)
        .unwrap_or(body.len());

    let mut prefixed_count = 0;
    let lines: Vec<String> = body[line_start..line_end]
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                prefixed_count += 1;
                format!("{}{}", prefix, line)
            }
        })
        .collect();

    let mut new_body = String::with_capacity(body.len() + prefix.len() * prefixed_count);
    new_body.push_str(&body[..line_start]);
    new_body.push_str(&lines.join("\n"));
    new_body.push_str(&body[line_end..]);

    Edit {
        body: new_body,
        selection: Selection::caret(selection.start + char_len(prefix) * prefixed_count),
    }
}

/// Inserts `unit` at the cursor without wrapping anything.
pub fn indent(body: &str, selection: Selection, unit: &str) -> Edit {
    wrap(body, selection, unit, "", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_selection() {
        let body = "hello world";
        for (start, end) in [(0, 0), (0, 5), (6, 11), (3, 8), (11, 11)] {
            let edit = wrap(body, Selection::new(start, end), "**", "**", "");
            let expected = format!("{}**{}**{}", &body[..start], &body[start..end], &body[end..]);
            assert_eq!(edit.body, expected);
            if start != end {
                assert_eq!(edit.selection, Selection::caret(start + 2 + (end - start) + 2));
            }
        }
    }

    #[test]
    fn test_wrap_placeholder_selected() {
        let edit = wrap("", Selection::caret(0), "**", "**", "bold text");
        assert_eq!(edit.body, "**bold text**");
        assert_eq!(edit.selection, Selection::new(2, 11));

        let edit = wrap("abc", Selection::caret(1), "[", "](https://example.com)", "link text");
        assert_eq!(edit.body, "a[link text](https://example.com)bc");
        assert_eq!(edit.selection.start, 2);
        assert_eq!(edit.selection.len(), "link text".len());
    }

    #[test]
    fn test_wrap_italic_cursor_after() {
        let edit = wrap("hello world", Selection::new(0, 5), "*", "*", "italic text");
        assert_eq!(edit.body, "*hello* world");
        assert_eq!(edit.selection, Selection::caret(7));
    }

    #[test]
    fn test_wrap_no_placeholder_cursor_between() {
        let edit = wrap("ab", Selection::caret(1), "`", "`", "");
        assert_eq!(edit.body, "a``b");
        assert_eq!(edit.selection, Selection::caret(2));
    }

    #[test]
    fn test_wrap_counts_chars_not_bytes() {
        let edit = wrap("café olé", Selection::new(5, 8), "*", "*", "");
        assert_eq!(edit.body, "café *olé*");
        assert_eq!(edit.selection, Selection::caret(10));
    }

    #[test]
    fn test_wrap_clamps_out_of_range_selection() {
        let edit = wrap("abc", Selection::new(2, 40), "*", "*", "");
        assert_eq!(edit.body, "ab*c*");
        assert_eq!(edit.selection, Selection::caret(5));
    }

    #[test]
    fn test_prefix_skips_blank_lines() {
        let edit = prefix_lines("foo\n\nbar", Selection::new(0, 8), "> ");
        assert_eq!(edit.body, "> foo\n\n> bar");
        assert_eq!(edit.selection, Selection::caret(4));
    }

    #[test]
    fn test_prefix_whitespace_only_line_untouched() {
        let edit = prefix_lines("a\n   \nb", Selection::new(0, 7), "- ");
        assert_eq!(edit.body, "- a\n   \n- b");
    }

    #[test]
    fn test_prefix_extends_to_whole_line() {
        let body = "intro\nsecond line\noutro";
        let edit = prefix_lines(body, Selection::caret(9), "## ");
        assert_eq!(edit.body, "intro\n## second line\noutro");
        assert_eq!(edit.selection, Selection::caret(12));
    }

    #[test]
    fn test_prefix_partial_multi_line_selection() {
        let body = "one\ntwo\nthree\nfour";
        let edit = prefix_lines(body, Selection::new(5, 10), "1. ");
        assert_eq!(edit.body, "one\n1. two\n1. three\nfour");
        assert_eq!(edit.selection, Selection::caret(11));
    }

    #[test]
    fn test_prefix_empty_body() {
        let edit = prefix_lines("", Selection::caret(0), "# ");
        assert_eq!(edit.body, "");
        assert_eq!(edit.selection, Selection::caret(0));
    }

    #[test]
    fn test_indent() {
        let edit = indent("line", Selection::caret(0), "  ");
        assert_eq!(edit.body, "  line");
        assert_eq!(edit.selection, Selection::caret(2));
    }
}
