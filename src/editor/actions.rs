//! Toolbar actions and keyboard routing for the markdown editor.
//!
//! Every toolbar button maps to exactly one [`Operation`] on the text
//! primitives. Keyboard shortcuts resolve to a [`KeyCommand`] that reuses the
//! same bindings, so Ctrl/Cmd+B and the bold button can never drift apart.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Two spaces, inserted by the Tab key.
pub const INDENT_UNIT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatAction {
    Bold,
    Italic,
    InlineCode,
    Heading1,
    Heading2,
    Heading3,
    UnorderedList,
    OrderedList,
    Quote,
    Link,
    Image,
}

/// What a toolbar action does to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Wrap {
        before: &'static str,
        after: &'static str,
        placeholder: &'static str,
    },
    PrefixLines(&'static str),
}

impl FormatAction {
    pub const ALL: [FormatAction; 11] = [
        FormatAction::Bold,
        FormatAction::Italic,
        FormatAction::InlineCode,
        FormatAction::Heading1,
        FormatAction::Heading2,
        FormatAction::Heading3,
        FormatAction::UnorderedList,
        FormatAction::OrderedList,
        FormatAction::Quote,
        FormatAction::Link,
        FormatAction::Image,
    ];

    pub fn operation(&self) -> Operation {
        match self {
            FormatAction::Bold => Operation::Wrap { before: "**", after: "**", placeholder: "bold text" },
            FormatAction::Italic => Operation::Wrap { before: "*", after: "*", placeholder: "italic text" },
            FormatAction::InlineCode => Operation::Wrap { before: "`", after: "`", placeholder: "code" },
            FormatAction::Heading1 => Operation::PrefixLines("# "),
            FormatAction::Heading2 => Operation::PrefixLines("## "),
            FormatAction::Heading3 => Operation::PrefixLines("### "),
            FormatAction::UnorderedList => Operation::PrefixLines("- "),
            FormatAction::OrderedList => Operation::PrefixLines("1. "),
            FormatAction::Quote => Operation::PrefixLines("> "),
            // The selected text, when there is one, always wins over the placeholder
            FormatAction::Link => Operation::Wrap {
                before: "[",
                after: "](https://example.com)",
                placeholder: "link text",
            },
            FormatAction::Image => Operation::Wrap {
                before: "![",
                after: "](https://example.com/image.jpg)",
                placeholder: "image description",
            },
        }
    }

    /// Toolbar identifier, as used by the buttons and the CLI.
    pub fn id(&self) -> &'static str {
        match self {
            FormatAction::Bold => "bold",
            FormatAction::Italic => "italic",
            FormatAction::InlineCode => "code",
            FormatAction::Heading1 => "h1",
            FormatAction::Heading2 => "h2",
            FormatAction::Heading3 => "h3",
            FormatAction::UnorderedList => "ul",
            FormatAction::OrderedList => "ol",
            FormatAction::Quote => "quote",
            FormatAction::Link => "link",
            FormatAction::Image => "image",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormatAction::Bold => "Bold (Ctrl+B)",
            FormatAction::Italic => "Italic (Ctrl+I)",
            FormatAction::InlineCode => "Inline Code",
            FormatAction::Heading1 => "Heading 1",
            FormatAction::Heading2 => "Heading 2",
            FormatAction::Heading3 => "Heading 3",
            FormatAction::UnorderedList => "Unordered List",
            FormatAction::OrderedList => "Ordered List",
            FormatAction::Quote => "Quote",
            FormatAction::Link => "Insert Link",
            FormatAction::Image => "Insert Image",
        }
    }
}

impl Display for FormatAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for FormatAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatAction::ALL
            .iter()
            .find(|action| action.id() == s)
            .copied()
            .ok_or_else(|| format!("Unknown format action: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Character(char),
    Tab,
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { ctrl: false, alt: false, shift: false, meta: false };
    pub const CTRL: Self = Self { ctrl: true, alt: false, shift: false, meta: false };
    pub const META: Self = Self { ctrl: false, alt: false, shift: false, meta: true };

    /// Ctrl on most platforms, Cmd on macOS. Either one is accepted.
    pub fn has_primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self { key, modifiers: Modifiers::NONE }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(c: char) -> Self {
        Self::with_modifiers(Key::Character(c), Modifiers::CTRL)
    }

    pub fn meta(c: char) -> Self {
        Self::with_modifiers(Key::Character(c), Modifiers::META)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Format(FormatAction),
    Save,
    Indent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// Event was handled, the host should prevent the default behaviour.
    Handled,
    /// Not a binding, let the text surface deal with it.
    NotHandled,
}

pub fn route_key(combo: &KeyCombo) -> Option<KeyCommand> {
    if combo.modifiers.has_primary() {
        if let Key::Character(c) = combo.key {
            match c {
                'b' => return Some(KeyCommand::Format(FormatAction::Bold)),
                'i' => return Some(KeyCommand::Format(FormatAction::Italic)),
                's' => return Some(KeyCommand::Save),
                _ => {}
            }
        }
    }

    // Tab indents instead of moving focus out of the editor
    if combo.key == Key::Tab {
        return Some(KeyCommand::Indent);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for action in FormatAction::ALL {
            assert_eq!(action.id().parse::<FormatAction>(), Ok(action));
        }
        assert!("strike".parse::<FormatAction>().is_err());
    }

    #[test]
    fn test_line_prefix_bindings() {
        assert_eq!(FormatAction::Heading2.operation(), Operation::PrefixLines("## "));
        assert_eq!(FormatAction::OrderedList.operation(), Operation::PrefixLines("1. "));
        assert_eq!(FormatAction::Quote.operation(), Operation::PrefixLines("> "));
    }

    #[test]
    fn test_route_shortcuts() {
        assert_eq!(route_key(&KeyCombo::ctrl('b')), Some(KeyCommand::Format(FormatAction::Bold)));
        assert_eq!(route_key(&KeyCombo::meta('i')), Some(KeyCommand::Format(FormatAction::Italic)));
        assert_eq!(route_key(&KeyCombo::ctrl('s')), Some(KeyCommand::Save));
        assert_eq!(route_key(&KeyCombo::new(Key::Tab)), Some(KeyCommand::Indent));
    }

    #[test]
    fn test_route_ignores_plain_keys() {
        assert_eq!(route_key(&KeyCombo::new(Key::Character('b'))), None);
        assert_eq!(route_key(&KeyCombo::ctrl('x')), None);
        assert_eq!(route_key(&KeyCombo::new(Key::Enter)), None);
    }
}
