//! Token classes, style entries and themes.
//!
//! A [`Theme`] maps [`TokenClass`]es to [`StyleEntry`]s. Lookups fall back along each class's
//! parent chain and then inherit unset colours and attributes from [`TokenClass::Text`] and
//! [`TokenClass::Background`], so a theme only needs to spell out what differs.
use std::collections::HashMap;
use std::str::FromStr;

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ThemeError {
    #[error("invalid colour {0:?}, expected #rgb or #rrggbb")]
    InvalidColour(String),

    #[error("unknown style attribute {0:?}")]
    UnknownAttribute(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb`.
    pub fn parse_hex(s: &str) -> Result<Self, ThemeError> {
        let invalid = || ThemeError::InvalidColour(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| invalid());
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        match hex.len() {
            3 => Ok(Self::new(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
            6 => Ok(Self::new(pair(0)?, pair(2)?, pair(4)?)),
            _ => Err(invalid()),
        }
    }
}

/// A boolean attribute that may defer to the enclosing style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Trilean {
    #[default]
    Pass,
    Yes,
    No,
}

impl Trilean {
    pub fn is_on(self) -> bool {
        self == Trilean::Yes
    }

    /// Resolves `Pass` to `inherited`.
    pub fn or(self, inherited: Trilean) -> Trilean {
        match self {
            Trilean::Pass => inherited,
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleEntry {
    pub colour: Option<Rgb>,
    pub background: Option<Rgb>,
    pub bold: Trilean,
    pub italic: Trilean,
    pub underline: Trilean,
}

impl StyleEntry {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Fills every unset field of `self` from `parent`.
    pub fn inherit(self, parent: &StyleEntry) -> Self {
        Self {
            colour: self.colour.or(parent.colour),
            background: self.background.or(parent.background),
            bold: self.bold.or(parent.bold),
            italic: self.italic.or(parent.italic),
            underline: self.underline.or(parent.underline),
        }
    }

    pub fn to_style(&self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.colour {
            style = style.fg(Color::Rgb(c.r, c.g, c.b));
        }
        if let Some(c) = self.background {
            style = style.bg(Color::Rgb(c.r, c.g, c.b));
        }
        for (flag, modifier) in [
            (self.bold, Modifier::BOLD),
            (self.italic, Modifier::ITALIC),
            (self.underline, Modifier::UNDERLINED),
        ] {
            match flag {
                Trilean::Yes => style = style.add_modifier(modifier),
                Trilean::No => style = style.remove_modifier(modifier),
                Trilean::Pass => {}
            }
        }
        style
    }
}

/// Parses chroma-style entries such as `"#d787af bold bg:#121212"`.
impl FromStr for StyleEntry {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entry = StyleEntry::default();
        for word in s.split_whitespace() {
            match word {
                "bold" => entry.bold = Trilean::Yes,
                "nobold" => entry.bold = Trilean::No,
                "italic" => entry.italic = Trilean::Yes,
                "noitalic" => entry.italic = Trilean::No,
                "underline" => entry.underline = Trilean::Yes,
                "nounderline" => entry.underline = Trilean::No,
                _ => {
                    if let Some(bg) = word.strip_prefix("bg:") {
                        entry.background = Some(Rgb::parse_hex(bg)?);
                    } else if word.starts_with('#') {
                        entry.colour = Some(Rgb::parse_hex(word)?);
                    } else {
                        return Err(ThemeError::UnknownAttribute(word.to_string()));
                    }
                }
            }
        }
        Ok(entry)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Background,
    Text,
    Error,
    Comment,
    Keyword,
    Operator,
    Punctuation,
    Name,
    NameAttribute,
    NameBuiltin,
    NameClass,
    NameConstant,
    NameDecorator,
    NameException,
    NameFunction,
    NameOther,
    NameTag,
    NameVariable,
    Literal,
    LiteralDate,
    LiteralNumber,
    LiteralString,
    LiteralStringEscape,
    LiteralStringHeredoc,
    Generic,
    GenericDeleted,
    GenericEmph,
    GenericHeading,
    GenericInserted,
    GenericStrong,
    GenericSubheading,
    GenericUnderline,
    TableHeader,
    TableRow,
    TableRowAlt,
}

impl TokenClass {
    /// The class consulted when a theme has no entry for `self`.
    pub fn parent(self) -> Option<TokenClass> {
        use TokenClass::*;
        match self {
            NameAttribute | NameBuiltin | NameClass | NameConstant | NameDecorator
            | NameException | NameFunction | NameOther | NameTag | NameVariable => Some(Name),
            LiteralStringEscape | LiteralStringHeredoc => Some(LiteralString),
            LiteralDate | LiteralNumber | LiteralString => Some(Literal),
            GenericDeleted | GenericEmph | GenericHeading | GenericInserted | GenericStrong
            | GenericSubheading | GenericUnderline => Some(Generic),
            TableRowAlt => Some(TableRow),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    name: String,
    entries: HashMap<TokenClass, StyleEntry>,
}

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    pub fn from_entries(
        name: impl Into<String>,
        entries: &[(TokenClass, &str)],
    ) -> Result<Self, ThemeError> {
        let mut theme = Self::new(name);
        for (class, spec) in entries {
            theme.set(*class, spec.parse()?);
        }
        Ok(theme)
    }

    /// The palette used by `mdcat` and `mdreader`.
    pub fn pulumi() -> Self {
        use TokenClass::*;

        let mut theme = Self::new("pulumi");
        let entries = [
            (Text, fg(0xd7, 0xd7, 0xd7)),
            (Error, fg(0xd7, 0x5f, 0x5f)),
            (Comment, fg(0xaf, 0xaf, 0xaf)),
            (Keyword, fg(0xaf, 0x87, 0xaf)),
            (Operator, fg(0x5f, 0xaf, 0xd7)),
            (Punctuation, fg(0xd7, 0xaf, 0xff)),
            (Name, fg(0xd7, 0xd7, 0xd7)),
            (NameAttribute, fg(0xd7, 0xd7, 0xd7)),
            (NameClass, fg(0xd7, 0xd7, 0xd7)),
            (NameConstant, fg(0xd7, 0xd7, 0xd7)),
            (NameDecorator, fg(0xd7, 0xd7, 0xd7)),
            (NameException, fg(0xd7, 0xd7, 0xd7)),
            (NameFunction, fg(0xd7, 0xd7, 0xd7)),
            (NameOther, fg(0xd7, 0xd7, 0xd7)),
            (NameTag, fg(0xd7, 0xd7, 0xd7)),
            (LiteralNumber, fg(0x87, 0xff, 0xaf)),
            (Literal, fg(0x00, 0xd7, 0xaf)),
            (LiteralDate, fg(0x00, 0xd7, 0xaf)),
            (LiteralString, fg(0xff, 0xaf, 0x5f)),
            (LiteralStringEscape, fg(0x5f, 0x5f, 0x87)),
            (GenericDeleted, fg(0xd7, 0x5f, 0x5f)),
            (GenericEmph, attr(|e| e.italic = Trilean::Yes)),
            (
                GenericHeading,
                StyleEntry {
                    bold: Trilean::Yes,
                    ..fg(0xd7, 0x87, 0xaf)
                },
            ),
            (GenericInserted, fg(0x5f, 0x87, 0x5f)),
            (GenericStrong, attr(|e| e.bold = Trilean::Yes)),
            (GenericSubheading, fg(0xd7, 0x87, 0xaf)),
            (GenericUnderline, attr(|e| e.underline = Trilean::Yes)),
            (Background, bg(0x12, 0x12, 0x12)),
            (
                TableHeader,
                StyleEntry {
                    bold: Trilean::Yes,
                    ..bg(0x30, 0x30, 0x30)
                },
            ),
            (TableRow, bg(0x1c, 0x1c, 0x1c)),
            (TableRowAlt, bg(0x26, 0x26, 0x26)),
            (NameBuiltin, fg(0x5f, 0xaf, 0xd7)),
        ];
        for (class, entry) in entries {
            theme.set(class, entry);
        }
        theme
    }

    /// Looks up a built-in theme by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "pulumi" => Some(Self::pulumi()),
            _ => None,
        }
    }

    pub fn parse_entry(spec: &str) -> Result<StyleEntry, ThemeError> {
        spec.parse()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&mut self, class: TokenClass, entry: StyleEntry) {
        self.entries.insert(class, entry);
    }

    /// Resolves the effective style of `class`.
    pub fn get(&self, class: TokenClass) -> StyleEntry {
        let mut entry = StyleEntry::default();
        let mut cursor = Some(class);
        while let Some(c) = cursor {
            if let Some(found) = self.entries.get(&c) {
                entry = entry.inherit(found);
            }
            cursor = c.parent();
        }
        if class != TokenClass::Text
            && class != TokenClass::Background
            && let Some(text) = self.entries.get(&TokenClass::Text)
        {
            entry = entry.inherit(text);
        }
        if class != TokenClass::Background
            && let Some(background) = self.entries.get(&TokenClass::Background)
        {
            entry = entry.inherit(background);
        }
        entry
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::pulumi()
    }
}

fn fg(r: u8, g: u8, b: u8) -> StyleEntry {
    StyleEntry {
        colour: Some(Rgb::new(r, g, b)),
        ..StyleEntry::default()
    }
}

fn bg(r: u8, g: u8, b: u8) -> StyleEntry {
    StyleEntry {
        background: Some(Rgb::new(r, g, b)),
        ..StyleEntry::default()
    }
}

fn attr(f: impl FnOnce(&mut StyleEntry)) -> StyleEntry {
    let mut entry = StyleEntry::default();
    f(&mut entry);
    entry
}
