use serde::{Deserialize, Serialize};
use tb_html::Selector;
use tb_types::Dialect;

/// Which explicit values a [`ValueVariant`] handles.
///
/// In bbcode the explicit value is the part after `=` in `[size=50]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMatch {
    /// Tag written without a value: `[list]`.
    #[default]
    Absent,

    /// Any non-empty value: `[size=$ANY]`.
    Any,

    /// One specific value: `[list=1]`.
    Exact(String),
}

impl ValueMatch {
    /// Check `value` is handled, empty `value` means no value written.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ValueMatch::Absent => value.is_empty(),
            ValueMatch::Any => !value.is_empty(),
            ValueMatch::Exact(v) => !value.is_empty() && v == value,
        }
    }

    /// Tag occurrences need a value to use this rule.
    pub fn needs_option(&self) -> bool {
        !matches!(self, ValueMatch::Absent)
    }
}

fn default_true() -> bool {
    true
}

/// Converting rule of a bbcode tag, chosen by the explicit value of the tag.
///
/// Templates are html. `{option}` in the open template is replaced by the explicit value and
/// `{content}` by the converted content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueVariant {
    /// Values this rule handles.
    #[serde(default)]
    option: ValueMatch,

    /// Html written before the content.
    open: String,

    /// Html written after the content.
    #[serde(default)]
    close: String,

    /// Parse tags in the content or keep it as it is.
    #[serde(default = "default_true")]
    parse_content: bool,

    /// Html produced does not break the surrounding paragraph.
    #[serde(default)]
    standalone: bool,

    /// Html that replaces line breaks in the content.
    ///
    /// Empty means keep `\n`.
    #[serde(default)]
    newline: String,
}

impl ValueVariant {
    pub fn new(option: ValueMatch, open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            option,
            open: open.into(),
            close: close.into(),
            parse_content: true,
            standalone: false,
            newline: String::new(),
        }
    }

    /// Replace line breaks in content with `newline`.
    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    /// Keep content as plain text, only the closing tag ends it.
    pub fn verbatim(mut self) -> Self {
        self.parse_content = false;
        self
    }

    /// Do not wrap the produced html in paragraph breaks.
    pub fn standalone(mut self) -> Self {
        self.standalone = true;
        self
    }

    pub fn option(&self) -> &ValueMatch {
        &self.option
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn parse_content(&self) -> bool {
        self.parse_content
    }

    pub fn is_standalone(&self) -> bool {
        self.standalone
    }

    pub fn newline(&self) -> &str {
        if self.newline.is_empty() {
            "\n"
        } else {
            &self.newline
        }
    }
}

impl PartialEq for ValueVariant {
    fn eq(&self, other: &Self) -> bool {
        self.option == other.option
    }
}

impl Eq for ValueVariant {}

/// Converting rule of an html tag, chosen by the attributes present on the tag.
///
/// Produces the bbcode tag `[open=$OPTION]$CONTENT[close]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeVariant {
    /// Bbcode open tag name, without `[]`.
    open: String,

    /// Bbcode close tag name, without `[]`. Empty if the bbcode tag has no closing.
    #[serde(default)]
    close: String,

    /// Attribute holding the content, used when the html tag has no content itself.
    #[serde(default)]
    content: Option<Selector>,

    /// Attribute holding the bbcode option.
    #[serde(default)]
    option: Option<Selector>,

    /// Html that stands for a line break in the content.
    #[serde(default)]
    newline: Option<String>,
}

impl AttributeVariant {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into().trim().to_string(),
            close: close.into().trim().to_string(),
            content: None,
            option: None,
            newline: None,
        }
    }

    pub fn with_content(mut self, selector: Selector) -> Self {
        self.content = Some(selector);
        self
    }

    pub fn with_option(mut self, selector: Selector) -> Self {
        self.option = Some(selector);
        self
    }

    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = Some(newline.into());
        self
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn content(&self) -> Option<&Selector> {
        self.content.as_ref()
    }

    pub fn option(&self) -> Option<&Selector> {
        self.option.as_ref()
    }

    pub fn newline(&self) -> Option<&str> {
        self.newline.as_deref().filter(|x| !x.is_empty())
    }

    /// All declared selectors.
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.content.iter().chain(self.option.iter())
    }

    /// Rank when several rules fit the same tag, lower wins.
    ///
    /// 0. Both selectors, both whole attributes.
    /// 1. Both selectors, one whole attribute.
    /// 2. Both selectors, both windows.
    /// 3. One selector, whole attribute.
    /// 4. One selector, window.
    /// 5. No selector.
    pub fn priority(&self) -> u8 {
        match (&self.content, &self.option) {
            (Some(c), Some(o)) => match (c.is_whole(), o.is_whole()) {
                (true, true) => 0,
                (true, false) | (false, true) => 1,
                (false, false) => 2,
            },
            (Some(v), None) | (None, Some(v)) => {
                if v.is_whole() {
                    3
                } else {
                    4
                }
            }
            (None, None) => 5,
        }
    }
}

impl PartialEq for AttributeVariant {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content && self.option == other.option
    }
}

impl Eq for AttributeVariant {}

/// One way to convert a tag into the opposite dialect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionVariant {
    /// Bbcode tag rule, chosen by explicit value.
    Value(ValueVariant),

    /// Html tag rule, chosen by attributes.
    Attribute(AttributeVariant),
}

impl OptionVariant {
    /// Dialect of the tags this rule converts from.
    pub fn source(&self) -> Dialect {
        match self {
            OptionVariant::Value(_) => Dialect::BBCode,
            OptionVariant::Attribute(_) => Dialect::Html,
        }
    }

    /// Html content is always parsed.
    pub fn parse_content(&self) -> bool {
        match self {
            OptionVariant::Value(v) => v.parse_content(),
            OptionVariant::Attribute(_) => true,
        }
    }

    pub fn newline(&self) -> Option<&str> {
        match self {
            OptionVariant::Value(v) => Some(v.newline()),
            OptionVariant::Attribute(v) => v.newline(),
        }
    }
}

impl From<ValueVariant> for OptionVariant {
    fn from(value: ValueVariant) -> Self {
        OptionVariant::Value(value)
    }
}

impl From<AttributeVariant> for OptionVariant {
    fn from(value: AttributeVariant) -> Self {
        OptionVariant::Attribute(value)
    }
}
