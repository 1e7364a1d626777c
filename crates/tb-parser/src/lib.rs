//! Convert text between bbcode and html with declarative tag tables.
//!
//! ```
//! let html = tb_parser::bbcode_to_html("[b]hi[/b]").unwrap();
//! assert_eq!(html, "<strong>hi</strong>");
//! ```

mod defaults;
mod lexer;
mod node;
mod option;
mod parser;
mod rules;
mod serializer;
mod table;
mod tag;
pub(crate) mod token;

pub use defaults::{bbcode_definitions, html_definitions};
pub use node::{Element, Node, Text};
pub use option::{AttributeVariant, OptionVariant, ValueMatch, ValueVariant};
pub use parser::Parser;
pub use rules::RuleSet;
pub use serializer::{serialize, wrap_paragraphs, SerializeOptions};
pub use table::{BBCodeRule, HtmlRule, RuleTable};
pub use tag::{TagDefinition, TagSide};

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tb_types::{Dialect, Error, Result};

/// Options of each conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Decode html entities in bbcode output.
    ///
    /// Turn it off when the bbcode is shown by something that escapes text itself.
    pub decode_output: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            decode_output: true,
        }
    }
}

/// Convert text from the source dialect of a rule set into the opposite one.
#[derive(Clone, Debug)]
pub struct Converter {
    rules: RuleSet,

    options: ConvertOptions,
}

impl Converter {
    pub fn new(rules: RuleSet, options: ConvertOptions) -> Self {
        Self { rules, options }
    }

    /// Build a converter from tag definitions, order of `tags` is kept.
    pub fn from_definitions(
        dialect: Dialect,
        tags: Vec<TagDefinition>,
        options: ConvertOptions,
    ) -> Result<Self> {
        Ok(Self::new(RuleSet::new(dialect, tags)?, options))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn options(&self) -> ConvertOptions {
        self.options
    }

    /// Source dialect.
    pub fn dialect(&self) -> Dialect {
        self.rules.dialect()
    }

    /// Parse `text` into a syntax tree without converting it.
    pub fn parse(&self, text: &str) -> Result<Node<'_>> {
        Parser::new(&self.rules).parse(text)
    }

    /// Convert `text` into the opposite dialect.
    ///
    /// Empty input gives empty output.
    #[tracing::instrument(skip_all, fields(from = ?self.dialect(), len = text.len()))]
    pub fn convert(&self, text: &str) -> Result<String> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let tree = self.parse(text)?;
        let target = self.dialect().opposite();
        let options = SerializeOptions {
            target,
            decode_output: self.options.decode_output,
        };
        let output = serialize(&tree, &options)?;
        Ok(match target {
            Dialect::Html => wrap_paragraphs(&output),
            Dialect::BBCode => output,
        })
    }
}

/// Converters for both directions.
#[derive(Clone, Debug)]
pub struct Translator {
    bbcode: Converter,

    html: Converter,
}

impl Translator {
    /// `bbcode` parses bbcode and `html` parses html.
    pub fn new(bbcode: Converter, html: Converter) -> Result<Self> {
        if bbcode.dialect() != Dialect::BBCode || html.dialect() != Dialect::Html {
            return Err(Error::Configuration(format!(
                "translator needs a bbcode and an html converter, got {:?} and {:?}",
                bbcode.dialect(),
                html.dialect()
            )));
        }
        Ok(Self { bbcode, html })
    }

    pub fn bbcode_to_html(&self, text: &str) -> Result<String> {
        self.bbcode.convert(text)
    }

    pub fn html_to_bbcode(&self, text: &str) -> Result<String> {
        self.html.convert(text)
    }

    /// Converter parsing `dialect`.
    pub fn converter(&self, dialect: Dialect) -> &Converter {
        match dialect {
            Dialect::BBCode => &self.bbcode,
            Dialect::Html => &self.html,
        }
    }
}

impl Default for Translator {
    /// Built-in tags in both directions.
    fn default() -> Self {
        Self {
            bbcode: Converter::new(RuleSet::default_bbcode(), ConvertOptions::default()),
            html: Converter::new(RuleSet::default_html(), ConvertOptions::default()),
        }
    }
}

static DEFAULT_TRANSLATOR: OnceLock<Translator> = OnceLock::new();

fn default_translator() -> &'static Translator {
    DEFAULT_TRANSLATOR.get_or_init(Translator::default)
}

/// Convert bbcode to html with the built-in tags.
pub fn bbcode_to_html(text: &str) -> Result<String> {
    default_translator().bbcode_to_html(text)
}

/// Convert html to bbcode with the built-in tags.
pub fn html_to_bbcode(text: &str) -> Result<String> {
    default_translator().html_to_bbcode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translator_checks_dialects() {
        let bbcode = Converter::new(RuleSet::default_bbcode(), ConvertOptions::default());
        let html = Converter::new(RuleSet::default_html(), ConvertOptions::default());
        assert!(Translator::new(html.clone(), bbcode.clone()).is_err());
        assert!(Translator::new(bbcode, html).is_ok());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(bbcode_to_html("").unwrap(), "");
        assert_eq!(html_to_bbcode("").unwrap(), "");
    }

    #[test]
    fn test_decode_output_option() {
        let html = Converter::new(
            RuleSet::default_html(),
            ConvertOptions {
                decode_output: false,
            },
        );
        assert_eq!(html.convert("<strong>a &amp; b</strong>").unwrap(), "[b]a &amp; b[/b]");
        assert_eq!(html_to_bbcode("<strong>a &amp; b</strong>").unwrap(), "[b]a & b[/b]");
    }
}
