use serde::{Deserialize, Serialize};
use tb_types::{Dialect, Error, Result};
use tracing::debug;

use crate::option::{AttributeVariant, ValueVariant};
use crate::rules::RuleSet;
use crate::tag::TagDefinition;
use crate::{ConvertOptions, Converter, Translator};

fn default_true() -> bool {
    true
}

/// A bbcode tag in a rule table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BBCodeRule {
    pub open: String,

    #[serde(default)]
    pub close: String,

    #[serde(rename = "variant")]
    pub variants: Vec<ValueVariant>,
}

/// An html tag in a rule table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HtmlRule {
    pub open: String,

    #[serde(default)]
    pub close: String,

    #[serde(rename = "variant")]
    pub variants: Vec<AttributeVariant>,
}

/// Tag tables for both directions, loaded from toml.
///
/// A missing section falls back to the built-in tags of that dialect.
///
/// ```toml
/// decode_output = true
///
/// [[bbcode]]
/// open = "b"
/// close = "/b"
/// [[bbcode.variant]]
/// open = "<strong>"
/// close = "</strong>"
///
/// [[html]]
/// open = "strong"
/// close = "/strong"
/// [[html.variant]]
/// open = "b"
/// close = "/b"
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleTable {
    /// Decode html entities in bbcode output.
    #[serde(default = "default_true")]
    pub decode_output: bool,

    #[serde(default)]
    pub bbcode: Option<Vec<BBCodeRule>>,

    #[serde(default)]
    pub html: Option<Vec<HtmlRule>>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            decode_output: true,
            bbcode: None,
            html: None,
        }
    }
}

impl RuleTable {
    /// Load a table from toml text.
    ///
    /// Only the format is checked here, tags are validated when building rule sets.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Configuration(format!("invalid rule table: {e}")))
    }

    /// Rule set parsing bbcode.
    pub fn bbcode_rules(&self) -> Result<RuleSet> {
        let rules = match &self.bbcode {
            Some(v) => v,
            None => return Ok(RuleSet::default_bbcode()),
        };
        let tags = rules
            .iter()
            .map(|x| TagDefinition::bbcode(x.open.as_str(), x.close.as_str(), x.variants.clone()))
            .collect::<Result<Vec<_>>>()?;
        debug!("loaded {} bbcode tags", tags.len());
        RuleSet::new(Dialect::BBCode, tags)
    }

    /// Rule set parsing html.
    pub fn html_rules(&self) -> Result<RuleSet> {
        let rules = match &self.html {
            Some(v) => v,
            None => return Ok(RuleSet::default_html()),
        };
        let tags = rules
            .iter()
            .map(|x| TagDefinition::html(x.open.as_str(), x.close.as_str(), x.variants.clone()))
            .collect::<Result<Vec<_>>>()?;
        debug!("loaded {} html tags", tags.len());
        RuleSet::new(Dialect::Html, tags)
    }

    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            decode_output: self.decode_output,
        }
    }

    /// Build converters for both directions.
    pub fn translator(&self) -> Result<Translator> {
        let options = self.options();
        Translator::new(
            Converter::new(self.bbcode_rules()?, options),
            Converter::new(self.html_rules()?, options),
        )
    }
}
