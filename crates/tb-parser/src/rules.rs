use crate::tag::{TagDefinition, TagSide};
use regex::Regex;
use std::sync::OnceLock;
use tb_types::{Dialect, Error, Result};
use tracing::debug;

/// Regex to check a bbcode marker looks like a tag name, `*` is allowed for list items.
static BBCODE_MARKER_RE: OnceLock<Regex> = OnceLock::new();

/// Regex to check an html marker looks like a tag name.
static HTML_MARKER_RE: OnceLock<Regex> = OnceLock::new();

fn marker_re(dialect: Dialect) -> &'static Regex {
    match dialect {
        Dialect::BBCode => BBCODE_MARKER_RE.get_or_init(|| {
            Regex::new(r"^/?[a-zA-Z*][a-zA-Z0-9]*$").expect("bbcode marker regex is valid")
        }),
        Dialect::Html => HTML_MARKER_RE.get_or_init(|| {
            Regex::new(r"^/?[a-zA-Z][a-zA-Z0-9]*$").expect("html marker regex is valid")
        }),
    }
}

/// Ordered and validated tag definitions of one source dialect.
///
/// Built once and shared read-only by all conversions.
#[derive(Clone, Debug)]
pub struct RuleSet {
    dialect: Dialect,

    tags: Vec<TagDefinition>,

    /// Pattern of the closing tag for each definition that keeps its content verbatim.
    ///
    /// Same order as `tags`.
    verbatim_ends: Vec<Option<Regex>>,
}

impl RuleSet {
    /// Build a rule set for `dialect` from `tags`, order of `tags` is kept.
    ///
    /// # Errors
    ///
    /// * No tag.
    /// * A tag is from another dialect.
    /// * Markers do not look like tag names of `dialect`.
    /// * Two tags share the same open marker or the same close marker.
    pub fn new(dialect: Dialect, tags: Vec<TagDefinition>) -> Result<Self> {
        if tags.is_empty() {
            return Err(Error::Configuration(format!(
                "rule set for {dialect:?} has no tag"
            )));
        }

        for (idx, tag) in tags.iter().enumerate() {
            if tag.source() != dialect {
                return Err(Error::Configuration(format!(
                    "tag {:?} is a {:?} tag in a {dialect:?} rule set",
                    tag.open(),
                    tag.source()
                )));
            }
            let re = marker_re(dialect);
            if tag.open().starts_with('/') || !re.is_match(tag.open()) {
                return Err(Error::Configuration(format!(
                    "open marker {:?} is not a {dialect:?} tag name",
                    tag.open()
                )));
            }
            if !tag.close().is_empty() && (!tag.close().starts_with('/') || !re.is_match(tag.close()))
            {
                return Err(Error::Configuration(format!(
                    "close marker {:?} is not a {dialect:?} closing tag name",
                    tag.close()
                )));
            }
            let previous = &tags[..idx];
            if previous
                .iter()
                .any(|x| x.open().eq_ignore_ascii_case(tag.open()))
            {
                return Err(Error::Configuration(format!(
                    "open marker {:?} is declared twice",
                    tag.open()
                )));
            }
            if !tag.close().is_empty()
                && previous
                    .iter()
                    .any(|x| x.close().eq_ignore_ascii_case(tag.close()))
            {
                return Err(Error::Configuration(format!(
                    "close marker {:?} is declared twice",
                    tag.close()
                )));
            }
        }

        let verbatim_ends = tags
            .iter()
            .map(|tag| {
                if !tag.has_verbatim_variant() {
                    return Ok(None);
                }
                let pattern = match dialect {
                    Dialect::BBCode => format!(r"(?i)\[{}\]", regex::escape(tag.close())),
                    Dialect::Html => format!(r"(?i)<{}\s*>", regex::escape(tag.close())),
                };
                Regex::new(&pattern)
                    .map(Some)
                    .map_err(|e| Error::Configuration(format!("closing pattern {pattern:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("built {dialect:?} rule set with {} tags", tags.len());
        Ok(Self {
            dialect,
            tags,
            verbatim_ends,
        })
    }

    /// Source dialect of all tags in the set.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn tags(&self) -> &[TagDefinition] {
        &self.tags
    }

    /// Find the tag with open marker `open`, case-insensitive.
    pub fn find(&self, open: &str) -> Option<&TagDefinition> {
        self.tags
            .iter()
            .find(|x| x.open().eq_ignore_ascii_case(open))
    }

    /// Find the tag a token name belongs to, and which side of the tag it is.
    ///
    /// `name` keeps the leading slash of closing tags.
    pub fn classify(&self, name: &str) -> Option<(usize, TagSide)> {
        self.tags
            .iter()
            .enumerate()
            .find_map(|(idx, tag)| tag.match_name(name).map(|side| (idx, side)))
    }

    /// Pattern ending the verbatim content of the tag at `index`.
    pub(crate) fn verbatim_end(&self, index: usize) -> Option<&Regex> {
        self.verbatim_ends.get(index).and_then(Option::as_ref)
    }
}
