use crate::option::{AttributeVariant, OptionVariant, ValueMatch, ValueVariant};
use tb_html::{attribute_value, extract_attributes};
use tb_types::{Dialect, Error, Result};

/// Which end of a tag a token is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagSide {
    Open,
    Close,
}

/// Definition of a tag and all the ways to convert it.
///
/// Markers are tag names without delimiters, the close marker keeps its slash: `b` and `/b`,
/// `strong` and `/strong`. An empty close marker means the tag has no closing, like `[*]`.
///
/// Definitions are immutable once built and shared by every conversion.
#[derive(Clone, Debug)]
pub struct TagDefinition {
    open: String,
    close: String,
    variants: Vec<OptionVariant>,
}

impl TagDefinition {
    /// Build a tag definition.
    ///
    /// # Errors
    ///
    /// * Open marker is empty.
    /// * No variant.
    /// * Duplicate variants.
    /// * Variants are from different dialects.
    /// * A variant taking any value is mixed with ones taking a specific value.
    pub fn new(
        open: impl Into<String>,
        close: impl Into<String>,
        variants: Vec<OptionVariant>,
    ) -> Result<Self> {
        let open = open.into().trim().to_string();
        let close = close.into().trim().to_string();
        if open.is_empty() {
            return Err(Error::Configuration(String::from("open marker is empty")));
        }
        if variants.is_empty() {
            return Err(Error::Configuration(format!("tag {open:?} has no variant")));
        }
        for (idx, variant) in variants.iter().enumerate() {
            if variants[..idx].contains(variant) {
                return Err(Error::Configuration(format!(
                    "tag {open:?} declares the same variant twice"
                )));
            }
        }
        let source = variants[0].source();
        if variants.iter().any(|x| x.source() != source) {
            return Err(Error::Configuration(format!(
                "tag {open:?} mixes bbcode and html variants"
            )));
        }
        let values = variants.iter().filter_map(|x| match x {
            OptionVariant::Value(v) => Some(v.option()),
            OptionVariant::Attribute(_) => None,
        });
        let (mut any, mut exact) = (false, false);
        for value in values {
            match value {
                ValueMatch::Any => any = true,
                ValueMatch::Exact(_) => exact = true,
                ValueMatch::Absent => {}
            }
        }
        if any && exact {
            return Err(Error::Configuration(format!(
                "tag {open:?} has a variant taking any value that covers the specific ones"
            )));
        }
        if close.is_empty() && variants.iter().any(|x| !x.parse_content()) {
            return Err(Error::Configuration(format!(
                "tag {open:?} keeps content verbatim but has no close marker"
            )));
        }

        Ok(Self {
            open,
            close,
            variants,
        })
    }

    /// Build a bbcode tag definition.
    pub fn bbcode(
        open: impl Into<String>,
        close: impl Into<String>,
        variants: Vec<ValueVariant>,
    ) -> Result<Self> {
        Self::new(open, close, variants.into_iter().map(Into::into).collect())
    }

    /// Build an html tag definition.
    pub fn html(
        open: impl Into<String>,
        close: impl Into<String>,
        variants: Vec<AttributeVariant>,
    ) -> Result<Self> {
        Self::new(open, close, variants.into_iter().map(Into::into).collect())
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn variants(&self) -> &[OptionVariant] {
        &self.variants
    }

    /// Dialect of the tag.
    pub fn source(&self) -> Dialect {
        self.variants[0].source()
    }

    /// Tag ends itself, there is no closing tag.
    pub fn is_self_terminating(&self) -> bool {
        self.close.is_empty()
    }

    /// Any variant needs content kept as plain text.
    pub(crate) fn has_verbatim_variant(&self) -> bool {
        self.variants.iter().any(|x| !x.parse_content())
    }

    /// Some variant takes an explicit value.
    pub fn accepts_option(&self) -> bool {
        self.value_variants().any(|x| x.option().needs_option())
    }

    /// Every variant needs an explicit value.
    pub fn requires_option(&self) -> bool {
        let mut variants = self.value_variants().peekable();
        variants.peek().is_some() && variants.all(|x| x.option().needs_option())
    }

    fn value_variants(&self) -> impl Iterator<Item = &ValueVariant> {
        self.variants.iter().filter_map(|x| match x {
            OptionVariant::Value(v) => Some(v),
            OptionVariant::Attribute(_) => None,
        })
    }

    /// Check whether token `name` is the open or close side of this tag.
    ///
    /// `name` is the tag name as written, including the leading slash for closing tags.
    pub fn match_name(&self, name: &str) -> Option<TagSide> {
        if self.open.eq_ignore_ascii_case(name) {
            Some(TagSide::Open)
        } else if !self.close.is_empty() && self.close.eq_ignore_ascii_case(name) {
            Some(TagSide::Close)
        } else {
            None
        }
    }

    /// Find the variant handling explicit `value`, empty `value` means no value written.
    ///
    /// Order: the variant for no value, the variant taking any value, the variant taking exactly
    /// `value`.
    pub fn variant_for_explicit_value(&self, value: &str) -> Option<&OptionVariant> {
        if value.is_empty() {
            return self.find_value_variant(|x| matches!(x, ValueMatch::Absent));
        }
        self.find_value_variant(|x| matches!(x, ValueMatch::Any))
            .or_else(|| self.find_value_variant(|x| x.accepts(value)))
    }

    fn find_value_variant<F>(&self, pred: F) -> Option<&OptionVariant>
    where
        F: Fn(&ValueMatch) -> bool,
    {
        self.variants.iter().find(|x| match x {
            OptionVariant::Value(v) => pred(v.option()),
            OptionVariant::Attribute(_) => false,
        })
    }

    /// Find the variant that best fits the attributes in the raw tag `raw`, e.g.
    /// `<span style="color: red;">`.
    ///
    /// Without attributes only the variant declaring no selector fits. Otherwise a variant fits
    /// when it declares selectors and every one of them is present with a non-empty value, so a
    /// tag carrying attributes no rule reads stays text. The fitting variant with the lowest
    /// [`AttributeVariant::priority`] wins, the first declared one on a tie.
    pub fn variant_for_attributes(&self, raw: &str) -> Option<&OptionVariant> {
        let present = extract_attributes(raw);
        if present.is_empty() {
            return self.variants.iter().find(|x| match x {
                OptionVariant::Attribute(v) => v.priority() == 5,
                OptionVariant::Value(_) => false,
            });
        }

        let mut best: Option<(u8, &OptionVariant)> = None;
        for variant in &self.variants {
            let attr = match variant {
                OptionVariant::Attribute(v) if v.priority() < 5 => v,
                _ => continue,
            };
            let fits = attr.selectors().all(|selector| {
                present.iter().any(|key| selector.matches(key))
                    && attribute_value(raw, selector).is_some_and(|x| !x.is_empty())
            });
            if !fits {
                continue;
            }
            let priority = attr.priority();
            if priority == 0 {
                return Some(variant);
            }
            if best.map_or(true, |(p, _)| priority < p) {
                best = Some((priority, variant));
            }
        }
        best.map(|(_, v)| v)
    }
}

impl PartialEq for TagDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.open == other.open && self.close == other.close
    }
}

impl Eq for TagDefinition {}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_html::Selector;

    fn list_tag() -> TagDefinition {
        TagDefinition::bbcode(
            "list",
            "/list",
            vec![
                ValueVariant::new(ValueMatch::Exact(String::from("1")), "<ol>", "</ol>"),
                ValueVariant::new(ValueMatch::Absent, "<ul>", "</ul>"),
            ],
        )
        .unwrap()
    }

    fn span_tag() -> TagDefinition {
        TagDefinition::html(
            "span",
            "/span",
            vec![
                AttributeVariant::new("size", "/size")
                    .with_option(Selector::windowed("style", "font-size", "%;")),
                AttributeVariant::new("color", "/color")
                    .with_option(Selector::windowed("style", "color", ";")),
            ],
        )
        .unwrap()
    }

    fn open_of(variant: Option<&OptionVariant>) -> Option<&str> {
        match variant? {
            OptionVariant::Value(v) => Some(v.open()),
            OptionVariant::Attribute(v) => Some(v.open()),
        }
    }

    #[test]
    fn test_empty_open_marker() {
        let err = TagDefinition::bbcode(
            "  ",
            "/b",
            vec![ValueVariant::new(ValueMatch::Absent, "<b>", "</b>")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_no_variant() {
        let err = TagDefinition::bbcode("b", "/b", vec![]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_duplicate_variants() {
        let err = TagDefinition::bbcode(
            "b",
            "/b",
            vec![
                ValueVariant::new(ValueMatch::Absent, "<b>", "</b>"),
                ValueVariant::new(ValueMatch::Absent, "<strong>", "</strong>"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_mixed_dialects() {
        let err = TagDefinition::new(
            "b",
            "/b",
            vec![
                ValueVariant::new(ValueMatch::Absent, "<b>", "</b>").into(),
                AttributeVariant::new("b", "/b")
                    .with_content(Selector::whole("title"))
                    .into(),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_any_value_covers_specific() {
        let err = TagDefinition::bbcode(
            "list",
            "/list",
            vec![
                ValueVariant::new(ValueMatch::Any, "<ol>", "</ol>"),
                ValueVariant::new(ValueMatch::Exact(String::from("1")), "<ol>", "</ol>"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        // Any value plus no value is fine.
        TagDefinition::bbcode(
            "url",
            "/url",
            vec![
                ValueVariant::new(ValueMatch::Any, "<a href=\"{option}\">", "</a>"),
                ValueVariant::new(ValueMatch::Absent, "<a href=\"{content}\">", "</a>"),
            ],
        )
        .unwrap();
    }

    #[test]
    fn test_verbatim_needs_close_marker() {
        let err = TagDefinition::bbcode(
            "code",
            "",
            vec![ValueVariant::new(ValueMatch::Absent, "<pre>", "</pre>").verbatim()],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_markers_are_trimmed() {
        let tag = TagDefinition::bbcode(
            " b ",
            " /b",
            vec![ValueVariant::new(ValueMatch::Absent, "<b>", "</b>")],
        )
        .unwrap();
        assert_eq!(tag.open(), "b");
        assert_eq!(tag.close(), "/b");
        assert_eq!(tag.source(), Dialect::BBCode);
    }

    #[test]
    fn test_equality_on_markers() {
        let a = TagDefinition::bbcode(
            "b",
            "/b",
            vec![ValueVariant::new(ValueMatch::Absent, "<b>", "</b>")],
        )
        .unwrap();
        let b = TagDefinition::bbcode(
            "b",
            "/b",
            vec![ValueVariant::new(ValueMatch::Absent, "<strong>", "</strong>")],
        )
        .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, list_tag());
    }

    #[test]
    fn test_match_name() {
        let tag = list_tag();
        assert_eq!(tag.match_name("list"), Some(TagSide::Open));
        assert_eq!(tag.match_name("LIST"), Some(TagSide::Open));
        assert_eq!(tag.match_name("/list"), Some(TagSide::Close));
        assert_eq!(tag.match_name("lists"), None);
        assert_eq!(tag.match_name(""), None);
    }

    #[test]
    fn test_variant_for_explicit_value() {
        let tag = list_tag();
        assert_eq!(open_of(tag.variant_for_explicit_value("")), Some("<ul>"));
        assert_eq!(open_of(tag.variant_for_explicit_value("1")), Some("<ol>"));
        assert_eq!(open_of(tag.variant_for_explicit_value("2")), None);
        assert!(tag.accepts_option());
        assert!(!tag.requires_option());
    }

    #[test]
    fn test_variant_for_any_value() {
        let tag = TagDefinition::bbcode(
            "size",
            "/size",
            vec![ValueVariant::new(
                ValueMatch::Any,
                "<span style=\"font-size:{option}%;\">",
                "</span>",
            )],
        )
        .unwrap();
        assert!(tag.variant_for_explicit_value("").is_none());
        assert!(tag.variant_for_explicit_value("50").is_some());
        assert!(tag.requires_option());
    }

    #[test]
    fn test_variant_for_attributes_by_window() {
        let tag = span_tag();
        assert_eq!(
            open_of(tag.variant_for_attributes(r#"<span style="color: red;">"#)),
            Some("color")
        );
        assert_eq!(
            open_of(tag.variant_for_attributes(r#"<span style="font-size:50%;">"#)),
            Some("size")
        );
        assert_eq!(open_of(tag.variant_for_attributes("<span>")), None);
        assert_eq!(
            open_of(tag.variant_for_attributes(r#"<span class="x">"#)),
            None
        );
    }

    #[test]
    fn test_variant_for_attributes_priority() {
        let href = Selector::whole("href");
        let tag = TagDefinition::html(
            "a",
            "/a",
            vec![
                AttributeVariant::new("plain", "/plain"),
                AttributeVariant::new("email", "/email").with_content(href.clone()),
                AttributeVariant::new("url", "/url")
                    .with_content(href.clone())
                    .with_option(href),
            ],
        )
        .unwrap();
        assert_eq!(
            open_of(tag.variant_for_attributes(r#"<a href="http://x">"#)),
            Some("url")
        );
        // Empty attribute values do not count.
        assert_eq!(open_of(tag.variant_for_attributes(r#"<a href="">"#)), None);
        assert_eq!(open_of(tag.variant_for_attributes("<a>")), Some("plain"));
    }

    #[test]
    fn test_variant_for_attributes_ignores_plain_with_attributes() {
        let tag = TagDefinition::html(
            "strong",
            "/strong",
            vec![AttributeVariant::new("b", "/b")],
        )
        .unwrap();
        assert_eq!(open_of(tag.variant_for_attributes("<strong>")), Some("b"));
        assert_eq!(open_of(tag.variant_for_attributes("<strong >")), Some("b"));
        assert_eq!(
            open_of(tag.variant_for_attributes(r#"<strong class="x">"#)),
            None
        );
    }

    #[test]
    fn test_variant_for_attributes_first_declared_wins() {
        let tag = TagDefinition::html(
            "span",
            "/span",
            vec![
                AttributeVariant::new("color", "/color")
                    .with_option(Selector::windowed("style", "color", ";")),
                AttributeVariant::new("size", "/size")
                    .with_option(Selector::windowed("style", "font-size", "%;")),
            ],
        )
        .unwrap();
        let raw = r#"<span style="font-size: 50%; color: red;">"#;
        assert_eq!(open_of(tag.variant_for_attributes(raw)), Some("color"));
        // Same inputs, same answer.
        assert_eq!(open_of(tag.variant_for_attributes(raw)), Some("color"));
    }
}
