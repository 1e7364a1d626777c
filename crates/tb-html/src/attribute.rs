use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::trace;

/// Regex to match `name="value"` or `name='value'` pairs in a tag.
static ATTRIBUTE_RE: OnceLock<Regex> = OnceLock::new();

/// Regex to match the `name:` part of each declaration inside an attribute value.
static WINDOW_RE: OnceLock<Regex> = OnceLock::new();

fn attribute_re() -> &'static Regex {
    ATTRIBUTE_RE.get_or_init(|| {
        Regex::new(r#"(?<name>[A-Za-z_][\w:.-]*)\s*=\s*(?:"(?<dq>[^"]*)"|'(?<sq>[^']*)')"#)
            .expect("attribute regex is valid")
    })
}

fn window_re() -> &'static Regex {
    WINDOW_RE.get_or_init(|| Regex::new(r"(?<name>[\w-]+)\s*:").expect("window regex is valid"))
}

/// A part of an attribute value, ending at `terminator`.
///
/// For `style="font-size: 50%;"` the window named `font-size` with terminator `%;` holds `50`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Window {
    /// Declaration name inside the attribute value, without the `:`.
    pub name: String,

    /// Text that ends the value we are interested in.
    ///
    /// When the terminator is missing, the value runs to the end of the attribute.
    pub terminator: String,
}

/// Points at an html attribute, or a window inside it.
///
/// Two selectors are equal when they name the same attribute and window, terminators are not
/// compared.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Selector {
    /// Attribute name, e.g. `style`.
    pub attribute: String,

    /// Optional window in the attribute value.
    ///
    /// `None` means the whole attribute value.
    #[serde(default)]
    pub window: Option<Window>,
}

impl Selector {
    /// Select the whole value of `attribute`.
    pub fn whole(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into().trim().to_string(),
            window: None,
        }
    }

    /// Select the part of `attribute` after `name:` and before `terminator`.
    pub fn windowed(
        attribute: impl Into<String>,
        name: impl Into<String>,
        terminator: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into().trim().to_string(),
            window: Some(Window {
                name: name.into().trim().to_string(),
                terminator: terminator.into(),
            }),
        }
    }

    /// Selecting the whole attribute value, not a window.
    pub fn is_whole(&self) -> bool {
        self.window.is_none()
    }

    /// Check the selector points at `key`.
    pub fn matches(&self, key: &AttributeKey) -> bool {
        if !self.attribute.eq_ignore_ascii_case(&key.attribute) {
            return false;
        }
        match (&self.window, &key.window) {
            (None, None) => true,
            (Some(w), Some(k)) => w.name.eq_ignore_ascii_case(k),
            _ => false,
        }
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.attribute.eq_ignore_ascii_case(&other.attribute)
            && match (&self.window, &other.window) {
                (None, None) => true,
                (Some(a), Some(b)) => a.name.eq_ignore_ascii_case(&b.name),
                _ => false,
            }
    }
}

impl Eq for Selector {}

/// An attribute, or a window inside an attribute, found in a raw tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeKey {
    /// Attribute name.
    pub attribute: String,

    /// Declaration name found in the attribute value, if this key is a window.
    pub window: Option<String>,
}

/// Collect all attributes present in a raw tag, e.g. `<span style="color: red;">`.
///
/// Every attribute is reported as a whole, followed by one key for each `name:` declaration
/// found in its value.
pub fn extract_attributes(raw: &str) -> Vec<AttributeKey> {
    let mut keys = vec![];
    for capture in attribute_re().captures_iter(raw) {
        let name = &capture["name"];
        keys.push(AttributeKey {
            attribute: name.to_string(),
            window: None,
        });
        let value = capture
            .name("dq")
            .or_else(|| capture.name("sq"))
            .map(|x| x.as_str())
            .unwrap_or_default();
        for window in window_re().captures_iter(value) {
            keys.push(AttributeKey {
                attribute: name.to_string(),
                window: Some(window["name"].to_string()),
            });
        }
    }
    trace!("attributes in {raw:?}: {keys:?}");
    keys
}

/// Get the value `selector` points at in the raw tag.
///
/// Return `None` if the attribute or the window is not present. The returned value may be empty.
pub fn attribute_value(raw: &str, selector: &Selector) -> Option<String> {
    let value = attribute_re()
        .captures_iter(raw)
        .find(|x| x["name"].eq_ignore_ascii_case(&selector.attribute))
        .and_then(|x| x.name("dq").or_else(|| x.name("sq")))
        .map(|x| x.as_str())?;

    let window = match &selector.window {
        Some(v) => v,
        None => return Some(value.to_string()),
    };

    let start = window_re()
        .captures_iter(value)
        .find(|x| x["name"].eq_ignore_ascii_case(&window.name))?
        .get(0)?
        .end();
    let rest = value[start..].trim_start();
    let part = match rest.find(window.terminator.as_str()) {
        Some(end) if !window.terminator.is_empty() => &rest[..end],
        _ => rest,
    };
    Some(part.trim().to_string())
}
