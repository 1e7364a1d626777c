use tb_html::{reencode, unescape};
use tb_types::{
    Dialect, Error, Result, CLOSE_PARAGRAPH, CONTENT_PLACEHOLDER, OPEN_PARAGRAPH, OPTION_PLACEHOLDER,
};
use tracing::debug;

use crate::node::{Element, Node, Text};
use crate::option::{AttributeVariant, OptionVariant, ValueVariant};

/// Options when writing a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Dialect to write.
    pub target: Dialect,

    /// Decode html entities in bbcode output.
    pub decode_output: bool,
}

impl SerializeOptions {
    pub fn new(target: Dialect) -> Self {
        Self {
            target,
            decode_output: true,
        }
    }
}

/// Write the tree under `node` in the target dialect.
///
/// # Errors
///
/// * An element has no rule fitting its option.
/// * An element needs an option and has none.
/// * An element was parsed from the target dialect itself.
pub fn serialize(node: &Node<'_>, options: &SerializeOptions) -> Result<String> {
    let mut out = String::new();
    write_node(node, options, false, &mut out)?;
    Ok(out)
}

/// Wrap html in a paragraph and drop the empty paragraphs left over.
///
/// An empty paragraph next to another paragraph stands for a line break and is kept, those only
/// touching block elements or the ends are dropped. Html that ends up as exactly one paragraph is
/// returned without it: `[b]hi[/b]` gives `<strong>hi</strong>`.
pub fn wrap_paragraphs(html: &str) -> String {
    let wrapped = format!("{OPEN_PARAGRAPH}{html}{CLOSE_PARAGRAPH}");
    let empty = format!("{OPEN_PARAGRAPH}{CLOSE_PARAGRAPH}");

    let mut out = String::with_capacity(wrapped.len());
    let mut rest = wrapped.as_str();
    while let Some(idx) = rest.find(&empty) {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + empty.len()..];
        if out.ends_with(CLOSE_PARAGRAPH) || rest.starts_with(OPEN_PARAGRAPH) {
            out.push_str(&empty);
        }
    }
    out.push_str(rest);

    match out
        .strip_prefix(OPEN_PARAGRAPH)
        .and_then(|x| x.strip_suffix(CLOSE_PARAGRAPH))
    {
        Some(inner) if !inner.contains(OPEN_PARAGRAPH) && !inner.contains(CLOSE_PARAGRAPH) => {
            inner.to_string()
        }
        _ => out,
    }
}

/// `top_level` is true for direct children of the root.
fn write_node(
    node: &Node<'_>,
    options: &SerializeOptions,
    top_level: bool,
    out: &mut String,
) -> Result<()> {
    match node {
        Node::Root { children } => {
            for child in children {
                write_node(child, options, true, out)?;
            }
        }
        Node::Element(element) => write_element(element, options, top_level, out)?,
        Node::Text(text) => write_text(text, options, out),
    }
    Ok(())
}

fn write_children(element: &Element<'_>, options: &SerializeOptions) -> Result<String> {
    let mut out = String::new();
    for child in element.children() {
        write_node(child, options, false, &mut out)?;
    }
    Ok(out)
}

fn write_element(
    element: &Element<'_>,
    options: &SerializeOptions,
    top_level: bool,
    out: &mut String,
) -> Result<()> {
    let open = element.tag().open();
    match (element.variant(), options.target) {
        (Some(OptionVariant::Value(v)), Dialect::Html) => {
            write_html(element, v, options, top_level, out)
        }
        (Some(OptionVariant::Attribute(v)), Dialect::BBCode) => {
            write_bbcode(element, v, options, out)
        }
        (Some(v), target) => Err(Error::Serialization(
            open.to_string(),
            format!("{:?} tag can not be written as {target:?}", v.source()),
        )),
        (None, _) => Err(missing_variant(element)),
    }
}

/// Explain why no rule was resolved for the element.
fn missing_variant(element: &Element<'_>) -> Error {
    let tag = element.tag();
    let option = element.option().unwrap_or_default();
    let message = if !option.is_empty() && !tag.accepts_option() {
        format!("tag has no option, but {option:?} is given")
    } else if option.is_empty() && tag.requires_option() {
        String::from("tag needs an option and it is missing")
    } else if option.is_empty() {
        String::from("no rule for the tag without option")
    } else {
        format!("no rule for option {option:?}")
    };
    debug!("failed to write tag {:?}: {message}", tag.open());
    Error::Serialization(tag.open().to_string(), message)
}

/// Fill placeholders in `template`.
///
/// The template is split on the content placeholder first so text in content and option is never
/// taken as a placeholder.
fn fill(template: &str, content: &str, option: &str) -> String {
    template
        .split(CONTENT_PLACEHOLDER)
        .map(|x| x.replace(OPTION_PLACEHOLDER, option))
        .collect::<Vec<_>>()
        .join(content)
}

fn write_html(
    element: &Element<'_>,
    variant: &ValueVariant,
    options: &SerializeOptions,
    top_level: bool,
    out: &mut String,
) -> Result<()> {
    let content = write_children(element, options)?;
    let option = element.option().map(reencode).unwrap_or_default();
    // Content used in the open tag is not repeated when nothing closes the tag, like `<img />`.
    let consumed = variant.open().contains(CONTENT_PLACEHOLDER) && variant.close().is_empty();
    let wrap = top_level && !variant.is_standalone();

    if wrap {
        out.push_str(CLOSE_PARAGRAPH);
    }
    out.push_str(&fill(variant.open(), &content, &option));
    if !consumed {
        out.push_str(&content);
    }
    out.push_str(&fill(variant.close(), &content, &option));
    if wrap {
        out.push_str(OPEN_PARAGRAPH);
    }
    Ok(())
}

fn write_bbcode(
    element: &Element<'_>,
    variant: &AttributeVariant,
    options: &SerializeOptions,
    out: &mut String,
) -> Result<()> {
    out.push('[');
    out.push_str(variant.open());
    if variant.option().is_some() {
        let option = match element.option() {
            Some(v) if !v.is_empty() => v,
            _ => {
                return Err(Error::Serialization(
                    element.tag().open().to_string(),
                    format!("attribute for option of [{}] is empty", variant.open()),
                ))
            }
        };
        out.push('=');
        if options.decode_output {
            out.push_str(&unescape(option));
        } else {
            out.push_str(option);
        }
    }
    out.push(']');
    out.push_str(&write_children(element, options)?);
    if !variant.close().is_empty() {
        out.push('[');
        out.push_str(variant.close());
        out.push(']');
    }
    Ok(())
}

fn write_text(text: &Text, options: &SerializeOptions, out: &mut String) {
    match options.target {
        Dialect::Html => {
            let encoded = reencode(text.text());
            out.push_str(&encoded.replace('\n', text.newline()).replace('\r', ""));
        }
        Dialect::BBCode => {
            let plain = if text.newline().is_empty() {
                text.text().to_string()
            } else {
                text.text().replace(text.newline(), "\n")
            };
            if options.decode_output {
                out.push_str(&unescape(&plain));
            } else {
                out.push_str(&plain);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::ValueMatch;
    use crate::tag::TagDefinition;

    #[test]
    fn test_fill_placeholders() {
        assert_eq!(
            fill(r#"<img src="{content}" alt="{content}" />"#, "x.png", ""),
            r#"<img src="x.png" alt="x.png" />"#
        );
        assert_eq!(fill("<span style=\"color:{option};\">", "", "red"), "<span style=\"color:red;\">");
        // Placeholders in content are left alone.
        assert_eq!(fill("<a href=\"{option}\">{content}", "{option}", "x"), "<a href=\"x\">{option}");
    }

    #[test]
    fn test_wrap_paragraphs() {
        assert_eq!(wrap_paragraphs("a"), "a");
        assert_eq!(wrap_paragraphs("a</p><p>b"), "<p>a</p><p>b</p>");
        assert_eq!(wrap_paragraphs("</p><ul></ul><p>"), "<ul></ul>");
        assert_eq!(wrap_paragraphs("</p><ul></ul><p></p><ul></ul><p>"), "<ul></ul><ul></ul>");
        assert_eq!(wrap_paragraphs(""), "");
    }

    #[test]
    fn test_wrap_paragraphs_keeps_line_breaks() {
        assert_eq!(
            wrap_paragraphs("<b>x</b></p><p><b>y</b>"),
            "<p><b>x</b></p><p><b>y</b></p>"
        );
        assert_eq!(
            wrap_paragraphs("<b>x</b></p><p></p><p><i>y</i>"),
            "<p><b>x</b></p><p></p><p><i>y</i></p>"
        );
        assert_eq!(wrap_paragraphs("</p><p>x"), "<p></p><p>x</p>");
        assert_eq!(wrap_paragraphs("x</p><p>"), "<p>x</p><p></p>");
        assert_eq!(
            wrap_paragraphs("</p><ul></ul><p></p><p>x"),
            "<ul></ul><p></p><p>x</p>"
        );
    }

    #[test]
    fn test_text_to_html() {
        let mut root = Node::root();
        root.push_child(Node::text("a < b\r\nc &amp; d")).unwrap();
        let html = serialize(&root, &SerializeOptions::new(Dialect::Html)).unwrap();
        assert_eq!(html, "a &lt; b</p><p>c &amp; d");
    }

    #[test]
    fn test_text_to_bbcode() {
        let mut root = Node::root();
        root.push_child(Node::text("a &amp; b")).unwrap();
        let mut options = SerializeOptions::new(Dialect::BBCode);
        assert_eq!(serialize(&root, &options).unwrap(), "a & b");
        options.decode_output = false;
        assert_eq!(serialize(&root, &options).unwrap(), "a &amp; b");
    }

    #[test]
    fn test_missing_variant() {
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
        let mut root = Node::root();
        root.push_child(Node::Element(Element::new(&tag, None, None, None)))
            .unwrap();
        let err = serialize(&root, &SerializeOptions::new(Dialect::Html)).unwrap_err();
        assert_eq!(
            err,
            Error::Serialization(
                String::from("size"),
                String::from("tag needs an option and it is missing")
            )
        );
    }

    #[test]
    fn test_option_given_to_tag_without_option() {
        let tag = TagDefinition::bbcode(
            "b",
            "/b",
            vec![ValueVariant::new(ValueMatch::Absent, "<strong>", "</strong>")],
        )
        .unwrap();
        let mut root = Node::root();
        root.push_child(Node::Element(Element::new(
            &tag,
            None,
            Some(String::from("x")),
            None,
        )))
        .unwrap();
        let err = serialize(&root, &SerializeOptions::new(Dialect::Html)).unwrap_err();
        assert!(matches!(err, Error::Serialization(tag, _) if tag == "b"));
    }

    #[test]
    fn test_wrong_target() {
        let tag = TagDefinition::bbcode(
            "b",
            "/b",
            vec![ValueVariant::new(ValueMatch::Absent, "<strong>", "</strong>")],
        )
        .unwrap();
        let mut root = Node::root();
        root.push_child(Node::Element(Element::new(&tag, tag.variants().first(), None, None)))
            .unwrap();
        assert!(serialize(&root, &SerializeOptions::new(Dialect::BBCode)).is_err());
        assert_eq!(
            serialize(&root, &SerializeOptions::new(Dialect::Html)).unwrap(),
            "</p><strong></strong><p>"
        );
    }
}
