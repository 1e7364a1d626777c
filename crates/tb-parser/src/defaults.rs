//! Built-in tag tables.
//!
//! Cover the tags usually found in forum posts: text styles, lists, code blocks, images and
//! links.

use crate::option::{AttributeVariant, ValueMatch, ValueVariant};
use crate::rules::RuleSet;
use crate::tag::TagDefinition;
use tb_html::Selector;
use tb_types::{Dialect, Result};

/// Html that stands for a line break inside inline tags.
const LINE_BREAK: &str = "<br />";

fn exact(value: &str) -> ValueMatch {
    ValueMatch::Exact(value.to_string())
}

/// Default tags parsed from bbcode.
pub fn bbcode_definitions() -> Result<Vec<TagDefinition>> {
    let inline = |open: &str, close: &str| {
        vec![ValueVariant::new(ValueMatch::Absent, open, close)
            .with_newline(LINE_BREAK)
            .standalone()]
    };

    Ok(vec![
        TagDefinition::bbcode("b", "/b", inline("<strong>", "</strong>"))?,
        TagDefinition::bbcode("i", "/i", inline("<em>", "</em>"))?,
        TagDefinition::bbcode("u", "/u", inline("<u>", "</u>"))?,
        TagDefinition::bbcode(
            "size",
            "/size",
            vec![ValueVariant::new(
                ValueMatch::Any,
                r#"<span style="font-size:{option}%;">"#,
                "</span>",
            )
            .with_newline(LINE_BREAK)
            .standalone()],
        )?,
        TagDefinition::bbcode(
            "color",
            "/color",
            vec![ValueVariant::new(
                ValueMatch::Any,
                r#"<span style="color:{option};">"#,
                "</span>",
            )
            .with_newline(LINE_BREAK)
            .standalone()],
        )?,
        TagDefinition::bbcode(
            "list",
            "/list",
            vec![
                ValueVariant::new(exact("1"), "<ol>", "</ol>"),
                ValueVariant::new(ValueMatch::Absent, "<ul>", "</ul>"),
            ],
        )?,
        TagDefinition::bbcode(
            "*",
            "",
            vec![ValueVariant::new(ValueMatch::Absent, "<li>", "</li>").standalone()],
        )?,
        TagDefinition::bbcode(
            "code",
            "/code",
            vec![
                ValueVariant::new(ValueMatch::Any, r#"<pre class="{option}">"#, "</pre>")
                    .verbatim(),
            ],
        )?,
        TagDefinition::bbcode(
            "img",
            "/img",
            vec![ValueVariant::new(
                ValueMatch::Absent,
                r#"<img src="{content}" alt="{content}" />"#,
                "",
            )
            .verbatim()
            .standalone()],
        )?,
        TagDefinition::bbcode(
            "url",
            "/url",
            vec![
                ValueVariant::new(ValueMatch::Any, r#"<a href="{option}">"#, "</a>")
                    .with_newline(LINE_BREAK)
                    .standalone(),
                ValueVariant::new(ValueMatch::Absent, r#"<a href="{content}">"#, "</a>")
                    .verbatim()
                    .standalone(),
            ],
        )?,
        TagDefinition::bbcode(
            "email",
            "/email",
            vec![
                ValueVariant::new(ValueMatch::Absent, r#"<a href="mailto:{content}">"#, "</a>")
                    .verbatim()
                    .standalone(),
            ],
        )?,
    ])
}

/// Default tags parsed from html.
pub fn html_definitions() -> Result<Vec<TagDefinition>> {
    let plain = |open: &str, close: &str| vec![AttributeVariant::new(open, close)];
    let inline = |open: &str, close: &str| {
        vec![AttributeVariant::new(open, close).with_newline(LINE_BREAK)]
    };

    Ok(vec![
        TagDefinition::html("strong", "/strong", inline("b", "/b"))?,
        TagDefinition::html("em", "/em", inline("i", "/i"))?,
        TagDefinition::html("u", "/u", inline("u", "/u"))?,
        TagDefinition::html(
            "span",
            "/span",
            vec![
                AttributeVariant::new("size", "/size")
                    .with_option(Selector::windowed("style", "font-size", "%;"))
                    .with_newline(LINE_BREAK),
                AttributeVariant::new("color", "/color")
                    .with_option(Selector::windowed("style", "color", ";"))
                    .with_newline(LINE_BREAK),
            ],
        )?,
        TagDefinition::html("ol", "/ol", plain("list=1", "/list"))?,
        TagDefinition::html("ul", "/ul", plain("list", "/list"))?,
        TagDefinition::html("li", "/li", plain("*", ""))?,
        TagDefinition::html(
            "pre",
            "/pre",
            vec![AttributeVariant::new("code", "/code").with_option(Selector::whole("class"))],
        )?,
        TagDefinition::html(
            "img",
            "/img",
            vec![AttributeVariant::new("img", "/img").with_content(Selector::whole("src"))],
        )?,
        TagDefinition::html(
            "a",
            "/a",
            vec![AttributeVariant::new("url", "/url")
                .with_content(Selector::whole("href"))
                .with_option(Selector::whole("href"))
                .with_newline(LINE_BREAK)],
        )?,
    ])
}

impl RuleSet {
    /// Rule set parsing bbcode with the built-in tags.
    pub fn default_bbcode() -> Self {
        bbcode_definitions()
            .and_then(|tags| RuleSet::new(Dialect::BBCode, tags))
            .expect("built-in bbcode tags are valid")
    }

    /// Rule set parsing html with the built-in tags.
    pub fn default_html() -> Self {
        html_definitions()
            .and_then(|tags| RuleSet::new(Dialect::Html, tags))
            .expect("built-in html tags are valid")
    }
}
