use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use tb_html::attribute_value;
use tb_types::{Dialect, Error, Result};
use tracing::{debug, trace};

use crate::lexer::Lexer;
use crate::node::{Element, Node};
use crate::option::OptionVariant;
use crate::rules::RuleSet;
use crate::tag::TagDefinition;
use crate::token::{TagHead, Token};

/// Regex to match a paragraph break written in html: `</p><p>`.
static PARAGRAPH_BREAK_RE: OnceLock<Regex> = OnceLock::new();

/// Regex to match any leftover paragraph marker.
static PARAGRAPH_MARKER_RE: OnceLock<Regex> = OnceLock::new();

/// Turn html paragraphs in a text run into line breaks.
fn strip_paragraphs(text: &str) -> Cow<'_, str> {
    if !text.contains("<p") && !text.contains("</p") && !text.contains("<P") && !text.contains("</P")
    {
        return Cow::Borrowed(text);
    }
    let breaks = PARAGRAPH_BREAK_RE.get_or_init(|| {
        Regex::new(r"(?i)</p>\s*<p(?:\s[^<>]*)?>").expect("paragraph break regex is valid")
    });
    let markers = PARAGRAPH_MARKER_RE.get_or_init(|| {
        Regex::new(r"(?i)</?p(?:\s[^<>]*)?>").expect("paragraph marker regex is valid")
    });
    let text = breaks.replace_all(text, "\n");
    Cow::Owned(markers.replace_all(&text, "").into_owned())
}

/// Build syntax trees from text in the source dialect of a [RuleSet].
///
/// One parser can be used for any number of inputs, nothing is kept between calls.
pub struct Parser<'a> {
    rules: &'a RuleSet,
}

impl<'a> Parser<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Parse `text` into a tree.
    ///
    /// # Errors
    ///
    /// * Closing tag without the opening one, or closing a tag that is not the innermost one.
    /// * Tags still open when input ends.
    /// * Bbcode tag with an empty explicit value: `[b=]`.
    #[tracing::instrument(skip_all, fields(dialect = ?self.rules.dialect(), len = text.len()))]
    pub fn parse(&self, text: &str) -> Result<Node<'a>> {
        let dialect = self.rules.dialect();
        let mut stack = vec![Node::root()];
        let mut lexer = Lexer::new(self.rules, text);

        loop {
            let verbatim = match stack.last() {
                Some(Node::Element(v)) if v.is_verbatim() => self.index_of(v),
                _ => None,
            };
            let (offset, token) = match lexer.next_token(verbatim)? {
                Some(v) => v,
                None => break,
            };

            match token {
                Token::Text(raw) => {
                    let content = match dialect {
                        Dialect::Html if verbatim.is_none() => strip_paragraphs(raw),
                        _ => Cow::Borrowed(raw),
                    };
                    if content.is_empty() {
                        continue;
                    }
                    top(&mut stack)?.push_child(Node::text(content))?;
                    if top_is_self_terminating(&stack) {
                        close_top(&mut stack)?;
                    }
                }
                Token::Head(head) => {
                    if top_is_self_terminating(&stack) && top_is_tag(&stack, head.tag) {
                        trace!("implicitly close {:?}", head.tag.open());
                        close_top(&mut stack)?;
                    }
                    let element = open_element(&head);
                    if head.self_closing {
                        let node = element.finish()?;
                        top(&mut stack)?.push_child(node)?;
                    } else {
                        trace!("push {:?}", head.raw);
                        stack.push(Node::Element(element));
                    }
                }
                Token::Tail(tail) => {
                    // Tags without closing never match a closing tag.
                    while top_is_self_terminating(&stack) {
                        close_top(&mut stack)?;
                    }
                    if stack.len() <= 1 {
                        debug!("closing tag {:?} at {offset} has no opening", tail.tag.close());
                        return Err(Error::StructuralParse(
                            dialect,
                            offset,
                            format!("closing tag {:?} without opening tag", tail.tag.close()),
                        ));
                    }
                    if !top_is_tag(&stack, tail.tag) {
                        let open = match stack.last() {
                            Some(Node::Element(v)) => v.tag().open(),
                            _ => "",
                        };
                        debug!("closing tag {:?} at {offset} mismatches {open:?}", tail.tag.close());
                        return Err(Error::StructuralParse(
                            dialect,
                            offset,
                            format!(
                                "mismatched closing tag {:?}, expected closing of {open:?}",
                                tail.tag.close()
                            ),
                        ));
                    }
                    close_top(&mut stack)?;
                }
            }
        }

        while top_is_self_terminating(&stack) {
            close_top(&mut stack)?;
        }
        if stack.len() > 1 {
            let open = match stack.last() {
                Some(Node::Element(v)) => v.tag().open(),
                _ => "",
            };
            debug!("tag {open:?} still open at end of input");
            return Err(Error::StructuralParse(
                dialect,
                lexer.position(),
                format!("unclosed tag {open:?}"),
            ));
        }

        stack.pop().ok_or_else(|| Error::InvalidTree(String::from("missing root")))
    }

    fn index_of(&self, element: &Element<'a>) -> Option<usize> {
        self.rules.tags().iter().position(|x| x == element.tag())
    }
}

/// Build the element for a tag head, option and content are read from the tag.
fn open_element<'a>(head: &TagHead<'a, '_>) -> Element<'a> {
    let (option, content) = match head.variant {
        Some(OptionVariant::Attribute(v)) => (
            v.option().and_then(|x| attribute_value(head.raw, x)),
            v.content().and_then(|x| attribute_value(head.raw, x)),
        ),
        _ => (head.value.map(String::from), None),
    };
    Element::new(head.tag, head.variant, option, content)
}

fn top<'s, 'a>(stack: &'s mut [Node<'a>]) -> Result<&'s mut Node<'a>> {
    stack
        .last_mut()
        .ok_or_else(|| Error::InvalidTree(String::from("empty node stack")))
}

fn top_is_self_terminating(stack: &[Node<'_>]) -> bool {
    matches!(stack.last(), Some(Node::Element(v)) if v.tag().is_self_terminating())
}

fn top_is_tag(stack: &[Node<'_>], tag: &TagDefinition) -> bool {
    matches!(stack.last(), Some(Node::Element(v)) if v.tag() == tag)
}

/// Pop the innermost element and attach it to its parent.
fn close_top(stack: &mut Vec<Node<'_>>) -> Result<()> {
    if stack.len() <= 1 {
        return Err(Error::InvalidTree(String::from("can not close the root")));
    }
    let node = match stack.pop() {
        Some(Node::Element(v)) => v.finish()?,
        Some(v) => v,
        None => return Err(Error::InvalidTree(String::from("empty node stack"))),
    };
    trace!("pop {:?}", node_name(&node));
    top(stack)?.push_child(node)
}

fn node_name<'s>(node: &'s Node<'_>) -> &'s str {
    match node {
        Node::Root { .. } => "root",
        Node::Element(v) => v.tag().open(),
        Node::Text(_) => "text",
    }
}
