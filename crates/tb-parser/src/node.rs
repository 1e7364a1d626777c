use serde::{Serialize, Serializer};
use tb_types::{Error, Result, PARAGRAPH_BREAK};

use crate::option::OptionVariant;
use crate::tag::TagDefinition;

/// Node in the syntax tree built from one input.
///
/// Elements borrow their tag definitions from the rule set that parsed them.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node<'a> {
    /// Top of the tree, only holds children.
    Root { children: Vec<Node<'a>> },

    /// A tag and its content.
    Element(Element<'a>),

    /// Plain text.
    Text(Text),
}

/// A tag occurrence.
#[derive(Clone, Debug, Serialize)]
pub struct Element<'a> {
    #[serde(serialize_with = "serialize_tag")]
    tag: &'a TagDefinition,

    /// Rule chosen for this occurrence.
    ///
    /// `None` when no rule fits, e.g. `[size]` without a value. Such elements fail to
    /// serialize.
    variant: Option<&'a OptionVariant>,

    /// Explicit value in bbcode, or the value of the option attribute in html.
    option: Option<String>,

    /// Value of the content attribute, used as text when the tag has no content.
    content: Option<String>,

    children: Vec<Node<'a>>,
}

/// Text and the string standing for line breaks in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Text {
    text: String,

    newline: String,
}

fn serialize_tag<S>(tag: &&TagDefinition, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(tag.open())
}

impl<'a> Node<'a> {
    pub fn root() -> Self {
        Node::Root { children: vec![] }
    }

    /// Text node, its newline string is set when attached to a parent.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text {
            text: text.into(),
            newline: String::from(PARAGRAPH_BREAK),
        })
    }

    /// Children of the node, text has none.
    pub fn children(&self) -> &[Node<'a>] {
        match self {
            Node::Root { children } => children,
            Node::Element(v) => &v.children,
            Node::Text(_) => &[],
        }
    }

    /// Append `child` to the end of children.
    ///
    /// Text children take the newline string of this node.
    ///
    /// # Errors
    ///
    /// * This node is text.
    pub fn push_child(&mut self, mut child: Node<'a>) -> Result<()> {
        let newline = match self {
            Node::Root { .. } => None,
            Node::Element(v) => v.newline(),
            Node::Text(v) => {
                return Err(Error::InvalidTree(format!(
                    "text {:?} can not have children",
                    v.text
                )))
            }
        };
        if let Node::Text(text) = &mut child {
            text.newline = newline.unwrap_or(PARAGRAPH_BREAK).to_string();
        }
        match self {
            Node::Root { children } => children.push(child),
            Node::Element(v) => v.children.push(child),
            Node::Text(_) => {}
        }
        Ok(())
    }
}

impl<'a> Element<'a> {
    pub fn new(
        tag: &'a TagDefinition,
        variant: Option<&'a OptionVariant>,
        option: Option<String>,
        content: Option<String>,
    ) -> Self {
        Self {
            tag,
            variant,
            option,
            content,
            children: vec![],
        }
    }

    pub fn tag(&self) -> &'a TagDefinition {
        self.tag
    }

    pub fn variant(&self) -> Option<&'a OptionVariant> {
        self.variant
    }

    pub fn option(&self) -> Option<&str> {
        self.option.as_deref()
    }

    pub fn children(&self) -> &[Node<'a>] {
        &self.children
    }

    /// Content is kept as plain text until the closing tag.
    pub fn is_verbatim(&self) -> bool {
        self.variant.is_some_and(|x| !x.parse_content())
    }

    /// Newline string for text inside, `None` means the paragraph default.
    fn newline(&self) -> Option<&'a str> {
        self.variant
            .and_then(|x| x.newline())
            .filter(|x| !x.is_empty())
    }

    /// Complete the element when its closing is reached.
    ///
    /// An element without children takes the content attribute as its text.
    pub fn finish(mut self) -> Result<Node<'a>> {
        let content = self.content.take().filter(|x| !x.is_empty());
        let mut node = Node::Element(self);
        if let Some(content) = content {
            if node.children().is_empty() {
                node.push_child(Node::text(content))?;
            }
        }
        Ok(node)
    }
}

impl Text {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{AttributeVariant, ValueMatch, ValueVariant};
    use tb_html::Selector;

    fn bold() -> TagDefinition {
        TagDefinition::bbcode(
            "b",
            "/b",
            vec![
                ValueVariant::new(ValueMatch::Absent, "<strong>", "</strong>").with_newline("<br />"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_text_has_no_children() {
        let mut text = Node::text("x");
        let err = text.push_child(Node::text("y")).unwrap_err();
        assert!(matches!(err, Error::InvalidTree(_)));
    }

    #[test]
    fn test_text_inherits_newline() {
        let tag = bold();
        let mut element = Node::Element(Element::new(&tag, tag.variants().first(), None, None));
        element.push_child(Node::text("a\nb")).unwrap();
        match &element.children()[0] {
            Node::Text(v) => assert_eq!(v.newline(), "<br />"),
            v => panic!("unexpected node {v:?}"),
        }

        let mut root = Node::root();
        root.push_child(Node::text("c")).unwrap();
        match &root.children()[0] {
            Node::Text(v) => assert_eq!(v.newline(), PARAGRAPH_BREAK),
            v => panic!("unexpected node {v:?}"),
        }
    }

    #[test]
    fn test_unresolved_element_uses_paragraph_newline() {
        let tag = bold();
        let mut element = Node::Element(Element::new(&tag, None, None, None));
        element.push_child(Node::text("x")).unwrap();
        match &element.children()[0] {
            Node::Text(v) => assert_eq!(v.newline(), PARAGRAPH_BREAK),
            v => panic!("unexpected node {v:?}"),
        }
    }

    #[test]
    fn test_finish_takes_content_attribute() {
        let tag = TagDefinition::html(
            "img",
            "/img",
            vec![AttributeVariant::new("img", "/img").with_content(Selector::whole("src"))],
        )
        .unwrap();
        let element = Element::new(&tag, tag.variants().first(), None, Some(String::from("x.png")));
        let node = element.finish().unwrap();
        assert_eq!(node.children().len(), 1);

        let mut element = Element::new(&tag, tag.variants().first(), None, Some(String::from("y")));
        element.children.push(Node::text("caption"));
        let node = element.finish().unwrap();
        match &node.children()[0] {
            Node::Text(v) => assert_eq!(v.text(), "caption"),
            v => panic!("unexpected node {v:?}"),
        }
    }

    #[test]
    fn test_serialize_tree() {
        let tag = bold();
        let mut root = Node::root();
        let mut element = Node::Element(Element::new(&tag, None, None, None));
        element.push_child(Node::text("hi")).unwrap();
        root.push_child(element).unwrap();
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["type"], "root");
        assert_eq!(json["children"][0]["type"], "element");
        assert_eq!(json["children"][0]["tag"], "b");
        assert_eq!(json["children"][0]["children"][0]["text"], "hi");
    }
}
