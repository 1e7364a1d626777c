use crate::option::OptionVariant;
use crate::tag::TagDefinition;

/// All types of tokens.
///
/// `'r` is the lifetime of the rule set, `'s` the lifetime of input.
///
/// Only tags declared in the rule set become [Token::Head] or [Token::Tail], everything else is
/// [Token::Text].
#[derive(Debug)]
pub(crate) enum Token<'r, 's> {
    /// Tag head.
    Head(TagHead<'r, 's>),

    /// Tag tail.
    Tail(TagTail<'r>),

    /// Plain text.
    Text(&'s str),
}

/// Tag head.
///
/// `[$name=$value]`, `[$name]`, `<$name $attrs>` or `<$name $attrs />`
#[derive(Debug)]
pub(crate) struct TagHead<'r, 's> {
    /// Position of the tag in the rule set.
    pub index: usize,

    /// Matched tag.
    pub tag: &'r TagDefinition,

    /// Variant resolved from the explicit value or the attributes.
    pub variant: Option<&'r OptionVariant>,

    /// Tag as written, delimiters included.
    pub raw: &'s str,

    /// Explicit value, bbcode only.
    pub value: Option<&'s str>,

    /// Html tag closed in itself: `<img src="x" />`.
    pub self_closing: bool,
}

/// Tag tail.
///
/// `[/$name]` or `</$name>`
#[derive(Debug)]
pub(crate) struct TagTail<'r> {
    /// Position of the tag in the rule set.
    pub index: usize,

    /// Matched tag.
    pub tag: &'r TagDefinition,
}
