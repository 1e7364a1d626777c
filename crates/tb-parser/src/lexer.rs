use regex::{Captures, Regex};
use std::sync::OnceLock;
use tb_types::{Dialect, Error, Result};
use tracing::{debug, trace};

use crate::rules::RuleSet;
use crate::tag::TagSide;
use crate::token::{TagHead, TagTail, Token};

/// Regex to match anything shaped like a bbcode tag.
static BBCODE_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

/// Regex to match anything shaped like an html tag.
static HTML_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re(dialect: Dialect) -> &'static Regex {
    match dialect {
        Dialect::BBCode => BBCODE_TOKEN_RE.get_or_init(|| {
            Regex::new(
                r"\[(?<slash>/?)(?<name>[a-zA-Z*][a-zA-Z0-9]*)(?:(?<eq>=)(?<value>[^\[\]\n\r\v\f]*))?\]",
            )
            .expect("bbcode token regex is valid")
        }),
        Dialect::Html => HTML_TOKEN_RE.get_or_init(|| {
            Regex::new(r"<(?<slash>/?)(?<name>[a-zA-Z][a-zA-Z0-9]*)(?<attrs>[^<>]*)>")
                .expect("html token regex is valid")
        }),
    }
}

/// Candidate token found in the rest of input: start and end relative to the cursor.
type Found<'r, 's> = (usize, usize, Token<'r, 's>);

/// Result of checking one tag-shaped match against the rule set.
enum Candidate<'r, 's> {
    /// Declared tag.
    Tag(Token<'r, 's>),

    /// Declared open marker, but no rule fits its value or attributes.
    ///
    /// Holds the index of the tag.
    Unmatched(usize),

    /// Not declared at all.
    Unknown,
}

/// How a declared open tag still waiting for its closing tag was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Opening {
    /// Kept as text, its closing tag is text too.
    Literal,

    /// Emitted as a tag head.
    Element,
}

/// Split input into tokens of tags declared in a [RuleSet].
///
/// Tag-like text that is not declared stays in the surrounding text. So does a declared open tag
/// no rule fits, together with its closing tag.
pub(crate) struct Lexer<'r, 's> {
    rules: &'r RuleSet,

    /// Whole input.
    source: &'s str,

    /// Start of the next token, in bytes.
    position: usize,

    /// Open tags still waiting for their closing tag, innermost last, per tag index.
    ///
    /// A closing tag pairs with the innermost one, as text or as a tag tail.
    openings: Vec<Vec<Opening>>,
}

impl<'r, 's> Lexer<'r, 's> {
    pub fn new(rules: &'r RuleSet, source: &'s str) -> Self {
        Self {
            rules,
            source,
            position: 0,
            openings: vec![vec![]; rules.tags().len()],
        }
    }

    /// Current byte offset in input.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Produce the next token and the byte offset it starts at.
    ///
    /// When `verbatim` holds the index of a tag, only the closing tag of it is recognized and
    /// everything before it is text.
    ///
    /// Return `Ok(None)` when all input is consumed.
    pub fn next_token(&mut self, verbatim: Option<usize>) -> Result<Option<(usize, Token<'r, 's>)>> {
        if self.position >= self.source.len() {
            return Ok(None);
        }

        let start = self.position;
        let source = self.source;
        let rest = &source[start..];
        let rules = self.rules;
        let verbatim_end = verbatim.and_then(|idx| rules.verbatim_end(idx).map(|re| (idx, re)));
        let found = match verbatim_end {
            Some((index, re)) => re.find(rest).map(|m| {
                let tail = TagTail {
                    index,
                    tag: &rules.tags()[index],
                };
                (m.start(), m.end(), Token::Tail(tail))
            }),
            None => self.scan_tag(start, rest)?,
        };

        let token = match found {
            Some((0, end, token)) => {
                self.position = start + end;
                self.track(&token);
                token
            }
            Some((begin, _, _)) => {
                // Text first, the tag is matched again in the next call.
                self.position = start + begin;
                Token::Text(&rest[..begin])
            }
            None => {
                self.position = source.len();
                Token::Text(rest)
            }
        };
        trace!("token at {start}: {token:?}");
        Ok(Some((start, token)))
    }

    /// Record the opening or closing of an element once its token is consumed.
    fn track(&mut self, token: &Token<'r, 's>) {
        match token {
            Token::Head(head) if !head.self_closing && !head.tag.is_self_terminating() => {
                self.openings[head.index].push(Opening::Element);
            }
            Token::Tail(tail) => {
                if self.openings[tail.index].last() == Some(&Opening::Element) {
                    self.openings[tail.index].pop();
                }
            }
            _ => {}
        }
    }

    /// Find the first declared tag in `rest`.
    fn scan_tag(&mut self, start: usize, rest: &'s str) -> Result<Option<Found<'r, 's>>> {
        let dialect = self.rules.dialect();
        for caps in token_re(dialect).captures_iter(rest) {
            let m = match caps.get(0) {
                Some(v) => v,
                None => continue,
            };
            let candidate = match dialect {
                Dialect::BBCode => self.bbcode_token(&caps, start + m.start())?,
                Dialect::Html => self.html_token(&caps),
            };
            match candidate {
                Candidate::Tag(Token::Tail(tail))
                    if self.openings[tail.index].last() == Some(&Opening::Literal) =>
                {
                    trace!("closing tag {:?} pairs with text, skip it", m.as_str());
                    self.openings[tail.index].pop();
                }
                Candidate::Tag(token) => return Ok(Some((m.start(), m.end(), token))),
                Candidate::Unmatched(index) => {
                    // Only tags with closing tags leave one behind.
                    if !self.rules.tags()[index].is_self_terminating() {
                        self.openings[index].push(Opening::Literal);
                    }
                }
                Candidate::Unknown => trace!("skip undeclared tag {:?}", m.as_str()),
            }
        }
        Ok(None)
    }

    /// Full tag name as written, slash included.
    fn full_name(caps: &Captures<'s>) -> Option<&'s str> {
        let raw = caps.get(0)?;
        let end = caps.name("name")?.end() - raw.start();
        // Skip the leading delimiter.
        raw.as_str().get(1..end)
    }

    fn bbcode_token(&self, caps: &Captures<'s>, offset: usize) -> Result<Candidate<'r, 's>> {
        let raw = caps.get(0).map_or("", |x| x.as_str());
        let (index, side) = match Self::full_name(caps).and_then(|x| self.rules.classify(x)) {
            Some(v) => v,
            None => return Ok(Candidate::Unknown),
        };
        let tag = &self.rules.tags()[index];
        let value = caps
            .name("eq")
            .map(|_| caps.name("value").map_or("", |x| x.as_str()));

        match side {
            TagSide::Close if value.is_some() => Ok(Candidate::Unknown),
            TagSide::Close => Ok(Candidate::Tag(Token::Tail(TagTail { index, tag }))),
            TagSide::Open => {
                if value == Some("") {
                    debug!("empty value in {raw:?} at {offset}");
                    return Err(Error::StructuralParse(
                        Dialect::BBCode,
                        offset,
                        format!("empty value in tag {raw:?}"),
                    ));
                }
                let variant = tag.variant_for_explicit_value(value.unwrap_or_default());
                if value.is_some() && variant.is_none() {
                    debug!("no rule for {raw:?}, keep it as text");
                    return Ok(Candidate::Unmatched(index));
                }
                Ok(Candidate::Tag(Token::Head(TagHead {
                    index,
                    tag,
                    variant,
                    raw,
                    value,
                    self_closing: false,
                })))
            }
        }
    }

    fn html_token(&self, caps: &Captures<'s>) -> Candidate<'r, 's> {
        let raw = caps.get(0).map_or("", |x| x.as_str());
        let attrs = caps.name("attrs").map_or("", |x| x.as_str());
        if attrs
            .chars()
            .next()
            .is_some_and(|x| !x.is_whitespace() && x != '/')
        {
            return Candidate::Unknown;
        }
        let (index, side) = match Self::full_name(caps).and_then(|x| self.rules.classify(x)) {
            Some(v) => v,
            None => return Candidate::Unknown,
        };
        let tag = &self.rules.tags()[index];

        match side {
            TagSide::Close if !attrs.trim().is_empty() => Candidate::Unknown,
            TagSide::Close => Candidate::Tag(Token::Tail(TagTail { index, tag })),
            TagSide::Open => {
                let self_closing = attrs.trim_end().ends_with('/');
                let variant = tag.variant_for_attributes(raw);
                if variant.is_none() {
                    debug!("no rule for {raw:?}, keep it as text");
                    return if self_closing {
                        Candidate::Unknown
                    } else {
                        Candidate::Unmatched(index)
                    };
                }
                Candidate::Tag(Token::Head(TagHead {
                    index,
                    tag,
                    variant,
                    raw,
                    value: None,
                    self_closing,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(rules: &RuleSet, source: &str) -> Result<Vec<String>> {
        let mut lexer = Lexer::new(rules, source);
        let mut tokens = vec![];
        while let Some((_, token)) = lexer.next_token(None)? {
            tokens.push(match token {
                Token::Head(v) => format!("head:{}:{}", v.tag.open(), v.value.unwrap_or_default()),
                Token::Tail(v) => format!("tail:{}", v.tag.open()),
                Token::Text(v) => format!("text:{v}"),
            });
        }
        Ok(tokens)
    }

    #[test]
    fn test_bbcode_tokens() {
        let rules = RuleSet::default_bbcode();
        assert_eq!(
            collect(&rules, "a [B]b[/b] [size=5]c[/size]").unwrap(),
            vec![
                "text:a ",
                "head:b:",
                "text:b",
                "tail:b",
                "text: ",
                "head:size:5",
                "text:c",
                "tail:size",
            ]
        );
    }

    #[test]
    fn test_bbcode_undeclared_tags_stay_in_text() {
        let rules = RuleSet::default_bbcode();
        assert_eq!(
            collect(&rules, "[foo]x[/foo] [list=2] [b=x] [/b=1]").unwrap(),
            vec!["text:[foo]x[/foo] [list=2] [b=x] [/b=1]"]
        );
    }

    #[test]
    fn test_bbcode_unmatched_open_keeps_its_close() {
        let rules = RuleSet::default_bbcode();
        assert_eq!(
            collect(&rules, "[list=2]x[/list][list]").unwrap(),
            vec!["text:[list=2]x[/list]", "head:list:"]
        );
    }

    #[test]
    fn test_bbcode_empty_value() {
        let rules = RuleSet::default_bbcode();
        let err = collect(&rules, "ab[b=]").unwrap_err();
        assert_eq!(
            err,
            Error::StructuralParse(Dialect::BBCode, 2, String::from(r#"empty value in tag "[b=]""#))
        );
    }

    #[test]
    fn test_bbcode_verbatim() {
        let rules = RuleSet::default_bbcode();
        let code = rules.classify("code").unwrap().0;
        let mut lexer = Lexer::new(&rules, "[b]x[/b][/CODE]y");
        let (offset, token) = lexer.next_token(Some(code)).unwrap().unwrap();
        assert_eq!(offset, 0);
        assert!(matches!(token, Token::Text("[b]x[/b]")));
        let (offset, token) = lexer.next_token(Some(code)).unwrap().unwrap();
        assert_eq!(offset, 8);
        assert!(matches!(token, Token::Tail(TagTail { index, .. }) if index == code));
        assert_eq!(lexer.position(), 15);
    }

    #[test]
    fn test_html_tokens() {
        let rules = RuleSet::default_html();
        let mut lexer = Lexer::new(&rules, r#"<p><img src="x" /><span>y</span></p>"#);
        let mut kinds = vec![];
        while let Some((_, token)) = lexer.next_token(None).unwrap() {
            kinds.push(match token {
                Token::Head(v) => format!("head:{}:{}", v.tag.open(), v.self_closing),
                Token::Tail(v) => format!("tail:{}", v.tag.open()),
                Token::Text(v) => format!("text:{v}"),
            });
        }
        // A span without style has no rule, neither has its closing tag.
        assert_eq!(kinds, vec!["text:<p>", "head:img:true", "text:<span>y</span></p>"]);
    }

    #[test]
    fn test_closing_tag_pairs_with_innermost_opening() {
        let rules = RuleSet::default_bbcode();
        assert_eq!(
            collect(&rules, "[list=2][list][*]a[/list]b[/list]").unwrap(),
            vec!["text:[list=2]", "head:list:", "head:*:", "text:a", "tail:list", "text:b[/list]"]
        );
        assert_eq!(
            collect(&rules, "[list][list=2]a[/list]b[/list]").unwrap(),
            vec!["head:list:", "text:[list=2]a[/list]b", "tail:list"]
        );

        let rules = RuleSet::default_html();
        assert_eq!(
            collect(&rules, r#"<span><span style="color:red;">x</span>y</span>"#).unwrap(),
            vec![
                "text:<span>",
                "head:span:",
                "text:x",
                "tail:span",
                "text:y</span>",
            ]
        );
    }

    #[test]
    fn test_html_name_boundary() {
        let rules = RuleSet::default_html();
        let mut lexer = Lexer::new(&rules, "<strongest><u>");
        let (_, token) = lexer.next_token(None).unwrap().unwrap();
        assert!(matches!(token, Token::Text("<strongest>")));
        let (_, token) = lexer.next_token(None).unwrap().unwrap();
        assert!(matches!(token, Token::Head(TagHead { raw: "<u>", .. })));
    }
}
