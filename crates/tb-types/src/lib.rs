mod dialect;

pub use dialect::Dialect;

/// Opens an html paragraph.
pub const OPEN_PARAGRAPH: &str = "<p>";

/// Closes an html paragraph.
pub const CLOSE_PARAGRAPH: &str = "</p>";

/// Default newline replacement for text that has no enclosing tag telling otherwise.
///
/// A line break in free text ends the current paragraph and starts a new one.
pub const PARAGRAPH_BREAK: &str = "</p><p>";

/// Placeholder in an html template replaced by the converted content of the tag.
///
/// Used by tags like `[img]` where the content ends up in an attribute.
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Placeholder in an html template replaced by the option of the tag.
///
/// `[size=50]` writes `50` where the placeholder is.
pub const OPTION_PLACEHOLDER: &str = "{option}";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Tag definitions or rule tables are invalid.
    ///
    /// Raised when building the configuration, never during a conversion.
    #[error("invalid tag configuration: {0}")]
    Configuration(String),

    /// Input text can not be turned into a syntax tree.
    ///
    /// * 0: dialect of the input.
    /// * 1: byte offset where the problem was detected.
    /// * 2: message.
    #[error("failed to parse {0:?} at byte {1}: {2}")]
    StructuralParse(Dialect, usize, String),

    /// Syntax tree can not be rendered into the opposite dialect.
    ///
    /// * 0: open marker of the tag.
    /// * 1: message.
    #[error("failed to convert tag {0:?}: {1}")]
    Serialization(String, String),

    /// Syntax tree operation violated the tree shape.
    #[error("invalid syntax tree operation: {0}")]
    InvalidTree(String),
}

pub type Result<T> = std::result::Result<T, Error>;
