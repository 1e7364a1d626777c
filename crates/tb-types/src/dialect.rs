use racros::AutoStr;
use serde::{Deserialize, Serialize};

/// Markup dialects the toolbox converts between.
///
/// A rule set is always described from its source dialect, the output is the other one.
#[derive(AutoStr, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[autorule = "PascalCase"]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Bracket tags: `[b]bold[/b]`.
    BBCode,

    /// Angle tags: `<strong>bold</strong>`.
    Html,
}

impl Dialect {
    /// The dialect conversion produces when parsing from `self`.
    pub fn opposite(self) -> Self {
        match self {
            Dialect::BBCode => Dialect::Html,
            Dialect::Html => Dialect::BBCode,
        }
    }
}
