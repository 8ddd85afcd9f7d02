//! Output content categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an extracted entry.
///
/// [`ExtractionType::All`] is a request-side sentinel meaning "no filtering".
/// It is expanded with [`ExtractionType::get_all`] before any filtering and
/// never appears on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionType {
    Table,
    Text,
    Figure,
    Equation,
    Code,
    Reference,
    Other,
    All,
}

impl ExtractionType {
    const CONCRETE: [ExtractionType; 7] = [
        ExtractionType::Table,
        ExtractionType::Text,
        ExtractionType::Figure,
        ExtractionType::Equation,
        ExtractionType::Code,
        ExtractionType::Reference,
        ExtractionType::Other,
    ];

    /// Every concrete type, in declaration order.
    pub fn get_all() -> Vec<ExtractionType> {
        Self::CONCRETE.to_vec()
    }

    /// Whether this is the `All` sentinel.
    pub fn is_sentinel(self) -> bool {
        self == ExtractionType::All
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionType::Table => "table",
            ExtractionType::Text => "text",
            ExtractionType::Figure => "figure",
            ExtractionType::Equation => "equation",
            ExtractionType::Code => "code",
            ExtractionType::Reference => "reference",
            ExtractionType::Other => "other",
            ExtractionType::All => "all",
        }
    }

    /// Parse a lowercase name (as produced by [`ExtractionType::as_str`]).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::CONCRETE
            .iter()
            .copied()
            .chain(std::iter::once(ExtractionType::All))
            .find(|t| t.as_str() == s)
    }
}

impl fmt::Display for ExtractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expand an optional `includes` request into concrete types.
///
/// `None` yields every concrete type. `All` is replaced in place by every
/// concrete type; duplicates are dropped, keeping the first occurrence.
pub fn resolve_includes(includes: Option<&[ExtractionType]>) -> Vec<ExtractionType> {
    let Some(requested) = includes else {
        return ExtractionType::get_all();
    };

    let mut resolved = Vec::with_capacity(ExtractionType::CONCRETE.len());
    for &kind in requested {
        if kind.is_sentinel() {
            for concrete in ExtractionType::CONCRETE {
                if !resolved.contains(&concrete) {
                    resolved.push(concrete);
                }
            }
        } else if !resolved.contains(&kind) {
            resolved.push(kind);
        }
    }
    resolved
}
