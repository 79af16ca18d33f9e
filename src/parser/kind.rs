//! Kinds of template instantiation events reported by Templight.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the compiler was doing when the event was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntryKind {
    /// Instantiating a template declaration
    TemplateInstantiation,
    /// Instantiating a default argument of a template parameter
    DefaultTemplateArgumentInstantiation,
    /// Instantiating a default argument of a function
    DefaultFunctionArgumentInstantiation,
    /// Substituting explicit template arguments of a function template
    ExplicitTemplateArgumentSubstitution,
    /// Substituting arguments determined by template argument deduction
    DeducedTemplateArgumentSubstitution,
    /// Substituting prior template arguments into a template parameter
    PriorTemplateArgumentSubstitution,
    /// Checking a default template argument used in a template-id
    DefaultTemplateArgumentChecking,
    /// Instantiating a deferred exception specification
    ExceptionSpecInstantiation,
    /// Reusing an instantiation that already exists
    Memoization,
    #[default]
    Unknown,
}

impl EntryKind {
    pub const ALL: [EntryKind; 10] = [
        Self::TemplateInstantiation,
        Self::DefaultTemplateArgumentInstantiation,
        Self::DefaultFunctionArgumentInstantiation,
        Self::ExplicitTemplateArgumentSubstitution,
        Self::DeducedTemplateArgumentSubstitution,
        Self::PriorTemplateArgumentSubstitution,
        Self::DefaultTemplateArgumentChecking,
        Self::ExceptionSpecInstantiation,
        Self::Memoization,
        Self::Unknown,
    ];

    /// Name as written in the trace
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TemplateInstantiation => "TemplateInstantiation",
            Self::DefaultTemplateArgumentInstantiation => "DefaultTemplateArgumentInstantiation",
            Self::DefaultFunctionArgumentInstantiation => "DefaultFunctionArgumentInstantiation",
            Self::ExplicitTemplateArgumentSubstitution => "ExplicitTemplateArgumentSubstitution",
            Self::DeducedTemplateArgumentSubstitution => "DeducedTemplateArgumentSubstitution",
            Self::PriorTemplateArgumentSubstitution => "PriorTemplateArgumentSubstitution",
            Self::DefaultTemplateArgumentChecking => "DefaultTemplateArgumentChecking",
            Self::ExceptionSpecInstantiation => "ExceptionSpecInstantiation",
            Self::Memoization => "Memoization",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::str::FromStr for EntryKind {
    type Err = std::convert::Infallible;

    /// Unrecognized names map to `Unknown` so newer trace producers still load
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .unwrap_or(Self::Unknown))
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds_parse() {
        for kind in EntryKind::ALL {
            assert_eq!(kind.as_str().parse::<EntryKind>().unwrap(), kind);
        }
        assert_eq!(
            "  Memoization\n".parse::<EntryKind>().unwrap(),
            EntryKind::Memoization
        );
    }

    #[test]
    fn test_unknown_kind_degrades() {
        assert_eq!(
            "LambdaExpressionSubstitution".parse::<EntryKind>().unwrap(),
            EntryKind::Unknown
        );
        assert_eq!("".parse::<EntryKind>().unwrap(), EntryKind::Unknown);
    }
}
