//! Property resolution: turning raw cell values into final property values.
//!
//! Every property column names a resolver alias. The alias maps, through the
//! [`ResolverRegistry`], to a [`ResolverKind`]; each kind is either
//! [`Mode::Immediate`] (its value is final as soon as the cell is read) or
//! [`Mode::Deferred`] (its value refers to other items in the batch by legacy ID
//! and can only be finalized after those items have been created).
//!
//! Deferred resolvers follow a two-phase protocol:
//!
//! 1. **Extraction** ([`Resolver::extract_dependencies`]) runs before the batch is
//!    sorted and reports which legacy IDs a value depends on.
//! 2. **Deferred resolution** ([`Resolver::resolve_deferred`]) runs when the item
//!    reaches its turn in the sorted order, after every dependency was created
//!    and registered in the legacy-ID cache.
//!
//! # Modules
//!
//! - [`parameter`] - column header and `value|parameter` splitting
//! - [`registry`] - alias -> kind lookup
//! - [`immediate`] - conversions for immediate kinds
//! - [`extractor`] - phase 1 for deferred kinds
//! - [`deferred`] - phase 2 for deferred kinds

pub mod deferred;
pub mod extractor;
pub mod immediate;
pub mod parameter;
pub mod registry;

pub use deferred::DeferredOutcome;
pub use extractor::DependencyExtractor;
pub use parameter::{ColumnSpec, ParameterizedValue};
pub use registry::ResolverRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;

/// When a resolver's value becomes final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Final at extraction time.
    Immediate,
    /// Final only after the referenced items exist.
    Deferred,
}

/// The closed set of built-in property resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolverKind {
    /// Raw string, unchanged.
    Text,
    /// `true/yes/y/on/1` or `false/no/n/off/0/""`.
    Boolean,
    /// Signed 64-bit integer.
    Integer,
    /// Floating point number.
    Decimal,
    /// Date or date-time; the parameter is a chrono format string.
    Date,
    /// Delimited list; the parameter is the delimiter.
    List,
    /// References to other batch items by legacy ID; the parameter `single`
    /// keeps only the first reference.
    LegacyPicker,
}

impl ResolverKind {
    /// Every built-in kind.
    pub const ALL: [Self; 7] = [
        Self::Text,
        Self::Boolean,
        Self::Integer,
        Self::Decimal,
        Self::Date,
        Self::List,
        Self::LegacyPicker,
    ];

    /// Whether values of this kind are final immediately or deferred.
    #[must_use]
    pub const fn mode(self) -> Mode {
        match self {
            Self::LegacyPicker => Mode::Deferred,
            _ => Mode::Immediate,
        }
    }

    /// Whether this kind understands an inline parameter.
    ///
    /// Only these kinds have a trailing `|parameter` split off their cell values;
    /// for the others a `|` is ordinary content.
    #[must_use]
    pub const fn accepts_parameter(self) -> bool {
        matches!(self, Self::Date | Self::List | Self::LegacyPicker)
    }

    /// The primary alias for this kind.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::List => "list",
            Self::LegacyPicker => "legacyPicker",
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

/// A resolver kind bound to its alias-level parameter.
///
/// This is the single resolver type: the kind's [`Mode`] decides which of the
/// immediate or deferred operations apply, and the alias-level parameter is
/// threaded through every call instead of being wrapped around the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolver {
    /// Which conversion to apply.
    pub kind: ResolverKind,
    /// Parameter from the column header (`alias:parameter`), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl Resolver {
    /// Bind a kind to an optional alias-level parameter.
    #[must_use]
    pub fn new(kind: ResolverKind, parameter: Option<String>) -> Self {
        Self {
            kind,
            parameter,
        }
    }

    /// Shorthand for [`ResolverKind::mode`].
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.kind.mode()
    }

    /// Split a raw cell into value and value-level parameter for this kind.
    #[must_use]
    pub fn wrap(&self, raw: &str) -> ParameterizedValue {
        ParameterizedValue::split(raw, self.kind.accepts_parameter())
    }

    /// The parameter in effect for `value`: value-level wins over alias-level.
    #[must_use]
    pub fn effective_parameter<'a>(&'a self, value: &'a ParameterizedValue) -> Option<&'a str> {
        value.effective_parameter(self.parameter.as_deref())
    }
}

impl fmt::Display for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parameter {
            Some(parameter) => write!(f, "{}:{}", self.kind, parameter),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_picker_is_deferred() {
        for kind in ResolverKind::ALL {
            let expected = if kind == ResolverKind::LegacyPicker {
                Mode::Deferred
            } else {
                Mode::Immediate
            };
            assert_eq!(kind.mode(), expected, "{kind}");
        }
    }

    #[test]
    fn test_wrap_respects_parameter_support() {
        let text = Resolver::new(ResolverKind::Text, None);
        let wrapped = text.wrap("a|b");
        assert_eq!(wrapped.value, "a|b");
        assert_eq!(wrapped.parameter, None);

        let picker = Resolver::new(ResolverKind::LegacyPicker, Some("all".to_string()));
        let wrapped = picker.wrap("7,8|single");
        assert_eq!(wrapped.value, "7,8");
        assert_eq!(picker.effective_parameter(&wrapped), Some("single"));
    }

    #[test]
    fn test_display_includes_parameter() {
        assert_eq!(Resolver::new(ResolverKind::Date, Some("%d/%m/%Y".into())).to_string(), "date:%d/%m/%Y");
        assert_eq!(Resolver::new(ResolverKind::Text, None).to_string(), "text");
    }
}
