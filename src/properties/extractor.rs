//! Phase 1 of deferred resolution: which legacy IDs does a value depend on?

use super::{Mode, ParameterizedValue, Resolver, ResolverKind};
use crate::cache::normalize_key;
use crate::constants::DEFAULT_REFERENCE_SEPARATOR;

/// Parameter that limits a picker to its first reference.
pub const SINGLE_PARAMETER: &str = "single";

/// Splits deferred cell values into the legacy IDs they reference.
///
/// Pure and side-effect free; called once per property while a batch is being
/// prepared, before it is sorted.
#[derive(Debug, Clone)]
pub struct DependencyExtractor {
    separator: String,
}

impl DependencyExtractor {
    /// An extractor splitting on `separator`. A blank separator falls back to
    /// the default `,`.
    #[must_use]
    pub fn new(separator: impl Into<String>) -> Self {
        let separator = separator.into();
        Self {
            separator: if separator.is_empty() {
                DEFAULT_REFERENCE_SEPARATOR.to_string()
            } else {
                separator
            },
        }
    }

    /// The separator between references.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Legacy IDs `raw` depends on under `resolver`.
    ///
    /// Returns an empty list for immediate resolvers. For pickers the result
    /// keeps first-seen order, drops blanks and case-insensitive repeats, and
    /// holds at most one entry when the effective parameter is `single`.
    #[must_use]
    pub fn extract(&self, resolver: &Resolver, raw: &ParameterizedValue) -> Vec<String> {
        if resolver.mode() != Mode::Deferred {
            return Vec::new();
        }

        match resolver.kind {
            ResolverKind::LegacyPicker => {
                let single = is_single(resolver.effective_parameter(raw));
                let mut seen = std::collections::HashSet::new();
                let mut references = Vec::new();

                for reference in raw.value.split(self.separator.as_str()).map(str::trim) {
                    let Some(normalized) = normalize_key(reference) else {
                        continue;
                    };
                    if seen.insert(normalized) {
                        references.push(reference.to_string());
                        if single {
                            break;
                        }
                    }
                }

                references
            }
            _ => Vec::new(),
        }
    }
}

impl Default for DependencyExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_SEPARATOR)
    }
}

impl Resolver {
    /// Phase 1 of the deferred protocol for this resolver.
    ///
    /// See [`DependencyExtractor::extract`].
    #[must_use]
    pub fn extract_dependencies(&self, raw: &ParameterizedValue, extractor: &DependencyExtractor) -> Vec<String> {
        extractor.extract(self, raw)
    }
}

pub(crate) fn is_single(parameter: Option<&str>) -> bool {
    parameter.is_some_and(|p| p.trim().eq_ignore_ascii_case(SINGLE_PARAMETER))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker(parameter: Option<&str>) -> Resolver {
        Resolver::new(ResolverKind::LegacyPicker, parameter.map(str::to_string))
    }

    #[test]
    fn test_immediate_resolvers_have_no_dependencies() {
        let extractor = DependencyExtractor::default();
        let text = Resolver::new(ResolverKind::Text, None);
        assert!(extractor.extract(&text, &ParameterizedValue::plain("1,2,3")).is_empty());
    }

    #[test]
    fn test_picker_splits_trims_and_dedupes() {
        let extractor = DependencyExtractor::default();
        let resolver = picker(None);
        let raw = resolver.wrap(" 7, 8 ,, a ,A,7");
        assert_eq!(extractor.extract(&resolver, &raw), vec!["7", "8", "a"]);
    }

    #[test]
    fn test_single_parameter_keeps_first() {
        let extractor = DependencyExtractor::default();
        let resolver = picker(Some("single"));
        assert_eq!(extractor.extract(&resolver, &resolver.wrap("9,10")), vec!["9"]);

        // value-level parameter applies even without a header parameter
        let resolver = picker(None);
        assert_eq!(extractor.extract(&resolver, &resolver.wrap(",4,5|SINGLE")), vec!["4"]);
    }

    #[test]
    fn test_custom_separator() {
        let extractor = DependencyExtractor::new(";");
        let resolver = picker(None);
        assert_eq!(resolver.extract_dependencies(&resolver.wrap("x;y"), &extractor), vec!["x", "y"]);
        assert_eq!(DependencyExtractor::new("").separator(), ",");
    }

    #[test]
    fn test_blank_value_has_no_dependencies() {
        let extractor = DependencyExtractor::default();
        let resolver = picker(None);
        assert!(extractor.extract(&resolver, &resolver.wrap("  ")).is_empty());
    }
}
