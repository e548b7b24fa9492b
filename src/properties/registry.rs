//! Alias -> resolver kind lookup.
//!
//! The registry is a plain map built once at startup from the built-in aliases
//! and any extra aliases from configuration. Lookups are case-insensitive.

use std::collections::HashMap;
use strsim::levenshtein;

use super::{Resolver, ResolverKind};
use crate::core::ImportError;

/// Maximum Levenshtein distance, as a percentage of the alias length, for a
/// registered alias to be offered as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Built-in aliases and the kinds they select.
const BUILTIN_ALIASES: &[(&str, ResolverKind)] = &[
    ("text", ResolverKind::Text),
    ("string", ResolverKind::Text),
    ("bool", ResolverKind::Boolean),
    ("boolean", ResolverKind::Boolean),
    ("int", ResolverKind::Integer),
    ("integer", ResolverKind::Integer),
    ("decimal", ResolverKind::Decimal),
    ("number", ResolverKind::Decimal),
    ("date", ResolverKind::Date),
    ("datetime", ResolverKind::Date),
    ("list", ResolverKind::List),
    ("legacypicker", ResolverKind::LegacyPicker),
    ("legacycontentpicker", ResolverKind::LegacyPicker),
    ("legacymediapicker", ResolverKind::LegacyPicker),
];

/// Case-insensitive alias table.
#[derive(Debug, Clone)]
pub struct ResolverRegistry {
    aliases: HashMap<String, ResolverKind>,
}

impl ResolverRegistry {
    /// A registry holding only the built-in aliases.
    #[must_use]
    pub fn new() -> Self {
        let aliases = BUILTIN_ALIASES.iter().map(|(alias, kind)| ((*alias).to_string(), *kind)).collect();
        Self {
            aliases,
        }
    }

    /// A registry with the built-ins plus `extra` (`alias -> existing alias`).
    ///
    /// Each target must already be registered; extra aliases may not chain
    /// through one another.
    pub fn with_aliases<'a>(
        extra: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Result<Self, ImportError> {
        let mut registry = Self::new();
        let builtins = registry.clone();

        for (alias, target) in extra {
            let kind = builtins.kind_for(target).ok_or_else(|| ImportError::ConfigError {
                message: format!("alias '{alias}' maps to unknown resolver '{target}'"),
            })?;
            registry.register(alias, kind)?;
        }

        Ok(registry)
    }

    /// Register `alias` for `kind`. Re-registering an alias for the same kind
    /// is a no-op; for a different kind it is a configuration error.
    pub fn register(&mut self, alias: &str, kind: ResolverKind) -> Result<(), ImportError> {
        let key = alias.trim().to_lowercase();
        if key.is_empty() {
            return Err(ImportError::ConfigError {
                message: "resolver alias must not be empty".to_string(),
            });
        }

        match self.aliases.get(&key) {
            Some(existing) if *existing != kind => Err(ImportError::ConfigError {
                message: format!("alias '{alias}' is already registered for '{existing}'"),
            }),
            Some(_) => Ok(()),
            None => {
                tracing::debug!("Registered resolver alias '{}' -> {}", key, kind);
                self.aliases.insert(key, kind);
                Ok(())
            }
        }
    }

    /// Look up the kind for `alias`, if registered.
    #[must_use]
    pub fn kind_for(&self, alias: &str) -> Option<ResolverKind> {
        self.aliases.get(&alias.trim().to_lowercase()).copied()
    }

    /// Build the resolver for a column's alias and alias-level parameter.
    ///
    /// Unknown aliases fail with [`ImportError::UnknownResolver`], carrying the
    /// closest registered alias when one is similar enough.
    pub fn resolve(&self, alias: &str, parameter: Option<String>) -> Result<Resolver, ImportError> {
        self.kind_for(alias).map(|kind| Resolver::new(kind, parameter)).ok_or_else(|| {
            ImportError::UnknownResolver {
                alias: alias.to_string(),
                suggestion: self.suggest(alias),
            }
        })
    }

    /// Registered aliases, sorted.
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.aliases.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    fn suggest(&self, alias: &str) -> Option<String> {
        let target = alias.trim().to_lowercase();
        let limit = target.len() * SIMILARITY_THRESHOLD_PERCENT / 100;

        self.aliases()
            .into_iter()
            .map(|candidate| (candidate, levenshtein(&target, candidate)))
            .filter(|(_, distance)| *distance <= limit)
            .min_by_key(|(_, distance)| *distance)
            .map(|(candidate, _)| candidate.to_string())
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        let registry = ResolverRegistry::new();
        assert_eq!(registry.kind_for("legacyContentPicker"), Some(ResolverKind::LegacyPicker));
        assert_eq!(registry.kind_for(" TEXT "), Some(ResolverKind::Text));
        assert_eq!(registry.kind_for("DateTime"), Some(ResolverKind::Date));
        assert_eq!(registry.kind_for("image"), None);
    }

    #[test]
    fn test_every_kind_is_reachable_by_its_alias() {
        let registry = ResolverRegistry::new();
        for kind in ResolverKind::ALL {
            assert_eq!(registry.kind_for(kind.alias()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_alias_suggests_close_match() {
        let registry = ResolverRegistry::new();
        let err = registry.resolve("boolen", None).unwrap_err();
        match err {
            ImportError::UnknownResolver { alias, suggestion } => {
                assert_eq!(alias, "boolen");
                assert_eq!(suggestion.as_deref(), Some("boolean"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = registry.resolve("zzzzzzzz", None).unwrap_err();
        assert!(matches!(err, ImportError::UnknownResolver { suggestion: None, .. }));
    }

    #[test]
    fn test_config_aliases() {
        let extra: HashMap<String, String> = [
            ("heroImage".to_string(), "legacyMediaPicker".to_string()),
            ("Summary".to_string(), "text".to_string()),
        ]
        .into_iter()
        .collect();
        let registry = ResolverRegistry::with_aliases(&extra).unwrap();
        assert_eq!(registry.kind_for("heroimage"), Some(ResolverKind::LegacyPicker));
        assert_eq!(registry.kind_for("summary"), Some(ResolverKind::Text));
    }

    #[test]
    fn test_config_alias_to_unknown_target_fails() {
        let extra: HashMap<String, String> =
            [("hero".to_string(), "imageCropper".to_string())].into_iter().collect();
        let err = ResolverRegistry::with_aliases(&extra).unwrap_err();
        assert!(err.to_string().contains("imageCropper"));
    }

    #[test]
    fn test_conflicting_registration_fails() {
        let mut registry = ResolverRegistry::new();
        assert!(registry.register("text", ResolverKind::Text).is_ok());
        assert!(registry.register("text", ResolverKind::Integer).is_err());
        assert!(registry.register("  ", ResolverKind::Text).is_err());
    }

    #[test]
    fn test_resolve_keeps_parameter() {
        let registry = ResolverRegistry::new();
        let resolver = registry.resolve("list", Some(";".to_string())).unwrap();
        assert_eq!(resolver.kind, ResolverKind::List);
        assert_eq!(resolver.parameter.as_deref(), Some(";"));
    }
}
