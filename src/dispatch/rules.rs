//! Rule table module
//!
//! Ordered `(PathMatch, Action)` pairs evaluated first-match-wins.
//! Exact rules are listed before the prefix rule they overlap with.

use crate::config::RoutesConfig;

/// Path matching condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// Whole path equals the value
    Exact(String),
    /// Path starts with the value
    Prefix(String),
}

impl PathMatch {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// Synthetic response produced by a matched rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `200 ok\n`
    Health,
    /// `200 {"sha": ...}`
    Version,
    /// `404 {"error":"not_found"}`
    ApiNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub path: PathMatch,
    pub action: Action,
}

/// Ordered rule table; a path matching no rule goes to the asset backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Health and version exact matches, then the API catch-all
    pub fn from_config(routes: &RoutesConfig) -> Self {
        Self::new(vec![
            Rule {
                path: PathMatch::Exact(routes.health_path.clone()),
                action: Action::Health,
            },
            Rule {
                path: PathMatch::Exact(routes.version_path.clone()),
                action: Action::Version,
            },
            Rule {
                path: PathMatch::Prefix(routes.api_prefix.clone()),
                action: Action::ApiNotFound,
            },
        ])
    }

    /// Find the action of the first rule matching `path`
    pub fn resolve(&self, path: &str) -> Option<Action> {
        self.rules
            .iter()
            .find(|rule| rule.path.matches(path))
            .map(|rule| rule.action)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_config(&RoutesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_exact() {
        let rule = PathMatch::Exact("/api/healthz".to_string());
        assert!(rule.matches("/api/healthz"));
        assert!(!rule.matches("/api/healthz/"));
        assert!(!rule.matches("/api/healthz/extra"));
        assert!(!rule.matches("/api/health"));
    }

    #[test]
    fn test_match_prefix() {
        let rule = PathMatch::Prefix("/api/".to_string());
        assert!(rule.matches("/api/"));
        assert!(rule.matches("/api/users"));
        assert!(rule.matches("/api/v1/users"));
        assert!(!rule.matches("/api"));
        assert!(!rule.matches("/apiary"));
        assert!(!rule.matches("/docs/api/"));
    }

    #[test]
    fn test_default_order() {
        let expected = RuleSet::new(vec![
            Rule {
                path: PathMatch::Exact("/api/healthz".to_string()),
                action: Action::Health,
            },
            Rule {
                path: PathMatch::Exact("/api/version".to_string()),
                action: Action::Version,
            },
            Rule {
                path: PathMatch::Prefix("/api/".to_string()),
                action: Action::ApiNotFound,
            },
        ]);
        assert_eq!(RuleSet::default(), expected);
    }

    #[test]
    fn test_resolve() {
        let rules = RuleSet::default();
        assert_eq!(rules.resolve("/api/healthz"), Some(Action::Health));
        assert_eq!(rules.resolve("/api/version"), Some(Action::Version));
        assert_eq!(rules.resolve("/api/unknown-thing"), Some(Action::ApiNotFound));
        assert_eq!(rules.resolve("/api/healthz/extra"), Some(Action::ApiNotFound));
        assert_eq!(rules.resolve("/api/version.json"), Some(Action::ApiNotFound));
        assert_eq!(rules.resolve("/docs/getting-started"), None);
        assert_eq!(rules.resolve("/"), None);
    }

    #[test]
    fn test_prefix_first_shadows_exact() {
        // Order is the contract: a prefix rule placed first wins
        let rules = RuleSet::new(vec![
            Rule {
                path: PathMatch::Prefix("/api/".to_string()),
                action: Action::ApiNotFound,
            },
            Rule {
                path: PathMatch::Exact("/api/healthz".to_string()),
                action: Action::Health,
            },
        ]);
        assert_eq!(rules.resolve("/api/healthz"), Some(Action::ApiNotFound));
    }

    #[test]
    fn test_custom_paths() {
        let rules = RuleSet::from_config(&RoutesConfig {
            health_path: "/_edge/ping".to_string(),
            version_path: "/_edge/build".to_string(),
            api_prefix: "/_edge/".to_string(),
        });
        assert_eq!(rules.resolve("/_edge/ping"), Some(Action::Health));
        assert_eq!(rules.resolve("/_edge/build"), Some(Action::Version));
        assert_eq!(rules.resolve("/_edge/other"), Some(Action::ApiNotFound));
        assert_eq!(rules.resolve("/api/healthz"), None);
    }
}
