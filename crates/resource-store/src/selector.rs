//! Equality-based label selectors
//!
//! A selector is a set of `key=value` requirements over a resource's label
//! map. A resource matches when every requirement is satisfied; an empty
//! selector matches everything.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: BTreeMap<String, String>,
}

impl LabelSelector {
    /// Selector matching every resource
    pub fn everything() -> Self {
        Self::default()
    }

    /// Selector with a single `key=value` requirement
    pub fn eq(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::everything().and(key, value)
    }

    /// Adds a `key=value` requirement, replacing any previous value for `key`
    pub fn and(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// True when every requirement is present in `labels` with the same value
    pub fn matches(&self, labels: Option<&BTreeMap<String, String>>) -> bool {
        self.requirements.iter().all(|(key, value)| {
            labels
                .and_then(|labels| labels.get(key))
                .is_some_and(|actual| actual == value)
        })
    }

    /// Renders the selector in the API server query syntax (`k1=v1,k2=v2`)
    pub fn to_query(&self) -> String {
        self.requirements
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<BTreeMap<String, String>> for LabelSelector {
    fn from(requirements: BTreeMap<String, String>) -> Self {
        Self { requirements }
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("<everything>")
        } else {
            f.write_str(&self.to_query())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = LabelSelector::everything();
        assert!(selector.matches(None));
        assert!(selector.matches(Some(&labels(&[("a", "b")]))));
    }

    #[test]
    fn test_selector_requires_every_pair() {
        let selector = LabelSelector::eq("binding", "orders").and("k8s-app", "monitoring");

        assert!(selector.matches(Some(&labels(&[
            ("binding", "orders"),
            ("k8s-app", "monitoring"),
            ("extra", "ignored"),
        ]))));
        assert!(!selector.matches(Some(&labels(&[("binding", "orders")]))));
        assert!(!selector.matches(Some(&labels(&[
            ("binding", "billing"),
            ("k8s-app", "monitoring"),
        ]))));
        assert!(!selector.matches(None));
    }

    #[test]
    fn test_query_is_sorted_by_key() {
        let selector = LabelSelector::eq("z", "1").and("a", "2");
        assert_eq!(selector.to_query(), "a=2,z=1");
        assert_eq!(selector.to_string(), "a=2,z=1");
        assert_eq!(LabelSelector::everything().to_string(), "<everything>");
    }
}
