use serde::{Deserialize, Serialize};
use std::fmt;

/// Case and surrounding-whitespace insensitive exercise identifier.
pub fn normalize_exercise_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Unit of write serialization: every aggregate of one user in one category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeKey {
    pub user_id: String,
    pub category_id: String,
}

impl ScopeKey {
    pub fn new(user_id: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            category_id: category_id.into(),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.category_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AggregateKey {
    pub user_id: String,
    pub category_id: String,
    pub normalized_name: String,
}

impl AggregateKey {
    pub fn new(scope: &ScopeKey, exercise_name: &str) -> Self {
        Self {
            user_id: scope.user_id.clone(),
            category_id: scope.category_id.clone(),
            normalized_name: normalize_exercise_name(exercise_name),
        }
    }

    pub fn scope(&self) -> ScopeKey {
        ScopeKey::new(self.user_id.clone(), self.category_id.clone())
    }
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.user_id, self.category_id, self.normalized_name
        )
    }
}

#[cfg(test)]
mod exercise_key_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Pull-ups", "pull-ups")]
    #[case("  Pull-Ups ", "pull-ups")]
    #[case("PULL-UPS\n", "pull-ups")]
    #[case("", "")]
    fn it_should_normalize_case_and_surrounding_whitespace(
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(normalize_exercise_name(name), expected);
    }

    #[rstest]
    fn it_should_keep_inner_whitespace() {
        assert_eq!(normalize_exercise_name(" Bench  Press "), "bench  press");
    }

    #[rstest]
    fn it_should_build_the_same_key_for_name_variants() {
        let scope = ScopeKey::new("user-1", "category-1");
        assert_eq!(
            AggregateKey::new(&scope, "Squats"),
            AggregateKey::new(&scope, " squats")
        );
        assert_eq!(AggregateKey::new(&scope, "Squats").scope(), scope);
    }
}
