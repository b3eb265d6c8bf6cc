use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// A set of subject codes stored as a JSON column.
///
/// Three places carry a denormalized copy of the subject-to-faculty
/// assignment: `faculty.subjects`, `faculty_profiles.profile_subjects` and
/// the free-text `subjects.faculty` pointer. The first two use this type.
/// Insert and remove keep set semantics so the reconciler can be re-run
/// without introducing duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SubjectCodes(pub Vec<String>);

impl SubjectCodes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    /// Adds a code if absent. Returns true when the set changed.
    pub fn insert(&mut self, code: &str) -> bool {
        if self.contains(code) {
            return false;
        }
        self.0.push(code.to_string());
        true
    }

    /// Removes a code if present. Returns true when the set changed.
    pub fn remove(&mut self, code: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != code);
        self.0.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for SubjectCodes {
    fn from(codes: Vec<String>) -> Self {
        let mut set = Self::new();
        for code in &codes {
            set.insert(code);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut codes = SubjectCodes::new();
        assert!(codes.insert("CS201"));
        assert!(!codes.insert("CS201"));
        assert_eq!(codes.len(), 1);
    }

    #[test]
    fn remove_only_touches_the_named_code() {
        let mut codes = SubjectCodes::from(vec!["CS201".to_string(), "CS202".to_string()]);
        assert!(codes.remove("CS201"));
        assert!(!codes.remove("CS201"));
        assert!(codes.contains("CS202"));
        assert_eq!(codes.len(), 1);
    }

    #[test]
    fn from_vec_deduplicates() {
        let codes = SubjectCodes::from(vec![
            "CS201".to_string(),
            "CS202".to_string(),
            "CS201".to_string(),
        ]);
        assert_eq!(codes.len(), 2);
    }
}
