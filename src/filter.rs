//! Topic/ISBN selection of book records.

use crate::sheet::BookRecord;

/// Equality filters applied to every record; unset filters match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub topic: Option<String>,
    pub isbn: Option<String>,
}

impl FilterCriteria {
    /// Build criteria from optional CLI values. Empty strings count as unset.
    pub fn new(topic: Option<String>, isbn: Option<String>) -> Self {
        Self {
            topic: topic.filter(|t| !t.is_empty()),
            isbn: isbn.filter(|i| !i.is_empty()),
        }
    }

    /// Exact, case-sensitive match on every filter that is set.
    pub fn matches(&self, topic: &str, isbn: &str) -> bool {
        self.topic.as_deref().map_or(true, |t| t == topic)
            && self.isbn.as_deref().map_or(true, |i| i == isbn)
    }

    pub fn matches_record(&self, record: &BookRecord) -> bool {
        self.matches(&record.topic, &record.isbn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_match_everything() {
        let criteria = FilterCriteria::default();
        assert!(criteria.matches("Math", "123"));
        assert!(criteria.matches("", ""));
    }

    #[test]
    fn test_topic_is_exact() {
        let criteria = FilterCriteria::new(Some("Math".to_string()), None);
        assert!(criteria.matches("Math", "1"));
        assert!(!criteria.matches("math", "1"));
        assert!(!criteria.matches("Mathematics", "1"));
    }

    #[test]
    fn test_topic_and_isbn_both_required() {
        let criteria = FilterCriteria::new(Some("Math".to_string()), Some("978-1".to_string()));
        assert!(criteria.matches("Math", "978-1"));
        assert!(!criteria.matches("Math", "978-2"));
        assert!(!criteria.matches("Physics", "978-1"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let criteria = FilterCriteria::new(Some(String::new()), Some(String::new()));
        assert_eq!(criteria, FilterCriteria::default());
    }
}
