//! Pure matching over a candidate snapshot.

use crate::source::SessionRecord;

/// Keep records carrying every tag in `tags`. An empty set keeps everything.
pub fn filter_by_tags(records: Vec<SessionRecord>, tags: &[String]) -> Vec<SessionRecord> {
    if tags.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| tags.iter().all(|tag| record.has_tag(tag)))
        .collect()
}

/// Keep records whose name, host, username or item name contains `search`,
/// ignoring case. An empty term keeps everything.
pub fn filter_by_search(records: Vec<SessionRecord>, search: &str) -> Vec<SessionRecord> {
    let needle = search.to_lowercase();
    if needle.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| matches_search(record, &needle))
        .collect()
}

fn matches_search(record: &SessionRecord, needle: &str) -> bool {
    [&record.name, &record.host, &record.username, &record.item_name]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<SessionRecord> {
        vec![
            SessionRecord::new("prod-eu", "https://eu.cumulocity.com", "alice", "p1").with_tags(["c8y", "prod"]),
            SessionRecord::new("dev", "https://dev.example.com", "bob", "p2").with_tags(["c8y"]),
            SessionRecord::new("mail", "https://mail.example.com", "carol", "p3").with_tags(["other"]),
        ]
    }

    fn names(records: &[SessionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_tags_match_all() {
        assert_eq!(filter_by_tags(records(), &[]).len(), 3);
    }

    #[test]
    fn test_tags_are_conjunctive() {
        let tags = vec!["c8y".to_string(), "prod".to_string()];
        assert_eq!(names(&filter_by_tags(records(), &tags)), ["prod-eu"]);

        let tags = vec!["c8y".to_string()];
        assert_eq!(names(&filter_by_tags(records(), &tags)), ["prod-eu", "dev"]);
    }

    #[test]
    fn test_tags_ignore_case() {
        let tags = vec!["PROD".to_string()];
        assert_eq!(names(&filter_by_tags(records(), &tags)), ["prod-eu"]);
    }

    #[test]
    fn test_unknown_tag_matches_nothing() {
        let tags = vec!["c8y".to_string(), "missing".to_string()];
        assert!(filter_by_tags(records(), &tags).is_empty());
    }

    #[test]
    fn test_search_fields() {
        assert_eq!(names(&filter_by_search(records(), "PROD")), ["prod-eu"]);
        assert_eq!(names(&filter_by_search(records(), "cumulocity")), ["prod-eu"]);
        assert_eq!(names(&filter_by_search(records(), "Bob")), ["dev"]);
        assert_eq!(names(&filter_by_search(records(), "example")), ["dev", "mail"]);
    }

    #[test]
    fn test_search_item_name() {
        let mut record = SessionRecord::new("Tenant (Staging)", "https://s.example.com", "u", "p");
        record.item_name = "Customer Portal".to_string();

        assert_eq!(filter_by_search(vec![record], "portal").len(), 1);
    }

    #[test]
    fn test_empty_search_matches_all() {
        assert_eq!(filter_by_search(records(), "").len(), 3);
    }

    #[test]
    fn test_search_is_not_trimmed() {
        assert!(filter_by_search(records(), "dev ").is_empty());
        assert!(filter_by_search(records(), " example").is_empty());
        assert_eq!(names(&filter_by_search(records(), "dev")), ["dev"]);
    }
}
