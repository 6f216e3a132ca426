use crate::models::HistoryEntry;

/// Case-insensitive substring predicate over entry content.
///
/// An empty term matches everything.
pub fn content_contains(term: &str) -> impl Fn(&str) -> bool + '_ {
    let needle = term.to_lowercase();
    move |content: &str| content.to_lowercase().contains(&needle)
}

/// Entries whose content satisfies `predicate`, in their original order
pub fn filter_entries<'a, P>(entries: &'a [HistoryEntry], predicate: P) -> Vec<&'a HistoryEntry>
where
    P: Fn(&str) -> bool,
{
    entries.iter().filter(|entry| predicate(&entry.content)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryEntry;

    fn entries(contents: &[&str]) -> Vec<HistoryEntry> {
        contents.iter().map(|c| HistoryEntry::scanned(*c)).collect()
    }

    #[test]
    fn test_case_insensitive_match_keeps_order() {
        let entries = entries(&["abc", "ABCx", "zzz"]);
        let matched: Vec<_> =
            filter_entries(&entries, content_contains("bc")).iter().map(|e| e.content.as_str()).collect();
        assert_eq!(matched, vec!["abc", "ABCx"]);
    }

    #[test]
    fn test_uppercase_term() {
        let entries = entries(&["https://example.com", "other"]);
        assert_eq!(filter_entries(&entries, content_contains("EXAMPLE")).len(), 1);
    }

    #[test]
    fn test_empty_term_matches_all() {
        let entries = entries(&["a", "b"]);
        assert_eq!(filter_entries(&entries, content_contains("")).len(), 2);
    }

    #[test]
    fn test_unicode_case_folding() {
        let entries = entries(&["ÉCOLE", "ecole"]);
        let matched = filter_entries(&entries, content_contains("école"));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].content, "ÉCOLE");
    }

    #[test]
    fn test_custom_predicate() {
        let entries = entries(&["https://a", "plain", "http://b"]);
        let urls = filter_entries(&entries, |c| c.starts_with("http"));
        assert_eq!(urls.len(), 2);
    }
}
