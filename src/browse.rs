//! Sorting, filtering and grouping for the tag browser. The browser's
//! interactive state (search box, sort toggle) is passed in explicitly as a
//! [`TagQuery`]; nothing here holds state of its own.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::index::TagFrequency;

/// The order in which the tag browser lists tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Most used first.
    #[default]
    Frequency,

    /// Alphabetical.
    Name,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frequency" => Ok(SortMode::Frequency),
            "name" => Ok(SortMode::Name),
            other => Err(format!("unknown sort mode `{}`", other)),
        }
    }
}

/// The tag browser's view state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagQuery {
    /// Case-insensitive substring filter. Blank means "no filter".
    pub search: String,

    pub sort: SortMode,
}

/// Filters `tags` by `query.search` and orders the survivors by
/// `query.sort`.
pub fn browse(tags: &[TagFrequency], query: &TagQuery) -> Vec<TagFrequency> {
    let filtered = filter_by_search_term(tags, &query.search);
    match query.sort {
        SortMode::Frequency => sort_by_frequency(&filtered),
        SortMode::Name => sort_by_name(&filtered),
    }
}

/// Orders `tags` by count, highest first. Tags with equal counts keep their
/// relative order.
pub fn sort_by_frequency(tags: &[TagFrequency]) -> Vec<TagFrequency> {
    let mut sorted = tags.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted
}

/// Orders `tags` alphabetically. See [`collate`].
pub fn sort_by_name(tags: &[TagFrequency]) -> Vec<TagFrequency> {
    let mut sorted = tags.to_vec();
    sorted.sort_by(|a, b| collate(&a.tag, &b.tag));
    sorted
}

/// Compares two strings the way a reader expects an index to be ordered:
/// case-insensitively first, so `apple` sorts next to `Apple` rather than
/// after `Zebra`, and only then by the exact characters, lowercase first.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}

/// Returns the key `tag` is filed under in the alphabetical index: its
/// first character, uppercased. Characters without an uppercase form are
/// their own key, and some expand (`ß` is filed under `SS`).
pub fn group_key(tag: &str) -> String {
    tag.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// Groups `tags` by [`group_key`]. Members of each group are ordered by
/// [`sort_by_name`], and the groups themselves come out in key order.
pub fn group_alphabetically(tags: &[TagFrequency]) -> BTreeMap<String, Vec<TagFrequency>> {
    let mut groups: BTreeMap<String, Vec<TagFrequency>> = BTreeMap::new();
    for tag in tags {
        groups
            .entry(group_key(&tag.tag))
            .or_default()
            .push(tag.clone());
    }
    for members in groups.values_mut() {
        members.sort_by(|a, b| collate(&a.tag, &b.tag));
    }
    groups
}

/// Keeps the tags containing `query`, ignoring case. A blank query keeps
/// everything.
pub fn filter_by_search_term(tags: &[TagFrequency], query: &str) -> Vec<TagFrequency> {
    if query.trim().is_empty() {
        return tags.to_vec();
    }
    let query = query.to_lowercase();
    tags.iter()
        .filter(|t| t.tag.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn tags(pairs: &[(&str, u32)]) -> Vec<TagFrequency> {
        pairs
            .iter()
            .map(|(tag, count)| TagFrequency::new(*tag, *count))
            .collect()
    }

    fn names(tags: &[TagFrequency]) -> Vec<&str> {
        tags.iter().map(|t| t.tag.as_str()).collect()
    }

    #[test]
    fn test_sort_by_frequency_is_stable() {
        let input = tags(&[("b", 1), ("a", 3), ("c", 1), ("d", 3)]);
        assert_eq!(vec!["a", "d", "b", "c"], names(&sort_by_frequency(&input)));
    }

    #[test]
    fn test_sort_by_name_ignores_case_first() {
        let input = tags(&[("Zebra", 1), ("apple", 1), ("Apple", 1), ("banana", 1)]);
        assert_eq!(
            vec!["apple", "Apple", "banana", "Zebra"],
            names(&sort_by_name(&input))
        );
    }

    #[test]
    fn test_group_alphabetically() {
        let input = tags(&[("rust", 4), ("Go", 2), ("react", 3), ("go-kit", 1), ("数据", 1)]);
        let groups = group_alphabetically(&input);

        assert_eq!(vec!["G", "R", "数"], groups.keys().collect::<Vec<_>>());
        assert_eq!(vec!["Go", "go-kit"], names(&groups["G"]));
        assert_eq!(vec!["react", "rust"], names(&groups["R"]));
        assert_eq!(vec!["数据"], names(&groups["数"]));
    }

    #[test]
    fn test_group_key() {
        assert_eq!("A", group_key("apple"));
        assert_eq!("SS", group_key("ßtraße"));
        assert_eq!("1", group_key("1password"));
        assert_eq!("", group_key(""));
    }

    #[test]
    fn test_filter_by_search_term() {
        let input = tags(&[("Rust", 2), ("trust", 1), ("go", 5)]);
        assert_eq!(vec!["Rust", "trust"], names(&filter_by_search_term(&input, "RUST")));
        assert_eq!(input, filter_by_search_term(&input, ""));
        assert_eq!(input, filter_by_search_term(&input, "   "));
        assert!(filter_by_search_term(&input, "python").is_empty());
    }

    #[test]
    fn test_browse() {
        let input = tags(&[("rust", 2), ("trust", 5), ("go", 9)]);
        let by_frequency = TagQuery {
            search: "rust".to_owned(),
            sort: SortMode::Frequency,
        };
        assert_eq!(vec!["trust", "rust"], names(&browse(&input, &by_frequency)));

        let by_name = TagQuery {
            search: String::new(),
            sort: SortMode::Name,
        };
        assert_eq!(vec!["go", "rust", "trust"], names(&browse(&input, &by_name)));
    }

    #[test]
    fn test_sort_mode_from_str() {
        assert_eq!(Ok(SortMode::Name), "name".parse::<SortMode>());
        assert!("size".parse::<SortMode>().is_err());
    }
}
