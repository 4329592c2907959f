//! Frequency statistics over a document collection: how often each tag and
//! category is used, and which display label each routing key renders as.
//!
//! "First wins" rules below are relative to the order of the input slice.
//! [`crate::parser::Parser::parse_documents`] sorts documents newest first
//! (ties broken by id), so for parsed collections the newest document that
//! carries a label decides it.

use std::collections::{BTreeMap, HashMap};

use crate::document::Document;

/// The number of occurrences of a single tag across a document collection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TagFrequency {
    pub tag: String,
    pub count: u32,
}

impl TagFrequency {
    pub fn new(tag: impl Into<String>, count: u32) -> TagFrequency {
        TagFrequency {
            tag: tag.into(),
            count,
        }
    }
}

/// The number of documents filed under a single category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryFrequency {
    pub category: String,
    pub count: u32,
}

/// Aggregate numbers shown above the tag browser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagStats {
    /// The number of distinct tags.
    pub total_tags: usize,

    /// The sum of all tag counts, i.e., the number of tag references across
    /// all documents.
    pub total_references: u64,
}

impl TagStats {
    pub fn of(frequencies: &[TagFrequency]) -> TagStats {
        TagStats {
            total_tags: frequencies.len(),
            total_references: frequencies.iter().map(|f| u64::from(f.count)).sum(),
        }
    }
}

/// Counts tag occurrences across `documents`. Every entry of every
/// document's `tags` increments the count of that (case-sensitive) tag, so a
/// tag repeated within one document counts once per repetition.
///
/// The result is ordered by count, highest first. Tags with equal counts are
/// ordered by tag, ascending.
pub fn tag_frequencies(documents: &[Document]) -> Vec<TagFrequency> {
    count_sorted(
        documents
            .iter()
            .flat_map(|d| d.tags.iter().map(String::as_str)),
    )
    .into_iter()
    .map(|(tag, count)| TagFrequency { tag, count })
    .collect()
}

/// Like [`tag_frequencies`], restricted to the documents filed under
/// `category`. This feeds the per-category tag cloud.
pub fn tag_frequencies_within(documents: &[Document], category: &str) -> Vec<TagFrequency> {
    count_sorted(
        documents
            .iter()
            .filter(|d| d.in_category(category))
            .flat_map(|d| d.tags.iter().map(String::as_str)),
    )
    .into_iter()
    .map(|(tag, count)| TagFrequency { tag, count })
    .collect()
}

/// Counts documents per (non-empty) category, using the same ordering as
/// [`tag_frequencies`].
pub fn category_frequencies(documents: &[Document]) -> Vec<CategoryFrequency> {
    count_sorted(
        documents
            .iter()
            .filter_map(|d| d.category.as_deref())
            .filter(|c| !c.is_empty()),
    )
    .into_iter()
    .map(|(category, count)| CategoryFrequency { category, count })
    .collect()
}

fn count_sorted<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, u32)> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, u32)> = counts
        .into_iter()
        .map(|(key, count)| (key.to_owned(), count))
        .collect();
    sorted.sort_by(|(a, a_count), (b, b_count)| b_count.cmp(a_count).then_with(|| a.cmp(b)));
    sorted
}

/// Maps each category key to its display label. The first non-empty
/// `category_display` seen for a key wins; keys that never carry one map to
/// themselves.
pub fn category_display_map(documents: &[Document]) -> BTreeMap<String, String> {
    first_labels(documents.iter().filter_map(|d| {
        let category = d.category.as_deref().filter(|c| !c.is_empty())?;
        Some((category, d.category_display.as_deref()))
    }))
}

/// Maps each tag to its display label. The first non-empty positional
/// `tags_display` entry seen for a tag wins; tags that never carry one map to
/// themselves.
pub fn tag_display_map(documents: &[Document]) -> BTreeMap<String, String> {
    tag_display_map_of(documents.iter())
}

fn tag_display_map_of<'a>(documents: impl Iterator<Item = &'a Document>) -> BTreeMap<String, String> {
    first_labels(documents.flat_map(|d| {
        d.tags
            .iter()
            .enumerate()
            .map(move |(i, tag)| (tag.as_str(), d.tags_display.get(i).map(String::as_str)))
    }))
}

/// Like [`tag_display_map`], restricted to the documents filed under
/// `category`. A category page labels its tags from its own documents.
pub fn tag_display_map_within(documents: &[Document], category: &str) -> BTreeMap<String, String> {
    tag_display_map_of(documents.iter().filter(|d| d.in_category(category)))
}

fn first_labels<'a>(
    pairs: impl Iterator<Item = (&'a str, Option<&'a str>)>,
) -> BTreeMap<String, String> {
    // Keys seen so far and whether their label came from an explicit display
    // value (as opposed to the key fallback).
    let mut labels: BTreeMap<String, (String, bool)> = BTreeMap::new();
    for (key, display) in pairs {
        let display = display.filter(|d| !d.is_empty());
        match labels.get_mut(key) {
            None => {
                labels.insert(
                    key.to_owned(),
                    match display {
                        Some(d) => (d.to_owned(), true),
                        None => (key.to_owned(), false),
                    },
                );
            }
            Some(entry) => {
                if let (false, Some(d)) = (entry.1, display) {
                    *entry = (d.to_owned(), true);
                }
            }
        }
    }
    labels
        .into_iter()
        .map(|(key, (label, _))| (key, label))
        .collect()
}

/// Returns the documents carrying `tag`, preserving input order.
pub fn documents_tagged<'a>(documents: &'a [Document], tag: &str) -> Vec<&'a Document> {
    documents.iter().filter(|d| d.has_tag(tag)).collect()
}

/// Returns the documents filed under `category`, preserving input order.
pub fn documents_in_category<'a>(documents: &'a [Document], category: &str) -> Vec<&'a Document> {
    documents.iter().filter(|d| d.in_category(category)).collect()
}

/// The result of a single indexing pass over a document collection. Build it
/// once per site build and hand it to every view rather than having each view
/// rescan the documents.
#[derive(Clone, Debug)]
pub struct SiteIndex<'a> {
    /// The indexed documents.
    pub documents: &'a [Document],

    /// See [`tag_frequencies`].
    pub tags: Vec<TagFrequency>,

    /// See [`category_frequencies`].
    pub categories: Vec<CategoryFrequency>,

    /// See [`category_display_map`].
    pub category_labels: BTreeMap<String, String>,

    /// See [`tag_display_map`].
    pub tag_labels: BTreeMap<String, String>,
}

impl<'a> SiteIndex<'a> {
    pub fn new(documents: &'a [Document]) -> SiteIndex<'a> {
        let index = SiteIndex {
            documents,
            tags: tag_frequencies(documents),
            categories: category_frequencies(documents),
            category_labels: category_display_map(documents),
            tag_labels: tag_display_map(documents),
        };
        tracing::debug!(
            documents = documents.len(),
            tags = index.tags.len(),
            categories = index.categories.len(),
            "indexed documents"
        );
        index
    }

    /// The label for `category`, or the key itself if it's unknown.
    pub fn category_label<'s>(&'s self, category: &'s str) -> &'s str {
        self.category_labels
            .get(category)
            .map(String::as_str)
            .unwrap_or(category)
    }

    /// The label for `tag`, or the tag itself if it's unknown.
    pub fn tag_label<'s>(&'s self, tag: &'s str) -> &'s str {
        self.tag_labels.get(tag).map(String::as_str).unwrap_or(tag)
    }

    /// Returns [`TagStats`] for the whole collection.
    pub fn tag_stats(&self) -> TagStats {
        TagStats::of(&self.tags)
    }

    /// Every distinct tag, one per static tag route.
    pub fn tag_route_keys(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|f| f.tag.as_str())
    }

    /// Every distinct category, one per static category route.
    pub fn category_route_keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|f| f.category.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::test::doc;

    fn example() -> Vec<Document> {
        vec![
            doc("1", (2024, 1, 1), Some("x"), &["a", "b"]),
            doc("2", (2024, 2, 1), Some("y"), &["b"]),
            doc("3", (2023, 12, 1), Some("x"), &["c"]),
        ]
    }

    #[test]
    fn test_tag_frequencies() {
        assert_eq!(
            vec![
                TagFrequency::new("b", 2),
                TagFrequency::new("a", 1),
                TagFrequency::new("c", 1),
            ],
            tag_frequencies(&example()),
        );
    }

    #[test]
    fn test_tag_frequencies_counts_repeats_and_case() {
        let docs = vec![
            doc("1", (2024, 1, 1), None, &["rust", "rust", "Rust"]),
            doc("2", (2024, 1, 2), None, &[]),
        ];
        assert_eq!(
            vec![TagFrequency::new("rust", 2), TagFrequency::new("Rust", 1)],
            tag_frequencies(&docs),
        );
    }

    #[test]
    fn test_tag_frequencies_empty() {
        assert!(tag_frequencies(&[]).is_empty());
    }

    #[test]
    fn test_tag_frequencies_within() {
        assert_eq!(
            vec![
                TagFrequency::new("a", 1),
                TagFrequency::new("b", 1),
                TagFrequency::new("c", 1),
            ],
            tag_frequencies_within(&example(), "x"),
        );
        assert!(tag_frequencies_within(&example(), "").is_empty());
    }

    #[test]
    fn test_category_frequencies() {
        let mut docs = example();
        docs.push(doc("4", (2020, 1, 1), Some(""), &[]));
        docs.push(doc("5", (2020, 1, 1), None, &[]));
        assert_eq!(
            vec![
                CategoryFrequency {
                    category: "x".to_owned(),
                    count: 2
                },
                CategoryFrequency {
                    category: "y".to_owned(),
                    count: 1
                },
            ],
            category_frequencies(&docs),
        );
    }

    #[test]
    fn test_category_display_map_first_non_empty_wins() {
        let mut docs = vec![
            doc("1", (2024, 3, 1), Some("tech"), &[]),
            doc("2", (2024, 2, 1), Some("tech"), &[]),
            doc("3", (2024, 1, 1), Some("tech"), &[]),
            doc("4", (2024, 1, 1), Some("life"), &[]),
        ];
        docs[0].category_display = Some(String::new());
        docs[1].category_display = Some("技术".to_owned());
        docs[2].category_display = Some("Technology".to_owned());

        let map = category_display_map(&docs);
        assert_eq!(Some("技术"), map.get("tech").map(String::as_str));
        assert_eq!(Some("life"), map.get("life").map(String::as_str));
        assert_eq!(2, map.len());
    }

    #[test]
    fn test_tag_display_map_is_positional() {
        let mut docs = vec![
            doc("1", (2024, 2, 1), None, &["rust", "web"]),
            doc("2", (2024, 1, 1), None, &["web", "cli"]),
        ];
        docs[0].tags_display = vec!["Rust".to_owned()];
        docs[1].tags_display = vec!["网络".to_owned(), "命令行".to_owned()];

        let map = tag_display_map(&docs);
        assert_eq!("Rust", map["rust"]);
        assert_eq!("网络", map["web"]);
        assert_eq!("命令行", map["cli"]);
    }

    #[test]
    fn test_tag_display_map_within() {
        let mut docs = vec![
            doc("1", (2024, 2, 1), Some("tech"), &["rust"]),
            doc("2", (2024, 1, 1), Some("life"), &["rust", "travel"]),
        ];
        docs[0].tags_display = vec!["Rust Lang".to_owned()];
        docs[1].tags_display = vec!["Rust".to_owned()];

        assert_eq!("Rust Lang", tag_display_map(&docs)["rust"]);
        let life = tag_display_map_within(&docs, "life");
        assert_eq!("Rust", life["rust"]);
        assert_eq!("travel", life["travel"]);
        assert_eq!(2, life.len());
        assert!(tag_display_map_within(&docs, "").is_empty());
    }

    #[test]
    fn test_documents_tagged_and_in_category() {
        let docs = example();
        let ids = |v: Vec<&Document>| v.iter().map(|d| d.id.clone()).collect::<Vec<_>>();
        assert_eq!(vec!["1", "2"], ids(documents_tagged(&docs, "b")));
        assert_eq!(vec!["1", "3"], ids(documents_in_category(&docs, "x")));
        assert!(documents_tagged(&docs, "B").is_empty());
    }

    #[test]
    fn test_site_index() {
        let docs = example();
        let index = SiteIndex::new(&docs);
        assert_eq!(
            TagStats {
                total_tags: 3,
                total_references: 4
            },
            index.tag_stats()
        );
        assert_eq!(vec!["b", "a", "c"], index.tag_route_keys().collect::<Vec<_>>());
        assert_eq!(vec!["x", "y"], index.category_route_keys().collect::<Vec<_>>());
        assert_eq!("x", index.category_label("x"));
        assert_eq!("unknown", index.tag_label("unknown"));
    }
}
