//! Picks the "related articles" shown beside a document.

use crate::document::Document;

/// The number of related articles shown when the configuration doesn't say
/// otherwise.
pub const DEFAULT_RELATED_LIMIT: usize = 5;

/// Returns true if `candidate` shares `target`'s (non-empty) category or at
/// least one of its tags.
pub fn is_related(target: &Document, candidate: &Document) -> bool {
    let same_category = match target.category.as_deref() {
        Some(category) => candidate.in_category(category),
        None => false,
    };
    same_category || target.tags.iter().any(|tag| candidate.has_tag(tag))
}

/// Returns up to `limit` documents from `candidates` related to `target`
/// (see [`is_related`]), most recently published first. `target` itself is
/// never returned, even if it appears among the candidates. Documents
/// published at the same instant are ordered by id.
pub fn rank_related<'a>(
    target: &Document,
    candidates: &'a [Document],
    limit: usize,
) -> Vec<&'a Document> {
    let mut related: Vec<&Document> = candidates
        .iter()
        .filter(|c| c.id != target.id && is_related(target, c))
        .collect();
    related.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    related.truncate(limit);
    related
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::test::doc;

    fn ids(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn test_rank_related_example() {
        let doc1 = doc("1", (2024, 1, 1), Some("x"), &["a", "b"]);
        let candidates = vec![
            doc("2", (2024, 2, 1), Some("y"), &["b"]),
            doc("3", (2023, 12, 1), Some("x"), &["c"]),
        ];
        assert_eq!(vec!["2", "3"], ids(&rank_related(&doc1, &candidates, 5)));
    }

    #[test]
    fn test_rank_related_excludes_target_and_unrelated() {
        let target = doc("t", (2024, 1, 1), Some("x"), &["a"]);
        let candidates = vec![
            target.clone(),
            doc("u", (2024, 6, 1), Some("y"), &["b"]),
            doc("v", (2024, 5, 1), None, &["a"]),
        ];
        assert_eq!(vec!["v"], ids(&rank_related(&target, &candidates, 5)));
    }

    #[test]
    fn test_rank_related_without_category_ignores_uncategorized() {
        let target = doc("t", (2024, 1, 1), None, &[]);
        let candidates = vec![
            doc("u", (2024, 6, 1), None, &[]),
            doc("v", (2024, 5, 1), Some(""), &[]),
        ];
        assert!(rank_related(&target, &candidates, 5).is_empty());

        let target = doc("t", (2024, 1, 1), Some(""), &[]);
        assert!(rank_related(&target, &candidates, 5).is_empty());
    }

    #[test]
    fn test_rank_related_truncates_after_sorting() {
        let target = doc("t", (2024, 1, 1), Some("x"), &[]);
        let candidates: Vec<Document> = (1..=9)
            .map(|month| doc(&format!("d{}", month), (2023, month, 1), Some("x"), &[]))
            .collect();
        assert_eq!(
            vec!["d9", "d8", "d7"],
            ids(&rank_related(&target, &candidates, 3))
        );
        assert!(rank_related(&target, &candidates, 0).is_empty());
    }

    #[test]
    fn test_rank_related_ties_broken_by_id() {
        let target = doc("t", (2024, 1, 1), None, &["a"]);
        let candidates = vec![
            doc("c", (2024, 2, 1), None, &["a"]),
            doc("a", (2024, 2, 1), None, &["a"]),
            doc("b", (2024, 2, 1), None, &["a"]),
        ];
        assert_eq!(
            vec!["a", "b", "c"],
            ids(&rank_related(&target, &candidates, DEFAULT_RELATED_LIMIT))
        );
    }
}
