//! Defines the [`Document`] type, the normalized in-memory representation of
//! a single blog article. Documents are produced by [`crate::parser`] and are
//! never mutated afterwards; every index, ranking and listing in the crate is
//! derived from a slice of them.

use chrono::NaiveDateTime;

/// Represents one published article.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// The stable identifier of the document. This is the source path
    /// relative to the content directory less the `.md` extension (e.g.,
    /// `notes/rust.md` becomes `notes/rust`). It doubles as the document's
    /// route key.
    pub id: String,

    /// The title of the document.
    pub title: String,

    /// The publication time. Documents whose front matter only carries a
    /// date are published at midnight.
    pub published_at: NaiveDateTime,

    /// The time of the last revision, if any.
    pub updated_at: Option<NaiveDateTime>,

    /// The category routing key.
    pub category: Option<String>,

    /// The human-facing label for `category`.
    pub category_display: Option<String>,

    /// The tag routing keys.
    pub tags: Vec<String>,

    /// Display labels for `tags`, paired by position. May be shorter than
    /// `tags`.
    pub tags_display: Vec<String>,

    /// A short blurb shown on listing pages.
    pub summary: Option<String>,

    /// Keywords for the page metadata.
    pub keywords: Vec<String>,

    /// Whether the document is pinned as featured.
    pub featured: bool,

    /// The raw markdown body.
    pub body: String,
}

impl Document {
    /// Returns the label to show for the document's category, falling back
    /// to the routing key when no (non-empty) display label was given.
    /// Returns [`None`] for documents without a category.
    pub fn category_label(&self) -> Option<&str> {
        let category = self.category.as_deref().filter(|c| !c.is_empty())?;
        Some(
            self.category_display
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(category),
        )
    }

    /// Returns the display label paired with the tag at `index`, or the raw
    /// tag if `tags_display` has no (non-empty) entry at that position.
    /// Returns [`None`] only if `index` is out of range for `tags`.
    pub fn tag_label(&self, index: usize) -> Option<&str> {
        let tag = self.tags.get(index)?;
        Some(
            self.tags_display
                .get(index)
                .map(String::as_str)
                .filter(|d| !d.is_empty())
                .unwrap_or(tag),
        )
    }

    /// Iterates over `(tag, label)` pairs in front matter order.
    pub fn labeled_tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().enumerate().map(move |(i, tag)| {
            // `i` is always in range for `tags`
            (tag.as_str(), self.tag_label(i).unwrap_or(tag))
        })
    }

    /// Returns true if `tag` is among the document's tags.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns true if the document has a non-empty category equal to
    /// `category`.
    pub fn in_category(&self, category: &str) -> bool {
        !category.is_empty() && self.category.as_deref() == Some(category)
    }

    /// Counts the words in the body for the "N words" line on article
    /// listings. Each CJK character counts as a word on its own; any other
    /// run of alphanumeric characters counts once.
    pub fn word_count(&self) -> usize {
        word_count(&self.body)
    }
}

fn word_count(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for c in text.chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() || c == '\'' || c == '_' {
            if !in_word {
                count += 1;
                in_word = true;
            }
        } else {
            in_word = false;
        }
    }
    count
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF     // hiragana, katakana
        | 0x3400..=0x4DBF   // CJK extension A
        | 0x4E00..=0x9FFF   // CJK unified ideographs
        | 0xAC00..=0xD7AF   // hangul syllables
        | 0xF900..=0xFAFF   // CJK compatibility ideographs
        | 0x20000..=0x2FA1F)
}
