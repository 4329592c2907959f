//! Defines the [`Parser`] and [`Error`] types: the logic for loading
//! [`Document`]s from markdown source files on disk into memory.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::document::Document;

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Document`] objects from source files.
pub struct Parser<'a> {
    /// `content_directory` is the root of the document sources. Document ids
    /// are source paths relative to this directory.
    content_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser for the documents under `content_directory`.
    pub fn new(content_directory: &'a Path) -> Parser<'a> {
        Parser { content_directory }
    }

    /// Recursively searches the content directory for markdown files
    /// (extension `.md`) and returns the parsed documents sorted by
    /// publication time (most recent first), ties broken by id. Each source
    /// file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `title`, `date`, and optionally
    ///    `updated`, `featured`, `summary`, `keywords`, `category`,
    ///    `categoryDisplay`, `tags` and `tagsDisplay`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Document body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// category: life
    /// categoryDisplay: 生活
    /// tags: [greet]
    /// tagsDisplay: [问候]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_documents(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for result in WalkDir::new(self.content_directory).sort_by_file_name() {
            let entry = result?;
            if !entry.file_type().is_file()
                || entry.path().extension().and_then(|e| e.to_str()) != Some(MARKDOWN_EXTENSION)
            {
                continue;
            }

            // strip_prefix() should never fail since WalkDir only yields
            // descendants of `content_directory`
            let relative_path = entry
                .path()
                .strip_prefix(self.content_directory)
                .map_err(|_| Error::InvalidFileName(entry.path().to_owned()))?;
            let document = self.parse_document(relative_path)?;
            if !seen.insert(document.id.clone()) {
                return Err(Error::DuplicateId(document.id));
            }
            tracing::debug!(id = %document.id, tags = document.tags.len(), "parsed document");
            documents.push(document);
        }

        documents.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(documents)
    }

    /// Parses the document at `relative_path` (relative to the content
    /// directory), annotating any error with the path.
    fn parse_document(&self, relative_path: &Path) -> Result<Document> {
        match self._parse_document(relative_path) {
            Ok(d) => Ok(d),
            Err(e) => Err(Error::Annotated(
                format!("parsing document `{}`", relative_path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_document(&self, relative_path: &Path) -> Result<Document> {
        use std::io::Read;
        let mut contents = String::new();
        File::open(self.content_directory.join(relative_path))?.read_to_string(&mut contents)?;
        parse_document(&document_id(relative_path)?, &contents)
    }
}

/// Derives a document id from a source path relative to the content
/// directory: the path less its extension, with `/` separators on every
/// platform.
pub fn document_id(relative_path: &Path) -> Result<String> {
    let stem = relative_path.with_extension("");
    let mut parts = Vec::new();
    for component in stem.components() {
        parts.push(
            component
                .as_os_str()
                .to_str()
                .ok_or_else(|| Error::InvalidFileName(relative_path.to_owned()))?,
        );
    }
    if parts.is_empty() {
        return Err(Error::InvalidFileName(relative_path.to_owned()));
    }
    Ok(parts.join("/"))
}

/// Parses a single [`Document`] from its id and source text.
pub fn parse_document(id: &str, input: &str) -> Result<Document> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        if !input.starts_with(FENCE) {
            return Err(Error::FrontmatterMissingStartFence);
        }
        // The closing fence must be a line of its own; `---` inside a value
        // is just text.
        let mut line_start = 0;
        for line in input.split_inclusive('\n') {
            if line_start > 0 && line.trim_end_matches(['\r', '\n']) == FENCE {
                return Ok((
                    FENCE.len(),                // yaml_start
                    line_start,                 // yaml_stop
                    line_start + FENCE.len(),   // body_start
                ));
            }
            line_start += line.len();
        }
        Err(Error::FrontmatterMissingEndFence)
    }

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;
    if frontmatter.title.trim().is_empty() {
        return Err(Error::EmptyTitle);
    }

    Ok(Document {
        id: id.to_owned(),
        published_at: parse_date(&frontmatter.date)?,
        updated_at: frontmatter.updated.as_deref().map(parse_date).transpose()?,
        title: frontmatter.title,
        category: frontmatter.category,
        category_display: frontmatter.category_display,
        tags: frontmatter.tags,
        tags_display: frontmatter.tags_display,
        summary: frontmatter.summary,
        keywords: frontmatter.keywords,
        featured: frontmatter.featured,
        body: input[body_start..].trim_start_matches(['\r', '\n']).to_owned(),
    })
}

/// Parses a front matter date. Accepts bare dates (`2024-01-31`, taken as
/// midnight), local date-times with or without seconds, separated by a
/// space or `T`, and RFC 3339 timestamps (converted to UTC).
pub fn parse_date(input: &str) -> Result<NaiveDateTime> {
    const DATE_TIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(date_time);
        }
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.naive_utc())
        .map_err(|_| Error::InvalidDate(input.to_owned()))
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct Frontmatter {
    title: String,

    /// Kept as text so YAML's own date handling doesn't get a say;
    /// see [`parse_date`].
    #[serde(deserialize_with = "scalar_string")]
    date: String,

    #[serde(default, deserialize_with = "optional_scalar_string")]
    updated: Option<String>,

    #[serde(default)]
    featured: bool,

    #[serde(default)]
    summary: Option<String>,

    #[serde(default)]
    keywords: Vec<String>,

    #[serde(default)]
    category: Option<String>,

    #[serde(default)]
    category_display: Option<String>,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    tags_display: Vec<String>,
}

/// Accepts any YAML scalar as a string. Unquoted values such as `2024` would
/// otherwise be rejected as numbers.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected a date, found {:?}", other))),
    }
}

fn optional_scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(value) => scalar_string(value).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Represents the result of a [`Document`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Document`].
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter fence
    /// (`---`).
    #[error("document must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a source file is missing its terminal frontmatter fence
    /// (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    #[error("document title must not be empty")]
    EmptyTitle,

    #[error("invalid date `{0}`")]
    InvalidDate(String),

    /// Returned when two source files map to the same document id.
    #[error("duplicate document id `{0}`")]
    DuplicateId(String),

    /// Returned for I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a source path isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, #[source] Box<Error>),
}
