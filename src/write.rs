//! Builds every page of the site from a [`SiteIndex`], templates it, and
//! writes it to disk.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use gtmpl::Template;
use gtmpl_value::Value;
use thiserror::Error;

use crate::browse::{browse, group_alphabetically, TagQuery};
use crate::config::{Navbar, Sidebar, TagCloud};
use crate::document::Document;
use crate::index::{
    documents_in_category, documents_tagged, tag_display_map_within, tag_frequencies_within,
    SiteIndex, TagFrequency,
};
use crate::markdown::Rendered;
use crate::related::rank_related;
use crate::route::{self, Routes};
use crate::value::{self, array, count, object, optional, string};
use crate::weight::{font_size_for, intensity_bucket_for, usage_level_for, FontScale};

/// The parsed templates, one per page kind.
pub struct PageTemplates {
    /// The article listing (home page).
    pub blog: Template,

    /// A single document.
    pub post: Template,

    /// The documents of one category.
    pub category: Template,

    /// The documents of one tag.
    pub tag: Template,

    /// The tag browser.
    pub tags: Template,
}

/// Responsible for building, templating, and writing HTML pages to disk from
/// an indexed set of [`Document`]s.
pub struct Writer<'a> {
    pub templates: &'a PageTemplates,
    pub routes: &'a Routes<'a>,

    /// The site title, available to every template as `.site.title`.
    pub site_title: &'a str,

    /// The maximum number of related articles per document page.
    pub related_limit: usize,

    pub tag_cloud: &'a TagCloud,
    pub sidebar: Sidebar,
    pub navbar: Navbar,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk. The
    /// shared `site` value is attached to the page's value first.
    fn write_page(&self, page: Page, site: &Value) -> Result<()> {
        let mut value = page.item;
        value::insert(&mut value, "site", site.clone());
        let context = gtmpl::Context::from(value).map_err(|e| Error::Template(e.to_string()))?;
        page.template
            .execute(&mut std::fs::File::create(&page.file_path)?, &context)
            .map_err(|e| Error::Template(e.to_string()))?;
        tracing::debug!(path = %page.file_path.display(), "wrote page");
        Ok(())
    }

    /// Builds every page for `index` and writes them to disk. `rendered`
    /// holds the rendered body of each of `index.documents`, in the same
    /// order. Returns the number of pages written.
    pub fn write_site(&self, index: &SiteIndex, rendered: &[Rendered]) -> Result<usize> {
        let site = self.site(index)?;
        let pages = self.pages(index, rendered)?;
        let written = pages.len();

        for (first, second) in case_collisions(pages.iter().map(|p| p.file_path.as_path())) {
            tracing::warn!(
                first = %first.display(),
                second = %second.display(),
                "output paths differ only by case; one overwrites the other on case-insensitive file systems"
            );
        }

        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in pages {
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(page, &site)?;
        }
        Ok(written)
    }

    /// Creates all of the pages: the article listing, one page per document,
    /// category and tag, and the tag browser.
    fn pages<'t>(&'t self, index: &SiteIndex, rendered: &[Rendered]) -> Result<Vec<Page<'t>>> {
        let mut pages = Vec::with_capacity(
            index.documents.len() + index.categories.len() + index.tags.len() + 2,
        );
        pages.push(self.blog_page(index)?);
        for (i, (document, rendered)) in index.documents.iter().zip(rendered).enumerate() {
            pages.push(self.post_page(index, i, document, rendered)?);
        }
        for category in index.category_route_keys() {
            pages.push(self.category_page(index, category)?);
        }
        for tag in index.tag_route_keys() {
            pages.push(self.tag_page(index, tag)?);
        }
        pages.push(self.tags_page(index)?);
        Ok(pages)
    }

    /// Values every template can reach through `.site`: URLs for the page
    /// chrome and the navigation menus. A menu hidden by the [`Navbar`]
    /// settings is nil.
    fn site(&self, index: &SiteIndex) -> Result<Value> {
        Ok(object([
            ("title", string(self.site_title)),
            ("home_page", value::url(&self.routes.home_url()?)),
            ("static_url", value::url(&self.routes.static_url()?)),
            ("tags_url", value::url(&self.routes.tags_url()?)),
            ("feed_url", value::url(&self.routes.feed_url()?)),
            (
                "categories",
                match self.navbar.categories {
                    false => Value::Nil,
                    true => array(
                        index
                            .category_route_keys()
                            .map(|c| self.category_link(index, c))
                            .collect::<Result<_>>()?,
                    ),
                },
            ),
            (
                "tags",
                match self.navbar.tags {
                    false => Value::Nil,
                    true => array(
                        index
                            .tag_route_keys()
                            .map(|t| self.tag_link(t, index.tag_label(t)))
                            .collect::<Result<_>>()?,
                    ),
                },
            ),
        ]))
    }

    fn blog_page(&self, index: &SiteIndex) -> Result<Page> {
        let documents: Vec<&Document> = index.documents.iter().collect();
        Ok(Page {
            item: object([
                ("documents", self.summaries(index, &documents)?),
                ("sidebar", self.sidebar(index, &index.tags)?),
            ]),
            file_path: self.routes.home_path(),
            template: &self.templates.blog,
        })
    }

    /// A document page. Documents are newest first, so the `newer` link
    /// points at the previous document and `older` at the next.
    fn post_page(
        &self,
        index: &SiteIndex,
        i: usize,
        document: &Document,
        rendered: &Rendered,
    ) -> Result<Page> {
        let related = rank_related(document, index.documents, self.related_limit);

        let mut item = self.summary(index, document)?;
        value::insert(&mut item, "html", string(&rendered.html));
        value::insert(
            &mut item,
            "toc",
            array(rendered.toc.iter().map(Value::from).collect()),
        );
        value::insert(&mut item, "related", self.summaries(index, &related)?);
        value::insert(
            &mut item,
            "newer",
            match i.checked_sub(1).and_then(|j| index.documents.get(j)) {
                Some(d) => self.summary(index, d)?,
                None => Value::Nil,
            },
        );
        value::insert(
            &mut item,
            "older",
            match index.documents.get(i + 1) {
                Some(d) => self.summary(index, d)?,
                None => Value::Nil,
            },
        );

        Ok(Page {
            item,
            file_path: self.routes.document_path(&document.id),
            template: &self.templates.post,
        })
    }

    /// A category page, with a sidebar cloud of the tags used within the
    /// category. Tag counts and labels in the cloud only come from the
    /// category's documents.
    fn category_page(&self, index: &SiteIndex, category: &str) -> Result<Page> {
        let documents = documents_in_category(index.documents, category);
        let tags = tag_frequencies_within(index.documents, category);
        let labels = tag_display_map_within(index.documents, category);
        let mut item = self.category_link(index, category)?;
        value::insert(&mut item, "count", count(documents.len()));
        value::insert(&mut item, "documents", self.summaries(index, &documents)?);
        value::insert(
            &mut item,
            "tag_cloud",
            match self.sidebar.tags {
                true => self.cloud(&tags, &labels, self.tag_cloud.fixed())?,
                false => Value::Nil,
            },
        );
        Ok(Page {
            item,
            file_path: self.routes.category_path(category),
            template: &self.templates.category,
        })
    }

    fn tag_page(&self, index: &SiteIndex, tag: &str) -> Result<Page> {
        let documents = documents_tagged(index.documents, tag);
        let mut item = self.tag_link(tag, index.tag_label(tag))?;
        value::insert(&mut item, "count", count(documents.len()));
        value::insert(&mut item, "documents", self.summaries(index, &documents)?);
        Ok(Page {
            item,
            file_path: self.routes.tag_path(tag),
            template: &self.templates.tag,
        })
    }

    /// The tag browser: totals, every tag in frequency order with its
    /// visual weights, and the same tags grouped alphabetically.
    fn tags_page(&self, index: &SiteIndex) -> Result<Page> {
        let tags = browse(&index.tags, &TagQuery::default());
        let counts: Vec<u32> = tags.iter().map(|t| t.count).collect();
        let weighted = |t: &TagFrequency| -> Result<Value> {
            let mut v = self.tag_link(&t.tag, index.tag_label(&t.tag))?;
            value::insert(&mut v, "count", Value::from(u64::from(t.count)));
            value::insert(
                &mut v,
                "font_size",
                Value::from(font_size_for(t.count, &counts, self.tag_cloud.scaled())),
            );
            value::insert(
                &mut v,
                "intensity",
                intensity_bucket_for(t.count, &counts).into(),
            );
            value::insert(&mut v, "usage", usage_level_for(t.count).into());
            Ok(v)
        };

        let groups: Vec<Value> = group_alphabetically(&tags)
            .iter()
            .map(|(letter, members)| -> Result<Value> {
                Ok(object([
                    ("letter", string(letter)),
                    (
                        "tags",
                        array(members.iter().map(&weighted).collect::<Result<_>>()?),
                    ),
                ]))
            })
            .collect::<Result<_>>()?;

        Ok(Page {
            item: object([
                ("stats", index.tag_stats().into()),
                (
                    "tags",
                    array(tags.iter().map(&weighted).collect::<Result<_>>()?),
                ),
                ("groups", array(groups)),
            ]),
            file_path: self.routes.tags_path(),
            template: &self.templates.tags,
        })
    }

    /// The sidebar of listing pages: the category list and a fixed-size tag
    /// cloud, each present only if enabled.
    fn sidebar(&self, index: &SiteIndex, tags: &[TagFrequency]) -> Result<Value> {
        let categories = match self.sidebar.categories {
            false => Value::Nil,
            true => array(
                index
                    .categories
                    .iter()
                    .map(|c| -> Result<Value> {
                        let mut v = self.category_link(index, &c.category)?;
                        value::insert(&mut v, "count", Value::from(u64::from(c.count)));
                        Ok(v)
                    })
                    .collect::<Result<_>>()?,
            ),
        };
        let tag_cloud = match self.sidebar.tags {
            false => Value::Nil,
            true => {
                let limit = self.tag_cloud.limit.unwrap_or(tags.len()).min(tags.len());
                self.cloud(&tags[..limit], &index.tag_labels, self.tag_cloud.fixed())?
            }
        };
        Ok(object([("categories", categories), ("tag_cloud", tag_cloud)]))
    }

    /// A tag cloud over `tags`, sized by `scale` relative to the counts in
    /// `tags`. Tags missing from `labels` are shown as themselves.
    fn cloud(
        &self,
        tags: &[TagFrequency],
        labels: &BTreeMap<String, String>,
        scale: FontScale,
    ) -> Result<Value> {
        let counts: Vec<u32> = tags.iter().map(|t| t.count).collect();
        Ok(array(
            tags.iter()
                .map(|t| -> Result<Value> {
                    let label = labels.get(&t.tag).map(String::as_str).unwrap_or(&t.tag);
                    let mut v = self.tag_link(&t.tag, label)?;
                    value::insert(&mut v, "count", Value::from(u64::from(t.count)));
                    value::insert(
                        &mut v,
                        "font_size",
                        Value::from(font_size_for(t.count, &counts, scale)),
                    );
                    Ok(v)
                })
                .collect::<Result<_>>()?,
        ))
    }

    fn summaries(&self, index: &SiteIndex, documents: &[&Document]) -> Result<Value> {
        Ok(array(
            documents
                .iter()
                .map(|d| self.summary(index, d))
                .collect::<Result<_>>()?,
        ))
    }

    /// The fields shown for a document anywhere it's listed. Tags use the
    /// document's own display labels.
    fn summary(&self, index: &SiteIndex, document: &Document) -> Result<Value> {
        Ok(object([
            ("id", string(&document.id)),
            ("url", value::url(&self.routes.document_url(&document.id)?)),
            ("title", string(&document.title)),
            ("date", value::date(&document.published_at)),
            ("datetime", value::datetime(&document.published_at)),
            (
                "updated",
                optional(document.updated_at.as_ref(), value::date),
            ),
            ("summary", optional(document.summary.as_deref(), string)),
            ("keywords", array(document.keywords.iter().map(|k| string(k)).collect())),
            ("featured", Value::Bool(document.featured)),
            ("word_count", count(document.word_count())),
            (
                "category",
                match document.category.as_deref().filter(|c| !c.is_empty()) {
                    Some(category) => {
                        let mut v = self.category_link(index, category)?;
                        // the document's own label takes precedence over the
                        // site-wide one
                        if let Some(label) = document.category_label() {
                            value::insert(&mut v, "label", string(label));
                        }
                        v
                    }
                    None => Value::Nil,
                },
            ),
            (
                "tags",
                array(
                    document
                        .labeled_tags()
                        .map(|(tag, label)| self.tag_link(tag, label))
                        .collect::<Result<_>>()?,
                ),
            ),
        ]))
    }

    fn category_link(&self, index: &SiteIndex, category: &str) -> Result<Value> {
        Ok(object([
            ("key", string(category)),
            ("label", string(index.category_label(category))),
            ("url", value::url(&self.routes.category_url(category)?)),
        ]))
    }

    fn tag_link(&self, tag: &str, label: &str) -> Result<Value> {
        Ok(object([
            ("key", string(tag)),
            ("label", string(label)),
            ("url", value::url(&self.routes.tag_url(tag)?)),
        ]))
    }
}

/// An output HTML file: the value handed to the template, where the result
/// goes, and the template itself.
struct Page<'t> {
    item: Value,
    file_path: PathBuf,
    template: &'t Template,
}

/// Returns the pairs of `paths` that only differ by letter case. Each pair
/// is the first path seen followed by the later one.
pub fn case_collisions<'p>(paths: impl Iterator<Item = &'p Path>) -> Vec<(PathBuf, PathBuf)> {
    let mut folded: HashMap<String, &Path> = HashMap::new();
    let mut collisions = Vec::new();
    for path in paths {
        match folded.entry(path.to_string_lossy().to_lowercase()) {
            Entry::Occupied(e) if *e.get() != path => {
                collisions.push((e.get().to_path_buf(), path.to_owned()))
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(e) => {
                e.insert(path);
            }
        }
    }
    collisions
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, Error)]
pub enum Error {
    /// An error during templating.
    #[error("{0}")]
    Template(String),

    /// An error building a page URL or output path.
    #[error(transparent)]
    Route(#[from] route::Error),

    /// An error writing the output files.
    #[error(transparent)]
    Io(#[from] io::Error),
}
