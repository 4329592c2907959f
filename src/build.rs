//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the documents
//! ([`crate::parser`]), indexing them ([`crate::index`]), rendering every
//! page ([`crate::write`]), copying the static source directory into the
//! static output directory, and generating the Atom feed.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use gtmpl::Template;
use thiserror::Error;

use crate::config::Config;
use crate::feed::{self, write_feed, FeedConfig};
use crate::index::SiteIndex;
use crate::markdown::{self, Rendered};
use crate::parser::{self, Parser};
use crate::route::{self, Routes};
use crate::write::{self, PageTemplates, Writer};

/// Builds the site from a [`Config`] object. This calls into
/// [`Parser::parse_documents`], [`SiteIndex::new`], [`Writer::write_site`],
/// and [`write_feed`] which do the heavy-lifting. This function also copies
/// the static assets from source directory to the output directory.
pub fn build_site(config: &Config) -> Result<()> {
    let start = Instant::now();

    // collect all documents and index them once for every page
    let documents = Parser::new(&config.content_directory).parse_documents()?;
    let index = SiteIndex::new(&documents);
    tracing::info!(
        documents = documents.len(),
        tags = index.tags.len(),
        categories = index.categories.len(),
        "parsed documents"
    );

    // Bodies are rendered once and shared by the document pages and the
    // feed.
    let rendered: Vec<Rendered> = documents
        .iter()
        .map(|d| markdown::to_html(&d.body))
        .collect();

    // Parse the template files.
    let templates = PageTemplates {
        blog: parse_template(config.templates.blog.iter())?,
        post: parse_template(config.templates.post.iter())?,
        category: parse_template(config.templates.category.iter())?,
        tag: parse_template(config.templates.tag.iter())?,
        tags: parse_template(config.templates.tags.iter())?,
    };

    // Only remove the subtrees we generate, in case the output directory was
    // pointed somewhere with other contents.
    let routes = Routes::new(&config.site_root, &config.output_directory);
    for dir in ["blog", "category", "tag"] {
        rmdir(&config.output_directory.join(dir))?;
    }
    rmdir(&routes.static_path())?;
    std::fs::create_dir_all(&config.output_directory)?;

    let writer = Writer {
        templates: &templates,
        routes: &routes,
        site_title: &config.title,
        related_limit: config.related_limit,
        tag_cloud: &config.tag_cloud,
        sidebar: config.sidebar,
        navbar: config.navbar,
    };
    let pages = writer.write_site(&index, &rendered)?;
    tracing::info!(pages, "wrote pages");

    if config.static_source_directory.is_dir() {
        copy_dir(&config.static_source_directory, &routes.static_path())?;
    } else {
        tracing::warn!(
            path = %config.static_source_directory.display(),
            "no static directory; skipping"
        );
    }

    write_feed(
        &FeedConfig {
            title: &config.title,
            author: config.author.as_ref(),
            home_page: routes.home_url()?,
            feed_url: routes.feed_url()?,
            size: config.feed_size,
        },
        &routes,
        &documents,
        &rendered,
        File::create(routes.feed_path())?,
    )?;

    tracing::info!(elapsed = ?start.elapsed(), output = %config.output_directory.display(), "built site");
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            std::fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }

    Ok(())
}

/// Loads the template file contents, concatenates them, and parses the result
/// into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template
        .parse(&contents)
        .map_err(|e| Error::ParseTemplate(e.to_string()))?;
    Ok(template)
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// cleaning output directories, parsing template files, and other I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for errors during parsing.
    #[error(transparent)]
    Parse(#[from] parser::Error),

    /// Returned for errors writing pages to disk as HTML files.
    #[error(transparent)]
    Write(#[from] write::Error),

    /// Returned for errors building URLs.
    #[error(transparent)]
    Route(#[from] route::Error),

    /// Returned for I/O problems while cleaning output directories.
    #[error("Cleaning directory '{}': {err}", .path.display())]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for I/O problems while opening template files.
    #[error("Opening template file '{}': {err}", .path.display())]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for errors parsing template files.
    #[error("{0}")]
    ParseTemplate(String),

    /// Returned for errors writing the feed.
    #[error(transparent)]
    Feed(#[from] feed::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
