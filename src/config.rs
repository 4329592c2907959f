//! Loads the project configuration (`quire.yaml`) and the theme
//! configuration (`theme/theme.yaml`) into a single [`Config`].

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use url::Url;

use crate::related::DEFAULT_RELATED_LIMIT;
use crate::weight::{
    FontScale, DEFAULT_FIXED_FONT_SIZE, DEFAULT_MAX_FONT_SIZE, DEFAULT_MIN_FONT_SIZE,
};

/// The name of the project file.
pub const PROJECT_FILE: &str = "quire.yaml";

/// The author of the site, for the feed.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// Font sizes for tag clouds, in pixels.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TagCloud {
    pub min_font_size: f64,
    pub max_font_size: f64,

    /// The size used by sidebar clouds, which don't scale by frequency.
    pub fixed_size: f64,

    /// Shows at most this many tags (most frequent first) in sidebar clouds.
    pub limit: Option<usize>,
}

impl Default for TagCloud {
    fn default() -> Self {
        TagCloud {
            min_font_size: DEFAULT_MIN_FONT_SIZE,
            max_font_size: DEFAULT_MAX_FONT_SIZE,
            fixed_size: DEFAULT_FIXED_FONT_SIZE,
            limit: None,
        }
    }
}

impl TagCloud {
    pub fn scaled(&self) -> FontScale {
        FontScale::Scaled {
            min: self.min_font_size,
            max: self.max_font_size,
        }
    }

    pub fn fixed(&self) -> FontScale {
        FontScale::Fixed(self.fixed_size)
    }
}

/// Which sidebar panels are shown on listing pages.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Sidebar {
    pub categories: bool,
    pub tags: bool,
}

impl Default for Sidebar {
    fn default() -> Self {
        Sidebar {
            categories: true,
            tags: true,
        }
    }
}

/// Which navigation menus (the category and tag menus shared by every
/// page) are shown.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Navbar {
    pub categories: bool,
    pub tags: bool,
}

impl Default for Navbar {
    fn default() -> Self {
        Navbar {
            categories: true,
            tags: true,
        }
    }
}

#[derive(Deserialize)]
struct Project {
    title: String,
    site_root: Url,

    #[serde(default)]
    author: Option<Author>,

    #[serde(default = "default_related_limit")]
    related_limit: usize,

    #[serde(default = "default_feed_size")]
    feed_size: usize,

    #[serde(default)]
    tag_cloud: TagCloud,

    #[serde(default)]
    sidebar: Sidebar,

    #[serde(default)]
    navbar: Navbar,
}

fn default_related_limit() -> usize {
    DEFAULT_RELATED_LIMIT
}

fn default_feed_size() -> usize {
    20
}

/// Template files, relative to the theme directory. Each page template is
/// the concatenation of its files, so shared partials can be listed first.
#[derive(Deserialize)]
struct Theme {
    blog_template: Vec<PathBuf>,
    post_template: Vec<PathBuf>,
    category_template: Vec<PathBuf>,
    tag_template: Vec<PathBuf>,
    tags_template: Vec<PathBuf>,
}

/// Absolute template file lists, one per page kind.
#[derive(Clone, Debug)]
pub struct Templates {
    pub blog: Vec<PathBuf>,
    pub post: Vec<PathBuf>,
    pub category: Vec<PathBuf>,
    pub tag: Vec<PathBuf>,
    pub tags: Vec<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,
    pub author: Option<Author>,

    /// The URL the output directory is served from. Always ends in `/`.
    pub site_root: Url,
    pub content_directory: PathBuf,
    pub static_source_directory: PathBuf,
    pub output_directory: PathBuf,
    pub templates: Templates,
    pub related_limit: usize,
    pub feed_size: usize,
    pub tag_cloud: TagCloud,
    pub sidebar: Sidebar,
    pub navbar: Navbar,
}

impl Config {
    /// Searches `dir` and its ancestors for a [`PROJECT_FILE`] and loads it.
    /// A relative `dir` is taken relative to the working directory.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let dir = std::env::current_dir()
            .context("Resolving the working directory")?
            .join(dir);
        let path = find_project_file(&dir)?;
        Config::from_project_file(&path, output_directory)
            .with_context(|| format!("Loading configuration `{}`", path.display()))
    }

    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        let theme_dir = project_root.join("theme");
        let theme: Theme = serde_yaml::from_reader(open(&theme_dir.join("theme.yaml"), "theme")?)?;
        let in_theme = |files: Vec<PathBuf>| -> Vec<PathBuf> {
            files.iter().map(|relpath| theme_dir.join(relpath)).collect()
        };

        if project.tag_cloud.min_font_size > project.tag_cloud.max_font_size {
            return Err(anyhow!(
                "tag_cloud.min_font_size ({}) exceeds tag_cloud.max_font_size ({})",
                project.tag_cloud.min_font_size,
                project.tag_cloud.max_font_size
            ));
        }

        Ok(Config {
            title: project.title,
            author: project.author,
            site_root: with_trailing_slash(project.site_root),
            content_directory: project_root.join("content").join("blog"),
            static_source_directory: project_root.join("static"),
            output_directory: output_directory.to_owned(),
            templates: Templates {
                blog: in_theme(theme.blog_template),
                post: in_theme(theme.post_template),
                category: in_theme(theme.category_template),
                tag: in_theme(theme.tag_template),
                tags: in_theme(theme.tags_template),
            },
            related_limit: project.related_limit,
            feed_size: project.feed_size,
            tag_cloud: project.tag_cloud,
            sidebar: project.sidebar,
            navbar: project.navbar,
        })
    }
}

/// [`Url::join`] treats the last segment of a URL without a trailing slash
/// as a file name, which would drop it from every page URL.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Returns the [`PROJECT_FILE`] in `dir` or its nearest ancestor. `dir`
/// must be absolute: the parent of a relative path like `.` is `""`, which
/// would end the search early.
fn find_project_file(dir: &Path) -> Result<PathBuf> {
    dir.ancestors()
        .map(|d| d.join(PROJECT_FILE))
        .find(|path| path.exists())
        .ok_or_else(|| {
            anyhow!(
                "Could not find `{}` in `{}` or any parent directory",
                PROJECT_FILE,
                dir.display()
            )
        })
}

fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Opening {} file `{}`", kind, path.display()))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn write_project(root: &Path, project: &str) -> Result<()> {
        fs::create_dir_all(root.join("theme"))?;
        fs::write(root.join(PROJECT_FILE), project)?;
        fs::write(
            root.join("theme").join("theme.yaml"),
            "blog_template: [base.html, blog.html]
post_template: [base.html, post.html]
category_template: [base.html, category.html]
tag_template: [base.html, tag.html]
tags_template: [base.html, tags.html]
",
        )?;
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "title: Example\nsite_root: https://example.org/blog\n",
        )?;
        let nested = dir.path().join("content").join("blog");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested, Path::new("/tmp/out"))?;
        assert_eq!("Example", config.title);
        assert_eq!("https://example.org/blog/", config.site_root.as_str());
        assert_eq!(dir.path().join("content").join("blog"), config.content_directory);
        assert_eq!(DEFAULT_RELATED_LIMIT, config.related_limit);
        assert_eq!(20, config.feed_size);
        assert_eq!(TagCloud::default(), config.tag_cloud);
        assert_eq!(Sidebar::default(), config.sidebar);
        assert_eq!(Navbar::default(), config.navbar);
        assert_eq!(
            vec![
                dir.path().join("theme").join("base.html"),
                dir.path().join("theme").join("post.html"),
            ],
            config.templates.post
        );
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "title: Example
site_root: https://example.org/
author: { name: Someone }
related_limit: 3
tag_cloud: { min_font_size: 10, limit: 30 }
sidebar: { tags: false }
navbar: { categories: false }
",
        )?;
        let config = Config::from_directory(dir.path(), Path::new("/tmp/out"))?;
        assert_eq!(3, config.related_limit);
        assert_eq!(10.0, config.tag_cloud.min_font_size);
        assert_eq!(DEFAULT_MAX_FONT_SIZE, config.tag_cloud.max_font_size);
        assert_eq!(Some(30), config.tag_cloud.limit);
        assert!(config.sidebar.categories);
        assert!(!config.sidebar.tags);
        assert!(!config.navbar.categories);
        assert!(config.navbar.tags);
        assert_eq!(Some("Someone"), config.author.as_ref().map(|a| a.name.as_str()));
        Ok(())
    }

    #[test]
    fn test_rejects_inverted_font_sizes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "title: Example
site_root: https://example.org/
tag_cloud: { min_font_size: 30, max_font_size: 10 }
",
        )?;
        assert!(Config::from_directory(dir.path(), Path::new("/tmp/out")).is_err());
        Ok(())
    }
}
