//! Changes the working directory, so it lives in its own test binary.

use std::fs;
use std::path::Path;

use anyhow::Result;

use quire::config::{Config, PROJECT_FILE};

#[test]
fn test_relative_directory_below_project() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    fs::create_dir_all(root.join("theme"))?;
    fs::write(
        root.join(PROJECT_FILE),
        "title: Example\nsite_root: https://example.org/\n",
    )?;
    fs::write(
        root.join("theme").join("theme.yaml"),
        "blog_template: [blog.html]
post_template: [post.html]
category_template: [category.html]
tag_template: [tag.html]
tags_template: [tags.html]
",
    )?;
    let nested = root.join("content").join("blog");
    fs::create_dir_all(&nested)?;

    std::env::set_current_dir(&nested)?;
    let from_dot = Config::from_directory(Path::new("."), Path::new("_site"))?;
    let from_parent = Config::from_directory(Path::new(".."), Path::new("_site"))?;

    assert_eq!("Example", from_dot.title);
    assert_eq!("Example", from_parent.title);
    assert_eq!(
        fs::canonicalize(&nested)?,
        fs::canonicalize(&from_dot.content_directory)?
    );
    Ok(())
}
