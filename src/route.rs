//! URLs and output paths for every page of the site.
//!
//! Tag and category keys are arbitrary text (often not ASCII), so they're
//! percent-encoded when they become part of a URL and decoded when a URL
//! segment is turned back into a key. Everything outside this module works
//! with decoded keys only.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use url::Url;

/// The characters `encodeURIComponent` leaves alone are the alphanumerics
/// and `-_.!~*'()`; everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a tag or category key for use as a single URL path
/// segment.
pub fn encode_route_key(key: &str) -> Cow<'_, str> {
    utf8_percent_encode(key, COMPONENT).into()
}

/// Reverses [`encode_route_key`]. Invalid UTF-8 sequences are replaced
/// rather than rejected.
pub fn decode_route_key(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

/// Computes URLs and output file paths. The layout is:
///
/// * `{root}/index.html`: the article listing
/// * `{root}/blog/{id}.html`: one per document
/// * `{root}/category/{category}/index.html`: one per category
/// * `{root}/tag/{tag}/index.html`: one per tag
/// * `{root}/tag/index.html`: the tag browser
/// * `{root}/feed.atom`
///
/// where `{root}` is `site_root` for URLs and `output_directory` for files.
pub struct Routes<'a> {
    site_root: &'a Url,
    output_directory: &'a Path,
}

impl<'a> Routes<'a> {
    /// Constructs a new [`Routes`]. `site_root` should end in a trailing
    /// slash; otherwise its last path segment is treated as a file name and
    /// dropped by [`Url::join`].
    pub fn new(site_root: &'a Url, output_directory: &'a Path) -> Routes<'a> {
        Routes {
            site_root,
            output_directory,
        }
    }

    pub fn home_url(&self) -> Result<Url> {
        Ok(self.site_root.join("index.html")?)
    }

    pub fn home_path(&self) -> PathBuf {
        self.output_directory.join("index.html")
    }

    pub fn document_url(&self, id: &str) -> Result<Url> {
        let encoded: Vec<Cow<str>> = id.split('/').map(encode_route_key).collect();
        Ok(self
            .site_root
            .join(&format!("blog/{}.html", encoded.join("/")))?)
    }

    /// Document ids are source paths, so their segments are already valid
    /// file names.
    pub fn document_path(&self, id: &str) -> PathBuf {
        let mut path = self.output_directory.join("blog");
        let mut segments = id.split('/').peekable();
        while let Some(segment) = segments.next() {
            match segments.peek() {
                Some(_) => path.push(segment),
                // `set_extension` would clobber a dot in the id
                None => path.push(format!("{}.html", segment)),
            }
        }
        path
    }

    pub fn category_url(&self, category: &str) -> Result<Url> {
        // NOTE: `site_root.join("category").join(...)` would drop the
        // `category` segment since it has no trailing slash.
        Ok(self.site_root.join(&format!(
            "category/{}/index.html",
            encode_route_key(&directory_name(category))
        ))?)
    }

    pub fn category_path(&self, category: &str) -> PathBuf {
        self.output_directory
            .join("category")
            .join(&*directory_name(category))
            .join("index.html")
    }

    pub fn tag_url(&self, tag: &str) -> Result<Url> {
        Ok(self.site_root.join(&format!(
            "tag/{}/index.html",
            encode_route_key(&directory_name(tag))
        ))?)
    }

    pub fn tag_path(&self, tag: &str) -> PathBuf {
        self.output_directory
            .join("tag")
            .join(&*directory_name(tag))
            .join("index.html")
    }

    pub fn tags_url(&self) -> Result<Url> {
        Ok(self.site_root.join("tag/index.html")?)
    }

    pub fn tags_path(&self) -> PathBuf {
        self.output_directory.join("tag").join("index.html")
    }

    pub fn feed_url(&self) -> Result<Url> {
        Ok(self.site_root.join("feed.atom")?)
    }

    pub fn feed_path(&self) -> PathBuf {
        self.output_directory.join("feed.atom")
    }

    pub fn static_url(&self) -> Result<Url> {
        Ok(self.site_root.join("static/")?)
    }

    pub fn static_path(&self) -> PathBuf {
        self.output_directory.join("static")
    }
}

/// Returns the directory a tag or category page is written to. Keys are
/// used as-is unless they'd escape or collapse the directory: `%`, `/` and
/// `\` are percent-encoded, keys made only of dots have every dot encoded,
/// and the empty key becomes a lone `%` (which no other key can produce,
/// since every other `%` is followed by two hex digits). URLs encode the
/// directory name once more, so a server that decodes the request path
/// finds the directory.
pub fn directory_name(key: &str) -> Cow<'_, str> {
    if key.is_empty() {
        return Cow::Borrowed("%");
    }
    if key.chars().all(|c| c == '.') {
        return Cow::Owned("%2E".repeat(key.len()));
    }
    if !key.contains(['%', '/', '\\']) {
        return Cow::Borrowed(key);
    }
    let mut name = String::with_capacity(key.len() + 8);
    for c in key.chars() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            '\\' => name.push_str("%5C"),
            c => name.push(c),
        }
    }
    Cow::Owned(name)
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixture() -> (Url, PathBuf) {
        (
            Url::parse("https://example.org/blog-root/").unwrap(),
            PathBuf::from("/tmp/out"),
        )
    }

    #[test]
    fn test_encode_route_key() {
        assert_eq!("rust", encode_route_key("rust"));
        assert_eq!("C%2B%2B", encode_route_key("C++"));
        assert_eq!("a%20b%26c", encode_route_key("a b&c"));
        assert_eq!("%E6%95%B0%E6%8D%AE", encode_route_key("数据"));
        assert_eq!("it's(fine)!", encode_route_key("it's(fine)!"));
    }

    #[test]
    fn test_decode_route_key() {
        assert_eq!("数据", decode_route_key("%E6%95%B0%E6%8D%AE"));
        assert_eq!("C++", decode_route_key(&encode_route_key("C++")));
        assert_eq!("a b", decode_route_key("a%20b"));
    }

    #[test]
    fn test_urls() -> Result<()> {
        let (root, out) = fixture();
        let routes = Routes::new(&root, &out);
        assert_eq!(
            "https://example.org/blog-root/tag/C%2B%2B/index.html",
            routes.tag_url("C++")?.as_str()
        );
        assert_eq!(
            "https://example.org/blog-root/category/%E7%94%9F%E6%B4%BB/index.html",
            routes.category_url("生活")?.as_str()
        );
        assert_eq!(
            "https://example.org/blog-root/blog/notes/hello%20world.html",
            routes.document_url("notes/hello world")?.as_str()
        );
        assert_eq!(
            "https://example.org/blog-root/tag/index.html",
            routes.tags_url()?.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_paths() {
        let (root, out) = fixture();
        let routes = Routes::new(&root, &out);
        assert_eq!(
            PathBuf::from("/tmp/out/tag/C++/index.html"),
            routes.tag_path("C++")
        );
        assert_eq!(
            PathBuf::from("/tmp/out/category/生活/index.html"),
            routes.category_path("生活")
        );
        assert_eq!(
            PathBuf::from("/tmp/out/blog/notes/hello.html"),
            routes.document_path("notes/hello")
        );
        assert_eq!(
            PathBuf::from("/tmp/out/blog/release-v1.2.html"),
            routes.document_path("release-v1.2")
        );
    }

    #[test]
    fn test_directory_name() {
        assert_eq!("rust", directory_name("rust"));
        assert_eq!("C++", directory_name("C++"));
        assert_eq!("CI%2FCD", directory_name("CI/CD"));
        assert_eq!("a%5Cb", directory_name("a\\b"));
        assert_eq!("100%25", directory_name("100%"));
        assert_eq!("%2E", directory_name("."));
        assert_eq!("%2E%2E", directory_name(".."));
        assert_eq!("...more", directory_name("...more"));
        assert_eq!("%", directory_name(""));
    }

    #[test]
    fn test_awkward_keys_route_to_their_own_directory() -> Result<()> {
        let (root, out) = fixture();
        let routes = Routes::new(&root, &out);
        assert_eq!(
            PathBuf::from("/tmp/out/tag/CI%2FCD/index.html"),
            routes.tag_path("CI/CD")
        );
        // the URL decodes back to the directory name
        assert_eq!(
            "https://example.org/blog-root/tag/CI%252FCD/index.html",
            routes.tag_url("CI/CD")?.as_str()
        );
        assert_eq!(
            PathBuf::from("/tmp/out/category/%2E%2E/index.html"),
            routes.category_path("..")
        );
        assert_eq!(
            "https://example.org/blog-root/tag/%25/index.html",
            routes.tag_url("")?.as_str()
        );
        Ok(())
    }
}
