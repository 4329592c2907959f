//! Support for creating Atom feeds from a list of documents.

use std::io::Write;

use atom_syndication::{Category, Content, Entry, Feed, Link, Person};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::config::Author;
use crate::document::Document;
use crate::markdown::Rendered;
use crate::route::{self, Routes};

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,
    pub author: Option<&'a Author>,
    pub home_page: Url,
    pub feed_url: Url,

    /// The maximum number of entries.
    pub size: usize,
}

/// Creates a feed from the newest `config.size` of `documents` (which are
/// expected newest first) and writes it to `w`. `rendered` holds the
/// rendered body of each document, in the same order.
pub fn write_feed<W: Write>(
    config: &FeedConfig,
    routes: &Routes,
    documents: &[Document],
    rendered: &[Rendered],
    w: W,
) -> Result<()> {
    feed(config, routes, documents, rendered)?.write_to(w)?;
    Ok(())
}

fn feed(
    config: &FeedConfig,
    routes: &Routes,
    documents: &[Document],
    rendered: &[Rendered],
) -> Result<Feed> {
    let entries = documents
        .iter()
        .zip(rendered)
        .take(config.size)
        .map(|(d, r)| entry(routes, d, r))
        .collect::<Result<Vec<Entry>>>()?;

    Ok(Feed {
        title: config.title.into(),
        id: config.home_page.to_string(),
        updated: entries
            .iter()
            .map(|e| e.updated)
            .max()
            .unwrap_or_else(|| Utc::now().fixed_offset()),
        authors: config.author.map(person).into_iter().collect(),
        links: vec![
            Link {
                href: config.home_page.to_string(),
                rel: "alternate".to_owned(),
                ..Default::default()
            },
            Link {
                href: config.feed_url.to_string(),
                rel: "self".to_owned(),
                ..Default::default()
            },
        ],
        entries,
        ..Default::default()
    })
}

fn entry(routes: &Routes, document: &Document, rendered: &Rendered) -> Result<Entry> {
    let url = routes.document_url(&document.id)?;
    let published = utc(&document.published_at);
    Ok(Entry {
        id: url.to_string(),
        title: document.title.as_str().into(),
        updated: document.updated_at.as_ref().map(utc).unwrap_or(published),
        published: Some(published),
        summary: document.summary.as_deref().map(Into::into),
        content: Some(Content {
            value: Some(rendered.html.clone()),
            content_type: Some("html".to_owned()),
            ..Default::default()
        }),
        categories: document
            .labeled_tags()
            .map(|(tag, label)| Category {
                term: tag.to_owned(),
                label: Some(label.to_owned()),
                ..Default::default()
            })
            .collect(),
        links: vec![Link {
            href: url.to_string(),
            rel: "alternate".to_owned(),
            ..Default::default()
        }],
        ..Default::default()
    })
}

/// Front matter times carry no zone; they're taken to be UTC.
fn utc(dt: &NaiveDateTime) -> DateTime<FixedOffset> {
    dt.and_utc().fixed_offset()
}

fn person(author: &Author) -> Person {
    Person {
        name: author.name.clone(),
        email: author.email.clone(),
        ..Default::default()
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when an entry URL can't be built.
    #[error(transparent)]
    Route(#[from] route::Error),

    /// Returned when there is an error writing the feed.
    #[error(transparent)]
    Atom(#[from] atom_syndication::Error),
}
