//! The library code for the `quire` static blog generator. The architecture
//! can be generally broken down into three distinct steps:
//!
//! 1. Parsing documents from source files on disk ([`crate::parser`])
//! 2. Indexing the documents ([`crate::index`])
//! 3. Converting the documents and the index into output files on disk
//!    ([`crate::write`])
//!
//! The index is computed once per build and shared by every page. It holds
//! how often each tag and category is used and the display label of each.
//! Pages combine it with the rest of the engine: [`crate::related`] picks
//! the related articles shown beside a document, [`crate::weight`] turns
//! tag counts into font sizes and color intensities, and [`crate::browse`]
//! sorts, filters and groups tags for the tag browser.
//!
//! Everything between parsing and writing is a pure function of the parsed
//! documents: no step mutates its input, so the index can be freely shared.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod browse;
pub mod build;
pub mod config;
pub mod document;
pub mod feed;
pub mod index;
pub mod logging;
pub mod markdown;
pub mod parser;
pub mod related;
pub mod route;
pub mod value;
pub mod weight;
pub mod write;
