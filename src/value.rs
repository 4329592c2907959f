//! Conversions from the crate's types into template [`Value`]s.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use gtmpl_value::Value;
use url::Url;

use crate::index::TagStats;
use crate::markdown::Heading;
use crate::weight::{Intensity, UsageLevel};

/// Builds a [`Value::Object`] from `(key, value)` pairs.
pub fn object<const N: usize>(fields: [(&str, Value); N]) -> Value {
    let mut m: HashMap<String, Value> = HashMap::with_capacity(N);
    for (key, value) in fields {
        m.insert(key.to_owned(), value);
    }
    Value::Object(m)
}

/// Inserts `(key, value)` into `target` if it's an object. Other values are
/// left untouched.
pub fn insert(target: &mut Value, key: &str, value: Value) {
    if let Value::Object(m) = target {
        m.insert(key.to_owned(), value);
    }
}

pub fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

pub fn url(url: &Url) -> Value {
    Value::String(url.to_string())
}

pub fn optional<T>(opt: Option<T>, f: impl FnOnce(T) -> Value) -> Value {
    match opt {
        Some(v) => f(v),
        None => Value::Nil,
    }
}

/// Dates render as `2021-04-16`; the time of day is rarely interesting on a
/// blog.
pub fn date(dt: &NaiveDateTime) -> Value {
    Value::String(dt.format("%Y-%m-%d").to_string())
}

/// Dates in ISO 8601 for `<time datetime="...">` attributes.
pub fn datetime(dt: &NaiveDateTime) -> Value {
    Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

pub fn count(n: usize) -> Value {
    Value::from(n as u64)
}

pub fn array(items: Vec<Value>) -> Value {
    Value::Array(items)
}

impl From<&Heading> for Value {
    fn from(h: &Heading) -> Value {
        object([
            ("level", count(h.level)),
            ("id", string(&h.id)),
            ("text", string(&h.text)),
        ])
    }
}

impl From<TagStats> for Value {
    fn from(stats: TagStats) -> Value {
        object([
            ("total_tags", count(stats.total_tags)),
            ("total_references", Value::from(stats.total_references)),
        ])
    }
}

impl From<Intensity> for Value {
    /// Renders as an object with the bucket `name` and its `class`.
    fn from(intensity: Intensity) -> Value {
        object([
            ("name", string(intensity.name())),
            ("class", string(intensity.css_class())),
        ])
    }
}

impl From<UsageLevel> for Value {
    fn from(level: UsageLevel) -> Value {
        string(level.css_class())
    }
}
