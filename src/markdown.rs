//! Converts document bodies from markdown to HTML and extracts the table of
//! contents shown beside each article.

use std::collections::HashMap;

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag};

/// An entry in an article's table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    /// The heading level as rendered, i.e., after shifting (see
    /// [`to_html`]).
    pub level: usize,

    /// The `id` attribute of the rendered heading, for `#fragment` links.
    pub id: String,

    /// The plain text of the heading.
    pub text: String,
}

/// A rendered document body.
#[derive(Clone, Debug, Default)]
pub struct Rendered {
    pub html: String,
    pub toc: Vec<Heading>,
}

/// Converts `markdown` to HTML.
///
/// The article title is the page's `h1`, so headings in the body are
/// demoted one level (`#` becomes `h2`, and so on, bottoming out at `h6`).
/// Every heading gets a slugified `id` which is also recorded in the table
/// of contents. Repeated slugs get a numeric suffix (`intro`, `intro-1`).
pub fn to_html(markdown: &str) -> Rendered {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events: Vec<Event> = Parser::new_ext(markdown, options).collect();
    let mut toc = Vec::new();
    let mut seen_ids: HashMap<String, usize> = HashMap::new();
    let mut converted: Vec<Event> = Vec::with_capacity(events.len());

    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                let level = demote(*level);
                let text = heading_text(&events[i + 1..]);
                let id = unique_id(&mut seen_ids, &text);
                converted.push(Event::Html(CowStr::from(format!(
                    "<h{} id=\"{}\">",
                    level, id
                ))));
                toc.push(Heading { level, id, text });
            }
            Event::End(Tag::Heading(level, _, _)) => {
                converted.push(Event::Html(CowStr::from(format!(
                    "</h{}>\n",
                    demote(*level)
                ))));
            }
            other => converted.push(other.clone()),
        }
    }

    let mut rendered = Rendered {
        html: String::with_capacity(markdown.len() * 3 / 2),
        toc,
    };
    html::push_html(&mut rendered.html, converted.into_iter());
    rendered
}

fn demote(level: HeadingLevel) -> usize {
    (level as usize + 1).min(6)
}

/// Concatenates the text of the events up to the end of the current
/// heading.
fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(Tag::Heading(..)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_owned()
}

fn unique_id(seen: &mut HashMap<String, usize>, text: &str) -> String {
    let mut base = slug::slugify(text);
    if base.is_empty() {
        base = String::from("section");
    }
    let n = seen.entry(base.clone()).or_insert(0);
    let id = match *n {
        0 => base,
        n => format!("{}-{}", base, n),
    };
    *n += 1;
    id
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_headings_are_demoted_and_anchored() {
        let rendered = to_html("# Intro\n\nText\n\n## Deep `dive`\n\n###### Bottom\n");
        assert!(rendered.html.contains("<h2 id=\"intro\">Intro</h2>"));
        assert!(rendered
            .html
            .contains("<h3 id=\"deep-dive\">Deep <code>dive</code></h3>"));
        assert!(rendered.html.contains("<h6 id=\"bottom\">Bottom</h6>"));
        assert_eq!(
            vec![
                Heading {
                    level: 2,
                    id: "intro".to_owned(),
                    text: "Intro".to_owned()
                },
                Heading {
                    level: 3,
                    id: "deep-dive".to_owned(),
                    text: "Deep dive".to_owned()
                },
                Heading {
                    level: 6,
                    id: "bottom".to_owned(),
                    text: "Bottom".to_owned()
                },
            ],
            rendered.toc
        );
    }

    #[test]
    fn test_repeated_headings_get_unique_ids() {
        let rendered = to_html("# Notes\n\n# Notes\n\n# ???\n");
        let ids: Vec<&str> = rendered.toc.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(vec!["notes", "notes-1", "section"], ids);
    }

    #[test]
    fn test_body_is_rendered() {
        let rendered = to_html("Some *emphasis* and ~~strike~~.");
        assert_eq!(
            "<p>Some <em>emphasis</em> and <del>strike</del>.</p>\n",
            rendered.html
        );
        assert!(rendered.toc.is_empty());
    }
}
