//! arXiv Atom feed parser using quick-xml

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Metadata of one arXiv paper
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArxivPaper {
    /// Versioned id from the entry's `<id>` URL, e.g. `1706.03762v7`
    pub versioned_id: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    /// In feed order
    pub authors: Vec<String>,
    /// `YYYY-MM-DD`
    pub published_date: Option<String>,
    pub journal_ref: Option<String>,
}

impl ArxivPaper {
    /// Author names joined with ", "
    pub fn authors_text(&self) -> Option<String> {
        (!self.authors.is_empty()).then(|| self.authors.join(", "))
    }
}

#[derive(Debug, Default)]
struct Entry {
    id: String,
    title: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    authors: Vec<String>,
    journal_ref: Option<String>,
}

/// Parse the first `<entry>` of an arXiv API response.
///
/// A feed without entries, or with an API error entry, is an error.
pub fn parse_feed(xml: &str) -> Result<ArxivPaper> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"entry" => {
                let entry = parse_entry(&mut reader)?;
                return into_paper(entry);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("XML parse error"),
            _ => {}
        }
        buf.clear();
    }

    anyhow::bail!("no paper entry in arXiv response")
}

fn into_paper(entry: Entry) -> Result<ArxivPaper> {
    if entry.id.contains("/api/errors") {
        anyhow::bail!(
            "arXiv API error: {}",
            entry.summary.as_deref().unwrap_or("unknown")
        );
    }

    Ok(ArxivPaper {
        versioned_id: entry
            .id
            .rsplit_once("/abs/")
            .map(|(_, id)| id.to_string()),
        title: entry.title.map(|t| collapse_whitespace(&t)),
        abstract_text: entry.summary.map(|s| s.trim().to_string()),
        authors: entry.authors,
        published_date: entry.published.as_deref().map(date_part),
        journal_ref: entry.journal_ref,
    })
}

fn parse_entry(reader: &mut Reader<&[u8]>) -> Result<Entry> {
    let mut entry = Entry::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"id" => entry.id = read_text(reader)?,
                b"title" => entry.title = Some(read_text(reader)?),
                b"summary" => entry.summary = Some(read_text(reader)?),
                b"published" => entry.published = Some(read_text(reader)?),
                b"journal_ref" => entry.journal_ref = Some(read_text(reader)?),
                b"author" => {
                    if let Some(name) = parse_author(reader)? {
                        entry.authors.push(name);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"entry" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entry)
}

fn parse_author(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let mut name = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"name" => {
                let text = read_text(reader)?;
                if !text.is_empty() {
                    name = Some(text);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(name)
}

/// Read text until the current element closes
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => text.push_str(&read_text(reader)?),
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Titles wrap across lines in the feed
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `2017-06-12T17:57:34Z` → `2017-06-12`
fn date_part(timestamp: &str) -> String {
    timestamp
        .split_once('T')
        .map_or(timestamp, |(date, _)| date)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATTENTION: &str = include_str!("../tests/fixtures/attention.xml");
    const EMPTY: &str = include_str!("../tests/fixtures/empty.xml");
    const ERROR: &str = include_str!("../tests/fixtures/error.xml");

    #[test]
    fn parses_entry_fields() {
        let paper = parse_feed(ATTENTION).unwrap();

        assert_eq!(paper.title.as_deref(), Some("Attention Is All You Need"));
        assert_eq!(paper.published_date.as_deref(), Some("2017-06-12"));
        assert_eq!(paper.versioned_id.as_deref(), Some("1706.03762v7"));
        assert_eq!(paper.journal_ref.as_deref(), Some("NeurIPS 2017"));
        assert_eq!(
            paper.authors,
            ["Ashish Vaswani", "Noam Shazeer", "Niki Parmar"]
        );
        assert_eq!(
            paper.authors_text().as_deref(),
            Some("Ashish Vaswani, Noam Shazeer, Niki Parmar")
        );
    }

    #[test]
    fn abstract_is_trimmed_and_unescaped() {
        let paper = parse_feed(ATTENTION).unwrap();
        let text = paper.abstract_text.unwrap();
        assert!(text.starts_with("The dominant sequence"));
        assert!(text.ends_with("neural networks & attention."));
    }

    #[test]
    fn feed_title_is_not_paper_title() {
        let paper = parse_feed(ATTENTION).unwrap();
        assert!(!paper.title.unwrap().starts_with("ArXiv Query"));
    }

    #[test]
    fn feed_without_entry_is_error() {
        let err = parse_feed(EMPTY).unwrap_err();
        assert!(err.to_string().contains("no paper entry"));
    }

    #[test]
    fn api_error_entry_is_error() {
        let err = parse_feed(ERROR).unwrap_err();
        assert!(err.to_string().contains("incorrect id format for bogus"));
    }

    #[test]
    fn date_part_without_time() {
        assert_eq!(date_part("2017-06-12"), "2017-06-12");
        assert_eq!(date_part("2017-06-12T17:57:34Z"), "2017-06-12");
    }

    #[test]
    fn entry_without_authors() {
        let xml = r#"<feed><entry><id>http://arxiv.org/abs/2401.00001v1</id><title>T</title></entry></feed>"#;
        let paper = parse_feed(xml).unwrap();
        assert!(paper.authors.is_empty());
        assert_eq!(paper.authors_text(), None);
        assert_eq!(paper.published_date, None);
    }
}
