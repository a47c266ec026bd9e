//! RSS 2.0 / Atom payload parser.
//!
//! The payload is read into a small namespace-resolved element tree first so
//! that lookups can mirror the way feeds are actually written: RSS field
//! names are tried first, Atom-namespaced names only when the RSS lookup
//! leaves the title or link empty. Atom `entry` elements are considered only
//! when the document has no RSS `item` at all.

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use regex::bytes::Regex;

use crate::error::FeedError;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Only this much of the payload is searched for an XML declaration.
const PROLOG_WINDOW: usize = 512;

static DECLARED_ENCODING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]*?\bencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
        .expect("encoding declaration pattern is valid")
});

/// Deepest element nesting accepted. Real feeds stay in single digits.
const MAX_DEPTH: usize = 256;

/// One headline as found in the feed, before it is attributed to a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published_at: String,
    /// Publisher named by an RSS `<source>` element, if any.
    pub publisher: Option<String>,
}

#[derive(Debug, Default)]
struct Element {
    ns: Option<String>,
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(ns: &ResolveResult, start: &BytesStart) -> Self {
        let ns = match ns {
            ResolveResult::Bound(Namespace(ns)) => Some(String::from_utf8_lossy(ns).into_owned()),
            _ => None,
        };
        let attrs = start
            .attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                let value = match attr.unescape_value() {
                    Ok(v) => v.into_owned(),
                    Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                };
                (key, value)
            })
            .collect();

        Element {
            ns,
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attrs,
            ..Default::default()
        }
    }

    fn is(&self, ns: Option<&str>, name: &str) -> bool {
        self.ns.as_deref() == ns && self.name == name
    }

    fn child(&self, ns: Option<&str>, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(ns, name))
    }

    fn child_text(&self, ns: Option<&str>, name: &str) -> &str {
        self.child(ns, name).map(|c| c.text.trim()).unwrap_or("")
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Pre-order search below `self`, like ElementPath's `.//name`.
    fn descendants(&self, ns: Option<&str>, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        let mut pending: Vec<&Element> = self.children.iter().rev().collect();
        while let Some(element) = pending.pop() {
            if element.is(ns, name) {
                found.push(element);
            }
            pending.extend(element.children.iter().rev());
        }
        found
    }
}

fn parse_tree(xml: &str) -> Result<Element, FeedError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Element::default()];
    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                // The sentinel root is not counted.
                if stack.len() > MAX_DEPTH {
                    return Err(FeedError::Xml("document nested too deeply".to_string()));
                }
                stack.push(Element::open(&ns, &e));
            }
            (ns, Event::Empty(e)) => {
                let element = Element::open(&ns, &e);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            (_, Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FeedError::Xml("unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Err(FeedError::Xml("unbalanced end tag".to_string())),
                }
            }
            (_, Event::Text(t)) => {
                let text = match t.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(_) => String::from_utf8_lossy(&t).into_owned(),
                };
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            (_, Event::CData(c)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) if !root.children.is_empty() => Ok(root),
        (Some(_), true) => Err(FeedError::Xml("document has no root element".to_string())),
        _ => Err(FeedError::Xml("unexpected end of document".to_string())),
    }
}

/// Atom `<link href>`: the alternate link if one is marked, else the first.
fn atom_link(element: &Element) -> String {
    let links: Vec<&Element> = element
        .children
        .iter()
        .filter(|c| c.is(Some(ATOM_NS), "link"))
        .collect();
    links
        .iter()
        .find(|l| matches!(l.attr("rel"), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|l| l.attr("href"))
        .unwrap_or("")
        .trim()
        .to_string()
}

fn extract(element: &Element) -> Option<FeedEntry> {
    let mut title = element.child_text(None, "title").to_string();
    let mut link = element.child_text(None, "link").to_string();
    let mut published_at = [
        element.child_text(None, "pubDate"),
        element.child_text(Some(DC_NS), "date"),
    ]
    .into_iter()
    .find(|d| !d.is_empty())
    .unwrap_or("")
    .to_string();

    if link.is_empty() {
        link = atom_link(element);
    }
    if title.is_empty() {
        title = element.child_text(Some(ATOM_NS), "title").to_string();
    }
    if published_at.is_empty() {
        published_at = [
            element.child_text(Some(ATOM_NS), "updated"),
            element.child_text(Some(ATOM_NS), "published"),
        ]
        .into_iter()
        .find(|d| !d.is_empty())
        .unwrap_or("")
        .to_string();
    }

    if title.is_empty() {
        return None;
    }

    let publisher = Some(element.child_text(None, "source"))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(FeedEntry {
        title,
        link,
        published_at,
        publisher,
    })
}

/// Decode a raw feed body to text.
///
/// A byte order mark wins, then the `encoding` of the XML declaration, then
/// UTF-8. Undecodable sequences become U+FFFD.
pub fn decode_payload(payload: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(payload) {
        let (text, _) = encoding.decode_without_bom_handling(&payload[bom_len..]);
        return text.into_owned();
    }

    let prolog = &payload[..payload.len().min(PROLOG_WINDOW)];
    // A declaration readable as ASCII rules out UTF-16, so such labels fall back to UTF-8.
    let encoding = DECLARED_ENCODING
        .captures(prolog)
        .and_then(|caps| Encoding::for_label(&caps[1]))
        .map(Encoding::output_encoding)
        .unwrap_or(UTF_8);
    let (text, _) = encoding.decode_without_bom_handling(payload);
    text.into_owned()
}

/// [`parse_feed`] over a raw body, decoded with [`decode_payload`].
pub fn parse_feed_bytes(payload: &[u8], count: usize) -> Result<Vec<FeedEntry>, FeedError> {
    parse_feed(&decode_payload(payload), count)
}

/// Parse an RSS 2.0 or Atom document into at most `count` entries.
///
/// The first `count` item (or entry) elements are taken in document order;
/// those without a usable title are then dropped, so fewer than `count`
/// entries may come back.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] if the payload is not well-formed XML.
pub fn parse_feed(xml: &str, count: usize) -> Result<Vec<FeedEntry>, FeedError> {
    let root = parse_tree(xml)?;

    let mut elements = root.descendants(None, "item");
    if elements.is_empty() {
        elements = root.descendants(Some(ATOM_NS), "entry");
    }

    Ok(elements
        .into_iter()
        .take(count)
        .filter_map(extract)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE_NEWS_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>"AI" - Google 뉴스</title>
    <link>https://news.google.com/search?q=AI</link>
    <item>
      <title>삼성전자, 온디바이스 AI 칩 공개 - 연합뉴스</title>
      <link>https://news.google.com/rss/articles/one</link>
      <pubDate>Mon, 06 May 2025 01:00:00 GMT</pubDate>
      <source url="https://www.yna.co.kr">연합뉴스</source>
    </item>
    <item>
      <title>Nvidia &amp; OpenAI sign deal</title>
      <link>https://news.google.com/rss/articles/two</link>
      <pubDate>Mon, 06 May 2025 00:30:00 GMT</pubDate>
      <source url="https://www.reuters.com">Reuters</source>
    </item>
    <item>
      <title><![CDATA[LLM 경쟁 <격화>]]></title>
      <link>https://news.google.com/rss/articles/three</link>
      <pubDate>Sun, 05 May 2025 23:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>The Verge - AI</title>
  <link rel="self" href="https://www.theverge.com/rss/ai/index.xml"/>
  <entry>
    <title type="html">A new model beats the benchmark</title>
    <link rel="alternate" type="text/html" href="https://www.theverge.com/ai/1"/>
    <updated>2025-05-06T10:00:00-04:00</updated>
  </entry>
  <entry>
    <title>Second story</title>
    <link rel="enclosure" href="https://cdn.example.com/img.jpg"/>
    <link href="https://www.theverge.com/ai/2"/>
    <published>2025-05-05T09:00:00-04:00</published>
  </entry>
</feed>"#;

    #[test]
    fn test_parses_rss_items_with_publisher() {
        let entries = parse_feed(GOOGLE_NEWS_RSS, 5).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "삼성전자, 온디바이스 AI 칩 공개 - 연합뉴스");
        assert_eq!(entries[0].link, "https://news.google.com/rss/articles/one");
        assert_eq!(entries[0].published_at, "Mon, 06 May 2025 01:00:00 GMT");
        assert_eq!(entries[0].publisher.as_deref(), Some("연합뉴스"));
        assert_eq!(entries[1].title, "Nvidia & OpenAI sign deal");
        assert_eq!(entries[2].title, "LLM 경쟁 <격화>");
        assert_eq!(entries[2].publisher, None);
    }

    #[test]
    fn test_rss_respects_count() {
        let entries = parse_feed(GOOGLE_NEWS_RSS, 2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].link, "https://news.google.com/rss/articles/two");
    }

    #[test]
    fn test_rss_skips_items_without_title() {
        let xml = r#"<rss><channel>
            <item><title>   </title><link>https://a</link></item>
            <item><link>https://b</link></item>
            <item><title> Kept </title><link>https://c</link></item>
        </channel></rss>"#;
        let entries = parse_feed(xml, 5).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Kept");
        assert_eq!(entries[0].link, "https://c");
    }

    #[test]
    fn test_count_applies_before_title_filter() {
        let xml = r#"<rss><channel>
            <item><title></title></item>
            <item><title>Second</title></item>
            <item><title>Third</title></item>
        </channel></rss>"#;
        let entries = parse_feed(xml, 2).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Second");
    }

    #[test]
    fn test_falls_back_to_atom_entries() {
        let entries = parse_feed(ATOM_FEED, 5).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "A new model beats the benchmark");
        assert_eq!(entries[0].link, "https://www.theverge.com/ai/1");
        assert_eq!(entries[0].published_at, "2025-05-06T10:00:00-04:00");
        assert_eq!(entries[1].link, "https://www.theverge.com/ai/2");
        assert_eq!(entries[1].published_at, "2025-05-05T09:00:00-04:00");
    }

    #[test]
    fn test_atom_with_prefixed_namespace() {
        let xml = r#"<a:feed xmlns:a="http://www.w3.org/2005/Atom">
            <a:entry><a:title>Prefixed</a:title><a:link href="https://x/1"/></a:entry>
        </a:feed>"#;
        let entries = parse_feed(xml, 5).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Prefixed");
        assert_eq!(entries[0].link, "https://x/1");
    }

    #[test]
    fn test_rss_item_with_atom_link_and_dc_date() {
        let xml = r#"<rss xmlns:atom="http://www.w3.org/2005/Atom"
                         xmlns:dc="http://purl.org/dc/elements/1.1/">
            <channel><item>
                <title>Only atom link</title>
                <atom:link href="https://example.com/story"/>
                <dc:date>2025-05-06T08:00:00Z</dc:date>
            </item></channel></rss>"#;
        let entries = parse_feed(xml, 5).unwrap();
        assert_eq!(entries[0].link, "https://example.com/story");
        assert_eq!(entries[0].published_at, "2025-05-06T08:00:00Z");
    }

    #[test]
    fn test_atom_not_used_when_rss_items_exist() {
        let xml = r#"<rss xmlns:atom="http://www.w3.org/2005/Atom"><channel>
            <item><title>RSS</title></item>
            <atom:entry><atom:title>Atom</atom:title></atom:entry>
        </channel></rss>"#;
        let entries = parse_feed(xml, 5).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "RSS");
    }

    #[test]
    fn test_empty_channel_returns_empty_vec() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        assert!(parse_feed(xml, 5).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(matches!(
            parse_feed("<rss><channel><item><title>Unclosed", 5),
            Err(FeedError::Xml(_))
        ));
        assert!(matches!(
            parse_feed("<rss><channel></item></rss>", 5),
            Err(FeedError::Xml(_))
        ));
        assert!(matches!(parse_feed("<html>not a feed", 5), Err(FeedError::Xml(_))));
    }

    #[test]
    fn test_non_xml_body_is_an_error() {
        assert!(matches!(parse_feed("", 5), Err(FeedError::Xml(_))));
        assert!(matches!(parse_feed("Service Unavailable", 5), Err(FeedError::Xml(_))));
    }

    #[test]
    fn test_deeply_nested_document_is_rejected() {
        let depth = 200_000;
        let xml = format!("<rss>{}{}</rss>", "<a>".repeat(depth), "</a>".repeat(depth));
        assert!(matches!(parse_feed(&xml, 5), Err(FeedError::Xml(_))));
    }

    #[test]
    fn test_nesting_up_to_the_limit_is_accepted() {
        let wrappers = MAX_DEPTH - 3;
        let xml = format!(
            "{}<item><title>Deep</title></item>{}",
            "<a>".repeat(wrappers),
            "</a>".repeat(wrappers)
        );
        let entries = parse_feed(&xml, 5).unwrap();
        assert_eq!(entries[0].title, "Deep");
    }

    #[test]
    fn test_items_are_found_in_document_order() {
        let xml = "<rss><channel><item><title>1</title></item>\
                   <group><item><title>2</title></item></group>\
                   <item><title>3</title></item></channel></rss>";
        let titles: Vec<_> = parse_feed(xml, 5).unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, ["1", "2", "3"]);
    }

    #[test]
    fn test_declared_legacy_encoding_is_honoured() {
        let xml = r#"<?xml version="1.0" encoding="euc-kr"?>
<rss version="2.0"><channel><item><title>삼성전자 AI 칩 공개</title><link>https://example.kr/1</link></item></channel></rss>"#;
        let (payload, _, unmappable) = encoding_rs::EUC_KR.encode(xml);
        assert!(!unmappable);
        assert!(std::str::from_utf8(&payload).is_err());

        let entries = parse_feed_bytes(&payload, 5).unwrap();
        assert_eq!(entries[0].title, "삼성전자 AI 칩 공개");
    }

    #[test]
    fn test_decode_payload_defaults() {
        assert_eq!(decode_payload("<rss>한글</rss>".as_bytes()), "<rss>한글</rss>");
        let with_bom = [&[0xEF, 0xBB, 0xBF][..], "<rss/>".as_bytes()].concat();
        assert_eq!(decode_payload(&with_bom), "<rss/>");
        assert_eq!(
            decode_payload(br#"<?xml version="1.0" encoding="UTF-16"?><rss/>"#),
            r#"<?xml version="1.0" encoding="UTF-16"?><rss/>"#
        );
        assert_eq!(
            decode_payload(br#"<?xml version="1.0" encoding="no-such-charset"?><rss/>"#),
            r#"<?xml version="1.0" encoding="no-such-charset"?><rss/>"#
        );
    }
}
