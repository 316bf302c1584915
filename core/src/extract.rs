//! Visible-text and hyperlink extraction from raw HTML.

use lazy_static::lazy_static;
use scraper::{Html, Node, Selector};

lazy_static! {
    static ref SEL_TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref SEL_A: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Elements whose text content is never visible.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub anchor_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub title: Option<String>,
    pub text: String,
    /// Links in source order, duplicates kept.
    pub links: Vec<Link>,
    /// Number of recoveries the HTML parser had to make.
    pub parse_errors: usize,
}

/// Extract `(title, text, links)` from one document. Never fails: broken markup yields
/// whatever the parser could recover, and an empty input yields an empty result.
pub fn extract(bytes: &[u8]) -> Extracted {
    if bytes.is_empty() { return Extracted::default(); }
    let body = String::from_utf8_lossy(bytes);
    let doc = Html::parse_document(&body);

    let title = doc
        .select(&SEL_TITLE)
        .next()
        .map(|n| collapse_ws(&n.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty());

    let links = doc
        .select(&SEL_A)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            Some(Link {
                href: href.trim().to_string(),
                anchor_text: collapse_ws(&a.text().collect::<Vec<_>>().join(" ")),
            })
        })
        .collect();

    Extracted { title, text: visible_text(&doc), links, parse_errors: doc.errors.len() }
}

fn visible_text(doc: &Html) -> String {
    let mut out = String::new();
    for node in doc.root_element().descendants() {
        let Node::Text(text) = node.value() else { continue };
        let hidden = node.ancestors().any(|a| {
            a.value().as_element().is_some_and(|el| HIDDEN.contains(&el.name()))
        });
        if hidden { continue; }
        out.push_str(text);
        out.push(' ');
    }
    collapse_ws(&out)
}

pub(crate) fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_style_and_comments() {
        let html = br#"<html><head><title> My  Page </title><style>.x { color: red }</style></head>
            <body><!-- hidden remark --><p>Hello <b>world</b></p>
            <script>var secret = 1;</script><noscript>enable js</noscript></body></html>"#;
        let out = extract(html);
        assert_eq!(out.title.as_deref(), Some("My Page"));
        assert!(out.text.contains("Hello world"));
        for banned in ["secret", "color", "remark", "enable"] {
            assert!(!out.text.contains(banned), "{banned} leaked into {:?}", out.text);
        }
    }

    #[test]
    fn links_keep_source_order_and_duplicates() {
        let html = br#"<body><a href="b.html">Bee</a> <a href="a.html">  Ay
            one </a><a href="b.html">Bee again</a><a name="anchor-only">x</a></body>"#;
        let out = extract(html);
        let hrefs: Vec<_> = out.links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["b.html", "a.html", "b.html"]);
        assert_eq!(out.links[1].anchor_text, "Ay one");
    }

    #[test]
    fn malformed_markup_is_best_effort() {
        let out = extract(b"<html><body><p>unclosed <div>text <a href='x.html'>go");
        assert!(out.text.contains("unclosed"));
        assert_eq!(out.links.len(), 1);
        assert!(out.title.is_none());

        let empty = extract(b"");
        assert!(empty.text.is_empty() && empty.links.is_empty());
    }
}
