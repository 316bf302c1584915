//! Breadth-first spider over the hyperlink graph inside a zip archive.

use crate::error::{Result, SearchError};
use crate::extract::{extract, Extracted};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

/// Largest page body read out of the archive; anything bigger is indexed as empty.
pub const MAX_PAGE_BYTES: u64 = 16 * 1024 * 1024;

lazy_static::lazy_static! {
    static ref ARCHIVE_ROOT: Url = Url::parse("http://archive.invalid/").expect("valid base url");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Visit HTML entries no link reaches once the frontier drains.
    pub sweep_unlinked: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self { Self { sweep_unlinked: true } }
}

#[derive(Debug, Clone)]
pub struct CrawledPage {
    pub path: String,
    pub title: Option<String>,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Crawl {
    /// Pages in visit order.
    pub pages: Vec<CrawledPage>,
    /// Anchor text of every link pointing at a page, in discovery order.
    pub incoming_anchors: HashMap<String, Vec<String>>,
}

pub fn is_html(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}

/// Crawl the zip at `archive` starting from `seed`. The file is closed before returning.
pub fn crawl(archive: &Path, seed: &str, opts: &CrawlOptions) -> Result<Crawl> {
    let file = File::open(archive).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SearchError::NotFound {
            archive: archive.to_path_buf(),
            entry: archive.display().to_string(),
        },
        _ => SearchError::Io(e),
    })?;
    crawl_reader(file, archive, seed, opts)
}

/// Same as [`crawl`] over any seekable zip source. `label` only names the archive in errors.
pub fn crawl_reader<R: Read + Seek>(reader: R, label: &Path, seed: &str, opts: &CrawlOptions) -> Result<Crawl> {
    let malformed = |source| SearchError::MalformedArchive { archive: label.to_path_buf(), source };
    let mut zip = zip::ZipArchive::new(reader).map_err(malformed)?;

    // normalized path -> raw entry name
    let entries: BTreeMap<String, String> = zip
        .file_names()
        .filter(|name| is_html(name))
        .map(|name| (normalize_entry(name), name.to_string()))
        .collect();

    let start = resolve_seed(&entries, seed).ok_or_else(|| SearchError::NotFound {
        archive: label.to_path_buf(),
        entry: seed.to_string(),
    })?;
    info!(archive = %label.display(), seed = %start, html_entries = entries.len(), "crawl started");

    let mut out = Crawl::default();
    let mut seen: HashSet<String> = HashSet::from([start.clone()]);
    let mut frontier: VecDeque<String> = VecDeque::from([start]);
    let mut sweep = entries.keys();

    loop {
        let path = match frontier.pop_front() {
            Some(p) => p,
            None if opts.sweep_unlinked => match sweep.find(|p| !seen.contains(*p)) {
                Some(p) => {
                    debug!(path = %p, "sweeping unlinked page");
                    seen.insert(p.clone());
                    p.clone()
                }
                None => break,
            },
            None => break,
        };

        let page = read_page(&mut zip, &entries[&path], &path);
        for link in &page.links {
            let Some(target) = resolve_link(&path, &link.href) else { continue };
            if !entries.contains_key(&target) { continue; }
            if !link.anchor_text.is_empty() {
                out.incoming_anchors.entry(target.clone()).or_default().push(link.anchor_text.clone());
            }
            if seen.insert(target.clone()) {
                frontier.push_back(target);
            }
        }
        debug!(path = %path, links = page.links.len(), frontier = frontier.len(), "visited");
        out.pages.push(CrawledPage { path, title: page.title, text: page.text });
    }

    info!(pages = out.pages.len(), "crawl complete");
    Ok(out)
}

fn read_page<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, raw_name: &str, path: &str) -> Extracted {
    let read = zip
        .by_name(raw_name)
        .map_err(|e| e.to_string())
        .and_then(|entry| read_bounded(entry, MAX_PAGE_BYTES));
    let buf = match read {
        Ok(buf) => buf,
        Err(reason) => {
            let err = SearchError::ParseDegraded { path: path.to_string(), reason };
            warn!(error = %err, "indexing page as empty");
            return Extracted::default();
        }
    };
    let page = extract(&buf);
    if page.parse_errors > 0 {
        debug!(path, parse_errors = page.parse_errors, "html parser recovered from errors");
    }
    page
}

fn read_bounded(entry: impl Read, max_bytes: u64) -> std::result::Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    // one byte past the limit tells an exact fit from an oversized entry
    entry.take(max_bytes + 1).read_to_end(&mut buf).map_err(|e| e.to_string())?;
    if buf.len() as u64 > max_bytes {
        return Err(format!("entry exceeds size limit ({max_bytes} bytes)"));
    }
    Ok(buf)
}

fn resolve_seed(entries: &BTreeMap<String, String>, seed: &str) -> Option<String> {
    let seed = normalize_entry(seed);
    if entries.contains_key(&seed) { return Some(seed); }
    let lower = seed.to_ascii_lowercase();
    let alternate = if lower.ends_with(".html") {
        seed[..seed.len() - 1].to_string()
    } else if lower.ends_with(".htm") {
        format!("{seed}l")
    } else {
        format!("{}/index.html", seed.trim_end_matches('/'))
    };
    debug!(seed = %seed, alternate = %alternate, "seed missing, trying alternate spelling");
    entries.contains_key(&alternate).then_some(alternate)
}

fn normalize_entry(name: &str) -> String {
    let name = name.replace('\\', "/");
    let mut s = name.as_str();
    loop {
        if let Some(rest) = s.strip_prefix("./") {
            s = rest;
        } else if let Some(rest) = s.strip_prefix('/') {
            s = rest;
        } else {
            break;
        }
    }
    s.to_string()
}

/// Resolve `href` found in the page at `base` to an archive path. Returns `None` for
/// external or empty links. Percent-escapes are decoded so `my%20page.html` names the
/// entry `my page.html`.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    let href = href.trim().replace('\\', "/");
    if href.starts_with("//") || Url::parse(&href).is_ok() {
        return None;
    }
    let target = href.split(['#', '?']).next().unwrap_or_default();
    if target.is_empty() {
        return None;
    }

    let page = ARCHIVE_ROOT.join(base).ok()?;
    let joined = page.join(target).ok()?;
    let decoded = urlencoding::decode(joined.path()).ok()?;
    let path = decoded.trim_start_matches('/');
    (!path.is_empty()).then(|| path.to_string())
}
