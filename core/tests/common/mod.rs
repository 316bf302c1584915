#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;

/// Zip `files` (name, contents) into memory.
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    zip_bytes_with(files, zip::write::SimpleFileOptions::default())
}

/// Like [`zip_bytes`] but every entry is stored uncompressed, so page bytes appear
/// verbatim in the archive.
pub fn stored_zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    zip_bytes_with(files, zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored))
}

fn zip_bytes_with(files: &[(&str, &str)], options: zip::write::SimpleFileOptions) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        for (name, body) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
    std::fs::write(path, zip_bytes(files)).unwrap();
}

pub fn page(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
}

/// A small site: index links to two pages, one of which links on; an orphan page and a
/// stylesheet sit alongside.
pub fn site() -> Vec<(&'static str, String)> {
    vec![
        ("rhf/index.html", page("Home", r#"<p>welcome home</p>
            <a href="a.html">Alpha page</a> <a href="sub/b.htm#part">bravo notes</a>
            <a href="http://example.com/ext.html">external</a> <a href="style.css">css</a>"#)),
        ("rhf/a.html", page("Alpha", r#"<p>alpha content about cats</p><a href="sub/b.htm">Bravo</a>
            <a href="a.html">self</a><script>var zebra = 1;</script>"#)),
        ("rhf/sub/b.htm", page("Bravo", r#"<p>bravo content about dogs</p><a href="../index.html">home</a>
            <a href="../missing.html">missing</a>"#)),
        ("rhf/orphan.html", page("Orphan", "<p>nobody links to this lonely page</p>")),
        ("rhf/empty.html", "<html><body><p>the of and</p></body></html>".to_string()),
        ("rhf/style.css", "body { color: red }".to_string()),
    ]
}

pub fn site_files<'a>(site: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    site.iter().map(|(n, b)| (*n, b.as_str())).collect()
}
