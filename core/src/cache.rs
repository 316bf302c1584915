//! Memoized crawl+index keyed by a signature of the source archive.

use crate::crawl::CrawlOptions;
use crate::error::{Result, SearchError};
use crate::persist::{load_index, load_meta, save_index, save_meta, ArchiveSignature, CachePaths, MetaFile, CACHE_VERSION};
use crate::pipeline::build_index;
use crate::InvertedIndex;
use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

pub struct IndexCache {
    dir: PathBuf,
    crawl: CrawlOptions,
}

impl IndexCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), crawl: CrawlOptions::default() }
    }

    pub fn with_crawl_options(mut self, crawl: CrawlOptions) -> Self { self.crawl = crawl; self }

    pub fn dir(&self) -> &Path { &self.dir }

    /// Return the cached index for `archive` if its signature still matches, else build
    /// and store a fresh one. The flag tells whether the cache was hit.
    pub fn load_or_build(&self, archive: &Path, seed: &str) -> Result<(InvertedIndex, bool)> {
        let signature = signature(archive, seed, &self.crawl)?;
        let paths = self.entry_paths(archive, &signature);

        if paths.root.exists() {
            match load_entry(&paths, &signature) {
                Ok(index) => {
                    info!(cache = %paths.root.display(), num_docs = index.num_docs, "loaded index from cache");
                    return Ok((index, true));
                }
                Err(reason) => {
                    let err = SearchError::CacheCorrupt { path: paths.root.clone(), reason: reason.to_string() };
                    warn!(error = %err, "rebuilding index");
                    let _ = fs::remove_dir_all(&paths.root);
                }
            }
        }

        let index = build_index(archive, seed, &self.crawl)?;
        match store_entry(&paths, &signature, &index) {
            Ok(()) => self.prune_stale(archive, &paths.root),
            Err(e) => warn!(cache = %paths.root.display(), error = %e, "could not write index cache"),
        }
        Ok((index, false))
    }

    /// Drop entries built from earlier versions of the same archive.
    fn prune_stale(&self, archive: &Path, keep: &Path) {
        let prefix = format!("{}-", entry_stem(archive));
        let Ok(entries) = fs::read_dir(&self.dir) else { return };
        for entry in entries.flatten() {
            let path = entry.path();
            let same_archive = entry
                .file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(&prefix) && n.len() == prefix.len() + 16);
            let stale = path != keep && same_archive;
            if stale && fs::remove_dir_all(&path).is_ok() {
                info!(cache = %path.display(), "removed stale cache entry");
            }
        }
    }

    fn entry_paths(&self, archive: &Path, signature: &ArchiveSignature) -> CachePaths {
        let stem = entry_stem(archive);
        let mut hasher = Sha1::new();
        hasher.update(serde_json::to_vec(signature).unwrap_or_default());
        let digest = format!("{:x}", hasher.finalize());
        CachePaths::new(self.dir.join(format!("{stem}-{}", &digest[..16])))
    }
}

fn entry_stem(archive: &Path) -> &str {
    archive.file_stem().and_then(|s| s.to_str()).unwrap_or("archive")
}

pub fn signature(archive: &Path, seed: &str, crawl: &CrawlOptions) -> Result<ArchiveSignature> {
    let not_found = |e: std::io::Error| match e.kind() {
        std::io::ErrorKind::NotFound => SearchError::NotFound {
            archive: archive.to_path_buf(),
            entry: archive.display().to_string(),
        },
        _ => SearchError::Io(e),
    };
    let abs = fs::canonicalize(archive).map_err(not_found)?;
    let meta = fs::metadata(&abs).map_err(not_found)?;
    let modified = meta.modified()?.duration_since(UNIX_EPOCH).unwrap_or_default();
    Ok(ArchiveSignature {
        path: abs.display().to_string(),
        size: meta.len(),
        modified_secs: modified.as_secs(),
        modified_nanos: modified.subsec_nanos(),
        seed: seed.to_string(),
        sweep_unlinked: crawl.sweep_unlinked,
    })
}

fn load_entry(paths: &CachePaths, signature: &ArchiveSignature) -> anyhow::Result<InvertedIndex> {
    let meta = load_meta(paths, signature)?;
    let index = load_index(paths)?;
    anyhow::ensure!(index.num_docs == meta.num_docs, "meta records {} documents, index holds {}", meta.num_docs, index.num_docs);
    Ok(index)
}

fn store_entry(paths: &CachePaths, signature: &ArchiveSignature, index: &InvertedIndex) -> anyhow::Result<()> {
    save_index(paths, index)?;
    let meta = MetaFile {
        version: CACHE_VERSION,
        signature: signature.clone(),
        num_docs: index.num_docs,
        created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
    };
    // meta goes last so a half-written entry never validates
    save_meta(paths, &meta)
}
