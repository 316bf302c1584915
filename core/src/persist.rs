use crate::InvertedIndex;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const CACHE_VERSION: u32 = 1;

/// What a cached index was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSignature {
    pub path: String,
    pub size: u64,
    pub modified_secs: u64,
    pub modified_nanos: u32,
    pub seed: String,
    pub sweep_unlinked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub signature: ArchiveSignature,
    pub num_docs: u32,
    pub created_at: String,
}

/// Files of one cache entry.
pub struct CachePaths {
    pub root: PathBuf,
}

impl CachePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_index(paths: &CachePaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    let bytes = bincode::serialize(index)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_index(paths: &CachePaths) -> Result<InvertedIndex> {
    let mut f = File::open(paths.index())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index: InvertedIndex = bincode::deserialize(&buf)?;
    ensure!(index.num_docs as usize == index.docs.len(), "document table does not match document count");
    ensure!(index.df.len() == index.postings.len() && index.terms.len() == index.postings.len(), "term tables disagree");
    Ok(index)
}

/// Write the entry's meta file. Callers write it after the index blob, so an entry whose
/// meta is missing never validates.
pub fn save_meta(paths: &CachePaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_vec_pretty(meta)?;
    std::fs::write(paths.meta(), json)?;
    Ok(())
}

/// Read the meta file and check it was written by this cache version for `expected`.
pub fn load_meta(paths: &CachePaths, expected: &ArchiveSignature) -> Result<MetaFile> {
    let bytes = std::fs::read(paths.meta())?;
    let meta: MetaFile = serde_json::from_slice(&bytes)?;
    ensure!(meta.version == CACHE_VERSION, "cache version {} != {}", meta.version, CACHE_VERSION);
    ensure!(&meta.signature == expected, "archive signature changed");
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn signature(size: u64) -> ArchiveSignature {
        ArchiveSignature {
            path: "/data/rhf.zip".into(),
            size,
            modified_secs: 1_700_000_000,
            modified_nanos: 0,
            seed: "rhf/index.html".into(),
            sweep_unlinked: true,
        }
    }

    fn meta(version: u32, size: u64) -> MetaFile {
        MetaFile { version, signature: signature(size), num_docs: 3, created_at: "2024-01-01T00:00:00Z".into() }
    }

    #[test]
    fn meta_round_trips_for_matching_signature() {
        let dir = tempdir().unwrap();
        let paths = CachePaths::new(dir.path().join("entry"));
        save_meta(&paths, &meta(CACHE_VERSION, 42)).unwrap();
        assert_eq!(load_meta(&paths, &signature(42)).unwrap().num_docs, 3);
    }

    #[test]
    fn meta_rejects_other_versions_and_signatures() {
        let dir = tempdir().unwrap();
        let paths = CachePaths::new(dir.path());
        save_meta(&paths, &meta(CACHE_VERSION + 1, 42)).unwrap();
        let err = load_meta(&paths, &signature(42)).unwrap_err();
        assert!(err.to_string().contains("cache version"), "{err}");

        save_meta(&paths, &meta(CACHE_VERSION, 42)).unwrap();
        let err = load_meta(&paths, &signature(43)).unwrap_err();
        assert!(err.to_string().contains("signature"), "{err}");
    }
}
