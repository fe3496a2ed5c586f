//! Testing utilities for the reqtrace workspace
//!
//! On-disk record corpora for scanner, report and CLI tests.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary workspace holding a corpus under `reqs/`
#[derive(Debug)]
pub struct CorpusFixture {
    dir: TempDir,
    root: PathBuf,
}

impl CorpusFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = dir.path().join("reqs");
        std::fs::create_dir_all(&root).expect("create corpus root");
        Self { dir, root }
    }

    /// Corpus root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a file relative to the root, creating parent directories
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, content).expect("write fixture file");
        path
    }

    /// Write a minimal record declaring `id` with inline links
    pub fn record(&self, rel: &str, id: &str, links: &[&str]) -> PathBuf {
        let body = if links.is_empty() {
            format!("{id}:\n  header: {id}\n")
        } else {
            format!("{id}:\n  header: {id}\n  links: [{}]\n", links.join(", "))
        };
        self.write(rel, body)
    }

    /// Path next to the corpus for outputs (not created)
    pub fn output_dir(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for CorpusFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Three-level chain: URD-1 ← SRD-1 ← SWD-1 (+ one artifact link)
pub fn chain_corpus() -> CorpusFixture {
    let fixture = CorpusFixture::new();
    fixture.write("urd/URD-1.yml", "URD-1:\n  header: Root need\n");
    fixture.write("srd/SRD-1.yml", "SRD-1:\n  header: System\n  links: [URD-1]\n");
    fixture.write(
        "swd/SWD-1.yml",
        "SWD-1:\n  header: Software\n  links: [SRD-1, \"artifacts/tests/report.xml\"]\n",
    );
    fixture
}

/// A complete, lint-clean record stored as `<id>.yml`
pub fn complete_record(id: &str, links: &[&str]) -> String {
    let mut text = format!(
        "{id}:\n  header: {id}\n  text: The system shall do {id}.\n  ASIL: B\n  Verification Method: Test\n  reviewers:\n    - name: Ada\n      email: ada@example.com\n  reviewed: 3f2a1c\n  ref: {id}\n"
    );
    if !links.is_empty() {
        text.push_str("  links:\n");
        for link in links {
            text.push_str(&format!("    - {link}\n"));
        }
    }
    text
}
