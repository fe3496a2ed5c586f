//! Parallel record scanner
//!
//! Scatter/gather over a [`Corpus`] on a fixed-size rayon pool:
//!
//! - **Scatter**: each worker reads one file and hands its text to the
//!   per-file function
//! - **Gather**: results come back in corpus order, whatever the completion
//!   order was
//!
//! Read failures stay with their file. Cancellation is cooperative: once the
//! [`CancelToken`] is set, workers start no new files, files already being
//! processed finish, and every file never started is counted as skipped.

use crate::config::ScanConfig;
use crate::corpus::{Corpus, CorpusFile};
use crate::error::{ReadError, ScanError, ScanResult};
use crate::reader::RecordReader;
use rayon::prelude::*;
use reqtrace_core::{ParsedRecord, RecordParser, ScanTally, SourceLocation};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create unset token
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A file that could not be read
#[derive(Debug)]
pub struct ReadFailure {
    /// Location relative to the corpus root
    pub location: SourceLocation,
    /// Cause
    pub error: ReadError,
}

/// Gathered scan results
#[derive(Debug)]
pub struct ScanOutcome<T> {
    /// Per-file results in corpus order
    pub items: Vec<T>,
    /// Read failures in corpus order
    pub failures: Vec<ReadFailure>,
    /// Files never started because of cancellation
    pub skipped: Vec<SourceLocation>,
    /// Files discovered
    pub discovered: usize,
}

impl<T> ScanOutcome<T> {
    /// File counts for the analyzer
    #[must_use]
    pub fn tally(&self) -> ScanTally {
        ScanTally {
            discovered: self.discovered,
            failed: self.failures.len(),
            skipped: self.skipped.len(),
        }
    }

    /// Whether the scan was cut short
    #[inline]
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        !self.skipped.is_empty()
    }
}

enum Slot<T> {
    Done(T),
    Failed(ReadFailure),
    Skipped(SourceLocation),
}

/// Scans a corpus on a worker pool
#[derive(Debug, Clone)]
pub struct Scanner {
    workers: usize,
    reader: RecordReader,
    cancel: CancelToken,
}

impl Scanner {
    /// Create scanner from configuration
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            workers: config.worker_count(),
            reader: RecordReader::new(config.max_file_size),
            cancel: CancelToken::new(),
        }
    }

    /// Use an externally owned cancel token
    #[inline]
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this scanner
    #[inline]
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Worker count
    #[inline]
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Read every file and apply `per_file` to its text
    ///
    /// # Errors
    /// - `ScanError::WorkerPool` if the thread pool cannot be built
    pub fn scan_with<T, F>(&self, corpus: &Corpus, per_file: F) -> ScanResult<ScanOutcome<T>>
    where
        T: Send,
        F: Fn(&CorpusFile, &str) -> T + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("reqtrace-scan-{i}"))
            .build()
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;

        let slots: Vec<Slot<T>> = pool.install(|| {
            corpus
                .files()
                .par_iter()
                .map(|file| self.process(file, &per_file))
                .collect()
        });

        let mut outcome = ScanOutcome {
            items: Vec::with_capacity(slots.len()),
            failures: Vec::new(),
            skipped: Vec::new(),
            discovered: corpus.len(),
        };
        for slot in slots {
            match slot {
                Slot::Done(item) => outcome.items.push(item),
                Slot::Failed(failure) => outcome.failures.push(failure),
                Slot::Skipped(location) => outcome.skipped.push(location),
            }
        }

        tracing::info!(
            files = outcome.discovered,
            read = outcome.items.len(),
            failed = outcome.failures.len(),
            skipped = outcome.skipped.len(),
            workers = self.workers,
            "scan complete"
        );
        if outcome.was_cancelled() {
            tracing::warn!(skipped = outcome.skipped.len(), "scan cancelled");
        }

        Ok(outcome)
    }

    /// Read and parse every record
    ///
    /// # Errors
    /// - `ScanError::WorkerPool` if the thread pool cannot be built
    pub fn scan_records(&self, corpus: &Corpus) -> ScanResult<ScanOutcome<ParsedRecord>> {
        let parser = RecordParser::new();
        self.scan_with(corpus, |file, text| parser.parse(text, &file.location))
    }

    fn process<T, F>(&self, file: &CorpusFile, per_file: &F) -> Slot<T>
    where
        F: Fn(&CorpusFile, &str) -> T,
    {
        if self.cancel.is_cancelled() {
            return Slot::Skipped(file.location.clone());
        }
        match self.reader.read(&file.path) {
            Ok(text) => {
                tracing::debug!(location = %file.location, bytes = text.len(), "read record");
                Slot::Done(per_file(file, &text))
            }
            Err(error) => {
                tracing::warn!(location = %file.location, error = %error, "failed to read record");
                Slot::Failed(ReadFailure {
                    location: file.location.clone(),
                    error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn corpus(dir: &TempDir) -> Corpus {
        Corpus::discover(dir.path(), &ScanConfig::default()).unwrap()
    }

    #[test]
    fn results_keep_corpus_order() {
        let dir = TempDir::new().unwrap();
        for i in 0..40 {
            write(dir.path(), &format!("r/R-{i:03}.yml"), format!("R-{i:03}:\n").as_bytes());
        }
        let scanner = Scanner::new(&ScanConfig::default().with_jobs(4));
        let outcome = scanner.scan_records(&corpus(&dir)).unwrap();

        let ids: Vec<String> = outcome.items.iter().map(|r| r.id.to_string()).collect();
        let expected: Vec<String> = (0..40).map(|i| format!("R-{i:03}")).collect();
        assert_eq!(ids, expected);
        assert_eq!(outcome.tally(), ScanTally::from_records(40));
    }

    #[test]
    fn read_failures_are_isolated() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/A-1.yml", b"A-1:\n  links: [B-1]\n");
        write(dir.path(), "a/A-2.yml", &[0xff, 0xfe, 0x00]);
        write(dir.path(), "b/B-1.yml", b"B-1:\n");

        let outcome = Scanner::new(&ScanConfig::default().with_jobs(2))
            .scan_records(&corpus(&dir))
            .unwrap();
        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].location.as_str(), "a/A-2.yml");
        assert_eq!(
            outcome.tally(),
            ScanTally {
                discovered: 3,
                failed: 1,
                skipped: 0
            }
        );
    }

    #[test]
    fn cancelled_scan_skips_everything_not_started() {
        let dir = TempDir::new().unwrap();
        for i in 0..8 {
            write(dir.path(), &format!("R-{i}.yml"), b"X:\n");
        }
        let token = CancelToken::new();
        token.cancel();
        let scanner = Scanner::new(&ScanConfig::default()).with_cancel_token(token);
        let outcome = scanner.scan_records(&corpus(&dir)).unwrap();

        assert!(outcome.items.is_empty());
        assert_eq!(outcome.skipped.len(), 8);
        assert!(outcome.was_cancelled());
    }

    #[test]
    fn scan_with_custom_function() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "x/one.yml", b"abc");
        write(dir.path(), "x/two.yml", b"abcdef");
        let outcome = Scanner::new(&ScanConfig::default())
            .scan_with(&corpus(&dir), |file, text| (file.location.to_string(), text.len()))
            .unwrap();
        assert_eq!(
            outcome.items,
            vec![("x/one.yml".to_string(), 3), ("x/two.yml".to_string(), 6)]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn gather_order_is_independent_of_worker_count(
            count in 1usize..24,
            jobs in 1usize..8,
        ) {
            let dir = TempDir::new().unwrap();
            for i in 0..count {
                write(dir.path(), &format!("r/R-{i:02}.yml"), format!("R-{i:02}:\n").as_bytes());
            }
            let corpus = corpus(&dir);
            let serial = Scanner::new(&ScanConfig::default().with_jobs(1))
                .scan_records(&corpus)
                .unwrap();
            let parallel = Scanner::new(&ScanConfig::default().with_jobs(jobs))
                .scan_records(&corpus)
                .unwrap();

            prop_assert_eq!(&parallel.items, &serial.items);
            prop_assert_eq!(parallel.tally(), ScanTally::from_records(count));
        }
    }
}
