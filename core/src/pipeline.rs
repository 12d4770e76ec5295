//! Parallel map / single-writer reduce over a list of document paths.
//!
//! Workers only read files and send results by value. The reducer, running on
//! the calling thread, is the sole mutator of the [`SearchEngine`].

use crate::discover::clean_path;
use crate::error::{IndexError, Result};
use crate::index::SearchEngine;
use crate::mapper::{map_document, DocumentCounts};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::thread;

const WORKERS_PER_CPU: usize = 4;
const MIN_WORKERS: usize = 4;
/// Bounds concurrently open file descriptors.
const MAX_WORKERS: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Explicit worker count; `None` derives one from available parallelism.
    pub workers: Option<usize>,
}

impl PipelineConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers: Some(workers) }
    }

    /// Number of workers to spawn for `num_files` files.
    pub fn worker_count(&self, num_files: usize) -> usize {
        let cap = num_files.max(1);
        match self.workers {
            Some(n) => n.clamp(1, cap),
            None => {
                let avail = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
                default_worker_count(avail, num_files)
            }
        }
    }
}

/// `parallelism * 4`, kept within `[MIN_WORKERS, MAX_WORKERS]` and never above the file count.
pub fn default_worker_count(parallelism: usize, num_files: usize) -> usize {
    (parallelism * WORKERS_PER_CPU)
        .max(MIN_WORKERS)
        .min(MAX_WORKERS)
        .min(num_files.max(1))
}

/// A document the reducer had to leave out of the index.
#[derive(Debug)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub error: IndexError,
}

/// Outcome of one indexing pass.
#[derive(Debug)]
pub struct IndexReport {
    pub engine: SearchEngine,
    pub indexed: usize,
    pub skipped: Vec<SkippedDocument>,
    /// Paths whose result never arrived because a worker panicked.
    pub lost: usize,
    pub workers: usize,
}

/// One result per consumed path.
struct MapResult {
    path: PathBuf,
    outcome: Result<DocumentCounts>,
}

fn worker<F>(jobs: Receiver<PathBuf>, results: Sender<MapResult>, map: &F)
where
    F: Fn(&Path) -> Result<DocumentCounts>,
{
    for path in jobs {
        let outcome = map(&path);
        if results.send(MapResult { path, outcome }).is_err() {
            // reducer is gone
            return;
        }
    }
}

/// Folds map results into the engine. Never runs concurrently with itself.
struct Reducer {
    engine: SearchEngine,
    indexed: usize,
    skipped: Vec<SkippedDocument>,
}

impl Reducer {
    fn new() -> Self {
        Self { engine: SearchEngine::new(), indexed: 0, skipped: Vec::new() }
    }

    fn absorb(&mut self, result: MapResult) {
        let MapResult { path, outcome } = result;
        match outcome {
            Ok(counts) => {
                tracing::debug!(path = %path.display(), terms = counts.total, "indexed document");
                self.engine.add_document(doc_id(&path), counts);
                self.indexed += 1;
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable document");
                self.skipped.push(SkippedDocument { path, error });
            }
        }
    }
}

/// The document id for a path: the display form of its cleaned path.
pub fn doc_id(path: &Path) -> String {
    clean_path(path).display().to_string()
}

/// Map every path on a bounded worker pool and reduce the results into a new engine.
pub fn build_index(paths: &[PathBuf], config: &PipelineConfig) -> IndexReport {
    build_index_with(paths, config, map_document)
}

/// [`build_index`] with a caller-supplied map function.
///
/// A panicking map call loses that one document (counted in `lost`); the
/// reducer keeps everything else once the surviving workers drain the queue.
pub fn build_index_with<F>(paths: &[PathBuf], config: &PipelineConfig, map: F) -> IndexReport
where
    F: Fn(&Path) -> Result<DocumentCounts> + Sync,
{
    let mut reducer = Reducer::new();
    if paths.is_empty() {
        return IndexReport { engine: reducer.engine, indexed: 0, skipped: Vec::new(), lost: 0, workers: 0 };
    }

    let workers = config.worker_count(paths.len());
    tracing::info!(files = paths.len(), workers, "indexing");

    let (jobs_tx, jobs_rx) = bounded::<PathBuf>(0);
    let (results_tx, results_rx) = bounded::<MapResult>(workers);
    let map = &map;
    let mut received = 0;

    thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let jobs = jobs_rx.clone();
                let results = results_tx.clone();
                s.spawn(move || worker(jobs, results, map))
            })
            .collect();
        drop(jobs_rx);
        drop(results_tx);

        let feeder = s.spawn(move || {
            for p in paths {
                if jobs_tx.send(p.clone()).is_err() {
                    break;
                }
            }
            // dropping jobs_tx closes the job queue
        });

        while received < paths.len() {
            match results_rx.recv() {
                Ok(result) => {
                    reducer.absorb(result);
                    received += 1;
                }
                Err(_) => {
                    tracing::error!(received, expected = paths.len(), "result queue closed early");
                    break;
                }
            }
        }

        // Joined explicitly so a worker panic is logged instead of re-raised by the scope.
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("indexing worker panicked");
            }
        }
        if feeder.join().is_err() {
            tracing::error!("job feeder panicked");
        }
    });

    let lost = paths.len() - received;
    let Reducer { engine, indexed, skipped } = reducer;
    tracing::info!(indexed, skipped = skipped.len(), lost, terms = engine.num_terms(), "indexing complete");
    IndexReport { engine, indexed, skipped, lost, workers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn worker_count_policy() {
        assert_eq!(default_worker_count(1, 100), 4);
        assert_eq!(default_worker_count(4, 100), 16);
        assert_eq!(default_worker_count(64, 100), 32);
        assert_eq!(default_worker_count(8, 3), 3);
        assert_eq!(default_worker_count(8, 0), 1);
    }

    #[test]
    fn explicit_workers_are_clamped() {
        assert_eq!(PipelineConfig::with_workers(0).worker_count(10), 1);
        assert_eq!(PipelineConfig::with_workers(32).worker_count(10), 10);
        assert_eq!(PipelineConfig::with_workers(4).worker_count(10), 4);
    }

    #[test]
    fn empty_input_builds_empty_index() {
        let report = build_index(&[], &PipelineConfig::default());
        assert_eq!(report.engine.num_docs(), 0);
        assert_eq!(report.indexed, 0);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        fs::write(&good, "hello world").unwrap();
        let missing = dir.path().join("missing.txt");

        let report = build_index(&[good.clone(), missing.clone()], &PipelineConfig::with_workers(2));
        assert_eq!(report.indexed, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, missing);
        assert!(report.engine.contains_document(&doc_id(&good)));
        assert!(!report.engine.contains_document(&doc_id(&missing)));
    }

    #[test]
    fn worker_panic_keeps_partial_index() {
        let paths: Vec<PathBuf> = ["a.txt", "b.txt", "c.txt", "d.txt"].iter().map(PathBuf::from).collect();
        let report = build_index_with(&paths, &PipelineConfig::with_workers(2), |p: &Path| {
            if p.ends_with("b.txt") {
                panic!("corrupt document");
            }
            Ok(DocumentCounts::from_text("shared words"))
        });
        assert_eq!(report.indexed, 3);
        assert_eq!(report.lost, 1);
        assert!(report.skipped.is_empty());
        assert!(!report.engine.contains_document("b.txt"));
        assert_eq!(report.engine.lookup("shared").len(), 3);
    }

    #[test]
    fn doc_ids_are_cleaned() {
        assert_eq!(doc_id(Path::new("./corpus//doc1.txt")), "corpus/doc1.txt");
    }
}
