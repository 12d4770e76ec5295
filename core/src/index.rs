use crate::mapper::DocumentCounts;
use crate::{DocId, TermCounts};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// One ranked entry returned by [`SearchEngine::relevance_lookup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub doc: DocId,
    pub score: f64,
}

/// In-memory inverted index with per-document term statistics.
///
/// Not synchronized. The four maps are only mutated together through
/// [`SearchEngine::add_document`], which the pipeline calls from its single
/// reducer; everything else is a read.
#[derive(Debug, Default)]
pub struct SearchEngine {
    index: HashMap<String, HashSet<DocId>>, // term -> posting set
    counts: HashMap<DocId, TermCounts>,
    totals: HashMap<DocId, u64>,
    docs: HashSet<DocId>,
}

impl SearchEngine {
    pub fn new() -> Self { Self::default() }

    /// Add or replace a document. Postings for terms the previous version had
    /// but this one lacks are left in place.
    pub fn add_document(&mut self, doc: DocId, counts: DocumentCounts) {
        let DocumentCounts { frequencies, total } = counts;
        for term in frequencies.keys() {
            self.index.entry(term.clone()).or_default().insert(doc.clone());
        }
        self.docs.insert(doc.clone());
        self.totals.insert(doc.clone(), total);
        self.counts.insert(doc, frequencies);
    }

    /// Documents containing `term`, as a fresh vector in unspecified order.
    pub fn lookup(&self, term: &str) -> Vec<DocId> {
        self.index
            .get(term)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.index.get(term).map_or(0, HashSet::len)
    }

    /// tf(t, d) = n(t, d) / total(d), or 0 when d has no terms.
    pub fn term_frequency(&self, term: &str, doc: &str) -> f64 {
        let total = self.total_terms(doc);
        if total == 0 {
            return 0.0;
        }
        self.term_count(term, doc) as f64 / total as f64
    }

    /// idf(t) = ln(N / (n_t + 1)), or 0 when nothing is indexed or t is unseen.
    ///
    /// The +1 is part of the scoring contract; it goes negative for terms in
    /// most documents.
    pub fn inverse_document_frequency(&self, term: &str) -> f64 {
        let n = self.docs.len();
        if n == 0 {
            return 0.0;
        }
        let n_t = self.document_frequency(term);
        if n_t == 0 {
            return 0.0;
        }
        (n as f64 / (n_t as f64 + 1.0)).ln()
    }

    pub fn tf_idf(&self, term: &str, doc: &str) -> f64 {
        self.term_frequency(term, doc) * self.inverse_document_frequency(term)
    }

    /// Documents containing `term`, highest tf-idf first, ties by ascending doc id.
    pub fn relevance_lookup(&self, term: &str) -> Vec<ScoredDocument> {
        let idf = self.inverse_document_frequency(term);
        let mut out: Vec<ScoredDocument> = self
            .lookup(term)
            .into_iter()
            .map(|doc| {
                let score = self.term_frequency(term, &doc) * idf;
                ScoredDocument { doc, score }
            })
            .collect();
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.doc.cmp(&b.doc))
        });
        out
    }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.index.len() }

    pub fn contains_document(&self, doc: &str) -> bool { self.docs.contains(doc) }

    pub fn total_terms(&self, doc: &str) -> u64 {
        self.totals.get(doc).copied().unwrap_or(0)
    }

    pub fn term_count(&self, term: &str, doc: &str) -> u64 {
        self.counts.get(doc).and_then(|m| m.get(term)).copied().unwrap_or(0)
    }

    /// Per-document term counts, if the document is indexed.
    pub fn term_counts(&self, doc: &str) -> Option<&TermCounts> {
        self.counts.get(doc)
    }

    /// All indexed document ids, sorted.
    pub fn documents(&self) -> Vec<DocId> {
        let mut docs: Vec<DocId> = self.docs.iter().cloned().collect();
        docs.sort();
        docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(docs: &[(&str, &str)]) -> SearchEngine {
        let mut se = SearchEngine::new();
        for (id, text) in docs {
            se.add_document(id.to_string(), DocumentCounts::from_text(text));
        }
        se
    }

    #[test]
    fn lookup_unknown_term_is_empty() {
        let se = engine(&[("a", "one two")]);
        assert!(se.lookup("three").is_empty());
        assert!(se.relevance_lookup("three").is_empty());
        assert_eq!(se.inverse_document_frequency("three"), 0.0);
    }

    #[test]
    fn lookup_returns_a_copy() {
        let se = engine(&[("a", "x"), ("b", "x")]);
        let mut found = se.lookup("x");
        found.clear();
        assert_eq!(se.lookup("x").len(), 2);
    }

    #[test]
    fn term_frequency_handles_empty_documents() {
        let se = engine(&[("empty", ""), ("full", "a b b c")]);
        assert!(se.contains_document("empty"));
        assert_eq!(se.term_frequency("a", "empty"), 0.0);
        assert_eq!(se.term_frequency("b", "full"), 0.5);
        assert_eq!(se.term_frequency("z", "full"), 0.0);
        assert_eq!(se.term_frequency("a", "unknown"), 0.0);
    }

    #[test]
    fn idf_uses_smoothed_denominator() {
        let se = engine(&[("a", "x y"), ("b", "y"), ("c", "z"), ("d", "z")]);
        assert!((se.inverse_document_frequency("x") - (4.0f64 / 2.0).ln()).abs() < 1e-12);
        assert!((se.inverse_document_frequency("y") - (4.0f64 / 3.0).ln()).abs() < 1e-12);
        assert!(SearchEngine::new().inverse_document_frequency("x") == 0.0);
    }

    #[test]
    fn common_terms_score_negative() {
        let se = engine(&[("a", "the"), ("b", "the"), ("c", "the cat")]);
        assert!(se.inverse_document_frequency("the") < 0.0);
        assert!(se.relevance_lookup("the").iter().all(|r| r.score < 0.0));
    }

    #[test]
    fn ranking_is_descending_with_id_tiebreak() {
        let se = engine(&[
            ("d", "rare filler"),
            ("b", "rare filler"),
            ("c", "rare rare"),
            ("x", "other"),
            ("y", "other"),
        ]);
        let ranked = se.relevance_lookup("rare");
        let ids: Vec<&str> = ranked.iter().map(|r| r.doc.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "d"]);
        assert_eq!(ranked[1].score, ranked[2].score);
    }

    #[test]
    fn reinserting_a_document_is_idempotent() {
        let counts = DocumentCounts::from_text("alpha beta beta");
        let mut once = SearchEngine::new();
        once.add_document("doc".into(), counts.clone());
        let mut twice = SearchEngine::new();
        twice.add_document("doc".into(), counts.clone());
        twice.add_document("doc".into(), counts);

        assert_eq!(once.documents(), twice.documents());
        assert_eq!(once.term_counts("doc"), twice.term_counts("doc"));
        assert_eq!(once.total_terms("doc"), twice.total_terms("doc"));
        for term in ["alpha", "beta"] {
            assert_eq!(once.lookup(term), twice.lookup(term));
        }
        assert_eq!(once.num_terms(), twice.num_terms());
    }
}
