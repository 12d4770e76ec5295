use crate::index::{ScoredDocument, SearchEngine};
use crate::tokenizer::lowercase;
use serde::Serialize;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `== term (count)` followed by `doc,score` lines.
    #[default]
    Text,
    /// One JSON object per query.
    Json,
}

#[derive(Serialize)]
struct JsonAnswer<'a> {
    term: &'a str,
    count: usize,
    results: &'a [ScoredDocument],
}

/// Normalize a raw query line: trimmed and lowercased, `None` if blank.
pub fn normalize_query(line: &str) -> Option<String> {
    let term = lowercase(line.trim());
    if term.is_empty() { None } else { Some(term) }
}

/// Write the answer for one term.
pub fn write_answer<W: Write>(
    w: &mut W,
    term: &str,
    results: &[ScoredDocument],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(w, "== {} ({})", term, results.len())?;
            for r in results {
                writeln!(w, "{},{:.6}", r.doc, r.score)?;
            }
        }
        OutputFormat::Json => {
            let answer = JsonAnswer { term, count: results.len(), results };
            serde_json::to_writer(&mut *w, &answer)?;
            writeln!(w)?;
        }
    }
    Ok(())
}

/// Answer one term per input line until end of input.
pub fn run_queries<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    engine: &SearchEngine,
    format: OutputFormat,
) -> io::Result<()> {
    for line in reader.lines() {
        let Some(term) = normalize_query(&line?) else { continue };
        let results = engine.relevance_lookup(&term);
        write_answer(&mut writer, &term, &results, format)?;
    }
    writer.flush()
}
