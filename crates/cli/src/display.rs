//! Terminal rendering of answers and index statistics.

use medrag_knowledge::IndexStats;
use std::path::Path;

/// Render an answer as `- ` bullets, one per non-blank line, with any `•`
/// glyphs removed.
pub fn format_answer(answer: &str) -> String {
    answer
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("- {}", line.replace('•', "").trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_stats(stats: &IndexStats, corpus_dir: &Path, embedder: &str) -> String {
    let mut out = String::new();

    out.push_str("📚 Knowledge index\n");
    out.push_str(&format!("  Corpus:      {}\n", corpus_dir.display()));
    out.push_str(&format!("  Embedder:    {}\n", embedder));
    out.push_str(&format!("  Documents:   {}\n", stats.documents));
    out.push_str(&format!("  Chunks:      {}\n", stats.chunks));
    out.push_str(&format!("  Dimensions:  {}\n", stats.dimensions));
    out.push_str(&format!("  Built at:    {}\n", stats.built_at.to_rfc3339()));

    if stats.chunks == 0 {
        out.push_str("\n⚠️  Nothing was indexed; questions will report an empty knowledge base.\n");
    }

    if !stats.skipped_files.is_empty() {
        out.push_str(&format!("\n⚠️  Skipped {} file(s):\n", stats.skipped_files.len()));
        for skipped in &stats.skipped_files {
            out.push_str(&format!("  - {}: {}\n", skipped.path.display(), skipped.reason));
        }
    }

    out
}
