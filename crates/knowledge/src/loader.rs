//! Corpus loading: CSV, PDF and plain-text files into source documents.
//!
//! A file that cannot be read or parsed contributes no documents. The failure
//! is logged and recorded in [`LoadReport::skipped`]; the rest of the corpus
//! still loads.

use crate::types::{LoadReport, SkippedFile, SourceDocument, SourceType};
use medrag_core::{AppError, AppResult};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Load every supported file directly under `corpus_dir`.
///
/// Files are visited in file-name order. A missing directory yields an empty
/// report.
pub fn load_documents(corpus_dir: &Path) -> LoadReport {
    let mut report = LoadReport::default();

    if !corpus_dir.is_dir() {
        tracing::warn!("Corpus directory not found: {:?}", corpus_dir);
        return report;
    }

    for entry in WalkDir::new(corpus_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();

        let Some(source_type) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(SourceType::from_extension)
        else {
            tracing::debug!("Ignoring unsupported file: {:?}", path);
            continue;
        };

        match load_file(path, source_type) {
            Ok(documents) => {
                tracing::debug!(
                    "Loaded {} {} document(s) from {:?}",
                    documents.len(),
                    source_type,
                    path
                );
                report.documents.extend(documents);
            }
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                report.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Loaded {} documents from {:?} ({} file(s) skipped)",
        report.documents.len(),
        corpus_dir,
        report.skipped.len()
    );

    report
}

/// Load a single file according to its type.
pub fn load_file(path: &Path, source_type: SourceType) -> AppResult<Vec<SourceDocument>> {
    match source_type {
        SourceType::Tabular => load_csv(path),
        SourceType::Pdf => load_pdf(path),
        SourceType::PlainText => load_text(path),
    }
}

/// One document per row, each row rendered as `header: value` lines.
fn load_csv(path: &Path) -> AppResult<Vec<SourceDocument>> {
    let bytes = fs::read(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes.as_slice());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Ingest(format!("Invalid CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut documents = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| AppError::Ingest(format!("Invalid CSV row: {}", e)))?;

        let text = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| format!("{}: {}", header, value.trim()))
            .collect::<Vec<_>>()
            .join("\n");

        documents.push(SourceDocument {
            text,
            source_path: path.to_path_buf(),
            source_type: SourceType::Tabular,
            position: row,
        });
    }

    Ok(documents)
}

/// One document per page, numbered from 1.
fn load_pdf(path: &Path) -> AppResult<Vec<SourceDocument>> {
    let document = lopdf::Document::load(path)
        .map_err(|e| AppError::Ingest(format!("Invalid PDF: {}", e)))?;

    let mut documents = Vec::new();

    for page_number in document.get_pages().into_keys() {
        let text = document.extract_text(&[page_number]).map_err(|e| {
            AppError::Ingest(format!("Failed to extract text from page {}: {}", page_number, e))
        })?;

        documents.push(SourceDocument {
            text,
            source_path: path.to_path_buf(),
            source_type: SourceType::Pdf,
            position: page_number as usize,
        });
    }

    Ok(documents)
}

/// The whole file as a single document.
fn load_text(path: &Path) -> AppResult<Vec<SourceDocument>> {
    let text = fs::read_to_string(path)?;

    Ok(vec![SourceDocument {
        text,
        source_path: path.to_path_buf(),
        source_type: SourceType::PlainText,
        position: 0,
    }])
}
