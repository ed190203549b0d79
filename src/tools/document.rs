//! Document reader collaborator.
//!
//! Extracts plain text keyed by file extension: `.pdf` via `pdf-extract`,
//! `.docx` by reading `word/document.xml` out of the zip container, `.txt`
//! as lossy UTF-8. Legacy `.doc` is rejected by name.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Reader failures. Each variant is a terminal outcome for the document
/// workflow, reported to the user as-is.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("legacy .doc format is not supported — convert the file to .docx")]
    LegacyDoc,

    #[error("unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },
}

// ─── Extraction ──────────────────────────────────────────────────────────────

/// A successfully extracted document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Basename of the source file.
    pub name: String,
    /// Extracted plain text. May be empty — callers decide what that means.
    pub content: String,
}

/// Read a document and extract its plain text.
pub fn read_document(path: &Path) -> Result<ExtractedDocument, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::NotFound {
            path: path.display().to_string(),
        });
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let content = match extension.as_str() {
        "pdf" => extract_pdf(path)?,
        "docx" => extract_docx(path)?,
        "doc" => return Err(DocumentError::LegacyDoc),
        "txt" => extract_txt(path)?,
        other => {
            return Err(DocumentError::UnsupportedFormat {
                extension: if other.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{other}")
                },
            })
        }
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    tracing::info!(file = %name, bytes = content.len(), "document extracted");

    Ok(ExtractedDocument { name, content })
}

fn extract_pdf(path: &Path) -> Result<String, DocumentError> {
    pdf_extract::extract_text(path).map_err(|e| DocumentError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn extract_txt(path: &Path) -> Result<String, DocumentError> {
    let bytes = std::fs::read(path).map_err(|e| DocumentError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    // Lossy: a text file with stray non-UTF-8 bytes should still load
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn extract_docx(path: &Path) -> Result<String, DocumentError> {
    let read_failed = |reason: String| DocumentError::ReadFailed {
        path: path.display().to_string(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|e| read_failed(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| read_failed(e.to_string()))?;
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| read_failed(format!("no word/document.xml in archive: {e}")))?
        .read_to_string(&mut document_xml)
        .map_err(|e| read_failed(e.to_string()))?;

    Ok(docx_text_from_xml(&document_xml))
}

/// Pull the visible text out of a WordprocessingML body.
///
/// Text lives in `<w:t>` runs; each closed `<w:p>` paragraph becomes a
/// newline. Everything else (styles, tables markup, section properties)
/// is skipped.
fn docx_text_from_xml(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run => {
                if let Ok(run) = e.xml_content() {
                    text.push_str(&run);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(error = %e, "malformed XML in docx — stopping extraction");
                break;
            }
            _ => {}
        }
    }

    text
}

// ─── Tests ───────────────────────────────────────────────────────────────────
