//! Text extraction from uploaded document formats.
//!
//! Extraction is dispatched by file extension. Supported: PDF, DOCX, plain
//! text, Markdown (syntax stripped), and JSON (re-serialized pretty).
//! Anything else is rejected with `UnsupportedFormat`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use leadlens_shared::{LeadLensError, Result};

/// Supported document formats, detected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedFormat {
    Pdf,
    Docx,
    PlainText,
    Markdown,
    Json,
    Unsupported,
}

/// Detect the document format from the file extension.
pub fn detect_format(path: &Path) -> SupportedFormat {
    match extension(path).as_str() {
        "pdf" => SupportedFormat::Pdf,
        "docx" => SupportedFormat::Docx,
        "txt" => SupportedFormat::PlainText,
        "md" | "markdown" => SupportedFormat::Markdown,
        "json" => SupportedFormat::Json,
        _ => SupportedFormat::Unsupported,
    }
}

/// Lower-cased file extension, or empty string if none.
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Extract the full text content of a file.
pub fn extract_text(path: &Path) -> Result<String> {
    match detect_format(path) {
        SupportedFormat::Pdf => extract_pdf(path),
        SupportedFormat::Docx => extract_docx(path),
        SupportedFormat::PlainText => read_lossy(path),
        SupportedFormat::Markdown => Ok(strip_markdown(&read_lossy(path)?)),
        SupportedFormat::Json => extract_json(path),
        SupportedFormat::Unsupported => Err(LeadLensError::UnsupportedFormat {
            extension: extension(path),
        }),
    }
}

// ---------------------------------------------------------------------------
// Format-specific extractors
// ---------------------------------------------------------------------------

/// Read a file as UTF-8, falling back to lossy conversion.
fn read_lossy(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            let bytes = std::fs::read(path).map_err(|e| LeadLensError::io(path, e))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(e) => Err(LeadLensError::io(path, e)),
    }
}

fn extract_pdf(path: &Path) -> Result<String> {
    // pdf-extract can panic on malformed PDFs — wrap in catch_unwind
    let path_buf = path.to_path_buf();
    let result = std::panic::catch_unwind(move || pdf_extract::extract_text(&path_buf));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(LeadLensError::extraction(format!("PDF: {e}"))),
        Err(_) => Err(LeadLensError::extraction(
            "PDF extraction panicked (malformed file)",
        )),
    }
}

fn extract_docx(path: &Path) -> Result<String> {
    // DOCX = ZIP archive containing word/document.xml.
    // Walk <w:t> tags to collect text runs, breaking on paragraph ends.
    let file = std::fs::File::open(path).map_err(|e| LeadLensError::io(path, e))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| LeadLensError::extraction(format!("DOCX zip: {e}")))?;

    let doc = archive
        .by_name("word/document.xml")
        .map_err(|e| LeadLensError::extraction(format!("DOCX missing document.xml: {e}")))?;

    let mut reader = quick_xml::Reader::from_reader(std::io::BufReader::new(doc));
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text_tag = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_tag = true;
                }
            }
            Ok(quick_xml::events::Event::End(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_tag = false;
                } else if e.local_name().as_ref() == b"p" && !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            Ok(quick_xml::events::Event::Text(ref e)) => {
                if in_text_tag {
                    if let Ok(s) = e.unescape() {
                        text.push_str(&s);
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(LeadLensError::extraction(format!("DOCX XML: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Parse JSON and re-serialize it pretty, so structured uploads become
/// searchable text with stable formatting.
fn extract_json(path: &Path) -> Result<String> {
    let raw = read_lossy(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| LeadLensError::extraction(format!("invalid JSON: {e}")))?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| LeadLensError::extraction(format!("JSON: {e}")))
}

// ---------------------------------------------------------------------------
// Markdown stripping
// ---------------------------------------------------------------------------

/// Strip Markdown syntax, leaving plain prose.
///
/// Each pass is a regex rewrite applied in sequence: fences and inline code
/// markers, images and links (keeping the visible text), heading/blockquote/
/// list markers, emphasis markers.
pub fn strip_markdown(md: &str) -> String {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^```[^\n]*$").expect("valid regex"));
    static IMAGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("valid regex"));
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid regex"));
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").expect("valid regex"));
    static QUOTE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^>\s?").expect("valid regex"));
    static LIST_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").expect("valid regex"));
    static EMPHASIS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[*_~]{1,3}([^*_~]+)[*_~]{1,3}").expect("valid regex"));

    let mut result = FENCE_RE.replace_all(md, "").into_owned();
    result = IMAGE_RE.replace_all(&result, "$1").into_owned();
    result = LINK_RE.replace_all(&result, "$1").into_owned();
    result = HEADING_RE.replace_all(&result, "").into_owned();
    result = QUOTE_RE.replace_all(&result, "").into_owned();
    result = LIST_RE.replace_all(&result, "").into_owned();
    result = EMPHASIS_RE.replace_all(&result, "$1").into_owned();
    result = result.replace('`', "");
    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_formats() {
        assert_eq!(detect_format(Path::new("brief.pdf")), SupportedFormat::Pdf);
        assert_eq!(detect_format(Path::new("deck.docx")), SupportedFormat::Docx);
        assert_eq!(
            detect_format(Path::new("notes.txt")),
            SupportedFormat::PlainText
        );
        assert_eq!(
            detect_format(Path::new("readme.md")),
            SupportedFormat::Markdown
        );
        assert_eq!(
            detect_format(Path::new("PLAYBOOK.MD")),
            SupportedFormat::Markdown
        );
        assert_eq!(
            detect_format(Path::new("data.json")),
            SupportedFormat::Json
        );
        assert_eq!(
            detect_format(Path::new("photo.png")),
            SupportedFormat::Unsupported
        );
        assert_eq!(
            detect_format(Path::new("no_extension")),
            SupportedFormat::Unsupported
        );
    }

    #[test]
    fn plaintext_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Line one.\nLine two.").unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "Line one.\nLine two.");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47]).unwrap();

        let err = extract_text(&path).unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_FORMAT");
        assert!(err.to_string().contains(".png"));
    }

    #[test]
    fn json_is_reserialized_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positioning.json");
        std::fs::write(&path, r#"{"product":"LeadLens","focus":"ITSM"}"#).unwrap();

        let text = extract_text(&path).unwrap();
        assert!(text.contains("\"product\": \"LeadLens\""));
        assert!(text.contains('\n'));
    }

    #[test]
    fn malformed_json_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert_eq!(err.code(), "EXTRACTION_ERROR");
    }

    #[test]
    fn markdown_syntax_is_stripped() {
        let md = "# Competitive Notes\n\nOur platform is **simpler** than \
                  [ServiceNow](https://example.com).\n\n- Fast deployment\n- `Native` integrations\n\n\
                  > Quoted claim here.\n";
        let text = strip_markdown(md);

        assert!(text.starts_with("Competitive Notes"));
        assert!(text.contains("simpler"));
        assert!(!text.contains("**"));
        assert!(!text.contains('#'));
        assert!(!text.contains('['));
        assert!(!text.contains('`'));
        assert!(!text.contains("- Fast"));
        assert!(text.contains("Fast deployment"));
        assert!(text.contains("Quoted claim here."));
        assert!(text.contains("ServiceNow"));
    }

    #[test]
    fn docx_missing_archive_entry_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        // A valid but empty zip archive: no word/document.xml inside.
        let file = std::fs::File::create(&path).unwrap();
        let writer = zip::ZipWriter::new(file);
        writer.finish().unwrap();

        let err = extract_text(&path).unwrap_err();
        assert_eq!(err.code(), "EXTRACTION_ERROR");
        assert!(err.to_string().contains("document.xml"));
    }
}
