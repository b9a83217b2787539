//! Multi-format file conversion to plain text

use calamine::Reader;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::FileType;

/// Plain-text document extracted from an uploaded file
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Detected file type
    pub file_type: FileType,
    /// Extracted text content
    pub content: String,
    /// Content hash
    pub content_hash: String,
}

/// Multi-format file converter
pub struct FileConverter;

impl FileConverter {
    /// Convert a file to plain text based on its extension
    pub fn convert(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let file_type = FileType::from_filename(filename);

        if !file_type.is_supported() {
            return Err(Error::UnsupportedFileType(
                filename.rsplit('.').next().unwrap_or("").to_string(),
            ));
        }

        let parsed = match file_type {
            FileType::Pdf => Self::convert_pdf(filename, data)?,
            FileType::Docx | FileType::Doc => Self::convert_docx(filename, data)?,
            FileType::Csv => Self::convert_csv(filename, data)?,
            FileType::Xlsx | FileType::Xls => Self::convert_xlsx(filename, data)?,
            FileType::Json => Self::convert_json(filename, data)?,
            FileType::Txt | FileType::Markdown => Self::convert_text(data, file_type),
            FileType::Unknown => unreachable!("unsupported types rejected above"),
        };

        if parsed.content.trim().is_empty() {
            return Err(Error::file_parse(filename, "Document has no text content"));
        }

        Ok(parsed)
    }

    /// Convert PDF via text extraction with a structural fallback
    fn convert_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let raw = match pdf_extract::extract_text_from_mem(data) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("pdf-extract failed: {}, trying fallback", e);
                Self::extract_pdf_fallback(filename, data)?
            }
        };

        let content = normalize_extracted_text(&raw);

        if content.trim().is_empty() {
            return Err(Error::file_parse(
                filename,
                "No text content could be extracted from PDF",
            ));
        }

        Ok(Self::finish(FileType::Pdf, content))
    }

    /// Fallback PDF extraction reading content streams directly
    fn extract_pdf_fallback(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let text = doc
            .extract_text(&page_numbers)
            .map_err(|e| Error::file_parse(filename, format!("Failed to extract PDF text: {}", e)))?;

        if text.trim().is_empty() {
            return Err(Error::file_parse(
                filename,
                "PDF appears to be image-based or has no extractable text",
            ));
        }

        Ok(text)
    }

    /// Convert DOCX by walking paragraph runs
    fn convert_docx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut paragraphs = Vec::new();

        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut text = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                if !text.trim().is_empty() {
                    paragraphs.push(text);
                }
            }
        }

        Ok(Self::finish(FileType::Docx, paragraphs.join("\n\n")))
    }

    /// Convert CSV to pipe-delimited rows
    fn convert_csv(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let mut reader = csv::Reader::from_reader(data);
        let mut content = String::new();

        match reader.headers() {
            Ok(headers) => {
                content.push_str(&headers.iter().collect::<Vec<_>>().join(" | "));
                content.push('\n');
            }
            Err(e) => return Err(Error::file_parse(filename, e.to_string())),
        }

        for result in reader.records() {
            let record = result.map_err(|e| Error::file_parse(filename, e.to_string()))?;
            content.push_str(&record.iter().collect::<Vec<_>>().join(" | "));
            content.push('\n');
        }

        Ok(Self::finish(FileType::Csv, content))
    }

    /// Convert Excel workbooks, one section per sheet
    fn convert_xlsx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let cursor = std::io::Cursor::new(data.to_vec());
        let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut content = String::new();

        for sheet_name in workbook.sheet_names().to_vec() {
            if let Ok(range) = workbook.worksheet_range(&sheet_name) {
                content.push_str(&format!("Sheet: {}\n", sheet_name));

                for row in range.rows() {
                    let row_text: Vec<String> = row
                        .iter()
                        .map(|cell| match cell {
                            calamine::Data::Empty => String::new(),
                            calamine::Data::String(s) => s.clone(),
                            calamine::Data::Float(f) => f.to_string(),
                            calamine::Data::Int(i) => i.to_string(),
                            calamine::Data::Bool(b) => b.to_string(),
                            calamine::Data::DateTime(dt) => dt.to_string(),
                            _ => String::new(),
                        })
                        .collect();

                    if !row_text.iter().all(|s| s.is_empty()) {
                        content.push_str(&row_text.join(" | "));
                        content.push('\n');
                    }
                }
                content.push('\n');
            }
        }

        Ok(Self::finish(FileType::Xlsx, content))
    }

    /// Convert JSON to its pretty-printed form
    fn convert_json(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let value: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;
        let content = serde_json::to_string_pretty(&value)?;
        Ok(Self::finish(FileType::Json, content))
    }

    /// Convert plain text or markdown
    fn convert_text(data: &[u8], file_type: FileType) -> ParsedDocument {
        let content = String::from_utf8_lossy(data).to_string();
        Self::finish(file_type, content)
    }

    fn finish(file_type: FileType, content: String) -> ParsedDocument {
        ParsedDocument {
            file_type,
            content_hash: hash_content(&content),
            content,
        }
    }
}

/// Normalize extracted PDF text: fix common glyph artifacts, drop null
/// characters and blank lines
fn normalize_extracted_text(text: &str) -> String {
    let cleaned = text
        .replace('\0', "")
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'")
        .replace('\u{201C}', "\"")
        .replace('\u{201D}', "\"")
        .replace('\u{2013}', "-")
        .replace('\u{2014}', "--")
        .replace('\u{00A0}', " ")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff");

    cleaned
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hash content for the document record
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_text() {
        let parsed = FileConverter::convert("notes.txt", b"hello world").unwrap();
        assert_eq!(parsed.file_type, FileType::Txt);
        assert_eq!(parsed.content, "hello world");
        assert!(!parsed.content_hash.is_empty());
    }

    #[test]
    fn test_convert_markdown() {
        let parsed = FileConverter::convert("readme.md", b"# Title\n\nBody text").unwrap();
        assert_eq!(parsed.file_type, FileType::Markdown);
        assert!(parsed.content.contains("# Title"));
    }

    #[test]
    fn test_convert_csv() {
        let data = b"name,score\nalice,10\nbob,20\n";
        let parsed = FileConverter::convert("results.csv", data).unwrap();
        assert_eq!(parsed.file_type, FileType::Csv);
        assert!(parsed.content.contains("name | score"));
        assert!(parsed.content.contains("alice | 10"));
    }

    #[test]
    fn test_convert_json() {
        let data = br#"{"model": "transformer", "layers": 6}"#;
        let parsed = FileConverter::convert("config.json", data).unwrap();
        assert_eq!(parsed.file_type, FileType::Json);
        assert!(parsed.content.contains("\"model\": \"transformer\""));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = FileConverter::convert("binary.exe", b"MZ").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
    }

    #[test]
    fn test_empty_content_rejected() {
        let err = FileConverter::convert("empty.txt", b"   \n  ").unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }

    #[test]
    fn test_normalize_extracted_text() {
        let raw = "line one\u{2019}s text\n\n   \nsecond \u{FB01}rst line\0";
        let normalized = normalize_extracted_text(raw);
        assert_eq!(normalized, "line one's text\nsecond first line");
    }
}
