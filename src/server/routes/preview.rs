//! File preview endpoints with format-specific HTML rendering

use axum::{
    extract::{Path as UrlPath, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use calamine::Reader;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::ingestion::FileConverter;
use crate::server::state::AppState;
use crate::types::FileType;

use super::upload::sanitize_filename;

/// Maximum table rows rendered for CSV and Excel previews
const MAX_PREVIEW_ROWS: usize = 500;

/// GET /api/preview - Preview the active document
pub async fn preview_current(State(state): State<AppState>) -> Result<Response> {
    let current = state.current_document();
    match current.filename {
        Some(filename) => render_preview(&state, &filename).await,
        None => Err(Error::DocumentNotFound(
            "no document has been uploaded".to_string(),
        )),
    }
}

/// GET /api/preview/{filename} - Preview an uploaded or preloaded file
pub async fn preview_file(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Response> {
    render_preview(&state, &filename).await
}

async fn render_preview(state: &AppState, filename: &str) -> Result<Response> {
    sanitize_filename(filename)?;

    let path = locate_file(state, filename)
        .ok_or_else(|| Error::DocumentNotFound(filename.to_string()))?;
    let data = tokio::fs::read(&path).await?;

    let response = match FileType::from_filename(filename) {
        FileType::Pdf => pdf_response(filename, data),
        FileType::Docx | FileType::Doc => html_response(render_docx(filename, &data)?),
        FileType::Csv => html_response(render_csv(filename, &data)?),
        FileType::Xlsx | FileType::Xls => html_response(render_xlsx(filename, &data)?),
        FileType::Json => html_response(render_json(filename, &data)?),
        FileType::Markdown => html_response(render_markdown(filename, &data)),
        FileType::Txt => html_response(render_text(filename, &data)),
        FileType::Unknown => {
            return Err(Error::UnsupportedFileType(format!(
                "preview not available for '{}'",
                filename
            )))
        }
    };

    Ok(response)
}

/// Look for the file in the uploads directory first, then preloaded data
fn locate_file(state: &AppState, filename: &str) -> Option<PathBuf> {
    let server = &state.config().server;

    let uploaded = server.uploads_dir.join(filename);
    if uploaded.is_file() {
        return Some(uploaded);
    }

    let preloaded = server.data_dir.join(filename);
    if preloaded.is_file() {
        return Some(preloaded);
    }

    None
}

/// Serve PDF bytes inline for the browser's native viewer
fn pdf_response(filename: &str, data: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        data,
    )
        .into_response()
}

fn html_response(page: String) -> Response {
    Html(page).into_response()
}

fn render_docx(filename: &str, data: &[u8]) -> Result<String> {
    let parsed = FileConverter::convert(filename, data)?;

    let body: String = parsed
        .content
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("<p>{}</p>\n", escape_html(p.trim())))
        .collect();

    Ok(html_page(filename, &body))
}

fn render_csv(filename: &str, data: &[u8]) -> Result<String> {
    let mut reader = csv::Reader::from_reader(data);
    let mut body = String::from("<table>\n<tr>");

    let headers = reader
        .headers()
        .map_err(|e| Error::file_parse(filename, e.to_string()))?
        .clone();
    for header in headers.iter() {
        body.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    body.push_str("</tr>\n");

    let mut rows = 0usize;
    let mut truncated = false;
    for result in reader.records() {
        let record = result.map_err(|e| Error::file_parse(filename, e.to_string()))?;
        if rows >= MAX_PREVIEW_ROWS {
            truncated = true;
            break;
        }
        body.push_str("<tr>");
        for cell in record.iter() {
            body.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        body.push_str("</tr>\n");
        rows += 1;
    }
    body.push_str("</table>\n");

    let mut page_body = format!("<p>{} rows</p>\n", rows);
    if truncated {
        page_body.push_str(&format!(
            "<p>Showing first {} rows</p>\n",
            MAX_PREVIEW_ROWS
        ));
    }
    page_body.push_str(&body);

    Ok(html_page(filename, &page_body))
}

fn render_xlsx(filename: &str, data: &[u8]) -> Result<String> {
    let cursor = std::io::Cursor::new(data.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| Error::file_parse(filename, e.to_string()))?;

    let mut body = String::new();

    for sheet_name in workbook.sheet_names().to_vec() {
        let Ok(range) = workbook.worksheet_range(&sheet_name) else {
            continue;
        };

        body.push_str(&format!("<h2>Sheet: {}</h2>\n", escape_html(&sheet_name)));

        let total_rows = range.rows().count();
        if total_rows > MAX_PREVIEW_ROWS {
            body.push_str(&format!(
                "<p>Showing first {} of {} rows</p>\n",
                MAX_PREVIEW_ROWS, total_rows
            ));
        }

        body.push_str("<table>\n");
        for (i, row) in range.rows().take(MAX_PREVIEW_ROWS).enumerate() {
            let tag = if i == 0 { "th" } else { "td" };
            body.push_str("<tr>");
            for cell in row {
                body.push_str(&format!("<{}>{}</{}>", tag, escape_html(&cell.to_string()), tag));
            }
            body.push_str("</tr>\n");
        }
        body.push_str("</table>\n");
    }

    Ok(html_page(filename, &body))
}

fn render_json(filename: &str, data: &[u8]) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_slice(data).map_err(|e| Error::file_parse(filename, e.to_string()))?;
    let pretty = serde_json::to_string_pretty(&value)?;

    let body = format!("<pre>{}</pre>\n", escape_html(&pretty));
    Ok(html_page(filename, &body))
}

fn render_markdown(filename: &str, data: &[u8]) -> String {
    let markdown = String::from_utf8_lossy(data);
    let parser = pulldown_cmark::Parser::new(&markdown);

    let mut body = String::new();
    pulldown_cmark::html::push_html(&mut body, parser);

    html_page(filename, &body)
}

fn render_text(filename: &str, data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let lines = text.lines().count();
    let words = text.split_whitespace().count();

    let body = format!(
        "<p>{} lines, {} words</p>\n<pre>{}</pre>\n",
        lines,
        words,
        escape_html(&text)
    );

    html_page(filename, &body)
}

/// Minimal HTML shell shared by all previews
fn html_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Preview: {title}</title>
<style>
body {{ font-family: sans-serif; line-height: 1.6; color: #1f2937; max-width: 900px; margin: 0 auto; padding: 24px; }}
h1.preview-title {{ font-size: 20px; border-bottom: 1px solid #e5e7eb; padding-bottom: 8px; }}
pre {{ background: #f3f4f6; padding: 16px; border-radius: 6px; overflow-x: auto; white-space: pre-wrap; }}
table {{ border-collapse: collapse; width: 100%; margin: 16px 0; font-size: 14px; }}
th, td {{ border: 1px solid #e5e7eb; padding: 8px 12px; text-align: left; }}
th {{ background: #f9fafb; }}
</style>
</head>
<body>
<h1 class="preview-title">{title}</h1>
{body}
</body>
</html>"#,
        title = escape_html(title),
        body = body,
    )
}

/// Escape text for HTML interpolation
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_markdown_headings() {
        let page = render_markdown("notes.md", b"# Attention\n\nSome *body* text");
        assert!(page.contains("<h1>Attention</h1>"));
        assert!(page.contains("<em>body</em>"));
    }

    #[test]
    fn test_render_text_counts_and_escapes() {
        let page = render_text("notes.txt", b"one <two>\nthree four");
        assert!(page.contains("2 lines, 4 words"));
        assert!(page.contains("one &lt;two&gt;"));
    }

    #[test]
    fn test_render_csv_truncates() {
        let mut data = String::from("id,value\n");
        for i in 0..600 {
            data.push_str(&format!("{},v{}\n", i, i));
        }

        let page = render_csv("big.csv", data.as_bytes()).unwrap();
        assert!(page.contains("Showing first 500 rows"));
        assert!(page.contains("<td>499</td>"));
        assert!(!page.contains("<td>500</td>"));
    }

    #[test]
    fn test_render_json_pretty() {
        let page = render_json("cfg.json", br#"{"a":1}"#).unwrap();
        assert!(page.contains("&quot;a&quot;: 1"));
    }
}
