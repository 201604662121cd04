use crate::error::IngestError;
use crate::models::UploadedDocument;
use lopdf::Document;

pub trait PdfExtractor {
    fn extract(&self, document: &UploadedDocument) -> Result<String, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract(&self, document: &UploadedDocument) -> Result<String, IngestError> {
        let parsed = Document::load_mem(&document.bytes)
            .map_err(|error| IngestError::PdfParse(format!("{}: {error}", document.filename)))?;

        let mut text = String::new();
        for (page_number, _page_id) in parsed.get_pages() {
            let page_text = parsed.extract_text(&[page_number]).map_err(|error| {
                IngestError::PdfParse(format!(
                    "{} page {page_number}: {error}",
                    document.filename
                ))
            })?;
            text.push_str(&page_text);
        }

        Ok(text)
    }
}

/// Concatenates the extracted text of every document, in upload order then
/// page order, with nothing inserted between pages.
///
/// Zero documents yield an empty string. A single unparsable document fails
/// the whole batch.
pub fn extract_text(documents: &[UploadedDocument]) -> Result<String, IngestError> {
    let extractor = LopdfExtractor;
    let mut combined = String::new();

    for document in documents {
        combined.push_str(&extractor.extract(document)?);
    }

    Ok(combined)
}

/// Minimal one-page PDF whose content stream shows `phrase` with a standard
/// Type1 font. Body objects first, then an xref with correct byte offsets.
#[cfg(test)]
pub(crate) fn minimal_pdf_with_phrase(phrase: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 100 700 Td ({phrase}) Tj ET\n");

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}endstream endobj\n",
            content.len(),
            content
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n");
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{xref_start}\n").as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

#[cfg(test)]
mod tests {
    use super::{extract_text, minimal_pdf_with_phrase, LopdfExtractor, PdfExtractor};
    use crate::error::IngestError;
    use crate::models::UploadedDocument;

    #[test]
    fn zero_documents_extract_to_empty_string() {
        let text = extract_text(&[]).expect("empty batch should extract");
        assert_eq!(text, "");
    }

    #[test]
    fn single_page_text_is_extracted() {
        let document = UploadedDocument::new("alpha.pdf", minimal_pdf_with_phrase("Alpha beta gamma."));
        let text = LopdfExtractor.extract(&document).expect("pdf should parse");
        assert_eq!(text.trim(), "Alpha beta gamma.");
    }

    #[test]
    fn batch_text_is_concatenated_in_upload_order() {
        let first = UploadedDocument::new("first.pdf", minimal_pdf_with_phrase("First document"));
        let second = UploadedDocument::new("second.pdf", minimal_pdf_with_phrase("Second document"));

        let combined = extract_text(&[first.clone(), second.clone()]).expect("batch should extract");
        let expected = format!(
            "{}{}",
            LopdfExtractor.extract(&first).unwrap(),
            LopdfExtractor.extract(&second).unwrap()
        );

        assert_eq!(combined, expected);
        let first_at = combined.find("First document").expect("first text present");
        let second_at = combined.find("Second document").expect("second text present");
        assert!(first_at < second_at);
    }

    #[test]
    fn unparsable_document_fails_the_whole_batch() {
        let good = UploadedDocument::new("good.pdf", minimal_pdf_with_phrase("Readable"));
        let bad = UploadedDocument::new("bad.pdf", b"%PDF-1.4\n%broken".to_vec());

        let result = extract_text(&[good, bad]);
        assert!(matches!(result, Err(IngestError::PdfParse(_))));
    }
}
