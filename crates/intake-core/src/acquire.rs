//! Text acquisition: embedded PDF text first, OCR as a fallback.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{IntakeError, OcrError, Result};
use crate::invoice::{normalize, NormalizeMode};
use crate::models::config::AcquisitionConfig;
use crate::ocr::OcrHandle;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Where acquired text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Embedded,
    Ocr,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Embedded => f.write_str("embedded"),
            TextSource::Ocr => f.write_str("ocr"),
        }
    }
}

/// Best-effort plain text of a document.
#[derive(Debug, Clone, Serialize)]
pub struct AcquiredText {
    pub text: String,
    pub source: TextSource,
    pub page_count: u32,
}

/// Turns document bytes into text for the extraction engine.
pub struct TextAcquirer {
    config: AcquisitionConfig,
    ocr: Option<Arc<OcrHandle>>,
}

impl TextAcquirer {
    /// Create an acquirer without OCR.
    pub fn new(config: AcquisitionConfig) -> Self {
        Self { config, ocr: None }
    }

    /// Attach a shared OCR handle.
    pub fn with_ocr(mut self, handle: Arc<OcrHandle>) -> Self {
        self.ocr = Some(handle);
        self
    }

    /// Acquire text from a PDF file on disk.
    pub fn acquire_path(&self, path: &Path) -> Result<AcquiredText> {
        info!("Acquiring text from {}", path.display());
        let data = std::fs::read(path)?;
        self.acquire(&data)
    }

    /// Acquire text from PDF bytes.
    pub fn acquire(&self, data: &[u8]) -> Result<AcquiredText> {
        let mut pdf = PdfExtractor::new();
        pdf.load(data)?;
        self.acquire_from(&pdf)
    }

    /// Acquire text from an already loaded document.
    ///
    /// Embedded text wins when its normalized length reaches
    /// `min_text_length`. Otherwise OCR runs page by page; if that yields
    /// nothing, whatever embedded text exists is returned. Fails only when
    /// both are empty.
    pub fn acquire_from<P: PdfProcessor>(&self, pdf: &P) -> Result<AcquiredText> {
        let page_count = pdf.page_count();

        let embedded = if self.config.prefer_embedded_text {
            self.embedded_text(pdf)
        } else {
            None
        };

        if let Some(text) = &embedded {
            let length = normalize(text, NormalizeMode::SingleLine).chars().count();
            if length >= self.config.min_text_length {
                debug!("Using embedded text ({} chars)", length);
                return Ok(AcquiredText {
                    text: text.clone(),
                    source: TextSource::Embedded,
                    page_count,
                });
            }
            debug!(
                "Embedded text too short ({} < {} chars), trying OCR",
                length, self.config.min_text_length
            );
        }

        match self.ocr_text(pdf, page_count) {
            Ok(text) if !text.trim().is_empty() => {
                return Ok(AcquiredText {
                    text,
                    source: TextSource::Ocr,
                    page_count,
                });
            }
            Ok(_) => warn!("OCR produced no text"),
            Err(e) => warn!("OCR fallback unavailable: {}", e),
        }

        let embedded = embedded.or_else(|| self.embedded_text(pdf));
        match embedded {
            Some(text) if !text.trim().is_empty() => {
                warn!("Falling back to short embedded text");
                Ok(AcquiredText {
                    text,
                    source: TextSource::Embedded,
                    page_count,
                })
            }
            _ => Err(IntakeError::NoText),
        }
    }

    fn embedded_text<P: PdfProcessor>(&self, pdf: &P) -> Option<String> {
        match pdf.extract_text() {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Embedded text extraction failed: {}", e);
                None
            }
        }
    }

    fn ocr_text<P: PdfProcessor>(&self, pdf: &P, page_count: u32) -> Result<String> {
        let handle = self.ocr.as_ref().ok_or(OcrError::Unavailable)?;
        let backend = handle.get()?;

        let pages = match self.config.max_pages {
            0 => page_count,
            max => page_count.min(max as u32),
        };

        let mut page_images = Vec::with_capacity(pages as usize);
        for page in 1..=pages {
            match pdf.page_images(page) {
                Ok(images) => page_images.push(images),
                Err(e) => warn!("Could not read images of page {}: {}", page, e),
            }
        }

        if page_images.iter().all(Vec::is_empty) {
            debug!("No page-level images, scanning all document objects");
            page_images = pdf
                .document_images()
                .into_iter()
                .take(pages as usize)
                .map(|image| vec![image])
                .collect();
        }

        if page_images.iter().all(Vec::is_empty) {
            return Err(OcrError::NoImages.into());
        }

        let mut texts = Vec::new();
        for (index, images) in page_images.iter().enumerate() {
            for image in images {
                match backend.recognize(image) {
                    Ok(text) if !text.trim().is_empty() => texts.push(text),
                    Ok(_) => {}
                    Err(e) => warn!("OCR failed on page {}: {}", index + 1, e),
                }
            }
        }

        info!(
            "OCR recognized {} of {} pages with {}",
            texts.len(),
            page_images.len(),
            backend.name()
        );
        Ok(texts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::ocr::tests::FixedOcr;
    use crate::ocr::OcrBackend;
    use image::DynamicImage;

    const LONG_TEXT: &str = "Acme Supply Co\nInvoice #1001\nAmount Due: $10.00";

    struct FakePdf {
        text: Option<String>,
        pages: Vec<Vec<DynamicImage>>,
    }

    impl FakePdf {
        fn new(text: Option<&str>, scanned_pages: usize) -> Self {
            Self {
                text: text.map(str::to_string),
                pages: (0..scanned_pages)
                    .map(|_| vec![DynamicImage::new_rgb8(4, 4)])
                    .collect(),
            }
        }
    }

    impl PdfProcessor for FakePdf {
        fn load(&mut self, _data: &[u8]) -> crate::pdf::Result<()> {
            Ok(())
        }

        fn page_count(&self) -> u32 {
            self.pages.len().max(1) as u32
        }

        fn extract_text(&self) -> crate::pdf::Result<String> {
            self.text
                .clone()
                .ok_or_else(|| PdfError::TextExtraction("no text layer".to_string()))
        }

        fn page_images(&self, page: u32) -> crate::pdf::Result<Vec<DynamicImage>> {
            Ok(self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default())
        }

        fn document_images(&self) -> Vec<DynamicImage> {
            Vec::new()
        }
    }

    struct BrokenOcr;

    impl OcrBackend for BrokenOcr {
        fn name(&self) -> &str {
            "broken"
        }

        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<String, OcrError> {
            Err(OcrError::Recognition("model crashed".to_string()))
        }
    }

    fn ocr(text: &str) -> Arc<OcrHandle> {
        Arc::new(OcrHandle::ready(Arc::new(FixedOcr(text.to_string()))))
    }

    #[test]
    fn test_embedded_text_preferred() {
        let acquirer = TextAcquirer::new(AcquisitionConfig::default()).with_ocr(ocr("scanned"));
        let result = acquirer.acquire_from(&FakePdf::new(Some(LONG_TEXT), 1)).unwrap();
        assert_eq!(result.source, TextSource::Embedded);
        assert_eq!(result.text, LONG_TEXT);
    }

    #[test]
    fn test_short_text_falls_back_to_ocr() {
        let acquirer = TextAcquirer::new(AcquisitionConfig::default()).with_ocr(ocr("scanned"));
        let result = acquirer.acquire_from(&FakePdf::new(Some("  x "), 2)).unwrap();
        assert_eq!(result.source, TextSource::Ocr);
        assert_eq!(result.text, "scanned\n\nscanned");
        assert_eq!(result.page_count, 2);
    }

    #[test]
    fn test_max_pages_limits_ocr() {
        let config = AcquisitionConfig {
            max_pages: 1,
            ..Default::default()
        };
        let acquirer = TextAcquirer::new(config).with_ocr(ocr("page"));
        let result = acquirer.acquire_from(&FakePdf::new(None, 3)).unwrap();
        assert_eq!(result.text, "page");
    }

    #[test]
    fn test_without_ocr_keeps_short_embedded_text() {
        let acquirer = TextAcquirer::new(AcquisitionConfig::default());
        let result = acquirer.acquire_from(&FakePdf::new(Some("Invoice 7"), 1)).unwrap();
        assert_eq!(result.source, TextSource::Embedded);
        assert_eq!(result.text, "Invoice 7");
    }

    #[test]
    fn test_failed_pages_are_skipped() {
        let handle = Arc::new(OcrHandle::ready(Arc::new(BrokenOcr)));
        let acquirer = TextAcquirer::new(AcquisitionConfig::default()).with_ocr(handle);
        let result = acquirer.acquire_from(&FakePdf::new(Some("short"), 2)).unwrap();
        assert_eq!(result.source, TextSource::Embedded);
        assert_eq!(result.text, "short");
    }

    #[test]
    fn test_no_text_anywhere() {
        let acquirer = TextAcquirer::new(AcquisitionConfig::default()).with_ocr(ocr("  "));
        let err = acquirer.acquire_from(&FakePdf::new(None, 1)).unwrap_err();
        assert!(matches!(err, IntakeError::NoText));
    }

    #[test]
    fn test_acquire_rejects_non_pdf() {
        let acquirer = TextAcquirer::new(AcquisitionConfig::default());
        let err = acquirer.acquire(b"plain text, not a pdf").unwrap_err();
        assert!(matches!(err, IntakeError::Pdf(PdfError::Parse(_))));
    }
}
