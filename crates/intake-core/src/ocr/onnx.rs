//! OCR backend using `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::sync::{Arc, Mutex};

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrModelConfig;

use super::{OcrBackend, OcrHandle};

/// Recognized line with its top-left corner, used for reading order.
struct Line {
    x: f64,
    y: f64,
    text: String,
}

/// OCR backend backed by PaddleOCR models run through `pure-onnx-ocr`.
pub struct OnnxOcr {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
    keep_unknown: bool,
}

impl OnnxOcr {
    /// Load detection, recognition and dictionary files from the model directory.
    pub fn from_config(config: &OcrModelConfig) -> Result<Self, OcrError> {
        let path = |name: &str| {
            config
                .model_path(name)
                .ok_or_else(|| OcrError::ModelLoad("no OCR model directory configured".to_string()))
        };
        let det_path = path(&config.detection_model)?;
        let rec_path = path(&config.recognition_model)?;
        let dict_path = path(&config.dictionary)?;

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", det_path.display());

        Ok(Self {
            engine: Mutex::new(engine),
            keep_unknown: config.keep_unknown,
        })
    }
}

impl OcrBackend for OnnxOcr {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let (width, height) = image.dimensions();
        debug!("Running OCR on {}x{} image", width, height);

        let results = {
            let engine = self
                .engine
                .lock()
                .map_err(|_| OcrError::Recognition("OCR engine lock poisoned".to_string()))?;
            engine
                .run_from_image(image)
                .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?
        };

        let mut lines: Vec<Line> = results
            .iter()
            .map(|r| {
                let (x, y) = r
                    .bounding_box
                    .exterior()
                    .coords()
                    .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)));
                let text = if self.keep_unknown {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Line { x, y, text }
            })
            .collect();

        // Rows are bucketed by 20px so slightly skewed boxes share a line.
        lines.sort_by(|a, b| {
            let row_a = (a.y / 20.0) as i64;
            let row_b = (b.y / 20.0) as i64;
            row_a
                .cmp(&row_b)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        debug!("OCR produced {} text regions", lines.len());
        Ok(lines
            .into_iter()
            .map(|l| l.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl OcrHandle {
    /// Handle that loads [`OnnxOcr`] from `config` on first use.
    pub fn onnx(config: OcrModelConfig) -> Self {
        OcrHandle::lazy(move || {
            let backend = OnnxOcr::from_config(&config)?;
            Ok(Arc::new(backend) as Arc<dyn OcrBackend>)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_dir_is_load_error() {
        let err = OnnxOcr::from_config(&OcrModelConfig::default()).err().unwrap();
        assert!(matches!(err, OcrError::ModelLoad(_)));
    }

    #[test]
    fn test_onnx_handle_defers_loading() {
        let handle = OcrHandle::onnx(OcrModelConfig::default());
        assert!(!handle.is_loaded());
        assert!(handle.get().is_err());
    }
}
