//! OCR collaborator used when a document has no usable embedded text.
//!
//! The recognizer itself is pluggable through [`OcrBackend`]. Acquirers hold
//! an [`OcrHandle`], which loads the backend on first use and shares it
//! between documents.

#[cfg(feature = "onnx")]
mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::OnnxOcr;

use std::sync::{Arc, OnceLock};

use image::DynamicImage;
use tracing::info;

use crate::error::OcrError;

/// A text recognizer for page images.
pub trait OcrBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Recognize the text of one page image, lines separated by `\n`.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn OcrBackend>, OcrError> + Send + Sync>;

/// Lazily initialized, shared OCR backend.
pub struct OcrHandle {
    backend: OnceLock<Arc<dyn OcrBackend>>,
    loader: Loader,
}

impl OcrHandle {
    /// Defer backend construction until the first document needs OCR.
    pub fn lazy<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn OcrBackend>, OcrError> + Send + Sync + 'static,
    {
        Self {
            backend: OnceLock::new(),
            loader: Box::new(loader),
        }
    }

    /// Wrap an already constructed backend.
    pub fn ready(backend: Arc<dyn OcrBackend>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::clone(&backend));
        Self {
            backend: cell,
            loader: Box::new(move || Ok(Arc::clone(&backend))),
        }
    }

    /// Whether the backend has been constructed.
    pub fn is_loaded(&self) -> bool {
        self.backend.get().is_some()
    }

    /// The backend, loading it on first call.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn get(&self) -> Result<Arc<dyn OcrBackend>, OcrError> {
        if let Some(backend) = self.backend.get() {
            return Ok(Arc::clone(backend));
        }

        let loaded = (self.loader)()?;
        info!("Loaded OCR backend: {}", loaded.name());
        Ok(Arc::clone(self.backend.get_or_init(|| loaded)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend returning fixed text for every page.
    pub(crate) struct FixedOcr(pub String);

    impl OcrBackend for FixedOcr {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_lazy_handle_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let handle = OcrHandle::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FixedOcr("text".to_string())) as Arc<dyn OcrBackend>)
        });

        assert!(!handle.is_loaded());
        handle.get().unwrap();
        handle.get().unwrap();
        assert!(handle.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let handle = OcrHandle::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(OcrError::ModelLoad("missing det.onnx".to_string()))
        });

        assert!(handle.get().is_err());
        assert!(handle.get().is_err());
        assert!(!handle.is_loaded());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_ready_handle() {
        let handle = OcrHandle::ready(Arc::new(FixedOcr("x".to_string())));
        assert!(handle.is_loaded());
        assert_eq!(handle.get().unwrap().name(), "fixed");
    }
}
