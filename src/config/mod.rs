//! Extraction, detection, OCR and LLM configuration.
//!
//! Every config type is a plain value with builder-style `with_*` setters and
//! a `Default` built only from the constants in [`defaults`]. All of them
//! implement serde's traits so a full or partial configuration can be loaded
//! from JSON (missing fields fall back to their defaults).

mod resolver;

pub use resolver::{ConfigResolver, ResolvedConfig};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::model::CanonicalLabel;

/// Built-in default values.
pub mod defaults {
    use crate::model::CanonicalLabel;

    /// Horizontal rendering zoom.
    pub const ZOOM_X: f32 = 2.0;
    /// Vertical rendering zoom.
    pub const ZOOM_Y: f32 = 2.0;
    /// Minimum native-text length (characters) to trust the text layer.
    pub const PDF_TEXT_THRESHOLD_CHARS: usize = 20;

    /// Detection model input size.
    pub const IMAGE_SIZE: u32 = 1024;
    /// Minimum detection score.
    pub const CONFIDENCE: f32 = 0.5;
    /// Directory holding model artifacts.
    pub const MODELS_DIR: &str = "models";
    /// DocStructBench-trained DocLayout-YOLO weights.
    pub const DOCLAYOUT_YOLO_MODEL: &str = "doclayout_yolo_docstructbench_imgsz1024.pt";
    /// DocLayNet-trained YOLOv12 weights (large).
    pub const YOLO_DOCLAYNET_MODEL: &str = "yolov12l-doclaynet.pt";

    /// Tesseract-style language code.
    pub const OCR_LANG: &str = "eng";
    /// Labels that go through OCR followed by LLM structuring.
    pub const CHART_LABELS: [CanonicalLabel; 3] = [
        CanonicalLabel::Figure,
        CanonicalLabel::Table,
        CanonicalLabel::Formula,
    ];
    /// Labels never extracted.
    pub const OCR_LABELS_TO_EXCLUDE: [CanonicalLabel; 4] = [
        CanonicalLabel::Other,
        CanonicalLabel::PageFooter,
        CanonicalLabel::PageHeader,
        CanonicalLabel::Footnote,
    ];

    pub const LLM_MODEL: &str = "gemma3";
    pub const LLM_API_KEY: &str = "dummy-key";
    pub const LLM_BASE_URL: &str = "http://localhost:11434/v1";
}

/// Page-level extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum number of pages to process (None = no limit)
    pub page_limit: Option<u32>,

    /// Horizontal rendering zoom
    pub zoom_x: f32,

    /// Vertical rendering zoom
    pub zoom_y: f32,

    /// Native text shorter than this (in characters, ignoring surrounding
    /// whitespace) falls back to OCR. At 0 every text-like region takes the
    /// native path, and an empty overlap then yields no entry.
    pub pdf_text_threshold_chars: usize,

    /// Labels never extracted, in addition to `OcrConfig::labels_to_exclude`
    pub labels_to_exclude: Vec<CanonicalLabel>,

    /// Prefer the native text layer over OCR for text-like regions
    pub prefer_pdf_text: bool,

    /// Extract the whole page as one text target when no region is detected
    pub whole_page_fallback: bool,
}

impl ExtractionConfig {
    /// Create new extraction settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of processed pages.
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Set both zoom factors.
    pub fn with_zoom(mut self, zoom_x: f32, zoom_y: f32) -> Self {
        self.zoom_x = zoom_x;
        self.zoom_y = zoom_y;
        self
    }

    /// Set the native-text length threshold.
    pub fn with_pdf_text_threshold(mut self, chars: usize) -> Self {
        self.pdf_text_threshold_chars = chars;
        self
    }

    /// Set the labels to exclude.
    pub fn with_labels_to_exclude(
        mut self,
        labels: impl IntoIterator<Item = CanonicalLabel>,
    ) -> Self {
        self.labels_to_exclude = labels.into_iter().collect();
        self
    }

    /// Enable or disable the native text preference.
    pub fn with_prefer_pdf_text(mut self, prefer: bool) -> Self {
        self.prefer_pdf_text = prefer;
        self
    }

    /// Enable or disable the whole-page fallback.
    pub fn with_whole_page_fallback(mut self, enabled: bool) -> Self {
        self.whole_page_fallback = enabled;
        self
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            page_limit: None,
            zoom_x: defaults::ZOOM_X,
            zoom_y: defaults::ZOOM_Y,
            pdf_text_threshold_chars: defaults::PDF_TEXT_THRESHOLD_CHARS,
            labels_to_exclude: Vec::new(),
            prefer_pdf_text: true,
            whole_page_fallback: true,
        }
    }
}

/// Compute device for the detection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[default]
    Cpu,
    /// CUDA device by ordinal
    Cuda(u32),
    /// Apple Metal
    Mps,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
            Device::Mps => f.write_str("mps"),
        }
    }
}

/// Supported layout detection model families.
///
/// Each kind has its own raw class table; see [`crate::layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionBackendKind {
    /// DocLayout-YOLO trained on DocStructBench
    #[default]
    DocLayoutYolo,
    /// YOLO trained on DocLayNet
    YoloDocLayNet,
}

impl DetectionBackendKind {
    /// Default model artifact file name for this backend.
    pub fn default_model(self) -> &'static str {
        match self {
            DetectionBackendKind::DocLayoutYolo => defaults::DOCLAYOUT_YOLO_MODEL,
            DetectionBackendKind::YoloDocLayNet => defaults::YOLO_DOCLAYNET_MODEL,
        }
    }

    /// Default model artifact path for this backend.
    pub fn default_model_path(self) -> PathBuf {
        PathBuf::from(defaults::MODELS_DIR).join(self.default_model())
    }
}

/// Layout detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Model input size in pixels
    pub image_size: u32,

    /// Minimum detection score in [0, 1]
    pub confidence: f32,

    /// Compute device
    pub device: Device,

    /// Model family
    pub backend: DetectionBackendKind,

    /// Model artifact path
    pub model_path: PathBuf,
}

impl DetectionConfig {
    /// Create new detection settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_size(mut self, size: u32) -> Self {
        self.image_size = size;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Switch model family, resetting the model path to that family's default.
    pub fn with_backend(mut self, backend: DetectionBackendKind) -> Self {
        self.backend = backend;
        self.model_path = backend.default_model_path();
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let backend = DetectionBackendKind::default();
        Self {
            image_size: defaults::IMAGE_SIZE,
            confidence: defaults::CONFIDENCE,
            device: Device::default(),
            backend,
            model_path: backend.default_model_path(),
        }
    }
}

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language code passed to the OCR engine
    pub lang: String,

    /// Labels routed through OCR followed by LLM structuring
    pub chart_labels: Vec<CanonicalLabel>,

    /// Labels never extracted
    pub labels_to_exclude: Vec<CanonicalLabel>,
}

impl OcrConfig {
    /// Create new OCR settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_chart_labels(mut self, labels: impl IntoIterator<Item = CanonicalLabel>) -> Self {
        self.chart_labels = labels.into_iter().collect();
        self
    }

    pub fn with_labels_to_exclude(
        mut self,
        labels: impl IntoIterator<Item = CanonicalLabel>,
    ) -> Self {
        self.labels_to_exclude = labels.into_iter().collect();
        self
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            lang: defaults::OCR_LANG.to_string(),
            chart_labels: defaults::CHART_LABELS.to_vec(),
            labels_to_exclude: defaults::OCR_LABELS_TO_EXCLUDE.to_vec(),
        }
    }
}

/// Connection settings for the structuring LLM.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// API key
    pub api_key: String,

    /// OpenAI-compatible endpoint
    pub base_url: String,
}

impl LlmConfig {
    /// Create new LLM settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: defaults::LLM_MODEL.to_string(),
            api_key: defaults::LLM_API_KEY.to_string(),
            base_url: defaults::LLM_BASE_URL.to_string(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.page_limit, None);
        assert_eq!(config.zoom_x, 2.0);
        assert_eq!(config.zoom_y, 2.0);
        assert_eq!(config.pdf_text_threshold_chars, 20);
        assert!(config.labels_to_exclude.is_empty());
        assert!(config.prefer_pdf_text);
        assert!(config.whole_page_fallback);
    }

    #[test]
    fn test_extraction_builder() {
        let config = ExtractionConfig::new()
            .with_page_limit(10)
            .with_zoom(1.5, 3.0)
            .with_prefer_pdf_text(false)
            .with_labels_to_exclude([CanonicalLabel::Code]);

        assert_eq!(config.page_limit, Some(10));
        assert_eq!(config.zoom_y, 3.0);
        assert!(!config.prefer_pdf_text);
        assert_eq!(config.labels_to_exclude, vec![CanonicalLabel::Code]);
    }

    #[test]
    fn test_detection_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.image_size, 1024);
        assert_eq!(config.confidence, 0.5);
        assert_eq!(config.device, Device::Cpu);
        assert_eq!(config.backend, DetectionBackendKind::DocLayoutYolo);
        assert_eq!(
            config.model_path,
            PathBuf::from("models/doclayout_yolo_docstructbench_imgsz1024.pt")
        );
    }

    #[test]
    fn test_with_backend_resets_model_path() {
        let config = DetectionConfig::new().with_backend(DetectionBackendKind::YoloDocLayNet);
        assert!(config.model_path.ends_with("yolov12l-doclaynet.pt"));
    }

    #[test]
    fn test_ocr_defaults() {
        let config = OcrConfig::default();
        assert_eq!(config.lang, "eng");
        assert!(config.chart_labels.contains(&CanonicalLabel::Table));
        assert!(config.labels_to_exclude.contains(&CanonicalLabel::PageHeader));
        assert!(!config.labels_to_exclude.contains(&CanonicalLabel::Text));
    }

    #[test]
    fn test_llm_debug_hides_key() {
        let config = LlmConfig::new().with_api_key("sk-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("gemma3"));
    }

    #[test]
    fn test_device_display() {
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert_eq!(Device::Cuda(1).to_string(), "cuda:1");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DetectionConfig = serde_json::from_str(r#"{"confidence": 0.25}"#).unwrap();
        assert_eq!(config.confidence, 0.25);
        assert_eq!(config.image_size, 1024);
    }
}
