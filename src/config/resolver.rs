//! Resolution of optional config fragments into a complete configuration.

use serde::{Deserialize, Serialize};

use super::{DetectionConfig, ExtractionConfig, LlmConfig, OcrConfig};
use crate::error::{Error, Result};
use crate::model::{resolve_includes, CanonicalLabel, Document, ExtractionType};

/// Collects optional configuration fragments and fills the gaps with defaults.
///
/// Resolution never fails: an absent fragment is the trigger for its default.
///
/// # Example
///
/// ```
/// use docviz::{ConfigResolver, DetectionConfig, ExtractionType};
///
/// let resolved = ConfigResolver::new()
///     .with_detection(DetectionConfig::new().with_confidence(0.3))
///     .with_includes([ExtractionType::Table])
///     .resolve();
///
/// assert_eq!(resolved.detection.confidence, 0.3);
/// assert_eq!(resolved.includes, vec![ExtractionType::Table]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigResolver {
    pub extraction: Option<ExtractionConfig>,
    pub detection: Option<DetectionConfig>,
    pub ocr: Option<OcrConfig>,
    pub llm: Option<LlmConfig>,
    pub includes: Option<Vec<ExtractionType>>,
}

impl ConfigResolver {
    /// Create an empty resolver (everything defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse fragments from JSON. Every key is optional.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn with_extraction(mut self, config: ExtractionConfig) -> Self {
        self.extraction = Some(config);
        self
    }

    pub fn with_detection(mut self, config: DetectionConfig) -> Self {
        self.detection = Some(config);
        self
    }

    pub fn with_ocr(mut self, config: OcrConfig) -> Self {
        self.ocr = Some(config);
        self
    }

    pub fn with_llm(mut self, config: LlmConfig) -> Self {
        self.llm = Some(config);
        self
    }

    /// Restrict output to the given categories.
    pub fn with_includes(mut self, includes: impl IntoIterator<Item = ExtractionType>) -> Self {
        self.includes = Some(includes.into_iter().collect());
        self
    }

    /// Fill every missing fragment with its default.
    pub fn resolve(&self) -> ResolvedConfig {
        self.resolve_with(ExtractionConfig::default)
    }

    /// Like [`resolve`](Self::resolve), but a missing extraction fragment is
    /// inherited from the document's stored default.
    pub fn resolve_for(&self, document: &Document) -> ResolvedConfig {
        self.resolve_with(|| document.config().clone())
    }

    fn resolve_with(&self, extraction: impl FnOnce() -> ExtractionConfig) -> ResolvedConfig {
        ResolvedConfig {
            extraction: self.extraction.clone().unwrap_or_else(extraction),
            detection: self.detection.clone().unwrap_or_default(),
            ocr: self.ocr.clone().unwrap_or_default(),
            llm: self.llm.clone().unwrap_or_default(),
            includes: resolve_includes(self.includes.as_deref()),
        }
    }
}

/// A fully populated configuration, immutable for one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub extraction: ExtractionConfig,
    pub detection: DetectionConfig,
    pub ocr: OcrConfig,
    pub llm: LlmConfig,

    /// Concrete output categories to keep (never contains `All`)
    pub includes: Vec<ExtractionType>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ConfigResolver::new().resolve()
    }
}

impl ResolvedConfig {
    /// Check caller-supplied values before any I/O.
    pub fn validate(&self) -> Result<()> {
        let confidence = self.detection.confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::InvalidConfig(format!(
                "detection confidence must be within [0, 1], got {confidence}"
            )));
        }
        if self.detection.image_size == 0 {
            return Err(Error::InvalidConfig(
                "detection image_size must be positive".to_string(),
            ));
        }
        let (zx, zy) = (self.extraction.zoom_x, self.extraction.zoom_y);
        if !(zx > 0.0 && zy > 0.0 && zx.is_finite() && zy.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "zoom factors must be positive, got {zx}x{zy}"
            )));
        }
        Ok(())
    }

    /// Whether regions with this label are never extracted.
    pub fn is_excluded(&self, label: CanonicalLabel) -> bool {
        self.extraction.labels_to_exclude.contains(&label)
            || self.ocr.labels_to_exclude.contains(&label)
    }

    /// Whether regions with this label go through OCR followed by the LLM.
    pub fn is_chart(&self, label: CanonicalLabel) -> bool {
        self.ocr.chart_labels.contains(&label)
    }

    /// Whether entries of this kind are kept in the output.
    pub fn includes(&self, kind: ExtractionType) -> bool {
        self.includes.contains(&kind)
    }

    /// Copy of this configuration with a different extraction fragment.
    pub fn with_extraction(&self, extraction: ExtractionConfig) -> Self {
        Self {
            extraction,
            ..self.clone()
        }
    }
}
