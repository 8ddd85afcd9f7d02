//! Raw class tables of the supported detection models.

use crate::config::DetectionBackendKind;
use crate::model::CanonicalLabel;

/// DocStructBench classes emitted by DocLayout-YOLO.
const DOCSTRUCTBENCH_CLASSES: &[(&str, CanonicalLabel)] = &[
    ("title", CanonicalLabel::Title),             // 0
    ("plain text", CanonicalLabel::Text),         // 1
    ("abandon", CanonicalLabel::Other),           // 2
    ("figure", CanonicalLabel::Figure),           // 3
    ("figure_caption", CanonicalLabel::Caption),  // 4
    ("table", CanonicalLabel::Table),             // 5
    ("table_caption", CanonicalLabel::Caption),   // 6
    ("table_footnote", CanonicalLabel::Footnote), // 7
    ("isolate_formula", CanonicalLabel::Formula), // 8
    ("formula_caption", CanonicalLabel::Caption), // 9
];

/// DocLayNet classes emitted by the YOLO DocLayNet models.
const DOCLAYNET_CLASSES: &[(&str, CanonicalLabel)] = &[
    ("Caption", CanonicalLabel::Caption),        // 0
    ("Footnote", CanonicalLabel::Footnote),      // 1
    ("Formula", CanonicalLabel::Formula),        // 2
    ("List-item", CanonicalLabel::ListItem),     // 3
    ("Page-footer", CanonicalLabel::PageFooter), // 4
    ("Page-header", CanonicalLabel::PageHeader), // 5
    ("Picture", CanonicalLabel::Figure),         // 6
    ("Section-header", CanonicalLabel::Title),   // 7
    ("Table", CanonicalLabel::Table),            // 8
    ("Text", CanonicalLabel::Text),              // 9
    ("Title", CanonicalLabel::Title),            // 10
];

fn class_table(kind: DetectionBackendKind) -> &'static [(&'static str, CanonicalLabel)] {
    match kind {
        DetectionBackendKind::DocLayoutYolo => DOCSTRUCTBENCH_CLASSES,
        DetectionBackendKind::YoloDocLayNet => DOCLAYNET_CLASSES,
    }
}

/// Map a raw class id to a canonical label. Unknown ids map to `Other`.
pub fn canonical_label(kind: DetectionBackendKind, class_id: u32) -> CanonicalLabel {
    class_table(kind)
        .get(class_id as usize)
        .map(|(_, label)| *label)
        .unwrap_or(CanonicalLabel::Other)
}

/// Model-native name of a raw class id.
pub fn raw_class_name(kind: DetectionBackendKind, class_id: u32) -> Option<&'static str> {
    class_table(kind).get(class_id as usize).map(|(name, _)| *name)
}

/// Number of classes a model family emits.
pub fn class_count(kind: DetectionBackendKind) -> usize {
    class_table(kind).len()
}
