//! Analysis data model.
//!
//! A result is a tagged union keyed by the analysis type that produced it, so
//! the renderer never has to ask whether a field exists.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::AnalyzerError;

/// The four analyses the vision service offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Classification,
    ObjectDetection,
    TextExtraction,
    FaceDetection,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 4] = [
        AnalysisType::Classification,
        AnalysisType::ObjectDetection,
        AnalysisType::TextExtraction,
        AnalysisType::FaceDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Classification => "classification",
            AnalysisType::ObjectDetection => "object_detection",
            AnalysisType::TextExtraction => "text_extraction",
            AnalysisType::FaceDetection => "face_detection",
        }
    }

    /// Title shown in the analysis type picker.
    pub fn title(&self) -> &'static str {
        match self {
            AnalysisType::Classification => "Image Classification",
            AnalysisType::ObjectDetection => "Object Detection",
            AnalysisType::TextExtraction => "Text Extraction",
            AnalysisType::FaceDetection => "Face Detection",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for AnalysisType {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| AnalyzerError::InvalidRequest(format!("unknown analysis type '{}'", s)))
    }
}

/// Opaque token identifying one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageIdentity(String);

impl ImageIdentity {
    /// The same file uploaded twice yields the same identity.
    pub fn from_upload(file_name: &str, bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        ImageIdentity(format!("{}#{:016x}", file_name, hasher.finish()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifies the work a cached result answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisRequestKey {
    pub image: ImageIdentity,
    pub analysis_type: AnalysisType,
}

impl AnalysisRequestKey {
    pub fn new(image: ImageIdentity, analysis_type: AnalysisType) -> Self {
        Self { image, analysis_type }
    }
}

/// A polygon corner as a fraction of image width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLabel {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedObject {
    pub name: String,
    pub confidence: f64,
    pub polygon: Vec<Vertex>,
}

/// A word with its 4-point box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedWord {
    pub text: String,
    pub confidence: f64,
    pub polygon: Vec<Vertex>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedFace {
    pub confidence: f64,
    pub polygon: Vec<Vertex>,
}

/// Everything one vision call detected, for the analysis type that was asked.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Classification(Vec<ImageLabel>),
    Objects(Vec<DetectedObject>),
    Text {
        words: Vec<DetectedWord>,
        full_text: Option<String>,
    },
    Faces(Vec<DetectedFace>),
}

impl AnalysisResult {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisResult::Classification(_) => AnalysisType::Classification,
            AnalysisResult::Objects(_) => AnalysisType::ObjectDetection,
            AnalysisResult::Text { .. } => AnalysisType::TextExtraction,
            AnalysisResult::Faces(_) => AnalysisType::FaceDetection,
        }
    }

    /// Number of detected regions; selection indices must stay below this.
    pub fn len(&self) -> usize {
        match self {
            AnalysisResult::Classification(labels) => labels.len(),
            AnalysisResult::Objects(objects) => objects.len(),
            AnalysisResult::Text { words, .. } => words.len(),
            AnalysisResult::Faces(faces) => faces.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selectable option strings, one per region, in detection order.
    ///
    /// Classification labels carry no geometry and are not selectable.
    pub fn options(&self) -> Vec<String> {
        match self {
            AnalysisResult::Classification(_) => Vec::new(),
            AnalysisResult::Objects(objects) => objects
                .iter()
                .map(|o| format!("{} (Confidence: {:.2})", o.name, o.confidence))
                .collect(),
            AnalysisResult::Text { words, .. } => words
                .iter()
                .map(|w| format!("{} (Confidence: {:.2})", w.text, w.confidence))
                .collect(),
            AnalysisResult::Faces(faces) => faces
                .iter()
                .enumerate()
                .map(|(i, f)| format!("Face {} (Confidence: {:.2})", i + 1, f.confidence))
                .collect(),
        }
    }

    /// Predicted labels for classification results; empty otherwise.
    pub fn summary(&self) -> Vec<String> {
        match self {
            AnalysisResult::Classification(labels) => labels
                .iter()
                .map(|l| format!("{} · Confidence: {:.2}", l.name, l.confidence))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn full_text(&self) -> Option<&str> {
        match self {
            AnalysisResult::Text { full_text, .. } => full_text.as_deref(),
            _ => None,
        }
    }
}

/// Parse a comma separated list of region indices, e.g. `"2, 0,2"`.
pub fn parse_selection(raw: &str) -> Result<Vec<usize>, AnalyzerError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>().map_err(|_| {
                AnalyzerError::InvalidRequest(format!("selection entry '{}' is not an index", part))
            })
        })
        .collect()
}
