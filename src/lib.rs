//! Smart Image Analyzer: upload an image, run one of four cloud vision
//! analyses on it, and highlight the detections you pick.

pub mod analysis;
pub mod config;
pub mod error;
pub mod page;
pub mod palette;
pub mod render;
pub mod server;
pub mod session;
pub mod vision;

pub use analysis::{AnalysisRequestKey, AnalysisResult, AnalysisType, ImageIdentity, Vertex};
pub use error::AnalyzerError;
pub use render::{AnnotationLabel, AnnotationRenderer, RenderedAnnotation};
pub use session::SessionState;
pub use vision::{VisionClient, VisionService};
