//! Vision service client.
//!
//! Requests go out in the OCI Vision `AnalyzeImage` JSON shape. The response
//! is validated here, once, and turned into a typed [`AnalysisResult`].

use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use std::future::Future;

use crate::analysis::{
    AnalysisResult, AnalysisType, DetectedFace, DetectedObject, DetectedWord, ImageLabel, Vertex,
};
use crate::config::VisionConfig;
use crate::error::AnalyzerError;

/// Something that can run one analysis over raw image bytes.
pub trait VisionService {
    fn analyze(
        &self,
        image: &[u8],
        analysis_type: AnalysisType,
    ) -> impl Future<Output = Result<AnalysisResult, AnalyzerError>> + Send;
}

pub struct VisionClient {
    http: reqwest::Client,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn payload(&self, image_base64: String, analysis_type: AnalysisType) -> serde_json::Value {
        let feature = match analysis_type {
            AnalysisType::Classification => serde_json::json!({
                "featureType": "IMAGE_CLASSIFICATION",
                "maxResults": self.config.classification_max_results,
            }),
            AnalysisType::ObjectDetection => serde_json::json!({ "featureType": "OBJECT_DETECTION" }),
            AnalysisType::TextExtraction => serde_json::json!({ "featureType": "TEXT_DETECTION" }),
            AnalysisType::FaceDetection => serde_json::json!({ "featureType": "FACE_DETECTION" }),
        };

        serde_json::json!({
            "features": [feature],
            "image": {
                "source": "INLINE",
                "data": image_base64
            },
            "compartmentId": self.config.compartment_id
        })
    }
}

impl VisionService for VisionClient {
    async fn analyze(
        &self,
        image: &[u8],
        analysis_type: AnalysisType,
    ) -> Result<AnalysisResult, AnalyzerError> {
        let image_base64 = general_purpose::STANDARD.encode(image);
        let payload = self.payload(image_base64, analysis_type);

        log::info!("📤 Sending {} request to vision service...", analysis_type);

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        log::debug!(
            "Vision response {}: {}",
            status,
            &response_text[..floor_char_boundary(&response_text, 500)]
        );

        if !status.is_success() {
            return Err(AnalyzerError::RemoteAnalysis(format!(
                "API error {}: {}",
                status, response_text
            )));
        }

        let result = parse_response(&response_text, analysis_type)?;
        log::info!("✅ Vision service found {} region(s)", result.len());
        Ok(result)
    }
}

fn floor_char_boundary(text: &str, max: usize) -> usize {
    let mut end = text.len().min(max);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeImageResponse {
    #[serde(default)]
    labels: Option<Vec<WireLabel>>,
    #[serde(default)]
    image_objects: Option<Vec<WireObject>>,
    #[serde(default)]
    image_text: Option<WireImageText>,
    #[serde(default)]
    detected_faces: Option<Vec<WireFace>>,
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    name: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireObject {
    name: String,
    confidence: f64,
    bounding_polygon: WirePolygon,
}

#[derive(Debug, Default, Deserialize)]
struct WireImageText {
    #[serde(default)]
    words: Vec<WireWord>,
    #[serde(default)]
    lines: Vec<WireLine>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWord {
    text: String,
    confidence: f64,
    bounding_polygon: WirePolygon,
}

#[derive(Debug, Deserialize)]
struct WireLine {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFace {
    confidence: f64,
    bounding_polygon: WirePolygon,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePolygon {
    #[serde(default)]
    normalized_vertices: Vec<Vertex>,
}

/// Turn a raw service response into the result for `analysis_type`.
///
/// Lists the service leaves out mean nothing was detected.
pub fn parse_response(
    body: &str,
    analysis_type: AnalysisType,
) -> Result<AnalysisResult, AnalyzerError> {
    let response: AnalyzeImageResponse = serde_json::from_str(body)
        .map_err(|e| AnalyzerError::MalformedResponse(e.to_string()))?;

    let result = match analysis_type {
        AnalysisType::Classification => AnalysisResult::Classification(
            response
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(|label| {
                    Ok(ImageLabel {
                        confidence: confidence(label.confidence, &label.name)?,
                        name: label.name,
                    })
                })
                .collect::<Result<_, AnalyzerError>>()?,
        ),
        AnalysisType::ObjectDetection => AnalysisResult::Objects(
            response
                .image_objects
                .unwrap_or_default()
                .into_iter()
                .map(|object| {
                    Ok(DetectedObject {
                        confidence: confidence(object.confidence, &object.name)?,
                        polygon: polygon(object.bounding_polygon, 3, &object.name)?,
                        name: object.name,
                    })
                })
                .collect::<Result<_, AnalyzerError>>()?,
        ),
        AnalysisType::TextExtraction => {
            let image_text = response.image_text.unwrap_or_default();
            let words = image_text
                .words
                .into_iter()
                .map(|word| {
                    Ok(DetectedWord {
                        confidence: confidence(word.confidence, &word.text)?,
                        polygon: polygon(word.bounding_polygon, 4, &word.text)?,
                        text: word.text,
                    })
                })
                .collect::<Result<_, AnalyzerError>>()?;
            let full_text = image_text.text.filter(|t| !t.is_empty()).or_else(|| {
                let joined = image_text
                    .lines
                    .iter()
                    .map(|line| line.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                (!joined.is_empty()).then_some(joined)
            });
            AnalysisResult::Text { words, full_text }
        }
        AnalysisType::FaceDetection => AnalysisResult::Faces(
            response
                .detected_faces
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(i, face)| {
                    let name = format!("face {}", i + 1);
                    Ok(DetectedFace {
                        confidence: confidence(face.confidence, &name)?,
                        polygon: polygon(face.bounding_polygon, 3, &name)?,
                    })
                })
                .collect::<Result<_, AnalyzerError>>()?,
        ),
    };

    Ok(result)
}

fn confidence(value: f64, region: &str) -> Result<f64, AnalyzerError> {
    if !value.is_finite() {
        return Err(AnalyzerError::MalformedResponse(format!(
            "confidence of '{}' is not a number",
            region
        )));
    }
    Ok(value.clamp(0.0, 1.0))
}

fn polygon(wire: WirePolygon, min_vertices: usize, region: &str) -> Result<Vec<Vertex>, AnalyzerError> {
    let vertices = wire.normalized_vertices;
    if vertices.len() < min_vertices {
        return Err(AnalyzerError::MalformedResponse(format!(
            "'{}' has {} vertices, expected at least {}",
            region,
            vertices.len(),
            min_vertices
        )));
    }
    vertices
        .into_iter()
        .map(|v| {
            if v.x.is_finite() && v.y.is_finite() {
                Ok(Vertex::new(v.x.clamp(0.0, 1.0), v.y.clamp(0.0, 1.0)))
            } else {
                Err(AnalyzerError::MalformedResponse(format!(
                    "'{}' has a non-numeric vertex",
                    region
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJECTS: &str = r#"{
        "imageObjects": [
            {
                "name": "Car",
                "confidence": 0.93,
                "boundingPolygon": {
                    "normalizedVertices": [
                        {"x": 0.1, "y": 0.2}, {"x": 0.4, "y": 0.2},
                        {"x": 0.4, "y": 0.6}, {"x": -0.01, "y": 1.02}
                    ]
                }
            }
        ],
        "imageClassificationModelVersion": "1.5.97"
    }"#;

    fn client() -> VisionClient {
        VisionClient::new(VisionConfig {
            endpoint: "http://localhost/analyzeImage".to_string(),
            api_key: "key".to_string(),
            compartment_id: "ocid1.compartment.test".to_string(),
            classification_max_results: 5,
        })
    }

    #[test]
    fn test_objects_are_parsed_and_clamped() {
        let result = parse_response(OBJECTS, AnalysisType::ObjectDetection).unwrap();
        let AnalysisResult::Objects(objects) = result else {
            panic!("expected objects");
        };
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "Car");
        assert_eq!(objects[0].polygon[3], Vertex::new(0.0, 1.0));
    }

    #[test]
    fn test_missing_lists_mean_nothing_detected() {
        for kind in AnalysisType::ALL {
            let result = parse_response("{}", kind).unwrap();
            assert_eq!(result.analysis_type(), kind);
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_words_need_four_vertices() {
        let body = r#"{"imageText": {"words": [{
            "text": "Hi", "confidence": 0.9,
            "boundingPolygon": {"normalizedVertices": [{"x": 0.1, "y": 0.1}, {"x": 0.2, "y": 0.1}, {"x": 0.2, "y": 0.2}]}
        }]}}"#;
        let err = parse_response(body, AnalysisType::TextExtraction).unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedResponse(_)));
    }

    #[test]
    fn test_full_text_falls_back_to_lines() {
        let body = r#"{"imageText": {"words": [], "lines": [{"text": "EXIT"}, {"text": "ONLY"}]}}"#;
        let result = parse_response(body, AnalysisType::TextExtraction).unwrap();
        assert_eq!(result.full_text(), Some("EXIT\nONLY"));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = parse_response("<html>", AnalysisType::FaceDetection).unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedResponse(_)));
    }

    #[test]
    fn test_classification_payload_carries_max_results() {
        let payload = client().payload("aGk=".to_string(), AnalysisType::Classification);
        assert_eq!(payload["features"][0]["featureType"], "IMAGE_CLASSIFICATION");
        assert_eq!(payload["features"][0]["maxResults"], 5);
        assert_eq!(payload["image"]["source"], "INLINE");
        assert_eq!(payload["compartmentId"], "ocid1.compartment.test");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_remote_failure() {
        let client = VisionClient::new(VisionConfig {
            endpoint: "http://127.0.0.1:9/analyzeImage".to_string(),
            api_key: "key".to_string(),
            compartment_id: "c".to_string(),
            classification_max_results: 5,
        });
        let err = client
            .analyze(b"not really an image", AnalysisType::FaceDetection)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::RemoteAnalysis(_)));
    }
}
