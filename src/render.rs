//! Annotation rendering: selected regions become colored outlines and labels
//! drawn on a copy of the uploaded image.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, BresenhamLineIter,
};
use imageproc::rect::Rect;
use serde::Serialize;

use crate::analysis::{AnalysisResult, Vertex};
use crate::error::AnalyzerError;
use crate::palette::{color_for_position, NamedColor, TEXT_BOX_COLOR};

pub const POLYGON_STROKE: u32 = 4;
pub const TEXT_BOX_STROKE: u32 = 3;

/// Labels sit this far above the first vertex so they don't cover the shape.
pub const OBJECT_LABEL_OFFSET: i32 = 18;
pub const FACE_LABEL_OFFSET: i32 = 15;
pub const WORD_LABEL_OFFSET: i32 = 15;

const LABEL_SCALE: f32 = 16.0;

/// One line of the legend shown next to the annotated image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationLabel {
    pub text: String,
    pub color: NamedColor,
}

#[derive(Debug, Clone)]
pub struct RenderedAnnotation {
    pub image: RgbImage,
    pub labels: Vec<AnnotationLabel>,
    pub caption: &'static str,
}

pub struct AnnotationRenderer {
    font: Option<FontVec>,
    scale: PxScale,
}

impl Default for AnnotationRenderer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AnnotationRenderer {
    /// Without a font, outlines are still drawn but the on-image text is not.
    pub fn new(font: Option<FontVec>) -> Self {
        Self {
            font,
            scale: PxScale::from(LABEL_SCALE),
        }
    }

    /// Draw the selected regions of `result` onto a copy of `image`.
    ///
    /// `selection` holds indices into the result's regions; its order decides
    /// both palette color and legend order. Duplicates are drawn again with
    /// the color of their later position. Any out-of-range index fails the
    /// whole call before a single pixel is touched.
    pub fn render(
        &self,
        image: &RgbImage,
        result: &AnalysisResult,
        selection: &[usize],
    ) -> Result<RenderedAnnotation, AnalyzerError> {
        validate_selection(selection, result.len())?;

        let mut canvas = image.clone();
        let (width, height) = canvas.dimensions();
        let mut labels = Vec::with_capacity(selection.len());

        let caption = match result {
            AnalysisResult::Classification(_) => "Classification Complete",
            AnalysisResult::Objects(_) | AnalysisResult::Text { .. } | AnalysisResult::Faces(_)
                if selection.is_empty() =>
            {
                placeholder_caption(result)
            }
            AnalysisResult::Objects(objects) => {
                for (position, &index) in selection.iter().enumerate() {
                    let object = &objects[index];
                    let color = color_for_position(position);
                    let points = map_polygon(&object.polygon, width, height);
                    draw_polygon_outline(&mut canvas, &points, POLYGON_STROKE, color.rgb);
                    self.draw_label(
                        &mut canvas,
                        &points,
                        OBJECT_LABEL_OFFSET,
                        &format!("{} {:.2}", object.name, object.confidence),
                        color.rgb,
                    );
                    labels.push(AnnotationLabel {
                        text: format!("{} · Confidence: {:.2}", object.name, object.confidence),
                        color,
                    });
                }
                "Selected Objects Highlighted"
            }
            AnalysisResult::Text { words, .. } => {
                for &index in selection {
                    let word = &words[index];
                    let points = map_polygon(&word.polygon, width, height);
                    if let (Some(&first), Some(&opposite)) = (points.first(), points.get(2)) {
                        draw_box_outline(
                            &mut canvas,
                            first,
                            opposite,
                            TEXT_BOX_STROKE,
                            TEXT_BOX_COLOR.rgb,
                        );
                    }
                    self.draw_label(
                        &mut canvas,
                        &points,
                        WORD_LABEL_OFFSET,
                        &format!("{} {:.2}", word.text, word.confidence),
                        TEXT_BOX_COLOR.rgb,
                    );
                    labels.push(AnnotationLabel {
                        text: format!("{} · Confidence: {:.2}", word.text, word.confidence),
                        color: TEXT_BOX_COLOR,
                    });
                }
                "Selected Words Highlighted"
            }
            AnalysisResult::Faces(faces) => {
                for (position, &index) in selection.iter().enumerate() {
                    let face = &faces[index];
                    let color = color_for_position(position);
                    let points = map_polygon(&face.polygon, width, height);
                    draw_polygon_outline(&mut canvas, &points, POLYGON_STROKE, color.rgb);
                    // Faces are numbered over the full detection list.
                    let name = format!("Face {}", index + 1);
                    self.draw_label(
                        &mut canvas,
                        &points,
                        FACE_LABEL_OFFSET,
                        &format!("{} {:.2}", name, face.confidence),
                        color.rgb,
                    );
                    labels.push(AnnotationLabel {
                        text: format!("{} · Confidence: {:.2}", name, face.confidence),
                        color,
                    });
                }
                "Selected Faces Highlighted"
            }
        };

        Ok(RenderedAnnotation {
            image: canvas,
            labels,
            caption,
        })
    }

    fn draw_label(
        &self,
        canvas: &mut RgbImage,
        points: &[(i32, i32)],
        offset: i32,
        text: &str,
        color: Rgb<u8>,
    ) {
        if let (Some(font), Some((x, y))) = (self.font.as_ref(), label_anchor(points, offset)) {
            draw_text_mut(canvas, color, x, y, self.scale, font, text);
        }
    }
}

/// Top-left corner of a label: `offset` pixels above the first vertex,
/// kept inside the top edge of the image.
pub fn label_anchor(points: &[(i32, i32)], offset: i32) -> Option<(i32, i32)> {
    points.first().map(|&(x, y)| (x, (y - offset).max(0)))
}

fn placeholder_caption(result: &AnalysisResult) -> &'static str {
    match result {
        AnalysisResult::Classification(_) => "Classification Complete",
        AnalysisResult::Objects(_) => "Select objects to highlight.",
        AnalysisResult::Text { .. } => "Select text to highlight.",
        AnalysisResult::Faces(_) => "Select faces to highlight.",
    }
}

fn validate_selection(selection: &[usize], len: usize) -> Result<(), AnalyzerError> {
    match selection.iter().find(|&&index| index >= len) {
        Some(&index) => Err(AnalyzerError::InvalidSelection { index, len }),
        None => Ok(()),
    }
}

/// Map a normalized vertex to pixel coordinates, rounding half up.
pub fn to_pixel(vertex: Vertex, width: u32, height: u32) -> (i32, i32) {
    (
        round_half_up(vertex.x * width as f64),
        round_half_up(vertex.y * height as f64),
    )
}

fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn map_polygon(polygon: &[Vertex], width: u32, height: u32) -> Vec<(i32, i32)> {
    polygon
        .iter()
        .map(|&vertex| to_pixel(vertex, width, height))
        .collect()
}

/// Closed outline through every point, stroked with a square brush.
fn draw_polygon_outline(canvas: &mut RgbImage, points: &[(i32, i32)], stroke: u32, color: Rgb<u8>) {
    match points {
        [] => {}
        [only] => stamp(canvas, *only, stroke, color),
        _ => {
            for (i, &start) in points.iter().enumerate() {
                let end = points[(i + 1) % points.len()];
                draw_thick_segment(canvas, start, end, stroke, color);
            }
        }
    }
}

fn draw_thick_segment(
    canvas: &mut RgbImage,
    start: (i32, i32),
    end: (i32, i32),
    stroke: u32,
    color: Rgb<u8>,
) {
    stamp(canvas, start, stroke, color);
    let line = BresenhamLineIter::new(
        (start.0 as f32, start.1 as f32),
        (end.0 as f32, end.1 as f32),
    );
    for point in line {
        stamp(canvas, point, stroke, color);
    }
    stamp(canvas, end, stroke, color);
}

fn stamp(canvas: &mut RgbImage, (x, y): (i32, i32), stroke: u32, color: Rgb<u8>) {
    let stroke = stroke.max(1);
    let half = (stroke / 2) as i32;
    // draw_filled_rect_mut clips to the canvas
    draw_filled_rect_mut(canvas, Rect::at(x - half, y - half).of_size(stroke, stroke), color);
}

/// Axis-aligned box between two diagonal corners, inclusive, stroke grown inward.
fn draw_box_outline(
    canvas: &mut RgbImage,
    a: (i32, i32),
    b: (i32, i32),
    stroke: u32,
    color: Rgb<u8>,
) {
    let (left, right) = (a.0.min(b.0), a.0.max(b.0));
    let (top, bottom) = (a.1.min(b.1), a.1.max(b.1));
    for inset in 0..stroke as i32 {
        let w = right - left + 1 - 2 * inset;
        let h = bottom - top + 1 - 2 * inset;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(left + inset, top + inset).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}
