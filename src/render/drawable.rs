use serde::{Deserialize, Serialize};

use crate::core::{Insets, Point, Rect, Size};
use crate::error::{ChartError, ChartResult};

use super::{Color, FontSpec, Paint, TextAlign};

/// Stable handle of a drawable inside its owning pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DrawableId(usize);

impl DrawableId {
    #[must_use]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Named bitmap resolved by the backend; decoding happens outside the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub name: String,
    pub size: Size,
}

impl ImageRef {
    #[must_use]
    pub fn new(name: impl Into<String>, size: Size) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Text laid out inside the drawable frame shrunk by `insets`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    pub text: String,
    pub font: FontSpec,
    pub color: Color,
    pub align: TextAlign,
    pub insets: Insets,
}

impl TextContent {
    #[must_use]
    pub fn new(insets: Insets) -> Self {
        Self {
            text: String::new(),
            font: FontSpec::default(),
            color: Color::WHITE,
            align: TextAlign::Center,
            insets,
        }
    }

    /// Replaces the text while keeping the existing buffer.
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    /// Frame of the glyph run relative to the drawable origin.
    #[must_use]
    pub fn text_frame(&self, frame: Rect) -> Rect {
        Rect::new(0.0, 0.0, frame.width, frame.height).inset_by(self.insets)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawableContent {
    /// Box painted only through its `Paint` (background, border).
    #[default]
    Empty,
    /// Path made of rectangles in content coordinates.
    Shape { rects: Vec<Rect> },
    /// Open polyline in content coordinates.
    Polyline { points: Vec<Point> },
    Text(TextContent),
    Image(ImageRef),
}

/// One-time attributes applied when a drawable is first created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawableSetup {
    pub contents_scale: f64,
    pub edge_antialiasing: bool,
}

impl Default for DrawableSetup {
    fn default() -> Self {
        Self {
            contents_scale: 1.0,
            edge_antialiasing: true,
        }
    }
}

/// On-screen primitive: frame, content and paint.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    id: DrawableId,
    pub frame: Rect,
    pub content: DrawableContent,
    pub paint: Paint,
    pub z_position: f64,
    pub hidden: bool,
    pub contents_scale: f64,
    pub edge_antialiasing: bool,
}

impl Drawable {
    #[must_use]
    pub fn new(id: DrawableId, setup: DrawableSetup) -> Self {
        Self {
            id,
            frame: Rect::ZERO,
            content: DrawableContent::Empty,
            paint: Paint::default(),
            z_position: 0.0,
            hidden: false,
            contents_scale: setup.contents_scale,
            edge_antialiasing: setup.edge_antialiasing,
        }
    }

    #[must_use]
    pub fn id(&self) -> DrawableId {
        self.id
    }

    /// Rectangles of a shape drawable, switching the content to a shape if needed.
    pub fn shape_rects_mut(&mut self) -> &mut Vec<Rect> {
        if !matches!(self.content, DrawableContent::Shape { .. }) {
            self.content = DrawableContent::Shape { rects: Vec::new() };
        }
        match &mut self.content {
            DrawableContent::Shape { rects } => rects,
            _ => unreachable!("content was just set to a shape"),
        }
    }

    /// Points of a polyline drawable, switching the content to a polyline if needed.
    pub fn polyline_points_mut(&mut self) -> &mut Vec<Point> {
        if !matches!(self.content, DrawableContent::Polyline { .. }) {
            self.content = DrawableContent::Polyline { points: Vec::new() };
        }
        match &mut self.content {
            DrawableContent::Polyline { points } => points,
            _ => unreachable!("content was just set to a polyline"),
        }
    }

    /// Text payload, switching the content to text with `insets` if needed.
    pub fn text_mut(&mut self, insets: Insets) -> &mut TextContent {
        if !matches!(self.content, DrawableContent::Text(_)) {
            self.content = DrawableContent::Text(TextContent::new(insets));
        }
        match &mut self.content {
            DrawableContent::Text(text) => text,
            _ => unreachable!("content was just set to text"),
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&TextContent> {
        match &self.content {
            DrawableContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.frame.is_finite() {
            return Err(ChartError::InvalidData(format!(
                "drawable {} frame must be finite",
                self.id.index()
            )));
        }
        if !self.z_position.is_finite() {
            return Err(ChartError::InvalidData(
                "drawable z position must be finite".to_owned(),
            ));
        }
        if !self.contents_scale.is_finite() || self.contents_scale <= 0.0 {
            return Err(ChartError::InvalidData(
                "drawable contents scale must be finite and > 0".to_owned(),
            ));
        }
        self.paint.validate()?;
        match &self.content {
            DrawableContent::Empty | DrawableContent::Image(_) => Ok(()),
            DrawableContent::Shape { rects } => {
                if rects.iter().any(|rect| !rect.is_finite()) {
                    return Err(ChartError::InvalidData(
                        "shape rectangles must be finite".to_owned(),
                    ));
                }
                Ok(())
            }
            DrawableContent::Polyline { points } => {
                if points.iter().any(|point| !point.is_finite()) {
                    return Err(ChartError::InvalidData(
                        "polyline points must be finite".to_owned(),
                    ));
                }
                Ok(())
            }
            DrawableContent::Text(text) => {
                text.font.validate()?;
                text.color.validate()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Drawable, DrawableContent, DrawableId, DrawableSetup};
    use crate::core::{Insets, Rect};

    #[test]
    fn content_accessors_switch_variant_once() {
        let mut drawable = Drawable::new(DrawableId::new(0), DrawableSetup::default());
        drawable.shape_rects_mut().push(Rect::new(0.0, 0.0, 1.0, 1.0));
        drawable.shape_rects_mut().push(Rect::new(1.0, 0.0, 1.0, 1.0));
        assert!(matches!(&drawable.content, DrawableContent::Shape { rects } if rects.len() == 2));

        drawable.text_mut(Insets::ZERO).set_text("12.50");
        assert_eq!(drawable.text().map(|t| t.text.as_str()), Some("12.50"));
    }

    #[test]
    fn non_finite_geometry_fails_validation() {
        let mut drawable = Drawable::new(DrawableId::new(3), DrawableSetup::default());
        assert!(drawable.validate().is_ok());
        drawable.frame.y = f64::NAN;
        assert!(drawable.validate().is_err());
    }
}
