use serde::{Deserialize, Serialize};

use crate::core::{Insets, Rect, Size};
use crate::render::{Color, Drawable, FontSpec, Paint, TextAlign, TextMetrics};

/// Boxed caption appearance shared by the indicator plugins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub insets: Insets,
    pub text_color: Color,
    pub background: Option<Color>,
    pub border: Option<Color>,
    pub corner_radius: f64,
    /// Falls back to the chart caption font.
    pub font: Option<FontSpec>,
    pub align: TextAlign,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            insets: Insets::new(2.0, 5.0, 2.0, 5.0),
            text_color: Color::WHITE,
            background: None,
            border: None,
            corner_radius: 2.0,
            font: None,
            align: TextAlign::Center,
        }
    }
}

impl LabelStyle {
    #[must_use]
    pub fn boxed(text_color: Color, background: Color) -> Self {
        Self {
            text_color,
            background: Some(background),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    #[must_use]
    pub fn with_border(mut self, border: Color) -> Self {
        self.border = Some(border);
        self
    }

    #[must_use]
    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = Some(font);
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    fn resolved_font<'a>(&'a self, caption_font: &'a FontSpec) -> &'a FontSpec {
        self.font.as_ref().unwrap_or(caption_font)
    }

    /// Size of `text` once padded by the label insets.
    #[must_use]
    pub fn fitting_size(
        &self,
        text: &str,
        caption_font: &FontSpec,
        metrics: &dyn TextMetrics,
    ) -> Size {
        metrics.fitting_size(text, self.resolved_font(caption_font), self.insets)
    }

    /// Writes text, paint and frame into `drawable` and shows it.
    ///
    /// Borders are one physical pixel wide.
    pub fn apply(
        &self,
        drawable: &mut Drawable,
        text: &str,
        caption_font: &FontSpec,
        frame: Rect,
        pixel_scale: f64,
    ) {
        let content = drawable.text_mut(self.insets);
        content.set_text(text);
        content.insets = self.insets;
        content.color = self.text_color;
        content.align = self.align;
        let font = self.resolved_font(caption_font);
        if content.font != *font {
            content.font = font.clone();
        }
        drawable.paint = Paint {
            background: self.background,
            border: self.border,
            border_width: if self.border.is_some() && pixel_scale > 0.0 {
                1.0 / pixel_scale
            } else {
                0.0
            },
            corner_radius: self.corner_radius,
            ..Paint::default()
        };
        drawable.frame = frame;
        drawable.hidden = false;
    }
}

#[cfg(test)]
mod tests {
    use super::LabelStyle;
    use crate::core::Rect;
    use crate::render::{Color, Drawable, DrawableId, DrawableSetup, FontSpec};

    #[test]
    fn apply_sets_text_and_hairline_border() {
        let style = LabelStyle::boxed(Color::WHITE, Color::BLACK).with_border(Color::WHITE);
        let mut drawable = Drawable::new(DrawableId::new(0), DrawableSetup::default());
        drawable.hidden = true;
        style.apply(
            &mut drawable,
            "12.50",
            &FontSpec::system(11.0),
            Rect::new(1.0, 2.0, 30.0, 14.0),
            2.0,
        );

        assert!(!drawable.hidden);
        assert_eq!(drawable.paint.border_width, 0.5);
        let text = drawable.text().expect("text content");
        assert_eq!(text.text, "12.50");
        assert_eq!(text.font.size_px, 11.0);
        assert!(drawable.validate().is_ok());
    }
}
