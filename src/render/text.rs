use crate::core::{Insets, Size};

use super::FontSpec;

/// Text measurement capability supplied by the host.
pub trait TextMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> Size;

    /// Size of `text` once padded by `insets`.
    fn fitting_size(&self, text: &str, font: &FontSpec, insets: Insets) -> Size {
        let glyphs = self.measure(text, font);
        Size::new(
            glyphs.width + insets.horizontal(),
            glyphs.height + insets.vertical(),
        )
    }
}

/// Deterministic, backend-independent width estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedTextMetrics;

impl EstimatedTextMetrics {
    const LINE_HEIGHT_RATIO: f64 = 1.2;
}

impl TextMetrics for EstimatedTextMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> Size {
        let units = text.chars().fold(0.0, |acc, ch| {
            acc + match ch {
                '0'..='9' => 0.62,
                '.' | ',' | ':' => 0.34,
                '-' | '+' | '%' => 0.42,
                ' ' => 0.33,
                _ => 0.58,
            }
        });
        Size::new(units * font.size_px, font.size_px * Self::LINE_HEIGHT_RATIO)
    }
}

#[cfg(test)]
mod tests {
    use super::{EstimatedTextMetrics, TextMetrics};
    use crate::core::Insets;
    use crate::render::FontSpec;

    #[test]
    fn fitting_size_adds_insets() {
        let font = FontSpec::system(10.0);
        let plain = EstimatedTextMetrics.measure("12.5", &font);
        let padded =
            EstimatedTextMetrics.fitting_size("12.5", &font, Insets::new(2.0, 5.0, 2.0, 5.0));
        assert_eq!(padded.width, plain.width + 10.0);
        assert_eq!(padded.height, plain.height + 4.0);
        assert_eq!(EstimatedTextMetrics.measure("", &font).width, 0.0);
    }
}
