use std::fmt::Debug;

use palette::{Hsla, IntoColor, Laba, Mix, Srgba};
use serde::{Deserialize, Serialize};

use crate::error::QuiverScaleError;

/// Color space used to blend between color range stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorInterpolation {
    #[default]
    Srgba,
    Hsla,
    Laba,
}

/// A trait for color spaces that can be blended with palette's `Mix`
pub trait ColorSpace: Mix<Scalar = f32> + Copy + IntoColor<Srgba> + Debug + 'static {}

impl<T: Mix<Scalar = f32> + Copy + IntoColor<Srgba> + Debug + 'static> ColorSpace for T {}

/// Evenly spaced color stops
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRange {
    stops: Vec<[f32; 4]>,
    interpolation: ColorInterpolation,
}

impl ColorRange {
    pub fn new(stops: Vec<[f32; 4]>, interpolation: ColorInterpolation) -> Self {
        Self {
            stops,
            interpolation,
        }
    }

    /// Parse css color stops
    pub fn try_from_css(
        colors: &[String],
        interpolation: ColorInterpolation,
    ) -> Result<Self, QuiverScaleError> {
        let stops = colors
            .iter()
            .map(|c| quiver_common::color::parse_color(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(stops, interpolation))
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn interpolation(&self) -> ColorInterpolation {
        self.interpolation
    }

    /// Interpolate at a normalized position in [0, 1]
    pub fn interpolate(&self, t: f32) -> Option<[f32; 4]> {
        let srgba: Vec<Srgba> = self
            .stops
            .iter()
            .map(|c| Srgba::from_components((c[0], c[1], c[2], c[3])))
            .collect();
        match self.interpolation {
            ColorInterpolation::Srgba => interpolate_color(&srgba, t),
            ColorInterpolation::Hsla => {
                let hsla: Vec<Hsla> = srgba.into_iter().map(|c| c.into_color()).collect();
                interpolate_color(&hsla, t)
            }
            ColorInterpolation::Laba => {
                let laba: Vec<Laba> = srgba.into_iter().map(|c| c.into_color()).collect();
                interpolate_color(&laba, t)
            }
        }
    }
}

/// Generic helper function to interpolate colors using palette's `Mix` trait
fn interpolate_color<C: ColorSpace>(colors: &[C], t: f32) -> Option<[f32; 4]> {
    if colors.is_empty() || t.is_nan() {
        return None;
    }
    let scale_factor = (colors.len() - 1) as f32;
    let continuous_index = (t * scale_factor).clamp(0.0, scale_factor);
    let lower_index = continuous_index.floor() as usize;
    let upper_index = continuous_index.ceil() as usize;

    let srgba_color: Srgba = if lower_index == upper_index {
        colors[lower_index].into_color()
    } else {
        let weight = continuous_index - lower_index as f32;
        colors[lower_index]
            .mix(colors[upper_index], weight)
            .into_color()
    };
    let (r, g, b, a) = srgba_color.into_components();
    Some([r, g, b, a])
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_srgba_midpoint() {
        let range = ColorRange::try_from_css(
            &["#000000".to_string(), "#ffffff".to_string()],
            ColorInterpolation::Srgba,
        )
        .unwrap();
        let mid = range.interpolate(0.5).unwrap();
        assert_approx_eq!(f32, mid[0], 0.5);
        assert_approx_eq!(f32, mid[3], 1.0);

        let end = range.interpolate(2.0).unwrap();
        assert_approx_eq!(f32, end[1], 1.0);
    }

    #[test]
    fn test_empty_range() {
        let range = ColorRange::new(vec![], ColorInterpolation::Laba);
        assert_eq!(range.interpolate(0.3), None);
    }
}
