use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The visual channel a scale drives for a mark
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScaleRole {
    X,
    Y,
    Color,
    Size,
    Opacity,
    Skew,
    Rotation,
}

/// What a mark has to recompute when the scale behind a role changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleRefresh {
    Position,
    Colors,
    Sizes,
    Opacities,
    Skews,
}

impl ScaleRole {
    pub fn is_positional(self) -> bool {
        matches!(self, ScaleRole::X | ScaleRole::Y)
    }

    pub fn refresh(self) -> ScaleRefresh {
        match self {
            ScaleRole::X | ScaleRole::Y | ScaleRole::Rotation => ScaleRefresh::Position,
            ScaleRole::Color => ScaleRefresh::Colors,
            ScaleRole::Size => ScaleRefresh::Sizes,
            ScaleRole::Opacity => ScaleRefresh::Opacities,
            ScaleRole::Skew => ScaleRefresh::Skews,
        }
    }

    /// Fixed range of a non-positional role. Positional ranges come from the plot area and
    /// color scales own their range.
    pub fn fixed_range(self, default_size: f32) -> Option<(f32, f32)> {
        match self {
            ScaleRole::X | ScaleRole::Y | ScaleRole::Color => None,
            ScaleRole::Size => Some((0.0, default_size)),
            ScaleRole::Opacity => Some((0.2, 1.0)),
            ScaleRole::Skew => Some((0.0, 1.0)),
            ScaleRole::Rotation => Some((0.0, 180.0)),
        }
    }

    /// Whether pixel padding reported by views applies to this role
    pub fn accepts_padding(self) -> bool {
        self.is_positional()
    }
}
