use std::rc::Rc;

use indexmap::IndexMap;
use quiver_common::binding::{resolve_all, ModelRef};
use quiver_common::color::to_css;
use quiver_common::signal::Subscription;
use quiver_scales::{ScaleEvent, ScaleKind, ScaleRef, ScaleRole};

use crate::datum::{DataPoint, MarkDatum};
use crate::error::QuiverMarkError;
use crate::parent::{FigureScales, MarkParent};

/// Concrete scales of one view. Positional roles are always present.
#[derive(Debug, Clone)]
pub struct ResolvedScales {
    pub x: ScaleRef,
    pub y: ScaleRef,
    pub others: IndexMap<ScaleRole, ScaleRef>,
}

impl ResolvedScales {
    pub fn get(&self, role: ScaleRole) -> Option<&ScaleRef> {
        match role {
            ScaleRole::X => Some(&self.x),
            ScaleRole::Y => Some(&self.y),
            ScaleRole::Color
            | ScaleRole::Size
            | ScaleRole::Opacity
            | ScaleRole::Skew
            | ScaleRole::Rotation => self.others.get(&role),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScaleRole, &ScaleRef)> {
        [(ScaleRole::X, &self.x), (ScaleRole::Y, &self.y)]
            .into_iter()
            .chain(self.others.iter().map(|(role, scale)| (*role, scale)))
    }
}

/// Await the mark's scale references, falling back to the figure for positional roles.
///
/// References that never resolve are skipped.
pub async fn resolve_scales(
    declared: IndexMap<ScaleRole, ModelRef<ScaleRef>>,
    defaults: FigureScales,
) -> Result<ResolvedScales, QuiverMarkError> {
    let mut resolved = resolve_all(declared).await;
    let x = resolved.shift_remove(&ScaleRole::X).or(defaults.x);
    let y = resolved.shift_remove(&ScaleRole::Y).or(defaults.y);
    match (x, y) {
        (Some(x), Some(y)) => Ok(ResolvedScales {
            x,
            y,
            others: resolved,
        }),
        (None, _) => Err(QuiverMarkError::MissingScale(ScaleRole::X)),
        (_, None) => Err(QuiverMarkError::MissingScale(ScaleRole::Y)),
    }
}

/// Binds a view to its scales: ranges, forward mapping and change subscriptions
#[derive(Debug)]
pub struct ScaleBinding {
    scales: ResolvedScales,
    subscriptions: Vec<Subscription>,
}

impl ScaleBinding {
    pub fn new(scales: ResolvedScales) -> Self {
        Self {
            scales,
            subscriptions: Vec::new(),
        }
    }

    pub async fn resolve(
        declared: IndexMap<ScaleRole, ModelRef<ScaleRef>>,
        defaults: FigureScales,
    ) -> Result<Self, QuiverMarkError> {
        Ok(Self::new(resolve_scales(declared, defaults).await?))
    }

    pub fn scales(&self) -> &ResolvedScales {
        &self.scales
    }

    pub fn get(&self, role: ScaleRole) -> Option<&ScaleRef> {
        self.scales.get(role)
    }

    /// Route every scale notification to `handler` tagged with the role it arrived on
    pub fn subscribe(&mut self, handler: impl Fn(ScaleRole, ScaleEvent) + 'static) {
        let handler = Rc::new(handler);
        let subscriptions: Vec<_> = self
            .scales
            .iter()
            .map(|(role, scale)| {
                let handler = handler.clone();
                scale.on_change(move |event| handler(role, *event))
            })
            .collect();
        self.subscriptions.extend(subscriptions);
    }

    pub fn unsubscribe(&mut self) {
        self.subscriptions.clear();
    }

    /// Assign ranges: padded plot area for x/y, fixed ranges for the attribute roles
    pub fn set_ranges(&self, parent: &dyn MarkParent, default_size: f32) {
        for (role, scale) in self.scales.iter() {
            if role.is_positional() {
                scale.set_range(parent.padded_range(role, scale));
            } else if let Some(range) = role.fixed_range(default_size) {
                scale.set_range(range);
            }
        }
    }

    /// Scale a value through the role's scale, offset included
    pub fn forward(&self, role: ScaleRole, value: f32) -> Option<f32> {
        self.get(role).map(|scale| scale.scale(value) + scale.offset())
    }

    /// Pixel position of a datum
    pub fn position(&self, datum: &MarkDatum) -> [f32; 2] {
        [
            self.scales.x.scale(datum.x) + self.scales.x.offset(),
            self.scales.y.scale(datum.y) + self.scales.y.offset(),
        ]
    }

    /// Data coordinates under a pixel position
    pub fn invert(&self, position: [f32; 2]) -> DataPoint {
        DataPoint {
            x: self.scales.x.invert(position[0] - self.scales.x.offset()),
            y: self.scales.y.invert(position[1] - self.scales.y.offset()),
        }
    }

    /// Value of an attribute role for a datum, when both data and scale exist
    pub fn attribute(&self, role: ScaleRole, value: Option<f32>) -> Option<f32> {
        let value = value?;
        let scale = self.get(role)?;
        (scale.kind() == ScaleKind::Linear).then(|| scale.scale(value))
    }

    /// Fill color of element `index`: the color scale when the datum carries a color value,
    /// otherwise the palette cycled by position
    pub fn element_color(&self, datum: &MarkDatum, index: usize, palette: &[String]) -> Option<String> {
        if let (Some(value), Some(scale)) = (datum.color, self.get(ScaleRole::Color)) {
            if let Some(color) = scale.color(value) {
                return Some(to_css(color));
            }
        }
        if palette.is_empty() {
            None
        } else {
            Some(palette[index % palette.len()].clone())
        }
    }
}
