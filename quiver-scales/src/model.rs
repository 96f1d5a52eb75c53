use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use quiver_common::binding::ModelId;
use quiver_common::signal::{Signal, Subscription};
use serde::{Deserialize, Serialize};

use crate::color::{ColorInterpolation, ColorRange};
use crate::error::QuiverScaleError;
use crate::linear::{LinearNumericScale, LinearNumericScaleConfig};
use crate::role::ScaleRole;

pub type ScaleRef = Rc<ScaleModel>;

/// Identity of one domain contribution: the mark that made it and the role it made it for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainOwner {
    pub model: ModelId,
    pub role: ScaleRole,
}

impl DomainOwner {
    pub fn new(model: &ModelId, role: ScaleRole) -> Self {
        Self {
            model: model.clone(),
            role,
        }
    }
}

impl fmt::Display for DomainOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.model, self.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleKind {
    Linear,
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleEvent {
    DomainChanged,
    ColorsChanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Fixed lower bound. Data contributions only move the upper bound when set.
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub reverse: bool,
    pub clamp: bool,
    pub allow_padding: bool,
    /// Color range stops, color scales only
    pub colors: Vec<String>,
    pub interpolation: ColorInterpolation,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            reverse: false,
            clamp: false,
            allow_padding: true,
            colors: Vec::new(),
            interpolation: ColorInterpolation::Srgba,
        }
    }
}

const DEFAULT_COLOR_RANGE: [&str; 3] = ["#d73027", "#ffffbf", "#1a9850"];

const DEFAULT_DOMAIN: (f32, f32) = (0.0, 1.0);

struct ScaleState {
    numeric: LinearNumericScale,
    contributions: IndexMap<DomainOwner, (f32, f32)>,
    min: Option<f32>,
    max: Option<f32>,
    colors: ColorRange,
}

/// A scale shared by reference between marks.
///
/// The domain is the union of the contributions currently registered, each keyed by its
/// [`DomainOwner`]. `DomainChanged` is emitted synchronously, and only when the domain value
/// actually changed.
pub struct ScaleModel {
    id: ModelId,
    kind: ScaleKind,
    reverse: bool,
    allow_padding: bool,
    offset: Cell<f32>,
    state: RefCell<ScaleState>,
    changed: Signal<ScaleEvent>,
}

impl ScaleModel {
    pub fn linear(config: ScaleConfig) -> ScaleRef {
        let colors = ColorRange::new(vec![], config.interpolation);
        Rc::new(Self::build(ScaleKind::Linear, config, colors))
    }

    pub fn color_scale(config: ScaleConfig) -> Result<ScaleRef, QuiverScaleError> {
        let colors = if config.colors.is_empty() {
            DEFAULT_COLOR_RANGE.iter().map(|c| c.to_string()).collect()
        } else {
            config.colors.clone()
        };
        let range = ColorRange::try_from_css(&colors, config.interpolation)?;
        Ok(Rc::new(Self::build(ScaleKind::Color, config, range)))
    }

    fn build(kind: ScaleKind, config: ScaleConfig, colors: ColorRange) -> Self {
        let numeric = LinearNumericScale::new(&LinearNumericScaleConfig {
            clamp: config.clamp || kind == ScaleKind::Color,
            ..Default::default()
        });
        let prefix = match kind {
            ScaleKind::Linear => "LinearScale",
            ScaleKind::Color => "ColorScale",
        };
        let this = Self {
            id: ModelId::unique(prefix),
            kind,
            reverse: config.reverse,
            allow_padding: config.allow_padding && kind == ScaleKind::Linear,
            offset: Cell::new(0.0),
            state: RefCell::new(ScaleState {
                numeric,
                contributions: IndexMap::new(),
                min: config.min,
                max: config.max,
                colors,
            }),
            changed: Signal::new(),
        };
        {
            let mut state = this.state.borrow_mut();
            let domain = this.compute_domain(&state);
            state.numeric.set_domain(domain);
        }
        this
    }

    pub fn id(&self) -> &ModelId {
        &self.id
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    pub fn allow_padding(&self) -> bool {
        self.allow_padding
    }

    pub fn domain(&self) -> (f32, f32) {
        self.state.borrow().numeric.domain()
    }

    pub fn range(&self) -> (f32, f32) {
        self.state.borrow().numeric.range()
    }

    pub fn offset(&self) -> f32 {
        self.offset.get()
    }

    pub fn set_offset(&self, offset: f32) {
        self.offset.set(offset);
    }

    /// Assign the pixel (or attribute) range. Color scales keep a unit range.
    pub fn set_range(&self, range: (f32, f32)) {
        if self.kind == ScaleKind::Color {
            return;
        }
        self.state.borrow_mut().numeric.set_range(range);
    }

    pub fn scale(&self, value: f32) -> f32 {
        self.state.borrow().numeric.scale(value)
    }

    pub fn invert(&self, pixel: f32) -> f32 {
        self.state.borrow().numeric.invert(pixel)
    }

    /// Color for a data value, color scales only
    pub fn color(&self, value: f32) -> Option<[f32; 4]> {
        if self.kind != ScaleKind::Color {
            return None;
        }
        let state = self.state.borrow();
        state.colors.interpolate(state.numeric.scale(value))
    }

    pub fn set_colors(&self, colors: &[String]) -> Result<(), QuiverScaleError> {
        if self.kind != ScaleKind::Color {
            return Err(QuiverScaleError::NotAColorScale(self.id.to_string()));
        }
        {
            let mut state = self.state.borrow_mut();
            let interpolation = state.colors.interpolation();
            state.colors = ColorRange::try_from_css(colors, interpolation)?;
        }
        self.changed.emit(&ScaleEvent::ColorsChanged);
        Ok(())
    }

    /// Replace the fixed bounds and recompute the domain
    pub fn set_min_max(&self, min: Option<f32>, max: Option<f32>) {
        {
            let mut state = self.state.borrow_mut();
            state.min = min;
            state.max = max;
        }
        self.update_domain();
    }

    /// Register `owner`'s contribution as the extent of `values`.
    ///
    /// An owner with no finite values contributes nothing.
    pub fn compute_and_set_domain(&self, values: impl IntoIterator<Item = f32>, owner: DomainOwner) {
        let extent = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f32, f32)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            });
        match extent {
            Some(extent) => {
                self.state.borrow_mut().contributions.insert(owner, extent);
                self.update_domain();
            }
            None => self.del_domain(&owner),
        }
    }

    /// Remove `owner`'s contribution, leaving every other owner's in place
    pub fn del_domain(&self, owner: &DomainOwner) {
        let removed = self
            .state
            .borrow_mut()
            .contributions
            .shift_remove(owner)
            .is_some();
        if removed {
            self.update_domain();
        }
    }

    pub fn contribution(&self, owner: &DomainOwner) -> Option<(f32, f32)> {
        self.state.borrow().contributions.get(owner).copied()
    }

    pub fn owners(&self) -> Vec<DomainOwner> {
        self.state.borrow().contributions.keys().cloned().collect()
    }

    pub fn on_change(&self, listener: impl Fn(&ScaleEvent) + 'static) -> Subscription {
        self.changed.connect(listener)
    }

    fn compute_domain(&self, state: &ScaleState) -> (f32, f32) {
        let union = state
            .contributions
            .values()
            .fold(None, |acc: Option<(f32, f32)>, (lo, hi)| match acc {
                None => Some((*lo, *hi)),
                Some((a, b)) => Some((a.min(*lo), b.max(*hi))),
            });
        let (data_min, data_max) = union.unwrap_or(DEFAULT_DOMAIN);
        let min = state.min.unwrap_or(data_min);
        let max = state.max.unwrap_or(data_max);
        if self.reverse {
            (max, min)
        } else {
            (min, max)
        }
    }

    fn update_domain(&self) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let domain = self.compute_domain(&state);
            if domain != state.numeric.domain() {
                state.numeric.set_domain(domain);
                true
            } else {
                false
            }
        };
        if changed {
            log::trace!("{} domain -> {:?}", self.id, self.domain());
            self.changed.emit(&ScaleEvent::DomainChanged);
        }
    }
}

impl fmt::Debug for ScaleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleModel")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("domain", &self.domain())
            .field("range", &self.range())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn owner(name: &str) -> DomainOwner {
        DomainOwner::new(&ModelId::from(name), ScaleRole::X)
    }

    #[test]
    fn test_owner_scoped_contributions() {
        let scale = ScaleModel::linear(Default::default());
        scale.compute_and_set_domain(vec![0.0, 1.0], owner("a"));
        scale.compute_and_set_domain(vec![5.0, 10.0], owner("b"));
        assert_eq!(scale.domain(), (0.0, 10.0));

        scale.del_domain(&owner("b"));
        assert_eq!(scale.domain(), (0.0, 1.0));

        // Replacing a contribution does not accumulate the old one
        scale.compute_and_set_domain(vec![0.5, 0.75], owner("a"));
        assert_eq!(scale.domain(), (0.5, 0.75));
    }

    #[test]
    fn test_domain_changed_only_on_real_change() {
        let scale = ScaleModel::linear(Default::default());
        let count = Rc::new(Cell::new(0));
        let _sub = {
            let count = count.clone();
            scale.on_change(move |event| {
                if *event == ScaleEvent::DomainChanged {
                    count.set(count.get() + 1);
                }
            })
        };

        scale.compute_and_set_domain(vec![2.0, 4.0], owner("a"));
        scale.compute_and_set_domain(vec![4.0, 2.0, 3.0], owner("a"));
        assert_eq!(count.get(), 1);

        scale.del_domain(&owner("missing"));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_fixed_bounds_and_reverse() {
        let scale = ScaleModel::linear(ScaleConfig {
            min: Some(0.0),
            reverse: true,
            ..Default::default()
        });
        scale.compute_and_set_domain(vec![3.0, 8.0], owner("a"));
        assert_eq!(scale.domain(), (8.0, 0.0));

        scale.set_range((0.0, 100.0));
        assert_approx_eq!(f32, scale.scale(8.0), 0.0);
        assert_approx_eq!(f32, scale.invert(100.0), 0.0);
    }

    #[test]
    fn test_color_scale() {
        let scale = ScaleModel::color_scale(ScaleConfig {
            colors: vec!["#000000".to_string(), "#ffffff".to_string()],
            ..Default::default()
        })
        .unwrap();
        let owner = DomainOwner::new(&ModelId::from("m"), ScaleRole::Color);
        scale.compute_and_set_domain(vec![0.0, 10.0], owner);
        let c = scale.color(5.0).unwrap();
        assert_approx_eq!(f32, c[0], 0.5);

        // Out of domain values clamp to the range ends
        let c = scale.color(20.0).unwrap();
        assert_approx_eq!(f32, c[0], 1.0);
        assert!(!scale.allow_padding());
        assert!(ScaleModel::linear(Default::default()).set_colors(&[]).is_err());
    }
}
