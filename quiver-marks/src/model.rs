use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use quiver_common::binding::{ModelId, ModelRef};
use quiver_common::color::category10;
use quiver_common::signal::{Signal, Subscription};
use quiver_common::style::StyleDict;
use quiver_common::value::DataArray;
use quiver_scales::{DomainOwner, ScaleRef, ScaleRole};
use serde::{Deserialize, Serialize};

use crate::datum::MarkDatum;
use crate::interaction::{InteractionConfig, InteractionMode};
use crate::selection::normalize_selection;

pub const SCATTER: &str = "Scatter";
pub const LINES: &str = "Lines";

/// Attribute snapshot of a mark model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkAttributes {
    pub x: DataArray,
    pub y: DataArray,
    pub color: Option<Vec<f32>>,
    pub size: Option<Vec<f32>>,
    pub opacity: Option<Vec<f32>>,
    pub skew: Option<Vec<f32>>,
    pub rotation: Option<Vec<f32>>,
    pub names: Vec<String>,
    pub labels: Vec<String>,
    pub display_legend: bool,
    pub visible: bool,
    pub colors: Vec<String>,
    pub default_size: f32,
    pub default_opacities: Vec<f32>,
    pub default_skew: f32,
    pub stroke: Option<String>,
    pub stroke_width: f32,
    pub fill: bool,
    pub drag_color: Option<String>,
    pub drag_size: f32,
    pub selected: Option<Vec<usize>>,
    pub hovered_point: Option<usize>,
    pub selected_style: StyleDict,
    pub unselected_style: StyleDict,
    pub hovered_style: StyleDict,
    pub unhovered_style: StyleDict,
    pub interactions: InteractionConfig,
    pub enable_move: bool,
    pub restrict_x: bool,
    pub restrict_y: bool,
    pub update_on_move: bool,
    pub preserve_domain: Vec<ScaleRole>,
}

impl Default for MarkAttributes {
    fn default() -> Self {
        Self {
            x: DataArray::default(),
            y: DataArray::default(),
            color: None,
            size: None,
            opacity: None,
            skew: None,
            rotation: None,
            names: Vec::new(),
            labels: Vec::new(),
            display_legend: false,
            visible: true,
            colors: category10(),
            default_size: 64.0,
            default_opacities: vec![1.0],
            default_skew: 0.5,
            stroke: None,
            stroke_width: 1.5,
            fill: true,
            drag_color: None,
            drag_size: 5.0,
            selected: None,
            hovered_point: None,
            selected_style: StyleDict::new(),
            unselected_style: StyleDict::new(),
            hovered_style: StyleDict::new(),
            unhovered_style: StyleDict::new(),
            interactions: InteractionConfig::default().with_hover(InteractionMode::Tooltip),
            enable_move: false,
            restrict_x: false,
            restrict_y: false,
            update_on_move: false,
            preserve_domain: Vec::new(),
        }
    }
}

impl MarkAttributes {
    pub fn with_xy(mut self, x: impl Into<DataArray>, y: impl Into<DataArray>) -> Self {
        self.x = x.into();
        self.y = y.into();
        self
    }

    /// Per-element data values of a role, if the mark carries any
    pub fn role_values(&self, role: ScaleRole) -> Option<Vec<f32>> {
        match role {
            ScaleRole::X => Some(self.x.iter_values().collect()),
            ScaleRole::Y => Some(self.y.iter_values().collect()),
            ScaleRole::Color => self.color.clone(),
            ScaleRole::Size => self.size.clone(),
            ScaleRole::Opacity => self.opacity.clone(),
            ScaleRole::Skew => self.skew.clone(),
            ScaleRole::Rotation => self.rotation.clone(),
        }
    }
}

/// Notification of an attribute change. Style changes carry the replaced value.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkChange {
    Data,
    Colors,
    DefaultSize,
    DefaultOpacities,
    DefaultSkew,
    Stroke,
    Selected,
    HoveredPoint,
    SelectedStyle { previous: StyleDict },
    UnselectedStyle { previous: StyleDict },
    HoveredStyle { previous: StyleDict },
    UnhoveredStyle { previous: StyleDict },
    Interactions,
    Movement,
    Labels,
}

/// Model of one mark: attributes, scale references and change notification.
///
/// Data writes go through [`MarkModel::update_data`], which holds the dirty flag while the
/// mark's own domain contributions are recomputed.
pub struct MarkModel {
    id: ModelId,
    mark_type: String,
    attrs: RefCell<MarkAttributes>,
    scales: IndexMap<ScaleRole, ModelRef<ScaleRef>>,
    fallback_scales: RefCell<IndexMap<ScaleRole, ScaleRef>>,
    dirty: Cell<bool>,
    changed: Signal<MarkChange>,
}

impl MarkModel {
    pub fn new(
        mark_type: &str,
        attrs: MarkAttributes,
        scales: IndexMap<ScaleRole, ModelRef<ScaleRef>>,
    ) -> Rc<Self> {
        let this = Rc::new(Self {
            id: ModelId::unique(mark_type),
            mark_type: mark_type.to_string(),
            attrs: RefCell::new(attrs),
            scales,
            fallback_scales: RefCell::new(IndexMap::new()),
            dirty: Cell::new(false),
            changed: Signal::new(),
        });
        this.update_domains();
        this
    }

    pub fn scatter(
        attrs: MarkAttributes,
        scales: IndexMap<ScaleRole, ModelRef<ScaleRef>>,
    ) -> Rc<Self> {
        Self::new(SCATTER, attrs, scales)
    }

    pub fn lines(
        attrs: MarkAttributes,
        scales: IndexMap<ScaleRole, ModelRef<ScaleRef>>,
    ) -> Rc<Self> {
        Self::new(LINES, attrs, scales)
    }

    pub fn id(&self) -> &ModelId {
        &self.id
    }

    pub fn mark_type(&self) -> &str {
        &self.mark_type
    }

    /// Borrow the attributes. Do not hold the borrow across a write.
    pub fn attrs(&self) -> Ref<'_, MarkAttributes> {
        self.attrs.borrow()
    }

    pub fn scale_refs(&self) -> IndexMap<ScaleRole, ModelRef<ScaleRef>> {
        self.scales.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn on_change(&self, listener: impl Fn(&MarkChange) + 'static) -> Subscription {
        self.changed.connect(listener)
    }

    /// One record per element of the flat x/y data
    pub fn mark_data(&self) -> Vec<MarkDatum> {
        let attrs = self.attrs.borrow();
        let x = attrs.x.as_flat();
        let y = attrs.y.as_flat();
        let at = |values: &Option<Vec<f32>>, i: usize| values.as_ref().and_then(|v| v.get(i).copied());
        (0..x.len().min(y.len()))
            .map(|i| MarkDatum {
                x: x[i],
                y: y[i],
                unique_id: i,
                color: at(&attrs.color, i),
                size: at(&attrs.size, i),
                opacity: at(&attrs.opacity, i),
                skew: at(&attrs.skew, i),
                rotation: at(&attrs.rotation, i),
                name: attrs.names.get(i).cloned(),
            })
            .collect()
    }

    pub fn selected(&self) -> Option<Vec<usize>> {
        self.attrs.borrow().selected.clone()
    }

    pub fn hovered_point(&self) -> Option<usize> {
        self.attrs.borrow().hovered_point
    }

    /// Apply a data write, recompute domain contributions, then notify.
    ///
    /// Scale notifications fired while the contributions update see the mark as dirty.
    pub fn update_data(&self, write: impl FnOnce(&mut MarkAttributes)) {
        self.dirty.set(true);
        write(&mut self.attrs.borrow_mut());
        self.update_domains();
        self.dirty.set(false);
        self.changed.emit(&MarkChange::Data);
    }

    pub fn set_xy(&self, x: impl Into<DataArray>, y: impl Into<DataArray>) {
        let (x, y) = (x.into(), y.into());
        self.update_data(|attrs| {
            attrs.x = x;
            attrs.y = y;
        });
    }

    /// Write one coordinate. Arrays are replaced by modified copies.
    pub fn update_point(&self, index: usize, x: Option<f32>, y: Option<f32>) {
        if x.is_none() && y.is_none() {
            return;
        }
        self.update_data(|attrs| {
            if let Some(x) = x {
                attrs.x = attrs.x.with_value(index, x);
            }
            if let Some(y) = y {
                attrs.y = attrs.y.with_value(index, y);
            }
        });
    }

    pub fn push_point(&self, x: f32, y: f32) {
        self.update_data(|attrs| {
            attrs.x = attrs.x.with_pushed(x);
            attrs.y = attrs.y.with_pushed(y);
        });
    }

    /// Remove an element from every per-element array
    pub fn remove_point(&self, index: usize) {
        self.update_data(|attrs| {
            attrs.x = attrs.x.without(index);
            attrs.y = attrs.y.without(index);
            for values in [
                &mut attrs.color,
                &mut attrs.size,
                &mut attrs.opacity,
                &mut attrs.skew,
                &mut attrs.rotation,
            ]
            .into_iter()
            .flatten()
            {
                if index < values.len() {
                    values.remove(index);
                }
            }
            if index < attrs.names.len() {
                attrs.names.remove(index);
            }
        });
    }

    pub fn set_role_data(&self, role: ScaleRole, values: Option<Vec<f32>>) {
        self.update_data(|attrs| match role {
            ScaleRole::X => attrs.x = values.unwrap_or_default().into(),
            ScaleRole::Y => attrs.y = values.unwrap_or_default().into(),
            ScaleRole::Color => attrs.color = values,
            ScaleRole::Size => attrs.size = values,
            ScaleRole::Opacity => attrs.opacity = values,
            ScaleRole::Skew => attrs.skew = values,
            ScaleRole::Rotation => attrs.rotation = values,
        });
    }

    pub fn set_selected(&self, selected: Option<Vec<usize>>) {
        let selected = normalize_selection(selected);
        let changed = {
            let mut attrs = self.attrs.borrow_mut();
            let changed = attrs.selected != selected;
            attrs.selected = selected;
            changed
        };
        if changed {
            self.changed.emit(&MarkChange::Selected);
        }
    }

    pub fn set_hovered_point(&self, hovered_point: Option<usize>) {
        let changed = {
            let mut attrs = self.attrs.borrow_mut();
            let changed = attrs.hovered_point != hovered_point;
            attrs.hovered_point = hovered_point;
            changed
        };
        if changed {
            self.changed.emit(&MarkChange::HoveredPoint);
        }
    }

    pub fn set_selected_style(&self, style: StyleDict) {
        let previous = std::mem::replace(&mut self.attrs.borrow_mut().selected_style, style);
        self.changed.emit(&MarkChange::SelectedStyle { previous });
    }

    pub fn set_unselected_style(&self, style: StyleDict) {
        let previous = std::mem::replace(&mut self.attrs.borrow_mut().unselected_style, style);
        self.changed.emit(&MarkChange::UnselectedStyle { previous });
    }

    pub fn set_hovered_style(&self, style: StyleDict) {
        let previous = std::mem::replace(&mut self.attrs.borrow_mut().hovered_style, style);
        self.changed.emit(&MarkChange::HoveredStyle { previous });
    }

    pub fn set_unhovered_style(&self, style: StyleDict) {
        let previous = std::mem::replace(&mut self.attrs.borrow_mut().unhovered_style, style);
        self.changed.emit(&MarkChange::UnhoveredStyle { previous });
    }

    pub fn set_colors(&self, colors: Vec<String>) {
        self.attrs.borrow_mut().colors = colors;
        self.changed.emit(&MarkChange::Colors);
    }

    pub fn set_stroke(&self, stroke: Option<String>) {
        self.attrs.borrow_mut().stroke = stroke;
        self.changed.emit(&MarkChange::Stroke);
    }

    pub fn set_default_size(&self, default_size: f32) {
        self.attrs.borrow_mut().default_size = default_size;
        self.changed.emit(&MarkChange::DefaultSize);
    }

    pub fn set_default_opacities(&self, default_opacities: Vec<f32>) {
        self.attrs.borrow_mut().default_opacities = default_opacities;
        self.changed.emit(&MarkChange::DefaultOpacities);
    }

    pub fn set_default_skew(&self, default_skew: f32) {
        self.attrs.borrow_mut().default_skew = default_skew;
        self.changed.emit(&MarkChange::DefaultSkew);
    }

    pub fn set_interactions(&self, interactions: InteractionConfig) {
        self.attrs.borrow_mut().interactions = interactions;
        self.changed.emit(&MarkChange::Interactions);
    }

    pub fn set_labels(&self, labels: Vec<String>) {
        self.attrs.borrow_mut().labels = labels;
        self.changed.emit(&MarkChange::Labels);
    }

    /// Drag configuration
    pub fn set_movement(
        &self,
        enable_move: bool,
        restrict_x: bool,
        restrict_y: bool,
        update_on_move: bool,
    ) {
        {
            let mut attrs = self.attrs.borrow_mut();
            attrs.enable_move = enable_move;
            attrs.restrict_x = restrict_x;
            attrs.restrict_y = restrict_y;
            attrs.update_on_move = update_on_move;
        }
        self.changed.emit(&MarkChange::Movement);
    }

    pub fn set_preserve_domain(&self, roles: Vec<ScaleRole>) {
        self.attrs.borrow_mut().preserve_domain = roles;
        self.update_domains();
    }

    /// Use `scale` for `role` while the mark's own reference is missing or unresolved
    pub fn bind_fallback_scale(&self, role: ScaleRole, scale: ScaleRef) {
        self.fallback_scales.borrow_mut().insert(role, scale);
    }

    /// Scales that currently receive this mark's domain contributions
    fn domain_scales(&self) -> Vec<(ScaleRole, ScaleRef)> {
        let mut scales: Vec<(ScaleRole, ScaleRef)> = self
            .scales
            .iter()
            .filter_map(|(role, scale_ref)| scale_ref.peek().map(|scale| (*role, scale)))
            .collect();
        for (role, scale) in self.fallback_scales.borrow().iter() {
            if !scales.iter().any(|(r, _)| r == role) {
                scales.push((*role, scale.clone()));
            }
        }
        scales
    }

    /// Recompute this mark's domain contribution on every available scale.
    ///
    /// Roles in `preserve_domain` and roles without data withdraw their contribution.
    pub fn update_domains(&self) {
        for (role, scale) in self.domain_scales() {
            let owner = DomainOwner::new(&self.id, role);
            // Compute outside the attribute borrow, listeners may read attributes
            let values = {
                let attrs = self.attrs.borrow();
                if attrs.preserve_domain.contains(&role) {
                    None
                } else {
                    attrs.role_values(role)
                }
            };
            match values {
                Some(values) => scale.compute_and_set_domain(values, owner),
                None => scale.del_domain(&owner),
            }
        }
    }

    /// Withdraw every domain contribution this mark made
    pub fn release_domains(&self) {
        for (role, scale) in self.domain_scales() {
            scale.del_domain(&DomainOwner::new(&self.id, role));
        }
    }
}

impl fmt::Debug for MarkModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkModel")
            .field("id", &self.id)
            .field("mark_type", &self.mark_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_scales::ScaleModel;

    fn scales(x: &ScaleRef, y: &ScaleRef) -> IndexMap<ScaleRole, ModelRef<ScaleRef>> {
        IndexMap::from([
            (ScaleRole::X, ModelRef::ready(x.clone())),
            (ScaleRole::Y, ModelRef::ready(y.clone())),
        ])
    }

    #[test]
    fn test_domain_ownership_between_marks() {
        let x = ScaleModel::linear(Default::default());
        let y = ScaleModel::linear(Default::default());

        let a = MarkModel::scatter(
            MarkAttributes::default().with_xy(vec![0.0, 1.0], vec![0.0, 1.0]),
            scales(&x, &y),
        );
        let b = MarkModel::scatter(
            MarkAttributes::default().with_xy(vec![5.0, 10.0], vec![20.0, 30.0]),
            scales(&x, &y),
        );
        assert_eq!(x.domain(), (0.0, 10.0));
        assert_eq!(y.domain(), (0.0, 30.0));

        b.release_domains();
        assert_eq!(x.domain(), (0.0, 1.0));
        assert_eq!(y.domain(), (0.0, 1.0));

        a.set_xy(vec![2.0, 3.0], vec![2.0, 3.0]);
        assert_eq!(x.domain(), (2.0, 3.0));
    }

    #[test]
    fn test_preserve_domain() {
        let x = ScaleModel::linear(Default::default());
        let y = ScaleModel::linear(Default::default());
        let mark = MarkModel::scatter(
            MarkAttributes::default().with_xy(vec![0.0, 4.0], vec![1.0, 2.0]),
            scales(&x, &y),
        );
        assert_eq!(x.domain(), (0.0, 4.0));

        mark.set_preserve_domain(vec![ScaleRole::X]);
        assert!(x.owners().is_empty());
        assert_eq!(y.owners().len(), 1);
    }

    #[test]
    fn test_dirty_during_own_write() {
        let x = ScaleModel::linear(Default::default());
        let y = ScaleModel::linear(Default::default());
        let mark = MarkModel::scatter(
            MarkAttributes::default().with_xy(vec![0.0, 1.0], vec![0.0, 1.0]),
            scales(&x, &y),
        );

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            let mark = Rc::downgrade(&mark);
            x.on_change(move |_| {
                if let Some(mark) = mark.upgrade() {
                    seen.borrow_mut().push(mark.is_dirty());
                }
            })
        };
        mark.update_point(1, Some(8.0), None);
        assert_eq!(*seen.borrow(), vec![true]);
        assert!(!mark.is_dirty());
        assert_eq!(mark.attrs().x, DataArray::from(vec![0.0, 8.0]));
    }

    #[test]
    fn test_selection_normalized() {
        let mark = MarkModel::scatter(MarkAttributes::default(), IndexMap::new());
        mark.set_selected(Some(vec![]));
        assert_eq!(mark.selected(), None);
        mark.set_selected(Some(vec![2]));
        assert_eq!(mark.selected(), Some(vec![2]));
    }

    #[test]
    fn test_mark_data_records() {
        let mut attrs = MarkAttributes::default().with_xy(vec![0.0, 1.0, 2.0], vec![3.0, 4.0]);
        attrs.color = Some(vec![7.0]);
        attrs.names = vec!["a".to_string(), "b".to_string()];
        let mark = MarkModel::scatter(attrs, IndexMap::new());

        let data = mark.mark_data();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].color, Some(7.0));
        assert_eq!(data[1].color, None);
        assert_eq!(data[1].name.as_deref(), Some("b"));
        assert_eq!(data[1].unique_id, 1);
    }

    #[test]
    fn test_remove_point_copies_arrays() {
        let mut attrs = MarkAttributes::default().with_xy(vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]);
        attrs.size = Some(vec![1.0, 2.0, 3.0]);
        let mark = MarkModel::scatter(attrs, IndexMap::new());
        let before = mark.attrs().x.clone();

        mark.remove_point(1);
        assert_eq!(mark.attrs().x, DataArray::from(vec![0.0, 2.0]));
        assert_eq!(mark.attrs().size, Some(vec![1.0, 3.0]));
        assert_eq!(before, DataArray::from(vec![0.0, 1.0, 2.0]));
    }

    #[test]
    fn test_fallback_scale_receives_contribution() {
        let x = ScaleModel::linear(Default::default());
        let figure_y = ScaleModel::linear(Default::default());
        let mark = MarkModel::scatter(
            MarkAttributes::default().with_xy(vec![0.0, 1.0], vec![2.0, 6.0]),
            IndexMap::from([(ScaleRole::X, ModelRef::ready(x.clone()))]),
        );
        assert!(figure_y.owners().is_empty());

        mark.bind_fallback_scale(ScaleRole::Y, figure_y.clone());
        mark.update_domains();
        assert_eq!(figure_y.domain(), (2.0, 6.0));

        // A declared reference wins over a fallback for the same role
        let other_x = ScaleModel::linear(Default::default());
        mark.bind_fallback_scale(ScaleRole::X, other_x.clone());
        mark.update_domains();
        assert!(other_x.owners().is_empty());

        mark.release_domains();
        assert!(x.owners().is_empty());
        assert!(figure_y.owners().is_empty());
    }
}
