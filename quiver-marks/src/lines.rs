use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

use quiver_common::binding::ModelId;
use quiver_common::style::{ElementStyle, StyleDict};
use quiver_eventstream::{DispatchOutcome, MarkItem, SceneGraphEvent};
use quiver_scales::{ScaleEvent, ScaleRefresh, ScaleRole};

use crate::datum::MarkDatum;
use crate::element::{LegendEntry, RenderItem, RenderedElement};
use crate::error::QuiverMarkError;
use crate::interaction::{EventAction, ListenerTable};
use crate::model::{MarkChange, MarkModel};
use crate::parent::MarkParent;
use crate::scale_binding::ScaleBinding;
use crate::style::{selection_indices, StyleEngine, StyleLayer, StyleLayerKind};
use crate::tooltip::TooltipState;
use crate::view::{MarkView, ViewCore};

/// Pointer distance, beyond half the stroke width, that still counts as on the line
const PICK_TOLERANCE: f32 = 3.0;

#[derive(Debug, Default)]
struct LinesState {
    curves: Vec<Vec<[f32; 2]>>,
    styles: Vec<ElementStyle>,
}

/// SVG path data of a polyline
pub fn path_data(points: &[[f32; 2]]) -> String {
    let mut path = String::new();
    for (i, [x, y]) in points.iter().enumerate() {
        let command = if i == 0 { "M" } else { " L" };
        let _ = write!(path, "{command}{x},{y}");
    }
    path
}

fn distance_to_segment(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p[0] - a[0]) * dx + (p[1] - a[1]) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a[0] + t * dx, a[1] + t * dy);
    ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt()
}

/// Line mark view: one polyline per row of y.
///
/// A flat x is shared by every row of a 2-D y.
pub struct LinesView {
    core: ViewCore,
    state: RefCell<LinesState>,
}

impl LinesView {
    pub async fn create(
        model: Rc<MarkModel>,
        parent: Rc<dyn MarkParent>,
    ) -> Result<Rc<Self>, QuiverMarkError> {
        let scales = ScaleBinding::resolve(model.scale_refs(), parent.default_scales()).await?;
        let view = Rc::new(Self {
            core: ViewCore::new(model, parent, scales, ListenerTable::new()),
            state: RefCell::new(LinesState::default()),
        });
        view.core.set_ranges();
        view.core.model.update_domains();
        view.core.process_interactions();
        view.draw();
        Self::subscribe(&view);
        log::debug!("Created lines view for {}", view.core.model.id());
        Ok(view)
    }

    fn subscribe(view: &Rc<Self>) {
        let weak = Rc::downgrade(view);
        view.core.scales.borrow_mut().subscribe(move |role, event| {
            if let Some(view) = weak.upgrade() {
                view.on_scale_event(role, event);
            }
        });
        let weak = Rc::downgrade(view);
        view.core.keep(view.core.model.on_change(move |change| {
            if let Some(view) = weak.upgrade() {
                view.on_model_change(change);
            }
        }));
    }

    fn on_scale_event(&self, role: ScaleRole, event: ScaleEvent) {
        if self.core.is_removed() || event != ScaleEvent::DomainChanged {
            return;
        }
        if role.refresh() == ScaleRefresh::Position && !self.core.model.is_dirty() {
            self.update_curves();
        }
    }

    fn on_model_change(&self, change: &MarkChange) {
        if self.core.is_removed() {
            return;
        }
        match change {
            MarkChange::Data => self.draw(),
            MarkChange::Colors
            | MarkChange::Stroke
            | MarkChange::Selected
            | MarkChange::DefaultOpacities => self.apply_styles(),
            MarkChange::SelectedStyle { previous } | MarkChange::UnselectedStyle { previous } => {
                let all: Vec<usize> = (0..self.state.borrow().styles.len()).collect();
                StyleEngine::clear_style(&mut self.state.borrow_mut().styles, previous, &all);
                self.apply_styles();
            }
            MarkChange::Interactions => self.core.process_interactions(),
            _ => {}
        }
    }

    fn draw(&self) {
        self.update_curves();
        let count = self.state.borrow().curves.len();
        self.state
            .borrow_mut()
            .styles
            .resize(count, ElementStyle::default());
        self.apply_styles();
    }

    fn update_curves(&self) {
        let curves: Vec<Vec<[f32; 2]>> = {
            let attrs = self.core.model.attrs();
            let scales = self.core.scales.borrow();
            let x_rows = attrs.x.rows();
            attrs
                .y
                .rows()
                .into_iter()
                .enumerate()
                .map(|(i, ys)| {
                    let xs = if x_rows.len() == 1 {
                        x_rows[0]
                    } else {
                        x_rows.get(i).copied().unwrap_or(&[])
                    };
                    xs.iter()
                        .zip(ys)
                        .map(|(x, y)| scales.position(&MarkDatum::new(*x, *y, i)))
                        .collect()
                })
                .collect()
        };
        self.state.borrow_mut().curves = curves;
    }

    fn apply_styles(&self) {
        let attrs = self.core.model.attrs();
        let mut state = self.state.borrow_mut();
        let count = state.styles.len();
        let base = (0..count)
            .map(|i| {
                let color = if attrs.colors.is_empty() {
                    None
                } else {
                    Some(attrs.colors[i % attrs.colors.len()].clone())
                };
                let opacity = if attrs.default_opacities.is_empty() {
                    1.0
                } else {
                    attrs.default_opacities[i % attrs.default_opacities.len()]
                };
                let mut style = StyleDict::new()
                    .with("stroke-width", attrs.stroke_width)
                    .with("opacity", opacity);
                style.insert("stroke", color.map(Into::into));
                style
            })
            .collect();
        let (selected, unselected) = selection_indices(attrs.selected.as_deref(), count);
        let layers = [
            StyleLayer::per_element(base),
            StyleLayer::uniform(
                StyleLayerKind::Unselected,
                attrs.unselected_style.clone(),
                unselected,
            ),
            StyleLayer::uniform(StyleLayerKind::Selected, attrs.selected_style.clone(), selected),
        ];
        StyleEngine::apply_styles(&mut state.styles, &layers);
    }

    /// SVG path data of every curve
    pub fn paths(&self) -> Vec<String> {
        self.state
            .borrow()
            .curves
            .iter()
            .map(|curve| path_data(curve))
            .collect()
    }
}

impl MarkView for LinesView {
    fn model(&self) -> &Rc<MarkModel> {
        &self.core.model
    }

    fn view_id(&self) -> &ModelId {
        &self.core.view_id
    }

    fn pick(&self, position: [f32; 2]) -> Option<MarkItem> {
        if self.core.is_removed() || !self.core.model.attrs().visible {
            return None;
        }
        let tolerance = self.core.model.attrs().stroke_width / 2.0 + PICK_TOLERANCE;
        let state = self.state.borrow();
        state
            .curves
            .iter()
            .rposition(|curve| {
                curve
                    .windows(2)
                    .any(|pair| distance_to_segment(position, pair[0], pair[1]) <= tolerance)
            })
            .map(MarkItem::Element)
    }

    fn handle_event(&self, event: &SceneGraphEvent) -> DispatchOutcome {
        if self.core.is_removed() {
            return DispatchOutcome::default();
        }
        let Some((semantic, index)) = self.core.classify(event) else {
            return DispatchOutcome::default();
        };
        // Curves carry no per-element datum
        if let Some(message) = self.core.message_for(semantic, event, |_| None) {
            self.core.send(&message);
        }
        let mut outcome = DispatchOutcome::default();
        for action in self.core.actions(semantic) {
            match action {
                EventAction::AddElement | EventAction::DeleteElement => {
                    log::debug!("Lines marks do not support {action:?}");
                }
                action => outcome = outcome.merge(self.core.run_action(action, event, index)),
            }
        }
        outcome
    }

    fn relayout(&self) {
        if self.core.is_removed() {
            return;
        }
        self.core.set_ranges();
        self.update_curves();
    }

    fn render_items(&self) -> Vec<RenderItem> {
        if self.core.is_removed() || !self.core.model.attrs().visible {
            return Vec::new();
        }
        let state = self.state.borrow();
        state
            .curves
            .iter()
            .zip(&state.styles)
            .map(|(curve, style)| RenderItem::Path {
                points: curve.clone(),
                stroke: style.get_str("stroke").map(String::from),
                stroke_width: style
                    .get("stroke-width")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(1.5) as f32,
                opacity: style
                    .get("opacity")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(1.0) as f32,
            })
            .collect()
    }

    fn legend_entry(&self) -> Option<LegendEntry> {
        let attrs = self.core.model.attrs();
        if !attrs.display_legend {
            return None;
        }
        Some(LegendEntry {
            mark: self.core.model.id().clone(),
            label: attrs
                .labels
                .first()
                .cloned()
                .unwrap_or_else(|| self.core.model.mark_type().to_string()),
            color: attrs.colors.first().cloned(),
        })
    }

    fn tooltip(&self) -> TooltipState {
        self.core.tooltip.borrow().clone()
    }

    fn elements(&self) -> Vec<RenderedElement> {
        Vec::new()
    }

    fn remove(&self) {
        if self.core.is_removed() {
            return;
        }
        self.core.teardown();
        let mut state = self.state.borrow_mut();
        state.curves.clear();
        state.styles.clear();
        log::debug!("Removed lines view for {}", self.core.model.id());
    }

    fn is_removed(&self) -> bool {
        self.core.is_removed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_path_data() {
        assert_eq!(
            path_data(&[[0.0, 10.0], [5.5, 2.0], [10.0, 0.0]]),
            "M0,10 L5.5,2 L10,0"
        );
        assert_eq!(path_data(&[]), "");
    }

    #[test]
    fn test_distance_to_segment() {
        assert_approx_eq!(f32, distance_to_segment([5.0, 3.0], [0.0, 0.0], [10.0, 0.0]), 3.0);
        assert_approx_eq!(f32, distance_to_segment([13.0, 4.0], [0.0, 0.0], [10.0, 0.0]), 5.0);
        assert_approx_eq!(f32, distance_to_segment([1.0, 1.0], [0.0, 0.0], [0.0, 0.0]), 2f32.sqrt());
    }
}
