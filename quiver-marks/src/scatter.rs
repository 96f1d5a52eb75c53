use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use quiver_common::binding::ModelId;
use quiver_common::style::StyleDict;
use quiver_eventstream::scene::SceneDragEvent;
use quiver_eventstream::{DispatchOutcome, MarkItem, SceneGraphEvent};
use quiver_scales::{ScaleEvent, ScaleRefresh, ScaleRole};

use crate::drag::{DragCommit, DragController, DragFlags};
use crate::element::{join_elements, LegendEntry, RenderItem, RenderedElement};
use crate::error::QuiverMarkError;
use crate::interaction::scatter_listeners;
use crate::model::{MarkAttributes, MarkChange, MarkModel};
use crate::parent::MarkParent;
use crate::scale_binding::ScaleBinding;
use crate::selection::{clamp_hover, clamp_selection};
use crate::style::{hover_indices, selection_indices, StyleEngine, StyleLayer, StyleLayerKind};
use crate::tooltip::TooltipState;
use crate::view::{MarkView, ViewCore};

#[derive(Debug, Default)]
struct ScatterState {
    elements: Vec<RenderedElement>,
    drag: DragController,
}

/// Point mark view: one symbol per datum
pub struct ScatterView {
    core: ViewCore,
    state: RefCell<ScatterState>,
}

impl ScatterView {
    pub async fn create(
        model: Rc<MarkModel>,
        parent: Rc<dyn MarkParent>,
    ) -> Result<Rc<Self>, QuiverMarkError> {
        let scales = ScaleBinding::resolve(model.scale_refs(), parent.default_scales()).await?;
        let view = Rc::new(Self {
            core: ViewCore::new(model, parent, scales, scatter_listeners()),
            state: RefCell::new(ScatterState::default()),
        });

        view.register_padding();
        view.core.set_ranges();
        // Scales that resolved late have not seen this mark's data yet
        view.core.model.update_domains();
        view.core.process_interactions();
        view.update_drag_flags();
        view.draw(false);
        Self::subscribe(&view);
        log::debug!("Created scatter view for {}", view.core.model.id());
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

    fn padding(&self) -> f32 {
        self.core.model.attrs().default_size.max(0.0).sqrt() / 2.0 + 1.0
    }

    fn register_padding(&self) {
        let padding = self.padding();
        let positional = {
            let scales = self.core.scales.borrow();
            [ScaleRole::X, ScaleRole::Y]
                .into_iter()
                .filter_map(|role| scales.get(role).map(|scale| (role, scale.clone())))
                .collect::<Vec<_>>()
        };
        for (role, scale) in positional {
            self.core
                .parent
                .update_padding(&self.core.view_id, role, &scale, padding);
        }
    }

    fn update_drag_flags(&self) {
        let flags = {
            let attrs = self.core.model.attrs();
            DragFlags {
                restrict_x: attrs.restrict_x,
                restrict_y: attrs.restrict_y,
                update_on_move: attrs.update_on_move,
            }
        };
        self.state.borrow_mut().drag.set_flags(flags);
    }

    fn on_scale_event(&self, role: ScaleRole, event: ScaleEvent) {
        if self.core.is_removed() {
            return;
        }
        match (role.refresh(), event) {
            // The mark's own data write redraws once it completes
            (ScaleRefresh::Position, ScaleEvent::DomainChanged) => {
                if !self.core.model.is_dirty() {
                    self.update_position(true);
                }
            }
            (ScaleRefresh::Colors, _) => self.apply_styles(),
            (ScaleRefresh::Sizes, ScaleEvent::DomainChanged) => self.update_sizes(),
            (ScaleRefresh::Opacities, ScaleEvent::DomainChanged) => {
                self.update_opacities();
                self.apply_styles();
            }
            (ScaleRefresh::Skews, ScaleEvent::DomainChanged) => self.update_skews(),
            _ => {}
        }
    }

    fn on_model_change(&self, change: &MarkChange) {
        if self.core.is_removed() {
            return;
        }
        match change {
            MarkChange::Data => self.draw(true),
            MarkChange::Colors | MarkChange::Stroke | MarkChange::Selected => self.apply_styles(),
            MarkChange::HoveredPoint => self.apply_styles(),
            MarkChange::DefaultSize => {
                self.register_padding();
                self.core.set_ranges();
                self.update_sizes();
            }
            MarkChange::DefaultOpacities => {
                self.update_opacities();
                self.apply_styles();
            }
            MarkChange::DefaultSkew => self.update_skews(),
            MarkChange::SelectedStyle { previous } => {
                let selected = self.core.model.selected();
                let (indices, _) = selection_indices(selected.as_deref(), self.len());
                self.clear_and_restyle(previous, &indices);
            }
            MarkChange::UnselectedStyle { previous } => {
                let selected = self.core.model.selected();
                let (_, indices) = selection_indices(selected.as_deref(), self.len());
                self.clear_and_restyle(previous, &indices);
            }
            MarkChange::HoveredStyle { previous } => {
                let (indices, _) = hover_indices(self.core.model.hovered_point(), self.len());
                self.clear_and_restyle(previous, &indices);
            }
            MarkChange::UnhoveredStyle { previous } => {
                let (_, indices) = hover_indices(self.core.model.hovered_point(), self.len());
                self.clear_and_restyle(previous, &indices);
            }
            MarkChange::Interactions => self.core.process_interactions(),
            MarkChange::Movement => self.update_drag_flags(),
            MarkChange::Labels => {}
        }
    }

    fn len(&self) -> usize {
        self.state.borrow().elements.len()
    }

    fn clear_and_restyle(&self, previous: &StyleDict, indices: &[usize]) {
        StyleEngine::clear_style(&mut self.state.borrow_mut().elements, previous, indices);
        self.apply_styles();
    }

    /// Join the model data onto the elements and refresh every derived attribute
    fn draw(&self, animate: bool) {
        let data = self.core.model.mark_data();
        {
            let scales = self.core.scales.borrow();
            let mut state = self.state.borrow_mut();
            let existing = std::mem::take(&mut state.elements);
            state.elements = join_elements(existing, data, |datum| scales.position(datum));
        }
        self.update_position(animate);
        self.update_sizes();
        self.update_opacities();
        self.update_skews();

        // Selection and hover indices may point past the end of shorter data
        let len = self.len();
        let selected = self.core.model.selected();
        let clamped = clamp_selection(selected.as_deref(), len);
        if clamped != selected {
            self.core.model.set_selected(clamped);
        }
        let hovered = self.core.model.hovered_point();
        if clamp_hover(hovered, len) != hovered {
            self.core.model.set_hovered_point(None);
        }
        self.apply_styles();
    }

    fn update_position(&self, animate: bool) {
        let duration = if animate {
            self.core.parent.animation_duration()
        } else {
            Duration::ZERO
        };
        let scales = self.core.scales.borrow();
        let mut state = self.state.borrow_mut();
        let drag_position = state.drag.position();
        for element in state.elements.iter_mut() {
            element.rotation = scales
                .attribute(ScaleRole::Rotation, element.datum.rotation)
                .unwrap_or(0.0);
            if element.dragging {
                if let Some(position) = drag_position {
                    element.position = position;
                }
                element.transition = Duration::ZERO;
                continue;
            }
            element.position = scales.position(&element.datum);
            element.transition = duration;
        }
    }

    fn update_sizes(&self) {
        let (default_size, drag_size) = {
            let attrs = self.core.model.attrs();
            (attrs.default_size, attrs.drag_size)
        };
        let scales = self.core.scales.borrow();
        for element in self.state.borrow_mut().elements.iter_mut() {
            let size = scales
                .attribute(ScaleRole::Size, element.datum.size)
                .unwrap_or(default_size);
            element.size = if element.dragging {
                size * drag_size
            } else {
                size
            };
        }
    }

    fn update_opacities(&self) {
        let defaults = self.core.model.attrs().default_opacities.clone();
        let scales = self.core.scales.borrow();
        for (i, element) in self.state.borrow_mut().elements.iter_mut().enumerate() {
            let fallback = if defaults.is_empty() {
                1.0
            } else {
                defaults[i % defaults.len()]
            };
            element.opacity = scales
                .attribute(ScaleRole::Opacity, element.datum.opacity)
                .unwrap_or(fallback);
        }
    }

    fn update_skews(&self) {
        let default_skew = self.core.model.attrs().default_skew;
        let scales = self.core.scales.borrow();
        for element in self.state.borrow_mut().elements.iter_mut() {
            element.skew = scales
                .attribute(ScaleRole::Skew, element.datum.skew)
                .unwrap_or(default_skew);
        }
    }

    fn base_style(
        attrs: &MarkAttributes,
        scales: &ScaleBinding,
        element: &RenderedElement,
        index: usize,
    ) -> StyleDict {
        let fill = match (&attrs.drag_color, element.dragging) {
            (Some(drag_color), true) => Some(drag_color.clone()),
            _ if attrs.fill => scales.element_color(&element.datum, index, &attrs.colors),
            _ => Some("none".to_string()),
        };
        let mut style = StyleDict::new()
            .with("stroke-width", attrs.stroke_width)
            .with("opacity", element.opacity);
        style.insert("fill", fill.map(Into::into));
        style.insert("stroke", attrs.stroke.clone().map(Into::into));
        style
    }

    /// Base colors, then unselected, selected, unhovered and hovered styles
    fn apply_styles(&self) {
        let attrs = self.core.model.attrs();
        let scales = self.core.scales.borrow();
        let mut state = self.state.borrow_mut();
        let len = state.elements.len();
        let base = state
            .elements
            .iter()
            .enumerate()
            .map(|(i, element)| Self::base_style(&attrs, &scales, element, i))
            .collect();
        let (selected, unselected) = selection_indices(attrs.selected.as_deref(), len);
        let (hovered, unhovered) = hover_indices(attrs.hovered_point, len);
        let layers = [
            StyleLayer::per_element(base),
            StyleLayer::uniform(
                StyleLayerKind::Unselected,
                attrs.unselected_style.clone(),
                unselected,
            ),
            StyleLayer::uniform(StyleLayerKind::Selected, attrs.selected_style.clone(), selected),
            StyleLayer::uniform(
                StyleLayerKind::Unhovered,
                attrs.unhovered_style.clone(),
                unhovered,
            ),
            StyleLayer::uniform(StyleLayerKind::Hovered, attrs.hovered_style.clone(), hovered),
        ];
        StyleEngine::apply_styles(&mut state.elements, &layers);
    }

    fn on_drag_start(&self, event: &SceneDragEvent) -> DispatchOutcome {
        let Some(index) = event.mark_instance.element_index() else {
            return DispatchOutcome::default();
        };
        let message = {
            let mut state = self.state.borrow_mut();
            let Some(element) = state.elements.get_mut(index) else {
                return DispatchOutcome::default();
            };
            element.dragging = true;
            let (anchor, point) = (element.position, element.datum.point());
            state.drag.drag_start(index, anchor, event.position, point)
        };
        self.core.send(&message);
        self.update_sizes();
        self.apply_styles();
        DispatchOutcome::consumed()
    }

    fn on_drag(&self, event: &SceneDragEvent) -> DispatchOutcome {
        let update = {
            let scales = self.core.scales.borrow();
            let mut state = self.state.borrow_mut();
            let Some(index) = state.drag.dragged_index() else {
                return DispatchOutcome::default();
            };
            let Some(update) = state.drag.on_drag(event.position, &scales) else {
                return DispatchOutcome::consumed();
            };
            if let Some(element) = state.elements.get_mut(index) {
                element.position = update.position;
                element.transition = Duration::ZERO;
            }
            update
        };
        self.core.send(&update.message);
        if let Some(commit) = update.commit {
            self.commit(commit);
        }
        DispatchOutcome::consumed()
    }

    fn on_drag_end(&self) -> DispatchOutcome {
        let ended = {
            let scales = self.core.scales.borrow();
            let mut state = self.state.borrow_mut();
            let Some(ended) = state.drag.drag_ended(&scales) else {
                return DispatchOutcome::default();
            };
            if let Some(element) = state.elements.get_mut(ended.commit.index) {
                element.dragging = false;
            }
            ended
        };
        self.core.send(&ended.message);
        self.commit(ended.commit);
        self.update_position(false);
        self.update_sizes();
        self.apply_styles();
        DispatchOutcome::consumed()
    }

    fn commit(&self, commit: DragCommit) {
        self.core.model.update_point(commit.index, commit.x, commit.y);
        self.core.touch();
    }
}

impl MarkView for ScatterView {
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
        let state = self.state.borrow();
        state
            .elements
            .iter()
            .rposition(|element| element.contains(position))
            .map(MarkItem::Element)
    }

    fn handle_event(&self, event: &SceneGraphEvent) -> DispatchOutcome {
        if self.core.is_removed() {
            return DispatchOutcome::default();
        }
        if let Some(instance) = event.mark_instance() {
            if !self.core.owns(instance) {
                return DispatchOutcome::default();
            }
        }
        match event {
            SceneGraphEvent::DragStart(e) => {
                let enable_move = self.core.model.attrs().enable_move;
                return if enable_move {
                    self.on_drag_start(e)
                } else {
                    DispatchOutcome::default()
                };
            }
            SceneGraphEvent::Drag(e) => return self.on_drag(e),
            SceneGraphEvent::DragEnd(_) => return self.on_drag_end(),
            _ => {}
        }

        let Some((semantic, index)) = self.core.classify(event) else {
            return DispatchOutcome::default();
        };
        // Stale index from before a data change
        if index.is_some_and(|index| index >= self.len()) {
            return DispatchOutcome::default();
        }

        let message = self.core.message_for(semantic, event, |index| {
            let state = self.state.borrow();
            state.elements.get(index).map(|element| element.datum.clone())
        });
        if let Some(message) = message {
            self.core.send(&message);
        }
        self.core
            .actions(semantic)
            .into_iter()
            .fold(DispatchOutcome::default(), |outcome, action| {
                outcome.merge(self.core.run_action(action, event, index))
            })
    }

    fn relayout(&self) {
        if self.core.is_removed() {
            return;
        }
        self.core.set_ranges();
        self.update_position(false);
    }

    fn render_items(&self) -> Vec<RenderItem> {
        if self.core.is_removed() || !self.core.model.attrs().visible {
            return Vec::new();
        }
        let state = self.state.borrow();
        state
            .elements
            .iter()
            .map(|element| RenderItem::Symbol {
                center: element.position,
                radius: element.radius(),
                fill: element
                    .style
                    .get_str("fill")
                    .filter(|fill| *fill != "none")
                    .map(String::from),
                stroke: element.style.get_str("stroke").map(String::from),
                stroke_width: element.style_f32("stroke-width").unwrap_or(1.5),
                opacity: element.style_f32("opacity").unwrap_or(element.opacity),
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
        self.state.borrow().elements.clone()
    }

    fn remove(&self) {
        if self.core.is_removed() {
            return;
        }
        self.core.teardown();
        self.state.borrow_mut().elements.clear();
        log::debug!("Removed scatter view for {}", self.core.model.id());
    }

    fn is_removed(&self) -> bool {
        self.core.is_removed()
    }
}
