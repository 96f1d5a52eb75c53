use std::cell::{Cell, RefCell};
use std::rc::Rc;

use quiver_common::binding::{ModelId, ModelRef};
use quiver_common::signal::Subscription;
use quiver_eventstream::{
    DispatchOutcome, EventMetadata, MarkInstance, MarkItem, SceneGraphEvent, SemanticEvent,
};
use quiver_scales::{ScaleRef, ScaleRole};

use crate::datum::MarkDatum;
use crate::element::{LegendEntry, RenderItem, RenderedElement};
use crate::interaction::{EventAction, InteractionDispatcher, ListenerTable};
use crate::message::MarkMessage;
use crate::model::MarkModel;
use crate::parent::MarkParent;
use crate::scale_binding::ScaleBinding;
use crate::selection::toggle_selection;
use crate::tooltip::TooltipState;

/// A live view of one mark model inside a figure.
///
/// Views are shared as `Rc<dyn MarkView>` and keep their state behind interior mutability.
/// Implementations must not hold a borrow across a model write or a parent call, since both
/// can notify back into the view.
pub trait MarkView {
    fn model(&self) -> &Rc<MarkModel>;

    fn id(&self) -> &ModelId {
        self.model().id()
    }

    /// Identity of this view, distinct from [`MarkView::id`] when a model is shown twice
    fn view_id(&self) -> &ModelId;

    /// Item under a plot-area position
    fn pick(&self, position: [f32; 2]) -> Option<MarkItem>;

    fn handle_event(&self, event: &SceneGraphEvent) -> DispatchOutcome;

    /// Reassign scale ranges from the parent and reposition without animation
    fn relayout(&self);

    fn render_items(&self) -> Vec<RenderItem>;

    fn legend_entry(&self) -> Option<LegendEntry>;

    fn tooltip(&self) -> TooltipState;

    /// Rendered elements, in data order
    fn elements(&self) -> Vec<RenderedElement>;

    /// Detach from models and scales. A removed view ignores every later event.
    fn remove(&self);

    fn is_removed(&self) -> bool;
}

/// State and behavior shared by every mark view
pub struct ViewCore {
    /// Identity of this view. Several views may show the same model.
    pub view_id: ModelId,
    pub model: Rc<MarkModel>,
    pub parent: Rc<dyn MarkParent>,
    pub scales: RefCell<ScaleBinding>,
    pub dispatcher: RefCell<InteractionDispatcher>,
    pub tooltip: RefCell<TooltipState>,
    subscriptions: RefCell<Vec<Subscription>>,
    removed: Cell<bool>,
}

impl ViewCore {
    pub fn new(
        model: Rc<MarkModel>,
        parent: Rc<dyn MarkParent>,
        scales: ScaleBinding,
        extension: ListenerTable,
    ) -> Self {
        let declared = model.scale_refs();
        for (role, scale) in [
            (ScaleRole::X, &scales.scales().x),
            (ScaleRole::Y, &scales.scales().y),
        ] {
            if declared.get(&role).and_then(ModelRef::peek).is_none() {
                model.bind_fallback_scale(role, scale.clone());
            }
        }
        Self {
            view_id: ModelId::unique(&format!("{}View", model.mark_type())),
            model,
            parent,
            scales: RefCell::new(scales),
            dispatcher: RefCell::new(InteractionDispatcher::new(extension)),
            tooltip: RefCell::new(TooltipState::default()),
            subscriptions: RefCell::new(Vec::new()),
            removed: Cell::new(false),
        }
    }

    pub fn process_interactions(&self) {
        let config = self.model.attrs().interactions.clone();
        self.dispatcher.borrow_mut().process_interactions(&config);
    }

    pub fn set_ranges(&self) {
        let default_size = self.model.attrs().default_size;
        self.scales
            .borrow()
            .set_ranges(self.parent.as_ref(), default_size);
    }

    pub fn keep(&self, subscription: Subscription) {
        self.subscriptions.borrow_mut().push(subscription);
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    pub fn teardown(&self) {
        self.removed.set(true);
        self.subscriptions.borrow_mut().clear();
        self.scales.borrow_mut().unsubscribe();
        self.tooltip.borrow_mut().hide();
        self.parent.remove_padding(&self.view_id);
    }

    /// Whether a picked item belongs to this view's mark and, when tagged, to this view
    pub fn owns(&self, instance: &MarkInstance) -> bool {
        &instance.mark == self.model.id()
            && instance.view.as_ref().map_or(true, |view| view == &self.view_id)
    }

    pub fn positional_scales(&self) -> Vec<ScaleRef> {
        let scales = self.scales.borrow();
        vec![scales.scales().x.clone(), scales.scales().y.clone()]
    }

    /// Semantic meaning of `event` for this mark, with the element index it targets.
    ///
    /// Events aimed at another mark's items yield `None`.
    pub fn classify(&self, event: &SceneGraphEvent) -> Option<(SemanticEvent, Option<usize>)> {
        if let Some(instance) = event.mark_instance() {
            if !self.owns(instance) {
                return None;
            }
        }
        let semantic = SemanticEvent::classify(event)?;
        let index = event.mark_instance().and_then(|instance| instance.element_index());
        Some((semantic, index))
    }

    /// Outbound message for a semantic event, following its metadata.
    ///
    /// `rendered` reads the datum bound to a drawn element.
    pub fn message_for(
        &self,
        semantic: SemanticEvent,
        event: &SceneGraphEvent,
        rendered: impl FnOnce(usize) -> Option<MarkDatum>,
    ) -> Option<MarkMessage> {
        let target = message_target(&semantic.metadata(), &self.model, event, rendered)?;
        match semantic {
            SemanticEvent::MouseOver => Some(MarkMessage::Hover {
                data: target.datum?,
                index: target.index?,
            }),
            SemanticEvent::ElementClicked => Some(MarkMessage::ElementClick {
                data: target.datum?,
                index: target.index?,
            }),
            SemanticEvent::LegendClicked => Some(MarkMessage::LegendClick {}),
            SemanticEvent::ParentClicked => Some(MarkMessage::BackgroundClick {}),
            _ => None,
        }
    }

    pub fn send(&self, message: &MarkMessage) {
        message.send(self.parent.channel().as_ref(), self.model.id());
    }

    pub fn touch(&self) {
        self.parent.channel().touch(self.model.id());
    }

    pub fn actions(&self, semantic: SemanticEvent) -> Vec<EventAction> {
        self.dispatcher.borrow().actions(semantic)
    }

    /// Run one bound action. The caller must not hold any view borrow.
    pub fn run_action(
        &self,
        action: EventAction,
        event: &SceneGraphEvent,
        index: Option<usize>,
    ) -> DispatchOutcome {
        let position = event.position();
        match action {
            EventAction::ShowTooltip { sticky } => {
                self.tooltip.borrow_mut().show(index, position, sticky);
            }
            EventAction::MoveTooltip => self.tooltip.borrow_mut().move_to(position),
            EventAction::HideTooltip => self.tooltip.borrow_mut().hide(),
            EventAction::AddElement => {
                let point = self.scales.borrow().invert(position);
                self.model.push_point(point.x, point.y);
                self.touch();
            }
            EventAction::DeleteElement => {
                if let Some(index) = index {
                    self.model.remove_point(index);
                    self.touch();
                }
            }
            EventAction::ToggleSelection => {
                let Some(index) = index else {
                    return DispatchOutcome::default();
                };
                let current = self.model.selected();
                let selected =
                    toggle_selection(current.as_deref(), index, event.modifiers().accel());
                self.model.set_selected(selected);
                self.touch();
                return DispatchOutcome::consumed();
            }
            EventAction::ResetSelection => {
                self.model.set_selected(None);
                self.touch();
            }
            EventAction::HighlightAxes => {
                self.parent.highlight_axes(&self.positional_scales(), true)
            }
            EventAction::UnhighlightAxes => {
                self.parent.highlight_axes(&self.positional_scales(), false)
            }
            EventAction::TrackHover => self.model.set_hovered_point(index),
            EventAction::ResetHover => self.model.set_hovered_point(None),
        }
        DispatchOutcome::default()
    }
}

/// Element a message reports on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageTarget {
    pub index: Option<usize>,
    pub datum: Option<MarkDatum>,
}

/// Resolve what a message reports, as `metadata` describes it.
///
/// `None` means no message is sent: the event has no message name, or it needs a hit on one
/// of `model`'s items and missed.
pub fn message_target(
    metadata: &EventMetadata,
    model: &MarkModel,
    event: &SceneGraphEvent,
    rendered: impl FnOnce(usize) -> Option<MarkDatum>,
) -> Option<MessageTarget> {
    metadata.msg_name?;
    if !metadata.hit_test {
        return Some(MessageTarget::default());
    }
    let instance = event
        .mark_instance()
        .filter(|instance| &instance.mark == model.id())?;
    let Some(index) = instance.element_index() else {
        return Some(MessageTarget::default());
    };
    let datum = if metadata.lookup_data {
        model.mark_data().into_iter().nth(index)
    } else {
        rendered(index)
    };
    Some(MessageTarget {
        index: Some(index),
        datum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use quiver_eventstream::scene::{ModifiersState, SceneClickEvent};
    use quiver_eventstream::MouseButton;

    use crate::model::MarkAttributes;

    fn click(instance: Option<MarkInstance>) -> SceneGraphEvent {
        SceneGraphEvent::Click(SceneClickEvent {
            position: [0.0, 0.0],
            button: MouseButton::Left,
            mark_instance: instance,
            modifiers: ModifiersState::default(),
        })
    }

    fn model() -> Rc<MarkModel> {
        MarkModel::scatter(
            MarkAttributes::default().with_xy(vec![1.0, 2.0], vec![3.0, 4.0]),
            IndexMap::new(),
        )
    }

    #[test]
    fn test_lookup_data_selects_datum_source() {
        let model = model();
        let event = click(Some(MarkInstance::element(model.id(), 1)));
        let drawn = MarkDatum::new(9.0, 9.0, 1);
        let mut metadata = SemanticEvent::ElementClicked.metadata();

        let target = message_target(&metadata, &model, &event, |_| Some(drawn.clone())).unwrap();
        assert_eq!(target.index, Some(1));
        assert_eq!(target.datum, Some(drawn.clone()));

        metadata.lookup_data = true;
        let target = message_target(&metadata, &model, &event, |_| Some(drawn.clone())).unwrap();
        assert_eq!(target.datum.map(|d| (d.x, d.y)), Some((2.0, 4.0)));
    }

    #[test]
    fn test_hit_test_drops_missed_events() {
        let model = model();
        let background = click(None);
        let mut metadata = SemanticEvent::ParentClicked.metadata();
        assert_eq!(
            message_target(&metadata, &model, &background, |_| None),
            Some(MessageTarget::default())
        );

        metadata.hit_test = true;
        assert_eq!(message_target(&metadata, &model, &background, |_| None), None);

        let other = click(Some(MarkInstance::element(&ModelId::from("other"), 0)));
        assert_eq!(message_target(&metadata, &model, &other, |_| None), None);

        let legend = click(Some(MarkInstance::legend(model.id())));
        assert_eq!(
            message_target(&metadata, &model, &legend, |_| None),
            Some(MessageTarget::default())
        );
    }

    #[test]
    fn test_no_message_name_sends_nothing() {
        let model = model();
        let event = click(Some(MarkInstance::element(model.id(), 0)));
        let metadata = SemanticEvent::MouseMove.metadata();
        assert_eq!(message_target(&metadata, &model, &event, |_| None), None);
    }
}
