use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use indexmap::IndexMap;
use quiver_common::binding::ModelId;
use quiver_common::channel::MessageChannel;
use quiver_common::signal::{Signal, Subscription};
use quiver_marks::parent::{FigureScales, MarkParent, PlotArea};
use quiver_scales::{ScaleModel, ScaleRef, ScaleRole};

use crate::model::FigureModel;

struct PaddingEntry {
    scale: ScaleRef,
    padding: f32,
}

/// Figure-side state shared with every mark view.
///
/// Collects per-mark padding requests and reports when the padded ranges need to be recomputed.
pub struct FigureContext {
    model: Rc<FigureModel>,
    channel: Rc<dyn MessageChannel>,
    paddings: RefCell<IndexMap<(ModelId, ScaleRole), PaddingEntry>>,
    highlighted: RefCell<Vec<ModelId>>,
    layout_changed: Signal<()>,
}

impl FigureContext {
    pub fn new(model: Rc<FigureModel>, channel: Rc<dyn MessageChannel>) -> Rc<Self> {
        Rc::new(Self {
            model,
            channel,
            paddings: RefCell::new(IndexMap::new()),
            highlighted: RefCell::new(Vec::new()),
            layout_changed: Signal::new(),
        })
    }

    pub fn model(&self) -> &Rc<FigureModel> {
        &self.model
    }

    /// Largest padding any mark requested on `scale`
    fn mark_padding(&self, scale: &ScaleModel) -> f32 {
        self.paddings
            .borrow()
            .values()
            .filter(|entry| std::ptr::eq(Rc::as_ptr(&entry.scale), scale))
            .map(|entry| entry.padding)
            .fold(0.0, f32::max)
    }

    /// Views that currently hold a padding registration
    pub fn padding_owners(&self) -> Vec<ModelId> {
        let mut owners: Vec<ModelId> = Vec::new();
        for (owner, _) in self.paddings.borrow().keys() {
            if !owners.contains(owner) {
                owners.push(owner.clone());
            }
        }
        owners
    }

    pub fn is_highlighted(&self, scale: &ScaleModel) -> bool {
        self.highlighted.borrow().contains(scale.id())
    }

    pub fn on_layout_change(&self, listener: impl Fn(&()) + 'static) -> Subscription {
        self.layout_changed.connect(listener)
    }

    pub fn notify_layout_change(&self) {
        self.layout_changed.emit(&());
    }
}

impl MarkParent for FigureContext {
    fn plot_area(&self) -> PlotArea {
        self.model.attrs().plot_area()
    }

    fn default_scales(&self) -> FigureScales {
        self.model.default_scales()
    }

    fn animation_duration(&self) -> Duration {
        self.model.attrs().animation()
    }

    fn channel(&self) -> Rc<dyn MessageChannel> {
        self.channel.clone()
    }

    fn padding(&self, role: ScaleRole, scale: &ScaleModel) -> f32 {
        let (fraction, extent) = {
            let attrs = self.model.attrs();
            let area = attrs.plot_area();
            match role {
                ScaleRole::Y => (attrs.padding_y, area.height),
                _ => (attrs.padding_x, area.width),
            }
        };
        self.mark_padding(scale).max(fraction * extent)
    }

    fn update_padding(&self, owner: &ModelId, role: ScaleRole, scale: &ScaleRef, padding: f32) {
        let before = self.mark_padding(scale);
        self.paddings.borrow_mut().insert(
            (owner.clone(), role),
            PaddingEntry {
                scale: scale.clone(),
                padding,
            },
        );
        if self.mark_padding(scale) != before {
            self.notify_layout_change();
        }
    }

    fn remove_padding(&self, owner: &ModelId) {
        let removed = {
            let mut paddings = self.paddings.borrow_mut();
            let len = paddings.len();
            paddings.retain(|(o, _), _| o != owner);
            len != paddings.len()
        };
        if removed {
            self.notify_layout_change();
        }
    }

    fn highlight_axes(&self, scales: &[ScaleRef], highlighted: bool) {
        let mut ids = self.highlighted.borrow_mut();
        for scale in scales {
            let present = ids.contains(scale.id());
            if highlighted && !present {
                ids.push(scale.id().clone());
            } else if !highlighted && present {
                ids.retain(|id| id != scale.id());
            }
        }
    }
}
