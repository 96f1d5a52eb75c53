use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use quiver_common::binding::ModelId;
use quiver_common::signal::{Signal, Subscription};
use quiver_marks::parent::{FigureScales, PlotArea};
use quiver_marks::MarkModel;
use quiver_scales::{ScaleConfig, ScaleModel, ScaleRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 60.0,
            bottom: 60.0,
            left: 60.0,
            right: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureAttributes {
    pub fig_margin: Margin,
    /// Horizontal padding as a fraction of the plot width
    pub padding_x: f32,
    /// Vertical padding as a fraction of the plot height
    pub padding_y: f32,
    /// Transition length in milliseconds for animated repositioning
    pub animation_duration: u64,
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub background: String,
}

impl Default for FigureAttributes {
    fn default() -> Self {
        Self {
            fig_margin: Margin::default(),
            padding_x: 0.0,
            padding_y: 0.025,
            animation_duration: 0,
            width: 640.0,
            height: 480.0,
            title: String::new(),
            background: "white".to_string(),
        }
    }
}

impl FigureAttributes {
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn plot_area(&self) -> PlotArea {
        let m = &self.fig_margin;
        PlotArea {
            width: (self.width - m.left - m.right).max(0.0),
            height: (self.height - m.top - m.bottom).max(0.0),
        }
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_duration)
    }
}

/// Figure state: the ordered mark list, default positional scales and layout attributes
pub struct FigureModel {
    id: ModelId,
    attrs: RefCell<FigureAttributes>,
    marks: RefCell<Vec<Rc<MarkModel>>>,
    scale_x: ScaleRef,
    scale_y: ScaleRef,
    marks_changed: Signal<()>,
    attrs_changed: Signal<()>,
}

impl FigureModel {
    pub fn new(attrs: FigureAttributes, scale_x: ScaleRef, scale_y: ScaleRef) -> Rc<Self> {
        Rc::new(Self {
            id: ModelId::unique("Figure"),
            attrs: RefCell::new(attrs),
            marks: RefCell::new(Vec::new()),
            scale_x,
            scale_y,
            marks_changed: Signal::new(),
            attrs_changed: Signal::new(),
        })
    }

    /// Figure with fresh linear x and y scales
    pub fn with_linear_scales(attrs: FigureAttributes) -> Rc<Self> {
        Self::new(
            attrs,
            ScaleModel::linear(ScaleConfig::default()),
            ScaleModel::linear(ScaleConfig::default()),
        )
    }

    pub fn id(&self) -> &ModelId {
        &self.id
    }

    pub fn attrs(&self) -> Ref<'_, FigureAttributes> {
        self.attrs.borrow()
    }

    pub fn update_attrs(&self, write: impl FnOnce(&mut FigureAttributes)) {
        {
            let mut attrs = self.attrs.borrow_mut();
            write(&mut attrs);
        }
        self.attrs_changed.emit(&());
    }

    pub fn marks(&self) -> Vec<Rc<MarkModel>> {
        self.marks.borrow().clone()
    }

    pub fn set_marks(&self, marks: Vec<Rc<MarkModel>>) {
        *self.marks.borrow_mut() = marks;
        self.marks_changed.emit(&());
    }

    pub fn scale_x(&self) -> &ScaleRef {
        &self.scale_x
    }

    pub fn scale_y(&self) -> &ScaleRef {
        &self.scale_y
    }

    pub fn default_scales(&self) -> FigureScales {
        FigureScales {
            x: Some(self.scale_x.clone()),
            y: Some(self.scale_y.clone()),
        }
    }

    pub fn on_marks_change(&self, listener: impl Fn(&()) + 'static) -> Subscription {
        self.marks_changed.connect(listener)
    }

    pub fn on_attrs_change(&self, listener: impl Fn(&()) + 'static) -> Subscription {
        self.attrs_changed.connect(listener)
    }
}
