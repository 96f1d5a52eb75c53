#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use indexmap::IndexMap;
use quiver_common::binding::{ModelId, ModelRef};
use quiver_common::channel::{MessageChannel, RecordingChannel};
use quiver_eventstream::scene::{
    MarkInstance, ModifiersState, SceneClickEvent, SceneDragEvent, SceneGraphEvent,
    SceneMouseEnterEvent, SceneMouseLeaveEvent,
};
use quiver_eventstream::MouseButton;
use quiver_marks::parent::{FigureScales, MarkParent, PlotArea};
use quiver_scales::{ScaleConfig, ScaleModel, ScaleRef, ScaleRole};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parent with a fixed plot area that records padding and highlight requests
pub struct TestParent {
    pub area: PlotArea,
    pub scales: FigureScales,
    pub channel: Rc<RecordingChannel>,
    pub paddings: RefCell<IndexMap<(ModelId, ScaleRole), f32>>,
    pub highlighted: Cell<bool>,
}

impl TestParent {
    pub fn new(width: f32, height: f32) -> Rc<Self> {
        Rc::new(Self {
            area: PlotArea { width, height },
            scales: FigureScales {
                x: Some(ScaleModel::linear(ScaleConfig::default())),
                y: Some(ScaleModel::linear(ScaleConfig::default())),
            },
            channel: Rc::new(RecordingChannel::new()),
            paddings: RefCell::new(IndexMap::new()),
            highlighted: Cell::new(false),
        })
    }
}

impl MarkParent for TestParent {
    fn plot_area(&self) -> PlotArea {
        self.area
    }

    fn default_scales(&self) -> FigureScales {
        self.scales.clone()
    }

    fn animation_duration(&self) -> Duration {
        Duration::from_millis(300)
    }

    fn channel(&self) -> Rc<dyn MessageChannel> {
        self.channel.clone()
    }

    fn padding(&self, role: ScaleRole, _scale: &ScaleModel) -> f32 {
        self.paddings
            .borrow()
            .iter()
            .filter(|((_, r), _)| *r == role)
            .map(|(_, p)| *p)
            .fold(0.0, f32::max)
    }

    fn update_padding(&self, owner: &ModelId, role: ScaleRole, _scale: &ScaleRef, padding: f32) {
        self.paddings
            .borrow_mut()
            .insert((owner.clone(), role), padding);
    }

    fn remove_padding(&self, owner: &ModelId) {
        self.paddings.borrow_mut().retain(|(o, _), _| o != owner);
    }

    fn highlight_axes(&self, _scales: &[ScaleRef], highlighted: bool) {
        self.highlighted.set(highlighted);
    }
}

/// Ready x/y references to fresh linear scales
pub fn xy_scales(config: ScaleConfig) -> (ScaleRef, ScaleRef, IndexMap<ScaleRole, ModelRef<ScaleRef>>) {
    let x = ScaleModel::linear(config.clone());
    let y = ScaleModel::linear(config);
    let refs = IndexMap::from([
        (ScaleRole::X, ModelRef::ready(x.clone())),
        (ScaleRole::Y, ModelRef::ready(y.clone())),
    ]);
    (x, y, refs)
}

pub fn click(mark: &ModelId, index: Option<usize>, modifiers: ModifiersState) -> SceneGraphEvent {
    SceneGraphEvent::Click(SceneClickEvent {
        position: [0.0, 0.0],
        button: MouseButton::Left,
        mark_instance: index.map(|i| MarkInstance::element(mark, i)),
        modifiers,
    })
}

pub fn background_click_at(position: [f32; 2]) -> SceneGraphEvent {
    SceneGraphEvent::Click(SceneClickEvent {
        position,
        button: MouseButton::Left,
        mark_instance: None,
        modifiers: ModifiersState::default(),
    })
}

pub fn enter(mark: &ModelId, index: usize, position: [f32; 2]) -> SceneGraphEvent {
    SceneGraphEvent::MouseEnter(SceneMouseEnterEvent {
        position,
        mark_instance: MarkInstance::element(mark, index),
        modifiers: ModifiersState::default(),
    })
}

pub fn leave(mark: &ModelId, index: usize, position: [f32; 2]) -> SceneGraphEvent {
    SceneGraphEvent::MouseLeave(SceneMouseLeaveEvent {
        position,
        mark_instance: MarkInstance::element(mark, index),
        modifiers: ModifiersState::default(),
    })
}

pub fn drag_event(
    kind: fn(SceneDragEvent) -> SceneGraphEvent,
    mark: &ModelId,
    index: usize,
    origin: [f32; 2],
    position: [f32; 2],
) -> SceneGraphEvent {
    kind(SceneDragEvent {
        position,
        origin,
        mark_instance: MarkInstance::element(mark, index),
        modifiers: ModifiersState::default(),
    })
}

pub fn accel() -> ModifiersState {
    ModifiersState {
        control: true,
        ..Default::default()
    }
}
