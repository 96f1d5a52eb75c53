#![allow(dead_code)]

use std::rc::Rc;

use indexmap::IndexMap;
use quiver_common::binding::{ModelRef, Resolver};
use quiver_eventstream::{ElementState, MouseButton, WindowEvent};
use quiver_figure::{FigureAttributes, FigureModel};
use quiver_marks::{MarkAttributes, MarkModel};
use quiver_scales::{ScaleConfig, ScaleModel, ScaleRef, ScaleRole};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Figure with default 60px margins and its own linear scales
pub fn figure_model(width: f32, height: f32) -> Rc<FigureModel> {
    FigureModel::with_linear_scales(FigureAttributes::default().with_size(width, height))
}

/// Scatter mark that relies on the figure's positional scales
pub fn scatter(x: Vec<f32>, y: Vec<f32>) -> Rc<MarkModel> {
    MarkModel::scatter(MarkAttributes::default().with_xy(x, y), IndexMap::new())
}

/// Scatter mark whose x scale is delivered later through the returned resolver
pub fn pending_scatter() -> (Rc<MarkModel>, Resolver<ScaleRef>, ScaleRef) {
    let (x_ref, resolver) = ModelRef::pending();
    let model = MarkModel::scatter(
        MarkAttributes::default().with_xy(vec![0.0, 10.0], vec![0.0, 1.0]),
        IndexMap::from([(ScaleRole::X, x_ref)]),
    );
    (model, resolver, ScaleModel::linear(ScaleConfig::default()))
}

pub fn move_to(x: f32, y: f32) -> WindowEvent {
    WindowEvent::cursor_moved(x, y)
}

pub fn press() -> WindowEvent {
    WindowEvent::mouse_input(ElementState::Pressed, MouseButton::Left)
}

pub fn release() -> WindowEvent {
    WindowEvent::mouse_input(ElementState::Released, MouseButton::Left)
}
