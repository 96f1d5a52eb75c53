use std::rc::Rc;
use std::time::Duration;

use quiver_common::binding::ModelId;
use quiver_common::channel::MessageChannel;
use quiver_scales::{ScaleModel, ScaleRef, ScaleRole};

/// Size of the plot area in pixels, margins excluded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub width: f32,
    pub height: f32,
}

/// Positional scales a figure provides to marks that declare none
#[derive(Debug, Clone, Default)]
pub struct FigureScales {
    pub x: Option<ScaleRef>,
    pub y: Option<ScaleRef>,
}

/// What a mark view needs from the figure that hosts it
pub trait MarkParent {
    fn plot_area(&self) -> PlotArea;

    fn default_scales(&self) -> FigureScales;

    fn animation_duration(&self) -> Duration;

    fn channel(&self) -> Rc<dyn MessageChannel>;

    /// Padding (in pixels) applied on both ends of the scale's range
    fn padding(&self, role: ScaleRole, scale: &ScaleModel) -> f32;

    /// Record the padding the view `owner` needs around its elements on `scale`
    fn update_padding(&self, owner: &ModelId, role: ScaleRole, scale: &ScaleRef, padding: f32);

    /// Forget every padding `owner` registered
    fn remove_padding(&self, owner: &ModelId);

    fn highlight_axes(&self, scales: &[ScaleRef], highlighted: bool);

    /// Pixel range of a positional scale. y ranges run bottom to top.
    fn padded_range(&self, role: ScaleRole, scale: &ScaleModel) -> (f32, f32) {
        let area = self.plot_area();
        let padding = if scale.allow_padding() {
            self.padding(role, scale)
        } else {
            0.0
        };
        match role {
            ScaleRole::Y => (area.height - padding, padding),
            _ => (padding, area.width - padding),
        }
    }
}
