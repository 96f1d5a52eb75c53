use std::rc::Rc;

use quiver_common::binding::ModelId;
use quiver_marks::element::{LegendEntry, RenderItem};
use quiver_marks::parent::PlotArea;
use quiver_marks::MarkView;

use crate::model::FigureAttributes;

const LEGEND_WIDTH: f32 = 100.0;
const LEGEND_ROW_HEIGHT: f32 = 20.0;
const LEGEND_INSET: f32 = 10.0;

/// Axis-aligned box in plot coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LegendBox {
    pub fn contains(&self, point: [f32; 2]) -> bool {
        point[0] >= self.x
            && point[0] <= self.x + self.width
            && point[1] >= self.y
            && point[1] <= self.y + self.height
    }
}

/// Legend rows stack down from the top-right corner of the plot area
pub fn legend_box(area: PlotArea, row: usize) -> LegendBox {
    LegendBox {
        x: area.width - LEGEND_WIDTH - LEGEND_INSET,
        y: LEGEND_INSET + row as f32 * LEGEND_ROW_HEIGHT,
        width: LEGEND_WIDTH,
        height: LEGEND_ROW_HEIGHT - 4.0,
    }
}

/// Legend rows of the views that display one, in view order
pub fn legend_layout(
    area: PlotArea,
    views: &[Rc<dyn MarkView>],
) -> Vec<(usize, LegendEntry, LegendBox)> {
    views
        .iter()
        .enumerate()
        .filter_map(|(position, view)| view.legend_entry().map(|entry| (position, entry)))
        .enumerate()
        .map(|(row, (position, entry))| (position, entry, legend_box(area, row)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    MarkGroup {
        mark: ModelId,
        items: Vec<RenderItem>,
    },
    Legend {
        mark: ModelId,
        entry: Option<(LegendEntry, LegendBox)>,
    },
}

/// Everything the renderer needs to draw a figure
#[derive(Debug, Clone, PartialEq)]
pub struct FigureScene {
    pub width: f32,
    pub height: f32,
    /// Top-left corner of the plot area in figure coordinates
    pub origin: [f32; 2],
    pub plot_area: PlotArea,
    pub background: Option<String>,
    pub nodes: Vec<SceneNode>,
}

impl FigureScene {
    /// Two nodes per view, in mark-list order so later marks draw on top
    pub fn build(attrs: &FigureAttributes, views: &[Rc<dyn MarkView>]) -> Self {
        let plot_area = attrs.plot_area();
        let mut legends = legend_layout(plot_area, views).into_iter().peekable();
        let mut nodes = Vec::with_capacity(views.len() * 2);
        for (position, view) in views.iter().enumerate() {
            nodes.push(SceneNode::MarkGroup {
                mark: view.id().clone(),
                items: view.render_items(),
            });
            let entry = legends
                .next_if(|(owner, _, _)| *owner == position)
                .map(|(_, entry, bounds)| (entry, bounds));
            nodes.push(SceneNode::Legend {
                mark: view.id().clone(),
                entry,
            });
        }
        Self {
            width: attrs.width,
            height: attrs.height,
            origin: [attrs.fig_margin.left, attrs.fig_margin.top],
            plot_area,
            background: Some(attrs.background.clone()).filter(|b| !b.is_empty()),
            nodes,
        }
    }

    pub fn legend_boxes(&self) -> Vec<(ModelId, LegendBox)> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                SceneNode::Legend {
                    mark,
                    entry: Some((_, bounds)),
                } => Some((mark.clone(), *bounds)),
                _ => None,
            })
            .collect()
    }
}
