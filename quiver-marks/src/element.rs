use std::f32::consts::PI;
use std::time::Duration;

use indexmap::IndexMap;
use quiver_common::binding::ModelId;
use quiver_common::style::{ElementStyle, StyleValue};

use crate::datum::MarkDatum;
use crate::style::Styled;

/// One drawn element of a mark, joined to its datum by `unique_id`
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedElement {
    pub unique_id: usize,
    pub datum: MarkDatum,
    pub position: [f32; 2],
    /// Symbol area in square pixels
    pub size: f32,
    pub rotation: f32,
    pub skew: f32,
    pub opacity: f32,
    pub style: ElementStyle,
    /// Duration of the transition that brought the element to `position`
    pub transition: Duration,
    pub dragging: bool,
}

impl RenderedElement {
    pub fn new(datum: MarkDatum, position: [f32; 2]) -> Self {
        Self {
            unique_id: datum.unique_id,
            datum,
            position,
            size: 64.0,
            rotation: 0.0,
            skew: 0.5,
            opacity: 1.0,
            style: ElementStyle::default(),
            transition: Duration::ZERO,
            dragging: false,
        }
    }

    pub fn radius(&self) -> f32 {
        (self.size.max(0.0) / PI).sqrt()
    }

    pub fn contains(&self, point: [f32; 2]) -> bool {
        let dx = point[0] - self.position[0];
        let dy = point[1] - self.position[1];
        (dx * dx + dy * dy).sqrt() <= self.radius().max(1.0)
    }

    pub fn transform(&self) -> String {
        format!(
            "translate({}, {}) rotate({})",
            self.position[0], self.position[1], self.rotation
        )
    }

    /// Effective value of a style property, inline style first
    pub fn style_f32(&self, key: &str) -> Option<f32> {
        self.style.get(key).and_then(StyleValue::as_f64).map(|v| v as f32)
    }
}

/// Data join of new records onto existing elements. Elements keep their state when their key
/// survives, new keys enter at `position_of(datum)` and vanished keys exit.
pub fn join_elements(
    existing: Vec<RenderedElement>,
    data: Vec<MarkDatum>,
    position_of: impl Fn(&MarkDatum) -> [f32; 2],
) -> Vec<RenderedElement> {
    let mut by_key: IndexMap<usize, RenderedElement> = existing
        .into_iter()
        .map(|element| (element.unique_id, element))
        .collect();
    data.into_iter()
        .map(|datum| match by_key.shift_remove(&datum.unique_id) {
            Some(mut element) => {
                element.datum = datum;
                element
            }
            None => {
                let position = position_of(&datum);
                RenderedElement::new(datum, position)
            }
        })
        .collect()
}

impl Styled for Vec<RenderedElement> {
    fn element_count(&self) -> usize {
        self.len()
    }

    fn element_style_mut(&mut self, index: usize) -> Option<&mut ElementStyle> {
        self.get_mut(index).map(|element| &mut element.style)
    }
}

/// Primitive a renderer draws, in plot-area pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum RenderItem {
    Symbol {
        center: [f32; 2],
        radius: f32,
        fill: Option<String>,
        stroke: Option<String>,
        stroke_width: f32,
        opacity: f32,
    },
    Path {
        points: Vec<[f32; 2]>,
        stroke: Option<String>,
        stroke_width: f32,
        opacity: f32,
    },
}

/// Legend row of one mark
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub mark: ModelId,
    pub label: String,
    pub color: Option<String>,
}
