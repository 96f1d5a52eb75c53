use serde::Serialize;

/// One record of mark data, joined to its rendered element by `unique_id`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkDatum {
    pub x: f32,
    pub y: f32,
    pub unique_id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skew: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MarkDatum {
    pub fn new(x: f32, y: f32, unique_id: usize) -> Self {
        Self {
            x,
            y,
            unique_id,
            color: None,
            size: None,
            opacity: None,
            skew: None,
            rotation: None,
            name: None,
        }
    }

    pub fn point(&self) -> DataPoint {
        DataPoint {
            x: self.x,
            y: self.y,
        }
    }
}

/// A position in data space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPoint {
    pub x: f32,
    pub y: f32,
}
