use css_color_parser::Color;

use crate::error::QuiverCommonError;

/// Default categorical palette
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub fn category10() -> Vec<String> {
    CATEGORY10.iter().map(|c| c.to_string()).collect()
}

/// Parse a css color string into normalized rgba
pub fn parse_color(css: &str) -> Result<[f32; 4], QuiverCommonError> {
    match css.parse::<Color>() {
        Ok(color) => Ok([
            color.r as f32 / 255.0,
            color.g as f32 / 255.0,
            color.b as f32 / 255.0,
            color.a,
        ]),
        Err(e) => Err(QuiverCommonError::InvalidColor(format!("{css}: {e:?}"))),
    }
}

/// Format normalized rgba as a css color string
pub fn to_css(rgba: [f32; 4]) -> String {
    let [r, g, b] = [rgba[0], rgba[1], rgba[2]].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    if rgba[3] >= 1.0 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("rgba({r}, {g}, {b}, {})", rgba[3].clamp(0.0, 1.0))
    }
}
