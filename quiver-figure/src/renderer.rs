use quiver_common::canvas::{Canvas, CanvasDimensions};
use quiver_common::color::parse_color;
use quiver_marks::element::RenderItem;
use tiny_skia::{Color, FillRule, Mask, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::error::QuiverFigureError;
use crate::scene::{FigureScene, SceneNode};

const LEGEND_SWATCH: f32 = 10.0;

/// Rasterizes a figure scene into a [`Canvas`]
pub trait RendererSurface {
    fn render(&mut self, scene: &FigureScene) -> Result<Canvas, QuiverFigureError>;
}

/// CPU renderer backed by a tiny-skia pixmap
#[derive(Debug, Clone, Copy)]
pub struct PixmapRenderer {
    scale: f32,
}

impl PixmapRenderer {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }
}

impl Default for PixmapRenderer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RendererSurface for PixmapRenderer {
    fn render(&mut self, scene: &FigureScene) -> Result<Canvas, QuiverFigureError> {
        let dimensions = CanvasDimensions {
            size: [scene.width, scene.height],
            scale: self.scale,
        };
        let (width, height) = (
            dimensions.to_physical_width(),
            dimensions.to_physical_height(),
        );
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            QuiverFigureError::Render(format!("Invalid canvas size {width}x{height}"))
        })?;

        if let Some(background) = &scene.background {
            if let Some(color) = skia_color(background, 1.0)? {
                pixmap.fill(color);
            }
        }

        let transform = Transform::from_scale(self.scale, self.scale)
            .pre_translate(scene.origin[0], scene.origin[1]);
        let clip = plot_clip(scene, width, height, transform)?;

        for node in &scene.nodes {
            match node {
                SceneNode::MarkGroup { items, .. } => {
                    for item in items {
                        draw_item(&mut pixmap, item, transform, clip.as_ref())?;
                    }
                }
                SceneNode::Legend {
                    entry: Some((entry, bounds)),
                    ..
                } => {
                    let color = entry.color.as_deref().unwrap_or("black");
                    let swatch = Rect::from_xywh(
                        bounds.x,
                        bounds.y + (bounds.height - LEGEND_SWATCH) / 2.0,
                        LEGEND_SWATCH,
                        LEGEND_SWATCH,
                    );
                    if let (Some(rect), Some(color)) = (swatch, skia_color(color, 1.0)?) {
                        pixmap.fill_rect(rect, &solid(color), transform, None);
                    }
                }
                SceneNode::Legend { entry: None, .. } => {}
            }
        }

        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(Canvas { dimensions, pixels })
    }
}

/// Marks are clipped to the plot area
fn plot_clip(
    scene: &FigureScene,
    width: u32,
    height: u32,
    transform: Transform,
) -> Result<Option<Mask>, QuiverFigureError> {
    let Some(rect) = Rect::from_xywh(0.0, 0.0, scene.plot_area.width, scene.plot_area.height)
    else {
        return Ok(None);
    };
    let mut mask = Mask::new(width, height)
        .ok_or_else(|| QuiverFigureError::Render("Unable to allocate clip mask".to_string()))?;
    mask.fill_path(&PathBuilder::from_rect(rect), FillRule::Winding, false, transform);
    Ok(Some(mask))
}

fn draw_item(
    pixmap: &mut Pixmap,
    item: &RenderItem,
    transform: Transform,
    clip: Option<&Mask>,
) -> Result<(), QuiverFigureError> {
    match item {
        RenderItem::Symbol {
            center,
            radius,
            fill,
            stroke,
            stroke_width,
            opacity,
        } => {
            let Some(path) = PathBuilder::from_circle(center[0], center[1], radius.max(0.5)) else {
                return Ok(());
            };
            if let Some(color) = paint_color(fill.as_deref(), *opacity)? {
                pixmap.fill_path(&path, &solid(color), FillRule::Winding, transform, clip);
            }
            if let Some(color) = paint_color(stroke.as_deref(), *opacity)? {
                let stroke = Stroke {
                    width: *stroke_width,
                    ..Default::default()
                };
                pixmap.stroke_path(&path, &solid(color), &stroke, transform, clip);
            }
        }
        RenderItem::Path {
            points,
            stroke,
            stroke_width,
            opacity,
        } => {
            let Some(color) = paint_color(stroke.as_deref(), *opacity)? else {
                return Ok(());
            };
            let mut builder = PathBuilder::new();
            for (i, [x, y]) in points.iter().enumerate() {
                if i == 0 {
                    builder.move_to(*x, *y);
                } else {
                    builder.line_to(*x, *y);
                }
            }
            if let Some(path) = builder.finish() {
                let stroke = Stroke {
                    width: *stroke_width,
                    ..Default::default()
                };
                pixmap.stroke_path(&path, &solid(color), &stroke, transform, clip);
            }
        }
    }
    Ok(())
}

/// `None` and "none" both mean nothing is painted
fn paint_color(css: Option<&str>, opacity: f32) -> Result<Option<Color>, QuiverFigureError> {
    match css {
        None => Ok(None),
        Some(css) if css.eq_ignore_ascii_case("none") => Ok(None),
        Some(css) => skia_color(css, opacity),
    }
}

fn skia_color(css: &str, opacity: f32) -> Result<Option<Color>, QuiverFigureError> {
    let [r, g, b, a] = parse_color(css)?;
    Ok(Color::from_rgba(r, g, b, (a * opacity).clamp(0.0, 1.0)))
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}
