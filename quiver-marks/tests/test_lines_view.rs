mod utils;

use quiver_common::style::StyleDict;
use quiver_eventstream::scene::ModifiersState;
use quiver_eventstream::MarkItem;
use quiver_marks::element::RenderItem;
use quiver_marks::interaction::{InteractionConfig, InteractionMode};
use quiver_marks::lines::LinesView;
use quiver_marks::{MarkAttributes, MarkModel, MarkView};
use quiver_scales::ScaleConfig;
use utils::*;

fn two_curves() -> MarkAttributes {
    MarkAttributes::default().with_xy(
        vec![0.0, 1.0, 2.0],
        vec![vec![0.0, 1.0, 2.0], vec![2.0, 1.0, 0.0]],
    )
}

#[tokio::test]
async fn test_paths_share_flat_x() {
    init_logging();
    let parent = TestParent::new(200.0, 100.0);
    let (_x, y, refs) = xy_scales(ScaleConfig {
        allow_padding: false,
        ..Default::default()
    });
    let model = MarkModel::lines(two_curves(), refs);
    let view = LinesView::create(model.clone(), parent).await.unwrap();

    assert_eq!(y.domain(), (0.0, 2.0));
    assert_eq!(
        view.paths(),
        vec!["M0,100 L100,50 L200,0", "M0,0 L100,50 L200,100"]
    );

    // Only the first curve has a vertex at (0, 100)
    assert_eq!(view.pick([10.0, 95.0]), Some(MarkItem::Element(0)));
    assert_eq!(view.pick([10.0, 5.0]), Some(MarkItem::Element(1)));
    assert_eq!(view.pick([10.0, 50.0]), None);

    // New data redraws the paths
    model.set_xy(vec![0.0, 2.0], vec![0.0, 2.0]);
    assert_eq!(view.paths(), vec!["M0,100 L200,0"]);
}

#[tokio::test]
async fn test_curve_colors_and_selection() {
    let parent = TestParent::new(200.0, 100.0);
    let (_x, _y, refs) = xy_scales(ScaleConfig::default());
    let mut attrs = two_curves();
    attrs.colors = vec!["steelblue".to_string(), "orange".to_string()];
    attrs.interactions = InteractionConfig::default().with_click(InteractionMode::Select);
    attrs.unselected_style = StyleDict::new().with("opacity", 0.25);
    let model = MarkModel::lines(attrs, refs);
    let view = LinesView::create(model.clone(), parent.clone()).await.unwrap();

    let strokes = |view: &LinesView| -> Vec<Option<String>> {
        view.render_items()
            .into_iter()
            .map(|item| match item {
                RenderItem::Path { stroke, .. } => stroke,
                RenderItem::Symbol { .. } => None,
            })
            .collect()
    };
    assert_eq!(
        strokes(&view),
        vec![Some("steelblue".to_string()), Some("orange".to_string())]
    );

    view.handle_event(&click(model.id(), Some(1), ModifiersState::default()));
    assert_eq!(model.selected(), Some(vec![1]));
    let opacities: Vec<f32> = view
        .render_items()
        .into_iter()
        .map(|item| match item {
            RenderItem::Path { opacity, .. } => opacity,
            RenderItem::Symbol { opacity, .. } => opacity,
        })
        .collect();
    assert_eq!(opacities, vec![0.25, 1.0]);

    // Lines register no padding
    assert!(parent.paddings.borrow().is_empty());
}

#[tokio::test]
async fn test_add_is_ignored_on_lines() {
    let parent = TestParent::new(200.0, 100.0);
    let (_x, _y, refs) = xy_scales(ScaleConfig::default());
    let mut attrs = two_curves();
    attrs.interactions = InteractionConfig::default().with_click(InteractionMode::Add);
    let model = MarkModel::lines(attrs, refs);
    let view = LinesView::create(model.clone(), parent.clone()).await.unwrap();

    view.handle_event(&background_click_at([100.0, 50.0]));
    assert_eq!(model.attrs().x.len(), 3);
    assert_eq!(parent.channel.events(), vec!["background_click"]);
}
