mod utils;

use std::rc::Rc;

use float_cmp::assert_approx_eq;
use quiver_common::channel::RecordingChannel;
use quiver_eventstream::{WindowEvent, WindowResizeEvent};
use quiver_figure::Figure;
use quiver_marks::interaction::{InteractionConfig, InteractionMode};
use quiver_marks::{MarkAttributes, MarkModel};
use quiver_scales::ScaleRole;
use tokio::task::LocalSet;
use utils::*;

fn click_at(figure: &Figure, x: f32, y: f32) {
    figure.dispatch_event(&move_to(x, y));
    figure.dispatch_event(&press());
    figure.dispatch_event(&release());
}

#[tokio::test]
async fn test_click_selects_through_figure() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            // 280x280 plot area behind 60px margins
            let model = figure_model(400.0, 400.0);
            let channel = Rc::new(RecordingChannel::new());
            let figure = Figure::new(model.clone(), channel.clone());

            let mut attrs = MarkAttributes::default().with_xy(vec![0.0, 1.0], vec![0.0, 1.0]);
            attrs.interactions = InteractionConfig::default().with_click(InteractionMode::Select);
            let mark = MarkModel::scatter(attrs, Default::default());
            model.set_marks(vec![mark.clone()]);
            figure.settled().await;

            // x padding is the mark's 5px, y padding the figure's 2.5% of 280
            assert_eq!(model.scale_x().range(), (5.0, 275.0));
            let (y_start, y_end) = model.scale_y().range();
            assert_approx_eq!(f32, y_start, 273.0, epsilon = 1e-3);
            assert_approx_eq!(f32, y_end, 7.0, epsilon = 1e-3);
            let elements = figure.views()[0].elements();
            assert_approx_eq!(f32, elements[0].position[0], 5.0, epsilon = 1e-3);
            assert_approx_eq!(f32, elements[0].position[1], 273.0, epsilon = 1e-3);
            assert_approx_eq!(f32, elements[1].position[0], 275.0, epsilon = 1e-3);
            assert_approx_eq!(f32, elements[1].position[1], 7.0, epsilon = 1e-3);

            // Window coordinates include the margin
            click_at(&figure, 65.0, 333.0);
            assert_eq!(mark.selected(), Some(vec![0]));
            assert!(channel.events().contains(&"element_click".to_string()));
            assert_eq!(channel.touch_count(mark.id()), 1);

            // A click on the background resets the selection
            click_at(&figure, 200.0, 200.0);
            assert_eq!(mark.selected(), None);
            assert_eq!(channel.events().last().map(String::as_str), Some("background_click"));
        })
        .await;
}

#[tokio::test]
async fn test_top_most_view_receives_the_click() {
    LocalSet::new()
        .run_until(async {
            let model = figure_model(400.0, 400.0);
            let figure = Figure::new(model.clone(), Rc::new(RecordingChannel::new()));

            let select = |x: Vec<f32>, y: Vec<f32>| {
                let mut attrs = MarkAttributes::default().with_xy(x, y);
                attrs.interactions =
                    InteractionConfig::default().with_click(InteractionMode::Select);
                MarkModel::scatter(attrs, Default::default())
            };
            let below = select(vec![0.0, 1.0], vec![0.0, 1.0]);
            let above = select(vec![1.0, 0.0], vec![1.0, 0.0]);
            model.set_marks(vec![below.clone(), above.clone()]);
            figure.settled().await;

            // Both marks have an element at the bottom-left corner
            click_at(&figure, 65.0, 333.0);
            assert_eq!(above.selected(), Some(vec![1]));
            assert_eq!(below.selected(), None);
        })
        .await;
}

#[tokio::test]
async fn test_repeated_model_routes_to_picked_view() {
    LocalSet::new()
        .run_until(async {
            let model = figure_model(400.0, 400.0);
            let figure = Figure::new(model.clone(), Rc::new(RecordingChannel::new()));

            let mut attrs = MarkAttributes::default().with_xy(vec![0.0, 1.0], vec![0.0, 1.0]);
            attrs.display_legend = true;
            attrs.interactions =
                InteractionConfig::default().with_legend_click(InteractionMode::Tooltip);
            let mark = MarkModel::scatter(attrs, Default::default());
            model.set_marks(vec![mark.clone(), mark]);
            figure.settled().await;

            let legends = figure.scene().legend_boxes();
            assert_eq!(legends.len(), 2);

            // The first legend row belongs to the lower of the two views
            let (_, bounds) = legends[0];
            click_at(&figure, 60.0 + bounds.x + 5.0, 60.0 + bounds.y + 5.0);
            let views = figure.views();
            assert!(views[0].tooltip().visible);
            assert!(!views[1].tooltip().visible);
        })
        .await;
}

#[tokio::test]
async fn test_legend_hover_highlights_axes() {
    LocalSet::new()
        .run_until(async {
            let model = figure_model(400.0, 400.0);
            let figure = Figure::new(model.clone(), Rc::new(RecordingChannel::new()));

            let mut attrs = MarkAttributes::default().with_xy(vec![0.0, 1.0], vec![0.0, 1.0]);
            attrs.display_legend = true;
            attrs.labels = vec!["points".to_string()];
            attrs.interactions =
                InteractionConfig::default().with_legend_hover(InteractionMode::HighlightAxes);
            let mark = MarkModel::scatter(attrs, Default::default());
            model.set_marks(vec![mark]);
            figure.settled().await;

            let legends = figure.scene().legend_boxes();
            assert_eq!(legends.len(), 1);
            let (_, bounds) = legends[0];

            figure.dispatch_event(&move_to(60.0 + bounds.x + 5.0, 60.0 + bounds.y + 5.0));
            assert!(figure.axis_highlighted(ScaleRole::X));
            assert!(figure.axis_highlighted(ScaleRole::Y));

            figure.dispatch_event(&move_to(100.0, 300.0));
            assert!(!figure.axis_highlighted(ScaleRole::X));
        })
        .await;
}

#[tokio::test]
async fn test_resize_relayouts_views() {
    LocalSet::new()
        .run_until(async {
            let model = figure_model(400.0, 400.0);
            let figure = Figure::new(model.clone(), Rc::new(RecordingChannel::new()));
            model.set_marks(vec![scatter(vec![0.0, 1.0], vec![0.0, 1.0])]);
            figure.settled().await;

            figure.dispatch_event(&WindowEvent::WindowResize(WindowResizeEvent {
                size: [500.0, 400.0],
            }));
            assert_eq!(model.attrs().plot_area().width, 380.0);
            assert_eq!(model.scale_x().range(), (5.0, 375.0));
            let elements = figure.views()[0].elements();
            assert_approx_eq!(f32, elements[1].position[0], 375.0, epsilon = 1e-3);
        })
        .await;
}

#[tokio::test]
async fn test_rendered_canvas_pixels() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let model = figure_model(400.0, 400.0);
            let figure = Figure::new(model.clone(), Rc::new(RecordingChannel::new()));

            let mut attrs = MarkAttributes::default().with_xy(vec![0.0, 1.0], vec![0.0, 1.0]);
            attrs.colors = vec!["red".to_string()];
            attrs.default_size = 40000.0;
            model.set_marks(vec![MarkModel::scatter(attrs, Default::default())]);

            // Rendering waits for the pending view creation
            let canvas = figure.get_rendered_canvas().await.unwrap();
            assert_eq!((canvas.width(), canvas.height()), (400, 400));
            assert_eq!(canvas.pixel(200, 200), Some([255, 0, 0, 255]));
            // Margins are not painted by marks
            assert_eq!(canvas.pixel(10, 10), Some([255, 255, 255, 255]));

            model.set_marks(Vec::new());
            let canvas = figure.get_rendered_canvas().await.unwrap();
            assert_eq!(canvas.pixel(200, 200), Some([255, 255, 255, 255]));
        })
        .await;
}
