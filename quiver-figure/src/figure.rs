use std::cell::RefCell;
use std::rc::Rc;

use quiver_common::canvas::Canvas;
use quiver_common::channel::MessageChannel;
use quiver_common::signal::Subscription;
use quiver_eventstream::{
    DispatchOutcome, EventStreamManager, MarkInstance, SceneGraphEvent, WindowCursorMoved,
    WindowEvent,
};
use quiver_marks::parent::MarkParent;
use quiver_marks::MarkView;
use quiver_scales::ScaleRole;

use crate::context::FigureContext;
use crate::error::QuiverFigureError;
use crate::factory::MarkViewRegistry;
use crate::lifecycle::ViewLifecycleManager;
use crate::model::FigureModel;
use crate::renderer::{PixmapRenderer, RendererSurface};
use crate::scene::{legend_layout, FigureScene, LegendBox};

/// A figure: live mark views over a shared plot area.
///
/// Window events are converted to plot coordinates, hit-tested against legends and then views
/// top-most first, and routed to the view that owns the picked item. Must be created and
/// driven from within a `tokio::task::LocalSet`.
pub struct Figure {
    model: Rc<FigureModel>,
    context: Rc<FigureContext>,
    lifecycle: Rc<ViewLifecycleManager>,
    events: RefCell<EventStreamManager>,
    renderer: RefCell<Box<dyn RendererSurface>>,
    _subscriptions: Vec<Subscription>,
}

impl Figure {
    pub fn new(model: Rc<FigureModel>, channel: Rc<dyn MessageChannel>) -> Self {
        Self::with_registry(model, channel, MarkViewRegistry::default())
    }

    pub fn with_registry(
        model: Rc<FigureModel>,
        channel: Rc<dyn MessageChannel>,
        registry: MarkViewRegistry,
    ) -> Self {
        let context = FigureContext::new(model.clone(), channel);
        let parent: Rc<dyn MarkParent> = context.clone();
        let lifecycle = Rc::new(ViewLifecycleManager::new(Rc::new(registry), parent));

        let mut subscriptions = Vec::new();
        {
            let lifecycle = Rc::downgrade(&lifecycle);
            let figure_model = Rc::downgrade(&model);
            subscriptions.push(model.on_marks_change(move |_| {
                if let (Some(lifecycle), Some(model)) = (lifecycle.upgrade(), figure_model.upgrade())
                {
                    lifecycle.update_marks(&model.marks());
                }
            }));
        }
        {
            let lifecycle = Rc::downgrade(&lifecycle);
            subscriptions.push(context.on_layout_change(move |_| {
                if let Some(lifecycle) = lifecycle.upgrade() {
                    lifecycle.relayout();
                }
            }));
        }
        {
            let lifecycle = Rc::downgrade(&lifecycle);
            subscriptions.push(model.on_attrs_change(move |_| {
                if let Some(lifecycle) = lifecycle.upgrade() {
                    lifecycle.relayout();
                }
            }));
        }

        lifecycle.update_marks(&model.marks());
        Self {
            model,
            context,
            lifecycle,
            events: RefCell::new(EventStreamManager::new()),
            renderer: RefCell::new(Box::new(PixmapRenderer::default())),
            _subscriptions: subscriptions,
        }
    }

    pub fn with_renderer(self, renderer: Box<dyn RendererSurface>) -> Self {
        *self.renderer.borrow_mut() = renderer;
        self
    }

    pub fn model(&self) -> &Rc<FigureModel> {
        &self.model
    }

    pub fn context(&self) -> &Rc<FigureContext> {
        &self.context
    }

    pub fn lifecycle(&self) -> &ViewLifecycleManager {
        &self.lifecycle
    }

    pub fn views(&self) -> Vec<Rc<dyn MarkView>> {
        self.lifecycle.views()
    }

    pub async fn settled(&self) {
        self.lifecycle.settled().await;
    }

    /// Whether a legend hover currently highlights the figure's axis for `role`
    pub fn axis_highlighted(&self, role: ScaleRole) -> bool {
        match role {
            ScaleRole::X => self.context.is_highlighted(self.model.scale_x()),
            ScaleRole::Y => self.context.is_highlighted(self.model.scale_y()),
            _ => false,
        }
    }

    pub fn scene(&self) -> FigureScene {
        FigureScene::build(&self.model.attrs(), &self.views())
    }

    /// Rasterize the figure once every pending view creation has finished
    pub async fn get_rendered_canvas(&self) -> Result<Canvas, QuiverFigureError> {
        self.lifecycle.settled().await;
        tokio::task::yield_now().await;
        let scene = self.scene();
        self.renderer.borrow_mut().render(&scene)
    }

    pub fn dispatch_event(&self, event: &WindowEvent) -> DispatchOutcome {
        if let WindowEvent::WindowResize(resize) = event {
            self.model.update_attrs(|attrs| {
                attrs.width = resize.size[0];
                attrs.height = resize.size[1];
            });
        }
        let event = self.to_plot_coordinates(event);

        let views = self.views();
        let area = self.model.attrs().plot_area();
        let legends: Vec<_> = legend_layout(area, &views)
            .into_iter()
            .map(|(position, _, bounds)| (position, bounds))
            .collect();
        let picker = |position: [f32; 2]| pick(&views, &legends, position);
        let scene_events = self.events.borrow_mut().dispatch_event(&event, &picker);

        scene_events
            .iter()
            .fold(DispatchOutcome::default(), |outcome, scene_event| {
                outcome.merge(self.route(&views, scene_event))
            })
    }

    fn to_plot_coordinates(&self, event: &WindowEvent) -> WindowEvent {
        match event {
            WindowEvent::CursorMoved(moved) => {
                let margin = self.model.attrs().fig_margin;
                WindowEvent::CursorMoved(WindowCursorMoved {
                    position: [
                        moved.position[0] - margin.left,
                        moved.position[1] - margin.top,
                    ],
                })
            }
            other => other.clone(),
        }
    }

    fn route(&self, views: &[Rc<dyn MarkView>], event: &SceneGraphEvent) -> DispatchOutcome {
        match event.mark_instance() {
            Some(instance) => views
                .iter()
                .rev()
                .find(|view| match &instance.view {
                    Some(view_id) => view.view_id() == view_id,
                    None => view.id() == &instance.mark,
                })
                .map(|view| view.handle_event(event))
                .unwrap_or_default(),
            // Background clicks reach every view
            None if matches!(event, SceneGraphEvent::Click(_)) => views
                .iter()
                .fold(DispatchOutcome::default(), |outcome, view| {
                    outcome.merge(view.handle_event(event))
                }),
            None => DispatchOutcome::default(),
        }
    }
}

/// Item under `position`, tagged with the view that drew it
fn pick(
    views: &[Rc<dyn MarkView>],
    legends: &[(usize, LegendBox)],
    position: [f32; 2],
) -> Option<MarkInstance> {
    let legend = legends
        .iter()
        .find(|(_, bounds)| bounds.contains(position))
        .and_then(|(owner, _)| views.get(*owner));
    if let Some(view) = legend {
        return Some(MarkInstance::legend(view.id()).with_view(view.view_id()));
    }
    views.iter().rev().find_map(|view| {
        view.pick(position).map(|item| MarkInstance {
            mark: view.id().clone(),
            item,
            view: Some(view.view_id().clone()),
        })
    })
}
