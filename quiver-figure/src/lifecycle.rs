//! Ordered set of live mark views that follows the figure's mark list.
//!
//! View creation is asynchronous, so several mark-list assignments may be in flight at once.
//! Every assignment bumps a generation counter and re-tags the entries it keeps. A creation
//! attaches only if its entry still exists and carries the current generation; any other
//! result is removed on arrival. Creations are never cancelled.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::{join_all, FutureExt, LocalBoxFuture, Shared};
use quiver_marks::parent::MarkParent;
use quiver_marks::{MarkModel, MarkView};

use crate::factory::{MarkViewRegistry, ViewFactory};

type Creation = Shared<LocalBoxFuture<'static, ()>>;

/// Scene nodes contributed by each attached view: its mark group and its legend entry
pub const NODES_PER_VIEW: usize = 2;

struct ViewEntry {
    id: u64,
    model: Rc<MarkModel>,
    generation: u64,
    view: Option<Rc<dyn MarkView>>,
}

#[derive(Default)]
struct LifecycleState {
    generation: u64,
    next_entry_id: u64,
    entries: Vec<ViewEntry>,
    creations: Vec<Creation>,
    max_attached: usize,
}

impl LifecycleState {
    fn attached_count(&self) -> usize {
        self.entries.iter().filter(|e| e.view.is_some()).count()
    }
}

pub struct ViewLifecycleManager {
    registry: Rc<MarkViewRegistry>,
    parent: Rc<dyn MarkParent>,
    state: Rc<RefCell<LifecycleState>>,
}

impl ViewLifecycleManager {
    pub fn new(registry: Rc<MarkViewRegistry>, parent: Rc<dyn MarkParent>) -> Self {
        Self {
            registry,
            parent,
            state: Rc::new(RefCell::new(LifecycleState::default())),
        }
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Converge on `marks`. Must be called from within a `tokio::task::LocalSet`.
    pub fn update_marks(&self, marks: &[Rc<MarkModel>]) {
        let (removed, generation) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            let generation = state.generation;

            let old = std::mem::take(&mut state.entries);
            let prefix = old
                .iter()
                .zip(marks)
                .take_while(|(entry, model)| entry.model.id() == model.id())
                .count();

            let mut old = old.into_iter();
            let mut entries: Vec<ViewEntry> = old
                .by_ref()
                .take(prefix)
                .map(|mut entry| {
                    entry.generation = generation;
                    entry
                })
                .collect();
            let removed: Vec<ViewEntry> = old.collect();

            for model in &marks[prefix..] {
                let id = state.next_entry_id;
                state.next_entry_id += 1;
                match self.registry.get(model.mark_type()) {
                    Ok(factory) => {
                        let creation = self.spawn_creation(factory, model.clone(), id, generation);
                        state.creations.push(creation);
                    }
                    Err(err) => log::warn!("Skipping mark {}: {err}", model.id()),
                }
                // Unknown types keep their slot so later diffs stay aligned
                entries.push(ViewEntry {
                    id,
                    model: model.clone(),
                    generation,
                    view: None,
                });
            }
            state.entries = entries;
            (removed, generation)
        };

        log::debug!(
            "Mark list generation {generation}: {} entries, {} removed",
            marks.len(),
            removed.len()
        );
        for entry in removed {
            if let Some(view) = entry.view {
                log::debug!("Disposing superseded view for {}", entry.model.id());
                view.remove();
            }
            if !marks.iter().any(|m| Rc::ptr_eq(m, &entry.model)) {
                entry.model.release_domains();
            }
        }
    }

    fn spawn_creation(
        &self,
        factory: Rc<dyn ViewFactory>,
        model: Rc<MarkModel>,
        entry_id: u64,
        generation: u64,
    ) -> Creation {
        let parent = self.parent.clone();
        let state = Rc::downgrade(&self.state);
        let task = tokio::task::spawn_local(async move {
            match factory.create_view(model.clone(), parent).await {
                Ok(view) => attach(&state, entry_id, generation, view),
                Err(err) => log::warn!("Mark {} renders nothing: {err}", model.id()),
            }
        });
        async move {
            if let Err(err) = task.await {
                log::error!("View creation task failed: {err}");
            }
        }
        .boxed_local()
        .shared()
    }

    /// Wait until every outstanding creation, including superseded ones, has finished
    pub async fn settled(&self) {
        loop {
            let pending: Vec<Creation> = {
                let mut state = self.state.borrow_mut();
                state.creations.retain(|c| c.peek().is_none());
                state.creations.clone()
            };
            if pending.is_empty() {
                break;
            }
            join_all(pending).await;
        }
    }

    /// Attached views in mark-list order
    pub fn views(&self) -> Vec<Rc<dyn MarkView>> {
        self.state
            .borrow()
            .entries
            .iter()
            .filter_map(|e| e.view.clone())
            .collect()
    }

    pub fn attached_count(&self) -> usize {
        self.state.borrow().attached_count()
    }

    pub fn scene_node_count(&self) -> usize {
        self.attached_count() * NODES_PER_VIEW
    }

    /// Largest number of views ever attached at the same time
    pub fn max_attached(&self) -> usize {
        self.state.borrow().max_attached
    }

    pub fn relayout(&self) {
        for view in self.views() {
            view.relayout();
        }
    }

    /// Remove every attached view and release the domains of every listed model
    pub fn clear(&self) {
        let entries = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            std::mem::take(&mut state.entries)
        };
        for entry in entries {
            if let Some(view) = entry.view {
                view.remove();
            }
            entry.model.release_domains();
        }
    }
}

fn attach(
    state: &Weak<RefCell<LifecycleState>>,
    entry_id: u64,
    generation: u64,
    view: Rc<dyn MarkView>,
) {
    let Some(state) = state.upgrade() else {
        view.remove();
        return;
    };
    let (attached, listed) = {
        let mut state = state.borrow_mut();
        let current = state.generation;
        let attached = match state.entries.iter_mut().find(|e| e.id == entry_id) {
            Some(entry) if entry.generation == current => {
                entry.view = Some(view.clone());
                true
            }
            _ => false,
        };
        let count = state.attached_count();
        state.max_attached = state.max_attached.max(count);
        let listed = state.entries.iter().any(|e| e.model.id() == view.id());
        (attached, listed)
    };
    if attached {
        log::debug!("Attached view for {} (generation {generation})", view.id());
        return;
    }
    log::debug!(
        "Disposing stale view for {} from generation {generation}",
        view.id()
    );
    view.remove();
    // Creation registered domains for a model that has since left the list
    if !listed {
        view.model().release_domains();
    }
}
