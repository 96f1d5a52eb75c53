use std::rc::Rc;

use async_trait::async_trait;
use indexmap::IndexMap;
use quiver_marks::error::QuiverMarkError;
use quiver_marks::lines::LinesView;
use quiver_marks::model::{LINES, SCATTER};
use quiver_marks::parent::MarkParent;
use quiver_marks::scatter::ScatterView;
use quiver_marks::{MarkModel, MarkView};

use crate::error::QuiverFigureError;

/// Creates the view for one mark type
#[async_trait(?Send)]
pub trait ViewFactory {
    async fn create_view(
        &self,
        model: Rc<MarkModel>,
        parent: Rc<dyn MarkParent>,
    ) -> Result<Rc<dyn MarkView>, QuiverMarkError>;
}

pub struct ScatterFactory;

#[async_trait(?Send)]
impl ViewFactory for ScatterFactory {
    async fn create_view(
        &self,
        model: Rc<MarkModel>,
        parent: Rc<dyn MarkParent>,
    ) -> Result<Rc<dyn MarkView>, QuiverMarkError> {
        let view: Rc<dyn MarkView> = ScatterView::create(model, parent).await?;
        Ok(view)
    }
}

pub struct LinesFactory;

#[async_trait(?Send)]
impl ViewFactory for LinesFactory {
    async fn create_view(
        &self,
        model: Rc<MarkModel>,
        parent: Rc<dyn MarkParent>,
    ) -> Result<Rc<dyn MarkView>, QuiverMarkError> {
        let view: Rc<dyn MarkView> = LinesView::create(model, parent).await?;
        Ok(view)
    }
}

/// Mark type name to view factory
pub struct MarkViewRegistry {
    factories: IndexMap<String, Rc<dyn ViewFactory>>,
}

impl MarkViewRegistry {
    pub fn empty() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    pub fn register(&mut self, mark_type: &str, factory: Rc<dyn ViewFactory>) {
        self.factories.insert(mark_type.to_string(), factory);
    }

    pub fn get(&self, mark_type: &str) -> Result<Rc<dyn ViewFactory>, QuiverFigureError> {
        self.factories
            .get(mark_type)
            .cloned()
            .ok_or_else(|| QuiverFigureError::UnknownMarkType(mark_type.to_string()))
    }

    pub fn mark_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for MarkViewRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(SCATTER, Rc::new(ScatterFactory));
        registry.register(LINES, Rc::new(LinesFactory));
        registry
    }
}
