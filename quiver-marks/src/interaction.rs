//! Declarative interaction configuration and the listener table built from it.

use indexmap::IndexMap;
use quiver_eventstream::SemanticEvent;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InteractionMode {
    Tooltip,
    Select,
    Add,
    Delete,
    HighlightAxes,
}

/// Interaction mode per channel. `None` means nothing is bound on that channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub click: Option<InteractionMode>,
    pub hover: Option<InteractionMode>,
    pub legend_click: Option<InteractionMode>,
    pub legend_hover: Option<InteractionMode>,
}

impl InteractionConfig {
    pub fn with_click(mut self, mode: InteractionMode) -> Self {
        self.click = Some(mode);
        self
    }

    pub fn with_hover(mut self, mode: InteractionMode) -> Self {
        self.hover = Some(mode);
        self
    }

    pub fn with_legend_click(mut self, mode: InteractionMode) -> Self {
        self.legend_click = Some(mode);
        self
    }

    pub fn with_legend_hover(mut self, mode: InteractionMode) -> Self {
        self.legend_hover = Some(mode);
        self
    }
}

/// A concrete handler a mark view runs in response to a semantic event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    ShowTooltip { sticky: bool },
    MoveTooltip,
    HideTooltip,
    AddElement,
    DeleteElement,
    ToggleSelection,
    ResetSelection,
    HighlightAxes,
    UnhighlightAxes,
    TrackHover,
    ResetHover,
}

/// Semantic event to the ordered actions bound to it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListenerTable {
    listeners: IndexMap<SemanticEvent, Vec<EventAction>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, event: SemanticEvent, action: EventAction) -> Self {
        self.listeners.entry(event).or_default().push(action);
        self
    }

    pub fn actions(&self, event: SemanticEvent) -> &[EventAction] {
        self.listeners
            .get(&event)
            .map(|actions| actions.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_bound(&self, event: SemanticEvent) -> bool {
        !self.actions(event).is_empty()
    }

    /// Append `other`'s actions after this table's, event by event
    pub fn merge(mut self, other: &ListenerTable) -> Self {
        for (event, actions) in &other.listeners {
            self.listeners
                .entry(*event)
                .or_default()
                .extend(actions.iter().copied());
        }
        self
    }
}

/// Listeners every mark gets from its interaction configuration
pub fn base_listeners(config: &InteractionConfig) -> ListenerTable {
    use quiver_eventstream::SemanticEvent::*;
    use EventAction::*;

    let mut table = ListenerTable::new();

    table = match config.click {
        Some(InteractionMode::Tooltip) => table
            .on(ElementClicked, ShowTooltip { sticky: true })
            .on(ParentClicked, HideTooltip),
        Some(InteractionMode::Add) => table.on(ParentClicked, AddElement),
        Some(InteractionMode::Delete) => table.on(ElementClicked, DeleteElement),
        Some(InteractionMode::Select) => table
            .on(ParentClicked, ResetSelection)
            .on(ElementClicked, ToggleSelection),
        Some(mode) => {
            log::debug!("Interaction mode `{mode}` is not supported on click");
            table
        }
        None => table,
    };

    table = match config.hover {
        Some(InteractionMode::Tooltip) => table
            .on(MouseOver, ShowTooltip { sticky: false })
            .on(MouseMove, MoveTooltip)
            .on(MouseOut, HideTooltip),
        Some(mode) => {
            log::debug!("Interaction mode `{mode}` is not supported on hover");
            table
        }
        None => table,
    };

    table = match config.legend_click {
        Some(InteractionMode::Tooltip) => table
            .on(LegendClicked, ShowTooltip { sticky: true })
            .on(ParentClicked, HideTooltip),
        Some(mode) => {
            log::debug!("Interaction mode `{mode}` is not supported on legend click");
            table
        }
        None => table,
    };

    match config.legend_hover {
        Some(InteractionMode::HighlightAxes) => table
            .on(LegendMouseOver, HighlightAxes)
            .on(LegendMouseOut, UnhighlightAxes),
        Some(mode) => {
            log::debug!("Interaction mode `{mode}` is not supported on legend hover");
            table
        }
        None => table,
    }
}

/// Scatter marks track the hovered element regardless of configuration
pub fn scatter_listeners() -> ListenerTable {
    ListenerTable::new()
        .on(SemanticEvent::MouseOver, EventAction::TrackHover)
        .on(SemanticEvent::MouseOut, EventAction::ResetHover)
}

/// Holds the active listener table of one mark view
#[derive(Debug, Clone)]
pub struct InteractionDispatcher {
    extension: ListenerTable,
    table: ListenerTable,
}

impl InteractionDispatcher {
    /// `extension` holds the mark specific listeners merged after the base ones
    pub fn new(extension: ListenerTable) -> Self {
        Self {
            table: extension.clone(),
            extension,
        }
    }

    /// Rebuild the listener table from scratch. Channels left unset keep no handlers from a
    /// previous configuration.
    pub fn process_interactions(&mut self, config: &InteractionConfig) {
        self.table = base_listeners(config).merge(&self.extension);
    }

    pub fn actions(&self, event: SemanticEvent) -> Vec<EventAction> {
        self.table.actions(event).to_vec()
    }

    pub fn table(&self) -> &ListenerTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::EventAction::*;
    use super::*;
    use quiver_eventstream::SemanticEvent::*;

    #[test]
    fn test_click_select() {
        let config = InteractionConfig::default().with_click(InteractionMode::Select);
        let table = base_listeners(&config);
        assert_eq!(table.actions(ElementClicked), &[ToggleSelection]);
        assert_eq!(table.actions(ParentClicked), &[ResetSelection]);
        assert!(!table.is_bound(MouseOver));
    }

    #[test]
    fn test_click_add_and_delete() {
        let add = base_listeners(&InteractionConfig::default().with_click(InteractionMode::Add));
        assert_eq!(add.actions(ParentClicked), &[AddElement]);
        assert!(!add.is_bound(ElementClicked));

        let delete =
            base_listeners(&InteractionConfig::default().with_click(InteractionMode::Delete));
        assert_eq!(delete.actions(ElementClicked), &[DeleteElement]);
        assert!(!delete.is_bound(ParentClicked));
    }

    #[test]
    fn test_legend_channels() {
        let config = InteractionConfig::default()
            .with_legend_click(InteractionMode::Tooltip)
            .with_legend_hover(InteractionMode::HighlightAxes);
        let table = base_listeners(&config);
        assert_eq!(table.actions(LegendClicked), &[ShowTooltip { sticky: true }]);
        assert_eq!(table.actions(LegendMouseOver), &[HighlightAxes]);
        assert_eq!(table.actions(LegendMouseOut), &[UnhighlightAxes]);
    }

    #[test]
    fn test_reconfigure_resets_unset_channels() {
        let mut dispatcher = InteractionDispatcher::new(scatter_listeners());
        dispatcher.process_interactions(
            &InteractionConfig::default()
                .with_click(InteractionMode::Select)
                .with_hover(InteractionMode::Tooltip),
        );
        assert_eq!(
            dispatcher.actions(MouseOver),
            vec![ShowTooltip { sticky: false }, TrackHover]
        );

        dispatcher.process_interactions(&InteractionConfig::default());
        assert!(dispatcher.actions(ElementClicked).is_empty());
        assert!(dispatcher.actions(ParentClicked).is_empty());
        assert_eq!(dispatcher.actions(MouseOver), vec![TrackHover]);
        assert_eq!(dispatcher.actions(MouseOut), vec![ResetHover]);
    }

    #[test]
    fn test_config_from_json() {
        let config: InteractionConfig =
            serde_json::from_str(r#"{"click": "select", "legend_hover": "highlight_axes"}"#)
                .unwrap();
        assert_eq!(config.click, Some(InteractionMode::Select));
        assert_eq!(config.hover, None);
        assert_eq!(config.legend_hover, Some(InteractionMode::HighlightAxes));
    }
}
