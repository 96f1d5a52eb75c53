//! Layered per-element styling.
//!
//! Layers apply in increasing precedence. A layer only touches the properties its dictionary
//! names, so a later layer overrides an earlier one only where it sets something.

use indexmap::IndexSet;
use quiver_common::style::{ElementStyle, StyleDict};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum StyleLayerKind {
    Base,
    Unselected,
    Selected,
    Unhovered,
    Hovered,
}

/// Style content of a layer, either shared by every index or one dictionary per element
#[derive(Debug, Clone, PartialEq)]
pub enum LayerStyle {
    Uniform(StyleDict),
    PerElement(Vec<StyleDict>),
}

impl LayerStyle {
    fn for_element(&self, index: usize) -> Option<&StyleDict> {
        match self {
            LayerStyle::Uniform(style) => Some(style),
            LayerStyle::PerElement(styles) => styles.get(index),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            LayerStyle::Uniform(style) => style.is_empty(),
            LayerStyle::PerElement(styles) => styles.iter().all(|s| s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleLayer {
    pub kind: StyleLayerKind,
    pub style: LayerStyle,
    pub indices: Vec<usize>,
}

impl StyleLayer {
    pub fn uniform(kind: StyleLayerKind, style: StyleDict, indices: Vec<usize>) -> Self {
        Self {
            kind,
            style: LayerStyle::Uniform(style),
            indices,
        }
    }

    pub fn per_element(styles: Vec<StyleDict>) -> Self {
        let indices = (0..styles.len()).collect();
        Self {
            kind: StyleLayerKind::Base,
            style: LayerStyle::PerElement(styles),
            indices,
        }
    }
}

/// Selected and unselected index sets. Nothing is unselected while nothing is selected.
pub fn selection_indices(selected: Option<&[usize]>, len: usize) -> (Vec<usize>, Vec<usize>) {
    match selected {
        Some(selected) => {
            let inside: Vec<usize> = selected.iter().copied().filter(|i| *i < len).collect();
            let mut mask = vec![false; len];
            for index in &inside {
                mask[*index] = true;
            }
            let outside = (0..len).filter(|i| !mask[*i]).collect();
            (inside, outside)
        }
        None => (Vec::new(), Vec::new()),
    }
}

/// Hovered and unhovered index sets, empty while nothing is hovered
pub fn hover_indices(hovered: Option<usize>, len: usize) -> (Vec<usize>, Vec<usize>) {
    match hovered.filter(|i| *i < len) {
        Some(hovered) => (vec![hovered], (0..len).filter(|i| *i != hovered).collect()),
        None => (Vec::new(), Vec::new()),
    }
}

/// Anything that owns an inline style per element
pub trait Styled {
    fn element_count(&self) -> usize;

    fn element_style_mut(&mut self, index: usize) -> Option<&mut ElementStyle>;
}

impl Styled for Vec<ElementStyle> {
    fn element_count(&self) -> usize {
        self.len()
    }

    fn element_style_mut(&mut self, index: usize) -> Option<&mut ElementStyle> {
        self.get_mut(index)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StyleEngine;

impl StyleEngine {
    /// Set `style` on the given elements. Empty style or empty index set is a no-op.
    pub fn set_style_on_elements(target: &mut dyn Styled, style: &LayerStyle, indices: &[usize]) {
        if indices.is_empty() || style.is_empty() {
            return;
        }
        for index in indices {
            let Some(dict) = style.for_element(*index) else {
                continue;
            };
            if let Some(element) = target.element_style_mut(*index) {
                element.apply(dict);
            }
        }
    }

    /// Unset every property `style` names on the given elements
    pub fn clear_style(target: &mut dyn Styled, style: &StyleDict, indices: &[usize]) {
        if indices.is_empty() || style.is_empty() {
            return;
        }
        for index in indices {
            if let Some(element) = target.element_style_mut(*index) {
                element.clear_keys(style);
            }
        }
    }

    /// Apply `layers` in order after clearing every property any of them names
    pub fn apply_styles(target: &mut dyn Styled, layers: &[StyleLayer]) {
        let mut names: IndexSet<&str> = IndexSet::new();
        for layer in layers {
            match &layer.style {
                LayerStyle::Uniform(style) => names.extend(style.keys()),
                LayerStyle::PerElement(styles) => {
                    for style in styles {
                        names.extend(style.keys());
                    }
                }
            }
        }
        if !names.is_empty() {
            for index in 0..target.element_count() {
                if let Some(element) = target.element_style_mut(index) {
                    element.remove_all(names.iter().copied());
                }
            }
        }
        for layer in layers {
            Self::set_style_on_elements(target, &layer.style, &layer.indices);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_common::style::StyleValue;
    use rstest::rstest;

    fn layers(
        selected: Option<&[usize]>,
        selected_style: &StyleDict,
        unselected_style: &StyleDict,
    ) -> Vec<StyleLayer> {
        let base = StyleDict::new().with("fill", "red");
        let (sel, unsel) = selection_indices(selected, 2);
        vec![
            StyleLayer::per_element(vec![base.clone(), base]),
            StyleLayer::uniform(StyleLayerKind::Unselected, unselected_style.clone(), unsel),
            StyleLayer::uniform(StyleLayerKind::Selected, selected_style.clone(), sel),
        ]
    }

    fn fills(elements: &[ElementStyle]) -> Vec<Option<&str>> {
        elements.iter().map(|e| e.get_str("fill")).collect()
    }

    #[test]
    fn test_precedence_sequence() {
        let mut elements = vec![ElementStyle::default(); 2];
        let mut selected_style = StyleDict::new();
        let mut unselected_style = StyleDict::new().with("fill", "orange");

        StyleEngine::apply_styles(&mut elements, &layers(Some(&[0][..]), &selected_style, &unselected_style));
        assert_eq!(fills(&elements), vec![Some("red"), Some("orange")]);

        selected_style = StyleDict::new().with("fill", "green");
        StyleEngine::apply_styles(&mut elements, &layers(Some(&[0][..]), &selected_style, &unselected_style));
        assert_eq!(fills(&elements), vec![Some("green"), Some("orange")]);

        StyleEngine::apply_styles(&mut elements, &layers(Some(&[1][..]), &selected_style, &unselected_style));
        assert_eq!(fills(&elements), vec![Some("orange"), Some("green")]);

        unselected_style = StyleDict::new();
        StyleEngine::apply_styles(&mut elements, &layers(Some(&[1][..]), &selected_style, &unselected_style));
        assert_eq!(fills(&elements), vec![Some("red"), Some("green")]);

        StyleEngine::apply_styles(&mut elements, &layers(None, &selected_style, &unselected_style));
        assert_eq!(fills(&elements), vec![Some("red"), Some("red")]);
    }

    #[test]
    fn test_idempotent() {
        let mut elements = vec![ElementStyle::default(); 2];
        let layers = layers(
            Some(&[1][..]),
            &StyleDict::new().with("stroke", "black"),
            &StyleDict::new().with("opacity", 0.3),
        );
        StyleEngine::apply_styles(&mut elements, &layers);
        let first = elements.clone();
        StyleEngine::apply_styles(&mut elements, &layers);
        assert_eq!(elements, first);
        assert_eq!(elements[1].get_str("stroke"), Some("black"));
        assert_eq!(elements[1].get("opacity"), None);
    }

    #[test]
    fn test_clear_resets_to_unset() {
        let mut elements = vec![ElementStyle::default(); 3];
        let style = StyleDict::new().with("fill", "blue");
        StyleEngine::set_style_on_elements(&mut elements, &LayerStyle::Uniform(style.clone()), &[0, 2]);
        assert_eq!(fills(&elements), vec![Some("blue"), None, Some("blue")]);

        StyleEngine::clear_style(&mut elements, &style, &[2]);
        assert_eq!(fills(&elements), vec![Some("blue"), None, None]);

        // No-ops
        StyleEngine::clear_style(&mut elements, &style, &[]);
        StyleEngine::clear_style(&mut elements, &StyleDict::new(), &[0]);
        assert_eq!(fills(&elements), vec![Some("blue"), None, None]);
    }

    #[test]
    fn test_per_element_keys_cleared_on_every_element() {
        let mut elements = vec![ElementStyle::default(); 2];
        let first = vec![
            StyleDict::new().with("fill", "red"),
            StyleDict::new().with("stroke", "black"),
        ];
        StyleEngine::apply_styles(&mut elements, &[StyleLayer::per_element(first)]);
        assert_eq!(elements[1].get_str("stroke"), Some("black"));

        let second = vec![
            StyleDict::new().with("stroke", "blue"),
            StyleDict::new().with("fill", "green"),
        ];
        StyleEngine::apply_styles(&mut elements, &[StyleLayer::per_element(second)]);
        assert_eq!(fills(&elements), vec![None, Some("green")]);
        assert_eq!(elements[0].get_str("stroke"), Some("blue"));
        assert_eq!(elements[1].get_str("stroke"), None);
    }

    #[test]
    fn test_hover_restyle_scales_linearly() {
        let len = 20_000;
        let mut elements = vec![ElementStyle::default(); len];
        let base: Vec<StyleDict> = (0..len)
            .map(|_| StyleDict::new().with("fill", "red").with("opacity", 1.0))
            .collect();
        let selected: Vec<usize> = (0..len).step_by(2).collect();
        let (sel, unsel) = selection_indices(Some(&selected[..]), len);
        let (hovered, unhovered) = hover_indices(Some(3), len);
        let layers = vec![
            StyleLayer::per_element(base),
            StyleLayer::uniform(
                StyleLayerKind::Unselected,
                StyleDict::new().with("opacity", 0.3),
                unsel,
            ),
            StyleLayer::uniform(StyleLayerKind::Selected, StyleDict::new(), sel),
            StyleLayer::uniform(
                StyleLayerKind::Unhovered,
                StyleDict::new().with("stroke", "none"),
                unhovered,
            ),
            StyleLayer::uniform(
                StyleLayerKind::Hovered,
                StyleDict::new().with("fill", "orange"),
                hovered,
            ),
        ];

        let start = std::time::Instant::now();
        StyleEngine::apply_styles(&mut elements, &layers);
        assert!(start.elapsed() < std::time::Duration::from_secs(5));

        assert_eq!(elements[3].get_str("fill"), Some("orange"));
        assert_eq!(elements[3].get_str("stroke"), None);
        assert_eq!(elements[5].get("opacity"), Some(&StyleValue::Number(0.3)));
        assert_eq!(elements[4].get("opacity"), Some(&StyleValue::Number(1.0)));
        assert_eq!(elements[4].get_str("stroke"), Some("none"));
    }

    #[rstest]
    #[case(None, 3, vec![], vec![])]
    #[case(Some(vec![1]), 3, vec![1], vec![0, 2])]
    #[case(Some(vec![0, 7]), 2, vec![0], vec![1])]
    fn test_selection_indices(
        #[case] selected: Option<Vec<usize>>,
        #[case] len: usize,
        #[case] expected_selected: Vec<usize>,
        #[case] expected_unselected: Vec<usize>,
    ) {
        assert_eq!(
            selection_indices(selected.as_deref(), len),
            (expected_selected, expected_unselected)
        );
    }

    #[test]
    fn test_hover_indices() {
        assert_eq!(hover_indices(Some(1), 3), (vec![1], vec![0, 2]));
        assert_eq!(hover_indices(None, 3), (vec![], vec![]));
        assert_eq!(hover_indices(Some(4), 3), (vec![], vec![]));
    }
}
