//! Selection and hover index rules.

/// Click on element `index` given the current selection.
///
/// With `accel` held the index is toggled in or out of the selection, otherwise it replaces
/// the selection. An empty result is `None`.
pub fn toggle_selection(
    current: Option<&[usize]>,
    index: usize,
    accel: bool,
) -> Option<Vec<usize>> {
    let current = current.unwrap_or(&[]);
    let selected = if accel {
        if current.contains(&index) {
            current.iter().copied().filter(|i| *i != index).collect()
        } else {
            let mut selected = current.to_vec();
            selected.push(index);
            selected
        }
    } else {
        vec![index]
    };
    normalize_selection(Some(selected))
}

/// An empty selection is stored as `None`
pub fn normalize_selection(selected: Option<Vec<usize>>) -> Option<Vec<usize>> {
    selected.filter(|s| !s.is_empty())
}

/// Drop indices outside `[0, len)`. Selection and data change independently, so out of range
/// entries are expected transiently.
pub fn clamp_selection(selected: Option<&[usize]>, len: usize) -> Option<Vec<usize>> {
    let selected = selected?;
    normalize_selection(Some(selected.iter().copied().filter(|i| *i < len).collect()))
}

pub fn clamp_hover(hovered: Option<usize>, len: usize) -> Option<usize> {
    hovered.filter(|i| *i < len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 0, false, Some(vec![0]))]
    #[case(Some(vec![0]), 1, false, Some(vec![1]))]
    #[case(Some(vec![0]), 1, true, Some(vec![0, 1]))]
    #[case(Some(vec![0, 1]), 0, true, Some(vec![1]))]
    #[case(Some(vec![1]), 1, true, None)]
    #[case(None, 2, true, Some(vec![2]))]
    #[case(Some(vec![1, 2]), 2, false, Some(vec![2]))]
    fn test_toggle_selection(
        #[case] current: Option<Vec<usize>>,
        #[case] index: usize,
        #[case] accel: bool,
        #[case] expected: Option<Vec<usize>>,
    ) {
        assert_eq!(toggle_selection(current.as_deref(), index, accel), expected);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_selection(Some(&[0, 5, 1][..]), 2), Some(vec![0, 1]));
        assert_eq!(clamp_selection(Some(&[5][..]), 2), None);
        assert_eq!(clamp_selection(None, 2), None);
        assert_eq!(clamp_hover(Some(3), 3), None);
        assert_eq!(clamp_hover(Some(2), 3), Some(2));
    }
}
