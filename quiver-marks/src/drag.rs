//! Drag gesture state machine for movable marks.

use crate::datum::DataPoint;
use crate::message::MarkMessage;
use crate::scale_binding::ScaleBinding;

/// Movement constraints read from the mark when a drag starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragFlags {
    pub restrict_x: bool,
    pub restrict_y: bool,
    pub update_on_move: bool,
}

impl DragFlags {
    /// Restricting both axes leaves nothing to move
    pub fn is_inert(&self) -> bool {
        self.restrict_x && self.restrict_y
    }
}

/// Data write-back produced by a drag. `None` coordinates are left untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragCommit {
    pub index: usize,
    pub x: Option<f32>,
    pub y: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragUpdate {
    pub position: [f32; 2],
    pub message: MarkMessage,
    pub commit: Option<DragCommit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragEnded {
    pub message: MarkMessage,
    pub commit: DragCommit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveDrag {
    index: usize,
    /// Element pixel position when the drag started
    anchor: [f32; 2],
    pointer_origin: [f32; 2],
    position: [f32; 2],
    origin: DataPoint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    flags: DragFlags,
    state: DragState,
}

impl DragController {
    pub fn new(flags: DragFlags) -> Self {
        Self {
            flags,
            state: DragState::Idle,
        }
    }

    pub fn set_flags(&mut self, flags: DragFlags) {
        self.flags = flags;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn dragged_index(&self) -> Option<usize> {
        match self.state {
            DragState::Dragging(drag) => Some(drag.index),
            DragState::Idle => None,
        }
    }

    /// Current pixel position of the dragged element
    pub fn position(&self) -> Option<[f32; 2]> {
        match self.state {
            DragState::Dragging(drag) => Some(drag.position),
            DragState::Idle => None,
        }
    }

    /// Start dragging element `index`, currently drawn at `anchor`
    pub fn drag_start(
        &mut self,
        index: usize,
        anchor: [f32; 2],
        pointer: [f32; 2],
        point: DataPoint,
    ) -> MarkMessage {
        self.state = DragState::Dragging(ActiveDrag {
            index,
            anchor,
            pointer_origin: pointer,
            position: anchor,
            origin: point,
        });
        MarkMessage::DragStart { point, index }
    }

    /// Follow the pointer. Returns `None` when idle or when both axes are restricted.
    pub fn on_drag(&mut self, pointer: [f32; 2], scales: &ScaleBinding) -> Option<DragUpdate> {
        let DragState::Dragging(drag) = &mut self.state else {
            return None;
        };
        if self.flags.is_inert() {
            return None;
        }
        if !self.flags.restrict_y {
            drag.position[0] = drag.anchor[0] + pointer[0] - drag.pointer_origin[0];
        }
        if !self.flags.restrict_x {
            drag.position[1] = drag.anchor[1] + pointer[1] - drag.pointer_origin[1];
        }
        let drag = *drag;
        let point = scales.invert(drag.position);
        Some(DragUpdate {
            position: drag.position,
            message: MarkMessage::Drag {
                origin: drag.origin,
                point,
                index: drag.index,
            },
            commit: self
                .flags
                .update_on_move
                .then(|| self.commit(drag.index, point)),
        })
    }

    /// Finish the gesture. The final position is always committed.
    pub fn drag_ended(&mut self, scales: &ScaleBinding) -> Option<DragEnded> {
        let DragState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return None;
        };
        let point = scales.invert(drag.position);
        Some(DragEnded {
            message: MarkMessage::DragEnd {
                point,
                index: drag.index,
            },
            commit: self.commit(drag.index, point),
        })
    }

    fn commit(&self, index: usize, point: DataPoint) -> DragCommit {
        if self.flags.is_inert() {
            return DragCommit {
                index,
                x: None,
                y: None,
            };
        }
        DragCommit {
            index,
            x: (!self.flags.restrict_y).then_some(point.x),
            y: (!self.flags.restrict_x).then_some(point.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale_binding::ResolvedScales;
    use float_cmp::assert_approx_eq;
    use indexmap::IndexMap;
    use quiver_common::binding::ModelId;
    use quiver_scales::{DomainOwner, ScaleModel, ScaleRole};

    fn binding() -> ScaleBinding {
        let x = ScaleModel::linear(Default::default());
        let y = ScaleModel::linear(Default::default());
        let id = ModelId::from("m");
        x.compute_and_set_domain(vec![0.0, 10.0], DomainOwner::new(&id, ScaleRole::X));
        y.compute_and_set_domain(vec![0.0, 10.0], DomainOwner::new(&id, ScaleRole::Y));
        x.set_range((0.0, 100.0));
        y.set_range((100.0, 0.0));
        ScaleBinding::new(ResolvedScales {
            x,
            y,
            others: IndexMap::new(),
        })
    }

    #[test]
    fn test_commit_on_end_only() {
        let scales = binding();
        let mut drag = DragController::new(DragFlags::default());
        let origin = DataPoint { x: 5.0, y: 5.0 };
        let start = drag.drag_start(2, [50.0, 50.0], [52.0, 48.0], origin);
        assert_eq!(start, MarkMessage::DragStart { point: origin, index: 2 });

        let update = drag.on_drag([62.0, 28.0], &scales).unwrap();
        assert_eq!(update.position, [60.0, 30.0]);
        assert!(update.commit.is_none());

        let ended = drag.drag_ended(&scales).unwrap();
        assert!(!drag.is_dragging());
        assert_approx_eq!(f32, ended.commit.x.unwrap(), 6.0);
        assert_approx_eq!(f32, ended.commit.y.unwrap(), 7.0);
        assert!(drag.drag_ended(&scales).is_none());
    }

    #[test]
    fn test_restrict_x_moves_along_x_only() {
        let scales = binding();
        let mut drag = DragController::new(DragFlags {
            restrict_x: true,
            update_on_move: true,
            ..Default::default()
        });
        drag.drag_start(0, [50.0, 50.0], [50.0, 50.0], DataPoint { x: 5.0, y: 5.0 });
        let update = drag.on_drag([70.0, 40.0], &scales).unwrap();
        assert_eq!(update.position, [70.0, 50.0]);
        let commit = update.commit.unwrap();
        assert_approx_eq!(f32, commit.x.unwrap(), 7.0);
        assert_eq!(commit.y, None);
    }

    #[test]
    fn test_restrict_y_moves_along_y_only() {
        let scales = binding();
        let mut drag = DragController::new(DragFlags {
            restrict_y: true,
            ..Default::default()
        });
        drag.drag_start(0, [50.0, 50.0], [50.0, 50.0], DataPoint { x: 5.0, y: 5.0 });
        let update = drag.on_drag([70.0, 40.0], &scales).unwrap();
        assert_eq!(update.position, [50.0, 40.0]);
        assert!(update.commit.is_none());

        let ended = drag.drag_ended(&scales).unwrap();
        assert_eq!(ended.commit.x, None);
        assert_approx_eq!(f32, ended.commit.y.unwrap(), 6.0);
    }

    #[test]
    fn test_both_restrictions_inert() {
        let scales = binding();
        let mut drag = DragController::new(DragFlags {
            restrict_x: true,
            restrict_y: true,
            update_on_move: true,
        });
        drag.drag_start(0, [50.0, 50.0], [50.0, 50.0], DataPoint { x: 5.0, y: 5.0 });
        assert!(drag.on_drag([70.0, 40.0], &scales).is_none());
        let ended = drag.drag_ended(&scales).unwrap();
        assert_eq!(ended.commit.x, None);
        assert_eq!(ended.commit.y, None);
    }

    #[test]
    fn test_idle_ignores_drag() {
        let mut drag = DragController::default();
        assert!(drag.on_drag([1.0, 1.0], &binding()).is_none());
        assert_eq!(drag.dragged_index(), None);
    }
}
