//! Pointer interaction state machine: select, drag, resize and text editing.

use crate::config::EditorConfig;
use crate::scene::Scene;
use crate::selection::{apply_resize, handle_at, ResizeState};
use crate::shapes::{ObjectId, ObjectKind, ObjectTrait, TextMeasure};
use crate::snap::snap_to_grid;
use kurbo::{Point, Vec2};

/// Current interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Moving an object; `offset` is the press point minus the object origin.
    Dragging { id: ObjectId, offset: Vec2 },
    /// Resizing an object through one of its handles.
    Resizing(ResizeState),
    /// Waiting for external text input for a text object.
    EditingText { id: ObjectId },
}

/// What the caller has to do after an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Response {
    /// The scene needs repainting.
    pub redraw: bool,
    /// The selection changed.
    pub selection_changed: bool,
    /// A history snapshot should be committed.
    pub commit: bool,
    /// Text input is requested for this object.
    pub edit_request: Option<ObjectId>,
}

/// Drives scene changes from canvas-space pointer events.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    pub snap_to_grid: bool,
    pub grid_size: f64,
    pub handle_threshold: f64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            snap_to_grid: config.snap_to_grid,
            grid_size: config.grid_size,
            handle_threshold: config.handle_threshold,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    /// Drop any in-progress interaction.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Press: resize handles of the selection win, then the topmost object.
    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        point: Point,
        measure: &dyn TextMeasure,
    ) -> Response {
        if let InteractionState::EditingText { id } = self.state {
            log::debug!("Text edit for {} abandoned by pointer press", id);
        }
        self.state = InteractionState::Idle;

        if let Some(selected) = scene.selected_object() {
            if selected.kind() != ObjectKind::Text {
                if let Some(handle) = handle_at(selected, point, self.handle_threshold) {
                    log::debug!("Resizing {} via {} handle", selected.id(), handle.name());
                    self.state = InteractionState::Resizing(ResizeState {
                        id: selected.id(),
                        handle,
                        anchor: point,
                    });
                    return Response::default();
                }
            }
        }

        let mut response = Response {
            redraw: true,
            ..Response::default()
        };
        match scene
            .object_at(point, measure)
            .and_then(|id| scene.get(id))
            .map(|object| (object.id(), object.position()))
        {
            Some((id, origin)) => {
                response.selection_changed = scene.select(Some(id));
                self.state = InteractionState::Dragging {
                    id,
                    offset: point - origin,
                };
            }
            None => {
                response.selection_changed = scene.select(None);
            }
        }
        response
    }

    /// Move: drag or resize the active object. No-op in other states.
    pub fn pointer_move(&mut self, scene: &mut Scene, point: Point) -> Response {
        match self.state {
            InteractionState::Dragging { id, offset } => {
                let Some(object) = scene.get_mut(id) else {
                    self.state = InteractionState::Idle;
                    return Response::default();
                };
                let mut target = point - offset;
                if self.snap_to_grid {
                    target = snap_to_grid(target, self.grid_size);
                }
                object.set_position(target);
                Response {
                    redraw: true,
                    ..Response::default()
                }
            }
            InteractionState::Resizing(mut resize) => {
                let Some(object) = scene.get_mut(resize.id) else {
                    self.state = InteractionState::Idle;
                    return Response::default();
                };
                apply_resize(object, resize.handle, point - resize.anchor);
                resize.anchor = point;
                self.state = InteractionState::Resizing(resize);
                Response {
                    redraw: true,
                    ..Response::default()
                }
            }
            InteractionState::Idle | InteractionState::EditingText { .. } => Response::default(),
        }
    }

    /// Release: finishing a drag or resize commits a snapshot.
    pub fn pointer_up(&mut self) -> Response {
        let commit = matches!(
            self.state,
            InteractionState::Dragging { .. } | InteractionState::Resizing(_)
        );
        if commit {
            self.state = InteractionState::Idle;
        }
        Response {
            commit,
            ..Response::default()
        }
    }

    /// Double-click on a text object requests text input.
    pub fn double_click(
        &mut self,
        scene: &Scene,
        point: Point,
        measure: &dyn TextMeasure,
    ) -> Response {
        let Some(id) = scene
            .object_at(point, measure)
            .filter(|&id| scene.get(id).is_some_and(|o| o.kind() == ObjectKind::Text))
        else {
            return Response::default();
        };
        self.state = InteractionState::EditingText { id };
        Response {
            edit_request: Some(id),
            ..Response::default()
        }
    }

    /// Finish a text edit. `None` cancels; a value replaces the content and commits.
    pub fn commit_text(&mut self, scene: &mut Scene, value: Option<String>) -> Response {
        let InteractionState::EditingText { id } = self.state else {
            return Response::default();
        };
        self.state = InteractionState::Idle;

        let Some(value) = value else {
            return Response::default();
        };
        match scene.get_mut(id).and_then(|o| o.as_text_mut()) {
            Some(text) => {
                text.content = value;
                Response {
                    redraw: true,
                    commit: true,
                    ..Response::default()
                }
            }
            None => Response::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::HandleKind;
    use crate::shapes::{ApproxTextMeasure, Circle, Rectangle, SceneObject, Text};

    fn scene_with_rect() -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let id = scene.add(SceneObject::Rect(Rectangle::default()));
        scene.select(None);
        (scene, id)
    }

    fn position(scene: &Scene, id: ObjectId) -> Point {
        scene.get(id).map(|o| o.position()).unwrap()
    }

    #[test]
    fn test_press_selects_and_drags_without_jump() {
        let (mut scene, id) = scene_with_rect();
        let mut controller = InteractionController::default();

        let response = controller.pointer_down(&mut scene, Point::new(150.0, 150.0), &ApproxTextMeasure);
        assert!(response.selection_changed);
        assert_eq!(scene.selected(), Some(id));
        assert!(matches!(controller.state(), InteractionState::Dragging { .. }));

        controller.pointer_move(&mut scene, Point::new(160.0, 155.0));
        assert_eq!(position(&scene, id), Point::new(110.0, 105.0));

        let response = controller.pointer_up();
        assert!(response.commit);
        assert!(controller.is_idle());
    }

    #[test]
    fn test_press_on_empty_space_clears_selection() {
        let (mut scene, id) = scene_with_rect();
        scene.select(Some(id));
        let mut controller = InteractionController::default();
        let response = controller.pointer_down(&mut scene, Point::new(700.0, 500.0), &ApproxTextMeasure);
        assert!(response.selection_changed);
        assert_eq!(scene.selected(), None);
        assert!(controller.is_idle());
        assert!(!controller.pointer_up().commit);
    }

    #[test]
    fn test_drag_snaps_to_grid() {
        let (mut scene, id) = scene_with_rect();
        let mut controller = InteractionController::default();
        controller.snap_to_grid = true;

        // Press at the origin so the offset is zero
        controller.pointer_down(&mut scene, Point::new(100.0, 100.0), &ApproxTextMeasure);
        controller.pointer_move(&mut scene, Point::new(107.0, 193.0));
        assert_eq!(position(&scene, id), Point::new(100.0, 200.0));
    }

    #[test]
    fn test_handle_press_starts_resize() {
        let (mut scene, id) = scene_with_rect();
        scene.select(Some(id));
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut scene, Point::new(302.0, 252.0), &ApproxTextMeasure);
        let InteractionState::Resizing(resize) = controller.state() else {
            panic!("expected resize, got {:?}", controller.state());
        };
        assert_eq!(resize.handle, HandleKind::Se);

        // Incremental: each step uses the previous pointer position
        controller.pointer_move(&mut scene, Point::new(312.0, 252.0));
        controller.pointer_move(&mut scene, Point::new(322.0, 262.0));
        let SceneObject::Rect(rect) = scene.get(id).unwrap() else {
            panic!("expected rect");
        };
        assert!((rect.width - 220.0).abs() < f64::EPSILON);
        assert!((rect.height - 160.0).abs() < f64::EPSILON);
        assert!(controller.pointer_up().commit);
    }

    #[test]
    fn test_circle_resize_clamps_radius() {
        let mut scene = Scene::new();
        let id = scene.add(SceneObject::Circle(Circle::default()));
        let mut controller = InteractionController::default();

        // East handle at (275, 175)
        controller.pointer_down(&mut scene, Point::new(275.0, 175.0), &ApproxTextMeasure);
        controller.pointer_move(&mut scene, Point::new(75.0, -25.0));
        let SceneObject::Circle(circle) = scene.get(id).unwrap() else {
            panic!("expected circle");
        };
        assert!((circle.radius - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_selection_ignores_handles() {
        let mut scene = Scene::new();
        let text_id = scene.add(SceneObject::Text(Text::default()));
        let mut controller = InteractionController::default();
        controller.pointer_down(&mut scene, Point::new(110.0, 90.0), &ApproxTextMeasure);
        assert_eq!(
            controller.state(),
            InteractionState::Dragging {
                id: text_id,
                offset: Vec2::new(10.0, -10.0)
            }
        );
    }

    #[test]
    fn test_move_without_interaction_is_noop() {
        let (mut scene, id) = scene_with_rect();
        let mut controller = InteractionController::default();
        let response = controller.pointer_move(&mut scene, Point::new(10.0, 10.0));
        assert_eq!(response, Response::default());
        assert_eq!(position(&scene, id), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_double_click_edits_text() {
        let mut scene = Scene::new();
        let id = scene.add(SceneObject::Text(Text::default()));
        let mut controller = InteractionController::default();

        let response = controller.double_click(&scene, Point::new(110.0, 90.0), &ApproxTextMeasure);
        assert_eq!(response.edit_request, Some(id));
        assert_eq!(controller.state(), InteractionState::EditingText { id });

        let response = controller.commit_text(&mut scene, Some("Grand Opening".to_string()));
        assert!(response.commit);
        assert_eq!(scene.get(id).and_then(|o| o.as_text()).map(|t| t.content()), Some("Grand Opening"));
        assert!(controller.is_idle());
    }

    #[test]
    fn test_cancelled_text_edit_keeps_content() {
        let mut scene = Scene::new();
        let id = scene.add(SceneObject::Text(Text::default()));
        let mut controller = InteractionController::default();
        controller.double_click(&scene, Point::new(110.0, 90.0), &ApproxTextMeasure);

        let response = controller.commit_text(&mut scene, None);
        assert!(!response.commit);
        assert_eq!(
            scene.get(id).and_then(|o| o.as_text()).map(|t| t.content()),
            Some("Double click to edit")
        );
    }

    #[test]
    fn test_double_click_on_shape_does_nothing() {
        let (scene, _) = scene_with_rect();
        let mut controller = InteractionController::default();
        let response = controller.double_click(&scene, Point::new(150.0, 150.0), &ApproxTextMeasure);
        assert_eq!(response.edit_request, None);
        assert!(controller.is_idle());
    }
}
