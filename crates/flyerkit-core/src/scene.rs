//! Ordered scene of objects with a background and a single selection.

use crate::background::Background;
use crate::shapes::{ObjectId, ObjectTrait, SceneObject, TextMeasure};
use kurbo::Point;

/// Layer movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the front (drawn later).
    Up,
    /// Towards the back (drawn earlier).
    Down,
}

/// Objects in paint order (back to front), the background and the selection.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    /// Background painted before any object.
    pub background: Background,
    selected: Option<ObjectId>,
}

impl Scene {
    /// Create a new empty scene with a white background.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from parts; nothing is selected.
    pub fn from_parts(objects: Vec<SceneObject>, background: Background) -> Self {
        Self {
            objects,
            background,
            selected: None,
        }
    }

    /// Append an object on top and select it.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id();
        self.objects.push(object);
        self.selected = Some(id);
        id
    }

    /// Remove an object; clears the selection if it pointed at it.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        self.remove_at(index)
    }

    /// Remove the object at a paint-order index.
    pub fn remove_at(&mut self, index: usize) -> Option<SceneObject> {
        if index >= self.objects.len() {
            return None;
        }
        let object = self.objects.remove(index);
        if self.selected == Some(object.id()) {
            self.selected = None;
        }
        Some(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    /// Objects in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub(crate) fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// Swap an object with its neighbour.
    /// Returns false if the object is unknown or already at that end.
    pub fn reorder(&mut self, id: ObjectId, direction: Direction) -> bool {
        let Some(pos) = self.index_of(id) else {
            return false;
        };
        match direction {
            Direction::Up if pos + 1 < self.objects.len() => {
                self.objects.swap(pos, pos + 1);
                true
            }
            Direction::Down if pos > 0 => {
                self.objects.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    /// Change the selection. Unknown ids clear it.
    /// Returns true if the selection changed.
    pub fn select(&mut self, id: Option<ObjectId>) -> bool {
        let next = id.filter(|&id| self.index_of(id).is_some());
        let changed = next != self.selected;
        self.selected = next;
        changed
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_object_mut(&mut self) -> Option<&mut SceneObject> {
        let id = self.selected?;
        self.get_mut(id)
    }

    /// Topmost object containing the point.
    pub fn object_at(&self, point: Point, measure: &dyn TextMeasure) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.contains_point(point, measure))
            .map(|o| o.id())
    }

    /// Remove every object and reset the background to white.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.selected = None;
        self.background = Background::white();
    }

    /// Replace objects and background, clearing the selection.
    pub fn replace(&mut self, objects: Vec<SceneObject>, background: Background) {
        self.objects = objects;
        self.background = background;
        self.selected = None;
    }
}
