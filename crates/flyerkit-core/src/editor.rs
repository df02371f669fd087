//! Editor facade: owns the scene and routes every user command through
//! interaction, history and image decoding.

use crate::background::Background;
use crate::config::EditorConfig;
use crate::decode::{DecodeError, DecodeQueue, DecodeResult, DecodeTarget, RequestId};
use crate::document::{Document, DocumentResult, Project};
use crate::history::{History, Snapshot};
use crate::interaction::{InteractionController, Response};
use crate::scene::{Direction, Scene};
use crate::shapes::{
    ApproxTextMeasure, Circle, DecodedImage, FontStyle, FontWeight, Image, ImageState, ObjectId,
    ObjectTrait, Rectangle, Rgba, SceneObject, Text, TextAlign, TextMeasure, Triangle,
};
use crate::templates::Template;
use crate::viewport::Viewport;
use kurbo::Point;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Notifications for the embedding UI, collected until drained.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// Selection changed; carries a copy of the newly selected object.
    SelectionChanged(Option<SceneObject>),
    /// A text object wants new content (answer with `commit_text_edit`).
    TextEditRequested { id: ObjectId, current: String },
    /// An image request finished and the object was added.
    ImageAdded { request: RequestId, id: ObjectId },
    /// An image request failed; the scene is unchanged.
    ImageFailed { request: RequestId, error: DecodeError },
    /// A document replaced the scene.
    DocumentLoaded { objects: usize },
}

/// The editing session.
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    history: History,
    viewport: Viewport,
    controller: InteractionController,
    decoder: DecodeQueue,
    measure: Box<dyn TextMeasure + Send>,
    /// Bumped whenever the scene is replaced wholesale; older decode results are dropped.
    generation: u64,
    next_request: u64,
    events: Vec<EditorEvent>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let scene = Scene::new();
        let mut history = History::new(config.history_limit);
        history.record(Snapshot::capture(&scene));
        Self {
            controller: InteractionController::new(&config),
            decoder: DecodeQueue::new(config.image_base_dir.clone()),
            config,
            scene,
            history,
            viewport: Viewport::new(),
            measure: Box::new(ApproxTextMeasure),
            generation: 0,
            next_request: 0,
            events: Vec::new(),
        }
    }

    /// Use a different text measurer for hit-testing and selection bounds.
    pub fn with_measure(mut self, measure: impl TextMeasure + Send + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    pub fn selected(&self) -> Option<&SceneObject> {
        self.scene.selected_object()
    }

    // Objects

    /// Append an object on top, select it and record a snapshot.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        let kind = object.kind();
        let id = self.scene.add(object);
        log::debug!("Added {} {}", kind.name(), id);
        self.commit();
        self.emit_selection();
        id
    }

    pub fn add_rect(&mut self) -> ObjectId {
        self.add_object(SceneObject::Rect(Rectangle::default()))
    }

    pub fn add_circle(&mut self) -> ObjectId {
        self.add_object(SceneObject::Circle(Circle::default()))
    }

    pub fn add_triangle(&mut self) -> ObjectId {
        self.add_object(SceneObject::Triangle(Triangle::default()))
    }

    pub fn add_text(&mut self) -> ObjectId {
        self.add_object(SceneObject::Text(Text::default()))
    }

    /// Start decoding an image. The object is added when `poll_decodes` sees the result.
    pub fn request_image(&mut self, source: impl Into<String>) -> RequestId {
        let request = RequestId(self.next_request);
        self.next_request += 1;
        self.decoder
            .submit(DecodeTarget::NewImage(request), self.generation, source);
        request
    }

    /// Delete the selected object.
    pub fn remove_selected(&mut self) -> Option<SceneObject> {
        let id = self.scene.selected()?;
        let removed = self.scene.remove(id)?;
        self.controller.reset();
        self.commit();
        self.emit_selection();
        Some(removed)
    }

    /// Delete the object at a paint-order index.
    pub fn remove_at(&mut self, index: usize) -> Option<SceneObject> {
        let was_selected = self.scene.selected();
        let removed = self.scene.remove_at(index)?;
        self.controller.reset();
        self.commit();
        if self.scene.selected() != was_selected {
            self.emit_selection();
        }
        Some(removed)
    }

    /// Select an object (or nothing). Returns true if the selection changed.
    pub fn select(&mut self, id: Option<ObjectId>) -> bool {
        let changed = self.scene.select(id);
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn set_background(&mut self, background: Background) {
        log::debug!("Background set to {}", background.kind_name());
        self.scene.set_background(background);
        self.commit();
    }

    /// Move the selected object one layer up or down.
    pub fn reorder_selected(&mut self, direction: Direction) -> bool {
        match self.scene.selected() {
            Some(id) => self.reorder(id, direction),
            None => false,
        }
    }

    pub fn reorder(&mut self, id: ObjectId, direction: Direction) -> bool {
        let moved = self.scene.reorder(id, direction);
        if moved {
            self.commit();
        }
        moved
    }

    // Scene lifecycle

    /// Remove every object and reset the background. History is left alone.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.controller.reset();
        self.scene.clear();
        self.emit_selection();
    }

    /// Start from an empty scene with a fresh history.
    pub fn new_project(&mut self) {
        self.generation += 1;
        self.controller.reset();
        self.scene.clear();
        self.history.reset(Snapshot::capture(&self.scene));
        self.emit_selection();
    }

    /// Replace the scene with a preset layout; undoable.
    pub fn apply_template(&mut self, template: Template) {
        log::info!("Applying {} template", template);
        self.generation += 1;
        self.controller.reset();
        let (objects, background) = template.build();
        self.scene.replace(objects, background);
        self.commit();
        self.emit_selection();
    }

    // History

    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, snapshot: Snapshot) {
        // Reuse pixels of images that survive the restore unchanged
        let decoded: HashMap<(ObjectId, String), Arc<DecodedImage>> = self
            .scene
            .iter()
            .filter_map(|o| o.as_image())
            .filter_map(|image| {
                let source = image.source.clone()?;
                image.pixels().map(|px| ((image.id(), source), px.clone()))
            })
            .collect();

        self.controller.reset();
        self.scene.replace(snapshot.objects, snapshot.background);
        for object in self.scene.objects_mut() {
            if let SceneObject::Image(image) = object {
                if let Some(px) = image
                    .source
                    .clone()
                    .and_then(|source| decoded.get(&(image.id(), source)))
                {
                    image.state = ImageState::Ready(px.clone());
                }
            }
        }
        self.submit_pending_images();
        self.emit_selection();
    }

    // Viewport and settings

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.viewport.set_zoom(zoom)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.viewport.zoom_out()
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.config.snap_to_grid = enabled;
        self.controller.snap_to_grid = enabled;
    }

    // Property edits on the selection

    pub fn set_fill(&mut self, fill: Option<Rgba>) -> bool {
        self.update_selected(|object| replace(&mut object.style_mut().fill, fill))
    }

    pub fn set_stroke(&mut self, stroke: Option<Rgba>) -> bool {
        self.update_selected(|object| replace(&mut object.style_mut().stroke, stroke))
    }

    pub fn set_stroke_width(&mut self, width: f64) -> bool {
        if !width.is_finite() {
            return false;
        }
        self.update_selected(|object| replace(&mut object.style_mut().stroke_width, width.max(0.0)))
    }

    pub fn set_opacity(&mut self, opacity: f64) -> bool {
        if opacity.is_nan() {
            return false;
        }
        self.update_selected(|object| {
            replace(&mut object.style_mut().opacity, opacity.clamp(0.0, 1.0))
        })
    }

    pub fn set_font_family(&mut self, family: &str) -> bool {
        self.update_text(|text| replace(&mut text.font_family, family.to_string()))
    }

    pub fn set_font_size(&mut self, size: f64) -> bool {
        if !(size > 0.0 && size.is_finite()) {
            return false;
        }
        self.update_text(|text| replace(&mut text.font_size, size))
    }

    pub fn set_text_color(&mut self, color: Rgba) -> bool {
        self.update_text(|text| replace(&mut text.style.fill, Some(color)))
    }

    pub fn toggle_bold(&mut self) -> bool {
        self.update_text(|text| {
            text.font_weight = match text.font_weight {
                FontWeight::Normal => FontWeight::Bold,
                FontWeight::Bold => FontWeight::Normal,
            };
            true
        })
    }

    pub fn toggle_italic(&mut self) -> bool {
        self.update_text(|text| {
            text.font_style = match text.font_style {
                FontStyle::Normal => FontStyle::Italic,
                FontStyle::Italic => FontStyle::Normal,
            };
            true
        })
    }

    pub fn toggle_underline(&mut self) -> bool {
        self.update_text(|text| {
            text.underline = !text.underline;
            true
        })
    }

    pub fn set_text_align(&mut self, align: TextAlign) -> bool {
        self.update_text(|text| replace(&mut text.align, align))
    }

    fn update_selected(&mut self, edit: impl FnOnce(&mut SceneObject) -> bool) -> bool {
        let Some(object) = self.scene.selected_object_mut() else {
            return false;
        };
        let changed = edit(object);
        if changed {
            self.commit();
        }
        changed
    }

    fn update_text(&mut self, edit: impl FnOnce(&mut Text) -> bool) -> bool {
        self.update_selected(|object| object.as_text_mut().is_some_and(edit))
    }

    // Pointer input (screen coordinates)

    pub fn pointer_down(&mut self, screen: Point) -> Response {
        let point = self.viewport.screen_to_canvas(screen);
        let response = self
            .controller
            .pointer_down(&mut self.scene, point, self.measure.as_ref());
        self.handle_response(response)
    }

    pub fn pointer_move(&mut self, screen: Point) -> Response {
        let point = self.viewport.screen_to_canvas(screen);
        let response = self.controller.pointer_move(&mut self.scene, point);
        self.handle_response(response)
    }

    pub fn pointer_up(&mut self) -> Response {
        let response = self.controller.pointer_up();
        self.handle_response(response)
    }

    pub fn double_click(&mut self, screen: Point) -> Response {
        let point = self.viewport.screen_to_canvas(screen);
        let response = self
            .controller
            .double_click(&self.scene, point, self.measure.as_ref());
        self.handle_response(response)
    }

    /// Answer a text edit request. `None` cancels the edit.
    pub fn commit_text_edit(&mut self, value: Option<String>) -> bool {
        let response = self.controller.commit_text(&mut self.scene, value);
        self.handle_response(response).commit
    }

    fn handle_response(&mut self, response: Response) -> Response {
        if response.selection_changed {
            self.emit_selection();
        }
        if response.commit {
            self.commit();
        }
        if let Some(id) = response.edit_request {
            if let Some(text) = self.scene.get(id).and_then(|o| o.as_text()) {
                self.events.push(EditorEvent::TextEditRequested {
                    id,
                    current: text.content.clone(),
                });
            }
        }
        response
    }

    // Documents

    pub fn to_document(&self) -> Document {
        Document::from_scene(&self.scene)
    }

    pub fn to_project(&self) -> Project {
        Project::now(self.to_document())
    }

    /// Replace the scene with a document and start a fresh history.
    pub fn load_document(&mut self, document: Document) {
        self.generation += 1;
        self.controller.reset();
        self.scene = document.into_scene();
        self.history.reset(Snapshot::capture(&self.scene));
        self.submit_pending_images();
        log::info!("Loaded document with {} objects", self.scene.len());
        self.events.push(EditorEvent::DocumentLoaded {
            objects: self.scene.len(),
        });
        self.emit_selection();
    }

    /// Parse a document or project. On error the scene is left untouched.
    pub fn load_json(&mut self, json: &str) -> DocumentResult<()> {
        let document = Document::from_json_any(json)?;
        self.load_document(document);
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> DocumentResult<()> {
        let document = Document::load(path)?;
        self.load_document(document);
        Ok(())
    }

    // Image decoding

    /// Apply every decode result that is ready. Returns how many changed the scene.
    pub fn poll_decodes(&mut self) -> usize {
        let results = self.decoder.try_recv_all();
        results
            .into_iter()
            .map(|result| self.apply_decode(result))
            .filter(|applied| *applied)
            .count()
    }

    /// Block until all submitted decodes are applied or `timeout` passes.
    /// Returns true if nothing is left in flight.
    pub fn wait_for_decodes(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.decoder.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.decoder.recv_timeout(remaining) {
                Some(result) => {
                    self.apply_decode(result);
                }
                None => break,
            }
        }
        let done = self.decoder.in_flight() == 0;
        if !done {
            log::warn!("{} image decodes still pending", self.decoder.in_flight());
        }
        done
    }

    pub fn pending_decodes(&self) -> usize {
        self.decoder.in_flight()
    }

    fn apply_decode(&mut self, result: DecodeResult) -> bool {
        if result.generation != self.generation {
            log::debug!(
                "Dropping stale decode {:?} (generation {} != {})",
                result.target,
                result.generation,
                self.generation
            );
            return false;
        }

        match result.target {
            DecodeTarget::NewImage(request) => match result.outcome {
                Ok(decoded) => {
                    let id = self.scene.add(SceneObject::Image(Image::from_decoded(
                        result.source,
                        decoded,
                    )));
                    self.controller.reset();
                    self.commit();
                    self.events.push(EditorEvent::ImageAdded { request, id });
                    self.emit_selection();
                    true
                }
                Err(error) => {
                    log::warn!("Image request {:?} failed: {}", request, error);
                    self.events.push(EditorEvent::ImageFailed { request, error });
                    false
                }
            },
            DecodeTarget::Object(id) => {
                let Some(SceneObject::Image(image)) = self.scene.get_mut(id) else {
                    return false;
                };
                if !image.is_pending() || image.source.as_deref() != Some(result.source.as_str()) {
                    return false;
                }
                image.state = match result.outcome {
                    Ok(decoded) => ImageState::Ready(decoded),
                    Err(e) => ImageState::Failed(e.to_string()),
                };
                true
            }
        }
    }

    fn submit_pending_images(&mut self) {
        let mut jobs = Vec::new();
        for object in self.scene.objects_mut() {
            let SceneObject::Image(image) = object else {
                continue;
            };
            if !image.is_pending() {
                continue;
            }
            match &image.source {
                Some(source) => jobs.push((image.id(), source.clone())),
                None => {
                    log::warn!("Image {} has no source", image.id());
                    image.state = ImageState::Failed("no image source".to_string());
                }
            }
        }
        for (id, source) in jobs {
            self.decoder
                .submit(DecodeTarget::Object(id), self.generation, source);
        }
    }

    // Events

    /// Take all notifications raised since the last call.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit_selection(&mut self) {
        let selected = self.scene.selected_object().cloned();
        self.events.push(EditorEvent::SelectionChanged(selected));
    }

    /// Record a snapshot unless the scene matches the current one.
    fn commit(&mut self) -> bool {
        let snapshot = Snapshot::capture(&self.scene);
        if self
            .history
            .current()
            .is_some_and(|current| current.same_contents(&snapshot))
        {
            return false;
        }
        self.history.record(snapshot);
        true
    }
}

/// Assign and report whether the value changed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::{ColorStop, GradientAxis};
    use base64::{Engine, engine::general_purpose::STANDARD};

    const WAIT: Duration = Duration::from_secs(5);

    fn png_data_uri(width: u32, height: u32) -> String {
        let mut data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut data, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            let pixels = vec![200u8; (width * height * 4) as usize];
            writer.write_image_data(&pixels).unwrap();
        }
        format!("data:image/png;base64,{}", STANDARD.encode(&data))
    }

    fn selection_events(events: &[EditorEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, EditorEvent::SelectionChanged(_)))
            .count()
    }

    #[test]
    fn test_add_appends_and_selects() {
        let mut editor = Editor::default();
        let rect = editor.add_rect();
        let circle = editor.add_circle();
        assert_eq!(editor.scene().len(), 2);
        assert_eq!(editor.scene().selected(), Some(circle));
        assert_eq!(editor.scene().index_of(rect), Some(0));

        let events = editor.drain_events();
        assert_eq!(selection_events(&events), 2);
        assert!(matches!(
            events.last(),
            Some(EditorEvent::SelectionChanged(Some(SceneObject::Circle(_))))
        ));
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn test_undo_restores_every_kind() {
        let mut editor = Editor::default();
        editor.add_rect();
        editor.add_circle();
        editor.add_triangle();
        editor.add_text();
        editor.add_object(SceneObject::Image(Image::new(
            Point::new(40.0, 40.0),
            120.0,
            80.0,
            "logo.png",
        )));
        let before = Snapshot::capture(editor.scene());

        assert!(editor.set_opacity(0.5));
        assert!(editor.set_stroke_width(6.0));
        let text = editor.scene().objects()[3].id();
        editor.select(Some(text));
        assert!(editor.set_text_color(Rgba::from_hex(0xff0000)));
        editor.set_background(Background::sunset());
        for _ in 0..4 {
            assert!(editor.undo());
        }

        assert!(Snapshot::capture(editor.scene()).same_contents(&before));
        for _ in 0..4 {
            assert!(editor.redo());
        }
        assert_eq!(editor.scene().background, Background::sunset());
        let image = editor.scene().objects()[4].as_image().unwrap();
        assert!((image.style.opacity - 0.5).abs() < f64::EPSILON);
        assert!((image.style.stroke_width - 6.0).abs() < f64::EPSILON);
        assert!(!editor.redo());
    }

    #[test]
    fn test_undo_on_initial_state_is_noop() {
        let mut editor = Editor::default();
        assert!(!editor.can_undo());
        assert!(!editor.undo());
        editor.add_rect();
        assert!(editor.undo());
        assert!(editor.scene().is_empty());
        assert!(!editor.undo());
    }

    #[test]
    fn test_history_is_capped() {
        let mut editor = Editor::default();
        for _ in 0..60 {
            editor.add_rect();
        }
        let mut undos = 0;
        while editor.undo() {
            undos += 1;
        }
        assert_eq!(undos, 49);
        assert_eq!(editor.scene().len(), 11);
    }

    #[test]
    fn test_pointer_hit_and_miss() {
        let mut editor = Editor::default();
        let rect = editor.add_rect();
        editor.select(None);

        editor.pointer_down(Point::new(150.0, 150.0));
        editor.pointer_up();
        assert_eq!(editor.scene().selected(), Some(rect));

        editor.pointer_down(Point::new(400.0, 400.0));
        editor.pointer_up();
        assert_eq!(editor.scene().selected(), None);
    }

    #[test]
    fn test_click_without_movement_adds_no_history() {
        let mut editor = Editor::default();
        editor.add_rect();
        let entries = editor.history().len();
        editor.pointer_down(Point::new(150.0, 150.0));
        editor.pointer_up();
        assert_eq!(editor.history().len(), entries);
    }

    #[test]
    fn test_drag_commits_and_undoes() {
        let mut editor = Editor::default();
        let rect = editor.add_rect();
        editor.pointer_down(Point::new(150.0, 150.0));
        editor.pointer_move(Point::new(170.0, 160.0));
        editor.pointer_up();
        assert_eq!(editor.scene().get(rect).map(|o| o.position()), Some(Point::new(120.0, 110.0)));

        assert!(editor.undo());
        assert_eq!(editor.scene().get(rect).map(|o| o.position()), Some(Point::new(100.0, 100.0)));
    }

    #[test]
    fn test_drag_snaps_when_enabled() {
        let mut editor = Editor::default();
        let rect = editor.add_rect();
        editor.select(None);
        editor.set_snap_to_grid(true);
        editor.pointer_down(Point::new(100.0, 100.0));
        editor.pointer_move(Point::new(107.0, 193.0));
        editor.pointer_up();
        assert_eq!(editor.scene().get(rect).map(|o| o.position()), Some(Point::new(100.0, 200.0)));
    }

    #[test]
    fn test_zoom_maps_pointer_to_canvas() {
        let mut editor = Editor::default();
        let rect = editor.add_rect();
        editor.select(None);
        editor.set_zoom(2.0);
        // Screen (300, 300) is canvas (150, 150)
        editor.pointer_down(Point::new(300.0, 300.0));
        assert_eq!(editor.scene().selected(), Some(rect));
    }

    #[test]
    fn test_circle_radius_floor() {
        let mut editor = Editor::default();
        let circle = editor.add_circle();
        editor.pointer_down(Point::new(275.0, 175.0));
        editor.pointer_move(Point::new(0.0, 0.0));
        editor.pointer_up();
        let Some(SceneObject::Circle(c)) = editor.scene().get(circle) else {
            panic!("expected circle");
        };
        assert!((c.radius - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reorder_selected() {
        let mut editor = Editor::default();
        let a = editor.add_rect();
        let b = editor.add_rect();
        editor.select(Some(a));
        assert!(editor.reorder_selected(Direction::Up));
        let order: Vec<_> = editor.scene().iter().map(|o| o.id()).collect();
        assert_eq!(order, vec![b, a]);
        assert!(!editor.reorder_selected(Direction::Up));
    }

    #[test]
    fn test_text_edit_flow() {
        let mut editor = Editor::default();
        let id = editor.add_text();
        editor.drain_events();

        editor.double_click(Point::new(110.0, 90.0));
        let events = editor.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            EditorEvent::TextEditRequested { id: edit_id, current } if *edit_id == id && current == "Double click to edit"
        )));

        assert!(editor.commit_text_edit(Some("Summer Fair".to_string())));
        assert_eq!(
            editor.scene().get(id).and_then(|o| o.as_text()).map(|t| t.content().to_string()),
            Some("Summer Fair".to_string())
        );
        assert!(editor.undo());
        assert_eq!(
            editor.scene().get(id).and_then(|o| o.as_text()).map(|t| t.content().to_string()),
            Some("Double click to edit".to_string())
        );
    }

    #[test]
    fn test_property_setters() {
        let mut editor = Editor::default();
        editor.add_rect();
        // Clamped to the current value, so nothing changes
        assert!(!editor.set_opacity(2.0));
        assert!(editor.set_opacity(0.4));
        assert!(!editor.set_opacity(0.4));
        assert!(editor.set_stroke_width(5.0));
        // Text-only setters do nothing on shapes
        assert!(!editor.toggle_bold());

        editor.add_text();
        assert!(editor.toggle_bold());
        assert!(editor.toggle_underline());
        assert!(editor.set_text_align(TextAlign::Center));
        assert!(!editor.set_font_size(0.0));
        assert!(editor.set_font_family("Georgia"));
        let text = editor.selected().and_then(|o| o.as_text()).unwrap();
        assert!(text.is_bold());
        assert!(text.underline);
        assert_eq!(text.align, TextAlign::Center);

        editor.select(None);
        assert!(!editor.set_fill(Some(Rgba::black())));
    }

    #[test]
    fn test_remove_selected() {
        let mut editor = Editor::default();
        editor.add_rect();
        assert!(editor.remove_selected().is_some());
        assert!(editor.scene().is_empty());
        assert!(editor.remove_selected().is_none());
        assert!(editor.undo());
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn test_document_roundtrip() {
        let mut editor = Editor::default();
        editor.add_rect();
        editor.add_text();
        editor.set_background(Background::gradient(
            vec![
                ColorStop::new(0.0, Rgba::white()),
                ColorStop::new(1.0, Rgba::black()),
            ],
            GradientAxis::Horizontal,
        ));
        let json = editor.to_project().to_json().unwrap();

        let mut other = Editor::default();
        other.load_json(&json).unwrap();
        assert!(Snapshot::capture(other.scene()).same_contents(&Snapshot::capture(editor.scene())));
        assert!(!other.can_undo());
        assert!(other
            .drain_events()
            .iter()
            .any(|e| matches!(e, EditorEvent::DocumentLoaded { objects: 2 })));
    }

    #[test]
    fn test_failed_load_keeps_scene() {
        let mut editor = Editor::default();
        editor.add_rect();
        assert!(editor.load_json("{\"objects\": [{\"kind\": \"blob\"}]}").is_err());
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn test_non_ascii_color_fails_load() {
        let mut editor = Editor::default();
        editor.add_rect();
        let json = r##"{"objects": [{"kind": "rect", "x": 0, "y": 0, "width": 50,
            "height": 50, "fill": "#é1"}]}"##;
        assert!(editor.load_json(json).is_err());
        let json = r##"{"objects": [], "background": "#ééé"}"##;
        assert!(editor.load_json(json).is_ok());
        assert_eq!(editor.scene().background, Background::white());
    }

    #[test]
    fn test_duplicate_ids_drag_the_top_object() {
        let mut editor = Editor::default();
        let json = r#"{"objects": [
            {"kind": "rect", "id": "0b7e4c9a-1d2f-4e3a-8b5c-6d7e8f9a0b1c", "x": 0, "y": 0,
             "width": 100, "height": 100},
            {"kind": "rect", "id": "0b7e4c9a-1d2f-4e3a-8b5c-6d7e8f9a0b1c", "x": 300, "y": 300,
             "width": 100, "height": 100}
        ]}"#;
        editor.load_json(json).unwrap();

        editor.pointer_down(Point::new(310.0, 310.0));
        editor.pointer_move(Point::new(410.0, 410.0));
        editor.pointer_up();

        let positions: Vec<Point> = editor.scene().iter().map(|o| o.position()).collect();
        assert_eq!(positions, vec![Point::new(0.0, 0.0), Point::new(400.0, 400.0)]);
    }

    #[test]
    fn test_apply_template_is_undoable() {
        let mut editor = Editor::default();
        editor.add_circle();
        editor.apply_template(Template::Sale);
        assert_eq!(editor.scene().len(), 4);
        assert!(editor.undo());
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn test_new_project_resets_history() {
        let mut editor = Editor::default();
        editor.add_rect();
        editor.new_project();
        assert!(editor.scene().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_image_request_adds_object() {
        let mut editor = Editor::default();
        let request = editor.request_image(png_data_uri(2, 1));
        assert!(editor.wait_for_decodes(WAIT));

        assert_eq!(editor.scene().len(), 1);
        let image = editor.scene().objects()[0].as_image().unwrap();
        assert!(image.pixels().is_some());
        assert!((image.width - 300.0).abs() < f64::EPSILON);
        assert!((image.height - 150.0).abs() < f64::EPSILON);
        assert!(editor
            .drain_events()
            .iter()
            .any(|e| matches!(e, EditorEvent::ImageAdded { request: r, .. } if *r == request)));
    }

    #[test]
    fn test_image_failure_leaves_scene() {
        let mut editor = Editor::default();
        let request = editor.request_image("data:text/plain,nope");
        assert!(editor.wait_for_decodes(WAIT));
        assert!(editor.scene().is_empty());
        assert!(editor
            .drain_events()
            .iter()
            .any(|e| matches!(e, EditorEvent::ImageFailed { request: r, .. } if *r == request)));
    }

    #[test]
    fn test_stale_decode_dropped_after_clear() {
        let mut editor = Editor::default();
        editor.request_image(png_data_uri(4, 4));
        editor.clear();
        assert!(editor.wait_for_decodes(WAIT));
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn test_loaded_images_decode_again() {
        let mut editor = Editor::default();
        editor.request_image(png_data_uri(2, 2));
        assert!(editor.wait_for_decodes(WAIT));
        let json = editor.to_document().to_json().unwrap();

        let mut other = Editor::default();
        other.load_json(&json).unwrap();
        assert!(other.scene().objects()[0].as_image().unwrap().is_pending());
        assert!(other.wait_for_decodes(WAIT));
        assert!(other.scene().objects()[0].as_image().unwrap().pixels().is_some());
    }

    #[test]
    fn test_undo_keeps_decoded_pixels() {
        let mut editor = Editor::default();
        editor.request_image(png_data_uri(2, 2));
        assert!(editor.wait_for_decodes(WAIT));
        editor.add_rect();
        assert!(editor.undo());
        let image = editor.scene().objects()[0].as_image().unwrap();
        assert!(image.pixels().is_some());
        assert_eq!(editor.pending_decodes(), 0);
    }
}
