//! FlyerKit Core Library
//!
//! Scene model, hit-testing, interaction, history and persistence for the
//! FlyerKit flyer editor. Rendering lives in `flyerkit-render`.

pub mod background;
pub mod config;
pub mod decode;
pub mod document;
pub mod editor;
pub mod history;
pub mod interaction;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod templates;
pub mod viewport;

pub use background::{Background, ColorStop, GradientAxis, pattern_tile, CHECKER_TILE};
pub use config::{ConfigError, EditorConfig};
pub use decode::{DecodeError, DecodeQueue, RequestId};
pub use document::{Document, DocumentError, Project};
pub use editor::{Editor, EditorEvent};
pub use history::{History, Snapshot, MAX_UNDO_HISTORY};
pub use interaction::{InteractionController, InteractionState, Response};
pub use scene::{Direction, Scene};
pub use selection::{Handle, HandleKind, HANDLE_HIT_THRESHOLD, HANDLE_SIZE};
pub use shapes::{ObjectId, ObjectKind, ObjectStyle, ObjectTrait, Rgba, SceneObject, TextMeasure};
pub use snap::{snap_to_grid, GRID_SIZE};
pub use templates::Template;
pub use viewport::Viewport;
