pub mod backend;
pub mod comments;
pub mod config;
pub mod controller;
pub mod error;

pub use backend::{GenieBackend, HttpGenieBackend};
pub use comments::{CommentPicker, CommentTable};
pub use config::{load_settings, normalize_backend_url, ClientSettings};
pub use controller::{ControllerEvent, GameSnapshot, RoundHandle, RoundOutcome, SessionController};
pub use error::{BackendError, RoundRejected};
