pub mod bus;
pub mod config;
pub mod editing;
pub mod editor;
pub mod error;
pub mod export;
pub mod media;
pub mod playback;
pub mod project;
pub mod snapping;
pub mod types;

pub use editor::Editor;
pub use error::{CoreError, Result};
