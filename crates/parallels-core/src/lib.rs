pub mod config;
pub mod corpus;
pub mod error;
pub mod html;
pub mod loader;
pub mod panel;
pub mod parallels;
pub mod passage;
pub mod render;

// Re-export main types for convenience
pub use config::Config;
pub use error::{BuildError, LoadError, SourceError};
pub use loader::{load, Loaded, Source, LOAD_FAILURE_MESSAGE};
pub use panel::{ClickTarget, Controller, PanelState, Transition};
pub use parallels::{ParallelEntry, ParallelMapping};
pub use passage::{parse_document, Chapter, Document, Verse, VerseRef};
pub use render::{render_document, Marker, RenderOp};
