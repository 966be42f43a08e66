//! Canvass builder session layer.
//!
//! Wires the pure core engine to the asynchronous world around it:
//!
//! - [`BuilderSession`] — the event-driven façade translating UI intents
//!   into core operations, with validation and step completion kept fresh
//!   after every mutation.
//! - [`Autosaver`] — debounced draft flushing with latest-snapshot
//!   semantics and cancellation on unmount.
//! - [`source`] — async collaborator traits for the catalog, the draft
//!   store, and the study-creation API.

pub mod autosave;
pub mod error;
pub mod session;
pub mod source;

pub use autosave::{Autosaver, AutosaveConfig};
pub use error::SessionError;
pub use session::{BuilderSession, DragEvent, SubmitResult};
pub use source::{CatalogSource, DraftStore, StudyReceipt, StudySink};
