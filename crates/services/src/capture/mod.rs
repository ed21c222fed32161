mod engine;
mod page;
mod runtime;
mod validator;
mod writer;

// Public API of the capture subsystem.
pub use crate::error::SettingsError;
pub use engine::{CaptureEngine, CaptureSettings, CaptureState, PollDirective};
pub use page::PageSnapshot;
pub use runtime::{CaptureEvent, CaptureOutcome, CaptureService};
pub use validator::{extract_settings, is_default_mode, parse_countdown};
pub use writer::{StoreWriter, WriterConfig};
