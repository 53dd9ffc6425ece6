pub mod alarm;
pub mod audio_library;
pub mod authentication;
pub mod streaming;

pub use alarm::{Alarm, AlarmAction};
pub use audio_library::{AudioLibrary, CustomAudio, SyncOutcome};
pub use authentication::Authentication;
pub use streaming::Streaming;
