pub mod commands;
pub mod constants;
pub mod convert;
pub mod error;
pub mod stream;
pub mod vigi;

pub use commands::*;
pub use convert::AudioConverter;
pub use error::{Result, VigiError};
pub use stream::CameraStream;
pub use vigi::{CameraConfig, VigiCam};
