pub mod contracts;
pub mod genai;
pub mod playback;
pub mod runtime;

pub use contracts::*;
pub use genai::*;
pub use playback::*;
pub use runtime::*;
