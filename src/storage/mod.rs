pub mod buffer;
pub mod debug;
pub mod fragments;
pub mod repr;
pub mod source;

pub use buffer::{AsBuffer, Buffer};
pub use debug::debug_decoder;
pub use fragments::Fragments;
pub use repr::{BufferState, LineState, Limits, Phase, PhaseMarker, Progress};
pub use source::{BufferedSource, CompletionListener, NoListener, Shared};
