//! Process-wide plumbing shared by every pipeline: the state cell between a
//! monitor and its indicator, blink timing, and shutdown signalling.

pub mod cancel;
pub mod state;
pub mod time;

pub use state::{StateCell, StateReader, StateWriter};
