//! Plain data types shared by the projector, selection model and engine.

mod column;
mod selection;

pub use column::*;
pub use selection::*;
