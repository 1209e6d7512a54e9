//! The execution engine: entity contract, interaction interceptor, replay
//! driver, and the public `Execution` surface.

pub mod entity;
pub mod execution;
pub mod intercept;
mod output;
mod replay;

pub use entity::{Entity, StateError};
pub use execution::Execution;
pub use intercept::{CallContext, Interrupt};
