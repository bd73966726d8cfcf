pub mod bootstrap;
pub mod context;
pub mod pipeline;
pub mod steps;

pub use crate::domain::model::{CommandOutput, Invocation, StepOutcome, StepPolicy, StepReport};
pub use crate::domain::ports::CommandRunner;
pub use crate::utils::error::Result;
