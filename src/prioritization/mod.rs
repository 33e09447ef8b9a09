//! Task prioritization through a hosted model.
//!
//! - [`prompt`]: renders tasks and context into model input segments.
//! - [`schema`]: the `prioritize_tasks` function declaration and system instruction.
//! - [`gateway`]: calls the model and validates its structured answer.

pub mod error;
pub mod gateway;
pub mod prompt;
pub mod schema;
pub mod types;

pub use error::{PrioritizeError, PrioritizeResult};
pub use gateway::PrioritizationGateway;
pub use prompt::build_prompt_segments;
pub use types::{PrioritizeRequest, PrioritizeResponse, PrioritizedTask};
