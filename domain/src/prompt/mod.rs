//! Prompt domain
//!
//! Text handed to evaluators, agents, the gate and the synthesis node.

mod template;

pub use template::PromptTemplate;
