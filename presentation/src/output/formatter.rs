//! Output formatter trait

use council_application::{PlanTaskOutput, RunFailure};
use council_domain::{FanoutWithGatedRefinementResponse, OutputFormat};

/// Renders council results in one of the supported formats
pub trait OutputFormatter {
    /// Render the result of `plan`
    fn plan(&self, output: &PlanTaskOutput, format: OutputFormat) -> String;

    /// Render a completed `orchestrate` run
    fn run(&self, response: &FanoutWithGatedRefinementResponse, format: OutputFormat) -> String;

    /// Render a failed `orchestrate` run with whatever it produced
    fn failure(&self, failure: &RunFailure, format: OutputFormat) -> String;
}
