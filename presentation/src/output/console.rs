//! Console output formatter for council results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_application::{PartialRun, PlanTaskOutput, RunFailure};
use council_domain::{
    AgentOutput, Consensus, FanoutWithGatedRefinementResponse, GateResult, OutputFormat,
};
use serde_json::json;

/// Formats council results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a planning result
    pub fn format_plan(output: &PlanTaskOutput) -> String {
        let mut out = String::new();
        out.push_str(&Self::header("Council Consensus"));
        out.push('\n');

        out.push_str(&Self::consensus_block(&output.consensus));

        out.push_str(&Self::section_header("Triage"));
        out.push_str(&format!(
            "  {} {} ({})\n",
            "Prior:".bold(),
            output.triage.tier,
            Self::triage_source(output)
        ));
        if output.triage_disagrees() {
            out.push_str(&format!(
                "  {}\n",
                format!(
                    "Triage said {}, evaluators converged on {}",
                    output.triage.tier, output.consensus.complexity
                )
                .yellow()
            ));
        }

        out.push_str(&Self::section_header("Evaluators"));
        for result in &output.results {
            out.push_str(&format!(
                "  {} {:<14} {} / {} agents / confidence {:.2} / {}ms\n",
                "v".green(),
                result.name(),
                result.evaluation.complexity,
                result.evaluation.total_agents,
                result.evaluation.confidence,
                result.latency.as_millis()
            ));
        }
        for failure in &output.failures {
            out.push_str(&format!("  {} {}\n", "x".red(), failure));
        }

        out.push_str(&Self::footer());
        out
    }

    /// Format a planning result as a few headline lines
    pub fn format_plan_summary(output: &PlanTaskOutput) -> String {
        let c = &output.consensus;
        let mut out = format!(
            "{} {} | {} agents | {} | {} | confidence {:.2}\n",
            "Consensus:".cyan().bold(),
            c.complexity,
            c.agent_count,
            c.workflow_pattern,
            c.quality_level,
            c.confidence
        );
        out.push_str(&format!("{} {}\n", "Roles:".bold(), Self::role_list(c)));
        for warning in &c.warnings {
            out.push_str(&format!("{} {}\n", "!".yellow(), warning));
        }
        out
    }

    /// Format a planning result as JSON
    pub fn format_plan_json(output: &PlanTaskOutput) -> String {
        let evaluators: Vec<_> = output
            .results
            .iter()
            .map(|r| {
                json!({
                    "name": r.name(),
                    "evaluation": r.evaluation,
                    "cost": r.cost,
                    "latency_ms": r.latency.as_millis() as u64,
                })
            })
            .collect();
        let value = json!({
            "consensus": output.consensus,
            "triage": output.triage,
            "triage_disagrees": output.triage_disagrees(),
            "evaluators": evaluators,
            "failures": output.failures.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a completed run
    pub fn format_run(response: &FanoutWithGatedRefinementResponse) -> String {
        let mut out = String::new();
        out.push_str(&Self::header("Council Run"));
        out.push('\n');

        out.push_str(&Self::consensus_block(&response.consensus));

        out.push_str(&Self::section_header("Execution"));
        out.push_str(&format!(
            "  {} {}\n",
            "States:".bold(),
            Self::state_path(&response.state_history)
        ));
        out.push_str(&format!(
            "  {} {}\n",
            "Gate:".bold(),
            Self::gate_badge(response.gate_passed, response.final_gate_id.is_some())
        ));
        out.push_str(&format!(
            "  {} {}\n",
            "Refinement rounds:".bold(),
            response.refinement_rounds
        ));

        out.push_str(&Self::section_header("Agent Outputs"));
        out.push_str(&Self::outputs_block(&response.outputs));

        if !response.warnings.is_empty() {
            out.push_str(&Self::section_header("Warnings"));
            for warning in &response.warnings {
                out.push_str(&format!("  {} {}\n", "!".yellow(), warning));
            }
        }

        out.push_str(&Self::section_header("Final Synthesis"));
        out.push('\n');
        out.push_str(&response.synth_result);
        out.push('\n');

        out.push_str(&Self::footer());
        out
    }

    /// Format a completed run: status line plus the synthesis
    pub fn format_run_summary(response: &FanoutWithGatedRefinementResponse) -> String {
        format!(
            "{} {} | {} agents | {} refinement round(s)\n\n{}\n",
            "Gate:".cyan().bold(),
            Self::gate_badge(response.gate_passed, response.final_gate_id.is_some()),
            response.consensus.agent_count,
            response.refinement_rounds,
            response.synth_result
        )
    }

    /// Format a completed run as JSON
    pub fn format_run_json(response: &FanoutWithGatedRefinementResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a failed run
    pub fn format_failure(failure: &RunFailure) -> String {
        let mut out = format!(
            "{} {}\n",
            "Run failed:".red().bold(),
            failure.error
        );
        out.push_str(&format!("  {} {}\n", "Stopped in:".bold(), failure.state));

        let partial = &failure.partial;
        if !partial.state_history.is_empty() {
            out.push_str(&format!(
                "  {} {}\n",
                "States:".bold(),
                Self::state_path(&partial.state_history)
            ));
        }
        if let Some(consensus) = &partial.consensus {
            out.push_str(&Self::consensus_block(consensus));
        }
        if let Some(gate) = &partial.last_gate {
            out.push_str(&Self::section_header("Last Gate Result"));
            out.push_str(&Self::gate_block(gate));
        }
        if !partial.outputs.is_empty() {
            out.push_str(&Self::section_header("Partial Agent Outputs"));
            out.push_str(&Self::outputs_block(&partial.outputs));
        }
        for warning in &partial.warnings {
            out.push_str(&format!("  {} {}\n", "!".yellow(), warning));
        }
        out
    }

    /// Format a failed run as JSON
    pub fn format_failure_json(failure: &RunFailure) -> String {
        let PartialRun {
            consensus,
            outputs,
            last_gate,
            state_history,
            warnings,
        } = &failure.partial;
        let value = json!({
            "status": "failed",
            "state": failure.state,
            "error": failure.error.to_string(),
            "partial": {
                "consensus": consensus,
                "outputs": outputs,
                "last_gate": last_gate,
                "state_history": state_history,
                "warnings": warnings,
            },
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn consensus_block(c: &Consensus) -> String {
        let mut out = Self::section_header("Consensus");
        out.push_str(&format!(
            "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {:.2} (from {} evaluator(s))\n",
            "Complexity:".bold(),
            c.complexity,
            "Agents:".bold(),
            c.agent_count,
            "Workflow:".bold(),
            c.workflow_pattern,
            "Quality:".bold(),
            c.quality_level,
            "Confidence:".bold(),
            c.confidence,
            c.evaluator_count
        ));
        out.push_str(&format!("  {} {}\n", "Roles:".bold(), Self::role_list(c)));
        if !c.domains.is_empty() {
            out.push_str(&format!("  {} {}\n", "Domains:".bold(), c.domains.join(", ")));
        }
        for warning in &c.warnings {
            out.push_str(&format!("  {} {}\n", "!".yellow(), warning));
        }
        out
    }

    fn role_list(c: &Consensus) -> String {
        c.role_recommendations
            .iter()
            .map(|r| format!("{} ({:.2})", r.role, r.score))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn outputs_block(outputs: &[AgentOutput]) -> String {
        let mut out = String::new();
        for output in outputs {
            let title = format!("── {} ──", output.author());
            if output.is_placeholder() {
                out.push_str(&format!("\n{}\n{}\n", title.red().bold(), output.content()));
            } else {
                out.push_str(&format!(
                    "\n{}\n{}\n",
                    title.yellow().bold(),
                    Self::indent(&output.content(), "  ")
                ));
            }
        }
        out
    }

    fn gate_block(gate: &GateResult) -> String {
        let mut out = format!(
            "  {}\n",
            Self::gate_badge(gate.threshold_met(), true)
        );
        if !gate.feedback.is_empty() {
            out.push_str(&format!("  {}\n", gate.feedback));
        }
        for component in gate.component_results() {
            let mark = if component.is_acceptable {
                "v".green()
            } else {
                "x".red()
            };
            out.push_str(&format!("  {} {}\n", mark, component.name));
            for problem in &component.problems {
                out.push_str(&format!("      - {}\n", problem));
            }
        }
        out
    }

    fn gate_badge(passed: bool, configured: bool) -> String {
        match (configured, passed) {
            (false, _) => "not configured".dimmed().to_string(),
            (true, true) => "passed".green().bold().to_string(),
            (true, false) => "not passed".red().bold().to_string(),
        }
    }

    fn state_path(history: &[council_domain::ExecutionState]) -> String {
        history
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    fn triage_source(output: &PlanTaskOutput) -> String {
        if output.triage.matched.is_empty() {
            format!("{:?}", output.triage.source).to_lowercase()
        } else {
            format!(
                "{}: {}",
                format!("{:?}", output.triage.source).to_lowercase(),
                output.triage.matched.join(", ")
            )
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn plan(&self, output: &PlanTaskOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format_plan(output),
            OutputFormat::Summary => Self::format_plan_summary(output),
            OutputFormat::Json => Self::format_plan_json(output),
        }
    }

    fn run(&self, response: &FanoutWithGatedRefinementResponse, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format_run(response),
            OutputFormat::Summary => Self::format_run_summary(response),
            OutputFormat::Json => Self::format_run_json(response),
        }
    }

    fn failure(&self, failure: &RunFailure, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_failure_json(failure),
            _ => Self::format_failure(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_application::OrchestrateError;
    use council_domain::{
        Complexity, ExecutionState, GateComponent, NodeId, QualityLevel, RoleRecommendation,
        WorkflowPattern,
    };

    fn consensus() -> Consensus {
        Consensus {
            complexity: Complexity::Complex,
            agent_count: 3,
            role_recommendations: vec![
                RoleRecommendation::new("implementer", 1.0),
                RoleRecommendation::new("tester", 0.5),
            ],
            domains: vec!["api".to_string()],
            workflow_pattern: WorkflowPattern::Parallel,
            quality_level: QualityLevel::Thorough,
            confidence: 0.8,
            rounds_needed: 1,
            evaluator_count: 3,
            warnings: vec!["Efficiency Cliff Warning: test".to_string()],
        }
    }

    fn response() -> FanoutWithGatedRefinementResponse {
        FanoutWithGatedRefinementResponse {
            synth_result: "the final answer".to_string(),
            gate_passed: true,
            refinement_executed: false,
            synth_node_id: NodeId::new("node-4"),
            final_gate_id: Some(NodeId::new("node-3")),
            initial_node_ids: vec![NodeId::new("node-1"), NodeId::new("node-2")],
            refinement_rounds: 0,
            consensus: consensus(),
            outputs: vec![
                AgentOutput::completed(0, "implementer", vec![], 0, NodeId::new("node-1"), "code".to_string()),
                AgentOutput::placeholder(1, "tester", vec![], 0, Some(NodeId::new("node-2")), "timed out".to_string()),
            ],
            warnings: vec![],
            state_history: vec![
                ExecutionState::Planning,
                ExecutionState::InitialExec,
                ExecutionState::GateEval,
                ExecutionState::Synthesis,
                ExecutionState::Done,
            ],
        }
    }

    #[test]
    fn test_run_full_contains_sections() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_run(&response());
        assert!(text.contains("Final Synthesis"));
        assert!(text.contains("the final answer"));
        assert!(text.contains("PLANNING -> INITIAL_EXEC"));
        assert!(text.contains("implementer (0.50)") || text.contains("tester (0.50)"));
        assert!(text.contains("[no output: timed out]"));
        assert!(text.contains("Efficiency Cliff"));
    }

    #[test]
    fn test_run_summary_is_short() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_run_summary(&response());
        assert!(text.starts_with("Gate: passed"));
        assert!(text.ends_with("the final answer\n"));
    }

    #[test]
    fn test_run_json_round_trips() {
        let text = ConsoleFormatter::format_run_json(&response());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["gate_passed"], true);
        assert_eq!(value["synth_node_id"], "node-4");
    }

    #[test]
    fn test_failure_json_keeps_partial_results() {
        let failure = RunFailure {
            state: ExecutionState::InitialExec,
            error: OrchestrateError::ExecutorUnavailable("offline".to_string()),
            partial: PartialRun {
                consensus: Some(consensus()),
                outputs: response().outputs,
                last_gate: Some(GateResult::failed_evaluation(
                    &[GateComponent::new("security")],
                    "no answer",
                )),
                state_history: vec![ExecutionState::Planning, ExecutionState::InitialExec, ExecutionState::Failed],
                warnings: vec![],
            },
        };

        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_failure_json(&failure)).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["state"], "INITIAL_EXEC");
        assert_eq!(value["partial"]["outputs"].as_array().unwrap().len(), 2);

        colored::control::set_override(false);
        let text = ConsoleFormatter::format_failure(&failure);
        assert!(text.contains("offline"));
        assert!(text.contains("Last Gate Result"));
        assert!(text.contains("x security"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
