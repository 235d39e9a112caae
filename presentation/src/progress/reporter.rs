//! Progress reporting for council runs

use colored::Colorize;
use council_application::ProgressNotifier;
use council_domain::{Consensus, ExecutionState, GateResult};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress during a run with progress bars and a state spinner
pub struct ProgressReporter {
    multi: MultiProgress,
    /// Bar for the batch in flight (evaluators or agents)
    batch_bar: Mutex<Option<ProgressBar>>,
    state_spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            batch_bar: Mutex::new(None),
            state_spinner: Mutex::new(None),
        }
    }

    fn batch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn state_display_name(state: ExecutionState) -> &'static str {
        match state {
            ExecutionState::Planning => "Planning",
            ExecutionState::InitialExec => "Running agents",
            ExecutionState::GateEval => "Evaluating gate",
            ExecutionState::RefinementExec => "Refining",
            ExecutionState::ReGateEval => "Re-evaluating gate",
            ExecutionState::Synthesis => "Synthesizing",
            ExecutionState::Done => "Done",
            ExecutionState::Failed => "Failed",
        }
    }

    fn start_batch(&self, prefix: &str, total: usize) {
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(Self::batch_style());
        pb.set_prefix(prefix.to_string());
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.batch_bar.lock()
            && let Some(previous) = slot.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn tick_batch(&self, label: &str, success: bool) {
        if let Ok(slot) = self.batch_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), label)
            } else {
                format!("{} {}", "x".red(), label)
            };
            pb.set_message(status);
            pb.inc(1);
            if pb.position() >= pb.length().unwrap_or(0) {
                pb.finish_with_message("complete".green().to_string());
            }
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_evaluation_start(&self, total_evaluators: usize) {
        self.start_batch("Evaluators", total_evaluators);
    }

    fn on_evaluator_complete(&self, evaluator: &str, success: bool) {
        self.tick_batch(evaluator, success);
    }

    fn on_state_change(&self, state: ExecutionState) {
        let Ok(mut slot) = self.state_spinner.lock() else {
            return;
        };

        if state.is_terminal() {
            if let Some(spinner) = slot.take() {
                let message = match state {
                    ExecutionState::Done => "done".green().to_string(),
                    _ => "failed".red().to_string(),
                };
                spinner.finish_with_message(message);
            }
            return;
        }

        let spinner = slot.get_or_insert_with(|| {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::spinner_style());
            pb.set_prefix("State");
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        });
        spinner.set_message(Self::state_display_name(state));
    }

    fn on_consensus(&self, consensus: &Consensus) {
        let _ = self.multi.println(format!(
            "{} {} / {} agents / {}",
            "Consensus:".cyan().bold(),
            consensus.complexity,
            consensus.agent_count,
            consensus.workflow_pattern
        ));
    }

    fn on_agents_start(&self, label: &str, total_agents: usize) {
        self.start_batch(label, total_agents);
    }

    fn on_agent_complete(&self, label: &str, success: bool) {
        self.tick_batch(label, success);
    }

    fn on_gate_result(&self, result: &GateResult) {
        let line = if result.threshold_met() {
            format!("{} gate passed", "v".green())
        } else {
            let failing: Vec<&str> = result
                .failing_components()
                .map(|c| c.name.as_str())
                .collect();
            format!("{} gate not passed: {}", "x".red(), failing.join(", "))
        };
        let _ = self.multi.println(line);
    }
}

/// Simple text-based progress (no fancy UI)
///
/// Writes to stderr so stdout stays clean for `--output json`.
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_evaluation_start(&self, total_evaluators: usize) {
        eprintln!(
            "{} {} ({} evaluators)",
            "->".cyan(),
            "Evaluating".bold(),
            total_evaluators
        );
    }

    fn on_evaluator_complete(&self, evaluator: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), evaluator);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), evaluator);
        }
    }

    fn on_state_change(&self, state: ExecutionState) {
        eprintln!(
            "{} {}",
            "->".cyan(),
            ProgressReporter::state_display_name(state).bold()
        );
    }

    fn on_agents_start(&self, label: &str, total_agents: usize) {
        eprintln!("  {} ({} agents)", label.bold(), total_agents);
    }

    fn on_agent_complete(&self, label: &str, success: bool) {
        if success {
            eprintln!("    {} {}", "v".green(), label);
        } else {
            eprintln!("    {} {} (failed)", "x".red(), label);
        }
    }

    fn on_gate_result(&self, result: &GateResult) {
        if result.threshold_met() {
            eprintln!("  {} gate passed", "v".green());
        } else {
            eprintln!("  {} gate not passed", "x".red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::GateComponent;
    use indicatif::ProgressDrawTarget;

    fn hidden_reporter() -> ProgressReporter {
        let reporter = ProgressReporter::new();
        reporter.multi.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    #[test]
    fn test_batch_completes_after_all_ticks() {
        let reporter = hidden_reporter();
        reporter.on_evaluation_start(2);
        reporter.on_evaluator_complete("a", true);
        reporter.on_evaluator_complete("b", false);

        let slot = reporter.batch_bar.lock().unwrap();
        let pb = slot.as_ref().unwrap();
        assert_eq!(pb.position(), 2);
        assert!(pb.is_finished());
    }

    #[test]
    fn test_terminal_state_clears_spinner() {
        let reporter = hidden_reporter();
        reporter.on_state_change(ExecutionState::Planning);
        assert!(reporter.state_spinner.lock().unwrap().is_some());
        reporter.on_state_change(ExecutionState::Done);
        assert!(reporter.state_spinner.lock().unwrap().is_none());
    }

    #[test]
    fn test_gate_result_does_not_panic() {
        let reporter = hidden_reporter();
        reporter.on_gate_result(&GateResult::failed_evaluation(
            &[GateComponent::new("security")],
            "x",
        ));
        reporter.on_gate_result(&GateResult::trivial_pass());
    }
}
