//! Prompt templates for evaluation, agent dispatch, gating and synthesis

use crate::consensus::Consensus;
use crate::evaluation::Complexity;
use crate::gate::GateComponent;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for one evaluator; `framing` is its perspective
    pub fn evaluator_system(framing: &str) -> String {
        format!(
            r#"You are a planning evaluator assessing how a task should be staffed and executed.
Your perspective: {framing}

Judge the task on its own merits. Other evaluators with different perspectives
assess the same task independently; do not try to guess their answers."#
        )
    }

    /// User prompt asking for a structured evaluation
    pub fn evaluation_prompt(
        task: &str,
        context: Option<&str>,
        prior: Option<Complexity>,
        max_total_agents: u32,
    ) -> String {
        let mut prompt = format!("Task:\n{task}\n");

        if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
            prompt.push_str(&format!("\nAdditional context:\n{context}\n"));
        }

        if let Some(prior) = prior {
            prompt.push_str(&format!(
                "\nA first-pass triage classified this task as \"{prior}\". Treat it as a hint only.\n"
            ));
        }

        prompt.push_str(&format!(
            r#"
Answer with a single JSON object and nothing else:

```json
{{
  "complexity": "simple | medium | complex | very_complex",
  "complexity_reason": "...",
  "total_agents": 1-{max_total_agents},
  "agent_reason": "...",
  "rounds_needed": 1,
  "role_priorities": ["most important role first", "..."],
  "primary_domains": ["..."],
  "domain_reason": "...",
  "workflow_pattern": "parallel | sequential | hybrid",
  "workflow_reason": "...",
  "quality_level": "basic | thorough | critical",
  "quality_reason": "...",
  "rules_applied": ["..."],
  "confidence": 0.0-1.0,
  "summary": "..."
}}
```

Roles are short lowercase nouns such as researcher, analyst, architect,
strategist, innovator, implementer, tester, critic, reviewer, auditor or
commentator."#
        ));

        prompt
    }

    /// Shared background every agent of one run receives
    pub fn common_background(task: &str, consensus: &Consensus) -> String {
        let domains = if consensus.domains.is_empty() {
            "general".to_string()
        } else {
            consensus.domains.join(", ")
        };
        format!(
            "Overall task:\n{task}\n\nAssessed complexity: {}. Quality bar: {}. Key domains: {domains}.",
            consensus.complexity, consensus.quality_level
        )
    }

    /// Instruction for one agent of the initial fanout
    pub fn agent_instruction(role: &str, domains: &[String], task: &str) -> String {
        let focus = if domains.is_empty() {
            String::new()
        } else {
            format!(" Focus on {}.", domains.join(" and "))
        };
        format!(
            "As the {role} on this team, contribute your part to the task below.{focus}\n\
             Be concrete, state assumptions, and flag risks you notice.\n\nTask:\n{task}"
        )
    }

    /// Instruction for one refinement agent, driven by gate problems
    pub fn refinement_instruction(
        role: &str,
        task: &str,
        problems: &[String],
        feedback: &str,
    ) -> String {
        let mut prompt = format!(
            "As the {role}, revise the team's work on the task below so it passes the quality gate.\n\nTask:\n{task}\n"
        );

        if !problems.is_empty() {
            prompt.push_str("\nProblems to fix:\n");
            for problem in problems {
                prompt.push_str(&format!("- {problem}\n"));
            }
        }

        if !feedback.trim().is_empty() {
            prompt.push_str(&format!("\nGate feedback:\n{feedback}\n"));
        }

        prompt
    }

    /// Persona for the node that judges the gate
    pub fn gate_persona() -> &'static str {
        r#"You are a strict quality gate. You judge whether a team's work is acceptable,
component by component, and you never approve work you have not seen."#
    }

    /// Instruction for the gate node
    pub fn gate_prompt(task: &str, components: &[GateComponent], outputs: &[(String, String)]) -> String {
        let mut prompt = format!("Task:\n{task}\n\nWork produced so far:\n");

        for (author, content) in outputs {
            prompt.push_str(&format!("\n--- {author} ---\n{content}\n"));
        }

        prompt.push_str("\nJudge each of these components:\n");
        for component in components {
            prompt.push_str(&format!("- {component}\n"));
        }

        prompt.push_str(
            r#"
Answer with a single JSON object:

```json
{
  "feedback": "overall comments",
  "components": {
    "<component>": { "is_acceptable": true, "problems": [] }
  }
}
```

Include every component listed above."#,
        );

        prompt
    }

    /// Persona for the synthesis node
    pub fn synthesis_persona() -> &'static str {
        r#"You are a lead integrator combining the work of several specialists into one
coherent final deliverable. Resolve contradictions explicitly."#
    }

    /// Instruction for the synthesis node
    pub fn synthesis_prompt(task: &str, outputs: &[(String, String)], gate_passed: bool) -> String {
        let mut prompt = format!("Task:\n{task}\n\nContributions:\n");

        for (author, content) in outputs {
            prompt.push_str(&format!("\n--- {author} ---\n{content}\n"));
        }

        if !gate_passed {
            prompt.push_str(
                "\nNote: the work did not pass the quality gate. Call out the unresolved problems.\n",
            );
        }

        prompt.push_str("\nProduce the final deliverable with clear markdown headers.");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_prompt_includes_prior_and_context() {
        let prompt = PromptTemplate::evaluation_prompt(
            "Build a cache",
            Some("Rust service"),
            Some(Complexity::Complex),
            20,
        );
        assert!(prompt.contains("Build a cache"));
        assert!(prompt.contains("Rust service"));
        assert!(prompt.contains("\"complex\""));
        assert!(prompt.contains("1-20"));
    }

    #[test]
    fn test_evaluation_prompt_skips_blank_context() {
        let prompt = PromptTemplate::evaluation_prompt("x", Some("  "), None, 10);
        assert!(!prompt.contains("Additional context"));
        assert!(!prompt.contains("triage"));
    }

    #[test]
    fn test_refinement_lists_problems() {
        let prompt = PromptTemplate::refinement_instruction(
            "auditor",
            "Ship login",
            &["password logged".to_string()],
            "security is weak",
        );
        assert!(prompt.contains("- password logged"));
        assert!(prompt.contains("security is weak"));
    }

    #[test]
    fn test_gate_prompt_lists_components() {
        let prompt = PromptTemplate::gate_prompt(
            "t",
            &[GateComponent::new("security")],
            &[("tester".to_string(), "all green".to_string())],
        );
        assert!(prompt.contains("- security"));
        assert!(prompt.contains("--- tester ---"));
    }

    #[test]
    fn test_synthesis_notes_failed_gate() {
        let outputs = vec![("a".to_string(), "b".to_string())];
        assert!(PromptTemplate::synthesis_prompt("t", &outputs, false).contains("did not pass"));
        assert!(!PromptTemplate::synthesis_prompt("t", &outputs, true).contains("did not pass"));
    }
}
