//! Template-based agent composer

use council_application::AgentComposer;
use council_domain::core::string::normalize_label;
use std::collections::HashMap;
use std::sync::Mutex;

/// Builds persona text from a role and its domains.
///
/// Each persona is named `role_domain`; a name seen before gets a
/// `_v{n}` suffix so concurrent agents stay distinguishable.
#[derive(Debug, Default)]
pub struct TemplateAgentComposer {
    seen: Mutex<HashMap<String, usize>>,
}

impl TemplateAgentComposer {
    pub fn new() -> Self {
        Self::default()
    }

    fn base_name(role: &str, domains: &[String]) -> String {
        let mut parts = vec![normalize_label(role)];
        parts.extend(domains.iter().map(|d| normalize_label(d)));
        parts.retain(|p| !p.is_empty());
        if parts.is_empty() {
            "agent".to_string()
        } else {
            parts.join("_")
        }
    }

    fn unique_name(&self, base: String) -> String {
        // A poisoned counter only loses de-duplication, never the persona
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}_v{}", base, count)
        }
    }
}

impl AgentComposer for TemplateAgentComposer {
    fn compose(&self, role: &str, domains: &[String], context: &str) -> String {
        let name = self.unique_name(Self::base_name(role, domains));

        let mut persona = format!("You are {name}, acting as the team's {role}.");
        if !domains.is_empty() {
            persona.push_str(&format!(" Your expertise: {}.", domains.join(", ")));
        }
        if let Some(line) = context.lines().map(str::trim).find(|l| !l.is_empty()) {
            persona.push_str(&format!("\nProject context: {line}"));
        }
        persona.push_str(
            "\nStay within your role. Be concrete, and say so when something is outside your expertise.",
        );
        persona
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(names: &[&str]) -> Vec<String> {
        names.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_persona_names_role_and_domains() {
        let composer = TemplateAgentComposer::new();
        let persona = composer.compose("tester", &domains(&["api", "security"]), "");
        assert!(persona.starts_with("You are tester_api_security,"));
        assert!(persona.contains("api, security"));
    }

    #[test]
    fn test_repeats_get_versioned_names() {
        let composer = TemplateAgentComposer::new();
        let d = domains(&["api"]);
        let first = composer.compose("tester", &d, "");
        let second = composer.compose("tester", &d, "");
        let third = composer.compose("tester", &d, "");
        assert!(first.contains("tester_api,"));
        assert!(second.contains("tester_api_v2,"));
        assert!(third.contains("tester_api_v3,"));
    }

    #[test]
    fn test_different_domains_do_not_collide() {
        let composer = TemplateAgentComposer::new();
        composer.compose("tester", &domains(&["api"]), "");
        let other = composer.compose("tester", &domains(&["ui"]), "");
        assert!(other.contains("tester_ui,"));
    }

    #[test]
    fn test_context_first_line_included() {
        let composer = TemplateAgentComposer::new();
        let persona = composer.compose("architect", &[], "\nTask: build a cache\nmore");
        assert!(persona.contains("Project context: Task: build a cache"));
        assert!(!persona.contains("more"));
    }
}
