//! Agent composer port

/// Builds the persona text an agent runs under
///
/// Pure for identical inputs apart from a de-duplication counter: the first
/// `tester` on `api` is `tester_api`, the next `tester_api_v2`, and so on.
pub trait AgentComposer: Send + Sync {
    fn compose(&self, role: &str, domains: &[String], context: &str) -> String;
}
