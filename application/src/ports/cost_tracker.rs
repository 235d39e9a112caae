//! Cost tracker port
//!
//! The only state mutated from concurrent call sites. Implementations must
//! serialize updates so none are lost.

use council_domain::BudgetSnapshot;

pub trait CostTracker: Send + Sync {
    /// Add the cost of one call
    fn record(&self, cost: f64);

    /// Total spend so far
    fn total(&self) -> f64;

    /// Configured budget; non-positive means unlimited
    fn budget(&self) -> f64;

    /// Consistent view of spend and budget
    fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot::new(self.total(), self.budget())
    }
}
