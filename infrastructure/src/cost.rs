//! In-memory cost tracking

use council_application::CostTracker;
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Ledger {
    total: f64,
    calls: usize,
}

/// Mutex-protected running total with a fixed budget.
///
/// A budget of `0.0` means unlimited.
#[derive(Debug, Default)]
pub struct InMemoryCostTracker {
    ledger: Mutex<Ledger>,
    budget: f64,
}

impl InMemoryCostTracker {
    pub fn new(budget: f64) -> Self {
        Self {
            ledger: Mutex::new(Ledger::default()),
            budget: budget.max(0.0),
        }
    }

    /// Number of recorded charges
    pub fn calls(&self) -> usize {
        self.with_ledger(|l| l.calls)
    }

    fn with_ledger<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        match self.ledger.lock() {
            Ok(mut guard) => f(&mut *guard),
            Err(poisoned) => f(&mut *poisoned.into_inner()),
        }
    }
}

impl CostTracker for InMemoryCostTracker {
    fn record(&self, cost: f64) {
        if !cost.is_finite() || cost < 0.0 {
            warn!(cost, "Ignoring invalid cost");
            return;
        }
        let total = self.with_ledger(|l| {
            l.total += cost;
            l.calls += 1;
            l.total
        });
        debug!(cost, total, budget = self.budget, "Cost recorded");
    }

    fn total(&self) -> f64 {
        self.with_ledger(|l| l.total)
    }

    fn budget(&self) -> f64 {
        self.budget
    }
}
