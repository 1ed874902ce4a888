//! Category budgets and the result rows of a budget check.

use crate::money::Amount;

/// A spending ceiling for one category.
///
/// The category is fixed at creation; only the limit can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    category: String,
    limit: Amount,
}

impl Budget {
    pub fn new(category: impl Into<String>, limit: Amount) -> Self {
        Budget {
            category: category.into(),
            limit,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn limit(&self) -> Amount {
        self.limit
    }

    pub fn set_limit(&mut self, limit: Amount) {
        self.limit = limit;
    }
}

/// Whether [`Ledger::add_or_update_budget`](crate::Ledger::add_or_update_budget)
/// created a budget or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetChange {
    Added,
    Updated,
}

/// Spending against one budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetStatus {
    pub category: String,

    /// Sum of the absolute values of expenses in the category.
    pub spent: Amount,

    pub limit: Amount,

    /// `spent > limit`. Spending exactly the limit is within budget.
    pub exceeded: bool,
}

impl BudgetStatus {
    pub fn new(budget: &Budget, spent: Amount) -> Self {
        BudgetStatus {
            category: budget.category.clone(),
            spent,
            limit: budget.limit,
            exceeded: spent > budget.limit,
        }
    }
}
