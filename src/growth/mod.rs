//! Compound growth projections, savings calculators and the monthly budget

mod compound;
mod savings;
mod budget;

pub use compound::{
    compound_interest, future_value, inflation_adjusted, investment_growth, rule_of_72, CompoundGrowthEngine,
    CompoundingFrequency, ContributionSchedule, FutureValue, GrowthInputs, GrowthPoint, GrowthResult, GrowthYear,
    RuleOf72,
};
pub use savings::{
    college_savings, emergency_fund, rainy_day_fund, rainy_day_multiplier, savings_goal, BalancePoint,
    CollegeSavings, GoalStatus, RainyDayFund, ReserveFund, SavingsConfig, SavingsGoal,
};
pub use budget::{
    budget_plan, load_budget, load_budget_from_reader, set_amount, BudgetLine, BudgetSummary, CategoryKind,
    CategoryShare,
};
