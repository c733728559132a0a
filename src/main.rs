//! fincalc CLI
//!
//! Command-line interface for the financial calculator engines

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

use fincalc::debt::{self, loader::DEFAULT_DEBTS_PATH, PayoffMonth, PayoffPlan, Strategy};
use fincalc::growth::{
    budget_plan, load_budget, set_amount, BudgetLine, CategoryKind, CompoundingFrequency, ContributionSchedule,
    GrowthInputs,
};
use fincalc::loan::LoanTerms;
use fincalc::portfolio::{asset_allocation, AssetClass};
use fincalc::real_estate::{mortgage_with, rent_vs_buy, rental_roi, MortgageInputs, RentVsBuyInputs, RentalInputs};
use fincalc::tax::loader::load_brackets;
use fincalc::{CalculatorConfig, TaxEngine};

/// Financial calculators: loans, taxes, growth, debt payoff and real estate
#[derive(Parser, Debug)]
#[command(name = "fincalc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Calculator config JSON (FINCALC_* variables still override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Loan amortization schedule
    Amortize {
        #[arg(long)]
        principal: f64,
        /// Annual rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
        /// Extra principal paid each month
        #[arg(long, default_value_t = 0.0)]
        extra: f64,
        /// First payment date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Write the monthly schedule to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Federal income and payroll tax
    Tax {
        #[arg(long)]
        income: f64,
        /// Bracket CSV (rate,min,max) instead of the configured table
        #[arg(long)]
        brackets: Option<PathBuf>,
    },

    /// Compound growth with periodic contributions
    Growth {
        #[arg(long, default_value_t = 0.0)]
        principal: f64,
        #[arg(long, default_value_t = 0.0)]
        monthly: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
        #[arg(long, value_enum, default_value_t = Frequency::Monthly)]
        frequency: Frequency,
        /// Annual contribution increase in percent
        #[arg(long, default_value_t = 0.0)]
        increase: f64,
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Monthly budget surplus and category shares
    Budget {
        /// Budget CSV (id,name,kind,amount) instead of the standard categories
        #[arg(long)]
        file: Option<PathBuf>,
        /// Category amount as id=amount, repeatable
        #[arg(long = "set", value_parser = parse_assignment)]
        amounts: Vec<(String, f64)>,
    },

    /// Snowball or avalanche payoff of a debt list
    Payoff {
        /// Debts CSV (id,name,balance,rate,minimum_payment)
        #[arg(long, default_value = DEFAULT_DEBTS_PATH)]
        debts: PathBuf,
        /// Total monthly budget for all debts
        #[arg(long)]
        budget: f64,
        /// snowball or avalanche; both are compared when omitted
        #[arg(long)]
        strategy: Option<Strategy>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Monthly PITI payment
    Mortgage {
        #[arg(long)]
        price: f64,
        #[arg(long, default_value_t = 0.0)]
        down: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long, default_value_t = 30)]
        years: u32,
        /// Annual property tax
        #[arg(long, default_value_t = 0.0)]
        tax: f64,
        /// Annual homeowners insurance
        #[arg(long, default_value_t = 0.0)]
        insurance: f64,
        /// Annual PMI
        #[arg(long, default_value_t = 0.0)]
        pmi: f64,
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Compare buying a home with renting
    RentVsBuy {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        down: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long, default_value_t = 30)]
        term: u32,
        #[arg(long, default_value_t = 1.1)]
        tax_rate: f64,
        #[arg(long, default_value_t = 0.5)]
        insurance_rate: f64,
        #[arg(long, default_value_t = 1.0)]
        maintenance_rate: f64,
        #[arg(long)]
        rent: f64,
        #[arg(long, default_value_t = 3.0)]
        rent_increase: f64,
        #[arg(long, default_value_t = 3.0)]
        appreciation: f64,
        #[arg(long, default_value_t = 10)]
        years: u32,
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Rental property cash flow and returns
    RentalRoi {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        down: f64,
        #[arg(long, default_value_t = 0.0)]
        closing: f64,
        #[arg(long, default_value_t = 0.0)]
        repairs: f64,
        #[arg(long)]
        rent: f64,
        #[arg(long, default_value_t = 0.0)]
        other_income: f64,
        #[arg(long, default_value_t = 1.1)]
        tax_rate: f64,
        #[arg(long, default_value_t = 0.5)]
        insurance_rate: f64,
        #[arg(long, default_value_t = 1.0)]
        maintenance_rate: f64,
        #[arg(long, default_value_t = 5.0)]
        vacancy_rate: f64,
        #[arg(long, default_value_t = 0.0)]
        management_rate: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long, default_value_t = 30)]
        term: u32,
        #[arg(long, default_value_t = 3.0)]
        appreciation: f64,
        #[arg(long, default_value_t = 10)]
        hold: u32,
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Rebalancing trades for a target allocation
    Allocation {
        /// JSON array of asset classes
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        total_value: f64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Frequency {
    Monthly,
    Quarterly,
    Annually,
}

impl From<Frequency> for CompoundingFrequency {
    fn from(f: Frequency) -> Self {
        match f {
            Frequency::Monthly => CompoundingFrequency::Monthly,
            Frequency::Quarterly => CompoundingFrequency::Quarterly,
            Frequency::Annually => CompoundingFrequency::Annually,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CalculatorConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CalculatorConfig::default(),
    }
    .with_overrides(|key| std::env::var(key).ok());

    match cli.command {
        Commands::Amortize { principal, rate, years, extra, start, csv } => {
            let mut terms = LoanTerms::new(principal, rate, years).with_extra_payment(extra);
            if let Some(date) = start {
                terms = terms.starting(date);
            }
            let result = config.amortization_engine().amortize(&terms)?;
            if let Some(path) = csv {
                write_csv(&path, &result.schedule)?;
            }
            if cli.json {
                return print_json(&result);
            }

            println!("Loan: ${:.2} at {}% for {} years", principal, rate, years);
            println!("  Monthly payment: ${:.2}", result.monthly_payment);
            if extra != 0.0 {
                println!("  With extra:      ${:.2}", result.monthly_payment + extra);
            }
            println!("  Periods used:    {} ({:?})", result.periods_used, result.status);
            println!("  Total interest:  ${:.2}", result.total_interest);
            println!("  Total paid:      ${:.2}", result.total_paid);
            println!();
            println!("{:>5} {:>14} {:>14} {:>14}", "Year", "Balance", "Interest", "Principal");
            println!("{}", "-".repeat(50));
            for y in &result.yearly {
                println!(
                    "{:>5} {:>14.2} {:>14.2} {:>14.2}",
                    y.year, y.balance, y.cumulative_interest, y.principal_paid
                );
            }
        }

        Commands::Tax { income, brackets } => {
            let engine = match brackets {
                Some(path) => TaxEngine::new(
                    load_brackets(&path).with_context(|| format!("loading brackets {}", path.display()))?,
                    config.tax.payroll.clone(),
                ),
                None => config.tax_engine()?,
            };
            let result = engine.compute_tax(income)?;
            if cli.json {
                return print_json(&result);
            }

            println!("Gross income:    ${:.2}", result.gross_income);
            println!("{:>8} {:>14} {:>12}", "Rate", "Taxed", "Tax");
            for slice in &result.brackets {
                println!("{:>7.1}% {:>14.2} {:>12.2}", slice.rate, slice.amount, slice.tax);
            }
            println!("Federal tax:     ${:.2}", result.federal_tax);
            println!("Social Security: ${:.2}", result.social_security);
            println!("Medicare:        ${:.2}", result.medicare);
            println!("Total tax:       ${:.2}", result.total_tax);
            println!("Net income:      ${:.2}", result.net_income);
            println!("Effective rate:  {:.2}% (federal), {:.2}% (total)", result.effective_rate, result.effective_total_rate);
            println!("Marginal rate:   {:.1}%", result.marginal_rate);
        }

        Commands::Growth { principal, monthly, rate, years, frequency, increase, csv } => {
            let inputs = GrowthInputs {
                principal,
                contributions: ContributionSchedule::from_monthly(monthly, frequency.into()).escalating(increase),
                annual_rate: rate,
                years,
            };
            let fv = config.future_value(&inputs)?;
            let result = &fv.growth;
            if let Some(path) = csv {
                write_csv(&path, &result.schedule)?;
            }
            if cli.json {
                return print_json(&fv);
            }

            println!("{:>5} {:>14} {:>14} {:>14}", "Year", "Balance", "Contributed", "Interest");
            println!("{}", "-".repeat(50));
            for y in &result.yearly {
                println!("{:>5} {:>14.2} {:>14.2} {:>14.2}", y.year, y.balance, y.contributions, y.interest);
            }
            println!();
            println!("Final balance:       ${:.2}", result.final_balance);
            println!("Total contributions: ${:.2}", result.total_contributions);
            println!("Total interest:      ${:.2}", result.total_interest);
            println!(
                "Today's money:       ${:.2} ({}% inflation)",
                fv.inflation_adjusted_value, fv.inflation_rate
            );
        }

        Commands::Budget { file, amounts } => {
            let mut lines = match file {
                Some(path) => load_budget(&path).with_context(|| format!("loading budget {}", path.display()))?,
                None => BudgetLine::defaults(),
            };
            for (id, amount) in &amounts {
                set_amount(&mut lines, id, *amount)?;
            }
            let summary = budget_plan(&lines)?;
            if cli.json {
                return print_json(&summary);
            }

            for kind in [CategoryKind::Income, CategoryKind::Expense] {
                println!("{:?}", kind);
                for c in summary.of_kind(kind) {
                    println!("  {:<20} {:>12.2} {:>8}", c.name, c.amount, fmt_pct(c.share));
                }
            }
            println!();
            println!("Total income:   ${:.2}", summary.total_income);
            println!("Total expenses: ${:.2}", summary.total_expenses);
            let label = if summary.is_deficit() { "Deficit" } else { "Surplus" };
            println!("{}:        ${:.2} ({})", label, summary.surplus.abs(), fmt_pct(summary.savings_rate));
        }

        Commands::Payoff { debts, budget, strategy, csv } => {
            let list = debt::loader::load_debts(&debts)
                .with_context(|| format!("loading debts {}", debts.display()))?;
            let engine = config.payoff_engine();

            let plans: Vec<PayoffPlan> = match strategy {
                Some(s) => vec![engine.simulate(list.as_slice(), budget, s)?],
                None => {
                    let cmp = engine.compare(list.as_slice(), budget)?;
                    vec![cmp.snowball, cmp.avalanche]
                }
            };
            if let Some(path) = csv {
                let rows: Vec<PlanMonthRow> = plans
                    .iter()
                    .flat_map(|p| p.schedule.iter().map(move |m| PlanMonthRow::new(p.strategy, m)))
                    .collect();
                write_csv(&path, &rows)?;
            }
            if cli.json {
                return print_json(&plans);
            }

            for plan in &plans {
                print_plan(plan);
            }
        }

        Commands::Mortgage { price, down, rate, years, tax, insurance, pmi, csv } => {
            let inputs = MortgageInputs::new(price, down, rate, years).with_escrow(tax, insurance, pmi);
            let result = mortgage_with(&config.amortization_engine(), &inputs)?;
            if let Some(path) = csv {
                write_csv(&path, result.yearly())?;
            }
            if cli.json {
                return print_json(&result);
            }

            println!("Loan amount:          ${:.2} (LTV {:.1}%)", result.loan_amount, result.loan_to_value);
            println!("Principal & interest: ${:.2}", result.monthly_principal_and_interest);
            println!("Property tax:         ${:.2}", result.monthly_tax);
            println!("Insurance:            ${:.2}", result.monthly_insurance);
            println!("PMI:                  ${:.2}", result.monthly_pmi);
            println!("Monthly total:        ${:.2}", result.monthly_total);
            println!("Total interest:       ${:.2}", result.total_interest);
        }

        Commands::RentVsBuy {
            price,
            down,
            rate,
            term,
            tax_rate,
            insurance_rate,
            maintenance_rate,
            rent,
            rent_increase,
            appreciation,
            years,
            csv,
        } => {
            let result = rent_vs_buy(&RentVsBuyInputs {
                home_price: price,
                down_payment: down,
                annual_rate: rate,
                term_years: term,
                property_tax_rate: tax_rate,
                insurance_rate,
                maintenance_rate,
                monthly_rent: rent,
                rent_increase,
                home_appreciation: appreciation,
                years,
            })?;
            if let Some(path) = csv {
                write_csv(&path, &result.buy)?;
            }
            if cli.json {
                return print_json(&result);
            }

            println!("{:>5} {:>14} {:>14} {:>14} {:>14}", "Year", "Home value", "Mortgage", "Equity", "Rent paid");
            println!("{}", "-".repeat(65));
            for (b, r) in result.buy.iter().zip(&result.rent) {
                println!(
                    "{:>5} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
                    b.year, b.home_value, b.mortgage_balance, b.equity, r.cumulative_rent
                );
            }
            println!();
            println!("Buyer cost:     ${:.2} (net of appreciation ${:.2})", result.total_buyer_cost, result.net_buyer_cost);
            println!("Renter cost:    ${:.2}", result.total_renter_cost);
            println!("Final equity:   ${:.2}", result.final_equity);
        }

        Commands::RentalRoi {
            price,
            down,
            closing,
            repairs,
            rent,
            other_income,
            tax_rate,
            insurance_rate,
            maintenance_rate,
            vacancy_rate,
            management_rate,
            rate,
            term,
            appreciation,
            hold,
            csv,
        } => {
            let result = rental_roi(&RentalInputs {
                purchase_price: price,
                down_payment: down,
                closing_costs: closing,
                repair_costs: repairs,
                monthly_rent: rent,
                other_monthly_income: other_income,
                property_tax_rate: tax_rate,
                insurance_rate,
                maintenance_rate,
                vacancy_rate,
                management_rate,
                mortgage_rate: rate,
                mortgage_years: term,
                annual_appreciation: appreciation,
                holding_period: hold,
            })?;
            if let Some(path) = csv {
                write_csv(&path, &result.schedule)?;
            }
            if cli.json {
                return print_json(&result);
            }

            println!("Monthly income:    ${:.2}", result.gross_monthly_income);
            println!("Monthly expenses:  ${:.2}", result.total_monthly_expenses);
            println!("Monthly cash flow: ${:.2}", result.monthly_cash_flow);
            println!("Cash invested:     ${:.2}", result.total_investment);
            println!("Cash on cash:      {}", fmt_pct(result.cash_on_cash_return));
            println!("Total ROI:         {}", fmt_pct(result.total_roi));
            println!("Average ROI:       {}", fmt_pct(result.average_annual_roi));
            println!("IRR:               {}", fmt_pct(result.irr.map(|r| r * 100.0)));
        }

        Commands::Allocation { file, total_value } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let assets: Vec<AssetClass> = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", file.display()))?;
            let plan = asset_allocation(&assets, total_value)?;
            if cli.json {
                return print_json(&plan);
            }

            println!("{:<16} {:>14} {:>14} {:>14} {:>6}", "Asset", "Current", "Target", "Change", "");
            println!("{}", "-".repeat(68));
            for a in &plan.assets {
                println!(
                    "{:<16} {:>14.2} {:>14.2} {:>14.2} {:>6}",
                    a.name,
                    a.current_value,
                    a.target_value,
                    a.difference,
                    format!("{:?}", a.action)
                );
            }
            println!();
            println!("Expected return:  {:.2}%", plan.expected_return);
            println!("Volatility:       {:.2}%", plan.volatility);
            println!("To rebalance:     ${:.2}", plan.rebalance_amount);
        }
    }

    Ok(())
}

/// Month of a payoff plan tagged with its strategy for CSV output
#[derive(Serialize)]
struct PlanMonthRow {
    strategy: Strategy,
    month: u32,
    total_balance: f64,
    total_interest: f64,
    total_paid: f64,
}

impl PlanMonthRow {
    fn new(strategy: Strategy, m: &PayoffMonth) -> Self {
        Self {
            strategy,
            month: m.month,
            total_balance: m.total_balance,
            total_interest: m.total_interest,
            total_paid: m.total_paid,
        }
    }
}

fn print_plan(plan: &PayoffPlan) {
    println!("{} (budget ${:.2})", plan.strategy, plan.monthly_budget);
    if plan.budget_shortfall > 0.0 {
        println!("  Budget is ${:.2} short of the minimum payments", plan.budget_shortfall);
    }
    println!("  Months:         {} ({:?})", plan.total_months, plan.status);
    println!("  Total interest: ${:.2}", plan.total_interest);
    for d in &plan.debts {
        let month = d
            .paid_off_month
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("    {:<20} paid off month {:>4}, interest ${:.2}", d.name, month, d.total_interest);
    }
    println!();
}

fn parse_assignment(s: &str) -> std::result::Result<(String, f64), String> {
    let (id, amount) = s.split_once('=').ok_or_else(|| format!("expected id=amount, got '{s}'"))?;
    let amount = amount.trim().parse().map_err(|e| format!("bad amount in '{s}': {e}"))?;
    Ok((id.trim().to_string(), amount))
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}%", v)).unwrap_or_else(|| "n/a".to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
