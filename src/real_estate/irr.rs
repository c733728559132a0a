//! Internal rate of return and net present value of investment cash flows
//!
//! Rates are solved per period (Newton-Raphson, with bisection over the
//! search bracket when Newton stalls) and annualized afterwards.

/// Flows smaller than this count as zero
const CENT: f64 = 0.005;
/// Solved periodic rates are accurate to this
const RATE_PRECISION: f64 = 1e-10;
const SOLVER_STEPS: usize = 500;
/// Search bracket in annual terms: a 99% loss up to a 1000% gain
const WORST_ANNUAL_RETURN: f64 = -0.99;
const BEST_ANNUAL_RETURN: f64 = 10.0;
/// Starting guess for the annual return
const FIRST_GUESS: f64 = 0.05;

/// Net present value of `cashflows` at a periodic `rate`; index 0 is undiscounted
pub fn npv(rate: f64, cashflows: &[f64]) -> f64 {
    Flows(cashflows).value_at(rate)
}

struct Flows<'a>(&'a [f64]);

impl Flows<'_> {
    fn value_at(&self, rate: f64) -> f64 {
        let growth = 1.0 + rate;
        self.0.iter().rev().fold(0.0, |acc, &cf| acc / growth + cf)
    }

    /// d(NPV)/d(rate)
    fn slope_at(&self, rate: f64) -> f64 {
        let growth = 1.0 + rate;
        self.0
            .iter()
            .enumerate()
            .skip(1)
            .map(|(t, &cf)| -(t as f64) * cf / growth.powi(t as i32 + 1))
            .sum()
    }

    fn scale(&self) -> f64 {
        self.0.iter().map(|cf| cf.abs()).sum()
    }

    fn is_investment(&self) -> bool {
        self.0.iter().any(|&cf| cf > CENT) && self.0.iter().any(|&cf| cf < -CENT)
    }
}

/// Annualized IRR of evenly spaced cash flows, as a decimal
///
/// `None` when the series is empty, has money flowing only one way, or has no
/// rate in the search bracket that zeroes its NPV. All-zero flows return 0.
pub fn irr(cashflows: &[f64], periods_per_year: u32) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }
    if cashflows.iter().all(|cf| cf.abs() < CENT) {
        return Some(0.0);
    }
    let flows = Flows(cashflows);
    if !flows.is_investment() {
        return None;
    }

    let periods = periods_per_year.max(1) as i32;
    let to_periodic = |annual: f64| (1.0 + annual).powf(1.0 / periods as f64) - 1.0;
    let to_annual = |periodic: f64| (1.0 + periodic).powi(periods) - 1.0;
    let bracket = (to_periodic(WORST_ANNUAL_RETURN), to_periodic(BEST_ANNUAL_RETURN));

    newton(&flows, to_periodic(FIRST_GUESS), bracket)
        .or_else(|| {
            log::debug!("irr: newton did not settle on {} flows, bisecting", cashflows.len());
            bisect(&flows, bracket)
        })
        .map(to_annual)
}

fn newton(flows: &Flows, guess: f64, (low, high): (f64, f64)) -> Option<f64> {
    // Pinned against the bracket edge is not a root
    let settled = flows.scale() * RATE_PRECISION;
    let mut rate = guess;
    for _ in 0..SOLVER_STEPS {
        let slope = flows.slope_at(rate);
        if slope == 0.0 || !slope.is_finite() {
            return None;
        }
        let next = (rate - flows.value_at(rate) / slope).clamp(low, high);
        if (next - rate).abs() < RATE_PRECISION {
            return (flows.value_at(next).abs() <= settled.max(CENT)).then_some(next);
        }
        rate = next;
    }
    None
}

fn bisect(flows: &Flows, (mut low, mut high): (f64, f64)) -> Option<f64> {
    let mut value_low = flows.value_at(low);
    if value_low * flows.value_at(high) > 0.0 {
        return None;
    }
    while high - low > RATE_PRECISION {
        let mid = 0.5 * (low + high);
        let value_mid = flows.value_at(mid);
        if value_mid == 0.0 {
            return Some(mid);
        }
        if (value_mid < 0.0) == (value_low < 0.0) {
            low = mid;
            value_low = value_mid;
        } else {
            high = mid;
        }
    }
    Some(0.5 * (low + high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_single_period_return() {
        let rate = irr(&[-1_000.0, 1_100.0], 1).unwrap();
        assert_abs_diff_eq!(rate, 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_monthly_series_annualized() {
        let mut cashflows = vec![-1_000.0];
        cashflows.extend(vec![0.0; 11]);
        cashflows.push(1_100.0);
        let rate = irr(&cashflows, 12).unwrap();
        assert_abs_diff_eq!(rate, 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_npv_at_irr_is_zero() {
        let cashflows = [-50_000.0, 4_000.0, 4_200.0, 4_400.0, 62_000.0];
        let rate = irr(&cashflows, 1).unwrap();
        assert_abs_diff_eq!(npv(rate, &cashflows), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_npv_discounting() {
        assert_abs_diff_eq!(npv(0.0, &[-100.0, 60.0, 60.0]), 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(npv(0.1, &[0.0, 110.0]), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_sign_change() {
        assert_eq!(irr(&[100.0, 200.0], 1), None);
        assert_eq!(irr(&[], 1), None);
        assert_eq!(irr(&[0.0, 0.0], 1), Some(0.0));
    }

    #[test]
    fn test_total_loss() {
        let rate = irr(&[-1_000.0, 0.0, 0.0, 1.0], 1).unwrap();
        assert_abs_diff_eq!(rate, -0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_bisection_within_bracket() {
        let flows = Flows(&[-1_000.0, 0.0, 0.0, 1.0]);
        let root = bisect(&flows, (-0.99, 10.0)).unwrap();
        assert_abs_diff_eq!(root, -0.9, epsilon = 1e-6);
        assert_eq!(bisect(&Flows(&[100.0, 100.0]), (-0.5, 1.0)), None);
    }
}
