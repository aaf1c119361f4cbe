use serde::{Deserialize, Serialize};

/// Default Monte Carlo trial count when the caller does not specify one
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Round a monetary or percentage value to 2 decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round a fractional probability to a percent value with 4 decimals.
/// Small streak probabilities (< 1%) keep their extra precision this way.
pub fn fraction_to_percent4(fraction: f64) -> f64 {
    (fraction * 1_000_000.0).round() / 10_000.0
}

/// Input parameters for one simulation run.
///
/// `stop_loss` and `simulations` are optional with documented defaults:
/// an unset `stop_loss` falls back to `avg_loss` (an explicit 0.0 is kept
/// as-is), and an unset `simulations` falls back to [`DEFAULT_SIMULATIONS`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    /// Starting capital (currency)
    pub account_size: f64,
    /// Fraction of current balance risked per trade, in [0, 1]
    pub risk_percent: f64,
    /// Probability a trade wins, in [0, 1]
    pub win_rate: f64,
    /// Fractional gain of the risked amount on a winning trade
    pub avg_win: f64,
    /// Fractional loss of the risked amount on a losing trade
    pub avg_loss: f64,
    /// Fractional loss cap used in place of `avg_loss` for simulated losses
    #[serde(default)]
    pub stop_loss: Option<f64>,
    pub trades_per_day: u32,
    /// Projection horizon in trading days
    pub days: u32,
    /// Number of Monte Carlo trials
    #[serde(default)]
    pub simulations: Option<usize>,
}

impl SimulationParams {
    /// Effective stop loss: `stop_loss` if set, otherwise `avg_loss`
    pub fn effective_stop_loss(&self) -> f64 {
        self.stop_loss.unwrap_or(self.avg_loss)
    }

    /// Effective Monte Carlo trial count
    pub fn effective_simulations(&self) -> usize {
        self.simulations.unwrap_or(DEFAULT_SIMULATIONS)
    }

    /// Total trades over the projection horizon
    pub fn total_trades(&self) -> u64 {
        self.trades_per_day as u64 * self.days as u64
    }
}

/// Outcome of a single simulated path
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    /// Ending balance, clamped to 0 on ruin
    pub ending_balance: f64,
    /// Max peak-to-trough drawdown over the path (percent, 0-100)
    pub max_drawdown: f64,
    /// Percent return relative to starting capital (signed)
    #[serde(rename = "return")]
    pub return_pct: f64,
}

/// Order statistics and distributional summaries over all trials
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloStatistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub percentile5: f64,
    pub percentile95: f64,
    pub worst_case: f64,
    pub best_case: f64,
    pub mean_return: f64,
    pub mean_drawdown: f64,
    /// Percent of trials ending at exactly balance 0
    pub ruin_probability: f64,
}

/// Binned ending-balance distribution. `labels` holds bin lower bounds;
/// zero-count bins are removed from both arrays in lockstep.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    pub labels: Vec<f64>,
    pub data: Vec<usize>,
}

/// Monte Carlo output: statistics plus the ending-balance histogram
#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloSummary {
    pub statistics: MonteCarloStatistics,
    pub histogram: Histogram,
}

/// One point of the deterministic compounding projection
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionPoint {
    pub day: u32,
    pub balance: f64,
}

/// Probability of a win/loss streak of a given length
#[derive(Debug, Clone, Serialize)]
pub struct StreakProbability {
    pub streak: u32,
    /// Percent, 4-decimal precision
    pub probability: f64,
    /// "1 in N" with K/M/B abbreviation, or "Never"
    pub frequency: String,
}

/// Deterministic consecutive-loss scenario
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownScenario {
    pub consecutive_losses: u32,
    pub remaining_balance: f64,
    pub remaining_percent: f64,
    pub drawdown: f64,
    pub survivable: bool,
}

/// Approximate probability of drawing down to a given level
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskOfRuinEntry {
    /// Drawdown level in percent (e.g. 50 = half the account)
    pub drawdown_level: u32,
    /// Percent, clamped to [0, 100]
    pub probability: f64,
    pub losses_required: u64,
}

/// Days needed to reach a target multiple, or never under flat/negative growth
#[derive(Debug, Clone, PartialEq)]
pub enum DaysToTarget {
    Days(u64),
    Never,
}

impl Serialize for DaysToTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DaysToTarget::Days(d) => serializer.serialize_u64(*d),
            DaysToTarget::Never => serializer.serialize_str("Never"),
        }
    }
}

/// Time to grow the account to a target multiple under compounding
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetProjection {
    pub target_multiple: f64,
    pub target_amount: f64,
    pub profit_needed: f64,
    pub days_needed: DaysToTarget,
}

/// Expected trades, balance, and growth over one calendar bucket
#[derive(Debug, Clone, Serialize)]
pub struct TimeBucket {
    pub trades: u64,
    pub balance: f64,
    /// Percent growth versus the day-0 balance
    pub growth: f64,
}

/// Trading-calendar view of the compounding projection
#[derive(Debug, Clone, Serialize)]
pub struct TimeBasedAnalysis {
    pub daily: TimeBucket,
    pub weekly: TimeBucket,
    pub monthly: TimeBucket,
    pub quarterly: TimeBucket,
    pub yearly: TimeBucket,
}

/// Gain and win count needed to recover from a drawdown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryScenario {
    pub drawdown_percent: f64,
    /// Percent gain required to return to the original balance
    pub recovery_needed: f64,
    pub wins_required: u64,
    /// Percent of capital remaining at the drawdown level
    pub remaining_capital: f64,
}

/// Closed-form expectancy and risk metrics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub account_size: f64,
    pub risk_per_trade: f64,
    /// Expectancy per unit risked, in percent
    pub expected_value: f64,
    pub expected_profit_per_trade: f64,
    pub expected_daily_profit: f64,
    /// Percent growth per day
    pub daily_growth_rate: f64,
    /// Percent of capital, may be negative or infinite when avg_loss is 0
    pub kelly_fraction: f64,
    pub profit_factor: f64,
    pub payoff_ratio: f64,
    pub max_loss_per_trade: f64,
    pub max_daily_loss: f64,
    pub stop_loss: f64,
    pub sharpe_ratio: f64,
}

/// Aggregated result of one orchestrated simulation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub metrics: Metrics,
    pub projection: Vec<ProjectionPoint>,
    pub monte_carlo: MonteCarloSummary,
    pub streak_probabilities: Vec<StreakProbability>,
    pub drawdown_scenarios: Vec<DrawdownScenario>,
    pub risk_of_ruin: Vec<RiskOfRuinEntry>,
    pub target_projections: Vec<TargetProjection>,
    pub time_based_analysis: TimeBasedAnalysis,
    pub recovery_calculations: Vec<RecoveryScenario>,
    pub win_streak_probabilities: Vec<StreakProbability>,
    pub expected_max_loss_streak: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1020.10499), 1020.1);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(-3.456), -3.46);
    }

    #[test]
    fn test_fraction_to_percent4() {
        assert_eq!(fraction_to_percent4(0.125), 12.5);
        assert_eq!(fraction_to_percent4(0.0000305175), 0.0031);
    }

    #[test]
    fn test_stop_loss_default_keeps_explicit_zero() {
        let mut params = SimulationParams {
            account_size: 1000.0,
            risk_percent: 0.1,
            win_rate: 0.5,
            avg_win: 2.0,
            avg_loss: 1.0,
            stop_loss: None,
            trades_per_day: 2,
            days: 10,
            simulations: None,
        };
        assert_eq!(params.effective_stop_loss(), 1.0);
        params.stop_loss = Some(0.0);
        assert_eq!(params.effective_stop_loss(), 0.0);
        assert_eq!(params.total_trades(), 20);
        assert_eq!(params.effective_simulations(), DEFAULT_SIMULATIONS);
    }

    #[test]
    fn test_days_to_target_serialization() {
        assert_eq!(
            serde_json::to_string(&DaysToTarget::Days(42)).unwrap(),
            "42"
        );
        assert_eq!(
            serde_json::to_string(&DaysToTarget::Never).unwrap(),
            "\"Never\""
        );
    }
}
