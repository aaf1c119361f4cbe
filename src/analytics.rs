//! Closed-Form Risk Analytics
//!
//! Single-pass calculators that complement the Monte Carlo engine:
//! expectancy, Kelly fraction, profit factor, compounding projection,
//! streak/drawdown/ruin/recovery tables, Sharpe ratio, and the expected
//! maximum loss streak. Everything here is deterministic and stateless.

use crate::types::{
    fraction_to_percent4, round2, DaysToTarget, DrawdownScenario, MonteCarloStatistics,
    ProjectionPoint, RecoveryScenario, RiskOfRuinEntry, StreakProbability, TargetProjection,
    TimeBasedAnalysis, TimeBucket,
};

/// Drawdown levels (percent) evaluated by the risk-of-ruin table
pub const RUIN_LEVELS: [u32; 8] = [10, 20, 30, 40, 50, 60, 75, 90];

/// Account multiples evaluated by the target projection table
pub const TARGET_MULTIPLES: [f64; 8] = [2.0, 3.0, 4.0, 5.0, 10.0, 20.0, 50.0, 100.0];

/// Drawdown levels (percent) evaluated by the recovery table
pub const RECOVERY_LEVELS: [f64; 5] = [10.0, 20.0, 30.0, 40.0, 50.0];

/// Streak lengths evaluated by the win/loss streak tables
pub const MAX_STREAK: u32 = 15;

/// A drawdown scenario is flagged survivable while the balance stays above
/// this fraction of starting capital
const SURVIVABLE_FLOOR: f64 = 0.3;

/// Annual risk-free rate assumed by the Sharpe ratio
const ANNUAL_RISK_FREE_RATE: f64 = 0.05;

/// Per-trade and per-day expectancy figures, unrounded.
/// Rounding happens once, at the report boundary.
#[derive(Debug, Clone)]
pub struct Expectancy {
    /// Currency amount risked per trade
    pub risk_per_trade: f64,
    /// Expected gain per unit risked (fraction)
    pub expected_value: f64,
    pub expected_profit_per_trade: f64,
    pub expected_daily_profit: f64,
    /// Expected fractional account growth per day
    pub daily_growth_rate: f64,
}

/// Closed-form expectancy: `winRate*avgWin - (1-winRate)*avgLoss` scaled by
/// the risked amount and the daily trade count. Linear in `account_size`.
pub fn expectancy(
    account_size: f64,
    risk_percent: f64,
    win_rate: f64,
    avg_win: f64,
    avg_loss: f64,
    trades_per_day: u32,
) -> Expectancy {
    let risk_per_trade = account_size * risk_percent;
    let expected_value = win_rate * avg_win - (1.0 - win_rate) * avg_loss;
    let expected_profit_per_trade = risk_per_trade * expected_value;
    let expected_daily_profit = expected_profit_per_trade * trades_per_day as f64;
    let daily_growth_rate = expected_daily_profit / account_size;

    Expectancy {
        risk_per_trade,
        expected_value,
        expected_profit_per_trade,
        expected_daily_profit,
        daily_growth_rate,
    }
}

/// Kelly fraction: `winRate - (1-winRate)/payoffRatio`.
///
/// Division by `avg_loss` is intentionally unguarded; an `avg_loss` of 0
/// propagates infinity, matching the documented open question.
pub fn kelly_fraction(win_rate: f64, avg_win: f64, avg_loss: f64) -> f64 {
    let payoff_ratio = avg_win / avg_loss;
    win_rate - (1.0 - win_rate) / payoff_ratio
}

/// Profit factor: expected gains over expected losses. Unguarded like Kelly.
pub fn profit_factor(win_rate: f64, avg_win: f64, avg_loss: f64) -> f64 {
    (win_rate * avg_win) / ((1.0 - win_rate) * avg_loss)
}

/// Deterministic compounding projection: `days + 1` points, day 0 first.
/// The accumulator compounds unrounded; only the recorded balances are
/// rounded to 2 decimals.
pub fn compounding_projection(
    account_size: f64,
    daily_growth_rate: f64,
    days: u32,
) -> Vec<ProjectionPoint> {
    let mut projection = Vec::with_capacity(days as usize + 1);
    let mut balance = account_size;

    for day in 0..=days {
        projection.push(ProjectionPoint {
            day,
            balance: round2(balance),
        });
        balance += balance * daily_growth_rate;
    }

    projection
}

/// Probability of N consecutive losses for streak lengths `1..=max_streak`.
///
/// Pass `1 - win_rate` instead to get win-streak probabilities. A rate of 0
/// yields probability 0 and frequency `"Never"` for every length.
pub fn streak_probabilities(win_rate: f64, max_streak: u32) -> Vec<StreakProbability> {
    let loss_rate = 1.0 - win_rate;

    (1..=max_streak)
        .map(|streak| {
            let probability = loss_rate.powi(streak as i32);
            let frequency = if probability > 0.0 {
                format!("1 in {}", format_frequency((1.0 / probability).round()))
            } else {
                "Never".to_string()
            };

            StreakProbability {
                streak,
                probability: fraction_to_percent4(probability),
                frequency,
            }
        })
        .collect()
}

/// Format a "1 in N" occurrence count with K/M/B abbreviations.
/// Below 10K the count is written out with thousands separators.
fn format_frequency(n: f64) -> String {
    if n >= 1_000_000_000.0 {
        abbreviate(n / 1_000_000_000.0, "B")
    } else if n >= 1_000_000.0 {
        abbreviate(n / 1_000_000.0, "M")
    } else if n >= 10_000.0 {
        format!("{:.0}K", n / 1000.0)
    } else {
        group_thousands(n as u64)
    }
}

/// One decimal with a trailing ".0" trimmed, e.g. 2.5M but 1B
fn abbreviate(value: f64, suffix: &str) -> String {
    let formatted = format!("{:.1}", value);
    let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
    format!("{}{}", trimmed, suffix)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Deterministic consecutive-loss table: each row compounds `losses`
/// stop-loss hits on a shrinking balance and reports what is left.
pub fn drawdown_scenarios(
    account_size: f64,
    risk_percent: f64,
    stop_loss: f64,
    max_losses: u32,
) -> Vec<DrawdownScenario> {
    (1..=max_losses)
        .map(|losses| {
            let mut balance = account_size;
            for _ in 0..losses {
                balance -= balance * risk_percent * stop_loss;
            }

            let drawdown = (account_size - balance) / account_size * 100.0;
            let remaining = balance / account_size * 100.0;

            DrawdownScenario {
                consecutive_losses: losses,
                remaining_balance: round2(balance),
                remaining_percent: round2(remaining),
                drawdown: round2(drawdown),
                survivable: balance > account_size * SURVIVABLE_FLOOR,
            }
        })
        .collect()
}

/// Approximate risk of ruin at each drawdown level in [`RUIN_LEVELS`].
///
/// This is the simplified gambler's-ruin approximation, kept as designed:
/// a fair game (equal rates, unit payoff) is certain ruin, an unfavorable
/// game is certain ruin, and a favorable game raises `lossRate*payoff/winRate`
/// to the number of consecutive losses needed, clamping at 1.
pub fn risk_of_ruin(
    account_size: f64,
    risk_percent: f64,
    win_rate: f64,
    avg_win: f64,
    stop_loss: f64,
) -> Vec<RiskOfRuinEntry> {
    let loss_rate = 1.0 - win_rate;
    let ratio = avg_win / stop_loss;

    RUIN_LEVELS
        .iter()
        .map(|&level| {
            let target_balance = account_size * (1.0 - level as f64 / 100.0);
            let losses_needed = ((target_balance / account_size).ln()
                / (1.0 - risk_percent * stop_loss).ln())
            .ceil()
            .abs();

            let ruin_prob = if win_rate == loss_rate && ratio == 1.0 {
                1.0
            } else if win_rate > loss_rate {
                let r = loss_rate * ratio / win_rate;
                if r >= 1.0 {
                    1.0
                } else {
                    r.powf(losses_needed)
                }
            } else {
                1.0
            };

            RiskOfRuinEntry {
                drawdown_level: level,
                probability: round2(ruin_prob.min(1.0) * 100.0),
                losses_required: losses_needed as u64,
            }
        })
        .collect()
}

/// Days to reach each target multiple under compound daily growth.
/// Flat or negative growth never reaches any target.
pub fn target_projections(
    account_size: f64,
    daily_growth_rate: f64,
    target_multiples: &[f64],
) -> Vec<TargetProjection> {
    target_multiples
        .iter()
        .map(|&multiple| {
            let target_amount = account_size * multiple;

            let days_needed = if daily_growth_rate <= 0.0 {
                DaysToTarget::Never
            } else {
                DaysToTarget::Days((multiple.ln() / (1.0 + daily_growth_rate).ln()).ceil() as u64)
            };

            TargetProjection {
                target_multiple: multiple,
                target_amount: round2(target_amount),
                profit_needed: round2(target_amount - account_size),
                days_needed,
            }
        })
        .collect()
}

/// Trading-calendar buckets over the compounding projection. Day indices
/// past the projection horizon clamp to the last point.
pub fn time_based_analysis(
    projection: &[ProjectionPoint],
    trades_per_day: u32,
) -> TimeBasedAnalysis {
    let trades = trades_per_day as u64;

    TimeBasedAnalysis {
        daily: bucket_at(projection, 1, trades),
        weekly: bucket_at(projection, 5, trades * 5),
        monthly: bucket_at(projection, 21, trades * 21),
        quarterly: bucket_at(projection, 63, trades * 63),
        yearly: bucket_at(projection, 252, trades * 252),
    }
}

fn bucket_at(projection: &[ProjectionPoint], day_index: usize, trades: u64) -> TimeBucket {
    let start_balance = projection.first().map(|p| p.balance).unwrap_or(0.0);
    let balance = if projection.is_empty() {
        0.0
    } else {
        projection[day_index.min(projection.len() - 1)].balance
    };

    let growth = if start_balance > 0.0 {
        round2((balance - start_balance) / start_balance * 100.0)
    } else {
        0.0
    };

    TimeBucket {
        trades,
        balance,
        growth,
    }
}

/// Gain and win count required to climb back from each drawdown level.
/// A 50% drawdown needs a 100% gain on the remaining capital.
pub fn recovery_scenarios(
    risk_percent: f64,
    avg_win: f64,
    drawdown_levels: &[f64],
) -> Vec<RecoveryScenario> {
    drawdown_levels
        .iter()
        .map(|&drawdown| {
            let remaining_capital = 1.0 - drawdown / 100.0;
            let recovery_needed = (drawdown / 100.0) / remaining_capital;
            let wins_required = (recovery_needed / (risk_percent * avg_win)).ceil();

            RecoveryScenario {
                drawdown_percent: drawdown,
                recovery_needed: round2(recovery_needed * 100.0),
                wins_required: wins_required as u64,
                remaining_capital: round2(remaining_capital * 100.0),
            }
        })
        .collect()
}

/// Sharpe ratio from the Monte Carlo mean return and standard deviation,
/// against a 5% annual risk-free rate scaled to the simulated period
/// (`totalTrades / (252 * 2)` years). Zero normalized deviation gives 0.
pub fn sharpe_ratio(
    statistics: &MonteCarloStatistics,
    account_size: f64,
    total_trades: u64,
) -> f64 {
    let total_return = statistics.mean_return / 100.0;
    let std_dev = statistics.std_dev / account_size;

    if std_dev == 0.0 {
        return 0.0;
    }

    let years_in_period = total_trades as f64 / (252.0 * 2.0);
    let risk_free_rate = ANNUAL_RISK_FREE_RATE * years_in_period;

    round2((total_return - risk_free_rate) / std_dev)
}

/// Expected maximum loss streak over `total_trades` trades, using the
/// `ln(n) / ln(1/lossRate)` approximation. Degenerate loss rates (0 or >= 1)
/// and an empty horizon return 0.
pub fn expected_max_loss_streak(loss_rate: f64, total_trades: u64) -> u32 {
    if loss_rate <= 0.0 || loss_rate >= 1.0 || total_trades == 0 {
        return 0;
    }

    ((total_trades as f64).ln() / (1.0 / loss_rate).ln()).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expectancy_scales_linearly_with_capital() {
        let base = expectancy(1000.0, 0.02, 0.55, 1.5, 1.0, 3);
        let doubled = expectancy(2000.0, 0.02, 0.55, 1.5, 1.0, 3);
        assert_eq!(doubled.risk_per_trade, base.risk_per_trade * 2.0);
        assert_eq!(doubled.expected_daily_profit, base.expected_daily_profit * 2.0);
        // Growth rate is capital-independent
        assert!((doubled.daily_growth_rate - base.daily_growth_rate).abs() < 1e-12);
    }

    #[test]
    fn test_expectancy_values() {
        let e = expectancy(1000.0, 0.1, 1.0, 0.1, 0.0, 1);
        assert_eq!(e.risk_per_trade, 100.0);
        assert!((e.expected_value - 0.1).abs() < 1e-12);
        assert!((e.expected_profit_per_trade - 10.0).abs() < 1e-12);
        assert!((e.daily_growth_rate - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_kelly_and_profit_factor() {
        // 60% win rate, 2:1 payoff: kelly = 0.6 - 0.4/2 = 0.4
        assert!((kelly_fraction(0.6, 2.0, 1.0) - 0.4).abs() < 1e-12);
        // PF = (0.6*2)/(0.4*1) = 3
        assert!((profit_factor(0.6, 2.0, 1.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_compounding_projection_hundred_percent_win() {
        let projection = compounding_projection(1000.0, 0.01, 2);
        assert_eq!(projection.len(), 3);
        assert_eq!(projection[0].day, 0);
        assert_eq!(projection[0].balance, 1000.0);
        assert_eq!(projection[1].balance, 1010.0);
        assert_eq!(projection[2].balance, 1020.1);
    }

    #[test]
    fn test_streak_probabilities_fair_coin() {
        let streaks = streak_probabilities(0.5, 3);
        let probs: Vec<f64> = streaks.iter().map(|s| s.probability).collect();
        assert_eq!(probs, vec![50.0, 25.0, 12.5]);
        assert_eq!(streaks[0].frequency, "1 in 2");
        assert_eq!(streaks[2].frequency, "1 in 8");
    }

    #[test]
    fn test_streak_probabilities_perfect_win_rate() {
        for entry in streak_probabilities(1.0, 5) {
            assert_eq!(entry.probability, 0.0);
            assert_eq!(entry.frequency, "Never");
        }
    }

    #[test]
    fn test_frequency_formatting() {
        assert_eq!(format_frequency(8.0), "8");
        assert_eq!(format_frequency(1500.0), "1,500");
        assert_eq!(format_frequency(15000.0), "15K");
        assert_eq!(format_frequency(2_500_000.0), "2.5M");
        assert_eq!(format_frequency(1_000_000_000.0), "1B");
    }

    #[test]
    fn test_drawdown_scenarios_compound_exactly() {
        let scenarios = drawdown_scenarios(1000.0, 0.10, 1.0, 2);
        assert_eq!(scenarios[0].remaining_balance, 900.0);
        assert_eq!(scenarios[1].remaining_balance, 810.0);
        assert_eq!(scenarios[0].drawdown, 10.0);
        assert_eq!(scenarios[1].drawdown, 19.0);
        assert!(scenarios[1].survivable);
    }

    #[test]
    fn test_drawdown_scenarios_survivability_floor() {
        let scenarios = drawdown_scenarios(1000.0, 0.10, 1.0, 15);
        // 12 losses leaves ~282, below the 30% floor
        assert!(scenarios[10].survivable);
        assert!(!scenarios[11].survivable);
    }

    #[test]
    fn test_risk_of_ruin_unfavorable_game_is_certain() {
        for entry in risk_of_ruin(10000.0, 0.02, 0.40, 1.0, 1.0) {
            assert_eq!(entry.probability, 100.0);
        }
    }

    #[test]
    fn test_risk_of_ruin_favorable_game_decays_with_depth() {
        let entries = risk_of_ruin(10000.0, 0.02, 0.60, 1.0, 1.0);
        for window in entries.windows(2) {
            assert!(window[0].probability >= window[1].probability);
            assert!(window[0].losses_required <= window[1].losses_required);
        }
        assert!(entries[0].probability < 100.0);
    }

    #[test]
    fn test_target_projections_flat_growth_never_arrives() {
        let targets = target_projections(1000.0, 0.0, &TARGET_MULTIPLES);
        for t in &targets {
            assert_eq!(t.days_needed, DaysToTarget::Never);
        }
        assert_eq!(targets[0].target_amount, 2000.0);
        assert_eq!(targets[0].profit_needed, 1000.0);
    }

    #[test]
    fn test_target_projections_doubling_time() {
        let targets = target_projections(1000.0, 0.01, &[2.0]);
        // ln(2)/ln(1.01) = 69.66 -> 70 days
        assert_eq!(targets[0].days_needed, DaysToTarget::Days(70));
    }

    #[test]
    fn test_time_based_analysis_clamps_to_horizon() {
        let projection = compounding_projection(1000.0, 0.01, 10);
        let analysis = time_based_analysis(&projection, 2);
        assert_eq!(analysis.daily.trades, 2);
        assert_eq!(analysis.yearly.trades, 504);
        assert_eq!(analysis.daily.balance, 1010.0);
        // Weekly lands inside the horizon, yearly clamps to day 10
        assert_eq!(analysis.weekly.balance, projection[5].balance);
        assert_eq!(analysis.yearly.balance, projection[10].balance);
        assert_eq!(analysis.daily.growth, 1.0);
    }

    #[test]
    fn test_recovery_scenarios_half_drawdown_needs_full_recovery() {
        let scenarios = recovery_scenarios(0.01, 2.0, &RECOVERY_LEVELS);
        let half = &scenarios[4];
        assert_eq!(half.drawdown_percent, 50.0);
        assert_eq!(half.recovery_needed, 100.0);
        assert_eq!(half.remaining_capital, 50.0);
        // 100% gain at 2% per win
        assert_eq!(half.wins_required, 50);
    }

    #[test]
    fn test_sharpe_ratio_zero_deviation() {
        let statistics = MonteCarloStatistics {
            mean: 1000.0,
            median: 1000.0,
            std_dev: 0.0,
            percentile5: 1000.0,
            percentile95: 1000.0,
            worst_case: 1000.0,
            best_case: 1000.0,
            mean_return: 5.0,
            mean_drawdown: 0.0,
            ruin_probability: 0.0,
        };
        assert_eq!(sharpe_ratio(&statistics, 1000.0, 100), 0.0);
    }

    #[test]
    fn test_sharpe_ratio_positive_edge() {
        let statistics = MonteCarloStatistics {
            mean: 1100.0,
            median: 1100.0,
            std_dev: 200.0,
            percentile5: 900.0,
            percentile95: 1300.0,
            worst_case: 800.0,
            best_case: 1400.0,
            mean_return: 10.0,
            mean_drawdown: 5.0,
            ruin_probability: 0.0,
        };
        // period = 504/504 = 1 year, rf = 0.05; (0.10 - 0.05) / 0.2 = 0.25
        assert_eq!(sharpe_ratio(&statistics, 1000.0, 504), 0.25);
    }

    #[test]
    fn test_expected_max_loss_streak() {
        assert_eq!(expected_max_loss_streak(0.0, 1000), 0);
        assert_eq!(expected_max_loss_streak(1.0, 1000), 0);
        assert_eq!(expected_max_loss_streak(0.5, 0), 0);
        // ln(1000)/ln(2) = 9.97 -> 10
        assert_eq!(expected_max_loss_streak(0.5, 1000), 10);
    }
}
