//! Simulation Orchestrator
//!
//! The single entry point of the engine: validates inputs, runs the
//! closed-form analytics and the Monte Carlo engine, and assembles one
//! aggregated report. Each call is independent and stateless, so concurrent
//! callers need no coordination.

use anyhow::{bail, Result};
use tracing::info;

use crate::analytics::{
    self, MAX_STREAK, RECOVERY_LEVELS, TARGET_MULTIPLES,
};
use crate::monte_carlo::run_monte_carlo;
use crate::sampler::TrialConfig;
use crate::types::{round2, Metrics, SimulationParams, SimulationReport};

/// Validate parameters, then compute the full report.
///
/// Fails fast with a descriptive error on invalid input; no partial results
/// are ever returned. `seed` fixes the Monte Carlo random source for
/// reproducible runs; `None` draws fresh entropy.
pub fn run_simulation(params: &SimulationParams, seed: Option<u64>) -> Result<SimulationReport> {
    validate(params)?;

    let stop_loss = params.effective_stop_loss();
    let simulations = params.effective_simulations();
    let total_trades = params.total_trades();

    info!(
        account_size = params.account_size,
        risk_percent = params.risk_percent,
        win_rate = params.win_rate,
        simulations,
        total_trades,
        "running simulation"
    );

    let expectancy = analytics::expectancy(
        params.account_size,
        params.risk_percent,
        params.win_rate,
        params.avg_win,
        params.avg_loss,
        params.trades_per_day,
    );

    let projection = analytics::compounding_projection(
        params.account_size,
        expectancy.daily_growth_rate,
        params.days,
    );

    let monte_carlo = run_monte_carlo(
        &TrialConfig {
            account_size: params.account_size,
            risk_percent: params.risk_percent,
            win_rate: params.win_rate,
            avg_win: params.avg_win,
            stop_loss,
            total_trades,
        },
        simulations,
        seed,
    );

    let sharpe_ratio =
        analytics::sharpe_ratio(&monte_carlo.statistics, params.account_size, total_trades);

    let payoff_ratio = params.avg_win / params.avg_loss;
    let kelly_fraction =
        analytics::kelly_fraction(params.win_rate, params.avg_win, params.avg_loss);
    let profit_factor =
        analytics::profit_factor(params.win_rate, params.avg_win, params.avg_loss);
    let max_loss_per_trade = expectancy.risk_per_trade * stop_loss;

    let metrics = Metrics {
        account_size: params.account_size,
        risk_per_trade: round2(expectancy.risk_per_trade),
        expected_value: round2(expectancy.expected_value * 100.0),
        expected_profit_per_trade: round2(expectancy.expected_profit_per_trade),
        expected_daily_profit: round2(expectancy.expected_daily_profit),
        daily_growth_rate: round2(expectancy.daily_growth_rate * 100.0),
        kelly_fraction: round2(kelly_fraction * 100.0),
        profit_factor: round2(profit_factor),
        payoff_ratio: round2(payoff_ratio),
        max_loss_per_trade: round2(max_loss_per_trade),
        max_daily_loss: round2(max_loss_per_trade * params.trades_per_day as f64),
        stop_loss,
        sharpe_ratio,
    };

    Ok(SimulationReport {
        metrics,
        streak_probabilities: analytics::streak_probabilities(params.win_rate, MAX_STREAK),
        win_streak_probabilities: analytics::streak_probabilities(
            1.0 - params.win_rate,
            MAX_STREAK,
        ),
        drawdown_scenarios: analytics::drawdown_scenarios(
            params.account_size,
            params.risk_percent,
            stop_loss,
            MAX_STREAK,
        ),
        risk_of_ruin: analytics::risk_of_ruin(
            params.account_size,
            params.risk_percent,
            params.win_rate,
            params.avg_win,
            stop_loss,
        ),
        target_projections: analytics::target_projections(
            params.account_size,
            expectancy.daily_growth_rate,
            &TARGET_MULTIPLES,
        ),
        time_based_analysis: analytics::time_based_analysis(&projection, params.trades_per_day),
        recovery_calculations: analytics::recovery_scenarios(
            params.risk_percent,
            params.avg_win,
            &RECOVERY_LEVELS,
        ),
        expected_max_loss_streak: analytics::expected_max_loss_streak(
            1.0 - params.win_rate,
            total_trades,
        ),
        projection,
        monte_carlo,
    })
}

fn validate(params: &SimulationParams) -> Result<()> {
    if !(params.account_size > 0.0) {
        bail!("Invalid account size");
    }
    if !(0.0..=1.0).contains(&params.risk_percent) {
        bail!("Invalid risk percent (must be between 0 and 100%)");
    }
    if !(0.0..=1.0).contains(&params.win_rate) {
        bail!("Invalid win rate");
    }
    if params.effective_simulations() == 0 {
        bail!("Invalid simulation count (must be at least 1)");
    }
    Ok(())
}
