//! Monte Carlo Engine
//!
//! Runs independent trade-sequence trials in parallel with Rayon and reduces
//! them to order statistics, distributional summaries, and an ending-balance
//! histogram.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::histogram;
use crate::sampler::{run_trial, TrialConfig};
use crate::types::{round2, MonteCarloStatistics, MonteCarloSummary, TrialResult};

/// Histogram bin count for the ending-balance distribution
const HISTOGRAM_BINS: usize = 20;

/// Run `simulations` independent trials and aggregate their outcomes.
///
/// Each trial gets its own `StdRng` derived from `base_seed + trial index`,
/// so a fixed seed reproduces identical statistics regardless of how Rayon
/// schedules the trials. Pass `None` to draw a fresh seed from the thread RNG.
///
/// `simulations` must be >= 1; the orchestrator validates this before calling.
pub fn run_monte_carlo(
    config: &TrialConfig,
    simulations: usize,
    seed: Option<u64>,
) -> MonteCarloSummary {
    let base_seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    debug!(
        simulations,
        total_trades = config.total_trades,
        base_seed,
        "running Monte Carlo trials"
    );

    let mut results: Vec<TrialResult> = (0..simulations as u64)
        .into_par_iter()
        .map(|trial| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(trial));
            run_trial(config, &mut rng)
        })
        .collect();

    results.sort_by(|a, b| a.ending_balance.partial_cmp(&b.ending_balance).unwrap());

    let n = simulations as f64;
    let ending_balances: Vec<f64> = results.iter().map(|r| r.ending_balance).collect();

    let mean = ending_balances.iter().sum::<f64>() / n;
    let median = ending_balances[simulations / 2];
    let percentile5 = ending_balances[(n * 0.05) as usize];
    let percentile95 = ending_balances[(n * 0.95) as usize];
    let worst_case = ending_balances[0];
    let best_case = ending_balances[simulations - 1];

    let mean_return = results.iter().map(|r| r.return_pct).sum::<f64>() / n;
    let mean_drawdown = results.iter().map(|r| r.max_drawdown).sum::<f64>() / n;

    // Population variance: divide by n, not n - 1
    let variance = ending_balances
        .iter()
        .map(|&b| (b - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    let ruined = results.iter().filter(|r| r.ending_balance == 0.0).count();

    MonteCarloSummary {
        statistics: MonteCarloStatistics {
            mean: round2(mean),
            median: round2(median),
            std_dev: round2(std_dev),
            percentile5: round2(percentile5),
            percentile95: round2(percentile95),
            worst_case: round2(worst_case),
            best_case: round2(best_case),
            mean_return: round2(mean_return),
            mean_drawdown: round2(mean_drawdown),
            ruin_probability: round2(ruined as f64 / n * 100.0),
        },
        histogram: histogram::build(&ending_balances, HISTOGRAM_BINS),
    }
}
