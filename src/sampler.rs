use rand::Rng;

use crate::types::{round2, TrialResult};

/// Parameters for a single simulated path
#[derive(Debug, Clone)]
pub struct TrialConfig {
    pub account_size: f64,
    /// Fraction of the current balance risked per trade
    pub risk_percent: f64,
    pub win_rate: f64,
    /// Fractional gain of the risked amount on a win
    pub avg_win: f64,
    /// Fractional loss of the risked amount on a loss (stop loss, not avg loss)
    pub stop_loss: f64,
    pub total_trades: u64,
}

/// Simulate one full sequence of trades.
///
/// Each trade risks `balance * risk_percent`; a uniform draw below `win_rate`
/// wins `risk * avg_win`, otherwise loses `risk * stop_loss`. Balance is
/// compounding, so position size shrinks with the balance. A balance at or
/// below zero is clamped to exactly 0 and ends the path early (ruin is
/// absorbing).
///
/// The random source is injected so tests can seed it; production callers
/// pass an unseeded generator.
pub fn run_trial<R: Rng + ?Sized>(config: &TrialConfig, rng: &mut R) -> TrialResult {
    let mut balance = config.account_size;
    let mut peak_balance = config.account_size;
    let mut max_drawdown = 0.0f64;

    for _ in 0..config.total_trades {
        let risk = balance * config.risk_percent;

        if rng.gen::<f64>() < config.win_rate {
            balance += risk * config.avg_win;
        } else {
            balance -= risk * config.stop_loss;
        }

        if balance > peak_balance {
            peak_balance = balance;
        }

        let current_drawdown = (peak_balance - balance) / peak_balance;
        if current_drawdown > max_drawdown {
            max_drawdown = current_drawdown;
        }

        if balance <= 0.0 {
            balance = 0.0;
            break;
        }
    }

    TrialResult {
        ending_balance: round2(balance),
        max_drawdown: round2(max_drawdown * 100.0),
        return_pct: round2((balance - config.account_size) / config.account_size * 100.0),
    }
}
