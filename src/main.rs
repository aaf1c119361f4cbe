use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use trade_risk_sim::engine::run_simulation;
use trade_risk_sim::export::projection_csv;
use trade_risk_sim::types::{DaysToTarget, SimulationParams, SimulationReport};

#[derive(Parser, Debug)]
#[command(name = "trade-risk-sim")]
#[command(about = "Repeated-bet trading risk & outcome simulator")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Print verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one simulation and print the risk report
    Simulate {
        /// Starting capital
        #[arg(long, default_value = "10000.0")]
        account_size: f64,

        /// Fraction of balance risked per trade (0.01 = 1%)
        #[arg(long, default_value = "0.01")]
        risk_percent: f64,

        /// Probability a trade wins (0.55 = 55%)
        #[arg(long, default_value = "0.55")]
        win_rate: f64,

        /// Fractional gain of the risked amount on a win
        #[arg(long, default_value = "1.5")]
        avg_win: f64,

        /// Fractional loss of the risked amount on a loss
        #[arg(long, default_value = "1.0")]
        avg_loss: f64,

        /// Fractional loss cap for simulated losses (defaults to avg-loss)
        #[arg(long)]
        stop_loss: Option<f64>,

        #[arg(long, default_value = "2")]
        trades_per_day: u32,

        /// Projection horizon in trading days
        #[arg(long, default_value = "60")]
        days: u32,

        /// Number of Monte Carlo trials
        #[arg(long, default_value = "10000")]
        simulations: usize,

        /// Fix the random seed for reproducible results
        #[arg(long)]
        seed: Option<u64>,

        /// Write the full report as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,

        /// Write the compounding projection as CSV
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Commands::Simulate {
            account_size,
            risk_percent,
            win_rate,
            avg_win,
            avg_loss,
            stop_loss,
            trades_per_day,
            days,
            simulations,
            seed,
            json_out,
            csv_out,
        } => {
            let params = SimulationParams {
                account_size,
                risk_percent,
                win_rate,
                avg_win,
                avg_loss,
                stop_loss,
                trades_per_day,
                days,
                simulations: Some(simulations),
            };

            let report = run_simulation(&params, seed)?;
            print_report(&params, &report);

            if let Some(path) = json_out {
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                info!("wrote JSON report to {}", path.display());
            }

            if let Some(path) = csv_out {
                std::fs::write(&path, projection_csv(&report.projection)?)?;
                info!("wrote projection CSV to {}", path.display());
            }
        }
    }

    Ok(())
}

/// Print the risk report to stdout
fn print_report(params: &SimulationParams, report: &SimulationReport) {
    let m = &report.metrics;
    let s = &report.monte_carlo.statistics;

    println!("\n{}", "=".repeat(60));
    println!("TRADING RISK REPORT");
    println!("{}", "=".repeat(60));
    println!("Account: ${:.2} | Risk/trade: {:.1}%", m.account_size, params.risk_percent * 100.0);
    println!("Win Rate: {:.1}% | Avg Win: {:.2}R | Stop Loss: {:.2}R", params.win_rate * 100.0, params.avg_win, m.stop_loss);
    println!("{} trades/day over {} days", params.trades_per_day, params.days);

    println!("\nEXPECTANCY");
    println!("{}", "-".repeat(40));
    println!("  Risk per trade:       ${:.2}", m.risk_per_trade);
    println!("  Expected value:       {:.2}%", m.expected_value);
    println!("  Profit per trade:     ${:.2}", m.expected_profit_per_trade);
    println!("  Daily profit:         ${:.2}", m.expected_daily_profit);
    println!("  Daily growth:         {:.2}%", m.daily_growth_rate);
    println!("  Kelly fraction:       {:.2}%", m.kelly_fraction);
    println!("  Profit factor:        {:.2}", m.profit_factor);
    println!("  Payoff ratio:         {:.2}", m.payoff_ratio);
    println!("  Max loss per trade:   ${:.2}", m.max_loss_per_trade);
    println!("  Max daily loss:       ${:.2}", m.max_daily_loss);
    println!("  Sharpe ratio:         {:.2}", m.sharpe_ratio);

    println!("\nMONTE CARLO ({} trials)", params.effective_simulations());
    println!("{}", "-".repeat(40));
    println!("  Mean:             ${:.2}", s.mean);
    println!("  Median:           ${:.2}", s.median);
    println!("  Std dev:          ${:.2}", s.std_dev);
    println!("  5th percentile:   ${:.2}", s.percentile5);
    println!("  95th percentile:  ${:.2}", s.percentile95);
    println!("  Worst case:       ${:.2}", s.worst_case);
    println!("  Best case:        ${:.2}", s.best_case);
    println!("  Mean return:      {:.2}%", s.mean_return);
    println!("  Mean drawdown:    {:.2}%", s.mean_drawdown);
    println!("  Ruin probability: {:.2}%", s.ruin_probability);

    if let Some(last) = report.projection.last() {
        println!("\nPROJECTION (compounding at expectancy)");
        println!("{}", "-".repeat(40));
        println!("  Day {} balance:    ${:.2}", last.day, last.balance);
    }

    println!("\nLOSS STREAKS (expected max: {})", report.expected_max_loss_streak);
    println!("{}", "-".repeat(40));
    for entry in report.streak_probabilities.iter().take(8) {
        println!("  {:2} in a row: {:>9.4}%  ({})", entry.streak, entry.probability, entry.frequency);
    }

    println!("\nDRAWDOWN SCENARIOS");
    println!("{}", "-".repeat(40));
    for scenario in report.drawdown_scenarios.iter().take(8) {
        println!(
            "  {:2} losses: ${:>12.2} ({:>6.2}% down){}",
            scenario.consecutive_losses,
            scenario.remaining_balance,
            scenario.drawdown,
            if scenario.survivable { "" } else { "  NOT SURVIVABLE" }
        );
    }

    println!("\nRISK OF RUIN");
    println!("{}", "-".repeat(40));
    for entry in &report.risk_of_ruin {
        println!(
            "  -{:2}% level: {:>6.2}% ({} losses needed)",
            entry.drawdown_level, entry.probability, entry.losses_required
        );
    }

    println!("\nTARGETS");
    println!("{}", "-".repeat(40));
    for target in &report.target_projections {
        let days = match &target.days_needed {
            DaysToTarget::Days(d) => format!("{} days", d),
            DaysToTarget::Never => "Never".to_string(),
        };
        println!("  {:>5.0}x (${:.2}): {}", target.target_multiple, target.target_amount, days);
    }

    println!("\nRECOVERY");
    println!("{}", "-".repeat(40));
    for scenario in &report.recovery_calculations {
        println!(
            "  -{:2.0}% drawdown: needs {:>6.2}% gain ({} wins)",
            scenario.drawdown_percent, scenario.recovery_needed, scenario.wins_required
        );
    }

    println!();
}
