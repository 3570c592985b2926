// demos/crosscheck.rs
//! Cross-check analytic and Monte Carlo prices and Greeks for one option.
//!
//! ```text
//! cargo run --release --example crosscheck -- [Call|Put] [S K T r sigma q] [--sims N] [--seed N]
//! RUST_LOG=bsm_crosscheck=debug cargo run --example crosscheck
//! ```
use bsm_crosscheck::analytics::path_value::option_value_path;
use bsm_crosscheck::analytics::surface::default_surface;
use bsm_crosscheck::greeks::FirstOrderGreek;
use bsm_crosscheck::math_utils::Timer;
use bsm_crosscheck::mc::mc_engine::{payoff_distribution, simulate_paths};
use bsm_crosscheck::sweep::{compare_prices, default_sweep};
use bsm_crosscheck::{
    bs_greeks, mc_greeks_with_draws, simulate_with_stats, Field, GreekComparison, OptionParams,
    OptionType, SimulationConfig,
};
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Args {
    option_type: OptionType,
    values: [f64; 6],
    cfg: SimulationConfig,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut option_type = OptionType::Call;
    let mut values = [105.0, 100.0, 1.0, 0.05, 0.2, 0.015];
    let mut cfg = SimulationConfig::default().with_seed(42);

    let mut positional = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sims" => cfg.num_simulations = args.next().ok_or("--sims needs a value")?.parse()?,
            "--seed" => cfg.seed = Some(args.next().ok_or("--seed needs a value")?.parse()?),
            "--unseeded" => cfg.seed = None,
            _ => positional.push(arg),
        }
    }

    let mut rest = positional.as_slice();
    if let Some(first) = rest.first() {
        if first.parse::<f64>().is_err() {
            option_type = first.parse()?;
            rest = &rest[1..];
        }
    }
    for (slot, raw) in values.iter_mut().zip(rest) {
        *slot = raw.parse()?;
    }

    Ok(Args {
        option_type,
        values,
        cfg,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Args {
        option_type,
        values: [s, k, t, r, sigma, q],
        cfg,
    } = parse_args()?;
    let params = OptionParams::new(option_type, s, k, t, r, sigma, q)?;
    info!(?params, num_simulations = cfg.num_simulations, seed = ?cfg.seed, "crosscheck");

    println!("=== {} option: S={} K={} T={} r={} σ={} q={} ===", option_type, s, k, t, r, sigma, q);

    // Prices
    let mut timer = Timer::new();
    timer.start();
    let cmp = compare_prices(&params, &cfg)?;
    let estimate = simulate_with_stats(&params, &cfg, None)?;
    println!("\nBlack-Scholes price: {:.4}", cmp.analytic);
    println!(
        "Monte Carlo price:   {:.4} ± {:.4} ({} paths, {:.1} ms)",
        estimate.price,
        estimate.std_error,
        estimate.num_simulations,
        timer.elapsed_ms()
    );
    println!("Difference: {:.2}%", cmp.pct_difference);

    // Greeks, every bump sharing one draw matrix
    timer.start();
    let draws = cfg.draw_matrix();
    let analytic = bs_greeks(&params)?;
    let mc = mc_greeks_with_draws(&params, &cfg, &draws)?;
    println!("\n{}", GreekComparison::new(&analytic, &mc));
    info!(elapsed_ms = timer.elapsed_ms(), "greeks done");

    // Sweeps
    for field in [Field::Volatility, Field::TimeToExpiration, Field::StrikePrice] {
        let series = default_sweep(&params, field, &cfg)?;
        println!("\n{:<20} {:>12} {:>12}", field, "BS", "MC");
        for ((x, a), m) in series.values.iter().zip(&series.analytic).zip(&series.monte_carlo) {
            println!("{:<20.4} {:>12.4} {:>12.4}", x, a, m);
        }
    }

    // Payoff distribution
    let dist = payoff_distribution(&params, &cfg, None)?;
    let upper = dist.percentile(99.0);
    println!(
        "\nDiscounted payoffs: mean {:.4}, std {:.4}, min {:.4}, max {:.4}, p99 {:.4}",
        dist.mean, dist.std_dev, dist.min, dist.max, upper
    );
    let counts = dist.histogram(20, upper);
    let peak = counts.iter().copied().max().unwrap_or(1).max(1);
    let width = upper / counts.len() as f64;
    for (i, count) in counts.iter().enumerate() {
        let bar = "#".repeat(count * 50 / peak);
        println!("{:>8.2} | {}", i as f64 * width, bar);
    }

    // Option value along a few simulated paths
    let sample = simulate_paths(&params, &SimulationConfig::new(5).with_seed(cfg.seed.unwrap_or(0)), None)?;
    println!("\nOption value by day (0, 91, 182, 273, 365):");
    for row in sample.paths.rows() {
        let values = option_value_path(&params, row)?;
        let picks: Vec<String> = [0, 91, 182, 273, 365].iter().map(|&d| format!("{:>9.4}", values[d])).collect();
        println!("  {}", picks.join(" "));
    }

    // Delta surface corners
    let surface = default_surface(&params, FirstOrderGreek::Delta)?;
    let (rows, cols) = surface.values.dim();
    println!(
        "\nDelta surface {}×{}: [{:.4}, {:.4}; {:.4}, {:.4}]",
        rows,
        cols,
        surface.values[[0, 0]],
        surface.values[[0, cols - 1]],
        surface.values[[rows - 1, 0]],
        surface.values[[rows - 1, cols - 1]]
    );

    Ok(())
}
