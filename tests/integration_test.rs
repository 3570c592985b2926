// tests/integration_test.rs
use approx::assert_relative_eq;
use bsm_crosscheck::analytics::path_value::option_value_path;
use bsm_crosscheck::mc::mc_engine::{payoff_distribution, simulate_paths};
use bsm_crosscheck::sweep::{compare_prices, default_sweep};
use bsm_crosscheck::{
    black_scholes_price, bs_greeks, bs_price, monte_carlo_price, simulate, simulate_with_stats, sweep,
    Field, OptionParams, OptionType, PricingError, SimulationConfig,
};
use proptest::prelude::*;

const REFERENCE_CALL: f64 = 12.746_381_650_640_103;
const REFERENCE_PUT: f64 = 4.432_570_442_389_924;

fn params(option_type: OptionType) -> OptionParams {
    OptionParams::new(option_type, 105.0, 100.0, 1.0, 0.05, 0.2, 0.015).unwrap()
}

#[test]
fn test_reference_prices() {
    assert_relative_eq!(bs_price(&params(OptionType::Call)).unwrap(), REFERENCE_CALL, max_relative = 1e-12);
    let put = black_scholes_price(OptionType::Put, 105.0, 100.0, 1.0, 0.05, 0.2, 0.015).unwrap();
    assert_relative_eq!(put, REFERENCE_PUT, max_relative = 1e-12);
}

#[test]
fn test_mc_vs_analytic_200k() {
    let p = params(OptionType::Call);
    let cfg = SimulationConfig::new(200_000).with_seed(42);

    let analytic = bs_price(&p).unwrap();
    let mc = simulate(&p, &cfg, None).unwrap();
    let rel_error = (mc - analytic).abs() / analytic;

    println!("\nMC price: {}", mc);
    println!("Analytic price: {}", analytic);
    println!("Relative error: {}", rel_error);

    assert!(rel_error < 0.01, "Relative error exceeds 1%: {}", rel_error);
}

#[test]
fn test_mc_within_three_standard_errors() {
    let p = params(OptionType::Call);
    let estimate = simulate_with_stats(&p, &SimulationConfig::new(10_000).with_seed(2024), None).unwrap();
    assert_eq!(estimate.num_simulations, 10_000);
    assert!(estimate.std_error > 0.0);
    let z = (estimate.price - REFERENCE_CALL) / estimate.std_error;
    println!("MC {} ± {} (z = {:.2})", estimate.price, estimate.std_error, z);
    assert!(z.abs() <= 3.0, "estimate {} is {:.2} standard errors away", estimate.price, z);
}

#[test]
fn test_put_mc_vs_analytic() {
    let cfg = SimulationConfig::new(100_000).with_seed(5);
    let mc = monte_carlo_price(OptionType::Put, 105.0, 100.0, 1.0, 0.05, 0.2, 0.015, &cfg, None).unwrap();
    assert!((mc - REFERENCE_PUT).abs() / REFERENCE_PUT < 0.03);
}

#[test]
fn test_shape_mismatch_5_by_10() {
    let cfg = SimulationConfig::new(5);
    let draws = ndarray::Array2::<f64>::zeros((5, 10));
    let err = simulate(&params(OptionType::Call), &cfg, Some(&draws)).unwrap_err();
    assert_eq!(
        err,
        PricingError::ShapeMismatch {
            expected: (5, 365),
            actual: (5, 10)
        }
    );
    assert!(err.to_string().contains("(5, 10)"));
}

#[test]
fn test_same_matrix_is_bit_identical() {
    let p = params(OptionType::Put);
    let cfg = SimulationConfig::new(3_000);
    let draws = SimulationConfig::new(3_000).with_seed(77).draw_matrix();
    let a = simulate(&p, &cfg, Some(&draws)).unwrap();
    let b = simulate(&p, &cfg, Some(&draws)).unwrap();
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn test_invalid_inputs_rejected_by_both_models() {
    let p = params(OptionType::Call);
    let flat = p.with_field(Field::Volatility, 0.0).unwrap();
    assert!(matches!(bs_price(&flat), Err(PricingError::DegenerateInput { .. })));
    assert!(matches!(bs_greeks(&flat), Err(PricingError::DegenerateInput { .. })));

    for (s, k) in [(-1.0, 100.0), (100.0, 0.0)] {
        assert!(black_scholes_price(OptionType::Call, s, k, 1.0, 0.05, 0.2, 0.0).is_err());
        let cfg = SimulationConfig::new(10);
        assert!(monte_carlo_price(OptionType::Call, s, k, 1.0, 0.05, 0.2, 0.0, &cfg, None).is_err());
    }

    let err = "Straddle".parse::<OptionType>().unwrap_err();
    assert!(matches!(err, PricingError::InvalidOptionType { .. }));
}

#[test]
fn test_volatility_sweep() {
    let p = params(OptionType::Call);
    let cfg = SimulationConfig::new(20_000).with_seed(1);
    let series = default_sweep(&p, Field::Volatility, &cfg).unwrap();

    assert_eq!(series.len(), 10);
    assert!(series.analytic.windows(2).all(|w| w[0] <= w[1]));
    assert_relative_eq!(series.analytic[0], 9.4277, max_relative = 1e-4);
    assert_relative_eq!(series.analytic[9], 42.2962, max_relative = 1e-4);
    for cmp in series.comparisons() {
        assert!(cmp.pct_difference < 15.0, "{:?}", cmp);
    }
}

#[test]
fn test_strike_and_time_sweeps() {
    let p = params(OptionType::Put);
    let cfg = SimulationConfig::new(1_000).with_seed(4);

    let strikes = Field::StrikePrice.default_values(&p, 10);
    let series = sweep(&p, Field::StrikePrice, &strikes, &cfg).unwrap();
    // a put gains value with its strike
    assert!(series.analytic.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(series.values, strikes);

    let series = default_sweep(&p, Field::TimeToExpiration, &cfg).unwrap();
    assert_eq!(series.monte_carlo.len(), 10);
    assert!(series.monte_carlo.iter().all(|v| v.is_finite() && *v >= 0.0));
}

#[test]
fn test_price_comparison() {
    let cmp = compare_prices(&params(OptionType::Call), &SimulationConfig::new(20_000).with_seed(8)).unwrap();
    assert_relative_eq!(cmp.analytic, REFERENCE_CALL, max_relative = 1e-12);
    assert!(cmp.pct_difference < 5.0);
}

#[test]
fn test_paths_and_option_values() {
    let p = params(OptionType::Call);
    let cfg = SimulationConfig::new(10).with_seed(12);
    let sim = simulate_paths(&p, &cfg, None).unwrap();
    assert_eq!(sim.paths.dim(), (10, 366));

    for row in sim.paths.rows() {
        let values = option_value_path(&p, row).unwrap();
        assert_eq!(values.len(), 366);
        assert_eq!(values[365], (row[365] - 100.0).max(0.0));
    }
}

#[test]
fn test_payoff_distribution_summary() {
    let p = params(OptionType::Call);
    let dist = payoff_distribution(&p, &SimulationConfig::new(5_000).with_seed(6), None).unwrap();
    assert!(dist.min >= 0.0);
    assert!(dist.percentile(50.0) <= dist.percentile(95.0));
    assert!(dist.std_dev > 0.0);
}

#[test]
fn test_scenario_files_deserialize() {
    let cfg: SimulationConfig = serde_json::from_str(r#"{"num_simulations": 20000, "seed": 7}"#).unwrap();
    assert_eq!(cfg, SimulationConfig::new(20_000).with_seed(7));

    let defaults: SimulationConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults, SimulationConfig::default());

    let p: OptionParams = serde_json::from_str(
        r#"{"option_type": "Put", "underlying_price": 105.0, "strike_price": 100.0,
            "time_to_expiration": 1.0, "risk_free_rate": 0.05, "volatility": 0.2,
            "dividend_yield": 0.015}"#,
    )
    .unwrap();
    assert_eq!(p, params(OptionType::Put));

    let bundle = bs_greeks(&p).unwrap();
    let json = serde_json::to_string(&bundle).unwrap();
    assert!(json.contains("\"volga\""));
}

fn valid_params() -> impl Strategy<Value = (f64, f64, f64, f64, f64, f64)> {
    (
        50.0..150.0f64,
        50.0..150.0f64,
        0.05..3.0f64,
        -0.02..0.1f64,
        0.05..0.8f64,
        0.0..0.08f64,
    )
}

proptest! {
    #[test]
    fn prop_put_call_parity((s, k, t, r, sigma, q) in valid_params()) {
        let call = black_scholes_price(OptionType::Call, s, k, t, r, sigma, q).unwrap();
        let put = black_scholes_price(OptionType::Put, s, k, t, r, sigma, q).unwrap();
        let forward = s * (-q * t).exp() - k * (-r * t).exp();
        prop_assert!((call - put - forward).abs() < 1e-8, "parity gap {}", call - put - forward);
    }

    #[test]
    fn prop_delta_bounds_and_shared_gamma((s, k, t, r, sigma, q) in valid_params()) {
        let call = OptionParams::new(OptionType::Call, s, k, t, r, sigma, q).unwrap();
        let put = call.with_option_type(OptionType::Put);
        let gc = bs_greeks(&call).unwrap().first_order;
        let gp = bs_greeks(&put).unwrap().first_order;

        prop_assert!((0.0..=1.0).contains(&gc.delta));
        prop_assert!((-1.0..=0.0).contains(&gp.delta));
        prop_assert_eq!(gc.gamma, gp.gamma);
        prop_assert_eq!(gc.vega, gp.vega);
    }
}
