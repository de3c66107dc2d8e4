//! Property-based tests using proptest.
//!
//! These tests verify invariant properties of the filter, the smoother and
//! the surface across random quote chains rather than fixed examples.

use chrono::{Days, NaiveDate};
use ivsurf::quotes::filter::quote_forward;
use ivsurf::quotes::{ExpirySlice, filter_quotes, group_by_expiry, to_clean_quotes};
use ivsurf::smile::{SliceFit, smooth_slice};
use ivsurf::surface::{Grid, SurfaceBuilder, VolSurface};
use ivsurf::{CleanQuote, OptionType, RawQuote, SurfaceConfig, SurfacePoint};
use proptest::prelude::*;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
}

/// Random quote around a spot of 100, with some garbage mixed in.
fn quote_strategy() -> impl Strategy<Value = RawQuote> {
    (
        any::<bool>(),
        50.0_f64..150.0,
        0.0_f64..2.0,
        0_u64..50,
        prop_oneof![
            8 => -0.5_f64..4.0,
            1 => Just(f64::NAN),
            1 => Just(f64::INFINITY),
        ],
        -10_i64..500,
    )
        .prop_map(|(is_call, strike, bid, open_interest, implied_vol, days)| {
            let expiration = if days >= 0 {
                as_of() + Days::new(days as u64)
            } else {
                as_of() - Days::new(days.unsigned_abs())
            };
            RawQuote {
                side: if is_call { OptionType::Call } else { OptionType::Put },
                strike,
                bid,
                open_interest,
                implied_vol,
                expiration,
                spot: 100.0,
                observed_on: as_of(),
            }
        })
}

fn chain_strategy() -> impl Strategy<Value = Vec<RawQuote>> {
    prop::collection::vec(quote_strategy(), 0..200)
}

// --- Property Test 1: OTM totality ---

proptest! {
    /// No surviving call is at or below the forward and no surviving put is
    /// at or above it.
    #[test]
    fn survivors_are_out_of_the_money(quotes in chain_strategy(), r in -0.02_f64..0.08, q in 0.0_f64..0.05) {
        let config = SurfaceConfig::default().rates(r, q);
        let outcome = filter_quotes(&quotes, &config);
        for s in &outcome.survivors {
            let forward = quote_forward(s, &config);
            match s.side {
                OptionType::Call => prop_assert!(s.strike > forward, "call {} <= F {}", s.strike, forward),
                OptionType::Put => prop_assert!(s.strike < forward, "put {} >= F {}", s.strike, forward),
            }
        }
    }
}

// --- Property Test 2: filter post-condition ---

proptest! {
    /// Every clean quote has a positive year fraction and a vol strictly
    /// inside (0, max_implied_volatility).
    #[test]
    fn clean_quotes_satisfy_postcondition(quotes in chain_strategy(), max_iv in 0.5_f64..3.0) {
        let config = SurfaceConfig::default().max_implied_volatility(max_iv);
        let outcome = filter_quotes(&quotes, &config);
        let clean: Vec<CleanQuote> = to_clean_quotes(&outcome.survivors, &config);
        prop_assert_eq!(clean.len(), outcome.report.kept);
        prop_assert_eq!(
            outcome.report.input,
            outcome.report.kept
                + outcome.report.in_the_money
                + outcome.report.illiquid
                + outcome.report.invalid_vol
                + outcome.report.out_of_horizon
        );
        for c in &clean {
            prop_assert!(c.year_fraction > 0.0);
            prop_assert!(c.implied_vol > 0.0 && c.implied_vol < max_iv);
            prop_assert!(c.days_to_expiry <= config.max_days_to_expiry);
        }
    }
}

// --- Property Test 3: open-interest monotonicity ---

proptest! {
    /// Raising the open-interest floor never increases the survivor count.
    #[test]
    fn higher_open_interest_floor_never_keeps_more(
        quotes in chain_strategy(),
        lo in 0_u64..40,
        bump in 0_u64..20,
    ) {
        let loose = SurfaceConfig::default().min_open_interest(lo);
        let strict = SurfaceConfig::default().min_open_interest(lo + bump);
        let n_loose = filter_quotes(&quotes, &loose).survivors.len();
        let n_strict = filter_quotes(&quotes, &strict).survivors.len();
        prop_assert!(n_strict <= n_loose);
    }
}

// --- Property Test 4: smoother output count ---

proptest! {
    /// A successful smile fit emits exactly `smile_samples` points; a
    /// fallback emits exactly the input quotes.
    #[test]
    fn smoother_output_count(
        mut ks in prop::collection::vec(-0.5_f64..0.5, 1..30),
        samples in 2_usize..80,
        t in 0.05_f64..1.0,
    ) {
        ks.sort_by(f64::total_cmp);
        let expiration = as_of() + Days::new(90);
        let quotes: Vec<CleanQuote> = ks
            .iter()
            .map(|&k| CleanQuote {
                side: if k < 0.0 { OptionType::Put } else { OptionType::Call },
                strike: 100.0 * k.exp(),
                implied_vol: 0.2 + 0.2 * k * k,
                expiration,
                days_to_expiry: 90,
                log_moneyness: k,
                year_fraction: t,
                forward: 100.0,
            })
            .collect();
        let slice = ExpirySlice { expiration, year_fraction: t, quotes };
        let config = SurfaceConfig::default().smile_samples(samples);

        match smooth_slice(&slice, &config) {
            SliceFit::Smoothed { points, .. } => prop_assert_eq!(points.len(), samples),
            SliceFit::Fallback { points, .. } => prop_assert_eq!(points.len(), ks.len()),
        }
    }
}

// --- Property Test 5: grouping preserves quotes ---

proptest! {
    /// Grouping by expiry keeps every quote and yields sorted, homogeneous slices.
    #[test]
    fn grouping_partitions_quotes(quotes in chain_strategy()) {
        let config = SurfaceConfig::default();
        let clean = to_clean_quotes(&filter_quotes(&quotes, &config).survivors, &config);
        let n = clean.len();
        let slices = group_by_expiry(clean);
        prop_assert_eq!(slices.iter().map(|s| s.len()).sum::<usize>(), n);
        prop_assert!(slices.windows(2).all(|w| {
            (w[0].expiration, w[0].year_fraction) < (w[1].expiration, w[1].year_fraction)
        }), "slices are not strictly sorted by (expiration, year_fraction)");
        for s in &slices {
            prop_assert!(s.quotes.iter().all(|q| q.expiration == s.expiration));
            prop_assert!(s.quotes.iter().all(|q| q.year_fraction == s.year_fraction));
            prop_assert!(s.quotes.windows(2).all(|w| w[0].log_moneyness <= w[1].log_moneyness));
        }
    }
}

// --- Property Test 6: evaluation idempotence ---

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Evaluating the same grid twice gives identical results.
    #[test]
    fn evaluate_grid_is_idempotent(
        vols in prop::collection::vec(0.1_f64..0.6, 12),
        shift in -0.05_f64..0.05,
    ) {
        let points: Vec<SurfacePoint> = vols
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let k = -0.3 + 0.2 * (i % 4) as f64 + shift;
                let t = 0.25 * (1 + i / 4) as f64;
                SurfacePoint::new(k, t, v)
            })
            .collect();
        let surface = SurfaceBuilder::new().add_points(&points).build().unwrap();
        let grid = Grid::from_points(&points, (5.0, 95.0), 20, 10).unwrap();
        let a = surface.evaluate_grid(&grid);
        let b = surface.evaluate_grid(&grid);
        prop_assert_eq!(a, b);
    }
}
