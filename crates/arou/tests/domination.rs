mod common;

use std::sync::OnceLock;

use arou::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::{gamma3, normal};

fn normal_gen() -> &'static Arou<FnDensity, StdRng> {
    static GEN: OnceLock<Arou<FnDensity, StdRng>> = OnceLock::new();
    GEN.get_or_init(|| {
        Arou::new(normal(), ArouOptions::default(), StdRng::seed_from_u64(0)).unwrap()
    })
}

const SLACK: f64 = 1e-9;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10_000))]

    #[test]
    fn normal_hat_dominates_pdf(x in -12.0_f64..12.0) {
        let g = normal_gen();
        let f = g.density().pdf(x);
        let hat = g.hat_value(x);
        prop_assert!(hat >= f * (1.0 - SLACK), "hat {hat} < f {f} at {x}");
    }

    #[test]
    fn normal_squeeze_below_pdf(x in -12.0_f64..12.0) {
        let g = normal_gen();
        let f = g.density().pdf(x);
        let sq = g.squeeze_value(x);
        prop_assert!(sq <= f * (1.0 + SLACK), "squeeze {sq} > f {f} at {x}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn online_splits_keep_the_envelope_valid(seed in any::<u64>(), x in 0.0_f64..15.0) {
        let opts = ArouOptions { use_dars: false, ..Default::default() };
        let mut g = Arou::new(gamma3(), opts, StdRng::seed_from_u64(seed)).unwrap();
        g.sample_n(300);
        prop_assert!(g.segment_count() <= 100);

        let f = g.density().pdf(x);
        prop_assert!(g.hat_value(x) >= f * (1.0 - SLACK));
        prop_assert!(g.squeeze_value(x) <= f * (1.0 + SLACK));

        let segs = g.segments();
        let last = segs[segs.len() - 1].a_cum;
        prop_assert!((last - g.hat_area()).abs() <= 1e-12 * g.hat_area());
        prop_assert!(segs.iter().all(|s| s.a_in >= 0.0 && s.a_out >= 0.0));
    }
}
