//! Property-based tests for site pairs and parameter expressions.

use proptest::prelude::*;
use qfence_ir::{ParameterBindings, ParameterExpression, QubitId, QubitPair};

proptest! {
    /// A pair is the same value whichever order its sites are given in.
    #[test]
    fn pair_is_order_independent(a in 0u32..200, b in 0u32..200) {
        prop_assume!(a != b);
        let ab = QubitPair::new(a, b).unwrap();
        let ba = QubitPair::new(b, a).unwrap();
        prop_assert_eq!(ab, ba);
        prop_assert!(ab.lo() < ab.hi());
        prop_assert!(ab.contains(QubitId(a)) && ab.contains(QubitId(b)));
    }

    /// The canonical key parses back to the same pair, in either orientation.
    #[test]
    fn pair_key_parses_back(a in 0u32..200, b in 0u32..200) {
        prop_assume!(a != b);
        let pair = QubitPair::new(a, b).unwrap();
        let forward: QubitPair = pair.key().parse().unwrap();
        let reversed: QubitPair = format!("{b}-{a}").parse().unwrap();
        prop_assert_eq!(forward, pair);
        prop_assert_eq!(reversed, pair);
    }

    /// Scaling a symbol and evaluating equals evaluating and scaling.
    #[test]
    fn scaled_symbol_evaluates_linearly(value in -10.0f64..10.0, factor in -1.0f64..1.0) {
        let mut bindings = ParameterBindings::default();
        bindings.insert("gamma".to_string(), value);
        let expr = ParameterExpression::symbol("gamma").scaled(factor);
        let got = expr.evaluate(&bindings).unwrap();
        prop_assert!((got - value * factor).abs() < 1e-9);
    }
}
