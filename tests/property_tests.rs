//! Property-based tests for starkbench
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::sync::LazyLock;

use proptest::prelude::*;
use starkbench::Felt;
use starkbench::runtime::{CallArg, DeployOptions, ResultValue, StarknetContract};
use starkbench::testing::{ModuleFixtures, compile_contract};
use starkbench_core::hash::get_selector_from_name;
use tokio::sync::OnceCell;

// =============================================================================
// Felt Properties
// =============================================================================

mod felt_tests {
    use super::*;

    proptest! {
        /// Property: Addition and subtraction are inverse operations
        #[test]
        fn sub_undoes_add(a in any::<u64>(), b in any::<u64>()) {
            let (a, b) = (Felt::from(a), Felt::from(b));
            prop_assert_eq!(a.clone() + b.clone() - b, a);
        }

        /// Property: Negation is an additive inverse
        #[test]
        fn neg_is_additive_inverse(a in any::<u64>()) {
            let a = Felt::from(a);
            prop_assert!((a.clone() + -a).is_zero());
        }

        /// Property: Field division inverts multiplication for non-zero divisors
        #[test]
        fn checked_div_inverts_mul(a in any::<u64>(), b in 1u64..) {
            let (a, b) = (Felt::from(a), Felt::from(b));
            let product = a.clone() * b.clone();
            prop_assert_eq!(product.checked_div(&b), Some(a));
        }

        /// Property: Integer division agrees with u64 arithmetic
        #[test]
        fn div_rem_matches_integers(a in any::<u64>(), b in 1u64..) {
            let (q, r) = Felt::from(a).div_rem(&Felt::from(b)).unwrap();
            prop_assert_eq!(q, Felt::from(a / b));
            prop_assert_eq!(r, Felt::from(a % b));
        }

        /// Property: Decimal and hex text both parse back to the same value
        #[test]
        fn text_forms_parse_back(a in any::<u64>()) {
            let felt = Felt::from(a);
            prop_assert_eq!(felt.to_string().parse::<Felt>().unwrap(), felt.clone());
            prop_assert_eq!(format!("{felt:#x}").parse::<Felt>().unwrap(), felt);
        }
    }
}

// =============================================================================
// Selector Properties
// =============================================================================

mod selector_tests {
    use super::*;

    proptest! {
        /// Property: Selectors are deterministic and fit in 250 bits
        #[test]
        fn selector_is_deterministic(name in "[a-z_][a-z0-9_]{0,30}") {
            let selector = get_selector_from_name(&name);
            prop_assert_eq!(&selector, &get_selector_from_name(&name));
            prop_assert!(selector.bits() <= 250);
        }

        /// Property: Distinct names give distinct selectors
        #[test]
        fn distinct_names_distinct_selectors(a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
            prop_assume!(a != b);
            prop_assert_ne!(get_selector_from_name(&a), get_selector_from_name(&b));
        }
    }
}

// =============================================================================
// Contract Properties
// =============================================================================

mod contract_tests {
    use super::*;

    static FIXTURES: LazyLock<ModuleFixtures> =
        LazyLock::new(|| ModuleFixtures::new().expect("failed to create the module event loop"));
    static COUNTER: LazyLock<OnceCell<StarknetContract>> = LazyLock::new(OnceCell::new);

    async fn counter() -> &'static StarknetContract {
        COUNTER
            .get_or_init(|| async {
                let starknet = FIXTURES.starknet().await;
                let definition = compile_contract("counter.cairo").unwrap();
                starknet
                    .deploy_with(definition, DeployOptions::new().with_constructor_args([0u64]))
                    .await
                    .unwrap()
            })
            .await
    }

    fn call_view(function: &str, values: Vec<u64>) -> ResultValue {
        FIXTURES.block_on(async {
            let info = counter()
                .await
                .method(function, [CallArg::from(values)])
                .unwrap()
                .call()
                .await
                .unwrap();
            info.result.iter().next().map(|(_, value)| value.clone()).unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: The contract's recursive sum agrees with the host
        #[test]
        fn contract_sum_matches_host(values in prop::collection::vec(0u64..1_000_000, 0..20)) {
            let expected: u64 = values.iter().sum();
            prop_assert_eq!(call_view("sum", values), ResultValue::Felt(Felt::from(expected)));
        }

        /// Property: Doubling preserves length and order
        #[test]
        fn contract_doubles_each_element(values in prop::collection::vec(0u64..1_000_000, 0..20)) {
            let expected: Vec<Felt> = values.iter().map(|v| Felt::from(v * 2)).collect();
            prop_assert_eq!(call_view("doubled_values", values), ResultValue::Array(expected));
        }
    }
}
