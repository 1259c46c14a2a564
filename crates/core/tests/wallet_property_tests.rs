//! Property-based integration tests for balance normalization and quoting.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use chrono::Utc;
use coinfolio_core::credentials::ProviderKind;
use coinfolio_core::wallets::{
    from_smallest_unit, normalize, Balance, QuotedBalance, QuotedWallet, RawBalance,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

const DENYLIST: &[&str] = &["LDBNB"];

// =============================================================================
// Generators
// =============================================================================

/// Generates a signed amount with up to 8 decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000, 0u32..=8).prop_map(|(n, scale)| Decimal::new(n, scale))
}

/// Generates a symbol from a small alphabet so duplicates are common.
fn arb_symbol() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("BTC".to_string()),
        Just("ETH".to_string()),
        Just("KCS".to_string()),
        Just("LDBNB".to_string()),
        "[A-Z]{3,5}",
    ]
}

fn arb_records() -> impl Strategy<Value = Vec<RawBalance>> {
    prop::collection::vec(
        (arb_symbol(), arb_amount()).prop_map(|(s, a)| RawBalance::new(s, a)),
        0..40,
    )
}

// =============================================================================
// Normalization properties
// =============================================================================

proptest! {
    /// Property: no non-positive amount survives normalization.
    #[test]
    fn prop_normalized_amounts_are_positive(records in arb_records()) {
        for balance in normalize(records, DENYLIST) {
            prop_assert!(balance.amount() > Decimal::ZERO);
        }
    }

    /// Property: each symbol appears once and denylisted symbols never appear.
    #[test]
    fn prop_symbols_are_unique_and_allowed(records in arb_records()) {
        let balances = normalize(records, DENYLIST);
        let mut seen = HashSet::new();
        for balance in &balances {
            prop_assert!(seen.insert(balance.symbol().to_string()));
            prop_assert!(!DENYLIST.contains(&balance.symbol()));
        }
    }

    /// Property: each surviving amount is the exact sum of its records, and
    /// every symbol with a positive sum survives.
    #[test]
    fn prop_duplicates_sum(records in arb_records()) {
        let mut expected: HashMap<String, Decimal> = HashMap::new();
        for record in &records {
            if DENYLIST.contains(&record.symbol.as_str()) {
                continue;
            }
            *expected.entry(record.symbol.clone()).or_default() += record.amount;
        }

        let balances = normalize(records, DENYLIST);
        let actual: HashMap<String, Decimal> = balances
            .iter()
            .map(|b| (b.symbol().to_string(), b.amount()))
            .collect();

        for (symbol, total) in expected {
            if total > Decimal::ZERO {
                prop_assert_eq!(actual.get(&symbol), Some(&total));
            } else {
                prop_assert!(!actual.contains_key(&symbol));
            }
        }
    }

    /// Property: normalization is idempotent.
    #[test]
    fn prop_normalize_is_idempotent(records in arb_records()) {
        let once = normalize(records, DENYLIST);
        let again = normalize(
            once.iter().map(|b| RawBalance::new(b.symbol(), b.amount())).collect(),
            DENYLIST,
        );
        prop_assert_eq!(once, again);
    }
}

// =============================================================================
// Quoting properties
// =============================================================================

proptest! {
    /// Property: value == amount * price and total == sum of values, exactly.
    #[test]
    fn prop_total_is_sum_of_values(
        entries in prop::collection::vec(
            (1i64..1_000_000_000, 0u32..=8, 1i64..10_000_000, 0u32..=4),
            0..20,
        )
    ) {
        let balances: Vec<QuotedBalance> = entries
            .iter()
            .enumerate()
            .filter_map(|(i, (amount, amount_scale, price, price_scale))| {
                let amount = Decimal::new(*amount, *amount_scale);
                let balance = Balance::new(format!("T{}", i), amount)?;
                QuotedBalance::new(balance, Decimal::new(*price, *price_scale)).ok()
            })
            .collect();

        for balance in &balances {
            prop_assert_eq!(balance.value(), balance.amount() * balance.price());
        }

        let expected: Decimal = balances.iter().map(|b| b.value()).sum();
        let wallet = QuotedWallet::new(ProviderKind::Binance, Utc::now(), "USD", balances).unwrap();
        prop_assert_eq!(wallet.total_value(), expected);
    }

    /// Property: scaling a smallest-unit integer is exact when it fits.
    #[test]
    fn prop_smallest_unit_scaling_is_exact(n in 0u64..u64::MAX, decimals in 0u32..=18) {
        let scaled = from_smallest_unit(&n.to_string(), decimals).unwrap();
        prop_assert_eq!(scaled, Decimal::from_i128_with_scale(n as i128, decimals));
    }
}
