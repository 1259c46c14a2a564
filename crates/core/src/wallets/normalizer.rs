//! Pure balance normalization.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::model::{Balance, RawBalance};

/// Decimals of an ERC20 token that does not report its own.
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

const MAX_SCALE: u32 = 28;

/// Any integer of this many digits fits in an `i128`.
const MAX_I128_DIGITS: usize = 38;

/// Drops denylisted symbols, merges duplicates additively (keeping the order
/// of first occurrence) and drops non-positive totals.
pub fn normalize(records: Vec<RawBalance>, denylist: &[&str]) -> Vec<Balance> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, Decimal> = HashMap::new();

    for record in records {
        if denylist.contains(&record.symbol.as_str()) {
            continue;
        }
        match totals.get_mut(&record.symbol) {
            Some(total) => *total = total.saturating_add(record.amount),
            None => {
                order.push(record.symbol.clone());
                totals.insert(record.symbol, record.amount);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|symbol| {
            let amount = totals.remove(&symbol)?;
            if amount > Decimal::ZERO {
                Balance::new(symbol, amount)
            } else {
                None
            }
        })
        .collect()
}

/// Converts an integer string in the smallest unit (e.g. wei) into base
/// units by scaling with 10^-decimals.
///
/// Exact whenever the result fits in a `Decimal`; otherwise the least
/// significant digits are truncated, and values beyond `Decimal::MAX`
/// saturate. Returns `None` for non-integer input.
pub fn from_smallest_unit(raw: &str, decimals: u32) -> Option<Decimal> {
    let raw = raw.trim();
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // Cut low-order digits at the string level until the rest fits an i128.
    let mut kept = digits.len();
    let mut scale = decimals;
    while kept > MAX_I128_DIGITS && scale > 0 {
        kept -= 1;
        scale -= 1;
    }
    if kept > MAX_I128_DIGITS {
        return Some(Decimal::MAX);
    }

    let mut integer: i128 = digits[..kept].parse().ok()?;
    while scale > MAX_SCALE {
        integer /= 10;
        scale -= 1;
    }

    loop {
        match Decimal::try_from_i128_with_scale(integer, scale) {
            Ok(value) => return Some(value.normalize()),
            Err(_) if scale > 0 => {
                integer /= 10;
                scale -= 1;
            }
            Err(_) => return Some(Decimal::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(symbol: &str, amount: Decimal) -> RawBalance {
        RawBalance::new(symbol, amount)
    }

    #[test]
    fn test_duplicates_are_summed_in_first_occurrence_order() {
        let balances = normalize(
            vec![
                raw("BTC", dec!(0.5)),
                raw("ETH", dec!(1)),
                raw("BTC", dec!(0.25)),
            ],
            &[],
        );

        assert_eq!(
            balances,
            vec![
                Balance::new("BTC", dec!(0.75)).unwrap(),
                Balance::new("ETH", dec!(1)).unwrap(),
            ]
        );
    }

    #[test]
    fn test_denylisted_and_zero_balances_are_dropped() {
        let balances = normalize(
            vec![
                raw("LDBNB", dec!(3)),
                raw("BNB", dec!(0)),
                raw("ADA", dec!(10)),
            ],
            &["LDBNB"],
        );

        assert_eq!(balances, vec![Balance::new("ADA", dec!(10)).unwrap()]);
    }

    #[test]
    fn test_non_positive_totals_are_dropped_after_merge() {
        let balances = normalize(
            vec![raw("XRP", dec!(5)), raw("XRP", dec!(-5)), raw("DOT", dec!(-1))],
            &[],
        );
        assert!(balances.is_empty());
    }

    #[test]
    fn test_from_smallest_unit_is_exact() {
        assert_eq!(
            from_smallest_unit("1000000000000000000", 18),
            Some(dec!(1))
        );
        assert_eq!(
            from_smallest_unit("1500000000000000000", 18),
            Some(dec!(1.5))
        );
        assert_eq!(from_smallest_unit("1", 18), Some(dec!(0.000000000000000001)));
        assert_eq!(from_smallest_unit("2500000", 6), Some(dec!(2.5)));
        assert_eq!(from_smallest_unit("0", 18), Some(dec!(0)));
    }

    #[test]
    fn test_from_smallest_unit_rejects_garbage() {
        assert_eq!(from_smallest_unit("1.5", 18), None);
        assert_eq!(from_smallest_unit("abc", 18), None);
        assert_eq!(from_smallest_unit("", 18), None);
        assert_eq!(from_smallest_unit("-5", 0), None);
    }

    #[test]
    fn test_from_smallest_unit_truncates_oversized_values() {
        // 10^12 tokens of an 18-decimal token
        let value = from_smallest_unit("1000000000000000000000000000000", 18).unwrap();
        assert_eq!(value, dec!(1000000000000));
    }

    #[test]
    fn test_from_smallest_unit_beyond_max_scale() {
        assert_eq!(
            from_smallest_unit("1000000000000000000000000000000000000", 36),
            Some(dec!(1))
        );
    }

    #[test]
    fn test_from_smallest_unit_keeps_high_order_digits_of_huge_amounts() {
        let uint256_max =
            "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert_eq!(
            from_smallest_unit(uint256_max, 60),
            Some(dec!(115792089237316195.423570985))
        );
        assert_eq!(from_smallest_unit(uint256_max, 18), Some(Decimal::MAX));
        assert_eq!(
            from_smallest_unit(&format!("1{}", "0".repeat(40)), 18),
            Some(dec!(10000000000000000000000))
        );
    }
}
