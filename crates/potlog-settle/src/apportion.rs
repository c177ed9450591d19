//! Largest-remainder apportionment.
//!
//! Splits an integer `total` across positive weights so that every share is
//! an integer, the shares sum to `total` exactly, and each share is within
//! one unit of its ideal real-valued quota `weight / Σweights × total`.
//!
//! Quotas are kept as exact rationals `weight × total / Σweights` in `i128`.
//! Every quota has the sign of `total`, so the base share (floor for a
//! non-negative total, ceil for a negative one) is integer division
//! truncating toward zero, and the remainder numerator carries the sign of
//! `total` as well.

use potlog_types::Amount;

use crate::error::{SettleError, SettleResult};

/// Distribute `total` across `weights` by the largest-remainder method.
///
/// Leftover units go one each to the weights with the largest fractional
/// remainders: descending remainder for a non-negative total, ascending
/// (most negative first) for a negative one. Ties go to the earlier weight.
///
/// Every weight must be positive.
pub fn largest_remainder(weights: &[Amount], total: Amount) -> SettleResult<Vec<Amount>> {
    if weights.is_empty() {
        return if total == 0 {
            Ok(Vec::new())
        } else {
            Err(SettleError::Invariant(format!(
                "cannot apportion {total} across zero weights"
            )))
        };
    }
    if let Some(bad) = weights.iter().find(|w| **w <= 0) {
        return Err(SettleError::Invariant(format!(
            "apportionment weight must be positive, got {bad}"
        )));
    }

    let weight_sum: i128 = weights.iter().map(|w| i128::from(*w)).sum();
    let total_wide = i128::from(total);

    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for weight in weights {
        let numerator = i128::from(*weight) * total_wide;
        shares.push(numerator / weight_sum);
        remainders.push(numerator % weight_sum);
    }

    let leftover = total_wide - shares.iter().sum::<i128>();

    let mut order: Vec<usize> = (0..weights.len()).collect();
    if total >= 0 {
        order.sort_by(|a, b| remainders[*b].cmp(&remainders[*a]));
    } else {
        order.sort_by(|a, b| remainders[*a].cmp(&remainders[*b]));
    }

    let step: i128 = if total >= 0 { 1 } else { -1 };
    let awards = usize::try_from(leftover.unsigned_abs()).unwrap_or(usize::MAX);
    for index in order.into_iter().take(awards) {
        shares[index] += step;
    }

    let distributed: i128 = shares.iter().sum();
    if distributed != total_wide {
        return Err(SettleError::Invariant(format!(
            "largest remainder method failed: expected {total}, got {distributed}"
        )));
    }

    shares
        .into_iter()
        .map(|share| {
            Amount::try_from(share)
                .map_err(|_| SettleError::Invariant(format!("share {share} out of range")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn positive_total_basic_case() {
        let shares = largest_remainder(&[100_00, 50_00, 30_00], 7_00).unwrap();
        assert_eq!(shares.iter().sum::<Amount>(), 7_00);
    }

    #[test]
    fn negative_total() {
        let shares = largest_remainder(&[100_00, 50_00], -10_00).unwrap();
        assert_eq!(shares.iter().sum::<Amount>(), -10_00);
        assert_eq!(shares, vec![-6_67, -3_33]);
    }

    #[test]
    fn exact_proportions() {
        assert_eq!(largest_remainder(&[60_00, 40_00], 10_00).unwrap(), vec![6_00, 4_00]);
    }

    #[test]
    fn single_weight_takes_everything() {
        assert_eq!(largest_remainder(&[100_00], 15_00).unwrap(), vec![15_00]);
        assert_eq!(largest_remainder(&[1], -7).unwrap(), vec![-7]);
    }

    #[test]
    fn equal_weights_tie_break_by_position() {
        assert_eq!(largest_remainder(&[50, 50], 5).unwrap(), vec![3, 2]);
        assert_eq!(largest_remainder(&[50, 50], -5).unwrap(), vec![-3, -2]);
        assert_eq!(largest_remainder(&[1, 1, 1], 2).unwrap(), vec![1, 1, 0]);
    }

    #[test]
    fn leftover_follows_largest_remainder() {
        // Quotas 1.4, 2.8, 2.8 for a total of 7 over weights 1, 2, 2.
        assert_eq!(largest_remainder(&[1, 2, 2], 7).unwrap(), vec![1, 3, 3]);
        // Quotas -0.6, -1.2, -1.2: the -0.6 remainder is most negative.
        assert_eq!(largest_remainder(&[1, 2, 2], -3).unwrap(), vec![-1, -1, -1]);
    }

    #[test]
    fn zero_total_gives_zero_shares() {
        assert_eq!(largest_remainder(&[3, 4], 0).unwrap(), vec![0, 0]);
        assert!(largest_remainder(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_positive_weights_and_empty_targets() {
        assert!(matches!(
            largest_remainder(&[5, 0], 3),
            Err(SettleError::Invariant(_))
        ));
        assert!(matches!(largest_remainder(&[], 3), Err(SettleError::Invariant(_))));
    }

    proptest! {
        #[test]
        fn shares_sum_exactly_and_stay_within_one_unit(
            weights in proptest::collection::vec(1i64..1_000_000, 1..12),
            total in -10_000_000i64..10_000_000,
        ) {
            let shares = largest_remainder(&weights, total).unwrap();
            prop_assert_eq!(shares.iter().sum::<Amount>(), total);

            let weight_sum: i128 = weights.iter().map(|w| i128::from(*w)).sum();
            for (weight, share) in weights.iter().zip(&shares) {
                // |share - weight*total/weight_sum| < 1, scaled by weight_sum.
                let deviation = i128::from(*share) * weight_sum
                    - i128::from(*weight) * i128::from(total);
                prop_assert!(deviation.abs() < weight_sum);
            }
        }
    }
}
