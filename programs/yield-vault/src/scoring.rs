//! Risk-adjusted yield scoring.
//!
//! score = min(100, apy%) × 0.5 − volatility × 0.3 − il_risk × 0.2 + safety × 0.1
//!
//! Evaluated in integer milli-points so the result is bit-for-bit
//! reproducible, then clamped at zero and rounded half up.

use anchor_lang::prelude::*;

use crate::state::Opportunity;

/// Milli-points per score point
const SCALE: i64 = 1_000;

/// APY (in hundredths of a percent) is capped at 100% before weighting
const APY_CAP_MILLI: i64 = 100 * SCALE;

const VOLATILITY_WEIGHT_MILLI: i64 = 300;
const IL_WEIGHT_MILLI: i64 = 200;
const SAFETY_WEIGHT_MILLI: i64 = 100;

/// Opportunity id and score, in ranking order
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankedOpportunity {
    pub id: u8,
    pub score: u16,
}

pub fn score(apy_bps_x100: u32, volatility: u8, il_risk: u8, safety: u8) -> u16 {
    // apy_bps_x100 / 100 percent, expressed in milli-points, is apy × 10
    let apy_normalized = (apy_bps_x100 as i64 * 10).min(APY_CAP_MILLI);
    let apy_component = apy_normalized / 2;
    let volatility_component = volatility as i64 * VOLATILITY_WEIGHT_MILLI;
    let il_component = il_risk as i64 * IL_WEIGHT_MILLI;
    let safety_component = safety as i64 * SAFETY_WEIGHT_MILLI;

    let raw = apy_component - volatility_component - il_component + safety_component;
    let clamped = raw.max(0);

    ((clamped + SCALE / 2) / SCALE) as u16
}

/// Move only when the best candidate beats the current allocation by more
/// than `threshold` points.
pub fn should_rebalance(current_score: u16, best_score: u16, threshold: u16) -> bool {
    best_score.saturating_sub(current_score) > threshold
}

/// Rank by descending score, then lowest IL risk, then registration order.
pub fn rank(opportunities: &[Opportunity]) -> Vec<RankedOpportunity> {
    let mut indexed: Vec<(usize, &Opportunity, u16)> = opportunities
        .iter()
        .enumerate()
        .map(|(position, opportunity)| (position, opportunity, opportunity.compute_score()))
        .collect();

    indexed.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then(a.1.il_risk.cmp(&b.1.il_risk))
            .then(a.0.cmp(&b.0))
    });

    indexed
        .into_iter()
        .map(|(_, opportunity, score)| RankedOpportunity {
            id: opportunity.id,
            score,
        })
        .collect()
}
