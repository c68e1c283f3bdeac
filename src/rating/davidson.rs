//! Davidson tie-adjusted Bradley-Terry outcome model
//!
//! Strengths are `a = 10^(r / 400)`, with `home_adv` folded into the home
//! rating before exponentiation. The draw term is
//! `2 * nu * sqrt(a_home * a_away)`, so the three probabilities share one
//! denominator and always sum to one.

use crate::rating::elo::RATING_SCALE;
use crate::types::OutcomeProbabilities;
use std::f64::consts::LN_10;

/// Home/draw/away probabilities for a pair of ratings
///
/// Negative `nu` is clamped to zero. Both strengths are scaled by the same
/// factor (the larger one) before dividing, which leaves every ratio unchanged
/// and keeps large ratings from overflowing.
pub fn davidson_probabilities(
    r_home: f64,
    r_away: f64,
    home_adv: f64,
    nu: f64,
) -> OutcomeProbabilities {
    let log_home = (r_home + home_adv) / RATING_SCALE * LN_10;
    let log_away = r_away / RATING_SCALE * LN_10;
    let pivot = log_home.max(log_away);

    let a_home = (log_home - pivot).exp();
    let a_away = (log_away - pivot).exp();
    // sqrt(a_home * a_away) in log space
    let tie = 2.0 * nu.max(0.0) * ((log_home + log_away) / 2.0 - pivot).exp();

    let denom = a_home + a_away + tie;

    OutcomeProbabilities {
        p_home_win: a_home / denom,
        p_draw: tie / denom,
        p_away_win: a_away / denom,
    }
}
