//! SOL <-> lamport conversion.
//!
//! One scale is used everywhere: balance display divides by
//! [`LAMPORTS_PER_SOL`] and transfer submission multiplies by it.

use crate::error::SolError;

/// 10^9 lamports make one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Convert a lamport amount to whole-SOL units for display.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert a user-entered SOL amount to lamports, rounding to the nearest
/// lamport.
///
/// Rejects NaN, infinities, zero, negative amounts, amounts that round to
/// zero lamports, and amounts that do not fit in a `u64`.
pub fn sol_to_lamports(sol: f64) -> Result<u64, SolError> {
    if !sol.is_finite() {
        return Err(SolError::InvalidAmount(format!("{sol} is not a finite number")));
    }
    if sol <= 0.0 {
        return Err(SolError::InvalidAmount(format!("{sol} must be greater than zero")));
    }

    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if lamports >= u64::MAX as f64 {
        return Err(SolError::InvalidAmount(format!("{sol} SOL overflows u64 lamports")));
    }
    if lamports < 1.0 {
        return Err(SolError::InvalidAmount(format!(
            "{sol} SOL is less than one lamport"
        )));
    }

    Ok(lamports as u64)
}
