//! Progress and amount arithmetic shared by the dashboard views.

use crate::error::{Error, Result};

/// Share of the total pool already claimed, as a percentage in [0, 100].
/// An empty pool reads as zero progress.
pub fn claim_progress(claimed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    claimed as f64 / total as f64 * 100.0
}

/// Share of the vesting window elapsed at `curr_ts`, as a percentage in
/// [0, 100]. Zero before the window opens, 100 once it has closed.
pub fn vesting_progress(curr_ts: i64, start_ts: i64, end_ts: i64) -> f64 {
    if curr_ts < start_ts {
        return 0.0;
    }
    if curr_ts >= end_ts {
        return 100.0;
    }
    let time_into_unlock = curr_ts.saturating_sub(start_ts);
    let total_unlock_time = end_ts.saturating_sub(start_ts);
    time_into_unlock as f64 / total_unlock_time as f64 * 100.0
}

/// Vested share of `locked_amount` at `curr_ts`.
/// Equal to (time_into_unlock / total_unlock_time) * locked_amount, computed
/// in u128 so the multiplication cannot overflow.
pub fn unlocked_amount(locked_amount: u64, curr_ts: i64, start_ts: i64, end_ts: i64) -> Result<u64> {
    if curr_ts >= start_ts {
        if curr_ts >= end_ts {
            Ok(locked_amount)
        } else {
            let time_into_unlock = curr_ts.checked_sub(start_ts).ok_or(Error::Arithmetic)?;
            let total_unlock_time = end_ts.checked_sub(start_ts).ok_or(Error::Arithmetic)?;

            let amount = ((time_into_unlock as u128)
                .checked_mul(locked_amount as u128)
                .ok_or(Error::Arithmetic)?)
            .checked_div(total_unlock_time as u128)
            .ok_or(Error::Arithmetic)? as u64;

            Ok(amount)
        }
    } else {
        Ok(0)
    }
}

/// Renders a raw token amount as a decimal string, trailing zeros trimmed.
/// `100000000` with 6 decimals comes out as `100`, `1500000` as `1.5`.
pub fn format_token_amount(amount: u64, decimals: u8) -> String {
    let divisor = 10u128.saturating_pow(decimals as u32);
    let whole = amount as u128 / divisor;
    let frac = amount as u128 % divisor;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac, width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    format!("{whole}.{frac}")
}

/// USD value of a raw token amount at the given price per whole token.
pub fn token_usd_value(amount: u64, decimals: u8, price: f64) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32) * price
}

/// Renders a USD value with two decimals and thousands separators,
/// e.g. `$1,234.56`.
pub fn format_usd(value: f64) -> String {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    let cents = (value * 100.0).round() as u128;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let whole: String = grouped.chars().rev().collect();
    format!("${whole}.{frac:02}")
}
