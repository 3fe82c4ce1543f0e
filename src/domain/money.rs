//! Amounts are stored as integer cents; forms and views speak decimals.

/// Largest decimal amount a price field accepts.
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Largest unit count a quantity or stock field accepts.
pub const MAX_QUANTITY: i32 = 1_000_000;

/// Convert a decimal amount to cents, rounding half away from zero.
///
/// Callers bound the amount first; out-of-range input saturates.
pub fn cents_from_amount(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// `quantity * unit_cents`, or `None` when it does not fit in cents.
pub fn line_total_cents(quantity: i32, unit_cents: i64) -> Option<i64> {
    i64::from(quantity).checked_mul(unit_cents)
}

/// Sum of amounts, or `None` on overflow.
pub fn checked_total<I>(amounts: I) -> Option<i64>
where
    I: IntoIterator<Item = i64>,
{
    amounts
        .into_iter()
        .try_fold(0i64, |total, amount| total.checked_add(amount))
}

/// Sum of amounts clamped to the `i64` range, for summary figures.
pub fn saturating_total<I>(amounts: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    amounts
        .into_iter()
        .fold(0i64, |total, amount| total.saturating_add(amount))
}

/// Render cents as `1,234.50`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, ch) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{:02}", cents % 100)
}
