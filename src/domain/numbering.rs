//! Human-friendly document numbers (`ORD-2025-042`, `WO-2025-007`).
//!
//! The random suffix only has a thousand values per year, so numbers can
//! collide. The tables carry UNIQUE indexes and callers regenerate on conflict.

use chrono::Datelike;
use rand::Rng;

pub const ORDER_PREFIX: &str = "ORD";
pub const WORK_ORDER_PREFIX: &str = "WO";

/// How many fresh numbers a create action tries before giving up.
pub const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Format `<prefix>-<year>-<000..999>`.
pub fn document_number(prefix: &str, year: i32, suffix: u16) -> String {
    format!("{prefix}-{year}-{:03}", suffix % 1000)
}

/// Generate a number for the current year with a random suffix.
pub fn generate_document_number<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let year = chrono::Local::now().year();
    document_number(prefix, year, rng.gen_range(0..1000))
}
