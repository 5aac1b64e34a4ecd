//! Payload identifier calculator
//!
//! Certain POST endpoints reject any body other than `{"id": N}` where `N`
//! is derived from the market seed, a fixed lookup table, the calendar day,
//! and (for two of the three request categories) two of the session salts.
//! The table is carried verbatim from the exchange's web client; it is the
//! same for every session and is not secret.

use chrono::{Datelike, Local};

use crate::error::{Error, Result};
use crate::types::{PayloadCategory, SaltQuintuple};

/// Index table keyed by the market seed.
const SEED_TABLE: [i64; 100] = [
    147, 117, 239, 143, 157, 312, 161, 612, 512, 804, 411, 527, 170, 511, 421, 667, 764, 621,
    301, 106, 133, 793, 411, 511, 312, 423, 344, 346, 653, 758, 342, 222, 236, 811, 711, 611,
    122, 447, 128, 199, 183, 135, 489, 703, 800, 745, 152, 863, 134, 211, 142, 564, 375, 793,
    212, 153, 138, 153, 648, 611, 151, 649, 318, 143, 117, 756, 119, 141, 717, 113, 112, 146,
    162, 660, 693, 261, 362, 354, 251, 641, 157, 178, 631, 192, 734, 445, 192, 883, 187, 122,
    591, 731, 852, 384, 565, 596, 451, 772, 624, 691,
];

/// Compute the payload identifier for today (local calendar day).
pub fn compute(seed: i64, salts: SaltQuintuple, category: PayloadCategory) -> Result<i64> {
    compute_for_day(seed, salts, category, Local::now().day())
}

/// Compute the payload identifier for an explicit day-of-month.
///
/// The seed indexes the lookup table; a value outside `0..100` means the
/// upstream status endpoint broke its contract and is surfaced as
/// [`Error::SeedOutOfRange`]. Arithmetic is `i64` throughout, so the salt
/// products cannot overflow.
pub fn compute_for_day(
    seed: i64,
    salts: SaltQuintuple,
    category: PayloadCategory,
    day: u32,
) -> Result<i64> {
    let table_value = usize::try_from(seed)
        .ok()
        .and_then(|idx| SEED_TABLE.get(idx).copied())
        .ok_or(Error::SeedOutOfRange {
            seed,
            table_len: SEED_TABLE.len(),
        })?;

    let day = i64::from(day);
    let base = table_value + seed + 2 * day;

    let low = (i64::from(salts.salt1), i64::from(salts.salt2));
    let high = (i64::from(salts.salt3), i64::from(salts.salt4));

    // The two salted categories select inverse pairs for the same last
    // digit of the base value.
    let (offset_salt, day_salt) = match category {
        PayloadCategory::StockLive => return Ok(base),
        PayloadCategory::SectorLive => {
            if base % 10 < 5 {
                high
            } else {
                low
            }
        }
        PayloadCategory::Default => {
            if base % 10 < 5 {
                low
            } else {
                high
            }
        }
    };

    Ok(base + day_salt * day - offset_salt)
}
