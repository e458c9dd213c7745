//! Receipt SKUs

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};

const PREFIX: &str = "RST";
const CODE_LEN: usize = 6;
const SUFFIX_MODULUS: i64 = 1_000_000;

/// Display identifier printed on receipts.
///
/// A short random code plus a time-derived suffix. Not a key: two lines may
/// share a SKU.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Generate a SKU from the thread RNG and the current time.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng(), Timestamp::now())
    }

    /// Generate a SKU from the given randomness source and time.
    pub fn generate_with(rng: &mut impl Rng, at: Timestamp) -> Self {
        let code: String = (0..CODE_LEN)
            .map(|_| {
                let byte: u8 = rng.sample(Alphanumeric);
                char::from(byte).to_ascii_uppercase()
            })
            .collect();

        let suffix = at.as_millisecond().rem_euclid(SUFFIX_MODULUS);

        Self(format!("{PREFIX}-{code}-{suffix:06}"))
    }

    /// The SKU text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Sku {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn has_prefix_code_and_time_suffix() -> TestResult {
        let at = Timestamp::from_millisecond(1_700_000_482_913)?;

        let sku = Sku::generate_with(&mut StdRng::seed_from_u64(7), at);
        let mut parts = sku.as_str().split('-');

        assert_eq!(parts.next(), Some("RST"));

        let code = parts.next().unwrap_or_default();

        assert_eq!(code.len(), CODE_LEN);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
            "code should be uppercase alphanumeric, got {code}"
        );
        assert_eq!(parts.next(), Some("482913"));
        assert_eq!(parts.next(), None);

        Ok(())
    }

    #[test]
    fn same_seed_same_sku() {
        let at = Timestamp::UNIX_EPOCH;

        let a = Sku::generate_with(&mut StdRng::seed_from_u64(1), at);
        let b = Sku::generate_with(&mut StdRng::seed_from_u64(1), at);

        assert_eq!(a, b);
        assert!(a.as_str().ends_with("-000000"), "got {a}");
    }
}
