//! Table configuration. A plain value struct, not a file-backed settings
//! layer — the engine's core has no I/O, so parsing configuration
//! from disk or the environment is the operator's job, not this crate's.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed table parameters. All monetary fields are non-negative integer
/// chip counts; there is no fractional chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub small_blind: u64,
    pub big_blind: u64,
    pub buy_in: u64,
    #[serde(with = "duration_secs")]
    pub action_timeout: Duration,
    pub max_seats: u8,
}

impl TableConfig {
    pub fn new(small_blind: u64, big_blind: u64, buy_in: u64) -> Self {
        TableConfig {
            small_blind,
            big_blind,
            buy_in,
            action_timeout: Duration::from_secs(30),
            max_seats: 6,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig::new(1, 2, 200)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
