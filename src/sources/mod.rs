//! Positions sources API

use crate::PositionReport;
use time::OffsetDateTime;

/// Position source
pub trait PositionsSource {
    /// Fetch the raw positions of the period, ordered by time.
    ///
    /// The reports are not filtered against the period: the last one is
    /// the last known position even outside of it.
    fn fetch(
        &mut self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<PositionReport>, String>;
}

mod nemo;

pub use nemo::{parse_payload, Credentials, JsonSource};

#[cfg(feature = "http")]
pub use nemo::NemoApiSource;
