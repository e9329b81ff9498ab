//! Data split ranges

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Inclusive `[lower, upper]` range of batch ids ingested as one sub-batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct DataSplitRange {
    lower: i64,
    upper: i64,
}

#[derive(Deserialize)]
struct RawRange {
    lower: i64,
    upper: i64,
}

impl TryFrom<RawRange> for DataSplitRange {
    type Error = BuildError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        DataSplitRange::new(raw.lower, raw.upper)
    }
}

impl DataSplitRange {
    pub fn new(lower: i64, upper: i64) -> Result<Self, BuildError> {
        if lower > upper {
            return Err(BuildError::InvalidDataSplitRange { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }
}
