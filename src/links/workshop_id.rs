// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest numeral accepted as a published file ID (fits in a u64)
const MAX_ID_DIGITS: usize = 20;

/// Numeric Steam Workshop published file ID, kept as the digit string the
/// user supplied so it is passed to the downloader verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkshopId(String);

impl WorkshopId {
    pub fn parse(value: &str) -> Option<Self> {
        let is_numeral = !value.is_empty()
            && value.len() <= MAX_ID_DIGITS
            && value.bytes().all(|b| b.is_ascii_digit());

        is_numeral.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkshopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WorkshopId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not a workshop ID: {value}"))
    }
}

impl From<WorkshopId> for String {
    fn from(id: WorkshopId) -> Self {
        id.0
    }
}
