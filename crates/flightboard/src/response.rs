//! The uniform envelope every data-source call returns.

use std::fmt;

use serde::Serialize;

use crate::error::Result;

/// HTTP-style status for a successful call.
pub const STATUS_OK: u16 = 200;

/// HTTP-style status carried by a degraded response.
pub const STATUS_DEGRADED: u16 = 500;

/// Where a response's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The remote API.
    Api,
    /// The bundled fixtures.
    Json,
    /// Placeholder data substituted after a failure.
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Json => write!(f, "json"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Data plus where it came from and an HTTP-style status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T> {
    /// The payload.
    pub data: T,
    /// 200 on success, 500 for a degraded response.
    pub status: u16,
    /// Origin of `data`.
    pub source: Source,
}

impl<T> Response<T> {
    /// A successful response.
    #[must_use]
    pub fn ok(data: T, source: Source) -> Self {
        Self {
            data,
            status: STATUS_OK,
            source,
        }
    }

    /// A degraded response carrying placeholder data.
    #[must_use]
    pub fn degraded(data: T) -> Self {
        Self {
            data,
            status: STATUS_DEGRADED,
            source: Source::Fallback,
        }
    }
}

impl<T: Serialize> Response<T> {
    /// Pretty-printed JSON for display.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` fails to serialize.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
