use std::fmt;

use serde::{Deserialize, Serialize};

/// Monetary amount split into whole units and nanos of the currency.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub units: i64,
    pub nanos: i32,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        }
    }

    /// Compose `units` and `nanos` as the decimal string `"{units}.{nanos}"`
    /// and parse it back.
    ///
    /// This is not fixed-point composition: `nanos = 5` yields `x.5`, not
    /// `x.000000005`. Persisted retry records carry this format, so it is kept
    /// as is. Returns `None` when the string does not parse (negative nanos).
    pub fn legacy_decimal(&self) -> Option<f64> {
        format!("{}.{}", self.units, self.nanos).parse().ok()
    }

    /// Whole units as a float, the value retry records are matched against.
    pub fn units_as_f64(&self) -> f64 {
        self.units as f64
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{}", self.currency_code, self.units, self.nanos)
    }
}
