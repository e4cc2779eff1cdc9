use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnitudeUnit {
    Unscaled,
    /// Ten-thousands, shown as "K".
    Thousands,
    Millions,
    Billions,
}

impl MagnitudeUnit {
    pub fn for_value(value: f64) -> Self {
        if value >= 1e9 {
            MagnitudeUnit::Billions
        } else if value >= 1e6 {
            MagnitudeUnit::Millions
        } else if value >= 1e4 {
            MagnitudeUnit::Thousands
        } else {
            MagnitudeUnit::Unscaled
        }
    }

    pub fn divisor(self) -> f64 {
        match self {
            MagnitudeUnit::Unscaled => 1.0,
            MagnitudeUnit::Thousands => 1e4,
            MagnitudeUnit::Millions => 1e6,
            MagnitudeUnit::Billions => 1e9,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            MagnitudeUnit::Unscaled => "",
            MagnitudeUnit::Thousands => "K",
            MagnitudeUnit::Millions => "M",
            MagnitudeUnit::Billions => "B",
        }
    }
}

/// Unit-scaled display of a number with two fraction digits, e.g. "15.00M".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeLabel {
    pub scaled: f64,
    pub unit: MagnitudeUnit,
}

impl MagnitudeLabel {
    pub fn new(value: f64) -> Self {
        let unit = MagnitudeUnit::for_value(value);
        Self {
            scaled: value / unit.divisor(),
            unit,
        }
    }
}

impl From<i64> for MagnitudeLabel {
    fn from(value: i64) -> Self {
        MagnitudeLabel::new(value as f64)
    }
}

impl fmt::Display for MagnitudeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}{}", self.scaled, self.unit.suffix())
    }
}

impl Serialize for MagnitudeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn format_magnitude(value: f64) -> String {
    MagnitudeLabel::new(value).to_string()
}
