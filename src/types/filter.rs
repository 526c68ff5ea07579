use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DishbrainError;

/// Cities offered by the dashboard's location filter.
pub const KNOWN_CITIES: &[&str] = &["Berlin", "München", "Hamburg", "Frankfurt"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    All,
    Immediate,
    ThisWeek,
    NextMonth,
}

impl FromStr for Availability {
    type Err = DishbrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Availability::All),
            "immediate" => Ok(Availability::Immediate),
            "this_week" => Ok(Availability::ThisWeek),
            "next_month" => Ok(Availability::NextMonth),
            other => Err(DishbrainError::SearchInputInvalid(format!(
                "unknown availability '{}' (expected all, immediate, this_week, next_month)",
                other
            ))),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Availability::All => "all",
            Availability::Immediate => "immediate",
            Availability::ThisWeek => "this_week",
            Availability::NextMonth => "next_month",
        };
        f.write_str(name)
    }
}

/// Location facet. Serialized as the plain string `"all"` or the city name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocationFilter {
    #[default]
    All,
    City(String),
}

impl LocationFilter {
    pub fn city(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() || name.eq_ignore_ascii_case("all") {
            LocationFilter::All
        } else {
            LocationFilter::City(name)
        }
    }

    pub fn is_known_city(&self) -> bool {
        match self {
            LocationFilter::All => false,
            LocationFilter::City(name) => KNOWN_CITIES.contains(&name.as_str()),
        }
    }
}

impl From<String> for LocationFilter {
    fn from(value: String) -> Self {
        LocationFilter::city(value)
    }
}

impl From<LocationFilter> for String {
    fn from(value: LocationFilter) -> Self {
        match value {
            LocationFilter::All => "all".to_string(),
            LocationFilter::City(name) => name,
        }
    }
}

impl fmt::Display for LocationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationFilter::All => f.write_str("all"),
            LocationFilter::City(name) => f.write_str(name),
        }
    }
}

/// Facet filters applied together with the free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub expertise: BTreeSet<String>,
    pub availability: Availability,
    pub location: LocationFilter,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expertise<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expertise = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_location(mut self, location: LocationFilter) -> Self {
        self.location = location;
        self
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
