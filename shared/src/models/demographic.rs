//! Customer attributes captured before ordering
//!
//! Only forwarded on the order-create call, never stored client-side beyond
//! the current session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse age bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AgeGroup {
    #[serde(rename = "10s")]
    Teens,
    #[serde(rename = "20s")]
    Twenties,
    #[serde(rename = "30s")]
    Thirties,
    #[serde(rename = "40s")]
    Forties,
    #[serde(rename = "50s")]
    Fifties,
    #[serde(rename = "60s_over")]
    SixtiesAndOver,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl AgeGroup {
    /// Bucket a raw age estimate (in years).
    pub fn from_age(age: f32) -> Self {
        if !age.is_finite() || age < 0.0 {
            return Self::Unknown;
        }
        match age {
            a if a < 20.0 => Self::Teens,
            a if a < 30.0 => Self::Twenties,
            a if a < 40.0 => Self::Thirties,
            a if a < 50.0 => Self::Forties,
            a if a < 60.0 => Self::Fifties,
            _ => Self::SixtiesAndOver,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teens => "10s",
            Self::Twenties => "20s",
            Self::Thirties => "30s",
            Self::Forties => "40s",
            Self::Fifties => "50s",
            Self::SixtiesAndOver => "60s_over",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgeGroup {
    type Err = ParseDemographicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "10s" => Ok(Self::Teens),
            "20s" => Ok(Self::Twenties),
            "30s" => Ok(Self::Thirties),
            "40s" => Ok(Self::Forties),
            "50s" => Ok(Self::Fifties),
            "60s_over" => Ok(Self::SixtiesAndOver),
            "unknown" => Ok(Self::Unknown),
            other => Err(ParseDemographicError::AgeGroup(other.to_string())),
        }
    }
}

/// Gender as reported by the capture step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = ParseDemographicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(ParseDemographicError::Gender(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDemographicError {
    #[error("Unknown age group: {0}")]
    AgeGroup(String),
    #[error("Unknown gender: {0}")]
    Gender(String),
}

/// (age group, gender) pair yielded by the capture step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Demographics {
    pub age_group: AgeGroup,
    pub gender: Gender,
}

impl Demographics {
    pub fn new(age_group: AgeGroup, gender: Gender) -> Self {
        Self { age_group, gender }
    }

    /// Build from a raw camera estimate.
    pub fn from_estimate(age: f32, gender: Gender) -> Self {
        Self::new(AgeGroup::from_age(age), gender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_buckets() {
        assert_eq!(AgeGroup::from_age(12.0), AgeGroup::Teens);
        assert_eq!(AgeGroup::from_age(19.9), AgeGroup::Teens);
        assert_eq!(AgeGroup::from_age(20.0), AgeGroup::Twenties);
        assert_eq!(AgeGroup::from_age(45.5), AgeGroup::Forties);
        assert_eq!(AgeGroup::from_age(59.9), AgeGroup::Fifties);
        assert_eq!(AgeGroup::from_age(60.0), AgeGroup::SixtiesAndOver);
        assert_eq!(AgeGroup::from_age(88.0), AgeGroup::SixtiesAndOver);
        assert_eq!(AgeGroup::from_age(f32::NAN), AgeGroup::Unknown);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&Demographics::new(AgeGroup::SixtiesAndOver, Gender::Female)).unwrap();
        assert_eq!(json, r#"{"age_group":"60s_over","gender":"female"}"#);

        assert_eq!("30s".parse::<AgeGroup>(), Ok(AgeGroup::Thirties));
        assert!("70s".parse::<AgeGroup>().is_err());
        assert_eq!("male".parse::<Gender>(), Ok(Gender::Male));
    }
}
