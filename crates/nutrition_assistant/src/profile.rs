//! Validated user profile and its enumerations.
//!
//! Strict parsing (`FromStr`) guards the collection boundary and rejects
//! anything it does not recognize. Lenient parsing (`from_stored`) is for
//! rows written by earlier versions and coerces unknown values to a safe
//! variant with a warning instead of failing the whole request.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AssistantError, AssistantResult};

/// Accepted age range in years, inclusive.
pub const AGE_RANGE: RangeInclusive<u32> = 10..=120;
/// Accepted body weight range in kilograms, inclusive.
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 20.0..=300.0;
/// Accepted height range in centimeters, inclusive.
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 50.0..=250.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Lenient variant for previously stored rows. Unknown values map to
    /// `Male`, the term such rows have always computed with, with a warning.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!("unknown stored gender {:?}, assuming male", value);
            Gender::Male
        })
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(AssistantError::Validation(format!(
                "unknown gender {:?}, expected male or female",
                other
            ))),
        }
    }
}

/// Self-reported weekly activity, applied to BMR as a TDEE multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Low => 1.2,
            ActivityLevel::Medium => 1.55,
            ActivityLevel::High => 1.725,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Medium => "medium",
            ActivityLevel::High => "high",
        }
    }

    /// Lenient variant for previously stored rows. Unknown values map to
    /// `Low`, the most conservative multiplier, with a warning.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!("unknown stored activity level {:?}, assuming low", value);
            ActivityLevel::Low
        })
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ActivityLevel::Low),
            "medium" => Ok(ActivityLevel::Medium),
            "high" => Ok(ActivityLevel::High),
            other => Err(AssistantError::Validation(format!(
                "unknown activity level {:?}, expected low, medium or high",
                other
            ))),
        }
    }
}

/// What the user wants the calorie target to do relative to maintenance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        }
    }

    /// Lenient variant for previously stored rows. Unknown values map to
    /// `Maintain`, which leaves the calorie target untouched, with a warning.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!("unknown stored goal {:?}, assuming maintain", value);
            Goal::Maintain
        })
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Goal {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lose" => Ok(Goal::Lose),
            "maintain" => Ok(Goal::Maintain),
            "gain" => Ok(Goal::Gain),
            other => Err(AssistantError::Validation(format!(
                "unknown goal {:?}, expected lose, maintain or gain",
                other
            ))),
        }
    }
}

/// A validated user profile. Construction via [`Profile::new`] enforces the
/// accepted ranges, so downstream code can treat the fields as plausible.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub gender: Gender,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity: ActivityLevel,
    pub goal: Goal,
}

impl Profile {
    pub fn new(
        gender: Gender,
        age: u32,
        weight_kg: f64,
        height_cm: f64,
        activity: ActivityLevel,
        goal: Goal,
    ) -> AssistantResult<Self> {
        if !AGE_RANGE.contains(&age) {
            return Err(AssistantError::Validation(format!(
                "age {} outside accepted range {}..={}",
                age,
                AGE_RANGE.start(),
                AGE_RANGE.end()
            )));
        }
        if !WEIGHT_RANGE_KG.contains(&weight_kg) {
            return Err(AssistantError::Validation(format!(
                "weight {} kg outside accepted range {}..={}",
                weight_kg,
                WEIGHT_RANGE_KG.start(),
                WEIGHT_RANGE_KG.end()
            )));
        }
        if !HEIGHT_RANGE_CM.contains(&height_cm) {
            return Err(AssistantError::Validation(format!(
                "height {} cm outside accepted range {}..={}",
                height_cm,
                HEIGHT_RANGE_CM.start(),
                HEIGHT_RANGE_CM.end()
            )));
        }
        Ok(Self {
            gender,
            age,
            weight_kg,
            height_cm,
            activity,
            goal,
        })
    }
}
