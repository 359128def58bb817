//! Speed specifications: one constant speed or one speed per segment.

use crate::animator::AnimationError;
use serde::{Deserialize, Serialize};

/// Speed in m/s used while travelling each segment.
///
/// Serialized untagged: `1000.0` or `[10.0, 12.5, 8.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeedSpec {
    /// Same speed for every segment
    Constant(f64),

    /// `speeds[i]` applies from point `i` to point `i + 1`
    PerSegment(Vec<f64>),
}

impl SpeedSpec {
    /// Resolves the speed for `segment`, checking bounds and sign.
    pub fn speed_for(&self, segment: usize) -> Result<f64, AnimationError> {
        let speed = match self {
            Self::Constant(speed) => *speed,
            Self::PerSegment(speeds) => *speeds.get(segment).ok_or(AnimationError::SpeedSpecTooShort {
                required: segment + 1,
                provided: speeds.len(),
            })?,
        };

        if !speed.is_finite() || speed <= 0.0 {
            return Err(AnimationError::InvalidSpeed { segment, speed });
        }
        Ok(speed)
    }

    /// Checks that every one of `segments` segments resolves to a usable
    /// speed. Extra per-segment entries are ignored.
    pub fn validate(&self, segments: usize) -> Result<(), AnimationError> {
        if let Self::PerSegment(speeds) = self {
            if speeds.len() < segments {
                return Err(AnimationError::SpeedSpecTooShort {
                    required: segments,
                    provided: speeds.len(),
                });
            }
        }
        if segments == 0 {
            return Ok(());
        }
        match self {
            Self::Constant(_) => self.speed_for(0).map(|_| ()),
            Self::PerSegment(_) => (0..segments).try_for_each(|i| self.speed_for(i).map(|_| ())),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }
}

impl Default for SpeedSpec {
    fn default() -> Self {
        Self::Constant(1000.0)
    }
}

impl From<f64> for SpeedSpec {
    fn from(speed: f64) -> Self {
        Self::Constant(speed)
    }
}

impl From<Vec<f64>> for SpeedSpec {
    fn from(speeds: Vec<f64>) -> Self {
        Self::PerSegment(speeds)
    }
}

impl std::str::FromStr for SpeedSpec {
    type Err = String;

    /// `"12.5"` is constant, `"10,20,30"` is per-segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|e| format!("Invalid speed {:?}: {}", v.trim(), e))
            })
            .collect::<Result<Vec<f64>, String>>()?;

        match values.as_slice() {
            [single] if !s.contains(',') => Ok(Self::Constant(*single)),
            _ => Ok(Self::PerSegment(values)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_applies_everywhere() {
        let spec = SpeedSpec::Constant(10.0);
        assert_eq!(spec.speed_for(0).unwrap(), 10.0);
        assert_eq!(spec.speed_for(999).unwrap(), 10.0);
        assert!(spec.validate(1000).is_ok());
    }

    #[test]
    fn test_per_segment_lookup() {
        let spec = SpeedSpec::PerSegment(vec![5.0, 7.5]);
        assert_eq!(spec.speed_for(1).unwrap(), 7.5);
        assert!(matches!(
            spec.speed_for(2),
            Err(AnimationError::SpeedSpecTooShort { required: 3, provided: 2 })
        ));
    }

    #[test]
    fn test_validate_short_spec() {
        let spec = SpeedSpec::PerSegment(vec![5.0]);
        assert!(matches!(
            spec.validate(3),
            Err(AnimationError::SpeedSpecTooShort { required: 3, provided: 1 })
        ));
        // Surplus entries are fine
        assert!(SpeedSpec::PerSegment(vec![1.0, 2.0, 3.0]).validate(2).is_ok());
    }

    #[test]
    fn test_non_positive_speeds_rejected() {
        assert!(matches!(
            SpeedSpec::Constant(0.0).validate(1),
            Err(AnimationError::InvalidSpeed { segment: 0, .. })
        ));
        assert!(matches!(
            SpeedSpec::PerSegment(vec![3.0, -1.0]).validate(2),
            Err(AnimationError::InvalidSpeed { segment: 1, .. })
        ));
        assert!(SpeedSpec::Constant(f64::NAN).speed_for(0).is_err());
        assert!(SpeedSpec::Constant(f64::INFINITY).speed_for(0).is_err());
    }

    #[test]
    fn test_parse_and_serde() {
        assert_eq!("12.5".parse::<SpeedSpec>().unwrap(), SpeedSpec::Constant(12.5));
        assert_eq!(
            "10, 20".parse::<SpeedSpec>().unwrap(),
            SpeedSpec::PerSegment(vec![10.0, 20.0])
        );
        assert!("fast".parse::<SpeedSpec>().is_err());

        let spec: SpeedSpec = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(spec, SpeedSpec::PerSegment(vec![1.0, 2.0]));
        let spec: SpeedSpec = serde_json::from_str("1000").unwrap();
        assert_eq!(spec, SpeedSpec::Constant(1000.0));
    }
}
