//! Composition of slot series into a target-relative-to-center state
//!
//! Every working vector is barycentric, equatorial, in AU and AU/day:
//!
//! - the barycenter itself is the zero vector;
//! - the Moon series is stored relative to the Earth-Moon barycenter, so the
//!   Moon's working vector is `Moon + EMB`;
//! - the Earth is `EMB - Moon / (1 + EMRAT)`;
//! - every other body is its own series unchanged.

use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::Vector3;

use crate::constants::LAYOUT_SLOTS;
use crate::jplephem::bodies::{Body, Slot};
use crate::jplephem::chebyshev::evaluate_series;
use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::header::EphemerisHeader;
use crate::jplephem::record::DataRecord;

/// Position and velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    /// AU
    pub position: Vector3<f64>,
    /// AU/day
    pub velocity: Vector3<f64>,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self { position, velocity }
    }

    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// `[x, y, z, vx, vy, vz]`
    pub fn from_array(v: [f64; 6]) -> Self {
        Self::new(
            Vector3::new(v[0], v[1], v[2]),
            Vector3::new(v[3], v[4], v[5]),
        )
    }

    /// `[x, y, z, vx, vy, vz]`
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
        ]
    }
}

impl Add for StateVector {
    type Output = StateVector;

    fn add(self, other: StateVector) -> StateVector {
        StateVector::new(self.position + other.position, self.velocity + other.velocity)
    }
}

impl Sub for StateVector {
    type Output = StateVector;

    fn sub(self, other: StateVector) -> StateVector {
        StateVector::new(self.position - other.position, self.velocity - other.velocity)
    }
}

impl Mul<f64> for StateVector {
    type Output = StateVector;

    fn mul(self, scalar: f64) -> StateVector {
        StateVector::new(self.position * scalar, self.velocity * scalar)
    }
}

impl Neg for StateVector {
    type Output = StateVector;

    fn neg(self) -> StateVector {
        StateVector::new(-self.position, -self.velocity)
    }
}

/// Evaluates slots on demand, at most once each
struct SlotEvaluator<'a> {
    record: &'a DataRecord,
    header: &'a EphemerisHeader,
    t: f64,
    raw: [Option<StateVector>; LAYOUT_SLOTS],
}

impl<'a> SlotEvaluator<'a> {
    fn new(record: &'a DataRecord, header: &'a EphemerisHeader, t: f64) -> Self {
        Self {
            record,
            header,
            t,
            raw: [None; LAYOUT_SLOTS],
        }
    }

    fn raw(&mut self, slot: Slot) -> Result<StateVector> {
        if let Some(state) = self.raw[slot.index()] {
            return Ok(state);
        }
        let entry = self.header.layout.get(slot).ok_or_else(|| {
            JplephemError::InvalidHeader(format!("{:?} is not populated", slot))
        })?;
        let state = evaluate_series(self.record, slot, entry, self.header.step_days, self.t)?;
        self.raw[slot.index()] = Some(state);
        Ok(state)
    }

    /// Barycentric state of `body`
    fn working(&mut self, body: Body) -> Result<StateVector> {
        match body {
            Body::SolarSystemBarycenter => Ok(StateVector::zero()),
            Body::Moon => Ok(self.raw(Slot::Moon)? + self.raw(Slot::EarthMoonBarycenter)?),
            Body::Earth => {
                let moon = self.raw(Slot::Moon)?;
                let emb = self.raw(Slot::EarthMoonBarycenter)?;
                Ok(emb - moon * (1.0 / (1.0 + self.header.emrat)))
            }
            other => match other.slot() {
                Some(slot) => self.raw(slot),
                None => Err(JplephemError::UnknownBody(other)),
            },
        }
    }
}

/// Check that the file carries every series `body` needs
pub fn check_available(header: &EphemerisHeader, body: Body) -> Result<()> {
    if body
        .required_slots()
        .iter()
        .any(|&slot| header.layout.get(slot).is_none())
    {
        return Err(JplephemError::UnknownBody(body));
    }
    if body == Body::Earth && !(header.emrat > 0.0) {
        return Err(JplephemError::InvalidHeader(format!(
            "Earth/Moon mass ratio {} cannot separate the Earth from the barycenter",
            header.emrat
        )));
    }
    Ok(())
}

/// State of `target` relative to `center` at `t`, from the record covering `t`
pub fn compose_state(
    record: &DataRecord,
    header: &EphemerisHeader,
    t: f64,
    target: Body,
    center: Body,
) -> Result<StateVector> {
    check_available(header, target)?;
    check_available(header, center)?;

    if target == center {
        return Ok(StateVector::zero());
    }

    let mut evaluator = SlotEvaluator::new(record, header, t);
    let target_state = evaluator.working(target)?;
    if center == Body::SolarSystemBarycenter {
        return Ok(target_state);
    }
    let center_state = evaluator.working(center)?;
    Ok(target_state - center_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jplephem::header::{LayoutEntry, LayoutTable};
    use crate::jplephem::synthetic::SyntheticEphemeris;
    use approx::assert_relative_eq;

    /// Header and record with constant series: Sun (1,0,0), EMB (0,2,0),
    /// Moon (0,0,0.01) relative to EMB, Mars (3,0,0) moving at (0,0.5,0) per x
    fn fixture() -> (EphemerisHeader, DataRecord) {
        let synthetic = SyntheticEphemeris::new(0.0, 32.0, 32.0)
            .with_emrat(99.0)
            .with_slot(Slot::Sun, 2, 2, 1)
            .with_slot(Slot::EarthMoonBarycenter, 8, 2, 1)
            .with_slot(Slot::Moon, 14, 2, 1)
            .with_slot(Slot::Mars, 20, 2, 1)
            .with_series(0, Slot::Sun, 0, [[1.0, 0.0], [0.0, 0.0], [0.0, 0.0]])
            .with_series(0, Slot::EarthMoonBarycenter, 0, [[0.0, 0.0], [2.0, 0.0], [0.0, 0.0]])
            .with_series(0, Slot::Moon, 0, [[0.0, 0.0], [0.0, 0.0], [0.01, 0.0]])
            .with_series(0, Slot::Mars, 0, [[3.0, 0.0], [0.0, 0.5], [0.0, 0.0]]);

        let header = synthetic.header().unwrap();
        let record = synthetic.record(0);
        (header, record)
    }

    #[test]
    fn test_same_body_is_zero() {
        let (header, record) = fixture();
        for body in [Body::Mars, Body::Moon, Body::Earth, Body::SolarSystemBarycenter] {
            let state = compose_state(&record, &header, 16.0, body, body).unwrap();
            assert_eq!(state, StateVector::zero());
        }
    }

    #[test]
    fn test_barycentric_center_passes_series_through() {
        let (header, record) = fixture();
        let state =
            compose_state(&record, &header, 16.0, Body::Mars, Body::SolarSystemBarycenter).unwrap();
        assert_eq!(state.position, Vector3::new(3.0, 0.0, 0.0));
        // 0.5 per unit x, 2/32 x per day
        assert_eq!(state.velocity, Vector3::new(0.0, 0.5 / 16.0, 0.0));
    }

    #[test]
    fn test_moon_is_offset_by_barycenter() {
        let (header, record) = fixture();
        let moon =
            compose_state(&record, &header, 16.0, Body::Moon, Body::SolarSystemBarycenter).unwrap();
        assert_eq!(moon.position, Vector3::new(0.0, 2.0, 0.01));

        let geocentric_moon = compose_state(&record, &header, 16.0, Body::Moon, Body::Earth).unwrap();
        // Moon - Earth = raw Moon × (1 + 1/(1+EMRAT))
        assert_relative_eq!(geocentric_moon.position.z, 0.01 * (1.0 + 1.0 / 100.0));
        assert_relative_eq!(geocentric_moon.position.y, 0.0);
    }

    #[test]
    fn test_earth_is_derived() {
        let (header, record) = fixture();
        let earth =
            compose_state(&record, &header, 16.0, Body::Earth, Body::SolarSystemBarycenter).unwrap();
        assert_relative_eq!(earth.position.y, 2.0);
        assert_relative_eq!(earth.position.z, -0.01 / 100.0);
    }

    #[test]
    fn test_relative_state_is_difference() {
        let (header, record) = fixture();
        let state = compose_state(&record, &header, 16.0, Body::Mars, Body::Sun).unwrap();
        assert_eq!(state.position, Vector3::new(2.0, 0.0, 0.0));

        let reverse = compose_state(&record, &header, 16.0, Body::Sun, Body::Mars).unwrap();
        assert_eq!(reverse, -state);
    }

    #[test]
    fn test_missing_body() {
        let (header, record) = fixture();
        let err = compose_state(&record, &header, 16.0, Body::Jupiter, Body::Sun).unwrap_err();
        assert!(matches!(err, JplephemError::UnknownBody(Body::Jupiter)));

        let err = compose_state(&record, &header, 16.0, Body::Sun, Body::Pluto).unwrap_err();
        assert!(matches!(err, JplephemError::UnknownBody(Body::Pluto)));

        // Even a zero result checks the inputs first
        let err = compose_state(&record, &header, 16.0, Body::Pluto, Body::Pluto).unwrap_err();
        assert!(matches!(err, JplephemError::UnknownBody(Body::Pluto)));
    }

    #[test]
    fn test_earth_needs_mass_ratio() {
        let (mut header, record) = fixture();
        header.emrat = 0.0;
        assert!(matches!(
            compose_state(&record, &header, 16.0, Body::Earth, Body::Sun),
            Err(JplephemError::InvalidHeader(_))
        ));
        // The Moon does not depend on it
        assert!(compose_state(&record, &header, 16.0, Body::Moon, Body::Sun).is_ok());
    }

    #[test]
    fn test_earth_needs_moon_slot() {
        let (mut header, record) = fixture();
        let mut layout = LayoutTable::default();
        layout.set(
            Slot::EarthMoonBarycenter,
            Some(LayoutEntry {
                offset: 8,
                coeff_count: 2,
                sub_intervals: 1,
            }),
        );
        header.layout = layout;
        assert!(matches!(
            compose_state(&record, &header, 16.0, Body::Earth, Body::SolarSystemBarycenter),
            Err(JplephemError::UnknownBody(Body::Earth))
        ));
        assert!(compose_state(
            &record,
            &header,
            16.0,
            Body::EarthMoonBarycenter,
            Body::SolarSystemBarycenter
        )
        .is_ok());
    }
}
