//! Rendering of a composed state per a [`LookupRequest`]
//!
//! Steps, in order:
//!
//! 1. frame: a heliocentric or barycentric request replaces the center before
//!    composition ([`effective_center`]); nothing is shifted afterwards
//! 2. shape: Cartesian passes through, polar goes through [`PolarState`]
//! 3. units: polar angles and their rates become degrees unless radians were asked
//!    for; Cartesian output has no angles to convert
//!
//! Velocity components are zeroed last when the request does not want them.

use crate::coordinates::polar::PolarState;
use crate::jplephem::bodies::Body;
use crate::jplephem::compose::StateVector;
use crate::jplephem::request::{AngleUnit, CenterFrame, LookupRequest, OutputShape};

/// Center actually used for composition
pub fn effective_center(center: Body, frame: CenterFrame) -> Body {
    match frame {
        CenterFrame::AsRequested => center,
        CenterFrame::Barycentric => Body::SolarSystemBarycenter,
        CenterFrame::Heliocentric => Body::Sun,
    }
}

/// Six output components for a composed barycentric-frame state
pub fn render(state: &StateVector, request: &LookupRequest) -> [f64; 6] {
    let mut out = match request.shape {
        OutputShape::Cartesian => state.to_array(),
        OutputShape::Polar => {
            let polar = PolarState::from_cartesian(&state.position, &state.velocity);
            match request.angles {
                AngleUnit::Radians => polar.to_array(),
                AngleUnit::Degrees => polar.to_degrees().to_array(),
            }
        }
    };

    if !request.velocity {
        out[3..].fill(0.0);
    }
    out
}

/// Cartesian `[x, y, z, vx, vy, vz]` from polar `[lon, lat, r, dlon, dlat, dr]` in radians
pub fn polar_to_cartesian(polar: [f64; 6]) -> [f64; 6] {
    let (position, velocity) = PolarState::from_array(polar).to_cartesian();
    StateVector::new(position, velocity).to_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn unit_x() -> StateVector {
        StateVector::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.01, 0.0))
    }

    #[test]
    fn test_effective_center() {
        assert_eq!(effective_center(Body::Mars, CenterFrame::AsRequested), Body::Mars);
        assert_eq!(effective_center(Body::Mars, CenterFrame::Heliocentric), Body::Sun);
        assert_eq!(
            effective_center(Body::Earth, CenterFrame::Barycentric),
            Body::SolarSystemBarycenter
        );
    }

    #[test]
    fn test_cartesian_passthrough_ignores_angle_unit() {
        let state = StateVector::from_array([0.3, -0.2, 0.1, 0.01, 0.02, 0.03]);
        for angles in [AngleUnit::Degrees, AngleUnit::Radians] {
            let request = LookupRequest::cartesian().with_angles(angles);
            assert_eq!(render(&state, &request), state.to_array());
        }
    }

    #[test]
    fn test_polar_degrees() {
        let out = render(&unit_x(), &LookupRequest::default());
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 1.0);
        assert_relative_eq!(out[3], 0.01 * 180.0 / std::f64::consts::PI);
        assert_eq!(out[4], 0.0);
        assert_eq!(out[5], 0.0);
    }

    #[test]
    fn test_polar_radians() {
        let state = StateVector::new(Vector3::new(0.0, 1.0, 1.0), Vector3::zeros());
        let out = render(&state, &LookupRequest::new().with_angles(AngleUnit::Radians));
        assert_relative_eq!(out[0], std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(out[1], std::f64::consts::FRAC_PI_4);
        assert_relative_eq!(out[2], 2f64.sqrt());
    }

    #[test]
    fn test_velocity_suppressed() {
        let request = LookupRequest::cartesian().with_velocity(false);
        assert_eq!(render(&unit_x(), &request), [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let polar = render(&unit_x(), &LookupRequest::default().with_velocity(false));
        assert_eq!(&polar[3..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_polar_to_cartesian_inverts_render() {
        let state = StateVector::from_array([0.4, 0.9, -0.3, -0.011, 0.004, 0.0007]);
        let polar = render(&state, &LookupRequest::new().with_angles(AngleUnit::Radians));
        let back = polar_to_cartesian(polar);
        for (a, b) in back.iter().zip(state.to_array()) {
            assert_relative_eq!(*a, b, epsilon = 1e-14);
        }
    }
}
