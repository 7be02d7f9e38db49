//! Chebyshev polynomial functionality for ephemeris interpolation
//!
//! Each slot of a data record stores, per sub-interval, three Chebyshev series
//! (x, y, z). Evaluating a slot at time `t` means locating the sub-interval,
//! mapping `t` onto `[-1, 1]`, and summing the series and its derivative.
//!
//! Sums run in ascending coefficient order with the plain three-term recurrences,
//! so identical inputs always give bit-identical outputs.

use nalgebra::Vector3;

use crate::jplephem::bodies::Slot;
use crate::jplephem::compose::StateVector;
use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::header::LayoutEntry;
use crate::jplephem::record::DataRecord;

/// Values of `T_n(x)` and `T_n'(x)` for `n` in `0..len`
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyshevBasis {
    t: Vec<f64>,
    dt: Vec<f64>,
}

impl ChebyshevBasis {
    /// Build the basis at `x` for `len` terms
    ///
    /// `T[0]=1, T[1]=x, T[n]=2x·T[n-1]-T[n-2]` and
    /// `dT[0]=0, dT[1]=1, dT[n]=2x·dT[n-1]+2·T[n-1]-dT[n-2]`.
    pub fn new(x: f64, len: usize) -> Self {
        let mut t = vec![0.0; len];
        let mut dt = vec![0.0; len];

        if len > 0 {
            t[0] = 1.0;
        }
        if len > 1 {
            t[1] = x;
            dt[1] = 1.0;
        }

        let twox = 2.0 * x;
        for n in 2..len {
            t[n] = twox * t[n - 1] - t[n - 2];
            dt[n] = twox * dt[n - 1] + 2.0 * t[n - 1] - dt[n - 2];
        }

        Self { t, dt }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.t
    }

    pub fn derivatives(&self) -> &[f64] {
        &self.dt
    }
}

/// Chebyshev series over a borrowed coefficient slice
///
/// The coefficients are ordered from lowest to highest degree:
/// `f(x) = c₀·T₀(x) + c₁·T₁(x) + ... + cₙ·Tₙ(x)`
#[derive(Debug, Clone, Copy)]
pub struct ChebyshevPolynomial<'a> {
    coefficients: &'a [f64],
}

impl<'a> ChebyshevPolynomial<'a> {
    pub fn new(coefficients: &'a [f64]) -> Self {
        Self { coefficients }
    }

    /// Evaluate the series at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        self.evaluate_with(&ChebyshevBasis::new(x, self.coefficients.len()))
    }

    /// Derivative of the series with respect to `x`
    pub fn derivative(&self, x: f64) -> f64 {
        self.derivative_with(&ChebyshevBasis::new(x, self.coefficients.len()))
    }

    /// Evaluate against a precomputed basis of at least `degree() + 1` terms
    pub fn evaluate_with(&self, basis: &ChebyshevBasis) -> f64 {
        self.coefficients
            .iter()
            .zip(basis.values())
            .fold(0.0, |acc, (c, t)| acc + c * t)
    }

    /// Derivative against a precomputed basis
    pub fn derivative_with(&self, basis: &ChebyshevBasis) -> f64 {
        self.coefficients
            .iter()
            .zip(basis.derivatives())
            .fold(0.0, |acc, (c, dt)| acc + c * dt)
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn coefficients(&self) -> &[f64] {
        self.coefficients
    }
}

/// Sub-interval and normalized argument for one slot at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesArgument {
    /// Sub-interval index in `[0, sub_intervals - 1]`
    pub sub_interval: usize,
    /// Chebyshev argument, in `[-1, 1]` when `t` lies inside the record
    pub x: f64,
}

impl SeriesArgument {
    /// Locate `t` inside a record beginning at `record_start`
    pub fn new(t: f64, record_start: f64, step_days: f64, sub_intervals: usize) -> Self {
        let u = (t - record_start) / step_days;
        let scaled = sub_intervals as f64 * u;

        let floor = scaled.floor();
        let sub_interval = if floor <= 0.0 {
            0
        } else {
            (floor as usize).min(sub_intervals.saturating_sub(1))
        };

        Self {
            sub_interval,
            x: 2.0 * (scaled - sub_interval as f64) - 1.0,
        }
    }
}

/// Chain-rule factor turning `d/dx` into `d/dt` (per day)
pub fn velocity_scale(sub_intervals: usize, step_days: f64) -> f64 {
    2.0 * sub_intervals as f64 / step_days
}

/// Evaluate one slot's position and velocity at `t`
///
/// Component `c` of sub-interval `l` starts at coefficient
/// `offset + c·n + l·n·3`, with `n` coefficients per component.
pub fn evaluate_series(
    record: &DataRecord,
    slot: Slot,
    entry: &LayoutEntry,
    step_days: f64,
    t: f64,
) -> Result<StateVector> {
    let n = entry.coeff_count;
    if n < 2 {
        return Err(JplephemError::InsufficientCoefficients { slot, count: n });
    }

    let arg = SeriesArgument::new(t, record.start_jd(), step_days, entry.sub_intervals);
    let start = entry.offset + arg.sub_interval * n * 3;
    let block = record
        .coefficients()
        .get(start..start + 3 * n)
        .ok_or_else(|| {
            JplephemError::InvalidHeader(format!(
                "{:?} sub-interval {} lies beyond the record's {} coefficients",
                slot,
                arg.sub_interval,
                record.coefficients().len()
            ))
        })?;

    let basis = ChebyshevBasis::new(arg.x, n);
    let vfac = velocity_scale(entry.sub_intervals, step_days);

    let mut position = Vector3::zeros();
    let mut velocity = Vector3::zeros();
    for (c, series) in block.chunks_exact(n).enumerate() {
        let poly = ChebyshevPolynomial::new(series);
        position[c] = poly.evaluate_with(&basis);
        velocity[c] = poly.derivative_with(&basis) * vfac;
    }

    Ok(StateVector::new(position, velocity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_chebyshev_constant() {
        let coeffs = [5.0];
        let poly = ChebyshevPolynomial::new(&coeffs);

        assert_eq!(poly.evaluate(-1.0), 5.0);
        assert_eq!(poly.evaluate(0.0), 5.0);
        assert_eq!(poly.evaluate(1.0), 5.0);
        assert_eq!(poly.derivative(0.0), 0.0);
    }

    #[test]
    fn test_chebyshev_linear() {
        // 3 + 2x
        let coeffs = [3.0, 2.0];
        let poly = ChebyshevPolynomial::new(&coeffs);

        assert_eq!(poly.evaluate(-1.0), 1.0);
        assert_eq!(poly.evaluate(0.0), 3.0);
        assert_eq!(poly.evaluate(1.0), 5.0);
        assert_eq!(poly.derivative(-1.0), 2.0);
        assert_eq!(poly.derivative(1.0), 2.0);
    }

    #[test]
    fn test_chebyshev_quadratic() {
        // 3 + 2x + (2x² - 1) = 2 + 2x + 2x²
        let coeffs = [3.0, 2.0, 1.0];
        let poly = ChebyshevPolynomial::new(&coeffs);

        assert_eq!(poly.evaluate(-1.0), 2.0);
        assert_eq!(poly.evaluate(0.0), 2.0);
        assert_eq!(poly.evaluate(1.0), 6.0);

        // f'(x) = 2 + 4x
        assert_eq!(poly.derivative(-1.0), -2.0);
        assert_eq!(poly.derivative(0.0), 2.0);
        assert_eq!(poly.derivative(1.0), 6.0);
        assert_eq!(poly.degree(), 2);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let coeffs = [0.3, -1.2, 0.7, 0.05, -0.4, 0.11];
        let poly = ChebyshevPolynomial::new(&coeffs);
        let h = 1e-6;

        for i in 0..=8 {
            let x = -0.8 + i as f64 * 0.2;
            let numeric = (poly.evaluate(x + h) - poly.evaluate(x - h)) / (2.0 * h);
            assert_relative_eq!(poly.derivative(x), numeric, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_basis_matches_closed_form() {
        // T_n(cos θ) = cos(nθ)
        let theta: f64 = 0.7;
        let basis = ChebyshevBasis::new(theta.cos(), 8);
        for (n, value) in basis.values().iter().enumerate() {
            assert_relative_eq!(*value, (n as f64 * theta).cos(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_series_argument() {
        // Record starting at 100 with 32 days and 4 sub-intervals of 8 days
        let arg = SeriesArgument::new(100.0, 100.0, 32.0, 4);
        assert_eq!(arg.sub_interval, 0);
        assert_eq!(arg.x, -1.0);

        let arg = SeriesArgument::new(112.0, 100.0, 32.0, 4);
        assert_eq!(arg.sub_interval, 1);
        assert_eq!(arg.x, 0.0);

        // The end instant stays in the last sub-interval
        let arg = SeriesArgument::new(132.0, 100.0, 32.0, 4);
        assert_eq!(arg.sub_interval, 3);
        assert_eq!(arg.x, 1.0);

        // Before the record start clamps to the first sub-interval
        let arg = SeriesArgument::new(99.0, 100.0, 32.0, 4);
        assert_eq!(arg.sub_interval, 0);
        assert!(arg.x < -1.0);
    }

    fn record_with_block(offset: usize, block: &[f64]) -> DataRecord {
        let mut coefficients = vec![0.0; offset + block.len()];
        coefficients[offset..].copy_from_slice(block);
        DataRecord::from_coefficients(0, coefficients)
    }

    #[test]
    fn test_evaluate_series_layout_and_velocity_scale() {
        // Two sub-intervals, 3 coefficients per component
        let entry = LayoutEntry {
            offset: 2,
            coeff_count: 3,
            sub_intervals: 2,
        };
        #[rustfmt::skip]
        let block = [
            // sub-interval 0: x, y, z
            1.0, 0.5, 0.0,
            2.0, 0.0, 0.0,
            3.0, 0.0, 0.25,
            // sub-interval 1
            -1.0, 1.0, 0.0,
            -2.0, 0.0, 0.0,
            -3.0, 0.0, 0.0,
        ];
        let record = record_with_block(entry.offset, &block);

        // t = 8 is the middle of sub-interval 0 (x = 0)
        let state = evaluate_series(&record, Slot::Mars, &entry, 32.0, 8.0).unwrap();
        assert_eq!(state.position, Vector3::new(1.0, 2.0, 3.0 - 0.25));
        // dT1 = 1, dT2 = 4x = 0; scaled by 2·2/32
        assert_relative_eq!(state.velocity.x, 0.5 * 0.125);
        assert_eq!(state.velocity.y, 0.0);
        assert_eq!(state.velocity.z, 0.0);

        // t = 24 is the middle of sub-interval 1
        let state = evaluate_series(&record, Slot::Mars, &entry, 32.0, 24.0).unwrap();
        assert_eq!(state.position, Vector3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(state.velocity.x, 0.125);
    }

    #[test]
    fn test_insufficient_coefficients() {
        let entry = LayoutEntry {
            offset: 2,
            coeff_count: 1,
            sub_intervals: 1,
        };
        let record = record_with_block(2, &[1.0, 1.0, 1.0]);
        let err = evaluate_series(&record, Slot::Venus, &entry, 32.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            JplephemError::InsufficientCoefficients {
                slot: Slot::Venus,
                count: 1
            }
        ));
    }

    #[test]
    fn test_continuity_across_sub_intervals() {
        // The same line on both sides of the boundary at t = 16:
        // p(t) = t / 16, written as a series on [0, 16] and on [16, 32]
        let entry = LayoutEntry {
            offset: 2,
            coeff_count: 2,
            sub_intervals: 2,
        };
        #[rustfmt::skip]
        let block = [
            0.5, 0.5, 0.0, 0.0, 0.0, 0.0,
            1.5, 0.5, 0.0, 0.0, 0.0, 0.0,
        ];
        let record = record_with_block(entry.offset, &block);

        let eps = 1e-9;
        let before = evaluate_series(&record, Slot::Sun, &entry, 32.0, 16.0 - eps).unwrap();
        let after = evaluate_series(&record, Slot::Sun, &entry, 32.0, 16.0).unwrap();
        assert!((before.position.x - after.position.x).abs() < 1e-8);
        assert_relative_eq!(before.velocity.x, after.velocity.x);
        assert_relative_eq!(after.velocity.x, 1.0 / 16.0);
    }

    #[test]
    fn test_evaluation_is_reproducible() {
        let entry = LayoutEntry {
            offset: 2,
            coeff_count: 5,
            sub_intervals: 1,
        };
        let block: Vec<f64> = (0..15).map(|i| (i as f64 * 0.37).sin()).collect();
        let record = record_with_block(entry.offset, &block);

        let a = evaluate_series(&record, Slot::Saturn, &entry, 32.0, 11.3).unwrap();
        let b = evaluate_series(&record, Slot::Saturn, &entry, 32.0, 11.3).unwrap();
        assert_eq!(a.to_array(), b.to_array());
    }
}
