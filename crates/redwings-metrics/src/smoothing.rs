//! Gap filling and Savitzky-Golay smoothing of joint angle series.
//!
//! Pose detectors jitter from frame to frame. Each angle series is first
//! gap-filled (undefined samples are linearly interpolated from their nearest
//! defined neighbours, ends held at the nearest value) and then passed through
//! a local least-squares polynomial filter. A polynomial of order `k` is
//! fitted to every `window`-sample neighbourhood and evaluated at the sample
//! itself, which removes high-frequency noise while leaving bends and
//! extensions that span several frames intact.
//!
//! Samples closer than `window / 2` to either end are evaluated on the
//! polynomial fitted to the first (or last) full window rather than on a
//! padded signal.

use nalgebra::DMatrix;
use redwings_core::{AngleSample, Error, Result, SmoothingConfig};

/// Largest accepted deviation of a filter row sum from 1.
const CONSTANT_TOLERANCE: f64 = 1e-9;

/// Savitzky-Golay smoother for angle series
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    window: usize,
    /// Hat matrix of the windowed polynomial fit; row `r` yields the fitted
    /// value at window position `r`.
    projection: DMatrix<f64>,
}

impl SignalSmoother {
    pub fn new(config: SmoothingConfig) -> Result<Self> {
        config.validate()?;
        let projection = fit_projection(config.window, config.poly_order);

        // Every row must reproduce a constant signal.
        let worst = projection
            .row_iter()
            .map(|row| (row.sum() - 1.0).abs())
            .fold(0.0, f64::max);
        if !(worst < CONSTANT_TOLERANCE) {
            return Err(Error::Config(format!(
                "smoothing fit for window {} and order {} is numerically unstable (row sum error {:e})",
                config.window, config.poly_order, worst
            )));
        }

        Ok(Self {
            window: config.window,
            projection,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Smooth a series, preserving its length.
    ///
    /// A series with no defined sample is returned unchanged. Otherwise every
    /// entry of the result is defined.
    pub fn smooth(&self, series: &[AngleSample]) -> Vec<AngleSample> {
        let Some(filled) = fill_gaps(series) else {
            return series.to_vec();
        };

        if filled.len() < self.window {
            return filled.into_iter().map(Some).collect();
        }

        self.filter(&filled).into_iter().map(Some).collect()
    }

    /// Apply the polynomial filter to a gap-free signal of at least
    /// `window` samples.
    fn filter(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let w = self.window;
        let half = w / 2;

        (0..n)
            .map(|i| {
                let (start, row) = if i < half {
                    (0, i)
                } else if i + half >= n {
                    (n - w, i + w - n)
                } else {
                    (i - half, half)
                };

                self.projection
                    .row(row)
                    .iter()
                    .zip(&values[start..start + w])
                    .map(|(coef, v)| coef * v)
                    .sum::<f64>()
            })
            .collect()
    }
}

impl Default for SignalSmoother {
    fn default() -> Self {
        let SmoothingConfig { window, poly_order } = SmoothingConfig::default();
        Self {
            window,
            projection: fit_projection(window, poly_order),
        }
    }
}

/// Replace undefined samples by linear interpolation over index position.
///
/// Leading and trailing gaps take the nearest defined value. Returns `None`
/// when nothing is defined.
pub fn fill_gaps(series: &[AngleSample]) -> Option<Vec<f64>> {
    let known: Vec<(usize, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|v| (i, v)))
        .collect();

    let &(_, first) = known.first()?;
    let mut cursor = 0;

    let filled = series
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            if let Some(v) = sample {
                return *v;
            }
            while cursor < known.len() && known[cursor].0 < i {
                cursor += 1;
            }
            let before = cursor.checked_sub(1).map(|k| known[k]);
            let after = known.get(cursor).copied();

            match (before, after) {
                (Some((i0, v0)), Some((i1, v1))) => {
                    let alpha = (i - i0) as f64 / (i1 - i0) as f64;
                    v0 + alpha * (v1 - v0)
                }
                (Some((_, v0)), None) => v0,
                (None, Some((_, v1))) => v1,
                (None, None) => first,
            }
        })
        .collect();

    Some(filled)
}

/// Build the hat matrix `A (AᵀA)⁻¹ Aᵀ` of the windowed polynomial fit.
///
/// `A` is the Vandermonde matrix of window offsets scaled to [-1, 1]. With
/// the thin QR factorization `A = QR` the hat matrix is `Q Qᵀ`, which avoids
/// inverting the ill-conditioned normal matrix at high orders.
fn fit_projection(window: usize, order: usize) -> DMatrix<f64> {
    let half = (window / 2) as f64;
    let scale = half.max(1.0);
    let vandermonde = DMatrix::from_fn(window, order + 1, |r, c| {
        ((r as f64 - half) / scale).powi(c as i32)
    });
    let q = vandermonde.qr().q();
    &q * q.transpose()
}
