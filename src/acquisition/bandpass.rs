// src/acquisition/bandpass.rs
//! Zero-phase Butterworth bandpass used on every fetched trace

use super::AcquireError;

/// Second-order section with normalized denominator (a0 = 1)
#[derive(Debug, Clone, Copy)]
struct Biquad {
    b: [f64; 3],
    a: [f64; 2],
}

impl Biquad {
    /// 2nd-order Butterworth low-pass via bilinear transform
    fn lowpass(cutoff: f64, samprate: f64) -> Result<Self, AcquireError> {
        let k = prewarp(cutoff, samprate)?;
        let k2 = k * k;
        let sqrt2 = std::f64::consts::SQRT_2;
        let norm = 1.0 + k * sqrt2 + k2;
        Ok(Self {
            b: [k2 / norm, 2.0 * k2 / norm, k2 / norm],
            a: [(2.0 * k2 - 2.0) / norm, (1.0 - k * sqrt2 + k2) / norm],
        })
    }

    /// 2nd-order Butterworth high-pass via bilinear transform
    fn highpass(cutoff: f64, samprate: f64) -> Result<Self, AcquireError> {
        let k = prewarp(cutoff, samprate)?;
        let k2 = k * k;
        let sqrt2 = std::f64::consts::SQRT_2;
        let norm = 1.0 + k * sqrt2 + k2;
        Ok(Self {
            b: [1.0 / norm, -2.0 / norm, 1.0 / norm],
            a: [(2.0 * k2 - 2.0) / norm, (1.0 - k * sqrt2 + k2) / norm],
        })
    }

    /// Direct Form I pass over a slice, state starting at rest
    fn run(&self, data: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(data.len());
        let (mut x1, mut x2, mut y1, mut y2) = (0.0, 0.0, 0.0, 0.0);
        for &x in data {
            let y = self.b[0] * x + self.b[1] * x1 + self.b[2] * x2
                - self.a[0] * y1
                - self.a[1] * y2;
            x2 = x1;
            x1 = x;
            y2 = y1;
            y1 = y;
            out.push(y);
        }
        out
    }
}

/// Pre-warped analog frequency for the bilinear transform
fn prewarp(cutoff: f64, samprate: f64) -> Result<f64, AcquireError> {
    let nyquist = samprate / 2.0;
    if cutoff <= 0.0 || cutoff >= nyquist {
        return Err(AcquireError::FilterBand {
            reason: format!("cutoff {cutoff} Hz outside (0, {nyquist}) Hz"),
        });
    }
    Ok((std::f64::consts::PI * cutoff / samprate).tan())
}

/// Zero-phase two-corner Butterworth bandpass
///
/// The high-pass/low-pass cascade is applied forward and then backward over
/// the reversed signal, cancelling the phase distortion of a single pass.
pub fn bandpass_zerophase(
    data: &[f64],
    fmin: f64,
    fmax: f64,
    samprate: f64,
) -> Result<Vec<f64>, AcquireError> {
    if fmin >= fmax {
        return Err(AcquireError::FilterBand {
            reason: format!("fmin {fmin} Hz not below fmax {fmax} Hz"),
        });
    }
    let hp = Biquad::highpass(fmin, samprate)?;
    let lp = Biquad::lowpass(fmax, samprate)?;

    let mut out = lp.run(&hp.run(data));
    out.reverse();
    out = lp.run(&hp.run(&out));
    out.reverse();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, samprate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / samprate).sin())
            .collect()
    }

    fn rms(data: &[f64]) -> f64 {
        (data.iter().map(|x| x * x).sum::<f64>() / data.len() as f64).sqrt()
    }

    #[test]
    fn test_passband_tone_survives() {
        let x = sine(5.0, 100.0, 4000);
        let y = bandpass_zerophase(&x, 1.0, 10.0, 100.0).unwrap();
        // Interior RMS within a few percent of the input tone
        let interior = &y[500..3500];
        assert!((rms(interior) - rms(&x[500..3500])).abs() < 0.05);
    }

    #[test]
    fn test_dc_and_high_frequency_attenuated() {
        let dc = vec![1.0; 4000];
        let y = bandpass_zerophase(&dc, 1.0, 10.0, 100.0).unwrap();
        assert!(rms(&y[500..3500]) < 0.02);

        let hf = sine(40.0, 100.0, 4000);
        let y = bandpass_zerophase(&hf, 1.0, 10.0, 100.0).unwrap();
        assert!(rms(&y[500..3500]) < 0.05 * rms(&hf));
    }

    #[test]
    fn test_invalid_band_rejected() {
        let x = sine(5.0, 100.0, 100);
        assert!(bandpass_zerophase(&x, 10.0, 1.0, 100.0).is_err());
        assert!(bandpass_zerophase(&x, 0.0, 10.0, 100.0).is_err());
        assert!(bandpass_zerophase(&x, 1.0, 60.0, 100.0).is_err());
    }
}
