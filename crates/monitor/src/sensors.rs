//! Sensor time series and trend detection.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Direction of a detected change between two sample windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rising => f.write_str("rising"),
            Self::Falling => f.write_str("falling"),
        }
    }
}

/// Compare the mean of the last `window` samples with the window before it.
///
/// Returns `None` when there are fewer than `2 * window` samples, when the
/// earlier mean is zero, or when the relative change stays below
/// `threshold_pct`.
pub fn detect_trend(samples: &[f64], window: usize, threshold_pct: f64) -> Option<Trend> {
    if window == 0 || samples.len() < window * 2 {
        return None;
    }
    let recent = &samples[samples.len() - window..];
    let previous = &samples[samples.len() - window * 2..samples.len() - window];

    let before = mean(previous);
    if before == 0.0 {
        return None;
    }
    let change_pct = (mean(recent) - before) / before.abs() * 100.0;

    if change_pct >= threshold_pct {
        Some(Trend::Rising)
    } else if change_pct <= -threshold_pct {
        Some(Trend::Falling)
    } else {
        None
    }
}

fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Rolling series for one line sensor.
#[derive(Debug, Clone)]
pub struct SensorSeries {
    pub name: String,
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SensorSeries {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample, evicting the oldest once full.
    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn samples(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn trend(&self, window: usize, threshold_pct: f64) -> Option<Trend> {
        detect_trend(&self.samples(), window, threshold_pct)
    }
}

/// Random-walk readings for a fixed set of line sensors.
pub struct SensorBank {
    rng: StdRng,
    series: Vec<(SensorSeries, f64, f64)>,
}

impl SensorBank {
    /// Spindle temperature, hydraulic pressure and vibration, each holding
    /// `capacity` samples.
    pub fn mock(seed: Option<u64>, capacity: usize) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            series: vec![
                (SensorSeries::new("spindle-temperature", capacity), 75.0, 1.5),
                (SensorSeries::new("hydraulic-pressure", capacity), 5.0, 0.2),
                (SensorSeries::new("vibration", capacity), 2.0, 0.1),
            ],
        }
    }

    /// Advance every sensor by one reading.
    pub fn tick(&mut self) {
        for (series, baseline, step) in &mut self.series {
            let last = series.latest().unwrap_or(*baseline);
            let drift = self.rng.gen_range(-*step..=*step);
            series.push((last + drift).max(0.0));
        }
    }

    pub fn series(&self) -> impl Iterator<Item = &SensorSeries> {
        self.series.iter().map(|(series, _, _)| series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_and_falling() {
        let rising = [10.0, 10.0, 10.0, 11.0, 11.0, 11.0];
        assert_eq!(detect_trend(&rising, 3, 5.0), Some(Trend::Rising));

        let falling = [10.0, 10.0, 10.0, 9.0, 9.0, 9.0];
        assert_eq!(detect_trend(&falling, 3, 5.0), Some(Trend::Falling));
    }

    #[test]
    fn test_change_below_threshold_is_flat() {
        let samples = [100.0, 100.0, 101.0, 101.0];
        assert_eq!(detect_trend(&samples, 2, 5.0), None);
    }

    #[test]
    fn test_only_last_two_windows_count() {
        // Old spike is outside the compared windows.
        let samples = [500.0, 10.0, 10.0, 10.0, 10.0];
        assert_eq!(detect_trend(&samples, 2, 5.0), None);
    }

    #[test]
    fn test_insufficient_samples() {
        assert_eq!(detect_trend(&[1.0, 2.0, 3.0], 2, 5.0), None);
        assert_eq!(detect_trend(&[1.0, 2.0], 0, 5.0), None);
    }

    #[test]
    fn test_zero_baseline_is_ignored() {
        assert_eq!(detect_trend(&[0.0, 0.0, 5.0, 5.0], 2, 5.0), None);
    }

    #[test]
    fn test_series_evicts_oldest() {
        let mut series = SensorSeries::new("t", 3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            series.push(v);
        }
        assert_eq!(series.samples(), vec![2.0, 3.0, 4.0]);
        assert_eq!(series.latest(), Some(4.0));
    }

    #[test]
    fn test_bank_ticks_every_sensor() {
        let mut bank = SensorBank::mock(Some(5), 4);
        for _ in 0..6 {
            bank.tick();
        }
        for series in bank.series() {
            assert_eq!(series.len(), 4);
            assert!(series.samples().iter().all(|v| *v >= 0.0));
        }
    }
}
