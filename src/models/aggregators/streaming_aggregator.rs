use tracing::debug;

// Streaming weighted mean/variance. Values come with an f64 weight
// (peak intensities) and the running state is updated in place.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamingAggregatorError {
    NotEnoughData,
}

type Result<T> = std::result::Result<T, StreamingAggregatorError>;

/// Ref impl in javascript ...
/// https://nestedsoftware.com/2018/03/27/calculating-standard-deviation-on-streaming-data-253l.23919.html
///
/// Zero weights are allowed, they move nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStatsCalculator {
    weight: f64,
    mean_n: f64,
    d_: f64,
    count: usize,
}

impl RunningStatsCalculator {
    pub fn new(weight: f64, mean: f64) -> Self {
        Self {
            weight,
            mean_n: mean,
            d_: 0.0,
            count: 1,
        }
    }

    pub fn add(&mut self, value: f64, weight: f64) {
        debug_assert!(weight >= 0.0, "Weight must be >= 0");
        self.count += 1;
        let new_weight = self.weight + weight;
        if new_weight <= 0.0 {
            // Nothing carries weight yet, track the plain value.
            self.mean_n = value;
            return;
        }

        let delta = value - self.mean_n;
        let last_mean_n = self.mean_n;
        self.mean_n += delta * (weight / new_weight);
        self.d_ += weight * (value - self.mean_n) * (value - last_mean_n);
        self.weight = new_weight;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn mean(&self) -> Result<f64> {
        if self.count == 0 {
            return Err(StreamingAggregatorError::NotEnoughData);
        }
        Ok(self.mean_n)
    }

    pub fn variance(&self) -> Result<f64> {
        if self.count == 0 || self.weight <= 0.0 {
            return Err(StreamingAggregatorError::NotEnoughData);
        }
        Ok(self.d_.abs() / self.weight)
    }

    pub fn standard_deviation(&self) -> Result<f64> {
        let variance = self.variance()?;
        if !variance.is_finite() {
            debug!("variance is not finite, state -> {:?}", self);
        };
        Ok(variance.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_mean() {
        let mut calc = RunningStatsCalculator::new(10.0, 100.0);
        calc.add(99.9, 6.0);
        let mean = calc.mean().unwrap();
        assert!((mean - 99.9625).abs() < 1e-9, "got {}", mean);
        assert_eq!(calc.count(), 2);
        assert_eq!(calc.weight(), 16.0);
    }

    #[test]
    fn test_empty_calculator() {
        let calc = RunningStatsCalculator::default();
        assert_eq!(calc.mean(), Err(StreamingAggregatorError::NotEnoughData));
        assert!(calc.variance().is_err());
    }

    #[test]
    fn test_zero_weight_start() {
        let mut calc = RunningStatsCalculator::new(0.0, 500.0);
        calc.add(501.0, 0.0);
        assert_eq!(calc.mean().unwrap(), 501.0);
        calc.add(502.0, 2.0);
        assert_eq!(calc.mean().unwrap(), 502.0);
    }

    // Anscombe's quartet, set 3: mean 7.5 and std 1.94
    const ANSCOMBE_3: [f64; 11] = [
        7.46, 6.77, 12.74, 7.11, 7.81, 8.84, 6.08, 5.39, 8.15, 6.42, 5.73,
    ];

    #[test]
    fn test_running_stats_anscombe() {
        let mut calc = RunningStatsCalculator::new(1.0, ANSCOMBE_3[0]);
        for x in ANSCOMBE_3.iter().skip(1) {
            calc.add(*x, 1.0);
        }
        assert!(calc.mean().unwrap() < 7.6);
        assert!(calc.mean().unwrap() > 7.4);
        assert!(calc.standard_deviation().unwrap() > 1.82);
        assert!(calc.standard_deviation().unwrap() < 1.99);
    }
}
