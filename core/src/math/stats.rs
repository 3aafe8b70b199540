pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }

    /// Population standard deviation (divides by `n`).
    pub fn std_dev(samples: &[f64]) -> Option<f64> {
        let mean = Self::mean(samples)?;
        let variance =
            samples.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / samples.len() as f64;
        Some(variance.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_has_no_moments() {
        assert_eq!(StatsHelper::mean(&[]), None);
        assert_eq!(StatsHelper::std_dev(&[]), None);
    }

    #[test]
    fn single_value_has_zero_spread() {
        assert_eq!(StatsHelper::mean(&[4.0]), Some(4.0));
        assert_eq!(StatsHelper::std_dev(&[4.0]), Some(0.0));
    }

    #[test]
    fn population_std_dev() {
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(StatsHelper::mean(&samples), Some(5.0));
        assert_eq!(StatsHelper::std_dev(&samples), Some(2.0));
    }
}
