//! Small numeric helpers shared by both metric engines.

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population mean and standard deviation. A single observation has no
/// spread, so its deviation is 0.
pub fn mean_std(xs: &[f64]) -> (f64, f64) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let m = mean(xs);
    if xs.len() < 2 {
        return (m, 0.0);
    }
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
    (m, var.sqrt())
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_std_basic() {
        let (m, s) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(m, 5.0);
        assert!((s - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_std_single_value_has_no_spread() {
        let (m, s) = mean_std(&[42.0]);
        assert_eq!(m, 42.0);
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(1.005 + 0.0001), 1.01);
        assert_eq!(round2(-3.456), -3.46);
        assert_eq!(round4(0.123456), 0.1235);
    }
}
