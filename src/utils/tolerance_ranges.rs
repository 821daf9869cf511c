use std::ops::RangeInclusive;

pub fn ppm_tol_range(elem: f64, tol_ppm: f64) -> RangeInclusive<f64> {
    let utol = elem * (tol_ppm / 1e6);
    let left_e = elem - utol;
    let right_e = elem + utol;
    left_e..=right_e
}

/// Index range of the elements of a sorted slice that fall
/// inside `range` (both ends included).
pub fn sorted_slice_range(sorted: &[f64], range: &RangeInclusive<f64>) -> std::ops::Range<usize> {
    let start = sorted.partition_point(|x| x < range.start());
    let end = sorted.partition_point(|x| x <= range.end());
    start..end.max(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppm_range() {
        let range = ppm_tol_range(1000.0, 10.0);
        assert!((range.start() - 999.99).abs() < 1e-9);
        assert!((range.end() - 1000.01).abs() < 1e-9);
    }

    #[test]
    fn test_sorted_slice_range() {
        let v = vec![1.0, 2.0, 2.0, 3.0, 4.0];
        assert_eq!(sorted_slice_range(&v, &(2.0..=3.0)), 1..4);
        assert_eq!(sorted_slice_range(&v, &(9.0..=11.0)), 5..5);
        assert_eq!(sorted_slice_range(&v, &(-0.5..=0.5)), 0..0);
    }
}
