/// Returns the indices that would (stably) sort the slice by the
/// given key.
///
/// Keys are compared with `f64::total_cmp`, NaN sorts after infinity.
///
/// # Example
/// ```
/// use imbinning::utils::sorting::argsort_by;
///
/// let v = vec![3.0, 1.0, 2.0, 1.0];
/// assert_eq!(argsort_by(&v, |x| *x), vec![1, 3, 2, 0]);
/// ```
pub fn argsort_by<T, F: Fn(&T) -> f64>(v: &[T], key: F) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..v.len()).collect();
    indices.sort_by(|&a, &b| key(&v[a]).total_cmp(&key(&v[b])));
    indices
}

/// Macro that re-orders an arbitrary number of vecs using
/// a slice of indices (usually the output of `argsort_by`).
///
/// NOTE: This macro creates a new ordered vec for each one and
/// swaps it in place of the original.
///
/// # Example
/// ```
/// use imbinning::sort_by_indices_multi;
/// use imbinning::utils::sorting::argsort_by;
///
/// let mut va = vec![9, 8, 7];
/// let mut vb = vec!['a', 'b', 'c'];
/// let indices = argsort_by(&va, |x| *x as f64);
/// sort_by_indices_multi!(&indices, &mut va, &mut vb);
///
/// assert_eq!(va, vec![7, 8, 9]);
/// assert_eq!(vb, vec!['c', 'b', 'a']);
/// ```
#[macro_export]
macro_rules! sort_by_indices_multi {
    ($indices:expr $(, $vec:expr)+ $(,)?) => {{
        let indices: &[usize] = $indices;
        $(
            {
                let vec_ref = $vec;
                assert_eq!(
                    vec_ref.len(),
                    indices.len(),
                    "All vectors must have the same length"
                );
                let sorted: Vec<_> = indices.iter().map(|&i| vec_ref[i]).collect();
                *vec_ref = sorted;
            }
        )+
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argsort_is_stable() {
        let v = vec![2.0, 1.0, 2.0, 1.0, 0.5];
        let out = argsort_by(&v, |x| *x);
        assert_eq!(out, vec![4, 1, 3, 0, 2]);
    }

    #[test]
    fn test_sort_three_vecs() {
        let mut v1 = vec![3.0, 1.0, 4.0];
        let mut v2 = vec!['x', 'y', 'z'];
        let mut v3 = vec![true, false, true];

        let indices = argsort_by(&v1, |x| *x);
        sort_by_indices_multi!(&indices, &mut v1, &mut v2, &mut v3);

        assert_eq!(v1, vec![1.0, 3.0, 4.0]);
        assert_eq!(v2, vec!['y', 'x', 'z']);
        assert_eq!(v3, vec![false, true, true]);
    }

    #[test]
    fn test_descending_key() {
        let v = vec![1.0, 5.0, 3.0];
        let out = argsort_by(&v, |x| -*x);
        assert_eq!(out, vec![1, 2, 0]);
    }

    #[test]
    fn test_nan_keys_sort_last() {
        let mut v: Vec<f64> = (0..1050).map(|i| ((i * 7919) % 1000) as f64).collect();
        for i in (0..v.len()).step_by(13) {
            v[i] = f64::NAN;
        }
        let out = argsort_by(&v, |x| *x);
        assert_eq!(out.len(), v.len());
        let num_nan = v.iter().filter(|x| x.is_nan()).count();
        let (finite, nan) = out.split_at(out.len() - num_nan);
        assert!(nan.iter().all(|&i| v[i].is_nan()));
        assert!(finite.windows(2).all(|w| v[w[0]] <= v[w[1]]));
    }
}
