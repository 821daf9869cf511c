/// Expands an offsets vector into one group index per element.
///
/// `input[i]..input[i + 1]` is the range of elements belonging to
/// group `i`, the way timsTOF frames store the peaks of every scan.
///
/// # Examples
/// ```
/// use imbinning::utils::compress_explode::explode_vec;
///
/// let input = vec![0, 0, 5, 5, 5, 7];
/// let out = explode_vec(&input);
/// assert_eq!(out, vec![1, 1, 1, 1, 1, 4, 4]);
/// ```
pub fn explode_vec(input: &[usize]) -> Vec<usize> {
    let last_val = match input.last() {
        Some(last) => *last,
        None => return Vec::new(),
    };

    let mut out = Vec::with_capacity(last_val);
    for (i, window) in input.windows(2).enumerate() {
        out.extend(std::iter::repeat(i).take(window[1].saturating_sub(window[0])));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_explode_small() {
        let data = vec![0, 2, 2, 3];
        assert_eq!(explode_vec(&data), vec![0, 0, 2]);
    }

    #[test]
    fn test_vec_explode_empty() {
        assert!(explode_vec(&[]).is_empty());
        assert!(explode_vec(&[0]).is_empty());
    }
}
