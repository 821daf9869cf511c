/// Settings for a short, human readable preview of a long slice.
#[derive(Debug, Clone, Copy)]
pub struct GlimpseConfig {
    /// Slices longer than this are shown as head ... tail.
    pub max_items: usize,
    /// Number of items shown on each side when truncating.
    pub edge_items: usize,
    pub padding: usize,
    pub new_line: bool,
}

impl Default for GlimpseConfig {
    fn default() -> Self {
        GlimpseConfig {
            max_items: 10,
            edge_items: 3,
            padding: 0,
            new_line: false,
        }
    }
}

/// Formats a slice for log lines and `Display` impls without dumping
/// thousands of elements.
///
/// # Example
/// ```
/// use imbinning::utils::display::glimpse_vec;
///
/// let out = glimpse_vec(&[1, 2, 3], None);
/// assert_eq!(out, "[1, 2, 3]");
///
/// let long: Vec<usize> = (0..100).collect();
/// let out = glimpse_vec(&long, None);
/// assert_eq!(out, "[0, 1, 2, ..., 97, 98, 99] len = 100");
/// ```
pub fn glimpse_vec<T: std::fmt::Debug>(v: &[T], config: Option<GlimpseConfig>) -> String {
    let config = config.unwrap_or_default();
    let padding = " ".repeat(config.padding);
    let separator = if config.new_line {
        format!(",\n{}", padding)
    } else {
        ", ".to_string()
    };
    let fmt_items = |items: &[T]| -> Vec<String> { items.iter().map(|x| format!("{:?}", x)).collect() };

    let len = v.len();
    let (open, close) = if config.new_line {
        (format!("[\n{}", padding), "\n]".to_string())
    } else {
        ("[".to_string(), "]".to_string())
    };

    if len > config.max_items && len > 2 * config.edge_items {
        let mut parts = fmt_items(&v[..config.edge_items]);
        parts.push("...".to_string());
        parts.extend(fmt_items(&v[len - config.edge_items..]));
        format!("{}{}{} len = {}", open, parts.join(&separator), close, len)
    } else {
        format!("{}{}{}", open, fmt_items(v).join(&separator), close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glimpse_empty() {
        let v: Vec<f64> = vec![];
        assert_eq!(glimpse_vec(&v, None), "[]");
    }

    #[test]
    fn test_glimpse_new_line() {
        let out = glimpse_vec(
            &[1, 2],
            Some(GlimpseConfig {
                padding: 2,
                new_line: true,
                ..Default::default()
            }),
        );
        assert_eq!(out, "[\n  1,\n  2\n]");
    }
}
