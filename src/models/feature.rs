use serde::{Deserialize, Serialize};

/// A vertex of a feature hull in (retention time, m/z) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HullPoint {
    pub rt: f64,
    pub mz: f64,
}

impl HullPoint {
    pub fn new(rt: f64, mz: f64) -> Self {
        Self { rt, mz }
    }
}

fn cross(o: &HullPoint, a: &HullPoint, b: &HullPoint) -> f64 {
    (a.rt - o.rt) * (b.mz - o.mz) - (a.mz - o.mz) * (b.rt - o.rt)
}

/// Convex hull of a point set, vertices in counter clockwise order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvexHull {
    pub points: Vec<HullPoint>,
}

impl ConvexHull {
    /// Monotone chain hull. Collinear points are dropped and fewer than
    /// three distinct points are kept as they are.
    pub fn from_points(points: &[HullPoint]) -> Self {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.rt.total_cmp(&b.rt).then(a.mz.total_cmp(&b.mz)));
        sorted.dedup();

        if sorted.len() < 3 {
            return Self { points: sorted };
        }

        let mut lower: Vec<HullPoint> = Vec::with_capacity(sorted.len());
        for p in sorted.iter() {
            while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
                lower.pop();
            }
            lower.push(*p);
        }

        let mut upper: Vec<HullPoint> = Vec::with_capacity(sorted.len());
        for p in sorted.iter().rev() {
            while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
                upper.pop();
            }
            upper.push(*p);
        }

        lower.pop();
        upper.pop();
        lower.extend(upper);
        Self { points: lower }
    }

    /// Shoelace area.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let a = &self.points[i];
                let b = &self.points[(i + 1) % n];
                a.rt * b.mz - b.rt * a.mz
            })
            .sum();
        twice.abs() / 2.0
    }

    /// `((min_rt, max_rt), (min_mz, max_mz))`, `None` for an empty hull.
    pub fn bounding_box(&self) -> Option<((f64, f64), (f64, f64))> {
        let first = self.points.first()?;
        let init = ((first.rt, first.rt), (first.mz, first.mz));
        Some(self.points.iter().fold(init, |((rt0, rt1), (mz0, mz1)), p| {
            ((rt0.min(p.rt), rt1.max(p.rt)), (mz0.min(p.mz), mz1.max(p.mz)))
        }))
    }
}

/// A detected feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub rt: f64,
    pub mz: f64,
    pub mobility: f64,
    pub intensity: f64,
    pub score: f64,
    pub rt_range: (f64, f64),
    pub mz_range: (f64, f64),
    pub convex_hull: ConvexHull,
    pub num_supporting_peaks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_hull() {
        let points = vec![
            HullPoint::new(0.0, 0.0),
            HullPoint::new(1.0, 0.0),
            HullPoint::new(0.5, 0.5),
            HullPoint::new(1.0, 1.0),
            HullPoint::new(0.0, 1.0),
            HullPoint::new(0.0, 0.5),
        ];
        let hull = ConvexHull::from_points(&points);
        assert_eq!(hull.points.len(), 4);
        assert!((hull.area() - 1.0).abs() < 1e-12);
        assert_eq!(hull.bounding_box(), Some(((0.0, 1.0), (0.0, 1.0))));
    }

    #[test]
    fn test_degenerate_hulls() {
        let hull = ConvexHull::from_points(&[]);
        assert!(hull.points.is_empty());
        assert_eq!(hull.area(), 0.0);
        assert_eq!(hull.bounding_box(), None);

        let line = vec![
            HullPoint::new(0.0, 500.0),
            HullPoint::new(1.0, 500.0),
            HullPoint::new(2.0, 500.0),
        ];
        let hull = ConvexHull::from_points(&line);
        assert_eq!(hull.area(), 0.0);
        assert_eq!(hull.bounding_box(), Some(((0.0, 2.0), (500.0, 500.0))));
    }
}
