use serde::{Deserialize, Serialize};

/// A single measurement in the four dimensional space of an
/// ion mobility experiment.
///
/// Points are `Copy`, every bin gets its own value of each point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub rt: f64,
    pub mz: f64,
    pub intensity: f64,
    pub mobility: f64,
}

impl Point {
    pub fn new(rt: f64, mz: f64, intensity: f64, mobility: f64) -> Self {
        Self {
            rt,
            mz,
            intensity,
            mobility,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mz: f64,
    pub intensity: f64,
}

impl Peak {
    pub fn new(mz: f64, intensity: f64) -> Self {
        Self { mz, intensity }
    }
}

impl From<&Point> for Point {
    fn from(point: &Point) -> Self {
        *point
    }
}
