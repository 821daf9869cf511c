use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, instrument};

use crate::errors::{ConfigurationError, EmptyInputError, Result};
use crate::models::spectrum::Spectrum;
use crate::utils::display::{glimpse_vec, GlimpseConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinPass {
    /// `num_bins` equal width bins spanning the mobility range.
    Primary,
    /// `num_bins + 1` bins shifted by half a bin, with half width
    /// bins on both edges.
    Offset,
}

impl BinPass {
    pub fn number(&self) -> u8 {
        match self {
            BinPass::Primary => 1,
            BinPass::Offset => 2,
        }
    }
}

/// Scans every MS1 spectrum and returns the smallest and largest
/// ion mobility observed.
///
/// Spectra of any other MS level are ignored. Every inspected spectrum
/// is checked for a well formed mobility channel.
#[instrument(skip(spectra), level = "debug")]
pub fn mobility_extent(spectra: &[Spectrum]) -> Result<(f64, f64)> {
    let mut smallest_im = f64::INFINITY;
    let mut largest_im = f64::NEG_INFINITY;
    let mut num_seen = 0usize;

    for spec in spectra.iter().filter(|x| x.is_ms1()) {
        spec.validate()?;
        for im in spec.mobility.iter() {
            smallest_im = smallest_im.min(*im);
            largest_im = largest_im.max(*im);
            num_seen += 1;
        }
    }

    if num_seen == 0 {
        return Err(EmptyInputError::NoMS1Data.into());
    }

    debug!(
        "Mobility extent over {} points: {} - {}",
        num_seen, smallest_im, largest_im
    );
    Ok((smallest_im, largest_im))
}

/// Immutable description of both bin partitionings of the
/// ion mobility range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinningContext {
    pub first_im: f64,
    pub last_im: f64,
    pub bin_size: f64,
    pub offset_im: f64,
    pub num_bins: usize,
}

impl BinningContext {
    pub fn new(first_im: f64, last_im: f64, num_bins: usize) -> Result<Self> {
        if num_bins == 0 {
            return Err(ConfigurationError::ZeroBins.into());
        }
        if !first_im.is_finite() || !last_im.is_finite() || last_im <= first_im {
            return Err(ConfigurationError::DegenerateMobilityRange { first_im, last_im }.into());
        }

        let bin_size = (last_im - first_im) / num_bins as f64;
        Ok(Self {
            first_im,
            last_im,
            bin_size,
            offset_im: first_im + bin_size / 2.0,
            num_bins,
        })
    }

    /// Runs the extent scan over the spectra and builds the context
    /// from the observed range.
    pub fn from_spectra(spectra: &[Spectrum], num_bins: usize) -> Result<Self> {
        if num_bins == 0 {
            return Err(ConfigurationError::ZeroBins.into());
        }
        let (first_im, last_im) = mobility_extent(spectra)?;
        Self::new(first_im, last_im, num_bins)
    }

    pub fn num_bins_in(&self, pass: BinPass) -> usize {
        match pass {
            BinPass::Primary => self.num_bins,
            BinPass::Offset => self.num_bins + 1,
        }
    }

    pub fn primary_bin_index(&self, mobility: f64) -> usize {
        let raw = ((mobility - self.first_im) / self.bin_size).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.num_bins - 1)
        }
    }

    pub fn offset_bin_index(&self, mobility: f64) -> usize {
        if mobility < self.offset_im {
            return 0;
        }
        let raw = ((mobility - self.offset_im) / self.bin_size).floor() as usize + 1;
        raw.min(self.num_bins)
    }

    /// Boundaries of every bin of a pass, `num_bins_in(pass) + 1` values
    /// going from `first_im` to `last_im`.
    pub fn bin_edges(&self, pass: BinPass) -> Vec<f64> {
        let mut edges = Vec::with_capacity(self.num_bins_in(pass) + 1);
        edges.push(self.first_im);
        match pass {
            BinPass::Primary => {
                for i in 1..self.num_bins {
                    edges.push(self.first_im + i as f64 * self.bin_size);
                }
            }
            BinPass::Offset => {
                for i in 0..self.num_bins {
                    edges.push(self.offset_im + i as f64 * self.bin_size);
                }
            }
        }
        edges.push(self.last_im);
        edges
    }

    pub fn bin_range(&self, pass: BinPass, index: usize) -> (f64, f64) {
        let edges = self.bin_edges(pass);
        (edges[index], edges[index + 1])
    }
}

impl Display for BinningContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut disp_str = String::new();
        disp_str.push_str("BinningContext\n");
        disp_str.push_str(&format!(
            "  mobility range: {} - {}\n",
            self.first_im, self.last_im
        ));
        disp_str.push_str(&format!(
            "  num_bins: {} bin_size: {} offset_im: {}\n",
            self.num_bins, self.bin_size, self.offset_im
        ));
        disp_str.push_str("  primary edges: ");
        disp_str.push_str(&glimpse_vec(
            &self.bin_edges(BinPass::Primary),
            Some(GlimpseConfig {
                max_items: 12,
                ..Default::default()
            }),
        ));
        write!(f, "{}", disp_str)
    }
}
