use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::errors::{ConfigurationError, Result};
use crate::io::containers::{
    write_features, write_features_csv, write_spectra, ArtifactLayout, SerializationFormat,
};
use crate::models::aggregators::MzGrouping;
use crate::models::binning::{bin_scan, Bin, BinPass, BinnedExperiment, BinningContext};
use crate::models::feature::Feature;
use crate::models::feature_finding::MassTraceFeatureFinder;
use crate::models::peak_picking::{AdaptivePeakPicker, PeakPickerConfig};
use crate::models::spectrum::Spectrum;
use crate::traits::feature_finder::{FeatureFinder, FeatureFinderParams};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: SerializationFormat,
    pub pretty: bool,
}

/// Everything a binning run can be configured with.
///
/// Only `num_bins` is required in a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningConfig {
    pub num_bins: usize,
    #[serde(default)]
    pub peak_pick: bool,
    #[serde(default)]
    pub peak_picker: PeakPickerConfig,
    /// `None` merges only exactly equal m/z values.
    #[serde(default)]
    pub aggregation_tolerance_ppm: Option<f64>,
    #[serde(default)]
    pub feature_finder: FeatureFinderParams,
    #[serde(default)]
    pub mass_trace: MassTraceFeatureFinder,
    #[serde(default)]
    pub output: OutputConfig,
}

fn check_tolerance(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidTolerance { name, value }.into())
    }
}

impl BinningConfig {
    pub fn new(num_bins: usize) -> Self {
        Self {
            num_bins,
            peak_pick: false,
            peak_picker: PeakPickerConfig::default(),
            aggregation_tolerance_ppm: None,
            feature_finder: FeatureFinderParams::default(),
            mass_trace: MassTraceFeatureFinder::default(),
            output: OutputConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_bins == 0 {
            return Err(ConfigurationError::ZeroBins.into());
        }
        self.peak_picker.validate()?;
        if let Some(tol) = self.aggregation_tolerance_ppm {
            check_tolerance("aggregation_tolerance_ppm", tol)?;
        }
        check_tolerance("mass_trace.mz_tolerance_ppm", self.mass_trace.mz_tolerance_ppm)?;
        Ok(())
    }

    pub fn grouping(&self) -> MzGrouping {
        MzGrouping::from_tolerance(self.aggregation_tolerance_ppm)
    }
}

/// What came out of a single bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinOutput {
    pub pass: BinPass,
    pub index: usize,
    pub mobility_range: (f64, f64),
    pub spectra: Vec<Spectrum>,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassOutput {
    pub pass: BinPass,
    pub bins: Vec<BinOutput>,
}

impl PassOutput {
    /// The spectra of every bin, bin after bin.
    pub fn combined_spectra(&self) -> Vec<Spectrum> {
        self.bins
            .iter()
            .flat_map(|x| x.spectra.iter().cloned())
            .collect()
    }

    pub fn combined_features(&self) -> Vec<Feature> {
        self.bins
            .iter()
            .flat_map(|x| x.features.iter().cloned())
            .collect()
    }

    pub fn num_features(&self) -> usize {
        self.bins.iter().map(|x| x.features.len()).sum()
    }
}

/// Runs binning, optional peak picking and feature finding over a run.
#[derive(Debug, Clone)]
pub struct BinningPipeline {
    config: BinningConfig,
    picker: Option<AdaptivePeakPicker>,
}

impl BinningPipeline {
    pub fn new(config: BinningConfig) -> Result<Self> {
        config.validate()?;
        let picker = if config.peak_pick {
            Some(AdaptivePeakPicker::new(config.peak_picker)?)
        } else {
            None
        };
        Ok(Self { config, picker })
    }

    pub fn config(&self) -> &BinningConfig {
        &self.config
    }

    /// Passes worth running. A single bin has no boundary to cover, so
    /// the offset pass is skipped.
    pub fn passes(&self) -> Vec<BinPass> {
        if self.config.num_bins == 1 {
            vec![BinPass::Primary]
        } else {
            vec![BinPass::Primary, BinPass::Offset]
        }
    }

    /// Bins every MS1 spectrum into both passes.
    ///
    /// Scans are binned in parallel and added to the bins in input
    /// order.
    #[instrument(name = "BinningPipeline::bin_spectra", skip_all)]
    pub fn bin_spectra(&self, spectra: &[Spectrum]) -> Result<BinnedExperiment> {
        let context = BinningContext::from_spectra(spectra, self.config.num_bins)?;
        info!("Binning with {}", context);
        let grouping = self.config.grouping();

        let st = Instant::now();
        let ms1: Vec<&Spectrum> = spectra.iter().filter(|x| x.is_ms1()).collect();
        let scan_bins = ms1
            .par_iter()
            .progress_count(ms1.len() as u64)
            .map(|x| bin_scan(&context, x, grouping))
            .collect::<Result<Vec<_>>>()?;

        let mut experiment = BinnedExperiment::new(context, grouping);
        for x in scan_bins {
            experiment.add_scan_bins(x);
        }
        info!(
            "Binned {} scans ({} points) in {:#?}",
            experiment.num_scans,
            experiment.num_points(BinPass::Primary),
            st.elapsed()
        );
        debug!("{}", experiment);
        Ok(experiment)
    }

    fn process_bin<F: FeatureFinder + ?Sized>(&self, bin: Bin, finder: &F) -> Result<BinOutput> {
        let spectra = match &self.picker {
            Some(picker) => picker.pick_spectra(&bin.spectra)?,
            None => bin.spectra,
        };
        let features = finder.find_features(&spectra, &self.config.feature_finder)?;
        debug!(
            "Pass {} bin {}: {} spectra, {} features",
            bin.pass.number(),
            bin.index,
            spectra.len(),
            features.len()
        );
        Ok(BinOutput {
            pass: bin.pass,
            index: bin.index,
            mobility_range: bin.mobility_range,
            spectra,
            features,
        })
    }

    /// Runs the feature finder on every bin of every pass. Bins are
    /// independent and processed in parallel.
    #[instrument(name = "BinningPipeline::find_features", skip_all)]
    pub fn find_features<F: FeatureFinder + ?Sized>(
        &self,
        experiment: BinnedExperiment,
        finder: &F,
    ) -> Result<Vec<PassOutput>> {
        let passes = self.passes();
        let BinnedExperiment {
            primary, offset, ..
        } = experiment;

        let mut out = Vec::with_capacity(passes.len());
        for (pass, bins) in [(BinPass::Primary, primary), (BinPass::Offset, offset)] {
            if !passes.contains(&pass) {
                continue;
            }
            let st = Instant::now();
            let bins = bins
                .into_par_iter()
                .map(|bin| self.process_bin(bin, finder))
                .collect::<Result<Vec<_>>>()?;
            let pass_out = PassOutput { pass, bins };
            info!(
                "Pass {}: {} features in {:#?}",
                pass.number(),
                pass_out.num_features(),
                st.elapsed()
            );
            out.push(pass_out);
        }
        Ok(out)
    }

    /// Bins and runs the configured mass trace feature finder.
    pub fn run(&self, spectra: &[Spectrum]) -> Result<Vec<PassOutput>> {
        let experiment = self.bin_spectra(spectra)?;
        self.find_features(experiment, &self.config.mass_trace)
    }

    /// Writes the per bin and per pass artifacts of a run.
    #[instrument(name = "BinningPipeline::write_outputs", skip_all)]
    pub fn write_outputs(&self, outputs: &[PassOutput], layout: &ArtifactLayout) -> Result<()> {
        layout.create_dir()?;
        let pretty = self.config.output.pretty;
        for pass_out in outputs {
            let pass = pass_out.pass;
            for bin in pass_out.bins.iter() {
                write_spectra(&layout.bin_spectra(pass, bin.index), &bin.spectra, pretty)?;
                write_features(&layout.bin_features(pass, bin.index), &bin.features, pretty)?;
            }
            let features = pass_out.combined_features();
            write_spectra(&layout.pass_spectra(pass), &pass_out.combined_spectra(), pretty)?;
            write_features(&layout.pass_features(pass), &features, pretty)?;
            write_features_csv(&layout.pass_features_csv(pass), &features)?;
        }
        info!("Wrote outputs to {}", layout.output_dir.display());
        Ok(())
    }
}
