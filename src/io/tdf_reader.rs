use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use timsrust::converters::ConvertableDomain;
use timsrust::readers::{FrameReader, FrameReaderError, MetadataReader};
use timsrust::{Frame, MSLevel, Metadata};
use tracing::{info, instrument, warn};

use crate::errors::{EmptyInputError, Result};
use crate::models::spectrum::Spectrum;
use crate::utils::compress_explode::explode_vec;

/// Drops the frames timsrust could not decode, logging each one.
pub fn warn_and_skip_badframes(
    frame_iter: impl ParallelIterator<Item = std::result::Result<Frame, FrameReaderError>>,
) -> impl ParallelIterator<Item = Frame> {
    frame_iter.filter_map(|x| match x {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!("Skipping unreadable frame: {:?}", e);
            None
        }
    })
}

/// Reads the MS1 frames of a Bruker timsTOF `.d` directory as spectra.
pub struct TdfReader {
    path: PathBuf,
    frame_reader: FrameReader,
    metadata: Metadata,
}

impl TdfReader {
    #[instrument(name = "TdfReader::from_path", skip_all)]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        info!("Opening timsTOF data at {}", path.display());
        let frame_reader = FrameReader::new(&path)?;
        let metadata = MetadataReader::new(path.join("analysis.tdf"))?;
        Ok(Self {
            path,
            frame_reader,
            metadata,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn num_frames(&self) -> usize {
        self.frame_reader.len()
    }

    /// Converts a raw frame. Every peak keeps the mobility of its scan.
    pub fn frame_to_spectrum(&self, frame: &Frame, ms_level: u8) -> Spectrum {
        let scan_numbers = explode_vec(&frame.scan_offsets);
        let mut out = Spectrum::with_capacity(frame.rt, ms_level, frame.tof_indices.len());
        for ((tof, intensity), scan) in frame
            .tof_indices
            .iter()
            .zip(frame.intensities.iter())
            .zip(scan_numbers.iter())
        {
            out.push(
                self.metadata.mz_converter.convert(*tof as f64),
                *intensity as f64,
                self.metadata.im_converter.convert(*scan as f64),
            );
        }
        out.sort_by_mz();
        out
    }

    /// All readable MS1 frames, sorted by retention time.
    #[instrument(name = "TdfReader::read_ms1_spectra", skip_all)]
    pub fn read_ms1_spectra(&self) -> Result<Vec<Spectrum>> {
        let st = Instant::now();
        let ms1_iter = self
            .frame_reader
            .parallel_filter(|x| x.ms_level == MSLevel::MS1);
        let mut spectra: Vec<Spectrum> = warn_and_skip_badframes(ms1_iter)
            .map(|frame| self.frame_to_spectrum(&frame, 1))
            .collect();

        if spectra.is_empty() {
            return Err(EmptyInputError::NoMS1Data.into());
        }
        spectra.sort_by(|a, b| a.rt.total_cmp(&b.rt));

        let num_peaks: usize = spectra.iter().map(|x| x.len()).sum();
        info!(
            "Read {} MS1 spectra ({} peaks) out of {} frames from {} in {:#?}",
            spectra.len(),
            num_peaks,
            self.num_frames(),
            self.path().display(),
            st.elapsed()
        );
        Ok(spectra)
    }
}
