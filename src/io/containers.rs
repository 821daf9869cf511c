use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{DataReadingError, Result};
use crate::models::binning::BinPass;
use crate::models::feature::Feature;
use crate::models::spectrum::Spectrum;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SerializationFormat {
    #[default]
    Json,
    MessagePack,
}

impl SerializationFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SerializationFormat::Json => "json",
            SerializationFormat::MessagePack => "msgpack",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|x| x.to_str()) {
            Some("json") => Ok(SerializationFormat::Json),
            Some("msgpack") => Ok(SerializationFormat::MessagePack),
            _ => Err(DataReadingError::UnsupportedFormat(path.display().to_string()).into()),
        }
    }
}

/// Serializes `value` to `path`, the format given by the extension.
pub fn write_container<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let format = SerializationFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        SerializationFormat::Json if pretty => serde_json::to_writer_pretty(&mut writer, value)?,
        SerializationFormat::Json => serde_json::to_writer(&mut writer, value)?,
        SerializationFormat::MessagePack => rmp_serde::encode::write_named(&mut writer, value)?,
    }
    writer.flush()?;
    debug!("Wrote {}", path.display());
    Ok(())
}

pub fn read_container<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = SerializationFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    let out = match format {
        SerializationFormat::Json => serde_json::from_reader(reader)?,
        SerializationFormat::MessagePack => rmp_serde::from_read(reader)?,
    };
    Ok(out)
}

pub fn write_spectra(path: &Path, spectra: &[Spectrum], pretty: bool) -> Result<()> {
    write_container(path, spectra, pretty)
}

pub fn read_spectra(path: &Path) -> Result<Vec<Spectrum>> {
    read_container(path)
}

pub fn write_features(path: &Path, features: &[Feature], pretty: bool) -> Result<()> {
    write_container(path, features, pretty)
}

pub fn read_features(path: &Path) -> Result<Vec<Feature>> {
    read_container(path)
}

/// One row of a feature table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub rt: f64,
    pub mz: f64,
    pub im: f64,
}

impl From<&Feature> for FeatureRecord {
    fn from(feature: &Feature) -> Self {
        Self {
            rt: feature.rt,
            mz: feature.mz,
            im: feature.mobility,
        }
    }
}

pub fn write_features_csv(path: &Path, features: &[Feature]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for feature in features {
        writer.serialize(FeatureRecord::from(feature))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a feature table. The first row is a header and only the first
/// three columns (rt, m/z, ion mobility) are used, whatever their names.
pub fn read_features_csv(path: &Path) -> Result<Vec<FeatureRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut out = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let field = |j: usize| -> Result<f64> {
            record
                .get(j)
                .and_then(|x| x.parse::<f64>().ok())
                .ok_or_else(|| {
                    DataReadingError::UnsupportedFormat(format!(
                        "{}: row {} column {} is not a number",
                        path.display(),
                        i + 1,
                        j + 1
                    ))
                    .into()
                })
        };
        out.push(FeatureRecord {
            rt: field(0)?,
            mz: field(1)?,
            im: field(2)?,
        });
    }
    Ok(out)
}

/// Paths of every artifact written for one run.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    pub output_dir: PathBuf,
    pub name: String,
    pub format: SerializationFormat,
}

impl ArtifactLayout {
    pub fn new(output_dir: impl Into<PathBuf>, name: impl Into<String>, format: SerializationFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            name: name.into(),
            format,
        }
    }

    pub fn create_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    fn path(&self, stem: String) -> PathBuf {
        self.output_dir.join(stem)
    }

    pub fn bin_spectra(&self, pass: BinPass, bin: usize) -> PathBuf {
        self.path(format!(
            "{}-pass{}-bin{}.spectra.{}",
            self.name,
            pass.number(),
            bin,
            self.format.extension()
        ))
    }

    pub fn bin_features(&self, pass: BinPass, bin: usize) -> PathBuf {
        self.path(format!(
            "{}-pass{}-bin{}.features.{}",
            self.name,
            pass.number(),
            bin,
            self.format.extension()
        ))
    }

    pub fn pass_spectra(&self, pass: BinPass) -> PathBuf {
        self.path(format!(
            "{}-pass{}.spectra.{}",
            self.name,
            pass.number(),
            self.format.extension()
        ))
    }

    pub fn pass_features(&self, pass: BinPass) -> PathBuf {
        self.path(format!(
            "{}-pass{}.features.{}",
            self.name,
            pass.number(),
            self.format.extension()
        ))
    }

    pub fn pass_features_csv(&self, pass: BinPass) -> PathBuf {
        self.path(format!("{}-pass{}.features.csv", self.name, pass.number()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ImBinningError;
    use crate::models::feature::{ConvexHull, HullPoint};

    fn spectra() -> Vec<Spectrum> {
        let mut a = Spectrum::new(1.5, 1);
        a.push(400.25, 100.0, 0.91);
        a.push(401.0, 3.0, 0.95);
        vec![a, Spectrum::new(2.5, 1)]
    }

    fn feature() -> Feature {
        Feature {
            rt: 12.0,
            mz: 500.5,
            mobility: 1.01,
            intensity: 1e5,
            score: 0.8,
            rt_range: (10.0, 14.0),
            mz_range: (500.49, 500.51),
            convex_hull: ConvexHull::from_points(&[
                HullPoint::new(10.0, 500.49),
                HullPoint::new(14.0, 500.5),
                HullPoint::new(12.0, 500.51),
            ]),
            num_supporting_peaks: 5,
        }
    }

    #[test]
    fn test_spectra_containers() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["spectra.json", "spectra.msgpack"] {
            let path = dir.path().join(name);
            write_spectra(&path, &spectra(), true).unwrap();
            assert_eq!(read_spectra(&path).unwrap(), spectra());
        }
    }

    #[test]
    fn test_feature_containers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.msgpack");
        write_features(&path, &[feature()], false).unwrap();
        assert_eq!(read_features(&path).unwrap(), vec![feature()]);
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectra.mzML");
        let res = write_spectra(&path, &spectra(), false);
        assert!(matches!(
            res,
            Err(ImBinningError::DataReadingError(DataReadingError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn test_feature_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        write_features_csv(&path, &[feature(), feature()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("rt,mz,im\n"));

        let records = read_features_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], FeatureRecord::from(&feature()));
    }

    #[test]
    fn test_foreign_csv_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.csv");
        std::fs::write(&path, "RT, MZ, IM, charge\n100.0, 500.1, 0.9, 2\n").unwrap();
        let records = read_features_csv(&path).unwrap();
        assert_eq!(records, vec![FeatureRecord { rt: 100.0, mz: 500.1, im: 0.9 }]);

        std::fs::write(&path, "rt,mz,im\n1.0,abc,0.9\n").unwrap();
        assert!(read_features_csv(&path).is_err());
    }

    #[test]
    fn test_artifact_names() {
        let layout = ArtifactLayout::new("/tmp/out", "run1", SerializationFormat::Json);
        assert_eq!(
            layout.bin_spectra(BinPass::Offset, 3),
            PathBuf::from("/tmp/out/run1-pass2-bin3.spectra.json")
        );
        assert_eq!(
            layout.pass_features(BinPass::Primary),
            PathBuf::from("/tmp/out/run1-pass1.features.json")
        );
        assert_eq!(
            layout.pass_features_csv(BinPass::Primary),
            PathBuf::from("/tmp/out/run1-pass1.features.csv")
        );
    }
}
