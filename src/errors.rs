use std::fmt::Display;
use timsrust::readers::{FrameReaderError, MetadataReaderError};
use timsrust::TimsRustError;

#[derive(Debug)]
pub enum ImBinningError {
    ConfigurationError(ConfigurationError),
    EmptyInputError(EmptyInputError),
    DataIntegrityError(DataIntegrityError),
    DataReadingError(DataReadingError),
    Other(String),
}

pub type Result<T> = std::result::Result<T, ImBinningError>;

impl Display for ImBinningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            Self::EmptyInputError(e) => write!(f, "Empty input: {:?}", e),
            Self::DataIntegrityError(e) => write!(f, "Data integrity error: {:?}", e),
            Self::DataReadingError(e) => write!(f, "Data reading error: {:?}", e),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ImBinningError {}

impl ImBinningError {
    pub fn custom(msg: impl Display) -> Self {
        Self::Other(msg.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    ZeroBins,
    DegenerateMobilityRange { first_im: f64, last_im: f64 },
    InvalidPeakPickerSetting { name: &'static str, value: f64 },
    InvalidTolerance { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmptyInputError {
    NoMS1Data,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataIntegrityError {
    /// The m/z and intensity arrays of a scan differ in length.
    PeakArrayLengthMismatch { rt: f64, mzs: usize, intensities: usize },
    /// The ion mobility side channel does not match the peak count.
    MobilityLengthMismatch { rt: f64, peaks: usize, mobilities: usize },
    /// A NaN or infinite m/z, intensity or mobility.
    NonFiniteValue { rt: f64, index: usize },
}

#[derive(Debug)]
pub enum DataReadingError {
    TimsRustError(TimsRustError), // Why doesnt timsrust error derive clone?
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    MsgPackEncodeError(rmp_serde::encode::Error),
    MsgPackDecodeError(rmp_serde::decode::Error),
    CsvError(csv::Error),
    UnsupportedFormat(String),
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroBins => write!(f, "num_bins must be at least 1"),
            Self::DegenerateMobilityRange { first_im, last_im } => write!(
                f,
                "ion mobility range {} - {} is empty, cannot bin it",
                first_im, last_im
            ),
            Self::InvalidPeakPickerSetting { name, value } => {
                write!(f, "invalid peak picker setting {} = {}", name, value)
            }
            Self::InvalidTolerance { name, value } => {
                write!(f, "{} must be a positive number, got {}", name, value)
            }
        }
    }
}

impl From<ConfigurationError> for ImBinningError {
    fn from(e: ConfigurationError) -> Self {
        ImBinningError::ConfigurationError(e)
    }
}

impl From<EmptyInputError> for ImBinningError {
    fn from(e: EmptyInputError) -> Self {
        ImBinningError::EmptyInputError(e)
    }
}

impl From<DataIntegrityError> for ImBinningError {
    fn from(e: DataIntegrityError) -> Self {
        ImBinningError::DataIntegrityError(e)
    }
}

impl From<DataReadingError> for ImBinningError {
    fn from(e: DataReadingError) -> Self {
        ImBinningError::DataReadingError(e)
    }
}

impl From<TimsRustError> for ImBinningError {
    fn from(e: TimsRustError) -> Self {
        DataReadingError::TimsRustError(e).into()
    }
}

impl From<FrameReaderError> for ImBinningError {
    fn from(e: FrameReaderError) -> Self {
        TimsRustError::from(e).into()
    }
}

impl From<MetadataReaderError> for ImBinningError {
    fn from(e: MetadataReaderError) -> Self {
        TimsRustError::from(e).into()
    }
}

impl From<std::io::Error> for ImBinningError {
    fn from(e: std::io::Error) -> Self {
        DataReadingError::IoError(e).into()
    }
}

impl From<serde_json::Error> for ImBinningError {
    fn from(e: serde_json::Error) -> Self {
        DataReadingError::JsonError(e).into()
    }
}

impl From<rmp_serde::encode::Error> for ImBinningError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        DataReadingError::MsgPackEncodeError(e).into()
    }
}

impl From<rmp_serde::decode::Error> for ImBinningError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        DataReadingError::MsgPackDecodeError(e).into()
    }
}

impl From<csv::Error> for ImBinningError {
    fn from(e: csv::Error) -> Self {
        DataReadingError::CsvError(e).into()
    }
}
