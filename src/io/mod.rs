pub mod containers;
pub mod tdf_reader;

pub use containers::{ArtifactLayout, FeatureRecord, SerializationFormat};
pub use tdf_reader::TdfReader;
