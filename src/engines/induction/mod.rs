pub mod entropy;
pub mod id3;

pub use id3::Id3Inducer;
