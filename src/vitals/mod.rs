pub mod classifier;
pub mod sampler;
pub mod source;

pub use classifier::{ClassifierError, VitalsClassifier};
pub use sampler::{IngestFeed, IngestedVitals, SimulatedVitals, VitalsSample, VitalsSampler};
pub use source::{VitalsReading, VitalsSource};
