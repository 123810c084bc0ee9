//! Indicator drivers: turn the latest value of a state cell into a timed
//! HIGH/LOW waveform on one or two output lines.

pub mod frequency;
pub mod localization;
pub mod throughput;

pub use frequency::FrequencyMap;
pub use localization::LocalizationIndicator;
pub use throughput::ThroughputIndicator;
