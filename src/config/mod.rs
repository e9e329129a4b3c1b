pub mod tracker;

pub use tracker::{TrackerConfig, DEFAULT_TRACKER_CONFIG_PATH, ENV_TRACKER_CONFIG_PATH};
