//! Application state shared by handlers.

use genscan_core::Config;
use genscan_detector::Detector;

pub struct AppState {
    pub config: Config,
    pub detector: Detector,
}

impl AppState {
    pub fn new(config: Config, detector: Detector) -> Self {
        Self { config, detector }
    }
}
