pub mod scan;

pub use scan::{BatchScanEntry, BatchTarget, ScanService, ScanServiceError};
