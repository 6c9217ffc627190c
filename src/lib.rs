pub mod charts;
pub mod loader;
pub mod record;
pub mod report;
pub mod stats;
