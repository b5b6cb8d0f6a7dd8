//! Domain types for ScanLab

pub mod bar;
pub mod interval;

pub use bar::{PriceBar, PriceSeries};
pub use interval::{Interval, Period};

/// Symbol type alias
pub type Symbol = String;
