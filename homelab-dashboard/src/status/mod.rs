pub mod aggregator;
pub mod prober;
