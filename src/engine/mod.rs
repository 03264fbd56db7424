pub mod audit;
pub mod control_tower;
pub mod rate;
pub mod routing;
pub mod scoring;
pub mod selector;
pub mod serviceability;
pub mod weight;
