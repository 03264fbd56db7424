pub mod control_tower;
pub mod partner;
pub mod selection;
pub mod shipment;
