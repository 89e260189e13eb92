pub mod analysis;
pub mod bar;
pub mod order;
pub mod position;
pub mod side;
pub mod snapshot;
