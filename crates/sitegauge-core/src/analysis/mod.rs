pub mod model;
pub mod normalize;
pub mod raw;
pub mod resolve;
