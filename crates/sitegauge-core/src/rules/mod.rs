pub mod composite;
pub mod insights;
pub mod ladder;
