pub mod network;
pub mod rules;
