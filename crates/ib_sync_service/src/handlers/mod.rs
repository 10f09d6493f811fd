pub mod cycle;
pub mod identifier;
