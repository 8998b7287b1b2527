pub mod engine;
pub mod logic;
pub mod robot;
