pub mod config;
pub mod evaluation;
pub mod evolution;
pub mod export;
pub mod tuner;
