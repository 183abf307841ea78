pub mod config;
pub mod history;
pub mod problem;
pub mod sampler;
pub mod session;
