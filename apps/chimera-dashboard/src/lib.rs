pub mod bootstrap;
pub mod obs;
pub mod runner;
