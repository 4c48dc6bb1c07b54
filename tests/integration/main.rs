#[path = "../common/mod.rs"]
mod common;

mod optimization_tests;
mod simulation_tests;
