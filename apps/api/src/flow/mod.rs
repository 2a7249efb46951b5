// Flow Controller: greet → collect → generate + answer → conclude.
// Driven by discrete events instead of whole-page re-execution.

pub mod controller;
pub mod handlers;
pub mod view;
