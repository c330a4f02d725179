// Composition root for the exercise_progress bounded context.
//
// Responsibilities:
// - Read config from environment.
// - Instantiate concrete infrastructure implementations.
// - Wire implementations into use case handlers.
// - Spawn the reconciliation worker.

pub mod config;
pub mod graphql;
pub mod http;
pub mod state;
