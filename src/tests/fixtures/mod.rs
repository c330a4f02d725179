pub mod app;
pub mod workouts;
