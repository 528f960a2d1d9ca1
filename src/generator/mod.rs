//! Trajectory generation

pub mod cleaner;
pub mod gpx;
pub mod position;
pub mod tracker;
pub mod trajectory;

#[cfg(test)]
mod tests;
