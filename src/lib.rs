//! Ecosphere - Closed-Loop Alien World Simulation
//!
//! Geography and climate drive an evolving ecosystem; intelligent species
//! found civilizations. The [`kernel`] runs the whole world one year per tick.

pub mod civilization;
pub mod climate;
pub mod core;
pub mod ecosystem;
pub mod events;
pub mod geography;
pub mod kernel;
