//! Ionospheric Hall and Pedersen conductivity from gridded model fields,
//! following Adachi et al. (2017) and Brekke (1983).
//!
//! Inputs are neutral composition and temperature, ionospheric composition,
//! density and temperatures, and geomagnetic field strength, each keyed by
//! `(time, height, latitude, longitude)`. [`pipeline::run`] derives
//! gyrofrequencies, collision frequencies and relative ion densities, joins
//! them onto the keys common to every source and evaluates both
//! conductivities.

pub mod config;
pub mod grid;
pub mod models;
pub mod physics;
pub mod pipeline;
pub mod processing;
