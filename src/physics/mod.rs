//! Closed-form plasma quantities feeding the conductivity formulas.
//!
//! Each calculator offers whole-vector formula functions over already aligned
//! columns and an `*_all` entry point over keyed [`crate::grid::field::Field`]s.

pub mod collision;
pub mod conductivity;
pub mod constants;
pub mod density;
pub mod gyrofrequency;
