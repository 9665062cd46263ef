//! Numerical primitives for the SCPN warped-disk simulator.

pub mod interp;
pub mod quadrature;
pub mod sphere;
pub mod stencil;
