//! Bidirectional boundary representation interchange between a host modeling
//! kernel ([`host`]) and a NURBS based guest kernel ([`geom`]).
//!
//! [`convert`] holds the conversions: plain values, curves and surfaces are
//! converted exactly or fail; solids and meshes are converted best effort and
//! come back with [`convert::ConversionDiagnostics`].

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod convert;
pub mod geom;
pub mod host;
