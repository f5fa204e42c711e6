//! Conversion between the host kernel ([`crate::host`]) and the guest kernel
//! ([`crate::geom`]).
//!
//! `decode_*` functions go from host to guest, `encode_*` from guest to host.
//! Value and curve conversions fail outright on unsupported input; solid and
//! mesh conversions are best effort and report what they left out through
//! [`ConversionDiagnostics`].

mod brep_decode;
mod brep_encode;
mod context;
mod curve;
mod diagnostics;
mod error;
mod mesh;
mod options;
mod pullback;
mod surface;
mod values;

pub use brep_decode::{decode_face, decode_face_with_options, decode_solid, decode_solid_with_options};
pub use brep_encode::{encode_solid, encode_solid_with_options};
pub use context::{ContextGuard, ConversionContext};
pub use curve::{
    UNBOUND_LINE_EXTENT, decode_curve, decode_curve_with_options, decode_curves, encode_curve,
    encode_curve_with_options, pad_end_knots, strip_end_knots,
};
pub use diagnostics::{ConversionDiagnostics, ConversionWarning};
pub use error::{ConversionError, ConversionResult};
pub use mesh::{decode_mesh, decode_mesh_with_options, decode_meshes, encode_mesh, encode_mesh_with_options};
pub use options::{ConversionOptions, HostTolerances, NO_SCALE};
pub use surface::{decode_surface, decode_surface_with_options, encode_surface, encode_surface_with_options};
pub use values::{
    OrientedBox, decode_bbox, decode_oriented_box, decode_plane, decode_point, decode_point_with_options,
    decode_polyline, decode_transform, decode_uv, decode_uv_vector, decode_vector, encode_bbox,
    encode_oriented_box, encode_plane, encode_point, encode_point_with_options, encode_polyline,
    encode_transform, encode_uv, encode_uv_vector, encode_vector,
};

#[cfg(test)]
mod tests;
