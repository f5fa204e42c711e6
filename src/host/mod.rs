//! In-memory model of the host kernel (kernel A): values, curves, surfaces,
//! topology, meshes and the two builders that assemble solids and meshes.

mod builder;
mod curve;
mod error;
mod mesh;
mod surface;
mod topology;
mod values;

pub use builder::{BRepBuilder, BRepType, BuilderEdgeId, BuilderFaceId, BuilderLoopId};
pub use curve::{
    HostArc, HostCurve, HostCylindricalHelix, HostEllipse, HostHermiteSpline, HostLine,
    HostNurbSpline,
};
pub use error::HostError;
pub use mesh::{HostMesh, HostMeshFacet, TessellatedFace, TessellatedShapeBuilder};
pub use surface::{
    HostConicalSurface, HostCylindricalSurface, HostHermiteSurface, HostNurbsSurface,
    HostRevolvedSurface, HostRuledSurface, HostSurface, RuledProfile,
};
pub use topology::{HostCoEdge, HostEdge, HostEdgeLoop, HostFace, HostSolid};
pub use values::{
    ABSOLUTE_TOLERANCE, ANGLE_TOLERANCE, ElementId, HostBoundingBoxUv, HostBoundingBoxXyz,
    HostPlane, HostPolyLine, HostTransform, SHORT_CURVE_TOLERANCE, Uv, VERTEX_TOLERANCE, Xyz,
};

#[cfg(test)]
mod tests;
