mod brep;
mod core;
mod curve;
mod error;
mod mesh;
mod nurbs;
mod surface;
mod trim;

pub use brep::{
    Brep, BrepEdge, BrepFace, BrepLoop, BrepTrim, BrepVertex, LoopType, SolidOrientation,
    TrimType,
};
pub use core::{BBox, Interval, Plane, Point2, Point3, Tolerance, Transform, Vec2, Vec3};
pub use curve::{ArcCurve, Curve, Curve3, LineCurve, PolylineCurve};
pub use error::GeomError;
pub use mesh::{Mesh, MeshFace};
pub use nurbs::{HPoint, NurbsCurve};
pub(crate) use nurbs::{de_boor, find_span};
pub use surface::{
    Direction, NurbsSurface, PlaneSurface, RevSurface, SumSurface, Surface, Surface3,
};
pub use trim::{
    CurveOrientation, RegionContainment, TrimCurve, TrimError, TrimLoop, UvDomain,
    closed_curve_orientation, planar_closed_curve_relationship,
};

#[cfg(test)]
mod tests;
