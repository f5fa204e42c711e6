use crate::convert::{
    ConversionError, ConversionOptions, decode_bbox, decode_oriented_box, decode_plane, decode_point,
    decode_point_with_options, decode_polyline, decode_transform, decode_uv, encode_bbox, encode_oriented_box,
    encode_plane, encode_point, encode_polyline, encode_transform, encode_uv,
};
use crate::geom::{BBox, Plane, Point2, Point3, Transform, Vec3};
use crate::host::{HostBoundingBoxXyz, HostPlane, HostPolyLine, HostTransform, Uv, Xyz};

#[test]
fn points_and_uvs_map_componentwise() {
    let p = Xyz::new(1.5, -2.0, 3.25);
    assert_eq!(decode_point(p), Point3::new(1.5, -2.0, 3.25));
    assert_eq!(encode_point(decode_point(p)), p);
    assert_eq!(decode_uv(Uv::new(0.25, 0.75)), Point2::new(0.25, 0.75));
    assert_eq!(encode_uv(Point2::new(0.25, 0.75)), Uv::new(0.25, 0.75));

    let options = ConversionOptions::default().with_scale_factor(10.0);
    assert_eq!(decode_point_with_options(p, &options), Point3::new(15.0, -20.0, 32.5));
}

#[test]
fn plane_keeps_its_frame() {
    let host = HostPlane::create_by_origin_and_basis(Xyz::new(0.0, 0.0, 5.0), Xyz::BASIS_Y, -Xyz::BASIS_X).unwrap();
    let plane = decode_plane(&host);
    assert_eq!(plane.origin, Point3::new(0.0, 0.0, 5.0));
    assert_eq!(plane.z_axis, Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(encode_plane(&plane).unwrap(), host);
}

#[test]
fn transform_uses_basis_as_columns() {
    let host = HostTransform {
        origin: Xyz::new(1.0, 2.0, 3.0),
        basis_x: Xyz::BASIS_Y,
        basis_y: -Xyz::BASIS_X,
        basis_z: Xyz::BASIS_Z,
    };
    let t = decode_transform(&host);
    assert_eq!(t.apply_point(Point3::new(1.0, 0.0, 0.0)), Point3::new(1.0, 3.0, 3.0));
    assert_eq!(encode_transform(&t).unwrap(), host);
}

#[test]
fn non_rigid_transform_is_rejected() {
    let err = encode_transform(&Transform::uniform_scale(2.0)).unwrap_err();
    assert!(matches!(err, ConversionError::InvalidTransform { .. }));
}

#[test]
fn bounding_box_applies_its_transform() {
    let mut host = HostBoundingBoxXyz::new(Xyz::ZERO, Xyz::new(1.0, 2.0, 3.0));
    host.transform = HostTransform::create_translation(Xyz::new(10.0, 0.0, 0.0));
    let bbox = decode_bbox(&host);
    assert_eq!(bbox.min, Point3::new(10.0, 0.0, 0.0));
    assert_eq!(bbox.max, Point3::new(11.0, 2.0, 3.0));

    host.enabled = false;
    assert!(!decode_bbox(&host).is_valid());
}

#[test]
fn invalid_box_encodes_disabled() {
    assert!(!encode_bbox(BBox::NAN).enabled);
    let host = encode_bbox(BBox::new(Point3::ORIGIN, Point3::new(1.0, 1.0, 1.0)));
    assert!(host.enabled);
    assert_eq!(host.max, Xyz::new(1.0, 1.0, 1.0));
}

#[test]
fn oriented_box_keeps_local_extent() {
    let mut host = HostBoundingBoxXyz::new(Xyz::ZERO, Xyz::new(2.0, 1.0, 1.0));
    host.transform = HostTransform::create_translation(Xyz::new(0.0, 0.0, 4.0));
    let oriented = decode_oriented_box(&host);
    assert!(oriented.is_valid());
    assert_eq!(oriented.corners()[0], Point3::new(0.0, 0.0, 4.0));
    assert_eq!(oriented.plane, Plane::new(Point3::new(0.0, 0.0, 4.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)).unwrap());
    assert_eq!(encode_oriented_box(&oriented).unwrap(), host);
}

#[test]
fn polyline_round_trips_its_points() {
    let points = vec![Xyz::ZERO, Xyz::new(1.0, 0.0, 0.0), Xyz::new(1.0, 1.0, 0.0)];
    let host = HostPolyLine::create(points.clone()).unwrap();
    let polyline = decode_polyline(&host);
    assert_eq!(polyline.points.len(), 3);
    assert_eq!(encode_polyline(&polyline).unwrap().coordinates(), points.as_slice());
}
