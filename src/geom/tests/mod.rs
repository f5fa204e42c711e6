mod test_brep_basic;
mod test_curve_basic;
mod test_mesh_basic;
mod test_nurbs_basic;
mod test_trim_basic;
