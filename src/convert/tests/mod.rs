mod fixtures;
mod test_curve_basic;
mod test_mesh_basic;
mod test_surface_basic;
mod test_values_basic;
