//! End-to-end checks against the public API; none of these need a GPU.

use approx::assert_relative_eq;
use cgmath::{InnerSpace, Vector2, Vector3};
use stellar::{
    error::RenderError,
    gfx::{
        camera::{Camera, FirstPersonCamera, OrbitCamera},
        scene::{parse_obj, BoundingBox, Footprint},
    },
};

fn assert_orthonormal(camera: &dyn Camera) {
    assert!(camera.has_valid_basis());
    let (d, r, u) = (camera.direction(), camera.right(), camera.up());
    assert_relative_eq!(d.magnitude(), 1.0, epsilon = 1e-4);
    assert_relative_eq!(r.magnitude(), 1.0, epsilon = 1e-4);
    assert_relative_eq!(u.magnitude(), 1.0, epsilon = 1e-4);
    assert_relative_eq!(d.dot(r), 0.0, epsilon = 1e-4);
    assert_relative_eq!(d.dot(u), 0.0, epsilon = 1e-4);
    assert_relative_eq!(r.dot(u), 0.0, epsilon = 1e-4);
}

#[test]
fn single_triangle_parses_to_three_vertices() {
    let data = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
    assert_eq!(data.vertex_count(), 3);
    assert_eq!(data.bounding_box.width(), 1.0);
    assert_eq!(data.bounding_box.height(), 1.0);
    assert_eq!(data.bounding_box.length(), 0.0);
}

#[test]
fn triangle_only_mesh_has_three_vertices_per_face() {
    let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 3 4\nf 2 3 4\n";
    let data = parse_obj(text).unwrap();
    assert_eq!(data.face_count, 3);
    assert_eq!(data.vertex_count(), 9);
}

#[test]
fn pentagon_face_becomes_four_triangles() {
    let mut text = String::new();
    for i in 0..5 {
        let angle = i as f32 * std::f32::consts::TAU / 5.0;
        text.push_str(&format!("v {} {} 0\n", angle.cos(), angle.sin()));
    }
    text.push_str("f 1 2 3 4 5\n");

    let data = parse_obj(&text).unwrap();
    assert_eq!(data.triangle_count(), 4);
    assert_eq!(data.vertex_count(), 12);
}

#[test]
fn misaligned_attributes_are_rejected() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\nf 1 2 3\n";
    assert!(matches!(parse_obj(text), Err(RenderError::MalformedMesh(_))));
}

#[test]
fn single_point_has_zero_extent() {
    let bounds = BoundingBox::from_positions(&[Vector3::new(3.0, -2.0, 7.0)]);
    assert_eq!(bounds.width(), 0.0);
    assert_eq!(bounds.height(), 0.0);
    assert_eq!(bounds.length(), 0.0);
}

#[test]
fn start_camera_faces_negative_z() {
    let mut camera = FirstPersonCamera::new();
    camera.set_position(Vector3::new(0.0, 1.0, 10.0));
    camera.rotate(0.0, 180.0);

    let d = camera.direction();
    assert_relative_eq!(d.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(d.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(d.z, -1.0, epsilon = 1e-5);
    assert_orthonormal(&camera);
}

#[test]
fn first_person_rotation_accumulates() {
    let mut stepped = FirstPersonCamera::new();
    stepped.rotate(10.0, 20.0);
    stepped.rotate(5.0, -35.0);

    let mut once = FirstPersonCamera::new();
    once.rotate(15.0, -15.0);

    assert_relative_eq!(stepped.state().pitch, once.state().pitch, epsilon = 1e-6);
    assert_relative_eq!(stepped.state().yaw, once.state().yaw, epsilon = 1e-6);
    assert_orthonormal(&stepped);
}

#[test]
fn orbit_rotation_replaces() {
    let mut camera = OrbitCamera::new();
    camera.rotate(10.0, 20.0);
    camera.rotate(5.0, 5.0);

    assert_relative_eq!(camera.state().pitch, 5.0f32.to_radians(), epsilon = 1e-6);
    assert_relative_eq!(camera.state().yaw, 5.0f32.to_radians(), epsilon = 1e-6);
    assert_relative_eq!(
        (camera.position() - camera.target()).magnitude(),
        camera.radius(),
        epsilon = 1e-4
    );
    assert_orthonormal(&camera);
}

#[test]
fn footprint_center_collides_and_far_point_does_not() {
    let bounds = BoundingBox::from_positions(&[
        Vector3::new(-1.0, 0.0, -2.0),
        Vector3::new(1.0, 3.0, 2.0),
    ]);
    let footprint = Footprint::from_box(
        &bounds,
        Vector3::new(4.0, 0.0, 6.0),
        Vector3::new(0.5, 1.0, 0.5),
    );
    assert_eq!(footprint.center, Vector2::new(4.0, 6.0));
    assert!(footprint.contains(4.0, 6.0));
    assert!(!footprint.contains(10.0, -10.0));
}
