#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;
use rs_rigid_body_wasm::WasmWorld;

#[wasm_bindgen_test]
fn falling_sphere_moves_down() {
    let mut world = WasmWorld::new(100.0).unwrap();
    let id = world.add_sphere(1.0, 0.0, 10.0, 0.0, 0.5).unwrap();
    for _ in 0..10 {
        world.step(0.01).unwrap();
    }
    let position = world.position(id).unwrap().to_vec();
    assert!(position[1] < 10.0);
    assert_eq!(world.orientation(id).unwrap().length(), 4);
}

#[wasm_bindgen_test]
fn overlapping_boxes_report_a_collision() {
    let mut world = WasmWorld::new(100.0).unwrap();
    world.add_box(1.0, 0.0, 0.0, 0.0, 2.0, 2.0, 2.0).unwrap();
    world.add_box(1.0, 1.5, 0.0, 0.0, 2.0, 2.0, 2.0).unwrap();
    assert_eq!(world.body_count(), 2);
    assert_eq!(world.step(0.01).unwrap(), 1);
}

#[wasm_bindgen_test]
fn invalid_input_is_rejected() {
    let mut world = WasmWorld::new(100.0).unwrap();
    assert!(world.add_sphere(1.0, 0.0, 0.0, 0.0, -1.0).is_err());
    assert!(world.add_cylinder(0.0, 0.0, 0.0, 0.0, 1.0, 1.0).is_err());
    assert!(world.apply_force(42, 1.0, 0.0, 0.0).is_err());
    assert!(world.step(-1.0).is_err());
}
