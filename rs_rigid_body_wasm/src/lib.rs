// rs_rigid_body_wasm/src/lib.rs
// This is the public API for the wasm wrapper of the rigid-body library.

use std::rc::Rc;
use wasm_bindgen::prelude::*;
use js_sys::Float64Array;
use web_sys::console;
use rs_rigid_body::apis::{resolve_with_impulses, PhysicsWorld};
use rs_rigid_body::errors::PhysicsError;
use rs_rigid_body::interactions::BodyId;
use rs_rigid_body::models::{Aabb, RigidBody, Shape3D, Vector3};

fn to_js(error: PhysicsError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen]
pub struct WasmWorld {
    world: PhysicsWorld,
}

#[wasm_bindgen]
impl WasmWorld {
    /// A world spanning `[-half_size, half_size]` on every axis.
    #[wasm_bindgen(constructor)]
    pub fn new(half_size: f64) -> Result<WasmWorld, JsValue> {
        let h = Vector3::new(half_size, half_size, half_size);
        let bounds = Aabb::new(-h, h).map_err(to_js)?;
        let world = PhysicsWorld::new(bounds).map_err(to_js)?;
        Ok(Self { world })
    }

    #[wasm_bindgen]
    pub fn add_sphere(&mut self, mass: f64, x: f64, y: f64, z: f64, radius: f64) -> Result<usize, JsValue> {
        self.add(mass, Vector3::new(x, y, z), Shape3D::new_sphere(radius))
    }

    #[wasm_bindgen]
    pub fn add_box(&mut self, mass: f64, x: f64, y: f64, z: f64, width: f64, height: f64, depth: f64) -> Result<usize, JsValue> {
        self.add(mass, Vector3::new(x, y, z), Shape3D::new_cuboid(width, height, depth))
    }

    #[wasm_bindgen]
    pub fn add_cylinder(&mut self, mass: f64, x: f64, y: f64, z: f64, radius: f64, height: f64) -> Result<usize, JsValue> {
        self.add(mass, Vector3::new(x, y, z), Shape3D::new_cylinder(radius, height))
    }

    #[wasm_bindgen]
    pub fn add_pyramid(&mut self, mass: f64, x: f64, y: f64, z: f64, base_width: f64, height: f64) -> Result<usize, JsValue> {
        self.add(mass, Vector3::new(x, y, z), Shape3D::new_pyramid(base_width, height))
    }

    #[wasm_bindgen]
    pub fn remove_body(&mut self, id: usize) -> Result<(), JsValue> {
        self.world.remove_body(BodyId(id)).map(|_| ()).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn apply_force(&mut self, id: usize, fx: f64, fy: f64, fz: f64) -> Result<(), JsValue> {
        self.body_mut(id)?.apply_force(Vector3::new(fx, fy, fz));
        Ok(())
    }

    #[wasm_bindgen]
    pub fn apply_torque(&mut self, id: usize, tx: f64, ty: f64, tz: f64) -> Result<(), JsValue> {
        self.body_mut(id)?.apply_torque(Vector3::new(tx, ty, tz));
        Ok(())
    }

    /// Impulse applied at the body's centre of mass.
    #[wasm_bindgen]
    pub fn apply_impulse(&mut self, id: usize, jx: f64, jy: f64, jz: f64) -> Result<(), JsValue> {
        let body = self.body_mut(id)?;
        let centre = body.position();
        body.apply_impulse(Vector3::new(jx, jy, jz), centre);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_velocity(&mut self, id: usize, vx: f64, vy: f64, vz: f64) -> Result<(), JsValue> {
        self.body_mut(id)?.set_velocity(Vector3::new(vx, vy, vz));
        Ok(())
    }

    /// Advances the world and returns how many pairs collided during the tick.
    #[wasm_bindgen]
    pub fn step(&mut self, dt: f64) -> Result<usize, JsValue> {
        self.world
            .step(dt, resolve_with_impulses)
            .map(|events| events.len())
            .map_err(to_js)
    }

    /// `[x, y, z]`
    #[wasm_bindgen]
    pub fn position(&self, id: usize) -> Result<Float64Array, JsValue> {
        let p = self.body(id)?.position();
        Ok(Float64Array::from(&[p.x, p.y, p.z][..]))
    }

    /// `[w, x, y, z]`
    #[wasm_bindgen]
    pub fn orientation(&self, id: usize) -> Result<Float64Array, JsValue> {
        let q = self.body(id)?.orientation();
        Ok(Float64Array::from(&[q.w, q.x, q.y, q.z][..]))
    }

    #[wasm_bindgen(getter)]
    pub fn body_count(&self) -> usize {
        self.world.len()
    }
}

impl WasmWorld {
    fn add(&mut self, mass: f64, position: Vector3, shape: Result<Shape3D, PhysicsError>) -> Result<usize, JsValue> {
        let body = RigidBody::with_shape(mass, position, Rc::new(shape.map_err(to_js)?)).map_err(to_js)?;
        Ok(self.world.add_body(body).0)
    }

    fn body(&self, id: usize) -> Result<&RigidBody, JsValue> {
        self.world.body(BodyId(id)).ok_or_else(|| missing(id))
    }

    fn body_mut(&mut self, id: usize) -> Result<&mut RigidBody, JsValue> {
        self.world.body_mut(BodyId(id)).ok_or_else(|| missing(id))
    }
}

fn missing(id: usize) -> JsValue {
    let error = PhysicsError::BodyNotFound(id).to_string();
    console::warn_1(&JsValue::from_str(&error));
    JsValue::from_str(&error)
}
