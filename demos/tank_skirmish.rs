// demos/tank_skirmish.rs
//
// Two tanks on a flat arena drive at each other and trade shells. The arena is
// seen from above (gravity off, motion in the XZ plane); every tick runs the
// broad-phase, the narrow-phase and an impulse resolver.
//
// Run with `RUST_LOG=debug cargo run --example tank_skirmish` for engine logs.

use std::collections::HashSet;
use std::rc::Rc;
use log::info;
use rs_rigid_body::apis::{resolve_with_impulses, PhysicsWorld};
use rs_rigid_body::errors::PhysicsError;
use rs_rigid_body::interactions::BodyId;
use rs_rigid_body::models::{Aabb, Material, Quaternion, RigidBody, Shape3D, Vector3};
use rs_rigid_body::utils::PhysicsConstants;

const DT: f64 = 1.0 / 60.0;
const TICKS: usize = 600;
const ARENA: f64 = 60.0;
const DRIVE_FORCE: f64 = 6000.0;
const STEER_GAIN: f64 = 4000.0;
const SHELL_SPEED: f64 = 60.0;
const FIRE_INTERVAL: usize = 45;

struct Tank {
    name: &'static str,
    id: BodyId,
    hits_taken: u32,
}

fn forward(body: &RigidBody) -> Vector3 {
    body.orientation().rotate(&Vector3::UNIT_Z)
}

/// Drives towards `target` and turns about +Y to face it.
fn drive(body: &mut RigidBody, target: Vector3) {
    let mut to_target = target - body.position();
    to_target.set_y(0.0);
    let desired = to_target.normalized();
    let heading = forward(body);
    let turn = heading.cross(&desired).y;
    body.apply_torque(Vector3::new(0.0, turn * STEER_GAIN, 0.0));
    if to_target.length() > 8.0 {
        body.apply_force(heading * DRIVE_FORCE);
    }
}

fn fire(world: &mut PhysicsWorld, shooter: BodyId, shell_shape: &Rc<Shape3D>) -> Result<Option<BodyId>, PhysicsError> {
    let Some(tank) = world.body(shooter) else {
        return Ok(None);
    };
    let heading = forward(tank);
    let muzzle = tank.position() + heading * 3.0 + Vector3::new(0.0, 0.5, 0.0);
    let tank_velocity = tank.velocity();

    let mut shell = RigidBody::with_shape(5.0, muzzle, Rc::clone(shell_shape))?;
    shell.set_material(Material::steel());
    shell.set_damping(1.0, 1.0)?;
    shell.set_velocity(tank_velocity + heading * SHELL_SPEED);
    Ok(Some(world.add_body(shell)))
}

fn main() -> Result<(), PhysicsError> {
    env_logger::init();

    let constants = PhysicsConstants::new(Some(0.0), Some(0.6), Some(0.2), None, None, Some(4), Some(6));
    let bounds = Aabb::new(Vector3::new(-ARENA, -10.0, -ARENA), Vector3::new(ARENA, 10.0, ARENA))?;
    let mut world = PhysicsWorld::with_constants(bounds, constants)?;

    let hull = Rc::new(Shape3D::new_cuboid(3.0, 1.5, 4.0)?);
    let shell_shape = Rc::new(Shape3D::new_sphere(0.2)?);
    let pillar = Rc::new(Shape3D::new_cylinder(1.5, 4.0)?);
    let bunker = Rc::new(Shape3D::new_pyramid(5.0, 3.0)?);

    let mut tanks = Vec::new();
    for (name, x, yaw) in [("Red", -25.0, std::f64::consts::FRAC_PI_2), ("Blue", 25.0, -std::f64::consts::FRAC_PI_2)] {
        let mut body = RigidBody::with_shape(1000.0, Vector3::new(x, 0.0, 3.0), Rc::clone(&hull))?;
        body.set_orientation(Quaternion::from_axis_angle(&Vector3::UNIT_Y, yaw));
        body.set_material(Material::steel());
        tanks.push(Tank { name, id: world.add_body(body), hits_taken: 0 });
    }

    // Pillars stand upright (local Z rotated onto world Y); the bunker's apex points up.
    let upright = Quaternion::from_axis_angle(&Vector3::UNIT_X, -std::f64::consts::FRAC_PI_2);
    let mut scenery = Vec::new();
    for (shape, position) in [
        (&pillar, Vector3::new(0.0, 0.0, 9.0)),
        (&pillar, Vector3::new(0.0, 0.0, -9.0)),
        (&bunker, Vector3::new(0.0, 0.0, 0.0)),
    ] {
        let mut body = RigidBody::with_shape(50_000.0, position, Rc::clone(shape))?;
        body.set_orientation(upright);
        body.set_material(Material::wood());
        scenery.push(world.add_body(body));
    }

    println!("Arena {}x{} with {} bodies", 2.0 * ARENA, 2.0 * ARENA, world.len());

    let mut shells: HashSet<BodyId> = HashSet::new();
    let mut scenery_hits = 0;

    for tick in 0..TICKS {
        let positions: Vec<Vector3> = tanks
            .iter()
            .filter_map(|t| world.body(t.id).map(RigidBody::position))
            .collect();
        if positions.len() == tanks.len() {
            for (i, tank) in tanks.iter().enumerate() {
                let enemy = positions[(i + 1) % positions.len()];
                if let Some(body) = world.body_mut(tank.id) {
                    drive(body, enemy);
                }
            }
        }

        if tick % FIRE_INTERVAL == 0 {
            for tank in &tanks {
                if let Some(shell) = fire(&mut world, tank.id, &shell_shape)? {
                    shells.insert(shell);
                }
            }
        }

        let events = world.step(DT, resolve_with_impulses)?;

        let mut spent = HashSet::new();
        for event in &events {
            for (shell, target) in [(event.pair.first, event.pair.second), (event.pair.second, event.pair.first)] {
                if !shells.contains(&shell) || shells.contains(&target) {
                    continue;
                }
                spent.insert(shell);
                if let Some(tank) = tanks.iter_mut().find(|t| t.id == target) {
                    tank.hits_taken += 1;
                    info!("tick {}: shell {} hit {} (depth {:.3})", tick, shell, tank.name, event.manifold.penetration);
                } else if scenery.contains(&target) {
                    scenery_hits += 1;
                }
            }
        }

        // shells that hit something or left the arena are gone
        for (id, body) in world.bodies() {
            let p = body.position();
            if shells.contains(&id) && (p.x.abs() > ARENA || p.z.abs() > ARENA) {
                spent.insert(id);
            }
        }
        for id in spent {
            shells.remove(&id);
            world.remove_body(id)?;
        }

        if tick % 60 == 0 {
            println!("\nt = {:.2}s, {} shells in flight", tick as f64 * DT, shells.len());
            for tank in &tanks {
                if let Some(body) = world.body(tank.id) {
                    let p = body.position();
                    let (_, yaw, _) = body.orientation().to_euler();
                    let nearest = world.octree().query_k_nearest(&p, 3);
                    println!(
                        "  {:<4} at ({:>6.2}, {:>6.2}) heading {:>7.2}°  KE {:>9.1} J  radar {:?}",
                        tank.name,
                        p.x,
                        p.z,
                        yaw.to_degrees(),
                        body.kinetic_energy(),
                        nearest.iter().filter(|(id, _)| *id != tank.id).map(|(id, d)| format!("{}@{:.1}", id, d)).collect::<Vec<_>>()
                    );
                }
            }
        }
    }

    println!("\nFinal tally:");
    for tank in &tanks {
        println!("  {} took {} hits", tank.name, tank.hits_taken);
    }
    println!("  scenery absorbed {} shells", scenery_hits);
    Ok(())
}
