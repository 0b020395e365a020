use std::rc::Rc;
use log::trace;
use crate::errors::PhysicsError;
use crate::models::{Aabb, Material, Matrix3x3, Quaternion, Shape3D, Vector3};
use crate::utils::{is_positive_finite, PhysicsConstants, DEFAULT_PHYSICS_CONSTANTS};

/// A rigid body: mass, pose, linear and angular state, and force/torque accumulators.
///
/// The shape is shared (`Rc`), never owned by a single body, so many bodies of the
/// same kind can alias one descriptor. Without a shape the body uses the inertia
/// of a unit-radius solid sphere and its bounding box collapses to its position.
#[derive(Debug, Clone)]
pub struct RigidBody {
    mass: f64,
    inverse_mass: f64,
    position: Vector3,
    velocity: Vector3,
    orientation: Quaternion,
    angular_velocity: Vector3,
    angular_momentum: Vector3,
    /// Body-space inertia tensor and its inverse.
    inertia_tensor: Matrix3x3,
    inverse_inertia_tensor: Matrix3x3,
    force_accumulator: Vector3,
    torque_accumulator: Vector3,
    linear_damping: f64,
    angular_damping: f64,
    shape: Option<Rc<Shape3D>>,
    material: Material,
    singular_epsilon: f64,
}

impl RigidBody {
    /// Creates a body at rest at `position`, using the default damping and material.
    ///
    /// # Errors
    /// `PhysicsError::InvalidMass` if `mass` is not strictly positive and finite.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::{RigidBody, Vector3};
    ///
    /// let body = RigidBody::new(2.0, Vector3::new(0.0, 1.0, 0.0)).unwrap();
    /// assert_eq!(body.mass(), 2.0);
    /// assert!(RigidBody::new(0.0, Vector3::ZERO).is_err());
    /// ```
    pub fn new(mass: f64, position: Vector3) -> Result<Self, PhysicsError> {
        Self::with_constants(mass, position, &DEFAULT_PHYSICS_CONSTANTS)
    }

    pub fn with_constants(mass: f64, position: Vector3, constants: &PhysicsConstants) -> Result<Self, PhysicsError> {
        if !is_positive_finite(mass) {
            return Err(PhysicsError::InvalidMass);
        }
        let (inertia_tensor, inverse_inertia_tensor) = unit_sphere_inertia(mass);
        Ok(RigidBody {
            mass,
            inverse_mass: 1.0 / mass,
            position,
            velocity: Vector3::ZERO,
            orientation: Quaternion::identity(),
            angular_velocity: Vector3::ZERO,
            angular_momentum: Vector3::ZERO,
            inertia_tensor,
            inverse_inertia_tensor,
            force_accumulator: Vector3::ZERO,
            torque_accumulator: Vector3::ZERO,
            linear_damping: constants.linear_damping,
            angular_damping: constants.angular_damping,
            shape: None,
            material: Material::from_constants(constants),
            singular_epsilon: constants.singular_epsilon,
        })
    }

    /// Creates a body and attaches `shape` in one step.
    pub fn with_shape(mass: f64, position: Vector3, shape: Rc<Shape3D>) -> Result<Self, PhysicsError> {
        let mut body = Self::new(mass, position)?;
        body.set_shape(shape)?;
        Ok(body)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn angular_velocity(&self) -> Vector3 {
        self.angular_velocity
    }

    pub fn angular_momentum(&self) -> Vector3 {
        self.angular_momentum
    }

    pub fn inertia_tensor(&self) -> Matrix3x3 {
        self.inertia_tensor
    }

    pub fn inverse_inertia_tensor(&self) -> Matrix3x3 {
        self.inverse_inertia_tensor
    }

    pub fn accumulated_force(&self) -> Vector3 {
        self.force_accumulator
    }

    pub fn accumulated_torque(&self) -> Vector3 {
        self.torque_accumulator
    }

    pub fn linear_damping(&self) -> f64 {
        self.linear_damping
    }

    pub fn angular_damping(&self) -> f64 {
        self.angular_damping
    }

    pub fn shape(&self) -> Option<&Rc<Shape3D>> {
        self.shape.as_ref()
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    /// Changes the mass and rescales the inertia tensor to match.
    ///
    /// # Errors
    /// `PhysicsError::InvalidMass` for a non-positive mass, `PhysicsError::SingularMatrix`
    /// if the rescaled tensor cannot be inverted. The body is unchanged on error.
    pub fn set_mass(&mut self, mass: f64) -> Result<(), PhysicsError> {
        if !is_positive_finite(mass) {
            return Err(PhysicsError::InvalidMass);
        }
        let (tensor, inverse) = match &self.shape {
            Some(shape) => {
                let tensor = shape.calculate_inertia_tensor(mass);
                (tensor, tensor.inverse_with_epsilon(self.singular_epsilon)?)
            },
            None => unit_sphere_inertia(mass),
        };
        self.mass = mass;
        self.inverse_mass = 1.0 / mass;
        self.inertia_tensor = tensor;
        self.inverse_inertia_tensor = inverse;
        self.sync_angular_momentum();
        Ok(())
    }

    /// Attaches a shared shape and recomputes the inertia tensor from it.
    ///
    /// # Errors
    /// `PhysicsError::SingularMatrix` if the resulting tensor cannot be inverted
    /// under the body's `singular_epsilon`; the body is left unchanged in that case.
    pub fn set_shape(&mut self, shape: Rc<Shape3D>) -> Result<(), PhysicsError> {
        let tensor = shape.calculate_inertia_tensor(self.mass);
        let inverse = tensor.inverse_with_epsilon(self.singular_epsilon)?;
        self.inertia_tensor = tensor;
        self.inverse_inertia_tensor = inverse;
        self.shape = Some(shape);
        self.sync_angular_momentum();
        Ok(())
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: Vector3) {
        self.velocity = velocity;
    }

    /// Sets the orientation (normalized on the way in); angular velocity is kept.
    pub fn set_orientation(&mut self, orientation: Quaternion) {
        self.orientation = orientation.normalized();
        self.sync_angular_momentum();
    }

    /// Sets angular velocity and the matching angular momentum `L = I_world ω`.
    pub fn set_angular_velocity(&mut self, angular_velocity: Vector3) {
        self.angular_velocity = angular_velocity;
        self.sync_angular_momentum();
    }

    /// Sets per-second retention factors; both must lie in `(0, 1]`.
    pub fn set_damping(&mut self, linear: f64, angular: f64) -> Result<(), PhysicsError> {
        let valid = |d: f64| d > 0.0 && d <= 1.0;
        if !valid(linear) || !valid(angular) {
            return Err(PhysicsError::InvalidConfiguration("damping must be in (0, 1]".to_string()));
        }
        self.linear_damping = linear;
        self.angular_damping = angular;
        Ok(())
    }

    /// Inertia tensor rotated into world space: `R I Rᵀ`.
    pub fn world_inertia_tensor(&self) -> Matrix3x3 {
        self.orientation.to_rotation_matrix().rotate_tensor(&self.inertia_tensor)
    }

    /// Inverse inertia tensor in world space: `R I⁻¹ Rᵀ`.
    pub fn world_inverse_inertia_tensor(&self) -> Matrix3x3 {
        self.orientation.to_rotation_matrix().rotate_tensor(&self.inverse_inertia_tensor)
    }

    /// Adds a force through the centre of mass for the next integration step.
    pub fn apply_force(&mut self, force: Vector3) {
        self.force_accumulator += force;
    }

    pub fn apply_torque(&mut self, torque: Vector3) {
        self.torque_accumulator += torque;
    }

    /// Adds a force at a world-space point, along with its torque `r × f`.
    pub fn apply_force_at_point(&mut self, force: Vector3, point: Vector3) {
        let r = point - self.position;
        self.force_accumulator += force;
        self.torque_accumulator += r.cross(&force);
    }

    /// Applies an instantaneous impulse at a world-space point.
    ///
    /// Velocity changes by `impulse / m` and angular velocity by
    /// `I⁻¹_world (r × impulse)` immediately; the accumulators are not involved.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::{RigidBody, Vector3};
    ///
    /// let mut body = RigidBody::new(2.0, Vector3::ZERO).unwrap();
    /// body.apply_impulse(Vector3::new(4.0, 0.0, 0.0), Vector3::ZERO);
    /// assert_eq!(body.velocity(), Vector3::new(2.0, 0.0, 0.0));
    /// assert_eq!(body.angular_velocity(), Vector3::ZERO);
    /// ```
    pub fn apply_impulse(&mut self, impulse: Vector3, point: Vector3) {
        self.velocity += impulse * self.inverse_mass;
        let angular_impulse = (point - self.position).cross(&impulse);
        self.angular_momentum += angular_impulse;
        self.angular_velocity += self.world_inverse_inertia_tensor().mul_vector(&angular_impulse);
    }

    pub fn clear_accumulators(&mut self) {
        self.force_accumulator = Vector3::ZERO;
        self.torque_accumulator = Vector3::ZERO;
    }

    /// Advances the body by `dt` seconds with semi-implicit Euler.
    ///
    /// Linear: `v += F/m·dt; v *= damping^dt; x += v·dt`.
    /// Angular: `L += τ·dt; L *= angular_damping^dt; ω = I⁻¹_world L`, then the
    /// orientation integrates `ω` and is renormalized. Accumulators are cleared, so
    /// continuous forces such as gravity must be re-applied every step.
    ///
    /// # Errors
    /// `PhysicsError::InvalidTime` for a negative or non-finite `dt`.
    pub fn integrate(&mut self, dt: f64) -> Result<(), PhysicsError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidTime);
        }

        let acceleration = self.force_accumulator * self.inverse_mass;
        self.velocity += acceleration * dt;
        self.velocity *= self.linear_damping.powf(dt);
        self.position += self.velocity * dt;

        self.angular_momentum += self.torque_accumulator * dt;
        // L is damped, not only ω, so ω = I⁻¹_world L still holds after the step.
        self.angular_momentum *= self.angular_damping.powf(dt);
        self.angular_velocity = self.world_inverse_inertia_tensor().mul_vector(&self.angular_momentum);
        self.orientation = self.orientation.integrate(&self.angular_velocity, dt);

        self.clear_accumulators();
        trace!("integrated body to {:?} (dt = {})", self.position, dt);
        Ok(())
    }

    /// World-space bounding box; a point box at the position when no shape is set.
    pub fn get_aabb(&self) -> Aabb {
        match &self.shape {
            Some(shape) => shape.get_aabb(&self.position, &self.orientation),
            None => Aabb { min: self.position, max: self.position },
        }
    }

    /// Velocity of the material point currently at world position `point`.
    pub fn point_velocity(&self, point: &Vector3) -> Vector3 {
        self.velocity + self.angular_velocity.cross(&(*point - self.position))
    }

    pub fn local_to_world(&self, local: &Vector3) -> Vector3 {
        self.position + self.orientation.rotate(local)
    }

    pub fn world_to_local(&self, world: &Vector3) -> Vector3 {
        self.orientation.inverse_rotate(&(*world - self.position))
    }

    pub fn linear_momentum(&self) -> Vector3 {
        self.velocity * self.mass
    }

    /// Translational plus rotational kinetic energy.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared() + 0.5 * self.angular_velocity.dot(&self.angular_momentum)
    }

    /// Render mesh vertices transformed into world space; empty without a shape.
    pub fn world_vertices(&self) -> Vec<Vector3> {
        match &self.shape {
            Some(shape) => shape
                .render()
                .vertices
                .iter()
                .map(|v| self.local_to_world(v))
                .collect(),
            None => Vec::new(),
        }
    }

    fn sync_angular_momentum(&mut self) {
        self.angular_momentum = self.world_inertia_tensor().mul_vector(&self.angular_velocity);
    }
}

fn unit_sphere_inertia(mass: f64) -> (Matrix3x3, Matrix3x3) {
    let i = (2.0 / 5.0) * mass;
    (Matrix3x3::from_diagonal(i, i, i), Matrix3x3::from_diagonal(1.0 / i, 1.0 / i, 1.0 / i))
}
