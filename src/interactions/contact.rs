use crate::models::{Material, RigidBody, Vector3};

/// A single point of contact between two bodies.
///
/// `normal` is a unit vector pointing from body A towards body B and
/// `penetration` is never negative for a reported contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub point: Vector3,
    pub normal: Vector3,
    pub penetration: f64,
    pub restitution: f64,
    pub friction: f64,
}

impl Contact {
    /// Builds a contact with coefficients combined from both materials.
    pub fn new(point: Vector3, normal: Vector3, penetration: f64, a: &Material, b: &Material) -> Self {
        let combined = a.combine(b);
        Contact {
            point,
            normal,
            penetration: penetration.max(0.0),
            restitution: combined.restitution,
            friction: combined.friction,
        }
    }

    /// The same contact seen from the other body.
    pub fn flipped(&self) -> Contact {
        Contact { normal: -self.normal, ..*self }
    }
}

/// Every contact point of one colliding pair.
///
/// `normal` and `penetration` come from the deepest contact.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionManifold {
    pub contacts: Vec<Contact>,
    pub normal: Vector3,
    pub penetration: f64,
}

impl CollisionManifold {
    /// Collects contacts into a manifold; `None` when `contacts` is empty.
    pub fn from_contacts(contacts: Vec<Contact>) -> Option<Self> {
        let deepest = contacts
            .iter()
            .copied()
            .max_by(|a, b| a.penetration.total_cmp(&b.penetration))?;
        Some(CollisionManifold {
            normal: deepest.normal,
            penetration: deepest.penetration,
            contacts,
        })
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// The contact with the largest penetration.
    pub fn deepest(&self) -> Option<&Contact> {
        self.contacts
            .iter()
            .max_by(|a, b| a.penetration.total_cmp(&b.penetration))
    }

    pub fn flipped(&self) -> CollisionManifold {
        CollisionManifold {
            contacts: self.contacts.iter().map(Contact::flipped).collect(),
            normal: -self.normal,
            penetration: self.penetration,
        }
    }
}

/// Applies one normal impulse plus a Coulomb-capped friction impulse for `contact`.
///
/// This is a single-shot response helper, not a solver: it does not iterate, does
/// not push bodies apart, and leaves separating contacts alone. Returns the
/// magnitude of the normal impulse (zero when nothing was applied).
///
/// # Example
/// ```
/// use rs_rigid_body::interactions::{apply_contact_impulse, Contact};
/// use rs_rigid_body::models::{Material, RigidBody, Vector3};
///
/// let mut a = RigidBody::new(1.0, Vector3::ZERO).unwrap();
/// let mut b = RigidBody::new(1.0, Vector3::new(1.5, 0.0, 0.0)).unwrap();
/// a.set_velocity(Vector3::new(1.0, 0.0, 0.0));
/// let elastic = Material::new(1.0, 0.0).unwrap();
/// let contact = Contact::new(Vector3::new(0.75, 0.0, 0.0), Vector3::UNIT_X, 0.5, &elastic, &elastic);
/// apply_contact_impulse(&mut a, &mut b, &contact);
/// assert!(a.velocity().x.abs() < 1e-12);
/// assert!((b.velocity().x - 1.0).abs() < 1e-12);
/// ```
pub fn apply_contact_impulse(a: &mut RigidBody, b: &mut RigidBody, contact: &Contact) -> f64 {
    let n = contact.normal;
    let ra = contact.point - a.position();
    let rb = contact.point - b.position();

    let relative_velocity = b.point_velocity(&contact.point) - a.point_velocity(&contact.point);
    let normal_speed = relative_velocity.dot(&n);
    if normal_speed >= 0.0 {
        return 0.0;
    }

    let (inv_mass_a, inv_mass_b) = (a.inverse_mass(), b.inverse_mass());
    let inv_inertia_a = a.world_inverse_inertia_tensor();
    let inv_inertia_b = b.world_inverse_inertia_tensor();
    let effective_mass = |dir: &Vector3| {
        let angular_a = (inv_inertia_a * ra.cross(dir)).cross(&ra);
        let angular_b = (inv_inertia_b * rb.cross(dir)).cross(&rb);
        inv_mass_a + inv_mass_b + dir.dot(&(angular_a + angular_b))
    };

    let k_normal = effective_mass(&n);
    if k_normal <= 0.0 {
        return 0.0;
    }
    let j = -(1.0 + contact.restitution) * normal_speed / k_normal;
    let impulse = n * j;
    a.apply_impulse(-impulse, contact.point);
    b.apply_impulse(impulse, contact.point);

    // Friction acts against the tangential slip that remains after the normal impulse.
    let relative_velocity = b.point_velocity(&contact.point) - a.point_velocity(&contact.point);
    let tangential = relative_velocity - n * relative_velocity.dot(&n);
    if tangential.is_near_zero() || contact.friction <= 0.0 {
        return j;
    }
    let t = tangential.normalized();
    let k_tangent = effective_mass(&t);
    if k_tangent > 0.0 {
        let jt = (-relative_velocity.dot(&t) / k_tangent).clamp(-contact.friction * j, contact.friction * j);
        let friction_impulse = t * jt;
        a.apply_impulse(-friction_impulse, contact.point);
        b.apply_impulse(friction_impulse, contact.point);
    }
    j
}
