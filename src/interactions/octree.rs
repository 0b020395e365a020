use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::fmt;
use log::{debug, warn};
use crate::errors::PhysicsError;
use crate::models::{Aabb, RigidBody, Vector3};
use crate::utils::PhysicsConstants;

/// Stable handle for a body tracked by the broad-phase and the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unordered pair of bodies; `CollisionPair::new(a, b) == CollisionPair::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    pub first: BodyId,
    pub second: BodyId,
}

impl CollisionPair {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            CollisionPair { first: a, second: b }
        } else {
            CollisionPair { first: b, second: a }
        }
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.first == id || self.second == id
    }
}

/// One cell of the octree. Children live in the owning tree's node arena.
#[derive(Debug, Clone)]
pub struct OctreeNode {
    pub bounds: Aabb,
    pub depth: usize,
    objects: Vec<(BodyId, Aabb)>,
    children: Option<[usize; 8]>,
}

impl OctreeNode {
    fn new(bounds: Aabb, depth: usize) -> Self {
        OctreeNode { bounds, depth, objects: Vec::new(), children: None }
    }

    pub fn objects(&self) -> &[(BodyId, Aabb)] {
        &self.objects
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Loose-placement octree over body bounding boxes.
///
/// Each object lives in exactly one node: the deepest one whose bounds fully
/// contain its box. A leaf splits into eight octants once it holds more than
/// `max_objects`, unless it is already at `max_depth`. Objects straddling or
/// touching an octant boundary stay in the parent, and objects outside the world bounds stay
/// at the root, so nothing is ever dropped.
///
/// # Example
/// ```
/// use rs_rigid_body::interactions::{BodyId, CollisionPair, Octree};
/// use rs_rigid_body::models::{Aabb, Vector3};
///
/// let world = Aabb::new(Vector3::new(-50.0, -50.0, -50.0), Vector3::new(50.0, 50.0, 50.0)).unwrap();
/// let mut tree = Octree::new(world, 4, 6).unwrap();
/// let unit = Vector3::new(1.0, 1.0, 1.0);
/// tree.insert(BodyId(0), Aabb::from_center_half_extents(Vector3::ZERO, unit));
/// tree.insert(BodyId(1), Aabb::from_center_half_extents(Vector3::new(1.5, 0.0, 0.0), unit));
/// tree.insert(BodyId(2), Aabb::from_center_half_extents(Vector3::new(20.0, 0.0, 0.0), unit));
///
/// assert_eq!(tree.get_potential_collisions(), vec![CollisionPair::new(BodyId(1), BodyId(0))]);
/// ```
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    locator: HashMap<BodyId, usize>,
    max_objects: usize,
    max_depth: usize,
}

const ROOT: usize = 0;

impl Octree {
    /// Creates an empty tree over `bounds`.
    ///
    /// # Errors
    /// `PhysicsError::InvalidBounds` if the bounds are not finite or have no volume,
    /// `PhysicsError::InvalidConfiguration` if `max_objects` is zero.
    pub fn new(bounds: Aabb, max_objects: usize, max_depth: usize) -> Result<Self, PhysicsError> {
        let size = bounds.size();
        if !bounds.min.is_finite() || !bounds.max.is_finite() || size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
            return Err(PhysicsError::InvalidBounds);
        }
        if max_objects == 0 {
            return Err(PhysicsError::InvalidConfiguration("octree max_objects must be at least 1".to_string()));
        }
        Ok(Octree {
            nodes: vec![OctreeNode::new(bounds, 0)],
            locator: HashMap::new(),
            max_objects,
            max_depth,
        })
    }

    pub fn with_constants(bounds: Aabb, constants: &PhysicsConstants) -> Result<Self, PhysicsError> {
        Self::new(bounds, constants.octree_max_objects, constants.octree_max_depth)
    }

    pub fn bounds(&self) -> Aabb {
        self.nodes[ROOT].bounds
    }

    pub fn max_objects(&self) -> usize {
        self.max_objects
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.locator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locator.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest node (the root alone is depth 0).
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.locator.contains_key(&id)
    }

    /// The node currently holding `id`.
    pub fn node_of(&self, id: BodyId) -> Option<&OctreeNode> {
        self.locator.get(&id).map(|&index| &self.nodes[index])
    }

    /// Inserts `id` with bounding box `aabb`; an id already present is moved.
    pub fn insert(&mut self, id: BodyId, aabb: Aabb) {
        if self.contains(id) {
            self.remove(id);
        }
        if !self.bounds().contains_aabb(&aabb) {
            warn!("body {} at {:?} lies outside the octree bounds; keeping it at the root", id, aabb.center());
        }
        self.insert_at(ROOT, id, aabb);
    }

    /// Inserts a body by its current world-space bounding box.
    pub fn insert_body(&mut self, id: BodyId, body: &RigidBody) {
        self.insert(id, body.get_aabb());
    }

    /// Removes `id`; returns false if it was not in the tree.
    pub fn remove(&mut self, id: BodyId) -> bool {
        match self.locator.remove(&id) {
            Some(index) => {
                self.nodes[index].objects.retain(|(other, _)| *other != id);
                true
            },
            None => false,
        }
    }

    /// Re-places `id` after its bounding box changed (remove then insert).
    pub fn update(&mut self, id: BodyId, aabb: Aabb) {
        self.remove(id);
        self.insert(id, aabb);
    }

    /// Drops every object and every node below the root.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[ROOT].objects.clear();
        self.nodes[ROOT].children = None;
        self.locator.clear();
    }

    /// Clears the tree and inserts every `(id, aabb)` afresh.
    pub fn rebuild<I: IntoIterator<Item = (BodyId, Aabb)>>(&mut self, objects: I) {
        self.clear();
        for (id, aabb) in objects {
            self.insert(id, aabb);
        }
        debug!("octree rebuilt: {} objects in {} nodes, depth {}", self.len(), self.node_count(), self.depth());
    }

    fn insert_at(&mut self, start: usize, id: BodyId, aabb: Aabb) {
        let mut index = start;
        while let Some(children) = self.nodes[index].children {
            if touches_split_planes(&self.nodes[index].bounds, &aabb) {
                break;
            }
            match children.iter().find(|&&child| self.nodes[child].bounds.contains_aabb(&aabb)) {
                Some(&child) => index = child,
                None => break,
            }
        }

        self.nodes[index].objects.push((id, aabb));
        self.locator.insert(id, index);

        let node = &self.nodes[index];
        if node.is_leaf() && node.objects.len() > self.max_objects && node.depth < self.max_depth {
            self.subdivide(index);
        }
    }

    fn subdivide(&mut self, index: usize) {
        let bounds = self.nodes[index].bounds;
        let depth = self.nodes[index].depth + 1;
        let first = self.nodes.len();
        let mut children = [0; 8];
        for (octant, child) in children.iter_mut().enumerate() {
            self.nodes.push(OctreeNode::new(bounds.octant(octant), depth));
            *child = first + octant;
        }
        self.nodes[index].children = Some(children);

        let objects = std::mem::take(&mut self.nodes[index].objects);
        for (id, aabb) in objects {
            self.insert_at(index, id, aabb);
        }
    }

    /// Every unordered pair whose boxes overlap or touch, sorted and without
    /// duplicates.
    ///
    /// Boxes touching a split plane stay in the parent, so two sibling octants
    /// never hold boxes that meet. An object can therefore only overlap objects in
    /// its own node, its ancestors, or its descendants, and each node is paired
    /// against itself and the chain of ancestors above it.
    pub fn get_potential_collisions(&self) -> Vec<CollisionPair> {
        let mut pairs = BTreeSet::new();
        let mut ancestors: Vec<(BodyId, Aabb)> = Vec::new();
        self.collect_pairs(ROOT, &mut ancestors, &mut pairs);
        pairs.into_iter().collect()
    }

    fn collect_pairs(&self, index: usize, ancestors: &mut Vec<(BodyId, Aabb)>, pairs: &mut BTreeSet<CollisionPair>) {
        let node = &self.nodes[index];
        for (i, (id, aabb)) in node.objects.iter().enumerate() {
            for (other, other_aabb) in node.objects.iter().skip(i + 1).chain(ancestors.iter()) {
                if aabb.intersects(other_aabb) {
                    pairs.insert(CollisionPair::new(*id, *other));
                }
            }
        }

        if let Some(children) = node.children {
            let mark = ancestors.len();
            ancestors.extend_from_slice(&node.objects);
            for child in children {
                self.collect_pairs(child, ancestors, pairs);
            }
            ancestors.truncate(mark);
        }
    }

    /// Ids whose boxes intersect `region`, sorted.
    pub fn query_aabb(&self, region: &Aabb) -> Vec<BodyId> {
        self.query(|bounds| bounds.intersects(region))
    }

    /// Ids whose boxes come within `radius` of `center`, sorted.
    pub fn query_radius(&self, center: &Vector3, radius: f64) -> Vec<BodyId> {
        self.query(|bounds| bounds.intersects_sphere(center, radius))
    }

    fn query<F: Fn(&Aabb) -> bool>(&self, hits: F) -> Vec<BodyId> {
        let mut found = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            // the root is always visited: it also holds out-of-bounds objects
            if index != ROOT && !hits(&node.bounds) {
                continue;
            }
            found.extend(node.objects.iter().filter(|(_, aabb)| hits(aabb)).map(|(id, _)| *id));
            if let Some(children) = node.children {
                stack.extend_from_slice(&children);
            }
        }
        found.sort();
        found
    }

    /// The `k` ids whose boxes are closest to `point`, nearest first, with their
    /// distances (zero for boxes containing the point). Ties break by id.
    pub fn query_k_nearest(&self, point: &Vector3, k: usize) -> Vec<(BodyId, f64)> {
        let mut result = Vec::with_capacity(k);
        if k == 0 {
            return result;
        }
        let mut heap = BinaryHeap::new();
        heap.push(Candidate { distance_squared: 0.0, item: SearchItem::Node(ROOT) });

        while let Some(Candidate { distance_squared, item }) = heap.pop() {
            match item {
                SearchItem::Object(id) => {
                    result.push((id, distance_squared.sqrt()));
                    if result.len() == k {
                        break;
                    }
                },
                SearchItem::Node(index) => {
                    let node = &self.nodes[index];
                    for (id, aabb) in &node.objects {
                        heap.push(Candidate {
                            distance_squared: aabb.distance_squared_to_point(point),
                            item: SearchItem::Object(*id),
                        });
                    }
                    if let Some(children) = node.children {
                        for child in children {
                            heap.push(Candidate {
                                distance_squared: self.nodes[child].bounds.distance_squared_to_point(point),
                                item: SearchItem::Node(child),
                            });
                        }
                    }
                },
            }
        }
        result
    }
}

/// True if `aabb` reaches any of the three planes that split `bounds` into octants.
fn touches_split_planes(bounds: &Aabb, aabb: &Aabb) -> bool {
    let c = bounds.center();
    let reaches = |lo: f64, hi: f64, mid: f64| lo <= mid && hi >= mid;
    reaches(aabb.min.x, aabb.max.x, c.x) || reaches(aabb.min.y, aabb.max.y, c.y) || reaches(aabb.min.z, aabb.max.z, c.z)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchItem {
    // objects sort before nodes at equal distance
    Object(BodyId),
    Node(usize),
}

impl Ord for SearchItem {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SearchItem::Object(a), SearchItem::Object(b)) => a.cmp(b),
            (SearchItem::Node(a), SearchItem::Node(b)) => a.cmp(b),
            (SearchItem::Object(_), SearchItem::Node(_)) => Ordering::Less,
            (SearchItem::Node(_), SearchItem::Object(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SearchItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap entry for the best-first nearest search.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance_squared: f64,
    item: SearchItem,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap
        other
            .distance_squared
            .total_cmp(&self.distance_squared)
            .then_with(|| other.item.cmp(&self.item))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
