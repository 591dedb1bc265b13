use glam::Vec2;
use rapier2d::prelude::*;

use crate::api::types::EntityId;

// ---------------------------------------------------------------------------
// Conversion helpers between glam and nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How a body responds to forces. The three kinds are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassKind {
    /// Translates and rotates freely.
    Normal,
    /// Never moves (static geometry, sensors).
    Infinite,
    /// Translates but never rotates.
    FixedAngular,
}

impl MassKind {
    fn body_type(self) -> RigidBodyType {
        match self {
            MassKind::Infinite => RigidBodyType::Fixed,
            MassKind::Normal | MassKind::FixedAngular => RigidBodyType::Dynamic,
        }
    }

    fn locked_axes(self) -> LockedAxes {
        match self {
            MassKind::FixedAngular => LockedAxes::ROTATION_LOCKED,
            MassKind::Normal | MassKind::Infinite => LockedAxes::empty(),
        }
    }

    /// Rebuild from the `(is_infinite, is_fixed_angular)` flag pair.
    /// Both flags set is not a valid combination.
    pub fn from_flags(is_infinite: bool, is_fixed_angular: bool) -> Option<Self> {
        match (is_infinite, is_fixed_angular) {
            (false, false) => Some(MassKind::Normal),
            (true, false) => Some(MassKind::Infinite),
            (false, true) => Some(MassKind::FixedAngular),
            (true, true) => None,
        }
    }

    /// The `(is_infinite, is_fixed_angular)` flag pair.
    pub fn flags(self) -> (bool, bool) {
        (self == MassKind::Infinite, self == MassKind::FixedAngular)
    }

    pub fn is_static(self) -> bool {
        self == MassKind::Infinite
    }
}

/// Collision category bits.
pub mod category {
    pub const PLAYER: u32 = 1 << 0;
    pub const PLATFORM: u32 = 1 << 1;
    pub const LADDER: u32 = 1 << 2;
    pub const ENEMY: u32 = 1 << 3;
    pub const POWER_UP: u32 = 1 << 4;
    pub const GENERATOR: u32 = 1 << 5;
    pub const NONE: u32 = 0;
}

/// Category/mask pair. Two colliders interact when each one's category is in
/// the other's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
}

impl CollisionFilter {
    pub const fn new(category: u32, mask: u32) -> Self {
        Self { category, mask }
    }

    pub fn accepts(&self, other: &CollisionFilter) -> bool {
        self.mask & other.category != 0 && other.mask & self.category != 0
    }

    fn to_rapier(self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.category),
            Group::from_bits_truncate(self.mask),
        )
    }

    fn from_rapier(groups: InteractionGroups) -> Self {
        Self {
            category: groups.memberships.bits(),
            mask: groups.filter.bits(),
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
    }

    /// Full width and height of the shape's unrotated bounds.
    pub fn size(&self) -> Vec2 {
        match *self {
            ColliderDesc::Ball { radius } => Vec2::splat(radius * 2.0),
            ColliderDesc::Cuboid { half_width, half_height } => {
                Vec2::new(half_width * 2.0, half_height * 2.0)
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Everything needed to create (or recreate) a body and its single collider.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub mass: MassKind,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub gravity_scale: f32,
    pub collider: ColliderDesc,
    pub filter: CollisionFilter,
    pub sensor: bool,
    pub material: ColliderMaterial,
}

impl BodyDesc {
    pub fn new(mass: MassKind, collider: ColliderDesc) -> Self {
        Self {
            mass,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            gravity_scale: 1.0,
            collider,
            filter: CollisionFilter::new(category::NONE, category::NONE),
            sensor: false,
            material: ColliderMaterial::default(),
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_angular_velocity(mut self, angvel: f32) -> Self {
        self.angular_velocity = angvel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_material(mut self, material: ColliderMaterial) -> Self {
        self.material = material;
        self
    }
}

/// Handle pair owned by exactly one Entity. Not `Clone`: the only way to get
/// one is [`PhysicsAdapter::create_body`], the only way to drop the rapier
/// side is [`PhysicsAdapter::remove_body`].
#[derive(Debug)]
pub struct PhysicsBody {
    body_handle: RigidBodyHandle,
    collider_handle: ColliderHandle,
}

/// A contact or sensor overlap between two entities found by the last step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// World-space normal pointing from `entity_a` toward `entity_b`.
    /// Zero for sensor overlaps.
    pub normal: Vec2,
    pub sensor: bool,
}

/// Decides, per solver contact point, whether the contact takes part in the
/// next step. Installed for the duration of one [`PhysicsAdapter::step`].
pub trait ContactFilter: Send + Sync {
    fn keep_contact(&self, a: EntityId, b: EntityId, point: Vec2) -> bool;
}

// ---------------------------------------------------------------------------
// Rapier hook bridge
// ---------------------------------------------------------------------------

struct HookBridge<'a> {
    filter: &'a dyn ContactFilter,
}

fn body_entity(bodies: &RigidBodySet, handle: Option<RigidBodyHandle>) -> Option<EntityId> {
    let body = bodies.get(handle?)?;
    Some(EntityId(body.user_data as u32))
}

impl PhysicsHooks for HookBridge<'_> {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let a = body_entity(context.bodies, context.rigid_body1);
        let b = body_entity(context.bodies, context.rigid_body2);
        if let (Some(a), Some(b)) = (a, b) {
            let filter = self.filter;
            context
                .solver_contacts
                .retain(|contact| filter.keep_contact(a, b, Vec2::new(contact.point.x, contact.point.y)));
        }
    }
}

// ---------------------------------------------------------------------------
// PhysicsAdapter
// ---------------------------------------------------------------------------

/// Wraps all rapier2d state for one world. Constructed only by the world
/// builder, so a world never holds more than one.
pub struct PhysicsAdapter {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    bounds: Vec2,
}

impl PhysicsAdapter {
    /// Create an adapter for a world spanning `(0, 0)..bounds`.
    pub(crate) fn new(gravity: Vec2, dt: f32, bounds: Vec2) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = dt;
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            bounds,
        }
    }

    /// Integration timestep.
    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// World bounds, measured from the origin.
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Create a rigid body + collider. The EntityId is stored in the body's
    /// `user_data` for contact lookups.
    pub fn create_body(&mut self, entity_id: EntityId, desc: &BodyDesc) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.mass.body_type())
            .translation(vec2_to_na(desc.position))
            .rotation(desc.rotation)
            .linvel(vec2_to_na(desc.velocity))
            .angvel(desc.angular_velocity)
            .gravity_scale(desc.gravity_scale)
            .locked_axes(desc.mass.locked_axes())
            .can_sleep(false)
            .user_data(entity_id.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .sensor(desc.sensor)
            .collision_groups(desc.filter.to_rapier())
            .restitution(desc.material.restitution)
            .friction(desc.material.friction)
            .density(desc.material.density)
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body and its collider from the simulation.
    pub fn remove_body(&mut self, body: PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Advance the simulation by one timestep, consulting `filter` for every
    /// solver contact.
    pub fn step(&mut self, filter: &dyn ContactFilter) {
        let hooks = HookBridge { filter };
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &hooks,
            &(),
        );
    }

    /// Contacts and sensor overlaps from the most recent step: touching solid
    /// pairs first, then overlapping sensor pairs, each in detection order.
    pub fn contacts(&self) -> Vec<Contact> {
        let mut contacts = Vec::new();

        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let Some(manifold) = pair.manifolds.iter().find(|m| !m.points.is_empty()) else {
                continue;
            };
            let a = self.collider_to_entity(pair.collider1);
            let b = self.collider_to_entity(pair.collider2);
            if let (Some(entity_a), Some(entity_b)) = (a, b) {
                contacts.push(Contact {
                    entity_a,
                    entity_b,
                    normal: na_to_vec2(&manifold.data.normal),
                    sensor: false,
                });
            }
        }

        for (h1, h2, intersecting) in self.narrow_phase.intersection_pairs() {
            if !intersecting {
                continue;
            }
            let a = self.collider_to_entity(h1);
            let b = self.collider_to_entity(h2);
            if let (Some(entity_a), Some(entity_b)) = (a, b) {
                contacts.push(Contact {
                    entity_a,
                    entity_b,
                    normal: Vec2::ZERO,
                    sensor: true,
                });
            }
        }

        contacts
    }

    /// Whether the two bodies' colliders currently overlap. Only meaningful
    /// when at least one of them is a sensor.
    pub fn intersecting(&self, a: &PhysicsBody, b: &PhysicsBody) -> bool {
        self.narrow_phase
            .intersection_pair(a.collider_handle, b.collider_handle)
            .unwrap_or(false)
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_gravity_scale(&mut self, body: &PhysicsBody, scale: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_gravity_scale(scale, true);
        }
    }

    /// Move a body instantly, clearing its velocity.
    pub fn teleport(&mut self, body: &PhysicsBody, pos: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_translation(vec2_to_na(pos), true);
            rb.set_linvel(nalgebra::Vector2::zeros(), true);
            rb.set_angvel(0.0, true);
        }
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Whether a body has left the world bounds by more than `margin`.
    pub fn out_of_bounds(&self, body: &PhysicsBody, margin: f32) -> bool {
        let (pos, _) = self.body_position(body);
        pos.x < -margin
            || pos.y < -margin
            || pos.x > self.bounds.x + margin
            || pos.y > self.bounds.y + margin
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the handle still refers to a live body.
    pub fn contains(&self, body: &PhysicsBody) -> bool {
        self.bodies.contains(body.body_handle)
    }

    /// Read a body back into the description that would recreate it.
    /// Returns `None` if the body is gone or its collider has an unsupported
    /// shape.
    pub fn describe_body(&self, body: &PhysicsBody) -> Option<BodyDesc> {
        let rb = self.bodies.get(body.body_handle)?;
        let collider = self.colliders.get(body.collider_handle)?;

        let shape = collider.shape();
        let collider_desc = if let Some(ball) = shape.as_ball() {
            ColliderDesc::Ball { radius: ball.radius }
        } else if let Some(cuboid) = shape.as_cuboid() {
            ColliderDesc::Cuboid {
                half_width: cuboid.half_extents.x,
                half_height: cuboid.half_extents.y,
            }
        } else {
            return None;
        };

        let mass = if rb.is_fixed() {
            MassKind::Infinite
        } else if rb.locked_axes().contains(LockedAxes::ROTATION_LOCKED) {
            MassKind::FixedAngular
        } else {
            MassKind::Normal
        };

        let (position, rotation) = na_iso_to_pos_rot(rb.position());
        Some(BodyDesc {
            mass,
            position,
            rotation,
            velocity: na_to_vec2(rb.linvel()),
            angular_velocity: rb.angvel(),
            gravity_scale: rb.gravity_scale(),
            collider: collider_desc,
            filter: CollisionFilter::from_rapier(collider.collision_groups()),
            sensor: collider.is_sensor(),
            material: ColliderMaterial {
                restitution: collider.restitution(),
                friction: collider.friction(),
                density: collider.density(),
            },
        })
    }

    // -- private helpers --

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        body_entity(&self.bodies, collider.parent())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn adapter(gravity: Vec2) -> PhysicsAdapter {
        PhysicsAdapter::new(gravity, DT, Vec2::new(8.0, 4.5))
    }

    fn ball(radius: f32) -> BodyDesc {
        BodyDesc::new(MassKind::Normal, ColliderDesc::Ball { radius })
    }

    fn everything() -> CollisionFilter {
        CollisionFilter::new(u32::MAX, u32::MAX)
    }

    struct KeepAll;

    impl ContactFilter for KeepAll {
        fn keep_contact(&self, _a: EntityId, _b: EntityId, _point: Vec2) -> bool {
            true
        }
    }

    struct RejectAll;

    impl ContactFilter for RejectAll {
        fn keep_contact(&self, _a: EntityId, _b: EntityId, _point: Vec2) -> bool {
            false
        }
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = adapter(Vec2::ZERO);
        let body = world.create_body(EntityId(1), &ball(0.1));
        assert_eq!(world.body_count(), 1);
        assert!(world.contains(&body));
        world.remove_body(body);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn gravity_pulls_dynamic_body_down() {
        let mut world = adapter(Vec2::new(0.0, -9.81));
        let body = world.create_body(EntityId(1), &ball(0.1).with_position(Vec2::new(1.0, 2.0)));

        for _ in 0..10 {
            world.step(&KeepAll);
        }
        let (pos, _) = world.body_position(&body);
        assert!(pos.y < 2.0, "Body should fall: y={}", pos.y);
    }

    #[test]
    fn infinite_mass_body_does_not_move() {
        let mut world = adapter(Vec2::new(0.0, -9.81));
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::new(
                MassKind::Infinite,
                ColliderDesc::Cuboid { half_width: 4.0, half_height: 0.05 },
            )
            .with_position(Vec2::new(4.0, 0.5)),
        );

        for _ in 0..10 {
            world.step(&KeepAll);
        }
        let (pos, _) = world.body_position(&body);
        assert!((pos.y - 0.5).abs() < 0.001, "Fixed body should not move: y={}", pos.y);
    }

    #[test]
    fn set_velocity_directly() {
        let mut world = adapter(Vec2::ZERO);
        let body = world.create_body(EntityId(1), &ball(0.1));
        world.set_velocity(&body, Vec2::new(1.5, -0.5));
        let vel = world.velocity(&body);
        assert!((vel.x - 1.5).abs() < 0.001);
        assert!((vel.y + 0.5).abs() < 0.001);
    }

    #[test]
    fn mass_flags_round_trip_and_reject_both() {
        for kind in [MassKind::Normal, MassKind::Infinite, MassKind::FixedAngular] {
            let (inf, ang) = kind.flags();
            assert_eq!(MassKind::from_flags(inf, ang), Some(kind));
        }
        assert_eq!(MassKind::from_flags(true, true), None);
    }

    #[test]
    fn filter_accepts_is_symmetric() {
        let player = CollisionFilter::new(category::PLAYER, category::PLATFORM | category::ENEMY);
        let enemy = CollisionFilter::new(category::ENEMY, category::PLATFORM | category::PLAYER);
        let other_enemy = enemy;
        assert!(player.accepts(&enemy));
        assert!(enemy.accepts(&player));
        assert!(!enemy.accepts(&other_enemy));
    }

    #[test]
    fn describe_body_reads_back_creation_desc() {
        let mut world = adapter(Vec2::ZERO);
        let desc = BodyDesc::new(
            MassKind::FixedAngular,
            ColliderDesc::Cuboid { half_width: 0.1, half_height: 0.15 },
        )
        .with_position(Vec2::new(1.0, 2.0))
        .with_velocity(Vec2::new(0.5, 0.0))
        .with_filter(CollisionFilter::new(category::PLAYER, category::PLATFORM))
        .with_sensor(false);
        let body = world.create_body(EntityId(3), &desc);

        let read = world.describe_body(&body).expect("body exists");
        assert_eq!(read.mass, MassKind::FixedAngular);
        assert_eq!(read.collider, desc.collider);
        assert_eq!(read.filter, desc.filter);
        assert!(!read.sensor);
        assert!((read.position - desc.position).length() < 0.001);
        assert!((read.velocity - desc.velocity).length() < 0.001);
    }

    #[test]
    fn describe_static_sensor() {
        let mut world = adapter(Vec2::ZERO);
        let body = world.create_body(
            EntityId(9),
            &BodyDesc::new(MassKind::Infinite, ColliderDesc::Ball { radius: 0.2 }).with_sensor(true),
        );
        let read = world.describe_body(&body).unwrap();
        assert_eq!(read.mass, MassKind::Infinite);
        assert!(read.sensor);
        assert_eq!(read.collider, ColliderDesc::Ball { radius: 0.2 });
    }

    fn resting_pair(world: &mut PhysicsAdapter) -> (PhysicsBody, PhysicsBody) {
        let floor = world.create_body(
            EntityId(1),
            &BodyDesc::new(
                MassKind::Infinite,
                ColliderDesc::Cuboid { half_width: 4.0, half_height: 0.05 },
            )
            .with_position(Vec2::new(4.0, 0.5))
            .with_filter(everything()),
        );
        let crate_body = world.create_body(
            EntityId(2),
            &BodyDesc::new(
                MassKind::FixedAngular,
                ColliderDesc::Cuboid { half_width: 0.1, half_height: 0.1 },
            )
            .with_position(Vec2::new(4.0, 0.7))
            .with_filter(everything()),
        );
        (floor, crate_body)
    }

    #[test]
    fn body_rests_on_floor_and_reports_contact() {
        let mut world = adapter(Vec2::new(0.0, -9.81));
        let (_floor, body) = resting_pair(&mut world);

        for _ in 0..60 {
            world.step(&KeepAll);
        }
        let (pos, _) = world.body_position(&body);
        assert!((pos.y - 0.65).abs() < 0.02, "Should rest on floor: y={}", pos.y);

        let contacts = world.contacts();
        let contact = contacts
            .iter()
            .find(|c| !c.sensor)
            .expect("resting body should touch the floor");
        let ids = [contact.entity_a, contact.entity_b];
        assert!(ids.contains(&EntityId(1)) && ids.contains(&EntityId(2)));

        // Normal points from a to b; the floor is below the crate.
        let from_crate = if contact.entity_a == EntityId(2) {
            contact.normal
        } else {
            -contact.normal
        };
        assert!(from_crate.y < -0.9, "normal from crate should point down: {:?}", from_crate);
    }

    #[test]
    fn rejecting_filter_lets_body_fall_through() {
        let mut world = adapter(Vec2::new(0.0, -9.81));
        let (_floor, body) = resting_pair(&mut world);

        for _ in 0..60 {
            world.step(&RejectAll);
        }
        let (pos, _) = world.body_position(&body);
        assert!(pos.y < 0.4, "Should pass through floor: y={}", pos.y);
    }

    #[test]
    fn sensor_overlap_is_reported() {
        let mut world = adapter(Vec2::ZERO);
        let sensor = world.create_body(
            EntityId(1),
            &BodyDesc::new(MassKind::Infinite, ColliderDesc::Ball { radius: 0.3 })
                .with_position(Vec2::new(2.0, 2.0))
                .with_sensor(true)
                .with_filter(everything()),
        );
        let mover = world.create_body(
            EntityId(2),
            &ball(0.1)
                .with_position(Vec2::new(2.1, 2.0))
                .with_filter(everything()),
        );

        world.step(&KeepAll);
        assert!(world.intersecting(&mover, &sensor));
        let contacts = world.contacts();
        assert!(contacts.iter().any(|c| c.sensor));
    }

    #[test]
    fn masked_out_pair_never_touches() {
        let mut world = adapter(Vec2::ZERO);
        let a = world.create_body(
            EntityId(1),
            &ball(0.2).with_filter(CollisionFilter::new(category::ENEMY, category::PLAYER)),
        );
        let _b = world.create_body(
            EntityId(2),
            &ball(0.2)
                .with_position(Vec2::new(0.1, 0.0))
                .with_filter(CollisionFilter::new(category::ENEMY, category::PLAYER)),
        );
        world.step(&KeepAll);
        assert!(world.contacts().is_empty());
        let (pos, _) = world.body_position(&a);
        assert!(pos.x.abs() < 0.001, "masked bodies should not push each other");
    }

    #[test]
    fn out_of_bounds_uses_margin() {
        let mut world = adapter(Vec2::ZERO);
        let inside = world.create_body(EntityId(1), &ball(0.1).with_position(Vec2::new(4.0, 2.0)));
        let below = world.create_body(EntityId(2), &ball(0.1).with_position(Vec2::new(4.0, -0.6)));
        let edge = world.create_body(EntityId(3), &ball(0.1).with_position(Vec2::new(8.4, 2.0)));
        assert!(!world.out_of_bounds(&inside, 0.5));
        assert!(world.out_of_bounds(&below, 0.5));
        assert!(!world.out_of_bounds(&edge, 0.5));
    }

    #[test]
    fn teleport_clears_velocity() {
        let mut world = adapter(Vec2::ZERO);
        let body = world.create_body(EntityId(1), &ball(0.1).with_velocity(Vec2::new(3.0, 0.0)));
        world.teleport(&body, Vec2::new(1.0, 1.0));
        assert_eq!(world.velocity(&body), Vec2::ZERO);
        let (pos, _) = world.body_position(&body);
        assert!((pos - Vec2::new(1.0, 1.0)).length() < 0.001);
    }
}
