// src/physics.rs
// ==============================================================================
// physics.rs — RAPIER WORLD ADAPTER
// ------------------------------------------------------------------------------
// Owns the rapier pipeline, a static ground box and every spawned kart.
//
// step(dt):
//   1) refresh the query pipeline (ground rays read colliders)
//   2) per kart: snapshot the chassis into a ForceRecorder, run Kart::tick
//      against RapierGround, flush the recorded forces onto the body
//   3) rapier step
//   4) safety: bodies that left the sane region are put back at their spawn
//
// Rapier keeps user forces until reset, so every flush starts with
// reset_forces().
// ==============================================================================

use std::collections::HashMap;

use rapier3d::prelude::{
    ActiveEvents, CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, Group,
    ImpulseJointSet, IntegrationParameters, InteractionGroups, IslandManager,
    MultibodyJointSet, NarrowPhase, PhysicsPipeline, QueryFilter, QueryPipeline, Ray,
    RigidBody, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};
use tracing::{info, warn};

use crate::config::KartConfig;
use crate::kart_core::body::{ForceRecorder, GroundProbe};
use crate::kart_core::types::{DriverInput, GroundHit, Point, Pose, Rotation, Vec3};
use crate::telemetry::KartTelemetry;
use crate::vehicle::Kart;

const GROUP_GROUND: Group = Group::from_bits_truncate(0b0001);
const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

/// Bodies beyond this distance from the origin (on any axis) are reset.
const WORLD_LIMIT: f32 = 1_000.0;

// --------------------------------------------------
// Ground probe over the rapier query pipeline
// --------------------------------------------------
pub struct RapierGround<'a> {
    query: &'a QueryPipeline,
    bodies: &'a RigidBodySet,
    colliders: &'a ColliderSet,
    filter: QueryFilter<'a>,
}

impl<'a> RapierGround<'a> {
    /// Rays ignore the kart's own chassis.
    pub fn new(
        query: &'a QueryPipeline,
        bodies: &'a RigidBodySet,
        colliders: &'a ColliderSet,
        exclude: RigidBodyHandle,
    ) -> Self {
        Self {
            query,
            bodies,
            colliders,
            filter: QueryFilter::default().exclude_rigid_body(exclude),
        }
    }
}

impl GroundProbe for RapierGround<'_> {
    fn raycast_down(&self, origin: &Point, down: &Vec3, max_distance: f32) -> Option<GroundHit> {
        let ray = Ray::new(*origin, *down);
        self.query
            .cast_ray_and_get_normal(self.bodies, self.colliders, &ray, max_distance, true, self.filter)
            .map(|(_, hit)| GroundHit::new(hit.time_of_impact, hit.normal))
    }
}

// --------------------------------------------------
// body <-> recorder
// --------------------------------------------------
fn snapshot(body: &RigidBody) -> ForceRecorder {
    let iso = body.position();
    let pose = Pose::new(Point::from(iso.translation.vector), iso.rotation);
    ForceRecorder::new(pose, body.mass())
        .with_velocity(*body.linvel(), *body.angvel())
        .with_center_of_mass(*body.center_of_mass())
}

fn flush(body: &mut RigidBody, recorder: &mut ForceRecorder) {
    body.reset_forces(false);
    for applied in recorder.drain() {
        match applied.at_point {
            Some(p) => body.add_force_at_point(applied.force, p, true),
            None => body.add_force(applied.force, true),
        }
    }
}

pub struct KartEntity {
    pub kart: Kart,
    pub input: DriverInput,
    pub spawn: Point,
}

pub struct PhysicsWorld {
    pub gravity: Vec3,
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,
    pub query_pipeline: QueryPipeline,
    pub karts: HashMap<RigidBodyHandle, KartEntity>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Big static ground box, top surface exactly at y = 0.
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(Vec3::new(0.0, -1.0, 0.0))
            .build();
        let ground_handle = bodies.insert(ground_rb);

        let ground_collider = ColliderBuilder::cuboid(500.0, 1.0, 500.0)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.2)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        info!(bodies = bodies.len(), colliders = colliders.len(), "ground inserted");

        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            karts: HashMap::new(),
        }
    }

    /// Spawn a chassis box at `position` and attach a kart to it.
    pub fn spawn_kart(&mut self, config: KartConfig, position: Point) -> RigidBodyHandle {
        let chassis = &config.body;
        let density = chassis.mass / chassis.volume().max(1e-6); // ρ = m / V
        let fallback_mass = chassis.mass;

        let rb = RigidBodyBuilder::dynamic()
            .translation(position.coords)
            .linear_damping(chassis.linear_damping)
            .angular_damping(chassis.angular_damping)
            .ccd_enabled(true)
            .build();

        let [hx, hy, hz] = chassis.half_extents;
        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND))
            .active_events(ActiveEvents::empty())
            .density(density)
            .friction(0.0) // tires carry all grip
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        let mut chassis_state = self
            .bodies
            .get(handle)
            .map(snapshot)
            .unwrap_or_else(|| ForceRecorder::new(Pose::new(position, Rotation::identity()), fallback_mass));
        if chassis_state.mass <= 0.0 {
            chassis_state.mass = fallback_mass;
        }
        let mass = chassis_state.mass;
        let kart = Kart::for_body(config, &chassis_state);

        self.karts.insert(
            handle,
            KartEntity {
                kart,
                input: DriverInput::default(),
                spawn: position,
            },
        );

        info!(?handle, mass, x = position.x, y = position.y, z = position.z, "spawned kart");
        handle
    }

    pub fn set_input(&mut self, handle: RigidBodyHandle, input: DriverInput) -> bool {
        match self.karts.get_mut(&handle) {
            Some(entity) => {
                entity.input = input.clamped();
                true
            }
            None => false,
        }
    }

    pub fn kart(&self, handle: RigidBodyHandle) -> Option<&Kart> {
        self.karts.get(&handle).map(|e| &e.kart)
    }

    pub fn telemetry(&self, handle: RigidBodyHandle) -> Option<KartTelemetry> {
        self.kart(handle).map(|k| *k.telemetry())
    }

    pub fn chassis_pose(&self, handle: RigidBodyHandle) -> Option<Pose> {
        self.bodies.get(handle).map(|b| {
            let iso = b.position();
            Pose::new(Point::from(iso.translation.vector), iso.rotation)
        })
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|b| *b.linvel())
    }

    /// Put a kart back at its spawn point, at rest, with fresh kart state.
    pub fn respawn(&mut self, handle: RigidBodyHandle) {
        let Some(entity) = self.karts.get_mut(&handle) else { return };
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(entity.spawn.coords, true);
            body.set_rotation(Rotation::identity(), true);
            body.set_linvel(Vec3::zeros(), true);
            body.set_angvel(Vec3::zeros(), true);
            body.reset_forces(true);
        }
        entity.kart.respawn();
    }

    pub fn step(&mut self, dt: f32) {
        // 1) rays must see the colliders where the last step left them
        self.query_pipeline.update(&self.colliders);

        // 2) kart forces
        for (&handle, entity) in self.karts.iter_mut() {
            let Some(rb) = self.bodies.get(handle) else { continue };
            let mut recorder = snapshot(rb);

            {
                let ground = RapierGround::new(&self.query_pipeline, &self.bodies, &self.colliders, handle);
                entity.kart.tick(&mut recorder, &ground, entity.input, dt);
            }

            if let Some(rb) = self.bodies.get_mut(handle) {
                flush(rb, &mut recorder);
            }
        }

        // 3) rapier
        let hooks = ();
        let events = ();
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &hooks,
            &events,
        );

        // 4) safety
        let exploded: Vec<RigidBodyHandle> = self
            .karts
            .keys()
            .copied()
            .filter(|&h| self.bodies.get(h).is_some_and(|b| !is_sane(b)))
            .collect();
        for handle in exploded {
            warn!(?handle, "reset exploding body back to spawn");
            self.respawn(handle);
        }
    }
}

fn is_sane(body: &RigidBody) -> bool {
    let pos = body.translation();
    let vel = body.linvel();
    pos.iter().all(|c| c.is_finite() && c.abs() <= WORLD_LIMIT) && vel.iter().all(|c| c.is_finite())
}
