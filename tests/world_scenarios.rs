// ============================================================================
// GS.Phy2D - Open source 2D physics engine
// 2026, Vincent Gsell
//
// This library is free software; you can redistribute it and/or
// modify it under the terms of the GNU Lesser General Public
// License as published by the Free Software Foundation; either
// version 2.1 of the License, or (at your option) any later version.
//
// This library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public
// License along with this library; if not, write to the Free Software
// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301  USA
//
// Created by Vincent Gsell [https://github.com/VincentGsell]
// ============================================================================

// History
// 20261019 - Created.

// Scénarios complets sur le monde (toutes stratégies de phase large).

use std::cell::RefCell;
use std::rc::Rc;

use gs_rigid2d::prelude::*;
use gs_rigid2d::SpatialIndexType;

const DT: f32 = 1.0 / 60.0;
const GROUND: BodyId = BodyId(0);
const BALL: BodyId = BodyId(1);

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Sol statique : dessus à y = -100, de x = -1000 à x = 1000
fn ground() -> RigidBody {
    RigidBody::new_static(Shape::rectangle(2000.0, 20.0).unwrap(), vec2(0.0, -110.0))
}

fn falling_ball_world(kind: SpatialIndexType) -> World {
    let mut world = World::new(2000.0, 2000.0, kind);
    world.add_rigid_body(GROUND, ground()).unwrap();
    let ball = RigidBody::new_dynamic(Shape::circle(20.0), vec2(0.0, 200.0), 10.0)
        .with_restitution(0.5);
    world.add_rigid_body(BALL, ball).unwrap();
    world
}

fn zero_gravity_world() -> World {
    let config = WorldConfig {
        gravity: Vec2::ZERO,
        ..WorldConfig::default()
    };
    World::with_config(2000.0, 2000.0, SpatialIndexType::default(), config)
}

#[test]
fn falling_circle_settles_on_ground() {
    init_logs();
    for kind in SpatialIndexType::ALL {
        let mut world = falling_ball_world(kind);
        for _ in 0..300 {
            world.step(DT).unwrap();
        }
        let ball = world.body(BALL).unwrap();
        assert!(
            (ball.position.y - (-80.0)).abs() < 2.0,
            "{kind}: y = {}",
            ball.position.y
        );
        assert!(ball.velocity.y.abs() < 1.0, "{kind}: vy = {}", ball.velocity.y);
        assert!(ball.position.x.abs() < 1e-3);
    }
}

#[test]
fn box_lands_flat() {
    let mut world = World::new(2000.0, 2000.0, SpatialIndexType::DynamicTree);
    world.add_rigid_body(GROUND, ground()).unwrap();
    let crate_body = RigidBody::new_dynamic(Shape::rectangle(40.0, 40.0).unwrap(), vec2(0.0, 0.0), 5.0);
    world.add_rigid_body(BodyId(1), crate_body).unwrap();

    for _ in 0..300 {
        world.step(DT).unwrap();
    }
    let b = world.body(BodyId(1)).unwrap();
    assert!((b.position.y + 80.0).abs() < 2.0, "y = {}", b.position.y);
    assert!(b.rotation.abs() < 0.05, "rotation = {}", b.rotation);
    // Contact face contre face : deux points
    let m = world.contacts().next().unwrap();
    assert_eq!(m.contacts.len(), 2);
}

#[test]
fn head_on_elastic_collision_exchanges_velocities() {
    let mut world = zero_gravity_world();
    let a = RigidBody::new_dynamic(Shape::circle(20.0), vec2(-50.0, 0.0), 1.0)
        .with_velocity(vec2(100.0, 0.0))
        .with_restitution(1.0)
        .with_friction(0.0);
    let b = RigidBody::new_dynamic(Shape::circle(20.0), vec2(50.0, 0.0), 1.0)
        .with_velocity(vec2(-100.0, 0.0))
        .with_restitution(1.0)
        .with_friction(0.0);
    world.add_rigid_body(BodyId(1), a).unwrap();
    world.add_rigid_body(BodyId(2), b).unwrap();

    for _ in 0..60 {
        world.step(DT).unwrap();
    }
    let va = world.body(BodyId(1)).unwrap().velocity;
    let vb = world.body(BodyId(2)).unwrap().velocity;
    assert!((va.x + 100.0).abs() < 0.5, "va = {va}");
    assert!((vb.x - 100.0).abs() < 0.5, "vb = {vb}");
    assert!(va.y.abs() < 1e-3 && vb.y.abs() < 1e-3);
}

#[test]
fn static_bodies_never_move() {
    let mut world = World::new(2000.0, 2000.0, SpatialIndexType::SweepAndPrune);
    let ramp = RigidBody::new_static(Shape::rectangle(400.0, 20.0).unwrap(), vec2(0.0, 0.0))
        .with_rotation(0.3);
    world.add_rigid_body(BodyId(0), ramp).unwrap();
    for i in 0..6 {
        let body = RigidBody::new_dynamic(
            Shape::regular_polygon(5, 12.0).unwrap(),
            vec2(-100.0 + i as f32 * 40.0, 100.0),
            2.0,
        );
        world.add_rigid_body(BodyId(i + 1), body).unwrap();
    }

    let before = world.body(BodyId(0)).cloned().unwrap();
    for _ in 0..200 {
        world.step(DT).unwrap();
    }
    let after = world.body(BodyId(0)).unwrap();
    assert_eq!(after.position, before.position);
    assert_eq!(after.rotation, before.rotation);
    assert_eq!(after.velocity, Vec2::ZERO);
}

#[test]
fn resting_body_falls_asleep_and_stays_put() {
    let mut world = falling_ball_world(SpatialIndexType::DynamicTree);
    for _ in 0..360 {
        world.step(DT).unwrap();
    }
    let ball = world.body(BALL).unwrap();
    assert!(ball.is_sleeping());
    assert_eq!(world.last_step_stats().sleeping_bodies, 1);
    let rest = ball.position;

    // Pas d'événement Ended pendant le sommeil
    let mut ended = 0;
    for _ in 0..60 {
        world.step(DT).unwrap();
        ended += world
            .collision_events()
            .iter()
            .filter(|e| e.phase == CollisionPhase::Ended)
            .count();
    }
    assert_eq!(world.body(BALL).unwrap().position, rest);
    assert_eq!(ended, 0);

    // Perturbation
    world.apply_impulse(BALL, vec2(0.0, 3000.0), rest).unwrap();
    world.step(DT).unwrap();
    let ball = world.body(BALL).unwrap();
    assert!(!ball.is_sleeping());
    assert!(ball.position.y > rest.y);
}

#[test]
fn removing_support_wakes_sleeper() {
    let mut world = falling_ball_world(SpatialIndexType::RegionTree);
    for _ in 0..360 {
        world.step(DT).unwrap();
    }
    assert!(world.body(BALL).unwrap().is_sleeping());
    let rest_y = world.body(BALL).unwrap().position.y;

    world.remove_rigid_body(GROUND).unwrap();
    assert!(!world.body(BALL).unwrap().is_sleeping());
    for _ in 0..10 {
        world.step(DT).unwrap();
    }
    assert!(world.body(BALL).unwrap().position.y < rest_y - 1.0);
}

#[test]
fn static_block_moved_onto_sleeper_wakes_it() {
    let mut world = falling_ball_world(SpatialIndexType::DynamicTree);
    let block = BodyId(3);
    let far = RigidBody::new_static(Shape::rectangle(20.0, 20.0).unwrap(), vec2(500.0, 500.0));
    world.add_rigid_body(block, far).unwrap();
    for _ in 0..360 {
        world.step(DT).unwrap();
    }
    let rest = world.body(BALL).unwrap().position;
    assert!(world.body(BALL).unwrap().is_sleeping());

    // Le bloc mord de 15 unités dans le flanc droit de la balle
    world.body_mut(block).unwrap().position = rest + vec2(15.0, 0.0);
    assert!(world.body(BALL).unwrap().is_sleeping());

    world.step(DT).unwrap();
    assert!(!world.body(BALL).unwrap().is_sleeping());
    let pair = gs_rigid2d::BodyPair::new(BALL, block);
    assert!(world
        .collision_events()
        .iter()
        .any(|e| e.pair() == pair && e.phase == CollisionPhase::Began));

    for _ in 0..60 {
        world.step(DT).unwrap();
    }
    let ball = world.body(BALL).unwrap();
    assert!(ball.position.x < rest.x - 10.0, "x = {}", ball.position.x);
    assert!(world
        .contacts()
        .filter(|m| gs_rigid2d::BodyPair::new(m.body_a, m.body_b) == pair)
        .all(|m| m.penetration < 1.0));
    // Le bloc statique n'a pas bougé
    assert_eq!(world.body(block).unwrap().position, rest + vec2(15.0, 0.0));
}

#[test]
fn set_shape_validates_and_updates_mass_properties() {
    let mut world = falling_ball_world(SpatialIndexType::RegionTree);
    for _ in 0..360 {
        world.step(DT).unwrap();
    }
    assert!(world.body(BALL).unwrap().is_sleeping());

    // Forme invalide : refusée, rien ne change
    let err = world.set_shape(BALL, Shape::circle(-5.0));
    assert!(matches!(err, Err(PhyError::InvalidShape(_))));
    assert!(matches!(
        world.set_shape(BodyId(99), Shape::circle(5.0)),
        Err(PhyError::UnknownBodyId(_))
    ));
    let ball = world.body(BALL).unwrap();
    assert_eq!(ball.shape(), &Shape::circle(20.0));
    assert!(ball.is_sleeping());

    // Rayon 30 : inertie = m r² / 2, la balle se réveille et remonte
    world.set_shape(BALL, Shape::circle(30.0)).unwrap();
    let ball = world.body(BALL).unwrap();
    assert!(!ball.is_sleeping());
    assert_eq!(ball.mass(), 10.0);
    assert!((ball.inertia() - 4500.0).abs() < 1e-2);

    for _ in 0..240 {
        world.step(DT).unwrap();
    }
    let y = world.body(BALL).unwrap().position.y;
    assert!((y - (-70.0)).abs() < 2.0, "y = {y}");
}

#[test]
fn stacked_island_sleeps_and_wakes_together() {
    let mut world = World::new(2000.0, 2000.0, SpatialIndexType::DynamicTree);
    world.add_rigid_body(GROUND, ground()).unwrap();
    world
        .add_rigid_body(
            BodyId(1),
            RigidBody::new_dynamic(Shape::rectangle(40.0, 40.0).unwrap(), vec2(0.0, -79.0), 5.0),
        )
        .unwrap();
    world
        .add_rigid_body(
            BodyId(2),
            RigidBody::new_dynamic(Shape::rectangle(40.0, 40.0).unwrap(), vec2(0.0, -38.0), 5.0),
        )
        .unwrap();

    for _ in 0..600 {
        world.step(DT).unwrap();
    }
    assert!(world.body(BodyId(1)).unwrap().is_sleeping());
    assert!(world.body(BodyId(2)).unwrap().is_sleeping());

    // Réveiller la caisse du bas réveille aussi celle du haut
    world.wake_body(BodyId(1)).unwrap();
    assert!(!world.body(BodyId(1)).unwrap().is_sleeping());
    assert!(!world.body(BodyId(2)).unwrap().is_sleeping());
}

#[test]
fn filtered_pairs_never_reach_listeners() {
    let mut world = zero_gravity_world();
    let a = RigidBody::new_dynamic(Shape::circle(20.0), vec2(0.0, 0.0), 1.0)
        .with_filter(CollisionFilter::new(0b01, 0b01, 0));
    let b = RigidBody::new_dynamic(Shape::circle(20.0), vec2(10.0, 0.0), 1.0)
        .with_filter(CollisionFilter::new(0b10, 0b10, 0));
    // Même catégorie mais groupe négatif partagé
    let c = RigidBody::new_dynamic(Shape::circle(20.0), vec2(0.0, 10.0), 1.0)
        .with_filter(CollisionFilter::new(0b01, 0b01, -3));
    let d = RigidBody::new_dynamic(Shape::circle(20.0), vec2(10.0, 10.0), 1.0)
        .with_filter(CollisionFilter::new(0b01, 0b01, -3));
    world.add_rigid_body(BodyId(1), a).unwrap();
    world.add_rigid_body(BodyId(2), b).unwrap();
    world.add_rigid_body(BodyId(3), c).unwrap();
    world.add_rigid_body(BodyId(4), d).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    world.on_collision(move |ev| sink.borrow_mut().push(ev.pair()));

    world.step(DT).unwrap();
    // Les paires filtrées passent la phase large mais pas le filtre
    let stats = *world.last_step_stats();
    assert!(stats.candidate_pairs > stats.filtered_pairs);
    for _ in 0..29 {
        world.step(DT).unwrap();
    }
    let seen = seen.borrow();
    let forbidden = [
        gs_rigid2d::BodyPair::new(BodyId(1), BodyId(2)),
        gs_rigid2d::BodyPair::new(BodyId(3), BodyId(4)),
    ];
    assert!(seen.iter().all(|p| !forbidden.contains(p)));
    // 1 et 3 partagent la catégorie 0b01 : eux se touchent
    assert!(seen.contains(&gs_rigid2d::BodyPair::new(BodyId(1), BodyId(3))));
}

#[test]
fn positive_group_overrides_masks() {
    let mut world = zero_gravity_world();
    let a = RigidBody::new_dynamic(Shape::circle(20.0), vec2(0.0, 0.0), 1.0)
        .with_filter(CollisionFilter::new(0b01, 0, 4));
    let b = RigidBody::new_dynamic(Shape::circle(20.0), vec2(10.0, 0.0), 1.0)
        .with_filter(CollisionFilter::new(0b10, 0, 4));
    world.add_rigid_body(BodyId(1), a).unwrap();
    world.add_rigid_body(BodyId(2), b).unwrap();
    world.step(DT).unwrap();
    assert_eq!(world.collision_events().len(), 1);
    assert_eq!(world.collision_events()[0].phase, CollisionPhase::Began);
}

#[test]
fn pin_joint_anchors_stay_together() {
    let mut world = World::new(2000.0, 2000.0, SpatialIndexType::DynamicTree);
    let a = RigidBody::new_dynamic(Shape::circle(10.0), vec2(0.0, 100.0), 1.0);
    let b = RigidBody::new_dynamic(Shape::circle(10.0), vec2(30.0, 100.0), 1.0);
    world.add_rigid_body(BodyId(1), a).unwrap();
    world.add_rigid_body(BodyId(2), b).unwrap();

    let hinge = world
        .add_constraint(PinJoint::to_world(BodyId(1), Vec2::ZERO, vec2(0.0, 100.0)))
        .unwrap();
    let link = world
        .add_constraint(PinJoint::between(
            BodyId(1),
            vec2(15.0, 0.0),
            BodyId(2),
            vec2(-15.0, 0.0),
        ))
        .unwrap();

    let mut lowest = f32::MAX;
    for _ in 0..300 {
        world.step(DT).unwrap();
        let a = world.body(BodyId(1)).unwrap();
        let b = world.body(BodyId(2)).unwrap();
        let err_link = world.constraint(link).unwrap().position_error(a, Some(b));
        let err_hinge = world.constraint(hinge).unwrap().position_error(a, None);
        assert!(err_link.length() < 1.0, "lien : {}", err_link.length());
        assert!(err_hinge.length() < 1.0, "pivot : {}", err_hinge.length());
        lowest = lowest.min(b.position.y);
    }
    // Le pendule a bien oscillé
    assert!(lowest < 80.0, "y min = {lowest}");
}

#[test]
fn collision_phases_follow_contact() {
    let mut world = falling_ball_world(SpatialIndexType::SweepAndPrune);
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    world.on_collision(move |ev| {
        assert!(ev.involves(GROUND) && ev.involves(BALL));
        sink.borrow_mut().push(ev.phase);
    });

    for _ in 0..180 {
        world.step(DT).unwrap();
    }
    let log = log.borrow();
    assert_eq!(log.first(), Some(&CollisionPhase::Began));
    // Le premier rebond termine le contact
    let first_end = log.iter().position(|p| *p == CollisionPhase::Ended).unwrap();
    assert!(log[..first_end].iter().all(|p| *p != CollisionPhase::Ended));
    assert!(world.frame() == 180);
}

#[test]
fn degenerate_step_changes_nothing() {
    let mut world = falling_ball_world(SpatialIndexType::DynamicTree);
    world.step(DT).unwrap();
    let before = world.body(BALL).unwrap().position;
    assert!(matches!(world.step(0.0), Err(PhyError::DegenerateStep(_))));
    assert_eq!(world.body(BALL).unwrap().position, before);
    assert_eq!(world.frame(), 1);
}
