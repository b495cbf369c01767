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
// 20260126 - Rust port created.
// 20261019 - Corps rigides, phase large au choix, SAT, pivots, sommeil.

// =============================================================================
// lib.rs - Library entry point
// =============================================================================
//
// GS.Rigid2D est un moteur physique 2D temps réel à corps rigides.
//
// CARACTÉRISTIQUES :
// - Cercles et polygones convexes, dynamiques ou statiques
// - Phase large au choix : quadtree, arbre d'AABB dynamique, sweep-and-prune
// - Phase étroite SAT avec clipping (un ou deux points de contact)
// - Impulsions séquentielles (restitution, frottement de Coulomb)
// - Articulations pivot stabilisées (Baumgarte)
// - Sommeil par îlots
// - Événements began / persisted / ended
//
// Repère : Y vers le haut, monde centré sur l'origine.
//
// UTILISATION BASIQUE :
// ```rust
// use gs_rigid2d::prelude::*;
//
// let mut world = World::new(2000.0, 2000.0, SpatialIndexType::DynamicTree);
//
// let ground = RigidBody::new_static(Shape::rectangle(2000.0, 20.0)?, vec2(0.0, -110.0));
// world.add_rigid_body(BodyId(0), ground)?;
//
// let ball = RigidBody::new_dynamic(Shape::circle(20.0), vec2(0.0, 200.0), 10.0)
//     .with_restitution(0.5);
// world.add_rigid_body(BodyId(1), ball)?;
//
// world.on_collision(|ev| println!("{} / {} : {:?}", ev.body_a, ev.body_b, ev.phase));
//
// // Boucle de simulation
// loop {
//     world.step(1.0 / 60.0)?;
//     // ... rendu ...
// }
// ```
//
// =============================================================================

// Déclaration des modules
pub mod gs_phy_vec2;
pub mod gs_phy_error;
pub mod gs_phy_config;
pub mod gs_phy_aabb;
pub mod gs_phy_shape;
pub mod gs_phy_types;
pub mod gs_phy_spatial_index;
pub mod gs_phy_quadtree;
pub mod gs_phy_dynamic_tree;
pub mod gs_phy_sweep_prune;
pub mod gs_phy_narrow_phase;
pub mod gs_phy_resolver;
pub mod gs_phy_constraint;
pub mod gs_phy_sleep;
pub mod gs_phy_events;
pub mod gs_phy_world;

// Ré-exportations pour un accès facile
// Permet d'écrire `use gs_rigid2d::World;` au lieu de
// `use gs_rigid2d::gs_phy_world::World;`

pub use gs_phy_vec2::{vec2, Mat2, Vec2};
pub use gs_phy_error::{PhyError, PhyResult};
pub use gs_phy_config::WorldConfig;
pub use gs_phy_aabb::Aabb;
pub use gs_phy_shape::{Polygon, Shape, ShapeKind};
pub use gs_phy_types::{BodyId, BodyPair, CollisionFilter, RigidBody, SleepState};
pub use gs_phy_spatial_index::{create_spatial_index, IndexProxy, SpatialIndex, SpatialIndexType};
pub use gs_phy_quadtree::Quadtree;
pub use gs_phy_dynamic_tree::DynamicTree;
pub use gs_phy_sweep_prune::SweepAndPrune;
pub use gs_phy_narrow_phase::{collide, collide_shapes, ContactPoint, Manifold, ShapeContact};
pub use gs_phy_constraint::{ConstraintId, PinJoint, PinTarget};
pub use gs_phy_events::{CollisionEvent, CollisionPhase, ListenerId, StepStats};
pub use gs_phy_world::{RayHit, World};

// =============================================================================
// Prélude - imports communs en une seule ligne
// =============================================================================
//
// Permet d'écrire :
// ```rust
// use gs_rigid2d::prelude::*;
// ```
// Pour importer tout ce qui est couramment utilisé.
//
// =============================================================================

pub mod prelude {
    pub use crate::gs_phy_vec2::{vec2, Vec2};
    pub use crate::gs_phy_error::{PhyError, PhyResult};
    pub use crate::gs_phy_config::WorldConfig;
    pub use crate::gs_phy_aabb::Aabb;
    pub use crate::gs_phy_shape::Shape;
    pub use crate::gs_phy_types::{BodyId, CollisionFilter, RigidBody};
    pub use crate::gs_phy_spatial_index::SpatialIndexType;
    pub use crate::gs_phy_constraint::{ConstraintId, PinJoint};
    pub use crate::gs_phy_events::{CollisionEvent, CollisionPhase};
    pub use crate::gs_phy_world::{RayHit, World};
}
