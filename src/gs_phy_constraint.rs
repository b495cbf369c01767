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
// 20260126 - Rust port created (contraintes de distance entre particules).
// 20261019 - Articulations pivot entre corps rigides, stabilisation de Baumgarte.

// =============================================================================
// gs_phy_constraint.rs - Pin joints
// =============================================================================
//
// Une articulation pivot (pin joint) force deux points à coïncider :
// - un point local du corps A et un point local du corps B
// - ou un point local du corps A et un point FIXE du monde
//
// ERREUR DE POSITION :
//   C = ancre_A - ancre_B           (nulle quand la contrainte est satisfaite)
//
// ERREUR DE VITESSE :
//   Cdot = (v_A + w_A x r_A) - (v_B + w_B x r_B)
//
// IMPULSION (deux degrés de liberté en translation) :
//   lambda = -K^-1 * (Cdot + beta/dt * C)
//   A reçoit +lambda, B reçoit -lambda
//
// avec la matrice de masse effective 2x2 :
//
//   K = (m_A + m_B) I
//     + i_A [ rAy²     -rAx rAy ]  + i_B [ rBy²     -rBx rBy ]
//           [ -rAx rAy  rAx²    ]        [ -rBx rBy  rBx²    ]
//
// Le terme beta/dt * C (Baumgarte) corrige la dérive progressivement :
// une correction totale en un pas ferait trembler la chaîne.
//
// =============================================================================

use std::fmt;

use glam::{Mat2, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gs_phy_config::WorldConfig;
use crate::gs_phy_error::{PhyError, PhyResult};
use crate::gs_phy_resolver::pair_mut;
use crate::gs_phy_types::{BodyId, RigidBody};
use crate::gs_phy_vec2::{cross, cross_sv, rotate};

/// Identifiant de contrainte, attribué par le monde
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstraintId(pub u32);

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Seconde extrémité d'une articulation
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PinTarget {
    /// Point local d'un second corps
    Body { body: BodyId, local_anchor: Vec2 },
    /// Point fixe du monde
    World(Vec2),
}

/// Articulation pivot
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinJoint {
    pub body_a: BodyId,
    /// Ancre dans le repère local de A
    pub local_anchor_a: Vec2,
    pub target: PinTarget,
    /// Les deux corps reliés peuvent-ils entrer en collision ?
    pub collide_connected: bool,
}

impl PinJoint {
    /// Articulation entre deux corps
    pub fn between(body_a: BodyId, local_anchor_a: Vec2, body_b: BodyId, local_anchor_b: Vec2) -> Self {
        Self {
            body_a,
            local_anchor_a,
            target: PinTarget::Body {
                body: body_b,
                local_anchor: local_anchor_b,
            },
            collide_connected: false,
        }
    }

    /// Articulation d'un corps sur un point fixe du monde
    pub fn to_world(body: BodyId, local_anchor: Vec2, world_anchor: Vec2) -> Self {
        Self {
            body_a: body,
            local_anchor_a: local_anchor,
            target: PinTarget::World(world_anchor),
            collide_connected: false,
        }
    }

    pub fn with_collide_connected(mut self, collide: bool) -> Self {
        self.collide_connected = collide;
        self
    }

    /// Second corps, s'il y en a un
    #[inline]
    pub fn body_b(&self) -> Option<BodyId> {
        match self.target {
            PinTarget::Body { body, .. } => Some(body),
            PinTarget::World(_) => None,
        }
    }

    /// L'articulation référence-t-elle ce corps ?
    #[inline]
    pub fn references(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b() == Some(id)
    }

    /// Vérifie la forme de l'articulation
    pub(crate) fn validate(&self) -> PhyResult<()> {
        if self.body_b() == Some(self.body_a) {
            return Err(PhyError::InvalidConstraint(format!(
                "le corps {} est relié à lui-même",
                self.body_a
            )));
        }
        let anchors_finite = self.local_anchor_a.is_finite()
            && match self.target {
                PinTarget::Body { local_anchor, .. } => local_anchor.is_finite(),
                PinTarget::World(p) => p.is_finite(),
            };
        if !anchors_finite {
            return Err(PhyError::InvalidConstraint("ancre non finie".into()));
        }
        Ok(())
    }

    /// Ancres monde (A, B)
    pub fn world_anchors(&self, a: &RigidBody, b: Option<&RigidBody>) -> (Vec2, Vec2) {
        let anchor_a = a.position + rotate(self.local_anchor_a, a.rotation);
        let anchor_b = match (self.target, b) {
            (PinTarget::Body { local_anchor, .. }, Some(b)) => {
                b.position + rotate(local_anchor, b.rotation)
            }
            (PinTarget::World(p), _) => p,
            // Corps B absent : on considère la contrainte satisfaite
            (PinTarget::Body { .. }, None) => anchor_a,
        };
        (anchor_a, anchor_b)
    }

    /// Erreur de position C = ancre_A - ancre_B
    pub fn position_error(&self, a: &RigidBody, b: Option<&RigidBody>) -> Vec2 {
        let (pa, pb) = self.world_anchors(a, b);
        pa - pb
    }
}

// =============================================================================
// Solveur
// =============================================================================

#[derive(Clone, Debug)]
struct JointConstraint {
    index_a: usize,
    index_b: Option<usize>,
    r_a: Vec2,
    r_b: Vec2,
    inv_mass_a: f32,
    inv_mass_b: f32,
    inv_inertia_a: f32,
    inv_inertia_b: f32,
    /// K^-1
    mass: Mat2,
    /// beta/dt * C
    bias: Vec2,
    impulse: Vec2,
}

/// Solveur d'articulations pour un pas
#[derive(Clone, Debug, Default)]
pub struct ConstraintSolver {
    joints: Vec<JointConstraint>,
}

impl ConstraintSolver {
    /// Prépare les articulations.
    ///
    /// # Arguments
    /// * `bodies` - Corps du monde
    /// * `joints` - Articulations avec les indices (A, B) de leurs corps
    /// * `dt` - Pas de temps
    /// * `config` - Réglages (coefficient de Baumgarte)
    pub fn new(
        bodies: &[RigidBody],
        joints: &[(PinJoint, usize, Option<usize>)],
        dt: f32,
        config: &WorldConfig,
    ) -> Self {
        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };
        let mut prepared = Vec::with_capacity(joints.len());

        for &(joint, ia, ib) in joints {
            let Some(a) = bodies.get(ia) else {
                continue;
            };
            let b = ib.and_then(|i| bodies.get(i));

            let inv_mass_a = a.effective_inv_mass();
            let inv_inertia_a = a.effective_inv_inertia();
            let (inv_mass_b, inv_inertia_b) =
                b.map_or((0.0, 0.0), |b| (b.effective_inv_mass(), b.effective_inv_inertia()));
            if inv_mass_a + inv_mass_b == 0.0 && inv_inertia_a + inv_inertia_b == 0.0 {
                continue;
            }

            let (anchor_a, anchor_b) = joint.world_anchors(a, b);
            let r_a = anchor_a - a.position;
            let r_b = b.map_or(Vec2::ZERO, |b| anchor_b - b.position);

            let m = inv_mass_a + inv_mass_b;
            let k11 = m + inv_inertia_a * r_a.y * r_a.y + inv_inertia_b * r_b.y * r_b.y;
            let k12 = -inv_inertia_a * r_a.x * r_a.y - inv_inertia_b * r_b.x * r_b.y;
            let k22 = m + inv_inertia_a * r_a.x * r_a.x + inv_inertia_b * r_b.x * r_b.x;
            let k = Mat2::from_cols(Vec2::new(k11, k12), Vec2::new(k12, k22));

            // Matrice singulière (ne devrait pas arriver avec une masse > 0)
            let mass = if k.determinant().abs() > f32::EPSILON {
                k.inverse()
            } else {
                Mat2::ZERO
            };

            prepared.push(JointConstraint {
                index_a: ia,
                index_b: ib,
                r_a,
                r_b,
                inv_mass_a,
                inv_mass_b,
                inv_inertia_a,
                inv_inertia_b,
                mass,
                bias: (anchor_a - anchor_b) * (config.baumgarte * inv_dt),
                impulse: Vec2::ZERO,
            });
        }

        Self { joints: prepared }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Une passe sur toutes les articulations
    pub fn solve_velocities(&mut self, bodies: &mut [RigidBody]) {
        for j in &mut self.joints {
            match j.index_b {
                Some(ib) => {
                    let Some((a, b)) = pair_mut(bodies, j.index_a, ib) else {
                        continue;
                    };
                    let cdot = a.velocity + cross_sv(a.angular_velocity, j.r_a)
                        - b.velocity
                        - cross_sv(b.angular_velocity, j.r_b);
                    let lambda = -(j.mass * (cdot + j.bias));
                    j.impulse += lambda;

                    a.velocity += lambda * j.inv_mass_a;
                    a.angular_velocity += j.inv_inertia_a * cross(j.r_a, lambda);
                    b.velocity -= lambda * j.inv_mass_b;
                    b.angular_velocity -= j.inv_inertia_b * cross(j.r_b, lambda);
                }
                None => {
                    let Some(a) = bodies.get_mut(j.index_a) else {
                        continue;
                    };
                    let cdot = a.velocity + cross_sv(a.angular_velocity, j.r_a);
                    let lambda = -(j.mass * (cdot + j.bias));
                    j.impulse += lambda;

                    a.velocity += lambda * j.inv_mass_a;
                    a.angular_velocity += j.inv_inertia_a * cross(j.r_a, lambda);
                }
            }
        }
    }

    /// Impulsion totale appliquée par articulation (ordre de préparation)
    pub fn impulses(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.joints.iter().map(|j| j.impulse)
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gs_phy_shape::Shape;

    fn ball(x: f32, y: f32) -> RigidBody {
        RigidBody::new_dynamic(Shape::circle(5.0), Vec2::new(x, y), 1.0)
    }

    #[test]
    fn test_constraint_id_display() {
        assert_eq!(ConstraintId(3).to_string(), "c3");
    }

    #[test]
    fn test_joint_references_and_validation() {
        let j = PinJoint::between(BodyId(1), Vec2::ZERO, BodyId(2), Vec2::ZERO);
        assert!(j.references(BodyId(1)));
        assert!(j.references(BodyId(2)));
        assert!(!j.references(BodyId(3)));
        assert!(j.validate().is_ok());
        assert!(!j.collide_connected);

        let w = PinJoint::to_world(BodyId(1), Vec2::ZERO, Vec2::new(0.0, 100.0));
        assert_eq!(w.body_b(), None);

        let bad = PinJoint::between(BodyId(4), Vec2::ZERO, BodyId(4), Vec2::X);
        assert!(matches!(bad.validate(), Err(PhyError::InvalidConstraint(_))));
    }

    #[test]
    fn test_position_error_zero_when_satisfied() {
        let a = ball(0.0, 0.0);
        let b = ball(30.0, 0.0);
        let j = PinJoint::between(BodyId(1), Vec2::new(15.0, 0.0), BodyId(2), Vec2::new(-15.0, 0.0));
        assert!(j.position_error(&a, Some(&b)).length() < 1e-5);

        let b = ball(32.0, 1.0);
        let err = j.position_error(&a, Some(&b));
        assert!((err - Vec2::new(-2.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_solver_removes_relative_anchor_velocity() {
        let a = ball(0.0, 0.0).with_velocity(Vec2::new(0.0, -50.0));
        let b = ball(30.0, 0.0).with_velocity(Vec2::new(0.0, 50.0));
        let mut bodies = vec![a, b];
        let joint = PinJoint::between(BodyId(1), Vec2::new(15.0, 0.0), BodyId(2), Vec2::new(-15.0, 0.0));
        let cfg = WorldConfig::default();
        let mut solver = ConstraintSolver::new(&bodies, &[(joint, 0, Some(1))], 1.0 / 60.0, &cfg);
        solver.solve_velocities(&mut bodies);

        let (a, b) = (&bodies[0], &bodies[1]);
        let va = a.velocity_at(a.position + Vec2::new(15.0, 0.0));
        let vb = b.velocity_at(b.position + Vec2::new(-15.0, 0.0));
        assert!((va - vb).length() < 1e-3);
        // Quantité de mouvement conservée
        assert!((a.velocity + b.velocity).length() < 1e-3);
    }

    #[test]
    fn test_world_pin_holds_body() {
        let mut bodies = vec![ball(0.0, -30.0).with_velocity(Vec2::new(0.0, -100.0))];
        let joint = PinJoint::to_world(BodyId(1), Vec2::new(0.0, 30.0), Vec2::ZERO);
        let cfg = WorldConfig::default();
        let mut solver = ConstraintSolver::new(&bodies, &[(joint, 0, None)], 1.0 / 60.0, &cfg);
        for _ in 0..cfg.constraint_iterations {
            solver.solve_velocities(&mut bodies);
        }
        let anchor_velocity = bodies[0].velocity_at(Vec2::ZERO);
        assert!(anchor_velocity.length() < 1e-2);
    }

    #[test]
    fn test_static_pair_is_skipped() {
        let a = RigidBody::new_static(Shape::circle(1.0), Vec2::ZERO);
        let b = RigidBody::new_static(Shape::circle(1.0), Vec2::X);
        let joint = PinJoint::between(BodyId(1), Vec2::ZERO, BodyId(2), Vec2::ZERO);
        let solver = ConstraintSolver::new(&[a, b], &[(joint, 0, Some(1))], 1.0 / 60.0, &WorldConfig::default());
        assert!(solver.is_empty());
    }
}
