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
// 20261019 - Created (remplace la séparation par ratio de masses inverses).

// =============================================================================
// gs_phy_resolver.rs - Sequential impulse contact resolver
// =============================================================================
//
// Pour chaque point de contact :
//
//   r_a, r_b = point - centres
//   dv       = (v_b + w_b x r_b) - (v_a + w_a x r_a)
//   vn       = dv . n             (vn < 0 : les corps se rapprochent)
//
// IMPULSION NORMALE :
//   lambda   = -m_n * (vn - biais)
//   cumul    = max(cumul + lambda, 0)      (ne tire jamais les corps)
//
//   biais = max( -e * vn0                  si -vn0 > seuil de restitution,
//                beta/dt * max(pen - slop, 0) )
//
// IMPULSION TANGENTIELLE (frottement de Coulomb) :
//   cumul_t  = clamp(cumul_t + lambda_t, -mu * cumul_n, +mu * cumul_n)
//
// Les impulsions sont CUMULÉES et bornées sur le cumul (pas sur chaque
// correction), ce qui permet aux passes successives de revenir sur un
// excès sans jamais violer les bornes.
//
// COMBINAISON : e = min(e_a, e_b), mu = min(mu_a, mu_b) (pas d'énergie ajoutée).
// Un corps statique ou endormi a une masse inverse effective nulle.
//
// =============================================================================

use glam::Vec2;

use crate::gs_phy_config::WorldConfig;
use crate::gs_phy_narrow_phase::Manifold;
use crate::gs_phy_types::RigidBody;
use crate::gs_phy_vec2::{cross, cross_sv};

/// Deux références mutables distinctes dans une même tranche
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i == j || i >= items.len() || j >= items.len() {
        return None;
    }
    if i < j {
        let (left, right) = items.split_at_mut(j);
        Some((&mut left[i], &mut right[0]))
    } else {
        let (left, right) = items.split_at_mut(i);
        Some((&mut right[0], &mut left[j]))
    }
}

/// Combinaison des coefficients de restitution
#[inline]
pub fn mix_restitution(a: f32, b: f32) -> f32 {
    a.min(b)
}

/// Combinaison des coefficients de frottement
#[inline]
pub fn mix_friction(a: f32, b: f32) -> f32 {
    a.min(b)
}

#[derive(Clone, Copy, Debug)]
struct PointConstraint {
    r_a: Vec2,
    r_b: Vec2,
    normal_mass: f32,
    tangent_mass: f32,
    /// Vitesse normale visée
    bias: f32,
    normal_impulse: f32,
    tangent_impulse: f32,
}

#[derive(Clone, Debug)]
struct ContactConstraint {
    manifold: usize,
    index_a: usize,
    index_b: usize,
    normal: Vec2,
    tangent: Vec2,
    friction: f32,
    inv_mass_a: f32,
    inv_mass_b: f32,
    inv_inertia_a: f32,
    inv_inertia_b: f32,
    points: Vec<PointConstraint>,
}

/// Résolveur d'impulsions séquentielles pour un pas
#[derive(Clone, Debug, Default)]
pub struct ContactSolver {
    constraints: Vec<ContactConstraint>,
}

impl ContactSolver {
    /// Prépare les contraintes de contact.
    ///
    /// # Arguments
    /// * `bodies` - Corps du monde
    /// * `manifolds` - Manifolds du pas
    /// * `indices` - Indices (A, B) dans `bodies` pour chaque manifold
    /// * `dt` - Pas de temps
    /// * `config` - Réglages (Baumgarte, slop, seuil de restitution)
    pub fn new(
        bodies: &[RigidBody],
        manifolds: &[Manifold],
        indices: &[(usize, usize)],
        dt: f32,
        config: &WorldConfig,
    ) -> Self {
        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };
        let mut constraints = Vec::with_capacity(manifolds.len());

        for (m_idx, (manifold, &(ia, ib))) in manifolds.iter().zip(indices).enumerate() {
            let (Some(a), Some(b)) = (bodies.get(ia), bodies.get(ib)) else {
                continue;
            };

            let inv_mass_a = a.effective_inv_mass();
            let inv_mass_b = b.effective_inv_mass();
            let inv_inertia_a = a.effective_inv_inertia();
            let inv_inertia_b = b.effective_inv_inertia();
            // Deux ancres : rien à résoudre
            if inv_mass_a + inv_mass_b == 0.0 && inv_inertia_a + inv_inertia_b == 0.0 {
                continue;
            }

            let normal = manifold.normal;
            let tangent = Vec2::new(normal.y, -normal.x);
            let restitution = mix_restitution(a.restitution, b.restitution);
            let position_bias =
                config.baumgarte * inv_dt * (manifold.penetration - config.penetration_slop).max(0.0);

            let points = manifold
                .contacts
                .iter()
                .map(|cp| {
                    let r_a = cp.position - a.position;
                    let r_b = cp.position - b.position;

                    let rn_a = cross(r_a, normal);
                    let rn_b = cross(r_b, normal);
                    let k_normal = inv_mass_a
                        + inv_mass_b
                        + inv_inertia_a * rn_a * rn_a
                        + inv_inertia_b * rn_b * rn_b;

                    let rt_a = cross(r_a, tangent);
                    let rt_b = cross(r_b, tangent);
                    let k_tangent = inv_mass_a
                        + inv_mass_b
                        + inv_inertia_a * rt_a * rt_a
                        + inv_inertia_b * rt_b * rt_b;

                    let dv = b.velocity + cross_sv(b.angular_velocity, r_b)
                        - a.velocity
                        - cross_sv(a.angular_velocity, r_a);
                    let vn = dv.dot(normal);

                    let bounce = if -vn > config.restitution_threshold {
                        -restitution * vn
                    } else {
                        0.0
                    };

                    PointConstraint {
                        r_a,
                        r_b,
                        normal_mass: if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 },
                        tangent_mass: if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 },
                        bias: bounce.max(position_bias),
                        normal_impulse: 0.0,
                        tangent_impulse: 0.0,
                    }
                })
                .collect();

            constraints.push(ContactConstraint {
                manifold: m_idx,
                index_a: ia,
                index_b: ib,
                normal,
                tangent,
                friction: mix_friction(a.friction, b.friction),
                inv_mass_a,
                inv_mass_b,
                inv_inertia_a,
                inv_inertia_b,
                points,
            });
        }

        Self { constraints }
    }

    /// Nombre de manifolds effectivement résolus
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Une passe sur tous les contacts
    pub fn solve_velocities(&mut self, bodies: &mut [RigidBody]) {
        for c in &mut self.constraints {
            let Some((a, b)) = pair_mut(bodies, c.index_a, c.index_b) else {
                continue;
            };

            for p in &mut c.points {
                // --- Normale ---
                let dv = b.velocity + cross_sv(b.angular_velocity, p.r_b)
                    - a.velocity
                    - cross_sv(a.angular_velocity, p.r_a);
                let vn = dv.dot(c.normal);

                let lambda = -p.normal_mass * (vn - p.bias);
                let new_impulse = (p.normal_impulse + lambda).max(0.0);
                let lambda = new_impulse - p.normal_impulse;
                p.normal_impulse = new_impulse;

                let impulse = c.normal * lambda;
                a.velocity -= impulse * c.inv_mass_a;
                a.angular_velocity -= c.inv_inertia_a * cross(p.r_a, impulse);
                b.velocity += impulse * c.inv_mass_b;
                b.angular_velocity += c.inv_inertia_b * cross(p.r_b, impulse);

                // --- Frottement ---
                let dv = b.velocity + cross_sv(b.angular_velocity, p.r_b)
                    - a.velocity
                    - cross_sv(a.angular_velocity, p.r_a);
                let vt = dv.dot(c.tangent);

                let max_friction = c.friction * p.normal_impulse;
                let lambda = -p.tangent_mass * vt;
                let new_impulse = (p.tangent_impulse + lambda).clamp(-max_friction, max_friction);
                let lambda = new_impulse - p.tangent_impulse;
                p.tangent_impulse = new_impulse;

                let impulse = c.tangent * lambda;
                a.velocity -= impulse * c.inv_mass_a;
                a.angular_velocity -= c.inv_inertia_a * cross(p.r_a, impulse);
                b.velocity += impulse * c.inv_mass_b;
                b.angular_velocity += c.inv_inertia_b * cross(p.r_b, impulse);
            }
        }
    }

    /// Recopie les impulsions cumulées dans les manifolds (lecture par l'hôte)
    pub fn store_impulses(&self, manifolds: &mut [Manifold]) {
        for c in &self.constraints {
            let Some(m) = manifolds.get_mut(c.manifold) else {
                continue;
            };
            for (cp, p) in m.contacts.iter_mut().zip(&c.points) {
                cp.normal_impulse = p.normal_impulse;
                cp.tangent_impulse = p.tangent_impulse;
            }
        }
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================
