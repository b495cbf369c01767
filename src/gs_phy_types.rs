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
// 20261019 - Corps rigides à forme (cercle/polygone), filtres de collision, sommeil.

// =============================================================================
// gs_phy_types.rs - Core physics types
// =============================================================================
//
// Ce module définit les structures de données fondamentales :
// - BodyId          : identifiant choisi par l'hôte
// - BodyPair        : paire non ordonnée d'identifiants (clé de paire)
// - CollisionFilter : catégorie / masque / groupe
// - SleepState      : état de sommeil d'un corps
// - RigidBody       : corps rigide (forme + état physique)
//
// INVARIANT DES CORPS STATIQUES :
// Un corps statique a toujours inv_mass = inv_inertia = 0, et l'intégration
// ne modifie jamais sa position ni sa rotation.
//
// =============================================================================

use std::fmt;

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gs_phy_aabb::Aabb;
use crate::gs_phy_config::{DEFAULT_ANGULAR_SLEEP_THRESHOLD, DEFAULT_LINEAR_SLEEP_THRESHOLD};
use crate::gs_phy_error::{PhyError, PhyResult};
use crate::gs_phy_shape::Shape;

// =============================================================================
// Identifiants
// =============================================================================

/// Identifiant unique d'un corps, fourni par l'hôte
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for BodyId {
    fn from(v: u32) -> Self {
        BodyId(v)
    }
}

/// Paire non ordonnée de corps.
///
/// La clé est indépendante de l'ordre : `BodyPair::new(a, b) == BodyPair::new(b, a)`.
/// C'est ce qui garantit qu'une paire n'est rapportée qu'une seule fois.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyPair {
    pub a: BodyId,
    pub b: BodyId,
}

impl BodyPair {
    /// Crée la paire (le plus petit identifiant en premier)
    #[inline]
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// La paire contient-elle ce corps ?
    #[inline]
    pub fn contains(&self, id: BodyId) -> bool {
        self.a == id || self.b == id
    }
}

// =============================================================================
// CollisionFilter - Catégorie / masque / groupe
// =============================================================================
//
// Deux corps peuvent entrer en collision si le masque de chacun intersecte
// la catégorie de l'autre, SAUF si le groupe tranche :
// - même groupe positif : collision toujours
// - même groupe négatif : collision jamais
// - groupe nul ou différent : test catégorie / masque
//
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionFilter {
    /// Bits de catégorie du corps
    pub category: u32,
    /// Catégories avec lesquelles le corps accepte de collisionner
    pub mask: u32,
    /// Groupe (0 = aucun)
    pub group: i32,
}

impl CollisionFilter {
    pub const fn new(category: u32, mask: u32, group: i32) -> Self {
        Self { category, mask, group }
    }

    /// Règle de filtrage entre deux corps
    #[inline]
    pub fn should_collide(&self, other: &CollisionFilter) -> bool {
        if self.group != 0 && self.group == other.group {
            return self.group > 0;
        }
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category: 0x0001,
            mask: u32::MAX,
            group: 0,
        }
    }
}

// =============================================================================
// SleepState - État de sommeil
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SleepState {
    /// Le corps dort-il ?
    pub(crate) sleeping: bool,
    /// Temps passé sous les seuils de vitesse (secondes)
    pub(crate) rest_time: f32,
    /// Seuil de vitesse linéaire
    pub linear_threshold: f32,
    /// Seuil de vitesse angulaire
    pub angular_threshold: f32,
}

impl SleepState {
    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    #[inline]
    pub fn rest_time(&self) -> f32 {
        self.rest_time
    }
}

impl Default for SleepState {
    fn default() -> Self {
        Self {
            sleeping: false,
            rest_time: 0.0,
            linear_threshold: DEFAULT_LINEAR_SLEEP_THRESHOLD,
            angular_threshold: DEFAULT_ANGULAR_SLEEP_THRESHOLD,
        }
    }
}

// =============================================================================
// RigidBody - Corps rigide
// =============================================================================
//
// Intégration Euler semi-implicite (vitesse d'abord, position ensuite) :
//   v += (g + F/m) * dt
//   x += v * dt
//
// Le Verlet de la version particules ne convient plus : les impulsions du
// résolveur agissent directement sur la vitesse, qui doit donc être explicite.
//
// =============================================================================

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    /// Identifiant (attribué par `World::add_rigid_body`)
    pub(crate) id: BodyId,

    /// Forme de collision (changée via `World::set_shape`)
    pub(crate) shape: Shape,

    /// Position du centre de masse
    pub position: Vec2,
    /// Rotation (radians)
    pub rotation: f32,

    /// Vitesse linéaire
    pub velocity: Vec2,
    /// Vitesse angulaire (rad/s)
    pub angular_velocity: f32,

    /// Masse (0 pour un corps statique)
    pub(crate) mass: f32,
    /// Masse inverse (0 = masse infinie)
    pub(crate) inv_mass: f32,
    /// Moment d'inertie
    pub(crate) inertia: f32,
    /// Moment d'inertie inverse
    pub(crate) inv_inertia: f32,

    /// AABB serrée, recalculée à chaque pas
    pub(crate) aabb: Aabb,

    /// Coefficient de restitution (0 = mou, 1 = élastique)
    pub restitution: f32,
    /// Coefficient de frottement
    pub friction: f32,
    /// Amortissement linéaire (1/s)
    pub linear_damping: f32,
    /// Amortissement angulaire (1/s)
    pub angular_damping: f32,

    /// Filtre de collision
    pub collision_filter: CollisionFilter,

    /// Corps statique (immobile, masse infinie)
    pub(crate) is_static: bool,

    /// État de sommeil
    pub(crate) sleep: SleepState,

    /// Force accumulée jusqu'au prochain pas
    pub(crate) force: Vec2,
    /// Couple accumulé jusqu'au prochain pas
    pub(crate) torque: f32,
}

impl RigidBody {
    /// Crée un corps dynamique
    ///
    /// # Arguments
    /// * `shape` - Forme de collision
    /// * `position` - Position initiale du centre de masse
    /// * `mass` - Masse (doit être > 0, vérifiée à l'ajout dans le monde)
    pub fn new_dynamic(shape: Shape, position: Vec2, mass: f32) -> Self {
        let inertia = shape.inertia(mass);
        let mut body = Self::base(shape, position, false);
        body.mass = mass;
        body.inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        body.inertia = inertia;
        body.inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
        body
    }

    /// Crée un corps statique (sol, mur)
    pub fn new_static(shape: Shape, position: Vec2) -> Self {
        Self::base(shape, position, true)
    }

    fn base(shape: Shape, position: Vec2, is_static: bool) -> Self {
        let mut body = Self {
            id: BodyId(0),
            shape,
            position,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            aabb: Aabb::default(),
            restitution: 0.2,
            friction: 0.4,
            linear_damping: 0.0,
            angular_damping: 0.0,
            collision_filter: CollisionFilter::default(),
            is_static,
            sleep: SleepState::default(),
            force: Vec2::ZERO,
            torque: 0.0,
        };
        body.update_transform();
        body
    }

    // -------------------------------------------------------------------------
    // Constructeurs "builder"
    // -------------------------------------------------------------------------

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self.update_transform();
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.max(0.0);
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.collision_filter = filter;
        self
    }

    // -------------------------------------------------------------------------
    // Accesseurs
    // -------------------------------------------------------------------------

    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    #[inline]
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    #[inline]
    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.sleep.sleeping
    }

    #[inline]
    pub fn sleep_state(&self) -> &SleepState {
        &self.sleep
    }

    /// Seuils de mise au repos propres à ce corps
    pub fn set_sleep_thresholds(&mut self, linear: f32, angular: f32) {
        self.sleep.linear_threshold = linear.max(0.0);
        self.sleep.angular_threshold = angular.max(0.0);
    }

    /// Le corps participe-t-il activement à la simulation ?
    #[inline]
    pub fn is_awake_dynamic(&self) -> bool {
        !self.is_static && !self.sleep.sleeping
    }

    /// Masse inverse vue par les solveurs : nulle si statique ou endormi
    #[inline]
    pub fn effective_inv_mass(&self) -> f32 {
        if self.is_awake_dynamic() {
            self.inv_mass
        } else {
            0.0
        }
    }

    /// Inertie inverse vue par les solveurs
    #[inline]
    pub fn effective_inv_inertia(&self) -> f32 {
        if self.is_awake_dynamic() {
            self.inv_inertia
        } else {
            0.0
        }
    }

    /// Point local → monde
    #[inline]
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.rotation).rotate(local)
    }

    /// Vitesse d'un point monde solidaire du corps
    #[inline]
    pub fn velocity_at(&self, world_point: Vec2) -> Vec2 {
        let r = world_point - self.position;
        self.velocity + Vec2::new(-self.angular_velocity * r.y, self.angular_velocity * r.x)
    }

    // -------------------------------------------------------------------------
    // Forces et impulsions
    // -------------------------------------------------------------------------

    /// Ajoute une force (appliquée au prochain pas)
    pub fn apply_force(&mut self, force: Vec2) {
        if !self.is_static {
            self.force += force;
        }
    }

    /// Ajoute un couple (appliqué au prochain pas)
    pub fn apply_torque(&mut self, torque: f32) {
        if !self.is_static {
            self.torque += torque;
        }
    }

    /// Applique une impulsion en un point monde
    pub fn apply_impulse(&mut self, impulse: Vec2, world_point: Vec2) {
        let inv_m = self.effective_inv_mass();
        let inv_i = self.effective_inv_inertia();
        self.velocity += impulse * inv_m;
        let r = world_point - self.position;
        self.angular_velocity += inv_i * (r.x * impulse.y - r.y * impulse.x);
    }

    /// Recalcule le cache monde de la forme et l'AABB serrée
    pub fn update_transform(&mut self) {
        self.shape.update_transform(self.position, self.rotation);
        self.aabb = self.shape.aabb(self.position);
    }

    /// Remplace la forme et recalcule l'inertie (la masse est conservée)
    pub(crate) fn set_shape(&mut self, shape: Shape) -> PhyResult<()> {
        shape.validate()?;
        self.shape = shape;
        if !self.is_static {
            self.inertia = self.shape.inertia(self.mass);
            self.inv_inertia = if self.inertia > 0.0 { 1.0 / self.inertia } else { 0.0 };
        }
        self.update_transform();
        Ok(())
    }

    /// Vérifie la cohérence du corps avant son ajout dans le monde
    pub(crate) fn validate(&self) -> PhyResult<()> {
        self.shape.validate()?;
        if !self.is_static && (!self.mass.is_finite() || self.mass <= 0.0) {
            return Err(PhyError::InvalidMass(self.mass));
        }
        if !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(PhyError::InvalidShape("transformation non finie".into()));
        }
        Ok(())
    }

    /// Met le corps au repos (vitesses et accumulateurs à zéro)
    pub(crate) fn put_to_sleep(&mut self) {
        self.sleep.sleeping = true;
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// Réveille le corps
    pub(crate) fn wake(&mut self) {
        self.sleep.sleeping = false;
        self.sleep.rest_time = 0.0;
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_pair_is_order_independent() {
        let p1 = BodyPair::new(BodyId(5), BodyId(2));
        let p2 = BodyPair::new(BodyId(2), BodyId(5));
        assert_eq!(p1, p2);
        assert_eq!(p1.a, BodyId(2));
        assert!(p1.contains(BodyId(5)));
        assert!(!p1.contains(BodyId(3)));
    }

    #[test]
    fn test_filter_category_mask() {
        let a = CollisionFilter::new(0b01, 0b10, 0);
        let b = CollisionFilter::new(0b10, 0b01, 0);
        let c = CollisionFilter::new(0b10, 0b10, 0);
        assert!(a.should_collide(&b));
        assert!(b.should_collide(&a));
        // c accepte b mais pas a
        assert!(!a.should_collide(&c));
    }

    #[test]
    fn test_filter_group_override() {
        // Catégories incompatibles, mais même groupe positif
        let a = CollisionFilter::new(0b01, 0, 3);
        let b = CollisionFilter::new(0b10, 0, 3);
        assert!(a.should_collide(&b));

        // Catégories compatibles, mais même groupe négatif
        let c = CollisionFilter::new(0b01, u32::MAX, -2);
        let d = CollisionFilter::new(0b01, u32::MAX, -2);
        assert!(!c.should_collide(&d));

        // Groupes différents : retour au test catégorie / masque
        let e = CollisionFilter::new(0b01, u32::MAX, -2);
        let f = CollisionFilter::new(0b01, u32::MAX, -3);
        assert!(e.should_collide(&f));
    }

    #[test]
    fn test_dynamic_body_mass() {
        let body = RigidBody::new_dynamic(Shape::circle(2.0), Vec2::ZERO, 4.0);
        assert!((body.inv_mass() - 0.25).abs() < 1e-6);
        assert!((body.inertia() - 8.0).abs() < 1e-5);
        assert!(!body.is_static());
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_static_body_has_infinite_mass() {
        let body = RigidBody::new_static(Shape::circle(2.0), Vec2::ZERO);
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(body.inv_inertia(), 0.0);
        assert_eq!(body.effective_inv_mass(), 0.0);
    }

    #[test]
    fn test_invalid_mass_rejected() {
        let body = RigidBody::new_dynamic(Shape::circle(1.0), Vec2::ZERO, 0.0);
        assert_eq!(body.validate(), Err(PhyError::InvalidMass(0.0)));
    }

    #[test]
    fn test_sleeping_body_is_anchor() {
        let mut body = RigidBody::new_dynamic(Shape::circle(1.0), Vec2::ZERO, 1.0)
            .with_velocity(Vec2::new(3.0, 0.0));
        body.put_to_sleep();
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.effective_inv_mass(), 0.0);
        body.wake();
        assert_eq!(body.effective_inv_mass(), 1.0);
    }

    #[test]
    fn test_apply_impulse_off_center_spins() {
        let mut body = RigidBody::new_dynamic(Shape::circle(1.0), Vec2::ZERO, 1.0);
        body.apply_impulse(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
        assert!(body.velocity.y > 0.0);
        assert!(body.angular_velocity > 0.0);
    }

    #[test]
    fn test_set_shape_recomputes_inertia() {
        let mut body = RigidBody::new_dynamic(Shape::circle(2.0), Vec2::ZERO, 1.0);
        assert_eq!(body.inertia(), 2.0);
        body.set_shape(Shape::circle(4.0)).unwrap();
        assert_eq!(body.mass(), 1.0);
        assert_eq!(body.inertia(), 8.0);
        assert_eq!(body.inv_inertia(), 0.125);
        assert_eq!(body.aabb().max, Vec2::new(4.0, 4.0));

        // Une forme invalide est refusée et l'ancienne reste en place
        assert!(matches!(
            body.set_shape(Shape::circle(-5.0)),
            Err(PhyError::InvalidShape(_))
        ));
        assert_eq!(body.shape(), &Shape::circle(4.0));
        assert_eq!(body.inertia(), 8.0);
    }

    #[test]
    fn test_aabb_follows_position() {
        let body = RigidBody::new_dynamic(Shape::circle(2.0), Vec2::new(10.0, 0.0), 1.0);
        assert_eq!(body.aabb().min, Vec2::new(8.0, -2.0));
        assert_eq!(body.aabb().max, Vec2::new(12.0, 2.0));
    }
}
