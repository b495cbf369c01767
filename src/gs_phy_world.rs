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
// 20261019 - Rigid body world : broad phase pluggable, SAT, impulsions,
//            pivots, îlots endormis, événements.

// =============================================================================
// gs_phy_world.rs - Main physics engine
// =============================================================================
//
// Ce module est le cœur du moteur physique. Il gère :
// - Les corps rigides (cercles et polygones convexes, dynamiques ou statiques)
// - Les articulations pivot
// - L'index spatial (une seule stratégie active, échangeable à chaud)
// - Le sommeil par îlots
// - Les événements de collision
//
// PIPELINE DE SIMULATION (méthode step()) :
//  1. Gravité + forces accumulées (corps dynamiques éveillés)
//  2. Intégration des vitesses (amortissement compris)
//  3. Mise à jour des AABB dans l'index spatial
//  4. Paires candidates (phase large)
//  5. Filtrage (statique/statique, filtre de collision, corps articulés)
//  6. Phase étroite SAT -> manifolds
//  7. Articulations PUIS contacts (impulsions séquentielles)
//  8. Intégration des positions et rotations
//  9. Sommeil (repos, îlots)
// 10. Statistiques + événements began / persisted / ended
//
// PROPRIÉTÉ :
// Le monde est le seul propriétaire des corps. L'index et les articulations
// ne gardent que des identifiants.
//
// =============================================================================

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::Vec2;
use log::{debug, trace};

use crate::gs_phy_aabb::Aabb;
use crate::gs_phy_config::WorldConfig;
use crate::gs_phy_constraint::{ConstraintId, ConstraintSolver, PinJoint};
use crate::gs_phy_error::{PhyError, PhyResult};
use crate::gs_phy_events::{
    diff_contacts, CollisionEvent, CollisionListeners, ListenerId, StepStats,
};
use crate::gs_phy_narrow_phase::{collide, Manifold};
use crate::gs_phy_resolver::ContactSolver;
use crate::gs_phy_shape::Shape;
use crate::gs_phy_sleep::SleepManager;
use crate::gs_phy_spatial_index::{
    create_spatial_index, IndexProxy, SpatialIndex, SpatialIndexType,
};
use crate::gs_phy_types::{BodyId, BodyPair, RigidBody};

/// Résultat d'un lancer de rayon
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub body: BodyId,
    /// Point d'entrée (monde)
    pub point: Vec2,
    /// Normale sortante au point d'entrée
    pub normal: Vec2,
    /// Position sur le segment, dans [0, 1]
    pub fraction: f32,
}

#[inline]
fn proxy_of(body: &RigidBody) -> IndexProxy {
    IndexProxy {
        id: body.id(),
        aabb: body.aabb(),
        velocity: body.velocity,
        is_static: body.is_static(),
    }
}

// =============================================================================
// World - Monde physique
// =============================================================================

const INITIAL_CAPACITY: usize = 256;

pub struct World {
    // Corps rigides (stockage dense) + table id -> indice
    bodies: Vec<RigidBody>,
    index_of: HashMap<BodyId, usize>,

    // Articulations, dans l'ordre d'ajout
    constraints: Vec<(ConstraintId, PinJoint)>,
    next_constraint_id: u32,

    // Phase large
    index: Box<dyn SpatialIndex>,

    // Corps modifiés par l'hôte depuis le dernier pas
    dirty: HashSet<BodyId>,

    // Sommeil
    sleep: SleepManager,

    // Contacts du dernier pas, par paire
    contacts: BTreeMap<BodyPair, Manifold>,

    // Événements et statistiques
    events: Vec<CollisionEvent>,
    listeners: CollisionListeners,
    stats: StepStats,
    frame: u64,

    // Paramètres du monde
    config: WorldConfig,
    world_width: f32,
    world_height: f32,
}

impl World {
    /// Crée un monde vide centré sur l'origine
    ///
    /// # Arguments
    /// * `width`, `height` - Étendue du monde (sert au quadtree)
    /// * `index_type` - Stratégie de phase large
    pub fn new(width: f32, height: f32, index_type: SpatialIndexType) -> Self {
        Self::with_config(width, height, index_type, WorldConfig::default())
    }

    /// Crée un monde avec des réglages explicites
    pub fn with_config(
        width: f32,
        height: f32,
        index_type: SpatialIndexType,
        config: WorldConfig,
    ) -> Self {
        let bounds = Self::bounds_for(width, height);
        Self {
            bodies: Vec::with_capacity(INITIAL_CAPACITY),
            index_of: HashMap::with_capacity(INITIAL_CAPACITY),
            constraints: Vec::with_capacity(64),
            next_constraint_id: 0,
            index: create_spatial_index(index_type, bounds, &config),
            dirty: HashSet::new(),
            sleep: SleepManager::new(),
            contacts: BTreeMap::new(),
            events: Vec::new(),
            listeners: CollisionListeners::new(),
            stats: StepStats::default(),
            frame: 0,
            config,
            world_width: width,
            world_height: height,
        }
    }

    fn bounds_for(width: f32, height: f32) -> Aabb {
        Aabb::from_center(Vec2::ZERO, Vec2::new(width.abs(), height.abs()) * 0.5)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Change de stratégie de phase large (reconstruction complète, O(n))
    pub fn set_spatial_index_type(&mut self, index_type: SpatialIndexType) {
        if index_type == self.index.kind() {
            return;
        }
        let bounds = Self::bounds_for(self.world_width, self.world_height);
        let mut index = create_spatial_index(index_type, bounds, &self.config);
        for body in &self.bodies {
            index.insert(proxy_of(body));
        }
        debug!(
            "index spatial : {} -> {} ({} corps)",
            self.index.kind(),
            index_type,
            self.bodies.len()
        );
        self.index = index;
    }

    /// Définit la gravité
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    /// Active ou coupe le sommeil. Couper le sommeil réveille tout le monde.
    pub fn set_sleeping_enabled(&mut self, enabled: bool) {
        self.config.sleeping_enabled = enabled;
        if !enabled {
            self.sleep.wake_all(&mut self.bodies);
        }
    }

    // =========================================================================
    // Ajout / retrait
    // =========================================================================

    /// Ajoute un corps sous l'identifiant donné
    pub fn add_rigid_body(&mut self, id: BodyId, mut body: RigidBody) -> PhyResult<()> {
        if self.index_of.contains_key(&id) {
            return Err(PhyError::DuplicateBodyId(id));
        }
        body.validate()?;

        body.id = id;
        if body.is_static() {
            body.velocity = Vec2::ZERO;
            body.angular_velocity = 0.0;
        }
        body.update_transform();

        self.index.insert(proxy_of(&body));
        self.index_of.insert(id, self.bodies.len());
        debug!(
            "corps {id} ajouté ({:?}, {})",
            body.shape.kind(),
            if body.is_static() { "statique" } else { "dynamique" }
        );
        self.bodies.push(body);
        Ok(())
    }

    /// Retire un corps. Échoue si une articulation le référence encore.
    pub fn remove_rigid_body(&mut self, id: BodyId) -> PhyResult<RigidBody> {
        let idx = *self.index_of.get(&id).ok_or(PhyError::UnknownBodyId(id))?;
        if let Some((cid, _)) = self.constraints.iter().find(|(_, j)| j.references(id)) {
            return Err(PhyError::ConstraintReferencesRemovedBody {
                body: id,
                constraint: *cid,
            });
        }

        // Ce qui reposait dessus doit pouvoir tomber
        self.wake_touching(id);
        self.wake_island_of(id);

        self.index.remove(id);
        self.sleep.detach(id);
        self.dirty.remove(&id);
        self.contacts.retain(|pair, _| !pair.contains(id));

        self.index_of.remove(&id);
        let body = self.bodies.swap_remove(idx);
        if let Some(moved) = self.bodies.get(idx) {
            self.index_of.insert(moved.id(), idx);
        }
        debug!("corps {id} retiré");
        Ok(body)
    }

    /// Ajoute une articulation
    pub fn add_constraint(&mut self, joint: PinJoint) -> PhyResult<ConstraintId> {
        joint.validate()?;
        for body in std::iter::once(joint.body_a).chain(joint.body_b()) {
            if !self.index_of.contains_key(&body) {
                return Err(PhyError::UnknownBodyId(body));
            }
        }

        let id = ConstraintId(self.next_constraint_id);
        self.next_constraint_id = self.next_constraint_id.wrapping_add(1);
        self.constraints.push((id, joint));

        self.wake_island_of(joint.body_a);
        if let Some(b) = joint.body_b() {
            self.wake_island_of(b);
        }
        debug!("articulation {id} ajoutée sur {}", joint.body_a);
        Ok(id)
    }

    /// Retire une articulation
    pub fn remove_constraint(&mut self, id: ConstraintId) -> PhyResult<PinJoint> {
        let pos = self
            .constraints
            .iter()
            .position(|(cid, _)| *cid == id)
            .ok_or(PhyError::UnknownConstraintId(id))?;
        let (_, joint) = self.constraints.remove(pos);

        self.wake_island_of(joint.body_a);
        if let Some(b) = joint.body_b() {
            self.wake_island_of(b);
        }
        debug!("articulation {id} retirée");
        Ok(joint)
    }

    /// Vide le monde (les écouteurs et le compteur de frames sont conservés)
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.index_of.clear();
        self.constraints.clear();
        self.index.clear();
        self.dirty.clear();
        self.sleep.clear();
        self.contacts.clear();
        self.events.clear();
        self.stats = StepStats::default();
    }

    // =========================================================================
    // Forces et sommeil
    // =========================================================================

    fn body_index(&self, id: BodyId) -> PhyResult<usize> {
        self.index_of
            .get(&id)
            .copied()
            .ok_or(PhyError::UnknownBodyId(id))
    }

    fn wake_island_of(&mut self, id: BodyId) -> usize {
        self.sleep.wake_island(&mut self.bodies, &self.index_of, id)
    }

    /// Réveille les îlots en contact avec ce corps
    fn wake_touching(&mut self, id: BodyId) {
        let partners: Vec<BodyId> = self
            .contacts
            .keys()
            .filter(|pair| pair.contains(id))
            .map(|pair| if pair.a == id { pair.b } else { pair.a })
            .collect();
        for other in partners {
            self.wake_island_of(other);
        }
    }

    /// Ajoute une force, appliquée au prochain pas
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) -> PhyResult<()> {
        let idx = self.body_index(id)?;
        self.wake_island_of(id);
        self.bodies[idx].apply_force(force);
        Ok(())
    }

    /// Ajoute un couple, appliqué au prochain pas
    pub fn apply_torque(&mut self, id: BodyId, torque: f32) -> PhyResult<()> {
        let idx = self.body_index(id)?;
        self.wake_island_of(id);
        self.bodies[idx].apply_torque(torque);
        Ok(())
    }

    /// Applique une impulsion immédiate en un point monde
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2, world_point: Vec2) -> PhyResult<()> {
        let idx = self.body_index(id)?;
        self.wake_island_of(id);
        self.bodies[idx].apply_impulse(impulse, world_point);
        Ok(())
    }

    /// Remplace la forme d'un corps. La forme est validée et l'inertie
    /// recalculée, la masse est conservée.
    pub fn set_shape(&mut self, id: BodyId, shape: Shape) -> PhyResult<()> {
        let idx = self.body_index(id)?;
        self.bodies[idx].set_shape(shape)?;

        self.wake_touching(id);
        self.wake_island_of(id);
        self.index.update(proxy_of(&self.bodies[idx]));
        self.dirty.insert(id);
        debug!("corps {id} : nouvelle forme {:?}", self.bodies[idx].shape.kind());
        Ok(())
    }

    /// Réveille le corps et tout son îlot
    pub fn wake_body(&mut self, id: BodyId) -> PhyResult<()> {
        self.body_index(id)?;
        self.wake_island_of(id);
        Ok(())
    }

    /// Force l'état de sommeil d'un corps (sans effet sur un corps statique)
    pub fn set_sleeping(&mut self, id: BodyId, sleeping: bool) -> PhyResult<()> {
        let idx = self.body_index(id)?;
        if sleeping {
            if !self.bodies[idx].is_static() {
                self.bodies[idx].put_to_sleep();
            }
        } else {
            self.wake_island_of(id);
        }
        Ok(())
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Avance la simulation d'un pas de temps
    pub fn step(&mut self, dt: f32) -> PhyResult<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhyError::DegenerateStep(dt));
        }

        // 1-2. Forces et vitesses
        self.integrate_velocities(dt);

        // 3. Index spatial
        let touched = std::mem::take(&mut self.dirty);
        self.refresh_index(&touched);

        // 4-6. Phase large, filtrage, phase étroite
        let candidates = self.index.retrieve_candidates();
        let (mut current, filtered) = self.find_contacts(&candidates, &touched);

        // 7. Articulations puis contacts
        self.solve(&mut current, dt);

        // 8. Positions
        self.integrate_positions(dt);

        // 9. Sommeil
        let mut links: Vec<(usize, usize)> = current
            .keys()
            .filter_map(|pair| Some((*self.index_of.get(&pair.a)?, *self.index_of.get(&pair.b)?)))
            .collect();
        for (_, joint) in &self.constraints {
            if let (Some(&ia), Some(&ib)) = (
                self.index_of.get(&joint.body_a),
                joint.body_b().and_then(|b| self.index_of.get(&b)),
            ) {
                links.push((ia, ib));
            }
        }
        let report = self.sleep.update(&mut self.bodies, &links, dt, &self.config);

        // 10. Statistiques et événements
        let sleeping_bodies = self.bodies.iter().filter(|b| b.is_sleeping()).count();
        let dynamic_bodies = self.bodies.iter().filter(|b| !b.is_static()).count();
        self.stats = StepStats {
            candidate_pairs: candidates.len(),
            filtered_pairs: filtered,
            manifolds: current.len(),
            contact_points: current.values().map(|m| m.contacts.len()).sum(),
            awake_bodies: dynamic_bodies - sleeping_bodies,
            sleeping_bodies,
            islands: report.islands,
        };

        let events = diff_contacts(&self.contacts, &current);
        self.contacts = current;
        self.listeners.dispatch(&events);
        self.events = events;
        self.frame += 1;

        trace!("frame {} : {:?}", self.frame, self.stats);
        Ok(())
    }

    /// Gravité, forces accumulées et amortissement
    fn integrate_velocities(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        for body in self.bodies.iter_mut() {
            if body.is_awake_dynamic() {
                body.velocity += (gravity + body.force * body.inv_mass) * dt;
                body.angular_velocity += body.torque * body.inv_inertia * dt;

                body.velocity *= 1.0 / (1.0 + dt * body.linear_damping);
                body.angular_velocity *= 1.0 / (1.0 + dt * body.angular_damping);
            }
            body.force = Vec2::ZERO;
            body.torque = 0.0;
        }
    }

    /// Recalcule les AABB des corps qui ont pu bouger
    fn refresh_index(&mut self, touched: &HashSet<BodyId>) {
        for body in self.bodies.iter_mut() {
            if body.is_awake_dynamic() || touched.contains(&body.id()) {
                body.update_transform();
                self.index.update(proxy_of(body));
            }
        }
    }

    /// Paires articulées qui ne doivent pas se toucher
    fn jointed_pairs(&self) -> HashSet<BodyPair> {
        self.constraints
            .iter()
            .filter(|(_, j)| !j.collide_connected)
            .filter_map(|(_, j)| j.body_b().map(|b| BodyPair::new(j.body_a, b)))
            .collect()
    }

    /// Filtrage + phase étroite.
    ///
    /// Une paire sans corps dynamique éveillé garde son manifold précédent,
    /// sauf si l'hôte a modifié l'un des deux corps (`touched`).
    fn find_contacts(
        &mut self,
        candidates: &[BodyPair],
        touched: &HashSet<BodyId>,
    ) -> (BTreeMap<BodyPair, Manifold>, usize) {
        let jointed = self.jointed_pairs();
        let mut current = BTreeMap::new();
        let mut carried = Vec::new();
        let mut disturbed = Vec::new();
        let mut filtered = 0;

        for &pair in candidates {
            let (Some(&ia), Some(&ib)) = (self.index_of.get(&pair.a), self.index_of.get(&pair.b))
            else {
                continue;
            };
            let (a, b) = (&self.bodies[ia], &self.bodies[ib]);
            if a.is_static() && b.is_static() {
                continue;
            }
            if !a.collision_filter.should_collide(&b.collision_filter) {
                continue;
            }
            if jointed.contains(&pair) {
                continue;
            }
            filtered += 1;

            let moved = touched.contains(&pair.a) || touched.contains(&pair.b);
            if !a.is_awake_dynamic() && !b.is_awake_dynamic() && !moved {
                if let Some(m) = self.contacts.get(&pair) {
                    current.insert(pair, m.clone());
                    carried.push(pair);
                }
                continue;
            }
            if let Some(m) = collide(a, b) {
                current.insert(pair, m);
                if moved {
                    disturbed.push(pair);
                }
            }
        }

        // Un corps éveillé qui touche un corps endormi réveille son îlot
        let mut to_wake = Vec::new();
        // Un corps déplacé par l'hôte réveille ce qu'il touche
        for pair in &disturbed {
            for id in [pair.a, pair.b] {
                if self.body(id).is_some_and(|b| b.is_sleeping()) {
                    to_wake.push(id);
                }
            }
        }
        for pair in current.keys() {
            let (Some(&ia), Some(&ib)) = (self.index_of.get(&pair.a), self.index_of.get(&pair.b))
            else {
                continue;
            };
            let (a, b) = (&self.bodies[ia], &self.bodies[ib]);
            if a.is_awake_dynamic() && b.is_sleeping() {
                to_wake.push(pair.b);
            } else if b.is_awake_dynamic() && a.is_sleeping() {
                to_wake.push(pair.a);
            }
        }
        for (_, joint) in &self.constraints {
            let Some(b) = joint.body_b() else {
                continue;
            };
            let (Some(&ia), Some(&ib)) = (self.index_of.get(&joint.body_a), self.index_of.get(&b))
            else {
                continue;
            };
            let (body_a, body_b) = (&self.bodies[ia], &self.bodies[ib]);
            if body_a.is_awake_dynamic() && body_b.is_sleeping() {
                to_wake.push(b);
            } else if body_b.is_awake_dynamic() && body_a.is_sleeping() {
                to_wake.push(joint.body_a);
            }
        }
        let mut woken = 0;
        for id in to_wake {
            woken += self.wake_island_of(id);
        }

        // Les paires conservées qui viennent d'être réveillées sont recalculées
        if woken > 0 {
            for pair in carried {
                let (Some(&ia), Some(&ib)) =
                    (self.index_of.get(&pair.a), self.index_of.get(&pair.b))
                else {
                    continue;
                };
                let (a, b) = (&self.bodies[ia], &self.bodies[ib]);
                if !a.is_awake_dynamic() && !b.is_awake_dynamic() {
                    continue;
                }
                match collide(a, b) {
                    Some(m) => {
                        current.insert(pair, m);
                    }
                    None => {
                        current.remove(&pair);
                    }
                }
            }
        }

        (current, filtered)
    }

    /// Résolution des articulations puis des contacts
    fn solve(&mut self, current: &mut BTreeMap<BodyPair, Manifold>, dt: f32) {
        let joints: Vec<(PinJoint, usize, Option<usize>)> = self
            .constraints
            .iter()
            .filter_map(|(_, j)| {
                let ia = *self.index_of.get(&j.body_a)?;
                let ib = match j.body_b() {
                    Some(b) => Some(*self.index_of.get(&b)?),
                    None => None,
                };
                Some((*j, ia, ib))
            })
            .collect();
        let mut joint_solver = ConstraintSolver::new(&self.bodies, &joints, dt, &self.config);
        if !joint_solver.is_empty() {
            for _ in 0..self.config.constraint_iterations {
                joint_solver.solve_velocities(&mut self.bodies);
            }
        }

        let pairs: Vec<BodyPair> = current.keys().copied().collect();
        let mut manifolds: Vec<Manifold> = current.values().cloned().collect();
        let indices: Vec<(usize, usize)> = manifolds
            .iter()
            .map(|m| {
                (
                    self.index_of.get(&m.body_a).copied().unwrap_or(usize::MAX),
                    self.index_of.get(&m.body_b).copied().unwrap_or(usize::MAX),
                )
            })
            .collect();

        let mut contact_solver =
            ContactSolver::new(&self.bodies, &manifolds, &indices, dt, &self.config);
        if !contact_solver.is_empty() {
            for _ in 0..self.config.velocity_iterations {
                contact_solver.solve_velocities(&mut self.bodies);
            }
            contact_solver.store_impulses(&mut manifolds);
        }

        for (pair, m) in pairs.into_iter().zip(manifolds) {
            current.insert(pair, m);
        }
    }

    /// Intégration des positions et rotations
    fn integrate_positions(&mut self, dt: f32) {
        for body in self.bodies.iter_mut() {
            if body.is_awake_dynamic() {
                body.position += body.velocity * dt;
                body.rotation += body.angular_velocity * dt;
                body.update_transform();
            }
        }
    }

    // =========================================================================
    // Requêtes
    // =========================================================================

    /// Corps dont l'AABB chevauche la région (triés par identifiant)
    pub fn query_aabb(&self, region: &Aabb) -> Vec<BodyId> {
        let mut out = Vec::new();
        self.index.query_aabb(region, &mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Corps dont la forme contient le point (triés par identifiant)
    pub fn query_point(&self, point: Vec2) -> Vec<BodyId> {
        let mut out = self.query_aabb(&Aabb::from_point(point));
        out.retain(|id| {
            self.body(*id)
                .is_some_and(|b| b.shape.contains_point(b.position, point))
        });
        out
    }

    /// Premier corps touché par le segment `from -> to`.
    ///
    /// Un rayon qui part de l'intérieur d'une forme ne la touche pas.
    pub fn ray_cast(&self, from: Vec2, to: Vec2) -> Option<RayHit> {
        let mut ids = Vec::new();
        self.index.query_ray(from, to, &mut ids);
        ids.sort_unstable();
        ids.dedup();

        let mut best: Option<RayHit> = None;
        for id in ids {
            let Some(body) = self.body(id) else {
                continue;
            };
            let Some((fraction, normal)) = body.shape.ray_cast(body.position, from, to) else {
                continue;
            };
            if best.map_or(true, |hit| fraction < hit.fraction) {
                best = Some(RayHit {
                    body: id,
                    point: from + (to - from) * fraction,
                    normal,
                    fraction,
                });
            }
        }
        best
    }

    // =========================================================================
    // Événements
    // =========================================================================

    /// Enregistre un écouteur, appelé à la fin de chaque pas
    pub fn on_collision<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&CollisionEvent) + 'static,
    {
        self.listeners.add(callback)
    }

    /// Retire un écouteur
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Événements du dernier pas
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Manifolds actifs
    pub fn contacts(&self) -> impl Iterator<Item = &Manifold> + '_ {
        self.contacts.values()
    }

    pub fn last_step_stats(&self) -> &StepStats {
        &self.stats
    }

    // =========================================================================
    // Accesseurs
    // =========================================================================

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.index_of.get(&id).map(|&i| &self.bodies[i])
    }

    /// Accès en écriture. Le corps est réveillé et rafraîchi au prochain pas.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let idx = *self.index_of.get(&id)?;
        self.wake_touching(id);
        self.wake_island_of(id);
        self.dirty.insert(id);
        self.bodies.get_mut(idx)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> + '_ {
        self.bodies.iter()
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&PinJoint> {
        self.constraints
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, j)| j)
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &PinJoint)> + '_ {
        self.constraints.iter().map(|(id, j)| (*id, j))
    }

    pub fn body_count(&self) -> usize { self.bodies.len() }
    pub fn constraint_count(&self) -> usize { self.constraints.len() }
    pub fn listener_count(&self) -> usize { self.listeners.len() }
    pub fn frame(&self) -> u64 { self.frame }
    pub fn gravity(&self) -> Vec2 { self.config.gravity }
    pub fn spatial_index_type(&self) -> SpatialIndexType { self.index.kind() }
    pub fn world_width(&self) -> f32 { self.world_width }
    pub fn world_height(&self) -> f32 { self.world_height }
    pub fn config(&self) -> &WorldConfig { &self.config }
}

impl Default for World {
    fn default() -> Self {
        Self::new(2000.0, 2000.0, SpatialIndexType::default())
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================
