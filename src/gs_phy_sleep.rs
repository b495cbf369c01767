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

// =============================================================================
// gs_phy_sleep.rs - Rest detection and island sleep
// =============================================================================
//
// REPOS :
// Chaque corps dynamique éveillé accumule du temps tant que ses vitesses
// linéaire ET angulaire restent sous ses seuils. Au-dessus, le compteur
// repart de zéro.
//
// ÎLOTS :
// Un îlot est un groupe de corps non statiques reliés par des contacts ou
// des articulations (composante connexe, union-find). Les corps statiques
// ne relient rien : deux caisses posées sur le même sol sont deux îlots.
//
//     [A]-contact-[B]-pivot-[C]        [D]           sol statique
//     \_______ îlot 1 ________/      îlot 2
//
// Un îlot s'endort quand TOUS ses membres ont atteint `sleep_time`.
// Réveiller un membre réveille tout l'îlot : jamais d'îlot à moitié endormi.
//
// Les îlots sont recalculés à chaque pas. La composition d'un îlot endormi
// est mémorisée pour pouvoir le réveiller d'un bloc entre deux pas.
//
// =============================================================================

use std::collections::HashMap;

use log::debug;

use crate::gs_phy_config::WorldConfig;
use crate::gs_phy_types::{BodyId, RigidBody};

// =============================================================================
// UnionFind - Ensembles disjoints
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    /// Représentant de l'ensemble (compression de chemin par division)
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Fusionne les ensembles de `a` et `b`
    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
    }
}

/// Regroupe les corps non statiques en îlots.
///
/// # Arguments
/// * `bodies` - Corps du monde
/// * `links` - Paires d'indices reliées (contacts, articulations)
///
/// # Returns
/// Les îlots (indices de corps), triés par plus petit indice.
pub fn build_islands(bodies: &[RigidBody], links: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(bodies.len());
    for &(a, b) in links {
        let (Some(ba), Some(bb)) = (bodies.get(a), bodies.get(b)) else {
            continue;
        };
        if ba.is_static() || bb.is_static() {
            continue;
        }
        uf.union(a, b);
    }

    let mut by_root: HashMap<usize, usize> = HashMap::new();
    let mut islands: Vec<Vec<usize>> = Vec::new();
    for (i, body) in bodies.iter().enumerate() {
        if body.is_static() {
            continue;
        }
        let root = uf.find(i);
        let slot = *by_root.entry(root).or_insert_with(|| {
            islands.push(Vec::new());
            islands.len() - 1
        });
        islands[slot].push(i);
    }
    islands
}

/// Bilan d'une mise à jour
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SleepReport {
    /// Nombre d'îlots (corps non statiques)
    pub islands: usize,
    /// Corps endormis pendant ce pas
    pub put_to_sleep: usize,
}

// =============================================================================
// SleepManager
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct SleepManager {
    /// Îlots endormis : identifiant de groupe -> membres
    groups: HashMap<u32, Vec<BodyId>>,
    /// Corps endormi -> groupe
    group_of: HashMap<BodyId, u32>,
    next_group: u32,
}

impl SleepManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nombre d'îlots actuellement endormis
    pub fn sleeping_islands(&self) -> usize {
        self.groups.len()
    }

    /// Accumule le temps de repos et endort les îlots au repos.
    ///
    /// # Arguments
    /// * `bodies` - Corps du monde
    /// * `links` - Paires d'indices reliées pendant ce pas
    /// * `dt` - Pas de temps
    /// * `config` - `sleeping_enabled` et `sleep_time`
    pub fn update(
        &mut self,
        bodies: &mut [RigidBody],
        links: &[(usize, usize)],
        dt: f32,
        config: &WorldConfig,
    ) -> SleepReport {
        // Temps de repos
        for body in bodies.iter_mut() {
            if !body.is_awake_dynamic() {
                continue;
            }
            let state = &mut body.sleep;
            if body.velocity.length() < state.linear_threshold
                && body.angular_velocity.abs() < state.angular_threshold
            {
                state.rest_time += dt;
            } else {
                state.rest_time = 0.0;
            }
        }

        let islands = build_islands(bodies, links);
        let mut report = SleepReport {
            islands: islands.len(),
            put_to_sleep: 0,
        };

        for island in &islands {
            let any_awake = island.iter().any(|&i| !bodies[i].is_sleeping());
            if !any_awake {
                continue;
            }

            let all_rested = config.sleeping_enabled
                && island.iter().all(|&i| {
                    bodies[i].is_sleeping() || bodies[i].sleep.rest_time >= config.sleep_time
                });

            if all_rested {
                let group = self.next_group;
                self.next_group = self.next_group.wrapping_add(1);
                let mut members = Vec::with_capacity(island.len());
                for &i in island {
                    let id = bodies[i].id();
                    // Un membre déjà endormi change de groupe
                    self.detach(id);
                    if !bodies[i].is_sleeping() {
                        bodies[i].put_to_sleep();
                        report.put_to_sleep += 1;
                    }
                    self.group_of.insert(id, group);
                    members.push(id);
                }
                debug!("îlot {group} endormi ({} corps)", members.len());
                self.groups.insert(group, members);
            } else {
                // Pas d'îlot partiellement endormi
                for &i in island {
                    if bodies[i].is_sleeping() {
                        let id = bodies[i].id();
                        self.detach(id);
                        bodies[i].wake();
                    }
                }
            }
        }

        report
    }

    /// Réveille l'îlot endormi qui contient `id`.
    ///
    /// # Returns
    /// Le nombre de corps réveillés.
    pub fn wake_island(
        &mut self,
        bodies: &mut [RigidBody],
        index_of: &HashMap<BodyId, usize>,
        id: BodyId,
    ) -> usize {
        let members = match self.group_of.remove(&id) {
            Some(group) => self.groups.remove(&group).unwrap_or_default(),
            None => vec![id],
        };

        let mut woken = 0;
        for member in members {
            self.group_of.remove(&member);
            if let Some(body) = index_of.get(&member).and_then(|&i| bodies.get_mut(i)) {
                if body.is_sleeping() {
                    body.wake();
                    woken += 1;
                } else if !body.is_static() {
                    body.sleep.rest_time = 0.0;
                }
            }
        }
        if woken > 0 {
            debug!("réveil de l'îlot de {id} ({woken} corps)");
        }
        woken
    }

    /// Réveille tout le monde
    pub fn wake_all(&mut self, bodies: &mut [RigidBody]) {
        for body in bodies.iter_mut() {
            if body.is_sleeping() {
                body.wake();
            }
        }
        self.groups.clear();
        self.group_of.clear();
    }

    /// Oublie un corps (retiré du monde)
    pub fn detach(&mut self, id: BodyId) {
        if let Some(group) = self.group_of.remove(&id) {
            if let Some(members) = self.groups.get_mut(&group) {
                members.retain(|&m| m != id);
                if members.is_empty() {
                    self.groups.remove(&group);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.group_of.clear();
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================
