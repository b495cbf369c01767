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
// gs_phy_sweep_prune.rs - Sweep-and-prune broad phase
// =============================================================================
//
// Chaque AABB est projetée sur X et sur Y : deux extrémités (min, max) par
// axe. Les listes d'extrémités restent triées d'une frame à l'autre.
//
//   X :  a.min  b.min  a.max  c.min  b.max  c.max
//         [a----------]
//               [b-----------------]
//                            [c-----------]
//
// TRI PAR INSERTION :
// D'une frame à l'autre les corps bougent peu, la liste est presque triée.
// Le tri par insertion est alors quasi linéaire (peu d'échanges).
//
// BALAYAGE :
// On parcourt l'axe de plus grande dispersion. Un "min" entre dans
// l'ensemble actif après avoir été testé contre tous les actifs, un "max"
// en sort. Chaque paire active est ensuite validée sur les deux axes.
//
// À valeur égale, un "min" passe avant un "max" : deux boîtes qui se
// touchent sont donc bien candidates.
//
// =============================================================================

use std::collections::HashMap;

use crate::gs_phy_aabb::Aabb;
use crate::gs_phy_spatial_index::{
    accepts_pair, finalize_pairs, IndexProxy, SpatialIndex, SpatialIndexType,
};
use crate::gs_phy_types::{BodyId, BodyPair};

#[derive(Clone, Copy, Debug)]
struct Endpoint {
    value: f32,
    slot: usize,
    is_min: bool,
}

impl Endpoint {
    /// Ordre de tri : valeur croissante, "min" avant "max" à égalité
    #[inline]
    fn sorts_before(&self, other: &Endpoint) -> bool {
        self.value < other.value || (self.value == other.value && self.is_min && !other.is_min)
    }
}

#[derive(Clone, Copy, Debug)]
struct SapEntry {
    id: BodyId,
    aabb: Aabb,
    is_static: bool,
}

/// Balayage et élagage sur deux axes
#[derive(Clone, Debug, Default)]
pub struct SweepAndPrune {
    entries: Vec<Option<SapEntry>>,
    free_slots: Vec<usize>,
    slots: HashMap<BodyId, usize>,
    /// Extrémités triées, [X, Y]
    axes: [Vec<Endpoint>; 2],
    /// Axe balayé au dernier appel (0 = X, 1 = Y)
    sweep_axis: usize,
    /// Échanges effectués par le dernier tri
    last_swaps: usize,
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Axe balayé au dernier appel (0 = X, 1 = Y)
    pub fn sweep_axis(&self) -> usize {
        self.sweep_axis
    }

    /// Nombre d'échanges du dernier tri par insertion
    pub fn last_swaps(&self) -> usize {
        self.last_swaps
    }

    fn entry(&self, slot: usize) -> Option<&SapEntry> {
        self.entries.get(slot).and_then(|e| e.as_ref())
    }

    /// Recopie les bornes courantes dans les extrémités
    fn refresh_endpoints(&mut self) {
        for axis in 0..2 {
            for ep in self.axes[axis].iter_mut() {
                if let Some(Some(e)) = self.entries.get(ep.slot) {
                    ep.value = if ep.is_min { e.aabb.min[axis] } else { e.aabb.max[axis] };
                }
            }
        }
    }

    fn insertion_sort(list: &mut [Endpoint]) -> usize {
        let mut swaps = 0;
        for i in 1..list.len() {
            let mut j = i;
            while j > 0 && list[j].sorts_before(&list[j - 1]) {
                list.swap(j, j - 1);
                j -= 1;
                swaps += 1;
            }
        }
        swaps
    }

    /// Axe de plus grande variance des centres
    fn choose_sweep_axis(&self) -> usize {
        let mut count = 0.0f32;
        let mut sum = [0.0f32; 2];
        let mut sum_sq = [0.0f32; 2];
        for e in self.entries.iter().flatten() {
            let c = e.aabb.center();
            for axis in 0..2 {
                sum[axis] += c[axis];
                sum_sq[axis] += c[axis] * c[axis];
            }
            count += 1.0;
        }
        if count < 2.0 {
            return 0;
        }
        let variance = |axis: usize| sum_sq[axis] / count - (sum[axis] / count).powi(2);
        if variance(1) > variance(0) {
            1
        } else {
            0
        }
    }
}

impl SpatialIndex for SweepAndPrune {
    fn kind(&self) -> SpatialIndexType {
        SpatialIndexType::SweepAndPrune
    }

    fn insert(&mut self, proxy: IndexProxy) {
        if self.slots.contains_key(&proxy.id) {
            self.remove(proxy.id);
        }
        let entry = SapEntry {
            id: proxy.id,
            aabb: proxy.aabb,
            is_static: proxy.is_static,
        };
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.entries[slot] = Some(entry);
                slot
            }
            None => {
                self.entries.push(Some(entry));
                self.entries.len() - 1
            }
        };
        self.slots.insert(proxy.id, slot);

        // Ajout en fin de liste : le prochain tri les mettra en place
        for axis in 0..2 {
            self.axes[axis].push(Endpoint {
                value: proxy.aabb.min[axis],
                slot,
                is_min: true,
            });
            self.axes[axis].push(Endpoint {
                value: proxy.aabb.max[axis],
                slot,
                is_min: false,
            });
        }
    }

    fn remove(&mut self, id: BodyId) -> bool {
        let Some(slot) = self.slots.remove(&id) else {
            return false;
        };
        self.entries[slot] = None;
        self.free_slots.push(slot);
        for axis in self.axes.iter_mut() {
            axis.retain(|ep| ep.slot != slot);
        }
        true
    }

    fn update(&mut self, proxy: IndexProxy) -> bool {
        let Some(&slot) = self.slots.get(&proxy.id) else {
            self.insert(proxy);
            return true;
        };
        if let Some(Some(e)) = self.entries.get_mut(slot) {
            e.aabb = proxy.aabb;
            e.is_static = proxy.is_static;
        }
        // Les extrémités sont retriées au prochain balayage
        false
    }

    fn retrieve_candidates(&mut self) -> Vec<BodyPair> {
        self.refresh_endpoints();
        let swaps_x = Self::insertion_sort(&mut self.axes[0]);
        let swaps_y = Self::insertion_sort(&mut self.axes[1]);
        self.last_swaps = swaps_x + swaps_y;
        self.sweep_axis = self.choose_sweep_axis();

        let mut pairs = Vec::new();
        let mut active: Vec<usize> = Vec::new();
        for ep in &self.axes[self.sweep_axis] {
            let Some(e) = self.entry(ep.slot) else {
                continue;
            };
            if ep.is_min {
                for &other_slot in &active {
                    if let Some(other) = self.entry(other_slot) {
                        if accepts_pair(&e.aabb, e.is_static, &other.aabb, other.is_static) {
                            pairs.push(BodyPair::new(e.id, other.id));
                        }
                    }
                }
                active.push(ep.slot);
            } else if let Some(pos) = active.iter().position(|&s| s == ep.slot) {
                active.swap_remove(pos);
            }
        }
        finalize_pairs(pairs)
    }

    fn query_aabb(&self, region: &Aabb, out: &mut Vec<BodyId>) {
        out.extend(
            self.entries
                .iter()
                .flatten()
                .filter(|e| e.aabb.overlaps(region))
                .map(|e| e.id),
        );
    }

    fn aabb_of(&self, id: BodyId) -> Option<Aabb> {
        self.slots
            .get(&id)
            .and_then(|&slot| self.entry(slot))
            .map(|e| e.aabb)
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.free_slots.clear();
        self.slots.clear();
        self.axes[0].clear();
        self.axes[1].clear();
        self.last_swaps = 0;
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn proxy(id: u32, x: f32, y: f32) -> IndexProxy {
        IndexProxy {
            id: BodyId(id),
            aabb: Aabb::from_center(Vec2::new(x, y), Vec2::splat(5.0)),
            velocity: Vec2::ZERO,
            is_static: false,
        }
    }

    #[test]
    fn test_sorted_list_needs_no_swaps() {
        let mut sap = SweepAndPrune::new();
        for i in 0..20 {
            sap.insert(proxy(i, 100.0 - i as f32 * 20.0, 0.0));
        }
        sap.retrieve_candidates();
        assert!(sap.last_swaps() > 0);

        // Rien n'a bougé : la liste est déjà triée
        sap.retrieve_candidates();
        assert_eq!(sap.last_swaps(), 0);

        // Petit déplacement : peu d'échanges
        sap.update(proxy(3, 100.0 - 3.0 * 20.0 + 12.0, 0.0));
        sap.retrieve_candidates();
        assert!(sap.last_swaps() <= 4);
    }

    #[test]
    fn test_sweep_axis_follows_spread() {
        let mut sap = SweepAndPrune::new();
        for i in 0..10 {
            sap.insert(proxy(i, 0.0, i as f32 * 50.0));
        }
        sap.retrieve_candidates();
        assert_eq!(sap.sweep_axis(), 1);

        sap.clear();
        for i in 0..10 {
            sap.insert(proxy(i, i as f32 * 50.0, 0.0));
        }
        sap.retrieve_candidates();
        assert_eq!(sap.sweep_axis(), 0);
    }

    #[test]
    fn test_overlap_on_one_axis_only_is_rejected() {
        let mut sap = SweepAndPrune::new();
        sap.insert(proxy(1, 0.0, 0.0));
        sap.insert(proxy(2, 3.0, 50.0));
        assert!(sap.retrieve_candidates().is_empty());
    }

    #[test]
    fn test_slot_reuse_after_remove() {
        let mut sap = SweepAndPrune::new();
        sap.insert(proxy(1, 0.0, 0.0));
        sap.insert(proxy(2, 4.0, 0.0));
        assert!(sap.remove(BodyId(1)));
        sap.insert(proxy(3, -4.0, 0.0));
        assert_eq!(sap.len(), 2);
        assert_eq!(
            sap.retrieve_candidates(),
            vec![BodyPair::new(BodyId(2), BodyId(3))]
        );
    }
}
