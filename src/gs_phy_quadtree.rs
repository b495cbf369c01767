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
// gs_phy_quadtree.rs - Region tree (quadtree) broad phase
// =============================================================================
//
// Subdivision récursive du monde en quatre quadrants.
//
// Contrairement à un quadtree de POINTS, on range ici des BOÎTES. Chaque
// entrée vit dans le nœud le plus profond qui la contient entièrement :
// une boîte à cheval sur deux quadrants reste dans le parent.
//
//     +--------+--------+
//     |   NO   |   NE   |     Une feuille se subdivise quand elle dépasse
//     |        |  [b]   |     `bucket_size` entrées (tant que la profondeur
//     +-----[a]+--------+     reste < `max_depth`). Un nœud dont le
//     |   SO   |   SE   |     sous-arbre retombe sous le seuil fusionne.
//     |        |        |
//     +--------+--------+     [a] reste à la racine, [b] descend en NE.
//
// Une boîte qui sort du monde reste à la racine : elle n'est jamais perdue.
//
// PAIRES CANDIDATES :
// Une paire ne peut exister qu'entre une entrée et une autre du même nœud
// ou d'un nœud descendant. Un parcours en profondeur avec une pile des
// entrées "ancêtres" énumère donc chaque paire une seule fois.
//
// Les nœuds sont stockés dans une arène (Vec) avec liste libre, sans Box.
//
// =============================================================================

use std::collections::HashMap;

use crate::gs_phy_aabb::Aabb;
use crate::gs_phy_spatial_index::{
    accepts_pair, finalize_pairs, IndexProxy, SpatialIndex, SpatialIndexType,
};
use crate::gs_phy_types::{BodyId, BodyPair};

const ROOT: usize = 0;

#[derive(Clone, Debug)]
struct QuadNode {
    bounds: Aabb,
    depth: usize,
    parent: Option<usize>,
    children: Option<[usize; 4]>,
    entries: Vec<BodyId>,
}

impl QuadNode {
    fn new(bounds: Aabb, depth: usize, parent: Option<usize>) -> Self {
        Self {
            bounds,
            depth,
            parent,
            children: None,
            entries: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct QuadEntry {
    aabb: Aabb,
    is_static: bool,
    node: usize,
}

/// Quadtree à seaux pour la phase large
#[derive(Clone, Debug)]
pub struct Quadtree {
    nodes: Vec<QuadNode>,
    free_nodes: Vec<usize>,
    entries: HashMap<BodyId, QuadEntry>,
    bounds: Aabb,
    bucket_size: usize,
    max_depth: usize,
}

impl Quadtree {
    /// Crée un quadtree vide
    ///
    /// # Arguments
    /// * `bounds` - Étendue du monde
    /// * `bucket_size` - Entrées par feuille avant subdivision
    /// * `max_depth` - Profondeur maximale
    pub fn new(bounds: Aabb, bucket_size: usize, max_depth: usize) -> Self {
        Self {
            nodes: vec![QuadNode::new(bounds, 0, None)],
            free_nodes: Vec::new(),
            entries: HashMap::new(),
            bounds,
            bucket_size: bucket_size.max(1),
            max_depth,
        }
    }

    /// Étendue couverte par la racine
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Nombre de nœuds vivants (racine comprise)
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_nodes.len()
    }

    /// Profondeur du nœud qui range ce corps
    pub fn depth_of(&self, id: BodyId) -> Option<usize> {
        self.entries.get(&id).map(|e| self.nodes[e.node].depth)
    }

    fn alloc_node(&mut self, bounds: Aabb, depth: usize, parent: usize) -> usize {
        let node = QuadNode::new(bounds, depth, Some(parent));
        match self.free_nodes.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Enfant qui contient entièrement la boîte, s'il existe
    fn child_containing(&self, node: usize, aabb: &Aabb) -> Option<usize> {
        let children = self.nodes[node].children?;
        children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].bounds.contains(aabb))
    }

    fn place(&mut self, id: BodyId, aabb: Aabb, is_static: bool) {
        let mut node = ROOT;
        while let Some(child) = self.child_containing(node, &aabb) {
            node = child;
        }
        self.nodes[node].entries.push(id);
        self.entries.insert(id, QuadEntry { aabb, is_static, node });
        self.split_if_needed(node);
    }

    fn detach(&mut self, id: BodyId, node: usize) {
        let list = &mut self.nodes[node].entries;
        if let Some(pos) = list.iter().position(|&e| e == id) {
            list.swap_remove(pos);
        }
    }

    fn split_if_needed(&mut self, node: usize) {
        let (bounds, depth) = {
            let n = &self.nodes[node];
            if n.children.is_some()
                || n.entries.len() <= self.bucket_size
                || n.depth >= self.max_depth
            {
                return;
            }
            (n.bounds, n.depth)
        };

        let quads = bounds.quadrants();
        let children = [
            self.alloc_node(quads[0], depth + 1, node),
            self.alloc_node(quads[1], depth + 1, node),
            self.alloc_node(quads[2], depth + 1, node),
            self.alloc_node(quads[3], depth + 1, node),
        ];
        self.nodes[node].children = Some(children);

        // Redistribution : seules les boîtes contenues dans un quadrant descendent
        let moved = std::mem::take(&mut self.nodes[node].entries);
        for id in moved {
            let Some(aabb) = self.entries.get(&id).map(|e| e.aabb) else {
                continue;
            };
            let target = self.child_containing(node, &aabb).unwrap_or(node);
            self.nodes[target].entries.push(id);
            if let Some(e) = self.entries.get_mut(&id) {
                e.node = target;
            }
        }

        for child in children {
            self.split_if_needed(child);
        }
    }

    /// Fusionne les sous-arbres redevenus trop petits, en remontant vers la racine
    fn try_merge(&mut self, start: usize) {
        let mut current = Some(start);
        while let Some(idx) = current {
            if let Some(children) = self.nodes[idx].children {
                let all_leaves = children.iter().all(|&c| self.nodes[c].children.is_none());
                let total = self.nodes[idx].entries.len()
                    + children
                        .iter()
                        .map(|&c| self.nodes[c].entries.len())
                        .sum::<usize>();
                if !all_leaves || total > self.bucket_size {
                    break;
                }

                for c in children {
                    let moved = std::mem::take(&mut self.nodes[c].entries);
                    for id in moved {
                        if let Some(e) = self.entries.get_mut(&id) {
                            e.node = idx;
                        }
                        self.nodes[idx].entries.push(id);
                    }
                    self.free_nodes.push(c);
                }
                self.nodes[idx].children = None;
            }
            current = self.nodes[idx].parent;
        }
    }

    fn collect_pairs(
        &self,
        node: usize,
        ancestors: &mut Vec<(BodyId, Aabb, bool)>,
        pairs: &mut Vec<BodyPair>,
    ) {
        let mark = ancestors.len();
        for &id in &self.nodes[node].entries {
            let Some(e) = self.entries.get(&id) else {
                continue;
            };
            for &(other, aabb, other_static) in ancestors.iter() {
                if accepts_pair(&e.aabb, e.is_static, &aabb, other_static) {
                    pairs.push(BodyPair::new(id, other));
                }
            }
            ancestors.push((id, e.aabb, e.is_static));
        }

        if let Some(children) = self.nodes[node].children {
            for child in children {
                self.collect_pairs(child, ancestors, pairs);
            }
        }
        ancestors.truncate(mark);
    }

    fn query_node(&self, node: usize, region: &Aabb, out: &mut Vec<BodyId>) {
        let n = &self.nodes[node];
        for &id in &n.entries {
            if let Some(e) = self.entries.get(&id) {
                if e.aabb.overlaps(region) {
                    out.push(id);
                }
            }
        }
        if let Some(children) = n.children {
            for child in children {
                if self.nodes[child].bounds.overlaps(region) {
                    self.query_node(child, region, out);
                }
            }
        }
    }
}

impl SpatialIndex for Quadtree {
    fn kind(&self) -> SpatialIndexType {
        SpatialIndexType::RegionTree
    }

    fn insert(&mut self, proxy: IndexProxy) {
        if self.entries.contains_key(&proxy.id) {
            self.remove(proxy.id);
        }
        self.place(proxy.id, proxy.aabb, proxy.is_static);
    }

    fn remove(&mut self, id: BodyId) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        self.detach(id, entry.node);
        self.try_merge(entry.node);
        true
    }

    fn update(&mut self, proxy: IndexProxy) -> bool {
        let Some(entry) = self.entries.get_mut(&proxy.id) else {
            self.insert(proxy);
            return true;
        };
        entry.aabb = proxy.aabb;
        entry.is_static = proxy.is_static;
        let node = entry.node;

        // Toujours le nœud le plus profond qui contient la boîte : rien à déplacer
        let fits_here = node == ROOT || self.nodes[node].bounds.contains(&proxy.aabb);
        if fits_here && self.child_containing(node, &proxy.aabb).is_none() {
            return false;
        }

        self.detach(proxy.id, node);
        self.entries.remove(&proxy.id);
        self.place(proxy.id, proxy.aabb, proxy.is_static);
        self.try_merge(node);
        true
    }

    fn retrieve_candidates(&mut self) -> Vec<BodyPair> {
        let mut pairs = Vec::new();
        let mut ancestors = Vec::new();
        self.collect_pairs(ROOT, &mut ancestors, &mut pairs);
        finalize_pairs(pairs)
    }

    fn query_aabb(&self, region: &Aabb, out: &mut Vec<BodyId>) {
        // La racine est toujours visitée (elle garde les boîtes hors monde)
        self.query_node(ROOT, region, out);
    }

    fn aabb_of(&self, id: BodyId) -> Option<Aabb> {
        self.entries.get(&id).map(|e| e.aabb)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(QuadNode::new(self.bounds, 0, None));
        self.free_nodes.clear();
        self.entries.clear();
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================
