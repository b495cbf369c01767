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
// gs_phy_dynamic_tree.rs - Dynamic AABB tree broad phase (default)
// =============================================================================
//
// Arbre binaire équilibré de boîtes englobantes. Les feuilles portent une
// AABB "ÉLARGIE" (fat AABB) :
//
//     fat = serrée agrandie de  fat_margin + |v| * velocity_margin_scale
//
// Tant que la boîte serrée reste dans la boîte élargie, un déplacement ne
// touche pas à l'arbre. Sinon la feuille est retirée puis réinsérée.
//
// INSERTION :
// On descend depuis la racine en choisissant à chaque nœud l'enfant qui
// minimise l'augmentation de surface englobante, puis on crée un nouveau
// parent pour la feuille et son frère. En remontant, des rotations gardent
// l'arbre équilibré (rotations sur le sous-arbre le plus haut).
//
// L'arbre n'est jamais reconstruit en bloc : tout est incrémental.
//
// Les nœuds vivent dans une arène (Vec) avec une liste libre, comme les
// tableaux SoA du moteur : pas de pointeurs, seulement des indices.
//
// =============================================================================

use std::collections::HashMap;

use glam::Vec2;

use crate::gs_phy_aabb::Aabb;
use crate::gs_phy_spatial_index::{
    accepts_pair, finalize_pairs, IndexProxy, SpatialIndex, SpatialIndexType,
};
use crate::gs_phy_types::{BodyId, BodyPair};

/// Indice "aucun nœud"
const NULL_NODE: usize = usize::MAX;

#[derive(Clone, Debug)]
struct TreeNode {
    /// Boîte élargie (feuille) ou union des enfants (nœud interne)
    aabb: Aabb,
    parent: usize,
    child1: usize,
    child2: usize,
    /// Hauteur (0 pour une feuille, -1 pour un nœud libre)
    height: i32,
    body: Option<BodyId>,
}

impl TreeNode {
    fn free() -> Self {
        Self {
            aabb: Aabb::default(),
            parent: NULL_NODE,
            child1: NULL_NODE,
            child2: NULL_NODE,
            height: -1,
            body: None,
        }
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.child1 == NULL_NODE
    }
}

#[derive(Clone, Copy, Debug)]
struct LeafData {
    node: usize,
    tight: Aabb,
    is_static: bool,
}

/// Arbre d'AABB dynamique
#[derive(Clone, Debug)]
pub struct DynamicTree {
    nodes: Vec<TreeNode>,
    root: usize,
    free_list: Vec<usize>,
    leaves: HashMap<BodyId, LeafData>,
    fat_margin: f32,
    velocity_margin_scale: f32,
}

impl DynamicTree {
    /// Crée un arbre vide
    ///
    /// # Arguments
    /// * `fat_margin` - Marge fixe des boîtes élargies
    /// * `velocity_margin_scale` - Marge additionnelle par unité de vitesse
    pub fn new(fat_margin: f32, velocity_margin_scale: f32) -> Self {
        Self {
            nodes: Vec::new(),
            root: NULL_NODE,
            free_list: Vec::new(),
            leaves: HashMap::new(),
            fat_margin: fat_margin.max(0.0),
            velocity_margin_scale: velocity_margin_scale.max(0.0),
        }
    }

    /// Hauteur de l'arbre (0 si vide ou réduit à une feuille)
    pub fn height(&self) -> i32 {
        if self.root == NULL_NODE {
            0
        } else {
            self.nodes[self.root].height
        }
    }

    /// Boîte élargie stockée pour ce corps
    pub fn fat_aabb(&self, id: BodyId) -> Option<Aabb> {
        self.leaves.get(&id).map(|l| self.nodes[l.node].aabb)
    }

    fn margin_for(&self, velocity: Vec2) -> f32 {
        self.fat_margin + velocity.length() * self.velocity_margin_scale
    }

    // -------------------------------------------------------------------------
    // Arène
    // -------------------------------------------------------------------------

    fn allocate_node(&mut self) -> usize {
        match self.free_list.pop() {
            Some(idx) => {
                self.nodes[idx] = TreeNode::free();
                idx
            }
            None => {
                self.nodes.push(TreeNode::free());
                self.nodes.len() - 1
            }
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.nodes[idx] = TreeNode::free();
        self.free_list.push(idx);
    }

    /// Remplace `old` par `new` dans les enfants de `parent` (ou à la racine)
    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == NULL_NODE {
            self.root = new;
        } else if self.nodes[parent].child1 == old {
            self.nodes[parent].child1 = new;
        } else {
            self.nodes[parent].child2 = new;
        }
    }

    /// Recalcule hauteur et boîte d'un nœud interne
    fn refit(&mut self, idx: usize) {
        let c1 = self.nodes[idx].child1;
        let c2 = self.nodes[idx].child2;
        self.nodes[idx].height = 1 + self.nodes[c1].height.max(self.nodes[c2].height);
        self.nodes[idx].aabb = self.nodes[c1].aabb.union(&self.nodes[c2].aabb);
    }

    // -------------------------------------------------------------------------
    // Insertion / suppression de feuilles
    // -------------------------------------------------------------------------

    fn insert_leaf(&mut self, leaf: usize) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf].parent = NULL_NODE;
            return;
        }

        // Recherche du meilleur frère (heuristique de surface)
        let leaf_aabb = self.nodes[leaf].aabb;
        let mut index = self.root;
        while !self.nodes[index].is_leaf() {
            let node = &self.nodes[index];
            let c1 = node.child1;
            let c2 = node.child2;

            let area = node.aabb.area();
            let combined_area = node.aabb.union(&leaf_aabb).area();

            // Coût de créer un nouveau parent pour ce nœud et la feuille
            let cost = 2.0 * combined_area;
            // Coût minimal de descendre plus bas
            let inheritance = 2.0 * (combined_area - area);

            let cost1 = self.descend_cost(c1, &leaf_aabb) + inheritance;
            let cost2 = self.descend_cost(c2, &leaf_aabb) + inheritance;

            if cost < cost1 && cost < cost2 {
                break;
            }
            index = if cost1 < cost2 { c1 } else { c2 };
        }
        let sibling = index;

        // Nouveau parent
        let old_parent = self.nodes[sibling].parent;
        let new_parent = self.allocate_node();
        self.nodes[new_parent].parent = old_parent;
        self.nodes[new_parent].aabb = leaf_aabb.union(&self.nodes[sibling].aabb);
        self.nodes[new_parent].height = self.nodes[sibling].height + 1;
        self.nodes[new_parent].child1 = sibling;
        self.nodes[new_parent].child2 = leaf;
        self.replace_child(old_parent, sibling, new_parent);
        self.nodes[sibling].parent = new_parent;
        self.nodes[leaf].parent = new_parent;

        // Remontée : équilibrage + mise à jour des boîtes
        let mut index = self.nodes[leaf].parent;
        while index != NULL_NODE {
            index = self.balance(index);
            self.refit(index);
            index = self.nodes[index].parent;
        }
    }

    fn descend_cost(&self, child: usize, leaf_aabb: &Aabb) -> f32 {
        let node = &self.nodes[child];
        let merged = leaf_aabb.union(&node.aabb).area();
        if node.is_leaf() {
            merged
        } else {
            merged - node.aabb.area()
        }
    }

    fn remove_leaf(&mut self, leaf: usize) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf].parent;
        let grand_parent = self.nodes[parent].parent;
        let sibling = if self.nodes[parent].child1 == leaf {
            self.nodes[parent].child2
        } else {
            self.nodes[parent].child1
        };

        self.replace_child(grand_parent, parent, sibling);
        self.nodes[sibling].parent = grand_parent;
        self.free_node(parent);

        let mut index = grand_parent;
        while index != NULL_NODE {
            index = self.balance(index);
            self.refit(index);
            index = self.nodes[index].parent;
        }
    }

    /// Rotation si le nœud `a` est déséquilibré. Retourne la nouvelle racine
    /// du sous-arbre.
    fn balance(&mut self, a: usize) -> usize {
        if self.nodes[a].is_leaf() || self.nodes[a].height < 2 {
            return a;
        }

        let b = self.nodes[a].child1;
        let c = self.nodes[a].child2;
        let balance = self.nodes[c].height - self.nodes[b].height;

        if balance > 1 {
            // C monte
            let f = self.nodes[c].child1;
            let g = self.nodes[c].child2;

            let a_parent = self.nodes[a].parent;
            self.nodes[c].child1 = a;
            self.nodes[c].parent = a_parent;
            self.nodes[a].parent = c;
            self.replace_child(a_parent, a, c);

            let (keep, give) = if self.nodes[f].height > self.nodes[g].height {
                (f, g)
            } else {
                (g, f)
            };
            self.nodes[c].child2 = keep;
            self.nodes[a].child2 = give;
            self.nodes[give].parent = a;
            self.refit(a);
            self.refit(c);
            return c;
        }

        if balance < -1 {
            // B monte
            let d = self.nodes[b].child1;
            let e = self.nodes[b].child2;

            let a_parent = self.nodes[a].parent;
            self.nodes[b].child1 = a;
            self.nodes[b].parent = a_parent;
            self.nodes[a].parent = b;
            self.replace_child(a_parent, a, b);

            let (keep, give) = if self.nodes[d].height > self.nodes[e].height {
                (d, e)
            } else {
                (e, d)
            };
            self.nodes[b].child2 = keep;
            self.nodes[a].child1 = give;
            self.nodes[give].parent = a;
            self.refit(a);
            self.refit(b);
            return b;
        }

        a
    }

    /// Parcourt les feuilles dont la boîte élargie chevauche `region`
    fn visit_overlapping<F: FnMut(BodyId, &LeafData)>(&self, region: &Aabb, mut visit: F) {
        if self.root == NULL_NODE {
            return;
        }
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.aabb.overlaps(region) {
                continue;
            }
            if node.is_leaf() {
                if let Some(id) = node.body {
                    if let Some(leaf) = self.leaves.get(&id) {
                        visit(id, leaf);
                    }
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    /// Vérifie la structure (parents, hauteurs, inclusion des boîtes)
    #[cfg(test)]
    fn validate(&self) {
        if self.root == NULL_NODE {
            assert!(self.leaves.is_empty());
            return;
        }
        assert_eq!(self.nodes[self.root].parent, NULL_NODE);
        let mut leaf_count = 0;
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                assert_eq!(node.height, 0);
                leaf_count += 1;
                continue;
            }
            let (c1, c2) = (node.child1, node.child2);
            assert_eq!(self.nodes[c1].parent, idx);
            assert_eq!(self.nodes[c2].parent, idx);
            assert!(node.aabb.contains(&self.nodes[c1].aabb));
            assert!(node.aabb.contains(&self.nodes[c2].aabb));
            assert_eq!(node.height, 1 + self.nodes[c1].height.max(self.nodes[c2].height));
            stack.push(c1);
            stack.push(c2);
        }
        assert_eq!(leaf_count, self.leaves.len());
    }
}

impl SpatialIndex for DynamicTree {
    fn kind(&self) -> SpatialIndexType {
        SpatialIndexType::DynamicTree
    }

    fn insert(&mut self, proxy: IndexProxy) {
        if self.leaves.contains_key(&proxy.id) {
            self.remove(proxy.id);
        }
        let leaf = self.allocate_node();
        self.nodes[leaf].aabb = proxy.aabb.expanded(self.margin_for(proxy.velocity));
        self.nodes[leaf].height = 0;
        self.nodes[leaf].body = Some(proxy.id);
        self.insert_leaf(leaf);
        self.leaves.insert(
            proxy.id,
            LeafData {
                node: leaf,
                tight: proxy.aabb,
                is_static: proxy.is_static,
            },
        );
    }

    fn remove(&mut self, id: BodyId) -> bool {
        let Some(leaf) = self.leaves.remove(&id) else {
            return false;
        };
        self.remove_leaf(leaf.node);
        self.free_node(leaf.node);
        true
    }

    fn update(&mut self, proxy: IndexProxy) -> bool {
        let margin = self.margin_for(proxy.velocity);
        let Some(leaf) = self.leaves.get_mut(&proxy.id) else {
            self.insert(proxy);
            return true;
        };
        leaf.tight = proxy.aabb;
        leaf.is_static = proxy.is_static;
        let node = leaf.node;

        // Le déplacement reste dans la marge : rien à faire
        if self.nodes[node].aabb.contains(&proxy.aabb) {
            return false;
        }

        self.remove_leaf(node);
        self.nodes[node].aabb = proxy.aabb.expanded(margin);
        self.insert_leaf(node);
        true
    }

    fn retrieve_candidates(&mut self) -> Vec<BodyPair> {
        let mut pairs = Vec::new();
        // Seuls les corps non statiques interrogent l'arbre : une paire
        // statique/dynamique est trouvée depuis son corps dynamique.
        for (&id, leaf) in &self.leaves {
            if leaf.is_static {
                continue;
            }
            let fat = self.nodes[leaf.node].aabb;
            self.visit_overlapping(&fat, |other, other_leaf| {
                if other == id {
                    return;
                }
                // Paire dynamique/dynamique : trouvée des deux côtés, gardée une fois
                if !other_leaf.is_static && other < id {
                    return;
                }
                if accepts_pair(&leaf.tight, false, &other_leaf.tight, other_leaf.is_static) {
                    pairs.push(BodyPair::new(id, other));
                }
            });
        }
        finalize_pairs(pairs)
    }

    fn query_aabb(&self, region: &Aabb, out: &mut Vec<BodyId>) {
        self.visit_overlapping(region, |id, leaf| {
            if leaf.tight.overlaps(region) {
                out.push(id);
            }
        });
    }

    fn query_ray(&self, from: Vec2, to: Vec2, out: &mut Vec<BodyId>) {
        if self.root == NULL_NODE {
            return;
        }
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.aabb.segment_hit(from, to).is_none() {
                continue;
            }
            if node.is_leaf() {
                if let Some(id) = node.body {
                    let hit = self
                        .leaves
                        .get(&id)
                        .is_some_and(|l| l.tight.segment_hit(from, to).is_some());
                    if hit {
                        out.push(id);
                    }
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    fn aabb_of(&self, id: BodyId) -> Option<Aabb> {
        self.leaves.get(&id).map(|l| l.tight)
    }

    fn len(&self) -> usize {
        self.leaves.len()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.leaves.clear();
        self.root = NULL_NODE;
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================
