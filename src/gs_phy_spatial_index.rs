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
// 20261019 - Created (remplace la grille de hachage spatiale unique).

// =============================================================================
// gs_phy_spatial_index.rs - Broad phase strategy interface
// =============================================================================
//
// La phase large trouve les paires de corps dont les AABB se chevauchent.
// Trois stratégies interchangeables implémentent le même contrat :
//
// - RegionTree    : quadtree, subdivision récursive à seaux fixes
// - DynamicTree   : arbre d'AABB élargies (défaut)
// - SweepAndPrune : tri des extrémités d'intervalles par axe
//
// CONTRAT COMMUN :
// - les paires sont non ordonnées, sans doublon, sans auto-paire
// - jamais de paire statique / statique
// - une paire est rapportée SI ET SEULEMENT SI les AABB serrées se
//   chevauchent (bords inclusifs)
//
// La dernière règle rend les trois stratégies strictement équivalentes :
// elles ne diffèrent que par leur coût, jamais par leur résultat.
//
// L'index ne possède AUCUN corps : il ne garde que des identifiants et des
// copies de boîtes englobantes (IndexProxy).
//
// =============================================================================

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gs_phy_aabb::Aabb;
use crate::gs_phy_config::WorldConfig;
use crate::gs_phy_dynamic_tree::DynamicTree;
use crate::gs_phy_quadtree::Quadtree;
use crate::gs_phy_sweep_prune::SweepAndPrune;
use crate::gs_phy_types::{BodyId, BodyPair};

/// Choix de la stratégie de phase large
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpatialIndexType {
    /// Quadtree (adapté aux scènes surtout statiques)
    RegionTree,
    /// Arbre d'AABB dynamique
    #[default]
    DynamicTree,
    /// Balayage et élagage (adapté aux scènes très mobiles)
    SweepAndPrune,
}

impl SpatialIndexType {
    /// Toutes les stratégies (pratique pour les tests et benchmarks)
    pub const ALL: [SpatialIndexType; 3] = [
        SpatialIndexType::RegionTree,
        SpatialIndexType::DynamicTree,
        SpatialIndexType::SweepAndPrune,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpatialIndexType::RegionTree => "region-tree",
            SpatialIndexType::DynamicTree => "dynamic-tree",
            SpatialIndexType::SweepAndPrune => "sweep-and-prune",
        }
    }
}

impl std::fmt::Display for SpatialIndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Référence légère d'un corps dans l'index
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexProxy {
    pub id: BodyId,
    /// AABB serrée courante
    pub aabb: Aabb,
    /// Vitesse (sert à dimensionner la marge de l'arbre dynamique)
    pub velocity: Vec2,
    pub is_static: bool,
}

/// Contrat d'une stratégie de phase large.
pub trait SpatialIndex {
    /// Stratégie implémentée
    fn kind(&self) -> SpatialIndexType;

    /// Ajoute un corps. Un identifiant déjà présent est remplacé.
    fn insert(&mut self, proxy: IndexProxy);

    /// Retire un corps. Retourne `false` s'il était absent.
    fn remove(&mut self, id: BodyId) -> bool;

    /// Met à jour l'AABB d'un corps.
    ///
    /// Retourne `true` si la structure a dû être modifiée (réinsertion),
    /// `false` si le déplacement a été absorbé sur place.
    fn update(&mut self, proxy: IndexProxy) -> bool;

    /// Paires candidates, triées et sans doublon
    fn retrieve_candidates(&mut self) -> Vec<BodyPair>;

    /// Corps dont l'AABB serrée chevauche la région (ordre quelconque)
    fn query_aabb(&self, region: &Aabb, out: &mut Vec<BodyId>);

    /// Corps dont l'AABB serrée est traversée par le segment
    fn query_ray(&self, from: Vec2, to: Vec2, out: &mut Vec<BodyId>) {
        let bounds = Aabb::new(from.min(to), from.max(to));
        let mut hits = Vec::new();
        self.query_aabb(&bounds, &mut hits);
        for id in hits {
            if let Some(aabb) = self.aabb_of(id) {
                if aabb.segment_hit(from, to).is_some() {
                    out.push(id);
                }
            }
        }
    }

    /// AABB serrée stockée pour ce corps
    fn aabb_of(&self, id: BodyId) -> Option<Aabb>;

    /// Nombre de corps indexés
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vide l'index
    fn clear(&mut self);
}

/// Fabrique une stratégie vide.
///
/// # Arguments
/// * `kind` - Stratégie voulue
/// * `bounds` - Étendue du monde (utilisée par le quadtree)
/// * `config` - Marges et paramètres de subdivision
pub fn create_spatial_index(
    kind: SpatialIndexType,
    bounds: Aabb,
    config: &WorldConfig,
) -> Box<dyn SpatialIndex> {
    match kind {
        SpatialIndexType::RegionTree => Box::new(Quadtree::new(
            bounds,
            config.quadtree_bucket_size,
            config.quadtree_max_depth,
        )),
        SpatialIndexType::DynamicTree => Box::new(DynamicTree::new(
            config.fat_margin,
            config.velocity_margin_scale,
        )),
        SpatialIndexType::SweepAndPrune => Box::new(SweepAndPrune::new()),
    }
}

/// Test commun à toutes les stratégies : la paire est-elle retenue ?
#[inline]
pub(crate) fn accepts_pair(a: &Aabb, a_static: bool, b: &Aabb, b_static: bool) -> bool {
    !(a_static && b_static) && a.overlaps(b)
}

/// Tri + suppression des doublons
pub(crate) fn finalize_pairs(mut pairs: Vec<BodyPair>) -> Vec<BodyPair> {
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

// =============================================================================
// Tests unitaires
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(id: u32, x: f32, y: f32, half: f32, is_static: bool) -> IndexProxy {
        IndexProxy {
            id: BodyId(id),
            aabb: Aabb::from_center(Vec2::new(x, y), Vec2::splat(half)),
            velocity: Vec2::ZERO,
            is_static,
        }
    }

    fn bounds() -> Aabb {
        Aabb::new(Vec2::splat(-500.0), Vec2::splat(500.0))
    }

    #[test]
    fn test_factory_kinds() {
        let cfg = WorldConfig::default();
        for kind in SpatialIndexType::ALL {
            let index = create_spatial_index(kind, bounds(), &cfg);
            assert_eq!(index.kind(), kind);
            assert!(index.is_empty());
        }
    }

    #[test]
    fn test_common_contract() {
        let cfg = WorldConfig::default();
        for kind in SpatialIndexType::ALL {
            let mut index = create_spatial_index(kind, bounds(), &cfg);
            index.insert(proxy(1, 0.0, 0.0, 10.0, false));
            index.insert(proxy(2, 15.0, 0.0, 10.0, false));
            index.insert(proxy(3, 0.0, 15.0, 10.0, true));
            index.insert(proxy(4, 10.0, 15.0, 10.0, true));
            index.insert(proxy(5, 300.0, 300.0, 10.0, false));

            let pairs = index.retrieve_candidates();
            let expected = vec![
                BodyPair::new(BodyId(1), BodyId(2)),
                BodyPair::new(BodyId(1), BodyId(3)),
                BodyPair::new(BodyId(1), BodyId(4)),
                BodyPair::new(BodyId(2), BodyId(3)),
                BodyPair::new(BodyId(2), BodyId(4)),
            ];
            assert_eq!(pairs, expected, "stratégie {kind}");

            assert!(index.remove(BodyId(2)));
            assert!(!index.remove(BodyId(2)));
            assert_eq!(index.len(), 4);

            // Le corps 5 rejoint le corps 1
            index.update(proxy(5, 5.0, -5.0, 10.0, false));
            let pairs = index.retrieve_candidates();
            assert!(pairs.contains(&BodyPair::new(BodyId(1), BodyId(5))), "stratégie {kind}");
            assert!(!pairs.iter().any(|p| p.contains(BodyId(2))));

            index.clear();
            assert!(index.is_empty());
            assert!(index.retrieve_candidates().is_empty());
        }
    }

    #[test]
    fn test_query_aabb_and_ray() {
        let cfg = WorldConfig::default();
        for kind in SpatialIndexType::ALL {
            let mut index = create_spatial_index(kind, bounds(), &cfg);
            index.insert(proxy(1, 0.0, 0.0, 5.0, false));
            index.insert(proxy(2, 100.0, 0.0, 5.0, true));
            index.insert(proxy(3, 0.0, 100.0, 5.0, false));

            let mut found = Vec::new();
            index.query_aabb(&Aabb::new(Vec2::new(-10.0, -10.0), Vec2::new(110.0, 10.0)), &mut found);
            found.sort();
            assert_eq!(found, vec![BodyId(1), BodyId(2)], "stratégie {kind}");

            let mut hits = Vec::new();
            index.query_ray(Vec2::new(-50.0, 0.0), Vec2::new(200.0, 0.0), &mut hits);
            hits.sort();
            assert_eq!(hits, vec![BodyId(1), BodyId(2)], "stratégie {kind}");
        }
    }

    #[test]
    fn test_touching_boxes_are_candidates() {
        let cfg = WorldConfig::default();
        for kind in SpatialIndexType::ALL {
            let mut index = create_spatial_index(kind, bounds(), &cfg);
            index.insert(proxy(1, 0.0, 0.0, 10.0, false));
            index.insert(proxy(2, 20.0, 0.0, 10.0, false));
            assert_eq!(index.retrieve_candidates().len(), 1, "stratégie {kind}");
        }
    }

    #[test]
    fn test_out_of_bounds_bodies_are_not_lost() {
        let cfg = WorldConfig::default();
        for kind in SpatialIndexType::ALL {
            let mut index = create_spatial_index(kind, bounds(), &cfg);
            index.insert(proxy(1, 900.0, 900.0, 10.0, false));
            index.insert(proxy(2, 905.0, 900.0, 10.0, false));
            index.insert(proxy(3, 490.0, 0.0, 20.0, false));
            index.insert(proxy(4, 510.0, 0.0, 5.0, true));
            let pairs = index.retrieve_candidates();
            assert_eq!(
                pairs,
                vec![
                    BodyPair::new(BodyId(1), BodyId(2)),
                    BodyPair::new(BodyId(3), BodyId(4)),
                ],
                "stratégie {kind}"
            );
        }
    }
}
