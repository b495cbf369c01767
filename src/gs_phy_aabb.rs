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
// 20261019 - DynamicAABB (corps) devient Aabb (simple volume englobant).

// =============================================================================
// gs_phy_aabb.rs - Axis-Aligned Bounding Box
// =============================================================================
//
// Un AABB est une boîte rectangulaire dont les côtés sont alignés avec les axes.
// Ici ce n'est plus un corps mais un VOLUME ENGLOBANT : chaque corps calcule
// le sien à partir de sa forme et de sa transformation, et les index spatiaux
// ne manipulent que ces boîtes.
//
// CONVENTION :
// Les bords sont inclusifs. Deux boîtes qui se touchent se chevauchent, ce qui
// garde la phase large conservative (un contact au repos n'est jamais perdu).
//
// =============================================================================

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Coin inférieur gauche
    pub min: Vec2,
    /// Coin supérieur droit
    pub max: Vec2,
}

impl Aabb {
    /// Crée une boîte à partir de ses bornes
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Crée une boîte à partir du centre et des demi-dimensions
    #[inline]
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Plus petite boîte contenant tous les points (None si vide)
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let mut min = first;
        let mut max = first;
        for &p in &points[1..] {
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self { min, max })
    }

    /// Boîte dégénérée réduite à un point
    #[inline]
    pub fn from_point(p: Vec2) -> Self {
        Self { min: p, max: p }
    }

    /// Largeur
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Hauteur
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Centre
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Demi-dimensions
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Surface (heuristique d'insertion de l'arbre dynamique)
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Test de chevauchement (bords inclusifs)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// La boîte contient-elle entièrement `other` ?
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// La boîte contient-elle le point ?
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Union de deux boîtes
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Boîte agrandie d'une marge sur tous les côtés
    #[inline]
    pub fn expanded(&self, margin: f32) -> Aabb {
        let m = Vec2::splat(margin);
        Aabb {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Les quatre quadrants (ordre : SO, SE, NO, NE)
    pub fn quadrants(&self) -> [Aabb; 4] {
        let c = self.center();
        [
            Aabb::new(self.min, c),
            Aabb::new(Vec2::new(c.x, self.min.y), Vec2::new(self.max.x, c.y)),
            Aabb::new(Vec2::new(self.min.x, c.y), Vec2::new(c.x, self.max.y)),
            Aabb::new(c, self.max),
        ]
    }

    /// Intersection segment / boîte (méthode des "slabs").
    ///
    /// Retourne la fraction `t` ∈ [0, 1] d'entrée dans la boîte le long du
    /// segment `from → to`, ou `None` si le segment la manque.
    pub fn segment_hit(&self, from: Vec2, to: Vec2) -> Option<f32> {
        let d = to - from;
        let mut t_min = 0.0f32;
        let mut t_max = 1.0f32;

        for axis in 0..2 {
            let (o, dir, lo, hi) = if axis == 0 {
                (from.x, d.x, self.min.x, self.max.x)
            } else {
                (from.y, d.y, self.min.y, self.max.y)
            };

            if dir.abs() < 1.0e-12 {
                // Segment parallèle à la dalle : il doit être dedans
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO)
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_creation() {
        let aabb = Aabb::from_center(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0));
        assert_eq!(aabb.min, Vec2::new(80.0, 40.0));
        assert_eq!(aabb.max, Vec2::new(120.0, 60.0));
        assert_eq!(aabb.width(), 40.0);
        assert_eq!(aabb.height(), 20.0);
        assert_eq!(aabb.area(), 800.0);
        assert_eq!(aabb.center(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_touching_boxes_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        let c = Aabb::new(Vec2::new(10.1, 0.0), Vec2::new(20.0, 10.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_union_and_contains() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::new(Vec2::splat(2.0), Vec2::splat(3.0));
        let u = a.union(&b);
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert!(!a.contains(&u));
        assert!(u.expanded(1.0).contains(&u));
    }

    #[test]
    fn test_from_points() {
        assert!(Aabb::from_points(&[]).is_none());
        let aabb = Aabb::from_points(&[Vec2::new(1.0, -2.0), Vec2::new(-3.0, 4.0)]).unwrap();
        assert_eq!(aabb.min, Vec2::new(-3.0, -2.0));
        assert_eq!(aabb.max, Vec2::new(1.0, 4.0));
    }

    #[test]
    fn test_quadrants_cover_parent() {
        let parent = Aabb::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0));
        let quads = parent.quadrants();
        let total: f32 = quads.iter().map(|q| q.area()).sum();
        assert!((total - parent.area()).abs() < 1e-3);
        assert!(quads.iter().all(|q| parent.contains(q)));
    }

    #[test]
    fn test_segment_hit() {
        let aabb = Aabb::new(Vec2::new(10.0, -5.0), Vec2::new(20.0, 5.0));
        let t = aabb.segment_hit(Vec2::ZERO, Vec2::new(40.0, 0.0)).unwrap();
        assert!((t - 0.25).abs() < 1e-5);

        // Segment trop court
        assert!(aabb.segment_hit(Vec2::ZERO, Vec2::new(5.0, 0.0)).is_none());
        // Segment vertical hors de la dalle
        assert!(aabb.segment_hit(Vec2::new(0.0, -10.0), Vec2::new(0.0, 10.0)).is_none());
        // Départ à l'intérieur
        assert_eq!(aabb.segment_hit(Vec2::new(15.0, 0.0), Vec2::new(30.0, 0.0)), Some(0.0));
    }
}
