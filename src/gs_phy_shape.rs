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
// gs_phy_shape.rs - Collision shapes
// =============================================================================
//
// Deux formes convexes :
// - Circle  : un rayon, centré sur la position du corps
// - Polygon : sommets locaux + cache des sommets monde
//
// CHOIX D'ARCHITECTURE :
// ----------------------
// Pas de hiérarchie de traits : un enum avec un discriminant explicite
// (`ShapeKind`). La phase étroite choisit sa routine dans une petite table
// indexée par la paire de discriminants.
//
// POLYGONES :
// - au moins 3 sommets, surface non nulle, convexe
// - l'ordre des sommets est normalisé dans le sens trigonométrique
// - les sommets sont recentrés sur le centroïde : la position du corps est
//   donc son centre de masse
//
//        v3 -------- v2
//        |     ^ n    |      normale de l'arête i = perpendiculaire
//        |     |      |      sortante de (v[i] -> v[i+1])
//        v0 -------- v1
//
// =============================================================================

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gs_phy_aabb::Aabb;
use crate::gs_phy_error::{PhyError, PhyResult};
use crate::gs_phy_vec2::{cross, normalize_or, rotate, EPSILON};

/// Discriminant de forme (sert d'index dans la table de la phase étroite)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeKind {
    Circle = 0,
    Polygon = 1,
}

impl ShapeKind {
    /// Index dans les tables de dispatch
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

// =============================================================================
// Polygon - Polygone convexe
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon {
    /// Sommets locaux (sens trigonométrique, centrés sur le centroïde)
    local_vertices: Vec<Vec2>,
    /// Normales sortantes locales (une par arête)
    local_normals: Vec<Vec2>,
    /// Sommets monde (cache, recalculé à chaque changement de transformation)
    world_vertices: Vec<Vec2>,
    /// Normales monde (cache)
    world_normals: Vec<Vec2>,
    /// Surface
    area: f32,
}

impl Polygon {
    /// Construit un polygone convexe à partir de sommets quelconques
    pub fn new(vertices: &[Vec2]) -> PhyResult<Self> {
        if vertices.len() < 3 {
            return Err(PhyError::InvalidShape(format!(
                "un polygone demande au moins 3 sommets ({} fournis)",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(PhyError::InvalidShape("sommet non fini".into()));
        }

        // Surface signée (formule du lacet) pour connaître le sens
        let n = vertices.len();
        let mut signed_area = 0.0f32;
        for i in 0..n {
            signed_area += cross(vertices[i], vertices[(i + 1) % n]);
        }
        signed_area *= 0.5;

        if signed_area.abs() < EPSILON {
            return Err(PhyError::InvalidShape("polygone de surface nulle".into()));
        }

        let mut verts: Vec<Vec2> = vertices.to_vec();
        if signed_area < 0.0 {
            verts.reverse();
        }

        // Convexité : toutes les arêtes tournent à gauche
        for i in 0..n {
            let a = verts[i];
            let b = verts[(i + 1) % n];
            let c = verts[(i + 2) % n];
            if (b - a).length_squared() < EPSILON {
                return Err(PhyError::InvalidShape(format!("arête {i} de longueur nulle")));
            }
            if cross(b - a, c - b) < -EPSILON {
                return Err(PhyError::InvalidShape("polygone non convexe".into()));
            }
        }

        // Centroïde (moyenne pondérée des triangles en éventail)
        let area = signed_area.abs();
        let origin = verts[0];
        let mut centroid = Vec2::ZERO;
        for i in 1..n - 1 {
            let e1 = verts[i] - origin;
            let e2 = verts[i + 1] - origin;
            let tri_area = 0.5 * cross(e1, e2);
            centroid += (e1 + e2) * (tri_area / 3.0);
        }
        centroid = origin + centroid / area;

        let local_vertices: Vec<Vec2> = verts.iter().map(|v| *v - centroid).collect();
        let local_normals: Vec<Vec2> = (0..n)
            .map(|i| {
                let edge = local_vertices[(i + 1) % n] - local_vertices[i];
                normalize_or(Vec2::new(edge.y, -edge.x), Vec2::Y)
            })
            .collect();

        Ok(Self {
            world_vertices: local_vertices.clone(),
            world_normals: local_normals.clone(),
            local_vertices,
            local_normals,
            area,
        })
    }

    /// Nombre de sommets
    #[inline]
    pub fn len(&self) -> usize {
        self.local_vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.local_vertices.is_empty()
    }

    /// Sommets locaux
    #[inline]
    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local_vertices
    }

    /// Sommets monde (valides après `update_transform`)
    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.world_vertices
    }

    /// Normales monde (valides après `update_transform`)
    #[inline]
    pub fn normals(&self) -> &[Vec2] {
        &self.world_normals
    }

    /// Surface
    #[inline]
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Recalcule le cache monde
    pub fn update_transform(&mut self, position: Vec2, rotation: f32) {
        let rot = Vec2::from_angle(rotation);
        for (w, l) in self.world_vertices.iter_mut().zip(&self.local_vertices) {
            *w = position + rot.rotate(*l);
        }
        for (w, l) in self.world_normals.iter_mut().zip(&self.local_normals) {
            *w = rot.rotate(*l);
        }
    }

    /// Moment d'inertie autour du centroïde pour une masse donnée
    fn inertia(&self, mass: f32) -> f32 {
        // Somme sur les triangles (centroïde, v[i], v[i+1])
        let n = self.local_vertices.len();
        let mut i_sum = 0.0f32;
        for i in 0..n {
            let e1 = self.local_vertices[i];
            let e2 = self.local_vertices[(i + 1) % n];
            let d = cross(e1, e2);
            let intx2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
            let inty2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
            i_sum += (0.25 / 3.0) * d * (intx2 + inty2);
        }
        let density = mass / self.area;
        i_sum * density
    }

    /// Le point (monde) est-il à l'intérieur ?
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.world_vertices
            .iter()
            .zip(&self.world_normals)
            .all(|(v, n)| n.dot(p - *v) <= 0.0)
    }

    /// Lancer de rayon (Cyrus-Beck). Un segment qui démarre à l'intérieur ne touche pas.
    fn ray_cast(&self, from: Vec2, to: Vec2) -> Option<(f32, Vec2)> {
        let d = to - from;
        let mut lower = 0.0f32;
        let mut upper = 1.0f32;
        let mut hit_edge: Option<usize> = None;

        for (i, (v, n)) in self.world_vertices.iter().zip(&self.world_normals).enumerate() {
            let numerator = n.dot(*v - from);
            let denominator = n.dot(d);

            if denominator.abs() < 1.0e-12 {
                if numerator < 0.0 {
                    return None;
                }
            } else if denominator < 0.0 && numerator < lower * denominator {
                lower = numerator / denominator;
                hit_edge = Some(i);
            } else if denominator > 0.0 && numerator < upper * denominator {
                upper = numerator / denominator;
            }

            if upper < lower {
                return None;
            }
        }

        hit_edge.map(|i| (lower, self.world_normals[i]))
    }
}

// =============================================================================
// Shape - Variante étiquetée
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    /// Cercle centré sur la position du corps
    Circle { radius: f32 },
    /// Polygone convexe
    Polygon(Polygon),
}

impl Shape {
    /// Cercle (le rayon est validé à l'ajout dans le monde)
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Polygone convexe quelconque
    pub fn polygon(vertices: &[Vec2]) -> PhyResult<Self> {
        Ok(Shape::Polygon(Polygon::new(vertices)?))
    }

    /// Rectangle centré
    pub fn rectangle(width: f32, height: f32) -> PhyResult<Self> {
        let hw = width * 0.5;
        let hh = height * 0.5;
        Self::polygon(&[
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    /// Polygone régulier inscrit dans un cercle de rayon donné
    pub fn regular_polygon(sides: usize, radius: f32) -> PhyResult<Self> {
        let step = std::f32::consts::TAU / sides.max(1) as f32;
        let vertices: Vec<Vec2> = (0..sides)
            .map(|i| rotate(Vec2::new(radius, 0.0), step * i as f32))
            .collect();
        Self::polygon(&vertices)
    }

    /// Discriminant
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Vérifie la forme avant l'ajout dans le monde
    pub fn validate(&self) -> PhyResult<()> {
        match self {
            Shape::Circle { radius } => {
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(PhyError::InvalidShape(format!("rayon invalide : {radius}")));
                }
                Ok(())
            }
            // Un Polygon ne peut être construit que par Polygon::new
            Shape::Polygon(poly) => {
                if poly.len() < 3 {
                    return Err(PhyError::InvalidShape("polygone vide".into()));
                }
                Ok(())
            }
        }
    }

    /// Moment d'inertie pour une masse donnée
    pub fn inertia(&self, mass: f32) -> f32 {
        match self {
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
            Shape::Polygon(poly) => poly.inertia(mass),
        }
    }

    /// Met à jour le cache monde (no-op pour un cercle)
    #[inline]
    pub fn update_transform(&mut self, position: Vec2, rotation: f32) {
        if let Shape::Polygon(poly) = self {
            poly.update_transform(position, rotation);
        }
    }

    /// AABB serrée. Pour un polygone, suppose le cache monde à jour.
    pub fn aabb(&self, position: Vec2) -> Aabb {
        match self {
            Shape::Circle { radius } => Aabb::from_center(position, Vec2::splat(*radius)),
            Shape::Polygon(poly) => {
                Aabb::from_points(poly.vertices()).unwrap_or_else(|| Aabb::from_point(position))
            }
        }
    }

    /// Test d'appartenance d'un point monde
    pub fn contains_point(&self, position: Vec2, p: Vec2) -> bool {
        match self {
            Shape::Circle { radius } => (p - position).length_squared() <= radius * radius,
            Shape::Polygon(poly) => poly.contains_point(p),
        }
    }

    /// Lancer de rayon sur le segment `from → to`.
    ///
    /// Retourne `(fraction, normale)` du premier point d'entrée.
    pub fn ray_cast(&self, position: Vec2, from: Vec2, to: Vec2) -> Option<(f32, Vec2)> {
        match self {
            Shape::Circle { radius } => {
                let s = from - position;
                let d = to - from;
                let rr = d.length_squared();
                if rr < EPSILON * EPSILON {
                    return None;
                }
                let b = s.dot(d);
                let c = s.length_squared() - radius * radius;
                let sigma = b * b - rr * c;
                if sigma < 0.0 {
                    return None;
                }
                let a = -(b + sigma.sqrt());
                if a >= 0.0 && a <= rr {
                    let t = a / rr;
                    let normal = normalize_or(s + d * t, -d.normalize_or_zero());
                    Some((t, normal))
                } else {
                    None
                }
            }
            Shape::Polygon(poly) => poly.ray_cast(from, to),
        }
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================
