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
// gs_phy_narrow_phase.rs - Separating Axis Theorem
// =============================================================================
//
// Test exact d'une paire candidate et génération du manifold de contact.
//
// THÉORÈME DES AXES SÉPARATEURS :
// Deux formes convexes sont disjointes si et seulement s'il existe un axe
// sur lequel leurs projections ne se chevauchent pas. En 2D, il suffit de
// tester les normales des arêtes (plus, pour un cercle, l'axe sommet le
// plus proche → centre).
//
// DISPATCH :
// Une table 2x2 de fonctions indexée par (ShapeKind A, ShapeKind B).
// Le cas polygone/cercle réutilise cercle/polygone en inversant la normale.
//
//                 B = Circle           B = Polygon
//   A = Circle    circle_circle        circle_polygon
//   A = Polygon   polygon_circle       polygon_polygon
//
// CONVENTIONS :
// - la normale va TOUJOURS de A vers B
// - la pénétration est >= 0 ; un contact tangent (0) est rapporté
// - tous les points d'un manifold partagent normale et pénétration
//
// =============================================================================

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gs_phy_shape::{Polygon, Shape};
use crate::gs_phy_types::{BodyId, RigidBody};
use crate::gs_phy_vec2::{normalize_or, EPSILON};

/// Séparation tolérée pour garder un point clippé
const CONTACT_TOLERANCE: f32 = 0.01;

/// Préférence pour la face de référence de A (évite d'alterner d'une frame à l'autre)
const RELATIVE_TOLERANCE: f32 = 0.98;
const ABSOLUTE_TOLERANCE: f32 = 0.001;

/// Point de contact
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactPoint {
    /// Position monde
    pub position: Vec2,
    /// Impulsion normale accumulée par le résolveur
    pub(crate) normal_impulse: f32,
    /// Impulsion tangentielle accumulée par le résolveur
    pub(crate) tangent_impulse: f32,
}

impl ContactPoint {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
        }
    }

    /// Impulsion normale appliquée au dernier pas
    #[inline]
    pub fn normal_impulse(&self) -> f32 {
        self.normal_impulse
    }

    /// Impulsion de frottement appliquée au dernier pas
    #[inline]
    pub fn tangent_impulse(&self) -> f32 {
        self.tangent_impulse
    }
}

/// Description d'un chevauchement entre deux corps
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Manifold {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Normale unitaire de A vers B
    pub normal: Vec2,
    /// Profondeur de pénétration (partagée par tous les points)
    pub penetration: f32,
    /// Un ou deux points
    pub contacts: Vec<ContactPoint>,
}

/// Résultat géométrique brut d'un test de forme
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeContact {
    pub normal: Vec2,
    pub penetration: f32,
    pub points: Vec<Vec2>,
}

impl ShapeContact {
    fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

type CollideFn = fn(&Shape, Vec2, &Shape, Vec2) -> Option<ShapeContact>;

/// Table de dispatch [kind A][kind B]
const DISPATCH: [[CollideFn; 2]; 2] = [
    [circle_circle, circle_polygon],
    [polygon_circle, polygon_polygon],
];

/// Teste deux formes placées (cache monde des polygones à jour)
pub fn collide_shapes(
    shape_a: &Shape,
    position_a: Vec2,
    shape_b: &Shape,
    position_b: Vec2,
) -> Option<ShapeContact> {
    let f = DISPATCH[shape_a.kind().index()][shape_b.kind().index()];
    f(shape_a, position_a, shape_b, position_b)
}

/// Teste deux corps et construit leur manifold
pub fn collide(a: &RigidBody, b: &RigidBody) -> Option<Manifold> {
    let contact = collide_shapes(&a.shape, a.position, &b.shape, b.position)?;
    Some(Manifold {
        body_a: a.id(),
        body_b: b.id(),
        normal: contact.normal,
        penetration: contact.penetration,
        contacts: contact.points.into_iter().map(ContactPoint::new).collect(),
    })
}

// =============================================================================
// Cercle / cercle
// =============================================================================

fn circle_circle(a: &Shape, pa: Vec2, b: &Shape, pb: Vec2) -> Option<ShapeContact> {
    let (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) = (a, b) else {
        return None;
    };
    let d = pb - pa;
    let r = ra + rb;
    let dist_sq = d.length_squared();
    if dist_sq > r * r {
        return None;
    }

    let dist = dist_sq.sqrt();
    // Centres confondus : normale de repli
    let normal = if dist > EPSILON { d / dist } else { Vec2::Y };
    let penetration = r - dist;
    // Milieu de la zone de recouvrement
    let point = pa + normal * (ra - penetration * 0.5);

    Some(ShapeContact {
        normal,
        penetration,
        points: vec![point],
    })
}

// =============================================================================
// Cercle / polygone
// =============================================================================

/// Projection d'un polygone sur un axe
fn project_polygon(poly: &Polygon, axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for v in poly.vertices() {
        let p = v.dot(axis);
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

fn circle_polygon(a: &Shape, center: Vec2, b: &Shape, _pb: Vec2) -> Option<ShapeContact> {
    let (Shape::Circle { radius }, Shape::Polygon(poly)) = (a, b) else {
        return None;
    };
    let radius = *radius;

    // Axe supplémentaire : sommet le plus proche → centre
    let closest = poly
        .vertices()
        .iter()
        .copied()
        .min_by(|x, y| {
            (*x - center)
                .length_squared()
                .total_cmp(&(*y - center).length_squared())
        })?;
    let extra = center - closest;
    let extra_axis = (extra.length_squared() > EPSILON).then(|| extra.normalize());

    let mut best_penetration = f32::INFINITY;
    let mut best_normal = Vec2::ZERO;

    for axis in poly.normals().iter().copied().chain(extra_axis) {
        let (min_p, max_p) = project_polygon(poly, axis);
        let c = center.dot(axis);
        let (min_c, max_c) = (c - radius, c + radius);

        // Pousser le polygone vers +axe ou vers -axe
        let push_pos = max_c - min_p;
        let push_neg = max_p - min_c;
        if push_pos < 0.0 || push_neg < 0.0 {
            return None;
        }
        let (depth, normal) = if push_pos <= push_neg {
            (push_pos, axis)
        } else {
            (push_neg, -axis)
        };
        if depth < best_penetration {
            best_penetration = depth;
            best_normal = normal;
        }
    }

    let point = center + best_normal * (radius - best_penetration * 0.5);
    Some(ShapeContact {
        normal: best_normal,
        penetration: best_penetration,
        points: vec![point],
    })
}

fn polygon_circle(a: &Shape, pa: Vec2, b: &Shape, pb: Vec2) -> Option<ShapeContact> {
    circle_polygon(b, pb, a, pa).map(ShapeContact::flipped)
}

// =============================================================================
// Polygone / polygone
// =============================================================================
//
// 1. Séparation maximale sur les normales de A, puis sur celles de B.
//    Une séparation > 0 : pas de collision.
// 2. Face de référence : celle qui sépare le plus (A préférée à égalité).
// 3. Arête incidente : l'arête de l'autre polygone la plus antiparallèle.
// 4. Clipping de l'arête incidente par les deux plans latéraux de la face
//    de référence, puis on garde les points sous la face.
//
//             plan latéral        plan latéral
//                  |                   |
//        ----------v1=====référence====v2---------
//                  |   x           x   |      x = points gardés
//              incidente  \_______/    |
//
// =============================================================================

/// Arête de `p1` qui sépare le plus `p2` : (indice, séparation)
fn find_max_separation(p1: &Polygon, p2: &Polygon) -> (usize, f32) {
    let mut best_index = 0;
    let mut best_sep = f32::NEG_INFINITY;
    for (i, (n, v1)) in p1.normals().iter().zip(p1.vertices()).enumerate() {
        let sep = p2
            .vertices()
            .iter()
            .map(|v2| n.dot(*v2 - *v1))
            .fold(f32::INFINITY, f32::min);
        if sep > best_sep {
            best_sep = sep;
            best_index = i;
        }
    }
    (best_index, best_sep)
}

/// Garde la partie du segment telle que `normal · p <= offset`
fn clip_segment(points: &[Vec2], normal: Vec2, offset: f32) -> Vec<Vec2> {
    let mut out = Vec::with_capacity(2);
    let (p0, p1) = match points {
        [p0, p1, ..] => (*p0, *p1),
        // Extrémité posée exactement sur le plan précédent
        [p] => {
            if normal.dot(*p) - offset <= 0.0 {
                out.push(*p);
            }
            return out;
        }
        [] => return out,
    };
    let d0 = normal.dot(p0) - offset;
    let d1 = normal.dot(p1) - offset;

    if d0 <= 0.0 {
        out.push(p0);
    }
    if d1 <= 0.0 {
        out.push(p1);
    }
    // Les deux extrémités de part et d'autre du plan
    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        out.push(p0 + (p1 - p0) * t);
    }
    out
}

fn polygon_polygon(a: &Shape, _pa: Vec2, b: &Shape, _pb: Vec2) -> Option<ShapeContact> {
    let (Shape::Polygon(poly_a), Shape::Polygon(poly_b)) = (a, b) else {
        return None;
    };

    let (edge_a, sep_a) = find_max_separation(poly_a, poly_b);
    if sep_a > 0.0 {
        return None;
    }
    let (edge_b, sep_b) = find_max_separation(poly_b, poly_a);
    if sep_b > 0.0 {
        return None;
    }

    // Les séparations sont négatives : "plus grande" = moins profonde
    let (reference, incident, ref_edge, separation, flip) =
        if sep_b > RELATIVE_TOLERANCE * sep_a + ABSOLUTE_TOLERANCE {
            (poly_b, poly_a, edge_b, sep_b, true)
        } else {
            (poly_a, poly_b, edge_a, sep_a, false)
        };

    let ref_normal = reference.normals()[ref_edge];
    let n_ref = reference.len();
    let v1 = reference.vertices()[ref_edge];
    let v2 = reference.vertices()[(ref_edge + 1) % n_ref];
    let tangent = normalize_or(v2 - v1, Vec2::new(-ref_normal.y, ref_normal.x));

    // Arête incidente : normale la plus opposée à la normale de référence
    let n_inc = incident.len();
    let inc_edge = incident
        .normals()
        .iter()
        .enumerate()
        .min_by(|(_, x), (_, y)| x.dot(ref_normal).total_cmp(&y.dot(ref_normal)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let incident_edge = [
        incident.vertices()[inc_edge],
        incident.vertices()[(inc_edge + 1) % n_inc],
    ];

    // Clipping par les plans latéraux
    let clipped = clip_segment(&incident_edge, -tangent, -tangent.dot(v1));
    let clipped = clip_segment(&clipped, tangent, tangent.dot(v2));

    let mut points: Vec<Vec2> = clipped
        .iter()
        .filter_map(|p| {
            let sep = ref_normal.dot(*p - v1);
            (sep <= CONTACT_TOLERANCE).then(|| *p - ref_normal * (sep * 0.5))
        })
        .collect();

    // Repli : sommet le plus profond de l'incident
    if points.is_empty() {
        let deepest = incident
            .vertices()
            .iter()
            .copied()
            .min_by(|x, y| ref_normal.dot(*x - v1).total_cmp(&ref_normal.dot(*y - v1)))?;
        let sep = ref_normal.dot(deepest - v1);
        points.push(deepest - ref_normal * (sep * 0.5));
    }

    let normal = if flip { -ref_normal } else { ref_normal };
    Some(ShapeContact {
        normal,
        penetration: (-separation).max(0.0),
        points,
    })
}

// =============================================================================
// Tests unitaires
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(mut shape: Shape, position: Vec2, rotation: f32) -> Shape {
        shape.update_transform(position, rotation);
        shape
    }

    fn rect(w: f32, h: f32, position: Vec2) -> Shape {
        placed(Shape::rectangle(w, h).unwrap(), position, 0.0)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_dispatch_table_matches_kinds() {
        assert_eq!(Shape::circle(1.0).kind().index(), 0);
        assert_eq!(rect(2.0, 2.0, Vec2::ZERO).kind().index(), 1);
    }

    #[test]
    fn test_clip_keeps_endpoint_on_side_plane() {
        // p0 est exactement sur le premier plan, p1 au-delà
        let edge = [Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)];
        let first = clip_segment(&edge, Vec2::X, 0.0);
        assert_eq!(first, vec![Vec2::new(0.0, 0.0)]);

        // Le point isolé survit au second plan s'il est du bon côté
        let second = clip_segment(&first, -Vec2::X, 1.0);
        assert_eq!(second, vec![Vec2::new(0.0, 0.0)]);
        assert!(clip_segment(&first, -Vec2::X, -1.0).is_empty());
    }

    #[test]
    fn test_circle_circle_penetration() {
        let a = Shape::circle(10.0);
        let b = Shape::circle(5.0);
        let c = collide_shapes(&a, Vec2::ZERO, &b, Vec2::new(12.0, 0.0)).unwrap();
        assert!(approx(c.penetration, 3.0));
        assert_eq!(c.normal, Vec2::X);
        assert_eq!(c.points.len(), 1);
        assert!(approx(c.points[0].x, 8.5));

        // Tangents : contact au repos
        let c = collide_shapes(&a, Vec2::ZERO, &b, Vec2::new(0.0, 15.0)).unwrap();
        assert!(approx(c.penetration, 0.0));

        // Séparés
        assert!(collide_shapes(&a, Vec2::ZERO, &b, Vec2::new(15.1, 0.0)).is_none());
    }

    #[test]
    fn test_circle_circle_coincident_centers() {
        let a = Shape::circle(2.0);
        let c = collide_shapes(&a, Vec2::ONE, &a, Vec2::ONE).unwrap();
        assert_eq!(c.normal, Vec2::Y);
        assert!(approx(c.penetration, 4.0));
    }

    #[test]
    fn test_circle_on_box_face() {
        let circle = Shape::circle(10.0);
        let ground = rect(40.0, 40.0, Vec2::ZERO);
        let c = collide_shapes(&circle, Vec2::new(0.0, 25.0), &ground, Vec2::ZERO).unwrap();
        assert!(approx(c.penetration, 5.0));
        assert!(approx(c.normal.y, -1.0));
        assert!(approx(c.points[0].y, 17.5));

        // Ordre inversé : la normale suit
        let c = collide_shapes(&ground, Vec2::ZERO, &circle, Vec2::new(0.0, 25.0)).unwrap();
        assert!(approx(c.normal.y, 1.0));
        assert!(approx(c.penetration, 5.0));
    }

    #[test]
    fn test_circle_near_box_corner() {
        let circle = Shape::circle(5.0);
        let b = rect(20.0, 20.0, Vec2::ZERO);
        // Dans l'AABB du coin, mais hors du cercle (séparé sur l'axe du sommet)
        let p = Vec2::new(14.0, 14.0);
        assert!(collide_shapes(&circle, p, &b, Vec2::ZERO).is_none());

        let p = Vec2::new(12.0, 12.0);
        let c = collide_shapes(&circle, p, &b, Vec2::ZERO).unwrap();
        let expected = 5.0 - (2.0f32 * 2.0 * 2.0).sqrt();
        assert!(approx(c.penetration, expected));
        assert!(c.normal.x < 0.0 && c.normal.y < 0.0);
    }

    #[test]
    fn test_box_box_edge_contact_two_points() {
        let a = rect(40.0, 40.0, Vec2::ZERO);
        let b = rect(40.0, 40.0, Vec2::new(30.0, 10.0));
        let c = collide_shapes(&a, Vec2::ZERO, &b, Vec2::new(30.0, 10.0)).unwrap();
        assert!(approx(c.penetration, 10.0));
        assert!(approx(c.normal.x, 1.0));
        assert_eq!(c.points.len(), 2);
        for p in &c.points {
            assert!(approx(p.x, 15.0));
        }
        let mut ys: Vec<f32> = c.points.iter().map(|p| p.y).collect();
        ys.sort_by(f32::total_cmp);
        assert!(approx(ys[0], -10.0) && approx(ys[1], 20.0));
    }

    #[test]
    fn test_box_box_normal_points_from_a_to_b() {
        let a = rect(40.0, 40.0, Vec2::new(30.0, 10.0));
        let b = rect(40.0, 40.0, Vec2::ZERO);
        let c = collide_shapes(&a, Vec2::new(30.0, 10.0), &b, Vec2::ZERO).unwrap();
        assert!(approx(c.normal.x, -1.0));
        assert!(approx(c.penetration, 10.0));
    }

    #[test]
    fn test_box_box_separated_and_touching() {
        let a = rect(10.0, 10.0, Vec2::ZERO);
        let far = rect(10.0, 10.0, Vec2::new(10.5, 0.0));
        assert!(collide_shapes(&a, Vec2::ZERO, &far, Vec2::new(10.5, 0.0)).is_none());

        let touching = rect(10.0, 10.0, Vec2::new(10.0, 0.0));
        let c = collide_shapes(&a, Vec2::ZERO, &touching, Vec2::new(10.0, 0.0)).unwrap();
        assert!(approx(c.penetration, 0.0));
        assert_eq!(c.points.len(), 2);
    }

    #[test]
    fn test_rotated_box_corner_gives_one_point() {
        let ground = rect(100.0, 20.0, Vec2::ZERO);
        let pos = Vec2::new(0.0, 10.0 + 5.0 * std::f32::consts::SQRT_2 - 1.0);
        let diamond = placed(Shape::rectangle(10.0, 10.0).unwrap(), pos, std::f32::consts::FRAC_PI_4);
        let c = collide_shapes(&ground, Vec2::ZERO, &diamond, pos).unwrap();
        assert!(approx(c.normal.y, 1.0));
        assert!(approx(c.penetration, 1.0));
        assert_eq!(c.points.len(), 1);
        assert!(approx(c.points[0].x, 0.0));
    }

    #[test]
    fn test_collide_bodies_builds_manifold() {
        let mut a = RigidBody::new_dynamic(Shape::circle(5.0), Vec2::ZERO, 1.0);
        a.id = BodyId(4);
        let mut b = RigidBody::new_dynamic(Shape::circle(5.0), Vec2::new(8.0, 0.0), 1.0);
        b.id = BodyId(9);
        let m = collide(&a, &b).unwrap();
        assert_eq!((m.body_a, m.body_b), (BodyId(4), BodyId(9)));
        assert_eq!(m.contacts.len(), 1);
        assert_eq!(m.contacts[0].normal_impulse(), 0.0);
    }
}
