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
// 20261019 - Vec2 maison remplacé par glam, ne restent que les produits 2D.

// =============================================================================
// gs_phy_vec2.rs - 2D vector helpers
// =============================================================================
//
// Le type vecteur est désormais `glam::Vec2`. Ce module regroupe les
// opérations propres à la physique 2D que glam n'expose pas directement :
//
// - cross(a, b)      : produit vectoriel 2D (scalaire) a.x*b.y - a.y*b.x
// - cross_sv(s, v)   : ω × r, vitesse tangentielle d'un point en rotation
// - cross_vs(v, s)   : v × s, utilisé pour les tangentes
// - rotate(v, angle) : rotation d'un vecteur local vers le monde
//
// En 2D, la vitesse angulaire est un scalaire (axe Z implicite). Le produit
// ω × r donne donc un vecteur perpendiculaire à r, de norme |ω|·|r|.
//
// =============================================================================

pub use glam::{Mat2, Vec2};

/// Seuil en dessous duquel une longueur est considérée nulle
pub const EPSILON: f32 = 1.0e-6;

/// Produit vectoriel 2D : a × b (composante Z du produit 3D)
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Produit scalaire × vecteur : s × v = (-s*v.y, s*v.x)
///
/// Donne la vitesse d'un point situé à `v` du centre d'un corps tournant à `s` rad/s.
#[inline]
pub fn cross_sv(s: f32, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}

/// Produit vecteur × scalaire : v × s = (s*v.y, -s*v.x)
#[inline]
pub fn cross_vs(v: Vec2, s: f32) -> Vec2 {
    Vec2::new(s * v.y, -s * v.x)
}

/// Tourne un vecteur d'un angle (radians, sens trigonométrique)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Normalise `v`, ou retourne `fallback` si `v` est quasi nul
#[inline]
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > EPSILON * EPSILON {
        v / len_sq.sqrt()
    } else {
        fallback
    }
}

/// Crée un Vec2 - fonction helper pour une syntaxe concise
#[inline]
pub fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

// =============================================================================
// Tests unitaires
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_orientation() {
        // X × Y = +1 (sens trigonométrique)
        assert!((cross(Vec2::X, Vec2::Y) - 1.0).abs() < 1e-6);
        assert!((cross(Vec2::Y, Vec2::X) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cross_sv_is_perpendicular() {
        let r = vec2(3.0, 4.0);
        let v = cross_sv(2.0, r);
        assert!(v.dot(r).abs() < 1e-5);
        assert!((v.length() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::X, std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_or_fallback() {
        assert_eq!(normalize_or(Vec2::ZERO, Vec2::Y), Vec2::Y);
        let n = normalize_or(vec2(0.0, 5.0), Vec2::X);
        assert!((n.y - 1.0).abs() < 1e-6);
    }
}
