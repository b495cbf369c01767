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
// gs_phy_config.rs - Simulation tunables
// =============================================================================
//
// Tous les réglages du solveur sont regroupés ici. Ce sont des constantes
// ajustables, pas des exigences : les valeurs par défaut conviennent à un
// monde en "pixels" (gravité de 500 unités/s², objets de 5 à 100 unités).
//
// Repère : Y vers le HAUT. La gravité par défaut pointe donc vers -Y.
//
// =============================================================================

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Vitesse linéaire sous laquelle un corps est considéré au repos (unités/s)
pub const DEFAULT_LINEAR_SLEEP_THRESHOLD: f32 = 5.0;

/// Vitesse angulaire sous laquelle un corps est considéré au repos (rad/s)
pub const DEFAULT_ANGULAR_SLEEP_THRESHOLD: f32 = 0.1;

/// Paramètres globaux du monde.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Accélération de gravité (unités/s²)
    pub gravity: Vec2,

    /// Passes de résolution des contacts par pas
    pub velocity_iterations: usize,

    /// Passes de résolution des contraintes par pas
    pub constraint_iterations: usize,

    /// Fraction de l'erreur de position corrigée par pas (stabilisation de Baumgarte)
    pub baumgarte: f32,

    /// Pénétration tolérée avant correction (évite le tremblement au repos)
    pub penetration_slop: f32,

    /// Vitesse d'approche minimale pour appliquer la restitution
    pub restitution_threshold: f32,

    /// Mise en sommeil activée
    pub sleeping_enabled: bool,

    /// Temps de repos avant endormissement (secondes)
    pub sleep_time: f32,

    /// Marge fixe ajoutée aux AABB de l'arbre dynamique
    pub fat_margin: f32,

    /// Marge supplémentaire proportionnelle à la vitesse (secondes d'anticipation)
    pub velocity_margin_scale: f32,

    /// Nombre d'entrées d'une feuille du quadtree avant subdivision
    pub quadtree_bucket_size: usize,

    /// Profondeur maximale du quadtree
    pub quadtree_max_depth: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -500.0),
            velocity_iterations: 8,
            constraint_iterations: 10,
            baumgarte: 0.2,
            penetration_slop: 0.5,
            restitution_threshold: 20.0,
            sleeping_enabled: true,
            sleep_time: 0.5,
            fat_margin: 2.0,
            velocity_margin_scale: 0.1,
            quadtree_bucket_size: 8,
            quadtree_max_depth: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gravity_points_down() {
        let cfg = WorldConfig::default();
        assert!(cfg.gravity.y < 0.0);
        assert_eq!(cfg.gravity.x, 0.0);
    }
}
