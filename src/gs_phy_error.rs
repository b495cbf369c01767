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
// gs_phy_error.rs - Usage errors
// =============================================================================
//
// Ces erreurs signalent une mauvaise utilisation de l'API par l'hôte.
// Elles sont retournées immédiatement, et l'opération fautive ne modifie
// rien dans le monde.
//
// Les cas numériques ordinaires (vecteurs quasi nuls, arêtes parallèles,
// vitesse relative nulle) ne sont JAMAIS des erreurs : ils ont des valeurs
// de repli.
//
// =============================================================================

use thiserror::Error;

use crate::gs_phy_constraint::ConstraintId;
use crate::gs_phy_types::BodyId;

/// Erreurs de l'API du monde physique.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhyError {
    /// Un corps porte déjà cet identifiant.
    #[error("identifiant de corps déjà utilisé : {0}")]
    DuplicateBodyId(BodyId),

    /// Aucun corps ne porte cet identifiant.
    #[error("identifiant de corps inconnu : {0}")]
    UnknownBodyId(BodyId),

    /// Le corps est encore référencé par une contrainte vivante.
    #[error("le corps {body} est encore référencé par la contrainte {constraint}")]
    ConstraintReferencesRemovedBody {
        /// Corps dont la suppression a été refusée.
        body: BodyId,
        /// Première contrainte qui le référence.
        constraint: ConstraintId,
    },

    /// Pas de temps nul, négatif ou non fini.
    #[error("pas de temps invalide : {0}")]
    DegenerateStep(f32),

    /// Forme invalide (polygone dégénéré, rayon négatif...).
    #[error("forme invalide : {0}")]
    InvalidShape(String),

    /// Masse invalide pour un corps dynamique.
    #[error("masse invalide pour un corps dynamique : {0}")]
    InvalidMass(f32),

    /// Aucune contrainte ne porte cet identifiant.
    #[error("identifiant de contrainte inconnu : {0}")]
    UnknownConstraintId(ConstraintId),

    /// Contrainte mal formée.
    #[error("contrainte invalide : {0}")]
    InvalidConstraint(String),
}

/// Raccourci pour les résultats de l'API.
pub type PhyResult<T> = Result<T, PhyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PhyError::DuplicateBodyId(BodyId(7));
        assert!(err.to_string().contains('7'));

        let err = PhyError::ConstraintReferencesRemovedBody {
            body: BodyId(3),
            constraint: ConstraintId(9),
        };
        let msg = err.to_string();
        assert!(msg.contains('3') && msg.contains('9'));
    }
}
