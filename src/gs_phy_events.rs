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
// gs_phy_events.rs - Collision events and step statistics
// =============================================================================
//
// En fin de pas, les contacts du pas courant sont comparés à ceux du pas
// précédent (clé : paire ordonnée de corps) :
//
//   précédent   courant     phase
//   ---------   -------     ---------
//   absent      présent     Began
//   présent     présent     Persisted
//   présent     absent      Ended
//
// Les écouteurs sont appelés de façon synchrone, avant le retour de step().
//
// =============================================================================

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use log::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gs_phy_narrow_phase::{ContactPoint, Manifold};
use crate::gs_phy_types::{BodyId, BodyPair};

/// Phase d'un contact
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionPhase {
    /// Premier pas de contact
    Began,
    /// Contact maintenu
    Persisted,
    /// Fin du contact
    Ended,
}

/// Événement de collision (un par paire et par pas)
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionEvent {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Points de contact (vide pour `Ended`)
    pub contacts: Vec<ContactPoint>,
    /// Normale de A vers B (dernière connue pour `Ended`)
    pub normal: Vec2,
    pub penetration: f32,
    pub phase: CollisionPhase,
}

impl CollisionEvent {
    fn from_manifold(m: &Manifold, phase: CollisionPhase) -> Self {
        Self {
            body_a: m.body_a,
            body_b: m.body_b,
            contacts: m.contacts.clone(),
            normal: m.normal,
            penetration: m.penetration,
            phase,
        }
    }

    /// Paire ordonnée de l'événement
    pub fn pair(&self) -> BodyPair {
        BodyPair::new(self.body_a, self.body_b)
    }

    /// L'événement concerne-t-il ce corps ?
    pub fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id
    }
}

/// Compare les contacts de deux pas successifs.
///
/// # Returns
/// Les événements `Began` / `Persisted` dans l'ordre des paires, puis les `Ended`.
pub fn diff_contacts(
    previous: &BTreeMap<BodyPair, Manifold>,
    current: &BTreeMap<BodyPair, Manifold>,
) -> Vec<CollisionEvent> {
    let mut events = Vec::with_capacity(current.len());
    for (pair, m) in current {
        let phase = if previous.contains_key(pair) {
            CollisionPhase::Persisted
        } else {
            CollisionPhase::Began
        };
        events.push(CollisionEvent::from_manifold(m, phase));
    }
    for (pair, m) in previous {
        if !current.contains_key(pair) {
            let mut ev = CollisionEvent::from_manifold(m, CollisionPhase::Ended);
            ev.contacts.clear();
            events.push(ev);
        }
    }
    events
}

// =============================================================================
// Statistiques
// =============================================================================

/// Statistiques du dernier pas
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepStats {
    /// Paires rendues par la phase large
    pub candidate_pairs: usize,
    /// Paires retenues après filtrage
    pub filtered_pairs: usize,
    /// Manifolds actifs (y compris ceux conservés pendant le sommeil)
    pub manifolds: usize,
    pub contact_points: usize,
    pub awake_bodies: usize,
    pub sleeping_bodies: usize,
    /// Îlots de corps non statiques
    pub islands: usize,
}

// =============================================================================
// Écouteurs
// =============================================================================

/// Identifiant d'écouteur (rendu par `World::on_collision`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

pub type CollisionCallback = Box<dyn FnMut(&CollisionEvent)>;

/// Registre des écouteurs de collision
#[derive(Default)]
pub struct CollisionListeners {
    listeners: Vec<(ListenerId, CollisionCallback)>,
    next_id: u32,
}

impl fmt::Debug for CollisionListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl CollisionListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&CollisionEvent) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Retire un écouteur. Renvoie false s'il n'existe pas.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        let removed = self.listeners.len() != before;
        if !removed {
            warn!("écouteur {:?} inconnu", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Appelle chaque écouteur pour chaque événement, dans l'ordre d'enregistrement
    pub fn dispatch(&mut self, events: &[CollisionEvent]) {
        if events.is_empty() {
            return;
        }
        for (_, callback) in self.listeners.iter_mut() {
            for ev in events {
                callback(ev);
            }
        }
    }
}

// =============================================================================
// Tests unitaires
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn manifold(a: u32, b: u32) -> Manifold {
        Manifold {
            body_a: BodyId(a),
            body_b: BodyId(b),
            normal: Vec2::Y,
            penetration: 1.0,
            contacts: vec![ContactPoint::new(Vec2::ZERO)],
        }
    }

    fn map(pairs: &[(u32, u32)]) -> BTreeMap<BodyPair, Manifold> {
        pairs
            .iter()
            .map(|&(a, b)| (BodyPair::new(BodyId(a), BodyId(b)), manifold(a, b)))
            .collect()
    }

    #[test]
    fn test_diff_phases() {
        let prev = map(&[(1, 2), (2, 3)]);
        let cur = map(&[(2, 3), (4, 5)]);
        let events = diff_contacts(&prev, &cur);
        let phases: Vec<_> = events.iter().map(|e| (e.body_a.0, e.phase)).collect();
        assert_eq!(
            phases,
            vec![
                (2, CollisionPhase::Persisted),
                (4, CollisionPhase::Began),
                (1, CollisionPhase::Ended),
            ]
        );
        assert!(events[2].contacts.is_empty());
        assert_eq!(events[2].normal, Vec2::Y);
    }

    #[test]
    fn test_listeners_dispatch_and_remove() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = CollisionListeners::new();
        let sink = Rc::clone(&seen);
        let id = listeners.add(move |ev| sink.borrow_mut().push(ev.phase));

        let events = diff_contacts(&BTreeMap::new(), &map(&[(1, 2)]));
        listeners.dispatch(&events);
        assert_eq!(*seen.borrow(), vec![CollisionPhase::Began]);

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.dispatch(&events);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_event_involves() {
        let ev = CollisionEvent::from_manifold(&manifold(3, 7), CollisionPhase::Began);
        assert!(ev.involves(BodyId(7)));
        assert!(!ev.involves(BodyId(1)));
        assert_eq!(ev.pair(), BodyPair::new(BodyId(7), BodyId(3)));
    }
}
