//! FILENAME: graph-model/src/registry.rs
//! Breakdown Registry - the breakdowns a graph offers and which one is active.
//!
//! The registry owns its breakdowns in a flat arena. Index 0 is always the
//! synthetic "Total" breakdown; the active breakdown is an index into the
//! arena, so toggling categories on the active breakdown edits the registry
//! entry itself.

use log::trace;
use rustc_hash::FxHashSet;

use crate::definition::Breakdown;

/// Index of a breakdown within the registry.
pub type BreakdownId = usize;

/// Index of the synthetic total breakdown.
pub const DEFAULT_BREAKDOWN: BreakdownId = 0;

/// Keys of the categories currently switched on.
pub type ActiveSet = FxHashSet<String>;

#[derive(Debug, Clone)]
pub struct BreakdownRegistry {
    breakdowns: Vec<Breakdown>,
    active: BreakdownId,
}

impl BreakdownRegistry {
    /// Copies the configured breakdowns and puts the total breakdown in front.
    pub fn new(configured: &[Breakdown]) -> Self {
        let mut breakdowns = Vec::with_capacity(configured.len() + 1);
        breakdowns.push(Breakdown::total());
        breakdowns.extend(configured.iter().cloned());

        BreakdownRegistry {
            breakdowns,
            active: DEFAULT_BREAKDOWN,
        }
    }

    pub fn breakdowns(&self) -> &[Breakdown] {
        &self.breakdowns
    }

    pub fn default_breakdown(&self) -> &Breakdown {
        &self.breakdowns[DEFAULT_BREAKDOWN]
    }

    pub fn active(&self) -> &Breakdown {
        &self.breakdowns[self.active]
    }

    pub fn active_id(&self) -> BreakdownId {
        self.active
    }

    /// Activates the registry breakdown splitting on the same dimension as
    /// `candidate`, copying its toggles.
    ///
    /// Categories the candidate does not list are switched off. Returns false,
    /// leaving everything untouched, when no breakdown matches.
    pub fn activate_if_available(&mut self, candidate: &Breakdown) -> bool {
        let Some(found) = self
            .breakdowns
            .iter()
            .position(|b| b.breakdown_name == candidate.breakdown_name)
        else {
            trace!("no breakdown on {:?}, keeping {:?}", candidate.breakdown_name, self.active().name);
            return false;
        };

        for value in &mut self.breakdowns[found].values {
            value.on = candidate
                .values
                .iter()
                .find(|c| c.key == value.key)
                .map(|c| c.on)
                .unwrap_or(false);
        }
        self.active = found;
        trace!("activated breakdown {:?}", self.breakdowns[found].name);
        true
    }

    /// Keys of the active breakdown's categories that are on.
    pub fn active_values(&self) -> ActiveSet {
        self.active()
            .values
            .iter()
            .filter(|v| v.on)
            .map(|v| v.key.clone())
            .collect()
    }
}
