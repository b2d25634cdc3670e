//! One-of-many light switch.

use tracing::{info, warn};

use crate::picker::CellPicker;

const MAX_ATTEMPTS: usize = 10;

/// Keeps exactly one of a set of lights on, chosen at random.
///
/// Slots may be unassigned (`None`); picking skips them, giving up after
/// a bounded number of draws.
#[derive(Debug, Clone)]
pub struct RandomLightSwitch {
    slots: Vec<Option<String>>,
    on: Vec<bool>,
    current: Option<usize>,
}

impl RandomLightSwitch {
    /// A switch over `slots`, all off.
    #[must_use]
    pub fn new(slots: Vec<Option<String>>) -> Self {
        let assigned = slots.iter().flatten().count();
        for (i, slot) in slots.iter().enumerate() {
            if slot.is_none() {
                warn!(index = i, "light slot is unassigned");
            }
        }
        info!(assigned, total = slots.len(), "light switch ready");
        let on = vec![false; slots.len()];
        Self {
            slots,
            on,
            current: None,
        }
    }

    /// Turn every light off.
    pub fn turn_off_all(&mut self) {
        self.on.iter_mut().for_each(|lit| *lit = false);
        self.current = None;
    }

    /// Turn everything off, then turn on a random assigned light.
    ///
    /// Returns the chosen index, or `None` when no assigned light was drawn.
    pub fn activate_random(&mut self, picker: &mut dyn CellPicker) -> Option<usize> {
        if self.slots.is_empty() {
            warn!("cannot activate a light: none assigned");
            return None;
        }
        self.turn_off_all();

        let mut index = picker.index(self.slots.len());
        let mut attempts = 1;
        while self.slots[index].is_none() && attempts < MAX_ATTEMPTS {
            index = picker.index(self.slots.len());
            attempts += 1;
        }

        match &self.slots[index] {
            Some(name) => {
                info!(index, %name, "light activated");
                self.on[index] = true;
                self.current = Some(index);
                Some(index)
            }
            None => {
                warn!("could not find a valid light to activate");
                None
            }
        }
    }

    /// The light currently on.
    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Name of the light currently on.
    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.current.and_then(|i| self.slots[i].as_deref())
    }

    /// Per-slot on flags.
    #[must_use]
    pub fn states(&self) -> &[bool] {
        &self.on
    }
}
