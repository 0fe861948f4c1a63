use crate::annotation::domain::classification::Classification;

/// Running per-class totals for one session. Only grows until `reset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub with_mask: u64,
    pub incorrect: u64,
    pub no_mask: u64,
    pub total: u64,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one rendered batch.
    pub fn record_batch(&mut self, classifications: &[Classification]) {
        for c in classifications {
            *self.bucket_mut(*c) += 1;
        }
        self.total += classifications.len() as u64;
    }

    pub fn count(&self, classification: Classification) -> u64 {
        match classification {
            Classification::WithMask => self.with_mask,
            Classification::Incorrect => self.incorrect,
            Classification::NoMask => self.no_mask,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn bucket_mut(&mut self, classification: Classification) -> &mut u64 {
        match classification {
            Classification::WithMask => &mut self.with_mask,
            Classification::Incorrect => &mut self.incorrect,
            Classification::NoMask => &mut self.no_mask,
        }
    }
}
