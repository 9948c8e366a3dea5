//! Static mod catalog: stage costs and cumulative stat bonuses.
//!
//! Pure, stateless lookup over the injected balance tables. Stage 0 means the
//! mod is not installed; stage 3 is the ceiling.

use crate::config::{ModTable, ModTables};

use super::types::ModKind;

pub const MAX_STAGE: u8 = 3;

#[derive(Debug, Clone)]
pub struct ModCatalog {
    tables: ModTables,
}

impl ModCatalog {
    pub fn new(tables: ModTables) -> Self {
        ModCatalog { tables }
    }

    fn table(&self, kind: ModKind) -> &ModTable {
        match kind {
            ModKind::Engine => &self.tables.engine,
            ModKind::Turbo => &self.tables.turbo,
            ModKind::WeightReduction => &self.tables.weight_reduction,
        }
    }

    /// XP price of the upgrade from `current_stage` to the next stage, or
    /// `None` when no further upgrade exists.
    pub fn upgrade_cost(&self, kind: ModKind, current_stage: u8) -> Option<u32> {
        if current_stage >= MAX_STAGE {
            return None;
        }
        Some(self.table(kind).costs[current_stage as usize])
    }

    /// Total stat bonus granted at `stage`. Stage 0 grants nothing.
    pub fn cumulative_bonus(&self, kind: ModKind, stage: u8) -> u32 {
        if stage == 0 {
            return 0;
        }
        let stage = stage.min(MAX_STAGE);
        self.table(kind).bonuses[(stage - 1) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BalanceConfig;

    fn catalog() -> ModCatalog {
        ModCatalog::new(BalanceConfig::default().mods)
    }

    #[test]
    fn costs_are_positive_and_end_at_stage_three() {
        let cat = catalog();
        for kind in ModKind::all() {
            for stage in 0..MAX_STAGE {
                let cost = cat.upgrade_cost(kind, stage).expect("stage below max");
                assert!(cost > 0, "{kind:?} stage {stage} must cost something");
            }
            assert_eq!(cat.upgrade_cost(kind, MAX_STAGE), None);
        }
    }

    #[test]
    fn bonuses_never_decrease_with_stage() {
        let cat = catalog();
        for kind in ModKind::all() {
            assert_eq!(cat.cumulative_bonus(kind, 0), 0);
            for stage in 0..MAX_STAGE {
                assert!(
                    cat.cumulative_bonus(kind, stage + 1) >= cat.cumulative_bonus(kind, stage)
                );
            }
        }
    }
}
