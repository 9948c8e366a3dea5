//! Balance and policy configuration.
//!
//! Every tunable number the engine consumes lives here and is injected at
//! construction, so tests can run alternate balance settings without touching
//! engine code. `Default` carries the production values.

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

/// XP credited on challenge completion, by outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct RewardAmounts {
    pub win: u32,
    pub lose: u32,
    pub draw: u32,
}

/// Cost and cumulative-bonus curve for one mod, indexed by target stage 1..=3.
///
/// `costs[s]` is the XP price of the upgrade from stage `s` to `s + 1`;
/// `bonuses[s]` is the total stat bonus once stage `s + 1` is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ModTable {
    pub costs: [u32; 3],
    pub bonuses: [u32; 3],
}

/// The three mod curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ModTables {
    pub engine: ModTable,
    pub turbo: ModTable,
    pub weight_reduction: ModTable,
}

/// Full balance configuration for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct BalanceConfig {
    /// Cards dealt per battle hand.
    pub deal_size: usize,
    /// Challenge creations allowed inside the trailing window.
    pub challenge_cap: usize,
    /// Length of the trailing rate-limit window, in days.
    pub rate_window_days: i64,
    /// Default lifetime of a new challenge when the creator gives none.
    pub default_challenge_ttl_hours: i64,
    pub rewards: RewardAmounts,
    pub mods: ModTables,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        BalanceConfig {
            deal_size: 3,
            challenge_cap: 3,
            rate_window_days: 7,
            default_challenge_ttl_hours: 48,
            rewards: RewardAmounts {
                win: 30,
                lose: 20,
                draw: 10,
            },
            mods: ModTables {
                engine: ModTable {
                    costs: [60, 120, 240],
                    bonuses: [15, 35, 60],
                },
                turbo: ModTable {
                    costs: [50, 100, 200],
                    bonuses: [12, 28, 50],
                },
                weight_reduction: ModTable {
                    costs: [40, 90, 180],
                    bonuses: [10, 22, 40],
                },
            },
        }
    }
}
