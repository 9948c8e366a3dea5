//! Reward settlement: a resolved outcome becomes XP credits and, in
//! card-wager mode, ownership transfers.
//!
//! Pure: this module only computes the deltas; the orchestrating state applies
//! them to balances and collections.

use crate::config::RewardAmounts;

use super::types::{CardId, RewardMode, UserId, Winner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpCredit {
    pub user_id: UserId,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTransfer {
    pub card_id: CardId,
    pub from: UserId,
    pub to: UserId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    pub credits: Vec<XpCredit>,
    pub transfers: Vec<CardTransfer>,
}

/// Translate an outcome into deltas.
///
/// The win credit applies in both reward modes; the consolation credit only in
/// XP mode. A draw credits both sides equally and moves no cards.
pub fn settle(
    mode: &RewardMode,
    defaults: &RewardAmounts,
    winner: Winner,
    challenger_id: UserId,
    opponent_id: UserId,
    challenger_cards: &[CardId],
    opponent_cards: &[CardId],
) -> Settlement {
    let (win_amount, lose_amount, draw_amount) = match mode {
        RewardMode::Xp { win, lose, draw } => (*win, Some(*lose), *draw),
        RewardMode::CardWager => (defaults.win, None, defaults.draw),
    };

    let mut settlement = Settlement::default();
    match winner {
        Winner::Draw => {
            settlement.credits.push(XpCredit {
                user_id: challenger_id,
                amount: draw_amount,
            });
            settlement.credits.push(XpCredit {
                user_id: opponent_id,
                amount: draw_amount,
            });
        }
        Winner::Challenger | Winner::Opponent => {
            let (winner_id, loser_id, loser_cards) = if winner == Winner::Challenger {
                (challenger_id, opponent_id, opponent_cards)
            } else {
                (opponent_id, challenger_id, challenger_cards)
            };
            settlement.credits.push(XpCredit {
                user_id: winner_id,
                amount: win_amount,
            });
            if let Some(amount) = lose_amount {
                settlement.credits.push(XpCredit {
                    user_id: loser_id,
                    amount,
                });
            }
            if *mode == RewardMode::CardWager {
                for &card_id in loser_cards {
                    settlement.transfers.push(CardTransfer {
                        card_id,
                        from: loser_id,
                        to: winner_id,
                    });
                }
            }
        }
    }
    settlement
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: RewardAmounts = RewardAmounts {
        win: 30,
        lose: 20,
        draw: 10,
    };

    fn xp_mode() -> RewardMode {
        RewardMode::Xp {
            win: 30,
            lose: 20,
            draw: 10,
        }
    }

    #[test]
    fn xp_mode_pays_winner_more_than_loser() {
        let s = settle(&xp_mode(), &DEFAULTS, Winner::Opponent, 1, 2, &[10], &[20]);
        assert_eq!(
            s.credits,
            vec![
                XpCredit {
                    user_id: 2,
                    amount: 30
                },
                XpCredit {
                    user_id: 1,
                    amount: 20
                },
            ]
        );
        assert!(s.transfers.is_empty());
    }

    #[test]
    fn card_wager_transfers_the_losers_stake() {
        let s = settle(
            &RewardMode::CardWager,
            &DEFAULTS,
            Winner::Challenger,
            1,
            2,
            &[10, 11, 12],
            &[20, 21, 22],
        );
        assert_eq!(
            s.credits,
            vec![XpCredit {
                user_id: 1,
                amount: 30
            }]
        );
        assert_eq!(s.transfers.len(), 3);
        assert!(s
            .transfers
            .iter()
            .all(|t| t.from == 2 && t.to == 1 && [20, 21, 22].contains(&t.card_id)));
    }

    #[test]
    fn draw_pays_both_sides_and_returns_all_cards() {
        for mode in [xp_mode(), RewardMode::CardWager] {
            let s = settle(&mode, &DEFAULTS, Winner::Draw, 1, 2, &[10], &[20]);
            assert_eq!(s.credits.len(), 2);
            assert!(s.credits.iter().all(|c| c.amount == 10));
            assert!(s.transfers.is_empty());
        }
    }
}
