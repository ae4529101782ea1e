use crate::cards::Card;
use serde::{Deserialize, Serialize};

/// Stable identity of a player, independent of the seat they occupy.
pub type PlayerId = u32;

/// The kind of move a player submits.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Give up the hand; amount must be 0
    Fold,
    /// Pass without wagering; amount must be 0
    Check,
    /// Match the highest wager; amount is the exact call-amount
    Call,
    /// Call and add more; amount is the increment above the call-amount
    Raise,
    /// Commit the whole remaining stack; amount is that stack
    AllIn,
}

/// A move submitted through the engine's single entry point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub actor: PlayerId,
    pub kind: ActionKind,
    pub amount: u32,
}

impl Action {
    pub fn fold(actor: PlayerId) -> Self {
        Self { actor, kind: ActionKind::Fold, amount: 0 }
    }
    pub fn check(actor: PlayerId) -> Self {
        Self { actor, kind: ActionKind::Check, amount: 0 }
    }
    pub fn call(actor: PlayerId, amount: u32) -> Self {
        Self { actor, kind: ActionKind::Call, amount }
    }
    pub fn raise(actor: PlayerId, increment: u32) -> Self {
        Self { actor, kind: ActionKind::Raise, amount: increment }
    }
    pub fn all_in(actor: PlayerId, stack: u32) -> Self {
        Self { actor, kind: ActionKind::AllIn, amount: stack }
    }
}

/// A player sitting at the table.
///
/// `wager` is what the seat has put in during the current betting round,
/// `total_wager` what it has put in during the whole hand. Both, along with
/// the hole cards and the folded flag, belong to a single hand; the stack
/// persists across hands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    id: PlayerId,
    stack: u32,
    wager: u32,
    total_wager: u32,
    hole: [Option<Card>; 2],
    folded: bool,
}

impl Seat {
    pub fn new(id: PlayerId, stack: u32) -> Self {
        Self {
            id,
            stack,
            wager: 0,
            total_wager: 0,
            hole: [None, None],
            folded: false,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }
    pub fn stack(&self) -> u32 {
        self.stack
    }
    pub fn wager(&self) -> u32 {
        self.wager
    }
    pub fn total_wager(&self) -> u32 {
        self.total_wager
    }
    pub fn is_folded(&self) -> bool {
        self.folded
    }
    pub fn is_all_in(&self) -> bool {
        !self.folded && self.stack == 0
    }
    /// Still in the hand and able to put more chips in.
    pub fn can_act(&self) -> bool {
        !self.folded && self.stack > 0
    }

    pub fn hole_cards(&self) -> [Option<Card>; 2] {
        self.hole
    }

    pub fn give_card(&mut self, c: Card) -> Result<(), String> {
        if self.hole[0].is_none() {
            self.hole[0] = Some(c);
            Ok(())
        } else if self.hole[1].is_none() {
            self.hole[1] = Some(c);
            Ok(())
        } else {
            Err("Hole cards already full".to_string())
        }
    }

    pub fn fold(&mut self) {
        self.folded = true;
    }

    /// Moves `amount` from the stack into the current wager.
    pub fn bet(&mut self, amount: u32) -> Result<(), String> {
        if amount > self.stack {
            return Err("Insufficient chips".to_string());
        }
        self.stack -= amount;
        self.wager += amount;
        self.total_wager += amount;
        Ok(())
    }

    /// Seating bounds the table total, so an award never saturates here.
    pub fn add_chips(&mut self, amount: u32) {
        self.stack = self.stack.saturating_add(amount);
    }

    pub fn reset_wager(&mut self) {
        self.wager = 0;
    }

    pub fn reset_for_new_hand(&mut self) {
        self.hole = [None, None];
        self.wager = 0;
        self.total_wager = 0;
        self.folded = false;
    }
}
