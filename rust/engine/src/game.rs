use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::player::{PlayerId, Seat};

/// Number of seats at a table.
pub const MAX_SEATS: usize = 10;

/// Betting phase of a hand. Within one hand the phase only moves forward;
/// the next hand starts again at `Preflop`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Hole cards dealt, blinds posted
    Preflop,
    /// Three community cards
    Flop,
    /// Fourth community card
    Turn,
    /// Fifth community card
    River,
    /// Terminal; no further actions
    Showdown,
}

impl Phase {
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Preflop => Some(Phase::Flop),
            Phase::Flop => Some(Phase::Turn),
            Phase::Turn => Some(Phase::River),
            Phase::River => Some(Phase::Showdown),
            Phase::Showdown => None,
        }
    }

    /// Community cards dealt when entering this phase.
    pub fn cards_dealt(self) -> usize {
        match self {
            Phase::Flop => 3,
            Phase::Turn | Phase::River => 1,
            Phase::Preflop | Phase::Showdown => 0,
        }
    }
}

/// Fixed-size seat arena indexed by seat number. `None` marks an empty seat,
/// so turn arithmetic is plain modulo over `MAX_SEATS`.
#[derive(Debug, Clone, Default)]
pub struct Seats {
    slots: [Option<Seat>; MAX_SEATS],
}

impl Seats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<&Seat> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Seat> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn sit(&mut self, index: usize, seat: Seat) -> Result<(), GameError> {
        if index >= MAX_SEATS {
            return Err(GameError::SeatOutOfRange(index));
        }
        if self.find(seat.id()).is_some() {
            return Err(GameError::PlayerAlreadySeated(seat.id()));
        }
        let slot = &mut self.slots[index];
        if slot.is_some() {
            return Err(GameError::SeatTaken(index));
        }
        *slot = Some(seat);
        Ok(())
    }

    pub fn remove(&mut self, id: PlayerId) -> Option<Seat> {
        let index = self.find(id)?;
        self.slots[index].take()
    }

    pub fn find(&self, id: PlayerId) -> Option<usize> {
        self.iter().find(|(_, s)| s.id() == id).map(|(i, _)| i)
    }

    /// Occupied seats in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Seat)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Seat)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|s| (i, s)))
    }

    pub fn occupied(&self) -> usize {
        self.iter().count()
    }

    pub fn active_count(&self) -> usize {
        self.iter().filter(|(_, s)| !s.is_folded()).count()
    }

    /// Seats still in the hand that hold chips.
    pub fn actionable_count(&self) -> usize {
        self.iter().filter(|(_, s)| s.can_act()).count()
    }

    /// First seat strictly after `from` (wrapping) accepted by `pred`. The
    /// search visits `from` itself last, so a lone match is still found.
    pub fn next_after<F>(&self, from: usize, pred: F) -> Option<usize>
    where
        F: Fn(&Seat) -> bool,
    {
        (1..=MAX_SEATS)
            .map(|step| (from + step) % MAX_SEATS)
            .find(|&i| self.get(i).is_some_and(&pred))
    }

    /// Seat indices accepted by `pred`, starting after `from` and wrapping.
    pub fn order_after<F>(&self, from: usize, pred: F) -> Vec<usize>
    where
        F: Fn(&Seat) -> bool,
    {
        (1..=MAX_SEATS)
            .map(|step| (from + step) % MAX_SEATS)
            .filter(|&i| self.get(i).is_some_and(&pred))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_advances_in_fixed_order() {
        let mut p = Phase::Preflop;
        let mut seen = vec![p];
        while let Some(n) = p.next() {
            assert!(n > p);
            seen.push(n);
            p = n;
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(p, Phase::Showdown);
    }

    #[test]
    fn sparse_arena_wraps_around() {
        let mut seats = Seats::new();
        seats.sit(2, Seat::new(1, 100)).unwrap();
        seats.sit(8, Seat::new(2, 100)).unwrap();
        assert_eq!(seats.next_after(2, |_| true), Some(8));
        assert_eq!(seats.next_after(8, |_| true), Some(2));
        assert_eq!(seats.next_after(2, |s| s.id() == 1), Some(2));
        assert_eq!(seats.order_after(8, |_| true), vec![2, 8]);
    }

    #[test]
    fn sitting_rules() {
        let mut seats = Seats::new();
        seats.sit(0, Seat::new(1, 100)).unwrap();
        assert_eq!(seats.sit(0, Seat::new(2, 100)), Err(GameError::SeatTaken(0)));
        assert_eq!(
            seats.sit(1, Seat::new(1, 100)),
            Err(GameError::PlayerAlreadySeated(1))
        );
        assert_eq!(
            seats.sit(MAX_SEATS, Seat::new(3, 100)),
            Err(GameError::SeatOutOfRange(MAX_SEATS))
        );
        assert!(seats.remove(1).is_some());
        assert_eq!(seats.occupied(), 0);
    }
}
