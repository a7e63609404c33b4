//! Seats at the table.
//!
//! `PlayerId` names a seat. `PlayerMap` holds one value per seat and is what
//! the zone manager keeps each player's board in. Matches are usually two
//! players, but nothing below assumes that.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat index, 0-based. The first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Every seat of a `player_count` table, in turn order.
    ///
    /// ```
    /// use holo_ccg::core::PlayerId;
    ///
    /// let seats: Vec<_> = PlayerId::all(2).collect();
    /// assert_eq!(seats, vec![PlayerId::new(0), PlayerId::new(1)]);
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// Whoever takes the turn after this seat. In a two-player match this is
    /// the opponent.
    #[must_use]
    pub fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + 1) % player_count) as u8)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// One value per seat.
///
/// Indexing with a seat outside the table panics; `try_get` and `contains`
/// are for callers holding an untrusted `PlayerId`.
///
/// ```
/// use holo_ccg::core::{PlayerId, PlayerMap};
///
/// let mut life = PlayerMap::new(2, |_| 5u32);
/// life[PlayerId::new(1)] -= 1;
///
/// assert_eq!(life[PlayerId::new(0)], 5);
/// assert_eq!(life.try_get(PlayerId::new(1)), Some(&4));
/// assert_eq!(life.try_get(PlayerId::new(2)), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    seats: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Builds one entry per seat with `init`.
    ///
    /// # Panics
    ///
    /// If `player_count` is zero or does not fit a `PlayerId`.
    pub fn new(player_count: usize, init: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "a match needs at least one player");
        assert!(player_count <= u8::MAX as usize, "too many players for a PlayerId");
        Self {
            seats: PlayerId::all(player_count).map(init).collect(),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        player.index() < self.seats.len()
    }

    #[must_use]
    pub fn try_get(&self, player: PlayerId) -> Option<&T> {
        self.seats.get(player.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::all(self.seats.len()).zip(self.seats.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::all(self.seats.len()).zip(self.seats.iter_mut())
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.seats[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.seats[player.index()]
    }
}
