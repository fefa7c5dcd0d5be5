/// The sparsification state the controller keeps for a single client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientState {
    level_index: usize,
    last_change_round: u64,
}

impl ClientState {
    /// Creates the state for a client first seen at `round_index`, at the densest level.
    pub(super) fn densest(round_index: u64) -> Self {
        Self {
            level_index: 0,
            last_change_round: round_index,
        }
    }

    /// Returns the current index into the sparsity ladder.
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    /// Returns the round at which the level last changed, or the round the
    /// client was first seen if it never changed.
    pub fn last_change_round(&self) -> u64 {
        self.last_change_round
    }

    /// Moves the client to `level_index` at `round_index`.
    ///
    /// # Returns
    /// Whether the level actually changed.
    pub(super) fn transition(&mut self, level_index: usize, round_index: u64) -> bool {
        if level_index == self.level_index {
            return false;
        }

        self.level_index = level_index;
        self.last_change_round = round_index;
        true
    }
}
