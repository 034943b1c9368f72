use bomber_core::{PlayerId, NUM_PLAYERS};

/// Per-agent tallies of notable events during an episode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Statistics {
    bombs_placed: [u32; NUM_PLAYERS],
    placement_attempts: [u32; NUM_PLAYERS],
    power_ups_taken: [u32; NUM_PLAYERS],
    bombs_triggered: [u32; NUM_PLAYERS],
}

impl Statistics {
    pub(crate) fn record_attempt(&mut self, player: PlayerId, placed: bool) {
        bump(&mut self.placement_attempts, player);
        if placed {
            bump(&mut self.bombs_placed, player);
        }
    }

    pub(crate) fn record_power_up(&mut self, player: PlayerId) {
        bump(&mut self.power_ups_taken, player);
    }

    pub(crate) fn record_trigger(&mut self, player: PlayerId) {
        bump(&mut self.bombs_triggered, player);
    }

    /// Bombs successfully placed by `player`.
    #[must_use]
    pub fn bombs_placed(&self, player: PlayerId) -> u32 {
        read(&self.bombs_placed, player)
    }

    /// Bomb actions submitted by `player`, successful or not.
    #[must_use]
    pub fn placement_attempts(&self, player: PlayerId) -> u32 {
        read(&self.placement_attempts, player)
    }

    /// Power-ups collected by `player`.
    #[must_use]
    pub fn power_ups_taken(&self, player: PlayerId) -> u32 {
        read(&self.power_ups_taken, player)
    }

    /// Bombs set off early by flames from `player`'s bombs.
    #[must_use]
    pub fn bombs_triggered(&self, player: PlayerId) -> u32 {
        read(&self.bombs_triggered, player)
    }
}

fn bump(counters: &mut [u32; NUM_PLAYERS], player: PlayerId) {
    if let Some(counter) = counters.get_mut(player.index()) {
        *counter = counter.saturating_add(1);
    }
}

fn read(counters: &[u32; NUM_PLAYERS], player: PlayerId) -> u32 {
    counters.get(player.index()).copied().unwrap_or(0)
}
