/// Level catalog: the ordered par table.
///
/// Level indices run `0..highest_level()` for playable levels. The index
/// equal to `highest_level()` is the won screen: it has a backdrop but no par.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelCatalog {
    pars: Vec<u32>,
}

impl LevelCatalog {
    pub fn new(pars: Vec<u32>) -> Self {
        LevelCatalog { pars }
    }

    /// Number of playable levels; also the index of the won screen.
    pub fn highest_level(&self) -> usize {
        self.pars.len()
    }

    /// Par for a playable level, `None` at or after the won screen.
    pub fn par_for(&self, level: usize) -> Option<u32> {
        self.pars.get(level).copied()
    }

    /// The last playable level: its forward exit finishes the whole game.
    pub fn is_final(&self, level: usize) -> bool {
        self.highest_level() > 0 && level == self.highest_level() - 1
    }

    pub fn is_won(&self, level: usize) -> bool {
        level == self.highest_level()
    }

    /// Clamp an externally supplied index into `[0, highest_level]`.
    pub fn clamp_level(&self, level: usize) -> usize {
        level.min(self.highest_level())
    }
}
