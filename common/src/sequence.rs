use crate::rng::PseudoRandom;
use crate::tile::TileId;

/// The growing pattern and the player's progress through it.
///
/// The sequence is append-only during a round and cleared at round start. The
/// cursor counts how many elements of the current round the player has
/// reproduced correctly; it always satisfies `0 <= cursor <= sequence.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEngine {
    sequence: Vec<TileId>,
    cursor: usize,
}

impl Default for SequenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceEngine {
    pub fn new() -> Self {
        SequenceEngine {
            sequence: Vec::new(),
            cursor: 0,
        }
    }

    /// Appends one uniformly random tile from a palette of `palette_size` tiles.
    pub fn append_random(&mut self, rng: &mut PseudoRandom, palette_size: usize) {
        debug_assert!(palette_size > 0);
        let id = rng.next_below(palette_size as u32) as u8;
        self.sequence.push(TileId(id));
    }

    /// Clears the sequence and resets the cursor.
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.cursor = 0;
    }

    pub fn sequence(&self) -> &[TileId] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The tile the player is expected to activate next.
    pub fn expected(&self) -> Option<TileId> {
        self.sequence.get(self.cursor).copied()
    }

    /// Advances the cursor past one correctly reproduced element.
    /// Returns true when the whole sequence has been reproduced.
    pub fn advance(&mut self) -> bool {
        debug_assert!(self.cursor < self.sequence.len());
        self.cursor += 1;
        self.cursor == self.sequence.len()
    }

    /// Rewinds the cursor for the next pass over a grown sequence.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Completed rounds so far: sequence length minus the round in progress.
    /// None while the sequence is empty (no round score exists yet).
    pub fn round_score(&self) -> Option<u32> {
        if self.sequence.is_empty() {
            None
        } else {
            Some((self.sequence.len() - 1) as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_grows_by_one() {
        let mut rng = PseudoRandom::new(1);
        let mut engine = SequenceEngine::new();
        for expected_len in 1..=20 {
            engine.append_random(&mut rng, 4);
            assert_eq!(engine.len(), expected_len);
        }
        assert!(engine.sequence().iter().all(|t| t.0 < 4));
    }

    #[test]
    fn cursor_never_exceeds_length() {
        let mut rng = PseudoRandom::new(2);
        let mut engine = SequenceEngine::new();
        engine.append_random(&mut rng, 4);
        engine.append_random(&mut rng, 4);
        engine.append_random(&mut rng, 4);

        assert_eq!(engine.cursor(), 0);
        assert!(!engine.advance());
        assert!(!engine.advance());
        assert!(engine.advance());
        assert_eq!(engine.cursor(), engine.len());
        engine.rewind();
        assert_eq!(engine.cursor(), 0);
    }

    #[test]
    fn reset_clears_sequence_and_cursor() {
        let mut rng = PseudoRandom::new(3);
        let mut engine = SequenceEngine::new();
        engine.append_random(&mut rng, 4);
        engine.advance();
        engine.reset();
        assert!(engine.is_empty());
        assert_eq!(engine.cursor(), 0);
        assert_eq!(engine.round_score(), None);
    }

    #[test]
    fn round_score_is_length_minus_one() {
        let mut rng = PseudoRandom::new(4);
        let mut engine = SequenceEngine::new();
        assert_eq!(engine.round_score(), None);
        engine.append_random(&mut rng, 4);
        assert_eq!(engine.round_score(), Some(0));
        engine.append_random(&mut rng, 4);
        assert_eq!(engine.round_score(), Some(1));
    }

    #[test]
    fn expected_follows_cursor() {
        let mut rng = PseudoRandom::new(5);
        let mut engine = SequenceEngine::new();
        engine.append_random(&mut rng, 4);
        engine.append_random(&mut rng, 4);
        let first = engine.sequence()[0];
        let second = engine.sequence()[1];
        assert_eq!(engine.expected(), Some(first));
        engine.advance();
        assert_eq!(engine.expected(), Some(second));
    }
}
