use serde::{Deserialize, Serialize};

/// Free-running "prod" counter and note shown by the score widget.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: i64,
    pub message: String,
}

impl Scoreboard {
    /// Moves the score by `delta`, saturating at the integer bounds.
    pub fn adjust(
        &mut self,
        delta: i64,
    ) {
        self.score = self.score.saturating_add(delta);
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn adjust_moves_score_both_ways() {
        let mut board = Scoreboard::default();

        board.adjust(1);
        board.adjust(1);
        board.adjust(-1);

        assert_eq!(board.score, 1);
    }

    #[test]
    fn adjust_saturates() {
        let mut board = Scoreboard {
            score: i64::MAX,
            message: String::new(),
        };

        board.adjust(5);

        assert_eq!(board.score, i64::MAX);
    }

    #[test]
    fn reset_keeps_message() {
        let mut board = Scoreboard {
            score: 42,
            message: "Go go go!".to_string(),
        };

        board.reset();

        assert_eq!(board.score, 0);
        assert_eq!(board.message, "Go go go!");
    }
}
