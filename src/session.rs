//! Session state machine: idle → playing → gameover, score and countdown.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Idle,
    Playing,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub score: u32,
    pub time_left: u32,
    pub status: GameStatus,
}

/// Produced once, by the tick that ends a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub final_score: u32,
    /// High score as it stood before this round ended.
    pub previous_high_score: u32,
    pub high_score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; the tick had no effect.
    Ignored,
    Running { time_left: u32 },
    Ended(SessionSummary),
}

#[derive(Debug)]
pub struct Session {
    state: GameState,
    high_score: u32,
    round_secs: u32,
}

impl Session {
    pub fn new(round_secs: u32) -> Self {
        Self {
            state: GameState { score: 0, time_left: round_secs, status: GameStatus::Idle },
            high_score: 0,
            round_secs,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn is_playing(&self) -> bool {
        self.state.status == GameStatus::Playing
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    fn reset(&mut self, status: GameStatus) {
        self.state = GameState { score: 0, time_left: self.round_secs, status };
    }

    /// Idle → Playing or GameOver → Playing (retry). Ignored while playing.
    pub fn start(&mut self) -> bool {
        if self.is_playing() {
            return false;
        }
        self.reset(GameStatus::Playing);
        true
    }

    /// GameOver → Idle (back to the title screen).
    pub fn go_home(&mut self) -> bool {
        if self.state.status != GameStatus::GameOver {
            return false;
        }
        self.reset(GameStatus::Idle);
        true
    }

    /// One countdown step. The step that would reach zero ends the round.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Ignored;
        }
        if self.state.time_left <= 1 {
            self.state.time_left = 0;
            self.state.status = GameStatus::GameOver;
            let previous_high_score = self.high_score;
            self.high_score = self.high_score.max(self.state.score);
            return TickOutcome::Ended(SessionSummary {
                final_score: self.state.score,
                previous_high_score,
                high_score: self.high_score,
            });
        }
        self.state.time_left -= 1;
        TickOutcome::Running { time_left: self.state.time_left }
    }

    /// Add points for a catch. Only counts while playing.
    pub fn add_score(&mut self, points: u32) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.state.score = self.state.score.saturating_add(points);
        true
    }
}
