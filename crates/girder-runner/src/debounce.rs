/// Limits jumps to one per `window` consecutive ticks, however long the key
/// is held.
///
/// A successful jump arms a countdown; every tick that produces no jump
/// winds it down by one. Jumps are only attempted while it is at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpDebounce {
    window: u32,
    remaining: u32,
    /// Outcome of the last jump attempted this tick.
    last: Option<bool>,
}

impl JumpDebounce {
    pub fn new(window: u32) -> Self {
        Self {
            window,
            remaining: 0,
            last: None,
        }
    }

    /// Whether a jump may be attempted right now.
    pub fn ready(&self) -> bool {
        self.remaining == 0 && self.last != Some(true)
    }

    /// Attempt a jump through `jump` if the debounce allows it. Returns the
    /// jump's outcome, or `false` when it was not attempted.
    pub fn attempt(&mut self, jump: impl FnOnce() -> bool) -> bool {
        if !self.ready() {
            return false;
        }
        let jumped = jump();
        self.last = Some(jumped);
        jumped
    }

    /// Close the tick: the last attempted jump decides the countdown.
    pub fn end_tick(&mut self) {
        match self.last.take() {
            Some(true) => self.remaining = self.window.saturating_sub(1),
            _ => self.remaining = self.remaining.saturating_sub(1),
        }
    }

    pub fn reset(&mut self) {
        self.remaining = 0;
        self.last = None;
    }
}
