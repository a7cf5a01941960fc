/// What the synthetic sensor produces on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStep {
    /// Color and depth both present.
    Full,
    /// Depth skipped this cycle.
    ColorOnly,
    /// Color skipped this cycle.
    DepthOnly,
    /// Neither modality delivered.
    Empty,
    /// Connection lost.
    Fail,
}

/// Sequence of ticks the synthetic camera plays back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryScript {
    steps: Vec<DeliveryStep>,
    repeat: bool,
    cursor: usize,
}

impl DeliveryScript {
    /// Full pairs forever.
    pub fn steady() -> Self {
        Self::repeating(vec![DeliveryStep::Full])
    }

    /// Plays `steps` in a loop.
    pub fn repeating(steps: Vec<DeliveryStep>) -> Self {
        Self {
            steps,
            repeat: true,
            cursor: 0,
        }
    }

    /// Plays `steps` once; the stream ends after the last one.
    pub fn once(steps: Vec<DeliveryStep>) -> Self {
        Self {
            steps,
            repeat: false,
            cursor: 0,
        }
    }

    /// `n` full pairs, then a lost connection.
    pub fn full_then_fail(n: usize) -> Self {
        let mut steps = vec![DeliveryStep::Full; n];
        steps.push(DeliveryStep::Fail);
        Self::once(steps)
    }

    /// Next step, or `None` once a one-shot script is exhausted.
    pub fn next_step(&mut self) -> Option<DeliveryStep> {
        if self.steps.is_empty() {
            return None;
        }
        if self.cursor >= self.steps.len() {
            if !self.repeat {
                return None;
            }
            self.cursor = 0;
        }
        let step = self.steps[self.cursor];
        self.cursor += 1;
        Some(step)
    }
}

impl Default for DeliveryScript {
    fn default() -> Self {
        Self::steady()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeating_wraps() {
        let mut script = DeliveryScript::repeating(vec![DeliveryStep::Full, DeliveryStep::ColorOnly]);
        let steps: Vec<_> = (0..5).map(|_| script.next_step().unwrap()).collect();
        assert_eq!(
            steps,
            vec![
                DeliveryStep::Full,
                DeliveryStep::ColorOnly,
                DeliveryStep::Full,
                DeliveryStep::ColorOnly,
                DeliveryStep::Full,
            ]
        );
    }

    #[test]
    fn once_runs_out() {
        let mut script = DeliveryScript::full_then_fail(2);
        assert_eq!(script.next_step(), Some(DeliveryStep::Full));
        assert_eq!(script.next_step(), Some(DeliveryStep::Full));
        assert_eq!(script.next_step(), Some(DeliveryStep::Fail));
        assert_eq!(script.next_step(), None);
    }

    #[test]
    fn empty_script_yields_nothing() {
        assert_eq!(DeliveryScript::repeating(vec![]).next_step(), None);
    }
}
