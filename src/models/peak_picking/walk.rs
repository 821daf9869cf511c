use super::config::PeakPickerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDirection {
    Left,
    Right,
}

/// State of a single directional walk away from a seed.
///
/// `Walking` and `Conceded` are the in-progress states, a walk that
/// already tolerated its one increase is `Conceded`. Every walk ends
/// either `Satisfied` (enough samples collected) or `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Walking,
    Conceded,
    Aborted,
    Satisfied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    pub state: WalkState,
    /// Furthest index included by the walk (the seed if none was).
    pub bound: usize,
    pub count: usize,
    pub threshold: usize,
}

impl WalkOutcome {
    pub fn is_satisfied(&self) -> bool {
        self.state == WalkState::Satisfied
    }
}

struct DirectionalWalk<'a> {
    positions: &'a [f64],
    intensities: &'a [f64],
    picked: &'a [bool],
    seed: usize,
    direction: WalkDirection,
}

impl<'a> DirectionalWalk<'a> {
    fn next(&self, idx: usize) -> Option<usize> {
        match self.direction {
            WalkDirection::Left => idx.checked_sub(1),
            WalkDirection::Right => {
                let next = idx + 1;
                (next < self.intensities.len()).then_some(next)
            }
        }
    }

    fn run(&self, config: &PeakPickerConfig) -> WalkOutcome {
        let seed_intensity = self.intensities[self.seed];
        let seed_position = self.positions[self.seed];
        let small_peak_limit = seed_intensity * config.small_peak;

        let mut state = WalkState::Walking;
        let mut threshold = config.min_req;
        let mut count = 0;
        let mut bound = self.seed;
        let mut prev = self.seed;
        let mut current = self.next(self.seed);

        while let Some(j) = current {
            if self.picked[j] {
                break;
            }
            if config.window_exceeded(self.positions[j] - seed_position) {
                break;
            }

            if self.intensities[j] > self.intensities[prev] {
                // An increase right next to the seed means it is not a maximum.
                if config.strict || state == WalkState::Conceded || prev == self.seed {
                    break;
                }
                state = WalkState::Conceded;
                threshold += 1;
            }

            count += 1;
            bound = j;

            if count >= threshold && self.intensities[j] <= small_peak_limit {
                break;
            }
            prev = j;
            current = self.next(j);
        }

        let state = if count >= threshold {
            WalkState::Satisfied
        } else {
            WalkState::Aborted
        };

        WalkOutcome {
            state,
            bound,
            count,
            threshold,
        }
    }
}

/// Walks away from `seed` in one direction over position sorted samples.
///
/// Stops on an already picked sample, on leaving the window, on an
/// intensity increase that cannot be tolerated, or once enough samples
/// were taken and the last one is small compared to the seed.
pub fn walk(
    positions: &[f64],
    intensities: &[f64],
    picked: &[bool],
    seed: usize,
    direction: WalkDirection,
    config: &PeakPickerConfig,
) -> WalkOutcome {
    DirectionalWalk {
        positions,
        intensities,
        picked,
        seed,
        direction,
    }
    .run(config)
}
