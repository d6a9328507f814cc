//! Trend segmentation into maximal monotonic runs.
//!
//! Each step between consecutive points is Up, Down or Flat. Flat steps fold
//! into the prevailing direction; a segment ends only when the step direction
//! flips. The point after the flip opens the next segment, so segments
//! partition the index range with no shared points.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSegment {
    pub direction: Direction,
    pub start_index: usize,
    /// Inclusive.
    pub end_index: usize,
    pub values: Vec<f64>,
}

impl TrendSegment {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last value minus first value.
    pub fn change(&self) -> f64 {
        match (self.values.first(), self.values.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

fn step_direction(prev: f64, curr: f64) -> Option<Direction> {
    if curr > prev {
        Some(Direction::Up)
    } else if curr < prev {
        Some(Direction::Down)
    } else {
        None
    }
}

pub fn segment(values: &[f64]) -> Vec<TrendSegment> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut current = values
        .windows(2)
        .find_map(|w| step_direction(w[0], w[1]))
        .unwrap_or(Direction::Up);

    let mut segments = Vec::new();
    let mut start = 0;

    for i in 1..values.len() {
        if let Some(dir) = step_direction(values[i - 1], values[i]) {
            if dir != current {
                segments.push(TrendSegment {
                    direction: current,
                    start_index: start,
                    end_index: i - 1,
                    values: values[start..i].to_vec(),
                });
                start = i;
                current = dir;
            }
        }
    }

    segments.push(TrendSegment {
        direction: current,
        start_index: start,
        end_index: values.len() - 1,
        values: values[start..].to_vec(),
    });

    segments
}

/// Which segment wins when two candidates have the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    #[default]
    First,
    Last,
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(TieBreak::First),
            "last" => Ok(TieBreak::Last),
            other => Err(format!("unknown tie break '{}' (expected first or last)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongestTrends<'a> {
    pub up: Option<&'a TrendSegment>,
    pub down: Option<&'a TrendSegment>,
}

pub fn longest_trends(segments: &[TrendSegment], tie_break: TieBreak) -> LongestTrends<'_> {
    let pick = |direction: Direction| {
        let mut best: Option<&TrendSegment> = None;
        for seg in segments.iter().filter(|s| s.direction == direction) {
            let replace = match best {
                None => true,
                Some(b) => match tie_break {
                    TieBreak::First => seg.len() > b.len(),
                    TieBreak::Last => seg.len() >= b.len(),
                },
            };
            if replace {
                best = Some(seg);
            }
        }
        best
    };

    LongestTrends {
        up: pick(Direction::Up),
        down: pick(Direction::Down),
    }
}
