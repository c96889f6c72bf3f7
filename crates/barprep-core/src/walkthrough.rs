//! Linear step sequences: the onboarding tour and the first-time tooltips.
//!
//! Only the logical position is tracked here. Where a tooltip is drawn on
//! screen is up to the presentation layer, which gets `(step_index, target)`.

use serde::{Deserialize, Serialize};

/// Position inside a fixed-length sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walkthrough {
    len: usize,
    index: usize,
}

/// Result of moving forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    Finished,
}

impl Walkthrough {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    /// Moving past the last step finishes the sequence.
    pub fn next(&mut self) -> Advance {
        if self.is_last() {
            Advance::Finished
        } else {
            self.index += 1;
            Advance::Moved(self.index)
        }
    }

    /// No-op on the first step.
    pub fn back(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    /// 0.0 .. 100.0, counting the current step as seen.
    pub fn progress_pct(&self) -> f64 {
        if self.len == 0 {
            return 100.0;
        }
        (self.index + 1) as f64 / self.len as f64 * 100.0
    }
}

/// A screen of the guided tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourStep {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Preferred side of the anchor for a tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    Bottom,
    Left,
    Right,
}

/// A first-time tooltip anchored to a named UI target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TooltipStep {
    pub id: String,
    pub target: String,
    pub title: String,
    pub description: String,
    pub placement: Placement,
}

/// What the presentation layer needs to draw the active tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipFocus {
    pub step_index: usize,
    pub step_id: String,
    pub target: String,
    pub placement: Placement,
}

pub fn tour_steps() -> Vec<TourStep> {
    [
        (
            "welcome",
            "Welcome!",
            "Your complete bar exam preparation platform. Let's take a quick tour.",
        ),
        (
            "questions",
            "Commented questions",
            "Thousands of past-exam questions, each with a detailed explanation.",
        ),
        (
            "simulados",
            "Full mock exams",
            "Timed mock exams that mirror the official exam conditions.",
        ),
        (
            "progress",
            "Track your progress",
            "See your performance, spot weak areas and follow your evolution.",
        ),
    ]
    .into_iter()
    .map(|(id, title, description)| TourStep {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
    })
    .collect()
}

pub fn tooltip_steps() -> Vec<TooltipStep> {
    [
        (
            "simulado-tab",
            "simulado",
            "Full mock exams",
            "Practise with complete, timed exams identical to the real one.",
        ),
        (
            "areas-tab",
            "areas",
            "Study by area",
            "Focus on the subjects you most need to improve.",
        ),
        (
            "performance-tab",
            "performance",
            "Track your progress",
            "Detailed statistics and the points you should work on.",
        ),
    ]
    .into_iter()
    .map(|(id, target, title, description)| TooltipStep {
        id: id.to_string(),
        target: target.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        placement: Placement::Bottom,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_back_and_finish() {
        let mut w = Walkthrough::new(4);
        assert_eq!(w.back(), 0);
        assert_eq!(w.next(), Advance::Moved(1));
        assert_eq!(w.next(), Advance::Moved(2));
        assert_eq!(w.back(), 1);
        assert_eq!(w.next(), Advance::Moved(2));
        assert_eq!(w.next(), Advance::Moved(3));
        assert!(w.is_last());
        assert_eq!(w.next(), Advance::Finished);
        assert_eq!(w.index(), 3);
    }

    #[test]
    fn progress_counts_current_step() {
        let mut w = Walkthrough::new(4);
        assert_eq!(w.progress_pct(), 25.0);
        w.next();
        assert_eq!(w.progress_pct(), 50.0);
    }

    #[test]
    fn empty_sequence_finishes_immediately() {
        let mut w = Walkthrough::new(0);
        assert_eq!(w.next(), Advance::Finished);
    }

    #[test]
    fn catalog_sizes() {
        assert_eq!(tour_steps().len(), 4);
        assert_eq!(tooltip_steps().len(), 3);
    }
}
