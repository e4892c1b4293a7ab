use std::task::Poll;

use rand::{Rng, seq::SliceRandom};

use crate::{
    config::DelayRange,
    core::{shape::PieceKind, tetromino::PieceId},
};

use super::timeline::{AnimationHandle, Timeline};

/// Hands out labels round-robin, reshuffling at the start of every round.
#[derive(Debug, Clone)]
pub struct LabelDeck {
    labels: Vec<String>,
    order: Vec<usize>,
    cursor: usize,
}

impl LabelDeck {
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            order: (0..labels.len()).collect(),
            cursor: labels.len(),
            labels,
        }
    }

    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        if self.labels.is_empty() {
            return String::new();
        }
        if self.cursor >= self.order.len() {
            self.order.shuffle(rng);
            self.cursor = 0;
        }
        let label = self.labels[self.order[self.cursor]].clone();
        self.cursor += 1;
        label
    }
}

/// What observers see of the current preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewState {
    pub kind: PieceKind,
    pub label: String,
    /// Characters typed so far.
    pub typed: usize,
    pub is_typing: bool,
}

impl PreviewState {
    /// The typed prefix of the label.
    #[must_use]
    pub fn text(&self) -> &str {
        let end = self
            .label
            .char_indices()
            .nth(self.typed)
            .map_or(self.label.len(), |(i, _)| i);
        &self.label[..end]
    }
}

/// Types one piece's label a character at a time.
///
/// Bound to the piece that was active when it started: if any later poll sees
/// a different active piece, typing stops and the preview resolves at once.
#[derive(Debug)]
pub struct PiecePreview {
    piece_id: PieceId,
    kind: PieceKind,
    label: String,
    typed: usize,
    delay: Option<AnimationHandle>,
    done: bool,
}

impl PiecePreview {
    #[must_use]
    pub fn new(piece_id: PieceId, kind: PieceKind, label: String) -> Self {
        Self {
            piece_id,
            kind,
            label,
            typed: 0,
            delay: None,
            done: false,
        }
    }

    #[must_use]
    pub fn piece_id(&self) -> PieceId {
        self.piece_id
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Resumes typing; `active` is the board's current piece.
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        active: Option<PieceId>,
        timeline: &mut Timeline,
        rng: &mut R,
        cadence: DelayRange,
    ) -> Poll<()> {
        if self.done {
            return Poll::Ready(());
        }
        if active != Some(self.piece_id) {
            self.finish();
            return Poll::Ready(());
        }
        let total = self.label.chars().count();
        loop {
            if let Some(delay) = &self.delay {
                match delay.poll() {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Err(_)) => {
                        self.finish();
                        return Poll::Ready(());
                    }
                    Poll::Ready(Ok(())) => {
                        self.delay = None;
                        self.typed += 1;
                    }
                }
            }
            if self.typed >= total {
                self.done = true;
                return Poll::Ready(());
            }
            self.delay = Some(timeline.delay(cadence.sample(rng)));
        }
    }

    fn finish(&mut self) {
        if let Some(delay) = self.delay.take() {
            delay.cancel();
        }
        self.done = true;
    }

    #[must_use]
    pub fn snapshot(&self) -> PreviewState {
        PreviewState {
            kind: self.kind,
            label: self.label.clone(),
            typed: self.typed,
            is_typing: !self.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, time::Duration};

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    const MS: Duration = Duration::from_millis(1);
    const CADENCE: DelayRange = DelayRange {
        min_ms: 10,
        max_ms: 10,
    };

    #[test]
    fn test_types_one_char_per_delay() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut timeline = Timeline::new();
        let id = PieceId(7);
        let mut preview = PiecePreview::new(id, PieceKind::T, "impl".into());

        assert_eq!(preview.poll(Some(id), &mut timeline, &mut rng, CADENCE), Poll::Pending);
        assert_eq!(preview.snapshot().text(), "");
        timeline.advance(10 * MS);
        assert_eq!(preview.poll(Some(id), &mut timeline, &mut rng, CADENCE), Poll::Pending);
        assert_eq!(preview.snapshot().text(), "i");
        let rest: Vec<_> = (0..3)
            .map(|_| {
                timeline.advance(10 * MS);
                preview.poll(Some(id), &mut timeline, &mut rng, CADENCE)
            })
            .collect();
        assert_eq!(rest, [Poll::Pending, Poll::Pending, Poll::Ready(())]);
        assert!(preview.is_done());
        assert_eq!(preview.snapshot().text(), "impl");
        assert!(!preview.snapshot().is_typing);
    }

    #[test]
    fn test_piece_change_cancels_typing() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut timeline = Timeline::new();
        let id = PieceId(1);
        let mut preview = PiecePreview::new(id, PieceKind::I, "match".into());
        assert!(preview.poll(Some(id), &mut timeline, &mut rng, CADENCE).is_pending());
        timeline.advance(10 * MS);
        assert!(preview.poll(Some(id), &mut timeline, &mut rng, CADENCE).is_pending());

        assert_eq!(
            preview.poll(Some(PieceId(2)), &mut timeline, &mut rng, CADENCE),
            Poll::Ready(())
        );
        assert!(preview.is_done());
        assert_eq!(preview.snapshot().text(), "m");
        assert!(!timeline.has_pending());
    }

    #[test]
    fn test_zero_delay_types_immediately() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut timeline = Timeline::new();
        let id = PieceId(1);
        let mut preview = PiecePreview::new(id, PieceKind::O, "fn".into());
        let instant = DelayRange {
            min_ms: 0,
            max_ms: 0,
        };
        assert_eq!(preview.poll(Some(id), &mut timeline, &mut rng, instant), Poll::Ready(()));
        assert_eq!(preview.snapshot().text(), "fn");
    }

    #[test]
    fn test_deck_visits_every_label_per_round() {
        let mut rng = Pcg32::seed_from_u64(4);
        let labels: Vec<String> = ["a", "b", "c", "d"].map(String::from).to_vec();
        let mut deck = LabelDeck::new(labels);
        for _ in 0..3 {
            let round: HashSet<_> = (0..4).map(|_| deck.next(&mut rng)).collect();
            assert_eq!(round.len(), 4);
        }
    }
}
