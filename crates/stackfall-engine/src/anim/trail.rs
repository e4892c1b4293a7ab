//! Hard-drop streak: per-column gradient lines plus scattered particles.

use std::{task::Poll, time::Duration};

use arrayvec::ArrayVec;
use rand::Rng;

use super::timeline::{AnimationHandle, Easing, Timeline};

/// Gradient stripe covering one column from the pre-drop row to the landing row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailLine {
    pub column: i32,
    pub from_row: i32,
    pub to_row: i32,
    pub color: u8,
}

impl TrailLine {
    /// Opacity of the stripe at `row`, brightest next to the landed piece.
    ///
    /// Alternate rows are dimmed to give the streak its striped look.
    #[must_use]
    pub fn alpha_at(&self, row: i32, opacity: f32) -> f32 {
        if row < self.from_row || row >= self.to_row {
            return 0.0;
        }
        #[expect(clippy::cast_precision_loss)]
        let t = (row - self.from_row + 1) as f32 / (self.to_row - self.from_row) as f32;
        let stripe = if (self.to_row - row) % 2 == 0 { 0.6 } else { 1.0 };
        t * stripe * opacity
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in cell units.
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
}

/// Column span touched by a dropping piece: `(column, top_row_before, top_row_after)`.
pub type DropColumn = (i32, i32, i32);

#[derive(Debug)]
pub struct Trail {
    lines: ArrayVec<TrailLine, 4>,
    particles: Vec<Particle>,
    fade: Option<AnimationHandle>,
    fade_duration: Duration,
    opacity: f32,
}

impl Trail {
    /// Builds a trail for the given columns.
    ///
    /// Particles are spread over the bounding rectangle of all columns with
    /// their vertical position skewed toward the landing end.
    pub fn new<R: Rng + ?Sized>(
        columns: impl IntoIterator<Item = DropColumn>,
        color: u8,
        particle_count: usize,
        fade_duration: Duration,
        rng: &mut R,
    ) -> Self {
        let lines: ArrayVec<TrailLine, 4> = columns
            .into_iter()
            .filter(|&(_, from, to)| to > from)
            .take(4)
            .map(|(column, from_row, to_row)| TrailLine {
                column,
                from_row,
                to_row,
                color,
            })
            .collect();

        let mut particles = Vec::with_capacity(particle_count);
        if let (Some(left), Some(right)) = (
            lines.iter().map(|l| l.column).min(),
            lines.iter().map(|l| l.column).max(),
        ) {
            let top = lines.iter().map(|l| l.from_row).min().unwrap_or(0);
            let bottom = lines.iter().map(|l| l.to_row).max().unwrap_or(top);
            #[expect(clippy::cast_precision_loss)]
            let (left, width, top, height) = (
                left as f32,
                (right - left + 1) as f32,
                top as f32,
                (bottom - top) as f32,
            );
            for _ in 0..particle_count {
                let r: f32 = rng.random();
                particles.push(Particle {
                    x: left + rng.random::<f32>() * width,
                    y: top + r.sqrt() * height,
                    size: rng.random_range(0.2..0.6),
                    opacity: rng.random_range(0.3..1.0),
                });
            }
        }

        Self {
            lines,
            particles,
            fade: None,
            fade_duration,
            opacity: 1.0,
        }
    }

    pub fn lines(&self) -> &[TrailLine] {
        &self.lines
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Advances the trail's own lifecycle.
    ///
    /// The first call starts the fade-out; once it resolves (finished or
    /// cancelled) the trail reports `Ready` and should be removed.
    pub fn draw(&mut self, timeline: &mut Timeline) -> Poll<()> {
        let handle = self
            .fade
            .get_or_insert_with(|| timeline.tween(self.fade_duration, Easing::EaseOutCubic));
        self.opacity = 1.0 - handle.progress();
        match handle.poll() {
            Poll::Pending => Poll::Pending,
            Poll::Ready(_) => Poll::Ready(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn trail(particles: usize) -> Trail {
        let mut rng = Pcg32::seed_from_u64(11);
        Trail::new([(3, 0, 10), (4, 1, 10), (5, 5, 5)], 2, particles, 100 * MS, &mut rng)
    }

    #[test]
    fn test_lines_skip_columns_without_travel() {
        let trail = trail(0);
        assert_eq!(trail.lines().len(), 2);
        assert!(trail.lines().iter().all(|l| l.color == 2));
    }

    #[test]
    fn test_particles_stay_inside_rectangle() {
        let trail = trail(200);
        assert_eq!(trail.particles().len(), 200);
        for p in trail.particles() {
            assert!((3.0..5.0).contains(&p.x));
            assert!((0.0..=10.0).contains(&p.y));
            assert!((0.3..1.0).contains(&p.opacity));
        }
        // sqrt skews toward the landing end
        let lower = trail.particles().iter().filter(|p| p.y > 5.0).count();
        assert!(lower > 100);
    }

    #[test]
    fn test_alpha_gradient() {
        let line = TrailLine {
            column: 0,
            from_row: 0,
            to_row: 4,
            color: 0,
        };
        assert!(line.alpha_at(3, 1.0) > line.alpha_at(0, 1.0));
        assert!(line.alpha_at(4, 1.0).abs() < f32::EPSILON);
        assert!(line.alpha_at(-1, 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_first_draw_starts_fade_and_removes_itself() {
        let mut timeline = Timeline::new();
        let mut trail = trail(4);
        assert!(!timeline.has_pending());
        assert_eq!(trail.draw(&mut timeline), Poll::Pending);
        assert!(timeline.has_pending());

        timeline.advance(50 * MS);
        assert_eq!(trail.draw(&mut timeline), Poll::Pending);
        assert!(trail.opacity() < 1.0);

        timeline.advance(50 * MS);
        assert_eq!(trail.draw(&mut timeline), Poll::Ready(()));
    }
}
