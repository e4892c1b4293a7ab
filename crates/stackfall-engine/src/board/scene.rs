//! Render model rebuilt by the board on every frame.
//!
//! Coordinates are in cell units (row 0 at the top, fractional while a tween
//! is in flight). [`Geometry`] maps them onto the host surface.

use crate::{
    anim::{Effects, Particle, PreviewState, Trail, TrailLine},
    core::{
        block::{Block, RenderAttrs},
        grid::Grid,
        tetromino::Tetromino,
    },
};

/// Measured layout of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub columns: usize,
    pub rows: usize,
    pub cell_width: u16,
    pub cell_height: u16,
    pub gap: u16,
}

impl Geometry {
    /// Host-unit offset of the top-left corner of cell `(x, y)`.
    #[must_use]
    pub fn cell_origin(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * (f32::from(self.cell_width) + f32::from(self.gap)),
            y * (f32::from(self.cell_height) + f32::from(self.gap)),
        )
    }

    /// Host-unit size of the whole grid.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        let extent = |count: usize, cell: u16| {
            let pitch = usize::from(cell) + usize::from(self.gap);
            count
                .saturating_mul(pitch)
                .saturating_sub(usize::from(self.gap))
        };
        (
            extent(self.columns, self.cell_width),
            extent(self.rows, self.cell_height),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBlock {
    pub x: f32,
    pub y: f32,
    pub color: u8,
    pub render: RenderAttrs,
}

impl SceneBlock {
    fn frozen(block: &Block) -> Self {
        let (x, y) = block.position();
        let render = block.render();
        #[expect(clippy::cast_precision_loss)]
        let (x, y) = (x as f32, y as f32 + render.offset_y);
        Self {
            x,
            y,
            color: block.color(),
            render,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrailSprite {
    pub lines: Vec<TrailLine>,
    pub particles: Vec<Particle>,
    pub opacity: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// `None` until the host surface has been measured; everything else is
    /// empty in that case.
    pub geometry: Option<Geometry>,
    pub blocks: Vec<SceneBlock>,
    /// Blocks of cleared rows that are still fading out.
    pub fading: Vec<SceneBlock>,
    pub piece: Vec<SceneBlock>,
    /// Cells the active piece would occupy after a hard drop.
    pub ghost: Vec<(i32, i32)>,
    pub trails: Vec<TrailSprite>,
    pub preview: Option<PreviewState>,
}

impl Scene {
    pub(crate) fn build(
        geometry: Option<Geometry>,
        grid: &Grid,
        effects: &Effects,
        active: Option<(&Tetromino, i32)>,
        trails: &[Trail],
        preview: Option<PreviewState>,
    ) -> Self {
        let Some(geometry) = geometry else {
            return Self::default();
        };
        let mut scene = Self {
            geometry: Some(geometry),
            blocks: grid.blocks().map(SceneBlock::frozen).collect(),
            fading: effects.fading_blocks().map(SceneBlock::frozen).collect(),
            preview,
            ..Self::default()
        };
        if let Some((piece, ghost_y)) = active {
            let (px, py) = piece.position();
            let (rx, ry) = piece.render_position();
            scene.piece = piece
                .blocks()
                .map(|(x, y, block)| {
                    #[expect(clippy::cast_precision_loss)]
                    let (dx, dy) = ((x - px) as f32, (y - py) as f32);
                    SceneBlock {
                        x: rx + dx,
                        y: ry + dy,
                        color: block.color(),
                        render: block.render(),
                    }
                })
                .collect();
            if !piece.has_hard_dropped() && ghost_y != py {
                scene.ghost = piece
                    .blocks()
                    .map(|(x, y, _)| (x, y - py + ghost_y))
                    .collect();
            }
        }
        scene.trails = trails
            .iter()
            .map(|trail| TrailSprite {
                lines: trail.lines().to_vec(),
                particles: trail.particles().to_vec(),
                opacity: trail.opacity(),
            })
            .collect();
        scene
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_size_excludes_trailing_gap() {
        let geometry = Geometry {
            columns: 4,
            rows: 3,
            cell_width: 2,
            cell_height: 1,
            gap: 1,
        };
        assert_eq!(geometry.size(), (11, 5));
        assert_eq!(geometry.cell_origin(1.0, 2.0), (3.0, 4.0));
    }

    #[test]
    fn test_geometry_with_huge_cells() {
        let geometry = Geometry {
            columns: 2,
            rows: 1,
            cell_width: u16::MAX,
            cell_height: u16::MAX,
            gap: u16::MAX,
        };
        let pitch = usize::from(u16::MAX) * 2;
        assert_eq!(geometry.size(), (pitch * 2 - usize::from(u16::MAX), usize::from(u16::MAX)));
        assert_eq!(geometry.cell_origin(1.0, 0.0), (2.0 * f32::from(u16::MAX), 0.0));
    }

    #[test]
    fn test_unmeasured_scene_is_empty() {
        let mut grid = Grid::new(4, 4);
        grid.place(0, 3, Block::new(1));
        let scene = Scene::build(None, &grid, &Effects::default(), None, &[], None);
        assert!(scene.is_empty());
        assert!(scene.blocks.is_empty());
    }
}
