//! Presentation-facing views of the simulation.
//! This module exists to give a drawing shell one closed set of things to draw and the glyph
//! and palette slot for each. It does not own any simulation state; the attack trail only
//! replays cells the combat step already produced.

use crate::types::{DropKind, Millis, Pos, TileKind};

pub const TRAIL_STEP_MS: u64 = 100;
pub const TRAIL_DURATION_MS: u64 = 600;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteSlot {
    Hostile,
    Champion,
    Treasure,
    Healing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sprite {
    pub glyph: char,
    pub palette: PaletteSlot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Renderable {
    Enemy { boss: bool },
    GoldDrop { amount: u32 },
    HealthPotion,
}

impl Renderable {
    pub fn sprite(self) -> Sprite {
        match self {
            Renderable::Enemy { boss: false } => Sprite { glyph: 'e', palette: PaletteSlot::Hostile },
            Renderable::Enemy { boss: true } => Sprite { glyph: 'B', palette: PaletteSlot::Champion },
            Renderable::GoldDrop { .. } => Sprite { glyph: '$', palette: PaletteSlot::Treasure },
            Renderable::HealthPotion => Sprite { glyph: '!', palette: PaletteSlot::Healing },
        }
    }
}

impl From<DropKind> for Renderable {
    fn from(kind: DropKind) -> Self {
        match kind {
            DropKind::Gold { amount } => Renderable::GoldDrop { amount },
            DropKind::HealthPotion => Renderable::HealthPotion,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placed {
    pub pos: Pos,
    pub renderable: Renderable,
}

pub fn tile_glyph(tile: TileKind) -> char {
    match tile {
        TileKind::Wall => '#',
        TileKind::Floor => '.',
        TileKind::Room => ' ',
        TileKind::Door => '+',
        TileKind::LevelExitDoor => '>',
    }
}

/// Cells crossed by the most recent fireball, revealed one per `TRAIL_STEP_MS`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackTrail {
    cells: Vec<Pos>,
    started_at: Millis,
}

impl AttackTrail {
    pub fn new(cells: Vec<Pos>, started_at: Millis) -> Self {
        Self { cells, started_at }
    }

    pub fn started_at(&self) -> Millis {
        self.started_at
    }

    pub fn is_active(&self, now: Millis) -> bool {
        now >= self.started_at && now.since(self.started_at) < TRAIL_DURATION_MS
    }

    pub fn visible_cells(&self, now: Millis) -> &[Pos] {
        if !self.is_active(now) {
            return &[];
        }
        let revealed = (now.since(self.started_at) / TRAIL_STEP_MS) as usize + 1;
        &self.cells[..revealed.min(self.cells.len())]
    }
}
