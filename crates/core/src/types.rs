use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct EnemyId;
    pub struct DropId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn step(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx * distance, dy * distance)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
    Room,
    Door,
    LevelExitDoor,
}

impl TileKind {
    pub fn is_passable(self) -> bool {
        self != TileKind::Wall
    }

    /// Corridor tiles are carved `Floor` plus the `Door` cells reclassified from them.
    pub fn is_corridor(self) -> bool {
        matches!(self, TileKind::Floor | TileKind::Door)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::South, Direction::East, Direction::West];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }
}

/// Caller-supplied timestamp in milliseconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Move,
    Fireball,
    Kill,
    Damage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Victory,
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropKind {
    Gold { amount: u32 },
    HealthPotion,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    LevelStarted { level: u8, start: Pos },
    PlayerMoved { to: Pos },
    EnemyHit { enemy: EnemyId, damage: i32, critical: bool },
    EnemyKilled { enemy: EnemyId, boss: bool, pos: Pos },
    PlayerDamaged { amount: i32, remaining: i32 },
    DropSpawned { kind: DropKind, pos: Pos },
    DropCollected { kind: DropKind },
    DropExpired { kind: DropKind, pos: Pos },
    KeyMaterialized { pos: Pos },
    KeyCollected,
    ExitDoorPlaced { pos: Pos },
    LevelCompleted { level: u8 },
    RunFinished { outcome: RunOutcome },
}
