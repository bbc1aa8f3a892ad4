//! Level files
//!
//! One record per line, whitespace separated:
//!
//! ```text
//! Tile   <animation> <gridX> <gridY>
//! Dec    <animation> <gridX> <gridY>
//! Player <X> <Y> <CX> <CY> <SPEED> <JUMP> <MAXSPEED> <GRAVITY> <WEAPON>
//! ```
//!
//! Unknown or malformed records are logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::assets::AnimationClip;
use crate::math::Vec2;
use crate::world::{DECORATION_TAG, TILE_TAG};

/// Clip whose sprite sits lower than its cell, so it is anchored differently.
pub const TALL_PIPE_ANIMATION: &str = "PipeTall";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level defines no Player record")]
    MissingPlayer,
}

/// Player tuning parsed from the `Player` record.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Spawn cell
    pub x: f32,
    pub y: f32,
    /// Hitbox size in pixels
    pub cx: f32,
    pub cy: f32,
    pub speed: f32,
    /// Vertical velocity applied on jump; negative is up.
    pub jump: f32,
    pub max_speed: f32,
    pub gravity: f32,
    pub weapon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    Tile,
    Decoration,
}

impl PlacementKind {
    pub fn tag(self) -> &'static str {
        match self {
            PlacementKind::Tile => TILE_TAG,
            PlacementKind::Decoration => DECORATION_TAG,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub kind: PlacementKind,
    pub animation: String,
    pub grid: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub placements: Vec<Placement>,
    pub player: PlayerConfig,
}

impl Level {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let mut placements = Vec::new();
        let mut player = None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some((&record, args)) = tokens.split_first() else {
                continue;
            };
            if record.starts_with('#') {
                continue;
            }

            let parsed = match record {
                "Tile" => parse_placement(PlacementKind::Tile, args).map(|p| placements.push(p)),
                "Dec" => {
                    parse_placement(PlacementKind::Decoration, args).map(|p| placements.push(p))
                }
                "Player" => parse_player(args).map(|config| player = Some(config)),
                other => {
                    warn!(line = line_no, record = other, "unknown level record type, skipping");
                    continue;
                }
            };
            if let Err(reason) = parsed {
                warn!(line = line_no, record, %reason, "malformed level record, skipping");
            }
        }

        let player = player.ok_or(LevelError::MissingPlayer)?;
        debug!(placements = placements.len(), "level parsed");
        Ok(Self { placements, player })
    }
}

fn parse_placement(kind: PlacementKind, args: &[&str]) -> Result<Placement, String> {
    expect_arity(args, 3)?;
    Ok(Placement {
        kind,
        animation: args[0].to_string(),
        grid: Vec2::new(field(args, 1, "gridX")?, field(args, 2, "gridY")?),
    })
}

fn parse_player(args: &[&str]) -> Result<PlayerConfig, String> {
    expect_arity(args, 9)?;
    Ok(PlayerConfig {
        x: field(args, 0, "X")?,
        y: field(args, 1, "Y")?,
        cx: field(args, 2, "CX")?,
        cy: field(args, 3, "CY")?,
        speed: field(args, 4, "SPEED")?,
        jump: field(args, 5, "JUMP")?,
        max_speed: field(args, 6, "MAXSPEED")?,
        gravity: field(args, 7, "GRAVITY")?,
        weapon: args[8].to_string(),
    })
}

fn expect_arity(args: &[&str], expected: usize) -> Result<(), String> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} fields, found {}", args.len()))
    }
}

/// Parses a finite number; `nan` and `inf` are rejected like any other junk.
fn field(args: &[&str], index: usize, name: &str) -> Result<f32, String> {
    let value = args[index]
        .parse::<f32>()
        .map_err(|_| format!("unable to parse {name} from '{}'", args[index]))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{name} must be finite, found '{}'", args[index]))
    }
}

/// Converts grid cells to pixel-space centers.
///
/// Grid y counts up from the bottom of the viewport; the bottom edge of a
/// sprite rests on the bottom edge of its cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub cell: Vec2,
    pub viewport_height: f32,
}

impl GridLayout {
    pub fn new(cell: Vec2, viewport_height: f32) -> Self {
        Self {
            cell,
            viewport_height,
        }
    }

    pub fn mid_pixel(&self, grid: Vec2, clip: &AnimationClip, scale: f32) -> Vec2 {
        let size = clip.size * scale;
        let x = grid.x * self.cell.x + size.x / 2.0;
        let bottom = self.viewport_height - grid.y * self.cell.y;
        if clip.name == TALL_PIPE_ANIMATION {
            Vec2::new(x, bottom - (size.y / 4.0) * 3.33)
        } else {
            Vec2::new(x, bottom - size.y / 2.0)
        }
    }
}
