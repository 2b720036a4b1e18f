use serde::{Deserialize, Serialize};

/// Identity of one playable tile. Indexes into the session's [`TilePalette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub u8);

/// One playable element of the palette: a hue for the visual flash and a sound
/// cue name. Immutable once the palette is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    /// Hue in degrees on the HSL color wheel.
    pub hue: u16,
    /// Sound asset name associated with this tile.
    pub sound: String,
}

/// The fixed set of tiles a session plays with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePalette {
    tiles: Vec<Tile>,
}

impl TilePalette {
    pub fn new(tiles: Vec<Tile>) -> Self {
        TilePalette { tiles }
    }

    /// The reference palette: four tiles (green, red, yellow, blue).
    pub fn standard() -> Self {
        let descriptions: [(u16, &str); 4] = [
            (120, "sound1.mp3"),
            (0, "sound2.mp3"),
            (60, "sound3.mp3"),
            (240, "sound4.mp3"),
        ];
        let tiles = descriptions
            .iter()
            .enumerate()
            .map(|(i, (hue, sound))| Tile {
                id: TileId(i as u8),
                hue: *hue,
                sound: (*sound).to_string(),
            })
            .collect();
        TilePalette { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}
