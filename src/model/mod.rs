use serde::{Serialize, Serializer};

pub mod client;
pub mod server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct GameParams {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
}

/// Client-visible value of one tile. The browser client renders tiles from
/// single-character strings, so this serializes to that alphabet: `"?"` for
/// an untouched tile, `"!"` for a flag, `""` or `"1".."8"` for opened
/// tiles, `"9"` for a mine exposed at the end of a lost game and `"X"` for
/// the mine that was actually stepped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileView {
    Unopened,
    Flagged,
    Opened(u8),
    Mine,
    MineTriggered,
}

impl TileView {
    const OPEN_LABELS: [&'static str; 9] = ["", "1", "2", "3", "4", "5", "6", "7", "8"];

    pub fn as_str(self) -> &'static str {
        match self {
            TileView::Unopened => "?",
            TileView::Flagged => "!",
            TileView::Opened(adjacent) => Self::OPEN_LABELS[usize::from(adjacent.min(8))],
            TileView::Mine => "9",
            TileView::MineTriggered => "X",
        }
    }
}

impl Serialize for TileView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_wire_alphabet() {
        assert_eq!(TileView::Unopened.as_str(), "?");
        assert_eq!(TileView::Flagged.as_str(), "!");
        assert_eq!(TileView::Opened(0).as_str(), "");
        assert_eq!(TileView::Opened(3).as_str(), "3");
        assert_eq!(TileView::Opened(8).as_str(), "8");
        assert_eq!(TileView::Mine.as_str(), "9");
        assert_eq!(TileView::MineTriggered.as_str(), "X");
    }
}
