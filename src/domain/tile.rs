/// Board cells and the markers placed on them.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Open,
    Wall,
}

impl Tile {
    /// Does this cell stop a footprint from entering it?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Wall)
    }
}

/// Setup markers read from the board. The cell under a marker is open.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Marker {
    Pellet,
    PowerPellet,
    PlayerSpawn,
    GhostSpawn,
}

/// Decode one board character. `None` for characters outside the legend.
pub fn decode(ch: char) -> Option<(Tile, Option<Marker>)> {
    let cell = match ch {
        '#' => (Tile::Wall, None),
        ' ' => (Tile::Open, None),
        '.' => (Tile::Open, Some(Marker::Pellet)),
        'o' => (Tile::Open, Some(Marker::PowerPellet)),
        'P' => (Tile::Open, Some(Marker::PlayerSpawn)),
        'G' => (Tile::Open, Some(Marker::GhostSpawn)),
        _ => return None,
    };
    Some(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend() {
        assert_eq!(decode('#'), Some((Tile::Wall, None)));
        assert_eq!(decode('o'), Some((Tile::Open, Some(Marker::PowerPellet))));
        assert_eq!(decode('P'), Some((Tile::Open, Some(Marker::PlayerSpawn))));
        assert_eq!(decode('x'), None);
        assert!(Tile::Wall.is_solid());
        assert!(!Tile::Open.is_solid());
    }
}
