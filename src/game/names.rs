//! The table of opposite names and the substitution that applies it to levels.

use std::collections::HashMap;

use super::Level;

/// The official levels as `(id, name, opposite)`.
const OFFICIAL_LEVELS: [(i32, &str, &str); 22] = [
    (1, "Stereo Madness", "Mono Sanity"),
    (2, "Back on Track", "Back off Track"),
    (3, "Polargeist", "Solarhuman"),
    (4, "Dry Out", "Wet In"),
    (5, "Base After Base", "Peak After Peak"),
    (6, "Can't Let Go", "easiest level in gd :sob:"),
    (7, "Jumper", "Sitter"),
    (8, "Time Machine", "Space Stationary"),
    (9, "Cycles", "Static"),
    (10, "xStep", "yJump"),
    (11, "Clutterfunk", "Cleanjazz"),
    (12, "Theory of Everything", "Fact of Nothing"),
    (13, "Electroman Adventures", "Magnetboy Boringness"),
    (14, "Clubstep", "Barstay"),
    (15, "Electrodynamix", "Magnetostatics"),
    (16, "Hexagon Force", "Circle Weakness"),
    (17, "Blast Processing", "Drip Idle"),
    (18, "Theory of Everything 2", "Fact of Nothing F"),
    (19, "Geometrical Dominator", "Algebraic Submissive"),
    (20, "Deadlocked", "Aliveopened"),
    (21, "Fingerdash", "Toe Stay"),
    (22, "Dash", "Stay"),
];

/// Maps level IDs, and failing that level names, to the names that replace them.
#[derive(Debug, Clone)]
pub struct OppositeNames {
    by_id: HashMap<i32, &'static str>,
    by_name: HashMap<&'static str, &'static str>,
}

impl OppositeNames {
    /// Builds the table for the official levels.
    pub fn official() -> OppositeNames {
        OppositeNames {
            by_id: OFFICIAL_LEVELS
                .iter()
                .map(|&(id, _, opposite)| (id, opposite))
                .collect(),

            by_name: OFFICIAL_LEVELS
                .iter()
                .map(|&(_, name, opposite)| (name, opposite))
                .collect(),
        }
    }

    pub fn by_id(&self, id: i32) -> Option<&'static str> {
        self.by_id.get(&id).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&'static str> {
        self.by_name.get(name).copied()
    }

    /// Returns the name that should replace `level`'s, if there is one. The ID takes precedence
    /// over the current name.
    pub fn opposite_of(&self, level: &impl Level) -> Option<&'static str> {
        self.by_id(level.id())
            .or_else(|| self.by_name(&level.name()))
            .filter(|name| !name.is_empty())
    }

    /// Overwrites the level's name with its opposite if it has one, and hands the level back.
    pub fn rename<L: Level>(&self, mut level: Option<L>) -> Option<L> {
        if let Some(level) = level.as_mut() {
            if let Some(opposite) = self.opposite_of(&*level) {
                level.set_name(opposite);
            }
        }

        level
    }

    /// The number of levels in the table.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Every replacement name the table can produce.
    pub fn opposites(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_id.values().chain(self.by_name.values()).copied()
    }
}

impl Default for OppositeNames {
    fn default() -> Self {
        OppositeNames::official()
    }
}
