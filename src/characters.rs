//! Playable character roster and unlock rules

use serde::{Deserialize, Serialize};

/// Character identifiers (stable across saves)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CharacterId {
    #[default]
    Byron,
    Ray,
    Zack,
    Diamond,
    Maria,
}

/// What it takes to unlock a character
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Unlock {
    /// Available from the first run
    Starter,
    /// Cumulative shootout wins across all runs
    ShootoutWins(u32),
    /// Best single-run score
    HighScore(u64),
    /// Cumulative distance across all runs
    TotalKm(f64),
}

/// Rating out of 5 in each category (display only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub speed: u8,
    pub defense: u8,
    pub luck: u8,
}

/// Roster entry; serialised once for the page's select screen and theming
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: &'static str,
    pub nickname: &'static str,
    pub origin: &'static str,
    /// Who is doing the chasing
    pub chased_by: &'static str,
    pub car_color: u32,
    pub accent_color: &'static str,
    pub unlock: Unlock,
    pub unlock_desc: &'static str,
    pub bio: &'static str,
    pub stats: Stats,
}

pub const ROSTER: [Character; 5] = [
    Character {
        id: CharacterId::Byron,
        name: "Byron Grant",
        nickname: "\"Big B\"",
        origin: "Eastside Projects",
        chased_by: "RIVAL GANG",
        car_color: 0x8B0000,
        accent_color: "#cc2200",
        unlock: Unlock::Starter,
        unlock_desc: "STARTER",
        bio: "Just got out. The streets didn't forget his name.",
        stats: Stats { speed: 3, defense: 5, luck: 2 },
    },
    Character {
        id: CharacterId::Ray,
        name: "Old Head Ray",
        nickname: "\"The O.G.\"",
        origin: "South Side",
        chased_by: "CORRUPT COPS",
        car_color: 0x1a3a6a,
        accent_color: "#4488cc",
        unlock: Unlock::Starter,
        unlock_desc: "STARTER",
        bio: "Been through it all. Still standing. Wisdom is the ride.",
        stats: Stats { speed: 2, defense: 5, luck: 4 },
    },
    Character {
        id: CharacterId::Zack,
        name: "Zack",
        nickname: "\"Ghost\"",
        origin: "Unknown",
        chased_by: "FBI DRONES",
        car_color: 0x112244,
        accent_color: "#44ff88",
        unlock: Unlock::ShootoutWins(3),
        unlock_desc: "SURVIVE 3 SHOOTOUTS",
        bio: "They've been watching him his whole life. He's done hiding.",
        stats: Stats { speed: 5, defense: 2, luck: 3 },
    },
    Character {
        id: CharacterId::Diamond,
        name: "Diamond",
        nickname: "\"The Star\"",
        origin: "Hollywood",
        chased_by: "PAPARAZZI",
        car_color: 0xaa8800,
        accent_color: "#ffcc00",
        unlock: Unlock::HighScore(5000),
        unlock_desc: "SCORE 5,000 PTS",
        bio: "Fame is her weapon. Privacy is the war she never stops winning.",
        stats: Stats { speed: 4, defense: 3, luck: 4 },
    },
    Character {
        id: CharacterId::Maria,
        name: "Maria",
        nickname: "\"La Jefa\"",
        origin: "West Side",
        chased_by: "OBSESSIVE EX",
        car_color: 0x880033,
        accent_color: "#ff44aa",
        unlock: Unlock::TotalKm(10.0),
        unlock_desc: "DRIVE 10KM TOTAL",
        bio: "She's done running scared. Now she runs on her own terms.",
        stats: Stats { speed: 4, defense: 3, luck: 5 },
    },
];

impl CharacterId {
    /// Roster entry for this id
    pub fn character(self) -> &'static Character {
        ROSTER
            .iter()
            .find(|c| c.id == self)
            .unwrap_or(&ROSTER[0])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterId::Byron => "byron",
            CharacterId::Ray => "ray",
            CharacterId::Zack => "zack",
            CharacterId::Diamond => "diamond",
            CharacterId::Maria => "maria",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        ROSTER
            .iter()
            .map(|c| c.id)
            .find(|id| id.as_str() == s.to_lowercase())
    }
}

/// Ids unlocked from the start
pub fn starters() -> Vec<CharacterId> {
    ROSTER
        .iter()
        .filter(|c| c.unlock == Unlock::Starter)
        .map(|c| c.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_lookup() {
        assert_eq!(CharacterId::Zack.character().name, "Zack");
        assert_eq!(CharacterId::from_str("Diamond"), Some(CharacterId::Diamond));
        assert_eq!(CharacterId::from_str("nobody"), None);
        for c in &ROSTER {
            assert_eq!(CharacterId::from_str(c.id.as_str()), Some(c.id));
        }
    }

    #[test]
    fn test_starters() {
        assert_eq!(starters(), vec![CharacterId::Byron, CharacterId::Ray]);
    }

    #[test]
    fn test_roster_serializes_display_data() {
        let json = serde_json::to_value(ROSTER).expect("serialize");
        let maria = &json[4];
        assert_eq!(maria["id"], "maria");
        assert_eq!(maria["car_color"], 0x880033);
        assert_eq!(maria["chased_by"], "OBSESSIVE EX");
        assert_eq!(maria["unlock"]["kind"], "total_km");
        assert_eq!(maria["stats"]["luck"], 5);
    }

    #[test]
    fn test_id_serializes_lowercase() {
        let json = serde_json::to_string(&CharacterId::Maria).expect("serialize");
        assert_eq!(json, "\"maria\"");
    }
}
