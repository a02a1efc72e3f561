//! Static reference lists: skills, bosses, Grand Exchange items and the
//! default slayer-master roster.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trainable skill tracked by the upstream hiscores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Attack,
    Defence,
    Strength,
    Hitpoints,
    Ranged,
    Prayer,
    Magic,
    Cooking,
    Woodcutting,
    Fletching,
    Fishing,
    Firemaking,
    Crafting,
    Smithing,
    Mining,
    Herblore,
    Agility,
    Thieving,
    Slayer,
    Farming,
    Runecraft,
    Hunter,
    Construction,
}

impl Skill {
    /// Hiscores order, used by the tile generator.
    pub const ALL: [Self; 23] = [
        Self::Attack,
        Self::Defence,
        Self::Strength,
        Self::Hitpoints,
        Self::Ranged,
        Self::Prayer,
        Self::Magic,
        Self::Cooking,
        Self::Woodcutting,
        Self::Fletching,
        Self::Fishing,
        Self::Firemaking,
        Self::Crafting,
        Self::Smithing,
        Self::Mining,
        Self::Herblore,
        Self::Agility,
        Self::Thieving,
        Self::Slayer,
        Self::Farming,
        Self::Runecraft,
        Self::Hunter,
        Self::Construction,
    ];

    /// Combat-first order used by daily challenges. Changing it reshuffles
    /// every published daily task.
    pub const DAILY_ORDER: [Self; 23] = [
        Self::Attack,
        Self::Strength,
        Self::Defence,
        Self::Ranged,
        Self::Magic,
        Self::Hitpoints,
        Self::Prayer,
        Self::Slayer,
        Self::Mining,
        Self::Fishing,
        Self::Woodcutting,
        Self::Cooking,
        Self::Firemaking,
        Self::Crafting,
        Self::Smithing,
        Self::Fletching,
        Self::Herblore,
        Self::Thieving,
        Self::Agility,
        Self::Runecraft,
        Self::Construction,
        Self::Hunter,
        Self::Farming,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defence => "defence",
            Self::Strength => "strength",
            Self::Hitpoints => "hitpoints",
            Self::Ranged => "ranged",
            Self::Prayer => "prayer",
            Self::Magic => "magic",
            Self::Cooking => "cooking",
            Self::Woodcutting => "woodcutting",
            Self::Fletching => "fletching",
            Self::Fishing => "fishing",
            Self::Firemaking => "firemaking",
            Self::Crafting => "crafting",
            Self::Smithing => "smithing",
            Self::Mining => "mining",
            Self::Herblore => "herblore",
            Self::Agility => "agility",
            Self::Thieving => "thieving",
            Self::Slayer => "slayer",
            Self::Farming => "farming",
            Self::Runecraft => "runecraft",
            Self::Hunter => "hunter",
            Self::Construction => "construction",
        }
    }

    /// Capitalised label, e.g. `"Woodcutting"`.
    #[must_use]
    pub fn display_name(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_ascii_uppercase().to_string() + chars.as_str()
        })
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Skill {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|skill| skill.as_str() == lowered)
            .ok_or(())
    }
}

/// Boss difficulty bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossTier {
    Low,
    Mid,
    High,
    Elite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boss {
    pub name: &'static str,
    pub tier: BossTier,
    pub wilderness: bool,
}

const fn boss(name: &'static str, tier: BossTier, wilderness: bool) -> Boss {
    Boss {
        name,
        tier,
        wilderness,
    }
}

pub const BOSSES: &[Boss] = &[
    boss("Obor", BossTier::Low, false),
    boss("Bryophyta", BossTier::Low, false),
    boss("Scurrius", BossTier::Low, false),
    boss("Giant Mole", BossTier::Low, false),
    boss("Deranged Archaeologist", BossTier::Low, false),
    boss("Sarachnis", BossTier::Low, false),
    boss("Crazy Archaeologist", BossTier::Low, true),
    boss("Chaos Fanatic", BossTier::Low, true),
    boss("Scorpia", BossTier::Low, true),
    boss("King Black Dragon", BossTier::Low, true),
    boss("Barrows Brothers", BossTier::Mid, false),
    boss("Dagannoth Rex", BossTier::Mid, false),
    boss("Dagannoth Prime", BossTier::Mid, false),
    boss("Dagannoth Supreme", BossTier::Mid, false),
    boss("Kalphite Queen", BossTier::Mid, false),
    boss("Kraken", BossTier::Mid, false),
    boss("Thermonuclear Smoke Devil", BossTier::Mid, false),
    boss("Grotesque Guardians", BossTier::Mid, false),
    boss("Zulrah", BossTier::Mid, false),
    boss("Chaos Elemental", BossTier::Mid, true),
    boss("Vorkath", BossTier::High, false),
    boss("Cerberus", BossTier::High, false),
    boss("Alchemical Hydra", BossTier::High, false),
    boss("Abyssal Sire", BossTier::High, false),
    boss("General Graardor", BossTier::High, false),
    boss("Commander Zilyana", BossTier::High, false),
    boss("Kree'arra", BossTier::High, false),
    boss("K'ril Tsutsaroth", BossTier::High, false),
    boss("Corporeal Beast", BossTier::High, false),
    boss("Phantom Muspah", BossTier::High, false),
    boss("Callisto", BossTier::High, true),
    boss("Venenatis", BossTier::High, true),
    boss("Vet'ion", BossTier::High, true),
    boss("TzTok-Jad", BossTier::Elite, false),
    boss("TzKal-Zuk", BossTier::Elite, false),
    boss("Chambers of Xeric", BossTier::Elite, false),
    boss("Theatre of Blood", BossTier::Elite, false),
    boss("Tombs of Amascut", BossTier::Elite, false),
    boss("The Nightmare", BossTier::Elite, false),
    boss("Nex", BossTier::Elite, false),
    boss("Duke Sucellus", BossTier::Elite, false),
    boss("The Leviathan", BossTier::Elite, false),
    boss("The Whisperer", BossTier::Elite, false),
    boss("Vardorvis", BossTier::Elite, false),
];

/// Bosses belonging to a single difficulty bracket, in catalog order.
#[must_use]
pub fn bosses_in_tier(tier: BossTier) -> Vec<&'static Boss> {
    BOSSES.iter().filter(|boss| boss.tier == tier).collect()
}

/// Grand Exchange price bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemTier {
    Cheap,
    Medium,
    Expensive,
    Luxury,
}

impl ItemTier {
    pub const ALL: [Self; 4] = [Self::Cheap, Self::Medium, Self::Expensive, Self::Luxury];

    #[must_use]
    pub const fn items(self) -> &'static [&'static str] {
        match self {
            Self::Cheap => &[
                "Feather",
                "Logs",
                "Bronze bar",
                "Raw shrimps",
                "Air rune",
                "Iron ore",
                "Coal",
                "Bucket of sand",
                "Flax",
                "Bowstring",
            ],
            Self::Medium => &[
                "Yew logs",
                "Mithril bar",
                "Prayer potion(4)",
                "Shark",
                "Nature rune",
                "Magic logs",
                "Adamantite bar",
                "Ranarr weed",
                "Death rune",
                "Super restore(4)",
            ],
            Self::Expensive => &[
                "Dragon bones",
                "Runite bar",
                "Saradomin brew(4)",
                "Abyssal whip",
                "Dragon boots",
                "Zulrah's scales",
                "Amulet of glory(6)",
                "Superior dragon bones",
                "Dragon dart tip",
                "Trident of the seas",
            ],
            Self::Luxury => &[
                "Armadyl godsword",
                "Bandos chestplate",
                "Dragon claws",
                "Toxic blowpipe",
                "Amulet of torture",
                "Primordial boots",
                "Abyssal bludgeon",
                "Kodai wand",
                "Dragon hunter crossbow",
                "Armadyl crossbow",
            ],
        }
    }
}

/// Broad item categories used by daily Grand Exchange challenges.
#[must_use]
pub const fn daily_item_categories(tier: ItemTier) -> &'static [&'static str] {
    match tier {
        ItemTier::Cheap => &["Logs", "Fish", "Ores"],
        ItemTier::Medium => &["Bars", "Herbs", "Seeds"],
        ItemTier::Expensive => &["Potions", "Runes", "Equipment"],
        ItemTier::Luxury => &["Dragon items", "Barrows items", "God Wars items"],
    }
}

/// Default slayer-master roster in the order the panel lists them.
pub const SLAYER_MASTERS: [&str; 9] = [
    "Turael",
    "Spria",
    "Mazchna",
    "Vannaka",
    "Chaeldar",
    "Duradel",
    "Nieve",
    "Konar",
    "Krystilia",
];

pub const WHILE_GUTHIX_SLEEPS: &str = "While Guthix Sleeps";
pub const MONKEY_MADNESS_II: &str = "Monkey Madness II";

/// One-way master replacement unlocked by finishing a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterSwap {
    pub quest: &'static str,
    pub old: &'static str,
    pub new: &'static str,
}

pub const MASTER_SWAPS: [MasterSwap; 4] = [
    MasterSwap {
        quest: WHILE_GUTHIX_SLEEPS,
        old: "Turael",
        new: "Aya",
    },
    MasterSwap {
        quest: WHILE_GUTHIX_SLEEPS,
        old: "Mazchna",
        new: "Achtryn",
    },
    MasterSwap {
        quest: WHILE_GUTHIX_SLEEPS,
        old: "Duradel",
        new: "Kuradal",
    },
    MasterSwap {
        quest: MONKEY_MADNESS_II,
        old: "Nieve",
        new: "Steve",
    },
];

/// Portrait asset path for a slayer master.
#[must_use]
pub fn master_image(name: &str) -> String {
    format!("slayer_masters/{name}_head.png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn skill_orders_cover_the_same_set() {
        let tile: HashSet<_> = Skill::ALL.into_iter().collect();
        let daily: HashSet<_> = Skill::DAILY_ORDER.into_iter().collect();
        assert_eq!(tile.len(), 23);
        assert_eq!(tile, daily);
    }

    #[test]
    fn skill_parses_case_insensitively() {
        assert_eq!("Runecraft".parse::<Skill>(), Ok(Skill::Runecraft));
        assert_eq!(Skill::Woodcutting.display_name(), "Woodcutting");
        assert!("sailing".parse::<Skill>().is_err());
    }

    #[test]
    fn every_boss_tier_is_populated() {
        for tier in [BossTier::Low, BossTier::Mid, BossTier::High, BossTier::Elite] {
            assert!(!bosses_in_tier(tier).is_empty(), "{tier:?} empty");
        }
        let names: HashSet<_> = BOSSES.iter().map(|b| b.name).collect();
        assert_eq!(names.len(), BOSSES.len(), "duplicate boss names");
    }

    #[test]
    fn every_item_tier_is_populated() {
        for tier in ItemTier::ALL {
            assert!(!tier.items().is_empty());
            assert_eq!(daily_item_categories(tier).len(), 3);
        }
    }

    #[test]
    fn swaps_only_target_roster_members() {
        for swap in MASTER_SWAPS {
            assert!(SLAYER_MASTERS.contains(&swap.old), "{} missing", swap.old);
        }
    }
}
