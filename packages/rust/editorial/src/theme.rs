//! Weekly editorial rotation.
//!
//! Every list is a fixed, ordered sequence indexed by `week mod len`, so a
//! given calendar week always produces the same angle with no stored state.
//! The four lists have independent lengths; their combined period is the
//! least common multiple of those lengths.

use chrono::{Datelike, Days, NaiveDate};

use volare_shared::{Result, VolareError};

/// Article template kinds, in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    WeeklyRoundup,
    TropeSpotlight,
    MoodBased,
    CharacterTypes,
}

impl TemplateKind {
    /// Rotation order. Index `week % ALL.len()` is the week's kind.
    pub const ALL: [TemplateKind; 4] = [
        Self::WeeklyRoundup,
        Self::TropeSpotlight,
        Self::MoodBased,
        Self::CharacterTypes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeeklyRoundup => "weekly_roundup",
            Self::TropeSpotlight => "trope_spotlight",
            Self::MoodBased => "mood_based",
            Self::CharacterTypes => "character_types",
        }
    }

    /// Title pattern with `{placeholder}` slots.
    pub fn title_pattern(&self) -> &'static str {
        match self {
            Self::WeeklyRoundup => "This Week's Fresh BL Picks: {date_range}",
            Self::TropeSpotlight => "Hidden Gems: {trope} Novels You Might Have Missed",
            Self::MoodBased => "What to Read When You Want {mood}",
            Self::CharacterTypes => "For Fans of {character_type}: Your Next Obsession Awaits",
        }
    }

    /// Short editorial description of the template.
    pub fn focus(&self) -> &'static str {
        match self {
            Self::WeeklyRoundup => "New arrivals and why they're worth reading",
            Self::TropeSpotlight => "Specific trope exploration with novel recommendations",
            Self::MoodBased => "Novels categorized by reading mood/experience",
            Self::CharacterTypes => "Character archetype recommendations",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const TROPES: [&str; 10] = [
    "Cold Gong x Sunny Shou",
    "Enemies to Lovers",
    "Second Chance Romance",
    "Rebirth/Transmigration",
    "Office Romance",
    "Historical/Ancient Setting",
    "Modern Day Slice of Life",
    "Fantasy Adventure",
    "Omegaverse",
    "Slow Burn Romance",
];

pub const MOODS: [&str; 5] = [
    "Something Sweet and Fluffy",
    "An Emotional Rollercoaster",
    "A Slow Burn That Pays Off",
    "Action with Romance on the Side",
    "Something Light and Funny",
];

pub const CHARACTER_TYPES: [&str; 5] = [
    "the Tsundere Gong",
    "the Scheming Shou",
    "the Gentle Giant",
    "the Misunderstood Villain",
    "the Loyal Second Lead",
];

/// Days covered by the weekly-roundup date range.
const ROUNDUP_SPAN_DAYS: u64 = 7;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The editorial angle chosen for one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub kind: TemplateKind,
    pub title_pattern: &'static str,
    pub focus: &'static str,
}

/// Theme plus the week's flavoring picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPick {
    pub week: u32,
    pub theme: Theme,
    pub trope: &'static str,
    pub mood: &'static str,
    pub character_type: &'static str,
}

fn pick<T: Copy>(list: &[T], week: u32) -> T {
    list[week as usize % list.len()]
}

/// Map a week number to its template kind. Total and pure.
pub fn select_theme(week: u32) -> Theme {
    let kind = pick(&TemplateKind::ALL, week);
    Theme {
        kind,
        title_pattern: kind.title_pattern(),
        focus: kind.focus(),
    }
}

/// Full rotation for a week: theme, trope, mood, and archetype.
pub fn rotation_for_week(week: u32) -> RotationPick {
    RotationPick {
        week,
        theme: select_theme(week),
        trope: pick(&TROPES, week),
        mood: pick(&MOODS, week),
        character_type: pick(&CHARACTER_TYPES, week),
    }
}

impl RotationPick {
    /// Interpolate the theme's title pattern.
    pub fn title(&self, date_range: &str) -> String {
        self.theme
            .title_pattern
            .replace("{date_range}", date_range)
            .replace("{trope}", self.trope)
            .replace("{mood}", self.mood)
            .replace("{character_type}", self.character_type)
    }

    /// One-line subject handed to the writer, e.g. "novels featuring the Gentle Giant".
    pub fn subject(&self) -> String {
        match self.theme.kind {
            TemplateKind::WeeklyRoundup => "a weekly roundup of new BL novels".to_string(),
            TemplateKind::TropeSpotlight => format!("novels featuring the '{}' trope", self.trope),
            TemplateKind::MoodBased => {
                format!("novels perfect for readers wanting {}", self.mood.to_lowercase())
            }
            TemplateKind::CharacterTypes => format!("novels featuring {}", self.character_type),
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar helpers
// ---------------------------------------------------------------------------

/// ISO calendar week (1–53) of `date`.
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Reject week numbers outside the ISO range.
pub fn validate_week(week: u32) -> Result<u32> {
    if (1..=53).contains(&week) {
        Ok(week)
    } else {
        Err(VolareError::validation(format!(
            "week {week} is outside the ISO range 1-53"
        )))
    }
}

/// Human date range ending at `today`, e.g. "Oct 08 - Oct 15, 2026".
pub fn date_range(today: NaiveDate) -> String {
    let start = today
        .checked_sub_days(Days::new(ROUNDUP_SPAN_DAYS))
        .unwrap_or(today);
    format!("{} - {}", start.format("%b %d"), today.format("%b %d, %Y"))
}
