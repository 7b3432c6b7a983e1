//! Fixed color and icon palettes consumed by presentation layers.
//!
//! Static reference data, not user-editable. Lookups by unknown key fall
//! back to the first entry instead of erroring, so stale ids in persisted
//! habits can never break rendering.

/// One selectable habit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitColor {
    pub id: &'static str,
    /// Card background hex value.
    pub bg: &'static str,
    /// Accent/foreground hex value.
    pub accent: &'static str,
    pub label: &'static str,
}

/// One selectable habit icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitIcon {
    /// Icon key in `mdi:` namespace form.
    pub icon: &'static str,
    pub label: &'static str,
}

pub const HABIT_COLORS: &[HabitColor] = &[
    HabitColor { id: "burgundy", bg: "#5C1A2A", accent: "#FF3B6F", label: "Burgundy" },
    HabitColor { id: "navy", bg: "#1A3A5C", accent: "#3B8FFF", label: "Navy" },
    HabitColor { id: "olive", bg: "#4A4520", accent: "#C4B84D", label: "Olive" },
    HabitColor { id: "brown", bg: "#5C3A1A", accent: "#FF8C3B", label: "Brown" },
    HabitColor { id: "purple", bg: "#2D1A5C", accent: "#8B5CF6", label: "Purple" },
    HabitColor { id: "emerald", bg: "#1A5C3A", accent: "#34D399", label: "Emerald" },
    HabitColor { id: "amber", bg: "#5C4A1A", accent: "#FBBF24", label: "Amber" },
    HabitColor { id: "coral", bg: "#5C2A1A", accent: "#FF6B6B", label: "Coral" },
];

pub const HABIT_ICONS: &[HabitIcon] = &[
    HabitIcon { icon: "mdi:book-open-page-variant", label: "Reading" },
    HabitIcon { icon: "mdi:run", label: "Running" },
    HabitIcon { icon: "mdi:meditation", label: "Meditate" },
    HabitIcon { icon: "mdi:dumbbell", label: "Workout" },
    HabitIcon { icon: "mdi:water", label: "Water" },
    HabitIcon { icon: "mdi:food-apple", label: "Eat Healthy" },
    HabitIcon { icon: "mdi:sleep", label: "Sleep" },
    HabitIcon { icon: "mdi:music", label: "Music" },
    HabitIcon { icon: "mdi:code-tags", label: "Code" },
    HabitIcon { icon: "mdi:palette", label: "Art" },
    HabitIcon { icon: "mdi:tennis", label: "Tennis" },
    HabitIcon { icon: "mdi:bike", label: "Cycling" },
    HabitIcon { icon: "mdi:yoga", label: "Yoga" },
    HabitIcon { icon: "mdi:pill", label: "Medicine" },
    HabitIcon { icon: "mdi:heart-pulse", label: "Health" },
    HabitIcon { icon: "mdi:school", label: "Study" },
    HabitIcon { icon: "mdi:walk", label: "Walk" },
    HabitIcon { icon: "mdi:finance", label: "Finance" },
    HabitIcon { icon: "mdi:notebook", label: "Journal" },
    HabitIcon { icon: "mdi:smoking-off", label: "No Smoking" },
];

/// Resolves a color by id, falling back to the first palette entry.
pub fn color_by_id(color_id: &str) -> &'static HabitColor {
    HABIT_COLORS
        .iter()
        .find(|color| color.id == color_id)
        .unwrap_or(&HABIT_COLORS[0])
}

/// Resolves an icon by key, falling back to the first palette entry.
pub fn icon_by_key(icon: &str) -> &'static HabitIcon {
    HABIT_ICONS
        .iter()
        .find(|entry| entry.icon == icon)
        .unwrap_or(&HABIT_ICONS[0])
}
