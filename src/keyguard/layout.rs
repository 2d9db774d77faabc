//! Screen layout and target art selection
//!
//! Pure functions from the configured target set, layout style, screen size
//! class and orientation to the layout the host should inflate, and from the
//! target set, camera policy and ringer state to the icon set shown on the
//! multi-target surface.

use serde::{Deserialize, Serialize};

use super::dispatch::TargetSetId;

/// Screen size bucket, fixed for the lifetime of a lock screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenSizeClass {
    Normal,
    Large,
}

impl Default for ScreenSizeClass {
    fn default() -> Self {
        ScreenSizeClass::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::Portrait
    }
}

/// User-selected layout style (`lockscreen_layout`, stored as 7..=12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutStyle {
    Stock,
    StockCenteredRing,
    Centered,
    CenteredCenteredRing,
    BigClock,
    BigClockCenteredRing,
}

impl LayoutStyle {
    pub const ALL: [LayoutStyle; 6] = [
        LayoutStyle::Stock,
        LayoutStyle::StockCenteredRing,
        LayoutStyle::Centered,
        LayoutStyle::CenteredCenteredRing,
        LayoutStyle::BigClock,
        LayoutStyle::BigClockCenteredRing,
    ];

    pub fn from_setting(value: i64) -> Option<Self> {
        match value {
            7 => Some(LayoutStyle::Stock),
            8 => Some(LayoutStyle::StockCenteredRing),
            9 => Some(LayoutStyle::Centered),
            10 => Some(LayoutStyle::CenteredCenteredRing),
            11 => Some(LayoutStyle::BigClock),
            12 => Some(LayoutStyle::BigClockCenteredRing),
            _ => None,
        }
    }

    pub fn setting_value(self) -> i64 {
        match self {
            LayoutStyle::Stock => 7,
            LayoutStyle::StockCenteredRing => 8,
            LayoutStyle::Centered => 9,
            LayoutStyle::CenteredCenteredRing => 10,
            LayoutStyle::BigClock => 11,
            LayoutStyle::BigClockCenteredRing => 12,
        }
    }
}

impl Default for LayoutStyle {
    fn default() -> Self {
        LayoutStyle::Stock
    }
}

/// Which family of layouts a target set is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetFamily {
    /// Unlock handle on the right (stock and the `*UnlockRight` sets)
    Tab,
    /// Radial 4/6/8 target ring with unlock at the bottom
    Ring,
}

impl WidgetFamily {
    pub fn of(targets: TargetSetId) -> Self {
        match targets {
            TargetSetId::Stock
            | TargetSetId::FourUnlockRight
            | TargetSetId::SixUnlockRight
            | TargetSetId::EightUnlockRight => WidgetFamily::Tab,
            TargetSetId::Four | TargetSetId::Six | TargetSetId::Eight => WidgetFamily::Ring,
        }
    }
}

/// Layout preset the host inflates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenLayout {
    TabUnlockLand,
    TabUnlock,
    TabCenterUnlockRight,
    CenterTabUnlock,
    CenterTabCenterUnlockRight,
    BigClockUnlockRight,
    BigClockCenterUnlockRight,
    TabUnlockDown,
    TabCenterUnlockDown,
    CenterTabUnlockDown,
    CenterTabCenterUnlockDown,
    BigClockUnlockDown,
    BigClockCenterUnlockDown,
}

impl ScreenLayout {
    pub fn resource_name(self) -> &'static str {
        match self {
            ScreenLayout::TabUnlockLand => "keyguard_screen_tab_unlock_land",
            ScreenLayout::TabUnlock => "keyguard_screen_tab_unlock",
            ScreenLayout::TabCenterUnlockRight => "keyguard_screen_tab_center_unlock_right",
            ScreenLayout::CenterTabUnlock => "keyguard_center_screen_tab_unlock",
            ScreenLayout::CenterTabCenterUnlockRight => "keyguard_center_screen_tab_center_unlock_right",
            ScreenLayout::BigClockUnlockRight => "keyguard_screen_tab_bigclock_unlock_right",
            ScreenLayout::BigClockCenterUnlockRight => "keyguard_screen_tab_bigclock_center_unlock_right",
            ScreenLayout::TabUnlockDown => "keyguard_screen_tab_unlock_down",
            ScreenLayout::TabCenterUnlockDown => "keyguard_screen_tab_center_unlock_down",
            ScreenLayout::CenterTabUnlockDown => "keyguard_center_screen_tab_unlock_down",
            ScreenLayout::CenterTabCenterUnlockDown => "keyguard_center_screen_tab_center_unlock_down",
            ScreenLayout::BigClockUnlockDown => "keyguard_screen_tab_bigclock_unlock_down",
            ScreenLayout::BigClockCenterUnlockDown => "keyguard_screen_tab_bigclock_center_unlock_down",
        }
    }
}

/// Icon set for the multi-target surface
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetArt {
    name: String,
}

impl TargetArt {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Everything the layout policy decides for one refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSelection {
    pub screen: ScreenLayout,
    pub targets: TargetArt,
}

pub fn select_layout(
    targets: TargetSetId,
    size: ScreenSizeClass,
    orientation: Orientation,
    style: LayoutStyle,
    camera_disabled: bool,
    silent_mode: bool,
) -> LayoutSelection {
    LayoutSelection {
        screen: screen_layout(targets, size, orientation, style),
        targets: target_art(targets, size, camera_disabled, silent_mode),
    }
}

pub fn screen_layout(
    targets: TargetSetId,
    size: ScreenSizeClass,
    orientation: Orientation,
    style: LayoutStyle,
) -> ScreenLayout {
    if orientation == Orientation::Landscape {
        return ScreenLayout::TabUnlockLand;
    }
    // Large screens use a single layout that positions the widget itself
    if size == ScreenSizeClass::Large {
        return ScreenLayout::TabUnlock;
    }

    match (WidgetFamily::of(targets), style) {
        (WidgetFamily::Tab, LayoutStyle::Stock) => ScreenLayout::TabUnlock,
        (WidgetFamily::Tab, LayoutStyle::StockCenteredRing) => ScreenLayout::TabCenterUnlockRight,
        (WidgetFamily::Tab, LayoutStyle::Centered) => ScreenLayout::CenterTabUnlock,
        (WidgetFamily::Tab, LayoutStyle::CenteredCenteredRing) => ScreenLayout::CenterTabCenterUnlockRight,
        (WidgetFamily::Tab, LayoutStyle::BigClock) => ScreenLayout::BigClockUnlockRight,
        (WidgetFamily::Tab, LayoutStyle::BigClockCenteredRing) => ScreenLayout::BigClockCenterUnlockRight,
        (WidgetFamily::Ring, LayoutStyle::Stock) => ScreenLayout::TabUnlockDown,
        (WidgetFamily::Ring, LayoutStyle::StockCenteredRing) => ScreenLayout::TabCenterUnlockDown,
        (WidgetFamily::Ring, LayoutStyle::Centered) => ScreenLayout::CenterTabUnlockDown,
        (WidgetFamily::Ring, LayoutStyle::CenteredCenteredRing) => ScreenLayout::CenterTabCenterUnlockDown,
        (WidgetFamily::Ring, LayoutStyle::BigClock) => ScreenLayout::BigClockUnlockDown,
        (WidgetFamily::Ring, LayoutStyle::BigClockCenteredRing) => ScreenLayout::BigClockCenterUnlockDown,
    }
}

pub fn target_art(
    targets: TargetSetId,
    size: ScreenSizeClass,
    camera_disabled: bool,
    silent_mode: bool,
) -> TargetArt {
    let name = match targets {
        TargetSetId::Stock => {
            if !camera_disabled {
                "lockscreen_targets_with_camera".to_string()
            } else if silent_mode {
                "lockscreen_targets_when_silent".to_string()
            } else {
                "lockscreen_targets_when_soundon".to_string()
            }
        }
        _ => {
            let base = art_base(targets);
            let phone = if size == ScreenSizeClass::Large { "_nophone" } else { "" };
            if camera_disabled {
                // The toggle icon shows the mode it switches to
                let mode = if silent_mode { "soundon" } else { "silent" };
                format!("{}_{}_lockscreen{}_targets", mode, base, phone)
            } else {
                format!("{}_lockscreen{}_targets", base, phone)
            }
        }
    };
    TargetArt { name }
}

fn art_base(targets: TargetSetId) -> &'static str {
    match targets {
        TargetSetId::Stock => "stock",
        TargetSetId::Four => "quad",
        TargetSetId::FourUnlockRight => "quad_unlockright",
        TargetSetId::Six => "six",
        TargetSetId::SixUnlockRight => "six_unlockright",
        TargetSetId::Eight => "eight",
        TargetSetId::EightUnlockRight => "eight_unlockright",
    }
}

/// Drawables for one sliding-tab handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabResources {
    pub icon: &'static str,
    pub target: &'static str,
    pub bar: &'static str,
    pub tab: &'static str,
}

pub const LEFT_TAB: TabResources = TabResources {
    icon: "ic_jog_dial_unlock",
    target: "jog_tab_target_green",
    bar: "jog_tab_bar_left_unlock",
    tab: "jog_tab_left_unlock",
};

pub const LEFT_HINT: &str = "lockscreen_unlock_label";

/// Ring toggle handle art for the current ringer state
pub fn right_tab_resources(silent_mode: bool, vibrate: bool) -> TabResources {
    if silent_mode {
        TabResources {
            icon: if vibrate { "ic_jog_dial_vibrate_on" } else { "ic_jog_dial_sound_off" },
            target: "jog_tab_target_yellow",
            bar: "jog_tab_bar_right_sound_on",
            tab: "jog_tab_right_sound_on",
        }
    } else {
        TabResources {
            icon: "ic_jog_dial_sound_on",
            target: "jog_tab_target_gray",
            bar: "jog_tab_bar_right_sound_off",
            tab: "jog_tab_right_sound_off",
        }
    }
}

/// Hint shown while the ring toggle handle is held
pub fn right_hint(silent_mode: bool) -> &'static str {
    if silent_mode {
        "lockscreen_sound_on_label"
    } else {
        "lockscreen_sound_off_label"
    }
}
