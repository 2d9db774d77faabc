//! Target dispatch table
//!
//! Maps a triggered target index on the multi-target surface to the action it
//! performs. Each target set assigns a fixed role to every index; a role is
//! then resolved against the current camera policy and custom overrides.
//! Both steps are pure so the camera policy can be read fresh on every call.

use tracing::{debug, warn};

use super::actions::{resolve_slot, CustomOverrides, CustomSlot, Dispatch, SlotResolution, TargetAction};

/// Configured target preset (`lockscreen_targets`, stored as 0..=6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSetId {
    Stock,
    Four,
    FourUnlockRight,
    Six,
    SixUnlockRight,
    Eight,
    EightUnlockRight,
}

impl TargetSetId {
    pub const ALL: [TargetSetId; 7] = [
        TargetSetId::Stock,
        TargetSetId::Four,
        TargetSetId::FourUnlockRight,
        TargetSetId::Six,
        TargetSetId::SixUnlockRight,
        TargetSetId::Eight,
        TargetSetId::EightUnlockRight,
    ];

    pub fn from_setting(value: i64) -> Option<Self> {
        match value {
            0 => Some(TargetSetId::Stock),
            1 => Some(TargetSetId::Four),
            2 => Some(TargetSetId::FourUnlockRight),
            3 => Some(TargetSetId::Six),
            4 => Some(TargetSetId::SixUnlockRight),
            5 => Some(TargetSetId::Eight),
            6 => Some(TargetSetId::EightUnlockRight),
            _ => None,
        }
    }

    pub fn setting_value(self) -> i64 {
        match self {
            TargetSetId::Stock => 0,
            TargetSetId::Four => 1,
            TargetSetId::FourUnlockRight => 2,
            TargetSetId::Six => 3,
            TargetSetId::SixUnlockRight => 4,
            TargetSetId::Eight => 5,
            TargetSetId::EightUnlockRight => 6,
        }
    }

    /// Roles by target index
    pub fn roles(self) -> &'static [Role] {
        match self {
            TargetSetId::Stock => STOCK,
            TargetSetId::Four => FOUR,
            TargetSetId::FourUnlockRight => FOUR_UNLOCK_RIGHT,
            TargetSetId::Six => SIX,
            TargetSetId::SixUnlockRight => SIX_UNLOCK_RIGHT,
            TargetSetId::Eight => EIGHT,
            TargetSetId::EightUnlockRight => EIGHT_UNLOCK_RIGHT,
        }
    }

    pub fn target_count(self) -> usize {
        self.roles().len()
    }

    pub fn role(self, index: usize) -> Option<Role> {
        self.roles().get(index).copied()
    }
}

impl Default for TargetSetId {
    fn default() -> Self {
        TargetSetId::Stock
    }
}

/// Semantic role of one target position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Unlock with no other side effect
    Unlock,
    /// Camera, or ring toggle when the camera is disabled
    CameraOrRing,
    PhoneOrBrowser,
    Sms,
    Custom(CustomSlot),
    /// Position with no target drawn
    Empty,
}

use Role::{CameraOrRing, Custom, Empty, PhoneOrBrowser, Sms, Unlock};

// Stock: 0/1 unlock (portrait/landscape), 2/3 camera (portrait/landscape)
const STOCK: &[Role] = &[Unlock, Unlock, CameraOrRing, CameraOrRing];

const FOUR: &[Role] = &[PhoneOrBrowser, CameraOrRing, Sms, Unlock];

const FOUR_UNLOCK_RIGHT: &[Role] = &[Unlock, Sms, PhoneOrBrowser, CameraOrRing];

const SIX: &[Role] = &[
    PhoneOrBrowser,
    Custom(CustomSlot::UpperRight),
    CameraOrRing,
    Custom(CustomSlot::UpperLeft),
    Sms,
    Empty,
    Unlock,
    Empty,
];

const SIX_UNLOCK_RIGHT: &[Role] = &[
    Unlock,
    Custom(CustomSlot::UpperRight),
    Sms,
    Custom(CustomSlot::UpperLeft),
    CameraOrRing,
    Empty,
    PhoneOrBrowser,
    Empty,
];

const EIGHT: &[Role] = &[
    PhoneOrBrowser,
    Custom(CustomSlot::UpperRight),
    CameraOrRing,
    Custom(CustomSlot::UpperLeft),
    Sms,
    Custom(CustomSlot::LowerLeft),
    Unlock,
    Custom(CustomSlot::LowerRight),
];

const EIGHT_UNLOCK_RIGHT: &[Role] = &[
    Unlock,
    Custom(CustomSlot::UpperRight),
    Sms,
    Custom(CustomSlot::UpperLeft),
    CameraOrRing,
    Custom(CustomSlot::LowerLeft),
    PhoneOrBrowser,
    Custom(CustomSlot::LowerRight),
];

/// Resolve a triggered target to its action.
///
/// An index outside the target set is a caller bug: it asserts in debug
/// builds and resolves to a non-dismissing `NoOp` otherwise.
pub fn resolve_action(
    targets: TargetSetId,
    index: usize,
    camera_disabled: bool,
    overrides: &CustomOverrides,
) -> Dispatch {
    let Some(role) = targets.role(index) else {
        debug_assert!(
            false,
            "target index {} out of range for {:?} ({} targets)",
            index,
            targets,
            targets.target_count()
        );
        warn!(?targets, index, "Ignoring out-of-range target");
        return Dispatch::staying(TargetAction::NoOp);
    };

    let dispatch = resolve_role(role, camera_disabled, overrides);
    debug!(?targets, index, ?role, action = ?dispatch.action, dismiss = dispatch.dismiss, "Resolved target");
    dispatch
}

pub fn resolve_role(role: Role, camera_disabled: bool, overrides: &CustomOverrides) -> Dispatch {
    match role {
        Role::Unlock => Dispatch::dismissing(TargetAction::Unlock),
        Role::CameraOrRing => {
            if camera_disabled {
                Dispatch::staying(TargetAction::ToggleRing)
            } else {
                Dispatch::dismissing(TargetAction::LaunchCamera)
            }
        }
        Role::PhoneOrBrowser => Dispatch::dismissing(TargetAction::LaunchPhoneOrBrowser),
        Role::Sms => match resolve_slot(CustomSlot::Sms, overrides) {
            SlotResolution::Custom(target) => Dispatch::dismissing(TargetAction::LaunchCustom {
                slot: CustomSlot::Sms,
                target,
            }),
            SlotResolution::Default => Dispatch::dismissing(TargetAction::LaunchSms),
            // A broken override suppresses the built-in SMS launch too
            SlotResolution::Malformed(e) => {
                warn!("Ignoring custom SMS target: {}", e);
                Dispatch::dismissing(TargetAction::NoOp)
            }
        },
        Role::Custom(slot) => match resolve_slot(slot, overrides) {
            SlotResolution::Custom(target) => {
                Dispatch::dismissing(TargetAction::LaunchCustom { slot, target })
            }
            SlotResolution::Default => Dispatch::dismissing(TargetAction::NoOp),
            SlotResolution::Malformed(e) => {
                warn!(?slot, "Ignoring custom target: {}", e);
                Dispatch::dismissing(TargetAction::NoOp)
            }
        },
        Role::Empty => Dispatch::staying(TargetAction::NoOp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTES: &str = "#Intent;component=org.example.notes/.Main;end";

    fn index_of(targets: TargetSetId, role: Role) -> usize {
        targets
            .roles()
            .iter()
            .position(|r| *r == role)
            .unwrap_or_else(|| panic!("{:?} has no {:?}", targets, role))
    }

    #[test]
    fn test_every_index_resolves() {
        let overrides = CustomOverrides::new();
        for targets in TargetSetId::ALL {
            assert!(targets.target_count() == 4 || targets.target_count() == 8);
            for index in 0..targets.target_count() {
                for camera_disabled in [false, true] {
                    // Would panic through debug_assert if the table had a hole
                    resolve_action(targets, index, camera_disabled, &overrides);
                }
            }
        }
    }

    #[test]
    fn test_every_set_has_plain_unlock() {
        let overrides = CustomOverrides::new();
        for targets in TargetSetId::ALL {
            let index = index_of(targets, Role::Unlock);
            assert_eq!(
                resolve_action(targets, index, true, &overrides),
                Dispatch::dismissing(TargetAction::Unlock)
            );
        }
    }

    #[test]
    fn test_camera_policy_flips_camera_role() {
        let overrides = CustomOverrides::new();
        for targets in TargetSetId::ALL {
            let index = index_of(targets, Role::CameraOrRing);
            assert_eq!(
                resolve_action(targets, index, false, &overrides),
                Dispatch::dismissing(TargetAction::LaunchCamera)
            );
            assert_eq!(
                resolve_action(targets, index, true, &overrides),
                Dispatch::staying(TargetAction::ToggleRing)
            );
            assert_eq!(
                resolve_action(targets, index, false, &overrides),
                Dispatch::dismissing(TargetAction::LaunchCamera)
            );
        }
    }

    #[test]
    fn test_six_top_target() {
        let overrides = CustomOverrides::new();
        assert_eq!(
            resolve_action(TargetSetId::Six, 2, false, &overrides),
            Dispatch::dismissing(TargetAction::LaunchCamera)
        );
        assert_eq!(
            resolve_action(TargetSetId::Six, 2, true, &overrides),
            Dispatch::staying(TargetAction::ToggleRing)
        );
    }

    #[test]
    fn test_sms_override_and_clear() {
        let mut overrides = CustomOverrides::new();
        let sms = index_of(TargetSetId::Four, Role::Sms);
        assert_eq!(
            resolve_action(TargetSetId::Four, sms, false, &overrides),
            Dispatch::dismissing(TargetAction::LaunchSms)
        );

        overrides.set(CustomSlot::Sms, NOTES);
        let dispatch = resolve_action(TargetSetId::Four, sms, false, &overrides);
        assert!(dispatch.dismiss);
        match dispatch.action {
            TargetAction::LaunchCustom { slot, target } => {
                assert_eq!(slot, CustomSlot::Sms);
                assert_eq!(target.summary(), "org.example.notes/org.example.notes.Main");
            }
            other => panic!("expected custom launch, got {:?}", other),
        }

        overrides.clear(CustomSlot::Sms);
        assert_eq!(
            resolve_action(TargetSetId::Four, sms, false, &overrides),
            Dispatch::dismissing(TargetAction::LaunchSms)
        );
    }

    #[test]
    fn test_malformed_sms_override_skips_default_but_dismisses() {
        let mut overrides = CustomOverrides::new();
        overrides.set(CustomSlot::Sms, "#Intent;component=org.example/.Broken");
        for targets in TargetSetId::ALL.into_iter().filter(|t| *t != TargetSetId::Stock) {
            let sms = index_of(targets, Role::Sms);
            assert_eq!(
                resolve_action(targets, sms, false, &overrides),
                Dispatch::dismissing(TargetAction::NoOp)
            );
        }
    }

    #[test]
    fn test_corner_overrides() {
        let mut overrides = CustomOverrides::new();
        for slot in [
            CustomSlot::UpperLeft,
            CustomSlot::UpperRight,
            CustomSlot::LowerLeft,
            CustomSlot::LowerRight,
        ] {
            let index = index_of(TargetSetId::Eight, Role::Custom(slot));
            assert_eq!(
                resolve_action(TargetSetId::Eight, index, false, &overrides),
                Dispatch::dismissing(TargetAction::NoOp)
            );

            overrides.set(slot, NOTES);
            let dispatch = resolve_action(TargetSetId::Eight, index, false, &overrides);
            assert!(dispatch.dismiss);
            assert!(matches!(dispatch.action, TargetAction::LaunchCustom { slot: s, .. } if s == slot));
        }
    }

    #[test]
    fn test_eight_lower_left_absent_still_dismisses() {
        let overrides = CustomOverrides::new();
        assert_eq!(
            resolve_action(TargetSetId::Eight, 5, false, &overrides),
            Dispatch::dismissing(TargetAction::NoOp)
        );
    }

    #[test]
    fn test_empty_positions_do_nothing() {
        let overrides = CustomOverrides::new();
        for targets in [TargetSetId::Six, TargetSetId::SixUnlockRight] {
            for index in [5, 7] {
                assert_eq!(
                    resolve_action(targets, index, false, &overrides),
                    Dispatch::staying(TargetAction::NoOp)
                );
            }
        }
    }

    #[test]
    fn test_unlock_right_mirrors() {
        let overrides = CustomOverrides::new();
        assert_eq!(
            resolve_action(TargetSetId::FourUnlockRight, 0, false, &overrides),
            Dispatch::dismissing(TargetAction::Unlock)
        );
        assert_eq!(
            resolve_action(TargetSetId::EightUnlockRight, 6, false, &overrides),
            Dispatch::dismissing(TargetAction::LaunchPhoneOrBrowser)
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_asserts_in_debug() {
        resolve_action(TargetSetId::Four, 4, false, &CustomOverrides::new());
    }

    #[test]
    fn test_setting_values() {
        for targets in TargetSetId::ALL {
            assert_eq!(TargetSetId::from_setting(targets.setting_value()), Some(targets));
        }
        assert_eq!(TargetSetId::from_setting(7), None);
    }
}
