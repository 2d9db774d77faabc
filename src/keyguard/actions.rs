//! Lock screen target actions and the launch targets behind them

use std::collections::HashMap;

use super::intent::{
    DescriptorError, IntentDescriptor, LaunchFlags, ACTION_MAIN, ACTION_STILL_IMAGE_CAMERA,
    CATEGORY_LAUNCHER,
};
use super::layout::ScreenSizeClass;
use super::settings::{SettingKey, SettingsStore};

/// Position whose launch target can be overridden from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomSlot {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
    Sms,
}

impl CustomSlot {
    pub const ALL: [CustomSlot; 5] = [
        CustomSlot::UpperLeft,
        CustomSlot::UpperRight,
        CustomSlot::LowerLeft,
        CustomSlot::LowerRight,
        CustomSlot::Sms,
    ];

    /// Settings key holding this slot's descriptor
    pub fn setting_key(self) -> SettingKey {
        match self {
            CustomSlot::UpperLeft => SettingKey::CustomUpperLeftIntent,
            CustomSlot::UpperRight => SettingKey::CustomUpperRightIntent,
            CustomSlot::LowerLeft => SettingKey::CustomLowerLeftIntent,
            CustomSlot::LowerRight => SettingKey::CustomLowerRightIntent,
            CustomSlot::Sms => SettingKey::CustomSmsIntent,
        }
    }
}

/// What a triggered target does
#[derive(Debug, Clone, PartialEq)]
pub enum TargetAction {
    Unlock,
    ToggleRing,
    LaunchCamera,
    LaunchCustom {
        slot: CustomSlot,
        target: IntentDescriptor,
    },
    LaunchSms,
    LaunchPhoneOrBrowser,
    NoOp,
}

impl TargetAction {
    /// Concrete launch target for this action, if it launches anything.
    /// The phone/browser choice depends on the screen size class.
    pub fn launch_target(&self, size: ScreenSizeClass) -> Option<IntentDescriptor> {
        match self {
            TargetAction::LaunchCamera => Some(camera_target()),
            TargetAction::LaunchSms => Some(sms_target()),
            TargetAction::LaunchPhoneOrBrowser => Some(match size {
                ScreenSizeClass::Large => browser_target(),
                ScreenSizeClass::Normal => phone_target(),
            }),
            TargetAction::LaunchCustom { target, .. } => {
                Some(target.clone().add_flags(custom_launch_flags()))
            }
            TargetAction::Unlock | TargetAction::ToggleRing | TargetAction::NoOp => None,
        }
    }
}

/// Resolved action paired with the "proceed to unlocked screen" signal
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub action: TargetAction,
    pub dismiss: bool,
}

impl Dispatch {
    pub fn dismissing(action: TargetAction) -> Self {
        Self { action, dismiss: true }
    }

    pub fn staying(action: TargetAction) -> Self {
        Self { action, dismiss: false }
    }
}

/// Per-slot descriptor strings as stored in settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomOverrides {
    slots: HashMap<CustomSlot, String>,
}

impl CustomOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every slot from the settings store
    pub fn load(store: &dyn SettingsStore) -> Self {
        let mut overrides = Self::new();
        for slot in CustomSlot::ALL {
            if let Some(descriptor) = store.get_string(slot.setting_key()) {
                overrides.set(slot, descriptor);
            }
        }
        overrides
    }

    pub fn set(&mut self, slot: CustomSlot, descriptor: impl Into<String>) {
        self.slots.insert(slot, descriptor.into());
    }

    pub fn clear(&mut self, slot: CustomSlot) {
        self.slots.remove(&slot);
    }

    pub fn get(&self, slot: CustomSlot) -> Option<&str> {
        self.slots.get(&slot).map(|s| s.as_str())
    }
}

/// Outcome of looking up a custom slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotResolution {
    /// Well-formed override
    Custom(IntentDescriptor),
    /// Nothing stored; use the slot's built-in behaviour
    Default,
    /// Something stored but unusable
    Malformed(DescriptorError),
}

pub fn resolve_slot(slot: CustomSlot, overrides: &CustomOverrides) -> SlotResolution {
    match overrides.get(slot) {
        None => SlotResolution::Default,
        Some(raw) => match IntentDescriptor::parse(raw) {
            Ok(target) => SlotResolution::Custom(target),
            Err(e) => SlotResolution::Malformed(e),
        },
    }
}

pub fn custom_launch_flags() -> LaunchFlags {
    LaunchFlags::NEW_TASK | LaunchFlags::RESET_TASK_IF_NEEDED
}

pub fn camera_target() -> IntentDescriptor {
    IntentDescriptor::with_action(ACTION_STILL_IMAGE_CAMERA).add_flags(LaunchFlags::NEW_TASK)
}

pub fn sms_target() -> IntentDescriptor {
    IntentDescriptor::with_action(ACTION_MAIN)
        .category(CATEGORY_LAUNCHER)
        .component("com.android.mms", "com.android.mms.ui.ConversationList")
        .add_flags(custom_launch_flags())
}

pub fn phone_target() -> IntentDescriptor {
    IntentDescriptor::with_action(ACTION_MAIN)
        .component(
            "com.android.contacts",
            "com.android.contacts.activities.DialtactsActivity",
        )
        .add_flags(LaunchFlags::NEW_TASK)
}

pub fn browser_target() -> IntentDescriptor {
    IntentDescriptor::with_action(ACTION_MAIN)
        .component("com.android.browser", "com.android.browser.BrowserActivity")
        .add_flags(LaunchFlags::NEW_TASK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_or_browser_follows_size_class() {
        let action = TargetAction::LaunchPhoneOrBrowser;
        assert_eq!(action.launch_target(ScreenSizeClass::Normal), Some(phone_target()));
        assert_eq!(action.launch_target(ScreenSizeClass::Large), Some(browser_target()));
    }

    #[test]
    fn test_custom_launch_gets_task_flags() {
        let target = IntentDescriptor::parse("#Intent;component=org.example/.Main;end").unwrap();
        let action = TargetAction::LaunchCustom {
            slot: CustomSlot::UpperLeft,
            target,
        };
        let launched = action.launch_target(ScreenSizeClass::Normal).unwrap();
        assert!(launched.flags.contains(custom_launch_flags()));
    }

    #[test]
    fn test_non_launching_actions() {
        for action in [TargetAction::Unlock, TargetAction::ToggleRing, TargetAction::NoOp] {
            assert!(action.launch_target(ScreenSizeClass::Normal).is_none());
        }
    }

    #[test]
    fn test_resolve_slot() {
        let mut overrides = CustomOverrides::new();
        assert_eq!(resolve_slot(CustomSlot::Sms, &overrides), SlotResolution::Default);

        overrides.set(CustomSlot::Sms, "#Intent;component=org.example.sms/.Inbox;end");
        assert!(matches!(
            resolve_slot(CustomSlot::Sms, &overrides),
            SlotResolution::Custom(_)
        ));

        overrides.set(CustomSlot::Sms, "#Intent;component=org.example.sms/.Inbox");
        assert_eq!(
            resolve_slot(CustomSlot::Sms, &overrides),
            SlotResolution::Malformed(DescriptorError::MissingEnd)
        );

        overrides.clear(CustomSlot::Sms);
        assert_eq!(resolve_slot(CustomSlot::Sms, &overrides), SlotResolution::Default);
    }
}
