//! Intent descriptors for custom lock screen targets
//!
//! Custom targets are persisted as Android-style intent URIs, e.g.
//! `#Intent;action=android.intent.action.MAIN;component=org.example/.Main;end`.
//! A string without an `#Intent;` fragment is treated as a plain data URI
//! opened with the VIEW action.

use std::ops::BitOr;

use percent_encoding::percent_decode_str;
use thiserror::Error;

pub const ACTION_MAIN: &str = "android.intent.action.MAIN";
pub const ACTION_VIEW: &str = "android.intent.action.VIEW";
pub const ACTION_STILL_IMAGE_CAMERA: &str = "android.media.action.STILL_IMAGE_CAMERA";
pub const CATEGORY_LAUNCHER: &str = "android.intent.category.LAUNCHER";

const FRAGMENT_MARKER: &str = "#Intent;";
const INTENT_SCHEME: &str = "intent:";

/// Why a stored descriptor could not be turned into a launch target
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor is empty")]
    Empty,

    #[error("missing ';end' terminator")]
    MissingEnd,

    #[error("segment has no '=': {0}")]
    BadSegment(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid launch flags: {0}")]
    BadFlags(String),

    #[error("invalid component: {0}")]
    BadComponent(String),

    #[error("invalid value for extra {key}: {value}")]
    BadExtra { key: String, value: String },

    #[error("invalid percent-encoding: {0}")]
    BadEncoding(String),

    #[error("data URI has no scheme: {0}")]
    MissingScheme(String),
}

/// Launch flags carried alongside a descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LaunchFlags(pub u32);

impl LaunchFlags {
    pub const NONE: LaunchFlags = LaunchFlags(0);
    pub const NEW_TASK: LaunchFlags = LaunchFlags(0x1000_0000);
    pub const RESET_TASK_IF_NEEDED: LaunchFlags = LaunchFlags(0x0020_0000);

    pub fn contains(self, other: LaunchFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LaunchFlags {
    type Output = LaunchFlags;

    fn bitor(self, rhs: LaunchFlags) -> LaunchFlags {
        LaunchFlags(self.0 | rhs.0)
    }
}

/// Explicit `package/class` target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Component {
    pub package: String,
    pub class: String,
}

impl Component {
    pub fn new(package: &str, class: &str) -> Self {
        Self {
            package: package.to_string(),
            class: class.to_string(),
        }
    }

    /// Parse `pkg/cls`; a class starting with `.` is relative to the package
    pub fn parse(flat: &str) -> Result<Self, DescriptorError> {
        let (package, class) = flat
            .split_once('/')
            .ok_or_else(|| DescriptorError::BadComponent(flat.to_string()))?;
        if package.is_empty() || class.is_empty() {
            return Err(DescriptorError::BadComponent(flat.to_string()));
        }
        let class = if class.starts_with('.') {
            format!("{}{}", package, class)
        } else {
            class.to_string()
        };
        Ok(Self {
            package: package.to_string(),
            class,
        })
    }

    pub fn flatten(&self) -> String {
        format!("{}/{}", self.package, self.class)
    }
}

/// Typed extra value (`S.` string, `i.` int, ...)
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraValue {
    String(String),
    Bool(bool),
    Byte(i8),
    Char(char),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
}

/// A launchable target: either a built-in destination or a parsed custom URI
#[derive(Debug, Clone, PartialEq)]
pub struct IntentDescriptor {
    pub action: Option<String>,
    pub data: Option<String>,
    pub mime_type: Option<String>,
    pub package: Option<String>,
    pub component: Option<Component>,
    pub categories: Vec<String>,
    pub flags: LaunchFlags,
    pub extras: Vec<(String, ExtraValue)>,
    pub source_bounds: Option<String>,
}

impl IntentDescriptor {
    pub fn with_action(action: &str) -> Self {
        Self {
            action: Some(action.to_string()),
            data: None,
            mime_type: None,
            package: None,
            component: None,
            categories: Vec::new(),
            flags: LaunchFlags::NONE,
            extras: Vec::new(),
            source_bounds: None,
        }
    }

    pub fn component(mut self, package: &str, class: &str) -> Self {
        self.component = Some(Component::new(package, class));
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.categories.push(category.to_string());
        self
    }

    pub fn add_flags(mut self, flags: LaunchFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }

    /// Short human-readable label for logs
    pub fn summary(&self) -> String {
        if let Some(ref component) = self.component {
            component.flatten()
        } else if let Some(ref data) = self.data {
            data.clone()
        } else {
            self.action.clone().unwrap_or_else(|| "<empty>".to_string())
        }
    }

    /// Parse a stored descriptor string
    pub fn parse(uri: &str) -> Result<Self, DescriptorError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(DescriptorError::Empty);
        }

        let Some(marker) = uri.find(FRAGMENT_MARKER) else {
            if !has_scheme(uri) {
                return Err(DescriptorError::MissingScheme(uri.to_string()));
            }
            let mut intent = Self::with_action(ACTION_VIEW);
            intent.data = Some(uri.to_string());
            return Ok(intent);
        };

        let mut intent = Self::with_action(ACTION_VIEW);
        let mut scheme = None;
        let mut ended = false;

        for segment in uri[marker + FRAGMENT_MARKER.len()..].split(';') {
            if segment == "end" {
                ended = true;
                break;
            }
            let (key, raw) = segment
                .split_once('=')
                .ok_or_else(|| DescriptorError::BadSegment(segment.to_string()))?;
            let value = decode(raw)?;
            match key {
                "action" => intent.action = Some(value),
                "category" => intent.categories.push(value),
                "type" => intent.mime_type = Some(value),
                "package" => intent.package = Some(value),
                "component" => intent.component = Some(Component::parse(&value)?),
                "launchFlags" => intent.flags = LaunchFlags(parse_flags(&value)?),
                "scheme" => scheme = Some(value),
                "sourceBounds" => intent.source_bounds = Some(value),
                _ => {
                    let extra = parse_extra(key, value)?;
                    intent.extras.push(extra);
                }
            }
        }

        if !ended {
            return Err(DescriptorError::MissingEnd);
        }

        let prefix = &uri[..marker];
        if let Some(rest) = prefix.strip_prefix(INTENT_SCHEME) {
            if !rest.is_empty() {
                intent.data = Some(match scheme {
                    Some(scheme) => format!("{}:{}", scheme, rest),
                    None => rest.to_string(),
                });
            }
        } else if !prefix.is_empty() {
            intent.data = Some(prefix.to_string());
        }

        Ok(intent)
    }
}

fn has_scheme(uri: &str) -> bool {
    match uri.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn decode(raw: &str) -> Result<String, DescriptorError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| DescriptorError::BadEncoding(raw.to_string()))
}

fn parse_flags(value: &str) -> Result<u32, DescriptorError> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };
    parsed.map_err(|_| DescriptorError::BadFlags(value.to_string()))
}

fn parse_extra(key: &str, value: String) -> Result<(String, ExtraValue), DescriptorError> {
    let Some((kind, name)) = key.split_once('.') else {
        return Err(DescriptorError::UnknownField(key.to_string()));
    };
    if name.is_empty() {
        return Err(DescriptorError::UnknownField(key.to_string()));
    }

    let bad = || DescriptorError::BadExtra {
        key: name.to_string(),
        value: value.clone(),
    };
    let extra = match kind {
        "S" => ExtraValue::String(value.clone()),
        "B" => ExtraValue::Bool(value.parse().map_err(|_| bad())?),
        "b" => ExtraValue::Byte(value.parse().map_err(|_| bad())?),
        "c" => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => ExtraValue::Char(c),
                _ => return Err(bad()),
            }
        }
        "d" => ExtraValue::Double(value.parse().map_err(|_| bad())?),
        "f" => ExtraValue::Float(value.parse().map_err(|_| bad())?),
        "i" => ExtraValue::Int(value.parse().map_err(|_| bad())?),
        "l" => ExtraValue::Long(value.parse().map_err(|_| bad())?),
        "s" => ExtraValue::Short(value.parse().map_err(|_| bad())?),
        _ => return Err(DescriptorError::UnknownField(key.to_string())),
    };
    Ok((name.to_string(), extra))
}
