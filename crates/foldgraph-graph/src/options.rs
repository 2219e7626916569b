use crate::host::LayoutSpec;
use foldgraph_core::{Color, FoldError, Node, Vec2};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Per-node handle placement in model coordinates.
pub type PlacementFn = Arc<dyn Fn(&Node) -> Vec2 + Send + Sync>;

/// Where the expand/collapse handle is anchored.
#[derive(Clone, Default)]
pub enum BoxPosition {
    /// Top-left corner of the node's rendered bounding box.
    #[default]
    TopLeft,
    /// Caller-supplied center, evaluated per node in model space.
    Custom(PlacementFn),
}

impl BoxPosition {
    pub fn custom(f: impl Fn(&Node) -> Vec2 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for BoxPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLeft => write!(f, "TopLeft"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Serialize for BoxPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::TopLeft => serializer.serialize_str("top-left"),
            Self::Custom(_) => serializer.serialize_str("custom"),
        }
    }
}

impl<'de> Deserialize<'de> for BoxPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "top-left" => Ok(Self::TopLeft),
            other => Err(serde::de::Error::unknown_variant(other, &["top-left"])),
        }
    }
}

/// Plugin configuration. Unknown keys are ignored when deserializing or merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpandCollapseOptions {
    /// Layout to run around newly revealed nodes after an expand.
    pub layout_by: Option<LayoutSpec>,
    pub animate: bool,
    /// Record top-level operations in the undo/redo history.
    pub undoable: bool,
    pub handle_color: Color,
    /// Milliseconds a node must be hovered before its handle is drawn.
    pub hover_delay: u64,
    pub enabled: bool,
    pub expand_collapse_box_position: BoxPosition,
    /// Handle diameter in pixels at zoom 1.
    pub expand_collapse_box_size: f32,
    /// Length of the plus/minus bars in pixels at zoom 1.
    pub expand_collapse_line_size: f32,
}

impl Default for ExpandCollapseOptions {
    fn default() -> Self {
        Self {
            layout_by: None,
            animate: true,
            undoable: true,
            handle_color: Color::BLACK,
            hover_delay: 150,
            enabled: true,
            expand_collapse_box_position: BoxPosition::TopLeft,
            expand_collapse_box_size: 12.0,
            expand_collapse_line_size: 8.0,
        }
    }
}

/// Recognized option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    LayoutBy,
    Animate,
    Undoable,
    HandleColor,
    HoverDelay,
    Enabled,
    BoxPosition,
    BoxSize,
    LineSize,
}

impl OptionKey {
    pub const ALL: [OptionKey; 9] = [
        OptionKey::LayoutBy,
        OptionKey::Animate,
        OptionKey::Undoable,
        OptionKey::HandleColor,
        OptionKey::HoverDelay,
        OptionKey::Enabled,
        OptionKey::BoxPosition,
        OptionKey::BoxSize,
        OptionKey::LineSize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LayoutBy => "layoutBy",
            Self::Animate => "animate",
            Self::Undoable => "undoable",
            Self::HandleColor => "handleColor",
            Self::HoverDelay => "hoverDelay",
            Self::Enabled => "enabled",
            Self::BoxPosition => "expandCollapseBoxPosition",
            Self::BoxSize => "expandCollapseBoxSize",
            Self::LineSize => "expandCollapseLineSize",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptionKey {
    type Err = FoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| FoldError::UnknownOption(s.to_string()))
    }
}

fn decode<T: DeserializeOwned>(key: OptionKey, value: Value) -> Result<T, FoldError> {
    serde_json::from_value(value).map_err(|e| FoldError::InvalidOptionValue {
        key: key.name().to_string(),
        reason: e.to_string(),
    })
}

fn encode<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl ExpandCollapseOptions {
    pub fn get(&self, key: OptionKey) -> Value {
        match key {
            OptionKey::LayoutBy => encode(&self.layout_by),
            OptionKey::Animate => Value::Bool(self.animate),
            OptionKey::Undoable => Value::Bool(self.undoable),
            OptionKey::HandleColor => Value::String(self.handle_color.to_string()),
            OptionKey::HoverDelay => Value::from(self.hover_delay),
            OptionKey::Enabled => Value::Bool(self.enabled),
            OptionKey::BoxPosition => encode(&self.expand_collapse_box_position),
            OptionKey::BoxSize => encode(&self.expand_collapse_box_size),
            OptionKey::LineSize => encode(&self.expand_collapse_line_size),
        }
    }

    /// Set a single option. The current value is kept when `value` does not decode.
    pub fn set(&mut self, key: OptionKey, value: Value) -> Result<(), FoldError> {
        match key {
            OptionKey::LayoutBy => self.layout_by = decode(key, value)?,
            OptionKey::Animate => self.animate = decode(key, value)?,
            OptionKey::Undoable => self.undoable = decode(key, value)?,
            OptionKey::HandleColor => self.handle_color = decode(key, value)?,
            OptionKey::HoverDelay => self.hover_delay = decode(key, value)?,
            OptionKey::Enabled => self.enabled = decode(key, value)?,
            OptionKey::BoxPosition => self.expand_collapse_box_position = decode(key, value)?,
            OptionKey::BoxSize => self.expand_collapse_box_size = decode(key, value)?,
            OptionKey::LineSize => self.expand_collapse_line_size = decode(key, value)?,
        }
        Ok(())
    }

    /// Overlay recognized keys from `overrides` onto a copy of these options.
    /// Unknown keys are skipped; a recognized key with a bad value is an error.
    pub fn merged(&self, overrides: &serde_json::Map<String, Value>) -> Result<Self, FoldError> {
        let mut merged = self.clone();
        for (name, value) in overrides {
            match name.parse::<OptionKey>() {
                Ok(key) => merged.set(key, value.clone())?,
                Err(_) => tracing::debug!("Ignoring unknown option `{}`", name),
            }
        }
        Ok(merged)
    }
}
