//! Preference values and their string encoding.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic type of a preference.
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum PrefKind {
    /// `true` or `false`.
    Bool,
    /// `"on"` or `"off"`.
    Switch,
}

/// Two-state string preference that is either `"on"` or `"off"`.
///
/// Values loaded from storage are kept verbatim even if they are neither
/// `"on"` nor `"off"`. Toggling such a value turns it on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Switch(String);

impl Switch {
    /// String stored for a switch that is on.
    pub const ON: &'static str = "on";
    /// String stored for a switch that is off.
    pub const OFF: &'static str = "off";

    /// Returns a switch that is on.
    pub fn on() -> Self {
        Self(Self::ON.to_owned())
    }
    /// Returns a switch that is off.
    pub fn off() -> Self {
        Self(Self::OFF.to_owned())
    }
    /// Constructs a switch from an arbitrary string without checking it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns whether the switch is exactly `"on"`.
    pub fn is_on(&self) -> bool {
        self.0 == Self::ON
    }
    /// Returns whether the switch holds one of the two allowed strings.
    pub fn is_recognized(&self) -> bool {
        self.0 == Self::ON || self.0 == Self::OFF
    }
    /// Returns the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the opposite state.
    #[must_use]
    pub fn toggled(&self) -> Self {
        match self.is_on() {
            true => Self::off(),
            false => Self::on(),
        }
    }
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        match on {
            true => Self::on(),
            false => Self::off(),
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value of a single preference.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum PrefValue {
    /// Boolean preference.
    Bool(bool),
    /// On/off preference.
    Switch(Switch),
}

impl PrefValue {
    /// Returns the semantic type of the value.
    pub fn kind(&self) -> PrefKind {
        match self {
            PrefValue::Bool(_) => PrefKind::Bool,
            PrefValue::Switch(_) => PrefKind::Switch,
        }
    }

    /// Returns the string written to storage for this value.
    pub fn encode(&self) -> String {
        match self {
            PrefValue::Bool(b) => b.encode(),
            PrefValue::Switch(s) => s.encode(),
        }
    }

    /// Decodes a value read from storage. This never fails: booleans are
    /// `true` only for the exact string `"true"` and switches take the string
    /// as-is.
    pub fn decode(kind: PrefKind, raw: &str) -> Self {
        match kind {
            PrefKind::Bool => PrefValue::Bool(bool::decode(raw)),
            PrefKind::Switch => PrefValue::Switch(Switch::decode(raw)),
        }
    }

    /// Parses user input, accepting only the allowed strings for `kind`.
    pub fn parse(kind: PrefKind, s: &str) -> Result<Self, ParseValueError> {
        let s = s.trim();
        match kind {
            PrefKind::Bool => match s {
                "true" => Ok(PrefValue::Bool(true)),
                "false" => Ok(PrefValue::Bool(false)),
                _ => Err(ParseValueError { kind, input: s.to_owned() }),
            },
            PrefKind::Switch => match s {
                Switch::ON => Ok(PrefValue::Switch(Switch::on())),
                Switch::OFF => Ok(PrefValue::Switch(Switch::off())),
                _ => Err(ParseValueError { kind, input: s.to_owned() }),
            },
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// Error produced when parsing user input as a preference value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} value {input:?}")]
pub struct ParseValueError {
    /// Expected kind of value.
    pub kind: PrefKind,
    /// Input that failed to parse.
    pub input: String,
}

/// Rust type that can be used as a preference.
pub trait PrefType: Clone + PartialEq {
    /// Semantic type of the preference.
    const KIND: PrefKind;

    /// Returns the string written to storage.
    fn encode(&self) -> String;
    /// Decodes a string read from storage.
    fn decode(raw: &str) -> Self;
    /// Flips the value to its other state.
    fn toggle(&mut self);

    /// Wraps the value in a [`PrefValue`].
    fn into_value(self) -> PrefValue;
    /// Unwraps a [`PrefValue`] of the matching kind.
    fn from_value(value: PrefValue) -> Option<Self>;
}

impl PrefType for bool {
    const KIND: PrefKind = PrefKind::Bool;

    fn encode(&self) -> String {
        self.to_string()
    }
    fn decode(raw: &str) -> Self {
        raw == "true"
    }
    fn toggle(&mut self) {
        *self = !*self;
    }

    fn into_value(self) -> PrefValue {
        PrefValue::Bool(self)
    }
    fn from_value(value: PrefValue) -> Option<Self> {
        match value {
            PrefValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl PrefType for Switch {
    const KIND: PrefKind = PrefKind::Switch;

    fn encode(&self) -> String {
        self.0.clone()
    }
    fn decode(raw: &str) -> Self {
        Self::from_raw(raw)
    }
    fn toggle(&mut self) {
        *self = self.toggled();
    }

    fn into_value(self) -> PrefValue {
        PrefValue::Switch(self)
    }
    fn from_value(value: PrefValue) -> Option<Self> {
        match value {
            PrefValue::Switch(s) => Some(s),
            _ => None,
        }
    }
}
