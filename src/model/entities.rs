use super::error::ModelError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

static HSL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*hsl\(\s*(\d{1,3})\s*,\s*(\d{1,3})%\s*,\s*(\d{1,3})%\s*\)\s*$")
        .expect("valid hsl regex")
});

/// Opaque identifier shared by projects, groups and filters.
///
/// Ids are assigned once at creation and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A compiled line pattern. Serialized as its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern, rejecting anything the regex engine cannot parse
    ///
    /// The empty pattern is valid and matches every line.
    pub fn new(source: &str) -> Result<Self, ModelError> {
        Regex::new(source)
            .map(|regex| Self { regex })
            .map_err(|err| ModelError::InvalidPattern {
                pattern: source.to_string(),
                source: err,
            })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Test one line of raw text. Matching never spans lines.
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Display color of a filter: random hue, fixed saturation and lightness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Color {
    pub fn random(saturation: u8, lightness: u8) -> Self {
        Self {
            hue: rand::random_range(0..360),
            saturation: saturation.min(100),
            lightness: lightness.min(100),
        }
    }

    /// Convert to 8-bit RGB for hosts that cannot render HSL directly.
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let s = f32::from(self.saturation) / 100.0;
        let l = f32::from(self.lightness) / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = f32::from(self.hue % 360) / 60.0;
        let x = c * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

impl FromStr for Color {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidColor(s.to_string());
        let caps = HSL_RE.captures(s).ok_or_else(invalid)?;
        let hue: u16 = caps[1].parse().map_err(|_| invalid())?;
        let saturation: u8 = caps[2].parse().map_err(|_| invalid())?;
        let lightness: u8 = caps[3].parse().map_err(|_| invalid())?;
        if hue >= 360 || saturation > 100 || lightness > 100 {
            return Err(invalid());
        }
        Ok(Self {
            hue,
            saturation,
            lightness,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

/// The four render states of a group or filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
    LitVisible,
    LitInvisible,
    UnlitVisible,
    UnlitInvisible,
}

impl VisualState {
    pub fn from_flags(is_highlighted: bool, is_shown: bool) -> Self {
        match (is_highlighted, is_shown) {
            (true, true) => VisualState::LitVisible,
            (true, false) => VisualState::LitInvisible,
            (false, true) => VisualState::UnlitVisible,
            (false, false) => VisualState::UnlitInvisible,
        }
    }
}

/// Icon descriptor for a filter row. The host turns it into an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterIcon {
    pub color: Color,
    pub filled: bool,
}

/// A single regex with its display and visibility flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub id: EntityId,
    #[serde(rename = "regex")]
    pub pattern: Pattern,
    pub color: Color,
    /// Matching lines receive a highlight decoration
    pub is_highlighted: bool,
    /// Matching lines are kept in the focus projection
    pub is_shown: bool,
    /// Matches in the active editor as of the last evaluation pass
    #[serde(skip)]
    pub count: usize,
}

impl Filter {
    pub fn new(pattern: Pattern, color: Color) -> Self {
        Self {
            id: EntityId::generate(),
            pattern,
            color,
            is_highlighted: true,
            is_shown: true,
            count: 0,
        }
    }

    pub fn state(&self) -> VisualState {
        VisualState::from_flags(self.is_highlighted, self.is_shown)
    }

    pub fn icon(&self) -> FilterIcon {
        FilterIcon {
            color: self.color,
            filled: self.is_highlighted,
        }
    }
}

/// A named, ordered collection of filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    pub is_highlighted: bool,
    pub is_shown: bool,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            filters: Vec::new(),
            is_highlighted: true,
            is_shown: true,
        }
    }

    pub fn state(&self) -> VisualState {
        VisualState::from_flags(self.is_highlighted, self.is_shown)
    }

    /// Set the group flag and fan it out to every member filter.
    pub fn set_highlighted(&mut self, is_highlighted: bool) {
        self.is_highlighted = is_highlighted;
        for filter in &mut self.filters {
            filter.is_highlighted = is_highlighted;
        }
    }

    /// Set the group flag and fan it out to every member filter.
    pub fn set_shown(&mut self, is_shown: bool) {
        self.is_shown = is_shown;
        for filter in &mut self.filters {
            filter.is_shown = is_shown;
        }
    }

    pub fn find_filter(&self, id: &EntityId) -> Option<&Filter> {
        self.filters.iter().find(|f| &f.id == id)
    }

    pub fn find_filter_mut(&mut self, id: &EntityId) -> Option<&mut Filter> {
        self.filters.iter_mut().find(|f| &f.id == id)
    }
}

/// A named, ordered collection of groups. At most one project is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub selected: bool,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            groups: Vec::new(),
            selected: false,
        }
    }
}
