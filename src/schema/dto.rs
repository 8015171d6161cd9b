use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::types::{ColorId, ElementType, GateDirection, GoalType};

/// Top-level plaintext document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelCollectionDto {
    #[serde(deserialize_with = "lenient::skip_nulls")]
    pub levels: Vec<LevelConfigDto>,
}

/// One serialized level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LevelConfigDto {
    pub level: i32,
    pub rows: i32,
    pub columns: i32,
    pub total_slot: i32,
    #[serde(deserialize_with = "lenient::skip_nulls")]
    pub goals: Vec<GoalDto>,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub containers: Vec<ColorId>,
    /// Column-major; `None` marks a cell the exporter wrote as `null`
    #[serde(deserialize_with = "lenient::grid")]
    pub grid: Vec<Vec<Option<CellDto>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalDto {
    pub goal_type: GoalType,
    pub target_count: i32,
    pub target_color: ColorId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CellDto {
    pub is_empty: bool,
    pub element_type: ElementType,
    pub gate_direction: GateDirection,
    pub ice_hit_points: i32,
    pub screw_hit_points: i32,
    pub lock_item_count: i32,
    pub lock_item_color: ColorId,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub colors: Vec<ColorId>,
    #[serde(deserialize_with = "lenient::nulls_as_default")]
    pub gate_waves: Vec<GateWaveDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateWaveDto {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub colors: Vec<ColorId>,
}

impl LevelCollectionDto {
    /// Parse decrypted plaintext. A leading UTF-8 byte order mark is ignored.
    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
        Ok(serde_json::from_slice(data)?)
    }

    /// Compact encoding used inside containers
    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Indented encoding for human-readable exports
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl LevelConfigDto {
    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Deserializers that read `null` the way older exporters meant it: as "nothing here".
mod lenient {
    use serde::{Deserialize, Deserializer};

    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Drops `null` entries; for sequences where position carries no meaning.
    pub fn skip_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
        Ok(items.unwrap_or_default().into_iter().flatten().collect())
    }

    /// Replaces `null` entries with defaults; for order-significant sequences.
    pub fn nulls_as_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
        Ok(items
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    }

    /// A `null` column reads as a column of missing cells.
    pub fn grid<'de, D, T>(deserializer: D) -> Result<Vec<Vec<Option<T>>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let columns: Option<Vec<Option<Vec<Option<T>>>>> = Option::deserialize(deserializer)?;
        Ok(columns
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    }
}
