use serde::{Deserialize, Serialize};

/// Color of a stacked item, container slot or locked item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorId(pub i32);

/// What occupies a cell; interpreted by gameplay code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementType(pub i32);

/// Kind of level goal; interpreted by gameplay code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalType(pub i32);

/// Edge of a cell a gate opens towards.
///
/// Encoded as an integer on the wire. Values outside the known set are kept
/// verbatim so newer exports survive a load/save cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum GateDirection {
    #[default]
    None,
    Up,
    Right,
    Down,
    Left,
    Unknown(i32),
}

impl From<i32> for GateDirection {
    fn from(value: i32) -> Self {
        match value {
            0 => GateDirection::None,
            1 => GateDirection::Up,
            2 => GateDirection::Right,
            3 => GateDirection::Down,
            4 => GateDirection::Left,
            other => GateDirection::Unknown(other),
        }
    }
}

impl From<GateDirection> for i32 {
    fn from(direction: GateDirection) -> Self {
        match direction {
            GateDirection::None => 0,
            GateDirection::Up => 1,
            GateDirection::Right => 2,
            GateDirection::Down => 3,
            GateDirection::Left => 4,
            GateDirection::Unknown(other) => other,
        }
    }
}

impl GateDirection {
    /// Whether the cell carries a gate at all
    pub fn is_gate(self) -> bool {
        self != GateDirection::None
    }
}
