// Data structures for the consolidated corpus

use crate::core::constants::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a numbered column measures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalMetadata {
    #[serde(rename = "Sensor")]
    pub sensor: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Signal")]
    pub signal: String,
}

impl SignalMetadata {
    pub fn new(sensor: &str, location: &str, signal: &str) -> Self {
        Self {
            sensor: sensor.to_string(),
            location: location.to_string(),
            signal: signal.to_string(),
        }
    }

    /// The synthetic entry describing column 0.
    pub fn time() -> Self {
        Self::new(TIME_TAG, TIME_TAG, TIME_TAG)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        match key {
            SIGNAL_KEY => Some(&self.signal),
            LOCATION_KEY => Some(&self.location),
            SENSOR_KEY => Some(&self.sensor),
            _ => None,
        }
    }

    /// Name used as the signal key in profile results.
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.sensor, self.location, self.signal)
    }
}

/// The seven annotation axes, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LabelClass {
    Locomotion,
    #[serde(rename = "HL_Activity")]
    HlActivity,
    #[serde(rename = "LL_Left_Arm")]
    LlLeftArm,
    #[serde(rename = "LL_Left_Arm_Object")]
    LlLeftArmObject,
    #[serde(rename = "LL_Right_Arm")]
    LlRightArm,
    #[serde(rename = "LL_Right_Arm_Object")]
    LlRightArmObject,
    #[serde(rename = "ML_Both_Arms")]
    MlBothArms,
}

impl LabelClass {
    pub const ALL: [LabelClass; 7] = [
        LabelClass::Locomotion,
        LabelClass::HlActivity,
        LabelClass::LlLeftArm,
        LabelClass::LlLeftArmObject,
        LabelClass::LlRightArm,
        LabelClass::LlRightArmObject,
        LabelClass::MlBothArms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelClass::Locomotion => "Locomotion",
            LabelClass::HlActivity => "HL_Activity",
            LabelClass::LlLeftArm => "LL_Left_Arm",
            LabelClass::LlLeftArmObject => "LL_Left_Arm_Object",
            LabelClass::LlRightArm => "LL_Right_Arm",
            LabelClass::LlRightArmObject => "LL_Right_Arm_Object",
            LabelClass::MlBothArms => "ML_Both_Arms",
        }
    }
}

impl FromStr for LabelClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LabelClass::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| format!("unknown label class: {}", s))
    }
}

impl fmt::Display for LabelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the label legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLabel {
    #[serde(rename = "Code")]
    pub code: i64,
    #[serde(rename = "Class")]
    pub class: LabelClass,
    #[serde(rename = "Label")]
    pub label: String,
}

impl ActivityLabel {
    pub fn new(code: i64, class: LabelClass, label: &str) -> Self {
        Self {
            code,
            class,
            label: label.to_string(),
        }
    }
}

/// Identifying columns appended to every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaField {
    File,
    Pid,
    RunId,
}

impl MetaField {
    pub const ALL: [MetaField; 3] = [MetaField::File, MetaField::Pid, MetaField::RunId];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetaField::File => FILE_COLUMN,
            MetaField::Pid => PID_COLUMN,
            MetaField::RunId => RUN_COLUMN,
        }
    }
}

/// Column identity inside a [`Table`](crate::core::table::Table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnName {
    Index(usize),
    Label(LabelClass),
    Meta(MetaField),
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnName::Index(i) => write!(f, "{}", i),
            ColumnName::Label(class) => f.write_str(class.as_str()),
            ColumnName::Meta(field) => f.write_str(field.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_class_names_round_trip() {
        for class in LabelClass::ALL {
            assert_eq!(class.as_str().parse::<LabelClass>().unwrap(), class);
        }
        assert!("Walk".parse::<LabelClass>().is_err());
    }

    #[test]
    fn test_label_class_serde_uses_dataset_names() {
        let json = serde_json::to_string(&LabelClass::LlRightArmObject).unwrap();
        assert_eq!(json, "\"LL_Right_Arm_Object\"");
    }

    #[test]
    fn test_metadata_attribute_lookup() {
        let meta = SignalMetadata::new("Accelerometer", "BACK", "accX");
        assert_eq!(meta.attribute("Location"), Some("BACK"));
        assert_eq!(meta.attribute("Unit"), None);
        assert_eq!(meta.display_name(), "Accelerometer BACK accX");
    }
}
