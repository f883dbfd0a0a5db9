use serde::{ Serialize, Deserialize };
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityOption {
    pub value: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VolunteerApplication {
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
    pub availability: Vec<String>,
}
