use std::collections::BTreeMap;
use crate::models::volunteer::{ AvailabilityOption, FormField, VolunteerApplication };

pub const AVAILABILITY_FIELD: &str = "availability";
pub const SUBMIT_SUCCESS_MESSAGE: &str =
    "Application submitted successfully! We will contact you soon.";
pub const NOTIFICATION_DURATION_MS: u64 = 3000;

/// Builds the application record. Later fields with the same name overwrite
/// earlier ones; availability is taken only from checked boxes, in page order.
pub fn collect_application(
    fields: &[FormField],
    availability: &[AvailabilityOption]
) -> VolunteerApplication {
    let fields: BTreeMap<String, String> = fields
        .iter()
        .filter(|f| f.name != AVAILABILITY_FIELD)
        .map(|f| (f.name.clone(), f.value.clone()))
        .collect();

    let availability = availability
        .iter()
        .filter(|option| option.checked)
        .map(|option| option.value.clone())
        .collect();

    VolunteerApplication { fields, availability }
}
