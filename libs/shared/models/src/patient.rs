use serde::{Deserialize, Serialize};

/// Demographic and medical attributes of a patient. `user_id` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: i64,
    pub user_id: i64,
    pub practitioner_id: Option<i64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub prakriti: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPatientProfile {
    pub user_id: i64,
    pub practitioner_id: Option<i64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub prakriti: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prakriti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PatientProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.age.is_none()
            && self.gender.is_none()
            && self.blood_group.is_none()
            && self.emergency_contact.is_none()
            && self.medical_history.is_none()
            && self.prakriti.is_none()
            && self.notes.is_none()
    }

    pub fn apply_to(self, profile: &mut PatientProfile) {
        if let Some(age) = self.age {
            profile.age = Some(age);
        }
        if let Some(gender) = self.gender {
            profile.gender = Some(gender);
        }
        if let Some(blood_group) = self.blood_group {
            profile.blood_group = Some(blood_group);
        }
        if let Some(emergency_contact) = self.emergency_contact {
            profile.emergency_contact = Some(emergency_contact);
        }
        if let Some(medical_history) = self.medical_history {
            profile.medical_history = Some(medical_history);
        }
        if let Some(prakriti) = self.prakriti {
            profile.prakriti = Some(prakriti);
        }
        if let Some(notes) = self.notes {
            profile.notes = Some(notes);
        }
    }
}
