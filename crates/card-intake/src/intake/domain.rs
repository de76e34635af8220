use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder id number stored when neither the applicant nor the document supplied one.
pub const PENDING_ID_NUMBER: &str = "PENDING";

/// Identifier assigned by the repository on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

/// Handle to an uploaded file held by the external file store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(pub String);

/// Identity documents the intake pipeline knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    Aadhaar,
    #[serde(rename = "PAN")]
    Pan,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "aadhaar",
            DocumentType::Pan => "pan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Case-insensitive parse of the labels used on intake forms.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Raw output of the external text recognizer for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    pub text: String,
    pub confidence: f32,
}

/// Structured fields pulled out of recognized text. Absent fields are simply `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Verification outcome for a single uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVerification {
    pub document_type: DocumentType,
    pub is_verified: bool,
    #[serde(rename = "extractedData")]
    pub extracted: ExtractedFields,
}

impl DocumentVerification {
    /// Fail-closed result used when the document could not be read at all.
    pub fn failed(document_type: DocumentType) -> Self {
        Self {
            document_type,
            is_verified: false,
            extracted: ExtractedFields::default(),
        }
    }
}

/// Verification results for the identity document slots of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentVerifications {
    pub aadhaar: Option<DocumentVerification>,
    pub pan: Option<DocumentVerification>,
}

impl DocumentVerifications {
    pub fn aadhaar_verified(&self) -> bool {
        self.aadhaar.as_ref().is_some_and(|result| result.is_verified)
    }

    pub fn pan_verified(&self) -> bool {
        self.pan.as_ref().is_some_and(|result| result.is_verified)
    }

    pub fn details(&self) -> VerificationDetails {
        VerificationDetails {
            aadhaar: self.aadhaar_verified(),
            pan: self.pan_verified(),
        }
    }
}

/// Per-document breakdown reported back to the applicant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationDetails {
    pub aadhaar: bool,
    pub pan: bool,
}

/// Outcome of comparing a declared name with the name read from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub is_match: bool,
    pub entered_normalized: String,
    pub document_normalized: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationType {
    Premium,
    Premier,
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Verified,
    Rejected,
    #[serde(rename = "Review Required")]
    ReviewRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Pending,
    Passed,
    #[serde(rename = "Review Required")]
    ReviewRequired,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// One optional file per upload slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhaar: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<FileRef>,
}

impl DocumentSlots {
    pub fn has_identity_documents(&self) -> bool {
        self.aadhaar.is_some() || self.pan.is_some()
    }

    /// Every uploaded file, photo included, in slot order.
    pub fn uploaded(&self) -> Vec<FileRef> {
        [&self.aadhaar, &self.pan, &self.photo]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// Personal details as typed by the applicant. Blank optional fields are treated as missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredDetails {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub city: String,
    pub state: String,
    #[serde(default, deserialize_with = "deserialize_optional_gender")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub id_number: Option<String>,
}

impl DeclaredDetails {
    /// First required field left blank, if any.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("mobile", &self.mobile),
            ("city", &self.city),
            ("state", &self.state),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// Inbound application as received from the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmission {
    pub personal_details: DeclaredDetails,
    #[serde(default)]
    pub documents: DocumentSlots,
    pub application_type: ApplicationType,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub referral_code: Option<String>,
}

/// Personal details after gender and id number have been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub city: String,
    pub state: String,
    pub gender: Gender,
    pub id_number: String,
}

/// The assembled application, ready to be handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub personal_details: PersonalDetails,
    pub unique_code: String,
    pub documents: DocumentSlots,
    pub application_type: ApplicationType,
    pub status: ApplicationStatus,
    pub verification_status: VerificationStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

/// Repository-issued view of an application: identity and creation time plus the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredApplication {
    pub id: ApplicationId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: ApplicationRecord,
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn deserialize_optional_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = deserialize_optional_text(deserializer)?;
    opt.map(|value| {
        Gender::parse(&value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown gender '{value}', expected Male, Female or Other"
            ))
        })
    })
    .transpose()
}
