//! Proptest generators for property-based testing.

use chrono::NaiveDate;
use proptest::prelude::*;

use diploma_ledger_core::{
    record_hash, CredentialFields, CredentialStatus, DocumentDigests, DocumentKind, Gpa,
    LifecycleAction, RecordHash, SerialNumber, Sha256Digest,
};

/// Generate a valid serial number.
pub fn serial_number() -> impl Strategy<Value = SerialNumber> {
    "[A-Z]{2}[0-9]{1,8}".prop_map(|s| SerialNumber::new(&s).expect("valid serial"))
}

/// Generate already-normalized text: words separated by single spaces.
pub fn clean_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9àáâãèéêìíòóôõùúýăđơưạảấầẩẫậắằẳẵặ]{1,8}", 1..4)
        .prop_map(|words| words.join(" "))
}

/// Generate an optional text field.
pub fn text_field() -> impl Strategy<Value = Option<String>> {
    prop::option::of(clean_text())
}

/// Generate a GPA.
pub fn gpa() -> impl Strategy<Value = Gpa> {
    (0u16..=400).prop_map(|h| Gpa::from_hundredths(h).expect("in range"))
}

/// Generate a birth date.
pub fn birth_date() -> impl Strategy<Value = NaiveDate> {
    (1950i32..=2010, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

/// Generate a graduation year.
pub fn graduation_year() -> impl Strategy<Value = i32> {
    1970i32..=2100
}

/// Generate a SHA-256 digest.
pub fn digest() -> impl Strategy<Value = Sha256Digest> {
    any::<[u8; 32]>().prop_map(Sha256Digest::from_bytes)
}

/// Generate a full set of document digests.
pub fn complete_digests() -> impl Strategy<Value = DocumentDigests> {
    (digest(), digest(), digest()).prop_map(|(p, d, t)| DocumentDigests {
        portrait: Some(p),
        diploma: Some(d),
        transcript: Some(t),
    })
}

/// Generate a document kind.
pub fn document_kind() -> impl Strategy<Value = DocumentKind> {
    prop_oneof![
        Just(DocumentKind::Portrait),
        Just(DocumentKind::Diploma),
        Just(DocumentKind::Transcript),
    ]
}

/// Generate a lifecycle status.
pub fn status() -> impl Strategy<Value = CredentialStatus> {
    prop_oneof![
        Just(CredentialStatus::Pending),
        Just(CredentialStatus::Approved),
        Just(CredentialStatus::Rejected),
        Just(CredentialStatus::Issued),
        Just(CredentialStatus::Revoked),
    ]
}

/// Generate a lifecycle action.
pub fn action() -> impl Strategy<Value = LifecycleAction> {
    proptest::sample::select(LifecycleAction::ALL.to_vec())
}

/// Generate a noisy rendering of clean text: extra spaces, tabs, line breaks
/// and no-break spaces around and between words.
pub fn noisy(clean: String) -> impl Strategy<Value = String> {
    let words: Vec<String> = clean.split(' ').map(str::to_string).collect();
    let gaps = words.len() + 1;
    prop::collection::vec(prop::sample::select(vec![" ", "  ", "\t", "\n", "\r\n", "\u{a0}"]), gaps)
        .prop_map(move |seps| {
            let mut out = String::from(seps[0]);
            for (i, word) in words.iter().enumerate() {
                out.push_str(word);
                out.push_str(seps[i + 1]);
            }
            out
        })
}

/// Parameters for generating a record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub serial_no: SerialNumber,
    pub fields: CredentialFields,
    pub digests: DocumentDigests,
}

impl RecordParams {
    pub fn record_hash(&self) -> RecordHash {
        record_hash(&self.serial_no, &self.fields, &self.digests)
    }
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            serial_number(),
            clean_text(),
            clean_text(),
            prop::option::of(birth_date()),
            text_field(),
            text_field(),
            prop::option::of(gpa()),
            prop::option::of(graduation_year()),
            complete_digests(),
        )
            .prop_map(
                |(serial_no, id, name, birth_date, major, ranking, gpa, year, digests)| {
                    RecordParams {
                        serial_no,
                        fields: CredentialFields {
                            student_id: Some(id),
                            student_name: Some(name),
                            birth_date,
                            major,
                            ranking,
                            gpa,
                            graduation_year: year,
                        },
                        digests,
                    }
                },
            )
            .boxed()
    }
}
