//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical text and record hash so that every
//! implementation hashing the same record agrees byte for byte.

use chrono::NaiveDate;

use diploma_ledger_core::{
    canonical_form, CanonicalForm, CredentialFields, DocumentDigests, Gpa, RecordHash,
    SerialNumber, Sha256Digest,
};

use crate::fixtures::{DIPLOMA_BYTES, PORTRAIT_BYTES, TRANSCRIPT_BYTES};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub serial_no: &'static str,
    pub student_id: Option<&'static str>,
    pub student_name: Option<&'static str>,
    /// `YYYY-MM-DD`.
    pub birth_date: Option<&'static str>,
    pub major: Option<&'static str>,
    pub ranking: Option<&'static str>,
    /// Decimal text as submitted.
    pub gpa: Option<&'static str>,
    pub graduation_year: Option<i32>,
    /// Portrait, diploma and transcript bytes, in that order.
    pub documents: [Option<&'static [u8]>; 3],
    /// Expected record hash (hex).
    pub expected_record_hash: &'static str,
}

const SAMPLE: GoldenVector = GoldenVector {
    name: "Issued sample record",
    serial_no: "VB001",
    student_id: Some("SV001"),
    student_name: Some("Nguyễn Văn A"),
    birth_date: Some("2000-01-15"),
    major: Some("Công nghệ thông tin"),
    ranking: Some("Giỏi"),
    gpa: Some("3.80"),
    graduation_year: Some(2024),
    documents: [
        Some(PORTRAIT_BYTES),
        Some(DIPLOMA_BYTES),
        Some(TRANSCRIPT_BYTES),
    ],
    expected_record_hash: "436367fb1824ee3a4a8a8679ee58a70d69f3d5f39dd6f95b909f9ba20124ebc4",
};

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        SAMPLE,
        GoldenVector {
            name: "Same record under another serial",
            serial_no: "VB999",
            expected_record_hash:
                "024fabc3352b64142b1d98dc59efb57a708d1b07bb52e9270b41d0a690f647ba",
            ..SAMPLE
        },
        GoldenVector {
            name: "Required fields only, no documents",
            serial_no: "VB002",
            student_id: Some("SV002"),
            student_name: Some("Test"),
            birth_date: None,
            major: None,
            ranking: None,
            gpa: None,
            graduation_year: None,
            documents: [None, None, None],
            expected_record_hash:
                "6f6f6d1544f51490820dda17bd9878f0a68e8a72083d08ecc4987104a4de62c9",
        },
    ]
}

/// Serial and typed fields of a vector.
pub fn fields_from_vector(vector: &GoldenVector) -> (SerialNumber, CredentialFields) {
    let serial_no = SerialNumber::new(vector.serial_no).expect("vector serial");
    let fields = CredentialFields {
        student_id: vector.student_id.map(str::to_string),
        student_name: vector.student_name.map(str::to_string),
        birth_date: vector.birth_date.map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d").expect("vector birth date")
        }),
        major: vector.major.map(str::to_string),
        ranking: vector.ranking.map(str::to_string),
        gpa: vector.gpa.map(|g| Gpa::parse(g).expect("vector gpa")),
        graduation_year: vector.graduation_year,
    };
    (serial_no, fields)
}

/// Document digests of a vector.
pub fn digests_from_vector(vector: &GoldenVector) -> DocumentDigests {
    let [portrait, diploma, transcript] = vector.documents.map(|d| d.map(Sha256Digest::hash));
    DocumentDigests {
        portrait,
        diploma,
        transcript,
    }
}

/// Canonical form of a vector.
pub fn canonical_from_vector(vector: &GoldenVector) -> CanonicalForm {
    let (serial_no, fields) = fields_from_vector(vector);
    canonical_form(&serial_no, &fields, &digests_from_vector(vector))
}

/// Record hash of a vector.
pub fn record_hash_from_vector(vector: &GoldenVector) -> RecordHash {
    canonical_from_vector(vector).record_hash()
}

/// Verify all golden vectors produce their expected record hash.
///
/// Returns `(name, matches, computed hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = record_hash_from_vector(v).to_hex();
            let matches = hex == v.expected_record_hash;
            (v.name.to_string(), matches, hex)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, hex) in verify_all_vectors() {
            assert!(matches, "vector '{}' hashed to {}", name, hex);
        }
    }

    #[test]
    fn test_sample_canonical_text() {
        let form = canonical_from_vector(&SAMPLE);
        let lines: Vec<&str> = form.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "serialNo=VB001");
        assert_eq!(lines[2], "studentName=Nguyễn Văn A");
        assert_eq!(lines[6], "gpa=3.80");
        assert_eq!(lines[7], "graduationYear=2024");
        assert_eq!(
            lines[8],
            "portraitSha256=1e03432b04f8c1aac704301f0907b6dd09a379c7dee1b7ec0ffe6a4ffac0f81d"
        );
        assert_eq!(
            lines[9],
            "diplomaSha256=912a52ce84ea0079fa3c7754cfbe3d2e88b86d54cb4b887cf2f785de9997b53b"
        );
        assert_eq!(
            lines[10],
            "transcriptSha256=cebc6050bb87602ed0c37c37a3596fb07e41d27d45e28ff3ba4bb0add4b669b4"
        );
    }

    #[test]
    fn test_absent_fields_render_empty() {
        let vector = &all_vectors()[2];
        let form = canonical_from_vector(vector);
        assert_eq!(
            form.as_str(),
            "serialNo=VB002\nstudentId=SV002\nstudentName=Test\nbirthDate=\nmajor=\n\
             ranking=\ngpa=\ngraduationYear=\nportraitSha256=\ndiplomaSha256=\n\
             transcriptSha256="
        );
    }

    #[test]
    fn test_serial_changes_hash() {
        let vectors = all_vectors();
        assert_ne!(
            record_hash_from_vector(&vectors[0]),
            record_hash_from_vector(&vectors[1])
        );
    }

    #[test]
    fn test_vectors_are_deterministic() {
        for vector in all_vectors() {
            assert_eq!(
                canonical_from_vector(&vector),
                canonical_from_vector(&vector),
                "vector '{}' produced different canonical text",
                vector.name
            );
        }
    }
}
