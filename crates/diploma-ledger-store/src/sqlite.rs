//! SQLite implementation of the RecordStore trait.
//!
//! This is the primary storage backend for the diploma ledger. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use diploma_ledger_core::{
    CredentialFields, CredentialRecord, CredentialStatus, DocumentBlob, DocumentKind, Gpa,
    LifecycleAction, SerialNumber, Sha256Digest,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{ApprovalLogEntry, ChainLogEntry, RecordFilter, RecordStore, Transition};

const RECORD_COLUMNS: &str = "serial_no, student_id, student_name, birth_date, major, ranking,
     gpa_hundredths, graduation_year, status, created_by, created_at, updated_at,
     approved_by, approved_at, issued_by, issued_at, revoked_by, revoked_at";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", true)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn conversion_error(column: &str, err: impl std::fmt::Display) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        format!("{}: {}", column, err).into(),
    )
}

fn from_millis(column: &str, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| conversion_error(column, ms))
}

fn opt_from_millis(column: &str, ms: Option<i64>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    ms.map(|ms| from_millis(column, ms)).transpose()
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<CredentialRecord> {
    let serial: String = row.get("serial_no")?;
    let birth_date: Option<String> = row.get("birth_date")?;
    let gpa: Option<u16> = row.get("gpa_hundredths")?;
    let status: String = row.get("status")?;

    let fields = CredentialFields {
        student_id: row.get("student_id")?,
        student_name: row.get("student_name")?,
        birth_date: birth_date
            .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| conversion_error("birth_date", e))?,
        major: row.get("major")?,
        ranking: row.get("ranking")?,
        gpa: gpa
            .map(Gpa::from_hundredths)
            .transpose()
            .map_err(|e| conversion_error("gpa_hundredths", e))?,
        graduation_year: row.get("graduation_year")?,
    };

    Ok(CredentialRecord {
        serial_no: SerialNumber::new(&serial).map_err(|e| conversion_error("serial_no", e))?,
        fields,
        status: status
            .parse::<CredentialStatus>()
            .map_err(|e| conversion_error("status", e))?,
        created_by: row.get("created_by")?,
        created_at: from_millis("created_at", row.get("created_at")?)?,
        updated_at: from_millis("updated_at", row.get("updated_at")?)?,
        approved_by: row.get("approved_by")?,
        approved_at: opt_from_millis("approved_at", row.get("approved_at")?)?,
        issued_by: row.get("issued_by")?,
        issued_at: opt_from_millis("issued_at", row.get("issued_at")?)?,
        revoked_by: row.get("revoked_by")?,
        revoked_at: opt_from_millis("revoked_at", row.get("revoked_at")?)?,
    })
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<DocumentBlob> {
    let kind: String = row.get("kind")?;
    let data: Vec<u8> = row.get("data")?;
    Ok(DocumentBlob {
        kind: kind
            .parse::<DocumentKind>()
            .map_err(|e| conversion_error("kind", e))?,
        filename: row.get("filename")?,
        mime_type: row.get("mime_type")?,
        data: Bytes::from(data),
    })
}

fn row_to_approval(row: &Row<'_>) -> rusqlite::Result<ApprovalLogEntry> {
    let serial: String = row.get("serial_no")?;
    let action: String = row.get("action")?;
    let from: String = row.get("from_status")?;
    let to: String = row.get("to_status")?;
    Ok(ApprovalLogEntry {
        serial_no: SerialNumber::new(&serial).map_err(|e| conversion_error("serial_no", e))?,
        action: action
            .parse::<LifecycleAction>()
            .map_err(|e| conversion_error("action", e))?,
        from: from
            .parse::<CredentialStatus>()
            .map_err(|e| conversion_error("from_status", e))?,
        to: to
            .parse::<CredentialStatus>()
            .map_err(|e| conversion_error("to_status", e))?,
        actor: row.get("actor")?,
        note: row.get("note")?,
        at: from_millis("at", row.get("at")?)?,
    })
}

fn row_to_chain(row: &Row<'_>) -> rusqlite::Result<ChainLogEntry> {
    let serial: String = row.get("serial_no")?;
    let action: String = row.get("action")?;
    let record_hash: Option<String> = row.get("record_hash")?;
    Ok(ChainLogEntry {
        serial_no: SerialNumber::new(&serial).map_err(|e| conversion_error("serial_no", e))?,
        action: action
            .parse::<LifecycleAction>()
            .map_err(|e| conversion_error("action", e))?,
        actor: row.get("actor")?,
        tx_id: row.get("tx_id")?,
        record_hash: record_hash
            .map(|h| Sha256Digest::from_hex(&h))
            .transpose()
            .map_err(|e| conversion_error("record_hash", e))?,
        onchain_status: row.get("onchain_status")?,
        at: from_millis("at", row.get("at")?)?,
    })
}

fn upsert_document(
    conn: &Connection,
    serial_no: &SerialNumber,
    blob: &DocumentBlob,
    at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO diploma_files (serial_no, kind, filename, mime_type, data, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(serial_no, kind) DO UPDATE SET
             filename = excluded.filename,
             mime_type = excluded.mime_type,
             data = excluded.data,
             uploaded_at = excluded.uploaded_at",
        params![
            serial_no.as_str(),
            blob.kind.as_str(),
            blob.filename,
            blob.mime_type,
            blob.data.as_ref(),
            at.timestamp_millis(),
        ],
    )?;
    Ok(())
}

fn load_documents(conn: &Connection, serial_no: &SerialNumber) -> Result<Vec<DocumentBlob>> {
    let mut stmt = conn.prepare(
        "SELECT kind, filename, mime_type, data FROM diploma_files WHERE serial_no = ?1",
    )?;
    let mut docs = stmt
        .query_map(params![serial_no.as_str()], row_to_document)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    docs.sort_by_key(|d| d.kind);
    Ok(docs)
}

fn load_record(conn: &Connection, serial_no: &SerialNumber) -> Result<Option<CredentialRecord>> {
    conn.query_row(
        &format!("SELECT {} FROM diplomas WHERE serial_no = ?1", RECORD_COLUMNS),
        params![serial_no.as_str()],
        row_to_record,
    )
    .optional()
    .map_err(StoreError::from)
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert_record(
        &self,
        record: &CredentialRecord,
        documents: &[DocumentBlob],
    ) -> Result<()> {
        let record = record.clone();
        let documents = documents.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM diplomas WHERE serial_no = ?1",
                    params![record.serial_no.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_some() {
                return Err(StoreError::SerialExists(record.serial_no.to_string()));
            }

            let f = &record.fields;
            tx.execute(
                &format!(
                    "INSERT INTO diplomas ({}) VALUES
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                    RECORD_COLUMNS
                ),
                params![
                    record.serial_no.as_str(),
                    f.student_id,
                    f.student_name,
                    f.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    f.major,
                    f.ranking,
                    f.gpa.map(|g| g.hundredths()),
                    f.graduation_year,
                    record.status.as_str(),
                    record.created_by,
                    record.created_at.timestamp_millis(),
                    record.updated_at.timestamp_millis(),
                    record.approved_by,
                    record.approved_at.map(|t| t.timestamp_millis()),
                    record.issued_by,
                    record.issued_at.map(|t| t.timestamp_millis()),
                    record.revoked_by,
                    record.revoked_at.map(|t| t.timestamp_millis()),
                ],
            )?;

            for blob in &documents {
                upsert_document(&tx, &record.serial_no, blob, record.created_at)?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_record(&self, serial_no: &SerialNumber) -> Result<Option<CredentialRecord>> {
        let serial_no = serial_no.clone();
        self.run(move |conn| load_record(conn, &serial_no)).await
    }

    async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<CredentialRecord>> {
        let filter = filter.clone();

        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM diplomas
                 WHERE (?1 IS NULL OR status = ?1)
                 ORDER BY created_at DESC, rowid DESC",
                RECORD_COLUMNS
            ))?;
            let status = filter.status.map(|s| s.as_str());
            let rows = stmt.query_map(params![status], row_to_record)?;

            // Text matching is Unicode case-insensitive, which SQLite LIKE is not.
            let mut records = Vec::new();
            for row in rows {
                let record = row?;
                if filter.matches(&record) {
                    records.push(record);
                    if records.len() >= filter.limit {
                        break;
                    }
                }
            }
            Ok(records)
        })
        .await
    }

    async fn apply_transition(&self, transition: &Transition) -> Result<CredentialRecord> {
        transition.check()?;
        let transition = transition.clone();

        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut record = load_record(&tx, &transition.serial_no)?
                .ok_or_else(|| StoreError::NotFound(transition.serial_no.to_string()))?;

            if record.status != transition.from {
                return Err(StoreError::StatusConflict {
                    serial_no: transition.serial_no.to_string(),
                    action: transition.action,
                    expected: transition.from,
                    actual: record.status,
                });
            }

            transition.apply_to(&mut record);
            let f = &record.fields;
            tx.execute(
                "UPDATE diplomas SET
                     student_id = ?2, student_name = ?3, birth_date = ?4, major = ?5,
                     ranking = ?6, gpa_hundredths = ?7, graduation_year = ?8, status = ?9,
                     updated_at = ?10, approved_by = ?11, approved_at = ?12, issued_by = ?13,
                     issued_at = ?14, revoked_by = ?15, revoked_at = ?16
                 WHERE serial_no = ?1",
                params![
                    record.serial_no.as_str(),
                    f.student_id,
                    f.student_name,
                    f.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    f.major,
                    f.ranking,
                    f.gpa.map(|g| g.hundredths()),
                    f.graduation_year,
                    record.status.as_str(),
                    record.updated_at.timestamp_millis(),
                    record.approved_by,
                    record.approved_at.map(|t| t.timestamp_millis()),
                    record.issued_by,
                    record.issued_at.map(|t| t.timestamp_millis()),
                    record.revoked_by,
                    record.revoked_at.map(|t| t.timestamp_millis()),
                ],
            )?;

            for blob in &transition.documents {
                upsert_document(&tx, &transition.serial_no, blob, transition.at)?;
            }

            if let Some(entry) = transition.approval_entry() {
                tx.execute(
                    "INSERT INTO approval_logs (serial_no, action, from_status, to_status, actor, note, at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        entry.serial_no.as_str(),
                        entry.action.code(),
                        entry.from.as_str(),
                        entry.to.as_str(),
                        entry.actor,
                        entry.note,
                        entry.at.timestamp_millis(),
                    ],
                )?;
            }

            if let Some(entry) = transition.chain_entry() {
                tx.execute(
                    "INSERT INTO chain_logs (serial_no, action, actor, tx_id, record_hash, onchain_status, at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        entry.serial_no.as_str(),
                        entry.action.code(),
                        entry.actor,
                        entry.tx_id,
                        entry.record_hash.map(|h| h.to_hex()),
                        entry.onchain_status,
                        entry.at.timestamp_millis(),
                    ],
                )?;
            }

            tx.commit()?;
            Ok(record)
        })
        .await
    }

    async fn get_documents(&self, serial_no: &SerialNumber) -> Result<Vec<DocumentBlob>> {
        let serial_no = serial_no.clone();
        self.run(move |conn| load_documents(conn, &serial_no)).await
    }

    async fn get_record_with_documents(
        &self,
        serial_no: &SerialNumber,
    ) -> Result<Option<(CredentialRecord, Vec<DocumentBlob>)>> {
        let serial_no = serial_no.clone();

        self.run(move |conn| {
            let Some(record) = load_record(conn, &serial_no)? else {
                return Ok(None);
            };
            let docs = load_documents(conn, &serial_no)?;
            Ok(Some((record, docs)))
        })
        .await
    }

    async fn get_document(
        &self,
        serial_no: &SerialNumber,
        kind: DocumentKind,
    ) -> Result<Option<DocumentBlob>> {
        let serial_no = serial_no.clone();

        self.run(move |conn| {
            conn.query_row(
                "SELECT kind, filename, mime_type, data FROM diploma_files
                 WHERE serial_no = ?1 AND kind = ?2",
                params![serial_no.as_str(), kind.as_str()],
                row_to_document,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn approval_log(&self, serial_no: &SerialNumber) -> Result<Vec<ApprovalLogEntry>> {
        let serial_no = serial_no.clone();

        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT serial_no, action, from_status, to_status, actor, note, at
                 FROM approval_logs WHERE serial_no = ?1 ORDER BY id",
            )?;
            let entries = stmt
                .query_map(params![serial_no.as_str()], row_to_approval)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }

    async fn chain_log(&self, serial_no: &SerialNumber) -> Result<Vec<ChainLogEntry>> {
        let serial_no = serial_no.clone();

        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT serial_no, action, actor, tx_id, record_hash, onchain_status, at
                 FROM chain_logs WHERE serial_no = ?1 ORDER BY id",
            )?;
            let entries = stmt
                .query_map(params![serial_no.as_str()], row_to_chain)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ChainReceipt;
    use chrono::TimeZone;

    fn serial(s: &str) -> SerialNumber {
        SerialNumber::new(s).unwrap()
    }

    fn sample_record(s: &str, minute: u32) -> CredentialRecord {
        let fields = CredentialFields {
            student_id: Some("SV001".into()),
            student_name: Some("Nguyễn Văn A".into()),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 15),
            major: Some("Công nghệ thông tin".into()),
            ranking: Some("Giỏi".into()),
            gpa: Some(Gpa::parse("3.8").unwrap()),
            graduation_year: Some(2024),
        };
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, minute, 0).unwrap();
        CredentialRecord::new(serial(s), fields, "officer", now)
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_record() {
        let store = SqliteStore::open_memory().unwrap();
        let record = sample_record("VB001", 0);
        let portrait = DocumentBlob::new(
            DocumentKind::Portrait,
            "portrait.png",
            "image/png",
            &b"fake-portrait-binary-content"[..],
        );

        store.insert_record(&record, &[portrait.clone()]).await.unwrap();

        let retrieved = store.get_record(&serial("VB001")).await.unwrap().unwrap();
        assert_eq!(retrieved, record);

        let docs = store.get_documents(&serial("VB001")).await.unwrap();
        assert_eq!(docs, vec![portrait.clone()]);

        let snapshot = store
            .get_record_with_documents(&serial("VB001"))
            .await
            .unwrap();
        assert_eq!(snapshot, Some((record, vec![portrait])));
    }

    #[tokio::test]
    async fn test_duplicate_serial() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert_record(&sample_record("VB001", 0), &[]).await.unwrap();
        let err = store
            .insert_record(&sample_record("VB001", 1), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SerialExists(ref s) if s == "VB001"));
    }

    #[tokio::test]
    async fn test_transition_and_logs() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert_record(&sample_record("VB001", 0), &[]).await.unwrap();

        let approve = Transition::new(
            serial("VB001"),
            LifecycleAction::Approve,
            CredentialStatus::Pending,
            CredentialStatus::Approved,
            "reviewer",
            at(2),
        )
        .note(Some("looks good".into()));
        store.apply_transition(&approve).await.unwrap();

        let issue = Transition::new(
            serial("VB001"),
            LifecycleAction::Issue,
            CredentialStatus::Approved,
            CredentialStatus::Issued,
            "officer",
            at(3),
        )
        .chain(ChainReceipt {
            tx_id: "abc123".into(),
            record_hash: Some(Sha256Digest::hash(b"canonical")),
            onchain_status: "ISSUED".into(),
        });
        let record = store.apply_transition(&issue).await.unwrap();
        assert_eq!(record.status, CredentialStatus::Issued);
        assert_eq!(record.issued_at, Some(at(3)));
        assert_eq!(record.approved_by.as_deref(), Some("reviewer"));

        let approvals = store.approval_log(&serial("VB001")).await.unwrap();
        assert_eq!(approvals.len(), 1);
        assert_eq!(approvals[0].note.as_deref(), Some("looks good"));
        assert_eq!(approvals[0].to, CredentialStatus::Approved);

        let chain = store.chain_log(&serial("VB001")).await.unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].tx_id, "abc123");
        assert_eq!(chain[0].record_hash, Some(Sha256Digest::hash(b"canonical")));
    }

    #[tokio::test]
    async fn test_stale_transition_leaves_state() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert_record(&sample_record("VB001", 0), &[]).await.unwrap();

        let reject = Transition::new(
            serial("VB001"),
            LifecycleAction::RejectIssue,
            CredentialStatus::Approved,
            CredentialStatus::Rejected,
            "officer",
            at(2),
        );
        let err = store.apply_transition(&reject).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::StatusConflict {
                expected: CredentialStatus::Approved,
                actual: CredentialStatus::Pending,
                ..
            }
        ));

        let record = store.get_record(&serial("VB001")).await.unwrap().unwrap();
        assert_eq!(record.status, CredentialStatus::Pending);
        assert!(store.approval_log(&serial("VB001")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_upserts_document() {
        let store = SqliteStore::open_memory().unwrap();
        let old = DocumentBlob::new(DocumentKind::Diploma, "a.pdf", "application/pdf", &b"old"[..]);
        store.insert_record(&sample_record("VB001", 0), &[old]).await.unwrap();

        let new = DocumentBlob::new(DocumentKind::Diploma, "b.pdf", "application/pdf", &b"new"[..]);
        let mut fields = sample_record("VB001", 0).fields;
        fields.ranking = Some("Xuất sắc".into());
        let edit = Transition::new(
            serial("VB001"),
            LifecycleAction::Edit,
            CredentialStatus::Pending,
            CredentialStatus::Pending,
            "officer",
            at(2),
        )
        .fields(fields.clone())
        .document(new.clone());
        store.apply_transition(&edit).await.unwrap();

        let docs = store.get_documents(&serial("VB001")).await.unwrap();
        assert_eq!(docs, vec![new]);
        let record = store.get_record(&serial("VB001")).await.unwrap().unwrap();
        assert_eq!(record.fields, fields);
    }

    #[tokio::test]
    async fn test_list_by_status_newest_first() {
        let store = SqliteStore::open_memory().unwrap();
        for (i, s) in ["VB001", "VB002", "VB003"].iter().enumerate() {
            store.insert_record(&sample_record(s, i as u32), &[]).await.unwrap();
        }
        let approve = Transition::new(
            serial("VB002"),
            LifecycleAction::Approve,
            CredentialStatus::Pending,
            CredentialStatus::Approved,
            "reviewer",
            at(2),
        );
        store.apply_transition(&approve).await.unwrap();

        let all = store.list_records(&RecordFilter::default()).await.unwrap();
        let serials: Vec<&str> = all.iter().map(|r| r.serial_no.as_str()).collect();
        assert_eq!(serials, ["VB003", "VB002", "VB001"]);

        let pending = store
            .list_records(&RecordFilter {
                status: Some(CredentialStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);

        let by_name = store
            .list_records(&RecordFilter {
                query: Some("NGUYỄN".into()),
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 2);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diplomas.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_record(&sample_record("VB001", 0), &[]).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert!(store.get_record(&serial("VB001")).await.unwrap().is_some());
    }
}
