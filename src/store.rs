//! The only reader and writer of the persisted snapshot.
//!
//! Every mutation goes through [`Store::update`]: reload, mutate, persist.
//! Nothing holds a `Database` across operations.

use std::path::PathBuf;

use log::{debug, info, warn};
use serde_json::Value;

use crate::db::BlobStore;
use crate::error::{Result, SharesubError};
use crate::models::{parse_date, Database};
use crate::ops::repair_ids;

/// One fixed key per schema version.
pub const BLOB_KEY: &str = "sharesub_v4_abos_mails";

/// Read-only snapshot used to bootstrap an empty store.
pub trait SeedSource {
    fn fetch(&self) -> Result<String>;
    fn describe(&self) -> String;
}

/// Seed document on disk.
pub struct FileSeed {
    path: PathBuf,
}

impl FileSeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeedSource for FileSeed {
    fn fetch(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct Store<B: BlobStore> {
    blobs: B,
    seed: Option<Box<dyn SeedSource>>,
}

impl<B: BlobStore> Store<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs, seed: None }
    }

    pub fn with_seed(mut self, seed: impl SeedSource + 'static) -> Self {
        self.seed = Some(Box::new(seed));
        self
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Current snapshot. A missing or unreadable blob is never an error: it
    /// falls through to the seed, then to the empty database, and whichever
    /// wins is persisted. Only faults of the storage medium are returned.
    pub fn load(&self) -> Result<Database> {
        match self.blobs.get(BLOB_KEY)? {
            Some(raw) => match decode_blob(&raw) {
                Ok(mut db) => {
                    let reassigned = repair_ids(&mut db);
                    if reassigned > 0 {
                        warn!("stored snapshot had {reassigned} clashing ids, reassigned");
                        self.save(&db)?;
                    }
                    return Ok(db);
                }
                Err(reason) => warn!("stored snapshot is unreadable, bootstrapping: {reason}"),
            },
            None => info!("no stored snapshot, bootstrapping"),
        }
        self.bootstrap()
    }

    fn bootstrap(&self) -> Result<Database> {
        let seeded = self.seed.as_ref().and_then(|seed| {
            match seed.fetch().and_then(|text| parse_document(&text)) {
                Ok(db) => {
                    info!(
                        "seeded from {} ({} accounts, {} emails)",
                        seed.describe(),
                        db.accounts.len(),
                        db.emails.len()
                    );
                    Some(db)
                }
                Err(e) => {
                    warn!("seed {} rejected: {e}", seed.describe());
                    None
                }
            }
        });
        let db = seeded.unwrap_or_default();
        self.save(&db)?;
        Ok(db)
    }

    /// Overwrites the stored snapshot. Last writer wins.
    pub fn save(&self, db: &Database) -> Result<()> {
        let json = serde_json::to_string_pretty(db)?;
        self.blobs.put(BLOB_KEY, &json)?;
        debug!(
            "saved snapshot ({} accounts, {} emails, {} bytes)",
            db.accounts.len(),
            db.emails.len(),
            json.len()
        );
        Ok(())
    }

    /// Full wipe to the empty database. Does not restore the seed.
    pub fn reset(&self) -> Result<Database> {
        let db = Database::default();
        self.save(&db)?;
        info!("store reset to empty");
        Ok(db)
    }

    /// Reload, apply `mutate`, persist. When `mutate` fails nothing is written.
    pub fn update<T>(&self, mutate: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut db = self.load()?;
        let out = mutate(&mut db)?;
        self.save(&db)?;
        Ok(out)
    }

    /// The stored blob byte for byte, or the empty database when nothing is stored.
    pub fn export_json(&self) -> Result<String> {
        match self.blobs.get(BLOB_KEY)? {
            Some(raw) => Ok(raw),
            None => Ok(serde_json::to_string_pretty(&Database::default())?),
        }
    }

    /// Replaces the whole snapshot with `text`. All or nothing: a rejected
    /// document leaves the stored blob untouched.
    pub fn import_json(&self, text: &str) -> Result<Database> {
        let db = parse_document(text)?;
        self.save(&db)?;
        info!(
            "imported snapshot ({} accounts, {} emails)",
            db.accounts.len(),
            db.emails.len()
        );
        Ok(db)
    }
}

/// Lenient decode for our own blob: any JSON object, missing parts defaulted.
fn decode_blob(raw: &str) -> std::result::Result<Database, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("top level is not an object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Strict decode for documents from outside (imports, seeds): a JSON object
/// whose `accounts` is an array. A missing or malformed `emails` becomes `[]`.
/// Every `renew_date` must be empty or a date. Missing or repeated ids are
/// replaced with fresh ones.
pub fn parse_document(text: &str) -> Result<Database> {
    let mut value: Value = serde_json::from_str(text)
        .map_err(|e| SharesubError::InvalidImport(format!("not valid JSON ({e})")))?;
    let obj = value
        .as_object_mut()
        .ok_or_else(|| SharesubError::InvalidImport("top level must be an object".to_string()))?;
    match obj.get("accounts") {
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(SharesubError::InvalidImport(
                "`accounts` must be an array".to_string(),
            ))
        }
        None => return Err(SharesubError::InvalidImport("missing `accounts`".to_string())),
    }
    if !matches!(obj.get("emails"), Some(Value::Array(_))) {
        obj.insert("emails".to_string(), Value::Array(Vec::new()));
    }
    check_renew_dates(&value)?;
    let mut db: Database = serde_json::from_value(value)
        .map_err(|e| SharesubError::InvalidImport(format!("unexpected shape ({e})")))?;
    let reassigned = repair_ids(&mut db);
    if reassigned > 0 {
        warn!("document had {reassigned} missing or repeated ids, reassigned");
    }
    Ok(db)
}

fn check_renew_dates(doc: &Value) -> Result<()> {
    let subscriptions = doc["accounts"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|account| account["subscriptions"].as_array())
        .flatten();
    for sub in subscriptions {
        let readable = match &sub["renew_date"] {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty() || parse_date(s).is_some(),
            _ => false,
        };
        if !readable {
            return Err(SharesubError::InvalidImport(format!(
                "renew_date {} of subscription {} is not a YYYY-MM-DD date",
                sub["renew_date"], sub["id"]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::db::SqliteBlobStore;
    use crate::models::{AccountFields, MemberFields, SubscriptionFields};
    use crate::ops::{self, Confirmed};
    use crate::reports;

    #[derive(Default)]
    struct MemoryBlobStore {
        values: RefCell<HashMap<String, String>>,
    }

    impl MemoryBlobStore {
        fn with(key: &str, value: &str) -> Self {
            let store = Self::default();
            store.put(key, value).unwrap();
            store
        }
    }

    impl BlobStore for MemoryBlobStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.borrow().get(key).cloned())
        }

        fn put(&self, key: &str, value: &str) -> Result<()> {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct StaticSeed {
        text: Option<&'static str>,
        fetches: Rc<Cell<u32>>,
    }

    impl SeedSource for StaticSeed {
        fn fetch(&self) -> Result<String> {
            self.fetches.set(self.fetches.get() + 1);
            self.text
                .map(str::to_string)
                .ok_or_else(|| SharesubError::Other("seed unreachable".to_string()))
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    fn seeded(text: Option<&'static str>) -> (Store<MemoryBlobStore>, Rc<Cell<u32>>) {
        let fetches = Rc::new(Cell::new(0));
        let store = Store::new(MemoryBlobStore::default()).with_seed(StaticSeed {
            text,
            fetches: fetches.clone(),
        });
        (store, fetches)
    }

    fn sample() -> Database {
        serde_json::from_str(
            r#"{"accounts":[{"id":1,"name":"ShareSub #1","country":"FR",
                "monthly_revenue":23.0,"monthly_cost":17.99,
                "subscriptions":[{"id":101,"platform":"spotify","plan":"Famille",
                    "price_you_pay_month":17.99,"renew_date":"2025-10-14",
                    "members":[{"id":1,"pseudo":"Chainez S.","monthly_fee":3.5}]}]}],
              "emails":[{"id":1,"address":"support@slicesub.com","enabled":false}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_store_bootstraps_to_empty_and_persists() {
        let store = Store::new(MemoryBlobStore::default());
        let db = store.load().unwrap();
        assert_eq!(db, Database::default());
        assert!(store.blobs().get(BLOB_KEY).unwrap().is_some());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = Store::new(MemoryBlobStore::default());
        let db = sample();
        store.save(&db).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, db);
        store.save(&loaded).unwrap();
        assert_eq!(store.load().unwrap(), db);
    }

    #[test]
    fn test_roundtrip_on_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sharesub.db");
        let db = sample();
        Store::new(SqliteBlobStore::open(&path).unwrap())
            .save(&db)
            .unwrap();
        let reopened = Store::new(SqliteBlobStore::open(&path).unwrap());
        assert_eq!(reopened.load().unwrap(), db);
    }

    #[test]
    fn test_malformed_blob_falls_through_to_seed() {
        let (store, fetches) = seeded(Some(r#"{"accounts":[{"id":9,"name":"Seed"}]}"#));
        store.blobs().put(BLOB_KEY, "{not json").unwrap();
        let db = store.load().unwrap();
        assert_eq!(db.accounts[0].name, "Seed");
        assert!(db.emails.is_empty());
        assert_eq!(fetches.get(), 1);

        // Persisted, so the seed is not read again.
        store.load().unwrap();
        assert_eq!(fetches.get(), 1);
    }

    #[test]
    fn test_non_object_blob_is_unreadable() {
        let store = Store::new(MemoryBlobStore::with(BLOB_KEY, "[[],[]]"));
        assert_eq!(store.load().unwrap(), Database::default());
    }

    #[test]
    fn test_bad_seed_falls_back_to_empty() {
        for text in [None, Some("nope"), Some("[1,2]"), Some(r#"{"emails":[]}"#)] {
            let (store, fetches) = seeded(text);
            assert_eq!(store.load().unwrap(), Database::default(), "seed {text:?}");
            assert_eq!(fetches.get(), 1);
        }
    }

    #[test]
    fn test_stored_blob_missing_emails_defaults() {
        let store = Store::new(MemoryBlobStore::with(
            BLOB_KEY,
            r#"{"accounts":[{"id":1,"name":"Old"}]}"#,
        ));
        let db = store.load().unwrap();
        assert_eq!(db.accounts.len(), 1);
        assert!(db.emails.is_empty());
        assert!(db.accounts[0].subscriptions.is_empty());
    }

    #[test]
    fn test_reset_wipes_to_empty() {
        let (store, _) = seeded(Some(r#"{"accounts":[{"id":9}]}"#));
        store.save(&sample()).unwrap();
        assert_eq!(store.reset().unwrap(), Database::default());
        assert_eq!(store.load().unwrap(), Database::default());
    }

    #[test]
    fn test_import_without_emails() {
        let store = Store::new(MemoryBlobStore::default());
        let db = store
            .import_json(r#"{"accounts":[{"id":1,"name":"X","subscriptions":[]}]}"#)
            .unwrap();
        assert!(db.emails.is_empty());
        assert_eq!(db.accounts.len(), 1);
        assert_eq!(db.accounts[0].name, "X");
        assert_eq!(store.load().unwrap(), db);
    }

    #[test]
    fn test_rejected_import_leaves_state_unchanged() {
        let store = Store::new(MemoryBlobStore::default());
        store.save(&sample()).unwrap();
        let before = store.export_json().unwrap();
        for bad in [
            "not json",
            "[]",
            r#"{"emails":[]}"#,
            r#"{"accounts":{}}"#,
            r#"{"accounts":[1,2]}"#,
        ] {
            let err = store.import_json(bad).unwrap_err();
            assert!(matches!(err, SharesubError::InvalidImport(_)), "{bad}");
        }
        assert_eq!(store.export_json().unwrap(), before);
    }

    #[test]
    fn test_export_is_stored_blob_or_empty_default() {
        let store = Store::new(MemoryBlobStore::default());
        let empty: Database = serde_json::from_str(&store.export_json().unwrap()).unwrap();
        assert_eq!(empty, Database::default());

        store.blobs().put(BLOB_KEY, r#"{"accounts":[]}"#).unwrap();
        assert_eq!(store.export_json().unwrap(), r#"{"accounts":[]}"#);
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let store = Store::new(MemoryBlobStore::default());
        store.save(&sample()).unwrap();
        let before = store.export_json().unwrap();
        let err = store
            .update(|db| ops::edit_account(db, 404, AccountFields::default()))
            .unwrap_err();
        assert!(matches!(err, SharesubError::AccountNotFound(404)));
        assert_eq!(store.export_json().unwrap(), before);
    }

    #[test]
    fn test_import_rejects_unreadable_renew_date() {
        let store = Store::new(MemoryBlobStore::default());
        store.save(&sample()).unwrap();
        let before = store.export_json().unwrap();
        for bad in [
            r#"{"accounts":[{"id":1,"subscriptions":[{"id":2,"renew_date":"14/10/2025"}]}]}"#,
            r#"{"accounts":[{"id":1,"subscriptions":[{"id":2,"renew_date":20251014}]}]}"#,
        ] {
            let err = store.import_json(bad).unwrap_err();
            assert!(
                matches!(&err, SharesubError::InvalidImport(msg) if msg.contains("renew_date")),
                "{bad}: {err}"
            );
        }
        assert_eq!(store.export_json().unwrap(), before);
    }

    #[test]
    fn test_import_accepts_empty_and_timestamp_renew_dates() {
        let store = Store::new(MemoryBlobStore::default());
        let db = store
            .import_json(
                r#"{"accounts":[{"id":1,"subscriptions":[
                    {"id":2,"renew_date":""},
                    {"id":3,"renew_date":null},
                    {"id":4,"renew_date":"2025-10-14T08:00:00Z"}]}]}"#,
            )
            .unwrap();
        let dates: Vec<_> = db.accounts[0]
            .subscriptions
            .iter()
            .map(|s| s.renew_date)
            .collect();
        assert_eq!(
            dates,
            vec![None, None, chrono::NaiveDate::from_ymd_opt(2025, 10, 14)]
        );
    }

    #[test]
    fn test_import_gives_missing_ids_distinct_values() {
        let store = Store::new(MemoryBlobStore::default());
        let db = store
            .import_json(r#"{"accounts":[{"name":"A"},{"name":"B"}]}"#)
            .unwrap();
        let (a, b) = (db.accounts[0].id, db.accounts[1].id);
        assert_ne!(a, b);

        store
            .update(|db| {
                ops::edit_account(
                    db,
                    b,
                    AccountFields {
                        name: Some("B2".to_string()),
                        ..AccountFields::default()
                    },
                )
            })
            .unwrap();
        let names: Vec<_> = store
            .load()
            .unwrap()
            .accounts
            .into_iter()
            .map(|acc| (acc.id, acc.name))
            .collect();
        assert_eq!(names, vec![(a, "A".to_string()), (b, "B2".to_string())]);
    }

    #[test]
    fn test_import_reassigns_repeated_ids() {
        let store = Store::new(MemoryBlobStore::default());
        let db = store
            .import_json(
                r#"{"accounts":[
                    {"id":1,"name":"first","subscriptions":[{"id":5,"members":[
                        {"id":7,"pseudo":"x"},{"id":7,"pseudo":"y"}]}]},
                    {"id":1,"name":"second"}],
                  "emails":[{"id":3,"address":"a"},{"id":3,"address":"b"}]}"#,
            )
            .unwrap();
        assert_eq!(db.accounts[0].id, 1);
        assert_ne!(db.accounts[1].id, 1);
        assert_eq!(db.accounts[1].name, "second");
        let members = &db.accounts[0].subscriptions[0].members;
        assert_eq!(members[0].id, 7);
        assert_ne!(members[1].id, 7);
        assert_eq!(db.emails[0].id, 3);
        assert_ne!(db.emails[1].id, 3);
        assert_eq!(store.load().unwrap(), db);
    }

    #[test]
    fn test_clashing_ids_in_stored_blob_are_fixed_once() {
        let store = Store::new(MemoryBlobStore::with(
            BLOB_KEY,
            r#"{"accounts":[{"name":"A"},{"name":"B"}]}"#,
        ));
        let first = store.load().unwrap();
        assert_ne!(first.accounts[0].id, first.accounts[1].id);
        assert_eq!(store.load().unwrap(), first);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let store = Store::new(MemoryBlobStore::default());
        let a = store
            .update(|db| {
                Ok(ops::add_account(
                    db,
                    AccountFields {
                        name: Some("A".into()),
                        monthly_revenue: Some(10.0),
                        monthly_cost: Some(5.0),
                        ..AccountFields::default()
                    },
                ))
            })
            .unwrap();
        let s = store
            .update(|db| {
                ops::add_subscription(
                    db,
                    a,
                    SubscriptionFields {
                        price_you_pay_month: Some(5.0),
                        ..SubscriptionFields::default()
                    },
                )
            })
            .unwrap();
        store
            .update(|db| {
                ops::add_member(
                    db,
                    a,
                    s,
                    MemberFields {
                        monthly_fee: Some(3.0),
                        ..MemberFields::default()
                    },
                )
            })
            .unwrap();

        let db = store.load().unwrap();
        assert_eq!(reports::total_revenue(&db), 10.0);
        assert_eq!(reports::total_cost(&db), 5.0);
        assert_eq!(reports::margin(&db), 5.0);
        let sub = db.account(a).unwrap().subscription(s).unwrap();
        assert_eq!(reports::subscription_members_total(sub), 3.0);

        store
            .update(|db| ops::delete_account(db, a, Confirmed::affirmed()))
            .unwrap();
        assert_eq!(store.load().unwrap(), Database::default());
    }
}
