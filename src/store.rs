//! Ordered storage for tables whose identity is a 2-part key.
//!
//! Stop times, shape points, calendar dates and transfers are keyed by a
//! pair, and scanning a prefix of that pair in ascending order of the second
//! component is how trips and shapes are reconstructed. A hash map cannot do
//! that, and at tens of millions of stop times the table should not have to
//! fit in memory either, so records live in a B-tree table of a private
//! temporary sqlite database that sqlite deletes when the connection closes.
use rusqlite::{Connection, ErrorCode, ToSql};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use thiserror::Error;

/// An error raised by a [TupleStore] operation
#[derive(Error, Debug)]
pub enum StoreError {
    /// The key pair of a [TupleStore::put] is already present; the stored
    /// record is left untouched
    #[error("key pair already present")]
    Duplicate,
    /// The backing database failed
    #[error("sqlite failure")]
    Sqlite(#[from] rusqlite::Error),
    /// A record could not be encoded or decoded
    #[error("record codec failure")]
    Codec(#[from] serde_json::Error),
}

/// An ordered mapping from a `(String, K)` key to a record.
///
/// Inserting an already-present key is refused, and
/// [scan_prefix](TupleStore::scan_prefix) returns all records sharing a first
/// key component in ascending order of the second. Nothing is durable: the
/// backing file lives only as long as the store.
pub struct TupleStore<K, V> {
    conn: Connection,
    table: &'static str,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K: ToSql, V: Serialize + DeserializeOwned> TupleStore<K, V> {
    /// Opens an empty store.
    ///
    /// The empty path makes sqlite create a private temporary on-disk
    /// database, so the index can spill beyond memory; journaling and
    /// syncing are off since the data never outlives the process anyway.
    pub fn open(table: &'static str) -> Result<TupleStore<K, V>, StoreError> {
        let conn = Connection::open("")?;
        conn.pragma_update(None, "journal_mode", "OFF")?;
        conn.pragma_update(None, "synchronous", "OFF")?;
        // WITHOUT ROWID clusters the B-tree on (k1, k2), which is exactly the
        // scan order. k2 is left without a type so integer, text and date
        // second components all keep their natural ordering.
        conn.execute_batch(&format!(
            "CREATE TABLE {table} (
                k1 TEXT NOT NULL,
                k2 NOT NULL,
                record BLOB NOT NULL,
                PRIMARY KEY (k1, k2)
            ) WITHOUT ROWID"
        ))?;
        Ok(TupleStore {
            conn,
            table,
            _marker: PhantomData,
        })
    }

    /// Inserts one record under `(first, second)`.
    ///
    /// Fails with [StoreError::Duplicate] if that key pair is already
    /// present; the earlier record wins and is not overwritten.
    pub fn put(&mut self, first: &str, second: &K, record: &V) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec(record)?;
        let sql = format!(
            "INSERT INTO {} (k1, k2, record) VALUES (?1, ?2, ?3)",
            self.table
        );
        let mut statement = self.conn.prepare_cached(&sql)?;
        match statement.execute(rusqlite::params![first, second, encoded]) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All records whose first key component equals `first`, ascending by
    /// the second component. The returned vector can be iterated any number
    /// of times.
    pub fn scan_prefix(&self, first: &str) -> Result<Vec<V>, StoreError> {
        let sql = format!(
            "SELECT record FROM {} WHERE k1 = ?1 ORDER BY k2 ASC",
            self.table
        );
        let mut statement = self.conn.prepare_cached(&sql)?;
        let rows = statement.query_map([first], |row| row.get::<_, Vec<u8>>(0))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_slice(&row?)?);
        }
        Ok(records)
    }

    /// Number of records in the store
    pub fn len(&self) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Releases the connection and the temporary database behind it
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn scan_orders_by_second_component() {
        let mut store: TupleStore<u16, String> = TupleStore::open("t").unwrap();
        for sequence in [3u16, 1, 2] {
            store
                .put("T1", &sequence, &format!("record-{sequence}"))
                .unwrap();
        }
        store.put("T2", &7, &"other-trip".to_owned()).unwrap();

        let records = store.scan_prefix("T1").unwrap();
        assert_eq!(vec!["record-1", "record-2", "record-3"], records);
        assert_eq!(4, store.len().unwrap());
    }

    #[test]
    fn duplicate_key_pair_is_refused_and_first_wins() {
        let mut store: TupleStore<u16, String> = TupleStore::open("t").unwrap();
        store.put("T1", &1, &"first".to_owned()).unwrap();
        let err = store.put("T1", &1, &"second".to_owned()).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
        assert_eq!(vec!["first"], store.scan_prefix("T1").unwrap());
    }

    #[test]
    fn scan_is_restartable() {
        let mut store: TupleStore<u16, String> = TupleStore::open("t").unwrap();
        store.put("T1", &1, &"a".to_owned()).unwrap();
        store.put("T1", &2, &"b".to_owned()).unwrap();
        assert_eq!(store.scan_prefix("T1").unwrap(), store.scan_prefix("T1").unwrap());
    }

    #[test]
    fn date_keys_scan_chronologically() {
        let mut store: TupleStore<NaiveDate, String> = TupleStore::open("t").unwrap();
        let dates = [
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 7, 14).unwrap(),
        ];
        for date in &dates {
            store.put("service1", date, &date.to_string()).unwrap();
        }
        assert_eq!(
            vec!["2023-01-01", "2023-07-14", "2023-12-25"],
            store.scan_prefix("service1").unwrap()
        );
    }

    #[test]
    fn string_keys_scan_lexically() {
        let mut store: TupleStore<String, String> = TupleStore::open("t").unwrap();
        for to in ["C", "A", "B"] {
            store.put("from", &to.to_owned(), &to.to_owned()).unwrap();
        }
        assert_eq!(vec!["A", "B", "C"], store.scan_prefix("from").unwrap());
        assert!(store.scan_prefix("elsewhere").unwrap().is_empty());
    }

    #[test]
    fn close_deletes_the_backing_database() {
        let store: TupleStore<u16, String> = TupleStore::open("t").unwrap();
        store.close().unwrap();
    }
}
