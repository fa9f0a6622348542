use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection};

use crate::error::Result;
use crate::models::{Entity, Key, KeyKind};
use crate::normalize::normalize_title;

use super::{CatalogQuery, CatalogStore, SaveAction};

fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS entities (
            key  TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            body TEXT NOT NULL,
            seq  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS edition_index (
            edition_key TEXT NOT NULL,
            field       TEXT NOT NULL,
            value       TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_edition_index
            ON edition_index(field, value);

        CREATE TABLE IF NOT EXISTS work_authors (
            work_key   TEXT NOT NULL,
            author_key TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_work_authors
            ON work_authors(author_key);

        CREATE TABLE IF NOT EXISTS author_names (
            author_key TEXT NOT NULL,
            name       TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_author_names
            ON author_names(name);

        CREATE TABLE IF NOT EXISTS counters (
            kind TEXT PRIMARY KEY,
            next INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS save_log (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            comment    TEXT NOT NULL,
            action     TEXT NOT NULL,
            keys       TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

/// SQLite-backed catalog store.
///
/// Entities are stored as tagged JSON bodies; the matching dimensions
/// used by the pool builder are denormalized into side tables so
/// structural queries stay indexed. Each `save_many` runs in one
/// transaction, and each save is recorded in `save_log` with its audit
/// comment and action.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<String>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        apply_pragmas(&conn)?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_string_lossy().to_string()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_pragmas(&conn)?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Number of recorded saves, for audit and test assertions.
    pub fn save_count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let n: u64 = conn.query_row("SELECT COUNT(*) FROM save_log", [], |row| row.get(0))?;
        Ok(n)
    }
}

fn index_entity(conn: &Connection, entity: &Entity) -> Result<()> {
    let key = entity.key().as_str();
    conn.execute("DELETE FROM edition_index WHERE edition_key = ?1", params![key])?;
    conn.execute("DELETE FROM work_authors WHERE work_key = ?1", params![key])?;
    conn.execute("DELETE FROM author_names WHERE author_key = ?1", params![key])?;

    match entity {
        Entity::Edition(e) => {
            let mut rows: Vec<(&str, String)> = vec![
                ("title", e.title.clone()),
                ("normalized_title", normalize_title(&e.title)),
            ];
            rows.extend(e.isbns().iter().map(|v| ("isbn", v.to_string())));
            rows.extend(e.lccn.iter().map(|v| ("lccn", v.clone())));
            rows.extend(e.oclc_numbers.iter().map(|v| ("oclc", v.clone())));
            rows.extend(e.source_records.iter().map(|v| ("source_record", v.clone())));
            if let Some(ocaid) = &e.ocaid {
                rows.push(("ocaid", ocaid.clone()));
            }
            let mut stmt = conn.prepare(
                "INSERT INTO edition_index (edition_key, field, value) VALUES (?1, ?2, ?3)",
            )?;
            for (field, value) in rows {
                stmt.execute(params![key, field, value])?;
            }
        }
        Entity::Work(w) => {
            let mut stmt = conn
                .prepare("INSERT INTO work_authors (work_key, author_key) VALUES (?1, ?2)")?;
            for role in &w.authors {
                stmt.execute(params![key, role.author.as_str()])?;
            }
        }
        Entity::Author(a) => {
            conn.execute(
                "INSERT INTO author_names (author_key, name) VALUES (?1, ?2)",
                params![key, a.name],
            )?;
        }
        Entity::Redirect(_) => {}
    }
    Ok(())
}

fn query_keys(conn: &Connection, sql: &str, args: &[&str]) -> Result<Vec<Key>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
        row.get::<_, String>(0)
    })?;
    let mut keys = Vec::new();
    for row in rows {
        keys.push(Key::new(row?));
    }
    Ok(keys)
}

impl CatalogStore for SqliteStore {
    fn get(&self, key: &Key) -> Result<Option<Entity>> {
        let conn = self.conn.lock().unwrap();
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM entities WHERE key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        match body {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn get_many(&self, keys: &[Key]) -> Result<Vec<Entity>> {
        let mut entities = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(entity) = self.get(key)? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    fn query(&self, query: &CatalogQuery) -> Result<Vec<Key>> {
        let conn = self.conn.lock().unwrap();
        const BY_FIELD: &str = "SELECT DISTINCT i.edition_key
             FROM edition_index i JOIN entities e ON e.key = i.edition_key
             WHERE i.field = ?1 AND i.value = ?2
             ORDER BY e.seq";
        match query {
            CatalogQuery::EditionTitle(v) => query_keys(&conn, BY_FIELD, &["title", v]),
            CatalogQuery::EditionNormalizedTitle(v) => {
                query_keys(&conn, BY_FIELD, &["normalized_title", v])
            }
            CatalogQuery::EditionLccn(v) => query_keys(&conn, BY_FIELD, &["lccn", v]),
            CatalogQuery::EditionOclcNumber(v) => query_keys(&conn, BY_FIELD, &["oclc", v]),
            CatalogQuery::EditionOcaid(v) => query_keys(&conn, BY_FIELD, &["ocaid", v]),
            CatalogQuery::EditionSourceRecord(v) => {
                query_keys(&conn, BY_FIELD, &["source_record", v])
            }
            CatalogQuery::EditionIsbn(isbns) => {
                if isbns.is_empty() {
                    return Ok(Vec::new());
                }
                let placeholders = vec!["?"; isbns.len()].join(", ");
                // field is the first bound value, the ISBNs follow
                let sql = format!(
                    "SELECT DISTINCT i.edition_key
                     FROM edition_index i JOIN entities e ON e.key = i.edition_key
                     WHERE i.field = ? AND i.value IN ({placeholders})
                     ORDER BY e.seq"
                );
                let mut args: Vec<&str> = vec!["isbn"];
                args.extend(isbns.iter().map(String::as_str));
                query_keys(&conn, &sql, &args)
            }
            CatalogQuery::WorksByAuthor(author) => query_keys(
                &conn,
                "SELECT w.work_key
                 FROM work_authors w JOIN entities e ON e.key = w.work_key
                 WHERE w.author_key = ?1
                 ORDER BY e.seq",
                &[author.as_str()],
            ),
            CatalogQuery::AuthorByName(name) => query_keys(
                &conn,
                "SELECT a.author_key
                 FROM author_names a JOIN entities e ON e.key = a.author_key
                 WHERE a.name = ?1
                 ORDER BY e.seq",
                &[name],
            ),
        }
    }

    fn new_key(&self, kind: KeyKind) -> Result<Key> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO counters (kind, next) VALUES (?1, 1)
             ON CONFLICT(kind) DO UPDATE SET next = next + 1",
            params![kind.as_str()],
        )?;
        let next: u64 = tx.query_row(
            "SELECT next FROM counters WHERE kind = ?1",
            params![kind.as_str()],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(kind.key_for(next))
    }

    fn save_many(&self, entities: &[Entity], comment: &str, action: SaveAction) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for entity in entities {
            let kind = match entity {
                Entity::Edition(_) => "edition",
                Entity::Work(_) => "work",
                Entity::Author(_) => "author",
                Entity::Redirect(_) => "redirect",
            };
            let body = serde_json::to_string(entity)?;
            tx.execute(
                "INSERT INTO entities (key, kind, body, seq)
                 VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(seq), 0) + 1 FROM entities))
                 ON CONFLICT(key) DO UPDATE SET kind = excluded.kind, body = excluded.body",
                params![entity.key().as_str(), kind, body],
            )?;
            index_entity(&tx, entity)?;
        }
        let keys: Vec<&str> = entities.iter().map(|e| e.key().as_str()).collect();
        tx.execute(
            "INSERT INTO save_log (comment, action, keys, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![comment, action.as_str(), keys.join(" "), Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Edition;

    fn sample_edition(store: &SqliteStore) -> Key {
        let key = store.new_key(KeyKind::Edition).unwrap();
        let mut e = Edition::new(key.clone(), "The Heritage of India");
        e.isbn_10 = vec!["0842800778".into()];
        e.ocaid = Some("heritageofindia0000unse".into());
        e.source_records = vec!["ia:heritageofindia0000unse".into()];
        store
            .save_many(&[Entity::Edition(e)], "import new book", SaveAction::AddBook)
            .unwrap();
        key
    }

    #[test]
    fn test_roundtrip_and_queries() {
        let store = SqliteStore::open_in_memory().unwrap();
        let key = sample_edition(&store);

        let entity = store.get(&key).unwrap().unwrap();
        assert_eq!(entity.as_edition().unwrap().title, "The Heritage of India");

        for query in [
            CatalogQuery::EditionTitle("The Heritage of India".into()),
            CatalogQuery::EditionNormalizedTitle(normalize_title("The Heritage of India")),
            CatalogQuery::EditionIsbn(vec!["0842800778".into(), "junk".into()]),
            CatalogQuery::EditionOcaid("heritageofindia0000unse".into()),
            CatalogQuery::EditionSourceRecord("ia:heritageofindia0000unse".into()),
        ] {
            assert_eq!(store.query(&query).unwrap(), vec![key.clone()], "{query:?}");
        }
        assert!(store
            .query(&CatalogQuery::EditionLccn("none".into()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_resave_reindexes() {
        let store = SqliteStore::open_in_memory().unwrap();
        let key = sample_edition(&store);

        let mut e = store.get(&key).unwrap().unwrap().into_edition().unwrap();
        e.lccn = vec!["72188127".into()];
        store
            .save_many(&[Entity::Edition(e)], "import existing book", SaveAction::EditBook)
            .unwrap();

        assert_eq!(
            store.query(&CatalogQuery::EditionLccn("72188127".into())).unwrap(),
            vec![key]
        );
        assert_eq!(store.save_count().unwrap(), 2);
    }

    #[test]
    fn test_new_key_sequence_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            assert_eq!(store.new_key(KeyKind::Edition).unwrap().as_str(), "/books/1");
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.new_key(KeyKind::Edition).unwrap().as_str(), "/books/2");
    }
}
