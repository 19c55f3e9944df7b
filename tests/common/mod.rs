#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use snap_info::store::Store;
use snap_info::verify::content::content_hash;
use snap_info::verify::sidecar;

pub const SCHEMA: &str = "
    CREATE TABLE snapshot_info (
        version TEXT, root_path TEXT, scan_start INTEGER, scan_end INTEGER,
        time_zone TEXT, os_platform TEXT, total_entries INTEGER, total_files INTEGER,
        total_dirs INTEGER, total_links INTEGER, total_size INTEGER, total_errors INTEGER,
        snapshot_hash TEXT
    );
    CREATE TABLE entries (
        path TEXT PRIMARY KEY, hash TEXT, type TEXT, size INTEGER,
        mode INTEGER, uid INTEGER, gid INTEGER, mtime REAL, target TEXT
    );
    CREATE TABLE users (uid INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE groups (gid INTEGER PRIMARY KEY, name TEXT);";

pub const INFO: &str = "
    INSERT INTO snapshot_info VALUES
        ('1.0.0', '/srv', 1700000000000, 1700000001250, 'UTC', 'linux', 3, 2, 1, 0, 300, 0, NULL);";

pub const IDENTITIES: &str = "
    INSERT INTO users VALUES (0, 'root'), (1000, 'alice');
    INSERT INTO groups VALUES (0, 'root'), (100, 'users');";

/// Create `name` in `dir` with the full schema, snapshot_info and identities, then run `rows`.
pub fn snapshot(dir: &Path, name: &str, rows: &str) -> PathBuf {
    snapshot_with(dir, name, "", rows)
}

/// Like `snapshot` with pragmas applied before the schema is created.
pub fn snapshot_with(dir: &Path, name: &str, pragmas: &str, rows: &str) -> PathBuf {
    let path = dir.join(name);
    let conn = Connection::open(&path).unwrap();
    if !pragmas.is_empty() {
        conn.execute_batch(pragmas).unwrap();
    }
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(INFO).unwrap();
    conn.execute_batch(IDENTITIES).unwrap();
    conn.execute_batch(rows).unwrap();
    path
}

pub fn digest(path: &Path) -> String {
    let store = Store::open_read_only(path).unwrap();
    content_hash(&store).unwrap()
}

/// Record the current content digest inside the snapshot, as the producer does.
pub fn store_digest(path: &Path) -> String {
    let hash = digest(path);
    let conn = Connection::open(path).unwrap();
    conn.execute("UPDATE snapshot_info SET snapshot_hash = ?1", [&hash]).unwrap();
    hash
}

pub fn write_content_sidecar(path: &Path, hash: &str) {
    std::fs::write(sidecar::content_sidecar_path(path), format!("# content hash\n{hash}\n")).unwrap();
}

pub fn write_file_sidecar(path: &Path, hash: &str) {
    let name = path.file_name().unwrap().to_string_lossy();
    std::fs::write(sidecar::file_sidecar_path(path), format!("{hash}  {name}\n")).unwrap();
}

pub const TWO_ENTRIES: &str = "
    INSERT INTO entries VALUES ('/a', 'h1', 'file', 100, 420, 1000, 100, 1700000000.5, NULL);
    INSERT INTO entries VALUES ('/b', 'h2', 'file', 200, 420, 1000, 100, 1700000001.25, NULL);";

pub const TWO_ENTRIES_REVERSED: &str = "
    INSERT INTO entries VALUES ('/b', 'h2', 'file', 200, 420, 1000, 100, 1700000001.25, NULL);
    INSERT INTO entries VALUES ('/a', 'h1', 'file', 100, 420, 1000, 100, 1700000000.5, NULL);";
