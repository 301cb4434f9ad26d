use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Character, CharacterId};

use super::cached::CachedData;
use super::feed::{CharacterFeed, Snapshot, Subscribers};
use super::StoreError;

/// File name of the persisted table inside the cache directory
pub const TABLE_FILE: &str = "characters.json";

/// On-disk shape of the table. `next_id` is kept so ids survive restarts.
#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    next_id: CharacterId,
    rows: Vec<Character>,
}

#[derive(Serialize)]
struct TableFileRef<'a> {
    next_id: CharacterId,
    rows: &'a [Character],
}

struct Table {
    rows: Arc<Vec<Character>>,
    next_id: CharacterId,
    version: u64,
    cached_at: Option<DateTime<Utc>>,
    subscribers: Subscribers,
}

impl Table {
    fn empty() -> Self {
        Self {
            rows: Arc::new(Vec::new()),
            next_id: 1,
            version: 0,
            cached_at: None,
            subscribers: Subscribers::default(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            characters: Arc::clone(&self.rows),
        }
    }
}

/// Keyed table of characters with a change feed.
///
/// All writes take the table lock, persist, and only then commit to memory
/// and publish. A failed write leaves both memory and feed untouched.
pub struct CharacterStore {
    path: Option<PathBuf>,
    table: Mutex<Table>,
}

impl CharacterStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            table: Mutex::new(Table::empty()),
        }
    }

    /// Open (or create) the table file in `cache_dir`.
    pub fn open_in(cache_dir: &Path) -> Result<Self, StoreError> {
        Self::open(cache_dir.join(TABLE_FILE))
    }

    /// Open a file-backed store, loading existing rows if the file exists.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut table = Table::empty();
        if path.exists() {
            let contents =
                fs::read_to_string(&path).map_err(|e| StoreError::from_read(path.clone(), e))?;
            let cached: CachedData<TableFile> =
                serde_json::from_str(&contents).map_err(|e| StoreError::InvalidFormat {
                    path: path.clone(),
                    details: e.to_string(),
                })?;

            let max_id = cached.data.rows.iter().filter_map(|c| c.id).max().unwrap_or(0);
            table.next_id = cached.data.next_id.max(max_id + 1);
            table.rows = Arc::new(cached.data.rows);
            table.cached_at = Some(cached.cached_at);
            info!(path = %path.display(), rows = table.rows.len(), "Loaded character table");
        } else {
            debug!(path = %path.display(), "No character table on disk, starting empty");
        }

        Ok(Self {
            path: Some(path),
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, StoreError> {
        self.table.lock().map_err(|_| StoreError::Poisoned)
    }

    // ===== Reads =====

    pub fn read_all(&self) -> Result<Vec<Character>, StoreError> {
        Ok(self.lock()?.rows.as_ref().clone())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.rows.is_empty())
    }

    /// Current committed version; bumps once per successful mutation.
    pub fn version(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.version)
    }

    /// Row count stamped with the last write time. `None` if never written.
    pub fn freshness(&self) -> Result<Option<CachedData<usize>>, StoreError> {
        let table = self.lock()?;
        Ok(table.cached_at.map(|cached_at| CachedData {
            data: table.rows.len(),
            cached_at,
        }))
    }

    /// Current contents without subscribing.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.lock()?.snapshot())
    }

    /// Subscribe to table changes. The current contents arrive first.
    ///
    /// Each feed has its own unbounded queue. A feed that is held but never
    /// polled keeps every snapshot published after it; dropped feeds are
    /// pruned on the next commit.
    pub fn observe_all(&self) -> Result<CharacterFeed, StoreError> {
        let mut table = self.lock()?;
        let current = table.snapshot();
        let feed = table.subscribers.subscribe(current);
        debug!(subscribers = table.subscribers.len(), "Feed subscriber added");
        Ok(feed)
    }

    // ===== Writes =====

    /// Append records with fresh ids. No deduplication.
    pub fn insert_all(&self, records: Vec<Character>) -> Result<Vec<CharacterId>, StoreError> {
        self.commit("insert", |table| {
            let mut rows = table.rows.as_ref().clone();
            let (ids, next_id) = Self::assign_ids(&mut rows, records, table.next_id);
            (rows, next_id, ids)
        })
    }

    /// Delete every row.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.commit("clear", |table| (Vec::new(), table.next_id, ()))
    }

    /// Clear and insert as one commit: subscribers see only the new set.
    pub fn replace_all(&self, records: Vec<Character>) -> Result<Vec<CharacterId>, StoreError> {
        self.commit("replace", |table| {
            let mut rows = Vec::with_capacity(records.len());
            let (ids, next_id) = Self::assign_ids(&mut rows, records, table.next_id);
            (rows, next_id, ids)
        })
    }

    fn assign_ids(
        rows: &mut Vec<Character>,
        records: Vec<Character>,
        mut next_id: CharacterId,
    ) -> (Vec<CharacterId>, CharacterId) {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            let id = next_id;
            next_id += 1;
            ids.push(id);
            rows.push(record.with_id(id));
        }
        (ids, next_id)
    }

    fn commit<T>(
        &self,
        op: &'static str,
        build: impl FnOnce(&Table) -> (Vec<Character>, CharacterId, T),
    ) -> Result<T, StoreError> {
        let mut table = self.lock()?;
        let (rows, next_id, out) = build(&table);

        let cached = CachedData::new(TableFileRef {
            next_id,
            rows: &rows,
        });
        if let Some(ref path) = self.path {
            Self::persist(path, &cached)?;
        }
        let cached_at = cached.cached_at;

        table.rows = Arc::new(rows);
        table.next_id = next_id;
        table.version += 1;
        table.cached_at = Some(cached_at);

        let snapshot = table.snapshot();
        table.subscribers.publish(&snapshot);
        debug!(op, version = snapshot.version, rows = snapshot.len(), "Character table committed");
        Ok(out)
    }

    fn persist(path: &Path, cached: &CachedData<TableFileRef<'_>>) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(cached)?;
        atomic_write(path, &contents)
    }
}

/// Write to a sibling temp file, sync, then rename over the target.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let temp_path = path.with_extension("json.tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StoreError::from_write(temp_path.clone(), e))?;
    file.write_all(data)
        .map_err(|e| StoreError::from_write(temp_path.clone(), e))?;
    file.sync_all()
        .map_err(|e| StoreError::from_write(temp_path.clone(), e))?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicRename {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================
