// File: ./src/storage.rs
// Local file storage for the alarm list.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to the Alarm struct serialization require incrementing
// ALARM_STORAGE_VERSION below.
use crate::context::AppContext;
use crate::model::Alarm;
use crate::store::AlarmStore;
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// Version history:
// - v1: id/hour/minute/enabled/label/repeat_days/vibrate/sound_uri/snooze_minutes
const ALARM_STORAGE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct AlarmStorageData {
    #[serde(default)]
    version: u32,
    alarms: Vec<Alarm>,
}

pub struct AlarmStorage;

impl AlarmStorage {
    /// Sidecar lock file next to `file_path`, e.g. `alarms.json.lock`.
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on the sidecar lock file.
    /// The lock is not reentrant: `f` must not call `load`, `save` or `modify`.
    pub(crate) fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub(crate) fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Loads the alarm list. A missing file is an empty list; an unreadable
    /// or newer-format file is an error so it never gets overwritten blindly.
    pub fn load(ctx: &dyn AppContext) -> Result<Vec<Alarm>> {
        let path = ctx.get_alarms_path()?;
        Self::load_from_path(&path)
    }

    pub fn save(ctx: &dyn AppContext, alarms: &[Alarm]) -> Result<()> {
        let path = ctx.get_alarms_path()?;
        Self::with_lock(&path, || Self::write_unlocked(&path, alarms))
    }

    /// Read-modify-write of the alarm list under a single lock, so changes made
    /// by another process between our load and save are never overwritten.
    /// Nothing is written when `f` fails.
    pub fn modify<F, T>(ctx: &dyn AppContext, f: F) -> Result<T>
    where
        F: FnOnce(&mut AlarmStore) -> Result<T>,
    {
        let path = ctx.get_alarms_path()?;
        Self::with_lock(&path, || {
            let mut store = AlarmStore::from_alarms(Self::read_unlocked(&path)?);
            let result = f(&mut store)?;
            Self::write_unlocked(&path, store.alarms())?;
            Ok(result)
        })
    }

    /// Last modification time of the alarm file, `None` if it does not exist.
    pub fn modified(ctx: &dyn AppContext) -> Result<Option<SystemTime>> {
        let path = ctx.get_alarms_path()?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(Some(meta.modified()?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to stat {:?}", path)),
        }
    }

    fn load_from_path(path: &Path) -> Result<Vec<Alarm>> {
        if !path.exists() {
            return Ok(vec![]);
        }
        Self::with_lock(path, || Self::read_unlocked(path))
    }

    fn read_unlocked(path: &Path) -> Result<Vec<Alarm>> {
        if !path.exists() {
            return Ok(vec![]);
        }
        let json =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let data: AlarmStorageData =
            serde_json::from_str(&json).with_context(|| format!("Failed to parse {:?}", path))?;

        if data.version > ALARM_STORAGE_VERSION {
            anyhow::bail!(
                "{:?} was written by a newer version (v{}, supported v{})",
                path,
                data.version,
                ALARM_STORAGE_VERSION
            );
        }

        let mut alarms = Vec::with_capacity(data.alarms.len());
        for alarm in data.alarms {
            if let Err(e) = Alarm::validate_time(alarm.hour, alarm.minute) {
                log::warn!("Skipping stored alarm {}: {}", alarm.id, e);
                continue;
            }
            alarms.push(alarm);
        }
        log::debug!("Loaded {} alarm(s) from {:?}", alarms.len(), path);
        Ok(alarms)
    }

    fn write_unlocked(path: &Path, alarms: &[Alarm]) -> Result<()> {
        let data = AlarmStorageData {
            version: ALARM_STORAGE_VERSION,
            alarms: alarms.to_vec(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        Self::atomic_write(path, json)?;
        log::debug!("Saved {} alarm(s) to {:?}", alarms.len(), path);
        Ok(())
    }
}
