use crate::engine::ProgressData;
use crate::store::keys::{PROGRESS_KEY, VERSION_KEY};
use crate::store::{Store, StoreError};

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_canonical_progress_blob", m002_canonical_progress_blob),
    ]
}

/// 执行所有未应用的数据库迁移。
///
/// - 每个迁移必须幂等：进程可能在迁移成功后、写入版本号前中断。
/// - 版本号在每个迁移成功后立即持久化。
/// - 仅向前：set_version 拒绝降级。
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.meta.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().unwrap_or([0; 4]);
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store.meta.insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// 将旧字段名的进度数据改写为当前字段名。
/// 无法解析的数据保持原样，由加载逻辑重置。
fn m002_canonical_progress_blob(store: &Store) -> Result<(), StoreError> {
    let Some(raw) = store.progress.get(PROGRESS_KEY.as_bytes())? else {
        return Ok(());
    };

    match ProgressData::from_json(&raw) {
        Ok(progress) => {
            store.save_progress(&progress)?;
            tracing::info!(
                words = progress.mastery.len(),
                sessions = progress.total_sessions,
                "Progress blob rewritten"
            );
        }
        Err(e) => tracing::warn!(error = %e, "Progress blob left untouched by migration"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn migration_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db");
        let store = Store::open(path.to_str().unwrap()).unwrap();

        run(&store).unwrap();
        let first = get_current_version(&store).unwrap();
        run(&store).unwrap();
        let second = get_current_version(&store).unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 2);
    }

    #[test]
    fn downgrade_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db2");
        let store = Store::open(path.to_str().unwrap()).unwrap();

        set_version(&store, 3).unwrap();
        let err = set_version(&store, 2).unwrap_err();
        assert!(matches!(err, StoreError::Migration { .. }));
    }

    #[test]
    fn legacy_blob_is_rewritten_with_current_names() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db3").to_str().unwrap()).unwrap();
        store
            .put_raw_progress(br#"{"totalTests": 1, "recentlyWrongWords": ["dog"]}"#)
            .unwrap();

        run(&store).unwrap();

        let raw = store.progress.get(PROGRESS_KEY.as_bytes()).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json["totalSessions"], 1);
        assert_eq!(json["weaknessList"][0], "dog");
        assert!(json.get("recentlyWrongWords").is_none());
    }
}
