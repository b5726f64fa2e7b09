use crate::engine::WordProgress;
use crate::store::keys;
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_progress_due_index", m002_progress_due_index),
    ]
}

/// 执行所有未应用的迁移。
///
/// - 每个迁移必须幂等：迁移成功后、写入版本号之前进程可能中断，重启后会重跑。
/// - 版本号在每个迁移成功后立即持久化。
/// - 仅向前，拒绝降级。
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
    match store.config_versions.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("malformed version marker ({} bytes)", raw.len()),
            })?;
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

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Rebuild the due index from the progress rows.
fn m002_progress_due_index(store: &Store) -> Result<(), StoreError> {
    let mut rebuilt = 0u64;
    for item in store.word_progress.iter() {
        let (_, value) = item?;
        let progress: WordProgress = Store::deserialize(&value)?;
        let due_key = keys::due_index_key(
            &progress.user_id,
            progress.next_review_at.timestamp_millis(),
            &progress.word_id,
        )?;
        store.progress_due_index.insert(due_key.as_bytes(), &[])?;
        rebuilt += 1;
    }
    tracing::debug!(rebuilt, "Due index entries rebuilt");

    Ok(())
}
