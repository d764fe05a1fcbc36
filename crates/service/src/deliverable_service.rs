//! Deliverable operations: the file-and-comments record attached to a demand.
//!
//! Object storage itself is out of scope; this layer keeps the storage key
//! and file name metadata plus the comment thread.

use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use models::deliverable::{self, DeliverablePatch};

use crate::errors::ServiceError;

/// Storage keys allow only `[a-zA-Z0-9._-]`; whitespace turns into dashes
/// and anything else is dropped. Falls back to "audio" for empty bases.
pub fn safe_storage_file_name(original: &str) -> String {
    let (base, ext) = match original.rfind('.') {
        Some(idx) => (&original[..idx], original[idx..].to_lowercase()),
        None => (original, String::new()),
    };
    let mut safe = String::with_capacity(base.len());
    let mut last_dash = false;
    for ch in base.chars() {
        if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
            safe.push(ch);
            last_dash = false;
        } else if ch.is_whitespace() || ch == '-' {
            if !last_dash && !safe.is_empty() {
                safe.push('-');
                last_dash = true;
            }
        }
        // Everything else (accents, slashes, symbols) is dropped
    }
    let safe = safe.trim_matches('-').to_string();
    let base = if safe.is_empty() { "audio".to_string() } else { safe };
    format!("{}{}", base, ext)
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<deliverable::Model>, ServiceError> {
    Ok(deliverable::list_all(db).await?)
}

pub async fn get_for_demand(db: &DatabaseConnection, demand_id: Uuid) -> Result<Option<deliverable::Model>, ServiceError> {
    Ok(deliverable::find_by_demand(db, demand_id).await?)
}

/// Upsert the deliverable for a demand. The storage key is derived from the
/// sanitized file name; omitted fields keep their stored values.
#[instrument(skip(db, file_name, comments), fields(demand = %demand_id, user = %uploaded_by))]
pub async fn upsert_for_demand(
    db: &DatabaseConnection,
    demand_id: Uuid,
    uploaded_by: Uuid,
    file_name: Option<String>,
    comments: Option<String>,
) -> Result<deliverable::Model, ServiceError> {
    let demand = models::demand::Entity::find_by_id(demand_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if demand.is_none() {
        return Err(ServiceError::not_found("demand"));
    }

    let storage_path = file_name
        .as_deref()
        .map(|name| format!("{}/{}", demand_id, safe_storage_file_name(name)));
    let patch = DeliverablePatch { storage_path, file_name, comments };
    let saved = deliverable::upsert(db, demand_id, patch, uploaded_by).await?;
    info!(id = %saved.id, "deliverable_upserted");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::safe_storage_file_name;

    #[test]
    fn spaces_become_dashes() {
        assert_eq!(safe_storage_file_name("meu beat final.wav"), "meu-beat-final.wav");
    }

    #[test]
    fn symbols_are_dropped_and_extension_lowercased() {
        assert_eq!(safe_storage_file_name("mix (v2)!.WAV"), "mix-v2.wav");
    }

    #[test]
    fn runs_of_separators_collapse() {
        assert_eq!(safe_storage_file_name("a  --  b.mp3"), "a-b.mp3");
    }

    #[test]
    fn empty_base_falls_back() {
        assert_eq!(safe_storage_file_name("????.ogg"), "audio.ogg");
        assert_eq!(safe_storage_file_name(""), "audio");
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(safe_storage_file_name("beat_01.flac"), "beat_01.flac");
    }
}
