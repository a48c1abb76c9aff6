//! Extension definitions repository

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use crate::extension::password::{hash_password, new_salt, verify_password};
use crate::extension::{AuthError, Extension, ExtensionContext, ExtensionState};

/// An extension definition as registered by `extension add`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExtension {
    pub id: String,
    pub base_id: String,
    pub state: ExtensionState,
    #[serde(default)]
    pub all_field_ids_to_field_names_in_base: HashMap<String, String>,
    #[serde(default, rename = "fieldIdsToNestedFieldIdsInMiniExtFieldConfigs")]
    pub field_ids_to_nested_field_ids: HashMap<String, Vec<String>>,
    /// Plain-text password; only its salted digest is stored
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

/// Insert or replace an extension
pub async fn save_extension(pool: &SqlitePool, extension: &NewExtension) -> Result<()> {
    let state_json =
        serde_json::to_string(&extension.state).context("Failed to serialize extension state")?;
    let field_names_json = serde_json::to_string(&extension.all_field_ids_to_field_names_in_base)
        .context("Failed to serialize field names")?;
    let nested_json = serde_json::to_string(&extension.field_ids_to_nested_field_ids)
        .context("Failed to serialize nested field IDs")?;

    let (salt, hash) = match extension.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => {
            let salt = new_salt();
            let hash = hash_password(password, &salt);
            (Some(salt), Some(hash))
        }
        None => (None, None),
    };

    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO extensions
            (id, base_id, table_id, state_json, field_names_json, nested_field_ids_json,
             password_salt, password_hash, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            base_id = excluded.base_id,
            table_id = excluded.table_id,
            state_json = excluded.state_json,
            field_names_json = excluded.field_names_json,
            nested_field_ids_json = excluded.nested_field_ids_json,
            password_salt = excluded.password_salt,
            password_hash = excluded.password_hash,
            updated_at = excluded.updated_at",
    )
    .bind(&extension.id)
    .bind(&extension.base_id)
    .bind(&extension.state.table_id)
    .bind(&state_json)
    .bind(&field_names_json)
    .bind(&nested_json)
    .bind(salt)
    .bind(hash)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .context("Failed to save extension")?;

    debug!("Saved extension {}", extension.id);
    Ok(())
}

pub async fn get_extension(pool: &SqlitePool, id: &str) -> Result<Option<Extension>> {
    Ok(get_stored(pool, id).await?.map(|stored| stored.context.extension))
}

pub async fn list_extensions(pool: &SqlitePool) -> Result<Vec<Extension>> {
    let rows = sqlx::query(
        "SELECT id, base_id, state_json, password_hash FROM extensions ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list extensions")?;

    let mut extensions = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.try_get("id")?;
        let state_json: String = row.try_get("state_json")?;
        let password_hash: Option<String> = row.try_get("password_hash")?;
        let state: ExtensionState = serde_json::from_str(&state_json)
            .with_context(|| format!("Corrupt state for extension '{}'", id))?;
        extensions.push(Extension {
            base_id: row.try_get("base_id")?,
            id,
            state,
            password_protected: password_hash.is_some(),
        });
    }

    Ok(extensions)
}

/// Returns whether a row was deleted
pub async fn delete_extension(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM extensions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete extension")?;

    Ok(result.rows_affected() > 0)
}

/// Extension plus field maps, without any password check
pub async fn get_extension_context(pool: &SqlitePool, id: &str) -> Result<ExtensionContext> {
    let stored = get_stored(pool, id)
        .await?
        .ok_or_else(|| AuthError::UnknownExtension(id.to_string()))?;
    Ok(stored.context)
}

/// Load an extension for a handler call, checking its password when it has one
pub async fn fetch_extension_and_verify_password(
    pool: &SqlitePool,
    id: &str,
    password: Option<&str>,
) -> Result<ExtensionContext> {
    let stored = get_stored(pool, id)
        .await?
        .ok_or_else(|| AuthError::UnknownExtension(id.to_string()))?;

    if let (Some(salt), Some(hash)) = (&stored.password_salt, &stored.password_hash) {
        let supplied = password.unwrap_or_default();
        if !verify_password(supplied, salt, hash) {
            warn!("Rejected password for extension {}", id);
            return Err(AuthError::InvalidPassword.into());
        }
    }

    Ok(stored.context)
}

struct StoredExtension {
    context: ExtensionContext,
    password_salt: Option<String>,
    password_hash: Option<String>,
}

async fn get_stored(pool: &SqlitePool, id: &str) -> Result<Option<StoredExtension>> {
    let row = sqlx::query(
        "SELECT id, base_id, state_json, field_names_json, nested_field_ids_json,
                password_salt, password_hash
         FROM extensions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get extension")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let state_json: String = row.try_get("state_json")?;
    let field_names_json: String = row.try_get("field_names_json")?;
    let nested_json: String = row.try_get("nested_field_ids_json")?;
    let password_salt: Option<String> = row.try_get("password_salt")?;
    let password_hash: Option<String> = row.try_get("password_hash")?;

    let extension = Extension {
        id: row.try_get("id")?,
        base_id: row.try_get("base_id")?,
        state: serde_json::from_str(&state_json)
            .with_context(|| format!("Corrupt state for extension '{}'", id))?,
        password_protected: password_hash.is_some(),
    };

    Ok(Some(StoredExtension {
        context: ExtensionContext {
            extension,
            all_field_ids_to_field_names_in_base: serde_json::from_str(&field_names_json)
                .with_context(|| format!("Corrupt field names for extension '{}'", id))?,
            field_ids_to_nested_field_ids: serde_json::from_str(&nested_json)
                .with_context(|| format!("Corrupt nested field IDs for extension '{}'", id))?,
        },
        password_salt,
        password_hash,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::connect_in_memory;
    use crate::extension::FormField;

    fn new_extension(id: &str, password: Option<&str>) -> NewExtension {
        NewExtension {
            id: id.to_string(),
            base_id: "appBase".to_string(),
            state: ExtensionState {
                table_id: "tblMain".to_string(),
                form_fields: vec![FormField {
                    name: "Company".to_string(),
                    field_id: Some("fldLink".to_string()),
                    field_type: None,
                }],
                link_display_overrides: HashMap::new(),
            },
            all_field_ids_to_field_names_in_base: [("fldName".to_string(), "Name".to_string())]
                .into_iter()
                .collect(),
            field_ids_to_nested_field_ids: [("fldLink".to_string(), vec!["fldCity".to_string()])]
                .into_iter()
                .collect(),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_save_get_list_delete() {
        let pool = connect_in_memory().await.unwrap();
        save_extension(&pool, &new_extension("ext-b", None)).await.unwrap();
        save_extension(&pool, &new_extension("ext-a", Some("pw"))).await.unwrap();

        let ext = get_extension(&pool, "ext-b").await.unwrap().unwrap();
        assert_eq!(ext.state.table_id, "tblMain");
        assert!(!ext.password_protected);

        let all = list_extensions(&pool).await.unwrap();
        let ids: Vec<_> = all.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ext-a", "ext-b"]);
        assert!(all[0].password_protected);

        assert!(delete_extension(&pool, "ext-a").await.unwrap());
        assert!(!delete_extension(&pool, "ext-a").await.unwrap());
        assert!(get_extension(&pool, "ext-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let pool = connect_in_memory().await.unwrap();
        save_extension(&pool, &new_extension("ext", None)).await.unwrap();

        let mut updated = new_extension("ext", None);
        updated.state.table_id = "tblOther".to_string();
        save_extension(&pool, &updated).await.unwrap();

        let context = get_extension_context(&pool, "ext").await.unwrap();
        assert_eq!(context.extension.state.table_id, "tblOther");
        assert_eq!(context.all_field_ids_to_field_names_in_base["fldName"], "Name");
        assert_eq!(context.field_ids_to_nested_field_ids["fldLink"], vec!["fldCity"]);
    }

    #[tokio::test]
    async fn test_password_verification() {
        let pool = connect_in_memory().await.unwrap();
        save_extension(&pool, &new_extension("locked", Some("secret"))).await.unwrap();
        save_extension(&pool, &new_extension("open", None)).await.unwrap();

        assert!(
            fetch_extension_and_verify_password(&pool, "locked", Some("secret"))
                .await
                .is_ok()
        );

        for attempt in [Some("wrong"), None] {
            let err = fetch_extension_and_verify_password(&pool, "locked", attempt)
                .await
                .unwrap_err();
            assert_eq!(
                err.downcast_ref::<AuthError>(),
                Some(&AuthError::InvalidPassword)
            );
        }

        assert!(
            fetch_extension_and_verify_password(&pool, "open", None)
                .await
                .is_ok()
        );

        let err = fetch_extension_and_verify_password(&pool, "missing", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::UnknownExtension(_))
        ));
    }
}
