//! # Resource Subcommands
//!
//! The same six commands for every back-office resource:
//!
//! - `list`: one page, filtered (`--filter status=open`).
//! - `get <id>`: one record as JSON.
//! - `create --json <file|->`: create from a JSON payload.
//! - `update <id> --json <file|->`: replace editable fields.
//! - `delete <id>...`: delete one or more records; stops at the first
//!   failure.
//! - `action <id> <name>`: state-changing action (`close`, `cancel`, ...).
//!
//! Every command passes a strict session guard first.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use expd_client::Resource;
use expd_core::{Identified, ListFilters, RecordId};
use expd_store::ResourceStore;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::AppContext;

/// Arguments for `expd <resource>`.
#[derive(Args, Debug)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

/// Resource subcommands.
#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// List one page of records.
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
        /// Free-text search.
        #[arg(long)]
        search: Option<String>,
        /// Extra filter as `key=value`. Repeatable.
        #[arg(long = "filter")]
        filters: Vec<String>,
    },

    /// Show one record.
    Get { id: RecordId },

    /// Create a record from a JSON payload.
    Create {
        /// Payload file, or `-` for stdin.
        #[arg(long)]
        json: PathBuf,
    },

    /// Update a record from a JSON payload.
    Update {
        id: RecordId,
        /// Payload file, or `-` for stdin.
        #[arg(long)]
        json: PathBuf,
    },

    /// Delete records.
    Delete {
        #[arg(required = true)]
        ids: Vec<RecordId>,
    },

    /// Run a state-changing action on a record.
    Action { id: RecordId, name: String },
}

/// Execute a resource subcommand against `store`.
pub async fn run_resource<R: Resource>(
    ctx: &AppContext,
    store: &ResourceStore<R>,
    args: &ResourceArgs,
) -> Result<u8> {
    if let Some(code) = ctx.require_session(&screen_path::<R>()).await {
        return Ok(code);
    }

    match &args.command {
        ResourceCommand::List {
            page,
            per_page,
            search,
            filters,
        } => {
            let filters = build_filters(*page, *per_page, search.as_deref(), filters)?;
            let items = store.fetch(filters).await?;
            for item in &items {
                println!("{}\t{}", item.id(), item.display_label());
            }
            if let Some(meta) = store.snapshot().meta {
                let last = meta.last_page.unwrap_or(meta.current_page);
                println!("-- page {}/{last}, {} total", meta.current_page, meta.total);
            }
            Ok(0)
        }
        ResourceCommand::Get { id } => match store.fetch_one(*id).await? {
            Some(record) => {
                print_json(&record)?;
                Ok(0)
            }
            None => {
                eprintln!("{} #{id} not found", R::NAME);
                Ok(1)
            }
        },
        ResourceCommand::Create { json } => {
            let payload: R::Create = read_payload(json)?;
            let record = store.create(&payload).await?;
            print_json(&record)?;
            Ok(0)
        }
        ResourceCommand::Update { id, json } => {
            let payload: R::Update = read_payload(json)?;
            let record = store.update(*id, &payload).await?;
            print_json(&record)?;
            Ok(0)
        }
        ResourceCommand::Delete { ids } => {
            let deleted = store.delete_many(ids).await?;
            println!("deleted {deleted} {}(s)", R::NAME);
            Ok(0)
        }
        ResourceCommand::Action { id, name } => {
            let record = store.action(*id, name).await?;
            print_json(&record)?;
            Ok(0)
        }
    }
}

fn screen_path<R: Resource>() -> String {
    format!("/dashboard/{}", R::PATH)
}

fn build_filters(
    page: Option<u32>,
    per_page: Option<u32>,
    search: Option<&str>,
    extra: &[String],
) -> Result<ListFilters> {
    let mut filters = ListFilters::new();
    if let Some(page) = page {
        filters = filters.page(page);
    }
    if let Some(per_page) = per_page {
        filters = filters.per_page(per_page);
    }
    if let Some(term) = search {
        filters = filters.search(term);
    }
    for expr in extra {
        filters.set_expr(expr)?;
    }
    Ok(filters)
}

/// Read a JSON payload from `path`, or stdin when `path` is `-`.
pub fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    if raw.trim().is_empty() {
        bail!("empty payload");
    }
    serde_json::from_str(&raw).context("payload is not valid JSON for this resource")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use expd_client::resources::{VehicleStateInput, VehicleStates};
    use expd_client::{ApiConfig, ExpdClient, MemoryTokenStore};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_context(mock_server: &MockServer, token: Option<&str>) -> AppContext {
        let tokens = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        };
        let config = ApiConfig::local_mock(&mock_server.uri()).unwrap();
        AppContext::new(ExpdClient::new(config, Arc::new(tokens)).unwrap())
    }

    #[test]
    fn filters_from_flags() {
        let filters = build_filters(
            Some(2),
            None,
            Some("peugeot"),
            &["status=open".to_string()],
        )
        .unwrap();
        assert_eq!(filters.get("page"), Some("2"));
        assert_eq!(filters.get("search"), Some("peugeot"));
        assert_eq!(filters.get("status"), Some("open"));
    }

    #[test]
    fn malformed_filter_rejected() {
        assert!(build_filters(None, None, None, &["status".to_string()]).is_err());
    }

    #[test]
    fn payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("state.json");
        std::fs::write(&file, r#"{"code": "NEUF", "label": "Neuf"}"#).unwrap();

        let input: VehicleStateInput = read_payload(&file).unwrap();
        assert_eq!(input.code.as_deref(), Some("NEUF"));
    }

    #[test]
    fn empty_payload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty.json");
        std::fs::write(&file, "  ").unwrap();
        assert!(read_payload::<VehicleStateInput>(&file).is_err());
    }

    #[tokio::test]
    async fn signed_out_list_exits_without_request() {
        let mock_server = MockServer::start().await;
        let ctx = test_context(&mock_server, None);
        let args = ResourceArgs {
            command: ResourceCommand::List {
                page: None,
                per_page: None,
                search: None,
                filters: vec![],
            },
        };

        let code = run_resource(&ctx, &ctx.stores.vehicle_states, &args).await.unwrap();
        assert_eq!(code, crate::EXIT_SIGN_IN);
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn signed_in_list_fetches_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1, "name": "Awa Diop", "email": "awa@example.com"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vehicle-states"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 1, "code": "NEUF", "label": "Neuf"}],
                "links": {},
                "meta": {"current_page": 1, "per_page": 25, "total": 1, "last_page": 1}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let ctx = test_context(&mock_server, Some("tok"));
        let args = ResourceArgs {
            command: ResourceCommand::List {
                page: Some(1),
                per_page: None,
                search: None,
                filters: vec![],
            },
        };

        let code = run_resource::<VehicleStates>(&ctx, &ctx.stores.vehicle_states, &args)
            .await
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(ctx.stores.vehicle_states.items().len(), 1);
        assert!(!ctx.stores.vehicle_states.is_loading());
    }
}
