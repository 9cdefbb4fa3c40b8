//! Base catalog management
//!
//! CRUD for providers, lines, domains, streams and stream paths. Inputs are
//! trimmed and validated here, and every successful mutation triggers a full
//! endpoint regeneration on the calling task so the derived set never lags
//! behind the catalog.

use std::sync::Arc;

use tracing::{error, info};

use crate::database::repositories::CatalogSeaOrmRepository;
use crate::errors::{AppError, AppResult, RepositoryError};
use crate::models::{
    Domain, DomainRequest, Line, LineRequest, Provider, ProviderRequest, Stream, StreamPath,
    StreamPathRequest, StreamRequest,
};
use crate::services::endpoint_generation::RegenerationController;

const MAX_NAME_LEN: usize = 255;
const MAX_CODE_LEN: usize = 100;
const MAX_PATH_LEN: usize = 500;

/// Trim `value` and require it to be non-empty and at most `max` characters
fn required_text(field: &str, value: &str, max: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn provider_code(value: &str) -> AppResult<String> {
    let code = required_text("code", value, MAX_CODE_LEN)?;
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
    if !code.chars().all(allowed) {
        return Err(AppError::validation(
            "code may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(code)
}

fn normalize_provider(request: ProviderRequest) -> AppResult<ProviderRequest> {
    Ok(ProviderRequest {
        name: required_text("name", &request.name, MAX_NAME_LEN)?,
        code: provider_code(&request.code)?,
    })
}

fn normalize_line(request: LineRequest) -> AppResult<LineRequest> {
    Ok(LineRequest {
        provider_id: request.provider_id,
        name: required_text("name", &request.name, MAX_NAME_LEN)?,
        code: required_text("code", &request.code, MAX_CODE_LEN)?,
        display_name: required_text("display_name", &request.display_name, MAX_NAME_LEN)?,
    })
}

fn normalize_domain(request: DomainRequest) -> AppResult<DomainRequest> {
    Ok(DomainRequest {
        name: required_text("name", &request.name, MAX_NAME_LEN)?,
    })
}

fn normalize_stream(request: StreamRequest) -> AppResult<StreamRequest> {
    Ok(StreamRequest {
        name: required_text("name", &request.name, MAX_NAME_LEN)?,
        code: required_text("code", &request.code, MAX_CODE_LEN)?,
        provider_id: request.provider_id,
    })
}

fn normalize_stream_path(request: StreamPathRequest) -> AppResult<StreamPathRequest> {
    Ok(StreamPathRequest {
        stream_id: request.stream_id,
        table_id: required_text("table_id", &request.table_id, MAX_NAME_LEN)?,
        full_path: required_text("full_path", &request.full_path, MAX_PATH_LEN)?,
    })
}

fn lift(resource: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |err| AppError::from_repository(resource, err)
}

/// Business logic over the base catalog
pub struct CatalogService {
    repositories: CatalogSeaOrmRepository,
    regeneration: Arc<RegenerationController>,
}

impl CatalogService {
    pub fn new(
        repositories: CatalogSeaOrmRepository,
        regeneration: Arc<RegenerationController>,
    ) -> Self {
        Self {
            repositories,
            regeneration,
        }
    }

    /// Regenerate after a catalog mutation. The mutation is already committed,
    /// so a failed pass is logged and left for the next one.
    async fn refresh(&self, cause: &str) {
        match self.regeneration.regenerate_all().await {
            Ok(report) => info!(
                cause,
                generated = report.generated,
                failures = report.failures.len(),
                "Endpoints regenerated after catalog change"
            ),
            Err(e) => error!(cause, "Endpoint regeneration after catalog change failed: {}", e),
        }
    }

    async fn require_provider(&self, id: i32) -> AppResult<Provider> {
        self.repositories
            .providers
            .find_by_id(id)
            .await
            .map_err(lift("provider"))?
            .ok_or_else(|| AppError::not_found("provider", id))
    }

    async fn require_stream(&self, id: i32) -> AppResult<Stream> {
        self.repositories
            .streams
            .find_by_id(id)
            .await
            .map_err(lift("stream"))?
            .ok_or_else(|| AppError::not_found("stream", id))
    }

    // Providers

    pub async fn list_providers(&self) -> AppResult<Vec<Provider>> {
        self.repositories
            .providers
            .find_all()
            .await
            .map_err(lift("provider"))
    }

    pub async fn get_provider(&self, id: i32) -> AppResult<Provider> {
        self.require_provider(id).await
    }

    pub async fn create_provider(&self, request: ProviderRequest) -> AppResult<Provider> {
        let request = normalize_provider(request)?;
        let provider = self
            .repositories
            .providers
            .create(request)
            .await
            .map_err(lift("provider"))?;
        info!(id = provider.id, code = %provider.code, "Created provider");
        self.refresh("provider created").await;
        Ok(provider)
    }

    pub async fn update_provider(&self, id: i32, request: ProviderRequest) -> AppResult<Provider> {
        let request = normalize_provider(request)?;
        let provider = self
            .repositories
            .providers
            .update(id, request)
            .await
            .map_err(lift("provider"))?;
        info!(id, "Updated provider");
        self.refresh("provider updated").await;
        Ok(provider)
    }

    /// Delete a provider and its lines. Refused while streams are scoped to it.
    pub async fn delete_provider(&self, id: i32) -> AppResult<()> {
        self.require_provider(id).await?;
        let scoped = self
            .repositories
            .providers
            .count_scoped_streams(id)
            .await
            .map_err(lift("provider"))?;
        if scoped > 0 {
            return Err(AppError::conflict(
                "provider",
                format!("provider {id} still scopes {scoped} stream(s)"),
            ));
        }

        self.repositories
            .providers
            .delete(id)
            .await
            .map_err(lift("provider"))?;
        info!(id, "Deleted provider");
        self.refresh("provider deleted").await;
        Ok(())
    }

    // Lines

    /// List lines, optionally only those of one provider
    pub async fn list_lines(&self, provider_id: Option<i32>) -> AppResult<Vec<Line>> {
        let lines = match provider_id {
            Some(provider_id) => self.repositories.lines.find_by_provider(provider_id).await,
            None => self.repositories.lines.find_all().await,
        };
        lines.map_err(lift("line"))
    }

    pub async fn get_line(&self, id: i32) -> AppResult<Line> {
        self.repositories
            .lines
            .find_by_id(id)
            .await
            .map_err(lift("line"))?
            .ok_or_else(|| AppError::not_found("line", id))
    }

    pub async fn create_line(&self, request: LineRequest) -> AppResult<Line> {
        let request = normalize_line(request)?;
        self.require_provider(request.provider_id).await?;
        let line = self
            .repositories
            .lines
            .create(request)
            .await
            .map_err(lift("line"))?;
        info!(id = line.id, provider_id = line.provider_id, "Created line");
        self.refresh("line created").await;
        Ok(line)
    }

    pub async fn update_line(&self, id: i32, request: LineRequest) -> AppResult<Line> {
        let request = normalize_line(request)?;
        self.require_provider(request.provider_id).await?;
        let line = self
            .repositories
            .lines
            .update(id, request)
            .await
            .map_err(lift("line"))?;
        info!(id, "Updated line");
        self.refresh("line updated").await;
        Ok(line)
    }

    pub async fn delete_line(&self, id: i32) -> AppResult<()> {
        self.repositories
            .lines
            .delete(id)
            .await
            .map_err(lift("line"))?;
        info!(id, "Deleted line");
        self.refresh("line deleted").await;
        Ok(())
    }

    // Domains

    pub async fn list_domains(&self) -> AppResult<Vec<Domain>> {
        self.repositories
            .domains
            .find_all()
            .await
            .map_err(lift("domain"))
    }

    pub async fn get_domain(&self, id: i32) -> AppResult<Domain> {
        self.repositories
            .domains
            .find_by_id(id)
            .await
            .map_err(lift("domain"))?
            .ok_or_else(|| AppError::not_found("domain", id))
    }

    pub async fn create_domain(&self, request: DomainRequest) -> AppResult<Domain> {
        let request = normalize_domain(request)?;
        let domain = self
            .repositories
            .domains
            .create(request)
            .await
            .map_err(lift("domain"))?;
        info!(id = domain.id, name = %domain.name, "Created domain");
        self.refresh("domain created").await;
        Ok(domain)
    }

    pub async fn update_domain(&self, id: i32, request: DomainRequest) -> AppResult<Domain> {
        let request = normalize_domain(request)?;
        let domain = self
            .repositories
            .domains
            .update(id, request)
            .await
            .map_err(lift("domain"))?;
        info!(id, "Updated domain");
        self.refresh("domain updated").await;
        Ok(domain)
    }

    pub async fn delete_domain(&self, id: i32) -> AppResult<()> {
        self.repositories
            .domains
            .delete(id)
            .await
            .map_err(lift("domain"))?;
        info!(id, "Deleted domain");
        self.refresh("domain deleted").await;
        Ok(())
    }

    // Streams

    pub async fn list_streams(&self) -> AppResult<Vec<Stream>> {
        self.repositories
            .streams
            .find_all()
            .await
            .map_err(lift("stream"))
    }

    pub async fn get_stream(&self, id: i32) -> AppResult<Stream> {
        self.require_stream(id).await
    }

    pub async fn create_stream(&self, request: StreamRequest) -> AppResult<Stream> {
        let request = normalize_stream(request)?;
        if let Some(provider_id) = request.provider_id {
            self.require_provider(provider_id).await?;
        }
        let stream = self
            .repositories
            .streams
            .create(request)
            .await
            .map_err(lift("stream"))?;
        info!(id = stream.id, code = %stream.code, "Created stream");
        self.refresh("stream created").await;
        Ok(stream)
    }

    pub async fn update_stream(&self, id: i32, request: StreamRequest) -> AppResult<Stream> {
        let request = normalize_stream(request)?;
        if let Some(provider_id) = request.provider_id {
            self.require_provider(provider_id).await?;
        }
        let stream = self
            .repositories
            .streams
            .update(id, request)
            .await
            .map_err(lift("stream"))?;
        info!(id, "Updated stream");
        self.refresh("stream updated").await;
        Ok(stream)
    }

    pub async fn delete_stream(&self, id: i32) -> AppResult<()> {
        self.repositories
            .streams
            .delete(id)
            .await
            .map_err(lift("stream"))?;
        info!(id, "Deleted stream");
        self.refresh("stream deleted").await;
        Ok(())
    }

    // Stream paths

    pub async fn list_stream_paths(&self) -> AppResult<Vec<StreamPath>> {
        self.repositories
            .stream_paths
            .find_all()
            .await
            .map_err(lift("stream path"))
    }

    pub async fn get_stream_path(&self, id: i32) -> AppResult<StreamPath> {
        self.repositories
            .stream_paths
            .find_by_id(id)
            .await
            .map_err(lift("stream path"))?
            .ok_or_else(|| AppError::not_found("stream path", id))
    }

    pub async fn create_stream_path(&self, request: StreamPathRequest) -> AppResult<StreamPath> {
        let request = normalize_stream_path(request)?;
        self.require_stream(request.stream_id).await?;
        self.ensure_table_id_free(&request.table_id, None).await?;
        let path = self
            .repositories
            .stream_paths
            .create(request)
            .await
            .map_err(lift("stream path"))?;
        info!(id = path.id, table_id = %path.table_id, "Created stream path");
        self.refresh("stream path created").await;
        Ok(path)
    }

    pub async fn update_stream_path(
        &self,
        id: i32,
        request: StreamPathRequest,
    ) -> AppResult<StreamPath> {
        let request = normalize_stream_path(request)?;
        self.require_stream(request.stream_id).await?;
        self.ensure_table_id_free(&request.table_id, Some(id)).await?;
        let path = self
            .repositories
            .stream_paths
            .update(id, request)
            .await
            .map_err(lift("stream path"))?;
        info!(id, "Updated stream path");
        self.refresh("stream path updated").await;
        Ok(path)
    }

    pub async fn delete_stream_path(&self, id: i32) -> AppResult<()> {
        self.repositories
            .stream_paths
            .delete(id)
            .await
            .map_err(lift("stream path"))?;
        info!(id, "Deleted stream path");
        self.refresh("stream path deleted").await;
        Ok(())
    }

    async fn ensure_table_id_free(&self, table_id: &str, current: Option<i32>) -> AppResult<()> {
        let holder = self
            .repositories
            .stream_paths
            .find_by_table_id(table_id)
            .await
            .map_err(lift("stream path"))?;
        match holder {
            Some(path) if Some(path.id) != current => Err(AppError::conflict(
                "stream path",
                format!("table_id '{table_id}' is already used by stream path {}", path.id),
            )),
            _ => Ok(()),
        }
    }
}
