//! Fetch orchestration
//!
//! Drives a run: resolves the Pokémon list, then for each entry resolves the
//! detail record and (when the sprite column is requested) the sprite, builds the
//! report row and records progress. Every lookup goes through the same
//! cache-or-fetch helper, so the cache policy lives in one place.

use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{BinaryCodec, CacheCodec, CacheError, CacheKey, CacheManager, JsonCodec};
use crate::data::{ApiError, PokeApi, PokemonDetail, PokemonList, PokemonListEntry};
use crate::fields::{extract, Field, OutputRow};
use crate::progress::{Progress, Source};
use crate::report::{ReportError, ReportWriter};

/// Extension used when the sprite URL has none
const DEFAULT_SPRITE_EXTENSION: &str = "png";

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Report(#[from] ReportError),

    /// A failure while processing one Pokémon
    #[error("Failed to process {name}: {source}")]
    Pokemon {
        name: String,
        #[source]
        source: Box<FetchError>,
    },
}

/// What to fetch and how
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Report columns, validated and deduplicated
    pub fields: Vec<Field>,
    /// Skip cache reads and always fetch (results are still written back)
    pub force_refresh: bool,
    /// Process only the first N list entries
    pub limit: Option<usize>,
    /// Download sprites and report local paths instead of remote URLs
    pub download_images: bool,
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Entries processed after applying the limit
    pub total: usize,
    /// Rows added to the report
    pub rows: usize,
    /// Lookups answered by the API
    pub network_requests: usize,
    /// Lookups answered by the cache
    pub cache_hits: usize,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl RunSummary {
    fn record(&mut self, source: Source) {
        match source {
            Source::Cache => self.cache_hits += 1,
            Source::Network => self.network_requests += 1,
        }
    }
}

/// A value together with where it came from
#[derive(Debug)]
struct Resolved<T> {
    value: T,
    source: Source,
}

/// Resolves list, detail and sprite data through the cache
pub struct Fetcher<A> {
    api: A,
    cache: CacheManager,
    options: FetchOptions,
}

impl<A: PokeApi> Fetcher<A> {
    /// Creates a fetcher from its collaborators
    pub fn new(api: A, cache: CacheManager, options: FetchOptions) -> Self {
        Self {
            api,
            cache,
            options,
        }
    }

    /// The API client
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Runs the whole fetch, pushing one row per Pokémon into `report`
    ///
    /// Rows arrive in list order. The first error aborts the run; cache entries
    /// written before it are kept.
    pub async fn run(&self, report: &mut ReportWriter) -> Result<RunSummary, FetchError> {
        let started = Instant::now();
        let mut summary = RunSummary::default();

        let list = self.resolve_list(&mut summary).await?;
        let entries = apply_limit(list.entries, self.options.limit);
        summary.total = entries.len();
        info!("Found {} Pokémon to process", entries.len());

        let mut progress = Progress::new(entries.len());
        for entry in &entries {
            let (row, source) = self
                .process_entry(entry, &mut summary)
                .await
                .map_err(|e| FetchError::Pokemon {
                    name: entry.name.clone(),
                    source: Box::new(e),
                })?;
            report.push(row);
            summary.rows += 1;
            progress.advance(&entry.name, source);
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    /// Resolves the Pokémon list
    async fn resolve_list(&self, summary: &mut RunSummary) -> Result<PokemonList, FetchError> {
        let resolved = self
            .resolve::<JsonCodec<PokemonList>, _, _>(&CacheKey::PokemonList, move || async move {
                info!("Fetching complete Pokémon list from the API");
                self.api.fetch_list().await.map(PokemonList::from)
            })
            .await?;
        summary.record(resolved.source);

        let list = resolved.value;
        match (resolved.source, list.cached_at) {
            (Source::Cache, Some(cached_at)) => {
                info!("Loaded Pokémon list from cache (created on {})", cached_at)
            }
            (Source::Cache, None) => info!("Loaded Pokémon list from cache"),
            (Source::Network, _) => info!(
                "Cached Pokémon list to {}",
                self.cache.path(&CacheKey::PokemonList).display()
            ),
        }
        Ok(list)
    }

    /// Builds the report row for one entry
    ///
    /// The returned source is `Network` if any lookup for this entry hit the API.
    async fn process_entry(
        &self,
        entry: &PokemonListEntry,
        summary: &mut RunSummary,
    ) -> Result<(OutputRow, Source), FetchError> {
        let requests_before = summary.network_requests;

        let detail = self
            .resolve::<JsonCodec<PokemonDetail>, _, _>(&CacheKey::detail(&entry.name), move || {
                debug!("Fetching details for {} from API", entry.name);
                self.api.fetch_detail(&entry.detail_url)
            })
            .await?;
        summary.record(detail.source);
        let detail = detail.value;

        let sprite = if self.options.fields.contains(&Field::Sprite) {
            self.resolve_sprite(&entry.name, &detail, summary).await?
        } else {
            None
        };

        let row = extract(&detail, &self.options.fields, sprite.as_deref());
        let source = if summary.network_requests > requests_before {
            Source::Network
        } else {
            Source::Cache
        };
        Ok((row, source))
    }

    /// Resolves the sprite column value
    ///
    /// Returns the remote URL when downloads are off, otherwise the local path of
    /// the cached image. `None` when the Pokémon has no sprite.
    async fn resolve_sprite(
        &self,
        name: &str,
        detail: &PokemonDetail,
        summary: &mut RunSummary,
    ) -> Result<Option<String>, FetchError> {
        let Some(url) = detail.sprite_url.as_deref() else {
            debug!("No sprite for {}", name);
            return Ok(None);
        };

        if !self.options.download_images {
            return Ok(Some(url.to_string()));
        }

        let key = CacheKey::sprite(name, sprite_extension(url));
        let resolved = self
            .resolve::<BinaryCodec, _, _>(&key, move || {
                debug!("Downloading sprite for {}", name);
                self.api.fetch_image(url)
            })
            .await?;
        summary.record(resolved.source);

        Ok(Some(self.cache.path(&key).display().to_string()))
    }

    /// Returns the cached value for `key`, or fetches and caches it
    ///
    /// With `force_refresh` the cache is never read, but the fetched value is
    /// still written back.
    async fn resolve<C, F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<Resolved<C::Value>, FetchError>
    where
        C: CacheCodec,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C::Value, ApiError>>,
    {
        if !self.options.force_refresh && self.cache.has(key) {
            let value = self.cache.read::<C>(key)?;
            return Ok(Resolved {
                value,
                source: Source::Cache,
            });
        }

        let value = fetch().await?;
        let path = self.cache.write::<C>(key, &value)?;
        debug!(path = %path.display(), "Cached");

        Ok(Resolved {
            value,
            source: Source::Network,
        })
    }
}

/// Keeps the first `limit` entries, preserving order
pub fn apply_limit(mut entries: Vec<PokemonListEntry>, limit: Option<usize>) -> Vec<PokemonListEntry> {
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

/// File extension for a sprite URL
///
/// Uses the extension of the last path segment (ignoring query and fragment) when
/// it is short and alphanumeric, otherwise `png`.
pub fn sprite_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);

    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => DEFAULT_SPRITE_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<PokemonListEntry> {
        names
            .iter()
            .map(|n| PokemonListEntry {
                name: n.to_string(),
                detail_url: format!("https://pokeapi.co/api/v2/pokemon/{}/", n),
            })
            .collect()
    }

    #[test]
    fn test_apply_limit_keeps_leading_entries() {
        let limited = apply_limit(entries(&["a", "b", "c"]), Some(2));
        let names: Vec<_> = limited.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_apply_limit_larger_than_list() {
        assert_eq!(apply_limit(entries(&["a", "b"]), Some(10)).len(), 2);
        assert_eq!(apply_limit(entries(&["a", "b"]), None).len(), 2);
        assert!(apply_limit(entries(&["a"]), Some(0)).is_empty());
    }

    #[test]
    fn test_sprite_extension_from_url() {
        assert_eq!(
            sprite_extension("https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/1.png"),
            "png"
        );
        assert_eq!(sprite_extension("https://example.test/sprites/25.GIF?size=2"), "gif");
        assert_eq!(sprite_extension("https://example.test/a.b/sprite"), "png");
        assert_eq!(sprite_extension("https://example.test/.hidden"), "png");
        assert_eq!(sprite_extension("https://example.test/img.toolongext"), "png");
    }

    #[test]
    fn test_summary_records_sources() {
        let mut summary = RunSummary::default();
        summary.record(Source::Cache);
        summary.record(Source::Network);
        summary.record(Source::Network);

        assert_eq!(summary.cache_hits, 1);
        assert_eq!(summary.network_requests, 2);
    }
}
