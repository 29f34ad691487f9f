//! Staged resolution of a site analysis.
//!
//! For a catalog site the stages are tried in order:
//!
//! 1. the analysis embedded in the catalog, normalized;
//! 2. the persisted cache;
//! 3. the assessment API, fetched together with live weather.
//!
//! A stage that has nothing usable falls through to the next one without
//! surfacing an error. Only a failed analysis fetch in the last stage is
//! fatal. Live weather is never fatal: the default record stands in.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analysis::model::{AnalysisResult, Location};
use crate::analysis::normalize::{Clock, NormalizationTrace, NormalizeContext, normalize_traced};
use crate::cache::{AnalysisCache, CacheEntry};
use crate::catalog::Site;
use crate::error::ResolveError;
use crate::report::model::DocumentHash;
use crate::source::api::AssessmentApi;
use crate::util::fingerprint::fingerprint;
use crate::weather::LiveWeather;

/// Stage that produced an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Embedded,
    Cache,
    Api,
    /// A document handed to the normalizer directly.
    File,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub analysis: AnalysisResult,
    pub live: LiveWeather,
    pub source: DataSource,
    /// Hash of the document the analysis was built from: the raw document
    /// for embedded and API results, the stored canonical analysis for a
    /// cache hit. The same site can therefore report different hashes
    /// depending on which stage served it.
    pub document: DocumentHash,
    /// Absent for cache hits, which are stored already normalized.
    pub trace: Option<NormalizationTrace>,
    /// Live weather could not be fetched and the default record was used.
    pub weather_fallback: bool,
}

pub struct Resolver<'a, A> {
    api: &'a A,
    cache: Option<&'a AnalysisCache>,
    clock: &'a dyn Clock,
}

impl<'a, A: AssessmentApi> Resolver<'a, A> {
    pub fn new(api: &'a A, clock: &'a dyn Clock) -> Self {
        Self {
            api,
            cache: None,
            clock,
        }
    }

    pub fn with_cache(mut self, cache: &'a AnalysisCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn resolve_site(&self, site: &Site) -> Result<Resolution, ResolveError> {
        let site_id = site.id();

        match site.embedded_analysis() {
            Ok(Some(raw)) => {
                debug!(site_id, "using embedded analysis");
                let (live, weather_fallback) = self.weather_or_default(site.location()).await;
                return Ok(self.normalized(
                    &raw,
                    site.location(),
                    live,
                    weather_fallback,
                    DataSource::Embedded,
                ));
            }
            Ok(None) => debug!(site_id, "no embedded analysis"),
            Err(err) => debug!(site_id, error = %err, "embedded analysis unusable, falling through"),
        }

        if let Some(cache) = self.cache {
            if let Some(entry) = cache.get(site_id) {
                debug!(site_id, cached_at = %entry.cached_at, "cache hit");
                return Ok(Resolution {
                    document: fingerprint(&serde_json::to_value(&entry.analysis).unwrap_or_default()),
                    analysis: entry.analysis,
                    live: entry.live,
                    source: DataSource::Cache,
                    trace: None,
                    weather_fallback: false,
                });
            }
            debug!(site_id, "cache miss");
        }

        let resolution = self.fetch(site.location()).await?;

        if let Some(cache) = self.cache {
            if resolution.weather_fallback {
                debug!(site_id, "not caching analysis with substituted weather");
            } else {
                cache.put(
                    site_id,
                    &CacheEntry {
                        analysis: resolution.analysis.clone(),
                        live: resolution.live.clone(),
                        cached_at: self.clock.now(),
                    },
                );
            }
        }

        Ok(resolution)
    }

    /// Resolves an arbitrary point straight from the API.
    pub async fn resolve_point(&self, at: Location) -> Result<Resolution, ResolveError> {
        self.fetch(at).await
    }

    async fn fetch(&self, at: Location) -> Result<Resolution, ResolveError> {
        info!(lat = at.lat, lon = at.lon, "fetching analysis and live weather");

        let (analysis, (live, weather_fallback)) =
            tokio::join!(self.api.analyze(at), self.weather_or_default(at));
        let raw = analysis.map_err(ResolveError::Analysis)?;

        Ok(self.normalized(&raw, at, live, weather_fallback, DataSource::Api))
    }

    async fn weather_or_default(&self, at: Location) -> (LiveWeather, bool) {
        match self.api.live_weather(at).await {
            Ok(live) => (live, false),
            Err(err) => {
                warn!(error = %err, "live weather unavailable, using default record");
                (LiveWeather::default(), true)
            }
        }
    }

    fn normalized(
        &self,
        raw: &Value,
        at: Location,
        live: LiveWeather,
        weather_fallback: bool,
        source: DataSource,
    ) -> Resolution {
        let ctx = NormalizeContext::new(self.clock).with_location(at);
        let (analysis, trace) = normalize_traced(raw, &ctx);
        Resolution {
            analysis,
            live,
            source,
            document: fingerprint(raw),
            trace: Some(trace),
            weather_fallback,
        }
    }
}
