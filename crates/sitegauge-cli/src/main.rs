use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sitegauge_core::cache::AnalysisCache;
use sitegauge_core::catalog::{Catalog, SITE_SNAP_TOLERANCE_DEG};
use sitegauge_core::report::model::{SiteReport, ToolInfo};
use sitegauge_core::report::render;
use sitegauge_core::source::api::HttpApi;
use sitegauge_core::source::pipeline::Resolver;
use sitegauge_core::util::fingerprint::fingerprint;
use sitegauge_core::{Clock, FixedClock, Location, NormalizeContext, SystemClock, normalize_traced};

mod args;

use args::{Command, OutputArgs, OutputFormat, RemoteArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let args = args::Args::parse();
    init_logging(args.verbose);

    let tool = ToolInfo {
        name: sitegauge_core::TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    match args.command {
        Command::Normalize { input, now, output } => {
            let raw = read_document(&input)?;
            let clock: Box<dyn Clock> = match now {
                Some(ts) => Box::new(FixedClock(ts)),
                None => Box::new(SystemClock),
            };
            let (analysis, trace) = normalize_traced(&raw, &NormalizeContext::new(clock.as_ref()));
            debug!(shape = ?trace.shape(), defaulted = trace.defaulted().len(), "normalized");

            let rendered = match output.format {
                OutputFormat::Json => serde_json::to_string_pretty(&analysis)?,
                OutputFormat::Text => render::render_text(&SiteReport::from_document(
                    tool,
                    analysis,
                    &trace,
                    fingerprint(&raw),
                )),
            };
            emit(&output, &rendered)
        }

        Command::Site {
            id,
            catalog,
            remote,
            output,
        } => {
            let catalog = Catalog::load(&catalog)?;
            let site = catalog.get(&id)?;
            let api = http_api(&remote)?;
            let cache = open_cache(&remote);
            let clock = SystemClock;

            let mut resolver = Resolver::new(&api, &clock);
            if let Some(cache) = &cache {
                resolver = resolver.with_cache(cache);
            }
            let resolution = resolver
                .resolve_site(site)
                .await
                .with_context(|| format!("resolving site `{id}`"))?;

            let report = SiteReport::from_resolution(tool, Some(site.info.clone()), resolution);
            emit_report(&output, &report)
        }

        Command::Point {
            lat,
            lon,
            catalog,
            remote,
            output,
        } => {
            let at = Location::new(lat, lon);
            let catalog = catalog.as_deref().map(Catalog::load).transpose()?;
            let api = http_api(&remote)?;
            let cache = open_cache(&remote);
            let clock = SystemClock;

            let mut resolver = Resolver::new(&api, &clock);
            if let Some(cache) = &cache {
                resolver = resolver.with_cache(cache);
            }

            let snapped = catalog
                .as_ref()
                .and_then(|c| c.nearest(at, SITE_SNAP_TOLERANCE_DEG));
            let report = match snapped {
                Some(site) => {
                    info!(site_id = site.id(), "point snapped to catalog site");
                    let resolution = resolver
                        .resolve_site(site)
                        .await
                        .with_context(|| format!("resolving site `{}`", site.id()))?;
                    SiteReport::from_resolution(tool, Some(site.info.clone()), resolution)
                }
                None => {
                    let resolution = resolver
                        .resolve_point(at)
                        .await
                        .with_context(|| format!("assessing point {lat}, {lon}"))?;
                    SiteReport::from_resolution(tool, None, resolution)
                }
            };
            emit_report(&output, &report)
        }

        Command::Catalog { catalog, format } => {
            let catalog = Catalog::load(&catalog)?;
            let rendered = match format {
                OutputFormat::Json => {
                    let infos: Vec<_> = catalog.sites().iter().map(|s| &s.info).collect();
                    serde_json::to_string_pretty(&infos)?
                }
                OutputFormat::Text => {
                    let mut out = String::new();
                    for site in catalog.sites() {
                        let loc = site.location();
                        out.push_str(&format!(
                            "{}\t{}\t{}\t{:.4},{:.4}\t{}\n",
                            site.id(),
                            site.info.name,
                            site.info.city.as_deref().unwrap_or("-"),
                            loc.lat,
                            loc.lon,
                            if site.has_embedded_analysis() {
                                "embedded"
                            } else {
                                "api"
                            }
                        ));
                    }
                    out
                }
            };
            print!("{rendered}");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_document(input: &Path) -> Result<Value> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading analysis from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("reading {}", input.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", input.display()))
}

fn http_api(remote: &RemoteArgs) -> Result<HttpApi> {
    let timeout = remote.timeout.map(Duration::from_secs);
    Ok(HttpApi::new(&remote.api_url, timeout)?)
}

fn open_cache(remote: &RemoteArgs) -> Option<AnalysisCache> {
    (!remote.no_cache).then(|| AnalysisCache::new(&remote.cache_dir))
}

fn emit_report(output: &OutputArgs, report: &SiteReport) -> Result<()> {
    let rendered = match output.format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Text => render::render_text(report),
    };
    emit(output, &rendered)
}

fn emit(output: &OutputArgs, rendered: &str) -> Result<()> {
    match &output.out {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
