//! Search URL construction and result harvesting.
use crate::session::{PageLink, SessionDriver};
use anyhow::{Context, Result};
use autoapply_common::model::JobCandidate;
use autoapply_config::{PacingConfig, SelectorCatalog, SiteConfig};
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

/// `{base_url}{search_path}?keywords=..&location=..` plus configured extras.
pub fn search_url(site: &SiteConfig, keywords: &str, location: &str) -> Result<Url> {
    let base = Url::parse(&site.base_url)
        .with_context(|| format!("invalid site.base_url: {}", site.base_url))?;
    let mut url = base
        .join(&site.search_path)
        .with_context(|| format!("invalid site.search_path: {}", site.search_path))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("keywords", keywords);
        query.append_pair("location", location);
        for param in &site.search_params {
            query.append_pair(&param.name, &param.value);
        }
    }
    Ok(url)
}

/// Absolute, query-free URL plus a single-line title. Links without an
/// `href`, or with a non-http(s) target, yield nothing.
pub fn normalize_link(base: &Url, link: &PageLink) -> Option<JobCandidate> {
    let href = link.href.as_deref()?.trim();
    if href.is_empty() {
        return None;
    }
    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);

    let title = link
        .text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|line| !line.is_empty())
        .unwrap_or_else(|| url.to_string());

    Some(JobCandidate::new(title, url.to_string()))
}

/// Normalize, de-duplicate by URL (first occurrence wins) and cap.
pub fn collect_candidates(base: &Url, links: &[PageLink], max: usize) -> Vec<JobCandidate> {
    let mut seen = HashSet::new();
    links
        .iter()
        .filter_map(|link| normalize_link(base, link))
        .filter(|job| seen.insert(job.url.clone()))
        .take(max)
        .collect()
}

/// Load the results page and return candidates in page order.
pub async fn run_search<S>(
    session: &mut S,
    site: &SiteConfig,
    catalog: &SelectorCatalog,
    pacing: &PacingConfig,
    keywords: &str,
    location: &str,
) -> Result<Vec<JobCandidate>>
where
    S: SessionDriver + ?Sized,
{
    let url = search_url(site, keywords, location)?;
    info!(target: "apply.search", %keywords, %location, url = %url, "searching");
    session
        .navigate(url.as_str())
        .await
        .context("failed to open search results")?;
    let settle = pacing.navigation_settle_ms;
    session.pause(settle, settle).await;

    for candidate in &catalog.job_links {
        let links = session.links(candidate).await;
        if links.is_empty() {
            continue;
        }
        let jobs = collect_candidates(&url, &links, site.max_candidates);
        debug!(target: "apply.search", %candidate, links = links.len(), jobs = jobs.len(), "harvested links");
        if !jobs.is_empty() {
            info!(target: "apply.search", found = jobs.len(), "search complete");
            return Ok(jobs);
        }
    }

    info!(target: "apply.search", "no job links found");
    Ok(Vec::new())
}
