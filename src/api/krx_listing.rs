use async_trait::async_trait;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::Path;
use tracing::{info, warn};

use super::ListingSource;
use crate::error::{DashboardError, Result};
use crate::models::Listing;

pub const KIND_LISTING_URL: &str = "http://kind.krx.co.kr/corpgeneral/corpList.do?method=download";

const NAME_COLUMN: &str = "회사명";
const CODE_COLUMN: &str = "종목코드";
const MAX_SUGGESTIONS: usize = 3;

/// Company name to ticker code table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingTable {
    entries: Vec<Listing>,
}

impl ListingTable {
    pub fn new(entries: Vec<Listing>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Listing] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact display-name lookup.
    ///
    /// Several entries with the same name but different codes are reported as
    /// `AmbiguousTicker` rather than silently taking the first one.
    pub fn resolve_ticker(&self, company_name: &str) -> Result<String> {
        let mut codes: Vec<&str> = self
            .entries
            .iter()
            .filter(|entry| entry.name == company_name)
            .map(|entry| entry.code.as_str())
            .collect();
        codes.sort_unstable();
        codes.dedup();

        match codes.as_slice() {
            [] => Err(DashboardError::TickerNotFound {
                name: company_name.to_string(),
                suggestions: self.suggest(company_name),
            }),
            [code] => Ok((*code).to_string()),
            _ => Err(DashboardError::AmbiguousTicker {
                name: company_name.to_string(),
                codes: codes.into_iter().map(str::to_string).collect(),
            }),
        }
    }

    /// Closest display names by fuzzy score
    pub fn suggest(&self, query: &str) -> Vec<String> {
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &str)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                matcher
                    .fuzzy_match(&entry.name, query)
                    .map(|score| (score, entry.name.as_str()))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored.dedup_by_key(|(_, name)| *name);
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Load a cached listing written by `save_csv`
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let entries = reader
            .deserialize::<Listing>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Use the cache at `cache_path` unless `refresh` is set or it is missing;
    /// otherwise fetch from `source` and rewrite the cache
    pub async fn load_or_fetch(
        source: &dyn ListingSource,
        cache_path: impl AsRef<Path>,
        refresh: bool,
    ) -> Result<Self> {
        let cache_path = cache_path.as_ref();

        if !refresh && cache_path.exists() {
            match Self::load_csv(cache_path) {
                Ok(table) if !table.is_empty() => {
                    info!("Loaded {} listings from {}", table.len(), cache_path.display());
                    return Ok(table);
                }
                Ok(_) => warn!("Listing cache {} is empty, refetching", cache_path.display()),
                Err(e) => warn!("Listing cache {} unreadable ({}), refetching", cache_path.display(), e),
            }
        }

        let table = source.fetch_listing().await?;
        if let Err(e) = table.save_csv(cache_path) {
            warn!("Could not write listing cache {}: {}", cache_path.display(), e);
        }
        Ok(table)
    }
}

/// Downloads the KIND corporate listing from the Korea Exchange
pub struct KrxListingClient {
    client: Client,
    url: String,
}

impl KrxListingClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Self::with_url(KIND_LISTING_URL, timeout_secs)
    }

    pub fn with_url(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("stock-dashboard/0.1")
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ListingSource for KrxListingClient {
    async fn fetch_listing(&self) -> Result<ListingTable> {
        info!("Downloading KRX listing from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(DashboardError::Listing(format!(
                "listing download failed with status {}",
                response.status()
            )));
        }

        // KIND serves EUC-KR without always declaring it
        let html = response.text_with_charset("euc-kr").await?;
        let table = parse_listing_html(&html)?;

        info!("Parsed {} listed companies", table.len());
        Ok(table)
    }
}

/// Parse the KIND download: an HTML table whose first row is the header
pub fn parse_listing_html(html: &str) -> Result<ListingTable> {
    let document = Html::parse_document(html);
    let row_selector = selector("tr")?;
    let cell_selector = selector("th, td")?;

    let mut rows = document.select(&row_selector).map(|row| {
        row.select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect::<Vec<_>>()
    });

    let header = rows
        .next()
        .ok_or_else(|| DashboardError::Listing("listing has no rows".to_string()))?;
    let column = |name: &str| {
        header
            .iter()
            .position(|cell| cell == name)
            .ok_or_else(|| DashboardError::Listing(format!("listing has no '{}' column", name)))
    };
    let name_idx = column(NAME_COLUMN)?;
    let code_idx = column(CODE_COLUMN)?;

    let entries = rows
        .filter_map(|cells| {
            let name = cells.get(name_idx)?.clone();
            let code = normalize_code(cells.get(code_idx)?);
            if name.is_empty() || code.is_empty() {
                return None;
            }
            Some(Listing { name, code })
        })
        .collect();

    Ok(ListingTable::new(entries))
}

/// Numeric codes are zero-padded to six digits
fn normalize_code(raw: &str) -> String {
    let code = raw.trim();
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>6}", code)
    } else {
        code.to_ascii_uppercase()
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DashboardError::Listing(format!("bad selector {}: {:?}", css, e)))
}
