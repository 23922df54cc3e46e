pub const BASE_URL: &str = "http://123.57.137.208";

/// Listing pages are numbered `1..=PAGE_COUNT`.
pub const PAGE_COUNT: u32 = 10;

/// Number of leading tier headings on a page that list conferences. Every
/// heading after them lists journals.
pub const DEFAULT_CONFERENCE_TIERS: usize = 3;

pub const CACHE_FILE: &str = "cache.sqlite";

pub const CONFERENCE_LABEL: &str = "中国计算机学会推荐国际学术会议";
pub const JOURNAL_LABEL: &str = "中国计算机学会推荐国际学术刊物";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlineMode {
    /// Deadlines must be `YYYY-MM-DD` and are written as spreadsheet dates.
    #[default]
    Parsed,
    /// Deadlines are kept as the text found on the page.
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub conference_tiers: usize,
    pub deadline_mode: DeadlineMode,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            conference_tiers: DEFAULT_CONFERENCE_TIERS,
            deadline_mode: DeadlineMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub page_count: u32,
    pub conference_tiers: usize,
    pub deadline_mode: DeadlineMode,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            page_count: PAGE_COUNT,
            conference_tiers: DEFAULT_CONFERENCE_TIERS,
            deadline_mode: DeadlineMode::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn page_url(&self, index: u32) -> String {
        format!("{}/ccf/ccf-{}.jsp", self.base_url.trim_end_matches('/'), index)
    }

    pub fn page_urls(&self) -> impl Iterator<Item = (u32, String)> + '_ {
        (1..=self.page_count).map(|i| (i, self.page_url(i)))
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            conference_tiers: self.conference_tiers,
            deadline_mode: self.deadline_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_urls_cover_fixed_range() {
        let config = ScrapeConfig::default();
        let urls: Vec<_> = config.page_urls().collect();

        assert_eq!(urls.len(), 10);
        assert_eq!(urls[0], (1, "http://123.57.137.208/ccf/ccf-1.jsp".to_string()));
        assert_eq!(urls[9], (10, "http://123.57.137.208/ccf/ccf-10.jsp".to_string()));
    }

    #[test]
    fn test_page_url_ignores_trailing_slash() {
        let config = ScrapeConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..ScrapeConfig::default()
        };
        assert_eq!(config.page_url(3), "http://localhost:8080/ccf/ccf-3.jsp");
    }

    #[test]
    fn test_default_parse_options() {
        let options = ScrapeConfig::default().parse_options();
        assert_eq!(options.conference_tiers, 3);
        assert_eq!(options.deadline_mode, DeadlineMode::Parsed);
    }
}
