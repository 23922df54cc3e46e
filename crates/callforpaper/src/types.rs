use std::collections::HashMap;
use std::fmt::Display;

use chrono::NaiveDate;

use crate::config::{CONFERENCE_LABEL, JOURNAL_LABEL};

/// Whether a tier lists conferences or journals. Derived from the tier's
/// position on the page, never from the page content itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Conference,
    Journal,
}

impl Category {
    /// Text written into the category column of the sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Conference => CONFERENCE_LABEL,
            Category::Journal => JOURNAL_LABEL,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Conference => write!(f, "Conference"),
            Category::Journal => write!(f, "Journal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deadline {
    Date(NaiveDate),
    Raw(String),
}

impl Display for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deadline::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Deadline::Raw(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    /// Absolute URL of the venue's detail page.
    pub link: String,
    pub deadline: Deadline,
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.deadline, self.link)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankGroup {
    pub rank: String,
    pub records: Vec<Record>,
}

impl RankGroup {
    pub fn new(rank: impl Into<String>) -> Self {
        Self {
            rank: rank.into(),
            records: Vec::new(),
        }
    }
}

/// Everything scraped from one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub url: String,
    pub field: String,
    pub field_link: String,
    pub conferences: Vec<RankGroup>,
    pub journals: Vec<RankGroup>,
}

impl PageResult {
    pub fn new(
        url: impl Into<String>,
        field: impl Into<String>,
        field_link: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            field: field.into(),
            field_link: field_link.into(),
            conferences: Vec::new(),
            journals: Vec::new(),
        }
    }

    pub fn groups(&self, category: Category) -> &[RankGroup] {
        match category {
            Category::Conference => &self.conferences,
            Category::Journal => &self.journals,
        }
    }

    /// Returns the group for `rank`, creating an empty one at the end if this
    /// is the first time the label is seen in `category`.
    pub fn rank_group_mut(&mut self, category: Category, rank: &str) -> &mut RankGroup {
        let groups = match category {
            Category::Conference => &mut self.conferences,
            Category::Journal => &mut self.journals,
        };
        let idx = match groups.iter().position(|g| g.rank == rank) {
            Some(idx) => idx,
            None => {
                groups.push(RankGroup::new(rank));
                groups.len() - 1
            }
        };
        &mut groups[idx]
    }

    pub fn push(&mut self, category: Category, rank: &str, record: Record) {
        self.rank_group_mut(category, rank).records.push(record);
    }

    pub fn count(&self, category: Category) -> usize {
        self.groups(category).iter().map(|g| g.records.len()).sum()
    }

    pub fn conference_count(&self) -> usize {
        self.count(Category::Conference)
    }

    pub fn journal_count(&self) -> usize {
        self.count(Category::Journal)
    }

    pub fn row_count(&self) -> usize {
        self.conference_count() + self.journal_count()
    }
}

impl Display for PageResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "┌─ {} ─ {}", self.field, self.field_link)?;
        for category in [Category::Conference, Category::Journal] {
            for group in self.groups(category) {
                writeln!(
                    f,
                    "│  [{}] {}: {} venue(s)",
                    category,
                    group.rank,
                    group.records.len()
                )?;
            }
        }
        write!(f, "└─ {} row(s)", self.row_count())
    }
}

/// The pages that were fetched and extracted successfully, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationModel {
    pub pages: Vec<PageResult>,
}

impl AggregationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: PageResult) {
        self.pages.push(page);
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.pages.iter().map(PageResult::row_count).sum()
    }

    /// Rank labels that only differ by case or surrounding whitespace.
    ///
    /// Labels are kept verbatim, so such pairs end up as separate groups in
    /// the sheet. Each entry holds every distinct spelling seen, in order of
    /// first appearance.
    pub fn inconsistent_rank_labels(&self) -> Vec<Vec<String>> {
        let mut spellings: Vec<(String, Vec<String>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        let labels = self
            .pages
            .iter()
            .flat_map(|p| p.conferences.iter().chain(p.journals.iter()))
            .map(|g| g.rank.as_str());

        for label in labels {
            let key = label.trim().to_lowercase();
            let idx = *index.entry(key.clone()).or_insert_with(|| {
                spellings.push((key, Vec::new()));
                spellings.len() - 1
            });
            let seen = &mut spellings[idx].1;
            if !seen.iter().any(|s| s == label) {
                seen.push(label.to_string());
            }
        }

        spellings
            .into_iter()
            .map(|(_, seen)| seen)
            .filter(|seen| seen.len() > 1)
            .collect()
    }
}
