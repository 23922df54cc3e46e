use crate::types::AggregationModel;

#[derive(Debug, PartialEq, Eq)]
pub struct ModelStats {
    pub pages: usize,
    pub conferences: usize,
    pub journals: usize,
    pub total: usize,
}

impl ModelStats {
    pub fn from_model(model: &AggregationModel) -> ModelStats {
        let conferences: usize = model.pages.iter().map(|p| p.conference_count()).sum();
        let journals: usize = model.pages.iter().map(|p| p.journal_count()).sum();
        ModelStats {
            pages: model.pages.len(),
            conferences,
            journals,
            total: conferences + journals,
        }
    }
}

impl std::fmt::Display for ModelStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Pages:       {}", self.pages)?;
        writeln!(f, "  Conferences: {}", self.conferences)?;
        writeln!(f, "  Journals:    {}", self.journals)?;
        writeln!(f, "  Total:       {}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Deadline, PageResult, Record};

    #[test]
    fn test_stats_from_model() {
        let record = Record {
            name: "ICML".to_string(),
            link: "http://host/conf/icml".to_string(),
            deadline: Deadline::Raw("2025-01-01".to_string()),
        };
        let mut page = PageResult::new("u", "AI", "l");
        page.push(Category::Conference, "A", record.clone());
        page.push(Category::Conference, "B", record.clone());
        page.push(Category::Journal, "A", record);

        let stats = ModelStats::from_model(&AggregationModel { pages: vec![page] });

        assert_eq!(
            stats,
            ModelStats {
                pages: 1,
                conferences: 2,
                journals: 1,
                total: 3,
            }
        );
        assert!(stats.to_string().contains("Conferences: 2"));
    }
}
