use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::config::{DeadlineMode, ParseOptions};
use crate::types::{Category, Deadline, PageResult, Record};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse URL: {0}")]
    UrlParse(String),
    #[error("Failed to parse date: {0}")]
    DateParse(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Expected at least {expected} tier headings, found {found}")]
    TierCount { expected: usize, found: usize },
}

static RE_ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid regex: iso date"));

static SEL_FIELD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".field-mark > a").expect("invalid selector: field"));
static SEL_TIER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("invalid selector: tier"));
static SEL_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".ccf-table").expect("invalid selector: table"));
static SEL_ROW: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".table-tr-content:not(:first-child)").expect("invalid selector: row")
});
static SEL_CONFERENCE_NAME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".table-tr-name a").expect("invalid selector: conference name")
});
static SEL_JOURNAL_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".table-tr-si a").expect("invalid selector: journal name"));
static SEL_DATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".table-tr-date").expect("invalid selector: date"));

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Text of the element's first child node only, so trailing markup such as a
/// timezone badge after the date is ignored.
fn first_child_text(element: ElementRef) -> Option<String> {
    let node = element.children().next()?;
    match node.value() {
        Node::Text(text) => Some(text.trim().to_string()),
        Node::Element(_) => ElementRef::wrap(node).map(|e| elem_text(e).trim().to_string()),
        _ => None,
    }
}

/// First element matching `selector` that comes after `start` in document
/// order (descendants of `start` included).
fn find_next<'a>(
    document: &'a Html,
    start: ElementRef<'a>,
    selector: &Selector,
) -> Option<ElementRef<'a>> {
    document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != start.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| selector.matches(element))
}

/// Resolves `href` against the URL of the page it was found on. Absolute
/// hrefs are returned as written.
pub fn resolve_link(base: &str, href: &str) -> Result<String, ParseError> {
    let href = href.trim();
    if Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }
    let base =
        Url::parse(base).map_err(|e| ParseError::UrlParse(format!("{}: {}", base, e)))?;
    let resolved = base
        .join(href)
        .map_err(|e| ParseError::UrlParse(format!("{}: {}", href, e)))?;
    Ok(resolved.to_string())
}

pub fn parse_deadline(text: &str, mode: DeadlineMode) -> Result<Deadline, ParseError> {
    match mode {
        DeadlineMode::Raw => Ok(Deadline::Raw(text.to_string())),
        DeadlineMode::Parsed => {
            if !RE_ISO_DATE.is_match(text) {
                return Err(ParseError::DateParse(format!(
                    "Expected YYYY-MM-DD, got '{}'",
                    text
                )));
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(Deadline::Date)
                .map_err(|e| ParseError::DateParse(format!("Invalid date '{}': {}", text, e)))
        }
    }
}

fn parse_row(
    row: ElementRef,
    category: Category,
    page_url: &str,
    mode: DeadlineMode,
) -> Result<Record, ParseError> {
    let name_selector: &Selector = match category {
        Category::Conference => &*SEL_CONFERENCE_NAME,
        Category::Journal => &*SEL_JOURNAL_NAME,
    };

    let name_elem = row
        .select(name_selector)
        .next()
        .ok_or_else(|| ParseError::MissingField(format!("{} name", category)))?;
    let name = elem_text(name_elem).trim().to_string();
    let href = name_elem
        .value()
        .attr("href")
        .ok_or_else(|| ParseError::MissingField(format!("href for '{}'", name)))?;
    let link = resolve_link(page_url, href)?;

    let date_text = row
        .select(&SEL_DATE)
        .next()
        .and_then(first_child_text)
        .ok_or_else(|| ParseError::MissingField(format!("deadline for '{}'", name)))?;
    let deadline = parse_deadline(&date_text, mode)?;

    Ok(Record {
        name,
        link,
        deadline,
    })
}

/// Extracts one listing page.
///
/// The first `options.conference_tiers` headings are conference tiers, the
/// rest are journal tiers. Any missing element or malformed deadline fails the
/// whole page.
pub fn parse_ccf_page(
    html: &str,
    page_url: &str,
    options: ParseOptions,
) -> Result<PageResult, ParseError> {
    let document = Html::parse_document(html);

    let anchor = document
        .select(&SEL_FIELD)
        .next()
        .ok_or_else(|| ParseError::MissingField("field anchor".to_string()))?;
    let field = elem_text(anchor).trim().to_string();
    let field_href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| ParseError::MissingField("field anchor href".to_string()))?;
    let field_link = resolve_link(page_url, field_href)?;

    let mut page = PageResult::new(page_url, field, field_link);

    let headings: Vec<ElementRef> = document.select(&SEL_TIER).collect();
    if headings.len() < options.conference_tiers {
        return Err(ParseError::TierCount {
            expected: options.conference_tiers,
            found: headings.len(),
        });
    }

    for (i, heading) in headings.into_iter().enumerate() {
        let category = if i < options.conference_tiers {
            Category::Conference
        } else {
            Category::Journal
        };
        let rank = elem_text(heading).trim().to_string();

        let table = find_next(&document, heading, &SEL_TABLE)
            .ok_or_else(|| ParseError::MissingField(format!("table for tier '{}'", rank)))?;

        page.rank_group_mut(category, &rank);
        for row in table.select(&SEL_ROW) {
            let record = parse_row(row, category, page_url, options.deadline_mode)?;
            page.push(category, &rank, record);
        }
    }

    log::debug!(
        "Parsed '{}': {} conference(s), {} journal(s)",
        page.field,
        page.conference_count(),
        page.journal_count()
    );

    Ok(page)
}
