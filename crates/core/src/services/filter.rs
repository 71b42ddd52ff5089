//! Content filter matching.

use chrono::Utc;
use fanout_common::{AppError, AppResult};
use fanout_db::{
    entities::{
        custom_filter::{self, FilterAction},
        custom_filter_keyword, poll, status,
    },
    repositories::FilterWithRules,
};
use regex::{Regex, RegexSet};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

#[allow(clippy::unwrap_used)]
static BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p>").unwrap());

/// Filter summary attached to a hydrated status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPayload {
    pub id: String,
    pub title: String,
    pub context: Vec<String>,
    pub filter_action: FilterAction,
    pub expires_at: Option<DateTimeWithTimeZone>,
}

/// Why a filter matched a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterResultPayload {
    pub filter: FilterPayload,
    pub keyword_matches: Option<Vec<String>>,
    pub status_matches: Option<Vec<String>>,
}

impl From<&custom_filter::Model> for FilterPayload {
    fn from(filter: &custom_filter::Model) -> Self {
        Self {
            id: filter.id.clone(),
            title: filter.title.clone(),
            context: filter.contexts(),
            filter_action: filter.action,
            expires_at: filter.expires_at,
        }
    }
}

/// Apply a viewer's filters to a status.
pub fn apply_filters(
    filters: &[FilterWithRules],
    status: &status::Model,
    poll: Option<&poll::Model>,
) -> AppResult<Vec<FilterResultPayload>> {
    let now = Utc::now();
    let text = searchable_text(status, poll);
    let mut results = Vec::new();

    for rules in filters {
        if rules.filter.expires_at.is_some_and(|at| at <= now) {
            continue;
        }

        let keyword_matches = matched_keywords(&rules.keywords, &text)?;

        let status_matches: Vec<String> = rules
            .statuses
            .iter()
            .filter(|rule| rule.status_id == status.id)
            .map(|rule| rule.status_id.clone())
            .collect();

        if keyword_matches.is_empty() && status_matches.is_empty() {
            continue;
        }

        results.push(FilterResultPayload {
            filter: FilterPayload::from(&rules.filter),
            keyword_matches: (!keyword_matches.is_empty()).then_some(keyword_matches),
            status_matches: (!status_matches.is_empty()).then_some(status_matches),
        });
    }

    Ok(results)
}

/// Keywords of a filter found in `text`, as the filter owner wrote them.
fn matched_keywords(
    keywords: &[custom_filter_keyword::Model],
    text: &str,
) -> AppResult<Vec<String>> {
    let keywords: Vec<&custom_filter_keyword::Model> = keywords
        .iter()
        .filter(|k| !k.keyword.trim().is_empty())
        .collect();

    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let set = RegexSet::new(
        keywords
            .iter()
            .map(|k| format!("(?i){}", keyword_pattern(k.keyword.trim(), k.whole_word))),
    )
    .map_err(|e| AppError::Internal(format!("Invalid filter keyword: {e}")))?;

    Ok(set
        .matches(text)
        .into_iter()
        .map(|i| keywords[i].keyword.clone())
        .collect())
}

fn keyword_pattern(keyword: &str, whole_word: bool) -> String {
    let escaped = regex::escape(keyword);
    if !whole_word {
        return escaped;
    }

    // \b only makes sense next to a word character
    let starts_word = keyword.chars().next().is_some_and(is_word_char);
    let ends_word = keyword.chars().last().is_some_and(is_word_char);

    format!(
        "{}{escaped}{}",
        if starts_word { r"\b" } else { "" },
        if ends_word { r"\b" } else { "" }
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Spoiler, plain-text content and poll options.
fn searchable_text(status: &status::Model, poll: Option<&poll::Model>) -> String {
    let content = BREAK.replace_all(&status.text, "\n");
    let content = TAG.replace_all(&content, "");

    let mut parts = vec![status.spoiler_text.clone(), content.into_owned()];
    if let Some(poll) = poll {
        parts.extend(poll.option_titles());
    }

    parts.join("\n\n")
}
