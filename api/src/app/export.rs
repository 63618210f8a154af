//! Export of the aggregated view
//!
//! Pure functions: a session view goes in, a JSON document or a flattened CSV
//! comes out. Nothing here touches the network or the session locks.

use serde::Serialize;
use serde_json::Value;

use crate::app::session::SessionView;
use crate::domain::entities::ComparableRepository;
use crate::domain::ports::{ActivityEvent, Contributor, Language, Repository};
use crate::error::DomainError;

const TOP_CONTRIBUTORS: usize = 20;
const RECENT_ACTIVITY: usize = 30;

/// Repository section of an export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRepository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
    pub stars: i64,
    pub forks: i64,
    pub issues: i64,
    pub watchers: i64,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub license: String,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportLanguage {
    pub name: String,
    pub bytes: u64,
    /// Two decimals, as text
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportContributor {
    pub username: String,
    pub contributions: i64,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportActivity {
    #[serde(rename = "type")]
    pub kind: String,
    pub user: String,
    pub date: String,
    pub details: String,
}

/// Full export document for the current repository
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub repository: ExportRepository,
    pub languages: Vec<ExportLanguage>,
    pub top_contributors: Vec<ExportContributor>,
    pub recent_activity: Vec<ExportActivity>,
}

impl ExportDocument {
    pub fn build(
        repository: &Repository,
        languages: &[Language],
        contributors: &[Contributor],
        activity: &[ActivityEvent],
    ) -> Self {
        Self {
            repository: ExportRepository {
                name: repository.name.clone(),
                full_name: repository.full_name.clone(),
                description: repository.description.clone(),
                url: repository.html_url.clone(),
                created_at: repository.created_at.clone(),
                updated_at: repository.updated_at.clone(),
                stars: repository.stargazers_count,
                forks: repository.forks_count,
                issues: repository.open_issues_count,
                watchers: repository.watchers_count,
                language: repository.language.clone(),
                topics: repository.topics.clone(),
                license: repository
                    .license
                    .as_ref()
                    .map(|l| l.name.clone())
                    .unwrap_or_else(|| "No license".to_string()),
                size: repository.size,
            },
            languages: languages
                .iter()
                .map(|l| ExportLanguage {
                    name: l.name.clone(),
                    bytes: l.bytes,
                    percentage: format!("{:.2}", l.percentage),
                })
                .collect(),
            top_contributors: contributors
                .iter()
                .take(TOP_CONTRIBUTORS)
                .map(|c| ExportContributor {
                    username: c.login.clone(),
                    contributions: c.contributions,
                    profile: c.html_url.clone(),
                })
                .collect(),
            recent_activity: activity
                .iter()
                .take(RECENT_ACTIVITY)
                .map(|e| ExportActivity {
                    kind: e.kind.clone(),
                    user: e.actor.login.clone(),
                    date: e.created_at.clone(),
                    details: event_details(e),
                })
                .collect(),
        }
    }

    /// Build from a session view. Slots that did not resolve export as empty
    /// lists; the repository itself is required.
    pub fn from_view(view: &SessionView) -> Result<Self, DomainError> {
        let repository = view
            .repository
            .ready()
            .ok_or(DomainError::NoCurrentRepository)?;

        Ok(Self::build(
            repository,
            view.languages.ready().map(Vec::as_slice).unwrap_or_default(),
            view.contributors.ready().map(Vec::as_slice).unwrap_or_default(),
            view.activity.ready().map(Vec::as_slice).unwrap_or_default(),
        ))
    }
}

/// One comparison row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportComparison {
    pub name: String,
    pub full_name: String,
    pub stars: i64,
    pub forks: i64,
    pub issues: i64,
    pub language: Option<String>,
    pub contributors: usize,
    pub last_update: String,
    pub created_at: String,
}

pub fn format_comparison(entries: &[ComparableRepository]) -> Vec<ExportComparison> {
    entries
        .iter()
        .map(|r| ExportComparison {
            name: r.name.clone(),
            full_name: r.full_name.clone(),
            stars: r.stars,
            forks: r.forks,
            issues: r.issues,
            language: r.language.clone(),
            contributors: r.contributors,
            last_update: r.last_update.clone(),
            created_at: r.created_at.clone(),
        })
        .collect()
}

/// Human-readable one-liner for an activity event
pub fn event_details(event: &ActivityEvent) -> String {
    let payload = &event.payload;
    let action = payload.action.as_deref().unwrap_or_default();
    let issue_number = || {
        payload
            .issue
            .as_ref()
            .map(|i| i.number.to_string())
            .unwrap_or_default()
    };

    match event.kind.as_str() {
        "PushEvent" => {
            let count = payload.commits.as_ref().map(Vec::len).unwrap_or(0);
            format!("Pushed {count} commits")
        }
        "PullRequestEvent" => {
            let number = payload
                .pull_request
                .as_ref()
                .map(|p| p.number.to_string())
                .unwrap_or_default();
            format!("{action} pull request #{number}")
        }
        "IssuesEvent" => format!("{action} issue #{}", issue_number()),
        "IssueCommentEvent" => format!("Commented on issue #{}", issue_number()),
        "CreateEvent" | "DeleteEvent" => {
            let verb = if event.kind == "CreateEvent" {
                "Created"
            } else {
                "Deleted"
            };
            format!(
                "{verb} {} {}",
                payload.ref_type.as_deref().unwrap_or_default(),
                payload.ref_name.as_deref().unwrap_or_default()
            )
            .trim_end()
            .to_string()
        }
        "WatchEvent" => "Starred the repository".to_string(),
        "ForkEvent" => "Forked the repository".to_string(),
        other => other.to_string(),
    }
}

/// Pretty-printed JSON
pub fn to_json<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

/// Flatten a JSON value into `(column, cell)` pairs, in document order.
///
/// Object keys join with `.`, array items append `[i]`. Null becomes an
/// empty cell; empty arrays and objects contribute no column.
pub fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, path: String, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let next = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten_into(child, next, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten_into(child, format!("{path}[{i}]"), out);
            }
        }
        Value::Null => out.push((path, String::new())),
        Value::String(s) => out.push((path, s.clone())),
        Value::Bool(b) => out.push((path, b.to_string())),
        Value::Number(n) => out.push((path, n.to_string())),
    }
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn csv_line<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    cells.into_iter().map(escape_cell).collect::<Vec<_>>().join(",")
}

/// One header row and one data row. A list flattens into indexed columns
/// (`[0].name`, `[1].name`, ...) on that single row.
pub fn to_csv<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    let flat = flatten(&serde_json::to_value(data)?);
    let header = csv_line(flat.iter().map(|(k, _)| k.as_str()));
    let row = csv_line(flat.iter().map(|(_, v)| v.as_str()));
    Ok(format!("{header}\n{row}"))
}
