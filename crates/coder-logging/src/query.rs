use coder_core::LogEvent;
use std::path::Path;

/// Filters for `StructuredLogger::query`. All fields are AND-ed together;
/// `None` means "no filter on this field".
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub session_id: Option<String>,
    pub task_id: Option<String>,
    pub cli_name: Option<String>,
    pub level: Option<String>,
    pub limit: Option<usize>,
}

impl LogQuery {
    fn matches(&self, event: &LogEvent) -> bool {
        if let Some(session_id) = &self.session_id {
            if event.session_id.as_deref() != Some(session_id.as_str()) {
                return false;
            }
        }
        if let Some(task_id) = &self.task_id {
            if event.task_id.as_deref() != Some(task_id.as_str()) {
                return false;
            }
        }
        if let Some(cli_name) = &self.cli_name {
            if event.cli_name.as_deref() != Some(cli_name.as_str()) {
                return false;
            }
        }
        if let Some(level) = &self.level {
            if !event.level.as_str().eq_ignore_ascii_case(level) {
                return false;
            }
        }
        true
    }
}

/// Walk day files for `module` under `logs_dir` newest-first, returning up
/// to `query.limit` (default 100) matching entries, most recent first.
pub(crate) fn run(logs_dir: &Path, module: &str, query: &LogQuery) -> Vec<LogEvent> {
    let limit = query.limit.unwrap_or(100);
    let mut day_files: Vec<_> = match std::fs::read_dir(logs_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&format!("{module}-")) && n.ends_with(".jsonl"))
                    .unwrap_or(false)
            })
            .collect(),
        Err(_) => return Vec::new(),
    };
    day_files.sort();
    day_files.reverse();

    let mut results = Vec::new();
    'files: for path in day_files {
        let Ok(contents) = std::fs::read_to_string(&path) else {
            continue;
        };
        let mut lines: Vec<&str> = contents.lines().collect();
        lines.reverse();
        for line in lines {
            let Ok(event) = serde_json::from_str::<LogEvent>(line) else {
                continue;
            };
            if query.matches(&event) {
                results.push(event);
                if results.len() >= limit {
                    break 'files;
                }
            }
        }
    }
    results
}
