use anyhow::Result;
use std::fs;
use std::path::Path;

/// Build one JSONL log line in the shape the engine ingests.
pub fn entry_line(timestamp: &str, input: u64, output: u64, ids: Option<(&str, &str)>) -> String {
    let id_fields = match ids {
        Some((message_id, request_id)) => format!(
            r#","messageId":"{}","requestId":"{}""#,
            message_id, request_id
        ),
        None => String::new(),
    };

    format!(
        r#"{{"timestamp":"{}","usage":{{"input_tokens":{},"output_tokens":{}}},"model":"claude-sonnet-4-20250514","costUSD":0.01{}}}"#,
        timestamp, input, output, id_fields
    )
}

/// Write a JSONL file at `dir/name`, creating parent directories.
pub fn write_log(dir: &Path, name: &str, lines: &[String]) -> Result<std::path::PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, lines.join("\n"))?;
    Ok(path)
}
