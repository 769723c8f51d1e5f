use crate::core::CommandPublisher;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub const OUTBOX_FILE: &str = "outbox.jsonl";

/// Appends every published command to `<base_path>/outbox.jsonl` instead of a broker.
#[derive(Debug, Clone)]
pub struct LocalPublisher {
    base_path: String,
}

impl LocalPublisher {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn outbox_path(&self) -> PathBuf {
        Path::new(&self.base_path).join(OUTBOX_FILE)
    }
}

impl CommandPublisher for LocalPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let full_path = self.outbox_path();

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let payload = serde_json::from_slice::<serde_json::Value>(payload).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(payload).into_owned())
        });
        let mut line = serde_json::to_string(&serde_json::json!({
            "topic": topic,
            "payload": payload,
        }))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full_path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!("Appended command for {} to {}", topic, full_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_publish_appends_json_lines() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("nested").to_str().unwrap().to_string();
        let publisher = LocalPublisher::new(base);

        publisher
            .publish("dev/command/switch:0", br#"{"command":"on"}"#)
            .await
            .unwrap();
        publisher
            .publish("dev/command/switch:0", b"off")
            .await
            .unwrap();

        let content = std::fs::read_to_string(publisher.outbox_path()).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["topic"], "dev/command/switch:0");
        assert_eq!(lines[0]["payload"]["command"], "on");
        assert_eq!(lines[1]["payload"], "off");
    }
}
