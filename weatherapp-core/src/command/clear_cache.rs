use async_trait::async_trait;

use crate::{app::App, error::Result};

use super::Command;

/// Deletes the whole page cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearCache;

#[async_trait]
impl Command for ClearCache {
    fn name(&self) -> &str {
        "clear-cache"
    }

    fn about(&self) -> &str {
        "Delete every cached page"
    }

    async fn run(&self, app: &mut App, _args: &[String]) -> Result<()> {
        app.fetcher().cache().clear()?;
        let root = app.fetcher().cache().root().display().to_string();
        app.write_line(&format!("Cache cleared: {root}"))
    }
}
