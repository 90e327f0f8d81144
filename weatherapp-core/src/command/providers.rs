use async_trait::async_trait;

use crate::{app::App, error::Result};

use super::Command;

/// Prints every registered provider as `title (id)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Providers;

#[async_trait]
impl Command for Providers {
    fn name(&self) -> &str {
        "providers"
    }

    fn about(&self) -> &str {
        "List available weather providers"
    }

    async fn run(&self, app: &mut App, _args: &[String]) -> Result<()> {
        let lines: Vec<String> = app
            .providers()
            .list()
            .map(|(id, factory)| format!("{} ({id})", factory.title()))
            .collect();

        for line in lines {
            app.write_line(&line)?;
        }
        Ok(())
    }
}
