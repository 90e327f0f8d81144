use async_trait::async_trait;

use crate::{
    app::App,
    command::{clear_cache::ClearCache, configure::Configure, providers::Providers, save_to_csv::SaveToCsv},
    error::Result,
    registry::Registry,
};

pub mod clear_cache;
pub mod configure;
pub mod providers;
pub mod save_to_csv;

/// A named action the dispatcher can run instead of a provider.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    /// One-line description for help output.
    fn about(&self) -> &str;

    /// `args` are whatever followed the command token.
    async fn run(&self, app: &mut App, args: &[String]) -> Result<()>;
}

pub type CommandConstructor = fn() -> Box<dyn Command>;

pub type CommandRegistry = Registry<CommandConstructor>;

impl CommandRegistry {
    pub fn add_command(&mut self, constructor: CommandConstructor) {
        let name = constructor().name().to_string();
        self.register(name, constructor);
    }

    /// config, providers, clear-cache and save-to-csv, in that order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.add_command(|| Box::new(Configure));
        registry.add_command(|| Box::new(Providers));
        registry.add_command(|| Box::new(ClearCache));
        registry.add_command(|| Box::new(SaveToCsv));
        registry
    }
}
