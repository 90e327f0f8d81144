//! Dispatch of a single command-line token.
//!
//! The token is looked up in the command registry first, then in the
//! provider registry; no token runs every provider in registration order.

use std::io::Write;
use std::sync::Arc;

use crate::{
    cache::CacheStore,
    command::CommandRegistry,
    config::ConfigStore,
    error::{Result, WeatherError},
    fetch::Fetcher,
    format::OutputFormat,
    model::{Location, WeatherSnapshot},
    paths::{CacheSettings, Paths},
    provider::{LocationPrompt, ProviderFactory, ProviderRegistry, WeatherProvider},
};

/// Per-invocation flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Bypass fresh cache entries.
    pub refresh: bool,
    /// Report errors with their full source chain.
    pub debug: bool,
    pub format: OutputFormat,
}

pub struct App {
    options: Options,
    settings: CacheSettings,
    config: ConfigStore,
    fetcher: Fetcher,
    providers: ProviderRegistry,
    commands: CommandRegistry,
    out: Box<dyn Write + Send>,
    prompt: Box<dyn LocationPrompt>,
}

impl App {
    /// App with the built-in providers and commands.
    pub fn new(
        paths: &Paths,
        settings: CacheSettings,
        options: Options,
        out: Box<dyn Write + Send>,
        prompt: Box<dyn LocationPrompt>,
    ) -> Result<Self> {
        let cache = CacheStore::new(&paths.cache_dir, settings.validity);

        Ok(Self {
            options,
            settings,
            config: ConfigStore::new(&paths.config_file),
            fetcher: Fetcher::new(cache)?,
            providers: ProviderRegistry::builtin(),
            commands: CommandRegistry::builtin(),
            out,
            prompt,
        })
    }

    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_commands(mut self, commands: CommandRegistry) -> Self {
        self.commands = commands;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Sweep old cache entries, then dispatch.
    pub async fn run(&mut self, token: Option<&str>, args: &[String]) -> Result<()> {
        if let Err(err) = self.fetcher.cache().sweep(self.settings.retention) {
            tracing::warn!(error = %err, "cache sweep failed");
        }
        self.dispatch(token, args).await
    }

    pub async fn dispatch(&mut self, token: Option<&str>, args: &[String]) -> Result<()> {
        let Some(token) = token else {
            return self.run_all_providers().await;
        };

        if let Some(constructor) = self.commands.get(token).copied() {
            tracing::debug!(command = token, ?args, "running command");
            return constructor().run(self, args).await;
        }

        if let Some(factory) = self.providers.get(token).cloned() {
            return self.run_provider(factory.as_ref()).await;
        }

        Err(WeatherError::UnknownCommand(token.to_string()))
    }

    /// Run every provider; one failure does not stop the others.
    pub async fn run_all_providers(&mut self) -> Result<()> {
        let factories: Vec<Arc<dyn ProviderFactory>> =
            self.providers.list().map(|(_, factory)| Arc::clone(factory)).collect();
        let total = factories.len();

        let mut failed = 0;
        for factory in factories {
            if let Err(err) = self.run_provider(factory.as_ref()).await {
                failed += 1;
                tracing::error!(
                    provider = factory.id(),
                    "{}",
                    err.report(self.options.debug)
                );
            }
        }

        if failed > 0 {
            return Err(WeatherError::Batch { failed, total });
        }
        Ok(())
    }

    async fn run_provider(&mut self, factory: &dyn ProviderFactory) -> Result<()> {
        let provider = factory.build(&self.config);
        let snapshot = provider.run(&self.fetcher, self.options.refresh).await?;
        self.emit(provider.as_ref(), &snapshot)
    }

    /// Resolve and run one provider without printing.
    pub async fn weather_for(
        &mut self,
        provider_id: &str,
    ) -> Result<(Box<dyn WeatherProvider>, WeatherSnapshot)> {
        let factory = self.factory(provider_id)?;
        let provider = factory.build(&self.config);
        let snapshot = provider.run(&self.fetcher, self.options.refresh).await?;
        Ok((provider, snapshot))
    }

    /// Interactive location walk for one provider. Returns its title and
    /// the saved location.
    pub async fn configure_provider(&mut self, provider_id: &str) -> Result<(String, Location)> {
        let factory = self.factory(provider_id)?;
        let provider = factory.build(&self.config);

        let location = provider
            .configure(
                provider.browse_url(),
                &self.fetcher,
                &self.config,
                self.prompt.as_mut(),
                self.options.refresh,
            )
            .await?;

        Ok((provider.title().to_string(), location))
    }

    pub fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}").map_err(|e| WeatherError::io("<output>", e))
    }

    fn emit(&mut self, provider: &dyn WeatherProvider, snapshot: &WeatherSnapshot) -> Result<()> {
        let rendered = self.options.format.formatter().emit(
            provider.title(),
            &provider.location().name,
            snapshot,
        )?;
        self.write_line(&rendered)
    }

    fn factory(&self, provider_id: &str) -> Result<Arc<dyn ProviderFactory>> {
        self.providers
            .get(provider_id)
            .cloned()
            .ok_or_else(|| WeatherError::UnknownProvider(provider_id.to_string()))
    }
}
