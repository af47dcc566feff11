//! Startup, main loop and shutdown.

use std::sync::Arc;

use anyhow::Context;
use autopdf_converter::{ConversionPipeline, Notifier, Tick};
use autopdf_directory_watcher::{StagingWatcher, job_queue};
use autopdf_installer::{DependencyInstaller, InstallOutcome};
use autopdf_mirror::{DestroyOutcome, MirrorEnvironment};
use autopdf_utils_trash::{Recycler, SystemTrash};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::file_browser;
use crate::notifier::LogNotifier;

/// The assembled application.
pub struct App {
    config: AppConfig,
    recycler: Arc<dyn Recycler>,
    notifier: Arc<dyn Notifier>,
}

impl App {
    /// Application using the system trash and log notifications.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            recycler: Arc::new(SystemTrash::new()),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_recycler(mut self, recycler: Arc<dyn Recycler>) -> Self {
        self.recycler = recycler;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Install, start, loop until `cancel` fires, then tear down.
    pub async fn run(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        self.ensure_converter().await?;

        let mut session = self.start()?;
        session.run_until_cancelled(&cancel).await;

        info!("Shutting down");
        session.shutdown().await?;
        Ok(())
    }

    /// Make sure the converter is usable.
    ///
    /// A failed update check is tolerated while some converter is installed.
    pub async fn ensure_converter(&self) -> anyhow::Result<()> {
        let installer = DependencyInstaller::new(self.config.installer_config())?;

        match installer.ensure_installed().await {
            Ok(InstallOutcome::Installed { version }) => info!("Installed OfficeToPDF {version}"),
            Ok(InstallOutcome::Updated { from, to }) => info!("Updated OfficeToPDF from {from} to {to}"),
            Ok(outcome) => debug!("Converter check: {outcome:?}"),
            Err(e) if installer.is_installed() => {
                warn!("Could not check for a newer OfficeToPDF, using the installed one: {e}");
            }
            Err(e) => {
                return Err(e).context("Vital package \"OfficeToPDF\" could not be installed");
            }
        }
        Ok(())
    }

    /// Build the staging tree and start watching it.
    pub fn start(&self) -> anyhow::Result<Session> {
        let (environment, status) = MirrorEnvironment::create(
            &self.config.persistence_root,
            &self.config.staging_root,
            self.recycler.as_ref(),
        )
        .context("Failed to create the staging tree")?;
        debug!("Mirror {status:?}");

        if self.config.open_browser {
            file_browser::open(environment.staging_root());
        }

        let (producer, consumer) = job_queue();
        let mut watcher = StagingWatcher::new(self.config.watcher_config());
        watcher
            .start(environment.staging_root(), producer)
            .context("Failed to watch the staging tree")?;

        let pipeline = ConversionPipeline::new(
            self.config.pipeline_config(),
            &environment,
            consumer,
            Arc::clone(&self.notifier),
            Arc::clone(&self.recycler),
        );

        Ok(Session {
            environment,
            watcher,
            pipeline,
            recycler: Arc::clone(&self.recycler),
        })
    }
}

/// A running mirror with its watcher and pipeline.
pub struct Session {
    environment: MirrorEnvironment,
    watcher: StagingWatcher,
    pipeline: ConversionPipeline,
    recycler: Arc<dyn Recycler>,
}

impl Session {
    pub fn environment(&self) -> &MirrorEnvironment {
        &self.environment
    }

    /// Handle at most one job.
    pub async fn tick(&mut self) -> Tick {
        self.pipeline.handle().await
    }

    /// Handle jobs until `cancel` fires. Checked between jobs only.
    pub async fn run_until_cancelled(&mut self, cancel: &CancellationToken) {
        while !cancel.is_cancelled() {
            self.tick().await;
        }
    }

    /// Stop the watcher, then recycle the staging tree.
    pub async fn shutdown(mut self) -> anyhow::Result<DestroyOutcome> {
        self.watcher.stop().await?;
        let outcome = self.environment.destroy(self.recycler.as_ref())?;
        info!("Staging tree {}: {outcome:?}", self.environment.staging_root().display());
        Ok(outcome)
    }
}
