//! The consuming loop body.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use autopdf_directory_watcher::JobConsumer;
use autopdf_mirror::{MirrorEnvironment, map_path};
use autopdf_utils_trash::Recycler;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::exit_code::describe_exit_code;
use crate::file_types::{is_pdf, is_supported};
use crate::notification::{Notification, Notifier};
use crate::office_to_pdf::OfficeToPdf;
use crate::outcome::{ConversionOutcome, Tick};

/// Dequeues staged files and converts them one at a time.
pub struct ConversionPipeline {
    /// Configuration.
    config: PipelineConfig,

    /// Root the queued paths live under.
    staging_root: PathBuf,

    /// Root the PDFs are written under.
    persistence_root: PathBuf,

    /// Incoming jobs.
    queue: JobConsumer,

    /// External converter.
    converter: OfficeToPdf,

    /// User-visible reports.
    notifier: Arc<dyn Notifier>,

    /// Where converted sources go.
    recycler: Arc<dyn Recycler>,
}

impl ConversionPipeline {
    /// Create a pipeline for the roots of `env`.
    pub fn new(
        config: PipelineConfig,
        env: &MirrorEnvironment,
        queue: JobConsumer,
        notifier: Arc<dyn Notifier>,
        recycler: Arc<dyn Recycler>,
    ) -> Self {
        let converter = OfficeToPdf::new(&config.binary_path, &config.package_dir);

        Self {
            config,
            staging_root: env.staging_root().to_path_buf(),
            persistence_root: env.persistence_root().to_path_buf(),
            queue,
            converter,
            notifier,
            recycler,
        }
    }

    /// Handle at most one queued file.
    ///
    /// Never fails: every problem is logged, reported to the notifier and folded
    /// into the returned [`Tick`]. Exactly one conversion attempt is made per job.
    pub async fn handle(&mut self) -> Tick {
        let Some(source) = self.queue.pop(self.config.pop_timeout()).await else {
            tokio::time::sleep(self.config.idle_interval()).await;
            return Tick::Idle;
        };

        if !source.exists() {
            warn!(
                "{} does not exist anymore, must have been a temporary file",
                source.display()
            );
            return Tick::Vanished(source);
        }

        let outcome = self.process(&source).await;

        if outcome.is_success() {
            self.recycle_source(&source);
        } else if matches!(outcome, ConversionOutcome::Failed { .. }) {
            tokio::time::sleep(self.config.backoff_interval()).await;
        }

        Tick::Processed { source, outcome }
    }

    async fn process(&self, source: &Path) -> ConversionOutcome {
        let name = file_name(source);

        if !is_supported(source) {
            warn!("Unsupported file type: {}", source.display());
            self.notifier.notify(Notification::error(
                "AutoPDF: Error",
                format!("Unsupported File Type: {name}"),
            ));
            return ConversionOutcome::UnsupportedType;
        }

        let target = match self.target_for(source) {
            Ok(target) => target,
            Err(e) => return self.failed(source, None, e.to_string()),
        };

        if target.exists() {
            warn!("File already exists: {}", target.display());
            self.notifier.notify(Notification::warning(
                "AutoPDF: Warning / Error",
                format!("File does already exist: {}", file_name(&target)),
            ));
            return ConversionOutcome::TargetExists;
        }

        if let Err(e) = ensure_parent(&target).await {
            return self.failed(source, None, e.to_string());
        }

        if is_pdf(source) {
            info!("File already PDF: copying to {}", target.display());
            return match tokio::fs::copy(source, &target).await {
                Ok(_) => {
                    self.notifier.notify(Notification::info(
                        "AutoPDF: already PDF",
                        format!("{name} does not need conversion - copying"),
                    ));
                    ConversionOutcome::AlreadyPdf
                }
                Err(e) => self.failed(source, None, format!("copy failed: {e}")),
            };
        }

        info!("Converting {} to {}", source.display(), target.display());
        let exit = match self.converter.convert(source, &target).await {
            Ok(exit) => exit,
            Err(e) => return self.failed(source, None, e.to_string()),
        };

        match exit.code {
            Some(0) => {
                info!("Successfully converted {} to {}", source.display(), target.display());
                self.notifier.notify(Notification::info(
                    "Successfully converted",
                    format!("{name} to {}", file_name(&target)),
                ));
                ConversionOutcome::Success
            }
            Some(code) => {
                debug!("Converter output: {}", exit.stdout);
                self.failed(source, Some(code), describe_exit_code(code).to_string())
            }
            None => {
                debug!("Converter output: {}", exit.stdout);
                self.failed(source, None, "converter terminated without an exit code".to_string())
            }
        }
    }

    /// The PDF path mirroring `source` in the persistent tree.
    fn target_for(&self, source: &Path) -> Result<PathBuf> {
        Ok(map_path(source, &self.staging_root, &self.persistence_root)?.with_extension("pdf"))
    }

    fn failed(&self, source: &Path, code: Option<i32>, message: String) -> ConversionOutcome {
        warn!("Error converting {}: {message}", source.display());

        let title = match code {
            Some(code) => format!("AutoPDF: Error {code}"),
            None => "AutoPDF: Error".to_string(),
        };
        self.notifier.notify(Notification::error(title, message.clone()));

        ConversionOutcome::Failed { code, message }
    }

    fn recycle_source(&self, source: &Path) {
        info!("Moving {} to trash", source.display());

        if let Err(e) = self.recycler.recycle(source) {
            warn!("Couldn't move {} to recycling bin: {e}", source.display());
            self.notifier.notify(Notification::warning(
                "AutoPDF: Error",
                format!("Couldn't move {} to recycling bin", file_name(source)),
            ));
        }
    }
}

async fn ensure_parent(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.is_dir() {
            debug!("Creating {}", parent.display());
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopdf_directory_watcher::{JobProducer, job_queue};
    use autopdf_utils_trash::{RemoveRecycler, TrashError};
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.seen.lock().unwrap().iter().map(|n| n.message.clone()).collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.lock().unwrap().push(notification);
        }
    }

    struct DenyingRecycler;

    impl Recycler for DenyingRecycler {
        fn recycle(&self, path: &Path) -> autopdf_utils_trash::Result<()> {
            Err(TrashError::PermissionDenied(path.to_path_buf()))
        }
    }

    struct Fixture {
        _temp_dir: TempDir,
        staging: PathBuf,
        persistence: PathBuf,
        package: PathBuf,
        producer: JobProducer,
        notifier: Arc<RecordingNotifier>,
        pipeline: ConversionPipeline,
    }

    impl Fixture {
        fn new(script: &str) -> Self {
            Self::with_recycler(script, Arc::new(RemoveRecycler))
        }

        fn with_recycler(script: &str, recycler: Arc<dyn Recycler>) -> Self {
            let temp_dir = TempDir::new().unwrap();
            let staging = temp_dir.path().join("staging");
            let persistence = temp_dir.path().join("persistence");
            let package = temp_dir.path().join("package");
            for dir in [&staging, &persistence, &package] {
                std::fs::create_dir_all(dir.join("docs")).unwrap();
            }

            let binary = package.join("OfficeToPDF.exe");
            write_script(&binary, script);

            let env = MirrorEnvironment::new(&persistence, &staging);
            let (producer, consumer) = job_queue();
            let notifier = Arc::new(RecordingNotifier::default());
            let config = PipelineConfig::new(&binary, &package)
                .with_pop_timeout(Duration::from_millis(10))
                .with_idle_interval(Duration::from_millis(10))
                .with_backoff_interval(Duration::from_millis(1));
            let pipeline = ConversionPipeline::new(config, &env, consumer, notifier.clone(), recycler);

            Self {
                _temp_dir: temp_dir,
                staging,
                persistence,
                package,
                producer,
                notifier,
                pipeline,
            }
        }

        fn stage(&self, relative: &str) -> PathBuf {
            let path = self.staging.join(relative);
            std::fs::write(&path, b"office document").unwrap();
            self.producer.push(path.clone()).unwrap();
            path
        }
    }

    #[cfg(unix)]
    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(not(unix))]
    fn write_script(path: &Path, body: &str) {
        std::fs::write(path, body).unwrap();
    }

    const CONVERT_OK: &str = r#"echo "%PDF-1.7" > "$4"; exit 0"#;

    #[tokio::test]
    async fn test_idle_tick() {
        let mut fixture = Fixture::new(CONVERT_OK);
        assert_eq!(fixture.pipeline.handle().await, Tick::Idle);
    }

    #[tokio::test]
    async fn test_vanished_file() {
        let mut fixture = Fixture::new(CONVERT_OK);
        let source = fixture.stage("docs/temp.docx");
        std::fs::remove_file(&source).unwrap();

        assert_eq!(fixture.pipeline.handle().await, Tick::Vanished(source));
        assert!(fixture.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_type_is_kept() {
        let mut fixture = Fixture::new("touch \"$2/converter-was-called\"; exit 0");
        let source = fixture.stage("docs/photo.jpg");

        let tick = fixture.pipeline.handle().await;

        assert_eq!(
            tick,
            Tick::Processed {
                source: source.clone(),
                outcome: ConversionOutcome::UnsupportedType,
            }
        );
        assert!(source.exists());
        assert!(!fixture.package.join("converter-was-called").exists());
        assert_eq!(fixture.notifier.messages(), vec!["Unsupported File Type: photo.jpg"]);
    }

    #[tokio::test]
    async fn test_path_outside_staging_is_failed() {
        let mut fixture = Fixture::new("touch \"$2/converter-was-called\"; exit 0");
        let stray = fixture.staging.parent().unwrap().join("stray.docx");
        std::fs::write(&stray, b"office document").unwrap();
        fixture.producer.push(stray.clone()).unwrap();

        let Tick::Processed { source, outcome } = fixture.pipeline.handle().await else {
            panic!("expected a processed tick");
        };

        assert_eq!(source, stray);
        let ConversionOutcome::Failed { code, message } = outcome else {
            panic!("expected a failed outcome, got {outcome:?}");
        };
        assert_eq!(code, None);
        assert!(message.starts_with("mirror error:"), "{message}");
        assert!(stray.exists());
        assert!(!fixture.package.join("converter-was-called").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_successful_conversion_recycles_source() {
        let mut fixture = Fixture::new(CONVERT_OK);
        let source = fixture.stage("docs/report.docx");

        let tick = fixture.pipeline.handle().await;

        assert_eq!(
            tick,
            Tick::Processed {
                source: source.clone(),
                outcome: ConversionOutcome::Success,
            }
        );
        assert!(fixture.persistence.join("docs/report.pdf").is_file());
        assert!(!source.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_argument_contract() {
        let mut fixture = Fixture::new(r#"printf '%s\n' "$@" > "$2/args.txt"; exit 0"#);
        let source = fixture.stage("docs/sheet.xlsx");

        fixture.pipeline.handle().await;

        let args = std::fs::read_to_string(fixture.package.join("args.txt")).unwrap();
        let args: Vec<&str> = args.lines().collect();
        assert_eq!(
            args,
            vec![
                "/working_dir",
                fixture.package.to_str().unwrap(),
                source.to_str().unwrap(),
                fixture.persistence.join("docs/sheet.pdf").to_str().unwrap(),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_source_not_found_code_keeps_source() {
        let mut fixture = Fixture::new("exit 64");
        let source = fixture.stage("docs/report.docx");

        let tick = fixture.pipeline.handle().await;

        assert_eq!(
            tick,
            Tick::Processed {
                source: source.clone(),
                outcome: ConversionOutcome::Failed {
                    code: Some(64),
                    message: "Source file not found".to_string(),
                },
            }
        );
        assert!(source.exists());
        assert!(!fixture.persistence.join("docs/report.pdf").exists());
        assert_eq!(fixture.notifier.messages(), vec!["Source file not found"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_unmapped_code_is_unknown_failure() {
        let mut fixture = Fixture::new("exit 3");
        let source = fixture.stage("docs/report.docx");

        let tick = fixture.pipeline.handle().await;

        assert_eq!(
            tick,
            Tick::Processed {
                source: source.clone(),
                outcome: ConversionOutcome::Failed {
                    code: Some(3),
                    message: "Unknown Error".to_string(),
                },
            }
        );
        assert!(source.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_killed_converter_is_failure() {
        let mut fixture = Fixture::new("kill -9 $$");
        let source = fixture.stage("docs/report.docx");

        let tick = fixture.pipeline.handle().await;

        assert!(matches!(
            tick,
            Tick::Processed {
                outcome: ConversionOutcome::Failed { code: None, .. },
                ..
            }
        ));
        assert!(source.exists());
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_converter_is_failure() {
        let mut fixture = Fixture::new(CONVERT_OK);
        std::fs::remove_file(fixture.package.join("OfficeToPDF.exe")).unwrap();
        let source = fixture.stage("docs/report.docx");

        let tick = fixture.pipeline.handle().await;

        assert!(matches!(
            tick,
            Tick::Processed {
                outcome: ConversionOutcome::Failed { code: None, .. },
                ..
            }
        ));
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_existing_target_is_never_overwritten() {
        let mut fixture = Fixture::new(CONVERT_OK);
        let target = fixture.persistence.join("docs/report.pdf");
        std::fs::write(&target, b"original pdf").unwrap();
        let source = fixture.stage("docs/report.docx");

        let tick = fixture.pipeline.handle().await;

        assert_eq!(
            tick,
            Tick::Processed {
                source: source.clone(),
                outcome: ConversionOutcome::TargetExists,
            }
        );
        assert_eq!(std::fs::read(&target).unwrap(), b"original pdf");
        // A collision counts as handled.
        assert!(!source.exists());
        assert_eq!(
            fixture.notifier.messages(),
            vec!["File does already exist: report.pdf"]
        );
    }

    #[tokio::test]
    async fn test_pdf_is_copied_without_converter() {
        let mut fixture = Fixture::new("exit 1");
        let source = fixture.staging.join("docs/scan.pdf");
        std::fs::write(&source, b"%PDF-1.4 scan").unwrap();
        fixture.producer.push(source.clone()).unwrap();

        let tick = fixture.pipeline.handle().await;

        assert_eq!(
            tick,
            Tick::Processed {
                source: source.clone(),
                outcome: ConversionOutcome::AlreadyPdf,
            }
        );
        assert_eq!(
            std::fs::read(fixture.persistence.join("docs/scan.pdf")).unwrap(),
            b"%PDF-1.4 scan"
        );
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_new_staging_folder_is_created_in_persistence() {
        let mut fixture = Fixture::new("exit 1");
        std::fs::create_dir_all(fixture.staging.join("docs/new")).unwrap();
        let source = fixture.staging.join("docs/new/scan.pdf");
        std::fs::write(&source, b"%PDF").unwrap();
        fixture.producer.push(source).unwrap();

        fixture.pipeline.handle().await;

        assert!(fixture.persistence.join("docs/new/scan.pdf").is_file());
    }

    #[tokio::test]
    async fn test_trash_permission_failure_is_reported() {
        let mut fixture = Fixture::with_recycler("exit 1", Arc::new(DenyingRecycler));
        let source = fixture.staging.join("docs/scan.pdf");
        std::fs::write(&source, b"%PDF").unwrap();
        fixture.producer.push(source.clone()).unwrap();

        let tick = fixture.pipeline.handle().await;

        assert_eq!(
            tick,
            Tick::Processed {
                source: source.clone(),
                outcome: ConversionOutcome::AlreadyPdf,
            }
        );
        assert!(source.exists());
        assert_eq!(
            fixture.notifier.messages(),
            vec![
                "scan.pdf does not need conversion - copying",
                "Couldn't move scan.pdf to recycling bin",
            ]
        );
    }
}
