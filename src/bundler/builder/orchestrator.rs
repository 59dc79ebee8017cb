//! Build pipeline orchestration.
//!
//! This module provides the [`BuildPipeline`] that drives one engine from
//! catalog entry to delivered artifact:
//!
//! 1. Validate prerequisites (directories, external tools)
//! 2. Select the source matching the target architectures
//! 3. Fetch it through the content cache
//! 4. Verify its checksum
//! 5. Extract, restructure and re-archive it in the workspace
//! 6. Copy the artifact into the output directory
//!
//! Any failure ends the build in [`BuildState::Failed`]; nothing is retried.
//! The workspace is removed when the pipeline is dropped.

use super::{checksum, repackage::Repackager, tool_detection::ResolvedTools};
use crate::bundler::{
    artifact::ArchivedEngine,
    cache::ContentCache,
    error::{Error, ErrorKind, Result},
    fetch::Fetcher,
    settings::Settings,
    utils::{
        fs::{copy_into_atomic, create_dir_all},
        http::{HttpClient, Transport},
    },
    workspace::Workspace,
};
use crate::catalog::Engine;
use std::fmt;
use std::path::Path;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Progress of a build.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildState {
    /// Checking prerequisites
    Init,
    /// A source matching the target architectures was chosen
    SourceSelected,
    /// The source is in the cache
    Fetched,
    /// The cached source matched its checksum
    Verified,
    /// The payload was unpacked into the workspace
    Extracted,
    /// The bundle root is in place
    Restructured,
    /// The compressed artifact exists in the workspace
    Archived,
    /// The artifact is in the output directory
    Delivered,
    /// The build stopped with an error of this kind
    Failed(ErrorKind),
}

impl BuildState {
    /// Whether the build can make no further progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, BuildState::Delivered | BuildState::Failed(_))
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildState::Failed(kind) => write!(f, "Failed({kind:?})"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// One build of one engine.
///
/// Owns its workspace exclusively; concurrent pipelines only share the
/// cache directory.
///
/// # Examples
///
/// ```no_run
/// use engine_bundler::bundler::{BuildPipeline, SettingsBuilder};
/// use engine_bundler::catalog::EngineList;
///
/// # async fn example(catalog: EngineList) -> engine_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .cache_dir("/tmp/engine-cache")
///     .output_dir(".")
///     .build()?;
/// let engine = catalog.engine("WS9Wine3.0.1")?.clone();
///
/// let mut pipeline = BuildPipeline::new(engine, settings)?;
/// let archived = pipeline.run().await?;
/// println!("{} -> {}", archived.name(), archived.path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BuildPipeline<T = HttpClient> {
    engine: Engine,
    settings: Settings,
    fetcher: Fetcher<T>,
    state: BuildState,
    workspace: Workspace,
}

impl BuildPipeline<HttpClient> {
    /// Creates a pipeline that downloads over HTTP.
    pub fn new(engine: Engine, settings: Settings) -> Result<Self> {
        Self::with_transport(engine, settings, HttpClient::new()?)
    }
}

impl<T: Transport> BuildPipeline<T> {
    /// Creates a pipeline that downloads through `transport`.
    ///
    /// The workspace is created here and lives as long as the pipeline.
    pub fn with_transport(engine: Engine, settings: Settings, transport: T) -> Result<Self> {
        let workspace = Workspace::create()?;
        let fetcher = Fetcher::new(ContentCache::new(settings.cache_dir()), transport);
        Ok(Self {
            engine,
            settings,
            fetcher,
            state: BuildState::Init,
            workspace,
        })
    }

    /// Current state of the build.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Root of this pipeline's workspace.
    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    /// The engine being built.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Runs the build to a terminal state.
    pub async fn run(&mut self) -> Result<ArchivedEngine> {
        let result = self.drive().await;
        if let Err(e) = &result {
            log::error!("Build of {} failed in {}: {}", self.engine.name, self.state, e);
            self.state = BuildState::Failed(e.kind());
        }
        result
    }

    /// Runs the build until it finishes or `token` is cancelled.
    ///
    /// On cancellation the in-flight download or tool process is dropped
    /// (killing the process and removing any partial file) and
    /// [`Error::Cancelled`] is returned.
    pub async fn run_until_cancelled(
        &mut self,
        token: &CancellationToken,
    ) -> Result<ArchivedEngine> {
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.run() => Some(result),
        };

        match outcome {
            Some(result) => result,
            None => {
                log::warn!("Build of {} cancelled in {}", self.engine.name, self.state);
                self.state = BuildState::Failed(ErrorKind::Cancelled);
                Err(Error::Cancelled)
            }
        }
    }

    async fn drive(&mut self) -> Result<ArchivedEngine> {
        self.state = BuildState::Init;
        let tools = self.preflight().await?;

        let source = self
            .engine
            .select_source(self.settings.target_arch())?
            .clone();
        self.transition(BuildState::SourceSelected);

        let cached = self.fetcher.fetch(&source).await?;
        self.transition(BuildState::Fetched);

        checksum::verify(&cached, &source.sha256).await?;
        self.transition(BuildState::Verified);

        let repackager = Repackager::new(
            tools,
            self.settings.layout().clone(),
            self.workspace.path(),
        );
        repackager.extract(&cached).await?;
        self.transition(BuildState::Extracted);

        repackager.restructure(&self.engine.name).await?;
        self.transition(BuildState::Restructured);

        let artifact = repackager.archive(&self.engine.name).await?;
        self.transition(BuildState::Archived);

        let delivered = copy_into_atomic(&artifact, self.settings.output_dir()).await?;
        let archived = ArchivedEngine::from_path(&delivered).await?;
        self.transition(BuildState::Delivered);

        log::info!(
            "✓ Built {}: {} (sha256 {})",
            archived.name(),
            archived.path().display(),
            archived.sha256()
        );
        Ok(archived)
    }

    /// Creates the output and cache directories and locates the tools.
    async fn preflight(&self) -> Result<ResolvedTools> {
        create_dir_all(self.settings.output_dir()).await?;
        create_dir_all(self.settings.cache_dir()).await?;
        ResolvedTools::locate(self.settings.tools())
    }

    fn transition(&mut self, next: BuildState) {
        log::info!("{}: {} -> {}", self.engine.name, self.state, next);
        self.state = next;
    }
}

/// A build running on its own task, cancellable from the outside.
///
/// The pipeline, and with it the workspace, is dropped on the task before
/// [`BuildHandle::join`] returns.
#[derive(Debug)]
pub struct BuildHandle {
    token: CancellationToken,
    task: JoinHandle<Result<ArchivedEngine>>,
}

impl BuildHandle {
    /// Spawns `pipeline` onto the current runtime.
    pub fn spawn<T>(mut pipeline: BuildPipeline<T>) -> Self
    where
        T: Transport + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        let task = tokio::spawn(async move { pipeline.run_until_cancelled(&child).await });
        Self { token, task }
    }

    /// Requests cancellation; the build stops at its next await point.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the build to finish.
    pub async fn join(self) -> Result<ArchivedEngine> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::Cancelled),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}
