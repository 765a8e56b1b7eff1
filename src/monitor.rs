//! Release polling loop.
//!
//! A check cycle loads the cursor, fetches the latest upstream release and,
//! when its tag is new, analyzes it, saves a report and hands the report to
//! the integration pipeline. Cycles never overlap: a tick that arrives while
//! one is still running is skipped.
use chrono::Utc;
use log::*;
use std::{future::Future, sync::Arc};
use tokio::{
    signal,
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{
    analyzer::{Analysis, ReleaseAnalyzer},
    config::Config,
    error::Result,
    integrator::Integrator,
    process::CommandRunner,
    report::{self, Report, ReportBuilder},
    state::{MonitorState, StateStore},
    tester::IntegrationTester,
    upstream::{traits::ReleaseSource, types::Release},
};

pub struct Monitor {
    config: Arc<Config>,
    source: Arc<dyn ReleaseSource>,
    store: StateStore,
    analyzer: ReleaseAnalyzer,
    integrator: Integrator,
    tester: IntegrationTester,
    cycle: Arc<Mutex<()>>,
}

impl Monitor {
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn ReleaseSource>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            store: StateStore::new(config.resolve(&config.paths.state_file)),
            analyzer: ReleaseAnalyzer::new(),
            integrator: Integrator::new(Arc::clone(&config), Arc::clone(&runner)),
            tester: IntegrationTester::new(Arc::clone(&config), runner),
            cycle: Arc::new(Mutex::new(())),
            config,
            source,
        }
    }

    /// Run one check cycle. Returns true when a new release was processed.
    ///
    /// A failed fetch is not an error: the cursor is left untouched and the
    /// next cycle retries.
    pub async fn check_for_new_releases(&self) -> Result<bool> {
        info!("checking for new releases");

        let mut state = self.store.load().await;

        let Some(release) = self.source.fetch_latest_release().await else {
            error!("failed to fetch latest release");
            return Ok(false);
        };

        let tag = release.tag_name.clone();

        if !state.is_new_release(&tag) {
            info!("no new releases (current: {})", tag);
            state.touch(Utc::now());
            self.save_state(&state).await;
            return Ok(false);
        }

        info!("new release detected: {}", tag);

        let analysis = self.analyzer.analyze(&release);
        self.log_upstream_context(&tag, &analysis).await;

        let report = ReportBuilder::generate_release_report(&release, &analysis);
        report::save_report(
            &self.config.resolve(&self.config.paths.reports_dir),
            &report,
        )
        .await?;

        if self.run_pipeline(&report).await {
            info!("integration workflow completed for {}", tag);
        } else {
            error!("integration workflow failed for {}: manual review required", tag);
        }

        state.record_processed(&tag, release.id, Utc::now());
        self.save_state(&state).await;

        Ok(true)
    }

    /// One check cycle, abandoned on Ctrl-C. Returns `None` when interrupted.
    pub async fn single_check(&self) -> Result<Option<bool>> {
        self.single_check_until(interrupted()).await
    }

    /// One check cycle, abandoned as soon as `shutdown` resolves.
    pub async fn single_check_until<F>(&self, shutdown: F) -> Result<Option<bool>>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = shutdown => {
                info!("monitor stopped");
                Ok(None)
            }
            result = self.check_for_new_releases() => result.map(Some),
        }
    }

    /// Poll until Ctrl-C.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        self.run_until(interrupted()).await
    }

    /// Initial check, then one cycle per interval tick until `shutdown`
    /// resolves. A cycle still running at shutdown, the initial one
    /// included, is not waited for.
    pub async fn run_until<F>(self: Arc<Self>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let interval = self.config.poll_interval();

        info!(
            "starting release monitor for {}/{}",
            self.config.upstream.owner, self.config.upstream.repo
        );

        tokio::pin!(shutdown);

        {
            let _guard = self.cycle.lock().await;
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("monitor stopped");
                    return Ok(());
                }
                _ = self.run_cycle() => {}
            }
        }

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately
        ticker.tick().await;

        info!("monitor started: checking every {}s", interval.as_secs());

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let _ = Arc::clone(&self).try_start_cycle();
                }
            }
        }

        info!("monitor stopped");

        Ok(())
    }

    /// Print every upstream release, newest first.
    pub async fn list_releases(&self) -> usize {
        let releases = self.source.fetch_all_releases().await;

        if releases.is_empty() {
            warn!("no releases found");
        }

        for release in releases.iter() {
            println!("{}", describe_release(release));
        }

        releases.len()
    }

    /// Spawn a cycle unless one is already running.
    fn try_start_cycle(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let guard = match Arc::clone(&self.cycle).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("previous check still running: skipping this tick");
                return None;
            }
        };

        Some(tokio::spawn(async move {
            let _guard = guard;
            self.run_cycle().await;
        }))
    }

    /// A failed save is logged rather than failing the cycle; the next
    /// cycle works from whatever state is on disk.
    async fn save_state(&self, state: &MonitorState) {
        if let Err(e) = self.store.save(state).await {
            error!("failed to save monitor state: {}", e);
        }
    }

    async fn run_cycle(&self) {
        match self.check_for_new_releases().await {
            Ok(true) => info!("check completed: new release processed"),
            Ok(false) => debug!("check completed: no new releases"),
            Err(e) => error!("monitor error: {}", e),
        }
    }

    /// Integrate the report and run the smoke tests, as enabled. Returns
    /// whether every enabled stage succeeded.
    async fn run_pipeline(&self, report: &Report) -> bool {
        if !self.config.monitor.auto_integrate {
            info!(
                "automatic integration disabled: run `releasewatch integrate` with the saved report"
            );
            return true;
        }

        info!("triggering integration workflow");

        let summary = match self.integrator.integrate(report).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("integration failed: {}", e);
                return false;
            }
        };

        if !self.config.monitor.run_integration_tests {
            return summary.tests_passed;
        }

        match self.tester.run_all_tests().await {
            Ok(passed) => summary.tests_passed && passed,
            Err(e) => {
                error!("integration tests failed to run: {}", e);
                false
            }
        }
    }

    /// Log how far the tag is ahead of the compare base and which new
    /// commands the upstream readme already documents.
    async fn log_upstream_context(&self, tag: &str, analysis: &Analysis) {
        if let Some(changes) = self.source.fetch_repo_changes(tag).await {
            info!(
                "{} is {} ({} commits, {} files changed): {}",
                tag,
                changes.status,
                changes.total_commits,
                changes.files.len(),
                changes.html_url
            );
        }

        if analysis.commands.is_empty() {
            return;
        }

        if let Some(readme) = self.source.fetch_readme_content().await {
            for command in analysis.commands.iter() {
                if readme.contains(&format!("container {command}")) {
                    debug!("'container {}' is documented upstream", command);
                } else {
                    warn!("'container {}' is not documented upstream", command);
                }
            }
        }
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

/// One line per release: tag, publish date and flags.
pub fn describe_release(release: &Release) -> String {
    let date = release
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unpublished".into());

    let mut line = format!("{:<16} {}", release.tag_name, date);

    if release.prerelease {
        line.push_str(" [prerelease]");
    }

    if release.draft {
        line.push_str(" [draft]");
    }

    line
}
