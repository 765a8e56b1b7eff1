//! Subcommand execution.
//!
//! Each entry point returns whether it succeeded; `main` turns that into the
//! process exit code. Errors are reserved for failures that stop the command
//! outright, such as an unreadable report.
use log::*;
use std::sync::Arc;

use crate::{
    cli::Command,
    config::Config,
    error::Result,
    integrator::Integrator,
    monitor::Monitor,
    process::{CommandRunner, SystemRunner},
    report,
    tester::IntegrationTester,
    upstream::{github::GithubReleases, traits::ReleaseSource},
};

pub async fn execute(command: &Command, config: Config) -> Result<bool> {
    let config = Arc::new(config);
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);

    match command {
        Command::Monitor { single_check } => {
            monitor(config, runner, *single_check).await
        }
        Command::Integrate { report } => integrate(config, runner, report).await,
        Command::Test => test(config, runner).await,
        Command::Releases => releases(config, runner).await,
    }
}

fn release_source(config: &Config) -> Result<Arc<dyn ReleaseSource>> {
    Ok(Arc::new(GithubReleases::new(&config.upstream)?))
}

async fn monitor(
    config: Arc<Config>,
    runner: Arc<dyn CommandRunner>,
    single_check: bool,
) -> Result<bool> {
    let source = release_source(&config)?;
    let monitor = Arc::new(Monitor::new(config, source, runner));

    if !single_check {
        monitor.run().await?;
        return Ok(true);
    }

    match monitor.single_check().await? {
        Some(true) => info!("single check completed: new release processed"),
        Some(false) => info!("single check completed: no new releases"),
        None => {}
    }

    Ok(true)
}

async fn integrate(
    config: Arc<Config>,
    runner: Arc<dyn CommandRunner>,
    report_arg: &str,
) -> Result<bool> {
    let report = report::load_report(report_arg).await?;
    let integrator = Integrator::new(config, runner);

    let summary = integrator.integrate(&report).await?;

    let failed = summary.failed_steps();
    if !failed.is_empty() {
        warn!(
            "steps with failures: {}",
            failed
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        );
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(true)
}

async fn test(
    config: Arc<Config>,
    runner: Arc<dyn CommandRunner>,
) -> Result<bool> {
    IntegrationTester::new(config, runner).run_all_tests().await
}

async fn releases(
    config: Arc<Config>,
    runner: Arc<dyn CommandRunner>,
) -> Result<bool> {
    let source = release_source(&config)?;
    Monitor::new(config, source, runner).list_releases().await;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test_log::test(tokio::test)]
    async fn integrate_rejects_unknown_report_argument() {
        let fixture = GuiFixture::new();
        let result = execute(
            &Command::Integrate {
                report: fixture.path("missing.json").display().to_string(),
            },
            fixture.config.clone(),
        )
        .await;

        assert!(result.is_err());
    }

    #[test_log::test(tokio::test)]
    async fn integrate_rejects_inline_report_without_tag() {
        let fixture = GuiFixture::new();
        let mut report = create_test_report(&volume_release());
        report.release.tag = String::new();

        let result = execute(
            &Command::Integrate {
                report: serde_json::to_string(&report).unwrap(),
            },
            fixture.config.clone(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(fixture.read(&fixture.config.paths.utils_module), UTILS_JS);
    }
}
