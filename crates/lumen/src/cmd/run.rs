use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lumen_runner::{
    AppliedEffect, EffectSettings, LumenSettings, RunReport, StripSupervisor, UdpConnector,
};
use tracing::info;

use crate::cmd::{parse_duration, runtime, RunArgs};
use crate::exit::{io_error, runner_error, CliResult, SUCCESS};
use crate::output::{print_run_summary, OutputFormat};
use crate::settings;

pub fn run(args: RunArgs, config: PathBuf, format: OutputFormat) -> CliResult<i32> {
    let duration = args.duration.as_deref().map(parse_duration).transpose()?;
    let mut settings = settings::load(&config)?;
    let loaded = settings.clone();

    if let Some(kind) = args.effect {
        let selected = settings
            .strip
            .effects
            .get(kind)
            .cloned()
            .unwrap_or_else(|| EffectSettings::default_for(kind));
        settings.strip.select_effect(selected);
    }

    let outcome = runtime()?.block_on(stream(&mut settings, duration));

    if settings != loaded {
        settings::save(&config, &settings)?;
    }

    let (applied, report) = outcome?;
    print_run_summary(&applied, &report, format);
    Ok(SUCCESS)
}

async fn stream(
    settings: &mut LumenSettings,
    duration: Option<Duration>,
) -> CliResult<(AppliedEffect, RunReport)> {
    let registry = settings.capture.registry();
    let mut supervisor = StripSupervisor::new(registry, Arc::new(UdpConnector));

    let applied = supervisor
        .apply(&mut settings.strip)
        .await
        .map_err(|err| runner_error("failed to start", err))?;
    info!(
        effect = %applied.running,
        address = %settings.strip.connection.address,
        port = settings.strip.connection.port,
        local_port = settings.strip.connection.local_bind_port(),
        "streaming"
    );

    let stop = wait_for_stop(duration).await;
    let report = supervisor
        .stop()
        .await
        .map_err(|err| runner_error("failed to stop", err))?
        .unwrap_or_default();
    stop?;
    Ok((applied, report))
}

async fn wait_for_stop(duration: Option<Duration>) -> CliResult<()> {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .map_err(|err| io_error("signal handler setup failed", err))
    };
    match duration {
        Some(duration) => tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            result = ctrl_c => result,
        },
        None => ctrl_c.await,
    }
}
