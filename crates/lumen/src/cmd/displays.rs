use std::path::PathBuf;

use lumen_effect::{ambient, CaptureRegistry};
use lumen_runner::{EffectKind, EffectSettings};
use tracing::debug;

use crate::cmd::DisplaysArgs;
use crate::exit::{CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_displays, DisplayRow, OutputFormat};
use crate::settings;

pub fn run(_args: DisplaysArgs, config: PathBuf, format: OutputFormat) -> CliResult<i32> {
    let settings = settings::load(&config)?;
    let registry = settings.capture.registry();

    let adapters = ambient::graphics_card_names(&registry).map_err(unavailable)?;
    let rows = collect_rows(&registry)?;
    debug!(
        ?adapters,
        displays = rows.len(),
        ambient = EffectSettings::default_for(EffectKind::Ambient).is_constructible(&registry),
        "enumerated displays"
    );
    print_displays(&rows, format);
    Ok(SUCCESS)
}

/// Rows for every display; displays the ambient effect cannot select have no
/// detail level.
fn collect_rows(registry: &CaptureRegistry) -> CliResult<Vec<DisplayRow>> {
    let monitors = ambient::monitors(registry).map_err(unavailable)?;
    Ok(monitors
        .into_iter()
        .map(|(adapter, display)| {
            let max_detail_level = ambient::detail_level_range(registry, Some(&display.device_name))
                .ok()
                .and_then(|levels| levels.end.checked_sub(1));
            DisplayRow {
                adapter,
                name: display.device_name,
                width: display.width,
                height: display.height,
                max_detail_level,
            }
        })
        .collect())
}

fn unavailable(err: lumen_effect::EffectError) -> CliError {
    CliError::new(FAILURE, format!("capture backend unavailable: {err}"))
}
