pub mod fixtures;
pub mod page_assertions;

use gridpress::style::{Margins, PageSize};
use gridpress::{EngineConfig, PublishError, Publisher, RunOutput};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A 120pt square page with 10pt margins: a 10x10 grid of 10pt cells.
/// Writes no aux file.
pub fn small_config() -> EngineConfig {
    EngineConfig {
        jobname: "gridpress-test".to_string(),
        page_size: PageSize::Custom {
            width: 120.0,
            height: 120.0,
        },
        margins: Margins::all(10.0),
        cell_width: 10.0,
        cell_height: 10.0,
        font_size: 10.0,
        leading: 10.0,
        write_aux: false,
        ..EngineConfig::default()
    }
}

/// Runs `layout` over `data` on the small test page.
pub fn publish(layout: &str, data: &str) -> Result<RunOutput, PublishError> {
    publish_with(small_config(), layout, data)
}

pub fn publish_with(
    config: EngineConfig,
    layout: &str,
    data: &str,
) -> Result<RunOutput, PublishError> {
    init_logger();
    Publisher::builder().with_config(config).build()?.run(layout, data)
}
