use std::process::ExitCode;

use prism_demos::launch;
use prism_demos::triangle::{self, TriangleScene};
use prism_engine::logging::{init_logging, LoggingConfig};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match launch::run(triangle::TITLE, triangle::WIDTH, triangle::HEIGHT, TriangleScene::load) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
