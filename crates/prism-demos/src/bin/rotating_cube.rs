use std::process::ExitCode;

use prism_demos::cube::{self, CubeScene};
use prism_demos::launch;
use prism_engine::logging::{init_logging, LoggingConfig};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let result = launch::run(cube::TITLE, cube::WIDTH, cube::HEIGHT, |gfx, shaders| {
        CubeScene::load(gfx, shaders, cube::WIDTH, cube::HEIGHT)
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
