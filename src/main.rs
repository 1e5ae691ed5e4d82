//=========================================================================
// tilewalk — Binary
//
// Usage: tilewalk [CONFIG.toml]
//
// Without an argument `tilewalk.toml` is used when present, otherwise
// defaults. Maps come from `maps.toml` when present, otherwise the
// built-in table. Log level via `RUST_LOG` (default `info`).
//
//=========================================================================

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use log::{error, info};

use tilewalk::config::{ConfigError, GameConfig};
use tilewalk::game::{self, GameScene};
use tilewalk::map::MapTable;
use tilewalk::EngineBuilder;

const DEFAULT_CONFIG: &str = "tilewalk.toml";
const DEFAULT_MAPS: &str = "maps.toml";

fn load_config() -> Result<GameConfig, ConfigError> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => GameConfig::load(&path),
        None if Path::new(DEFAULT_CONFIG).exists() => GameConfig::load(Path::new(DEFAULT_CONFIG)),
        None => Ok(GameConfig::default()),
    }
}

fn load_maps() -> Result<MapTable, ConfigError> {
    let path = Path::new(DEFAULT_MAPS);
    if path.exists() {
        MapTable::load(path)
    } else {
        Ok(MapTable::builtin())
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, maps) = match load_config().and_then(|config| Ok((config, load_maps()?))) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Starting `{}` on map {}", config.window.title, config.map.start_map);

    let setup = config.clone();
    let result = EngineBuilder::<GameScene>::from_config(&config)
        .build()
        .init(move |systems| game::install(systems, &setup, maps))
        .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
