use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;

use libsensor_sync::config::Config;
use libsensor_sync::hdf_store::Hdf5Store;
use libsensor_sync::job_status::JobStatus;
use libsensor_sync::process::process;
use libsensor_sync::store::ArrayStore;

fn make_template_config(path: &Path) {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config).unwrap();
    let mut file = File::create(path).expect("Could create template config file!");
    file.write_all(yaml_str.as_bytes())
        .expect("Failed to write yaml data to file!");
}

/// Print every group in the store along with its datasets
fn list_groups(config: &Config) {
    let store = match Hdf5Store::open(&config.store_path) {
        Ok(s) => s,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    let groups = match store.group_names() {
        Ok(g) => g,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    for group in groups {
        match store.dataset_names(&group) {
            Ok(datasets) => log::info!("{group}: {}", datasets.join(", ")),
            Err(e) => log::error!("{group}: {e}"),
        }
    }
}

fn main() {
    // Create a cli
    let matches = Command::new("sensor_sync_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .subcommand(Command::new("groups").about("List the groups of the configured store"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .help("Path to the file"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    // Parse the cli
    let config_path = PathBuf::from(matches.get_one::<String>("path").expect("We require args"));

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );

        make_template_config(&config_path);
        log::info!("Done.");
        return;
    }

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    log::info!("Config successfully loaded.");
    log::info!("Store Path: {}", config.store_path.to_string_lossy());
    log::info!("Output Path: {}", config.output_path.to_string_lossy());

    if let Some(("groups", _)) = matches.subcommand() {
        list_groups(&config);
        return;
    }

    if let Some(fibers) = &config.fibers {
        log::info!(
            "Fibers: {} and {} (tolerance {} ns)",
            fibers.fiber_a,
            fibers.fiber_b,
            fibers.tolerance_ns
        );
    }
    if let Some(vibration) = &config.vibration {
        log::info!("Vibration sample rate: {} Hz", vibration.sample_rate);
    }
    log::info!("Other groups: {:?}", config.generic_groups);

    if !config.does_store_exist() {
        log::error!(
            "Store {} does not exist!",
            config.store_path.to_string_lossy()
        );
        return;
    }

    // Setup the progress bar
    let pb = pb_manager.add(ProgressBar::new(100));
    let (tx, rx) = channel::<JobStatus>();
    // Spawn the task!
    let handle = std::thread::spawn(move || process(&config, &tx));

    // The sender is dropped when the worker finishes, which ends this loop
    for status in rx.iter() {
        pb.set_position((status.progress * 100.0) as u64);
        pb.set_message(status.job);
    }

    match handle.join() {
        Ok(result) => match result {
            Ok(_) => log::info!("Successfully aligned data!"),
            Err(e) => log::error!("Alignment failed with error: {e}"),
        },
        Err(_) => log::error!("Failed to join alignment task!"),
    }

    pb.finish();

    log::info!("Done.");
}
