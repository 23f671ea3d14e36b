use std::sync::mpsc::Sender;

use super::channel::{SensorChannel, VibrationChannel};
use super::config::{Config, FiberJob, VibrationJob};
use super::error::{ProcessorError, ReaderError};
use super::export::{write_aligned_csv, write_sensor_csv};
use super::fiber_aligner::process_fibers_with_tolerance;
use super::hdf_store::Hdf5Store;
use super::job_status::JobStatus;
use super::reader::{load_fiber_group, load_generic_group, load_vibration_group};
use super::sensor_table::SensorTable;
use super::vibration::process_vibration;

/// Open the store for exactly one load. The file is closed again when this returns.
fn with_store<F>(config: &Config, load: F) -> Result<SensorTable, ProcessorError>
where
    F: FnOnce(&Hdf5Store) -> Result<SensorTable, ReaderError>,
{
    let store = Hdf5Store::open(&config.store_path)?;
    Ok(load(&store)?)
}

/// Load two fibers with all of their sensors, fuse them and write the result
fn run_fiber_job(config: &Config, job: &FiberJob) -> Result<String, ProcessorError> {
    let fiber_a = with_store(config, |store| {
        load_fiber_group(store, job.fiber_a, &SensorChannel::ALL)
    })?;
    let fiber_b = with_store(config, |store| {
        load_fiber_group(store, job.fiber_b, &SensorChannel::ALL)
    })?;
    let fused = process_fibers_with_tolerance(&fiber_a, &fiber_b, job.tolerance_ns)?;
    log::info!(
        "Fused fibers {} and {}: kept {} of {} rows",
        job.fiber_a,
        job.fiber_b,
        fused.n_rows(),
        fiber_a.n_rows()
    );

    let stem = format!("fibers_{}_{}", job.fiber_a, job.fiber_b);
    write_aligned_csv(&fused, &config.get_output_file_name(&stem)?)?;
    Ok(stem)
}

/// Load the three vibration channels, rebuild their clock and write the result
fn run_vibration_job(config: &Config, job: &VibrationJob) -> Result<String, ProcessorError> {
    let mut channels: Vec<SensorTable> = Vec::with_capacity(VibrationChannel::ALL.len());
    for channel in VibrationChannel::ALL {
        channels.push(with_store(config, |store| {
            load_vibration_group(store, channel.id())
        })?);
    }
    let merged = process_vibration(&channels[0], &channels[1], &channels[2], job.sample_rate)?;
    log::info!(
        "Reconstructed vibration clock for {} samples at {} Hz",
        merged.n_rows(),
        job.sample_rate
    );

    let stem = String::from("vibration");
    write_aligned_csv(&merged, &config.get_output_file_name(&stem)?)?;
    Ok(stem)
}

fn run_generic_job(config: &Config, group: &str) -> Result<String, ProcessorError> {
    let table = with_store(config, |store| load_generic_group(store, group))?;
    log::info!(
        "Loaded {} rows of {} column(s) from {}",
        table.n_rows(),
        table.columns.len(),
        group
    );
    write_sensor_csv(&table, &config.get_output_file_name(group)?)?;
    Ok(group.to_string())
}

/// The main loop of sensor_sync.
///
/// Runs every job in the config in order (fibers, vibration, generic groups), writing one
/// csv file per job to the output directory. A JobStatus is sent after each finished job.
/// The first failure stops processing.
pub fn process(config: &Config, tx: &Sender<JobStatus>) -> Result<(), ProcessorError> {
    let total = config.job_count();
    if total == 0 {
        log::warn!("Config does not request any jobs, nothing to do.");
        return Ok(());
    }
    let mut finished = 0;

    let mut report = |job: &str| -> Result<(), ProcessorError> {
        finished += 1;
        tx.send(JobStatus::new(finished as f32 / total as f32, job))?;
        Ok(())
    };

    if let Some(job) = &config.fibers {
        log::info!("Processing fibers {} and {}...", job.fiber_a, job.fiber_b);
        let name = run_fiber_job(config, job)?;
        report(&name)?;
    }

    if let Some(job) = &config.vibration {
        log::info!("Processing vibration channels...");
        let name = run_vibration_job(config, job)?;
        report(&name)?;
    }

    for group in config.generic_groups.iter() {
        log::info!("Processing group {}...", group);
        let name = run_generic_job(config, group)?;
        report(&name)?;
    }

    log::info!("Finished {} job(s).", total);
    Ok(())
}
