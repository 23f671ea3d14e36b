//! # sensor_sync
//!
//! sensor_sync extracts multi-channel sensor recordings (fiber-optic strain sensors,
//! vibration accelerometers, and environmental/load sensors) from a hierarchical array
//! store and produces time-synchronized tables for downstream analysis.
//!
//! ## Installation
//!
//! The only method of install is from source, which is laid out below.
//!
//! ### Rust
//!
//! If you have not used Rust before, you will most likely need to install the Rust tool
//! chain. See the [Rust docs](https://www.rust-lang.org/tools/install) for installation
//! instructions.
//!
//! ### HDF5
//!
//! Stores are read as HDF5 files, so HDF5 must be installed before building. Typically
//! this will be installed using a package manager (homebrew, apt, etc), and the Rust
//! libraries will auto detect the location of the HDF install. If HDF5 lives in a custom
//! location, write the following snippet into the file `.cargo/config.toml` in the
//! repository:
//!
//! ```toml
//! [env]
//! HDF5_DIR="/path/to/my/hdf5/install/"
//!
//! [build]
//! rustflags="-C link-args=-Wl,-rpath,/path/to/my/hdf5/install/lib"
//! ```
//!
//! ### Building & Install
//!
//! To build and install the CLI use `cargo install --path ./sensor_sync_cli` from the top
//! level repository.
//!
//! ## Store Layout
//!
//! Groups live at the root of the store. The group and dataset names are fixed:
//!
//! ```text
//! store.h5
//! fibers_#          - one per fiber
//! |---- 0(dset)     - timestamps, integer nanoseconds since the epoch
//! |---- 1..5(dset)  - strain sensors 1 through 5
//! vibration_#       - one per accelerometer channel (101, 102, 103)
//! |---- Timestamp(dset) - float seconds since the epoch, NaN between anchors
//! |---- Data(dset)
//! <any other group> - environment and load sensors
//! |---- __time_UTC__s__(dset) - optional, float seconds since the epoch
//! |---- <name>(dset)          - one value column per dataset
//! ```
//!
//! ## Alignment
//!
//! - Fibers: the two fibers are sampled independently. Every row of the first fiber is
//! matched to the nearest row of the second within 1 ms (inclusive), sensor 5 of the
//! second fiber is dropped, and rows left with a missing value are removed. Both fibers
//! must be time sorted.
//! - Vibration: the three channels are sample aligned and joined by row. Hardware only
//! records an instant for the first sample of each acquisition buffer (the anchor); every
//! other sample's time is rebuilt as `anchor + index / sample_rate`.
//!
//! ## Configuration
//!
//! The CLI reads a YAML configuration:
//!
//! ```yml
//! store_path: /path/to/store.h5
//! output_path: /path/to/output/
//! fibers:
//!   fiber_a: 1
//!   fiber_b: 2
//!   tolerance_ns: 1000000
//! vibration:
//!   sample_rate: 25000.0
//! generic_groups:
//! - environment_rpm
//! - environment_temperature
//! - load_temperature
//! ```
//!
//! Setting `fibers` or `vibration` to `null` skips that job. Each job writes one csv file
//! to the output directory.
pub mod channel;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod fiber_aligner;
pub mod hdf_store;
pub mod job_status;
pub mod process;
pub mod reader;
pub mod sensor_table;
pub mod store;
pub mod vibration;
