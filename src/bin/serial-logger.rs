use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serialport::SerialPortType;
use tracing_subscriber::EnvFilter;

use serial_logger::config::{self, Config};
use serial_logger::{Device, Error, LocalClock, LogFile, Session, StopReason};

/// Exit status after Ctrl-C, matching what a shell reports for SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Parser, Debug)]
#[command(version, about = "Logs lines received on a serial device")]
struct Args {
    /// Serial device to read from.
    #[arg(default_value = config::DEFAULT_DEVICE_PATH)]
    device: PathBuf,

    #[arg(short, long, default_value_t = config::DEFAULT_BAUD_RATE)]
    baud: u32,

    /// File received lines are appended to.
    #[arg(short, long, default_value = config::DEFAULT_LOG_PATH)]
    log: PathBuf,

    /// A line starting with this character ends the session.
    #[arg(short, long, default_value = "z", value_parser = config::parse_terminator)]
    terminator: u8,

    /// List the serial ports found on this system and exit.
    #[arg(long)]
    list: bool,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            device_path: self.device,
            baud_rate: self.baud,
            log_path: self.log,
            terminator: self.terminator,
        }
    }
}

fn configure_diagnostics() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .try_init();
}

fn describe_port_type(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(info) => format!(
            "USB {:04x}:{:04x} {}",
            info.vid,
            info.pid,
            info.product.as_deref().unwrap_or("")
        ),
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "unknown".to_string(),
    }
}

fn list_ports() -> ExitCode {
    match serialport::available_ports() {
        Ok(ports) => {
            if ports.is_empty() {
                eprintln!("No serial ports found.");
            }
            for port in ports {
                println!("{}\t{}", port.port_name, describe_port_type(&port.port_type));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to enumerate serial ports: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, clock: LocalClock) -> Result<StopReason, Error> {
    config.validate()?;
    let device = Device::open(config)?;

    // The device isn't our controlling terminal, but the console still is:
    // put the device back the way we found it before dying to a Ctrl-C.
    let saved_settings = device.saved_settings();
    if let Err(e) = ctrlc::set_handler(move || {
        if let Err(e) = saved_settings.restore() {
            eprintln!("Failed to restore device settings: {e}");
        }
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }) {
        tracing::warn!(error = %e, "unable to install Ctrl-C handler");
    }

    let log = match LogFile::open(&config.log_path) {
        Ok(log) => {
            println!("Logging enabled, saving as {}", config.log_path.display());
            Some(log)
        }
        Err(e) => {
            println!(
                "Could not open file {}. Logging will be disabled",
                config.log_path.display()
            );
            tracing::warn!(error = %e, "log file unavailable");
            None
        }
    };

    let mut session = Session::new(&device, log, io::stdout().lock(), clock, config.terminator);
    let reason = session.run()?;
    drop(session);

    device.close()?;
    Ok(reason)
}

fn main() -> ExitCode {
    let args = Args::parse();
    configure_diagnostics();
    // Must happen before ctrlc spawns its thread, see LocalClock.
    let clock = LocalClock::new();

    eprintln!("serial-logger (v{})", env!("CARGO_PKG_VERSION"));

    if args.list {
        return list_ports();
    }

    let config = args.into_config();
    match run(&config, clock) {
        Ok(_) => {
            println!("Exiting serial-logger");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
