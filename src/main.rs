// mhz19c -- query and configure an MH-Z19C CO2 sensor from the command line.
//
// Usage:
//   mhz19c -c [-t] [-v]
//   mhz19c -t [-c] [-v]
//   mhz19c --set-calib <on|off> [-v]
//   mhz19c --get-calib [-v]
//   mhz19c --zero-calib [-v]
//   mhz19c --firmware [-v]

use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use mhz19c::transport::serial::DEFAULT_PORT;
use mhz19c::{CalibState, DeviceConfig, Mhz19c, SerialChannel};

/// Query and configure an MH-Z19C CO2 sensor.
#[derive(Parser, Debug)]
#[command(name = "mhz19c", version, about)]
#[command(group(
    ArgGroup::new("reading")
        .args(["co2", "temperature"])
        .multiple(true)
))]
#[command(group(
    ArgGroup::new("action")
        .args(["co2", "temperature", "set_calib", "get_calib", "zero_calib", "firmware"])
        .required(true)
        .multiple(true)
))]
struct Cli {
    /// Print the CO2 concentration (ppm).
    #[arg(short, long)]
    co2: bool,

    /// Print the temperature (°C, two decimals).
    #[arg(short, long)]
    temperature: bool,

    /// Set the state of auto calibration (on|off).
    #[arg(
        long,
        value_name = "STATE",
        conflicts_with_all = ["reading", "get_calib", "zero_calib", "firmware"]
    )]
    set_calib: Option<CalibState>,

    /// Print the state of auto calibration.
    #[arg(long, conflicts_with_all = ["reading", "zero_calib", "firmware"])]
    get_calib: bool,

    /// Request a zero-point calibration against the current air.
    #[arg(long, conflicts_with_all = ["reading", "firmware"])]
    zero_calib: bool,

    /// Print the sensor firmware version.
    #[arg(long, conflicts_with = "reading")]
    firmware: bool,

    /// Serial port the sensor is attached to.
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    /// Log every frame sent and received.
    #[arg(short, long)]
    verbose: bool,
}

/// The single operation requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Read { co2: bool, temperature: bool },
    SetCalib(CalibState),
    GetCalib,
    ZeroCalib,
    Firmware,
}

impl Cli {
    fn action(&self) -> Action {
        if let Some(state) = self.set_calib {
            Action::SetCalib(state)
        } else if self.get_calib {
            Action::GetCalib
        } else if self.zero_calib {
            Action::ZeroCalib
        } else if self.firmware {
            Action::Firmware
        } else {
            Action::Read {
                co2: self.co2,
                temperature: self.temperature,
            }
        }
    }

    fn config(&self) -> DeviceConfig {
        DeviceConfig::new(self.port.clone()).verbose(self.verbose)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mhz19c=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn perform(sensor: &mut Mhz19c<SerialChannel>, action: Action) -> mhz19c::Result<String> {
    match action {
        Action::Read { co2, temperature } => {
            let mut fields = Vec::with_capacity(2);
            if co2 {
                fields.push(sensor.read_co2().await?.co2_ppm.to_string());
            }
            if temperature {
                fields.push(format!("{:.2}", sensor.read_temperature().await?));
            }
            Ok(fields.join(" "))
        }
        Action::SetCalib(state) => {
            sensor.set_auto_calib(state).await?;
            Ok(String::new())
        }
        Action::GetCalib => Ok(sensor.get_auto_calib().await?.to_string()),
        Action::ZeroCalib => {
            sensor.zero_calibration().await?;
            Ok(String::new())
        }
        Action::Firmware => match sensor.version() {
            Some(version) => Ok(version.to_string()),
            None => Ok(sensor.get_version().await?.to_string()),
        },
    }
}

async fn run(config: DeviceConfig, action: Action) -> mhz19c::Result<String> {
    let mut sensor = Mhz19c::with_config(config);
    sensor.open().await?;

    let output = perform(&mut sensor, action).await;
    let closed = sensor.close().await;

    let output = output?;
    closed?;
    Ok(output)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.config(), cli.action()).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("mhz19c: {e}");
            ExitCode::FAILURE
        }
    }
}
