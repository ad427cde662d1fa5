use std::io::{self, Write};
use std::path::PathBuf;

use structopt::StructOpt;

mod console;
mod decode;
mod irsend;
mod output;
mod vcdutils;

use console::{Console, Event, SerialConsole, StdinConsole};
use output::{DeviceLine, LogLine, VcdLine};
use rxremote_shared::{Flow, IrLine, SerialLink, Session, Transmitter, CUSTOM_CODE};

#[derive(Debug, StructOpt)]
#[structopt(name = "rxremote", about = "Infrared remote for the Yamaha RX-E600")]
struct Opt {
    /// Serial device of the ir emitter. Defaults to the first port found, then /dev/ttyACM0
    #[structopt(long = "device", parse(from_os_str))]
    device: Option<PathBuf>,
    /// Serial port the operator types on. Defaults to stdin/stdout
    #[structopt(long, parse(from_os_str))]
    console: Option<PathBuf>,
    /// Send POWER when CTS on the console port goes active
    #[structopt(long)]
    trigger: bool,
    /// Send raw pulse timings instead of letting the device encode the frames
    #[structopt(long)]
    raw: bool,
    /// Write frames to a vcd file instead of the device
    #[structopt(long, parse(from_os_str))]
    vcd: Option<PathBuf>,
    /// Only log the frames
    #[structopt(long)]
    dry_run: bool,
    #[structopt(short, long)]
    debug: bool,
    #[structopt(subcommand)]
    cmd: Option<CliCommand>,
}

#[derive(StructOpt, Debug)]
enum CliCommand {
    /// Read commands from the console until QUIT (default)
    Run,
    /// Send one command
    Send { token: String },
    /// Run the test sequence
    Test,
    /// Show the frame of a command without sending it
    Debug { token: String },
    /// Decode the frames in a vcd trace
    Decode {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
    /// List serial ports
    Ports,
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let loglevel = if opt.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new().filter_level(loglevel).init();

    match &opt.cmd {
        None | Some(CliCommand::Run) => command_run(&opt),
        Some(CliCommand::Send { token }) => {
            let mut session = Session::new(Transmitter::new(open_line(&opt)?, CUSTOM_CODE), io::stdout());
            irsend::transmit(&mut session, token)
        }
        Some(CliCommand::Test) => {
            let mut session = Session::new(Transmitter::new(open_line(&opt)?, CUSTOM_CODE), io::stdout());
            irsend::transmit(&mut session, "TEST")
        }
        Some(CliCommand::Debug { token }) => {
            let mut session = Session::new(Transmitter::new(LogLine, CUSTOM_CODE), io::stdout());
            irsend::transmit(&mut session, &format!("DEBUG {}", token))
        }
        Some(CliCommand::Decode { path }) => decode::command_decode(path),
        Some(CliCommand::Ports) => command_ports(),
    }
}

fn open_line(opt: &Opt) -> anyhow::Result<Box<dyn IrLine>> {
    if opt.dry_run {
        return Ok(Box::new(LogLine));
    }

    if let Some(path) = &opt.vcd {
        log::info!("Tracing to {}", path.display());
        return Ok(Box::new(VcdLine::create(path)?));
    }

    let path_serialport = if let Some(path) = &opt.device {
        path.clone()
    } else if let Some(port) = SerialLink::list_ports().ok().and_then(|ports| ports.into_iter().next()) {
        PathBuf::from(port.port_name)
    } else {
        PathBuf::from("/dev/ttyACM0")
    };

    log::info!("Using device {}", path_serialport.display());

    let mut link = SerialLink::new();
    link.connect(&path_serialport)?;

    Ok(Box::new(DeviceLine::new(link, opt.raw)))
}

fn command_run(opt: &Opt) -> anyhow::Result<()> {
    let line = open_line(opt)?;
    let remote = Transmitter::new(line, CUSTOM_CODE);

    match &opt.console {
        Some(path) => {
            let mut console = SerialConsole::open(path, opt.trigger)?;
            let mut session = Session::new(remote, console.writer()?);
            run_loop(&mut console, &mut session)?;
        }
        None => {
            if opt.trigger {
                log::warn!("--trigger needs a serial --console, ignored");
            }
            let mut session = Session::new(remote, io::stdout());
            run_loop(&mut StdinConsole::new(), &mut session)?;
        }
    }

    Ok(())
}

/// Serve the console until it closes or the operator quits
fn run_loop<C, L, W>(console: &mut C, session: &mut Session<L, W>) -> io::Result<()>
where
    C: Console,
    L: IrLine,
    W: Write,
{
    session.banner()?;

    loop {
        match console.next_event()? {
            Event::Line(line) => {
                if session.handle_line(&line)? == Flow::Quit {
                    log::info!("Bye");
                    break;
                }
            }
            Event::Trigger => session.trigger()?,
            Event::Closed => break,
        }
    }

    Ok(())
}

fn command_ports() -> anyhow::Result<()> {
    let ports = SerialLink::list_ports()?;

    if ports.is_empty() {
        println!("No serial ports found");
    }

    for port in ports {
        println!("{}\t{:?}", port.port_name, port.port_type);
    }

    Ok(())
}
