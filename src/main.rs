use std::env;
use std::sync::Arc;

use bookings_eng::csv::{read_commands, read_environment, write_bookings};
use bookings_eng::gateway::Gateways;
use bookings_eng::{Engine, EngineConfig};
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: bookings-eng <environment.csv> <commands.csv>";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let environment_path = args.next().expect(USAGE);
    let commands_path = args.next().expect(USAGE);

    let gateways = read_environment(&environment_path).unwrap_or_else(|e| {
        eprintln!("invalid environment file: {e}");
        std::process::exit(1);
    });

    let mut engine = Engine::new(EngineConfig::default(), Gateways::shared(Arc::new(gateways)));
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in read_commands(&commands_path) {
            match result {
                Ok(command) => {
                    cmd_sender.send(command).await.unwrap();
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    engine.run(ReceiverStream::new(cmd_receiver)).await;

    write_bookings(engine.bookings());
}
