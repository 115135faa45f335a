use clap::Parser;
use schelling::config::Cli;
use schelling::config::Settings;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match Settings::resolve(cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::from(2);
        }
    };
    schelling::init(settings.debug);
    schelling::experiment::run(&settings);
    ExitCode::SUCCESS
}
