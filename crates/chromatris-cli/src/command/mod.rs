use clap::{Parser, Subcommand};

use self::{default_config::DefaultConfigArg, simulate::SimulateArg};

mod default_config;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a headless game at a fixed frame rate and print a JSON report
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print the default game configuration as JSON
    DefaultConfig(#[clap(flatten)] DefaultConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Simulate(SimulateArg::default())) {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::DefaultConfig(arg) => default_config::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_default_mode_matches_simulate_defaults() {
        let args = CommandArgs::try_parse_from(["chromatris", "simulate"]).unwrap();
        let Some(Mode::Simulate(parsed)) = args.mode else {
            panic!("expected the simulate mode");
        };
        assert_eq!(parsed, SimulateArg::default());
    }

    #[test]
    fn test_rejects_zero_fps() {
        assert!(CommandArgs::try_parse_from(["chromatris", "simulate", "--fps", "0"]).is_err());
    }

    #[test]
    fn test_parses_seed() {
        let args = CommandArgs::try_parse_from([
            "chromatris",
            "simulate",
            "--seed",
            "00112233445566778899aabbccddeeff",
        ])
        .unwrap();
        assert!(matches!(args.mode, Some(Mode::Simulate(_))));
        assert!(
            CommandArgs::try_parse_from(["chromatris", "simulate", "--seed", "xyz"]).is_err()
        );
    }
}
