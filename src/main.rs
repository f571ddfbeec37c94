use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use livevars::cli::{Cli, Commands, SizeAction};
use livevars::server::run_serve;
use livevars::{format_human_size, parse_human_size, version_info};

fn run_size(action: SizeAction) -> Result<()> {
    match action {
        SizeAction::Format { bytes, precision } => {
            println!("{}", format_human_size(bytes, precision));
        }
        SizeAction::Parse { text } => {
            println!("{}", parse_human_size(&text)?);
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init()
        .ok();

    let cli = Cli::parse();
    let result: Result<()> = match cli.command {
        Some(Commands::Serve(serve)) => run_serve(serve),
        Some(Commands::Size { action }) => run_size(action),
        Some(Commands::Info { extra }) => {
            println!("{}", version_info(&extra));
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(err) = result {
        let code = exit_code_for_error(&err);
        eprintln!("error: {err:?}");
        std::process::exit(code);
    }
}

pub(crate) fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    // 2: bad size, 3: duplicate variable, 4: bind failure, 1: other
    for cause in err.chain() {
        if cause.is::<livevars::SizeError>() {
            return 2;
        }
        if cause.is::<livevars::RegistryError>() {
            return 3;
        }
        if let Some(ioe) = cause.downcast_ref::<std::io::Error>() {
            use std::io::ErrorKind::*;
            return match ioe.kind() {
                AddrInUse | AddrNotAvailable | PermissionDenied => 4,
                _ => 1,
            };
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_bad_size() {
        let err = anyhow::Error::from(parse_human_size("lots").unwrap_err());
        assert_eq!(exit_code_for_error(&err), 2);
    }

    #[test]
    fn exit_code_duplicate_variable() {
        let err = anyhow::Error::from(livevars::RegistryError::Duplicate { name: "x".into() });
        assert_eq!(exit_code_for_error(&err), 3);
    }

    #[test]
    fn exit_code_bind_like_io_error() {
        let err = anyhow::Error::from(std::io::Error::from(std::io::ErrorKind::AddrInUse))
            .context("Binding TCP listener");
        assert_eq!(exit_code_for_error(&err), 4);
    }

    #[test]
    fn exit_code_other() {
        let err = anyhow::anyhow!("other");
        assert_eq!(exit_code_for_error(&err), 1);
    }

    #[test]
    fn size_format_and_parse_run() {
        run_size(SizeAction::Format { bytes: 55555, precision: 2 }).unwrap();
        run_size(SizeAction::Parse { text: "1KB".into() }).unwrap();
        assert!(run_size(SizeAction::Parse { text: "nope".into() }).is_err());
    }
}
