mod cli;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;
use keyline::error::{JsonError, KeylineError};
use keyline::version;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };
    let json = cli.global.json;

    // catch any panics in non-dev builds
    let result = if version::is_development() {
        cli::execute(cli)
    } else {
        panic::set_hook(Box::new(|_| {}));
        match panic::catch_unwind(AssertUnwindSafe(|| cli::execute(cli))) {
            Ok(result) => result,
            Err(payload) => {
                eprintln!(
                    "{} {}",
                    console::style("Keyline Exception:").red(),
                    panic_message(payload.as_ref())
                );
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        report(&e, json);
        std::process::exit(e.exit_code());
    }
}

fn report(e: &KeylineError, json: bool) {
    if json {
        match serde_json::to_string(&JsonError::from_error(e)) {
            Ok(s) => eprintln!("{}", s),
            Err(_) => eprintln!("Error: {}", e),
        }
    } else {
        eprintln!("{} {}", console::style("Error:").red(), e);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}
