//! Hookpin CLI application entry point
//!
//! Parses arguments, runs the command and turns its result into an exit
//! status: 0 when everything passed, 1 when hooks failed or the manifest is
//! invalid, 3 when hookpin itself could not do its job.

use clap::Parser;
use owo_colors::OwoColorize;

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(false)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    let cli = hookpin::Cli::parse();

    let Err(error) = hookpin::run(cli) else {
        return;
    };

    if hookpin::is_check_failure(&error) {
        // The command already printed the details
        eprintln!("{}", error.red());
    } else {
        let report = miette::Report::msg(format!("{error:#}"));
        eprintln!("{report:?}");
    }
    std::process::exit(hookpin::exit_code(&error));
}
