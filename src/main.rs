//! # wsclean CLI
//!
//! Clean up sibling build-workspace directories under a shared root, such
//! as the workspace area of a Jenkins agent.
//!
//! ## Quick Start
//!
//! ```bash
//! # Preview: keep the 20 newest workspaces under /srv/ws
//! wsclean -n -m 20 /srv/ws
//!
//! # Execute, shrinking to 80 GiB once usage crosses 100 GiB
//! wsclean -f -s 100 --target-gb 80 /srv/ws
//!
//! # Never touch release workspaces, always drop scratch ones
//! wsclean -f -m 20 -p '^release-' -c '^scratch-' /srv/ws
//! ```
//!
//! One of `-n/--dry-run` or `-f/--force` is always required; the tool
//! refuses to decide between "simulate" and "execute" implicitly.
//!
//! ## Environment Variables
//!
//! - `WSCLEAN_MAX_WORKSPACES`, `WSCLEAN_MAX_GB`, `WSCLEAN_MAX_PERCENTAGE`
//! - `WSCLEAN_TARGET_GB`, `WSCLEAN_TARGET_PERCENTAGE`
//! - `WSCLEAN_PRESERVE_PATTERN`, `WSCLEAN_CLEAN_PATTERN`
//! - `WSCLEAN_VERBOSE`, `WSCLEAN_QUIET`

use std::io::IsTerminal;

use wsclean::cli::Cli;

fn main() -> miette::Result<()> {
    // Install miette's fancy panic and error report handler
    miette::set_panic_hook();

    // Configure miette handler based on terminal capabilities
    // This provides better error formatting for both TTY and non-TTY environments
    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        // Use a simpler handler for non-TTY environments (CI, logs, etc.)
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Execute the cleanup (or the disk-usage report)
    let result = wsclean::commands::execute(&cli);

    // Convert our error type to miette's Result
    result.map_err(Into::into)
}
