//! Command trait for hookpin CLI
//!
//! Every subcommand implements [`Command`] and receives the shared
//! [`RuntimeContext`].

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for all hookpin commands
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use crate::error::Result;
/// use clap::Args;
///
/// #[derive(Debug, Args)]
/// pub struct MyCommand {
///     #[arg(short, long)]
///     pub some_flag: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         let manifest = context.load_manifest()?;
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if the command fails to execute. Error messages should
    /// be descriptive enough for the user to understand what went wrong.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
