use std::path::PathBuf;

use crate::error::AppError;

/// Frames run by `--headless` when no count is given.
pub const DEFAULT_HEADLESS_FRAMES: usize = 600;

pub const USAGE: &str = "usage: pressureflow [--headless [frames]] [--config <path>]";

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    /// `Some(frames)` runs without a window.
    pub headless: Option<usize>,
    pub config: Option<PathBuf>,
}

/// Parse arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<CliArgs, AppError>
where
    I: IntoIterator<Item = String>,
{
    let mut out = CliArgs::default();
    let mut args = args.into_iter().peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--headless" => {
                let frames = match args.peek().map(|a| a.parse::<usize>()) {
                    Some(Ok(n)) => {
                        args.next();
                        n
                    }
                    _ => DEFAULT_HEADLESS_FRAMES,
                };
                out.headless = Some(frames);
            }
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| AppError::Usage(format!("--config needs a path\n{USAGE}")))?;
                out.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(AppError::Usage(USAGE.to_string())),
            other => return Err(AppError::Usage(format!("unknown argument `{other}`\n{USAGE}"))),
        }
    }
    Ok(out)
}
