//! Interactive console.
//!
//! Lists devices, asks for a 1-based selection, then sends one line per
//! prompt until an empty line is entered.

use anyhow::{Context, Result};
use rgbled_hw::{command, devices, Error, Rgb, Session};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// What a console line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Empty line: end the session.
    Quit,
    /// A color in `#rrggbb`, `rrggbb` or `r,g,b` form.
    Color(Rgb),
    /// Anything else, sent verbatim.
    Text(String),
}

/// Classifies one console line.
pub fn parse_line(line: &str) -> ConsoleInput {
    if line.is_empty() {
        return ConsoleInput::Quit;
    }
    match line.trim().parse::<Rgb>() {
        Ok(color) => ConsoleInput::Color(color),
        Err(_) => ConsoleInput::Text(line.trim().to_string()),
    }
}

/// Runs the console on stdin/stdout.
pub async fn run(session: &mut Session, candidates: &[String]) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_with(session, candidates, stdin, &mut stdout).await
}

/// Runs the console on the given input and output.
pub async fn run_with<R, W>(
    session: &mut Session,
    candidates: &[String],
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if candidates.is_empty() {
        writeln!(out, "No devices found!")?;
        return Err(Error::NoDeviceFound.into());
    }

    let mut lines = input.lines();

    writeln!(out, "Select the device:")?;
    for (index, device) in candidates.iter().enumerate() {
        writeln!(out, "[{}] {}", index + 1, device)?;
    }

    let index = loop {
        prompt(out, ": ")?;
        // End of input counts as an empty answer.
        let answer = lines.next_line().await?.unwrap_or_default();
        match devices::select_device(&answer, candidates.len()) {
            Ok(index) => break index,
            Err(e) => writeln!(out, "{}", e)?,
        }
    };
    let device = &candidates[index];
    writeln!(out, "Selected device: {}", device)?;

    if let Err(e) = session.connect(device).await {
        writeln!(
            out,
            "Please check the connection and ensure you have the correct permissions."
        )?;
        return Err(e).with_context(|| format!("Could not open port '{}'", device));
    }
    writeln!(out, "Successfully connected to: {}", device)?;

    loop {
        prompt(out, "> ")?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out, "\tExit...")?;
            break;
        };

        match parse_line(&line) {
            ConsoleInput::Quit => {
                writeln!(out, "\tExit...")?;
                break;
            }
            ConsoleInput::Color(color) => {
                // Every line reaches the device, repeats included.
                let line = command::encode(color);
                let line = line.trim_end();
                session
                    .send_line(line)
                    .await
                    .context("Connection lost, reconnect to continue")?;
                writeln!(out, "\tSending: {}\\n", line)?;
            }
            ConsoleInput::Text(text) => {
                session
                    .send_line(&text)
                    .await
                    .context("Connection lost, reconnect to continue")?;
                writeln!(out, "\tSending: {}\\n", text)?;
            }
        }
    }

    session.disconnect();
    Ok(())
}

fn prompt<W: Write>(out: &mut W, text: &str) -> Result<()> {
    write!(out, "{}", text)?;
    out.flush()?;
    Ok(())
}
