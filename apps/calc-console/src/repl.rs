//! Line-oriented front end for a calculator session.
//!
//! Each line is either a `:command` or a run of keys (`12.5 + 3 =`, `9 sqrt`).
//! Keys are pressed one by one; the line waits for every evaluation before the
//! display is printed.

use anyhow::{Context, Result};
use calculator_keypad::{Input, SessionHandle, Snapshot, Step, format_number, parse_line};
use calculator_sdk::HistoryEntry;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const HELP: &str = "\
keys:      0-9 . + - * / ^ = % neg  (x for multiply, Backspace/Delete, C/Escape)
functions: sin cos tan asin acos atan sqrt log ln inv fact rnd
constants: pi e ans
units:     deg rad drg
commands:  :history :clear-history :help :quit";

const WIDTH: usize = 30;

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Empty,
    Keys(&'a str),
    History,
    ClearHistory,
    Help,
    Quit,
    Unknown(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    match line.trim() {
        "" => Line::Empty,
        ":q" | ":quit" | ":exit" => Line::Quit,
        ":h" | ":help" => Line::Help,
        ":history" => Line::History,
        ":clear-history" => Line::ClearHistory,
        command if command.starts_with(':') => Line::Unknown(command),
        keys => Line::Keys(keys),
    }
}

/// Read lines from `input` until EOF or `:quit`, writing the display after each.
///
/// # Errors
/// I/O failures on `input`/`out`, or the session stopping.
pub async fn run<R, W>(session: &SessionHandle, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_block(out, &render(&session.settled().await?)).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let text = match classify(&line) {
            Line::Empty => continue,
            Line::Quit => break,
            Line::Help => HELP.to_owned(),
            Line::History => render_history(&session.settled().await?.history),
            Line::ClearHistory => match session.clear_history().await {
                Ok(()) => "history cleared".to_owned(),
                Err(e) => format!("cannot clear history: {e}"),
            },
            Line::Unknown(command) => format!("unknown command '{command}', try :help"),
            Line::Keys(keys) => match parse_line(keys) {
                Ok(inputs) => {
                    press_all(session, inputs).await?;
                    render(&session.settled().await?)
                }
                Err(e) => e.to_string(),
            },
        };
        write_block(out, &text).await?;
    }
    Ok(())
}

async fn press_all(session: &SessionHandle, inputs: Vec<Input>) -> Result<()> {
    for input in inputs {
        if let Step::Request(_) = session.press(input).await? {
            session.settled().await?;
        }
    }
    Ok(())
}

async fn write_block<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await.context("failed to write output")
}

/// Two-line calculator display: unit and operation label, then the value.
#[must_use]
pub fn render(snapshot: &Snapshot) -> String {
    let unit = snapshot.angle_unit.as_str().to_ascii_uppercase();
    let mut lines = vec![
        format!("[{unit}] {:>WIDTH$}", snapshot.entry.operation_label),
        format!("      {:>WIDTH$}", snapshot.entry.display),
    ];
    if let Some(err) = &snapshot.last_error {
        lines.push(format!("      {err}"));
    }
    lines.join("\n")
}

#[must_use]
pub fn render_history(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return "(no history)".to_owned();
    }
    history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let operands: Vec<String> = entry.operands.iter().copied().map(format_number).collect();
            let unit = entry.unit.map_or_else(String::new, |u| format!(" [{u}]"));
            format!(
                "{:>3}. {}({}){unit} = {}",
                i + 1,
                entry.operation,
                operands.join(", "),
                format_number(entry.result)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
