//! Interactive placement correction

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use fill_core::PlacementStore;

/// One parsed correction command. Indices are entered 1-based at the
/// prompt and stored 0-based here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Adjust { index: usize, x: u32, y: u32 },
    Remove { index: usize },
    Add { name: String, text: String, x: u32, y: u32 },
    Preview,
    Done,
}

/// Parse one command line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["done"] => Ok(Command::Done),
        ["preview"] => Ok(Command::Preview),
        ["adjust", index, x, y] => Ok(Command::Adjust {
            index: parse_index(index)?,
            x: parse_coord(x)?,
            y: parse_coord(y)?,
        }),
        ["remove", index] => Ok(Command::Remove {
            index: parse_index(index)?,
        }),
        ["add", name, text, x, y] => Ok(Command::Add {
            name: (*name).to_string(),
            text: (*text).to_string(),
            x: parse_coord(x)?,
            y: parse_coord(y)?,
        }),
        [] => Err("empty command".to_string()),
        _ => Err("invalid command; use adjust/remove/add/preview/done".to_string()),
    }
}

fn parse_index(token: &str) -> Result<usize, String> {
    let display: usize = token
        .parse()
        .map_err(|_| format!("invalid index '{token}'"))?;
    if display == 0 {
        return Err("indices start at 1".to_string());
    }
    Ok(display - 1)
}

fn parse_coord(token: &str) -> Result<u32, String> {
    token
        .parse()
        .map_err(|_| format!("invalid coordinate '{token}'"))
}

/// Run the correction loop over standard input until `done` or EOF.
///
/// Malformed commands print an error and re-prompt; out-of-range indices
/// fall through to the store's silent no-ops.
pub fn run(store: &mut PlacementStore, preview_path: &Path, show_labels: bool) -> Result<()> {
    println!("\nInteractive mode - adjust placements:");
    println!("  adjust <index> <x> <y>    - Move a placement");
    println!("  remove <index>            - Remove a placement");
    println!("  add <name> <text> <x> <y> - Add a placement");
    println!("  preview                   - Write the current preview");
    println!("  done                      - Finish and save");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Done) => break,
            Ok(Command::Adjust { index, x, y }) => {
                store.adjust(index, Some(x), Some(y), None, None);
                println!("Adjusted placement {}", index + 1);
            }
            Ok(Command::Remove { index }) => {
                store.remove(index);
                println!("Removed placement {}", index + 1);
            }
            Ok(Command::Add { name, text, x, y }) => {
                store.add(&name, &text, x, y);
                println!("Added placement: {name}");
            }
            Ok(Command::Preview) => {
                store.save_preview(preview_path, show_labels)?;
                println!("Preview saved: {}", preview_path.display());
            }
            Err(message) => println!("Error: {message}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_adjust() {
        assert_eq!(
            parse_command("adjust 2 150 300"),
            Ok(Command::Adjust {
                index: 1,
                x: 150,
                y: 300
            })
        );
    }

    #[test]
    fn test_parse_remove() {
        assert_eq!(parse_command("remove 1"), Ok(Command::Remove { index: 0 }));
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse_command("add Name Jane 10 20"),
            Ok(Command::Add {
                name: "Name".to_string(),
                text: "Jane".to_string(),
                x: 10,
                y: 20
            })
        );
    }

    #[test]
    fn test_parse_preview_and_done() {
        assert_eq!(parse_command("preview"), Ok(Command::Preview));
        assert_eq!(parse_command("done"), Ok(Command::Done));
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        assert_eq!(
            parse_command("  adjust   1  5  6  "),
            Ok(Command::Adjust { index: 0, x: 5, y: 6 })
        );
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert!(parse_command("frobnicate 1").is_err());
        assert!(parse_command("adjust one 2 3").is_err());
        assert!(parse_command("adjust 1 2").is_err());
        assert!(parse_command("add OnlyName 1 2").is_err());
        assert!(parse_command("").is_err());
    }

    #[test]
    fn test_parse_rejects_index_zero() {
        assert!(parse_command("remove 0").is_err());
    }

    #[test]
    fn test_parse_rejects_negative_coordinates() {
        assert!(parse_command("adjust 1 -5 10").is_err());
    }
}
