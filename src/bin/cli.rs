use room_finder::clock::format_offset;
use room_finder::{FinderConfig, MeetingDay, QueryResult, RoomFinder, load_config_from_json};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn push_row<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for (ci, cell) in cells.enumerate() {
        out.push(' ');
        out.push_str(cell);
        let pad = widths[ci].saturating_sub(cell.len());
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    // Build horizontal separator
    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &widths, headers.iter().copied());
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        push_row(&mut out, &widths, row.iter().map(String::as_str));
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_meetings(finder: &RoomFinder) -> String {
    match finder.dataset().meetings() {
        Ok(meetings) => {
            let rows: Vec<Vec<String>> = meetings
                .iter()
                .map(|m| {
                    vec![
                        m.crn.clone(),
                        m.room.clone(),
                        m.days.clone(),
                        format_offset(m.start),
                        format_offset(m.end),
                    ]
                })
                .collect();
            render_text_table(&["crn", "room", "days", "start", "end"], &rows)
        }
        Err(e) => format!("Error: {e}"),
    }
}

fn render_room_list(rooms: &[String]) -> String {
    if rooms.is_empty() {
        return "  (none)".to_string();
    }
    rooms
        .iter()
        .map(|r| format!("  {r}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_result(result: &QueryResult, as_json: bool) {
    if as_json {
        match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{json}"),
            Err(e) => println!("Error: {e}"),
        }
        return;
    }
    println!("Available rooms:\n{}", render_room_list(&result.available));
    println!("Occupied:\n{}", render_room_list(&result.occupied));
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  find <day> <HH:MM> <HH:MM> [json]  List available and occupied rooms (day is M/T/W/R/F)\n  ask                                Answer the day/from/until prompts\n  rooms                              List every known room\n  room <name> <day>                  Show a room's meetings on a day\n  show                               Show the normalized schedule\n  summary                            Show how many rows were kept and dropped\n  quit|exit                          Exit"
    );
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, question: &str) -> Option<String> {
    print!("{question}\n:");
    let _ = io::stdout().flush();
    match lines.next() {
        Some(Ok(line)) => Some(line.trim().to_string()),
        _ => None,
    }
}

struct Args {
    schedule: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        schedule: None,
        config: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config requires a path")?;
                args.config = Some(PathBuf::from(path));
            }
            _ if args.schedule.is_none() => args.schedule = Some(PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<FinderConfig, String> {
    let config = match &args.config {
        Some(path) => load_config_from_json(path).map_err(|e| e.to_string())?,
        None => FinderConfig::default(),
    };
    let mut config = config.apply_env();
    if let Some(path) = &args.schedule {
        config.schedule_path = path.clone();
    }
    Ok(config)
}

fn init_tracing(config: &FinderConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let config = match parse_args().and_then(|args| load_config(&args)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    let finder = match RoomFinder::from_config(&config) {
        Ok(finder) => finder,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Room Finder (CLI) - type 'help' for commands");
    println!(
        "Loaded {} ({} meetings, {} rooms)\n",
        config.schedule_path.display(),
        finder.dataset().len(),
        finder.dataset().rooms().len()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_meetings(&finder)),
            "summary" => println!("{}", finder.dataset().summary().to_cli_summary()),
            "rooms" => println!("{}", render_room_list(finder.dataset().rooms().as_slice())),
            "find" => {
                let args: Vec<&str> = parts.collect();
                match args.as_slice() {
                    [day, start, end] | [day, start, end, "json"] => {
                        match finder.find(day, start, end) {
                            Ok(result) => print_result(&result, args.len() == 4),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: find <day> <HH:MM> <HH:MM> [json]"),
                }
            }
            "ask" => {
                let Some(day) = prompt(&mut lines, "What day are you looking at (M/T/W/R/F)?") else {
                    break;
                };
                let Some(start) = prompt(&mut lines, "From what time (military, HH:MM)?") else {
                    break;
                };
                let Some(end) = prompt(&mut lines, "Until what time (military, HH:MM)?") else {
                    break;
                };
                match finder.find(&day, &start, &end) {
                    Ok(result) => print_result(&result, false),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "room" => {
                let args: Vec<&str> = parts.collect();
                match args.split_last() {
                    Some((day, name)) if !name.is_empty() => {
                        let day: MeetingDay = match day.parse() {
                            Ok(d) => d,
                            Err(e) => {
                                println!("Error: {e}");
                                continue;
                            }
                        };
                        let name = name.join(" ");
                        match finder.dataset().meetings_in_room(&name, day) {
                            Ok(meetings) if meetings.is_empty() => {
                                println!("{name} has no meetings on {day}.")
                            }
                            Ok(meetings) => {
                                for m in meetings {
                                    println!("  {} {} ({})", m.time_label(), m.crn, m.days);
                                }
                            }
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: room <name> <day>"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    ExitCode::SUCCESS
}
