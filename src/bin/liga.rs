use std::io::{self, BufRead, Write};

use chrono::Utc;
use liga_da_firma::config::ConsoleConfig;
use liga_da_firma::console::Console;
use liga_da_firma::{League, Store};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with replies
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();

    let config = ConsoleConfig::from_env();
    info!(store = %config.store_path.display(), tz = %config.tz, "Starting console");
    let store = Store::open(&config.store_path);
    let mut console = Console::new(League::open(store, config.tz, Utc::now()));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in console.greeting().lines {
        writeln!(stdout, "{line}")?;
    }

    let mut input = stdin.lock().lines();
    loop {
        write!(stdout, "liga> ")?;
        stdout.flush()?;
        let Some(line) = input.next().transpose()? else {
            break;
        };
        // Destructive commands ask on the same stdin
        let mut confirm = |prompt: &str| {
            print!("{prompt} [y/N] ");
            let _ = io::stdout().flush();
            matches!(input.next(), Some(Ok(answer)) if answer.trim().eq_ignore_ascii_case("y"))
        };
        let reply = console.handle_line(&line, &mut confirm);
        for out in &reply.lines {
            writeln!(stdout, "{out}")?;
        }
        if reply.quit {
            break;
        }
    }
    Ok(())
}
