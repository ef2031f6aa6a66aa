use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // No arguments are expected, so any argument at all gets the help text
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

/// Secrets are deliberately left off this list.
const DISPLAY_ENVS: [&str; 9] = [
    "RUST_LOG",
    "BZR_HOST",
    "BZR_PORT",
    "BZR_DATABASE_URL",
    "BZR_AUTO_MIGRATE",
    "BZR_HUB_COMMAND_BUFFER",
    "BZR_CONNECTION_QUEUE_SIZE",
    "BZR_ROOM_IDLE_TIMEOUT",
    "BZR_ROOM_REAPER_INTERVAL",
];

fn display_envs() {
    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| println!("  {name:<35} {:<15}", env_value(name)));
}

fn env_value(name: &str) -> String {
    match env::var(name) {
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}
