// Command abbreviation matching for the CLI and the interactive shell

/// Find all commands that start with the given prefix (case-insensitive)
pub fn find_matching_commands<'a>(prefix: &str, commands: &'a [&str]) -> Vec<&'a str> {
    let prefix_lower = prefix.to_lowercase();
    commands.iter()
        .filter(|cmd| cmd.to_lowercase().starts_with(&prefix_lower))
        .copied()
        .collect()
}

/// Find a unique command match for the given prefix
/// Returns Ok(command) if exactly one match, Err(matches) if ambiguous, Err(empty) if no match
/// Note: Exact matches take precedence over prefix matches
pub fn find_unique_command<'a>(prefix: &str, commands: &'a [&str]) -> Result<&'a str, Vec<&'a str>> {
    let prefix_lower = prefix.to_lowercase();
    if let Some(cmd) = commands.iter().find(|cmd| cmd.to_lowercase() == prefix_lower) {
        return Ok(*cmd);
    }

    let matches = find_matching_commands(prefix, commands);
    if matches.len() == 1 {
        Ok(matches[0])
    } else {
        Err(matches)
    }
}

/// Top-level commands of the `shopclock` binary
pub const TOP_LEVEL_COMMANDS: &[&str] = &[
    "status", "jobs", "show", "clock", "stage", "watch", "shell", "reset", "help",
];

/// Commands accepted at the shell prompt
pub const SHELL_COMMANDS: &[&str] = &[
    "status", "jobs", "show", "clock", "stage", "lock", "unlock", "drawer", "reset", "help", "quit", "exit",
];

/// Shift clock subcommands
pub const CLOCK_COMMANDS: &[&str] = &["on", "pause", "resume", "off"];

/// Stage subcommands
pub const STAGE_COMMANDS: &[&str] = &["start", "switch", "pause", "complete"];

/// Drawer subcommands (shell only)
pub const DRAWER_COMMANDS: &[&str] = &["open", "close"];

/// Get subcommands for a given top-level command
pub fn get_subcommands(command: &str) -> Option<&'static [&'static str]> {
    match command {
        "clock" => Some(CLOCK_COMMANDS),
        "stage" => Some(STAGE_COMMANDS),
        "drawer" => Some(DRAWER_COMMANDS),
        _ => None,
    }
}

/// Expand the command word (and its subcommand word, if any) of `args`
/// against `commands`. Remaining arguments pass through untouched.
pub fn expand_command_abbreviations(args: Vec<String>, commands: &[&str]) -> Result<Vec<String>, String> {
    let mut iter = args.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Vec::new());
    };

    let mut expanded = Vec::new();
    if first.starts_with('-') {
        expanded.push(first);
        expanded.extend(iter);
        return Ok(expanded);
    }

    let command = match find_unique_command(&first, commands) {
        Ok(full_cmd) => full_cmd.to_string(),
        // No match - let clap report it
        Err(matches) if matches.is_empty() => first,
        Err(matches) => {
            return Err(format!(
                "Ambiguous command '{}'. Did you mean one of: {}?",
                first,
                matches.join(", ")
            ));
        }
    };

    let subcommands = get_subcommands(&command);
    expanded.push(command);

    // Only commands with subcommands consume a second word here
    if let Some(subcommands) = subcommands {
        if let Some(next) = iter.next() {
            if next.starts_with('-') {
                expanded.push(next);
            } else {
                match find_unique_command(&next, subcommands) {
                    Ok(full_subcmd) => expanded.push(full_subcmd.to_string()),
                    Err(matches) if matches.is_empty() => expanded.push(next),
                    Err(matches) => {
                        return Err(format!(
                            "Ambiguous subcommand '{}'. Did you mean one of: {}?",
                            next,
                            matches.join(", ")
                        ));
                    }
                }
            }
        }
    }

    expanded.extend(iter);
    Ok(expanded)
}
