//! Operator console line parsing.
//!
//! ```text
//! /tinthealth disable            run a plugin command as the console
//! as alice /tinthealth sethp 4   run a plugin command as a player
//! join alice [op]                connect a player
//! leave alice                    disconnect a player
//! world alice nether             move a player into another world
//! move alice 120 -40             teleport a player to x/z in their world
//! op alice / deop alice          grant or revoke operator
//! damage alice 3                 remove health
//! heal alice 3                   restore health
//! list                           show connected players
//! stop                           shut the server down
//! ```

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// A registered plugin command; `as_player` is `None` for the console
    Plugin {
        as_player: Option<String>,
        line: String,
    },
    Join {
        name: String,
        operator: bool,
    },
    Leave {
        name: String,
    },
    World {
        name: String,
        world: String,
    },
    Move {
        name: String,
        x: f64,
        z: f64,
    },
    Operator {
        name: String,
        operator: bool,
    },
    Damage {
        name: String,
        amount: f64,
    },
    Heal {
        name: String,
        amount: f64,
    },
    List,
    Help,
    Stop,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConsoleError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("{0} is not a valid amount")]
    InvalidAmount(String),

    #[error("{0} is not a valid coordinate")]
    InvalidCoordinate(String),

    #[error("Unknown console command '{0}', try 'help'")]
    Unknown(String),
}

pub const HELP: &str = "Commands: /<plugin command>, as <player> /<plugin command>, \
join <name> [op], leave <name>, world <name> <world>, move <name> <x> <z>, \
op <name>, deop <name>, damage <name> <amount>, heal <name> <amount>, list, stop";

/// Parses one console line.
///
/// # Returns
///
/// `Ok(None)` for blank lines.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if line.starts_with('/') {
        return Ok(Some(ConsoleCommand::Plugin {
            as_player: None,
            line: line.to_string(),
        }));
    }

    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let command = match verb.to_lowercase().as_str() {
        "as" => match args.as_slice() {
            [name, first, ..] if first.starts_with('/') => ConsoleCommand::Plugin {
                as_player: Some(name.to_string()),
                line: args[1..].join(" "),
            },
            _ => return Err(ConsoleError::Usage("as <player> /<command> [args]")),
        },
        "join" => match args.as_slice() {
            [name] => ConsoleCommand::Join {
                name: name.to_string(),
                operator: false,
            },
            [name, flag] if flag.eq_ignore_ascii_case("op") => ConsoleCommand::Join {
                name: name.to_string(),
                operator: true,
            },
            _ => return Err(ConsoleError::Usage("join <name> [op]")),
        },
        "leave" => match args.as_slice() {
            [name] => ConsoleCommand::Leave {
                name: name.to_string(),
            },
            _ => return Err(ConsoleError::Usage("leave <name>")),
        },
        "world" => match args.as_slice() {
            [name, world] => ConsoleCommand::World {
                name: name.to_string(),
                world: world.to_string(),
            },
            _ => return Err(ConsoleError::Usage("world <name> <world>")),
        },
        "move" => match args.as_slice() {
            [name, x, z] => ConsoleCommand::Move {
                name: name.to_string(),
                x: parse_coordinate(x)?,
                z: parse_coordinate(z)?,
            },
            _ => return Err(ConsoleError::Usage("move <name> <x> <z>")),
        },
        "op" | "deop" => match args.as_slice() {
            [name] => ConsoleCommand::Operator {
                name: name.to_string(),
                operator: verb.eq_ignore_ascii_case("op"),
            },
            _ => return Err(ConsoleError::Usage("op|deop <name>")),
        },
        "damage" => match args.as_slice() {
            [name, amount] => ConsoleCommand::Damage {
                name: name.to_string(),
                amount: parse_amount(amount)?,
            },
            _ => return Err(ConsoleError::Usage("damage <name> <amount>")),
        },
        "heal" => match args.as_slice() {
            [name, amount] => ConsoleCommand::Heal {
                name: name.to_string(),
                amount: parse_amount(amount)?,
            },
            _ => return Err(ConsoleError::Usage("heal <name> <amount>")),
        },
        "list" => ConsoleCommand::List,
        "help" | "?" => ConsoleCommand::Help,
        "stop" | "exit" | "quit" => ConsoleCommand::Stop,
        _ => return Err(ConsoleError::Unknown(verb.to_string())),
    };

    Ok(Some(command))
}

fn parse_amount(raw: &str) -> Result<f64, ConsoleError> {
    match raw.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(ConsoleError::InvalidAmount(raw.to_string())),
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, ConsoleError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConsoleError::InvalidCoordinate(raw.to_string())),
    }
}
